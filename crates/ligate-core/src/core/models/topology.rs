use super::ids::ParticleId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Default for BondOrder {
    fn default() -> Self {
        BondOrder::Single
    }
}

#[derive(Debug, Error)]
#[error("Invalid bond order string")]
pub struct ParseBondOrderError;

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A bond between two particles in the same structure.
///
/// Bonds are recorded explicitly, either by a fragment template's internal
/// topology or implicitly when two ports are fused; they are never re-inferred
/// from geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bond {
    pub a: ParticleId,
    pub b: ParticleId,
    pub order: BondOrder,
}

impl Bond {
    pub fn new(a: ParticleId, b: ParticleId, order: BondOrder) -> Self {
        Self { a, b, order }
    }

    pub fn contains(&self, particle_id: ParticleId) -> bool {
        self.a == particle_id || self.b == particle_id
    }

    /// The particle on the other end, if `particle_id` is an endpoint.
    pub fn partner(&self, particle_id: ParticleId) -> Option<ParticleId> {
        if self.a == particle_id {
            Some(self.b)
        } else if self.b == particle_id {
            Some(self.a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_particle_id(n: u64) -> ParticleId {
        ParticleId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn from_str_parses_all_aliases() {
        assert!(matches!("single".parse(), Ok(BondOrder::Single)));
        assert!(matches!("1".parse(), Ok(BondOrder::Single)));
        assert!(matches!("D".parse(), Ok(BondOrder::Double)));
        assert!(matches!("triple".parse(), Ok(BondOrder::Triple)));
        assert!(matches!("ar".parse(), Ok(BondOrder::Aromatic)));
        assert!("quadruple".parse::<BondOrder>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for order in [
            BondOrder::Single,
            BondOrder::Double,
            BondOrder::Triple,
            BondOrder::Aromatic,
        ] {
            let text = order.to_string();
            assert_eq!(text.parse::<BondOrder>().unwrap(), order);
        }
    }

    #[test]
    fn default_bond_order_is_single() {
        assert_eq!(BondOrder::default(), BondOrder::Single);
    }

    #[test]
    fn bond_endpoint_queries_work() {
        let a = dummy_particle_id(1);
        let b = dummy_particle_id(2);
        let c = dummy_particle_id(3);
        let bond = Bond::new(a, b, BondOrder::Single);

        assert!(bond.contains(a));
        assert!(bond.contains(b));
        assert!(!bond.contains(c));
        assert_eq!(bond.partner(a), Some(b));
        assert_eq!(bond.partner(b), Some(a));
        assert_eq!(bond.partner(c), None);
    }
}
