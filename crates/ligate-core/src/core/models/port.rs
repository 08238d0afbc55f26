use super::ids::{FragmentId, ParticleId};
use nalgebra::Vector3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum PortError {
    #[error("Port has already been consumed")]
    AlreadyConsumed,
}

/// Lifecycle state of a port.
///
/// A port starts `Open` and is consumed exactly once, when the alignment
/// engine fuses it with a partner. Consumed ports stay in the structure for
/// bookkeeping but are invisible to open-port queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortStatus {
    #[default]
    Open,
    Consumed,
}

/// A directed, consumable attachment site on a fragment.
///
/// The port is geometrically keyed to an anchor particle it does not own
/// (the `ParticleId` is a weak reference into the structure's arena), carries
/// an outward direction in the frame current at creation time, and a
/// separation distance inserted along that direction when fusing.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    /// The resolved label this port was registered under, kept for diagnostics.
    pub label: String,
    /// The particle this port is geometrically keyed to.
    pub anchor: ParticleId,
    /// Outward direction; rewritten whenever the owning subtree is transformed.
    pub direction: Vector3<f64>,
    /// Distance in Angstroms inserted along the direction when fusing.
    pub separation: f64,
    /// The fragment holding this port.
    pub(crate) fragment: FragmentId,
    status: PortStatus,
}

impl Port {
    pub(crate) fn new(
        label: &str,
        fragment: FragmentId,
        anchor: ParticleId,
        direction: Vector3<f64>,
        separation: f64,
    ) -> Self {
        Self {
            label: label.to_string(),
            anchor,
            direction,
            separation,
            fragment,
            status: PortStatus::default(),
        }
    }

    /// The fragment holding this port.
    pub fn fragment(&self) -> FragmentId {
        self.fragment
    }

    pub fn is_available(&self) -> bool {
        self.status == PortStatus::Open
    }

    /// Marks the port unavailable. Consuming moves no geometry; it only flips
    /// lifecycle state so the port disappears from open-port queries.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::AlreadyConsumed`] if called a second time.
    pub fn consume(&mut self) -> Result<(), PortError> {
        if self.status == PortStatus::Consumed {
            return Err(PortError::AlreadyConsumed);
        }
        self.status = PortStatus::Consumed;
        Ok(())
    }
}
