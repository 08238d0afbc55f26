use super::particle::Particle;
use super::topology::BondOrder;
use serde::{Deserialize, Serialize};

/// A particle in a flattened structure, positions in Angstroms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatParticle {
    pub name: String,
    pub element: String,
    pub position: [f64; 3],
    pub mass: f64,
}

impl FlatParticle {
    pub(crate) fn from_particle(particle: &Particle) -> Self {
        Self {
            name: particle.name.clone(),
            element: particle.element.clone(),
            position: [
                particle.position.x,
                particle.position.y,
                particle.position.z,
            ],
            mass: particle.mass,
        }
    }
}

/// A bond in a flattened structure, endpoints as particle indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBond {
    pub a: usize,
    pub b: usize,
    #[serde(default)]
    pub order: BondOrder,
}

/// The flattened snapshot of a fragment subtree.
///
/// Particles appear in deterministic depth-first order, so two identical
/// builds flatten identically and the snapshot round-trips through any serde
/// format. This is the hand-off shape for serialization and visualization
/// collaborators; the core never reads one back into a build.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlatStructure {
    pub particles: Vec<FlatParticle>,
    pub bonds: Vec<FlatBond>,
}
