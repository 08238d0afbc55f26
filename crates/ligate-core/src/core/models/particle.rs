use crate::core::utils::elements::standard_mass;
use nalgebra::Point3;

/// Represents a single particle (atom or coarse-grained site) in a structure.
///
/// This struct carries the identity and coordinates of one particle. Its
/// position is mutable: it is rewritten whenever the fragment subtree owning
/// the particle undergoes a rigid motion.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// The name of the particle within its fragment (e.g., "C1", "H").
    pub name: String,
    /// The element symbol (e.g., "C", "Cl"); empty for abstract sites.
    pub element: String,
    /// The 3D coordinates of the particle in Angstroms.
    pub position: Point3<f64>,
    /// The standard atomic mass of the element, or `0.0` if unknown.
    pub mass: f64,
}

impl Particle {
    /// Creates a new `Particle`, resolving its mass from the element table.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the particle.
    /// * `element` - The element symbol used for the mass lookup.
    /// * `position` - The 3D coordinates of the particle.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            mass: standard_mass(element).unwrap_or(0.0),
        }
    }
}
