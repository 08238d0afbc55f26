use crate::core::models::ids::FragmentId;
use crate::core::models::structure::Structure;
use std::error::Error;
use std::io;
use tracing::debug;

/// Defines the interface for external fragment loaders.
///
/// Implementors own all file-format knowledge: they parse whatever input
/// they represent and deliver a fully populated root fragment (particles,
/// internal bonds, optionally ports) into the given structure. The core
/// treats the call as atomic and opaque; on success it only ever consumes
/// the returned fragment.
pub trait FragmentSource {
    /// The error type for load operations.
    type Error: Error + From<io::Error>;

    /// Loads one fragment into `structure` and returns its ID.
    ///
    /// The returned fragment must be a root of `structure` (not yet attached
    /// anywhere), ready for ports to be added and for fusion.
    ///
    /// # Errors
    ///
    /// Returns an implementation-specific error if parsing or I/O fails.
    fn load_into(&self, structure: &mut Structure) -> Result<FragmentId, Self::Error>;
}

/// Imports a fragment from an external source, logging the hand-off.
pub fn import<S: FragmentSource>(
    structure: &mut Structure,
    source: &S,
) -> Result<FragmentId, S::Error> {
    let fragment = source.load_into(structure)?;
    debug!(
        name = %structure
            .fragment(fragment)
            .map(|f| f.name.as_str())
            .unwrap_or("<missing>"),
        particles = structure.particles_of(fragment).count(),
        "Imported fragment from external source."
    );
    Ok(fragment)
}
