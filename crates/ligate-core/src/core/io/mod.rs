//! Provides the import seam for externally loaded fragments.
//!
//! Ligate parses no molecular file format itself. File-format collaborators
//! implement the [`traits::FragmentSource`] trait and deliver a ready-made
//! fragment into a [`crate::core::models::structure::Structure`]; the core
//! only attaches ports to the resulting particles and fuses from there.

pub mod traits;

pub use traits::import;
