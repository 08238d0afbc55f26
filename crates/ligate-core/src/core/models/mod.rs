//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent a
//! molecular structure under construction, providing the foundation for all
//! assembly operations in Ligate.
//!
//! ## Key Components
//!
//! - [`particle`] - Individual particle representation with element identity and coordinates
//! - [`port`] - Directed, consumable attachment sites keyed to anchor particles
//! - [`fragment`] - A composable tree node owning child fragments, particles, and ports
//! - [`structure`] - The arena owning every fragment, particle, port, and bond of one build
//! - [`topology`] - Bond records and bond-order classification
//! - [`labels`] - The label-allocation service behind templated (`"name[$]"`) labels
//! - [`flat`] - The flattened, serializable snapshot handed to external collaborators
//! - [`ids`] - Stable identifier types for particles, fragments, and ports
//!
//! ## Usage
//!
//! Most operations start with a [`structure::Structure`], populate it with
//! fragments and ports, and hand pairs of ports to the engine layer for fusion.
//!
//! ```ignore
//! use ligate::core::models::{particle::Particle, structure::Structure};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut structure = Structure::new();
//! let methyl = structure.new_fragment("methyl");
//! let carbon = structure.add_particle(
//!     methyl,
//!     Particle::new("C", "C", Point3::origin()),
//!     None,
//! )?;
//! structure.add_port(methyl, "up", carbon, Vector3::y(), 0.77)?;
//! ```

pub mod flat;
pub mod fragment;
pub mod ids;
pub mod labels;
pub mod particle;
pub mod port;
pub mod structure;
pub mod topology;
