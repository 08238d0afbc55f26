//! # Ligate Core Library
//!
//! A library for programmatic assembly of molecular structures from reusable,
//! port-bearing fragments.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Structure`,
//!   `Fragment`, `Port`), pure geometric primitives (`RigidTransform`, vector
//!   alignment), and the opaque-import seam for externally loaded fragments.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer orchestrates construction.
//!   It includes the alignment engine (`fuse`) that superimposes two ports with a
//!   whole-body rigid motion, the `ChainBuilder` state machine, and the declarative
//!   `FragmentRegistry` of reusable fragment templates.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing layer.
//!   It ties the `engine` and `core` together to execute complete assembly
//!   procedures, such as building a capped linear chain. It provides a simple and
//!   powerful entry point for end-users of the library.

pub mod core;
pub mod engine;
pub mod workflows;
