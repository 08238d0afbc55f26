//! # Workflows Module
//!
//! This module provides high-level workflow implementations that orchestrate
//! complete assembly procedures in Ligate.
//!
//! ## Overview
//!
//! Workflows are the top-level entry points for users of Ligate. They
//! encapsulate an entire construction pipeline, from parameter validation
//! through builder sequencing to the finished, read-only structure. Each
//! workflow handles progress reporting and result organization, providing a
//! clean and simple API for multi-step assembly tasks.
//!
//! ## Architecture
//!
//! The module is organized around specific assembly workflows:
//!
//! - **Chain Workflow** ([`chain`]) - Capped linear chains parametrized by a
//!   repeat count and a fragment registry.

pub mod chain;
