use thiserror::Error;

use crate::core::models::port::PortError;
use crate::core::models::structure::StructureError;

use super::registry::RegistryError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structure operation failed: {source}")]
    Structure {
        #[from]
        source: StructureError,
    },

    #[error("Port state error: {source}")]
    Port {
        #[from]
        source: PortError,
    },

    #[error("Fragment registry error: {source}")]
    Registry {
        #[from]
        source: RegistryError,
    },

    #[error("Port '{label}' is not available for fusion")]
    PortUnavailable { label: String },

    #[error("Fragments '{moving}' and '{target}' already share a root; fusing would close a cycle")]
    Cycle { moving: String, target: String },

    #[error("No fragment named '{name}' is registered")]
    UnknownFragment { name: String },

    #[error("Assembly is already finalized; no further construction is permitted")]
    AlreadyFinalized,

    #[error("Builder operation '{operation}' is not permitted in state '{state}'")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
