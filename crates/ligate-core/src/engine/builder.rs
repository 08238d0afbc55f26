use super::config::ChainConfig;
use super::error::EngineError;
use super::fuse::fuse;
use super::registry::FragmentRegistry;
use crate::core::models::ids::{FragmentId, PortId};
use crate::core::models::structure::Structure;
use tracing::{debug, info};

/// Linear lifecycle of a chain build.
///
/// Transitions are strictly `NotStarted → BuildingChain → Capped → Done`;
/// there is no branching and no way back. `Done` is terminal: the assembled
/// structure is read-only from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    NotStarted,
    BuildingChain { remaining: usize },
    Capped,
    Done,
}

impl BuilderState {
    fn name(&self) -> &'static str {
        match self {
            BuilderState::NotStarted => "NotStarted",
            BuilderState::BuildingChain { .. } => "BuildingChain",
            BuilderState::Capped => "Capped",
            BuilderState::Done => "Done",
        }
    }
}

/// The finished product of a chain build.
#[derive(Debug, Clone)]
pub struct ChainAssembly {
    pub structure: Structure,
    /// The enclosing parent fragment holding caps and units as children.
    pub root: FragmentId,
    /// The repeat units in chain order.
    pub units: Vec<FragmentId>,
}

/// Sequences registry instantiation and port fusion into a capped chain.
///
/// The builder holds no geometry logic of its own; every placement decision
/// is delegated to the alignment engine. It tracks the running "last open
/// port" of the growing chain and enforces the linear state machine.
#[derive(Debug)]
pub struct ChainBuilder<'a> {
    config: &'a ChainConfig,
    registry: &'a FragmentRegistry,
    structure: Structure,
    state: BuilderState,
    root: FragmentId,
    open_port: Option<PortId>,
    units: Vec<FragmentId>,
}

impl<'a> ChainBuilder<'a> {
    /// Creates a builder for the given recipe.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for a zero chain length and
    /// `UnknownFragment` if the recipe names unregistered fragments.
    pub fn new(
        config: &'a ChainConfig,
        registry: &'a FragmentRegistry,
    ) -> Result<Self, EngineError> {
        if config.chain_length < 1 {
            return Err(EngineError::InvalidParameter {
                name: "chain_length",
                message: format!("must be at least 1, got {}", config.chain_length),
            });
        }
        for name in [&config.unit, &config.cap] {
            if !registry.contains(name) {
                return Err(EngineError::UnknownFragment { name: name.clone() });
            }
        }

        let mut structure = Structure::new();
        let root = structure.new_fragment("chain");
        Ok(Self {
            config,
            registry,
            structure,
            state: BuilderState::NotStarted,
            root,
            open_port: None,
            units: Vec::new(),
        })
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    /// Places the front cap and opens the chain for units.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.state {
            BuilderState::NotStarted => {}
            BuilderState::Done => return Err(EngineError::AlreadyFinalized),
            _ => {
                return Err(EngineError::InvalidTransition {
                    operation: "start",
                    state: self.state.name(),
                });
            }
        }

        let cap = self.registry.instantiate(&self.config.cap, &mut self.structure)?;
        self.structure.attach(self.root, cap, None)?;
        self.open_port = Some(self.structure.get_port(cap, &self.config.cap_port)?);
        self.state = BuilderState::BuildingChain {
            remaining: self.config.chain_length,
        };
        debug!(cap = %self.config.cap, "Placed front cap.");
        Ok(())
    }

    /// Instantiates one repeat unit and fuses it onto the last open port.
    pub fn add_unit(&mut self) -> Result<FragmentId, EngineError> {
        let remaining = match self.state {
            BuilderState::BuildingChain { remaining } if remaining > 0 => remaining,
            BuilderState::Done => return Err(EngineError::AlreadyFinalized),
            _ => {
                return Err(EngineError::InvalidTransition {
                    operation: "add_unit",
                    state: self.state.name(),
                });
            }
        };

        let target = self
            .open_port
            .ok_or_else(|| EngineError::Internal("chain has no open port to grow from".into()))?;
        let unit = self
            .registry
            .instantiate(&self.config.unit, &mut self.structure)?;
        let moving = self.structure.get_port(unit, &self.config.unit_top_port)?;

        fuse(&mut self.structure, moving, target, self.config.gap_policy)?;

        self.open_port = Some(
            self.structure
                .get_port(unit, &self.config.unit_bottom_port)?,
        );
        self.units.push(unit);
        self.state = BuilderState::BuildingChain {
            remaining: remaining - 1,
        };
        debug!(
            unit = %self.config.unit,
            placed = self.units.len(),
            total = self.config.chain_length,
            "Fused repeat unit onto chain."
        );
        Ok(unit)
    }

    /// Fuses the terminal cap onto the last open port.
    pub fn cap_end(&mut self) -> Result<(), EngineError> {
        match self.state {
            BuilderState::BuildingChain { remaining: 0 } => {}
            BuilderState::Done => return Err(EngineError::AlreadyFinalized),
            _ => {
                return Err(EngineError::InvalidTransition {
                    operation: "cap_end",
                    state: self.state.name(),
                });
            }
        }

        let target = self
            .open_port
            .ok_or_else(|| EngineError::Internal("chain has no open port to cap".into()))?;
        let cap = self.registry.instantiate(&self.config.cap, &mut self.structure)?;
        let moving = self.structure.get_port(cap, &self.config.cap_port)?;

        fuse(&mut self.structure, moving, target, self.config.gap_policy)?;

        self.open_port = None;
        self.state = BuilderState::Capped;
        debug!(cap = %self.config.cap, "Placed terminal cap.");
        Ok(())
    }

    /// Seals the build; the structure is read-only afterwards.
    pub fn finalize(&mut self) -> Result<(), EngineError> {
        match self.state {
            BuilderState::Capped => {}
            BuilderState::Done => return Err(EngineError::AlreadyFinalized),
            _ => {
                return Err(EngineError::InvalidTransition {
                    operation: "finalize",
                    state: self.state.name(),
                });
            }
        }

        self.state = BuilderState::Done;
        info!(
            units = self.units.len(),
            particles = self.structure.particles_of(self.root).count(),
            "Chain assembly finalized."
        );
        Ok(())
    }

    /// Consumes the builder and hands over the finished assembly.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the builder has reached `Done`.
    pub fn into_result(self) -> Result<ChainAssembly, EngineError> {
        if self.state != BuilderState::Done {
            return Err(EngineError::InvalidTransition {
                operation: "into_result",
                state: self.state.name(),
            });
        }
        Ok(ChainAssembly {
            structure: self.structure,
            root: self.root,
            units: self.units,
        })
    }
}
