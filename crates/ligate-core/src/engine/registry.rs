use super::error::EngineError;
use crate::core::models::ids::FragmentId;
use crate::core::models::particle::Particle;
use crate::core::models::structure::Structure;
use crate::core::models::topology::BondOrder;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid fragment template '{name}': {message}")]
    InvalidTemplate { name: String, message: String },

    #[error("A fragment named '{name}' is already registered")]
    DuplicateName { name: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateParticle {
    pub name: String,
    pub element: String,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateBond {
    /// Endpoint particle indices into the template's particle list.
    pub atoms: [usize; 2],
    #[serde(default)]
    pub order: BondOrder,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplatePort {
    pub label: String,
    /// Anchor particle index into the template's particle list.
    pub anchor: usize,
    pub direction: [f64; 3],
    pub separation: f64,
}

/// A declarative, reusable fragment description.
///
/// Templates carry local particle coordinates, internal bonds, and port
/// definitions; instantiation stamps a fresh, independent fragment into a
/// structure each time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FragmentTemplate {
    pub name: String,
    pub particles: Vec<TemplateParticle>,
    #[serde(default)]
    pub bonds: Vec<TemplateBond>,
    #[serde(default)]
    pub ports: Vec<TemplatePort>,
}

impl FragmentTemplate {
    fn validate(&self) -> Result<(), RegistryError> {
        let invalid = |message: String| RegistryError::InvalidTemplate {
            name: self.name.clone(),
            message,
        };

        if self.particles.is_empty() {
            return Err(invalid("template defines no particles".to_string()));
        }
        for bond in &self.bonds {
            let [a, b] = bond.atoms;
            if a >= self.particles.len() || b >= self.particles.len() {
                return Err(invalid(format!("bond [{a}, {b}] is out of range")));
            }
            if a == b {
                return Err(invalid(format!("bond [{a}, {b}] is a self-bond")));
            }
        }
        let mut seen = std::collections::HashSet::new();
        for port in &self.ports {
            if port.anchor >= self.particles.len() {
                return Err(invalid(format!(
                    "port '{}' anchor {} is out of range",
                    port.label, port.anchor
                )));
            }
            if !seen.insert(port.label.as_str()) {
                return Err(invalid(format!("duplicate port label '{}'", port.label)));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateFile {
    fragments: Vec<FragmentTemplate>,
}

/// A factory producing a fresh root fragment inside the given structure.
pub type FragmentFactory = Box<dyn Fn(&mut Structure) -> Result<FragmentId, EngineError>>;

enum Entry {
    Template(FragmentTemplate),
    Factory(FragmentFactory),
}

/// A registry of named fragment factories.
///
/// The ambient "chemistry library" of fragment-assembly tutorials is modeled
/// as this explicit registry: declarative templates loaded from TOML files,
/// plus programmatic factories for fragments delivered by external sources.
/// Builders receive the registry explicitly; there is no global state.
#[derive(Default)]
pub struct FragmentRegistry {
    entries: HashMap<String, Entry>,
}

impl std::fmt::Debug for FragmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentRegistry")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads all templates from a TOML file into a new registry.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: TemplateFile = toml::from_str(&content).map_err(|e| RegistryError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut registry = Self::new();
        for template in file.fragments {
            registry.register_template(template)?;
        }
        debug!(path = %path.display(), count = registry.entries.len(), "Loaded fragment templates.");
        Ok(registry)
    }

    pub fn register_template(&mut self, template: FragmentTemplate) -> Result<(), RegistryError> {
        template.validate()?;
        let name = template.name.clone();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        self.entries.insert(name, Entry::Template(template));
        Ok(())
    }

    pub fn register_factory(
        &mut self,
        name: &str,
        factory: FragmentFactory,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            });
        }
        self.entries.insert(name.to_string(), Entry::Factory(factory));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Stamps a fresh instance of the named fragment into `structure`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownFragment`] for unregistered names.
    pub fn instantiate(
        &self,
        name: &str,
        structure: &mut Structure,
    ) -> Result<FragmentId, EngineError> {
        match self.entries.get(name) {
            Some(Entry::Template(template)) => instantiate_template(template, structure),
            Some(Entry::Factory(factory)) => factory(structure),
            None => Err(EngineError::UnknownFragment {
                name: name.to_string(),
            }),
        }
    }
}

fn instantiate_template(
    template: &FragmentTemplate,
    structure: &mut Structure,
) -> Result<FragmentId, EngineError> {
    let fragment = structure.new_fragment(&template.name);

    let mut particle_ids = Vec::with_capacity(template.particles.len());
    for particle in &template.particles {
        let [x, y, z] = particle.position;
        let label = format!("{}[$]", particle.name);
        let id = structure.add_particle(
            fragment,
            Particle::new(&particle.name, &particle.element, Point3::new(x, y, z)),
            Some(&label),
        )?;
        particle_ids.push(id);
    }

    for bond in &template.bonds {
        let [a, b] = bond.atoms;
        structure.add_bond(particle_ids[a], particle_ids[b], bond.order)?;
    }

    for port in &template.ports {
        let [x, y, z] = port.direction;
        structure.add_port(
            fragment,
            &port.label,
            particle_ids[port.anchor],
            Vector3::new(x, y, z),
            port.separation,
        )?;
    }

    Ok(fragment)
}
