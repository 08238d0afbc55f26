use super::ids::{FragmentId, ParticleId, PortId};
use super::labels::{LabelAllocator, is_templated};
use super::structure::StructureError;
use std::collections::HashMap;

/// What a fragment-local label resolves to.
///
/// The tutorial-style open class hierarchy is modeled as this closed set of
/// tagged variants: a labeled entry is either a child fragment, a directly
/// owned particle, or a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Fragment(FragmentId),
    Particle(ParticleId),
    Port(PortId),
}

/// A composable tree node representing a chemical substructure.
///
/// A fragment owns (exclusively) zero or more child fragments and zero or
/// more particles, and holds a set of labeled ports. Fragments live in the
/// arena of a [`super::structure::Structure`]; the fields here record the
/// tree shape and per-fragment label table. A fragment with no children and
/// no particles is valid only transiently during construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    /// Human-readable kind name (e.g., "methylene"); not unique.
    pub name: String,
    pub(crate) parent: Option<FragmentId>,
    /// Child fragments in insertion order.
    pub(crate) children: Vec<FragmentId>,
    /// Directly owned particles in insertion order.
    pub(crate) particles: Vec<ParticleId>,
    /// Ports held by this fragment in insertion order.
    pub(crate) ports: Vec<PortId>,
    /// Resolved labels in insertion order, for deterministic iteration.
    label_order: Vec<String>,
    labels: HashMap<String, Entity>,
    allocator: LabelAllocator,
}

impl Fragment {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            particles: Vec::new(),
            ports: Vec::new(),
            label_order: Vec::new(),
            labels: HashMap::new(),
            allocator: LabelAllocator::new(),
        }
    }

    pub fn parent(&self) -> Option<FragmentId> {
        self.parent
    }

    pub fn children(&self) -> &[FragmentId] {
        &self.children
    }

    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    /// Looks up a resolved label.
    pub fn label(&self, label: &str) -> Option<&Entity> {
        self.labels.get(label)
    }

    /// Iterates labels and entities in insertion order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.label_order
            .iter()
            .map(|label| (label.as_str(), &self.labels[label]))
    }

    /// Resolves `label` (allocating an index for templated labels) and binds
    /// it to `entity`, returning the resolved label.
    ///
    /// Templated labels are advanced past any explicitly taken name, so they
    /// never collide; explicit labels collide with `DuplicateLabel`.
    pub(crate) fn bind_label(
        &mut self,
        label: &str,
        entity: Entity,
    ) -> Result<String, StructureError> {
        let resolved = if is_templated(label) {
            loop {
                let candidate = self.allocator.resolve(label);
                if !self.labels.contains_key(&candidate) {
                    break candidate;
                }
            }
        } else {
            if self.labels.contains_key(label) {
                return Err(StructureError::DuplicateLabel {
                    fragment: self.name.clone(),
                    label: label.to_string(),
                });
            }
            label.to_string()
        };

        self.labels.insert(resolved.clone(), entity);
        self.label_order.push(resolved.clone());
        Ok(resolved)
    }
}
