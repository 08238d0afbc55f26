use super::flat::{FlatBond, FlatParticle, FlatStructure};
use super::fragment::{Entity, Fragment};
use super::ids::{FragmentId, ParticleId, PortId};
use super::particle::Particle;
use super::port::Port;
use super::topology::{Bond, BondOrder};
use crate::core::utils::geometry::{DIRECTION_EPSILON, RigidTransform};
use nalgebra::Vector3;
use slotmap::{SecondaryMap, SlotMap};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum StructureError {
    #[error("Fragment not found in structure")]
    FragmentNotFound,

    #[error("Particle not found in structure")]
    ParticleNotFound,

    #[error("Port not found in structure")]
    PortNotFound,

    #[error("No port labeled '{label}' in fragment '{fragment}'")]
    LabelNotFound { fragment: String, label: String },

    #[error("Label '{label}' already exists in fragment '{fragment}'")]
    DuplicateLabel { fragment: String, label: String },

    #[error("Attaching '{child}' under '{parent}' would close a cycle")]
    Cycle { parent: String, child: String },

    #[error("Fragment '{fragment}' already has a parent and cannot be re-attached")]
    NotARoot { fragment: String },

    #[error("Anchor particle is outside the subtree of fragment '{fragment}'")]
    AnchorOutsideFragment { fragment: String },
}

/// The arena owning every fragment, particle, port, and bond of one build.
///
/// This struct is the central data structure for fragment assembly. Fragments
/// form a forest of rooted trees (one tree per unfused top-level fragment);
/// fusing re-parents one root under another until a single tree remains.
/// The arena assumes exclusive single-writer access while a build is in
/// progress; once the builder finalizes, the structure is treated as
/// read-only and may be shared freely for traversal.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Primary storage for fragment nodes.
    fragments: SlotMap<FragmentId, Fragment>,
    /// Primary storage for particles.
    particles: SlotMap<ParticleId, Particle>,
    /// Primary storage for ports.
    ports: SlotMap<PortId, Port>,
    /// List of all bonds in the structure.
    bonds: Vec<Bond>,
    /// Cached adjacency list for bond connectivity, indexed by particle ID.
    bond_adjacency: SecondaryMap<ParticleId, Vec<ParticleId>>,
    /// Fragments without a parent, in creation order.
    roots: Vec<FragmentId>,
}

impl Structure {
    /// Creates a new, empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new, empty root fragment.
    pub fn new_fragment(&mut self, name: &str) -> FragmentId {
        let id = self.fragments.insert(Fragment::new(name));
        self.roots.push(id);
        id
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id)
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    pub(crate) fn port_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.ports.get_mut(id)
    }

    /// Returns a slice of all bonds in the structure.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Fragments currently without a parent, in creation order.
    pub fn roots(&self) -> &[FragmentId] {
        &self.roots
    }

    /// Walks parent links up to the root of the tree containing `fragment`.
    pub fn root_of(&self, fragment: FragmentId) -> FragmentId {
        let mut current = fragment;
        while let Some(parent) = self.fragments[current].parent {
            current = parent;
        }
        current
    }

    /// Adds a particle to a fragment, optionally binding it to a label.
    ///
    /// A label ending in the `[$]` template marker receives an
    /// auto-incremented suffix unique within the fragment.
    ///
    /// # Errors
    ///
    /// Returns `FragmentNotFound` for a missing fragment and `DuplicateLabel`
    /// if an explicit label is already taken.
    pub fn add_particle(
        &mut self,
        fragment: FragmentId,
        particle: Particle,
        label: Option<&str>,
    ) -> Result<ParticleId, StructureError> {
        if !self.fragments.contains_key(fragment) {
            return Err(StructureError::FragmentNotFound);
        }

        let particle_id = self.particles.insert(particle);
        self.bond_adjacency.insert(particle_id, Vec::new());

        if let Some(label) = label {
            let bind = self
                .fragments
                .get_mut(fragment)
                .unwrap()
                .bind_label(label, Entity::Particle(particle_id));
            if let Err(e) = bind {
                self.particles.remove(particle_id);
                self.bond_adjacency.remove(particle_id);
                return Err(e);
            }
        }

        self.fragments
            .get_mut(fragment)
            .unwrap()
            .particles
            .push(particle_id);
        Ok(particle_id)
    }

    /// Re-parents the root fragment `child` under `parent`.
    ///
    /// Without an explicit label the child is bound as `"<name>[$]"`, so
    /// repeated attachments of the same kind number themselves. Returns the
    /// resolved label.
    ///
    /// # Errors
    ///
    /// Returns `NotARoot` if `child` already has a parent and `Cycle` if
    /// `child` is an ancestor of `parent`.
    pub fn attach(
        &mut self,
        parent: FragmentId,
        child: FragmentId,
        label: Option<&str>,
    ) -> Result<String, StructureError> {
        if !self.fragments.contains_key(parent) || !self.fragments.contains_key(child) {
            return Err(StructureError::FragmentNotFound);
        }
        if self.fragments[child].parent.is_some() {
            return Err(StructureError::NotARoot {
                fragment: self.fragments[child].name.clone(),
            });
        }
        if self.root_of(parent) == child {
            return Err(StructureError::Cycle {
                parent: self.fragments[parent].name.clone(),
                child: self.fragments[child].name.clone(),
            });
        }

        let template = match label {
            Some(label) => label.to_string(),
            None => format!("{}[$]", self.fragments[child].name),
        };
        let resolved = self
            .fragments
            .get_mut(parent)
            .unwrap()
            .bind_label(&template, Entity::Fragment(child))?;

        self.fragments.get_mut(parent).unwrap().children.push(child);
        self.fragments.get_mut(child).unwrap().parent = Some(parent);
        self.roots.retain(|&id| id != child);
        Ok(resolved)
    }

    /// Creates a port on `fragment`, keyed to `anchor`.
    ///
    /// The anchor must be a particle inside the fragment's subtree. A
    /// near-zero direction is accepted with a degenerate-geometry warning;
    /// the alignment engine substitutes a stable fallback axis when fusing.
    pub fn add_port(
        &mut self,
        fragment: FragmentId,
        label: &str,
        anchor: ParticleId,
        direction: Vector3<f64>,
        separation: f64,
    ) -> Result<PortId, StructureError> {
        if !self.fragments.contains_key(fragment) {
            return Err(StructureError::FragmentNotFound);
        }
        if !self.particles.contains_key(anchor) {
            return Err(StructureError::ParticleNotFound);
        }
        if !self.particles_of(fragment).any(|(id, _)| id == anchor) {
            return Err(StructureError::AnchorOutsideFragment {
                fragment: self.fragments[fragment].name.clone(),
            });
        }
        if direction.norm() < DIRECTION_EPSILON {
            warn!(
                fragment = %self.fragments[fragment].name,
                label,
                "Port direction is near zero length; alignment will fall back to an arbitrary axis."
            );
        }

        let port_id = self
            .ports
            .insert(Port::new(label, fragment, anchor, direction, separation));
        match self
            .fragments
            .get_mut(fragment)
            .unwrap()
            .bind_label(label, Entity::Port(port_id))
        {
            Ok(resolved) => self.ports[port_id].label = resolved,
            Err(e) => {
                self.ports.remove(port_id);
                return Err(e);
            }
        }
        self.fragments.get_mut(fragment).unwrap().ports.push(port_id);
        Ok(port_id)
    }

    /// Resolves a port by its label on `fragment`.
    ///
    /// # Errors
    ///
    /// Returns `LabelNotFound` if the label is absent or names a non-port
    /// entity.
    pub fn get_port(&self, fragment: FragmentId, label: &str) -> Result<PortId, StructureError> {
        let node = self
            .fragments
            .get(fragment)
            .ok_or(StructureError::FragmentNotFound)?;
        match node.label(label) {
            Some(Entity::Port(id)) => Ok(*id),
            _ => Err(StructureError::LabelNotFound {
                fragment: node.name.clone(),
                label: label.to_string(),
            }),
        }
    }

    /// Iterates every particle in the subtree of `fragment`.
    ///
    /// Depth-first, a fragment's own particles before its children, children
    /// in insertion order. Every call starts a fresh traversal; iterators
    /// share no cursor state. An unknown fragment yields an empty sequence.
    pub fn particles_of(&self, fragment: FragmentId) -> Particles<'_> {
        const EMPTY: &[ParticleId] = &[];
        let pending = if self.fragments.contains_key(fragment) {
            vec![fragment]
        } else {
            Vec::new()
        };
        Particles {
            structure: self,
            pending,
            current: EMPTY.iter(),
        }
    }

    /// Available ports in the subtree of `fragment`, in traversal order.
    pub fn open_ports(&self, fragment: FragmentId) -> Vec<PortId> {
        let mut result = Vec::new();
        let mut stack = if self.fragments.contains_key(fragment) {
            vec![fragment]
        } else {
            Vec::new()
        };
        while let Some(id) = stack.pop() {
            let node = &self.fragments[id];
            result.extend(
                node.ports
                    .iter()
                    .copied()
                    .filter(|&port_id| self.ports[port_id].is_available()),
            );
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Applies a rigid motion to the subtree of `fragment`.
    ///
    /// Rewrites every owned particle position and every held port direction
    /// in the new frame, visiting each exactly once.
    pub fn apply_transform(
        &mut self,
        fragment: FragmentId,
        transform: &RigidTransform,
    ) -> Result<(), StructureError> {
        if !self.fragments.contains_key(fragment) {
            return Err(StructureError::FragmentNotFound);
        }
        let mut stack = vec![fragment];
        while let Some(id) = stack.pop() {
            let (particle_ids, port_ids, children) = {
                let node = &self.fragments[id];
                (
                    node.particles.clone(),
                    node.ports.clone(),
                    node.children.clone(),
                )
            };
            for particle_id in particle_ids {
                let particle = &mut self.particles[particle_id];
                particle.position = transform.transform_point(&particle.position);
            }
            for port_id in port_ids {
                let port = &mut self.ports[port_id];
                port.direction = transform.rotate_vector(&port.direction);
            }
            stack.extend(children);
        }
        Ok(())
    }

    /// Adds a bond between two particles.
    ///
    /// This method is idempotent; adding an existing bond succeeds without
    /// creating duplicates.
    pub fn add_bond(
        &mut self,
        a: ParticleId,
        b: ParticleId,
        order: BondOrder,
    ) -> Result<(), StructureError> {
        if !self.particles.contains_key(a) || !self.particles.contains_key(b) {
            return Err(StructureError::ParticleNotFound);
        }

        if let Some(neighbors) = self.bond_adjacency.get(a) {
            if neighbors.contains(&b) {
                return Ok(());
            }
        }

        self.bonds.push(Bond::new(a, b, order));
        self.bond_adjacency[a].push(b);
        self.bond_adjacency[b].push(a);
        Ok(())
    }

    /// Retrieves the bonded neighbors of a particle from the adjacency cache.
    pub fn bonded_neighbors(&self, particle_id: ParticleId) -> Option<&[ParticleId]> {
        self.bond_adjacency.get(particle_id).map(|v| v.as_slice())
    }

    /// Produces the flattened snapshot of the subtree of `fragment`.
    ///
    /// Particles appear in the same deterministic depth-first order as
    /// [`Structure::particles_of`]; bonds whose endpoints both lie inside the
    /// subtree are remapped to flat indices.
    pub fn flatten(&self, fragment: FragmentId) -> Result<FlatStructure, StructureError> {
        if !self.fragments.contains_key(fragment) {
            return Err(StructureError::FragmentNotFound);
        }

        let mut index_of: SecondaryMap<ParticleId, usize> = SecondaryMap::new();
        let mut particles = Vec::new();
        for (id, particle) in self.particles_of(fragment) {
            index_of.insert(id, particles.len());
            particles.push(FlatParticle::from_particle(particle));
        }

        let bonds = self
            .bonds
            .iter()
            .filter_map(|bond| {
                let a = *index_of.get(bond.a)?;
                let b = *index_of.get(bond.b)?;
                Some(FlatBond {
                    a,
                    b,
                    order: bond.order,
                })
            })
            .collect();

        Ok(FlatStructure { particles, bonds })
    }
}

/// Lazy depth-first particle traversal over one fragment subtree.
pub struct Particles<'a> {
    structure: &'a Structure,
    pending: Vec<FragmentId>,
    current: std::slice::Iter<'a, ParticleId>,
}

impl<'a> Iterator for Particles<'a> {
    type Item = (ParticleId, &'a Particle);

    fn next(&mut self) -> Option<Self::Item> {
        let structure = self.structure;
        loop {
            if let Some(&id) = self.current.next() {
                return Some((id, &structure.particles[id]));
            }
            let fragment = self.pending.pop()?;
            let node = &structure.fragments[fragment];
            for &child in node.children.iter().rev() {
                self.pending.push(child);
            }
            self.current = node.particles.iter();
        }
    }
}
