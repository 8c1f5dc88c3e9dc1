//! The session-wide state registry: one namespace, one size ledger.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use vireo_core::error::{AccessError, SpecError};
use vireo_core::{MappingLayer, RoutingLayer};
use vireo_device::Backend;

use crate::block::{BlockSpec, StateBlock};

/// The name reserved for the registry's own size ledger. It is an
/// integer counter, not a structured block, and can never be declared.
const RESERVED_SIZE_NAME: &str = "size";

/// Configuration for a [`StateRegistry`].
///
/// The mapping and routing layers are optional external collaborators,
/// shared with the rest of the session; blocks register their generated
/// accessors with whichever are present.
pub struct RegistryConfig {
    /// Device backend used to allocate every block's field.
    pub backend: Box<dyn Backend>,
    /// Incremental-mapping layer, if the session has one.
    pub mapping: Option<Rc<RefCell<dyn MappingLayer>>>,
    /// Message-routing layer, if the session has one.
    pub routing: Option<Rc<RefCell<dyn RoutingLayer>>>,
    /// Base seed for per-block randomization RNGs.
    pub seed: u64,
}

impl RegistryConfig {
    /// Config with the given backend, no protocol layers, seed 0.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            mapping: None,
            routing: None,
            seed: 0,
        }
    }

    /// Attach the mapping layer.
    pub fn mapping(mut self, layer: Rc<RefCell<dyn MappingLayer>>) -> Self {
        self.mapping = Some(layer);
        self
    }

    /// Attach the routing layer.
    pub fn routing(mut self, layer: Rc<RefCell<dyn RoutingLayer>>) -> Self {
        self.routing = Some(layer);
        self
    }

    /// Set the base randomization seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// The owning collection of all state blocks in a session.
///
/// Lives for the session; blocks are never removed. `total_size` is
/// updated atomically with each successful declaration, so a failed
/// declaration never perturbs the ledger.
pub struct StateRegistry {
    backend: Box<dyn Backend>,
    mapping: Option<Rc<RefCell<dyn MappingLayer>>>,
    routing: Option<Rc<RefCell<dyn RoutingLayer>>>,
    seed: u64,
    blocks: IndexMap<String, StateBlock>,
    total_size: usize,
}

impl StateRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            backend: config.backend,
            mapping: config.mapping,
            routing: config.routing,
            seed: config.seed,
            blocks: IndexMap::new(),
            total_size: 0,
        }
    }

    /// Declare a new block.
    ///
    /// Fails with [`SpecError::DuplicateName`] if the name exists, with
    /// [`SpecError::ReservedName`] for the ledger's reserved name, and
    /// with whatever the block constructor rejects. Declaration is
    /// all-or-nothing: on failure nothing is registered and the size
    /// ledger is untouched.
    pub fn declare(&mut self, name: &str, spec: BlockSpec) -> Result<&StateBlock, SpecError> {
        let result = self.try_declare(name, spec);
        match &result {
            Ok(()) => {}
            Err(e) => {
                log::warn!(
                    "[vireo.state] declare '{name}' failed: {}: {e}",
                    e.category()
                );
            }
        }
        result?;
        Ok(&self.blocks[name])
    }

    fn try_declare(&mut self, name: &str, spec: BlockSpec) -> Result<(), SpecError> {
        if name == RESERVED_SIZE_NAME {
            return Err(SpecError::ReservedName { name: name.into() });
        }
        if self.blocks.contains_key(name) {
            return Err(SpecError::DuplicateName { name: name.into() });
        }

        let mut mapping_guard = self.mapping.as_ref().map(|m| m.borrow_mut());
        let mut routing_guard = self.routing.as_ref().map(|r| r.borrow_mut());
        let block = StateBlock::new(
            name,
            spec,
            self.backend.as_ref(),
            block_seed(self.seed, name),
            mapping_guard.as_mut().map(|g| &mut **g as &mut dyn MappingLayer),
            routing_guard.as_mut().map(|g| &mut **g as &mut dyn RoutingLayer),
        )?;
        drop(mapping_guard);
        drop(routing_guard);

        self.total_size += block.size();
        log::debug!(
            "[vireo.state] declared '{name}' size={} total={}",
            block.size(),
            self.total_size
        );
        self.blocks.insert(name.to_string(), block);
        Ok(())
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Option<&StateBlock> {
        self.blocks.get(name)
    }

    /// Sum of `size` over the named blocks.
    ///
    /// Fails with [`AccessError::UnknownName`] if any name is absent;
    /// checked for every name before summing.
    pub fn size_of(&self, names: &[&str]) -> Result<usize, AccessError> {
        let mut total = 0;
        for &name in names {
            let block = self.blocks.get(name).ok_or_else(|| {
                let e = AccessError::UnknownName { name: name.into() };
                log::warn!("[vireo.state] size_of: {}: {e}", e.category());
                e
            })?;
            total += block.size();
        }
        Ok(total)
    }

    /// Partition `vector` contiguously across `names` in order and load
    /// each chunk into the corresponding block.
    ///
    /// Fails with [`AccessError::SizeMismatch`] if the blocks' total
    /// size differs from the vector's length; validated before any
    /// block is mutated.
    pub fn load_vector(&self, names: &[&str], vector: &[f32]) -> Result<(), AccessError> {
        let expected = self.size_of(names)?;
        if vector.len() != expected {
            let e = AccessError::SizeMismatch {
                expected,
                actual: vector.len(),
            };
            log::warn!("[vireo.state] load_vector: {}: {e}", e.category());
            return Err(e);
        }
        let mut offset = 0;
        for &name in names {
            // size_of above resolved every name.
            let block = self
                .blocks
                .get(name)
                .unwrap_or_else(|| unreachable!("block '{name}' vanished"));
            block.from_vector(&vector[offset..offset + block.size()])?;
            offset += block.size();
        }
        Ok(())
    }

    /// Sum of `size` over all declared blocks.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Number of declared blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks have been declared.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate blocks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StateBlock)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Per-block RNG seed: base seed mixed with the block name, so two
/// blocks declared from the same base seed randomize independently but
/// reproducibly.
fn block_seed(base: u64, name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    base ^ hasher.finish()
}
