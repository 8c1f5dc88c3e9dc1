//! Vireo: named state blocks for interactive real-time simulations.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Vireo sub-crates. For most users, adding `vireo` as a
//! single dependency is sufficient.
//!
//! A [`state::StateBlock`] owns one named, schema-defined piece of
//! simulation state: a device-resident field for computation and a host
//! mirror for vector codecs and external access. A
//! [`state::StateRegistry`] owns every block in a session under unique
//! names and maintains the total scalar size ledger that downstream
//! learning layers size themselves against.
//!
//! # Quick start
//!
//! ```rust
//! use vireo::prelude::*;
//!
//! // Two bounded float attributes per boid, 64 boids.
//! let schema = Schema::new()
//!     .with("x", AttrDef::new(ElemType::F32, -1.0, 1.0))?
//!     .with("y", AttrDef::new(ElemType::F32, -1.0, 1.0))?;
//! let spec = BlockSpec::new(schema).shape(Shape::new([64])?);
//!
//! let mut registry = StateRegistry::new(RegistryConfig::new(Box::new(CpuBackend::new())));
//! registry.declare("flock", spec)?;
//!
//! // Blocks randomize in-bounds at creation; the whole block round-trips
//! // through a flat vector.
//! let flock = registry.block("flock").unwrap();
//! let snapshot = flock.to_vector()?;
//! assert_eq!(snapshot.len(), 128);
//! assert_eq!(registry.total_size(), 128);
//! flock.from_vector(&snapshot)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `vireo-core` | Schemas, shapes, slices, routes, errors, protocol traits |
//! | [`mirror`] | `vireo-mirror` | The typed host mirror and its codecs |
//! | [`device`] | `vireo-device` | Device backend traits and the CPU backend |
//! | [`state`] | `vireo-state` | Blocks, the registry, accessor generation, persistence |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Schemas, shapes, slices, routes, and errors (`vireo-core`).
///
/// Contains the declaration vocabulary ([`types::Schema`],
/// [`types::AttrDef`], [`types::Shape`], [`types::SliceSpec`]), the
/// error taxonomy ([`types::SpecError`], [`types::AccessError`]), and
/// the protocol boundary traits ([`types::MappingLayer`],
/// [`types::RoutingLayer`]).
pub use vireo_core as types;

/// The typed host mirror (`vireo-mirror`).
///
/// [`mirror::TypedBufferMirror`] holds the host copy of a block and
/// implements every vector codec and positional accessor.
pub use vireo_mirror as mirror;

/// Device backends (`vireo-device`).
///
/// The [`device::Backend`] and [`device::DeviceField`] traits, plus
/// [`device::CpuBackend`] for tests and host-only sessions.
pub use vireo_device as device;

/// Blocks, registry, accessor generation, and persistence
/// (`vireo-state`).
///
/// [`state::StateBlock`] and [`state::StateRegistry`] are the types
/// most applications interact with.
pub use vireo_state as state;

/// Common imports for typical Vireo usage.
///
/// ```rust
/// use vireo::prelude::*;
/// ```
pub mod prelude {
    // Declarations
    pub use vireo_core::{Access, AccessFlags, AttrDef, ElemType, Schema, Shape, SliceSpec};

    // Errors
    pub use vireo_core::{AccessError, SpecError};

    // Protocol boundaries
    pub use vireo_core::{MappingLayer, Reply, ReplyArg, RouteBinding, RoutingLayer};

    // Backends
    pub use vireo_device::{Backend, CpuBackend};

    // Blocks and registry
    pub use vireo_state::{
        AttrExtension, BlockSpec, PersistError, RegistryConfig, StateBlock, StateRegistry,
    };
}
