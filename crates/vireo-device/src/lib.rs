//! Device field boundary for the Vireo named-state runtime.
//!
//! The runtime consumes a GPU compute backend through two traits:
//! [`Backend`] allocates struct-of-arrays [`DeviceField`] storage for a
//! schema bound to a shape, and a `DeviceField` moves bulk snapshots
//! across the device/host boundary via
//! [`field_from_host`](DeviceField::field_from_host) and
//! [`host_from_field`](DeviceField::host_from_field). Those two calls
//! are the only boundary crossings in the whole runtime; everything
//! else operates on the host mirror.
//!
//! [`CpuBackend`] is the reference implementation: plain per-attribute
//! slot vectors. It is what tests run against and what a session uses
//! when no GPU backend is wired in.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cpu;

pub use cpu::CpuBackend;

use vireo_core::error::{AccessError, SpecError};
use vireo_core::{ElemType, HostData, Layout, Schema, Shape};

/// Device-resident struct-of-arrays storage for one block.
///
/// Authoritative for computation: simulation kernels write it directly,
/// outside this runtime. It is never assumed consistent with the host
/// mirror; consistency exists only immediately after one of the two
/// sync calls below.
pub trait DeviceField {
    /// The per-attribute slot layout this field was allocated with.
    fn layout(&self) -> &Layout;

    /// Push a host snapshot into device storage.
    ///
    /// Fails with [`AccessError::ShapeMismatch`] if the snapshot's
    /// layout disagrees with the allocated layout.
    fn field_from_host(&mut self, data: &HostData) -> Result<(), AccessError>;

    /// Pull device storage into a host snapshot.
    ///
    /// Fails with [`AccessError::ShapeMismatch`] on layout disagreement.
    fn host_from_field(&self, data: &mut HostData) -> Result<(), AccessError>;
}

/// Allocator of device fields.
pub trait Backend {
    /// Whether this backend can allocate the given element type.
    fn supports(&self, elem: ElemType) -> bool;

    /// Allocate zero-initialized device storage for a schema bound to a
    /// shape.
    ///
    /// Fails with [`SpecError::UnsupportedType`] if any attribute's
    /// element type is not supported.
    fn allocate(&self, schema: &Schema, shape: &Shape) -> Result<Box<dyn DeviceField>, SpecError>;
}
