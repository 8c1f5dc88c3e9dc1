//! Host-side typed buffer mirror for the Vireo named-state runtime.
//!
//! A [`TypedBufferMirror`] is the host-addressable twin of one block's
//! device field: one flat f32 slot buffer per declared attribute, each
//! with an element type and inclusive [min, max] bound. It is the
//! authority for randomization and every vector codec; the device field
//! is the authority for computation. The two are bridged only by the
//! bulk [`get_data`](TypedBufferMirror::get_data) /
//! [`set_data`](TypedBufferMirror::set_data) pair.
//!
//! # Write discipline
//!
//! - Bulk `set_data` copies device snapshots verbatim — no clamping, so
//!   a readback never alters what a kernel wrote.
//! - Vector codecs quantize to the attribute's host scalar but do not
//!   clamp, keeping `from_vector(to_vector())` an exact identity.
//! - Point and row/column writes (the external-protocol write path)
//!   quantize **and** clamp to the declared bound.
//!
//! Every codec length-checks the supplied vector against the addressed
//! region before touching any buffer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod mirror;

pub use mirror::TypedBufferMirror;
