//! Core types and traits for the Vireo named-state runtime.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Vireo workspace:
//! element types, schemas, shapes, slice specifications, route tables,
//! access capability flags, error types, and the boundary traits for
//! the external mapping and routing layers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod access;
pub mod data;
pub mod elem;
pub mod error;
pub mod proto;
pub mod route;
pub mod schema;
pub mod shape;
pub mod slice;

pub use access::{Access, AccessFlags};
pub use data::{HostData, Layout};
pub use elem::{ElemType, HostScalar};
pub use error::{AccessError, SpecError};
pub use proto::{MappingLayer, Reply, ReplyArg, RouteBinding, RouteHandler, RoutingLayer};
pub use route::{Granularity, RouteId, RouteKey, RouteScope, RouteTable};
pub use schema::{AttrDef, Schema};
pub use shape::Shape;
pub use slice::{DimRange, SlicePlan, SliceSpec};
