//! Named state blocks, registry, and accessor generation.
//!
//! This crate is the core of the Vireo runtime. A [`StateBlock`] owns
//! one named, schema-defined structured state: a device-resident field
//! (authoritative for computation), a host mirror (authoritative for
//! vector codecs and external access), and the accessors generated for
//! the external control protocols. A [`StateRegistry`] owns all blocks
//! in a session, enforcing unique names and maintaining the total
//! scalar size ledger.
//!
//! # Consistency discipline
//!
//! The device field and host mirror are never assumed consistent.
//! There is no dirty flag: every operation that reads performs
//! [`sync_from_device`](StateBlock::sync_from_device) first, and every
//! operation that writes performs
//! [`sync_to_device`](StateBlock::sync_to_device) afterwards, so device
//! state is authoritative at every call boundary. Implementors of new
//! operations must follow the same rule.
//!
//! # Concurrency
//!
//! Single-threaded cooperative: the surrounding runtime serializes all
//! access to a block, including inbound protocol events. Generated
//! handlers share the block through `Rc<RefCell<_>>`; nothing locks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod accessors;
mod block;
mod persist;
mod registry;

pub use block::{AttrExtension, BlockSpec, StateBlock};
pub use persist::PersistError;
pub use registry::{RegistryConfig, StateRegistry};
