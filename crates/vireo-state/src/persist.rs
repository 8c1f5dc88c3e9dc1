//! JSON persistence for state blocks.
//!
//! A block serializes to a self-describing snapshot: its name, shape,
//! and one flat value vector per attribute in declaration order. The
//! snapshot restores only into a block with the same schema and shape;
//! anything else is a [`PersistError`].

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use vireo_core::error::AccessError;

use crate::block::StateBlock;

/// Failure to serialize or restore a block snapshot.
#[derive(Debug)]
pub enum PersistError {
    /// The snapshot text could not be encoded or decoded.
    Codec {
        /// Human-readable codec failure description.
        reason: String,
    },
    /// The snapshot decoded but did not fit the target block.
    Access(AccessError),
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Codec { reason } => write!(f, "snapshot codec error: {reason}"),
            PersistError::Access(e) => write!(f, "snapshot does not fit block: {e}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PersistError::Codec { .. } => None,
            PersistError::Access(e) => Some(e),
        }
    }
}

impl From<AccessError> for PersistError {
    fn from(e: AccessError) -> Self {
        PersistError::Access(e)
    }
}

/// One attribute's values across all instances, flat and attr-major.
#[derive(Debug, Serialize, Deserialize)]
struct AttrSnapshot {
    name: String,
    values: Vec<f32>,
}

/// A device-synchronized snapshot of one block.
#[derive(Debug, Serialize, Deserialize)]
struct BlockSnapshot {
    name: String,
    shape: Vec<usize>,
    attrs: Vec<AttrSnapshot>,
}

impl StateBlock {
    /// Serialize the block to a JSON snapshot, device-synchronized.
    pub fn serialize(&self) -> Result<String, PersistError> {
        self.sync_from_device()?;
        let mut attrs = Vec::with_capacity(self.schema().len());
        for (attr, _) in self.schema().iter() {
            attrs.push(AttrSnapshot {
                name: attr.to_string(),
                values: self.attr_to_vector(attr)?,
            });
        }
        let snapshot = BlockSnapshot {
            name: self.name().to_string(),
            shape: self.shape().dims().to_vec(),
            attrs,
        };
        serde_json::to_string(&snapshot).map_err(|e| PersistError::Codec {
            reason: e.to_string(),
        })
    }

    /// Restore the block from a JSON snapshot and push to the device.
    ///
    /// The snapshot's name, shape, and attribute set must match the
    /// block exactly; nothing is written on a mismatch.
    pub fn deserialize(&self, json: &str) -> Result<(), PersistError> {
        let snapshot: BlockSnapshot =
            serde_json::from_str(json).map_err(|e| PersistError::Codec {
                reason: e.to_string(),
            })?;
        if snapshot.name != self.name() {
            return Err(PersistError::Codec {
                reason: format!(
                    "snapshot is for '{}', block is '{}'",
                    snapshot.name,
                    self.name()
                ),
            });
        }
        if snapshot.shape != self.shape().dims() {
            return Err(PersistError::Access(AccessError::ShapeMismatch {
                reason: format!(
                    "snapshot shape {:?} does not match block shape {}",
                    snapshot.shape,
                    self.shape()
                ),
            }));
        }
        if snapshot.attrs.len() != self.schema().len() {
            return Err(PersistError::Access(AccessError::ShapeMismatch {
                reason: format!(
                    "snapshot has {} attributes, block has {}",
                    snapshot.attrs.len(),
                    self.schema().len()
                ),
            }));
        }
        for snap in &snapshot.attrs {
            let def = self.schema().get(&snap.name).ok_or_else(|| {
                PersistError::Access(AccessError::UnknownName {
                    name: snap.name.clone(),
                })
            })?;
            let expected = self.shape().instance_count() * def.slots_per_instance();
            if snap.values.len() != expected {
                return Err(PersistError::Access(AccessError::SizeMismatch {
                    expected,
                    actual: snap.values.len(),
                }));
            }
        }
        for snap in &snapshot.attrs {
            self.attr_from_vector(&snap.name, &snap.values)?;
        }
        Ok(())
    }
}
