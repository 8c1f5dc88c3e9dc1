//! Error types for the Vireo named-state runtime.
//!
//! Two enums, organized by the layer that detects them: [`SpecError`]
//! for declaration-time failures (registry and block construction) and
//! [`AccessError`] for access-time failures (codecs, point access,
//! device/host sync).
//!
//! Every error carries a stable [`category`](SpecError::category) label
//! used by the registry and block layers to emit a categorized
//! diagnostic before propagating. No error is retried anywhere in the
//! runtime; these are configuration and programming errors, not
//! transient faults.

use std::error::Error;
use std::fmt;

use crate::elem::ElemType;

/// Errors detected when declaring a block or validating its spec.
#[derive(Clone, Debug, PartialEq)]
pub enum SpecError {
    /// A block with this name is already registered.
    DuplicateName {
        /// The colliding block name.
        name: String,
    },
    /// The name is reserved for the registry's own size ledger.
    ReservedName {
        /// The rejected name.
        name: String,
    },
    /// The schema, shape, or flags are malformed.
    InvalidSpec {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// An attribute's declared element type has no host-side equivalent,
    /// or the device backend cannot allocate it.
    UnsupportedType {
        /// The offending attribute name.
        attr: String,
        /// The declared element type.
        elem: ElemType,
    },
    /// A reference to a block name that was never declared.
    UnknownName {
        /// The unresolved name.
        name: String,
    },
}

impl SpecError {
    /// Stable category label for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::DuplicateName { .. } => "duplicate-name",
            Self::ReservedName { .. } | Self::InvalidSpec { .. } => "invalid-spec",
            Self::UnsupportedType { .. } => "unsupported-type",
            Self::UnknownName { .. } => "unknown-name",
        }
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "state '{name}' is already declared"),
            Self::ReservedName { name } => write!(f, "'{name}' is a reserved name"),
            Self::InvalidSpec { reason } => write!(f, "invalid state spec: {reason}"),
            Self::UnsupportedType { attr, elem } => {
                write!(f, "attribute '{attr}' has unsupported element type {elem}")
            }
            Self::UnknownName { name } => write!(f, "unknown state '{name}'"),
        }
    }
}

impl Error for SpecError {}

/// Errors detected while accessing block data.
#[derive(Clone, Debug, PartialEq)]
pub enum AccessError {
    /// A supplied vector's length does not equal the addressed region's size.
    ///
    /// Checked before any write reaches the host mirror or device field.
    SizeMismatch {
        /// Size of the addressed region.
        expected: usize,
        /// Length of the supplied vector.
        actual: usize,
    },
    /// Host mirror and device field layouts disagree.
    ///
    /// Should not occur given the construction invariants; checked on
    /// every sync anyway.
    ShapeMismatch {
        /// Description of the disagreement.
        reason: String,
    },
    /// A reference to a block or attribute that was never declared.
    UnknownName {
        /// The unresolved name.
        name: String,
    },
    /// A coordinate is outside the block's shape.
    OutOfBounds {
        /// The offending coordinate.
        index: Vec<i32>,
    },
    /// A slice specification does not resolve against the block's shape.
    BadSlice {
        /// Description of the problem.
        reason: String,
    },
}

impl AccessError {
    /// Stable category label for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::SizeMismatch { .. } => "size-mismatch",
            Self::ShapeMismatch { .. } => "shape-mismatch",
            Self::UnknownName { .. } => "unknown-name",
            Self::OutOfBounds { .. } | Self::BadSlice { .. } => "invalid-spec",
        }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "vector length {actual} != addressed region size {expected}")
            }
            Self::ShapeMismatch { reason } => {
                write!(f, "host/device layout disagreement: {reason}")
            }
            Self::UnknownName { name } => write!(f, "unknown name '{name}'"),
            Self::OutOfBounds { index } => write!(f, "coordinate {index:?} out of bounds"),
            Self::BadSlice { reason } => write!(f, "bad slice: {reason}"),
        }
    }
}

impl Error for AccessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_stable() {
        let e = SpecError::ReservedName { name: "size".into() };
        assert_eq!(e.category(), "invalid-spec");
        let e = AccessError::SizeMismatch { expected: 8, actual: 3 };
        assert_eq!(e.category(), "size-mismatch");
        let e = AccessError::UnknownName { name: "z".into() };
        assert_eq!(e.category(), "unknown-name");
    }

    #[test]
    fn display_names_the_offender() {
        let e = SpecError::DuplicateName { name: "flock".into() };
        assert!(e.to_string().contains("flock"));
        let e = AccessError::SizeMismatch { expected: 4, actual: 3 };
        assert!(e.to_string().contains('4'));
        assert!(e.to_string().contains('3'));
    }
}
