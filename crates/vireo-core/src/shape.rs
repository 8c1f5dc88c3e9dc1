//! Block shapes: how many structured instances a block holds.

use smallvec::SmallVec;
use std::fmt;

use crate::error::SpecError;

/// One-or-more-dimensional extent of a state block.
///
/// A scalar block has shape `(1,)`; a per-entity block has shape `(n,)`;
/// a matrix block (the only shape with row/column point access) has
/// shape `(rows, cols)`. `SmallVec<[usize; 2]>` keeps the common cases
/// off the heap. Shapes are validated once at block construction and
/// never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; 2]>,
}

impl Shape {
    /// Build a shape from explicit dimensions.
    ///
    /// Fails with [`SpecError::InvalidSpec`] on an empty dimension list
    /// or any zero extent.
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Result<Self, SpecError> {
        let dims: SmallVec<[usize; 2]> = dims.into_iter().collect();
        if dims.is_empty() {
            return Err(SpecError::InvalidSpec {
                reason: "shape must have at least one dimension".into(),
            });
        }
        if dims.iter().any(|&d| d == 0) {
            return Err(SpecError::InvalidSpec {
                reason: format!("shape {dims:?} has a zero extent"),
            });
        }
        Ok(Self { dims })
    }

    /// The scalar-block shape `(1,)`, the default when none is given.
    pub fn scalar() -> Self {
        Self {
            dims: SmallVec::from_slice(&[1]),
        }
    }

    /// The dimensions, outermost first.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of structured instances.
    pub fn instance_count(&self) -> usize {
        self.dims.iter().product()
    }

    /// Whether this is a two-dimensional shape with row/column access.
    pub fn is_matrix(&self) -> bool {
        self.dims.len() == 2
    }

    /// Row count of a matrix shape.
    pub fn rows(&self) -> Option<usize> {
        self.is_matrix().then(|| self.dims[0])
    }

    /// Column count of a matrix shape.
    pub fn cols(&self) -> Option<usize> {
        self.is_matrix().then(|| self.dims[1])
    }

    /// Row-major flat rank of a coordinate, or `None` if the coordinate's
    /// dimensionality or extents do not match.
    pub fn rank_of(&self, coord: &[usize]) -> Option<usize> {
        if coord.len() != self.dims.len() {
            return None;
        }
        let mut rank = 0usize;
        for (c, d) in coord.iter().zip(self.dims.iter()) {
            if c >= d {
                return None;
            }
            rank = rank * d + c;
        }
        Some(rank)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn scalar_shape_holds_one_instance() {
        let s = Shape::scalar();
        assert_eq!(s.instance_count(), 1);
        assert!(!s.is_matrix());
    }

    #[test]
    fn zero_extent_rejected() {
        assert!(Shape::new([4, 0]).is_err());
        assert!(Shape::new([]).is_err());
    }

    #[test]
    fn matrix_rows_cols() {
        let s = Shape::new([3, 5]).unwrap();
        assert!(s.is_matrix());
        assert_eq!(s.rows(), Some(3));
        assert_eq!(s.cols(), Some(5));
        assert_eq!(s.instance_count(), 15);
    }

    #[test]
    fn rank_of_rejects_bad_coords() {
        let s = Shape::new([3, 5]).unwrap();
        assert_eq!(s.rank_of(&[2, 4]), Some(14));
        assert_eq!(s.rank_of(&[3, 0]), None);
        assert_eq!(s.rank_of(&[1]), None);
    }

    proptest! {
        #[test]
        fn rank_is_bijective_over_matrix(rows in 1usize..8, cols in 1usize..8) {
            let s = Shape::new([rows, cols]).unwrap();
            let mut seen = vec![false; rows * cols];
            for r in 0..rows {
                for c in 0..cols {
                    let rank = s.rank_of(&[r, c]).unwrap();
                    prop_assert!(rank < rows * cols);
                    prop_assert!(!seen[rank]);
                    seen[rank] = true;
                }
            }
            prop_assert!(seen.iter().all(|&v| v));
        }
    }
}
