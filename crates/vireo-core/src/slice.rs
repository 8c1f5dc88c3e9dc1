//! Slice specifications and their compiled instance plans.
//!
//! A [`SliceSpec`] denotes a start/stop/step range per shape dimension.
//! It is resolved against a concrete [`Shape`] into a [`SlicePlan`] —
//! the flat instance ranks the slice addresses, in row-major order —
//! before any data is touched, so a malformed slice fails without
//! mutating anything.

use smallvec::SmallVec;

use crate::error::AccessError;
use crate::shape::Shape;

/// Half-open range with stride over one shape dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DimRange {
    /// First index (inclusive).
    pub start: usize,
    /// End index (exclusive).
    pub stop: usize,
    /// Stride between addressed indices; must be nonzero.
    pub step: usize,
}

impl DimRange {
    /// Range covering `0..stop` with step 1.
    pub fn to(stop: usize) -> Self {
        Self {
            start: 0,
            stop,
            step: 1,
        }
    }

    /// Range covering `start..stop` with step 1.
    pub fn span(start: usize, stop: usize) -> Self {
        Self { start, stop, step: 1 }
    }

    fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (self.start..self.stop).step_by(self.step)
    }

    fn count(&self) -> usize {
        if self.start >= self.stop {
            0
        } else {
            (self.stop - self.start).div_ceil(self.step)
        }
    }
}

/// Per-dimension slice of a block's instances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceSpec {
    ranges: SmallVec<[DimRange; 2]>,
}

impl SliceSpec {
    /// Build a slice from one range per shape dimension.
    pub fn new(ranges: impl IntoIterator<Item = DimRange>) -> Self {
        Self {
            ranges: ranges.into_iter().collect(),
        }
    }

    /// The per-dimension ranges.
    pub fn ranges(&self) -> &[DimRange] {
        &self.ranges
    }

    /// Resolve against a shape into the flat instance ranks addressed.
    ///
    /// Fails with [`AccessError::BadSlice`] when the dimensionality does
    /// not match the shape, a step is zero, a range is inverted or empty,
    /// or a stop exceeds the dimension extent.
    pub fn resolve(&self, shape: &Shape) -> Result<SlicePlan, AccessError> {
        let dims = shape.dims();
        if self.ranges.len() != dims.len() {
            return Err(AccessError::BadSlice {
                reason: format!(
                    "slice has {} dimension(s), shape {shape} has {}",
                    self.ranges.len(),
                    dims.len()
                ),
            });
        }
        for (range, &extent) in self.ranges.iter().zip(dims.iter()) {
            if range.step == 0 {
                return Err(AccessError::BadSlice {
                    reason: "step must be nonzero".into(),
                });
            }
            if range.start >= range.stop {
                return Err(AccessError::BadSlice {
                    reason: format!("empty range {}..{}", range.start, range.stop),
                });
            }
            if range.stop > extent {
                return Err(AccessError::BadSlice {
                    reason: format!("stop {} exceeds extent {extent}", range.stop),
                });
            }
        }

        let expected: usize = self.ranges.iter().map(DimRange::count).product();
        let mut ranks = Vec::with_capacity(expected);
        let mut coord: SmallVec<[usize; 2]> = SmallVec::new();
        Self::walk(&self.ranges, dims, &mut coord, shape, &mut ranks);
        Ok(SlicePlan {
            instance_count: ranks.len(),
            ranks,
        })
    }

    fn walk(
        ranges: &[DimRange],
        dims: &[usize],
        coord: &mut SmallVec<[usize; 2]>,
        shape: &Shape,
        out: &mut Vec<usize>,
    ) {
        if ranges.is_empty() {
            // Validated against extents above, so rank_of cannot fail.
            if let Some(rank) = shape.rank_of(coord) {
                out.push(rank);
            }
            return;
        }
        for i in ranges[0].indices() {
            coord.push(i);
            Self::walk(&ranges[1..], &dims[1..], coord, shape, out);
            coord.pop();
        }
    }
}

/// Compiled slice: the flat instance ranks a [`SliceSpec`] addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlicePlan {
    /// Addressed instance ranks in row-major order.
    pub ranks: Vec<usize>,
    /// Number of addressed instances.
    pub instance_count: usize,
}
