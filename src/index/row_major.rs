use serde::{Deserialize, Serialize};

use super::{IndexError, IndexRange, KeyIndex};
use crate::key::{InvalidBounds, KeyBounds, SpatialKey};

/// Row-major index over a declared grid layout.
///
/// Keys map to their offset within the layout: row stride times rows from
/// the layout origin, plus columns from the origin. Decomposition emits one
/// range per queried row, collapsing to a single range when the query spans
/// the layout's full width (consecutive rows are then contiguous in index
/// space).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMajorIndex {
    bounds: KeyBounds<SpatialKey>,
}

impl RowMajorIndex {
    /// Index over the layer's declared key space. A zero-extent space
    /// (`min == max`) is a valid single-point layout; a layout with more
    /// cells than `i64::MAX` cannot be addressed and is rejected.
    pub fn new(bounds: KeyBounds<SpatialKey>) -> Result<Self, IndexError> {
        let width = u128::from(bounds.max().col - bounds.min().col) + 1;
        let height = u128::from(bounds.max().row - bounds.min().row) + 1;
        let cells = width * height;
        if cells > i64::MAX as u128 {
            return Err(IndexError::LayoutOverflow { cells });
        }
        Ok(Self { bounds })
    }

    /// The declared key space.
    pub fn bounds(&self) -> &KeyBounds<SpatialKey> {
        &self.bounds
    }

    fn width(&self) -> i64 {
        i64::from(self.bounds.max().col) - i64::from(self.bounds.min().col) + 1
    }
}

impl KeyIndex<SpatialKey> for RowMajorIndex {
    fn to_index(&self, key: &SpatialKey) -> i64 {
        let origin = self.bounds.min();
        let dr = i64::from(key.row) - i64::from(origin.row);
        let dc = i64::from(key.col) - i64::from(origin.col);
        dr * self.width() + dc
    }

    fn index_ranges(&self, bounds: &KeyBounds<SpatialKey>) -> Result<Vec<IndexRange>, IndexError> {
        if !bounds.is_well_formed() {
            return Err(InvalidBounds::new(bounds.min(), bounds.max()).into());
        }
        let Some(query) = bounds.intersect(&self.bounds) else {
            return Ok(Vec::new());
        };

        let (lo, hi) = (*query.min(), *query.max());
        if lo.col == self.bounds.min().col && hi.col == self.bounds.max().col {
            // Full-width query: rows are contiguous in index space.
            return Ok(vec![IndexRange::new(self.to_index(&lo), self.to_index(&hi))]);
        }

        let ranges = (lo.row..=hi.row)
            .map(|row| {
                IndexRange::new(
                    self.to_index(&SpatialKey::new(lo.col, row)),
                    self.to_index(&SpatialKey::new(hi.col, row)),
                )
            })
            .collect();
        Ok(ranges)
    }
}
