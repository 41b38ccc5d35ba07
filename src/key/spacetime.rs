use serde::{Deserialize, Serialize};

use super::Key;

/// A column/row coordinate with a time component (epoch milliseconds).
///
/// Time participates in the region semantics like any other axis: a
/// space-time bounds covers a spatial rectangle crossed with a time span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpaceTimeKey {
    /// Column in the layer's grid layout.
    pub col: u32,
    /// Row in the layer's grid layout.
    pub row: u32,
    /// Instant in epoch milliseconds.
    pub instant: i64,
}

impl SpaceTimeKey {
    /// Create a key at `(col, row)` observed at `instant`.
    pub fn new(col: u32, row: u32, instant: i64) -> Self {
        Self { col, row, instant }
    }

    /// The purely spatial part of the key.
    pub fn spatial(&self) -> super::SpatialKey {
        super::SpatialKey::new(self.col, self.row)
    }
}

impl Key for SpaceTimeKey {
    fn component_min(&self, other: &Self) -> Self {
        Self {
            col: self.col.min(other.col),
            row: self.row.min(other.row),
            instant: self.instant.min(other.instant),
        }
    }

    fn component_max(&self, other: &Self) -> Self {
        Self {
            col: self.col.max(other.col),
            row: self.row.max(other.row),
            instant: self.instant.max(other.instant),
        }
    }
}
