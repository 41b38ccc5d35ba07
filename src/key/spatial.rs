use serde::{Deserialize, Serialize};

use super::Key;

/// A column/row coordinate in a tiled grid.
///
/// The derived `Ord` (column-major) is only used where a stable total
/// order is needed; region membership goes through the lattice operations
/// on [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpatialKey {
    /// Column in the layer's grid layout.
    pub col: u32,
    /// Row in the layer's grid layout.
    pub row: u32,
}

impl SpatialKey {
    /// Create a key at `(col, row)`.
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl Key for SpatialKey {
    fn component_min(&self, other: &Self) -> Self {
        Self {
            col: self.col.min(other.col),
            row: self.row.min(other.row),
        }
    }

    fn component_max(&self, other: &Self) -> Self {
        Self {
            col: self.col.max(other.col),
            row: self.row.max(other.row),
        }
    }
}
