//! Key indexing: mapping structured keys onto a one-dimensional index
//! space and decomposing region queries into scan ranges.
//!
//! A [`KeyIndex`] is chosen once per layer at write time and persisted with
//! the layer's metadata (strategy plus parameters), so reads always use the
//! exact index the writer used — it is never re-derived from the key type.
//! The merge engine in [`merge`] is index-agnostic: it only sees inclusive
//! `i64` intervals.

pub mod merge;
mod row_major;
mod zcurve;

pub use row_major::RowMajorIndex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
pub use zcurve::{ZCurveIndex, ZSpaceTimeIndex};

use crate::key::{InvalidBounds, Key, KeyBounds, SpaceTimeKey, SpatialKey};

/// Error returned by index construction and decomposition.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Malformed query bounds: a caller contract violation, never coerced.
    #[error(transparent)]
    InvalidBounds(#[from] InvalidBounds),
    /// The declared key space does not fit the index's per-axis bit budget.
    #[error("key space exceeds the {bits}-bit axis budget of the index")]
    AxisOverflow {
        /// Bits available per axis.
        bits: u32,
    },
    /// The declared layout has more cells than the index space can
    /// address.
    #[error("layout of {cells} cells exceeds the i64 index space")]
    LayoutOverflow {
        /// Total cell count of the declared layout.
        cells: u128,
    },
    /// Temporal binning requires a positive resolution.
    #[error("temporal resolution must be positive, got {0}")]
    InvalidResolution(i64),
}

/// An inclusive interval of contiguous positions in the index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    /// First position covered, inclusive.
    pub start: i64,
    /// Last position covered, inclusive.
    pub end: i64,
}

impl IndexRange {
    /// Create a range over `[start, end]`. Requires `start <= end`.
    pub fn new(start: i64, end: i64) -> Self {
        debug_assert!(start <= end, "index range {start}..={end} is inverted");
        Self { start, end }
    }

    /// A range covering a single position.
    pub fn point(at: i64) -> Self {
        Self { start: at, end: at }
    }

    /// Whether `index` falls inside the interval.
    pub fn contains(&self, index: i64) -> bool {
        self.start <= index && index <= self.end
    }
}

/// Maps keys to index positions and decomposes key regions into index
/// ranges.
///
/// `to_index` is total and deterministic, and collision-free within the
/// index's declared key space. `index_ranges` is sound: every key inside
/// the queried bounds has its index covered by some returned range.
/// Tightness varies by strategy; over-coverage is legal but costly, and is
/// stripped by the reader on exact key comparison.
pub trait KeyIndex<K: Key>: Send + Sync {
    /// Position of `key` in the one-dimensional index space.
    fn to_index(&self, key: &K) -> i64;

    /// Decompose `bounds` into index intervals covering every key inside
    /// the region. Bounds are clipped to the declared key space first;
    /// malformed bounds are rejected with [`IndexError::InvalidBounds`].
    fn index_ranges(&self, bounds: &KeyBounds<K>) -> Result<Vec<IndexRange>, IndexError>;
}

/// Persistable spatial index strategy, tagged with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpatialIndex {
    /// Row-major offsets within the declared layout.
    RowMajor(RowMajorIndex),
    /// Z-order (Morton) space-filling curve.
    ZCurve(ZCurveIndex),
}

impl KeyIndex<SpatialKey> for SpatialIndex {
    fn to_index(&self, key: &SpatialKey) -> i64 {
        match self {
            SpatialIndex::RowMajor(index) => index.to_index(key),
            SpatialIndex::ZCurve(index) => index.to_index(key),
        }
    }

    fn index_ranges(&self, bounds: &KeyBounds<SpatialKey>) -> Result<Vec<IndexRange>, IndexError> {
        match self {
            SpatialIndex::RowMajor(index) => index.index_ranges(bounds),
            SpatialIndex::ZCurve(index) => index.index_ranges(bounds),
        }
    }
}

/// Persistable space-time index strategy, tagged with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceTimeIndex {
    /// Temporally binned Z-order curve.
    ZCurve(ZSpaceTimeIndex),
}

impl KeyIndex<SpaceTimeKey> for SpaceTimeIndex {
    fn to_index(&self, key: &SpaceTimeKey) -> i64 {
        match self {
            SpaceTimeIndex::ZCurve(index) => index.to_index(key),
        }
    }

    fn index_ranges(
        &self,
        bounds: &KeyBounds<SpaceTimeKey>,
    ) -> Result<Vec<IndexRange>, IndexError> {
        match self {
            SpaceTimeIndex::ZCurve(index) => index.index_ranges(bounds),
        }
    }
}
