//! Z-order (Morton) curve indexes.
//!
//! The curve interleaves the bits of the grid axes, so nearby tiles land
//! near each other in index space. Decomposition covers a query rectangle
//! with aligned power-of-two quadrants: each aligned quadrant occupies a
//! contiguous interval of the curve, and the recursion emits them in curve
//! order, so the cover is exact — over-coverage comes only from the merge
//! fudge (and, for the space-time curve, temporal binning).

use serde::{Deserialize, Serialize};

use super::{IndexError, IndexRange, KeyIndex};
use crate::key::{InvalidBounds, KeyBounds, SpaceTimeKey, SpatialKey};

/// Spread the bits of `x` so they occupy the even positions.
fn spread(x: u32) -> u64 {
    let mut x = u64::from(x);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    x = (x | (x << 1)) & 0x5555_5555_5555_5555;
    x
}

/// Morton value of `(col, row)` with the column in the even bits.
fn z_value(col: u32, row: u32) -> i64 {
    (spread(col) | (spread(row) << 1)) as i64
}

/// Exact Z-curve cover of the rectangle `[lo, hi]` by aligned quadrants.
///
/// Ranges are emitted in ascending curve order; callers hand them to the
/// merge queue to coalesce quadrants that happen to be adjacent on the
/// curve.
fn z_cover(lo: SpatialKey, hi: SpatialKey, out: &mut Vec<IndexRange>) {
    let size = (u64::from(hi.col.max(hi.row)) + 1).next_power_of_two();
    cover_cell(lo, hi, 0, 0, size, out);
}

fn cover_cell(lo: SpatialKey, hi: SpatialKey, col: u64, row: u64, size: u64, out: &mut Vec<IndexRange>) {
    let cell_max_col = col + size - 1;
    let cell_max_row = row + size - 1;
    if cell_max_col < u64::from(lo.col)
        || col > u64::from(hi.col)
        || cell_max_row < u64::from(lo.row)
        || row > u64::from(hi.row)
    {
        return;
    }
    if col >= u64::from(lo.col)
        && cell_max_col <= u64::from(hi.col)
        && row >= u64::from(lo.row)
        && cell_max_row <= u64::from(hi.row)
    {
        // An aligned quadrant is contiguous on the curve.
        let start = z_value(col as u32, row as u32);
        out.push(IndexRange::new(start, start + (size * size - 1) as i64));
        return;
    }
    // A 1x1 cell is always either disjoint or contained, so size > 1 here.
    let half = size / 2;
    cover_cell(lo, hi, col, row, half, out);
    cover_cell(lo, hi, col + half, row, half, out);
    cover_cell(lo, hi, col, row + half, half, out);
    cover_cell(lo, hi, col + half, row + half, half, out);
}

/// Bits per spatial axis for [`ZCurveIndex`]; keeps the interleaved value
/// inside a non-negative `i64`.
const SPATIAL_AXIS_BITS: u32 = 31;

/// Bits per spatial axis for [`ZSpaceTimeIndex`]; the remaining high bits
/// carry the temporal bin.
const SPACETIME_AXIS_BITS: u32 = 21;

const TEMPORAL_SHIFT: u32 = 2 * SPACETIME_AXIS_BITS;

/// Z-order curve index over a declared spatial key space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZCurveIndex {
    bounds: KeyBounds<SpatialKey>,
}

impl ZCurveIndex {
    /// Index over the layer's declared key space. Axes must fit in 31 bits.
    pub fn new(bounds: KeyBounds<SpatialKey>) -> Result<Self, IndexError> {
        let max = bounds.max();
        if max.col >> SPATIAL_AXIS_BITS != 0 || max.row >> SPATIAL_AXIS_BITS != 0 {
            return Err(IndexError::AxisOverflow {
                bits: SPATIAL_AXIS_BITS,
            });
        }
        Ok(Self { bounds })
    }

    /// The declared key space.
    pub fn bounds(&self) -> &KeyBounds<SpatialKey> {
        &self.bounds
    }
}

impl KeyIndex<SpatialKey> for ZCurveIndex {
    fn to_index(&self, key: &SpatialKey) -> i64 {
        z_value(key.col, key.row)
    }

    fn index_ranges(&self, bounds: &KeyBounds<SpatialKey>) -> Result<Vec<IndexRange>, IndexError> {
        if !bounds.is_well_formed() {
            return Err(InvalidBounds::new(bounds.min(), bounds.max()).into());
        }
        let Some(query) = bounds.intersect(&self.bounds) else {
            return Ok(Vec::new());
        };
        let mut ranges = Vec::new();
        z_cover(*query.min(), *query.max(), &mut ranges);
        Ok(ranges)
    }
}

/// Temporal-major space-time index: the instant is binned by a fixed
/// resolution into the high bits, with a Z curve over `(col, row)` in the
/// low bits.
///
/// Collision-free provided distinct keys differ spatially or by at least
/// the temporal resolution — the declared granularity of the key space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZSpaceTimeIndex {
    bounds: KeyBounds<SpaceTimeKey>,
    resolution_ms: i64,
}

impl ZSpaceTimeIndex {
    /// Index over the layer's declared key space, binning instants by
    /// `resolution_ms`. Spatial axes must fit in 21 bits and the binned
    /// time span in the remaining high bits.
    pub fn new(bounds: KeyBounds<SpaceTimeKey>, resolution_ms: i64) -> Result<Self, IndexError> {
        if resolution_ms <= 0 {
            return Err(IndexError::InvalidResolution(resolution_ms));
        }
        let max = bounds.max();
        if max.col >> SPACETIME_AXIS_BITS != 0 || max.row >> SPACETIME_AXIS_BITS != 0 {
            return Err(IndexError::AxisOverflow {
                bits: SPACETIME_AXIS_BITS,
            });
        }
        let bin_bits = i64::BITS - 1 - TEMPORAL_SHIFT;
        let bin_budget = 1i64 << bin_bits;
        for instant in [bounds.min().instant, bounds.max().instant] {
            let bin = instant.div_euclid(resolution_ms);
            if bin >= bin_budget || bin < -bin_budget {
                return Err(IndexError::AxisOverflow { bits: bin_bits });
            }
        }
        Ok(Self {
            bounds,
            resolution_ms,
        })
    }

    /// The declared key space.
    pub fn bounds(&self) -> &KeyBounds<SpaceTimeKey> {
        &self.bounds
    }

    /// The temporal bin width in milliseconds.
    pub fn resolution_ms(&self) -> i64 {
        self.resolution_ms
    }

    fn bin(&self, instant: i64) -> i64 {
        instant.div_euclid(self.resolution_ms)
    }
}

impl KeyIndex<SpaceTimeKey> for ZSpaceTimeIndex {
    fn to_index(&self, key: &SpaceTimeKey) -> i64 {
        // Low 42 bits are the spatial curve, so OR equals addition and the
        // index orders temporal-major even for negative bins.
        (self.bin(key.instant) << TEMPORAL_SHIFT) | z_value(key.col, key.row)
    }

    fn index_ranges(&self, bounds: &KeyBounds<SpaceTimeKey>) -> Result<Vec<IndexRange>, IndexError> {
        if !bounds.is_well_formed() {
            return Err(InvalidBounds::new(bounds.min(), bounds.max()).into());
        }
        let Some(query) = bounds.intersect(&self.bounds) else {
            return Ok(Vec::new());
        };

        let mut spatial = Vec::new();
        z_cover(query.min().spatial(), query.max().spatial(), &mut spatial);

        let (first, last) = (self.bin(query.min().instant), self.bin(query.max().instant));
        let mut ranges = Vec::with_capacity(spatial.len() * (last - first + 1) as usize);
        for bin in first..=last {
            let offset = bin << TEMPORAL_SHIFT;
            ranges.extend(
                spatial
                    .iter()
                    .map(|r| IndexRange::new(offset | r.start, offset | r.end)),
            );
        }
        Ok(ranges)
    }
}
