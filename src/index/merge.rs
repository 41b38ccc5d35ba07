//! Coalescing of index ranges into a minimal set of scan ranges.
//!
//! Decomposition hands back many small intervals; every interval that
//! survives merging costs one round trip to the backing store. The queue
//! orders ranges by their *end* position and sweeps once left to right,
//! greedily extending the current run — near-adjacent ranges within the
//! fudge distance are folded into one scan, trading a few extra rows for
//! fewer requests.

use super::IndexRange;

/// Default coalescing distance: ranges separated by a gap of at most one
/// position are merged into a single scan.
pub const DEFAULT_FUDGE: i64 = 1;

/// Merges a multiset of inclusive ranges into a disjoint, start-sorted,
/// minimal set.
///
/// Deterministic for any input order: decomposition order from the key
/// index is not guaranteed stable across calls, so the queue sorts before
/// sweeping.
#[derive(Debug, Clone, Copy)]
pub struct MergeQueue {
    fudge: i64,
}

impl Default for MergeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeQueue {
    /// Queue with the default fudge of [`DEFAULT_FUDGE`].
    pub fn new() -> Self {
        Self {
            fudge: DEFAULT_FUDGE,
        }
    }

    /// Queue with an explicit fudge distance (`0` merges only overlapping
    /// or touching ranges).
    pub fn with_fudge(fudge: i64) -> Self {
        debug_assert!(fudge >= 0, "fudge must be non-negative");
        Self { fudge }
    }

    /// Merge `ranges` into a minimal sorted set of disjoint ranges.
    ///
    /// Every input range is contained by exactly one output range; ranges
    /// whose gap is at most the fudge distance collapse into one.
    pub fn merge(&self, ranges: impl IntoIterator<Item = IndexRange>) -> Vec<IndexRange> {
        let mut ranges: Vec<IndexRange> = ranges.into_iter().collect();
        // End-ordered: lets a single sweep extend the current run without
        // ever having to look back past its start.
        ranges.sort_unstable_by_key(|range| (range.end, range.start));

        let mut merged: Vec<IndexRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(run) if range.start <= run.end.saturating_add(self.fudge) => {
                    run.start = run.start.min(range.start);
                    run.end = run.end.max(range.end);
                    // Extending the start downward can reach runs closed
                    // earlier in the sweep; fold them back in.
                    while merged.len() > 1 {
                        let run = merged[merged.len() - 1];
                        let prev = merged[merged.len() - 2];
                        if run.start > prev.end.saturating_add(self.fudge) {
                            break;
                        }
                        merged.pop();
                        let prev = merged.last_mut().expect("previous run exists");
                        prev.start = prev.start.min(run.start);
                        prev.end = prev.end.max(run.end);
                    }
                }
                _ => merged.push(range),
            }
        }
        merged
    }
}
