//! Tuning knobs shared by readers and catalogs.

use crate::index::merge::{MergeQueue, DEFAULT_FUDGE};

/// Configuration consumed when building a catalog or reader.
///
/// All fields have working defaults; override the ones you care about:
///
/// ```
/// use tessera::StoreOptions;
///
/// let options = StoreOptions::new().fudge(4).cache_capacity(64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub(crate) fudge: i64,
    pub(crate) cache_capacity: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            fudge: DEFAULT_FUDGE,
            cache_capacity: crate::catalog::DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl StoreOptions {
    /// Options with the default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Coalescing distance for scan-range merging: ranges separated by a
    /// gap of at most `fudge` positions collapse into one scan.
    pub fn fudge(self, fudge: i64) -> Self {
        Self { fudge, ..self }
    }

    /// Capacity of the catalog's metadata cache (`0` disables caching).
    pub fn cache_capacity(self, cache_capacity: usize) -> Self {
        Self {
            cache_capacity,
            ..self
        }
    }

    pub(crate) fn merge_queue(&self) -> MergeQueue {
        MergeQueue::with_fudge(self.fudge)
    }
}
