//! Backing-store contract.
//!
//! The engine is agnostic to whether rows live in a distributed key-value
//! store or a file-backed one; it only needs range scans and bulk writes
//! keyed by `i64` index positions, scoped to a partition. The partition
//! selector is an explicit value computed once per layer — never resolved
//! implicitly from types.

mod memory;

use async_trait::async_trait;
use bytes::Bytes;
pub use memory::MemoryRangeStore;
use thiserror::Error;

use crate::{index::IndexRange, layer::LayerId};

/// Error returned by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure in a file-backed store.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Backend-specific failure.
    #[error("backing store: {0}")]
    Backend(String),
}

/// Partition ("table"/column-family) selector scoping rows to one layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition(String);

impl Partition {
    /// Selector for `id`'s rows, computed once and passed explicitly.
    pub fn for_layer(id: &LayerId) -> Self {
        Self(format!("{}:{}", id.name, id.zoom))
    }

    /// Selector restored from a persisted layer header.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The selector as a table/column-family name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Range-scannable row storage keyed by index position.
///
/// Scan calls over disjoint ranges are independent; the orchestration (or
/// a cluster execution layer above it) owns the fan-out.
#[async_trait]
pub trait RangeStore: Send + Sync {
    /// All rows whose index position falls inside `range`, ascending.
    async fn scan(
        &self,
        partition: &Partition,
        range: IndexRange,
    ) -> Result<Vec<(i64, Bytes)>, StoreError>;

    /// Replace the contents of `partition` with `rows`.
    ///
    /// Rows from an earlier write do not survive: a layer rewrite must
    /// not leave stale rows behind for a later scan to pick up.
    async fn write(
        &self,
        partition: &Partition,
        rows: Vec<(i64, Bytes)>,
    ) -> Result<(), StoreError>;
}
