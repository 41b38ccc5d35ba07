use std::collections::{BTreeMap, HashMap};

use async_lock::RwLock;
use async_trait::async_trait;
use bytes::Bytes;

use super::{Partition, RangeStore, StoreError};
use crate::index::IndexRange;

/// In-memory backing store: one ordered map per partition.
///
/// Serves tests and embedded use; scans are `BTreeMap::range` over the
/// inclusive index interval.
#[derive(Debug, Default)]
pub struct MemoryRangeStore {
    partitions: RwLock<HashMap<String, BTreeMap<i64, Bytes>>>,
}

impl MemoryRangeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held for `partition`.
    pub async fn row_count(&self, partition: &Partition) -> usize {
        self.partitions
            .read()
            .await
            .get(partition.as_str())
            .map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl RangeStore for MemoryRangeStore {
    async fn scan(
        &self,
        partition: &Partition,
        range: IndexRange,
    ) -> Result<Vec<(i64, Bytes)>, StoreError> {
        let partitions = self.partitions.read().await;
        let Some(rows) = partitions.get(partition.as_str()) else {
            return Ok(Vec::new());
        };
        Ok(rows
            .range(range.start..=range.end)
            .map(|(index, bytes)| (*index, bytes.clone()))
            .collect())
    }

    async fn write(
        &self,
        partition: &Partition,
        rows: Vec<(i64, Bytes)>,
    ) -> Result<(), StoreError> {
        let mut partitions = self.partitions.write().await;
        partitions.insert(partition.as_str().to_string(), rows.into_iter().collect());
        Ok(())
    }
}
