use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::{Dataset, LayerId, LayerMetadata};
use crate::{
    catalog::{AttributeStore, CatalogError, LayerCatalog},
    codec::{CodecError, RecordCodec},
    index::{merge::MergeQueue, IndexError, KeyIndex},
    key::{Key, KeyBounds},
    observability::log_debug,
    option::StoreOptions,
    store::{Partition, RangeStore, StoreError},
};

/// Error returned by a layer read, tagged with the layer it concerns.
#[derive(Debug, Error)]
#[error("reading layer {id} failed")]
pub struct ReadError {
    /// Layer being read.
    pub id: LayerId,
    /// Failing stage.
    #[source]
    pub source: ReadErrorKind,
}

impl ReadError {
    fn new(id: &LayerId, source: impl Into<ReadErrorKind>) -> Self {
        Self {
            id: id.clone(),
            source: source.into(),
        }
    }
}

/// The stage of a read that failed.
#[derive(Debug, Error)]
pub enum ReadErrorKind {
    /// Metadata lookup failed (including unknown layers).
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The persisted index rejected the query decomposition.
    #[error(transparent)]
    Index(#[from] IndexError),
    /// A range scan against the backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Schema mismatch or a row that failed to decode.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Reads a region of a layer back into a dataset.
///
/// The read plan is: metadata, schema check, clip to the written extent,
/// decompose, merge, fan out one scan per merged range, decode, and strip
/// curve over-coverage by exact key containment.
#[derive(Debug)]
pub struct LayerReader<'a, S, A> {
    store: &'a S,
    catalog: &'a LayerCatalog<A>,
    merge: MergeQueue,
}

impl<'a, S, A> LayerReader<'a, S, A>
where
    S: RangeStore,
    A: AttributeStore,
{
    /// Reader over the given backing store and catalog, with the default
    /// coalescing distance.
    pub fn new(store: &'a S, catalog: &'a LayerCatalog<A>) -> Self {
        Self::with_merge(store, catalog, MergeQueue::new())
    }

    /// Reader tuned by [`StoreOptions`].
    pub fn with_options(
        store: &'a S,
        catalog: &'a LayerCatalog<A>,
        options: &StoreOptions,
    ) -> Self {
        Self::with_merge(store, catalog, options.merge_queue())
    }

    /// Reader with an explicit merge queue.
    pub fn with_merge(store: &'a S, catalog: &'a LayerCatalog<A>, merge: MergeQueue) -> Self {
        Self {
            store,
            catalog,
            merge,
        }
    }

    /// Read every record of layer `id` whose key lies inside `query`.
    ///
    /// A query disjoint from the layer's written extent is not an error:
    /// it returns an empty dataset.
    pub async fn read<K, V, I, C>(
        &self,
        id: &LayerId,
        query: &KeyBounds<K>,
        codec: &C,
    ) -> Result<Dataset<K, V>, ReadError>
    where
        K: Key,
        I: KeyIndex<K> + DeserializeOwned,
        C: RecordCodec<K, V>,
    {
        let metadata: LayerMetadata<K, I> = self
            .catalog
            .read(id)
            .await
            .map_err(|err| ReadError::new(id, err))?;

        let expected = codec.schema();
        if metadata.schema != expected {
            return Err(ReadError::new(
                id,
                CodecError::SchemaMismatch {
                    stored: metadata.schema,
                    expected,
                },
            ));
        }

        let Some(clipped) = metadata.bounds.intersect(query) else {
            log_debug!(
                component = "layer",
                event = "query_outside_extent",
                layer = %id,
            );
            return Ok(Dataset::empty());
        };

        let ranges = metadata
            .index
            .index_ranges(&clipped)
            .map_err(|err| ReadError::new(id, err))?;
        let range_count = ranges.len();
        let scans = self.merge.merge(ranges);
        let scan_count = scans.len();

        let partition = Partition::from_name(metadata.header.partition);
        let results = try_join_all(
            scans
                .into_iter()
                .map(|range| self.store.scan(&partition, range)),
        )
        .await
        .map_err(|err| ReadError::new(id, err))?;

        let mut records = Vec::new();
        for (_, bytes) in results.into_iter().flatten() {
            let record = codec
                .decode(&bytes)
                .map_err(|err| ReadError::new(id, err))?;
            // Curve decomposition may over-cover; the key riding in the
            // row is the ground truth.
            if query.contains(&record.0) {
                records.push(record);
            }
        }

        log_debug!(
            component = "layer",
            event = "layer_read",
            layer = %id,
            ranges = range_count,
            scans = scan_count,
            records = records.len(),
        );
        Ok(Dataset::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::MemoryAttributeStore,
        codec::BincodeCodec,
        index::{RowMajorIndex, SpatialIndex, ZCurveIndex},
        key::SpatialKey,
        layer::LayerWriter,
        store::MemoryRangeStore,
    };

    fn layout(max: u32) -> KeyBounds<SpatialKey> {
        KeyBounds::new(SpatialKey::new(0, 0), SpatialKey::new(max, max)).unwrap()
    }

    async fn write_grid(
        store: &MemoryRangeStore,
        catalog: &LayerCatalog<MemoryAttributeStore>,
        id: &LayerId,
        index: SpatialIndex,
    ) {
        let mut records = Vec::new();
        for row in 0..8u32 {
            for col in 0..8u32 {
                records.push((SpatialKey::new(col, row), col * 100 + row));
            }
        }
        LayerWriter::new(store, catalog)
            .write(id, Dataset::from_records(records), index, &BincodeCodec::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_layer_surfaces_as_catalog_error() {
        let store = MemoryRangeStore::new();
        let catalog = LayerCatalog::new(MemoryAttributeStore::new());
        let reader = LayerReader::new(&store, &catalog);

        let err = reader
            .read::<SpatialKey, u32, SpatialIndex, _>(
                &LayerId::new("missing", 0),
                &KeyBounds::point(SpatialKey::new(0, 0)),
                &BincodeCodec::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.source,
            ReadErrorKind::Catalog(CatalogError::LayerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn schema_mismatch_is_rejected_before_any_scan() {
        let store = MemoryRangeStore::new();
        let catalog = LayerCatalog::new(MemoryAttributeStore::new());
        let id = LayerId::new("elevation", 3);
        write_grid(
            &store,
            &catalog,
            &id,
            SpatialIndex::RowMajor(RowMajorIndex::new(layout(7)).unwrap()),
        )
        .await;

        // Written as u32 values, read back as Strings.
        let err = LayerReader::new(&store, &catalog)
            .read::<SpatialKey, String, SpatialIndex, _>(
                &id,
                &KeyBounds::point(SpatialKey::new(0, 0)),
                &BincodeCodec::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.source,
            ReadErrorKind::Codec(CodecError::SchemaMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn query_disjoint_from_extent_is_empty_not_an_error() {
        let store = MemoryRangeStore::new();
        let catalog = LayerCatalog::new(MemoryAttributeStore::new());
        let id = LayerId::new("elevation", 3);
        write_grid(
            &store,
            &catalog,
            &id,
            SpatialIndex::RowMajor(RowMajorIndex::new(layout(7)).unwrap()),
        )
        .await;

        let far = KeyBounds::new(SpatialKey::new(100, 100), SpatialKey::new(110, 110)).unwrap();
        let dataset = LayerReader::new(&store, &catalog)
            .read::<SpatialKey, u32, SpatialIndex, _>(&id, &far, &BincodeCodec::new())
            .await
            .unwrap();
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn partial_query_returns_exactly_the_region() {
        let store = MemoryRangeStore::new();
        let catalog = LayerCatalog::new(MemoryAttributeStore::new());
        let id = LayerId::new("elevation", 3);
        // Z-order over-covers unaligned regions; the reader must strip it.
        write_grid(
            &store,
            &catalog,
            &id,
            SpatialIndex::ZCurve(ZCurveIndex::new(layout(7)).unwrap()),
        )
        .await;

        let query = KeyBounds::new(SpatialKey::new(1, 2), SpatialKey::new(3, 5)).unwrap();
        let dataset = LayerReader::new(&store, &catalog)
            .read::<SpatialKey, u32, SpatialIndex, _>(&id, &query, &BincodeCodec::new())
            .await
            .unwrap();

        assert_eq!(dataset.len(), 3 * 4);
        for (key, value) in dataset.iter() {
            assert!(query.contains(key));
            assert_eq!(*value, key.col * 100 + key.row);
        }
    }

    #[tokio::test]
    async fn query_wider_than_the_extent_is_clipped() {
        let store = MemoryRangeStore::new();
        let catalog = LayerCatalog::new(MemoryAttributeStore::new());
        let id = LayerId::new("elevation", 3);
        write_grid(
            &store,
            &catalog,
            &id,
            SpatialIndex::RowMajor(RowMajorIndex::new(layout(7)).unwrap()),
        )
        .await;

        let wide = KeyBounds::new(SpatialKey::new(0, 0), SpatialKey::new(1000, 1000)).unwrap();
        let dataset = LayerReader::new(&store, &catalog)
            .read::<SpatialKey, u32, SpatialIndex, _>(&id, &wide, &BincodeCodec::new())
            .await
            .unwrap();
        assert_eq!(dataset.len(), 64);
    }
}
