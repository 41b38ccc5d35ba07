use serde::Serialize;
use thiserror::Error;

use super::{Dataset, LayerHeader, LayerId, LayerMetadata};
use crate::{
    catalog::{AttributeStore, CatalogError, LayerCatalog},
    codec::{CodecError, RecordCodec},
    index::KeyIndex,
    key::Key,
    observability::{log_info, log_warn},
    store::{Partition, RangeStore, StoreError},
};

/// Error returned by a layer write.
///
/// Data and metadata failures are distinct on purpose: a metadata failure
/// leaves already-written rows orphaned in the backing store, which the
/// caller may want to retry or clean up.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Empty datasets have no key bounds and are rejected up front.
    #[error("refusing to write layer {0} from an empty dataset")]
    Empty(LayerId),
    /// A record failed to encode; nothing was written.
    #[error("encoding a record of layer {id} failed")]
    Encode {
        /// Layer being written.
        id: LayerId,
        /// Codec failure.
        #[source]
        source: CodecError,
    },
    /// Writing the data rows failed; the catalog was not touched.
    #[error("writing rows of layer {id} failed")]
    Data {
        /// Layer being written.
        id: LayerId,
        /// Backing-store failure.
        #[source]
        source: StoreError,
    },
    /// The rows landed but the catalog entry did not: the layer's data is
    /// orphaned until a retry succeeds.
    #[error("rows of layer {id} were written but its metadata was not")]
    Metadata {
        /// Layer being written.
        id: LayerId,
        /// Catalog failure.
        #[source]
        source: CatalogError,
    },
}

/// Writes a dataset as a layer: rows first, metadata last.
///
/// Metadata is the commit point — a layer is visible to readers only once
/// its catalog entry lands, so a crash between the two steps leaves
/// unreferenced rows rather than a readable half-written layer.
#[derive(Debug)]
pub struct LayerWriter<'a, S, A> {
    store: &'a S,
    catalog: &'a LayerCatalog<A>,
}

impl<'a, S, A> LayerWriter<'a, S, A>
where
    S: RangeStore,
    A: AttributeStore,
{
    /// Writer over the given backing store and catalog.
    pub fn new(store: &'a S, catalog: &'a LayerCatalog<A>) -> Self {
        Self { store, catalog }
    }

    /// Write `dataset` as layer `id`, indexed by `index` and encoded with
    /// `codec`.
    ///
    /// Re-writing an existing id replaces the layer wholesale: the
    /// partition's previous rows and the catalog entry are both gone
    /// afterwards (last writer wins).
    pub async fn write<K, V, I, C>(
        &self,
        id: &LayerId,
        dataset: Dataset<K, V>,
        index: I,
        codec: &C,
    ) -> Result<(), WriteError>
    where
        K: Key,
        I: KeyIndex<K> + Serialize,
        C: RecordCodec<K, V>,
    {
        let bounds = dataset
            .key_bounds()
            .ok_or_else(|| WriteError::Empty(id.clone()))?;
        let partition = Partition::for_layer(id);

        let mut rows = Vec::with_capacity(dataset.len());
        for record in dataset {
            let position = index.to_index(&record.0);
            let bytes = codec.encode(&record).map_err(|source| WriteError::Encode {
                id: id.clone(),
                source,
            })?;
            rows.push((position, bytes));
        }
        let record_count = rows.len();

        self.store
            .write(&partition, rows)
            .await
            .map_err(|source| WriteError::Data {
                id: id.clone(),
                source,
            })?;

        let metadata = LayerMetadata {
            header: LayerHeader {
                partition: partition.as_str().to_string(),
            },
            bounds,
            index,
            schema: codec.schema(),
        };
        if let Err(source) = self.catalog.write(id, &metadata).await {
            log_warn!(
                component = "layer",
                event = "metadata_write_failed",
                layer = %id,
                partition = %partition,
                orphaned_rows = record_count,
                error = %source,
            );
            return Err(WriteError::Metadata {
                id: id.clone(),
                source,
            });
        }

        log_info!(
            component = "layer",
            event = "layer_written",
            layer = %id,
            partition = %partition,
            records = record_count,
        );
        Ok(())
    }
}
