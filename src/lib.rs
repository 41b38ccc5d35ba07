//! `tessera` stores tiled raster layers in range-scannable key-value
//! stores.
//!
//! A layer is a set of `(key, record)` pairs plus metadata. Writing maps
//! each key onto a one-dimensional index space through a space-filling
//! curve (or row-major offsets), and reading decomposes a queried region
//! into index ranges, merges near-adjacent ranges into fewer scans, and
//! strips curve over-coverage by exact key comparison.
//!
//! ```
//! use tessera::{
//!     BincodeCodec, Dataset, KeyBounds, LayerCatalog, LayerId, LayerReader,
//!     LayerWriter, MemoryAttributeStore, MemoryRangeStore, RowMajorIndex,
//!     SpatialIndex, SpatialKey,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryRangeStore::new();
//! let catalog = LayerCatalog::new(MemoryAttributeStore::new());
//! let codec = BincodeCodec::<SpatialKey, Vec<u8>>::new();
//! let id = LayerId::new("elevation", 3);
//!
//! let layout = KeyBounds::new(SpatialKey::new(0, 0), SpatialKey::new(7, 7))?;
//! let dataset = Dataset::from_records(vec![
//!     (SpatialKey::new(1, 1), vec![1u8, 2, 3]),
//!     (SpatialKey::new(2, 1), vec![4, 5, 6]),
//! ]);
//! LayerWriter::new(&store, &catalog)
//!     .write(
//!         &id,
//!         dataset,
//!         SpatialIndex::RowMajor(RowMajorIndex::new(layout)?),
//!         &codec,
//!     )
//!     .await?;
//!
//! let query = KeyBounds::new(SpatialKey::new(0, 0), SpatialKey::new(1, 7))?;
//! let read = LayerReader::new(&store, &catalog)
//!     .read::<_, Vec<u8>, SpatialIndex, _>(&id, &query, &codec)
//!     .await?;
//! assert_eq!(read.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod codec;
pub mod index;
pub mod key;
pub mod layer;
mod observability;
mod option;
pub mod store;
#[cfg(test)]
mod tests_internal;

pub use catalog::{
    AttributeStore, CatalogError, FsAttributeStore, LayerCatalog, MemoryAttributeStore,
};
pub use codec::{BincodeCodec, CodecError, RecordCodec, SchemaDescriptor};
pub use index::{
    merge::MergeQueue, IndexError, IndexRange, KeyIndex, RowMajorIndex, SpaceTimeIndex,
    SpatialIndex, ZCurveIndex, ZSpaceTimeIndex,
};
pub use key::{InvalidBounds, Key, KeyBounds, SpaceTimeKey, SpatialKey};
pub use layer::{
    Dataset, LayerId, LayerMetadata, LayerReader, LayerWriter, ReadError, ReadErrorKind,
    WriteError,
};
pub use option::StoreOptions;
pub use store::{MemoryRangeStore, Partition, RangeStore, StoreError};
