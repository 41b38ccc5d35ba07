//! Layer metadata catalog.
//!
//! The catalog persists one metadata blob per layer through a pluggable
//! [`AttributeStore`] keyed by `(LayerId, attribute)`. The four logical
//! fields (header, bounds, index, schema) travel in a single physical
//! attribute so an overwrite is one `put` — a concurrent reader observes
//! either the fully-old or fully-new entry, never a mix.
//!
//! Reads go through a bounded read-through cache; entries are invalidated
//! when the same layer is re-written.

mod fs;
mod memory;

use std::collections::{HashMap, VecDeque};

use async_lock::RwLock;
use async_trait::async_trait;
use bytes::Bytes;
pub use fs::FsAttributeStore;
pub use memory::MemoryAttributeStore;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::{
    key::Key,
    layer::{LayerId, LayerMetadata},
    observability::log_debug,
    option::StoreOptions,
};

/// The physical attribute carrying a layer's metadata blob.
pub const METADATA_ATTRIBUTE: &str = "metadata";

/// Default capacity of the per-process metadata cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Error returned by the catalog and its attribute stores.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No catalog entry exists for the requested layer.
    #[error("layer {0} not found")]
    LayerNotFound(LayerId),
    /// A stored attribute cannot be decoded against the expected shape.
    #[error("attribute {attribute:?} of layer {id} is corrupt: {reason}")]
    AttributeCorrupt {
        /// Layer whose attribute failed to decode.
        id: LayerId,
        /// Attribute name.
        attribute: String,
        /// Decode or integrity failure detail.
        reason: String,
    },
    /// Metadata failed to encode before the put.
    #[error("metadata encode failed: {0}")]
    Encode(#[source] bincode::Error),
    /// I/O failure in the attribute store.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Durable storage for catalog attribute blobs, keyed by
/// `(LayerId, attribute)`.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Fetch an attribute blob, or `None` when absent.
    async fn get(&self, id: &LayerId, attribute: &str) -> Result<Option<Bytes>, CatalogError>;

    /// Persist an attribute blob, replacing any prior value.
    async fn put(&self, id: &LayerId, attribute: &str, value: Bytes) -> Result<(), CatalogError>;

    /// All layer ids with at least one stored attribute.
    async fn layer_ids(&self) -> Result<Vec<LayerId>, CatalogError>;
}

/// Bounded FIFO map from `(LayerId, attribute)` to raw blobs.
#[derive(Debug)]
struct AttributeCache {
    entries: HashMap<(LayerId, String), Bytes>,
    order: VecDeque<(LayerId, String)>,
    capacity: usize,
}

impl AttributeCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    fn get(&self, key: &(LayerId, String)) -> Option<Bytes> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: (LayerId, String), value: Bytes) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
            while self.entries.len() > self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.entries.remove(&evicted);
                }
            }
        }
    }

    fn invalidate(&mut self, key: &(LayerId, String)) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|entry| entry != key);
        }
    }
}

/// Read-through cached catalog over an [`AttributeStore`].
#[derive(Debug)]
pub struct LayerCatalog<S> {
    store: S,
    cache: RwLock<AttributeCache>,
}

impl<S: AttributeStore> LayerCatalog<S> {
    /// Catalog with the default cache capacity.
    pub fn new(store: S) -> Self {
        Self::with_cache_capacity(store, DEFAULT_CACHE_CAPACITY)
    }

    /// Catalog tuned by [`StoreOptions`].
    pub fn with_options(store: S, options: &StoreOptions) -> Self {
        Self::with_cache_capacity(store, options.cache_capacity)
    }

    /// Catalog with an explicit cache capacity (`0` disables caching).
    pub fn with_cache_capacity(store: S, capacity: usize) -> Self {
        Self {
            store,
            cache: RwLock::new(AttributeCache::new(capacity)),
        }
    }

    /// The underlying attribute store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read a layer's metadata, from cache when warm.
    pub async fn read<K, I>(&self, id: &LayerId) -> Result<LayerMetadata<K, I>, CatalogError>
    where
        K: Key,
        I: DeserializeOwned,
    {
        let bytes = self.attribute(id, METADATA_ATTRIBUTE).await?;
        bincode::deserialize(&bytes).map_err(|err| CatalogError::AttributeCorrupt {
            id: id.clone(),
            attribute: METADATA_ATTRIBUTE.to_string(),
            reason: err.to_string(),
        })
    }

    /// Persist a layer's metadata, replacing any prior entry and
    /// invalidating the cache for `id`.
    pub async fn write<K, I>(
        &self,
        id: &LayerId,
        metadata: &LayerMetadata<K, I>,
    ) -> Result<(), CatalogError>
    where
        K: Key,
        I: Serialize + Send + Sync,
    {
        let bytes = bincode::serialize(metadata).map_err(CatalogError::Encode)?;
        self.store
            .put(id, METADATA_ATTRIBUTE, Bytes::from(bytes))
            .await?;
        let key = (id.clone(), METADATA_ATTRIBUTE.to_string());
        self.cache.write().await.invalidate(&key);
        log_debug!(
            component = "catalog",
            event = "metadata_written",
            layer = %id,
        );
        Ok(())
    }

    /// Whether a catalog entry exists for `id`.
    pub async fn contains(&self, id: &LayerId) -> Result<bool, CatalogError> {
        {
            let cache = self.cache.read().await;
            if cache
                .get(&(id.clone(), METADATA_ATTRIBUTE.to_string()))
                .is_some()
            {
                return Ok(true);
            }
        }
        Ok(self.store.get(id, METADATA_ATTRIBUTE).await?.is_some())
    }

    /// All layer ids known to the underlying store.
    pub async fn layer_ids(&self) -> Result<Vec<LayerId>, CatalogError> {
        self.store.layer_ids().await
    }

    async fn attribute(&self, id: &LayerId, attribute: &str) -> Result<Bytes, CatalogError> {
        let key = (id.clone(), attribute.to_string());
        {
            let cache = self.cache.read().await;
            if let Some(bytes) = cache.get(&key) {
                return Ok(bytes);
            }
        }
        let bytes = self
            .store
            .get(id, attribute)
            .await?
            .ok_or_else(|| CatalogError::LayerNotFound(id.clone()))?;
        self.cache.write().await.insert(key, bytes.clone());
        Ok(bytes)
    }
}
