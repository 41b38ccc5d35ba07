use std::collections::HashMap;

use async_lock::RwLock;
use async_trait::async_trait;
use bytes::Bytes;

use super::{AttributeStore, CatalogError};
use crate::layer::LayerId;

/// In-memory attribute store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    attributes: RwLock<HashMap<(LayerId, String), Bytes>>,
}

impl MemoryAttributeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every stored attribute.
    pub async fn clear(&self) {
        self.attributes.write().await.clear();
    }
}

#[async_trait]
impl AttributeStore for MemoryAttributeStore {
    async fn get(&self, id: &LayerId, attribute: &str) -> Result<Option<Bytes>, CatalogError> {
        Ok(self
            .attributes
            .read()
            .await
            .get(&(id.clone(), attribute.to_string()))
            .cloned())
    }

    async fn put(&self, id: &LayerId, attribute: &str, value: Bytes) -> Result<(), CatalogError> {
        self.attributes
            .write()
            .await
            .insert((id.clone(), attribute.to_string()), value);
        Ok(())
    }

    async fn layer_ids(&self) -> Result<Vec<LayerId>, CatalogError> {
        let attributes = self.attributes.read().await;
        let mut ids: Vec<LayerId> = attributes.keys().map(|(id, _)| id.clone()).collect();
        ids.sort_by(|a, b| a.name.cmp(&b.name).then(a.zoom.cmp(&b.zoom)));
        ids.dedup();
        Ok(ids)
    }
}
