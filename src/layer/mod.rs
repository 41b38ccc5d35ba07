//! Layers: identifiers, per-layer metadata, and the in-memory dataset.
//!
//! A layer is a named, zoom-leveled tiled dataset plus its metadata. The
//! metadata records everything a read needs to reproduce the write-time
//! configuration: where the rows live, the full extent actually written,
//! the exact key index instance, and the record schema.

mod read;
mod write;

use serde::{Deserialize, Serialize};

pub use self::{
    read::{LayerReader, ReadError, ReadErrorKind},
    write::{LayerWriter, WriteError},
};
use crate::{codec::SchemaDescriptor, key::Key, key::KeyBounds};

/// Logical layer identifier: a name plus a discrete zoom level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId {
    /// Layer name.
    pub name: String,
    /// Resolution/zoom level.
    pub zoom: u32,
}

impl LayerId {
    /// Identifier for `name` at `zoom`.
    pub fn new(name: impl Into<String>, zoom: u32) -> Self {
        Self {
            name: name.into(),
            zoom,
        }
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.zoom)
    }
}

/// Storage location descriptor for a layer's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerHeader {
    /// Partition (table/column-family) holding the rows.
    pub partition: String,
}

/// Per-layer metadata, written wholesale after the data and never mutated.
///
/// Re-writing a layer id replaces the whole entry (last writer wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerMetadata<K, I> {
    /// Where the rows live.
    pub header: LayerHeader,
    /// Full extent actually written.
    pub bounds: KeyBounds<K>,
    /// The exact index instance used at write time (strategy + parameters).
    pub index: I,
    /// Record schema descriptor.
    pub schema: SchemaDescriptor,
}

/// Immutable in-memory collection of `(key, record)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<K, V> {
    records: Vec<(K, V)>,
}

impl<K, V> Default for Dataset<K, V> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<K: Key, V> Dataset<K, V> {
    /// Dataset over the given records.
    pub fn from_records(records: Vec<(K, V)>) -> Self {
        Self { records }
    }

    /// An empty dataset.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over the records.
    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.records.iter()
    }

    /// The minimal region enclosing every key, or `None` when empty.
    pub fn key_bounds(&self) -> Option<KeyBounds<K>> {
        KeyBounds::from_keys(self.records.iter().map(|(key, _)| key))
    }

    /// Consume into the underlying records.
    pub fn into_records(self) -> Vec<(K, V)> {
        self.records
    }
}

impl<K, V> IntoIterator for Dataset<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
