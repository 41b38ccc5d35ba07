//! Record serialization seam.
//!
//! The engine never interprets tile payloads: rows travel as opaque bytes
//! behind [`RecordCodec`], and each layer persists a [`SchemaDescriptor`]
//! naming the record shape and codec used at write time. Readers compare
//! descriptors for equality before decoding a single row.
//!
//! Rows carry the encoded `(key, value)` pair — the index position alone
//! is not invertible for space-filling curves with temporal binning, so
//! the key rides along with its record.

use std::marker::PhantomData;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::key::Key;

/// Error returned by record encode/decode.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Record failed to encode.
    #[error("record encode failed: {0}")]
    Encode(#[source] bincode::Error),
    /// Row bytes failed to decode as the expected record shape.
    #[error("record decode failed: {0}")]
    Decode(#[source] bincode::Error),
    /// The layer was written with a different record schema.
    #[error("schema mismatch: layer has {stored:?}, caller expects {expected:?}")]
    SchemaMismatch {
        /// Descriptor recorded in the layer's metadata.
        stored: SchemaDescriptor,
        /// Descriptor of the codec the caller supplied.
        expected: SchemaDescriptor,
    },
}

/// Opaque descriptor of a layer's record shape, persisted once per layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Name of the record type.
    pub record: String,
    /// Name of the codec that produced the rows.
    pub codec: String,
}

/// Encodes and decodes `(key, value)` records for one layer.
pub trait RecordCodec<K, V>: Send + Sync {
    /// Descriptor persisted with the layer and checked on read.
    fn schema(&self) -> SchemaDescriptor;

    /// Encode one record into row bytes.
    fn encode(&self, record: &(K, V)) -> Result<Bytes, CodecError>;

    /// Decode row bytes back into a record.
    fn decode(&self, bytes: &[u8]) -> Result<(K, V), CodecError>;
}

/// Default codec: bincode over the record's serde representation.
#[derive(Debug)]
pub struct BincodeCodec<K, V> {
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Default for BincodeCodec<K, V> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<K, V> BincodeCodec<K, V> {
    /// Create the codec.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K, V> RecordCodec<K, V> for BincodeCodec<K, V>
where
    K: Key,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            record: format!(
                "({}, {})",
                std::any::type_name::<K>(),
                std::any::type_name::<V>()
            ),
            codec: "bincode".to_string(),
        }
    }

    fn encode(&self, record: &(K, V)) -> Result<Bytes, CodecError> {
        bincode::serialize(record)
            .map(Bytes::from)
            .map_err(CodecError::Encode)
    }

    fn decode(&self, bytes: &[u8]) -> Result<(K, V), CodecError> {
        bincode::deserialize(bytes).map_err(CodecError::Decode)
    }
}
