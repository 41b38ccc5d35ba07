//! Structured keys and the axis-aligned regions they span.
//!
//! A [`Key`] is totally ordered (the curve strategies only need a stable
//! order for determinism) and additionally forms a lattice per axis via
//! [`Key::component_min`] / [`Key::component_max`]. The lattice operations
//! are what give [`KeyBounds`] its axis-aligned region semantics: a bounds
//! contains a key iff the key sits between `min` and `max` on every axis.

mod spacetime;
mod spatial;

use std::{fmt::Debug, hash::Hash};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
pub use spacetime::SpaceTimeKey;
pub use spatial::SpatialKey;
use thiserror::Error;

/// A structured, immutable key for a tiled layer.
pub trait Key:
    'static + Ord + Clone + Hash + Debug + Send + Sync + Serialize + DeserializeOwned
{
    /// Component-wise minimum of `self` and `other`.
    fn component_min(&self, other: &Self) -> Self;

    /// Component-wise maximum of `self` and `other`.
    fn component_max(&self, other: &Self) -> Self;
}

/// Malformed bounds: `min` exceeds `max` on at least one axis.
///
/// Keys are rendered via `Debug` so the error stays object-free and cheap
/// to move across error-wrapping layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key bounds: min {min} exceeds max {max} on at least one axis")]
pub struct InvalidBounds {
    /// `Debug` rendering of the offending minimum key.
    pub min: String,
    /// `Debug` rendering of the offending maximum key.
    pub max: String,
}

impl InvalidBounds {
    pub(crate) fn new<K: Key>(min: &K, max: &K) -> Self {
        Self {
            min: format!("{min:?}"),
            max: format!("{max:?}"),
        }
    }
}

/// An inclusive axis-aligned region in key space.
///
/// Invariant: `min <= max` component-wise. [`KeyBounds::new`] enforces it;
/// bounds decoded from persisted metadata are re-validated by the index
/// before decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBounds<K> {
    min: K,
    max: K,
}

impl<K: Key> KeyBounds<K> {
    /// Create bounds from inclusive corner keys.
    pub fn new(min: K, max: K) -> Result<Self, InvalidBounds> {
        if min.component_min(&max) != min {
            return Err(InvalidBounds::new(&min, &max));
        }
        Ok(Self { min, max })
    }

    /// Degenerate bounds covering exactly one key.
    pub fn point(key: K) -> Self {
        Self {
            min: key.clone(),
            max: key,
        }
    }

    /// The minimal region enclosing every key produced by `keys`.
    ///
    /// Returns `None` for an empty iterator: an empty set of keys has no
    /// bounding region.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a K>) -> Option<Self> {
        let mut keys = keys.into_iter();
        let first = keys.next()?;
        let mut bounds = Self::point(first.clone());
        for key in keys {
            bounds = bounds.include(key);
        }
        Some(bounds)
    }

    /// Inclusive minimum corner.
    pub fn min(&self) -> &K {
        &self.min
    }

    /// Inclusive maximum corner.
    pub fn max(&self) -> &K {
        &self.max
    }

    /// Whether the invariant `min <= max` holds on every axis.
    ///
    /// Always true for bounds built through [`KeyBounds::new`]; decoded
    /// bounds go through this before decomposition.
    pub fn is_well_formed(&self) -> bool {
        self.min.component_min(&self.max) == self.min
    }

    /// Whether `key` lies inside the region on every axis.
    pub fn contains(&self, key: &K) -> bool {
        key.component_min(&self.min) == self.min && key.component_max(&self.max) == self.max
    }

    /// Expand the region to also cover `key`.
    pub fn include(&self, key: &K) -> Self {
        Self {
            min: self.min.component_min(key),
            max: self.max.component_max(key),
        }
    }

    /// The minimal region enclosing both `self` and `other`.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            min: self.min.component_min(&other.min),
            max: self.max.component_max(&other.max),
        }
    }

    /// Intersection with `other`, or `None` when the regions are disjoint
    /// on at least one axis.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min = self.min.component_max(&other.min);
        let max = self.max.component_min(&other.max);
        (min.component_min(&max) == min).then_some(Self { min, max })
    }
}
