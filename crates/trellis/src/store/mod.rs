//! Item store: the collaborator that owns features and their items.
//!
//! The link manager only needs to find a feature and mutate it in place;
//! [`ItemStore`] is that narrow seam. [`InMemoryItemStore`] is the
//! implementation used by the CLI, persisted to JSONL by [`jsonl`].
//!
//! # Consistency
//!
//! All link mutations go through `feature_mut`, so an operation holds an
//! exclusive borrow of the feature for its whole duration and no other
//! caller can observe a half-applied change. Across processes, the JSONL
//! backend writes the whole file atomically.

pub mod jsonl;
pub mod record;

use crate::domain::{FeatureId, ItemId, TimelineItem};
use crate::error::{Error, Result};
use crate::feature::Feature;
use std::collections::HashMap;
use tracing::{debug, info};

/// Lookup interface the link manager runs against.
pub trait ItemStore {
    /// Find a feature by id.
    fn feature(&self, id: &FeatureId) -> Option<&Feature>;

    /// Find a feature by id for mutation.
    fn feature_mut(&mut self, id: &FeatureId) -> Option<&mut Feature>;
}

/// `HashMap`-backed item store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    features: HashMap<FeatureId, Feature>,
}

impl ItemStore for InMemoryItemStore {
    fn feature(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.get(id)
    }

    fn feature_mut(&mut self, id: &FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(id)
    }
}

impl InMemoryItemStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of features
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the store holds no features
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Whether a feature with this id exists
    #[must_use]
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.features.contains_key(id)
    }

    /// All features, sorted by id
    #[must_use]
    pub fn features(&self) -> Vec<&Feature> {
        let mut features: Vec<&Feature> = self.features.values().collect();
        features.sort_by(|a, b| a.id.cmp(&b.id));
        features
    }

    /// Add a feature.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateFeature` if the id is taken.
    pub fn insert_feature(&mut self, feature: Feature) -> Result<()> {
        if self.features.contains_key(&feature.id) {
            return Err(Error::DuplicateFeature(feature.id));
        }
        info!(feature = %feature.id, name = %feature.name, "Added feature");
        self.features.insert(feature.id.clone(), feature);
        Ok(())
    }

    /// Create and add an empty feature, returning it.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateFeature` if the id is taken.
    pub fn create_feature(
        &mut self,
        id: impl Into<FeatureId>,
        name: impl Into<String>,
    ) -> Result<&Feature> {
        let feature = Feature::new(id, name);
        let id = feature.id.clone();
        self.insert_feature(feature)?;
        self.features
            .get(&id)
            .ok_or(Error::FeatureNotFound(id))
    }

    /// Remove a feature and everything it owns.
    pub fn remove_feature(&mut self, id: &FeatureId) -> Option<Feature> {
        let removed = self.features.remove(id);
        if removed.is_some() {
            info!(feature = %id, "Removed feature");
        }
        removed
    }

    /// Add a timeline item to a feature.
    ///
    /// # Errors
    ///
    /// - `Error::FeatureNotFound` if the feature doesn't exist
    /// - `Error::DuplicateItem` if the item id is taken within the feature
    pub fn add_item(&mut self, feature_id: &FeatureId, item: TimelineItem) -> Result<()> {
        let feature = self
            .features
            .get_mut(feature_id)
            .ok_or_else(|| Error::FeatureNotFound(feature_id.clone()))?;
        debug!(feature = %feature_id, item = %item.id, "Adding timeline item");
        feature.add_item(item)
    }

    /// Remove a timeline item, dropping every link that touches it.
    ///
    /// Returns the removed item and the number of links dropped.
    ///
    /// # Errors
    ///
    /// - `Error::FeatureNotFound` if the feature doesn't exist
    /// - `Error::ItemNotFound` if the item is not in the feature
    pub fn remove_item(
        &mut self,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> Result<(TimelineItem, usize)> {
        let feature = self
            .features
            .get_mut(feature_id)
            .ok_or_else(|| Error::FeatureNotFound(feature_id.clone()))?;
        let (item, dropped) = feature.remove_item(item_id)?;
        info!(
            feature = %feature_id,
            item = %item_id,
            links_dropped = dropped,
            "Removed timeline item"
        );
        Ok((item, dropped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_feature_rejects_duplicate_ids() {
        let mut store = InMemoryItemStore::new();
        store.create_feature("f1", "Checkout").unwrap();

        let err = store.create_feature("f1", "Other").unwrap_err();
        assert!(matches!(err, Error::DuplicateFeature(_)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn features_are_sorted_by_id() {
        let mut store = InMemoryItemStore::new();
        store.create_feature("f2", "B").unwrap();
        store.create_feature("f1", "A").unwrap();

        let ids: Vec<&str> = store.features().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f2"]);
    }

    #[test]
    fn item_operations_require_the_feature() {
        let mut store = InMemoryItemStore::new();
        let missing = FeatureId::new("nope");

        let err = store
            .add_item(&missing, TimelineItem::new("i1", "Design"))
            .unwrap_err();
        assert!(matches!(err, Error::FeatureNotFound(_)));

        let err = store.remove_item(&missing, &ItemId::new("i1")).unwrap_err();
        assert!(matches!(err, Error::FeatureNotFound(_)));
    }

    #[test]
    fn trait_lookup_finds_features() {
        let mut store = InMemoryItemStore::new();
        store.create_feature("f1", "Checkout").unwrap();
        store
            .add_item(&FeatureId::new("f1"), TimelineItem::new("i1", "Design"))
            .unwrap();

        let feature = ItemStore::feature(&store, &FeatureId::new("f1")).unwrap();
        assert_eq!(feature.items().len(), 1);
        assert!(store.feature(&FeatureId::new("f2")).is_none());

        let removed = store.remove_feature(&FeatureId::new("f1"));
        assert!(removed.is_some());
        assert!(store.is_empty());
    }
}
