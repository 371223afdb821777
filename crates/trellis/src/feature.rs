//! Features: the work items that own timeline items and their links.

use crate::domain::{FeatureId, ItemId, LinkRecord, TimelineItem};
use crate::error::{Error, Result};
use crate::graph::LinkGraph;
use chrono::{DateTime, Utc};

/// A feature with its ordered timeline items and their link graph.
///
/// Items and the graph's nodes are kept in lockstep: every item is a node,
/// and removing an item removes every link touching it.
#[derive(Debug, Clone)]
pub struct Feature {
    /// Unique identifier
    pub id: FeatureId,

    /// Display name
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp; bumped by every link mutation
    pub updated_at: DateTime<Utc>,

    items: Vec<TimelineItem>,
    links: LinkGraph,
}

impl Feature {
    /// Create an empty feature
    pub fn new(id: impl Into<FeatureId>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            items: Vec::new(),
            links: LinkGraph::new(),
        }
    }

    /// Timeline items in stored order
    #[must_use]
    pub fn items(&self) -> &[TimelineItem] {
        &self.items
    }

    /// Look up an item by id
    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&TimelineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Whether the item belongs to this feature
    #[must_use]
    pub fn contains_item(&self, id: &ItemId) -> bool {
        self.links.contains(id)
    }

    /// Append an item.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateItem` if an item with the same id exists.
    pub fn add_item(&mut self, item: TimelineItem) -> Result<()> {
        if !self.links.add_node(item.id.clone()) {
            return Err(Error::DuplicateItem {
                feature: self.id.clone(),
                item: item.id,
            });
        }
        self.items.push(item);
        self.touch();
        Ok(())
    }

    /// Remove an item and every link touching it.
    ///
    /// # Errors
    ///
    /// Returns `Error::ItemNotFound` if the item is not in this feature.
    pub fn remove_item(&mut self, id: &ItemId) -> Result<(TimelineItem, usize)> {
        let Some(position) = self.items.iter().position(|item| &item.id == id) else {
            return Err(Error::ItemNotFound {
                feature: self.id.clone(),
                item: id.clone(),
            });
        };
        let dropped = self.links.remove_node(id).unwrap_or(0);
        let item = self.items.remove(position);
        self.touch();
        Ok((item, dropped))
    }

    /// The link graph
    #[must_use]
    pub fn links(&self) -> &LinkGraph {
        &self.links
    }

    /// Mutable access to the link graph.
    ///
    /// Item nodes cannot be added or removed through this handle without
    /// going out of step with `items`; use `add_item`/`remove_item`.
    pub(crate) fn links_mut(&mut self) -> &mut LinkGraph {
        &mut self.links
    }

    /// The derived `linkedItems` sequence of an item
    #[must_use]
    pub fn linked_items(&self, id: &ItemId) -> Vec<LinkRecord> {
        self.links.linked_items(id)
    }

    /// Mark the feature as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
