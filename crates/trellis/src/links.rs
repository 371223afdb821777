//! Link graph manager.
//!
//! [`LinkManager`] creates, removes, and queries typed links between the
//! timeline items of a feature. It holds no state of its own besides its
//! [`CyclePolicy`]; everything lives in the features of the [`ItemStore`]
//! passed to each call.
//!
//! # Failure Model
//!
//! Mutations return `Err` when the feature or an item cannot be resolved,
//! and typed outcomes ([`LinkOutcome`], [`LinkRemoval`]) for the benign
//! cases. Queries never fail: an unknown feature or item reads as "no
//! links".

use crate::domain::{
    AllLinks, FeatureId, ItemId, LinkRecord, LinkStats, RelationshipType, TimelineItem, TreeEntry,
    ValidationResult,
};
use crate::error::{Error, Result};
use crate::feature::Feature;
use crate::graph::traversal;
use crate::graph::Edge;
use crate::store::ItemStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// How `create_link` treats a dependency link that would close a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Reject the link with `Error::CyclicDependency`
    #[default]
    Strict,

    /// Create the link anyway and log a warning
    Advisory,
}

impl fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("strict"),
            Self::Advisory => f.write_str("advisory"),
        }
    }
}

/// Result of a successful `create_link` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was stored
    Created,

    /// A link between the two items already existed in this direction
    AlreadyLinked,
}

impl LinkOutcome {
    /// Whether a new link was stored
    #[must_use]
    pub fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

/// Result of a successful `delete_link` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRemoval {
    /// The link existed and was removed
    Removed,

    /// There was no link to remove
    NotLinked,
}

/// Manages typed links between timeline items.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkManager {
    policy: CyclePolicy,
}

impl LinkManager {
    /// Create a manager with the given cycle policy
    #[must_use]
    pub fn new(policy: CyclePolicy) -> Self {
        Self { policy }
    }

    /// The active cycle policy
    #[must_use]
    pub fn policy(&self) -> CyclePolicy {
        self.policy
    }

    /// Pre-check a prospective link.
    ///
    /// Every violation is collected; nothing short-circuits. Takes raw
    /// strings so it can vet user input before any parsing. Blank ids are
    /// rejected, but ids are compared exactly as given, the same way
    /// [`LinkManager::create_link`] compares them.
    #[must_use]
    pub fn validate(source_id: &str, target_id: &str, relationship_type: &str) -> ValidationResult {
        let mut errors = Vec::new();

        let source_blank = source_id.trim().is_empty();
        let target_blank = target_id.trim().is_empty();

        if source_blank {
            errors.push("Source item ID is required".to_string());
        }
        if target_blank {
            errors.push("Target item ID is required".to_string());
        }
        if !source_blank && source_id == target_id {
            errors.push("Cannot create a link from an item to itself".to_string());
        }
        if let Err(e) = relationship_type.parse::<RelationshipType>() {
            errors.push(e.to_string());
        }

        ValidationResult::from_errors(errors)
    }

    /// Link `source` to `target` with the given relationship type.
    ///
    /// For a dependency link, `source` depends on `target`. Under
    /// [`CyclePolicy::Strict`] a dependency link that would close a cycle is
    /// rejected before anything is written.
    ///
    /// # Errors
    ///
    /// - `Error::FeatureNotFound` / `Error::ItemNotFound` if lookups fail
    /// - `Error::SelfLink` if `source == target`
    /// - `Error::CyclicDependency` under the strict policy
    pub fn create_link<S: ItemStore + ?Sized>(
        &self,
        store: &mut S,
        feature_id: &FeatureId,
        source: &ItemId,
        target: &ItemId,
        relationship_type: RelationshipType,
    ) -> Result<LinkOutcome> {
        let feature = lookup_mut(store, feature_id)?;
        require_item(feature, source)?;
        require_item(feature, target)?;

        if source == target {
            return Err(Error::SelfLink(source.clone()));
        }

        if let Some(existing) = feature.links().find(source, target) {
            info!(
                feature = %feature_id,
                source = %source,
                target = %target,
                existing_type = %existing.relationship_type,
                "Items already linked"
            );
            return Ok(LinkOutcome::AlreadyLinked);
        }

        if relationship_type.is_blocking()
            && traversal::would_create_cycle(feature.links(), source, target)
        {
            match self.policy {
                CyclePolicy::Strict => {
                    warn!(
                        feature = %feature_id,
                        source = %source,
                        target = %target,
                        "Rejected dependency that would create a cycle"
                    );
                    return Err(Error::CyclicDependency {
                        from: source.clone(),
                        to: target.clone(),
                    });
                }
                CyclePolicy::Advisory => {
                    warn!(
                        feature = %feature_id,
                        source = %source,
                        target = %target,
                        "Creating dependency that closes a cycle"
                    );
                }
            }
        }

        if feature
            .links_mut()
            .insert(source, target, relationship_type, Utc::now())
            .is_none()
        {
            return Ok(LinkOutcome::AlreadyLinked);
        }
        feature.touch();

        info!(
            feature = %feature_id,
            source = %source,
            target = %target,
            relationship_type = %relationship_type,
            "Created link"
        );
        Ok(LinkOutcome::Created)
    }

    /// Remove the link from `source` to `target`.
    ///
    /// Removing a link that doesn't exist is not an error. The feature's
    /// `updated_at` is bumped either way.
    ///
    /// # Errors
    ///
    /// `Error::FeatureNotFound` / `Error::ItemNotFound` if lookups fail.
    pub fn delete_link<S: ItemStore + ?Sized>(
        &self,
        store: &mut S,
        feature_id: &FeatureId,
        source: &ItemId,
        target: &ItemId,
    ) -> Result<LinkRemoval> {
        let feature = lookup_mut(store, feature_id)?;
        require_item(feature, source)?;
        require_item(feature, target)?;

        let removed = feature.links_mut().remove(source, target);
        feature.touch();

        if let Some(link) = removed {
            info!(
                feature = %feature_id,
                source = %source,
                target = %target,
                relationship_type = %link.relationship_type,
                "Deleted link"
            );
            Ok(LinkRemoval::Removed)
        } else {
            debug!(feature = %feature_id, source = %source, target = %target, "No link to delete");
            Ok(LinkRemoval::NotLinked)
        }
    }

    /// Change the type of an existing link, returning the previous type.
    ///
    /// Turning a link into a dependency goes through the same cycle check
    /// as `create_link`.
    ///
    /// # Errors
    ///
    /// - `Error::FeatureNotFound` / `Error::ItemNotFound` if lookups fail
    /// - `Error::LinkNotFound` if there is no link from `source` to `target`
    /// - `Error::CyclicDependency` under the strict policy
    pub fn set_relationship_type<S: ItemStore + ?Sized>(
        &self,
        store: &mut S,
        feature_id: &FeatureId,
        source: &ItemId,
        target: &ItemId,
        relationship_type: RelationshipType,
    ) -> Result<RelationshipType> {
        let feature = lookup_mut(store, feature_id)?;
        require_item(feature, source)?;
        require_item(feature, target)?;

        let Some(current) = feature.links().find(source, target).map(|l| l.relationship_type)
        else {
            return Err(Error::LinkNotFound {
                from: source.clone(),
                to: target.clone(),
            });
        };
        if current == relationship_type {
            return Ok(current);
        }

        if relationship_type.is_blocking()
            && traversal::would_create_cycle(feature.links(), source, target)
        {
            if self.policy == CyclePolicy::Strict {
                warn!(
                    feature = %feature_id,
                    source = %source,
                    target = %target,
                    "Rejected retype that would create a dependency cycle"
                );
                return Err(Error::CyclicDependency {
                    from: source.clone(),
                    to: target.clone(),
                });
            }
            warn!(
                feature = %feature_id,
                source = %source,
                target = %target,
                "Retyped link closes a dependency cycle"
            );
        }

        let previous = feature
            .links_mut()
            .retype(source, target, relationship_type)
            .ok_or_else(|| Error::LinkNotFound {
                from: source.clone(),
                to: target.clone(),
            })?;
        feature.touch();

        info!(
            feature = %feature_id,
            source = %source,
            target = %target,
            from_type = %previous,
            to_type = %relationship_type,
            "Changed link type"
        );
        Ok(previous)
    }

    /// Records on `item_id` pointing at other items, in stored order.
    #[must_use]
    pub fn outgoing_links<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> Vec<LinkRecord> {
        lookup(store, feature_id)
            .map(|feature| {
                feature
                    .links()
                    .outgoing(item_id)
                    .iter()
                    .map(Edge::outgoing_record)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Records on `item_id` naming items that point at it, in stored order.
    #[must_use]
    pub fn incoming_links<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> Vec<LinkRecord> {
        lookup(store, feature_id)
            .map(|feature| {
                feature
                    .links()
                    .incoming(item_id)
                    .iter()
                    .map(Edge::incoming_record)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Both directions at once.
    #[must_use]
    pub fn all_links<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> AllLinks {
        AllLinks {
            incoming: self.incoming_links(store, feature_id, item_id),
            outgoing: self.outgoing_links(store, feature_id, item_id),
        }
    }

    /// Whether `source` has an outgoing link to `target`, of any type.
    #[must_use]
    pub fn link_exists<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        source: &ItemId,
        target: &ItemId,
    ) -> bool {
        lookup(store, feature_id).is_some_and(|feature| feature.links().find(source, target).is_some())
    }

    /// Link counts for a feature, each link counted once.
    #[must_use]
    pub fn stats<S: ItemStore + ?Sized>(&self, store: &S, feature_id: &FeatureId) -> LinkStats {
        lookup(store, feature_id)
            .map(|feature| feature.links().stats())
            .unwrap_or_default()
    }

    /// Items `item_id` directly depends on, in stored order.
    #[must_use]
    pub fn dependencies<'s, S: ItemStore + ?Sized>(
        &self,
        store: &'s S,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> Vec<&'s TimelineItem> {
        let Some(feature) = lookup(store, feature_id) else {
            return Vec::new();
        };
        feature
            .links()
            .outgoing(item_id)
            .into_iter()
            .filter(|edge| edge.link.relationship_type.is_blocking())
            .filter_map(|edge| feature.item(edge.target))
            .collect()
    }

    /// Items that directly depend on `item_id`, in stored order.
    #[must_use]
    pub fn dependents<'s, S: ItemStore + ?Sized>(
        &self,
        store: &'s S,
        feature_id: &FeatureId,
        item_id: &ItemId,
    ) -> Vec<&'s TimelineItem> {
        let Some(feature) = lookup(store, feature_id) else {
            return Vec::new();
        };
        feature
            .links()
            .incoming(item_id)
            .into_iter()
            .filter(|edge| edge.link.relationship_type.is_blocking())
            .filter_map(|edge| feature.item(edge.source))
            .collect()
    }

    /// Would a dependency link `source -> target` close a cycle?
    ///
    /// `source == target` always would. An unknown feature never does.
    #[must_use]
    pub fn would_create_circular<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        source: &ItemId,
        target: &ItemId,
    ) -> bool {
        lookup(store, feature_id)
            .is_some_and(|feature| traversal::would_create_cycle(feature.links(), source, target))
    }

    /// Transitive dependencies of `item_id`, breadth first.
    #[must_use]
    pub fn dependency_tree<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        item_id: &ItemId,
        max_depth: Option<usize>,
    ) -> Vec<TreeEntry> {
        lookup(store, feature_id)
            .map(|feature| traversal::dependency_tree(feature.links(), item_id, max_depth))
            .unwrap_or_default()
    }

    /// Transitive dependents of `item_id`, breadth first.
    #[must_use]
    pub fn dependents_tree<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
        item_id: &ItemId,
        max_depth: Option<usize>,
    ) -> Vec<TreeEntry> {
        lookup(store, feature_id)
            .map(|feature| traversal::dependents_tree(feature.links(), item_id, max_depth))
            .unwrap_or_default()
    }

    /// All items of a feature ordered so dependencies come first.
    ///
    /// # Errors
    ///
    /// `Error::DependencyCycles` if the dependency links contain a cycle,
    /// which can only happen after advisory-mode writes.
    pub fn schedule_order<'s, S: ItemStore + ?Sized>(
        &self,
        store: &'s S,
        feature_id: &FeatureId,
    ) -> Result<Vec<&'s TimelineItem>> {
        let Some(feature) = lookup(store, feature_id) else {
            return Ok(Vec::new());
        };
        let order = traversal::schedule_order(feature.links()).map_err(Error::DependencyCycles)?;
        Ok(order.iter().filter_map(|id| feature.item(id)).collect())
    }

    /// Groups of items whose dependency links form cycles.
    #[must_use]
    pub fn dependency_cycles<S: ItemStore + ?Sized>(
        &self,
        store: &S,
        feature_id: &FeatureId,
    ) -> Vec<Vec<ItemId>> {
        lookup(store, feature_id)
            .map(|feature| traversal::dependency_cycles(feature.links()))
            .unwrap_or_default()
    }
}

fn lookup<'s, S: ItemStore + ?Sized>(store: &'s S, feature_id: &FeatureId) -> Option<&'s Feature> {
    let feature = store.feature(feature_id);
    if feature.is_none() {
        debug!(feature = %feature_id, "Feature not found, treating as empty");
    }
    feature
}

fn lookup_mut<'s, S: ItemStore + ?Sized>(
    store: &'s mut S,
    feature_id: &FeatureId,
) -> Result<&'s mut Feature> {
    store.feature_mut(feature_id).ok_or_else(|| {
        warn!(feature = %feature_id, "Feature not found");
        Error::FeatureNotFound(feature_id.clone())
    })
}

fn require_item(feature: &Feature, item_id: &ItemId) -> Result<()> {
    if feature.contains_item(item_id) {
        Ok(())
    } else {
        warn!(feature = %feature.id, item = %item_id, "Item not found");
        Err(Error::ItemNotFound {
            feature: feature.id.clone(),
            item: item_id.clone(),
        })
    }
}
