//! Wire format for persisted features.
//!
//! A feature is stored as one JSON object whose timeline items each carry
//! their own `linkedItems` array, i.e. every link appears twice (outgoing on
//! its source, incoming on its target). Saving projects both records from
//! the single edge store; loading rebuilds the edge store and reports
//! anything it had to repair or drop.

use super::jsonl::LoadWarning;
use crate::domain::{
    FeatureId, ItemId, LinkDirection, LinkRecord, RelationshipType, TimelineItem,
};
use crate::feature::Feature;
use crate::graph::traversal::would_create_cycle;
use crate::links::CyclePolicy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Persisted feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    /// Feature id
    pub id: FeatureId,

    /// Display name
    pub name: String,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,

    /// Items in stored order
    #[serde(default)]
    pub timeline_items: Vec<TimelineItemRecord>,
}

/// Persisted timeline item with its redundant link records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineItemRecord {
    /// Item id
    pub id: ItemId,

    /// Display name
    pub name: String,

    /// Link records on this item
    #[serde(default)]
    pub linked_items: Vec<LinkRecord>,
}

impl From<&Feature> for FeatureRecord {
    fn from(feature: &Feature) -> Self {
        Self {
            id: feature.id.clone(),
            name: feature.name.clone(),
            created_at: feature.created_at,
            updated_at: feature.updated_at,
            timeline_items: feature
                .items()
                .iter()
                .map(|item| TimelineItemRecord {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    linked_items: feature.linked_items(&item.id),
                })
                .collect(),
        }
    }
}

/// Link data gathered from one side of the stored records.
#[derive(Debug, Clone, Copy)]
struct Side {
    relationship_type: RelationshipType,
    created_at: DateTime<Utc>,
    /// Position of the record in the file, for breaking timestamp ties
    position: usize,
}

impl FeatureRecord {
    /// Rebuild an in-memory feature, repairing what can be repaired.
    ///
    /// Outgoing records are authoritative. An edge recorded on only one side
    /// is restored from that side. Links to unknown items, self-links and
    /// repeated links are dropped. A dependency link that would close a
    /// cycle is dropped under [`CyclePolicy::Strict`] and kept under
    /// [`CyclePolicy::Advisory`]. Every repair or drop is reported in
    /// `warnings`.
    pub fn into_feature(self, policy: CyclePolicy, warnings: &mut Vec<LoadWarning>) -> Feature {
        let feature_id = self.id.clone();
        let mut feature = Feature::new(self.id, self.name);

        let mut outgoing: Vec<((ItemId, ItemId), Side)> = Vec::new();
        let mut incoming: Vec<((ItemId, ItemId), Side)> = Vec::new();

        let mut position = 0;
        for item in self.timeline_items {
            if let Err(e) = feature.add_item(TimelineItem::new(item.id.clone(), item.name)) {
                tracing::debug!(error = %e, "Skipping duplicate item record");
                warnings.push(LoadWarning::DuplicateItem {
                    feature_id: feature_id.clone(),
                    item_id: item.id,
                });
                continue;
            }
            for record in item.linked_items {
                let side = Side {
                    relationship_type: record.relationship_type(),
                    created_at: record.created_at(),
                    position,
                };
                position += 1;
                match record {
                    LinkRecord::Outgoing { target_id, .. } => {
                        outgoing.push(((item.id.clone(), target_id), side));
                    }
                    LinkRecord::Incoming { source_id, .. } => {
                        incoming.push(((source_id, item.id.clone()), side));
                    }
                }
            }
        }

        let incoming_sides = dedup_sides(&feature_id, incoming, warnings);
        let outgoing_sides = dedup_sides(&feature_id, outgoing, warnings);
        let outgoing_keys: HashSet<&(ItemId, ItemId)> =
            outgoing_sides.iter().map(|(key, _)| key).collect();

        let mut candidates: Vec<((ItemId, ItemId), Side)> = Vec::new();
        let incoming_lookup: HashMap<&(ItemId, ItemId), Side> =
            incoming_sides.iter().map(|(key, side)| (key, *side)).collect();

        for (key, side) in &outgoing_sides {
            match incoming_lookup.get(key) {
                None => warnings.push(LoadWarning::MissingCounterpart {
                    feature_id: feature_id.clone(),
                    source: key.0.clone(),
                    target: key.1.clone(),
                    missing: LinkDirection::Incoming,
                }),
                Some(twin) if twin.relationship_type != side.relationship_type => {
                    warnings.push(LoadWarning::TypeMismatch {
                        feature_id: feature_id.clone(),
                        source: key.0.clone(),
                        target: key.1.clone(),
                        kept: side.relationship_type,
                    });
                }
                Some(_) => {}
            }
            candidates.push((key.clone(), *side));
        }

        for (key, side) in &incoming_sides {
            if outgoing_keys.contains(key) {
                continue;
            }
            warnings.push(LoadWarning::MissingCounterpart {
                feature_id: feature_id.clone(),
                source: key.0.clone(),
                target: key.1.clone(),
                missing: LinkDirection::Outgoing,
            });
            candidates.push((key.clone(), *side));
        }

        candidates.sort_by_key(|(_, side)| (side.created_at, side.position));

        for ((source, target), side) in candidates {
            if source == target {
                warnings.push(LoadWarning::SelfLink {
                    feature_id: feature_id.clone(),
                    item_id: source,
                });
                continue;
            }
            if !feature.contains_item(&source) || !feature.contains_item(&target) {
                warnings.push(LoadWarning::OrphanedLink {
                    feature_id: feature_id.clone(),
                    source,
                    target,
                });
                continue;
            }
            if policy == CyclePolicy::Strict
                && side.relationship_type.is_blocking()
                && would_create_cycle(feature.links(), &source, &target)
            {
                warnings.push(LoadWarning::CircularDependency {
                    feature_id: feature_id.clone(),
                    source,
                    target,
                });
                continue;
            }
            feature
                .links_mut()
                .insert(&source, &target, side.relationship_type, side.created_at);
        }

        feature.created_at = self.created_at;
        feature.updated_at = self.updated_at;
        feature
    }
}

/// Keep the first record for each `(source, target)` pair.
fn dedup_sides(
    feature_id: &FeatureId,
    sides: Vec<((ItemId, ItemId), Side)>,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<((ItemId, ItemId), Side)> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(sides.len());
    for (key, side) in sides {
        if seen.insert(key.clone()) {
            kept.push((key, side));
        } else {
            warnings.push(LoadWarning::DuplicateLink {
                feature_id: feature_id.clone(),
                source: key.0,
                target: key.1,
            });
        }
    }
    kept
}
