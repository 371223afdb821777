//! Domain types for timeline item links.
//!
//! This module contains the identifiers, relationship kinds, and the
//! `LinkRecord` wire shape shared by the link graph, the item store, and
//! the CLI.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a feature (the work item owning timeline items)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    /// Create a new feature ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a timeline item, unique within its feature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create a new item ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Kind of relationship a link expresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipType {
    /// Ordering/blocking link; the dependency subgraph must stay acyclic
    Dependency,

    /// Informational association; may form cycles
    Complements,
}

impl RelationshipType {
    /// Every relationship type, in display order.
    pub const ALL: [Self; 2] = [Self::Dependency, Self::Complements];

    /// Wire name of the relationship type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::Complements => "complements",
        }
    }

    /// Whether edges of this type take part in cycle detection.
    #[must_use]
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Dependency)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependency" => Ok(Self::Dependency),
            "complements" => Ok(Self::Complements),
            other => Err(Error::InvalidRelationshipType(other.to_string())),
        }
    }
}

/// Which endpoint of an edge a `LinkRecord` describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    /// The record lives on the edge's source item
    Outgoing,

    /// The record lives on the edge's target item
    Incoming,
}

impl fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outgoing => f.write_str("outgoing"),
            Self::Incoming => f.write_str("incoming"),
        }
    }
}

/// One endpoint view of a directed link.
///
/// Every edge has exactly two records: an `Outgoing` record on its source
/// item naming the target, and an `Incoming` record on its target item
/// naming the source. On the wire these look like
/// `{"direction":"outgoing","targetId":"i2","relationshipType":"dependency","createdAt":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "direction",
    rename_all = "lowercase",
    rename_all_fields = "camelCase"
)]
pub enum LinkRecord {
    /// Record stored on the source item
    Outgoing {
        /// The item this link points at
        target_id: ItemId,
        /// Kind of relationship
        relationship_type: RelationshipType,
        /// When the link was created
        created_at: DateTime<Utc>,
    },

    /// Record stored on the target item
    Incoming {
        /// The item this link comes from
        source_id: ItemId,
        /// Kind of relationship
        relationship_type: RelationshipType,
        /// When the link was created
        created_at: DateTime<Utc>,
    },
}

impl LinkRecord {
    /// Direction of this record
    #[must_use]
    pub fn direction(&self) -> LinkDirection {
        match self {
            Self::Outgoing { .. } => LinkDirection::Outgoing,
            Self::Incoming { .. } => LinkDirection::Incoming,
        }
    }

    /// The item at the other end of the link
    #[must_use]
    pub fn other_id(&self) -> &ItemId {
        match self {
            Self::Outgoing { target_id, .. } => target_id,
            Self::Incoming { source_id, .. } => source_id,
        }
    }

    /// Kind of relationship
    #[must_use]
    pub fn relationship_type(&self) -> RelationshipType {
        match self {
            Self::Outgoing {
                relationship_type, ..
            }
            | Self::Incoming {
                relationship_type, ..
            } => *relationship_type,
        }
    }

    /// Creation timestamp
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Outgoing { created_at, .. } | Self::Incoming { created_at, .. } => *created_at,
        }
    }
}

/// A schedulable sub-unit of a feature; the node type of the link graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Unique identifier within the feature
    pub id: ItemId,

    /// Display label
    pub name: String,
}

impl TimelineItem {
    /// Create a new timeline item
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Outcome of a link pre-check; errors are accumulated, never short-circuited
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    /// True when `errors` is empty
    pub valid: bool,

    /// Human-readable descriptions of every violation found
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Build a result from a list of violations
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Both link directions of a single item
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AllLinks {
    /// Records naming items that link to this one
    pub incoming: Vec<LinkRecord>,

    /// Records naming items this one links to
    pub outgoing: Vec<LinkRecord>,
}

/// Per-relationship-type edge counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TypeCounts {
    /// Number of dependency edges
    pub dependency: usize,

    /// Number of complements edges
    pub complements: usize,
}

impl TypeCounts {
    /// Count one more edge of the given type
    pub fn record(&mut self, relationship_type: RelationshipType) {
        match relationship_type {
            RelationshipType::Dependency => self.dependency += 1,
            RelationshipType::Complements => self.complements += 1,
        }
    }
}

/// Edge statistics for a feature, each edge counted once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LinkStats {
    /// Total number of edges
    pub total: usize,

    /// Breakdown by relationship type
    #[serde(rename = "byType")]
    pub by_type: TypeCounts,
}

/// One node reached during a transitive dependency traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    /// The reached item
    pub item_id: ItemId,

    /// The item through which it was first reached
    pub parent: ItemId,

    /// Distance from the root (1 = direct)
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case("dependency", RelationshipType::Dependency)]
    #[case("complements", RelationshipType::Complements)]
    fn relationship_type_parses_wire_names(#[case] input: &str, #[case] expected: RelationshipType) {
        assert_eq!(input.parse::<RelationshipType>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[rstest]
    #[case("Dependency")]
    #[case("blocks")]
    #[case("")]
    fn relationship_type_rejects_unknown_names(#[case] input: &str) {
        let err = input.parse::<RelationshipType>().unwrap_err();
        assert!(matches!(err, Error::InvalidRelationshipType(ref s) if s == input));
    }

    #[test]
    fn only_dependency_is_blocking() {
        assert!(RelationshipType::Dependency.is_blocking());
        assert!(!RelationshipType::Complements.is_blocking());
    }

    #[test]
    fn outgoing_record_uses_camel_case_wire_shape() {
        let record = LinkRecord::Outgoing {
            target_id: ItemId::new("i2"),
            relationship_type: RelationshipType::Dependency,
            created_at: ts(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["direction"], "outgoing");
        assert_eq!(json["targetId"], "i2");
        assert_eq!(json["relationshipType"], "dependency");
        assert!(json.get("sourceId").is_none());

        let back: LinkRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn incoming_record_parses_from_application_json() {
        let json = r#"{"direction":"incoming","sourceId":"i1","relationshipType":"complements","createdAt":"2024-03-01T12:00:00Z"}"#;
        let record: LinkRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.direction(), LinkDirection::Incoming);
        assert_eq!(record.other_id(), &ItemId::new("i1"));
        assert_eq!(record.relationship_type(), RelationshipType::Complements);
        assert_eq!(record.created_at(), ts());
    }

    #[test]
    fn validation_result_validity_follows_errors() {
        assert!(ValidationResult::from_errors(vec![]).valid);
        assert!(!ValidationResult::from_errors(vec!["x".into()]).valid);
    }

    #[test]
    fn stats_serialize_with_by_type_key() {
        let mut by_type = TypeCounts::default();
        by_type.record(RelationshipType::Dependency);
        by_type.record(RelationshipType::Dependency);
        let stats = LinkStats { total: 2, by_type };

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["byType"]["dependency"], 2);
        assert_eq!(json["byType"]["complements"], 0);
    }
}
