//! JSONL persistence for the in-memory item store.
//!
//! One feature per line, in the camelCase shape of [`FeatureRecord`].
//! Loading is resilient: bad lines and inconsistent link records become
//! [`LoadWarning`]s instead of failing the load.

use super::record::FeatureRecord;
use super::InMemoryItemStore;
use crate::domain::{FeatureId, ItemId, LinkDirection, RelationshipType};
use crate::error::Result;
use crate::links::CyclePolicy;
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};
use trellis_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning as JsonlWarning};

/// Non-fatal problems found while loading a data file.
///
/// Loading continues past every one of these; the affected line, item, or
/// link record is skipped or repaired as described per variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A line could not be parsed as a feature
    ///
    /// **Effect**: The line is skipped.
    MalformedJson {
        /// 1-based line number in the file
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A second feature with an id already loaded
    ///
    /// **Effect**: The later line is skipped.
    DuplicateFeature {
        /// The repeated id
        feature_id: FeatureId,
    },

    /// A second item with an id already present in the feature
    ///
    /// **Effect**: The later item and its link records are skipped.
    DuplicateItem {
        /// Owning feature
        feature_id: FeatureId,
        /// The repeated id
        item_id: ItemId,
    },

    /// A link record naming an item the feature doesn't have
    ///
    /// **Effect**: The link is dropped.
    OrphanedLink {
        /// Owning feature
        feature_id: FeatureId,
        /// Dependent side
        source: ItemId,
        /// Dependency side
        target: ItemId,
    },

    /// A link record from an item to itself
    ///
    /// **Effect**: The link is dropped.
    SelfLink {
        /// Owning feature
        feature_id: FeatureId,
        /// The item
        item_id: ItemId,
    },

    /// The same link recorded more than once on one side
    ///
    /// **Effect**: Only the first record is used.
    DuplicateLink {
        /// Owning feature
        feature_id: FeatureId,
        /// Dependent side
        source: ItemId,
        /// Dependency side
        target: ItemId,
    },

    /// A link recorded on only one of its two items
    ///
    /// **Effect**: The link is restored from the side that has it.
    MissingCounterpart {
        /// Owning feature
        feature_id: FeatureId,
        /// Dependent side
        source: ItemId,
        /// Dependency side
        target: ItemId,
        /// Which record was absent
        missing: LinkDirection,
    },

    /// The two records of a link disagree on its type
    ///
    /// **Effect**: The outgoing record's type is kept.
    TypeMismatch {
        /// Owning feature
        feature_id: FeatureId,
        /// Dependent side
        source: ItemId,
        /// Dependency side
        target: ItemId,
        /// Type that was kept
        kept: RelationshipType,
    },

    /// A dependency link that would close a cycle, under the strict policy
    ///
    /// **Effect**: The link is dropped; links are restored oldest first, so
    /// the newest link of the cycle is the one that goes. Under the advisory
    /// policy the link is kept and no warning is raised.
    CircularDependency {
        /// Owning feature
        feature_id: FeatureId,
        /// Dependent side
        source: ItemId,
        /// Dependency side
        target: ItemId,
    },
}

impl LoadWarning {
    /// Short machine-readable kind, used in logs and JSON output
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::DuplicateFeature { .. } => "duplicate_feature",
            Self::DuplicateItem { .. } => "duplicate_item",
            Self::OrphanedLink { .. } => "orphaned_link",
            Self::SelfLink { .. } => "self_link",
            Self::DuplicateLink { .. } => "duplicate_link",
            Self::MissingCounterpart { .. } => "missing_counterpart",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::CircularDependency { .. } => "circular_dependency",
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedJson { line_number, error } => {
                write!(f, "Skipped malformed JSON at line {line_number}: {error}")
            }
            Self::DuplicateFeature { feature_id } => {
                write!(f, "Skipped duplicate feature {feature_id}")
            }
            Self::DuplicateItem {
                feature_id,
                item_id,
            } => write!(f, "Skipped duplicate item {item_id} in {feature_id}"),
            Self::OrphanedLink {
                feature_id,
                source,
                target,
            } => write!(
                f,
                "Dropped link {source} -> {target} in {feature_id}: unknown item"
            ),
            Self::SelfLink {
                feature_id,
                item_id,
            } => write!(f, "Dropped self-link on {item_id} in {feature_id}"),
            Self::DuplicateLink {
                feature_id,
                source,
                target,
            } => write!(
                f,
                "Ignored repeated record of link {source} -> {target} in {feature_id}"
            ),
            Self::MissingCounterpart {
                feature_id,
                source,
                target,
                missing,
            } => write!(
                f,
                "Restored missing {missing} record of link {source} -> {target} in {feature_id}"
            ),
            Self::TypeMismatch {
                feature_id,
                source,
                target,
                kept,
            } => write!(
                f,
                "Link {source} -> {target} in {feature_id} had conflicting types; kept {kept}"
            ),
            Self::CircularDependency {
                feature_id,
                source,
                target,
            } => write!(
                f,
                "Broke circular dependency {source} -> {target} in {feature_id}"
            ),
        }
    }
}

/// Load a store from a JSONL file.
///
/// A missing file yields an empty store. Features are rebuilt with
/// [`FeatureRecord::into_feature`] under `policy`; see [`LoadWarning`] for
/// what gets skipped or repaired.
///
/// # Errors
///
/// Returns an error only if the file exists but cannot be read.
pub async fn load_from_jsonl(
    path: &Path,
    policy: CyclePolicy,
) -> Result<(InMemoryItemStore, Vec<LoadWarning>)> {
    if !tokio::fs::try_exists(path).await? {
        debug!(path = %path.display(), "Data file missing, starting empty");
        return Ok((InMemoryItemStore::new(), Vec::new()));
    }

    let (records, jsonl_warnings) = read_jsonl_resilient::<FeatureRecord, _>(path).await?;

    let mut warnings: Vec<LoadWarning> = jsonl_warnings
        .into_iter()
        .map(|warning| match warning {
            JsonlWarning::MalformedJson { line_number, error } => {
                LoadWarning::MalformedJson { line_number, error }
            }
            JsonlWarning::SkippedLine {
                line_number,
                reason,
            } => LoadWarning::MalformedJson {
                line_number,
                error: reason,
            },
        })
        .collect();

    let mut store = InMemoryItemStore::new();
    for record in records {
        if store.contains(&record.id) {
            warnings.push(LoadWarning::DuplicateFeature {
                feature_id: record.id,
            });
            continue;
        }
        let feature = record.into_feature(policy, &mut warnings);
        store.insert_feature(feature)?;
    }

    for warning in &warnings {
        warn!(kind = warning.kind(), "{warning}");
    }
    info!(
        path = %path.display(),
        features = store.len(),
        warnings = warnings.len(),
        "Loaded features"
    );

    Ok((store, warnings))
}

/// Save a store to a JSONL file atomically.
///
/// Features are written sorted by id, so unchanged data produces an
/// unchanged file.
///
/// # Errors
///
/// Returns an error if serialization or any file operation fails; the
/// existing file is left untouched in that case.
pub async fn save_to_jsonl(store: &InMemoryItemStore, path: &Path) -> Result<()> {
    let records: Vec<FeatureRecord> = store
        .features()
        .into_iter()
        .map(FeatureRecord::from)
        .collect();
    write_jsonl_atomic(path, &records).await?;
    debug!(path = %path.display(), features = records.len(), "Saved features");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimelineItem;
    use crate::store::ItemStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let (store, warnings) = load_from_jsonl(&dir.path().join("none.jsonl"), CyclePolicy::Strict)
            .await
            .unwrap();
        assert!(store.is_empty());
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_items() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("features.jsonl");

        let mut store = InMemoryItemStore::new();
        store.create_feature("f1", "Checkout").unwrap();
        let f1 = FeatureId::new("f1");
        store.add_item(&f1, TimelineItem::new("i1", "Design")).unwrap();
        store.add_item(&f1, TimelineItem::new("i2", "Build")).unwrap();

        save_to_jsonl(&store, &path).await.unwrap();
        let (loaded, warnings) = load_from_jsonl(&path, CyclePolicy::Strict).await.unwrap();

        assert!(warnings.is_empty());
        let feature = loaded.feature(&f1).unwrap();
        let names: Vec<&str> = feature.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Build"]);
    }

    #[tokio::test]
    async fn bad_lines_and_duplicate_features_warn() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("features.jsonl");
        let content = concat!(
            r#"{"id":"f1","name":"One"}"#,
            "\n",
            "{not json\n",
            r#"{"id":"f1","name":"Again"}"#,
            "\n",
        );
        tokio::fs::write(&path, content).await.unwrap();

        let (store, warnings) = load_from_jsonl(&path, CyclePolicy::Strict).await.unwrap();
        assert_eq!(store.len(), 1);
        let kinds: Vec<&str> = warnings.iter().map(LoadWarning::kind).collect();
        assert_eq!(kinds, vec!["malformed_json", "duplicate_feature"]);
        assert!(warnings[0].to_string().contains("line 2"));
    }
}
