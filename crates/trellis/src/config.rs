//! Repository configuration.
//!
//! Lives in `.trellis/config.yaml`:
//!
//! ```yaml
//! feature-prefix: feat
//! item-prefix: item
//! links:
//!   cycle-policy: strict
//! storage:
//!   backend: jsonl
//!   data_file: .trellis/features.jsonl
//! ```

use crate::error::{ConfigError, Result};
use crate::links::CyclePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default feature ID prefix
pub const DEFAULT_FEATURE_PREFIX: &str = "feat";

/// Default timeline item ID prefix
pub const DEFAULT_ITEM_PREFIX: &str = "item";

/// Name of the trellis directory
pub const TRELLIS_DIR_NAME: &str = ".trellis";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the features data file
pub const FEATURES_FILE_NAME: &str = "features.jsonl";

/// Name of the gitignore file within .trellis
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Minimum prefix length
pub const MIN_PREFIX_LENGTH: usize = 2;

/// Maximum prefix length
pub const MAX_PREFIX_LENGTH: usize = 20;

/// Maximum directory depth to traverse when searching for the trellis root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrellisConfig {
    /// Prefix for generated feature IDs
    #[serde(rename = "feature-prefix")]
    pub feature_prefix: String,

    /// Prefix for generated timeline item IDs
    #[serde(rename = "item-prefix")]
    pub item_prefix: String,

    /// Link behaviour
    #[serde(default)]
    pub links: LinksConfig,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Link behaviour section
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinksConfig {
    /// What to do with a dependency link that would close a cycle
    #[serde(rename = "cycle-policy", default)]
    pub cycle_policy: CyclePolicy,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Storage backend type; only `jsonl` exists
    pub backend: String,

    /// Path to the data file, relative to the repository root
    pub data_file: String,
}

impl StorageConfig {
    /// Resolve the data file path against the repository root.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unknown backend.
    pub fn data_path(&self, root_dir: &Path) -> Result<PathBuf> {
        match self.backend.as_str() {
            "jsonl" => Ok(root_dir.join(&self.data_file)),
            other => Err(ConfigError::Invalid(format!(
                "Unknown storage backend '{other}'. Supported: jsonl"
            ))
            .into()),
        }
    }
}

impl TrellisConfig {
    /// Create a configuration with the given prefixes
    #[must_use]
    pub fn new(feature_prefix: &str, item_prefix: &str) -> Self {
        Self {
            feature_prefix: feature_prefix.to_string(),
            item_prefix: item_prefix.to_string(),
            links: LinksConfig::default(),
            storage: StorageConfig {
                backend: "jsonl".to_string(),
                data_file: format!("{TRELLIS_DIR_NAME}/{FEATURES_FILE_NAME}"),
            },
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid YAML.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_prefix(&config.feature_prefix)?;
        validate_prefix(&config.item_prefix)?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Invalid(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FEATURE_PREFIX, DEFAULT_ITEM_PREFIX)
    }
}

/// Validate an ID prefix: 2-20 ASCII alphanumeric characters.
///
/// Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPrefix` describing the first rule broken.
pub fn validate_prefix(prefix: &str) -> Result<()> {
    let reason = if prefix.len() < MIN_PREFIX_LENGTH {
        format!("must be at least {MIN_PREFIX_LENGTH} characters")
    } else if prefix.len() > MAX_PREFIX_LENGTH {
        format!("cannot exceed {MAX_PREFIX_LENGTH} characters")
    } else if !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        "must contain only alphanumeric characters".to_string()
    } else {
        return Ok(());
    };

    Err(ConfigError::InvalidPrefix {
        prefix: prefix.to_string(),
        reason,
    }
    .into())
}

/// Find the directory containing `.trellis/`, searching upwards.
///
/// Gives up at the filesystem root or after [`MAX_TRAVERSAL_DEPTH`] levels.
#[must_use]
pub fn find_trellis_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(TRELLIS_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::short("ab")]
    #[case::word("feat")]
    #[case::alphanumeric("team42")]
    #[case::mixed_case("RoadMap")]
    #[case::max_length("a1b2c3d4e5f6g7h8i9j0")]
    fn valid_prefixes(#[case] prefix: &str) {
        assert!(validate_prefix(prefix).is_ok());
    }

    #[rstest]
    #[case::single("a", "at least 2")]
    #[case::empty("", "at least 2")]
    #[case::too_long("a".repeat(21), "cannot exceed 20")]
    #[case::hyphen("my-feat", "alphanumeric")]
    #[case::space("my feat", "alphanumeric")]
    fn invalid_prefixes(#[case] prefix: impl AsRef<str>, #[case] expected: &str) {
        let err = validate_prefix(prefix.as_ref()).unwrap_err().to_string();
        assert!(err.contains(expected), "unexpected message: {err}");
    }

    #[test]
    fn defaults() {
        let config = TrellisConfig::default();
        assert_eq!(config.feature_prefix, "feat");
        assert_eq!(config.item_prefix, "item");
        assert_eq!(config.links.cycle_policy, CyclePolicy::Strict);
        assert_eq!(config.storage.data_file, ".trellis/features.jsonl");
    }

    #[test]
    fn yaml_uses_kebab_keys_and_defaults_links() {
        let yaml = "\
feature-prefix: road
item-prefix: step
storage:
  backend: jsonl
  data_file: data/features.jsonl
";
        let config: TrellisConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.feature_prefix, "road");
        assert_eq!(config.links.cycle_policy, CyclePolicy::Strict);

        let advisory: TrellisConfig =
            serde_yaml::from_str(&format!("{yaml}links:\n  cycle-policy: advisory\n")).unwrap();
        assert_eq!(advisory.links.cycle_policy, CyclePolicy::Advisory);
    }

    #[test]
    fn data_path_rejects_unknown_backend() {
        let mut storage = TrellisConfig::default().storage;
        let root = Path::new("/repo");
        assert_eq!(
            storage.data_path(root).unwrap(),
            PathBuf::from("/repo/.trellis/features.jsonl")
        );

        storage.backend = "postgres".to_string();
        assert!(storage.data_path(root).is_err());
    }

    #[tokio::test]
    async fn save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut config = TrellisConfig::new("road", "step");
        config.links.cycle_policy = CyclePolicy::Advisory;

        config.save(&path).await.unwrap();
        assert_eq!(TrellisConfig::load(&path).await.unwrap(), config);
    }

    #[tokio::test]
    async fn load_rejects_bad_prefix() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        TrellisConfig::new("x", "step").save(&path).await.unwrap();
        assert!(TrellisConfig::load(&path).await.is_err());
    }

    #[test]
    fn root_is_found_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(TRELLIS_DIR_NAME)).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_trellis_root(&nested).unwrap(), dir.path());
    }
}
