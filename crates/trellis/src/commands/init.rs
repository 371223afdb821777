//! Implementation of the `init` command.
//!
//! Creates the `.trellis/` directory with configuration, an empty features
//! file, and a `.gitignore` for temporary files.

use crate::config::{
    validate_prefix, TrellisConfig, CONFIG_FILE_NAME, DEFAULT_FEATURE_PREFIX, DEFAULT_ITEM_PREFIX,
    FEATURES_FILE_NAME, GITIGNORE_FILE_NAME, TRELLIS_DIR_NAME,
};
use crate::error::{ConfigError, Result};
use crate::links::CyclePolicy;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions<'a> {
    /// Feature ID prefix; defaults to `feat`
    pub feature_prefix: Option<&'a str>,

    /// Item ID prefix; defaults to `item`
    pub item_prefix: Option<&'a str>,

    /// Cycle policy to record in the config
    pub cycle_policy: CyclePolicy,
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created trellis directory
    pub trellis_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created features file
    pub features_file: PathBuf,
    /// The configuration written
    pub config: TrellisConfig,
}

/// Initialize a trellis repository in `base_dir`.
///
/// # Errors
///
/// - `ConfigError::AlreadyInitialized` if `.trellis/` already exists
/// - `ConfigError::InvalidPrefix` for a bad prefix
/// - IO errors from creating files
pub async fn init(base_dir: &Path, options: InitOptions<'_>) -> Result<InitResult> {
    let feature_prefix = options.feature_prefix.unwrap_or(DEFAULT_FEATURE_PREFIX).trim();
    let item_prefix = options.item_prefix.unwrap_or(DEFAULT_ITEM_PREFIX).trim();
    validate_prefix(feature_prefix)?;
    validate_prefix(item_prefix)?;

    let trellis_dir = base_dir.join(TRELLIS_DIR_NAME);
    if trellis_dir.exists() {
        return Err(ConfigError::AlreadyInitialized(base_dir.display().to_string()).into());
    }

    fs::create_dir_all(&trellis_dir).await?;

    let config_file = trellis_dir.join(CONFIG_FILE_NAME);
    let mut config = TrellisConfig::new(feature_prefix, item_prefix);
    config.links.cycle_policy = options.cycle_policy;
    config.save(&config_file).await?;

    let features_file = trellis_dir.join(FEATURES_FILE_NAME);
    fs::write(&features_file, "").await?;

    let gitignore = "\
# Temporary files from atomic writes
*.tmp
";
    fs::write(trellis_dir.join(GITIGNORE_FILE_NAME), gitignore).await?;

    info!(path = %trellis_dir.display(), "Initialized trellis repository");

    Ok(InitResult {
        trellis_dir,
        config_file,
        features_file,
        config,
    })
}
