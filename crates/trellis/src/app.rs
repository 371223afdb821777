//! Application context for CLI command execution.
//!
//! ```no_run
//! use trellis::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     println!("{} features", app.store().len());
//!     Ok(())
//! }
//! ```

use crate::config::{find_trellis_root, TrellisConfig, CONFIG_FILE_NAME, TRELLIS_DIR_NAME};
use crate::domain::{FeatureId, ItemId};
use crate::error::{ConfigError, Result, StorageError};
use crate::id_generation::IdGenerator;
use crate::links::LinkManager;
use crate::store::jsonl::{load_from_jsonl, save_to_jsonl, LoadWarning};
use crate::store::{InMemoryItemStore, ItemStore};
use std::path::{Path, PathBuf};

/// Loaded repository: configuration, item store, and link manager.
#[derive(Debug)]
pub struct App {
    store: InMemoryItemStore,
    manager: LinkManager,
    config: TrellisConfig,
    trellis_dir: PathBuf,
    data_path: PathBuf,
    warnings: Vec<LoadWarning>,
}

impl App {
    /// Open the repository containing `working_dir`.
    ///
    /// # Errors
    ///
    /// - `ConfigError::NotInitialized` if no `.trellis/` is found upwards
    /// - Config or data file errors
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_trellis_root(working_dir).ok_or(ConfigError::NotInitialized)?;
        let trellis_dir = root_dir.join(TRELLIS_DIR_NAME);

        let config = TrellisConfig::load(&trellis_dir.join(CONFIG_FILE_NAME)).await?;
        let data_path = config.storage.data_path(&root_dir)?;
        let (store, warnings) = load_from_jsonl(&data_path, config.links.cycle_policy).await?;

        Ok(Self {
            store,
            manager: LinkManager::new(config.links.cycle_policy),
            config,
            trellis_dir,
            data_path,
            warnings,
        })
    }

    /// The item store
    #[must_use]
    pub fn store(&self) -> &InMemoryItemStore {
        &self.store
    }

    /// The item store, for mutation
    pub fn store_mut(&mut self) -> &mut InMemoryItemStore {
        &mut self.store
    }

    /// The link manager configured for this repository
    #[must_use]
    pub fn manager(&self) -> LinkManager {
        self.manager
    }

    /// Store and manager together, for link mutations
    pub fn links_mut(&mut self) -> (LinkManager, &mut InMemoryItemStore) {
        (self.manager, &mut self.store)
    }

    /// The loaded configuration
    #[must_use]
    pub fn config(&self) -> &TrellisConfig {
        &self.config
    }

    /// Path to the `.trellis` directory
    #[must_use]
    pub fn trellis_dir(&self) -> &Path {
        &self.trellis_dir
    }

    /// Path to the features data file
    #[must_use]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Problems found while loading the data file
    #[must_use]
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Generate an unused feature ID from its name.
    ///
    /// # Errors
    ///
    /// `StorageError::IdGeneration` if no free ID could be found.
    pub fn new_feature_id(&self, name: &str) -> Result<FeatureId> {
        let mut generator = IdGenerator::with_existing(
            self.config.feature_prefix.as_str(),
            self.store.features().iter().map(|f| f.id.as_str().to_string()),
        );
        let id = generator
            .generate(name, "")
            .map_err(|e| StorageError::IdGeneration(e.to_string()))?;
        Ok(FeatureId::new(id))
    }

    /// Generate an item ID unused within `feature_id`.
    ///
    /// # Errors
    ///
    /// `StorageError::IdGeneration` if no free ID could be found.
    pub fn new_item_id(&self, feature_id: &FeatureId, name: &str) -> Result<ItemId> {
        let existing = self
            .store
            .feature(feature_id)
            .map(|f| {
                f.items()
                    .iter()
                    .map(|item| item.id.as_str().to_string())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let mut generator =
            IdGenerator::with_existing(self.config.item_prefix.as_str(), existing);
        let id = generator
            .generate(name, feature_id.as_str())
            .map_err(|e| StorageError::IdGeneration(e.to_string()))?;
        Ok(ItemId::new(id))
    }

    /// Persist the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file can't be written.
    pub async fn save(&self) -> Result<()> {
        save_to_jsonl(&self.store, &self.data_path).await
    }
}
