//! Error types for trellis operations.
//!
//! Domain conditions the link manager treats as "no result" (unknown item in
//! a query, duplicate link) are not errors; they surface as empty results or
//! typed outcomes. Errors are reserved for operations that could not run.

use crate::domain::{FeatureId, ItemId};
use std::io;
use thiserror::Error;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Feature not found in the item store.
    #[error("Feature not found: {0}")]
    FeatureNotFound(FeatureId),

    /// Timeline item not found within the feature.
    #[error("Item not found in feature {feature}: {item}")]
    ItemNotFound {
        /// Feature that was searched.
        feature: FeatureId,
        /// Item that could not be resolved.
        item: ItemId,
    },

    /// An item with this id already exists in the feature.
    #[error("Item already exists in feature {feature}: {item}")]
    DuplicateItem {
        /// Feature that already holds the item.
        feature: FeatureId,
        /// The conflicting item id.
        item: ItemId,
    },

    /// A feature with this id already exists in the store.
    #[error("Feature already exists: {0}")]
    DuplicateFeature(FeatureId),

    /// A link from an item to itself was requested.
    #[error("Cannot link an item to itself: {0}")]
    SelfLink(ItemId),

    /// Adding the dependency would close a cycle.
    #[error("Circular dependency: {from} -> {to} would create a cycle")]
    CyclicDependency {
        /// Dependent side of the rejected edge.
        from: ItemId,
        /// Dependency side of the rejected edge.
        to: ItemId,
    },

    /// The dependency subgraph has cycles, so no schedule order exists.
    #[error("Dependency graph contains {} cycle(s)", .0.len())]
    DependencyCycles(Vec<Vec<ItemId>>),

    /// The requested link does not exist.
    #[error("Link not found: {from} -> {to}")]
    LinkNotFound {
        /// Source of the missing link.
        from: ItemId,
        /// Target of the missing link.
        to: ItemId,
    },

    /// Unknown relationship type string.
    #[error("Invalid relationship type: {0}. Must be one of: dependency, complements")]
    InvalidRelationshipType(String),

    /// Storage error.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Serializing a feature failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data file could not be interpreted.
    #[error("Invalid data file format: {0}")]
    InvalidFormat(String),

    /// Identifier generation gave up.
    #[error("ID generation failed: {0}")]
    IdGeneration(String),
}

/// Errors raised while locating or parsing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No `.trellis/` directory in the working directory or its parents.
    #[error("Not a trellis repository (or any parent). Run 'trellis init' first.")]
    NotInitialized,

    /// A `.trellis/` directory already exists.
    #[error("Trellis is already initialized in {0}")]
    AlreadyInitialized(String),

    /// The config file could not be parsed or written.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// An id prefix failed validation.
    #[error("Invalid prefix '{prefix}': {reason}")]
    InvalidPrefix {
        /// The rejected prefix.
        prefix: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<trellis_jsonl::Error> for Error {
    fn from(err: trellis_jsonl::Error) -> Self {
        match err {
            trellis_jsonl::Error::Io(io_err) => Error::Io(io_err),
            trellis_jsonl::Error::Json { source, .. } => {
                StorageError::Serialization(source).into()
            }
            trellis_jsonl::Error::InvalidFormat(msg) => StorageError::InvalidFormat(msg).into(),
        }
    }
}

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;
