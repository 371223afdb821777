//! Trellis - typed links between product timeline items.
//!
//! A feature owns timeline items; items are joined by `dependency` or
//! `complements` links. Every link is visible from both ends, dependency
//! links are kept acyclic, and the graph can be queried for dependencies,
//! dependents, schedules and statistics.
//!
//! ```
//! use trellis::domain::{FeatureId, ItemId, RelationshipType, TimelineItem};
//! use trellis::links::LinkManager;
//! use trellis::store::InMemoryItemStore;
//!
//! let mut store = InMemoryItemStore::new();
//! let feature = FeatureId::new("checkout");
//! store.create_feature(feature.clone(), "Checkout").unwrap();
//! store.add_item(&feature, TimelineItem::new("design", "Design")).unwrap();
//! store.add_item(&feature, TimelineItem::new("build", "Build")).unwrap();
//!
//! let manager = LinkManager::default();
//! let (build, design) = (ItemId::new("build"), ItemId::new("design"));
//! manager
//!     .create_link(&mut store, &feature, &build, &design, RelationshipType::Dependency)
//!     .unwrap();
//!
//! assert!(manager.would_create_circular(&store, &feature, &design, &build));
//! assert_eq!(manager.dependencies(&store, &feature, &build)[0].id, design);
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod feature;
pub mod graph;
pub mod id_generation;
pub mod links;
pub mod store;

// Public CLI module (needed by binary)
pub mod app;
pub mod cli;
pub mod output;

// Command implementations
pub mod commands;

pub mod config;

pub use error::{Error, Result};
pub use links::{CyclePolicy, LinkManager};
