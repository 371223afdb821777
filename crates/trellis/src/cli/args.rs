//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};

use super::types::{CyclePolicyArg, RelationshipTypeArg};
use super::validators::{validate_id, validate_name, validate_prefix};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Prefix for generated feature IDs (e.g., "feat" for "feat-a1b2")
    #[arg(long, value_parser = validate_prefix)]
    pub feature_prefix: Option<String>,

    /// Prefix for generated timeline item IDs
    #[arg(long, value_parser = validate_prefix)]
    pub item_prefix: Option<String>,

    /// How to treat dependency links that would create a cycle
    #[arg(long, value_enum, default_value = "strict")]
    pub cycle_policy: CyclePolicyArg,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `feature` command
#[derive(Parser, Debug, Clone)]
pub struct FeatureArgs {
    /// Feature subcommand
    #[command(subcommand)]
    pub action: FeatureAction,
}

/// Feature management actions
#[derive(Subcommand, Debug, Clone)]
pub enum FeatureAction {
    /// Create a feature
    Add {
        /// Display name
        #[arg(value_parser = validate_name)]
        name: String,

        /// Explicit ID instead of a generated one
        #[arg(long, value_parser = validate_id)]
        id: Option<String>,
    },

    /// List all features
    List,

    /// Show a feature with its items and links
    Show {
        /// Feature ID
        #[arg(value_parser = validate_id)]
        feature: String,
    },
}

/// Arguments for the `item` command
#[derive(Parser, Debug, Clone)]
pub struct ItemArgs {
    /// Item subcommand
    #[command(subcommand)]
    pub action: ItemAction,
}

/// Timeline item management actions
#[derive(Subcommand, Debug, Clone)]
pub enum ItemAction {
    /// Add a timeline item to a feature
    Add {
        /// Feature ID
        #[arg(value_parser = validate_id)]
        feature: String,

        /// Display name
        #[arg(value_parser = validate_name)]
        name: String,

        /// Explicit ID instead of a generated one
        #[arg(long, value_parser = validate_id)]
        id: Option<String>,
    },

    /// Remove a timeline item and every link touching it
    Remove {
        /// Feature ID
        #[arg(value_parser = validate_id)]
        feature: String,

        /// Item ID
        #[arg(value_parser = validate_id)]
        item: String,
    },
}

/// A directed pair of items within a feature
#[derive(Parser, Debug, Clone)]
pub struct PairArgs {
    /// Feature ID
    #[arg(value_parser = validate_id)]
    pub feature: String,

    /// Source item (for dependencies: the item that depends)
    pub source: String,

    /// Target item (for dependencies: the item depended on)
    pub target: String,
}

/// Arguments for the `link` command
#[derive(Parser, Debug, Clone)]
pub struct LinkArgs {
    /// Feature and items to link
    #[command(flatten)]
    pub pair: PairArgs,

    /// Relationship type
    #[arg(short = 't', long = "type", value_enum, default_value = "dependency")]
    pub relationship_type: RelationshipTypeArg,
}

/// Arguments for the `retype` command
#[derive(Parser, Debug, Clone)]
pub struct RetypeArgs {
    /// Feature and linked items
    #[command(flatten)]
    pub pair: PairArgs,

    /// New relationship type
    #[arg(short = 't', long = "type", value_enum)]
    pub relationship_type: RelationshipTypeArg,
}

/// An item within a feature
#[derive(Parser, Debug, Clone)]
pub struct ItemRefArgs {
    /// Feature ID
    #[arg(value_parser = validate_id)]
    pub feature: String,

    /// Item ID
    #[arg(value_parser = validate_id)]
    pub item: String,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug, Clone)]
pub struct TreeArgs {
    /// Feature and root item
    #[command(flatten)]
    pub item: ItemRefArgs,

    /// Show what depends on the item instead of what it depends on
    #[arg(short, long)]
    pub reverse: bool,

    /// Maximum depth to traverse
    #[arg(short, long, value_parser = clap::value_parser!(usize))]
    pub depth: Option<usize>,
}

/// Arguments for commands that act on a whole feature
#[derive(Parser, Debug, Clone)]
pub struct FeatureRefArgs {
    /// Feature ID
    #[arg(value_parser = validate_id)]
    pub feature: String,
}
