//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Initialize a trellis repository
//! - `feature add|list|show`: Manage features
//! - `item add|remove`: Manage timeline items
//! - `link` / `unlink` / `retype`: Create, remove, or retype a link
//! - `links`, `deps`, `dependents`, `tree`: Query links
//! - `check-cycle`, `check`, `order`, `stats`: Analyse a feature
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! trellis feature add "Checkout redesign" --id checkout
//! trellis item add checkout "Design" --id design
//! trellis item add checkout "Build" --id build
//! trellis link checkout build design --type dependency
//! trellis tree checkout build
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{
    FeatureAction, FeatureArgs, FeatureRefArgs, InitArgs, ItemAction, ItemArgs, ItemRefArgs,
    LinkArgs, PairArgs, RetypeArgs, TreeArgs,
};
pub use types::{CyclePolicyArg, RelationshipTypeArg};
pub use validators::{validate_id, validate_name, validate_prefix};

/// Trellis - typed links between product timeline items
///
/// Link timeline items with dependency and complements relationships,
/// keep the dependency graph acyclic, and query it. Data lives in
/// `.trellis/features.jsonl`.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize a new trellis repository
    ///
    /// Creates the `.trellis/` directory with configuration and an empty
    /// features file.
    Init(InitArgs),

    /// Manage features
    Feature(FeatureArgs),

    /// Manage timeline items
    Item(ItemArgs),

    /// Link two items
    ///
    /// For a dependency link, SOURCE depends on TARGET.
    Link(LinkArgs),

    /// Remove the link from SOURCE to TARGET
    Unlink(PairArgs),

    /// Change the relationship type of an existing link
    Retype(RetypeArgs),

    /// Show incoming and outgoing links of an item
    Links(ItemRefArgs),

    /// List the items an item directly depends on
    Deps(ItemRefArgs),

    /// List the items that directly depend on an item
    Dependents(ItemRefArgs),

    /// Show the transitive dependency tree of an item
    Tree(TreeArgs),

    /// Check whether SOURCE depending on TARGET would create a cycle
    CheckCycle(PairArgs),

    /// Show link statistics for a feature
    Stats(FeatureRefArgs),

    /// List items so that every item follows its dependencies
    Order(FeatureRefArgs),

    /// Report dependency cycles in a feature
    Check(FeatureRefArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command in the current directory
    ///
    /// # Errors
    ///
    /// Returns any error from loading the repository or running the command.
    pub async fn execute(&self) -> Result<()> {
        self.execute_in(&std::env::current_dir()?).await
    }

    /// Execute the CLI command against the repository containing `dir`
    ///
    /// # Errors
    ///
    /// Returns any error from loading the repository or running the command.
    pub async fn execute_in(&self, dir: &std::path::Path) -> Result<()> {
        use crate::app::App;
        use crate::output::{self, OutputMode};

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Trellis timeline link manager");
            println!("Use --help for more information");
            return Ok(());
        };

        if let Commands::Init(args) = command {
            return execute::execute_init(dir, args).await;
        }

        let mut app = App::from_directory(dir).await?;
        output::print_load_warnings(app.load_warnings())?;

        match command {
            Commands::Init(_) => Ok(()),
            Commands::Feature(args) => execute::execute_feature(&mut app, args, output_mode).await,
            Commands::Item(args) => execute::execute_item(&mut app, args, output_mode).await,
            Commands::Link(args) => execute::execute_link(&mut app, args, output_mode).await,
            Commands::Unlink(args) => execute::execute_unlink(&mut app, args, output_mode).await,
            Commands::Retype(args) => execute::execute_retype(&mut app, args, output_mode).await,
            Commands::Links(args) => execute::execute_links(&app, args, output_mode),
            Commands::Deps(args) => execute::execute_deps(&app, args, false, output_mode),
            Commands::Dependents(args) => execute::execute_deps(&app, args, true, output_mode),
            Commands::Tree(args) => execute::execute_tree(&app, args, output_mode),
            Commands::CheckCycle(args) => execute::execute_check_cycle(&app, args, output_mode),
            Commands::Stats(args) => execute::execute_stats(&app, args, output_mode),
            Commands::Order(args) => execute::execute_order(&app, args, output_mode),
            Commands::Check(args) => execute::execute_check(&app, args, output_mode),
        }
    }
}
