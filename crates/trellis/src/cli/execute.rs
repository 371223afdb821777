//! Command execution logic.
//!
//! One `execute_*` function per CLI command. Mutating commands save the
//! store before returning.

use std::path::Path;

use anyhow::Result;

use super::args::{
    FeatureAction, FeatureArgs, FeatureRefArgs, InitArgs, ItemAction, ItemArgs, ItemRefArgs,
    LinkArgs, PairArgs, RetypeArgs, TreeArgs,
};
use crate::app::App;
use crate::domain::{FeatureId, ItemId, RelationshipType, TimelineItem};
use crate::error::Error;
use crate::feature::Feature;
use crate::links::{LinkManager, LinkOutcome, LinkRemoval};
use crate::output::{self, OutputConfig, OutputMode};
use crate::store::ItemStore;

/// Resolve a feature for a read-only command.
fn require_feature<'a>(app: &'a App, feature: &str) -> Result<&'a Feature> {
    let id = FeatureId::new(feature);
    app.store()
        .feature(&id)
        .ok_or_else(|| Error::FeatureNotFound(id).into())
}

/// Resolve an item within a feature for a read-only command.
fn require_item(feature: &Feature, item: &str) -> Result<ItemId> {
    let id = ItemId::new(item);
    if !feature.contains_item(&id) {
        return Err(Error::ItemNotFound {
            feature: feature.id.clone(),
            item: id,
        }
        .into());
    }
    Ok(id)
}

/// Execute the init command
pub async fn execute_init(base_dir: &Path, args: &InitArgs) -> Result<()> {
    use crate::commands::init::{self, InitOptions};

    if !args.quiet {
        println!("Initializing trellis repository...");
    }

    let options = InitOptions {
        feature_prefix: args.feature_prefix.as_deref(),
        item_prefix: args.item_prefix.as_deref(),
        cycle_policy: args.cycle_policy.into(),
    };
    let result = init::init(base_dir, options).await?;

    if !args.quiet {
        println!("Initialized trellis in {}", result.trellis_dir.display());
        println!("  Config:         {}", result.config_file.display());
        println!("  Features:       {}", result.features_file.display());
        println!("  Feature prefix: {}", result.config.feature_prefix);
        println!("  Item prefix:    {}", result.config.item_prefix);
        println!("  Cycle policy:   {}", result.config.links.cycle_policy);
    }

    Ok(())
}

/// Execute the feature command
pub async fn execute_feature(
    app: &mut App,
    args: &FeatureArgs,
    output_mode: OutputMode,
) -> Result<()> {
    match &args.action {
        FeatureAction::Add { name, id } => {
            let id = match id {
                Some(id) => FeatureId::new(id.as_str()),
                None => app.new_feature_id(name)?,
            };
            app.store_mut().create_feature(id.clone(), name.as_str())?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "id": id,
                    "name": name,
                }))?,
                OutputMode::Text => {
                    let config = OutputConfig::from_env();
                    println!("{} {id}: {name}", output::success("Created feature", &config));
                }
            }
        }
        FeatureAction::List => {
            output::print_feature_list(&app.store().features(), output_mode)?;
        }
        FeatureAction::Show { feature } => {
            output::print_feature(require_feature(app, feature)?, output_mode)?;
        }
    }
    Ok(())
}

/// Execute the item command
pub async fn execute_item(app: &mut App, args: &ItemArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        ItemAction::Add { feature, name, id } => {
            let feature_id = FeatureId::new(feature.as_str());
            let item_id = match id {
                Some(id) => ItemId::new(id.as_str()),
                None => app.new_item_id(&feature_id, name)?,
            };
            app.store_mut()
                .add_item(&feature_id, TimelineItem::new(item_id.clone(), name.as_str()))?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "feature": feature_id,
                    "id": item_id,
                    "name": name,
                }))?,
                OutputMode::Text => {
                    let config = OutputConfig::from_env();
                    println!(
                        "{} {item_id}: {name}",
                        output::success("Added timeline item", &config)
                    );
                }
            }
        }
        ItemAction::Remove { feature, item } => {
            let feature_id = FeatureId::new(feature.as_str());
            let (removed, dropped) = app
                .store_mut()
                .remove_item(&feature_id, &ItemId::new(item.as_str()))?;
            app.save().await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "feature": feature_id,
                    "removed": removed.id,
                    "linksDropped": dropped,
                }))?,
                OutputMode::Text => {
                    let config = OutputConfig::from_env();
                    println!(
                        "{} {} ({dropped} link(s) dropped)",
                        output::success("Removed timeline item", &config),
                        removed.id
                    );
                }
            }
        }
    }
    Ok(())
}

/// Execute the link command
pub async fn execute_link(app: &mut App, args: &LinkArgs, output_mode: OutputMode) -> Result<()> {
    let relationship_type = RelationshipType::from(args.relationship_type);
    let pair = &args.pair;

    let (source, target) = (pair.source.trim(), pair.target.trim());

    let validation = LinkManager::validate(source, target, relationship_type.as_str());
    if !validation.valid {
        anyhow::bail!("Invalid link: {}", validation.errors.join("; "));
    }

    let feature_id = FeatureId::new(pair.feature.as_str());
    let source = ItemId::new(source);
    let target = ItemId::new(target);

    let (manager, store) = app.links_mut();
    let outcome = manager.create_link(store, &feature_id, &source, &target, relationship_type)?;
    if outcome.is_created() {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "feature": feature_id,
            "source": source,
            "target": target,
            "relationshipType": relationship_type,
            "created": outcome.is_created(),
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            match outcome {
                LinkOutcome::Created => println!(
                    "{} {source} -> {target} ({relationship_type})",
                    output::success("Linked", &config)
                ),
                LinkOutcome::AlreadyLinked => println!(
                    "{} {source} -> {target}",
                    output::warning("Already linked:", &config)
                ),
            }
        }
    }
    Ok(())
}

/// Execute the unlink command
pub async fn execute_unlink(app: &mut App, args: &PairArgs, output_mode: OutputMode) -> Result<()> {
    let feature_id = FeatureId::new(args.feature.as_str());
    let source = ItemId::new(args.source.trim());
    let target = ItemId::new(args.target.trim());

    let (manager, store) = app.links_mut();
    let removal = manager.delete_link(store, &feature_id, &source, &target)?;
    app.save().await?;

    let removed = removal == LinkRemoval::Removed;
    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "feature": feature_id,
            "source": source,
            "target": target,
            "removed": removed,
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            if removed {
                println!("{} {source} -> {target}", output::success("Unlinked", &config));
            } else {
                println!("{} {source} -> {target}", output::warning("Not linked:", &config));
            }
        }
    }
    Ok(())
}

/// Execute the retype command
pub async fn execute_retype(
    app: &mut App,
    args: &RetypeArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let relationship_type = RelationshipType::from(args.relationship_type);
    let feature_id = FeatureId::new(args.pair.feature.as_str());
    let source = ItemId::new(args.pair.source.trim());
    let target = ItemId::new(args.pair.target.trim());

    let (manager, store) = app.links_mut();
    let previous =
        manager.set_relationship_type(store, &feature_id, &source, &target, relationship_type)?;
    if previous != relationship_type {
        app.save().await?;
    }

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "feature": feature_id,
            "source": source,
            "target": target,
            "previous": previous,
            "relationshipType": relationship_type,
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            println!(
                "{} {source} -> {target}: {previous} => {relationship_type}",
                output::success("Retyped", &config)
            );
        }
    }
    Ok(())
}

/// Execute the links command
pub fn execute_links(app: &App, args: &ItemRefArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let item_id = require_item(feature, &args.item)?;
    let links = app.manager().all_links(app.store(), &feature.id, &item_id);
    output::print_links(feature, &item_id, &links, output_mode)?;
    Ok(())
}

/// Execute the deps and dependents commands
pub fn execute_deps(
    app: &App,
    args: &ItemRefArgs,
    reverse: bool,
    output_mode: OutputMode,
) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let item_id = require_item(feature, &args.item)?;
    let manager = app.manager();

    let (title, items) = if reverse {
        (
            format!("Items depending on {item_id}"),
            manager.dependents(app.store(), &feature.id, &item_id),
        )
    } else {
        (
            format!("Dependencies of {item_id}"),
            manager.dependencies(app.store(), &feature.id, &item_id),
        )
    };
    output::print_items(&title, &items, output_mode)?;
    Ok(())
}

/// Execute the tree command
pub fn execute_tree(app: &App, args: &TreeArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.item.feature)?;
    let item_id = require_item(feature, &args.item.item)?;
    let manager = app.manager();

    let (entries, label) = if args.reverse {
        (
            manager.dependents_tree(app.store(), &feature.id, &item_id, args.depth),
            "dependents",
        )
    } else {
        (
            manager.dependency_tree(app.store(), &feature.id, &item_id, args.depth),
            "dependencies",
        )
    };
    let root = output::TreeNode::from_entries(feature, &item_id, &entries);
    output::print_tree(&root, label, output_mode)?;
    Ok(())
}

/// Execute the check-cycle command
pub fn execute_check_cycle(app: &App, args: &PairArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let source = require_item(feature, args.source.trim())?;
    let target = require_item(feature, args.target.trim())?;
    let circular = app
        .manager()
        .would_create_circular(app.store(), &feature.id, &source, &target);

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "feature": feature.id,
            "source": source,
            "target": target,
            "wouldCreateCycle": circular,
        }))?,
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            if circular {
                println!(
                    "{} {source} depending on {target} would create a cycle",
                    output::error("Cycle:", &config)
                );
            } else {
                println!(
                    "{} {source} can depend on {target}",
                    output::success("OK:", &config)
                );
            }
        }
    }
    Ok(())
}

/// Execute the stats command
pub fn execute_stats(app: &App, args: &FeatureRefArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let stats = app.manager().stats(app.store(), &feature.id);
    output::print_stats(feature, &stats, output_mode)?;
    Ok(())
}

/// Execute the order command
pub fn execute_order(app: &App, args: &FeatureRefArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let items = app.manager().schedule_order(app.store(), &feature.id)?;
    output::print_items(&format!("Schedule for {}", feature.id), &items, output_mode)?;
    Ok(())
}

/// Execute the check command
///
/// Fails when cycles are found so scripts can gate on the exit status.
pub fn execute_check(app: &App, args: &FeatureRefArgs, output_mode: OutputMode) -> Result<()> {
    let feature = require_feature(app, &args.feature)?;
    let cycles = app.manager().dependency_cycles(app.store(), &feature.id);
    output::print_cycles(feature, &cycles, output_mode)?;
    if !cycles.is_empty() {
        return Err(Error::DependencyCycles(cycles).into());
    }
    Ok(())
}
