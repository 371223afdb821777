//! Output formatting for CLI commands.
//!
//! Every printer takes an [`OutputMode`]: human-readable text, or JSON for
//! programmatic use. Text printers write to any `Write` so they can be
//! tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`tree`]: Dependency tree rendering with ASCII/Unicode connectors

pub mod color;
pub mod tree;

use crate::domain::{AllLinks, ItemId, LinkRecord, LinkStats, TimelineItem};
use crate::feature::Feature;
use crate::store::jsonl::LoadWarning;
use crate::store::record::FeatureRecord;
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use tree::{print_tree, TreeNode};

use color::{bold, colorize_id, colorize_relationship, dimmed, direction_arrow};

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `TRELLIS_ASCII`: "1" or "true" for ASCII-only output (default: false)
    /// - `NO_COLOR`: any value disables colors
    /// - `TRELLIS_COLOR`: "0" or "false" disables colors (default: true)
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TRELLIS_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TRELLIS_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new(false, true)
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Print any serializable value as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(handle, "{json}")
}

/// Run a text printer against stdout, or print `json` in JSON mode.
fn dispatch<T, F>(mode: OutputMode, json: &T, text: F) -> io::Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut io::StdoutLock<'_>, &OutputConfig) -> io::Result<()>,
{
    match mode {
        OutputMode::Json => print_json(&json),
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            text(&mut handle, &OutputConfig::from_env())
        }
    }
}

/// Print a one-line summary per feature.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_feature_list(features: &[&Feature], mode: OutputMode) -> io::Result<()> {
    let summaries: Vec<FeatureSummary<'_>> = features.iter().map(|f| FeatureSummary::of(f)).collect();
    dispatch(mode, &summaries, |w, config| {
        print_feature_list_text(w, features, config)
    })
}

/// Print a feature with its items and their links.
///
/// JSON output uses the persisted record shape.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_feature(feature: &Feature, mode: OutputMode) -> io::Result<()> {
    dispatch(mode, &FeatureRecord::from(feature), |w, config| {
        print_feature_text(w, feature, config)
    })
}

/// Print both link directions of one item.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_links(
    feature: &Feature,
    item_id: &ItemId,
    links: &AllLinks,
    mode: OutputMode,
) -> io::Result<()> {
    dispatch(mode, links, |w, config| {
        print_links_text(w, feature, item_id, links, config)
    })
}

/// Print a titled list of items.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_items(title: &str, items: &[&TimelineItem], mode: OutputMode) -> io::Result<()> {
    dispatch(mode, items, |w, config| print_items_text(w, title, items, config))
}

/// Print link statistics.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_stats(feature: &Feature, stats: &LinkStats, mode: OutputMode) -> io::Result<()> {
    dispatch(mode, stats, |w, config| print_stats_text(w, feature, stats, config))
}

/// Print the result of a cycle report.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_cycles(feature: &Feature, cycles: &[Vec<ItemId>], mode: OutputMode) -> io::Result<()> {
    let json = serde_json::json!({
        "feature": feature.id,
        "acyclic": cycles.is_empty(),
        "cycles": cycles,
    });
    dispatch(mode, &json, |w, config| print_cycles_text(w, feature, cycles, config))
}

/// Report load warnings on stderr.
///
/// # Errors
///
/// Returns an error if writing to stderr fails.
pub fn print_load_warnings(warnings: &[LoadWarning]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    let config = OutputConfig::from_env();
    for warning in warnings {
        writeln!(handle, "{} {warning}", color::warning("warning:", &config))?;
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureSummary<'a> {
    id: &'a str,
    name: &'a str,
    items: usize,
    links: usize,
    updated_at: String,
}

impl<'a> FeatureSummary<'a> {
    fn of(feature: &'a Feature) -> Self {
        Self {
            id: feature.id.as_str(),
            name: &feature.name,
            items: feature.items().len(),
            links: feature.links().edge_count(),
            updated_at: feature.updated_at.to_rfc3339(),
        }
    }
}

fn print_feature_list_text<W: Write>(
    w: &mut W,
    features: &[&Feature],
    config: &OutputConfig,
) -> io::Result<()> {
    if features.is_empty() {
        return writeln!(w, "No features");
    }
    for feature in features {
        writeln!(
            w,
            "{} {} {}",
            colorize_id(feature.id.as_str(), config),
            feature.name,
            dimmed(
                &format!(
                    "({} items, {} links)",
                    feature.items().len(),
                    feature.links().edge_count()
                ),
                config
            )
        )?;
    }
    Ok(())
}

fn print_feature_text<W: Write>(
    w: &mut W,
    feature: &Feature,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        colorize_id(feature.id.as_str(), config),
        bold(&feature.name, config)
    )?;
    writeln!(
        w,
        "{} {}",
        dimmed("Updated:", config),
        feature.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    )?;

    if feature.items().is_empty() {
        writeln!(w)?;
        return writeln!(w, "No timeline items");
    }

    writeln!(w)?;
    writeln!(w, "{} ({}):", bold("Timeline items", config), feature.items().len())?;
    for item in feature.items() {
        writeln!(w, "  {} {}", colorize_id(item.id.as_str(), config), item.name)?;
        for record in feature.linked_items(&item.id) {
            write_record(w, feature, &record, "    ", config)?;
        }
    }
    Ok(())
}

fn print_links_text<W: Write>(
    w: &mut W,
    feature: &Feature,
    item_id: &ItemId,
    links: &AllLinks,
    config: &OutputConfig,
) -> io::Result<()> {
    let name = feature.item(item_id).map(|i| i.name.as_str()).unwrap_or("?");
    writeln!(w, "{} {name}", colorize_id(item_id.as_str(), config))?;

    for (title, records) in [("Outgoing", &links.outgoing), ("Incoming", &links.incoming)] {
        writeln!(w, "{} ({}):", bold(title, config), records.len())?;
        if records.is_empty() {
            writeln!(w, "  {}", dimmed("(none)", config))?;
        }
        for record in records {
            write_record(w, feature, record, "  ", config)?;
        }
    }
    Ok(())
}

fn write_record<W: Write>(
    w: &mut W,
    feature: &Feature,
    record: &LinkRecord,
    indent: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let other = record.other_id();
    let other_name = feature
        .item(other)
        .map(|i| format!(" {}", i.name))
        .unwrap_or_default();
    writeln!(
        w,
        "{indent}{} {}{other_name} {}",
        direction_arrow(record.direction(), config),
        colorize_id(other.as_str(), config),
        dimmed(
            &format!("({})", colorize_relationship(record.relationship_type(), config)),
            config
        )
    )
}

fn print_items_text<W: Write>(
    w: &mut W,
    title: &str,
    items: &[&TimelineItem],
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} ({}):", bold(title, config), items.len())?;
    if items.is_empty() {
        return writeln!(w, "  {}", dimmed("(none)", config));
    }
    for item in items {
        writeln!(w, "  {} {}", colorize_id(item.id.as_str(), config), item.name)?;
    }
    Ok(())
}

fn print_stats_text<W: Write>(
    w: &mut W,
    feature: &Feature,
    stats: &LinkStats,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {}",
        bold("Link statistics for", config),
        colorize_id(feature.id.as_str(), config)
    )?;
    writeln!(w, "  Items:       {}", feature.items().len())?;
    writeln!(w, "  Links:       {}", stats.total)?;
    writeln!(w, "  Dependency:  {}", stats.by_type.dependency)?;
    writeln!(w, "  Complements: {}", stats.by_type.complements)
}

fn print_cycles_text<W: Write>(
    w: &mut W,
    feature: &Feature,
    cycles: &[Vec<ItemId>],
    config: &OutputConfig,
) -> io::Result<()> {
    if cycles.is_empty() {
        return writeln!(
            w,
            "{} {}",
            success("No dependency cycles in", config),
            colorize_id(feature.id.as_str(), config)
        );
    }

    writeln!(
        w,
        "{}",
        error(&format!("{} dependency cycle(s) found:", cycles.len()), config)
    )?;
    let arrow = if config.use_ascii { " -> " } else { " → " };
    for cycle in cycles {
        let ids: Vec<String> = cycle
            .iter()
            .map(|id| colorize_id(id.as_str(), config))
            .collect();
        writeln!(w, "  {}", ids.join(arrow))?;
    }
    Ok(())
}
