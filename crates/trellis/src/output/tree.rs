//! Dependency tree rendering for `trellis tree` output.

use std::collections::HashMap;
use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;

use super::color::{bold, colorize_id, dimmed};
use super::{OutputConfig, OutputMode};
use crate::domain::{ItemId, TreeEntry};
use crate::feature::Feature;

/// A node of a rendered dependency tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Item ID
    pub id: ItemId,
    /// Item name, if the item still resolves
    pub name: Option<String>,
    /// Distance from the root
    pub depth: usize,
    /// Items reached through this one
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Assemble a tree from breadth-first traversal entries.
    ///
    /// Every entry records the node it was first reached from, so the
    /// entries form a spanning tree rooted at `root`.
    #[must_use]
    pub fn from_entries(feature: &Feature, root: &ItemId, entries: &[TreeEntry]) -> Self {
        let mut children: HashMap<&ItemId, Vec<&TreeEntry>> = HashMap::new();
        for entry in entries {
            children.entry(&entry.parent).or_default().push(entry);
        }
        build(feature, root, 0, &children)
    }

    /// Number of nodes below this one
    #[must_use]
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }
}

fn build(
    feature: &Feature,
    id: &ItemId,
    depth: usize,
    children: &HashMap<&ItemId, Vec<&TreeEntry>>,
) -> TreeNode {
    TreeNode {
        id: id.clone(),
        name: feature.item(id).map(|item| item.name.clone()),
        depth,
        children: children
            .get(id)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| build(feature, &entry.item_id, entry.depth, children))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Print a dependency tree with ASCII/Unicode connectors.
///
/// Renders a tree like:
/// ```text
/// ◆ item-a1b2 Build
/// ├── item-c3d4 Design
/// │   └── item-e5f6 Research
/// └── item-g7h8 Infra
/// ```
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_tree(root: &TreeNode, label: &str, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let config = OutputConfig::from_env();

    match mode {
        OutputMode::Text => print_tree_text(&mut handle, root, label, &config),
        OutputMode::Json => {
            let output = serde_json::to_string_pretty(root).map_err(io::Error::other)?;
            writeln!(handle, "{output}")
        }
    }
}

pub(crate) fn print_tree_text<W: Write>(
    w: &mut W,
    root: &TreeNode,
    label: &str,
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };
    let name = root.name.as_deref().map(|n| format!(" {n}")).unwrap_or_default();
    writeln!(w, "{root_icon} {}{name}", colorize_id(root.id.as_str(), config))?;

    if root.children.is_empty() {
        writeln!(w, "  {}", dimmed(&format!("(no {label})"), config))?;
        return Ok(());
    }
    print_children(w, &root.children, &[], config)?;
    writeln!(
        w,
        "{}",
        bold(&format!("{} {label}", root.descendant_count()), config)
    )
}

/// `prefix_segments` records, per ancestor level, whether siblings follow.
fn print_children<W: Write>(
    w: &mut W,
    children: &[TreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);
        let name = child.name.as_deref().map(|n| format!(" {n}")).unwrap_or_default();

        writeln!(
            w,
            "{prefix}{connector}{}{name}",
            colorize_id(child.id.as_str(), config)
        )?;

        if !child.children.is_empty() {
            let mut next = prefix_segments.to_vec();
            next.push(!is_last);
            print_children(w, &child.children, &next, config)?;
        }
    }

    Ok(())
}
