//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success:       green   (created/removed links, acyclic checks)
//!   - Warning:       yellow  (complements links, load warnings)
//!   - Error:         red     (dependency links, cycles)
//!   - Info/Reference: cyan   (item and feature IDs)
//!   - Muted:         dimmed  (labels, connectors, timestamps)
//!   - Emphasis:      bold    (section headers)

use crate::domain::{LinkDirection, RelationshipType};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Bold text for headers.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

/// Dimmed text for labels and connectors.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Colorize a feature or item ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize a relationship type: dependencies red, complements yellow.
pub(crate) fn colorize_relationship(kind: RelationshipType, config: &OutputConfig) -> String {
    let text = kind.to_string();
    if !config.use_colors {
        return text;
    }
    match kind {
        RelationshipType::Dependency => text.red().to_string(),
        RelationshipType::Complements => text.yellow().to_string(),
    }
}

/// Arrow pointing away from (outgoing) or towards (incoming) the item.
pub(crate) fn direction_arrow(direction: LinkDirection, config: &OutputConfig) -> String {
    let arrow = match (direction, config.use_ascii) {
        (LinkDirection::Outgoing, true) => "->",
        (LinkDirection::Incoming, true) => "<-",
        (LinkDirection::Outgoing, false) => "→",
        (LinkDirection::Incoming, false) => "←",
    };
    dimmed(arrow, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputConfig {
        OutputConfig::new(false, false)
    }

    #[test]
    fn helpers_pass_text_through_without_colors() {
        let config = plain();
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(warning("hmm", &config), "hmm");
        assert_eq!(colorize_id("item-a1b2", &config), "item-a1b2");
        assert_eq!(
            colorize_relationship(RelationshipType::Complements, &config),
            "complements"
        );
    }

    #[test]
    fn arrows_have_ascii_fallback() {
        let ascii = OutputConfig::new(true, false);
        assert_eq!(direction_arrow(LinkDirection::Outgoing, &ascii), "->");
        assert_eq!(direction_arrow(LinkDirection::Incoming, &plain()), "←");
    }
}
