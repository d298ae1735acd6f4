//! `[tags]` section configuration.
//!
//! User overrides for tag labels and colors, keyed by tag name.

use serde::{Deserialize, Serialize};

/// One `[tags."<name>"]` entry.
///
/// # Example
/// ```toml
/// [tags."新機能"]
/// label = "New"
/// color = "#16a34a"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TagConfig {
    /// Display label; the tag name itself when unset.
    #[serde(default)]
    pub label: Option<String>,

    /// CSS color (`#rgb` or `#rrggbb`) for the badge.
    #[serde(default)]
    pub color: Option<String>,
}

/// Whether `color` is a `#rgb` or `#rrggbb` hex color.
pub fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
