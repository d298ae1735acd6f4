//! Content records loaded from the JSON files in the content directory.
//!
//! Every optional field falls back to its default so partially filled
//! content files still load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One shipped version from `releases.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVersion {
    /// Version identifier, e.g. "2.0.14"
    pub version: String,

    /// Release date as ISO 8601 string (e.g., "2025-10-02")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Changelog entries in display order
    #[serde(default)]
    pub items: Vec<ReleaseItem>,
}

/// A single changelog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub text: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Enriched changelog entry from `version_details.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionDetailItem {
    pub text: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Longer-form explanation shown when the card is expanded
    #[serde(default)]
    pub detail: String,

    /// Grouping label shown on the card header
    #[serde(default)]
    pub category: String,
}

/// `version_details.json`: version identifier → enriched entries.
pub type VersionDetails = BTreeMap<String, Vec<VersionDetailItem>>;

/// A plugin category from `plugins.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCategory {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub plugins: Vec<Plugin>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Install or invocation command shown in a code span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// A section of the setup guide (`setup.json`), rendered as one tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupSection {
    pub id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

/// A hands-on tutorial topic (`hands_on.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: String,
    pub title: String,

    #[serde(default)]
    pub summary: String,

    /// Difficulty label, e.g. "beginner"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One ordered instructional step of a topic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,

    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

/// A static informational page (`pages.json`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoPage {
    /// URL path segment, e.g. "about"
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
}

/// Typed content block used by setup sections, steps and pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        code: String,
    },
    Callout {
        #[serde(default)]
        variant: CalloutVariant,
        text: String,
    },
    List {
        #[serde(default)]
        ordered: bool,
        items: Vec<String>,
    },
}

/// Visual flavor of a callout block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutVariant {
    #[default]
    Info,
    Tip,
    Warning,
    /// Any unrecognized variant renders as `Info`
    #[serde(other)]
    Other,
}

impl CalloutVariant {
    /// CSS class suffix for this variant.
    pub const fn class(self) -> &'static str {
        match self {
            Self::Info | Self::Other => "info",
            Self::Tip => "tip",
            Self::Warning => "warning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_version_defaults() {
        let json = r#"{ "version": "1.0.0" }"#;
        let release: ReleaseVersion = serde_json::from_str(json).unwrap();

        assert_eq!(release.version, "1.0.0");
        assert_eq!(release.date, None);
        assert!(release.items.is_empty());
    }

    #[test]
    fn test_release_item_without_tags() {
        let json = r#"{ "text": "Fixed a crash" }"#;
        let item: ReleaseItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.text, "Fixed a crash");
        assert!(item.tags.is_empty());
    }

    #[test]
    fn test_content_block_tagged() {
        let json = r#"[
            { "type": "text", "text": "hello" },
            { "type": "code", "language": "bash", "code": "npm i" },
            { "type": "callout", "variant": "warning", "text": "careful" },
            { "type": "list", "ordered": true, "items": ["a", "b"] }
        ]"#;
        let blocks: Vec<ContentBlock> = serde_json::from_str(json).unwrap();

        assert_eq!(blocks.len(), 4);
        assert!(matches!(&blocks[0], ContentBlock::Text { text } if text == "hello"));
        assert!(matches!(&blocks[1], ContentBlock::Code { language: Some(l), .. } if l == "bash"));
        assert!(matches!(
            &blocks[2],
            ContentBlock::Callout { variant: CalloutVariant::Warning, .. }
        ));
        assert!(matches!(&blocks[3], ContentBlock::List { ordered: true, items } if items.len() == 2));
    }

    #[test]
    fn test_callout_unknown_variant_falls_back() {
        let json = r#"{ "type": "callout", "variant": "danger", "text": "x" }"#;
        let block: ContentBlock = serde_json::from_str(json).unwrap();

        match block {
            ContentBlock::Callout { variant, .. } => assert_eq!(variant.class(), "info"),
            other => panic!("unexpected block: {other:?}"),
        }
    }

    #[test]
    fn test_callout_variant_default() {
        let json = r#"{ "type": "callout", "text": "x" }"#;
        let block: ContentBlock = serde_json::from_str(json).unwrap();
        assert!(matches!(
            block,
            ContentBlock::Callout { variant: CalloutVariant::Info, .. }
        ));
    }

    #[test]
    fn test_version_details_map() {
        let json = r#"{
            "2.0.0": [{ "text": "t", "tags": ["MCP"], "detail": "d", "category": "c" }]
        }"#;
        let details: VersionDetails = serde_json::from_str(json).unwrap();

        let items = &details["2.0.0"];
        assert_eq!(items[0].detail, "d");
        assert_eq!(items[0].category, "c");
    }
}
