//! `[build]` section configuration.
//!
//! Contains build settings including paths, minification, slugs, sitemap, etc.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Enums
// ============================================================================

/// URL slug generation mode for tag paths and anchors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Always convert to ASCII slug (e.g., "新機能" → "xin-ji-neng").
    On,
    /// Strip forbidden characters, keep Unicode as-is (default).
    #[default]
    Safe,
    /// No slugification; preserve original text.
    No,
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in relnotes.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # JSON content directory
/// output = "public"        # Output directory
/// minify = true            # Minify HTML
///
/// [build.sitemap]
/// enable = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// URL path prefix for subdirectory deployment (e.g., "notes" → `/notes/...`).
    #[serde(default = "defaults::build::path_prefix")]
    #[educe(Default = defaults::build::path_prefix())]
    pub path_prefix: PathBuf,

    /// Content source directory (JSON files).
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Static assets directory (images, extra CSS).
    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Minify HTML output (removes whitespace).
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// Number of tags shown in "top tags" summaries.
    #[serde(default = "defaults::build::top_tags")]
    #[educe(Default = defaults::build::top_tags())]
    pub top_tags: usize,

    /// URL slugification settings.
    #[serde(default)]
    pub slug: SlugConfig,

    /// Sitemap generation settings.
    #[serde(default)]
    pub sitemap: SitemapConfig,

    /// Search index generation settings.
    #[serde(default)]
    pub search: SearchConfig,
}

// ============================================================================
// Sub-configurations
// ============================================================================

/// `[build.slug]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SlugConfig {
    /// Slugify URL paths (tag pages)
    #[serde(default = "defaults::build::slug::default")]
    #[educe(Default = defaults::build::slug::default())]
    pub path: SlugMode,

    /// Slugify URL fragments (section anchors)
    #[serde(default = "defaults::build::slug::on")]
    #[educe(Default = defaults::build::slug::on())]
    pub fragment: SlugMode,
}

/// `[build.sitemap]` section - sitemap.xml generation.
///
/// Only effective in `build` mode and when `[base].url` is set.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub enable: bool,

    /// Output path, relative to the output directory.
    #[serde(default = "defaults::build::sitemap::path")]
    #[educe(Default = defaults::build::sitemap::path())]
    pub path: PathBuf,
}

/// `[build.search]` section - JSON search index of release items.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Output path, relative to the output directory.
    #[serde(default = "defaults::build::search::path")]
    #[educe(Default = defaults::build::search::path())]
    pub path: PathBuf,
}
