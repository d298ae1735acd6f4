//! Tag display styles.
//!
//! Built-in labels and colors live in an immutable table initialized on
//! first use. `[tags.<name>]` entries in `relnotes.toml` override them, and
//! any tag found in neither gets the neutral style.

use crate::{config::SiteConfig, log};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{borrow::Cow, sync::LazyLock};

/// Color used for tags without a style entry.
pub const NEUTRAL_COLOR: &str = "#6b7280";

/// Built-in `tag → (label, color)` table.
static BUILTIN: LazyLock<FxHashMap<&'static str, (&'static str, &'static str)>> =
    LazyLock::new(|| {
        [
            ("新機能", ("新機能", "#16a34a")),
            ("改善", ("改善", "#2563eb")),
            ("バグ修正", ("バグ修正", "#dc2626")),
            ("破壊的変更", ("破壊的変更", "#b91c1c")),
            ("セキュリティ", ("セキュリティ", "#9333ea")),
            ("パフォーマンス", ("パフォーマンス", "#ea580c")),
            ("非推奨", ("非推奨", "#78716c")),
            ("ドキュメント", ("ドキュメント", "#0d9488")),
            ("MCP", ("MCP", "#7c3aed")),
            ("SDK", ("SDK", "#0891b2")),
            ("IDE", ("IDE", "#4f46e5")),
            ("CLI", ("CLI", "#475569")),
            ("Hooks", ("Hooks", "#c026d3")),
            ("プラグイン", ("プラグイン", "#db2777")),
            ("設定", ("設定", "#65a30d")),
            ("Windows", ("Windows", "#0284c7")),
            ("macOS", ("macOS", "#52525b")),
            ("Linux", ("Linux", "#ca8a04")),
        ]
        .into_iter()
        .collect()
    });

/// Tags already reported as unstyled, so each is warned about once.
static UNSTYLED: LazyLock<Mutex<FxHashSet<String>>> = LazyLock::new(Default::default);

/// Resolved label and color for one tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStyle<'a> {
    pub label: Cow<'a, str>,
    pub color: Cow<'a, str>,
}

impl TagStyle<'_> {
    /// Inline CSS custom property consumed by `.tag` in the stylesheet.
    pub fn css_var(&self) -> String {
        format!("--tag-color:{}", self.color)
    }
}

/// Look up the style for `tag`: config override, then built-in, then neutral.
///
/// Override fields are merged individually, so `[tags.MCP] label = "..."`
/// keeps the built-in color.
pub fn tag_style<'a>(tag: &'a str, config: &'a SiteConfig) -> TagStyle<'a> {
    let builtin = BUILTIN.get(tag).copied();
    let user = config.tags.get(tag);

    if builtin.is_none() && user.is_none() {
        warn_unstyled(tag);
    }

    let label = user
        .and_then(|t| t.label.as_deref())
        .map(Cow::Borrowed)
        .or_else(|| builtin.map(|(label, _)| Cow::Borrowed(label)))
        .unwrap_or(Cow::Borrowed(tag));

    let color = user
        .and_then(|t| t.color.as_deref())
        .map(Cow::Borrowed)
        .or_else(|| builtin.map(|(_, color)| Cow::Borrowed(color)))
        .unwrap_or(Cow::Borrowed(NEUTRAL_COLOR));

    TagStyle { label, color }
}

/// Whether `tag` has a built-in or configured style.
pub fn is_styled(tag: &str, config: &SiteConfig) -> bool {
    BUILTIN.contains_key(tag) || config.tags.contains_key(tag)
}

fn warn_unstyled(tag: &str) {
    let mut seen = UNSTYLED.lock();
    if seen.insert(tag.to_owned()) {
        log!("warn"; "tag `{tag}` has no style entry, using neutral color");
    }
}
