//! URL slugs for tag pages and in-page anchors.
//!
//! The mode comes from `[build.slug]`: `path` governs `/tags/<slug>/`
//! segments, `fragment` governs `#anchor` ids.

use crate::config::{SiteConfig, SlugMode};

/// Characters forbidden in URL path segments and fragments
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '/', '(', ')', '[', ']', '\t', '\r', '\n',
];

/// Anchor id for a heading or section, per `[build.slug].fragment`.
pub fn slugify_fragment(text: &str, config: &SiteConfig) -> String {
    apply(text, &config.build.slug.fragment)
}

/// Path segment for a tag page, per `[build.slug].path`.
pub fn tag_slug(tag: &str, config: &SiteConfig) -> String {
    apply(tag, &config.build.slug.path)
}

fn apply(text: &str, mode: &SlugMode) -> String {
    match mode {
        SlugMode::Safe => sanitize_text(text),
        SlugMode::On => slug::slugify(text),
        // Still strip `/`, or the segment would split the route
        SlugMode::No => text.replace('/', "_"),
    }
}

/// Remove forbidden characters and replace whitespace with underscores
pub fn sanitize_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(path: SlugMode, fragment: SlugMode) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.slug.path = path;
        config.build.slug.fragment = fragment;
        config
    }

    #[test]
    fn test_sanitize_text_removes_forbidden_chars() {
        assert_eq!(sanitize_text("a<b>c:d|e?f*g#h\\i(j)k[l]m/n"), "abcdefghijklmn");
    }

    #[test]
    fn test_sanitize_text_whitespace() {
        assert_eq!(sanitize_text("  Claude Code  "), "Claude_Code");
        // \t and \n are forbidden chars, so they are removed
        assert_eq!(sanitize_text("a\tb\nc"), "abc");
    }

    #[test]
    fn test_sanitize_text_preserves_unicode() {
        assert_eq!(sanitize_text("バグ修正"), "バグ修正");
        assert_eq!(sanitize_text("破壊的 変更"), "破壊的_変更");
    }

    #[test]
    fn test_sanitize_text_only_forbidden() {
        assert_eq!(sanitize_text("<>:?*#"), "");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn test_tag_slug_modes() {
        let safe = config_with(SlugMode::Safe, SlugMode::On);
        assert_eq!(tag_slug("新機能", &safe), "新機能");
        assert_eq!(tag_slug("CI/CD", &safe), "CICD");

        let on = config_with(SlugMode::On, SlugMode::On);
        assert_eq!(tag_slug("Hooks API", &on), "hooks-api");

        let no = config_with(SlugMode::No, SlugMode::On);
        assert_eq!(tag_slug("Hooks API", &no), "Hooks API");
        assert_eq!(tag_slug("CI/CD", &no), "CI_CD");
    }

    #[test]
    fn test_slugify_fragment() {
        let config = config_with(SlugMode::Safe, SlugMode::On);
        assert_eq!(slugify_fragment("Install the CLI", &config), "install-the-cli");

        let config = config_with(SlugMode::Safe, SlugMode::Safe);
        assert_eq!(slugify_fragment("Install the CLI", &config), "Install_the_CLI");
    }
}
