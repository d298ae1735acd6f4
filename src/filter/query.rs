//! Free-text query and tag/category selector.
//!
//! An item passes when it matches the text query AND the selector. The
//! empty query and the `all` selector match everything. Nested collections
//! (release → items, category → plugins) drop containers whose filtered
//! children end up empty, unless no filter is active at all.

use crate::content::{Plugin, PluginCategory, ReleaseItem, ReleaseVersion, Topic, VersionDetailItem};
use std::fmt;

/// Selector value meaning "no restriction".
pub const ALL: &str = "all";

// ============================================================================
// Selector
// ============================================================================

/// Active category/tag selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selector {
    #[default]
    All,
    Tag(String),
}

impl Selector {
    /// Parse a selector from user input.
    ///
    /// Empty input and `all` (any case) select everything.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL) {
            Self::All
        } else {
            Self::Tag(raw.to_owned())
        }
    }

    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn as_tag(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Tag(tag) => Some(tag),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag().unwrap_or(ALL))
    }
}

// ============================================================================
// Filterable
// ============================================================================

/// An item the query filter can test.
pub trait Filterable {
    /// Whether any searchable field contains `needle`.
    ///
    /// `needle` is already lower-cased and non-empty.
    fn contains_text(&self, needle: &str) -> bool;

    /// Whether the item carries the selected tag or category.
    fn matches_selector(&self, selector: &str) -> bool;
}

/// Case-insensitive substring test against a lower-cased needle.
fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn any_tag_contains(tags: &[String], needle: &str) -> bool {
    tags.iter().any(|t| contains_lower(t, needle))
}

fn has_tag(tags: &[String], selector: &str) -> bool {
    tags.iter().any(|t| t == selector)
}

impl Filterable for ReleaseItem {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.text, needle) || any_tag_contains(&self.tags, needle)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        has_tag(&self.tags, selector)
    }
}

impl Filterable for VersionDetailItem {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.text, needle)
            || contains_lower(&self.detail, needle)
            || any_tag_contains(&self.tags, needle)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        self.category == selector || has_tag(&self.tags, selector)
    }
}

impl Filterable for Plugin {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.name, needle)
            || contains_lower(&self.description, needle)
            || self.command.as_deref().is_some_and(|c| contains_lower(c, needle))
            || any_tag_contains(&self.tags, needle)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        has_tag(&self.tags, selector)
    }
}

impl Filterable for Topic {
    fn contains_text(&self, needle: &str) -> bool {
        contains_lower(&self.title, needle)
            || contains_lower(&self.summary, needle)
            || any_tag_contains(&self.tags, needle)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        has_tag(&self.tags, selector) || self.level.as_deref() == Some(selector)
    }
}

impl<T: Filterable + ?Sized> Filterable for &T {
    fn contains_text(&self, needle: &str) -> bool {
        (**self).contains_text(needle)
    }

    fn matches_selector(&self, selector: &str) -> bool {
        (**self).matches_selector(selector)
    }
}

// ============================================================================
// Containers
// ============================================================================

/// A record owning a child collection that is filtered item by item.
pub trait Container {
    type Child: Filterable;

    fn children(&self) -> &[Self::Child];

    /// Whether the container itself satisfies the selector, which lets
    /// every child through the selector check.
    fn matches_selector(&self, _selector: &str) -> bool {
        false
    }
}

impl Container for ReleaseVersion {
    type Child = ReleaseItem;

    fn children(&self) -> &[ReleaseItem] {
        &self.items
    }
}

impl Container for PluginCategory {
    type Child = Plugin;

    fn children(&self) -> &[Plugin] {
        &self.plugins
    }

    fn matches_selector(&self, selector: &str) -> bool {
        self.id == selector
    }
}

/// A container together with the children that passed the filter.
pub struct Filtered<'a, C: Container> {
    pub parent: &'a C,
    pub children: Vec<&'a C::Child>,
}

impl<C: Container> Clone for Filtered<'_, C> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent,
            children: self.children.clone(),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Text query plus selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Trimmed text as entered
    text: String,
    /// Lower-cased `text`, compared against lower-cased fields
    needle: String,
    selector: Selector,
}

impl Query {
    pub fn new(text: &str, selector: Selector) -> Self {
        let text = text.trim().to_owned();
        let needle = text.to_lowercase();
        Self {
            text,
            needle,
            selector,
        }
    }

    /// Query matching everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// True when neither text nor selector restrict anything.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty() && self.selector.is_all()
    }

    fn text_matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        self.needle.is_empty() || item.contains_text(&self.needle)
    }

    /// Test a single item against text and selector.
    pub fn matches<T: Filterable + ?Sized>(&self, item: &T) -> bool {
        let selector_ok = match &self.selector {
            Selector::All => true,
            Selector::Tag(tag) => item.matches_selector(tag),
        };
        selector_ok && self.text_matches(item)
    }

    /// Items that pass the query, in input order.
    pub fn filter<'a, T, I>(&self, items: I) -> Vec<&'a T>
    where
        T: Filterable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        items.into_iter().filter(|item| self.matches(*item)).collect()
    }

    /// Filter each container's children, dropping containers left empty.
    pub fn filter_nested<'a, C, I>(&self, containers: I) -> Vec<Filtered<'a, C>>
    where
        C: Container + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        if self.is_empty() {
            return containers
                .into_iter()
                .map(|parent| Filtered {
                    parent,
                    children: parent.children().iter().collect(),
                })
                .collect();
        }

        containers
            .into_iter()
            .filter_map(|parent| {
                let parent_selected = self
                    .selector
                    .as_tag()
                    .is_some_and(|tag| parent.matches_selector(tag));

                let children: Vec<_> = parent
                    .children()
                    .iter()
                    .filter(|child| {
                        if parent_selected {
                            self.text_matches(*child)
                        } else {
                            self.matches(*child)
                        }
                    })
                    .collect();

                (!children.is_empty()).then_some(Filtered { parent, children })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str, tags: &[&str]) -> ReleaseItem {
        ReleaseItem {
            text: text.into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn release(version: &str, items: Vec<ReleaseItem>) -> ReleaseVersion {
        ReleaseVersion {
            version: version.into(),
            date: None,
            items,
        }
    }

    fn example_items() -> Vec<ReleaseItem> {
        vec![
            item("Fixed bug in SDK", &["バグ修正"]),
            item("New MCP feature", &["新機能", "MCP"]),
        ]
    }

    // ------------------------------------------------------------------------
    // Selector
    // ------------------------------------------------------------------------

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse(""), Selector::All);
        assert_eq!(Selector::parse("  "), Selector::All);
        assert_eq!(Selector::parse("all"), Selector::All);
        assert_eq!(Selector::parse("ALL"), Selector::All);
        assert_eq!(Selector::parse(" MCP "), Selector::Tag("MCP".into()));
    }

    #[test]
    fn test_selector_display() {
        assert_eq!(Selector::All.to_string(), "all");
        assert_eq!(Selector::Tag("新機能".into()).to_string(), "新機能");
    }

    // ------------------------------------------------------------------------
    // Flat filtering
    // ------------------------------------------------------------------------

    #[test]
    fn test_query_case_insensitive() {
        let items = example_items();
        let result = Query::new("mcp", Selector::All).filter(&items);
        assert_eq!(result, [&items[1]]);
    }

    #[test]
    fn test_query_unicode_case() {
        let items = vec![item("Ärger mit Umlauten", &[])];
        assert_eq!(Query::new("ärger", Selector::All).filter(&items).len(), 1);
    }

    #[test]
    fn test_query_matches_tag_names() {
        let items = example_items();
        let result = Query::new("バグ", Selector::All).filter(&items);
        assert_eq!(result, [&items[0]]);
    }

    #[test]
    fn test_empty_query_returns_all() {
        let items = example_items();
        let result = Query::all().filter(&items);
        assert_eq!(result, items.iter().collect::<Vec<_>>());

        let whitespace = Query::new("   ", Selector::parse("all"));
        assert!(whitespace.is_empty());
        assert_eq!(whitespace.filter(&items).len(), 2);
    }

    #[test]
    fn test_selector_only() {
        let items = example_items();
        let result = Query::new("", Selector::Tag("新機能".into())).filter(&items);
        assert_eq!(result, [&items[1]]);

        let none = Query::new("", Selector::Tag("unknown".into())).filter(&items);
        assert!(none.is_empty());
    }

    #[test]
    fn test_text_and_selector_are_anded() {
        let items = example_items();
        let query = Query::new("sdk", Selector::Tag("新機能".into()));
        assert!(query.filter(&items).is_empty());

        let query = Query::new("feature", Selector::Tag("MCP".into()));
        assert_eq!(query.filter(&items), [&items[1]]);
    }

    #[test]
    fn test_filter_idempotent() {
        let items = vec![
            item("Add MCP server", &["MCP"]),
            item("mcp timeout fix", &["バグ修正"]),
            item("Faster startup", &["改善"]),
        ];
        let query = Query::new("MCP", Selector::All);
        let once = query.filter(&items);
        let twice = query.filter(once.iter().copied());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_detail_item_category_selector() {
        let detail = VersionDetailItem {
            text: "Hooks".into(),
            tags: vec![],
            detail: "Run commands on events".into(),
            category: "automation".into(),
        };
        assert!(Query::new("", Selector::Tag("automation".into())).matches(&detail));
        assert!(Query::new("events", Selector::All).matches(&detail));
        assert!(!Query::new("nothing", Selector::All).matches(&detail));
    }

    #[test]
    fn test_topic_level_selector() {
        let topic = Topic {
            id: "t".into(),
            title: "First steps".into(),
            level: Some("beginner".into()),
            ..Default::default()
        };
        assert!(Query::new("", Selector::Tag("beginner".into())).matches(&topic));
        assert!(Query::new("first", Selector::All).matches(&topic));
    }

    // ------------------------------------------------------------------------
    // Nested filtering
    // ------------------------------------------------------------------------

    #[test]
    fn test_nested_drops_empty_containers() {
        let releases = vec![
            release("1.0.0", vec![item("Fixed bug in SDK", &["バグ修正"])]),
            release("1.1.0", example_items()),
        ];
        let result = Query::new("mcp", Selector::All).filter_nested(&releases);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].parent.version, "1.1.0");
        assert_eq!(result[0].children, [&releases[1].items[1]]);
    }

    #[test]
    fn test_nested_empty_query_returns_everything() {
        let releases = vec![
            release("1.0.0", example_items()),
            release("1.1.0", vec![]),
        ];
        let result = Query::all().filter_nested(&releases);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].children.len(), 2);
        assert!(result[1].children.is_empty());
    }

    #[test]
    fn test_nested_filter_drops_originally_empty_when_active() {
        let releases = vec![release("1.0.0", vec![])];
        let result = Query::new("x", Selector::All).filter_nested(&releases);
        assert!(result.is_empty());
    }

    #[test]
    fn test_nested_idempotent() {
        let releases = vec![
            release("1.0.0", example_items()),
            release("1.1.0", vec![item("MCP auth", &["MCP"])]),
        ];
        let query = Query::new("mcp", Selector::Tag("MCP".into()));
        let once = query.filter_nested(&releases);

        for group in &once {
            let again = query.filter(group.children.iter().copied());
            assert_eq!(again, group.children);
        }
    }

    #[test]
    fn test_nested_category_selector_passes_children() {
        let categories = vec![
            PluginCategory {
                id: "git".into(),
                name: "Git".into(),
                description: String::new(),
                plugins: vec![
                    Plugin {
                        name: "commit-helper".into(),
                        ..Default::default()
                    },
                    Plugin {
                        name: "pr-review".into(),
                        ..Default::default()
                    },
                ],
            },
            PluginCategory {
                id: "docs".into(),
                name: "Docs".into(),
                description: String::new(),
                plugins: vec![Plugin {
                    name: "doc-writer".into(),
                    tags: vec!["git".into()],
                    ..Default::default()
                }],
            },
        ];

        let result = Query::new("", Selector::Tag("git".into())).filter_nested(&categories);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].children.len(), 2);
        assert_eq!(result[1].children.len(), 1);

        let result = Query::new("review", Selector::Tag("git".into())).filter_nested(&categories);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].children[0].name, "pr-review");
    }
}
