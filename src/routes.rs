//! Route table: URL paths ↔ views.
//!
//! | Path                  | Route                 |
//! |-----------------------|-----------------------|
//! | `/`                   | [`Route::Home`]       |
//! | `/release-notes`      | redirect to `/`       |
//! | `/versions/<v>/`      | [`Route::Version`]    |
//! | `/plugins/`           | [`Route::Plugins`]    |
//! | `/setup/`             | [`Route::Setup`]      |
//! | `/hands-on/`          | [`Route::HandsOn`]    |
//! | `/hands-on/<topic>/`  | [`Route::Topic`]      |
//! | `/tags/`              | [`Route::Tags`]       |
//! | `/tags/<tag>/`        | [`Route::Tag`]        |
//! | `/<slug>/`            | [`Route::Page`]       |
//!
//! Paths here never include `[build].path_prefix`; [`strip_prefix`] and
//! [`Route::href`] convert at the edges.

use crate::{
    config::SiteConfig,
    content::ContentStore,
    filter::tag_counts,
    log,
    utils::slug::tag_slug,
};
use rustc_hash::FxHashSet;
use std::path::PathBuf;

/// First path segments owned by built-in routes.
pub const RESERVED: &[&str] = &[
    "release-notes",
    "versions",
    "plugins",
    "setup",
    "hands-on",
    "tags",
    "assets",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    /// Legacy alias of the home page
    ReleaseNotes,
    Version(String),
    Plugins,
    Setup,
    HandsOn,
    Topic(String),
    Tags,
    /// Tag name after [`resolve`], raw path segment before
    Tag(String),
    Page(String),
}

/// Outcome of looking a path up against the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    View(Route),
    Redirect(Route),
    NotFound,
}

impl Route {
    /// Parse a site path (already percent-decoded, prefix stripped).
    ///
    /// Only checks the shape; identifiers are checked by [`resolve`].
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Self::Home,
            ["release-notes"] => Self::ReleaseNotes,
            ["versions", version] => Self::Version((*version).to_owned()),
            ["plugins"] => Self::Plugins,
            ["setup"] => Self::Setup,
            ["hands-on"] => Self::HandsOn,
            ["hands-on", topic] => Self::Topic((*topic).to_owned()),
            ["tags"] => Self::Tags,
            ["tags", tag] => Self::Tag((*tag).to_owned()),
            [slug] if !RESERVED.contains(slug) => Self::Page((*slug).to_owned()),
            _ => return None,
        };
        Some(route)
    }

    /// Canonical site path, used as the route identity for view state.
    ///
    /// Segments are left unencoded.
    pub fn identity(&self, config: &SiteConfig) -> String {
        self.segments(config)
            .iter()
            .fold(String::from("/"), |mut path, segment| {
                path.push_str(segment);
                path.push('/');
                path
            })
    }

    /// Link target including the path prefix, segments percent-encoded.
    pub fn href(&self, config: &SiteConfig) -> String {
        let mut href = config.url_prefix();
        href.push('/');
        for segment in self.segments(config) {
            href.push_str(&urlencoding::encode(&segment));
            href.push('/');
        }
        href
    }

    /// Output file for this route under `[build].output`.
    pub fn output_file(&self, config: &SiteConfig) -> PathBuf {
        let mut path = config.build.output.join(&config.build.path_prefix);
        for segment in self.segments(config) {
            path.push(segment);
        }
        path.join("index.html")
    }

    fn segments(&self, config: &SiteConfig) -> Vec<String> {
        match self {
            Self::Home => vec![],
            Self::ReleaseNotes => vec!["release-notes".into()],
            Self::Version(v) => vec!["versions".into(), v.clone()],
            Self::Plugins => vec!["plugins".into()],
            Self::Setup => vec!["setup".into()],
            Self::HandsOn => vec!["hands-on".into()],
            Self::Topic(id) => vec!["hands-on".into(), id.clone()],
            Self::Tags => vec!["tags".into()],
            Self::Tag(tag) => vec!["tags".into(), tag_segment(tag, config)],
            Self::Page(slug) => vec![slug.clone()],
        }
    }

    /// Every renderable route for the current content, in build order.
    ///
    /// Pages whose slug collides with a built-in route are skipped, as are
    /// identifiers that cannot be a single path segment. Tags sharing a
    /// segment get one route, named after the first one seen.
    pub fn all(store: &ContentStore, config: &SiteConfig) -> Vec<Self> {
        let mut routes = vec![
            Self::Home,
            Self::Plugins,
            Self::Setup,
            Self::HandsOn,
            Self::Tags,
        ];
        for release in &store.releases {
            if usable_segment("version", &release.version) {
                routes.push(Self::Version(release.version.clone()));
            }
        }
        for topic in &store.topics {
            if usable_segment("topic", &topic.id) {
                routes.push(Self::Topic(topic.id.clone()));
            }
        }
        routes.extend(tag_owners(store, config).into_iter().map(Self::Tag));
        for page in &store.pages {
            if RESERVED.contains(&page.slug.as_str()) {
                log!("warn"; "page `{}` shadows a built-in route, skipped", page.slug);
            } else if usable_segment("page", &page.slug) {
                routes.push(Self::Page(page.slug.clone()));
            }
        }
        routes
    }
}

/// A segment that stays inside its parent directory once written to disk.
fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

fn usable_segment(kind: &str, id: &str) -> bool {
    let ok = is_safe_segment(id);
    if !ok {
        log!("warn"; "{kind} id `{id}` is not a valid path segment, skipped");
    }
    ok
}

/// Path segment of a tag page.
///
/// Falls back to a short content hash when the slug would be empty or
/// would climb out of `tags/`.
pub fn tag_segment(tag: &str, config: &SiteConfig) -> String {
    let slug = tag_slug(tag, config);
    if is_safe_segment(&slug) {
        slug
    } else {
        let hash = blake3::hash(tag.as_bytes());
        format!("tag-{}", hex::encode(&hash.as_bytes()[..4]))
    }
}

/// One tag per page segment, most used first. On a shared segment the
/// earlier tag in that order owns the page.
fn tag_owners(store: &ContentStore, config: &SiteConfig) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut owners = Vec::new();
    for count in tag_counts(store.all_items()) {
        let segment = tag_segment(count.tag, config);
        if seen.insert(segment.clone()) {
            owners.push(count.tag.to_owned());
        } else {
            log!("warn"; "tag `{}` shares the page `tags/{segment}/` with another tag", count.tag);
        }
    }
    owners
}

/// Every distinct tag whose page segment matches `tag`'s, `tag` included.
pub fn tag_aliases(store: &ContentStore, tag: &str, config: &SiteConfig) -> Vec<String> {
    let segment = tag_segment(tag, config);
    let mut aliases: Vec<String> = Vec::new();
    for candidate in store.all_items().flat_map(|item| item.tags.iter()) {
        if !aliases.contains(candidate) && tag_segment(candidate, config) == segment {
            aliases.push(candidate.clone());
        }
    }
    if aliases.is_empty() {
        aliases.push(tag.to_owned());
    }
    aliases
}

/// Remove `[build].path_prefix` from a request path.
///
/// Returns `None` for paths outside the prefix.
pub fn strip_prefix<'a>(path: &'a str, config: &SiteConfig) -> Option<&'a str> {
    let prefix = config.url_prefix();
    if prefix.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(&prefix)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Resolve a site path to a view, redirect, or not-found.
pub fn resolve(path: &str, store: &ContentStore, config: &SiteConfig) -> Resolution {
    let Some(route) = Route::parse(path) else {
        return Resolution::NotFound;
    };

    let found = match &route {
        Route::ReleaseNotes => return Resolution::Redirect(Route::Home),
        Route::Version(v) => store.release(v).is_some(),
        Route::Topic(id) => store.topic(id).is_some(),
        Route::Page(slug) => store.page(slug).is_some(),
        Route::Tag(segment) => {
            return find_tag(store, segment, config)
                .map_or(Resolution::NotFound, |tag| Resolution::View(Route::Tag(tag)));
        }
        Route::Home | Route::Plugins | Route::Setup | Route::HandsOn | Route::Tags => true,
    };

    if found {
        Resolution::View(route)
    } else {
        Resolution::NotFound
    }
}

/// Find the tag that owns the page at `segment`, in the order [`tag_owners`] uses.
fn find_tag(store: &ContentStore, segment: &str, config: &SiteConfig) -> Option<String> {
    tag_counts(store.all_items())
        .into_iter()
        .find(|count| tag_segment(count.tag, config) == segment)
        .map(|count| count.tag.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlugMode;
    use crate::content::{InfoPage, ReleaseItem, ReleaseVersion, Topic};
    use std::path::Path;

    fn store() -> ContentStore {
        ContentStore {
            releases: vec![
                ReleaseVersion {
                    version: "1.0.0".into(),
                    date: None,
                    items: vec![ReleaseItem {
                        text: "Fixed bug in SDK".into(),
                        tags: vec!["バグ修正".into()],
                    }],
                },
                ReleaseVersion {
                    version: "1.1.0".into(),
                    date: None,
                    items: vec![ReleaseItem {
                        text: "New MCP feature".into(),
                        tags: vec!["新機能".into(), "Hooks API".into()],
                    }],
                },
            ],
            topics: vec![Topic {
                id: "first-steps".into(),
                title: "First steps".into(),
                ..Topic::default()
            }],
            pages: vec![
                InfoPage {
                    slug: "about".into(),
                    title: "About".into(),
                    blocks: vec![],
                },
                InfoPage {
                    slug: "plugins".into(),
                    title: "Shadowed".into(),
                    blocks: vec![],
                },
            ],
            ..ContentStore::default()
        }
    }

    #[test]
    fn test_parse_shapes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse(""), Some(Route::Home));
        assert_eq!(Route::parse("/release-notes"), Some(Route::ReleaseNotes));
        assert_eq!(Route::parse("/versions/1.0.0/"), Some(Route::Version("1.0.0".into())));
        assert_eq!(Route::parse("/hands-on/x"), Some(Route::Topic("x".into())));
        assert_eq!(Route::parse("/tags/"), Some(Route::Tags));
        assert_eq!(Route::parse("/about/"), Some(Route::Page("about".into())));
        assert_eq!(Route::parse("/versions/"), None);
        assert_eq!(Route::parse("/a/b/c"), None);
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let config = SiteConfig::default();
        let store = store();

        assert_eq!(
            resolve("/versions/1.0.0/", &store, &config),
            Resolution::View(Route::Version("1.0.0".into()))
        );
        assert_eq!(resolve("/versions/9.9.9/", &store, &config), Resolution::NotFound);
        assert_eq!(resolve("/hands-on/nope/", &store, &config), Resolution::NotFound);
        assert_eq!(resolve("/missing/", &store, &config), Resolution::NotFound);
        assert_eq!(
            resolve("/about/", &store, &config),
            Resolution::View(Route::Page("about".into()))
        );
    }

    #[test]
    fn test_release_notes_redirects_home() {
        let config = SiteConfig::default();
        assert_eq!(
            resolve("/release-notes", &store(), &config),
            Resolution::Redirect(Route::Home)
        );
    }

    #[test]
    fn test_resolve_tag_by_slug() {
        let mut config = SiteConfig::default();
        let store = store();

        // Safe mode keeps unicode, replaces spaces
        assert_eq!(
            resolve("/tags/Hooks_API/", &store, &config),
            Resolution::View(Route::Tag("Hooks API".into()))
        );
        assert_eq!(
            resolve("/tags/新機能/", &store, &config),
            Resolution::View(Route::Tag("新機能".into()))
        );

        config.build.slug.path = SlugMode::On;
        assert_eq!(
            resolve("/tags/hooks-api/", &store, &config),
            Resolution::View(Route::Tag("Hooks API".into()))
        );
        assert_eq!(resolve("/tags/unknown/", &store, &config), Resolution::NotFound);
    }

    #[test]
    fn test_href_and_identity() {
        let mut config = SiteConfig::default();
        let tag = Route::Tag("新機能".into());
        assert_eq!(tag.identity(&config), "/tags/新機能/");
        assert_eq!(tag.href(&config), "/tags/%E6%96%B0%E6%A9%9F%E8%83%BD/");
        assert_eq!(Route::Home.href(&config), "/");

        config.build.path_prefix = "notes".into();
        assert_eq!(Route::Plugins.href(&config), "/notes/plugins/");
        assert_eq!(Route::Plugins.identity(&config), "/plugins/");
    }

    #[test]
    fn test_output_file() {
        let mut config = SiteConfig::default();
        config.build.output = "/tmp/site".into();
        assert_eq!(
            Route::Version("1.0.0".into()).output_file(&config),
            PathBuf::from("/tmp/site/versions/1.0.0/index.html")
        );
        assert_eq!(Route::Home.output_file(&config), PathBuf::from("/tmp/site/index.html"));
    }

    #[test]
    fn test_strip_prefix() {
        let mut config = SiteConfig::default();
        assert_eq!(strip_prefix("/plugins/", &config), Some("/plugins/"));

        config.build.path_prefix = "notes".into();
        assert_eq!(strip_prefix("/notes/plugins/", &config), Some("/plugins/"));
        assert_eq!(strip_prefix("/notes", &config), Some(""));
        assert_eq!(strip_prefix("/notesx/", &config), None);
        assert_eq!(strip_prefix("/plugins/", &config), None);
    }

    #[test]
    fn test_all_routes() {
        let routes = Route::all(&store(), &SiteConfig::default());
        assert!(routes.contains(&Route::Home));
        assert!(routes.contains(&Route::Version("1.1.0".into())));
        assert!(routes.contains(&Route::Topic("first-steps".into())));
        assert!(routes.contains(&Route::Tag("バグ修正".into())));
        assert!(routes.contains(&Route::Page("about".into())));
        assert!(!routes.contains(&Route::Page("plugins".into())));
        assert!(!routes.contains(&Route::ReleaseNotes));
    }

    fn store_with_tags(tags: &[&[&str]]) -> ContentStore {
        ContentStore {
            releases: vec![ReleaseVersion {
                version: "2.0.0".into(),
                date: None,
                items: tags
                    .iter()
                    .enumerate()
                    .map(|(i, tags)| ReleaseItem {
                        text: format!("change {i}"),
                        tags: tags.iter().map(|&t| t.into()).collect(),
                    })
                    .collect(),
            }],
            ..ContentStore::default()
        }
    }

    #[test]
    fn test_tag_segment_never_escapes_tags_dir() {
        let mut config = SiteConfig::default();
        config.build.output = "/tmp/site".into();

        for tag in ["(?)", "..", ".", "  "] {
            let segment = tag_segment(tag, &config);
            assert!(segment.starts_with("tag-"), "{tag:?} -> {segment}");
            assert_eq!(segment.len(), "tag-".len() + 8);
            let file = Route::Tag(tag.into()).output_file(&config);
            assert_eq!(file.parent().unwrap().parent().unwrap(), Path::new("/tmp/site/tags"));
        }
        assert_ne!(tag_segment("(?)", &config), tag_segment("..", &config));
        assert_eq!(tag_segment("新機能", &config), "新機能");

        config.build.slug.path = SlugMode::On;
        assert!(tag_segment("!!!", &config).starts_with("tag-"));

        config.build.slug.path = SlugMode::No;
        assert!(tag_segment("..", &config).starts_with("tag-"));
    }

    #[test]
    fn test_hashed_tag_segment_resolves() {
        let config = SiteConfig::default();
        let store = store_with_tags(&[&["(?)"]]);
        let path = Route::Tag("(?)".into()).identity(&config);

        assert_eq!(
            resolve(&path, &store, &config),
            Resolution::View(Route::Tag("(?)".into()))
        );
        assert_eq!(resolve("/tags/../", &store, &config), Resolution::NotFound);
    }

    #[test]
    fn test_colliding_tags_share_one_route() {
        let config = SiteConfig::default();
        // Safe mode drops `/`, so both land on `tags/CICD/`
        let store = store_with_tags(&[&["CICD"], &["CI/CD"], &["CI/CD"]]);

        let tags: Vec<_> = Route::all(&store, &config)
            .into_iter()
            .filter(|r| matches!(r, Route::Tag(_)))
            .collect();
        assert_eq!(tags, vec![Route::Tag("CI/CD".into())]);
        assert_eq!(
            resolve("/tags/CICD/", &store, &config),
            Resolution::View(Route::Tag("CI/CD".into()))
        );
        assert_eq!(tag_aliases(&store, "CI/CD", &config), vec!["CICD", "CI/CD"]);
        assert_eq!(tag_aliases(&store, "CICD", &config), vec!["CICD", "CI/CD"]);
    }

    #[test]
    fn test_case_folding_collision_in_slug_mode() {
        let mut config = SiteConfig::default();
        let store = store_with_tags(&[&["MCP"], &["mcp"]]);

        // Safe mode keeps case: two pages
        let safe = Route::all(&store, &config);
        assert!(safe.contains(&Route::Tag("MCP".into())));
        assert!(safe.contains(&Route::Tag("mcp".into())));

        config.build.slug.path = SlugMode::On;
        let routes = Route::all(&store, &config);
        let tags: Vec<_> = routes.iter().filter(|r| matches!(r, Route::Tag(_))).collect();
        assert_eq!(tags, vec![&Route::Tag("MCP".into())]);
        assert_eq!(tag_aliases(&store, "mcp", &config), vec!["MCP", "mcp"]);
    }

    #[test]
    fn test_unusable_ids_are_skipped() {
        let mut store = store();
        store.releases[0].version = "..".into();
        store.topics[0].id = "a/b".into();
        store.pages[0].slug = String::new();

        let routes = Route::all(&store, &SiteConfig::default());
        assert!(!routes.contains(&Route::Version("..".into())));
        assert!(routes.contains(&Route::Version("1.1.0".into())));
        assert!(!routes.contains(&Route::Topic("a/b".into())));
        assert!(!routes.contains(&Route::Page(String::new())));
    }
}
