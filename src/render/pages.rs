//! One renderer per view. Each returns the page body; the layout is
//! applied by [`super::render_route`].

use super::{Page, RenderContext, components as c};
use crate::{
    content::{ReleaseVersion, Topic},
    filter::{
        Filtered, Query, Selector, highlight::Highlighter, tag_counts, top_tags,
        total_occurrences,
    },
    routes::{Route, tag_aliases},
    utils::html::escape_html,
};

/// Release notes home: every version, newest first, filtered by the view state.
pub fn home(ctx: &RenderContext<'_>) -> Page {
    let store = ctx.store;
    let query = ctx.state.query();
    let hl = Highlighter::new(query.text());

    let counts = top_tags(store.all_items(), ctx.config.build.top_tags);
    let filtered = query.filter_nested(store.releases_newest_first());
    let shown: usize = filtered.iter().map(|f| f.children.len()).sum();

    let mut body = format!("<h1>{}</h1>", escape_html(&ctx.config.base.title));
    if !ctx.config.base.description.is_empty() {
        body.push_str(&format!("<p>{}</p>", escape_html(&ctx.config.base.description)));
    }
    body.push_str(&c::search_form("Search release notes", ctx));
    body.push_str(&c::selector_chips(&counts, ctx));
    body.push_str(&c::result_summary(shown, store.all_items().count(), "changes", ctx));

    if filtered.is_empty() {
        body.push_str(&c::empty_state("No release notes match your search."));
    }
    for release in &filtered {
        body.push_str(&c::release_card(release, &hl, ctx));
    }

    Page {
        title: ctx.config.base.title.clone(),
        body,
        ..Page::default()
    }
}

/// Single version. Uses the enriched detail cards when the version has
/// detail records, the basic item list otherwise.
pub fn version(version: &str, ctx: &RenderContext<'_>) -> Option<Page> {
    let store = ctx.store;
    let release = store.release(version)?;
    let query = ctx.state.query();
    let hl = Highlighter::new(query.text());
    let details = store.details_for(version);

    let mut body = format!(r#"<h1>Version {}</h1>"#, escape_html(&release.version));
    if let Some(date) = &release.date {
        body.push_str(&format!(r#"<p class="date">{}</p>"#, escape_html(date)));
    }
    body.push_str(&c::search_form("Search this version", ctx));

    let n = ctx.config.build.top_tags;
    let counts = match details {
        Some(details) => top_tags(details, n),
        None => top_tags(&release.items, n),
    };
    body.push_str(&c::selector_chips(&counts, ctx));

    match details {
        Some(details) => {
            let cards: Vec<String> = details
                .iter()
                .enumerate()
                .filter(|(_, item)| query.matches(*item))
                .map(|(index, item)| {
                    let id = format!("card-{index}");
                    c::detail_card(&id, item, ctx.state.card(&id), &hl, ctx)
                })
                .collect();
            body.push_str(&c::result_summary(cards.len(), details.len(), "changes", ctx));
            if cards.is_empty() {
                body.push_str(&c::empty_state("No changes match your search."));
            }
            body.push_str(&cards.concat());
        }
        None => body.push_str(&fallback_list(release, &query, &hl, ctx)),
    }

    body.push_str(&pager(version, ctx));

    Some(Page {
        title: format!("Version {}", release.version),
        description: Some(format!("Changes in version {}", release.version)),
        body,
        ..Page::default()
    })
}

/// Basic text + tags rendering for versions without detail records.
fn fallback_list(
    release: &ReleaseVersion,
    query: &Query,
    hl: &Highlighter,
    ctx: &RenderContext<'_>,
) -> String {
    let items = query.filter(&release.items);
    let mut html = String::from(r#"<section class="fallback">"#);
    html.push_str(&c::result_summary(items.len(), release.items.len(), "changes", ctx));
    if items.is_empty() {
        html.push_str(&c::empty_state("No changes match your search."));
    } else {
        html.push_str(r#"<ul class="items">"#);
        for item in items {
            html.push_str(&c::release_item(item, hl, ctx));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
    html
}

/// Links to the chronologically previous and next versions.
fn pager(version: &str, ctx: &RenderContext<'_>) -> String {
    let (previous, next) = ctx.store.neighbors(version);
    let link = |release: Option<&ReleaseVersion>, rel: &str, arrow: &str| {
        release
            .map(|r| {
                format!(
                    r#"<a rel="{rel}" href="{}">{arrow} {}</a>"#,
                    Route::Version(r.version.clone()).href(ctx.config),
                    escape_html(&r.version)
                )
            })
            .unwrap_or_else(|| "<span></span>".to_owned())
    };
    format!(
        r#"<nav class="pager">{}{}</nav>"#,
        link(previous, "prev", "←"),
        link(next, "next", "→")
    )
}

/// Plugin catalog grouped by category. The selector takes a category id
/// or a tag.
pub fn plugins(ctx: &RenderContext<'_>) -> Page {
    let store = ctx.store;
    let query = ctx.state.query();
    let hl = Highlighter::new(query.text());
    let base = ctx.current_href();

    let mut body = String::from("<h1>Plugins</h1>");
    body.push_str(&c::search_form("Search plugins", ctx));

    // Category switcher
    body.push_str(r#"<nav class="tab-bar">"#);
    let all_href = ctx.state.href_with(|s| s.set_selector(Selector::All));
    body.push_str(&format!(
        r#"<a href="{}"{}>All</a>"#,
        escape_html(&format!("{base}{all_href}")),
        if query.selector().is_all() { r#" class="active""# } else { "" }
    ));
    for category in &store.plugins {
        let href = ctx
            .state
            .href_with(|s| s.set_selector(Selector::Tag(category.id.clone())));
        let active = query.selector().as_tag() == Some(category.id.as_str());
        body.push_str(&format!(
            r#"<a href="{}"{}>{}</a>"#,
            escape_html(&format!("{base}{href}")),
            if active { r#" class="active""# } else { "" },
            escape_html(&category.name)
        ));
    }
    body.push_str("</nav>");

    let all_plugins = store.plugins.iter().flat_map(|cat| cat.plugins.iter());
    let counts = top_tags(all_plugins.clone(), ctx.config.build.top_tags);
    body.push_str(&c::selector_chips(&counts, ctx));

    let filtered = query.filter_nested(&store.plugins);
    let shown: usize = filtered.iter().map(|f| f.children.len()).sum();
    body.push_str(&c::result_summary(shown, all_plugins.count(), "plugins", ctx));

    if filtered.is_empty() {
        body.push_str(&c::empty_state("No plugins match your search."));
    }
    for group in &filtered {
        let category = group.parent;
        body.push_str(&format!(
            r#"<section class="category" id="{}"><h2>{}</h2>"#,
            escape_html(&category.id),
            escape_html(&category.name)
        ));
        if !category.description.is_empty() {
            body.push_str(&format!("<p>{}</p>", escape_html(&category.description)));
        }
        for plugin in &group.children {
            body.push_str(&c::plugin_card(plugin, &hl, ctx));
        }
        body.push_str("</section>");
    }

    Page {
        title: "Plugins".into(),
        body,
        ..Page::default()
    }
}

/// Setup guide: one tab per section, only the active section's content.
pub fn setup(ctx: &RenderContext<'_>) -> Page {
    let sections = &ctx.store.setup;
    let mut body = String::from("<h1>Setup</h1>");

    let tabs = ctx.state.tab_state(sections.iter().map(|s| s.id.as_str()));
    if sections.is_empty() {
        body.push_str(&c::empty_state("No setup guide yet."));
    } else {
        body.push_str(&c::tab_bar(
            &tabs,
            sections.iter().map(|s| (s.id.as_str(), s.title.as_str())),
            ctx,
        ));
    }

    if let Some(section) = sections.iter().find(|s| tabs.is_active(&s.id)) {
        body.push_str(&format!(
            r#"<section class="tab-panel" role="tabpanel" id="{}">"#,
            escape_html(&section.id)
        ));
        body.push_str(&c::anchored_heading(2, &section.title, ctx));
        if let Some(description) = &section.description {
            body.push_str(&format!("<p>{}</p>", escape_html(description)));
        }
        body.push_str(&c::blocks(&section.blocks));
        body.push_str("</section>");
    }

    Page {
        title: "Setup".into(),
        body,
        ..Page::default()
    }
}

/// Hands-on hub: topic cards filtered by text and tag/level.
pub fn hands_on(ctx: &RenderContext<'_>) -> Page {
    let topics = &ctx.store.topics;
    let query = ctx.state.query();
    let hl = Highlighter::new(query.text());

    let mut body = String::from("<h1>Hands-on</h1>");
    body.push_str(&c::search_form("Search topics", ctx));
    body.push_str(&c::selector_chips(&top_tags(topics, ctx.config.build.top_tags), ctx));

    let shown = query.filter(topics);
    body.push_str(&c::result_summary(shown.len(), topics.len(), "topics", ctx));
    if shown.is_empty() {
        body.push_str(&c::empty_state("No topics match your search."));
    }
    for topic in shown {
        body.push_str(&topic_card(topic, &hl, ctx));
    }

    Page {
        title: "Hands-on".into(),
        body,
        ..Page::default()
    }
}

fn topic_card(topic: &Topic, hl: &Highlighter, ctx: &RenderContext<'_>) -> String {
    format!(
        r#"<article class="card topic"><h2><a href="{}">{}</a>{}</h2><p>{}</p>{}</article>"#,
        Route::Topic(topic.id.clone()).href(ctx.config),
        hl.apply(&topic.title),
        level_badge(topic),
        hl.apply(&topic.summary),
        c::tag_list(&topic.tags, ctx),
    )
}

fn level_badge(topic: &Topic) -> String {
    topic
        .level
        .as_deref()
        .map(|l| format!(r#" <span class="level">{}</span>"#, escape_html(l)))
        .unwrap_or_default()
}

/// One tutorial topic with its ordered steps.
pub fn topic(id: &str, ctx: &RenderContext<'_>) -> Option<Page> {
    let topic = ctx.store.topic(id)?;

    let mut body = format!(
        "<h1>{}{}</h1><p>{}</p>{}",
        escape_html(&topic.title),
        level_badge(topic),
        escape_html(&topic.summary),
        c::tag_list(&topic.tags, ctx),
    );

    body.push_str(r#"<ol class="steps">"#);
    for step in &topic.steps {
        body.push_str("<li>");
        body.push_str(&c::anchored_heading(2, &step.title, ctx));
        body.push_str(&c::blocks(&step.blocks));
        body.push_str("</li>");
    }
    body.push_str("</ol>");
    body.push_str(&format!(
        r#"<p><a href="{}">← All topics</a></p>"#,
        Route::HandsOn.href(ctx.config)
    ));

    Some(Page {
        title: topic.title.clone(),
        description: Some(topic.summary.clone()).filter(|s| !s.is_empty()),
        body,
        ..Page::default()
    })
}

/// Site-wide tag index over all release items.
pub fn tags(ctx: &RenderContext<'_>) -> Page {
    let counts = tag_counts(ctx.store.all_items());
    let mut body = format!(
        r#"<h1>Tags</h1><p class="summary">{} tags, {} uses</p>"#,
        counts.len(),
        total_occurrences(&counts)
    );

    body.push_str(r#"<ul class="tags tag-index">"#);
    for count in &counts {
        let href = Route::Tag(count.tag.to_owned()).href(ctx.config);
        let badge = c::tag_badge(count.tag, Some(&href), false, ctx).replacen(
            "</a>",
            &format!(r#"<span class="count">{}</span></a>"#, count.count),
            1,
        );
        body.push_str(&format!("<li>{badge}</li>"));
    }
    body.push_str("</ul>");

    Page {
        title: "Tags".into(),
        body,
        ..Page::default()
    }
}

/// Releases restricted to one tag. The page's own tag replaces any selector
/// from the view state; the search text still applies.
///
/// Tags that share this page's path segment are listed here too.
pub fn tag(tag: &str, ctx: &RenderContext<'_>) -> Page {
    let store = ctx.store;
    let aliases = tag_aliases(store, tag, ctx.config);
    let query = Query::new(ctx.state.text(), Selector::All);
    let hl = Highlighter::new(query.text());

    let filtered: Vec<Filtered<'_, ReleaseVersion>> = query
        .filter_nested(store.releases_newest_first())
        .into_iter()
        .filter_map(|f| {
            let children: Vec<_> = f
                .children
                .into_iter()
                .filter(|item| item.tags.iter().any(|t| aliases.contains(t)))
                .collect();
            (!children.is_empty()).then_some(Filtered {
                parent: f.parent,
                children,
            })
        })
        .collect();
    let shown: usize = filtered.iter().map(|f| f.children.len()).sum();

    let badges: String = aliases
        .iter()
        .map(|alias| c::tag_badge(alias, None, true, ctx))
        .collect();
    let mut body = format!("<h1>{badges}</h1>");
    body.push_str(&c::search_form("Search within this tag", ctx));
    body.push_str(&format!(
        r#"<p class="summary">{shown} changes in {} versions</p>"#,
        filtered.len()
    ));
    if filtered.is_empty() {
        body.push_str(&c::empty_state("No release notes match your search."));
    }
    for release in &filtered {
        body.push_str(&c::release_card(release, &hl, ctx));
    }

    Page {
        title: format!("Tag: {}", aliases.join(" / ")),
        body,
        ..Page::default()
    }
}

/// Static informational page.
pub fn info(slug: &str, ctx: &RenderContext<'_>) -> Option<Page> {
    let page = ctx.store.page(slug)?;
    let body = format!("<h1>{}</h1>{}", escape_html(&page.title), c::blocks(&page.blocks));
    Some(Page {
        title: page.title.clone(),
        body,
        ..Page::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SiteConfig,
        content::{
            ContentBlock, ContentStore, Plugin, PluginCategory, ReleaseItem, SetupSection,
            VersionDetailItem,
        },
        render::render_route,
        state::ViewState,
    };

    fn item(text: &str, tags: &[&str]) -> ReleaseItem {
        ReleaseItem {
            text: text.into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
        }
    }

    fn store() -> ContentStore {
        let mut store = ContentStore {
            releases: vec![
                ReleaseVersion {
                    version: "1.0.0".into(),
                    date: Some("2025-01-01".into()),
                    items: vec![item("Fixed bug in SDK", &["バグ修正"])],
                },
                ReleaseVersion {
                    version: "1.1.0".into(),
                    date: None,
                    items: vec![item("New MCP feature", &["新機能", "MCP"])],
                },
            ],
            plugins: vec![
                PluginCategory {
                    id: "git".into(),
                    name: "Git".into(),
                    description: String::new(),
                    plugins: vec![Plugin {
                        name: "commit-helper".into(),
                        description: "Writes commit messages".into(),
                        command: Some("/plugin install commit-helper".into()),
                        url: None,
                        tags: vec!["CLI".into()],
                    }],
                },
                PluginCategory {
                    id: "docs".into(),
                    name: "Docs".into(),
                    description: String::new(),
                    plugins: vec![Plugin {
                        name: "doc-writer".into(),
                        description: "Drafts docs".into(),
                        ..Plugin::default()
                    }],
                },
            ],
            setup: vec![
                SetupSection {
                    id: "install".into(),
                    title: "Install".into(),
                    description: None,
                    blocks: vec![ContentBlock::Text { text: "npm install".into() }],
                },
                SetupSection {
                    id: "auth".into(),
                    title: "Auth".into(),
                    description: None,
                    blocks: vec![ContentBlock::Text { text: "log in".into() }],
                },
            ],
            ..ContentStore::default()
        };
        store.details.insert(
            "1.1.0".into(),
            vec![
                VersionDetailItem {
                    text: "New MCP feature".into(),
                    tags: vec!["MCP".into()],
                    detail: "Servers can now be added at runtime.".into(),
                    category: "feature".into(),
                },
                VersionDetailItem {
                    text: "Faster startup".into(),
                    tags: vec!["パフォーマンス".into()],
                    detail: "Startup is 2x faster.".into(),
                    category: "perf".into(),
                },
            ],
        );
        store
    }

    fn render(route: Route, query: &str) -> String {
        let config = SiteConfig::default();
        let store = store();
        let state = ViewState::from_query_string(&route.identity(&config), query);
        let ctx = RenderContext::new(&store, &config, &state);
        render_route(&route, &ctx).expect("route should render")
    }

    #[test]
    fn test_home_lists_newest_first() {
        let html = render(Route::Home, "");
        let newer = html.find(r#"id="v1.1.0""#).unwrap();
        let older = html.find(r#"id="v1.0.0""#).unwrap();
        assert!(newer < older);
        assert!(html.contains("2 changes"));
    }

    #[test]
    fn test_home_query_filters_and_highlights() {
        let html = render(Route::Home, "q=mcp");
        assert!(html.contains("<mark>MCP</mark>"));
        assert!(!html.contains("Fixed bug in SDK"));
        // The emptied version is dropped entirely
        assert!(!html.contains(r#"id="v1.0.0""#));
        assert!(html.contains("1 of 2 changes match"));
    }

    #[test]
    fn test_home_no_match_shows_empty_state() {
        let html = render(Route::Home, "q=nothing-matches-this");
        assert!(html.contains(r#"<p class="empty">"#));
    }

    #[test]
    fn test_version_without_details_uses_fallback() {
        let html = render(Route::Version("1.0.0".into()), "");
        assert!(html.contains(r#"<section class="fallback">"#));
        assert!(html.contains("Fixed bug in SDK"));
        assert!(!html.contains("detail-card"));
        assert!(html.contains(r#"rel="next" href="/versions/1.1.0/""#));
    }

    #[test]
    fn test_version_with_details_uses_cards() {
        let html = render(Route::Version("1.1.0".into()), "open=card-1");
        assert!(!html.contains(r#"class="fallback""#));
        assert!(html.contains(r#"id="card-0"><summary>"#));
        assert!(html.contains(r#"id="card-1" open>"#));
        assert!(html.contains("Startup is 2x faster."));
        assert!(html.contains(r#"rel="prev" href="/versions/1.0.0/""#));
    }

    #[test]
    fn test_version_details_filtered_by_selector() {
        let html = render(Route::Version("1.1.0".into()), "tag=perf");
        assert!(html.contains("Faster startup"));
        assert!(!html.contains("Servers can now be added"));
    }

    #[test]
    fn test_plugins_category_selector() {
        let html = render(Route::Plugins, "tag=docs");
        assert!(html.contains("doc-writer"));
        assert!(!html.contains("commit-helper"));
        assert!(!html.contains(r#"<section class="category" id="git">"#));
    }

    #[test]
    fn test_plugins_text_search_matches_command() {
        let html = render(Route::Plugins, "q=install");
        assert!(html.contains("commit-helper"));
        assert!(!html.contains("doc-writer"));
    }

    #[test]
    fn test_setup_tabs() {
        let html = render(Route::Setup, "");
        assert!(html.contains("npm install"));
        assert!(!html.contains("log in"));

        let html = render(Route::Setup, "tab=auth");
        assert!(html.contains("log in"));
        assert!(!html.contains("npm install"));

        // Unknown tab keeps the first one
        let html = render(Route::Setup, "tab=missing");
        assert!(html.contains("npm install"));
    }

    #[test]
    fn test_tags_index_counts() {
        let html = render(Route::Tags, "");
        assert!(html.contains("3 tags, 3 uses"));
        assert!(html.contains(r#"<span class="count">1</span>"#));
    }

    #[test]
    fn test_tag_page_filters_releases() {
        let html = render(Route::Tag("バグ修正".into()), "");
        assert!(html.contains("Fixed bug in SDK"));
        assert!(!html.contains("New MCP feature"));
        assert!(html.contains("1 changes in 1 versions"));
    }

    #[test]
    fn test_tag_page_lists_tags_sharing_its_segment() {
        let config = SiteConfig::default();
        let mut store = store();
        store.releases[0].items.push(item("Pipeline cache", &["CI/CD"]));
        store.releases[1].items.push(item("Pipeline matrix", &["CICD"]));

        let route = Route::Tag("CICD".into());
        let state = ViewState::from_query_string(&route.identity(&config), "");
        let ctx = RenderContext::new(&store, &config, &state);
        let html = render_route(&route, &ctx).unwrap();

        assert!(html.contains("Pipeline cache"));
        assert!(html.contains("Pipeline matrix"));
        assert!(html.contains("2 changes in 2 versions"));
        assert!(!html.contains("Fixed bug in SDK"));
    }
}
