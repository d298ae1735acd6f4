//! Presentation components shared by the page renderers.
//!
//! Every function returns an HTML fragment. User text always goes through
//! [`escape_html`] or a [`Highlighter`].

use super::RenderContext;
use crate::{
    content::{ContentBlock, Plugin, ReleaseItem, ReleaseVersion, VersionDetailItem},
    filter::{Filtered, Selector, TagCount, highlight::Highlighter},
    routes::Route,
    state::{TabState, Toggle},
    style::tag_style,
    utils::{html::escape_html, slug::slugify_fragment},
};

// ============================================================================
// Tags
// ============================================================================

/// Colored tag badge, optionally a link.
pub fn tag_badge(tag: &str, href: Option<&str>, active: bool, ctx: &RenderContext<'_>) -> String {
    let style = tag_style(tag, ctx.config);
    let class = if active { "tag active" } else { "tag" };
    let label = escape_html(&style.label);
    match href {
        Some(href) => format!(
            r#"<a class="{class}" style="{}" href="{}">{label}</a>"#,
            style.css_var(),
            escape_html(href)
        ),
        None => format!(r#"<span class="{class}" style="{}">{label}</span>"#, style.css_var()),
    }
}

/// Badges for an item's tags, each linking to its tag page.
pub fn tag_list(tags: &[String], ctx: &RenderContext<'_>) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let items: String = tags
        .iter()
        .map(|tag| {
            let href = Route::Tag(tag.clone()).href(ctx.config);
            format!("<li>{}</li>", tag_badge(tag, Some(&href), false, ctx))
        })
        .collect();
    format!(r#"<ul class="tags">{items}</ul>"#)
}

/// Selector chips: "all" followed by `counts`, each switching the
/// page's selector while keeping the search text.
pub fn selector_chips(counts: &[TagCount<'_>], ctx: &RenderContext<'_>) -> String {
    let state = ctx.state;
    let base = ctx.current_href();

    let all_href = format!("{base}{}", state.href_with(|s| s.set_selector(Selector::All)));
    let mut html = String::from(r#"<ul class="tags selector">"#);
    html.push_str(&format!(
        r#"<li><a class="tag{}" href="{}">all</a></li>"#,
        if state.selector().is_all() { " active" } else { "" },
        escape_html(&all_href)
    ));

    for count in counts {
        let active = state.selector().as_tag() == Some(count.tag);
        let href = format!(
            "{base}{}",
            state.href_with(|s| s.set_selector(Selector::Tag(count.tag.to_owned())))
        );
        let badge = tag_badge(count.tag, Some(&href), active, ctx);
        // Put the count inside the badge element
        let badge = badge.replacen("</a>", &format!(r#"<span class="count">{}</span></a>"#, count.count), 1);
        html.push_str(&format!("<li>{badge}</li>"));
    }

    html.push_str("</ul>");
    html
}

// ============================================================================
// Search
// ============================================================================

/// GET search form pre-filled from the view state.
///
/// The current selector rides along in a hidden field.
pub fn search_form(placeholder: &str, ctx: &RenderContext<'_>) -> String {
    let state = ctx.state;
    let hidden = state
        .selector()
        .as_tag()
        .map(|tag| format!(r#"<input type="hidden" name="tag" value="{}">"#, escape_html(tag)))
        .unwrap_or_default();

    format!(
        r#"<form class="search" method="get" action="{}" role="search"><input type="search" name="q" value="{}" placeholder="{}" aria-label="{}">{hidden}<button type="submit">Search</button></form>"#,
        escape_html(&ctx.current_href()),
        escape_html(state.text()),
        escape_html(placeholder),
        escape_html(placeholder),
    )
}

/// "N of M" line shown above filtered results.
pub fn result_summary(shown: usize, total: usize, noun: &str, ctx: &RenderContext<'_>) -> String {
    if ctx.state.query().is_empty() {
        return format!(r#"<p class="summary">{total} {noun}</p>"#);
    }
    format!(r#"<p class="summary">{shown} of {total} {noun} match</p>"#)
}

pub fn empty_state(message: &str) -> String {
    format!(r#"<p class="empty">{}</p>"#, escape_html(message))
}

// ============================================================================
// Release cards
// ============================================================================

/// One item line: highlighted text followed by its tags.
pub fn release_item(item: &ReleaseItem, hl: &Highlighter, ctx: &RenderContext<'_>) -> String {
    format!("<li>{}{}</li>", hl.apply(&item.text), tag_list(&item.tags, ctx))
}

/// Version card for list views, showing only the items that passed the filter.
pub fn release_card(
    filtered: &Filtered<'_, ReleaseVersion>,
    hl: &Highlighter,
    ctx: &RenderContext<'_>,
) -> String {
    let release = filtered.parent;
    let href = Route::Version(release.version.clone()).href(ctx.config);
    let date = release
        .date
        .as_deref()
        .map(|d| format!(r#"<span class="date">{}</span>"#, escape_html(d)))
        .unwrap_or_default();

    let items: String = filtered
        .children
        .iter()
        .map(|item| release_item(item, hl, ctx))
        .collect();

    format!(
        r#"<article class="card release" id="v{id}"><h2><a href="{href}">{version}</a>{date}</h2><ul class="items">{items}</ul></article>"#,
        id = escape_html(&release.version),
        version = escape_html(&release.version),
    )
}

/// Expandable card for an enriched detail record.
///
/// `toggle` decides the initial `open` attribute; `<details>` handles
/// further toggling in the browser.
pub fn detail_card(
    id: &str,
    item: &VersionDetailItem,
    toggle: Toggle,
    hl: &Highlighter,
    ctx: &RenderContext<'_>,
) -> String {
    let open = if toggle.is_open() { " open" } else { "" };
    let category = if item.category.is_empty() {
        String::new()
    } else {
        format!(r#"<span class="category">{}</span>"#, escape_html(&item.category))
    };
    let detail: String = item
        .detail
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", hl.apply(p)))
        .collect();

    format!(
        r#"<details class="card detail-card" id="{id}"{open}><summary>{category}<h3>{}</h3>{}</summary><div class="detail">{detail}</div></details>"#,
        hl.apply(&item.text),
        tag_list(&item.tags, ctx),
        id = escape_html(id),
    )
}

// ============================================================================
// Plugins
// ============================================================================

pub fn plugin_card(plugin: &Plugin, hl: &Highlighter, ctx: &RenderContext<'_>) -> String {
    let name = match &plugin.url {
        Some(url) => format!(r#"<a href="{}">{}</a>"#, escape_html(url), hl.apply(&plugin.name)),
        None => hl.apply(&plugin.name),
    };
    let command = plugin
        .command
        .as_deref()
        .map(|c| format!("<pre><code>{}</code></pre>", hl.apply(c)))
        .unwrap_or_default();

    format!(
        r#"<article class="card plugin"><h3>{name}</h3><p>{}</p>{command}{}</article>"#,
        hl.apply(&plugin.description),
        tag_list(&plugin.tags, ctx),
    )
}

// ============================================================================
// Tabs
// ============================================================================

/// Tab bar; each tab links to the current page with `?tab=<id>`.
///
/// `titles` yields `(id, label)` in tab order.
pub fn tab_bar<'t>(
    tabs: &TabState,
    titles: impl IntoIterator<Item = (&'t str, &'t str)>,
    ctx: &RenderContext<'_>,
) -> String {
    let base = ctx.current_href();
    let links: String = titles
        .into_iter()
        .map(|(id, label)| {
            let href = format!("{base}{}", ctx.state.href_with(|s| s.select_tab(id)));
            let (class, selected) = if tabs.is_active(id) {
                (r#" class="active""#, "true")
            } else {
                ("", "false")
            };
            format!(
                r#"<a role="tab" aria-selected="{selected}" href="{}"{class}>{}</a>"#,
                escape_html(&href),
                escape_html(label)
            )
        })
        .collect();
    format!(r#"<nav class="tab-bar" role="tablist">{links}</nav>"#)
}

// ============================================================================
// Content blocks
// ============================================================================

pub fn blocks(blocks: &[ContentBlock]) -> String {
    blocks.iter().map(block).collect()
}

fn block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Text { text } => format!("<p>{}</p>", escape_html(text)),
        ContentBlock::Code { language, code } => {
            let class = language
                .as_deref()
                .map(|l| format!(r#" class="language-{}""#, escape_html(l)))
                .unwrap_or_default();
            format!("<pre><code{class}>{}</code></pre>", escape_html(code))
        }
        ContentBlock::Callout { variant, text } => format!(
            r#"<div class="callout callout-{}">{}</div>"#,
            variant.class(),
            escape_html(text)
        ),
        ContentBlock::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            let items: String = items
                .iter()
                .map(|i| format!("<li>{}</li>", escape_html(i)))
                .collect();
            format!("<{tag}>{items}</{tag}>")
        }
    }
}

/// Heading with an anchor id derived from its text.
pub fn anchored_heading(level: u8, text: &str, ctx: &RenderContext<'_>) -> String {
    let id = slugify_fragment(text, ctx.config);
    format!(
        r##"<h{level} id="{id}"><a href="#{id}">{}</a></h{level}>"##,
        escape_html(text),
        id = escape_html(&id)
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SiteConfig,
        content::{CalloutVariant, ContentStore},
        state::ViewState,
    };

    fn with_ctx<R>(state: &ViewState, f: impl FnOnce(&RenderContext<'_>) -> R) -> R {
        let config = SiteConfig::default();
        let store = ContentStore::default();
        f(&RenderContext::new(&store, &config, state))
    }

    #[test]
    fn test_tag_badge_escapes_and_styles() {
        let state = ViewState::new("/");
        with_ctx(&state, |ctx| {
            let html = tag_badge("<b>", None, false, ctx);
            assert!(html.contains("&lt;b&gt;"));
            assert!(html.contains("--tag-color:"));
            assert!(html.starts_with("<span"));

            let html = tag_badge("SDK", Some("/tags/SDK/"), true, ctx);
            assert!(html.contains(r#"class="tag active""#));
            assert!(html.contains(r#"href="/tags/SDK/""#));
        });
    }

    #[test]
    fn test_selector_chips_keep_text() {
        let state = ViewState::from_query_string("/", "q=mcp&tag=SDK");
        with_ctx(&state, |ctx| {
            let counts = [TagCount { tag: "SDK", count: 2 }, TagCount { tag: "IDE", count: 1 }];
            let html = selector_chips(&counts, ctx);
            assert!(html.contains(r#"href="/?q=mcp">all</a>"#));
            assert!(html.contains(r#"href="/?q=mcp&amp;tag=IDE""#));
            assert!(html.contains(r#"<span class="count">2</span></a>"#));
            assert!(html.contains(r#"class="tag active""#));
        });
    }

    #[test]
    fn test_search_form_prefilled() {
        let state = ViewState::from_query_string("/plugins/", "q=%22git%22&tag=vcs");
        with_ctx(&state, |ctx| {
            let html = search_form("Search plugins", ctx);
            assert!(html.contains(r#"value="&quot;git&quot;""#));
            assert!(html.contains(r#"<input type="hidden" name="tag" value="vcs">"#));
            assert!(html.contains(r#"action="/plugins/""#));
        });
    }

    #[test]
    fn test_detail_card_open_state() {
        let state = ViewState::new("/versions/1.0.0/");
        let item = VersionDetailItem {
            text: "Hooks".into(),
            tags: vec![],
            detail: "First para.\n\nSecond para.".into(),
            category: "feature".into(),
        };
        with_ctx(&state, |ctx| {
            let hl = Highlighter::new("");
            let closed = detail_card("card-0", &item, Toggle::default(), &hl, ctx);
            assert!(closed.contains(r#"id="card-0">"#));
            assert!(!closed.contains(" open>"));

            let open = detail_card("card-0", &item, Toggle::new(true), &hl, ctx);
            assert!(open.contains(r#"id="card-0" open>"#));
            assert!(open.contains("<p>First para.</p><p>Second para.</p>"));
        });
    }

    #[test]
    fn test_tab_bar_active() {
        let state = ViewState::from_query_string("/setup/", "tab=auth");
        with_ctx(&state, |ctx| {
            let tabs = state.tab_state(["install", "auth"]);
            let html = tab_bar(&tabs, [("install", "Install"), ("auth", "Auth")], ctx);
            assert!(html.contains(r#"href="/setup/?tab=auth" class="active">Auth</a>"#));
            assert!(html.contains(r#"aria-selected="false" href="/setup/?tab=install">"#));
        });
    }

    #[test]
    fn test_blocks() {
        let html = blocks(&[
            ContentBlock::Text { text: "a < b".into() },
            ContentBlock::Code {
                language: Some("bash".into()),
                code: "npm i".into(),
            },
            ContentBlock::Callout {
                variant: CalloutVariant::Other,
                text: "note".into(),
            },
            ContentBlock::List {
                ordered: true,
                items: vec!["one".into()],
            },
        ]);
        assert_eq!(
            html,
            concat!(
                "<p>a &lt; b</p>",
                r#"<pre><code class="language-bash">npm i</code></pre>"#,
                r#"<div class="callout callout-info">note</div>"#,
                "<ol><li>one</li></ol>"
            )
        );
    }

    #[test]
    fn test_anchored_heading() {
        let state = ViewState::new("/");
        with_ctx(&state, |ctx| {
            assert_eq!(
                anchored_heading(2, "Install the CLI", ctx),
                r##"<h2 id="install-the-cli"><a href="#install-the-cli">Install the CLI</a></h2>"##
            );
        });
    }
}
