//! Page chrome: document template, navigation, stylesheet naming.

use super::{Page, RenderContext};
use crate::{routes::Route, utils::html::escape_html};
use std::sync::LazyLock;

/// Document template (embedded at compile time)
const LAYOUT_TEMPLATE: &str = include_str!("../embed/layout.html");

/// Site stylesheet (embedded at compile time)
pub const STYLE_CSS: &str = include_str!("../embed/style.css");

/// `style.<hash>.css`, content-addressed so browsers never serve a stale copy.
static STYLESHEET_NAME: LazyLock<String> = LazyLock::new(|| {
    let hash = blake3::hash(STYLE_CSS.as_bytes());
    format!("style.{}.css", hex::encode(&hash.as_bytes()[..4]))
});

pub fn stylesheet_name() -> &'static str {
    &STYLESHEET_NAME
}

/// Site-relative path of the stylesheet, under the path prefix.
pub fn stylesheet_href(ctx: &RenderContext<'_>) -> String {
    format!("{}/assets/{}", ctx.config.url_prefix(), stylesheet_name())
}

/// Wrap a rendered page body into a full HTML document.
pub fn document(page: &Page, ctx: &RenderContext<'_>) -> String {
    let config = ctx.config;
    let site_title = &config.base.title;
    let title = if page.title.is_empty() || page.title == *site_title {
        site_title.clone()
    } else {
        format!("{} | {}", page.title, site_title)
    };
    let description = page.description.as_deref().unwrap_or(&config.base.description);

    let nav = nav(ctx, page.route.as_ref());
    let footer = footer(ctx);
    fill(
        LAYOUT_TEMPLATE,
        &[
            ("lang", escape_html(&config.base.language).as_str()),
            ("version", env!("CARGO_PKG_VERSION")),
            ("description", escape_html(description).as_str()),
            ("title", escape_html(&title).as_str()),
            ("stylesheet", stylesheet_href(ctx).as_str()),
            ("home", Route::Home.href(config).as_str()),
            ("site_title", escape_html(site_title).as_str()),
            ("nav", nav.as_str()),
            ("footer", footer.as_str()),
            ("content", page.body.as_str()),
        ],
    )
}

/// Substitute `{name}` placeholders in one pass over `template`.
///
/// Inserted values are never scanned again. Unknown `{...}` runs are kept.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() * 2);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Top navigation; the section owning `current` gets `class="active"`.
fn nav(ctx: &RenderContext<'_>, current: Option<&Route>) -> String {
    let section = current.map(|route| match route {
        Route::Version(_) | Route::ReleaseNotes => Route::Home,
        Route::Topic(_) => Route::HandsOn,
        Route::Tag(_) => Route::Tags,
        other => other.clone(),
    });

    let mut links: Vec<(Route, String)> = vec![
        (Route::Home, "Release Notes".to_owned()),
        (Route::Plugins, "Plugins".to_owned()),
        (Route::Setup, "Setup".to_owned()),
        (Route::HandsOn, "Hands-on".to_owned()),
        (Route::Tags, "Tags".to_owned()),
    ];
    links.extend(
        ctx.store
            .pages
            .iter()
            .filter(|p| !crate::routes::RESERVED.contains(&p.slug.as_str()))
            .map(|p| (Route::Page(p.slug.clone()), p.title.clone())),
    );

    links
        .iter()
        .map(|(route, label)| {
            let class = if section.as_ref() == Some(route) {
                r#" class="active""#
            } else {
                ""
            };
            format!(
                r#"<a href="{}"{class}>{}</a>"#,
                route.href(ctx.config),
                escape_html(label)
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

fn footer(ctx: &RenderContext<'_>) -> String {
    let base = &ctx.config.base;
    if base.copyright.is_empty() {
        format!("{} · {}", escape_html(&base.title), escape_html(&base.author))
    } else {
        escape_html(&base.copyright)
    }
}
