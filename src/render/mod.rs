//! HTML rendering of routes.
//!
//! ```text
//! Route + ViewState ──► pages::<view>() ──► Page ──► layout::document() ──► HTML
//! ```
//!
//! Rendering is pure: the same store, config and view state always give
//! the same document. `build` renders with the default view state, `serve`
//! with the state decoded from the request's query string.

pub mod components;
pub mod layout;
pub mod pages;

pub use layout::{STYLE_CSS, stylesheet_name};

use crate::{
    config::SiteConfig,
    content::ContentStore,
    routes::Route,
    state::ViewState,
    utils::html::escape_html,
};

/// Inputs shared by every renderer.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub store: &'a ContentStore,
    pub config: &'a SiteConfig,
    pub state: &'a ViewState,
}

impl<'a> RenderContext<'a> {
    pub const fn new(store: &'a ContentStore, config: &'a SiteConfig, state: &'a ViewState) -> Self {
        Self {
            store,
            config,
            state,
        }
    }

    /// Link to the page being rendered, without query string.
    pub fn current_href(&self) -> String {
        let mut href = self.config.url_prefix();
        href.push('/');
        for segment in self.state.route().split('/').filter(|s| !s.is_empty()) {
            href.push_str(&urlencoding::encode(segment));
            href.push('/');
        }
        href
    }
}

/// Rendered page body plus metadata for the layout.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub title: String,
    pub description: Option<String>,
    pub body: String,
    /// Route the page was rendered for; `None` for error pages
    pub route: Option<Route>,
}

/// Render `route` into a full document.
///
/// Returns `None` when an identifier in the route no longer exists, so the
/// caller can answer with the not-found page.
pub fn render_route(route: &Route, ctx: &RenderContext<'_>) -> Option<String> {
    let page = match route {
        Route::Home | Route::ReleaseNotes => pages::home(ctx),
        Route::Version(version) => pages::version(version, ctx)?,
        Route::Plugins => pages::plugins(ctx),
        Route::Setup => pages::setup(ctx),
        Route::HandsOn => pages::hands_on(ctx),
        Route::Topic(id) => pages::topic(id, ctx)?,
        Route::Tags => pages::tags(ctx),
        Route::Tag(tag) => pages::tag(tag, ctx),
        Route::Page(slug) => pages::info(slug, ctx)?,
    };
    Some(layout::document(&Page { route: Some(route.clone()), ..page }, ctx))
}

/// The generic "not found" document.
pub fn render_not_found(ctx: &RenderContext<'_>) -> String {
    let body = format!(
        r#"<section class="empty"><h1>Page not found</h1><p>The page you asked for does not exist.</p><p><a href="{}">Back to release notes</a></p></section>"#,
        Route::Home.href(ctx.config)
    );
    layout::document(
        &Page {
            title: "Not found".into(),
            body,
            ..Page::default()
        },
        ctx,
    )
}

/// Static stand-in for a server redirect.
pub fn render_redirect(href: &str) -> String {
    let href = escape_html(href);
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><meta http-equiv="refresh" content="0; url={href}"><link rel="canonical" href="{href}"><title>Redirecting</title></head><body><a href="{href}">Redirecting</a></body></html>"#
    )
}

/// The catch-all error document.
///
/// `details` (the error chain) is only shown when the caller passes it,
/// which the dev server does when `[serve].debug` is on.
pub fn render_error(details: Option<&str>, ctx: &RenderContext<'_>) -> String {
    let details = details
        .map(|d| format!(r#"<pre class="error-chain">{}</pre>"#, escape_html(d)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="empty"><h1>Something went wrong</h1><p>This page could not be rendered.</p>{details}</section>"#
    );
    layout::document(
        &Page {
            title: "Error".into(),
            body,
            ..Page::default()
        },
        ctx,
    )
}
