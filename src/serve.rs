//! Development server with live reload support.
//!
//! Pages are rendered on request from the current content snapshot, so the
//! query string (`q`, `tag`, `tab`, `open`) drives the view state and a
//! content change is visible on the next request without a rebuild.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    respond(url) ◄─────── swap cfg() / store()
//!          │
//!          ├── /assets/style.<hash>.css  bundled stylesheet
//!          ├── /assets/...               files from [build].assets
//!          ├── /search-index.json        generated on the fly
//!          └── resolve() ──► View 200 | Redirect 302 | NotFound 404
//! ```
//!
//! Rendering runs inside an error boundary: a failure or panic answers
//! `500` with a generic page, plus the error chain when `[serve].debug`.

use crate::{
    config::{SiteConfig, cfg},
    content::{ContentStore, store},
    generator::search::SearchIndex,
    log,
    logger::log_error_chain,
    render::{
        RenderContext, STYLE_CSS, render_error, render_not_found, render_route, stylesheet_name,
    },
    routes::{Resolution, resolve, strip_prefix},
    state::ViewState,
    watch::watch_for_changes_blocking,
};
use anyhow::{Context, Result, anyhow};
use std::{
    any::Any,
    fs,
    net::SocketAddr,
    panic::{AssertUnwindSafe, catch_unwind},
    path::Path,
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const HTML: &str = "text/html; charset=utf-8";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server with optional file watching.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Spawns file watcher thread (if enabled)
/// 4. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_site() -> Result<()> {
    let c = cfg();
    let interface: std::net::IpAddr = c
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", c.serve.interface))?;

    let (server, addr) = try_bind_port(interface, c.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}{}/", addr, c.url_prefix());

    if c.serve.watch {
        std::thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking() {
                log_error_chain("watch", &err);
            }
        });
    }

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        // Re-load config and content on each request to pick up reloads
        if let Err(e) = handle_request(request, &cfg(), &store()) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Response produced for one request, independent of the HTTP library.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// `Location` header for redirects
    pub location: Option<String>,
}

impl Reply {
    fn html(status: u16, html: String) -> Self {
        Self {
            status,
            content_type: HTML,
            body: html.into_bytes(),
            location: None,
        }
    }

    fn data(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
            location: None,
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            status: 302,
            content_type: HTML,
            body: Vec::new(),
            location: Some(location),
        }
    }
}

fn handle_request(request: Request, config: &SiteConfig, store: &ContentStore) -> Result<()> {
    let reply = respond(request.url(), config, store);

    let mut response = Response::from_data(reply.body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header("Content-Type", reply.content_type)?);
    if let Some(location) = &reply.location {
        response = response.with_header(header("Location", location)?);
    }

    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value).map_err(|()| anyhow!("Invalid header {name}: {value}"))
}

/// Answer a request URL (path plus optional query string).
pub fn respond(url: &str, config: &SiteConfig, store: &ContentStore) -> Reply {
    boundary(config, store, || route_request(url, config, store))
}

/// Run `f`, turning errors and panics into the `500` page.
fn boundary(
    config: &SiteConfig,
    store: &ContentStore,
    f: impl FnOnce() -> Result<Reply>,
) -> Reply {
    let error = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(reply)) => return reply,
        Ok(Err(err)) => err,
        Err(payload) => anyhow!("render panicked: {}", panic_message(&*payload)),
    };

    log_error_chain("serve", &error);
    let details = config.serve.debug.then(|| format!("{error:?}"));
    let state = ViewState::new("/");
    let ctx = RenderContext::new(store, config, &state);
    Reply::html(500, render_error(details.as_deref(), &ctx))
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Request resolution order:
/// 1. Bundled stylesheet
/// 2. User asset under `/assets/`
/// 3. Search index
/// 4. Route table → view, redirect or not found
fn route_request(url: &str, config: &SiteConfig, store: &ContentStore) -> Result<Reply> {
    let (raw_path, query) = url.split_once('?').unwrap_or((url, ""));

    // Undecodable paths can't name anything we serve
    let Ok(path) = urlencoding::decode(raw_path) else {
        return Ok(not_found(raw_path, config, store));
    };
    let Some(path) = strip_prefix(&path, config) else {
        return Ok(not_found(&path, config, store));
    };

    if let Some(asset) = path.strip_prefix("/assets/") {
        if asset == stylesheet_name() {
            return Ok(Reply::data("text/css; charset=utf-8", STYLE_CSS.as_bytes().to_vec()));
        }
        let reply = serve_asset(asset, config)?;
        return Ok(reply.unwrap_or_else(|| not_found(path, config, store)));
    }

    if is_search_index(path, config) {
        let index = SearchIndex::from_store(store, config);
        let json = serde_json::to_vec(&index).context("Failed to serialize search index")?;
        return Ok(Reply::data("application/json; charset=utf-8", json));
    }

    let reply = match resolve(path, store, config) {
        Resolution::View(route) => {
            let state = ViewState::from_query_string(&route.identity(config), query);
            let ctx = RenderContext::new(store, config, &state);
            match render_route(&route, &ctx) {
                Some(html) => Reply::html(200, html),
                None => not_found(path, config, store),
            }
        }
        Resolution::Redirect(target) => {
            // State is bound to the old route; the redirect resets it
            let mut state = ViewState::from_query_string(path, query);
            state.sync_route(&target.identity(config));
            Reply::redirect(format!("{}{}", target.href(config), state.href_with(|_| {})))
        }
        Resolution::NotFound => not_found(path, config, store),
    };
    Ok(reply)
}

fn not_found(path: &str, config: &SiteConfig, store: &ContentStore) -> Reply {
    let state = ViewState::new(path);
    let ctx = RenderContext::new(store, config, &state);
    Reply::html(404, render_not_found(&ctx))
}

/// Serve a file from `[build].assets`. `Ok(None)` when there is no such file.
fn serve_asset(relative: &str, config: &SiteConfig) -> Result<Option<Reply>> {
    if relative.split('/').any(|segment| segment == ".." || segment.starts_with('.')) {
        return Ok(None);
    }

    let path = config.build.assets.join(relative);
    if !path.is_file() {
        return Ok(None);
    }

    let content = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Some(Reply::data(guess_content_type(&path), content)))
}

fn is_search_index(path: &str, config: &SiteConfig) -> bool {
    config.build.search.enable
        && config
            .build
            .search
            .path
            .file_name()
            .is_some_and(|name| name.to_str() == Some(path.trim_matches('/')))
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => HTML,
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ReleaseItem, ReleaseVersion};
    use tempfile::TempDir;

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
                        tags: vec!["新機能".into(), "MCP".into()],
                    }],
                },
            ],
            ..ContentStore::default()
        }
    }

    fn body(reply: &Reply) -> String {
        String::from_utf8_lossy(&reply.body).into_owned()
    }

    #[test]
    fn test_home_renders_with_query() {
        let config = SiteConfig::default();
        let reply = respond("/?q=mcp", &config, &store());

        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, HTML);
        let html = body(&reply);
        assert!(html.contains(r#"value="mcp""#));
        assert!(html.contains("<mark>MCP</mark>"));
        assert!(!html.contains("Fixed bug in SDK"));
    }

    #[test]
    fn test_release_notes_redirect_drops_query() {
        let config = SiteConfig::default();
        let reply = respond("/release-notes?q=sdk", &config, &store());
        assert_eq!(reply.status, 302);
        assert_eq!(reply.location.as_deref(), Some("/"));
    }

    #[test]
    fn test_not_found() {
        let config = SiteConfig::default();
        for url in ["/versions/9.9.9/", "/hands-on/missing/", "/a/b/c/", "/tags/nope/"] {
            let reply = respond(url, &config, &store());
            assert_eq!(reply.status, 404, "{url}");
            assert!(body(&reply).contains("Page not found"));
        }
    }

    #[test]
    fn test_encoded_tag_path() {
        let config = SiteConfig::default();
        let reply = respond("/tags/%E6%96%B0%E6%A9%9F%E8%83%BD/", &config, &store());
        assert_eq!(reply.status, 200);
        assert!(body(&reply).contains("New MCP feature"));
        assert!(!body(&reply).contains("Fixed bug in SDK"));
    }

    #[test]
    fn test_prefix() {
        let mut config = SiteConfig::default();
        config.build.path_prefix = "notes".into();

        assert_eq!(respond("/notes/", &config, &store()).status, 200);
        assert_eq!(respond("/notes/versions/1.0.0/", &config, &store()).status, 200);
        assert_eq!(respond("/versions/1.0.0/", &config, &store()).status, 404);

        let redirect = respond("/notes/release-notes", &config, &store());
        assert_eq!(redirect.location.as_deref(), Some("/notes/"));
    }

    #[test]
    fn test_stylesheet_and_assets() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.assets = dir.path().join("assets");
        fs::create_dir_all(&config.build.assets).unwrap();
        fs::write(config.build.assets.join("logo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join("secret.txt"), "secret").unwrap();

        let css = respond(&format!("/assets/{}", stylesheet_name()), &config, &store());
        assert_eq!(css.status, 200);
        assert_eq!(css.body, STYLE_CSS.as_bytes());

        let logo = respond("/assets/logo.svg", &config, &store());
        assert_eq!(logo.status, 200);
        assert_eq!(logo.content_type, "image/svg+xml");

        assert_eq!(respond("/assets/../secret.txt", &config, &store()).status, 404);
        assert_eq!(respond("/assets/%2E%2E/secret.txt", &config, &store()).status, 404);
        assert_eq!(respond("/assets/missing.png", &config, &store()).status, 404);
    }

    #[test]
    fn test_search_index() {
        let config = SiteConfig::default();
        let reply = respond("/search-index.json", &config, &store());
        assert_eq!(reply.status, 200);

        let json: serde_json::Value = serde_json::from_slice(&reply.body).unwrap();
        assert_eq!(json["items"][0]["version"], "1.1.0");
    }

    #[test]
    fn test_boundary_hides_details_unless_debug() {
        let mut config = SiteConfig::default();
        let store = store();

        let reply = boundary(&config, &store, || Err(anyhow!("disk on fire")));
        assert_eq!(reply.status, 500);
        assert!(!body(&reply).contains("disk on fire"));

        config.serve.debug = true;
        let reply = boundary(&config, &store, || {
            Err(anyhow!("disk on fire").context("render failed"))
        });
        let html = body(&reply);
        assert!(html.contains("render failed"));
        assert!(html.contains("disk on fire"));
    }

    #[test]
    fn test_boundary_catches_panic() {
        let mut config = SiteConfig::default();
        config.serve.debug = true;
        let reply = boundary(&config, &store(), || panic!("bad template"));
        assert_eq!(reply.status, 500);
        assert!(body(&reply).contains("bad template"));
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
    }
}
