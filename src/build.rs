//! Site building orchestration.
//!
//! Renders every route to static HTML and copies assets.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── prepare_output()      clean or create the output directory
//!     │
//!     ├── rayon::join
//!     │       ├── write_page() per route (parallel) ──► <route>/index.html
//!     │       └── copy_asset() per file  (parallel) ──► assets/...
//!     │
//!     ├── write_stylesheet()    assets/style.<hash>.css
//!     ├── 404.html + release-notes redirect
//!     ├── build_sitemap()
//!     └── build_search_index()
//! ```

use crate::{
    assets::{collect_all_files, copy_asset, write_stylesheet},
    config::SiteConfig,
    content::ContentStore,
    generator::{build_search_index, build_sitemap},
    log,
    logger::ProgressBars,
    render::{RenderContext, render_not_found, render_redirect, render_route},
    routes::Route,
    state::ViewState,
    utils::minify::{MinifyType, minify},
};
use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

const PAGES_BAR: usize = 0;
const ASSETS_BAR: usize = 1;

/// Build the entire site, rendering pages and copying assets in parallel.
///
/// Pages are rendered with the default view state: no query, no open cards,
/// first tab active. If `config.build.clean` is true, clears the entire
/// output directory first.
pub fn build_site(config: &SiteConfig, store: &ContentStore) -> Result<()> {
    let output = &config.build.output;
    prepare_output(output, config.build.clean)?;

    let routes = Route::all(store, config);
    let asset_files = collect_all_files(&config.build.assets);

    log!("build"; "rendering {} pages...", routes.len());
    let progress = ProgressBars::new(&[("pages", routes.len()), ("assets", asset_files.len())]);

    let has_error = AtomicBool::new(false);
    let clean = config.build.clean;

    let (pages_result, assets_result) = rayon::join(
        || {
            routes.par_iter().try_for_each(|route| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = write_page(route, config, store) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", route.identity(config), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                progress.inc(PAGES_BAR);
                Ok(())
            })
        },
        || {
            asset_files.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                if let Err(e) = copy_asset(path, config, clean) {
                    if !has_error.swap(true, Ordering::Relaxed) {
                        log!("error"; "{}: {:#}", path.display(), e);
                    }
                    return Err(anyhow!("Build failed"));
                }
                progress.inc(ASSETS_BAR);
                Ok(())
            })
        },
    );

    progress.finish();
    pages_result?;
    assets_result?;

    write_stylesheet(config)?;
    write_not_found(config, store)?;
    write_redirect(config)?;

    build_sitemap(config, store, &routes)?;
    build_search_index(config, store)?;

    log_build_result(routes.len(), asset_files.len());
    Ok(())
}

/// Remove the output directory when `clean`, then make sure it exists.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Render one route with a fresh view state and write it.
fn write_page(route: &Route, config: &SiteConfig, store: &ContentStore) -> Result<()> {
    let state = ViewState::new(&route.identity(config));
    let ctx = RenderContext::new(store, config, &state);
    let html = render_route(route, &ctx)
        .ok_or_else(|| anyhow!("route refers to missing content"))?;
    write_html(&route.output_file(config), &html, config)
}

/// `404.html` at the prefix root, picked up by most static hosts.
fn write_not_found(config: &SiteConfig, store: &ContentStore) -> Result<()> {
    let state = ViewState::new("/");
    let ctx = RenderContext::new(store, config, &state);
    let path = prefix_dir(config).join("404.html");
    write_html(&path, &render_not_found(&ctx), config)
}

/// `/release-notes/` has no view of its own; point it at the home page.
fn write_redirect(config: &SiteConfig) -> Result<()> {
    let html = render_redirect(&Route::Home.href(config));
    write_html(&Route::ReleaseNotes.output_file(config), &html, config)
}

fn write_html(path: &Path, html: &str, config: &SiteConfig) -> Result<()> {
    let html = minify(MinifyType::Html(html.as_bytes()), config);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &*html).with_context(|| format!("Failed to write {}", path.display()))
}

fn prefix_dir(config: &SiteConfig) -> PathBuf {
    config.build.output.join(&config.build.path_prefix)
}

fn log_build_result(pages: usize, assets: usize) {
    if pages == 0 {
        log!("warn"; "no pages rendered, check the content directory");
    } else {
        log!("build"; "done: {pages} pages, {assets} assets");
    }
}
