//! Sitemap generation.
//!
//! Lists every rendered route for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/versions/1.0.0/</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </url>
//! </urlset>
//! ```

use crate::{
    config::SiteConfig,
    content::ContentStore,
    log,
    routes::Route,
    utils::{
        html::escape_xml,
        minify::{MinifyType, minify},
    },
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;

/// XML namespace for sitemap
const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Build sitemap if enabled in config.
///
/// Needs `[base].url` for absolute locations; without it the sitemap is
/// skipped with a warning.
pub fn build_sitemap(config: &SiteConfig, store: &ContentStore, routes: &[Route]) -> Result<()> {
    if !config.build.sitemap.enable {
        return Ok(());
    }
    if config.base.url.is_none() {
        log!("warn"; "sitemap enabled but [base].url is not set, skipped");
        return Ok(());
    }
    Sitemap::from_routes(config, store, routes).write(config)
}

/// Sitemap data structure
struct Sitemap {
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    /// Full URL location
    loc: String,
    /// Last modification date (YYYY-MM-DD)
    lastmod: Option<String>,
}

impl Sitemap {
    fn from_routes(config: &SiteConfig, store: &ContentStore, routes: &[Route]) -> Self {
        let newest = store
            .releases
            .iter()
            .filter_map(|r| release_date(r.date.as_deref()))
            .max();

        let urls = routes
            .iter()
            .filter_map(|route| {
                let loc = config.absolute_url(&route.href(config))?;
                let lastmod = match route {
                    Route::Version(v) => {
                        release_date(store.release(v).and_then(|r| r.date.as_deref()))
                    }
                    Route::Home | Route::Tags | Route::Tag(_) => newest,
                    _ => None,
                };
                Some(UrlEntry {
                    loc,
                    lastmod: lastmod.map(|d| d.format("%Y-%m-%d").to_string()),
                })
            })
            .collect();

        Self { urls }
    }

    /// Generate sitemap XML string.
    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
        xml.push('\n');

        for entry in self.urls {
            xml.push_str("  <url>\n");
            xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.loc)));
            if let Some(lastmod) = entry.lastmod {
                xml.push_str(&format!("    <lastmod>{lastmod}</lastmod>\n"));
            }
            xml.push_str("  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }

    /// Write sitemap to output file.
    fn write(self, config: &SiteConfig) -> Result<()> {
        let sitemap_path = &config.build.sitemap.path;
        let count = self.urls.len();
        let xml = self.into_xml();
        let xml = minify(MinifyType::Xml(xml.as_bytes()), config);

        if let Some(parent) = sitemap_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(sitemap_path, &*xml)
            .with_context(|| format!("Failed to write sitemap to {}", sitemap_path.display()))?;

        log!("sitemap"; "{} urls", count);
        Ok(())
    }
}

/// Parse a release date, ignoring anything that isn't `YYYY-MM-DD`.
fn release_date(date: Option<&str>) -> Option<NaiveDate> {
    date.and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
}
