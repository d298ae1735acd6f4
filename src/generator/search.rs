//! JSON search index of release items.
//!
//! Flattened so a client script can filter without walking versions:
//!
//! ```json
//! {
//!   "generated": "2025-10-02T09:00:00+00:00",
//!   "items": [{ "version": "1.0.0", "url": "/versions/1.0.0/", "text": "...", "tags": ["SDK"] }],
//!   "tags": [{ "tag": "SDK", "count": 1 }]
//! }
//! ```

use crate::{
    config::SiteConfig,
    content::ContentStore,
    filter::{TagCount, tag_counts},
    log,
    routes::Route,
};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;

#[derive(Debug, Serialize)]
pub struct SearchIndex<'a> {
    pub generated: String,
    pub items: Vec<SearchEntry<'a>>,
    pub tags: Vec<TagCount<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SearchEntry<'a> {
    pub version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<&'a str>,
    pub url: String,
    pub text: &'a str,
    pub tags: &'a [String],
}

impl<'a> SearchIndex<'a> {
    /// Index every release item, newest version first.
    pub fn from_store(store: &'a ContentStore, config: &SiteConfig) -> Self {
        let items = store
            .releases_newest_first()
            .flat_map(|release| {
                let url = Route::Version(release.version.clone()).href(config);
                release.items.iter().map(move |item| SearchEntry {
                    version: &release.version,
                    date: release.date.as_deref(),
                    url: url.clone(),
                    text: &item.text,
                    tags: &item.tags,
                })
            })
            .collect();

        Self {
            generated: Utc::now().to_rfc3339(),
            items,
            tags: tag_counts(store.all_items()),
        }
    }
}

/// Write the search index if enabled in config.
pub fn build_search_index(config: &SiteConfig, store: &ContentStore) -> Result<()> {
    if !config.build.search.enable {
        return Ok(());
    }

    let path = &config.build.search.path;
    let index = SearchIndex::from_store(store, config);
    let json = if config.build.minify {
        serde_json::to_vec(&index)?
    } else {
        serde_json::to_vec_pretty(&index)?
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)
        .with_context(|| format!("Failed to write search index to {}", path.display()))?;

    log!("search"; "{} items indexed", index.items.len());
    Ok(())
}
