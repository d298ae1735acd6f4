//! Terminal reports for the `query` and `tags` commands.
//!
//! Both run the same filter and aggregation the pages use and print either
//! a colored listing or JSON to stdout.

use crate::{
    content::{ContentStore, ReleaseItem},
    filter::{Query, Selector, TagCount, tag_counts, total_occurrences},
};
use anyhow::{Result, bail};
use colored::Colorize;
use serde::Serialize;

/// Release items matching a query, grouped by version (newest first).
#[derive(Debug, Serialize)]
pub struct QueryReport<'a> {
    pub query: &'a str,
    pub tag: String,
    pub matches: usize,
    pub versions: Vec<VersionMatches<'a>>,
}

#[derive(Debug, Serialize)]
pub struct VersionMatches<'a> {
    pub version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<&'a str>,
    pub items: Vec<&'a ReleaseItem>,
}

impl<'a> QueryReport<'a> {
    pub fn new(store: &'a ContentStore, text: &'a str, tag: Option<&str>) -> Self {
        let selector = Selector::parse(tag.unwrap_or_default());
        let query = Query::new(text, selector.clone());

        let versions: Vec<_> = query
            .filter_nested(store.releases_newest_first())
            .into_iter()
            .map(|f| VersionMatches {
                version: &f.parent.version,
                date: f.parent.date.as_deref(),
                items: f.children,
            })
            .collect();

        Self {
            query: text.trim(),
            tag: selector.to_string(),
            matches: versions.iter().map(|v| v.items.len()).sum(),
            versions,
        }
    }

    fn print(&self) {
        for version in &self.versions {
            let date = version.date.map(|d| format!(" ({d})")).unwrap_or_default();
            println!("{}{}", version.version.bold(), date.dimmed());
            for item in &version.items {
                let tags = item
                    .tags
                    .iter()
                    .map(|t| format!("[{t}]").cyan().to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("  - {} {tags}", item.text);
            }
        }
        println!(
            "{}",
            format!("{} items in {} versions", self.matches, self.versions.len()).dimmed()
        );
    }
}

/// Tag frequencies over all releases or one version.
#[derive(Debug, Serialize)]
pub struct TagsReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    pub total: usize,
    pub tags: Vec<TagCount<'a>>,
}

impl<'a> TagsReport<'a> {
    pub fn new(store: &'a ContentStore, version: Option<&'a str>, top: Option<usize>) -> Result<Self> {
        let mut tags = match version {
            Some(v) => match store.release(v) {
                Some(release) => tag_counts(&release.items),
                None => bail!("Unknown version `{v}`"),
            },
            None => tag_counts(store.all_items()),
        };
        let total = total_occurrences(&tags);
        if let Some(n) = top {
            tags.truncate(n);
        }

        Ok(Self { version, total, tags })
    }

    fn print(&self) {
        let width = self.tags.iter().map(|t| t.tag.chars().count()).max().unwrap_or(0);
        for TagCount { tag, count } in &self.tags {
            let pad = width - tag.chars().count();
            println!("{}{}  {count}", tag.cyan(), " ".repeat(pad));
        }
        println!(
            "{}",
            format!("{} tags, {} uses", self.tags.len(), self.total).dimmed()
        );
    }
}

pub fn print_query(store: &ContentStore, text: &str, tag: Option<&str>, json: bool) -> Result<()> {
    let report = QueryReport::new(store, text, tag);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}

pub fn print_tags(
    store: &ContentStore,
    version: Option<&str>,
    top: Option<usize>,
    json: bool,
) -> Result<()> {
    let report = TagsReport::new(store, version, top)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        report.print();
    }
    Ok(())
}
