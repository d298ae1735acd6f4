//! Tag frequency aggregation.
//!
//! Produces `(tag, count)` pairs ordered by count descending. Ties keep the
//! order in which tags were first seen, so the output is deterministic for
//! a given input sequence.

use crate::content::{Plugin, ReleaseItem, Topic, VersionDetailItem};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Anything that carries classification tags.
pub trait Tagged {
    fn tags(&self) -> &[String];
}

impl Tagged for ReleaseItem {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for VersionDetailItem {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Plugin {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for Topic {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl<T: Tagged + ?Sized> Tagged for &T {
    fn tags(&self) -> &[String] {
        (**self).tags()
    }
}

/// Occurrence count for a single tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount<'a> {
    pub tag: &'a str,
    pub count: usize,
}

/// Count tag occurrences across `items`.
///
/// A tag repeated inside one item is counted once per occurrence.
pub fn tag_counts<'a, T, I>(items: I) -> Vec<TagCount<'a>>
where
    T: Tagged + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut index: FxHashMap<&'a str, usize> = FxHashMap::default();
    let mut counts: Vec<TagCount<'a>> = Vec::new();

    for item in items {
        for tag in item.tags() {
            match index.get(tag.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(tag, counts.len());
                    counts.push(TagCount { tag, count: 1 });
                }
            }
        }
    }

    // `sort_by` is stable: equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// The `n` most frequent tags.
pub fn top_tags<'a, T, I>(items: I, n: usize) -> Vec<TagCount<'a>>
where
    T: Tagged + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts = tag_counts(items);
    counts.truncate(n);
    counts
}

/// Sum of all counts, equal to the number of tag occurrences aggregated.
pub fn total_occurrences(counts: &[TagCount<'_>]) -> usize {
    counts.iter().map(|c| c.count).sum()
}
