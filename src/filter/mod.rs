//! Client-side style filtering and tag aggregation over in-memory content.
//!
//! - [`aggregate`]: tag → count summaries ("top tags")
//! - [`query`]: text query AND tag/category selector, flat and nested
//! - [`highlight`]: mark query matches in rendered text

pub mod aggregate;
pub mod highlight;
pub mod query;

pub use aggregate::{TagCount, tag_counts, top_tags, total_occurrences};
pub use query::{Filtered, Query, Selector};
