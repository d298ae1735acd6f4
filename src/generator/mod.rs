//! Machine-readable outputs generated alongside the pages.
//!
//! - [`sitemap`]: `sitemap.xml` for search engines
//! - [`search`]: `search-index.json` for client-side search

pub mod search;
pub mod sitemap;

pub use search::build_search_index;
pub use sitemap::build_sitemap;
