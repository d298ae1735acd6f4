//! Site content: JSON collections loaded into an immutable store.
//!
//! # Content Directory
//!
//! | File                   | Required | Contents                          |
//! |------------------------|----------|-----------------------------------|
//! | `releases.json`        | yes      | versions with changelog items     |
//! | `version_details.json` | no       | version → enriched detail items   |
//! | `plugins.json`         | no       | plugin categories                 |
//! | `setup.json`           | no       | setup guide sections              |
//! | `hands_on.json`        | no       | tutorial topics and steps         |
//! | `pages.json`           | no       | static informational pages        |
//!
//! Data flows one way: files → [`ContentStore`] → filter → render.

mod error;
pub mod handle;
pub mod store;
mod types;

pub use handle::{init_store, reload_store, store};
pub use store::ContentStore;
pub use types::{
    CalloutVariant, ContentBlock, InfoPage, Plugin, PluginCategory, ReleaseItem, ReleaseVersion,
    SetupSection, Step, Topic, VersionDetailItem, VersionDetails,
};
