//! Global content store with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads. The file watcher replaces the whole
//! snapshot when content files change; requests in flight keep rendering
//! from the snapshot they loaded.

use super::{ContentStore, error::ContentError, store::fingerprint};
use arc_swap::ArcSwap;
use std::{
    path::Path,
    sync::{Arc, LazyLock},
};

/// Global content storage, empty until `init_store` runs.
pub static STORE: LazyLock<ArcSwap<ContentStore>> =
    LazyLock::new(|| ArcSwap::from_pointee(ContentStore::default()));

/// Get the current content snapshot.
#[inline]
pub fn store() -> Arc<ContentStore> {
    STORE.load_full()
}

/// Load content from `dir` and publish it (called once at startup).
pub fn init_store(dir: &Path) -> Result<Arc<ContentStore>, ContentError> {
    let store = Arc::new(ContentStore::load(dir)?);
    STORE.store(Arc::clone(&store));
    Ok(store)
}

/// Reload content if any file changed since the last load.
///
/// Returns `true` when a new snapshot was published. On parse errors the
/// previous snapshot stays in place.
pub fn reload_store(dir: &Path) -> Result<bool, ContentError> {
    if fingerprint(dir)? == store().fingerprint {
        return Ok(false);
    }

    STORE.store(Arc::new(ContentStore::load(dir)?));
    Ok(true)
}
