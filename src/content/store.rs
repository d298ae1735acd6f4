//! In-memory content store.
//!
//! All collections are read once from the content directory and never
//! mutated afterwards. Lookups return `Option` so callers can fall back to
//! not-found or basic rendering instead of failing.

use super::{
    error::ContentError,
    types::{
        InfoPage, PluginCategory, ReleaseItem, ReleaseVersion, SetupSection, Topic,
        VersionDetailItem, VersionDetails,
    },
};
use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Required changelog file.
pub const RELEASES_FILE: &str = "releases.json";
/// Optional content files, in load order.
pub const VERSION_DETAILS_FILE: &str = "version_details.json";
pub const PLUGINS_FILE: &str = "plugins.json";
pub const SETUP_FILE: &str = "setup.json";
pub const HANDS_ON_FILE: &str = "hands_on.json";
pub const PAGES_FILE: &str = "pages.json";

/// Every file the store reads, used for fingerprinting and watching.
pub const CONTENT_FILES: &[&str] = &[
    RELEASES_FILE,
    VERSION_DETAILS_FILE,
    PLUGINS_FILE,
    SETUP_FILE,
    HANDS_ON_FILE,
    PAGES_FILE,
];

/// Immutable snapshot of all site content.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    /// Releases in chronological (file) order
    pub releases: Vec<ReleaseVersion>,
    pub details: VersionDetails,
    pub plugins: Vec<PluginCategory>,
    pub setup: Vec<SetupSection>,
    pub topics: Vec<Topic>,
    pub pages: Vec<InfoPage>,
    /// blake3 digest of the raw content files
    pub fingerprint: String,
}

impl ContentStore {
    /// Load every content file from `dir`.
    ///
    /// `releases.json` is required; the other files default to empty
    /// collections when absent.
    pub fn load(dir: &Path) -> Result<Self, ContentError> {
        let releases_path = dir.join(RELEASES_FILE);
        if !releases_path.is_file() {
            return Err(ContentError::Missing(releases_path));
        }

        let releases: Vec<ReleaseVersion> = read_json(&releases_path)?;
        check_unique(&releases_path, "version", releases.iter().map(|r| r.version.as_str()))?;

        let details: VersionDetails = read_optional(&dir.join(VERSION_DETAILS_FILE))?;

        let plugins_path = dir.join(PLUGINS_FILE);
        let plugins: Vec<PluginCategory> = read_optional(&plugins_path)?;
        check_unique(&plugins_path, "plugin category", plugins.iter().map(|c| c.id.as_str()))?;

        let setup_path = dir.join(SETUP_FILE);
        let setup: Vec<SetupSection> = read_optional(&setup_path)?;
        check_unique(&setup_path, "setup section", setup.iter().map(|s| s.id.as_str()))?;

        let topics_path = dir.join(HANDS_ON_FILE);
        let topics: Vec<Topic> = read_optional(&topics_path)?;
        check_unique(&topics_path, "topic", topics.iter().map(|t| t.id.as_str()))?;

        let pages_path = dir.join(PAGES_FILE);
        let pages: Vec<InfoPage> = read_optional(&pages_path)?;
        check_unique(&pages_path, "page", pages.iter().map(|p| p.slug.as_str()))?;

        Ok(Self {
            releases,
            details,
            plugins,
            setup,
            topics,
            pages,
            fingerprint: fingerprint(dir)?,
        })
    }

    /// Find a release by its version identifier.
    pub fn release(&self, version: &str) -> Option<&ReleaseVersion> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// Enriched detail records for a version, if any were authored.
    ///
    /// An empty list counts as absent.
    pub fn details_for(&self, version: &str) -> Option<&[VersionDetailItem]> {
        self.details
            .get(version)
            .map(Vec::as_slice)
            .filter(|items| !items.is_empty())
    }

    pub fn topic(&self, id: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.id == id)
    }

    pub fn page(&self, slug: &str) -> Option<&InfoPage> {
        self.pages.iter().find(|p| p.slug == slug)
    }

    /// Releases newest first (reverse of file order).
    pub fn releases_newest_first(&self) -> impl Iterator<Item = &ReleaseVersion> {
        self.releases.iter().rev()
    }

    /// Every release item across all versions, in file order.
    pub fn all_items(&self) -> impl Iterator<Item = &ReleaseItem> {
        self.releases.iter().flat_map(|r| r.items.iter())
    }

    /// Release whose version follows/precedes `version` in file order.
    ///
    /// Returns `(previous, next)` for pager links on the version page.
    pub fn neighbors(&self, version: &str) -> (Option<&ReleaseVersion>, Option<&ReleaseVersion>) {
        let Some(index) = self.releases.iter().position(|r| r.version == version) else {
            return (None, None);
        };
        let previous = index.checked_sub(1).and_then(|i| self.releases.get(i));
        (previous, self.releases.get(index + 1))
    }
}

/// Read and parse a JSON file.
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let content = fs::read_to_string(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
    serde_json::from_str(&content).map_err(|err| ContentError::Json(path.to_path_buf(), err))
}

/// Read an optional JSON file, returning the default value if it doesn't exist.
fn read_optional<T: DeserializeOwned + Default>(path: &Path) -> Result<T, ContentError> {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|err| ContentError::Json(path.to_path_buf(), err)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(ContentError::Io(path.to_path_buf(), err)),
    }
}

/// Reject collections that reuse an identifier.
fn check_unique<'a>(
    file: &Path,
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), ContentError> {
    let mut seen = FxHashSet::default();
    for id in ids {
        if !seen.insert(id) {
            return Err(ContentError::Duplicate {
                kind,
                id: id.to_owned(),
                file: file.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Hash the raw bytes of every present content file.
///
/// Used to skip reloads when a watcher event didn't change any content.
pub fn fingerprint(dir: &Path) -> Result<String, ContentError> {
    let mut hasher = blake3::Hasher::new();
    for name in CONTENT_FILES {
        let path: PathBuf = dir.join(name);
        match fs::read(&path) {
            Ok(bytes) => {
                hasher.update(name.as_bytes());
                hasher.update(&bytes);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(ContentError::Io(path, err)),
        }
    }
    Ok(hasher.finalize().to_hex().to_string())
}
