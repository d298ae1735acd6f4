//! Static assets: user files from `[build].assets` and the bundled stylesheet.
//!
//! Everything lands in `<output>/<path_prefix>/assets/`.

use crate::{
    config::SiteConfig,
    log,
    render::{STYLE_CSS, stylesheet_name},
};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Output directory for assets.
pub fn assets_output_dir(config: &SiteConfig) -> PathBuf {
    config
        .build
        .output
        .join(&config.build.path_prefix)
        .join("assets")
}

/// Collect all files from a directory recursively.
///
/// A missing directory yields no files.
pub fn collect_all_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_str().unwrap_or_default();
            !IGNORED_FILES.contains(&name)
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Check if destination is at least as new as the source.
pub fn is_up_to_date(src: &Path, dst: &Path) -> bool {
    let modified = |path: &Path| path.metadata().and_then(|m| m.modified()).ok();
    match (modified(src), modified(dst)) {
        (Some(src_time), Some(dst_time)) => src_time <= dst_time,
        _ => false,
    }
}

/// Output path of a user asset.
pub fn asset_dest(path: &Path, config: &SiteConfig) -> Result<PathBuf> {
    let relative = path
        .strip_prefix(&config.build.assets)
        .map_err(|_| anyhow!("{} is outside the assets directory", path.display()))?;
    Ok(assets_output_dir(config).join(relative))
}

/// Copy one user asset unless the output copy is current.
pub fn copy_asset(path: &Path, config: &SiteConfig, clean: bool) -> Result<()> {
    let dest = asset_dest(path, config)?;
    if !clean && is_up_to_date(path, &dest) {
        return Ok(());
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(path, &dest)
        .with_context(|| format!("Failed to copy {} to {}", path.display(), dest.display()))?;
    Ok(())
}

/// Write the bundled stylesheet under its hashed name and remove stale copies.
pub fn write_stylesheet(config: &SiteConfig) -> Result<PathBuf> {
    let dir = assets_output_dir(config);
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let current = stylesheet_name();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("style.") && name.ends_with(".css") && name != current {
            fs::remove_file(entry.path())?;
            log!("assets"; "removed stale {name}");
        }
    }

    let path = dir.join(current);
    fs::write(&path, STYLE_CSS)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.build.assets = dir.join("assets");
        config.build.output = dir.join("public");
        config
    }

    #[test]
    fn test_collect_all_files_skips_ignored() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/logo.svg"), "<svg/>").unwrap();
        fs::write(dir.path().join(".DS_Store"), "").unwrap();

        let files = collect_all_files(dir.path());
        assert_eq!(files, vec![dir.path().join("img/logo.svg")]);
        assert!(collect_all_files(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn test_copy_asset() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let src = config.build.assets.join("img/logo.svg");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, "<svg/>").unwrap();

        copy_asset(&src, &config, false).unwrap();
        let dest = dir.path().join("public/assets/img/logo.svg");
        assert_eq!(fs::read_to_string(&dest).unwrap(), "<svg/>");
        assert!(is_up_to_date(&src, &dest));
    }

    #[test]
    fn test_asset_dest_rejects_outside_path() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        assert!(asset_dest(&dir.path().join("elsewhere.png"), &config).is_err());
    }

    #[test]
    fn test_is_up_to_date_missing_dest() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("a.txt");
        fs::write(&src, "a").unwrap();
        assert!(!is_up_to_date(&src, &dir.path().join("b.txt")));
    }

    #[test]
    fn test_write_stylesheet_replaces_stale() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let assets = assets_output_dir(&config);
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("style.00000000.css"), "old").unwrap();
        fs::write(assets.join("other.css"), "keep").unwrap();

        let path = write_stylesheet(&config).unwrap();
        assert_eq!(path, assets.join(stylesheet_name()));
        assert_eq!(fs::read_to_string(&path).unwrap(), STYLE_CSS);
        assert!(!assets.join("style.00000000.css").exists());
        assert!(assets.join("other.css").exists());
    }
}
