//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! This enables hot-reloading of `relnotes.toml` while serving.
//!
//! # Usage
//!
//! ```ignore
//! use crate::config::cfg;
//!
//! let c = cfg();
//! build_site(&c)?;  // Arc auto-derefs to &SiteConfig
//! ```

use super::SiteConfig;
use arc_swap::ArcSwap;
use std::{
    fs,
    sync::{Arc, LazyLock, Mutex},
};

// =============================================================================
// Global State
// =============================================================================

/// Global config storage with atomic replacement support.
///
/// Initialized with default config, then replaced with loaded config in main.
pub static CONFIG: LazyLock<ArcSwap<SiteConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(SiteConfig::default()));

/// blake3 digest of the config file content last loaded.
static CONFIG_HASH: Mutex<Option<blake3::Hash>> = Mutex::new(None);

// =============================================================================
// Public API
// =============================================================================

/// Get current config as `Arc<SiteConfig>`.
///
/// Lock-free read via atomic load. The Arc auto-derefs to `&SiteConfig`.
#[inline]
pub fn cfg() -> Arc<SiteConfig> {
    CONFIG.load_full()
}

/// Replace config atomically (called when relnotes.toml changes).
///
/// Returns `true` if config was actually updated, `false` if content matches last load.
///
/// # Errors
///
/// Returns error if relnotes.toml parsing or validation fails; the previous
/// config stays active in that case.
pub fn reload_config() -> anyhow::Result<bool> {
    let c = cfg();
    let Some(cli) = c.cli else {
        anyhow::bail!("config was not initialized from the command line");
    };

    let content = fs::read_to_string(&c.config_path)?;
    let new_hash = blake3::hash(content.as_bytes());

    let mut last = CONFIG_HASH.lock().map_err(|_| anyhow::anyhow!("config hash lock poisoned"))?;
    if *last == Some(new_hash) {
        return Ok(false);
    }

    let new_config = SiteConfig::load(cli)?;
    new_config.validate()?;

    CONFIG.store(Arc::new(new_config));
    *last = Some(new_hash);

    Ok(true)
}

/// Initialize global config (called once at startup).
#[inline]
pub fn init_config(config: SiteConfig) {
    if let Ok(content) = fs::read_to_string(&config.config_path)
        && let Ok(mut last) = CONFIG_HASH.lock()
    {
        *last = Some(blake3::hash(content.as_bytes()));
    }

    CONFIG.store(Arc::new(config));
}
