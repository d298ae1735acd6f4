//! File system watcher for the dev server.
//!
//! Watches the content directory and the config file. Changes swap a fresh
//! content store or config into the global handles; the next request
//! renders from it. A failed reload keeps the previous snapshot.
//!
//! ```text
//! notify events ──► Debouncer (300ms) ──► handle_changes()
//!                                             ├── config  → reload_config() + reload_store()
//!                                             ├── content → reload_store()
//!                                             └── assets  → served from disk, log only
//! ```

use crate::{
    config::{SiteConfig, cfg, reload_config},
    content::reload_store,
    log,
    logger::log_error_chain,
};
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{RecvTimeoutError, channel},
    time::{Duration, Instant},
};

const DEBOUNCE_MS: u64 = 300;
const RELOAD_COOLDOWN_MS: u64 = 800;

/// What a changed path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FileCategory {
    Config,
    Content,
    Asset,
    Unknown,
}

fn categorize_path(path: &Path, config: &SiteConfig) -> FileCategory {
    if path == config.config_path {
        FileCategory::Config
    } else if path.starts_with(&config.build.content) {
        FileCategory::Content
    } else if path.starts_with(&config.build.assets) {
        FileCategory::Asset
    } else {
        FileCategory::Unknown
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches rapid file events with debouncing and reload cooldown.
struct Debouncer {
    pending: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
    last_reload: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
            last_reload: None,
        }
    }

    fn in_cooldown(&self) -> bool {
        self.last_reload
            .is_some_and(|t| t.elapsed() < Duration::from_millis(RELOAD_COOLDOWN_MS))
    }

    fn add(&mut self, event: Event) {
        for path in event.paths {
            if !is_temp_file(&path) {
                self.pending.insert(path);
            }
        }
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<PathBuf> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn mark_reload(&mut self) {
        self.last_reload = Some(Instant::now());
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Event Handler
// =============================================================================

/// Reload whatever the changed paths affect. Returns true if anything was swapped.
fn handle_changes(paths: &[PathBuf]) -> bool {
    let config = cfg();
    let categories: FxHashSet<FileCategory> = paths
        .iter()
        .map(|p| categorize_path(p, &config))
        .collect();

    let mut reloaded = false;

    if categories.contains(&FileCategory::Config) {
        match reload_config() {
            Ok(true) => {
                log!("watch"; "config reloaded");
                reloaded = true;
            }
            Ok(false) => {}
            Err(err) => log_error_chain("watch", &err.context("config reload failed, keeping previous")),
        }
    }

    // A new config may point at another content directory
    if reloaded || categories.contains(&FileCategory::Content) {
        let content_dir = cfg().build.content.clone();
        match reload_store(&content_dir) {
            Ok(true) => {
                log!("watch"; "content reloaded");
                reloaded = true;
            }
            Ok(false) => {}
            Err(err) => log_error_chain(
                "watch",
                &anyhow::Error::new(err).context("content reload failed, keeping previous"),
            ),
        }
    }

    if categories.contains(&FileCategory::Asset) {
        log!("watch"; "assets changed");
    }

    reloaded
}

// =============================================================================
// Watcher Setup
// =============================================================================

fn setup_watchers(watcher: &mut impl Watcher, config: &SiteConfig) -> Result<()> {
    let targets = [
        (&config.build.content, RecursiveMode::Recursive),
        (&config.build.assets, RecursiveMode::Recursive),
        (&config.config_path, RecursiveMode::NonRecursive),
    ];

    let root = config.get_root();
    let mut watched = Vec::new();
    for (path, mode) in targets {
        if path.exists() {
            watcher
                .watch(path, mode)
                .with_context(|| format!("Failed to watch {}", path.display()))?;
            watched.push(path.strip_prefix(root).unwrap_or(path.as_path()).display().to_string());
        }
    }

    log!("watch"; "{}", watched.join(", "));
    Ok(())
}

const fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
    )
}

/// Start blocking file watcher with debouncing and live reload.
pub fn watch_for_changes_blocking() -> Result<()> {
    let config = cfg();
    if !config.serve.watch {
        return Ok(());
    }

    let (tx, rx) = channel();
    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    setup_watchers(&mut watcher, &config)?;

    let mut debouncer = Debouncer::new();

    loop {
        match rx.recv_timeout(debouncer.timeout()) {
            Ok(Ok(event)) if is_relevant(&event) && !debouncer.in_cooldown() => {
                debouncer.add(event);
            }
            Ok(Err(e)) => log!("watch"; "error: {e}"),
            Err(RecvTimeoutError::Timeout) if debouncer.ready() => {
                if handle_changes(&debouncer.take()) {
                    debouncer.mark_reload();
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
            // Irrelevant events, or timeout without pending changes
            _ => {}
        }
    }

    Ok(())
}
