//! Logging utilities with colored output and progress bars.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `ProgressBars` for displaying render progress of parallel tasks
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("build"; "rendering {} pages", count);
//!
//! // Progress bars for parallel tasks
//! let progress = ProgressBars::new(&[("pages", 100), ("assets", 50)]);
//! progress.inc(0); // increment pages bar
//! progress.inc(1); // increment assets bar
//! progress.finish(); // clear progress bars
//! ```

use colored::{ColoredString, Colorize};
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{IsTerminal, Write, stderr},
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

// ============================================================================
// Layout Constants
// ============================================================================
//
// Progress bar format: "[module] [████░░░░] 42/100"
//                       ^------^ ^-------^ ^----^
//                       prefix   bar       count

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;
/// Bar wrapper: " []" (space + brackets around progress bar)
const BAR_WRAPPER_LEN: usize = 3;
/// Space before count: "...] 42/100" <- this space
const SPACE_BEFORE_COUNT: usize = 1;
/// Minimum progress bar width in characters
const MIN_BAR_WIDTH: usize = 10;
/// Maximum progress bar width in characters
const MAX_BAR_WIDTH: usize = 40;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Logs go to stderr so `relnotes query --json` output stays pipeable.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Progress Bars
// ============================================================================

/// Manages multiple progress bars displayed on separate terminal lines.
///
/// Each bar occupies one line and updates in place using ANSI cursor control.
/// Bars are indexed by their creation order (0, 1, 2, ...). When stderr is
/// not a terminal the bars are silent.
pub struct ProgressBars {
    bars: Vec<ProgressBar>,
    lock: Mutex<()>,
    enabled: bool,
}

/// Internal state for a single progress bar.
struct ProgressBar {
    /// Colored prefix string (e.g., "[pages]" in yellow)
    prefix: ColoredString,
    /// Pre-calculated display length of prefix
    prefix_len: usize,
    /// Total number of items to process
    total: usize,
    /// Current progress counter (atomic for thread-safe updates)
    current: AtomicUsize,
    /// Row index within the progress area (0 = first bar)
    row: usize,
}

impl ProgressBars {
    /// Create progress bars for multiple modules.
    ///
    /// `modules` is a slice of (`module_name`, `total_count`) tuples.
    pub fn new(modules: &[(&'static str, usize)]) -> Self {
        let enabled = stderr().is_terminal();

        if enabled {
            // Reserve terminal lines for progress bars
            let mut err = stderr().lock();
            for _ in 0..modules.len() {
                writeln!(err).ok();
            }
            err.flush().ok();
        }

        let bars = modules
            .iter()
            .enumerate()
            .map(|(row, (module, total))| ProgressBar {
                prefix: colorize_prefix(module),
                prefix_len: calc_prefix_len(module.len()),
                total: *total,
                current: AtomicUsize::new(0),
                row,
            })
            .collect();

        Self {
            bars,
            lock: Mutex::new(()),
            enabled,
        }
    }

    /// Increment progress for the bar at the given index.
    ///
    /// Thread-safe: can be called from multiple rayon workers.
    #[inline]
    pub fn inc(&self, index: usize) {
        if let Some(bar) = self.bars.get(index) {
            let current = bar.current.fetch_add(1, Ordering::Relaxed) + 1;
            if self.enabled {
                self.display(bar, current);
            }
        }
    }

    /// Current count of the bar at `index`.
    pub fn current(&self, index: usize) -> usize {
        self.bars
            .get(index)
            .map_or(0, |bar| bar.current.load(Ordering::Relaxed))
    }

    /// Render a progress bar at its designated row.
    fn display(&self, bar: &ProgressBar, current: usize) {
        let _guard = self.lock.lock().ok();

        let width = get_terminal_width() as usize;
        let progress_text = format!("{}/{}", current, bar.total);
        let bar_width = bar_width(width, bar.prefix_len, progress_text.len());

        let filled = if bar.total > 0 {
            (current.min(bar.total) * bar_width) / bar.total
        } else {
            0
        };
        let empty = bar_width.saturating_sub(filled);
        let progress_bar: String = "█".repeat(filled) + &"░".repeat(empty);

        let mut err = stderr().lock();
        let lines_up = (self.bars.len() - bar.row) as u16;
        execute!(err, cursor::MoveUp(lines_up)).ok();
        execute!(err, Clear(ClearType::CurrentLine)).ok();
        write!(err, "{} [{}] {}", bar.prefix, progress_bar, progress_text).ok();
        execute!(err, cursor::MoveDown(lines_up)).ok();
        write!(err, "\r").ok();
        err.flush().ok();
    }

    /// Clear all progress bars from the terminal.
    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let _guard = self.lock.lock().ok();
        let mut err = stderr().lock();
        let rows = self.bars.len() as u16;

        execute!(err, cursor::MoveUp(rows)).ok();
        for _ in &self.bars {
            execute!(err, Clear(ClearType::CurrentLine)).ok();
            execute!(err, cursor::MoveDown(1)).ok();
        }
        execute!(err, cursor::MoveUp(rows)).ok();
        err.flush().ok();
    }
}

/// Width of the bar body for a terminal of `width` columns.
fn bar_width(width: usize, prefix_len: usize, count_len: usize) -> usize {
    let overhead = prefix_len + BAR_WRAPPER_LEN + SPACE_BEFORE_COUNT + count_len;
    width.saturating_sub(overhead).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Automatically truncates long messages to fit terminal width.
#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut err = stderr().lock();

    if !err.is_terminal() {
        writeln!(err, "[{module}] {message}").ok();
        return;
    }

    execute!(err, Clear(ClearType::UntilNewLine)).ok();
    let max_msg_len = (get_terminal_width() as usize).saturating_sub(calc_prefix_len(module.len()));
    writeln!(err, "{prefix} {}", truncate_str(message, max_msg_len)).ok();
    err.flush().ok();
}

/// Log an error with its full cause chain, one cause per line.
pub fn log_error_chain(module: &str, err: &anyhow::Error) {
    log(module, &err.to_string());
    for cause in err.chain().skip(1) {
        log(module, &format!("  caused by: {cause}"));
    }
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" => prefix.bright_blue().bold(),
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================
