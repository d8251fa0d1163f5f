//! Build statistics.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Counters for a finished (or running) build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildProgress {
    /// Directories whose listing was attempted.
    pub dirs_listed: u64,
    /// Source files whose package clause was read.
    pub files_parsed: u64,
    /// Listings that failed and were treated as empty.
    pub read_errors: u64,
    /// Files skipped because their package clause could not be read.
    pub parse_errors: u64,
    /// Time elapsed since the build started.
    pub elapsed: Duration,
}

impl BuildProgress {
    /// Total errors absorbed during the build.
    pub fn errors_count(&self) -> u64 {
        self.read_errors + self.parse_errors
    }

    /// Directories listed per second.
    pub fn dirs_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.dirs_listed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Shared counters updated by concurrent build tasks.
#[derive(Debug)]
pub(crate) struct BuildStats {
    started: OnceLock<Instant>,
    dirs_listed: AtomicU64,
    files_parsed: AtomicU64,
    read_errors: AtomicU64,
    parse_errors: AtomicU64,
}

impl BuildStats {
    pub fn new() -> Self {
        Self {
            started: OnceLock::new(),
            dirs_listed: AtomicU64::new(0),
            files_parsed: AtomicU64::new(0),
            read_errors: AtomicU64::new(0),
            parse_errors: AtomicU64::new(0),
        }
    }

    /// Start the clock. Later calls keep the first start time.
    pub fn start(&self) {
        self.started.get_or_init(Instant::now);
    }

    pub fn record_dir(&self) {
        self.dirs_listed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self) {
        self.files_parsed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BuildProgress {
        BuildProgress {
            dirs_listed: self.dirs_listed.load(Ordering::Relaxed),
            files_parsed: self.files_parsed.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            elapsed: self
                .started
                .get()
                .map(Instant::elapsed)
                .unwrap_or_default(),
        }
    }
}

impl Default for BuildStats {
    fn default() -> Self {
        Self::new()
    }
}
