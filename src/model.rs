use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_OPEN_DIRS: usize = 20;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SizeMetric {
    Apparent,
    Allocated,
}

impl SizeMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Apparent => "apparent",
            Self::Allocated => "allocated",
        }
    }
}

/// What to do when a file shows up in a listing but its metadata cannot be
/// read (typically because it was removed in between).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FileErrorPolicy {
    /// Log the file, count it as skipped, keep scanning.
    Skip,
    /// Stop the whole scan and report the error.
    Abort,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EntryKind {
    Directory,
    /// Anything that is not a directory, symlinks and special files included.
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Directory => "dir",
            Self::File => "file",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub root: PathBuf,
    /// Upper bound on directory listings running at the same time.
    pub max_open_dirs: usize,
    /// Worker threads executing directory tasks.
    pub workers: usize,
    pub metric: SizeMetric,
    pub file_errors: FileErrorPolicy,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_open_dirs: DEFAULT_MAX_OPEN_DIRS,
            workers: default_workers(),
            metric: SizeMetric::Apparent,
            file_errors: FileErrorPolicy::Skip,
        }
    }
}

pub fn default_workers() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (cores * 4).clamp(4, 64)
}

/// Byte count of one discovered file.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SizeEvent(pub u64);

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScanReport {
    pub root: PathBuf,
    /// Subdirectories found below the root, root excluded.
    pub directories: u64,
    pub files: u64,
    pub total_bytes: u64,
    pub unreadable_dirs: u64,
    pub skipped_files: u64,
    pub peak_concurrent_listings: usize,
    pub elapsed: Duration,
}

impl ScanReport {
    /// Same tree, same numbers; ignores timing and concurrency figures.
    pub fn same_totals(&self, other: &Self) -> bool {
        self.directories == other.directories
            && self.files == other.files
            && self.total_bytes == other.total_bytes
    }
}
