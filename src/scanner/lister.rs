use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::EntryKind;
use crate::scanner::limiter::Limiter;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListedEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

/// Reads the immediate entries of `dir` while holding one limiter permit.
///
/// Failing to open the directory is returned to the caller. Entries that
/// fail individually are logged and left out.
pub fn list_directory(dir: &Path, limiter: &Limiter) -> io::Result<Vec<ListedEntry>> {
    let _permit = limiter.acquire();

    let mut entries = Vec::new();
    for entry_result in fs::read_dir(dir)? {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(error) => {
                warn!(dir = %dir.display(), %error, "cannot read entry");
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(error) => {
                warn!(path = %entry.path().display(), %error, "cannot read entry type");
                continue;
            }
        };

        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        entries.push(ListedEntry {
            path: entry.path(),
            kind,
        });
    }

    Ok(entries)
}
