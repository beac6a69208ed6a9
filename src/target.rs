use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::InputError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PathPolicy {
    /// Refuse anything starting with `/` except `/` itself.
    RejectRootPrefixed,
    AllowAny,
}

/// What the command line pointed at, checked before any traversal starts.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Target {
    Directory(PathBuf),
    File { name: String, size: u64 },
}

pub fn check_policy(raw: &str, policy: PathPolicy) -> Result<(), InputError> {
    if policy == PathPolicy::RejectRootPrefixed && raw.len() > 1 && raw.starts_with('/') {
        return Err(InputError::RootPrefixed {
            path: raw.to_string(),
        });
    }
    Ok(())
}

pub fn resolve_target(raw: &str, policy: PathPolicy) -> Result<Target, InputError> {
    let raw = raw.trim();
    check_policy(raw, policy)?;

    let path = Path::new(raw);
    let metadata = fs::metadata(path).map_err(|error| InputError::from_io(path, error))?;

    if metadata.is_dir() {
        // An unreadable root is an input problem, not a partial result.
        fs::read_dir(path).map_err(|error| InputError::from_io(path, error))?;
        return Ok(Target::Directory(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| raw.to_string());
    Ok(Target::File {
        name,
        size: metadata.len(),
    })
}
