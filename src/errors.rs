use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Problems with the path handed in on the command line. Any of these stops
/// the run before a single directory is listed.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{path} is an invalid name, paths starting with '/' are not accepted")]
    RootPrefixed { path: String },

    #[error("{path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("permission denied for {path:?}")]
    PermissionDenied { path: PathBuf },

    #[error("cannot use {path:?}: {source}")]
    Unusable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InputError {
    /// Classifies a top-level stat failure by its `io::ErrorKind`.
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Unusable { path, source },
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn scan thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("scan cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_error_kind() {
        let not_found = InputError::from_io("a", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(not_found, InputError::NotFound { .. }));

        let denied = InputError::from_io("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, InputError::PermissionDenied { .. }));

        let other = InputError::from_io("a", io::Error::other("boom"));
        assert!(matches!(other, InputError::Unusable { .. }));
    }
}
