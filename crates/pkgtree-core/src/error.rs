//! Error types for tree building.

use thiserror::Error;

/// Errors that can occur while building a package tree.
///
/// Most of these are absorbed where they happen: the directory or file
/// involved simply drops out of the tree.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: String },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("{path}: not a directory")]
    NotADirectory { path: String },

    /// Non-root path fails the package directory naming rule.
    #[error("{path}: not a package directory")]
    NotAPackageDirectory { path: String },

    /// Source file has no readable package clause.
    #[error("{path}:{line}: {message}")]
    Parse {
        path: String,
        line: usize,
        message: String,
    },

    /// A concurrency gate was closed.
    #[error("{gate} gate closed")]
    GateClosed { gate: &'static str },

    /// A background task panicked or was cancelled.
    #[error("task for {path} failed: {message}")]
    TaskFailed { path: String, message: String },

    /// The build produced no tree at all.
    #[error("no package directories found under {path}")]
    EmptyTree { path: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl BuildError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Attach a file path to a parse error produced without one.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        match self {
            Self::Parse { line, message, .. } => Self::Parse {
                path: path.into(),
                line,
                message,
            },
            other => other,
        }
    }
}
