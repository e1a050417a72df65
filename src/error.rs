use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
///
/// Every operational failure ends up as one of these and is shown to the
/// user in a single alert dialog.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors that don't map onto one of the typed variants below.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path or name provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// The OS refused to watch a directory.
    #[error("Cannot watch {}: {reason}", path.display())]
    WatchCreateFailed { path: PathBuf, reason: String },

    /// Error reported by a running watch.
    #[error("Watcher error: {0}")]
    Watch(String),

    #[error("No file selected")]
    NoOperandSelected,

    #[error("Name cannot be empty")]
    EmptyNameRejected,

    /// An external program (opener, editor) could not be started.
    #[error("Failed to launch {program}: {reason}")]
    LaunchFailed { program: String, reason: String },

    #[error("Trash error: {0}")]
    Trash(String),
}

impl AppError {
    /// Convert an I/O error into the typed variant for its kind, attaching
    /// the path the operation was working on.
    pub fn io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => AppError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::AlreadyExists => AppError::AlreadyExists(path.to_path_buf()),
            _ => AppError::Io(err),
        }
    }
}

/// Attach a path to I/O results, see [`AppError::io`].
pub trait IoResultExt<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|e| AppError::io(e, path))
    }
}
