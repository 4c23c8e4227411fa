//! Filesystem error types.
//!
//! Every failure carries the operation that was attempted, the path it was
//! attempted on, and a classified [`FsErrorKind`]. Callers should classify
//! errors with the predicate helpers rather than by message text.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The action being attempted when an error occurred.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Create,
    Open,
    Close,
    Read,
    Write,
    Seek,
    Mkdir,
    ReadDir,
    ReadFile,
    WriteFile,
    Remove,
    RemoveAll,
    Rename,
    Stat,
    Truncate,
    DirSize,
}

/// Classified failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FsErrorKind {
    /// File or directory not found.
    #[error("file does not exist")]
    NotExist,

    /// Path already exists.
    #[error("file already exists")]
    Exist,

    /// Expected a directory.
    #[error("not a directory")]
    NotDir,

    /// Expected a file.
    #[error("is a directory")]
    IsDir,

    /// Permission denied. Reserved; no current operation raises it.
    #[error("permission denied")]
    Permission,

    #[error("invalid offset")]
    InvalidOffset,

    #[error("negative offset")]
    NegativeOffset,

    #[error("invalid whence value")]
    InvalidWhence,

    /// Handle already closed. Reserved; double close is not detected.
    #[error("file already closed")]
    Closed,

    #[error("directory not empty")]
    DirNotEmpty,

    /// Operation not permitted on the root directory.
    #[error("operation not permitted on root")]
    IsRoot,

    #[error("root already exists")]
    RootExists,

    /// Empty or malformed path component, or a move into its own subtree.
    #[error("invalid path")]
    InvalidPath,

    /// A path component exceeds the configured name limit.
    #[error("file name too long")]
    NameTooLong,
}

/// Filesystem error: operation, path and classified kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{op} {path}: {kind}")]
pub struct FsError {
    pub op: Operation,
    pub path: String,
    #[source]
    pub kind: FsErrorKind,
}

impl FsError {
    pub fn new(op: Operation, path: impl Into<String>, kind: FsErrorKind) -> Self {
        Self {
            op,
            path: path.into(),
            kind,
        }
    }

    /// Create a NotExist error.
    pub fn not_exist(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::NotExist)
    }

    /// Create an Exist error.
    pub fn exist(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::Exist)
    }

    /// Create a NotDir error.
    pub fn not_dir(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::NotDir)
    }

    /// Create an IsDir error.
    pub fn is_dir(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::IsDir)
    }

    /// Create an IsRoot error.
    pub fn is_root(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::IsRoot)
    }

    /// Create a NegativeOffset error.
    pub fn negative_offset(op: Operation, path: impl Into<String>) -> Self {
        Self::new(op, path, FsErrorKind::NegativeOffset)
    }

    pub fn kind(&self) -> FsErrorKind {
        self.kind
    }
}

pub fn is_not_exist(err: &FsError) -> bool {
    err.kind == FsErrorKind::NotExist
}

pub fn is_exist(err: &FsError) -> bool {
    err.kind == FsErrorKind::Exist
}

pub fn is_not_dir(err: &FsError) -> bool {
    err.kind == FsErrorKind::NotDir
}

pub fn is_dir(err: &FsError) -> bool {
    err.kind == FsErrorKind::IsDir
}

pub fn is_dir_not_empty(err: &FsError) -> bool {
    err.kind == FsErrorKind::DirNotEmpty
}

pub fn is_permission(err: &FsError) -> bool {
    err.kind == FsErrorKind::Permission
}

/// Convert FsError to std::io::Error for compatibility.
impl From<FsError> for io::Error {
    fn from(e: FsError) -> Self {
        let kind = match e.kind {
            FsErrorKind::NotExist => io::ErrorKind::NotFound,
            FsErrorKind::Exist | FsErrorKind::RootExists => io::ErrorKind::AlreadyExists,
            FsErrorKind::NotDir => io::ErrorKind::NotADirectory,
            FsErrorKind::IsDir => io::ErrorKind::IsADirectory,
            FsErrorKind::Permission | FsErrorKind::IsRoot => io::ErrorKind::PermissionDenied,
            FsErrorKind::DirNotEmpty => io::ErrorKind::DirectoryNotEmpty,
            FsErrorKind::InvalidOffset
            | FsErrorKind::NegativeOffset
            | FsErrorKind::InvalidWhence
            | FsErrorKind::InvalidPath
            | FsErrorKind::NameTooLong => io::ErrorKind::InvalidInput,
            FsErrorKind::Closed => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, e)
    }
}

/// Filesystem result type.
pub type FsResult<T> = Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FsError::not_exist(Operation::Open, "/file.txt");
        assert_eq!(err.to_string(), "open /file.txt: file does not exist");

        let err = FsError::new(Operation::RemoveAll, "/a", FsErrorKind::IsRoot);
        assert_eq!(err.to_string(), "removeall /a: operation not permitted on root");
    }

    #[test]
    fn test_predicates() {
        let err = FsError::not_exist(Operation::Stat, "/x");
        assert!(is_not_exist(&err));
        assert!(!is_exist(&err));
        assert!(!is_dir(&err));

        assert!(is_exist(&FsError::exist(Operation::Mkdir, "/x")));
        assert!(is_dir(&FsError::is_dir(Operation::Open, "/x")));
        assert!(is_not_dir(&FsError::not_dir(Operation::ReadDir, "/x")));
        assert!(is_dir_not_empty(&FsError::new(
            Operation::Remove,
            "/x",
            FsErrorKind::DirNotEmpty
        )));
        assert!(is_permission(&FsError::new(
            Operation::Open,
            "/x",
            FsErrorKind::Permission
        )));
        assert!(!is_permission(&err));
    }

    #[test]
    fn test_operation_strings() {
        assert_eq!(Operation::ReadDir.to_string(), "readdir");
        assert_eq!(Operation::WriteFile.to_string(), "writefile");
        let op: Operation = "removeall".parse().unwrap();
        assert_eq!(op, Operation::RemoveAll);
    }

    #[test]
    fn test_into_io_error() {
        let io_err: io::Error = FsError::not_exist(Operation::Open, "/nope").into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);

        let io_err: io::Error = FsError::negative_offset(Operation::Seek, "f").into();
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
    }
}
