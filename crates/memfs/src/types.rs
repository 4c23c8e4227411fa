//! Snapshot types returned by the filesystem.
//!
//! These are plain copies taken under the tree lock. Holding one does not
//! keep anything locked and it does not change when the tree does.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Node type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

impl FileType {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, FileType::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, FileType::Directory)
    }
}

/// Immutable metadata snapshot returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FsInfo {
    /// Node name (not full path). The root is named `/`.
    pub name: String,
    pub is_dir: bool,
    /// Content length in bytes; always 0 for directories.
    pub size: u64,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Directory entry returned by `read_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: FileType,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

/// Reference point for [`File::seek`](crate::File::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Whence {
    /// Relative to the start of content.
    Start,
    /// Relative to the current cursor.
    Current,
    /// Relative to the end of content.
    End,
}

impl Whence {
    /// Map the conventional numeric whence (0, 1, 2) onto a variant.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Whence::Start),
            1 => Some(Whence::Current),
            2 => Some(Whence::End),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type() {
        assert!(FileType::File.is_file());
        assert!(!FileType::File.is_dir());
        assert!(FileType::Directory.is_dir());
    }

    #[test]
    fn test_whence_from_raw() {
        assert_eq!(Whence::from_raw(0), Some(Whence::Start));
        assert_eq!(Whence::from_raw(1), Some(Whence::Current));
        assert_eq!(Whence::from_raw(2), Some(Whence::End));
        assert_eq!(Whence::from_raw(3), None);
        assert_eq!(Whence::from_raw(-1), None);
    }
}
