//! # memfs
//!
//! An in-memory hierarchical filesystem. Directories and files exist only
//! as nodes in process memory and never touch disk, which makes it useful
//! for tests, sandboxes and virtual overlays.
//!
//! Key components:
//!
//! - [`FileSystem`] - Owns the tree and coordinates every tree operation
//! - [`File`] - A file node and the handle used for byte-level I/O
//! - [`FsError`] - Operation, path and classified [`FsErrorKind`]
//! - [`path`] - Lexical path normalization
//!
//! ## Design Decisions
//!
//! - **One tree lock**: a single reader/writer lock guards the whole tree.
//!   Each operation holds it for its full duration.
//! - **Per-file lock**: content and cursor have their own mutex, so handle
//!   I/O never contends on the tree lock.
//! - **Shared cursor**: every open of a path returns the same file. Two
//!   live handles to one path read and write through one position, which
//!   rewinds once the last of them is closed.
//!
//! ```
//! use memfs::{FileSystem, Whence};
//!
//! let fs = FileSystem::new();
//! fs.mkdir("/usr/local/bin").unwrap();
//!
//! let file = fs.create("/usr/local/bin/hello.txt").unwrap();
//! file.write(b"Hello, World!").unwrap();
//! file.seek(0, Whence::Start).unwrap();
//!
//! let mut buf = [0u8; 5];
//! file.read(&mut buf).unwrap();
//! assert_eq!(&buf, b"Hello");
//! file.close().unwrap();
//!
//! assert_eq!(fs.read_file("/usr/local/bin/hello.txt").unwrap(), b"Hello, World!");
//! ```

pub mod config;
mod error;
mod file;
mod fs;
mod node;
pub mod path;
mod types;

pub use config::{ConfigError, FsConfig};
pub use error::{
    FsError, FsErrorKind, FsResult, Operation, is_dir, is_dir_not_empty, is_exist, is_not_dir,
    is_not_exist, is_permission,
};
pub use file::File;
pub use fs::FileSystem;
pub use node::FsNode;
pub use types::{DirEntry, FileType, FsInfo, Whence};
