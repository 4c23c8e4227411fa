//! The filesystem coordinator.
//!
//! [`FileSystem`] owns the root directory behind a single
//! `parking_lot::RwLock`. Tree mutations (mkdir, create, remove, remove_all,
//! rename) hold it exclusively for the whole call; lookups (stat, read_dir,
//! dir_size, read_file, open) hold it shared for the whole call, so a node
//! cannot be swapped out between lookup and follow-up.
//!
//! The open-file counter is an atomic shared with every [`File`] the
//! filesystem hands out, independent of the tree lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::config::FsConfig;
use crate::error::{FsError, FsErrorKind, FsResult, Operation};
use crate::file::File;
use crate::node::{Directory, Node};
use crate::path::{self, NodeRef};
use crate::types::{DirEntry, FsInfo};

/// An in-memory hierarchical filesystem.
///
/// Thread-safe; share it behind an `Arc`. All data is lost when dropped.
#[derive(Debug)]
pub struct FileSystem {
    root: RwLock<Directory>,
    open_files: Arc<AtomicUsize>,
    config: FsConfig,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Create an empty filesystem holding only the root directory.
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    /// Create an empty filesystem with the given settings.
    pub fn with_config(config: FsConfig) -> Self {
        Self {
            root: RwLock::new(Directory::new("/")),
            open_files: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    /// Settings this filesystem was built with.
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// Number of handles returned by create/open and not yet closed.
    pub fn open_file_count(&self) -> usize {
        self.open_files.load(Ordering::SeqCst)
    }

    /// Create a directory, creating any missing ancestors first.
    pub fn mkdir(&self, path: &str) -> FsResult<()> {
        let components = path::normalize(path);
        if components.is_empty() {
            return Err(FsError::new(Operation::Mkdir, "/", FsErrorKind::RootExists));
        }
        self.validate_names(Operation::Mkdir, &components)?;

        let mut root = self.root.write();
        mkdir_locked(&mut root, &components)?;
        debug!(path = %path::join(&components), "mkdir");
        Ok(())
    }

    /// Create a file, or truncate it if it already exists.
    ///
    /// Returns a handle and counts it as open.
    pub fn create(&self, path: &str) -> FsResult<File> {
        let components = path::normalize(path);
        let clean = path::join(&components);
        if components.is_empty() {
            return Err(FsError::is_dir(Operation::Create, clean));
        }
        self.validate_names(Operation::Create, &components)?;

        let mut root = self.root.write();
        let (parent, name) = path::resolve_parent_mut(&mut root, &components)?;
        let file = match parent.children.get(name) {
            Some(Node::Directory(_)) => return Err(FsError::is_dir(Operation::Create, clean)),
            Some(Node::File(existing)) => {
                existing.reset();
                debug!(path = %clean, "create: truncated existing file");
                existing.clone()
            }
            None => {
                let file = File::new(name, self.open_files.clone());
                parent
                    .children
                    .insert(name.to_string(), Node::File(file.clone()));
                parent.touch();
                debug!(path = %clean, "create");
                file
            }
        };

        file.acquire();
        Ok(file)
    }

    /// Open an existing file.
    ///
    /// Every open of the same path returns the same file, so live handles
    /// share one cursor. An open with no other live handle starts at offset 0.
    pub fn open(&self, path: &str) -> FsResult<File> {
        let components = path::normalize(path);
        let root = self.root.read();
        match path::resolve(&root, &components)? {
            NodeRef::Dir(_) => Err(FsError::is_dir(Operation::Open, path::join(&components))),
            NodeRef::File(file) => {
                file.acquire();
                Ok(file.clone())
            }
        }
    }

    /// Metadata snapshot for a path.
    pub fn stat(&self, path: &str) -> FsResult<FsInfo> {
        let components = path::normalize(path);
        let root = self.root.read();
        Ok(path::resolve(&root, &components)?.info())
    }

    /// Returns true if a node exists at `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// Total bytes of every file beneath a directory.
    pub fn dir_size(&self, path: &str) -> FsResult<u64> {
        let components = path::normalize(path);
        let root = self.root.read();
        match path::resolve(&root, &components)? {
            NodeRef::Dir(dir) => Ok(dir.total_size()),
            NodeRef::File(_) => Err(FsError::not_dir(
                Operation::DirSize,
                path::join(&components),
            )),
        }
    }

    /// Immediate children of a directory, in no particular order.
    pub fn read_dir(&self, path: &str) -> FsResult<Vec<DirEntry>> {
        let components = path::normalize(path);
        let root = self.root.read();
        match path::resolve(&root, &components)? {
            NodeRef::Dir(dir) => Ok(path::entries(dir)),
            NodeRef::File(_) => Err(FsError::not_dir(
                Operation::ReadDir,
                path::join(&components),
            )),
        }
    }

    /// Copy of a file's entire content.
    pub fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let components = path::normalize(path);
        let root = self.root.read();
        match path::resolve(&root, &components)? {
            NodeRef::Dir(_) => Err(FsError::is_dir(
                Operation::ReadFile,
                path::join(&components),
            )),
            NodeRef::File(file) => Ok(file.content()),
        }
    }

    /// Create (or truncate) a file, write `data`, and close it.
    pub fn write_file(&self, path: &str, data: &[u8]) -> FsResult<()> {
        let file = self.create(path)?;
        let written = file.write(data);
        file.close()?;
        written.map(|_| ())
    }

    /// Remove a file or an empty directory.
    pub fn remove(&self, path: &str) -> FsResult<()> {
        let components = path::normalize(path);
        let clean = path::join(&components);
        if components.is_empty() {
            return Err(FsError::is_root(Operation::Remove, clean));
        }

        let mut root = self.root.write();
        let (parent, name) = path::resolve_parent_mut(&mut root, &components)?;
        match parent.children.get(name) {
            None => return Err(FsError::not_exist(Operation::Remove, clean)),
            Some(Node::Directory(dir)) if !dir.is_empty() => {
                return Err(FsError::new(
                    Operation::Remove,
                    clean,
                    FsErrorKind::DirNotEmpty,
                ));
            }
            Some(_) => {}
        }

        parent.children.remove(name);
        parent.touch();
        debug!(path = %clean, "remove");
        Ok(())
    }

    /// Remove a node and everything beneath it.
    ///
    /// On the root this empties the tree but keeps the root itself.
    pub fn remove_all(&self, path: &str) -> FsResult<()> {
        let components = path::normalize(path);
        let clean = path::join(&components);
        let mut root = self.root.write();

        if components.is_empty() {
            root.children.clear();
            root.touch();
            debug!("remove_all: cleared root");
            return Ok(());
        }

        let (parent, name) = path::resolve_parent_mut(&mut root, &components)?;
        if parent.children.remove(name).is_none() {
            return Err(FsError::not_exist(Operation::RemoveAll, clean));
        }
        parent.touch();
        debug!(path = %clean, "remove_all");
        Ok(())
    }

    /// Move a node to a new path. The destination must not exist.
    pub fn rename(&self, old_path: &str, new_path: &str) -> FsResult<()> {
        let old = path::normalize(old_path);
        let new = path::normalize(new_path);
        let old_clean = path::join(&old);
        let new_clean = path::join(&new);
        if old.is_empty() {
            return Err(FsError::is_root(Operation::Rename, old_clean));
        }
        if new.is_empty() {
            return Err(FsError::is_root(Operation::Rename, new_clean));
        }
        self.validate_names(Operation::Rename, &new)?;

        let mut root = self.root.write();
        {
            let (old_parent, old_name) = path::resolve_parent(&root, &old)?;
            if !old_parent.children.contains_key(old_name) {
                return Err(FsError::not_exist(Operation::Rename, old_clean));
            }
            let (new_parent, new_name) = path::resolve_parent(&root, &new)?;
            if new_parent.children.contains_key(new_name) {
                return Err(FsError::exist(Operation::Rename, new_clean));
            }
        }
        // a directory cannot become its own descendant
        if new.starts_with(&old) {
            return Err(FsError::new(
                Operation::Rename,
                new_clean,
                FsErrorKind::InvalidPath,
            ));
        }

        let (old_parent, old_name) = path::resolve_parent_mut(&mut root, &old)?;
        let mut node = old_parent
            .children
            .remove(old_name)
            .ok_or_else(|| FsError::not_exist(Operation::Rename, old_clean.clone()))?;
        old_parent.touch();

        // Destination parent was checked above under this same guard and
        // lies outside the detached subtree.
        let (new_parent, new_name) = path::resolve_parent_mut(&mut root, &new)?;
        node.set_name(new_name.to_string());
        new_parent.children.insert(new_name.to_string(), node);
        new_parent.touch();

        debug!(from = %old_clean, to = %new_clean, "rename");
        Ok(())
    }

    fn validate_names(&self, op: Operation, components: &[&str]) -> FsResult<()> {
        let clean = path::join(components);
        components
            .iter()
            .try_for_each(|name| path::validate_name(op, &clean, name, self.config.max_name_len))
    }
}

/// mkdir with the write guard already held. Missing ancestors are created
/// by recursing on the parent path; the public entry point is never
/// re-entered.
fn mkdir_locked(root: &mut Directory, components: &[&str]) -> FsResult<()> {
    if let Err(err) = path::resolve_parent(root, components) {
        if err.kind() != FsErrorKind::NotExist {
            return Err(err);
        }
        mkdir_locked(root, &components[..components.len() - 1])?;
    }

    let (parent, name) = path::resolve_parent_mut(root, components)?;
    if parent.children.contains_key(name) {
        return Err(FsError::exist(Operation::Mkdir, path::join(components)));
    }
    parent
        .children
        .insert(name.to_string(), Node::Directory(Directory::new(name)));
    parent.touch();
    Ok(())
}
