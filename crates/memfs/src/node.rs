//! Tree nodes.
//!
//! A [`Node`] is either a [`File`] or a [`Directory`]. Directories own their
//! children by value, so detaching a directory from its parent drops the
//! whole subtree. Files are shared handles: the tree holds one clone and
//! every create/open hands out another.

use std::collections::HashMap;
use std::time::SystemTime;

use crate::file::File;
use crate::types::{DirEntry, FileType};

/// Capability contract shared by every node kind.
pub trait FsNode {
    fn name(&self) -> String;
    fn is_dir(&self) -> bool;
    fn created_at(&self) -> SystemTime;
    fn updated_at(&self) -> SystemTime;
}

#[derive(Debug)]
pub(crate) enum Node {
    File(File),
    Directory(Directory),
}

impl Node {
    pub(crate) fn kind(&self) -> FileType {
        match self {
            Node::File(_) => FileType::File,
            Node::Directory(_) => FileType::Directory,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Node::File(file) => file.set_name(name),
            Node::Directory(dir) => dir.name = name,
        }
    }

    pub(crate) fn dir_entry(&self) -> DirEntry {
        DirEntry {
            name: self.name(),
            kind: self.kind(),
            created_at: self.created_at(),
            updated_at: self.updated_at(),
        }
    }
}

impl FsNode for Node {
    fn name(&self) -> String {
        match self {
            Node::File(file) => file.name(),
            Node::Directory(dir) => dir.name(),
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    fn created_at(&self) -> SystemTime {
        match self {
            Node::File(file) => file.created_at(),
            Node::Directory(dir) => dir.created_at(),
        }
    }

    fn updated_at(&self) -> SystemTime {
        match self {
            Node::File(file) => file.updated_at(),
            Node::Directory(dir) => dir.updated_at(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Directory {
    pub(crate) name: String,
    pub(crate) children: HashMap<String, Node>,
    pub(crate) created_at: SystemTime,
    pub(crate) updated_at: SystemTime,
}

impl Directory {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let now = SystemTime::now();
        Self {
            name: name.into(),
            children: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Sum of content lengths of every file beneath this directory.
    pub(crate) fn total_size(&self) -> u64 {
        self.children
            .values()
            .map(|child| match child {
                Node::File(file) => file.size() as u64,
                Node::Directory(dir) => dir.total_size(),
            })
            .sum()
    }
}

impl FsNode for Directory {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_dir(&self) -> bool {
        true
    }

    fn created_at(&self) -> SystemTime {
        self.created_at
    }

    fn updated_at(&self) -> SystemTime {
        self.updated_at
    }
}

impl FsNode for DirEntry {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    fn created_at(&self) -> SystemTime {
        self.created_at
    }

    fn updated_at(&self) -> SystemTime {
        self.updated_at
    }
}
