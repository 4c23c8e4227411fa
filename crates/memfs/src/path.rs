//! Path normalization and tree walking.
//!
//! Paths are plain `/`-separated strings. Normalization is lexical and does
//! not consult the host OS: empty segments and `.` are dropped, `..` pops
//! the previous component (and stays put at the root). Relative paths are
//! treated as relative to the root.

use crate::error::{FsError, FsErrorKind, FsResult, Operation};
use crate::file::File;
use crate::node::{Directory, FsNode, Node};
use crate::types::{DirEntry, FsInfo};

/// Split a path into its canonical components. The root yields none.
pub fn normalize(path: &str) -> Vec<&str> {
    let mut components = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            name => components.push(name),
        }
    }
    components
}

/// Canonical string form of a path: `/` for the root, else `/a/b`.
pub fn clean(path: &str) -> String {
    join(&normalize(path))
}

pub(crate) fn join(components: &[&str]) -> String {
    if components.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", components.join("/"))
    }
}

/// Check a component that is about to become a node name.
pub(crate) fn validate_name(op: Operation, path: &str, name: &str, max_len: usize) -> FsResult<()> {
    if name.contains('\0') {
        return Err(FsError::new(op, path, FsErrorKind::InvalidPath));
    }
    if name.len() > max_len {
        return Err(FsError::new(op, path, FsErrorKind::NameTooLong));
    }
    Ok(())
}

/// A resolved node: either a file or a directory (possibly the root).
#[derive(Debug, Clone, Copy)]
pub(crate) enum NodeRef<'a> {
    File(&'a File),
    Dir(&'a Directory),
}

impl NodeRef<'_> {
    pub(crate) fn info(&self) -> FsInfo {
        match self {
            NodeRef::File(file) => FsInfo {
                name: file.name(),
                is_dir: false,
                size: file.size() as u64,
                created_at: file.created_at(),
                updated_at: file.updated_at(),
            },
            NodeRef::Dir(dir) => FsInfo {
                name: dir.name(),
                is_dir: true,
                size: 0,
                created_at: dir.created_at(),
                updated_at: dir.updated_at(),
            },
        }
    }
}

/// Walk `components` from `root`, failing on a missing component or a
/// file in the middle of the path.
pub(crate) fn resolve<'a>(root: &'a Directory, components: &[&str]) -> FsResult<NodeRef<'a>> {
    let Some((last, parents)) = components.split_last() else {
        return Ok(NodeRef::Dir(root));
    };
    let dir = walk(root, parents, components)?;
    match dir.children.get(*last) {
        Some(Node::File(file)) => Ok(NodeRef::File(file)),
        Some(Node::Directory(dir)) => Ok(NodeRef::Dir(dir)),
        None => Err(FsError::not_exist(Operation::Stat, join(components))),
    }
}

/// Resolve the directory holding the last component, plus that component.
pub(crate) fn resolve_parent<'a, 'p>(
    root: &'a Directory,
    components: &[&'p str],
) -> FsResult<(&'a Directory, &'p str)> {
    let Some((last, parents)) = components.split_last() else {
        return Err(FsError::is_root(Operation::Stat, "/"));
    };
    Ok((walk(root, parents, components)?, *last))
}

/// Mutable counterpart of [`resolve_parent`].
pub(crate) fn resolve_parent_mut<'a, 'p>(
    root: &'a mut Directory,
    components: &[&'p str],
) -> FsResult<(&'a mut Directory, &'p str)> {
    let Some((last, parents)) = components.split_last() else {
        return Err(FsError::is_root(Operation::Stat, "/"));
    };
    Ok((walk_mut(root, parents, components)?, *last))
}

/// Collect immediate children of a directory as entries.
pub(crate) fn entries(dir: &Directory) -> Vec<DirEntry> {
    dir.children.values().map(Node::dir_entry).collect()
}

fn walk<'a>(root: &'a Directory, dirs: &[&str], full: &[&str]) -> FsResult<&'a Directory> {
    let mut dir = root;
    for (i, name) in dirs.iter().enumerate() {
        dir = match dir.children.get(*name) {
            Some(Node::Directory(child)) => child,
            Some(Node::File(_)) => {
                return Err(FsError::not_dir(Operation::Stat, join(&full[..=i])));
            }
            None => return Err(FsError::not_exist(Operation::Stat, join(full))),
        };
    }
    Ok(dir)
}

fn walk_mut<'a>(
    root: &'a mut Directory,
    dirs: &[&str],
    full: &[&str],
) -> FsResult<&'a mut Directory> {
    let mut dir = root;
    for (i, name) in dirs.iter().enumerate() {
        dir = match dir.children.get_mut(*name) {
            Some(Node::Directory(child)) => child,
            Some(Node::File(_)) => {
                return Err(FsError::not_dir(Operation::Stat, join(&full[..=i])));
            }
            None => return Err(FsError::not_exist(Operation::Stat, join(full))),
        };
    }
    Ok(dir)
}
