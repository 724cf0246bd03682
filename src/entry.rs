use std::path::{Component, Path};

use crate::state::ItemType;

/// A filesystem entry as the classifier sees it.
///
/// Not tied to any walker: build one from a directory walk or by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path relative to the traversal root, `/`-separated, no trailing `/`.
    pub path: String,

    /// File or folder. A symlink takes the kind of its target.
    pub kind: ItemType,

    /// Nesting level below the root. Top-level entries are at depth 0.
    pub depth: usize,

    /// Size in bytes. Zero for folders and for symlinks that are not followed.
    pub size: u64,

    /// Whether the entry itself is a symbolic link.
    pub is_symlink: bool,
}

impl Entry {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self::new(path.into(), ItemType::File, size)
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self::new(path.into(), ItemType::Folder, 0)
    }

    /// Mark the entry as a symbolic link.
    pub fn symlink(mut self, yes: bool) -> Self {
        self.is_symlink = yes;
        self
    }

    /// Build an entry from a path relative to the root, in platform form.
    pub fn from_relative(relative: &Path, kind: ItemType, size: u64) -> Self {
        Self::new(slash_path(relative), kind, size)
    }

    fn new(path: String, kind: ItemType, size: u64) -> Self {
        let path = path.trim_end_matches('/').to_string();
        let depth = path.matches('/').count();
        Self { path, kind, depth, size, is_symlink: false }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == ItemType::Folder
    }

    /// Path as handed to the specificity comparator: folders carry a
    /// trailing `/`.
    pub(crate) fn typed_path(&self) -> String {
        match self.kind {
            ItemType::Folder => format!("{}/", self.path),
            ItemType::File => self.path.clone(),
        }
    }
}

/// Join the normal components of `path` with `/`.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
