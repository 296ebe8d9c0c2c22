// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Directory handles the store reads from and writes to.
//!
//! Paths are always relative to the handle root and `/`-separated. The empty path is the
//! root itself.

pub mod fs;
pub mod memory;

use std::collections::VecDeque;

use super::StoreError;

pub use fs::{FsDirectory, WriteDurability};
pub use memory::MemoryDirectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Dir,
        }
    }
}

/// Access state of a previously granted handle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    #[default]
    Granted,
    /// Access must be re-confirmed by the user before writing.
    Prompt,
    Denied,
}

/// A writable directory tree.
///
/// Execution is single-threaded and cooperative, so the returned futures are not required to
/// be `Send`.
#[allow(async_fn_in_trait)]
pub trait Directory {
    /// Human-readable location used in logs and errors.
    fn label(&self) -> String;

    async fn permission(&self) -> Permission;

    /// Immediate children of `dir`. Symlinks are not reported.
    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError>;

    async fn read_to_string(&self, path: &str) -> Result<String, StoreError>;

    /// Writes `contents`, creating parent directories as needed.
    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StoreError>;

    async fn remove_file(&self, path: &str) -> Result<(), StoreError>;
}

/// Source of a directory handle, e.g. an interactive folder picker.
#[allow(async_fn_in_trait)]
pub trait DirectoryPicker {
    type Directory: Directory;

    /// `Ok(None)` means the user cancelled.
    async fn pick(&self) -> Result<Option<Self::Directory>, StoreError>;
}

/// A picker that hands out a preselected directory (or reports cancellation).
#[derive(Debug, Clone)]
pub struct PresetPicker<D>(pub Option<D>);

impl<D: Directory + Clone> DirectoryPicker for PresetPicker<D> {
    type Directory = D;

    async fn pick(&self) -> Result<Option<D>, StoreError> {
        Ok(self.0.clone())
    }
}

pub fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

pub fn file_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

pub fn parent_path(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(parent, _)| parent)
}

pub fn validate_relative_path(path: &str) -> Result<(), StoreError> {
    let invalid = || StoreError::InvalidRelativePath {
        path: path.to_owned(),
    };

    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(invalid());
    }
    for component in path.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(invalid());
        }
    }
    if path.split('/').next().is_some_and(|first| first.ends_with(':')) {
        return Err(invalid());
    }
    Ok(())
}

/// Lists every file up to `max_depth` directory levels below the root.
///
/// Breadth-first over an explicit queue. Hidden entries (leading `.`) are skipped; an
/// unreadable subdirectory is logged and skipped, an unreadable root is an error.
pub async fn walk<D: Directory>(dir: &D, max_depth: usize) -> Result<Vec<String>, StoreError> {
    let mut files = Vec::new();
    let mut queue = VecDeque::from([(String::new(), 0_usize)]);

    while let Some((path, depth)) = queue.pop_front() {
        let entries = match dir.list(&path).await {
            Ok(entries) => entries,
            Err(err) if path.is_empty() => return Err(err),
            Err(err) => {
                tracing::warn!(dir = %path, %err, "skipping unreadable directory");
                continue;
            }
        };

        for entry in entries {
            if entry.name.starts_with('.') {
                continue;
            }
            let child = join_path(&path, &entry.name);
            match entry.kind {
                EntryKind::File => files.push(child),
                EntryKind::Dir if depth < max_depth => queue.push_back((child, depth + 1)),
                EntryKind::Dir => {}
            }
        }
    }

    files.sort();
    Ok(files)
}
