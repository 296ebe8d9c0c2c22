// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{validate_relative_path, DirEntry, Directory, EntryKind, Permission};
use crate::store::serialize::FileRecord;
use crate::store::StoreError;

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<String, Vec<u8>>,
    failing_writes: BTreeSet<String>,
    failing_removals: BTreeSet<String>,
    permission: Permission,
    writes: usize,
    removals: usize,
}

/// An in-memory directory tree.
///
/// Clones share the same tree. Used for archives and tests; failures can be injected per path.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[FileRecord]) -> Self {
        let dir = Self::new();
        for record in records {
            dir.insert(&record.path, record.contents.as_bytes());
        }
        dir
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn insert(&self, path: &str, contents: impl AsRef<[u8]>) {
        self.lock()
            .files
            .insert(path.to_owned(), contents.as_ref().to_vec());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().files.contains_key(path)
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.lock()
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every file path, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.lock().files.keys().cloned().collect()
    }

    pub fn files(&self) -> BTreeMap<String, Vec<u8>> {
        self.lock().files.clone()
    }

    pub fn fail_writes_to(&self, path: &str) {
        self.lock().failing_writes.insert(path.to_owned());
    }

    pub fn fail_removal_of(&self, path: &str) {
        self.lock().failing_removals.insert(path.to_owned());
    }

    pub fn set_permission(&self, permission: Permission) {
        self.lock().permission = permission;
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn removal_count(&self) -> usize {
        self.lock().removals
    }
}

fn not_found(path: &str) -> StoreError {
    StoreError::io(path, io::Error::from(io::ErrorKind::NotFound))
}

fn check_writable(state: &MemoryState, path: &str) -> Result<(), StoreError> {
    if state.permission != Permission::Granted {
        return Err(StoreError::io(
            path,
            io::Error::from(io::ErrorKind::PermissionDenied),
        ));
    }
    Ok(())
}

impl Directory for MemoryDirectory {
    fn label(&self) -> String {
        "<memory>".to_owned()
    }

    async fn permission(&self) -> Permission {
        self.lock().permission
    }

    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            validate_relative_path(dir)?;
            format!("{dir}/")
        };

        let state = self.lock();
        let mut children: BTreeMap<&str, EntryKind> = BTreeMap::new();
        for path in state.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child, EntryKind::Dir);
                }
                None => {
                    children.entry(rest).or_insert(EntryKind::File);
                }
            }
        }

        if children.is_empty() && !dir.is_empty() {
            return Err(not_found(dir));
        }

        Ok(children
            .into_iter()
            .map(|(name, kind)| DirEntry {
                name: name.to_owned(),
                kind,
            })
            .collect())
    }

    async fn read_to_string(&self, path: &str) -> Result<String, StoreError> {
        validate_relative_path(path)?;
        let state = self.lock();
        let bytes = state.files.get(path).ok_or_else(|| not_found(path))?;
        String::from_utf8(bytes.clone()).map_err(|err| {
            StoreError::io(path, io::Error::new(io::ErrorKind::InvalidData, err))
        })
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StoreError> {
        validate_relative_path(path)?;
        let mut state = self.lock();
        check_writable(&state, path)?;
        if state.failing_writes.contains(path) {
            return Err(StoreError::io(path, io::Error::other("injected write failure")));
        }
        state.files.insert(path.to_owned(), contents.to_vec());
        state.writes += 1;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<(), StoreError> {
        validate_relative_path(path)?;
        let mut state = self.lock();
        check_writable(&state, path)?;
        if state.failing_removals.contains(path) {
            return Err(StoreError::io(
                path,
                io::Error::other("injected removal failure"),
            ));
        }
        state.files.remove(path).ok_or_else(|| not_found(path))?;
        state.removals += 1;
        Ok(())
    }
}
