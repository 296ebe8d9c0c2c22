// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{validate_relative_path, DirEntry, Directory, Permission};
use crate::store::StoreError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteDurability {
    /// Each resource file goes to a `.proteus.tmp.*` sibling and is renamed over its target.
    /// A crash can lose the latest save but never leaves a half-written resource file.
    #[default]
    BestEffort,

    /// As [`BestEffort`](Self::BestEffort), plus an fsync of the temp file before the rename
    /// and of the parent directory after it (Unix only), so a finished sync survives power
    /// loss. Set with `durability: durable` or `--durable-writes`.
    Durable,
}

/// A directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    root: PathBuf,
    durability: WriteDurability,
}

impl FsDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        if relative.is_empty() {
            return Ok(self.root.clone());
        }
        validate_relative_path(relative)?;
        Ok(relative
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part)))
    }

    async fn create_dir_all_safe(&self, relative: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|source| io_error(&self.root, source))?;
        if relative.is_empty() {
            return Ok(());
        }
        validate_relative_path(relative)?;

        let mut current = self.root.clone();
        for part in relative.split('/') {
            current.push(part);

            match fs::symlink_metadata(&current).await {
                Ok(md) => {
                    if md.file_type().is_symlink() {
                        return Err(StoreError::SymlinkRefused {
                            path: current.display().to_string(),
                        });
                    }
                    if !md.is_dir() {
                        return Err(io_error(
                            &current,
                            io::Error::new(io::ErrorKind::AlreadyExists, "expected directory"),
                        ));
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    fs::create_dir(&current)
                        .await
                        .map_err(|source| io_error(&current, source))?;
                }
                Err(source) => return Err(io_error(&current, source)),
            }
        }

        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> StoreError {
    StoreError::io(path.display().to_string(), source)
}

async fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to).await {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to).await;
                fs::rename(from, to).await
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to).await
    }
}

impl Directory for FsDirectory {
    fn label(&self) -> String {
        self.root.display().to_string()
    }

    /// A missing root counts as granted when its nearest existing ancestor is writable.
    async fn permission(&self) -> Permission {
        let mut candidate = Some(self.root.as_path());
        while let Some(path) = candidate {
            match fs::metadata(path).await {
                Ok(md) if md.is_dir() && !md.permissions().readonly() => {
                    return Permission::Granted
                }
                Ok(_) => return Permission::Denied,
                Err(err) if err.kind() == io::ErrorKind::NotFound => candidate = path.parent(),
                Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                    return Permission::Denied
                }
                Err(_) => return Permission::Prompt,
            }
        }
        Permission::Prompt
    }

    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        let path = self.resolve(dir)?;
        let mut read_dir = fs::read_dir(&path)
            .await
            .map_err(|source| io_error(&path, source))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|source| io_error(&path, source))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|source| io_error(&entry.path(), source))?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if file_type.is_dir() {
                entries.push(DirEntry::dir(name));
            } else if file_type.is_file() {
                entries.push(DirEntry::file(name));
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn read_to_string(&self, path: &str) -> Result<String, StoreError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full)
            .await
            .map_err(|source| io_error(&full, source))
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StoreError> {
        validate_relative_path(path)?;
        let (parent_rel, name) = path.rsplit_once('/').unwrap_or(("", path));
        self.create_dir_all_safe(parent_rel).await?;

        let full = self.resolve(path)?;
        match fs::symlink_metadata(&full).await {
            Ok(md) if md.file_type().is_symlink() => {
                return Err(StoreError::SymlinkRefused {
                    path: full.display().to_string(),
                });
            }
            Ok(_) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(io_error(&full, source)),
        }

        let parent = self.resolve(parent_rel)?;
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tmp_path = parent.join(format!(".proteus.tmp.{name}.{nanos}"));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;

        file.write_all(contents)
            .await
            .map_err(|source| io_error(&tmp_path, source))?;
        file.flush()
            .await
            .map_err(|source| io_error(&tmp_path, source))?;

        if self.durability == WriteDurability::Durable {
            file.sync_all()
                .await
                .map_err(|source| io_error(&tmp_path, source))?;
        }
        drop(file);

        if let Err(source) = rename_overwrite(&tmp_path, &full).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(io_error(&full, source));
        }

        if self.durability == WriteDurability::Durable {
            #[cfg(unix)]
            {
                let dir = fs::File::open(&parent)
                    .await
                    .map_err(|source| io_error(&parent, source))?;
                dir.sync_all()
                    .await
                    .map_err(|source| io_error(&parent, source))?;
            }
        }

        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<(), StoreError> {
        validate_relative_path(path)?;
        let full = self.resolve(path)?;
        fs::remove_file(&full)
            .await
            .map_err(|source| io_error(&full, source))
    }
}

#[cfg(test)]
mod tests {
    use super::{FsDirectory, WriteDurability};
    use crate::store::dir::{Directory, DirEntry, Permission};
    use crate::store::StoreError;

    #[test]
    fn durability_defaults_to_best_effort_and_reads_snake_case() {
        assert_eq!(FsDirectory::new("ws").durability(), WriteDurability::BestEffort);
        let parsed: WriteDurability = serde_yaml::from_str("durable").expect("durable");
        assert_eq!(parsed, WriteDurability::Durable);
        let parsed: WriteDurability = serde_yaml::from_str("best_effort").expect("best_effort");
        assert_eq!(parsed, WriteDurability::BestEffort);
    }

    #[tokio::test]
    async fn write_creates_parents_and_leaves_no_temp_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = FsDirectory::new(temp.path().join("ws")).with_durability(WriteDurability::Durable);

        dir.write("odcs/acme_sales_orders.odcs.yaml", b"name: orders\n")
            .await
            .expect("write");
        dir.write("odcs/acme_sales_orders.odcs.yaml", b"name: orders v2\n")
            .await
            .expect("overwrite");

        assert_eq!(
            dir.read_to_string("odcs/acme_sales_orders.odcs.yaml")
                .await
                .expect("read"),
            "name: orders v2\n"
        );
        assert_eq!(
            dir.list("odcs").await.expect("list"),
            vec![DirEntry::file("acme_sales_orders.odcs.yaml")]
        );
        assert_eq!(dir.list("").await.expect("list root"), vec![DirEntry::dir("odcs")]);
    }

    #[tokio::test]
    async fn missing_root_under_writable_parent_is_granted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = FsDirectory::new(temp.path().join("not").join("yet"));
        assert_eq!(dir.permission().await, Permission::Granted);
    }

    #[tokio::test]
    async fn remove_file_reports_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = FsDirectory::new(temp.path());
        let err = dir.remove_file("gone.odps.yaml").await.unwrap_err();
        assert!(err.is_not_found(), "{err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn write_refuses_symlinked_targets() {
        let temp = tempfile::tempdir().expect("tempdir");
        let outside = tempfile::tempdir().expect("outside");
        std::os::unix::fs::symlink(outside.path(), temp.path().join("odcs")).expect("symlink");

        let dir = FsDirectory::new(temp.path());
        let err = dir.write("odcs/a.odcs.yaml", b"x").await.unwrap_err();
        assert!(matches!(err, StoreError::SymlinkRefused { .. }), "{err:?}");
        assert!(dir.list("").await.expect("list").is_empty());
    }
}
