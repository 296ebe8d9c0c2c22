// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use super::archive::{pack_archive, unpack_archive};
use super::assemble::{assemble, Assembled};
use super::detect::{detect_layout, WorkspaceLayout};
use super::dir::{walk, Directory, DirectoryPicker, FsDirectory, Permission};
use super::legacy::load_legacy;
use super::loader::{load_flat, LoadedParts};
use super::report::LoadReport;
use super::serialize::{FileRecord, WorkspaceSerializer};
use super::sync::{sync, SyncReport};
use super::StoreError;
use crate::config::EngineConfig;
use crate::format::{DefaultFormatEngine, FormatEngine};
use crate::model::Workspace;

/// The editor-side holder of the current workspace.
///
/// Loading replaces its contents wholesale; saving reads a snapshot.
pub trait WorkspaceStore {
    fn snapshot(&self) -> Workspace;

    fn replace(&mut self, workspace: Workspace);
}

impl WorkspaceStore for Workspace {
    fn snapshot(&self) -> Workspace {
        self.clone()
    }

    fn replace(&mut self, workspace: Workspace) {
        *self = workspace;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedWorkspace {
    pub workspace: Workspace,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// The user asked for the save; losing access is an error.
    Manual,
    /// Background save; losing access skips the save silently.
    Autosave,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(SyncReport),
    /// Autosave without write access. Nothing was written.
    Skipped,
    /// The directory picker was dismissed.
    Cancelled,
}

/// Loads and saves whole workspaces through a [`Directory`].
#[derive(Clone)]
pub struct WorkspaceFolder {
    config: EngineConfig,
    engine: Arc<dyn FormatEngine>,
}

impl std::fmt::Debug for WorkspaceFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceFolder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for WorkspaceFolder {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl WorkspaceFolder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: Arc::new(DefaultFormatEngine),
        }
    }

    pub fn with_format_engine(mut self, engine: Arc<dyn FormatEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A filesystem directory using the configured write durability.
    pub fn open_fs(&self, root: impl Into<PathBuf>) -> FsDirectory {
        FsDirectory::new(root).with_durability(self.config.durability)
    }

    /// Reads a workspace in either layout.
    ///
    /// Unreadable or malformed resource files are skipped and listed in the report; only a
    /// missing or unparsable manifest, duplicate ids or an unreadable root fail the load.
    pub async fn load<D: Directory>(&self, dir: &D) -> Result<LoadedWorkspace, StoreError> {
        let paths = walk(dir, self.config.scan_depth).await?;
        let layout = detect_layout(paths.iter().map(String::as_str))?;
        tracing::debug!(dir = %dir.label(), %layout, files = paths.len(), "loading workspace");

        let engine = self.engine.as_ref();
        let LoadedParts {
            header,
            mut domains,
            global,
            relationships,
            mut report,
        } = match layout {
            WorkspaceLayout::Flat => load_flat(dir, engine, &paths).await?,
            WorkspaceLayout::Folder => load_legacy(dir, engine, &paths).await?,
        };

        let resolver = self.config.linkage_resolver();
        for result in &mut domains {
            resolver.link_domain(result);
        }

        let Assembled { workspace, issues } = assemble(header, domains, global, relationships)?;
        report.issues.extend(issues);

        tracing::info!(
            workspace = %workspace.name,
            %layout,
            domains = workspace.domains.len(),
            tables = workspace.tables.len(),
            relationships = workspace.relationships.len(),
            files_read = report.files_read,
            skipped = report.skipped().count(),
            "workspace loaded"
        );
        Ok(LoadedWorkspace { workspace, report })
    }

    /// Loads `dir` and hands the result to `store`. The store is untouched on failure.
    pub async fn load_into<D, S>(&self, dir: &D, store: &mut S) -> Result<LoadReport, StoreError>
    where
        D: Directory,
        S: WorkspaceStore + ?Sized,
    {
        let LoadedWorkspace { workspace, report } = self.load(dir).await?;
        store.replace(workspace);
        Ok(report)
    }

    pub fn serialize(&self, workspace: &Workspace) -> Result<Vec<FileRecord>, StoreError> {
        WorkspaceSerializer::new(self.engine.as_ref(), self.config.layout)
            .with_readme(self.config.readme)
            .serialize(workspace)
    }

    /// Serializes `workspace` and synchronizes `dir` to it.
    pub async fn save<D: Directory>(
        &self,
        workspace: &Workspace,
        dir: &D,
        mode: SaveMode,
    ) -> Result<SaveOutcome, StoreError> {
        let permission = dir.permission().await;
        if permission != Permission::Granted {
            return match mode {
                SaveMode::Autosave => {
                    tracing::debug!(dir = %dir.label(), ?permission, "autosave skipped");
                    Ok(SaveOutcome::Skipped)
                }
                SaveMode::Manual => Err(StoreError::PermissionDenied { path: dir.label() }),
            };
        }

        let records = self.serialize(workspace)?;
        match sync(&records, dir).await {
            Ok(report) => {
                tracing::info!(
                    workspace = %workspace.name,
                    dir = %dir.label(),
                    written = report.written,
                    deleted = report.deleted.len(),
                    failed_deletions = report.failed_deletions.len(),
                    "workspace saved"
                );
                Ok(SaveOutcome::Saved(report))
            }
            Err(err) if err.is_permission_denied() => match mode {
                SaveMode::Autosave => {
                    tracing::warn!(dir = %dir.label(), %err, "write access lost; autosave skipped");
                    Ok(SaveOutcome::Skipped)
                }
                SaveMode::Manual => Err(StoreError::PermissionDenied { path: dir.label() }),
            },
            Err(err) => Err(err),
        }
    }

    pub async fn save_from<D, S>(
        &self,
        store: &S,
        dir: &D,
        mode: SaveMode,
    ) -> Result<SaveOutcome, StoreError>
    where
        D: Directory,
        S: WorkspaceStore + ?Sized,
    {
        let workspace = store.snapshot();
        self.save(&workspace, dir, mode).await
    }

    /// Asks `picker` for a directory and saves there. A dismissed picker is not an error;
    /// callers may fall back to [`WorkspaceFolder::export_archive`].
    pub async fn save_with_picker<P: DirectoryPicker>(
        &self,
        workspace: &Workspace,
        picker: &P,
        mode: SaveMode,
    ) -> Result<SaveOutcome, StoreError> {
        let Some(dir) = picker.pick().await? else {
            tracing::debug!("directory picker cancelled");
            return Ok(SaveOutcome::Cancelled);
        };
        self.save(workspace, &dir, mode).await
    }

    /// The same files a save would write, packed into a zip archive.
    pub fn export_archive(&self, workspace: &Workspace) -> Result<Vec<u8>, StoreError> {
        let records = self.serialize(workspace)?;
        let bytes = pack_archive(&records)?;
        tracing::info!(
            workspace = %workspace.name,
            files = records.len(),
            bytes = bytes.len(),
            "workspace archived"
        );
        Ok(bytes)
    }

    pub async fn load_archive(&self, bytes: &[u8]) -> Result<LoadedWorkspace, StoreError> {
        let dir = unpack_archive(bytes)?;
        self.load(&dir).await
    }
}

#[cfg(test)]
mod tests;
