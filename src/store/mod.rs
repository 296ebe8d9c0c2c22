// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for workspaces on disk.
//!
//! Loading walks a directory, detects the layout, routes files to their domains, decodes them,
//! links tables and assets to systems and assembles one [`Workspace`](crate::model::Workspace).
//! Saving partitions a workspace into file records and synchronizes a directory (or a zip
//! archive) to them. [`WorkspaceFolder`] is the entry point for both.

pub mod archive;
pub mod assemble;
pub mod categorize;
pub mod detect;
pub mod dir;
pub mod documents;
mod error;
pub mod legacy;
pub mod linkage;
pub mod loader;
pub mod manifest;
pub mod report;
pub mod serialize;
pub mod sync;
pub mod workspace_folder;

pub use detect::WorkspaceLayout;
pub use dir::{
    Directory, DirectoryPicker, FsDirectory, MemoryDirectory, Permission, PresetPicker,
    WriteDurability,
};
pub use error::StoreError;
pub use linkage::{LinkStrategy, LinkageResolver};
pub use report::{LoadIssue, LoadReport};
pub use serialize::{FileRecord, SaveLayout};
pub use sync::SyncReport;
pub use workspace_folder::{
    LoadedWorkspace, SaveMode, SaveOutcome, WorkspaceFolder, WorkspaceStore,
};
