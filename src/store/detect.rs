// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;

use super::dir::file_name;
use super::StoreError;

/// Suffix of the flat-layout root manifest.
pub const MANIFEST_SUFFIX: &str = ".workspace.yaml";

/// Files whose presence inside a folder marks it as a legacy domain folder.
pub(crate) const LEGACY_DOMAIN_MARKERS: [&str; 2] = ["tables.yaml", "domain.yaml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceLayout {
    /// Legacy layout: one folder per domain with `domain.yaml`/`tables.yaml`.
    Folder,
    /// Current layout: a root `*.workspace.yaml` manifest plus typed files.
    Flat,
}

impl WorkspaceLayout {
    pub fn version(self) -> u8 {
        match self {
            Self::Folder => 1,
            Self::Flat => 2,
        }
    }
}

impl fmt::Display for WorkspaceLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => f.write_str("v1 (folder)"),
            Self::Flat => f.write_str("v2 (flat)"),
        }
    }
}

pub fn is_manifest_name(name: &str) -> bool {
    name.len() > MANIFEST_SUFFIX.len() && name.to_ascii_lowercase().ends_with(MANIFEST_SUFFIX)
}

fn is_legacy_marker(path: &str) -> bool {
    path.contains('/') && LEGACY_DOMAIN_MARKERS.contains(&file_name(path))
}

/// Classifies a set of relative file paths. Any manifest wins over legacy markers.
pub fn detect_layout<'a, I>(paths: I) -> Result<WorkspaceLayout, StoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut legacy = false;
    for path in paths {
        if is_manifest_name(file_name(path)) {
            return Ok(WorkspaceLayout::Flat);
        }
        legacy |= is_legacy_marker(path);
    }
    if legacy {
        Ok(WorkspaceLayout::Folder)
    } else {
        Err(StoreError::NoWorkspaceFound)
    }
}
