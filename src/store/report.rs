// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;

use super::detect::WorkspaceLayout;
use crate::model::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkedEntity {
    Table,
    Asset,
}

impl fmt::Display for LinkedEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => f.write_str("table"),
            Self::Asset => f.write_str("asset"),
        }
    }
}

/// A non-fatal problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum LoadIssue {
    /// The file (or manifest entry) could not be turned into an entity.
    ResourceSkipped {
        path: String,
        kind: Option<ResourceKind>,
        reason: String,
    },
    /// The entity was attached to the first system of its domain for lack of a better signal.
    LinkageFallback {
        entity: LinkedEntity,
        id: String,
        name: String,
        system_id: String,
    },
    /// Neither endpoint table of the relationship was loaded.
    RelationshipUnresolved { id: String },
    /// More than one manifest was present; only the first was read.
    ExtraManifestIgnored { path: String },
}

impl LoadIssue {
    pub(crate) fn skipped(
        path: impl Into<String>,
        kind: Option<ResourceKind>,
        reason: impl fmt::Display,
    ) -> Self {
        Self::ResourceSkipped {
            path: path.into(),
            kind,
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceSkipped { path, kind, reason } => match kind {
                Some(kind) => write!(f, "skipped {kind} file {path}: {reason}"),
                None => write!(f, "skipped entry in {path}: {reason}"),
            },
            Self::LinkageFallback {
                entity,
                name,
                system_id,
                ..
            } => write!(f, "{entity} {name:?} assigned to first system {system_id}"),
            Self::RelationshipUnresolved { id } => {
                write!(f, "relationship {id} has no resolvable domain")
            }
            Self::ExtraManifestIgnored { path } => write!(f, "ignored extra manifest {path}"),
        }
    }
}

/// What a load saw, next to the workspace it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub layout: WorkspaceLayout,
    pub files_read: usize,
    pub issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn new(layout: WorkspaceLayout) -> Self {
        Self {
            layout,
            files_read: 0,
            issues: Vec::new(),
        }
    }

    pub fn skipped(&self) -> impl Iterator<Item = &LoadIssue> {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, LoadIssue::ResourceSkipped { .. }))
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
