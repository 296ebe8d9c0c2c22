// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io;

use crate::format::FormatError;
use crate::model::ResourceKind;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("no workspace manifest or legacy domain folder found")]
    NoWorkspaceFound,
    #[error("cannot parse workspace manifest {path:?}: {source}")]
    ManifestYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("cannot encode {kind} file {path:?}: {source}")]
    Encode {
        kind: ResourceKind,
        path: String,
        #[source]
        source: FormatError,
    },
    #[error("cannot encode workspace manifest {path:?}: {source}")]
    ManifestEncode {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("duplicate {entity} id {id} (present in more than one place)")]
    DuplicateId { entity: &'static str, id: String },
    #[error("permission to access {path:?} was denied")]
    PermissionDenied { path: String },
    #[error("invalid relative path {path:?}")]
    InvalidRelativePath { path: String },
    #[error("refusing to write through symlink at {path:?}")]
    SymlinkRefused { path: String },
    #[error("archive error: {source}")]
    Archive {
        #[from]
        source: zip::result::ZipError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    /// True when the failure means the directory can no longer be written.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::PermissionDenied { .. } => true,
            Self::Io { source, .. } => source.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
