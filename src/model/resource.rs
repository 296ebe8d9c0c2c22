// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use super::ids::{ArticleId, AssetId, DecisionId, DomainId, ProcessId, ProductId, RecordId};

/// The typed resource classes persisted as individual files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    TableContract,
    DataProduct,
    ComputeAsset,
    Process,
    DecisionModel,
    KnowledgeArticle,
    DecisionRecord,
}

impl ResourceKind {
    pub const ALL: [Self; 7] = [
        Self::TableContract,
        Self::DataProduct,
        Self::ComputeAsset,
        Self::Process,
        Self::DecisionModel,
        Self::KnowledgeArticle,
        Self::DecisionRecord,
    ];

    /// The extension written on save.
    pub fn extension(self) -> &'static str {
        self.suffixes()[0]
    }

    /// Every suffix recognized on load, canonical first.
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            Self::TableContract => &[".odcs.yaml", ".odcs.yml"],
            Self::DataProduct => &[".odps.yaml"],
            Self::ComputeAsset => &[".cads.yaml"],
            Self::Process => &[".bpmn"],
            Self::DecisionModel => &[".dmn"],
            Self::KnowledgeArticle => &[".kb.yaml"],
            Self::DecisionRecord => &[".adr.yaml"],
        }
    }

    /// Typed subdirectory used by the structured layout.
    pub fn subdir(self) -> &'static str {
        match self {
            Self::TableContract => "odcs",
            Self::DataProduct => "odps",
            Self::ComputeAsset => "cads",
            Self::Process => "bpmn",
            Self::DecisionModel => "dmn",
            Self::KnowledgeArticle => "kb",
            Self::DecisionRecord => "adr",
        }
    }

    /// Classifies a file name by suffix (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let lower = file_name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| {
            kind.suffixes()
                .iter()
                .any(|suffix| lower.len() > suffix.len() && lower.ends_with(suffix))
        })
    }

    /// Strips the recognized suffix, if any.
    pub fn strip_suffix(self, file_name: &str) -> &str {
        let lower = file_name.to_ascii_lowercase();
        for suffix in self.suffixes() {
            if lower.ends_with(suffix) {
                return &file_name[..file_name.len() - suffix.len()];
            }
        }
        file_name
    }

    /// Knowledge articles and decision records may be workspace-global.
    pub fn is_domain_bound(self) -> bool {
        !matches!(self, Self::KnowledgeArticle | Self::DecisionRecord)
    }

    pub fn is_markup(self) -> bool {
        matches!(self, Self::Process | Self::DecisionModel)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TableContract => "table-contract",
            Self::DataProduct => "data-product",
            Self::ComputeAsset => "compute-asset",
            Self::Process => "process",
            Self::DecisionModel => "decision-model",
            Self::KnowledgeArticle => "knowledge-article",
            Self::DecisionRecord => "decision-record",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ODPS data product. The payload is the document body without identity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataProduct {
    pub id: ProductId,
    pub domain_id: DomainId,
    pub name: String,
    pub payload: Map<String, Value>,
}

/// A CADS compute asset (pipeline, model, service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputeAsset {
    pub id: AssetId,
    pub domain_id: DomainId,
    pub name: String,
    /// Raw `system_id` linkage hint as found in the document.
    pub system_hint: Option<String>,
    pub payload: Map<String, Value>,
}

/// A BPMN process. The payload holds the markup under `xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    pub id: ProcessId,
    pub domain_id: DomainId,
    pub name: String,
    pub payload: Map<String, Value>,
}

/// A DMN decision model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub id: DecisionId,
    pub domain_id: DomainId,
    pub name: String,
    pub payload: Map<String, Value>,
}

/// `domain_id == None` means the article is workspace-global.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeArticle {
    pub id: ArticleId,
    pub domain_id: Option<DomainId>,
    pub title: String,
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionRecord {
    pub id: RecordId,
    pub domain_id: Option<DomainId>,
    pub title: String,
    pub payload: Map<String, Value>,
}
