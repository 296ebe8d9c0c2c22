// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::{DomainId, RelationshipId, TableId, WorkspaceId};

/// A link between two tables.
///
/// `domain_id` is derived from the endpoints on load; a relationship whose endpoints cannot
/// be resolved keeps `None` and is still persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub workspace_id: WorkspaceId,
    pub domain_id: Option<DomainId>,
    pub source_table_id: TableId,
    pub target_table_id: TableId,
    pub cardinality: Option<Cardinality>,
    pub notes: Option<String>,
    pub color: Option<String>,
    pub handles: Option<Handles>,
}

impl Relationship {
    pub fn new(workspace_id: WorkspaceId, source_table_id: TableId, target_table_id: TableId) -> Self {
        Self {
            id: RelationshipId::generate(),
            workspace_id,
            domain_id: None,
            source_table_id,
            target_table_id,
            cardinality: None,
            notes: None,
            color: None,
            handles: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cardinality {
    pub source: CardinalityEnd,
    pub target: CardinalityEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardinalityEnd {
    ZeroOrOne,
    ExactlyOne,
    ZeroOrMany,
    OneOrMany,
}

impl CardinalityEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZeroOrOne => "zero_or_one",
            Self::ExactlyOne => "exactly_one",
            Self::ZeroOrMany => "zero_or_many",
            Self::OneOrMany => "one_or_many",
        }
    }
}

impl fmt::Display for CardinalityEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagram edge anchor names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Handles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}
