// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;
use serde_json::{Map, Value};

use super::ids::{DomainId, TableId, WorkspaceId};

/// Key inside [`Table::metadata`] carrying the owning system hint.
pub const SYSTEM_ID_KEY: &str = "system_id";

/// A table contract.
///
/// A table belongs to at most one system but can be shown in several domains through
/// `visible_domains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub id: TableId,
    pub workspace_id: WorkspaceId,
    pub primary_domain_id: DomainId,
    pub name: String,
    pub columns: Vec<Column>,
    pub visible_domains: Vec<DomainId>,
    /// Free-form contract metadata; `system_id` is read as a linkage hint.
    pub metadata: Map<String, Value>,
}

impl Table {
    pub fn new(workspace_id: WorkspaceId, domain_id: DomainId, name: impl Into<String>) -> Self {
        Self {
            id: TableId::generate(),
            workspace_id,
            primary_domain_id: domain_id,
            name: name.into(),
            columns: Vec::new(),
            visible_domains: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// The `metadata.system_id` hint, when it is a string.
    pub fn system_hint(&self) -> Option<&str> {
        self.metadata.get(SYSTEM_ID_KEY).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: Option<String>,
    pub nullable: bool,
    pub primary_key: bool,
    pub description: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type.into()),
            nullable: true,
            primary_key: false,
            description: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }
}
