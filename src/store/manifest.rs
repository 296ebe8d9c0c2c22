// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! On-disk shape of the `*.workspace.yaml` manifest.
//!
//! Ids are read as plain strings and normalized when converted into the model. Optional
//! structured fields (cardinality, handles, view positions) are parsed leniently: a malformed
//! value is dropped instead of failing the whole manifest.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::assemble::WorkspaceHeader;
use crate::model::{
    Cardinality, Domain, DomainId, Handles, Id, Relationship, RelationshipId, System, SystemId,
    TableId, ViewPositions, Workspace, WorkspaceId,
};

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(serde_yaml::from_value(value).ok())
}

fn lenient_positions<'de, D>(deserializer: D) -> Result<ViewPositions, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an RFC 3339 timestamp; absent or invalid values become "now".
pub fn parse_timestamp(field: &'static str, raw: Option<&str>) -> DateTime<Utc> {
    match raw.map(DateTime::parse_from_rfc3339) {
        Some(Ok(at)) => at.with_timezone(&Utc),
        Some(Err(err)) => {
            tracing::debug!(field, value = raw, %err, "replacing invalid timestamp");
            Utc::now()
        }
        None => Utc::now(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<String>,
    #[serde(default)]
    pub domains: Vec<DomainManifest>,
    #[serde(default)]
    pub relationships: Vec<RelationshipManifest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_positions",
        skip_serializing_if = "ViewPositions::is_empty"
    )]
    pub view_positions: ViewPositions,
    #[serde(default)]
    pub systems: Vec<SystemManifest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub table_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub handles: Option<Handles>,
}

impl WorkspaceManifest {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_workspace(workspace: &Workspace) -> Self {
        Self {
            id: Some(workspace.id.to_string()),
            name: Some(workspace.name.clone()),
            owner_id: workspace.owner_id.clone(),
            description: workspace.description.clone(),
            created_at: Some(format_timestamp(&workspace.created_at)),
            last_modified_at: Some(format_timestamp(&workspace.last_modified_at)),
            domains: workspace.domains.iter().map(DomainManifest::from_domain).collect(),
            relationships: workspace
                .relationships
                .iter()
                .map(RelationshipManifest::from_relationship)
                .collect(),
        }
    }

    /// Workspace-level fields; `fallback_name` is used when the manifest has no name.
    pub fn header(&self, fallback_name: &str) -> WorkspaceHeader {
        WorkspaceHeader {
            id: WorkspaceId::normalize("workspace.id", self.id.as_deref()),
            name: self
                .name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| fallback_name.to_owned()),
            owner_id: self.owner_id.clone(),
            description: self.description.clone(),
            created_at: parse_timestamp("workspace.created_at", self.created_at.as_deref()),
            last_modified_at: parse_timestamp(
                "workspace.last_modified_at",
                self.last_modified_at.as_deref(),
            ),
        }
    }
}

fn valid_ids<T: Ord>(raw: &[String]) -> BTreeSet<Id<T>> {
    raw.iter().filter_map(|id| Id::new(id.as_str()).ok()).collect()
}

impl DomainManifest {
    pub fn from_domain(domain: &Domain) -> Self {
        Self {
            id: Some(domain.id.to_string()),
            name: Some(domain.name.clone()),
            description: domain.description.clone(),
            view_positions: domain.view_positions.clone(),
            systems: domain.systems.iter().map(SystemManifest::from_system).collect(),
        }
    }

    /// Builds the domain with its systems. System membership sets hold the manifest's
    /// claims; linkage later reconciles them against what actually loaded.
    pub fn to_domain(&self, workspace_id: &WorkspaceId, position: usize) -> Domain {
        let id = DomainId::normalize("domain.id", self.id.as_deref());
        let systems = self
            .systems
            .iter()
            .map(|system| System {
                id: SystemId::normalize("system.id", system.id.as_deref()),
                domain_id: id.clone(),
                name: system.name.clone().unwrap_or_default(),
                description: system.description.clone(),
                table_ids: valid_ids(&system.table_ids),
                asset_ids: valid_ids(&system.asset_ids),
            })
            .collect();

        Domain {
            id,
            workspace_id: workspace_id.clone(),
            name: self
                .name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("Domain {}", position + 1)),
            description: self.description.clone(),
            view_positions: self.view_positions.clone(),
            systems,
        }
    }
}

impl SystemManifest {
    pub fn from_system(system: &System) -> Self {
        Self {
            id: Some(system.id.to_string()),
            name: Some(system.name.clone()),
            description: system.description.clone(),
            table_ids: system.table_ids.iter().map(ToString::to_string).collect(),
            asset_ids: system.asset_ids.iter().map(ToString::to_string).collect(),
        }
    }
}

impl RelationshipManifest {
    pub fn from_relationship(relationship: &Relationship) -> Self {
        Self {
            id: Some(relationship.id.to_string()),
            source_table_id: Some(relationship.source_table_id.to_string()),
            target_table_id: Some(relationship.target_table_id.to_string()),
            cardinality: relationship.cardinality,
            notes: relationship.notes.clone(),
            color: relationship.color.clone(),
            handles: relationship.handles.clone(),
        }
    }

    /// `None` when either endpoint is missing or not a valid id.
    pub fn to_relationship(&self, workspace_id: &WorkspaceId) -> Option<Relationship> {
        let source = TableId::new(self.source_table_id.as_deref()?).ok()?;
        let target = TableId::new(self.target_table_id.as_deref()?).ok()?;
        Some(Relationship {
            id: RelationshipId::normalize("relationship.id", self.id.as_deref()),
            workspace_id: workspace_id.clone(),
            domain_id: None,
            source_table_id: source,
            target_table_id: target,
            cardinality: self.cardinality,
            notes: self.notes.clone(),
            color: self.color.clone(),
            handles: self.handles.clone(),
        })
    }
}
