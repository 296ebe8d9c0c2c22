// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AssetId, DomainId, SystemId, TableId, WorkspaceId};
use super::relationship::Relationship;
use super::resource::{
    ComputeAsset, DataProduct, Decision, DecisionRecord, KnowledgeArticle, Process,
};
use super::table::Table;

/// The top-level persisted project.
///
/// Domains are ordered (the order is preserved on disk). Entities are held in flat lists and
/// point at their owning domain by id; a [`System`] groups tables and assets by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    pub owner_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub domains: Vec<Domain>,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub products: Vec<DataProduct>,
    pub assets: Vec<ComputeAsset>,
    pub processes: Vec<Process>,
    pub decisions: Vec<Decision>,
    pub articles: Vec<KnowledgeArticle>,
    pub records: Vec<DecisionRecord>,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkspaceId::generate(),
            name: name.into(),
            owner_id: None,
            description: None,
            created_at: now,
            last_modified_at: now,
            domains: Vec::new(),
            tables: Vec::new(),
            relationships: Vec::new(),
            products: Vec::new(),
            assets: Vec::new(),
            processes: Vec::new(),
            decisions: Vec::new(),
            articles: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Adds an empty domain and returns its id.
    pub fn add_domain(&mut self, name: impl Into<String>) -> DomainId {
        let domain = Domain::new(self.id.clone(), name);
        let id = domain.id.clone();
        self.domains.push(domain);
        id
    }

    pub fn domain(&self, domain_id: &DomainId) -> Option<&Domain> {
        self.domains.iter().find(|domain| &domain.id == domain_id)
    }

    pub fn domain_mut(&mut self, domain_id: &DomainId) -> Option<&mut Domain> {
        self.domains.iter_mut().find(|domain| &domain.id == domain_id)
    }

    pub fn table(&self, table_id: &TableId) -> Option<&Table> {
        self.tables.iter().find(|table| &table.id == table_id)
    }

    /// The system a table is grouped under, if any.
    pub fn system_of_table(&self, table_id: &TableId) -> Option<&System> {
        self.domains
            .iter()
            .flat_map(|domain| domain.systems.iter())
            .find(|system| system.table_ids.contains(table_id))
    }

    pub fn system_of_asset(&self, asset_id: &AssetId) -> Option<&System> {
        self.domains
            .iter()
            .flat_map(|domain| domain.systems.iter())
            .find(|system| system.asset_ids.contains(asset_id))
    }

    pub fn touch(&mut self) {
        self.last_modified_at = Utc::now();
    }
}

/// Node position inside a diagram view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// View name -> node id -> position.
pub type ViewPositions = BTreeMap<String, BTreeMap<String, Position>>;

/// A modeling scope grouping systems, tables and the other resources.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Domain {
    pub id: DomainId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub description: Option<String>,
    pub view_positions: ViewPositions,
    pub systems: Vec<System>,
}

impl Domain {
    pub fn new(workspace_id: WorkspaceId, name: impl Into<String>) -> Self {
        Self {
            id: DomainId::generate(),
            workspace_id,
            name: name.into(),
            description: None,
            view_positions: BTreeMap::new(),
            systems: Vec::new(),
        }
    }

    /// Adds an empty system and returns its id.
    pub fn add_system(&mut self, name: impl Into<String>) -> SystemId {
        let system = System::new(self.id.clone(), name);
        let id = system.id.clone();
        self.systems.push(system);
        id
    }

    pub fn system(&self, system_id: &SystemId) -> Option<&System> {
        self.systems.iter().find(|system| &system.id == system_id)
    }

    pub fn system_mut(&mut self, system_id: &SystemId) -> Option<&mut System> {
        self.systems.iter_mut().find(|system| &system.id == system_id)
    }
}

/// A physical container (database, schema, service) used to group tables and assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct System {
    pub id: SystemId,
    pub domain_id: DomainId,
    pub name: String,
    pub description: Option<String>,
    pub table_ids: BTreeSet<TableId>,
    pub asset_ids: BTreeSet<AssetId>,
}

impl System {
    pub fn new(domain_id: DomainId, name: impl Into<String>) -> Self {
        Self {
            id: SystemId::generate(),
            domain_id,
            name: name.into(),
            description: None,
            table_ids: BTreeSet::new(),
            asset_ids: BTreeSet::new(),
        }
    }
}
