// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::linkage::resolve_relationship_domains;
use super::loader::{DomainLoadResult, ResourceBatch};
use super::report::LoadIssue;
use super::StoreError;
use crate::model::{Relationship, Workspace, WorkspaceId};

/// Workspace-level fields read from a manifest or legacy header.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceHeader {
    pub id: WorkspaceId,
    pub name: String,
    pub owner_id: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
}

impl WorkspaceHeader {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: WorkspaceId::generate(),
            name: name.into(),
            owner_id: None,
            description: None,
            created_at: now,
            last_modified_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assembled {
    pub workspace: Workspace,
    /// Issues carried by the domain results plus unresolved relationships.
    pub issues: Vec<LoadIssue>,
}

fn ensure_unique<'a>(
    entity: &'static str,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), StoreError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::DuplicateId {
                entity,
                id: id.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_unique_ids(workspace: &Workspace) -> Result<(), StoreError> {
    ensure_unique("domain", workspace.domains.iter().map(|d| d.id.as_str()))?;
    ensure_unique(
        "system",
        workspace
            .domains
            .iter()
            .flat_map(|d| d.systems.iter())
            .map(|s| s.id.as_str()),
    )?;
    ensure_unique("table", workspace.tables.iter().map(|t| t.id.as_str()))?;
    ensure_unique(
        "relationship",
        workspace.relationships.iter().map(|r| r.id.as_str()),
    )?;
    ensure_unique("data product", workspace.products.iter().map(|p| p.id.as_str()))?;
    ensure_unique("compute asset", workspace.assets.iter().map(|a| a.id.as_str()))?;
    ensure_unique("process", workspace.processes.iter().map(|p| p.id.as_str()))?;
    ensure_unique("decision", workspace.decisions.iter().map(|d| d.id.as_str()))?;
    ensure_unique(
        "knowledge article",
        workspace.articles.iter().map(|a| a.id.as_str()),
    )?;
    ensure_unique("decision record", workspace.records.iter().map(|r| r.id.as_str()))
}

/// Merges linked per-domain results into one workspace.
///
/// Lists are concatenated in domain order, global resources last; nothing is deduplicated.
/// An id present twice within one entity class is an error.
pub fn assemble(
    header: WorkspaceHeader,
    domains: Vec<DomainLoadResult>,
    global: ResourceBatch,
    relationships: Vec<Relationship>,
) -> Result<Assembled, StoreError> {
    let mut workspace = Workspace {
        id: header.id,
        name: header.name,
        owner_id: header.owner_id,
        description: header.description,
        created_at: header.created_at,
        last_modified_at: header.last_modified_at,
        domains: Vec::with_capacity(domains.len()),
        tables: Vec::new(),
        relationships,
        products: Vec::new(),
        assets: Vec::new(),
        processes: Vec::new(),
        decisions: Vec::new(),
        articles: Vec::new(),
        records: Vec::new(),
    };

    let mut issues = Vec::new();
    let mut batch = ResourceBatch::default();
    for result in domains {
        workspace.domains.push(result.domain);
        batch.merge(result.batch);
        issues.extend(result.issues);
    }
    batch.merge(global);

    workspace.tables = batch.tables.into_iter().map(|t| t.value).collect();
    workspace.assets = batch.assets.into_iter().map(|a| a.value).collect();
    workspace.products = batch.products;
    workspace.processes = batch.processes;
    workspace.decisions = batch.decisions;
    workspace.articles = batch.articles;
    workspace.records = batch.records;

    check_unique_ids(&workspace)?;

    issues.extend(resolve_relationship_domains(
        &mut workspace.relationships,
        &workspace.tables,
    ));

    Ok(Assembled { workspace, issues })
}

#[cfg(test)]
mod tests {
    use super::{assemble, WorkspaceHeader};
    use crate::model::{Domain, Relationship, Table, TableId};
    use crate::store::loader::{DomainLoadResult, Loaded, ResourceBatch};
    use crate::store::StoreError;

    #[test]
    fn concatenates_in_domain_order_and_resolves_relationships() {
        let header = WorkspaceHeader::new("Acme");
        let sales = Domain::new(header.id.clone(), "Sales");
        let finance = Domain::new(header.id.clone(), "Finance");
        let orders = Table::new(header.id.clone(), sales.id.clone(), "orders");
        let invoices = Table::new(header.id.clone(), finance.id.clone(), "invoices");
        let relationship = Relationship::new(header.id.clone(), TableId::generate(), invoices.id.clone());

        let mut first = DomainLoadResult::new(sales);
        first.batch.tables.push(Loaded::bare(orders));
        let mut second = DomainLoadResult::new(finance.clone());
        second.batch.tables.push(Loaded::bare(invoices));

        let assembled = assemble(header, vec![first, second], ResourceBatch::default(), vec![relationship])
            .expect("assembles");
        let names: Vec<_> = assembled.workspace.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "invoices"]);
        assert_eq!(assembled.workspace.relationships[0].domain_id, Some(finance.id));
        assert!(assembled.issues.is_empty());
    }

    #[test]
    fn duplicate_ids_are_fatal() {
        let header = WorkspaceHeader::new("Acme");
        let sales = Domain::new(header.id.clone(), "Sales");
        let orders = Table::new(header.id.clone(), sales.id.clone(), "orders");
        let mut copy = orders.clone();
        copy.name = "orders copy".to_owned();

        let mut result = DomainLoadResult::new(sales);
        result.batch.tables.push(Loaded::bare(orders));
        result.batch.tables.push(Loaded::bare(copy));

        let err = assemble(header, vec![result], ResourceBatch::default(), Vec::new()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { entity: "table", .. }), "{err:?}");
    }
}
