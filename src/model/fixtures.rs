// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::{
    Cardinality, CardinalityEnd, Column, ComputeAsset, DataProduct, Decision, DecisionRecord,
    DomainId, Handles, KnowledgeArticle, Position, Process, Relationship, Table, Workspace,
};
use crate::model::{ArticleId, AssetId, DecisionId, ProcessId, ProductId, RecordId};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn table(workspace: &Workspace, domain_id: &DomainId, name: &str) -> Table {
    Table::new(workspace.id.clone(), domain_id.clone(), name)
        .with_column(Column::new("id", "string").primary_key())
        .with_column(Column::new("created_at", "timestamp"))
}

/// Three domains, three systems, every resource class, and relationships whose domains
/// resolve from their source tables.
pub(crate) fn sample_workspace() -> Workspace {
    let mut workspace = Workspace::new("Acme Corp");
    workspace.owner_id = Some("user-7".to_owned());
    workspace.description = Some("Order-to-cash model.".to_owned());

    let sales = workspace.add_domain("Sales");
    let finance = workspace.add_domain("Finance");
    // No systems: unassigned tables stay unassigned across a round trip.
    let marketing = workspace.add_domain("Marketing");

    let orders = table(&workspace, &sales, "orders");
    let customers = table(&workspace, &sales, "customers");
    let leads = table(&workspace, &marketing, "leads");
    let mut invoices = table(&workspace, &finance, "invoices");
    invoices.visible_domains.push(sales.clone());
    invoices
        .metadata
        .insert("owner".to_owned(), Value::String("finance-team".to_owned()));

    let etl = ComputeAsset {
        id: AssetId::generate(),
        domain_id: sales.clone(),
        name: "nightly etl".to_owned(),
        system_hint: None,
        payload: object(json!({ "kind": "pipeline", "schedule": "0 2 * * *" })),
    };

    {
        let domain = workspace.domain_mut(&sales).expect("sales domain");
        domain.description = Some("Everything customer facing.".to_owned());
        let mut positions = BTreeMap::new();
        positions.insert(orders.id.to_string(), Position { x: 10.0, y: 20.5 });
        domain.view_positions.insert("default".to_owned(), positions);

        let crm = domain.add_system("CRM");
        let warehouse = domain.add_system("Warehouse");
        let crm = domain.system_mut(&crm).expect("crm");
        crm.table_ids.insert(orders.id.clone());
        crm.table_ids.insert(customers.id.clone());
        crm.asset_ids.insert(etl.id.clone());
        domain
            .system_mut(&warehouse)
            .expect("warehouse")
            .description = Some("Cold storage".to_owned());
    }
    {
        let domain = workspace.domain_mut(&finance).expect("finance domain");
        let ledger = domain.add_system("Ledger");
        domain
            .system_mut(&ledger)
            .expect("ledger")
            .table_ids
            .insert(invoices.id.clone());
    }

    let mut billed = Relationship::new(workspace.id.clone(), orders.id.clone(), invoices.id.clone());
    billed.domain_id = Some(sales.clone());
    billed.cardinality = Some(Cardinality {
        source: CardinalityEnd::ExactlyOne,
        target: CardinalityEnd::ZeroOrMany,
    });
    billed.color = Some("#ff8800".to_owned());
    billed.handles = Some(Handles {
        source: Some("right".to_owned()),
        target: Some("left".to_owned()),
    });

    let mut invoiced = Relationship::new(
        workspace.id.clone(),
        invoices.id.clone(),
        customers.id.clone(),
    );
    invoiced.domain_id = Some(finance.clone());
    invoiced.notes = Some("billing contact".to_owned());

    workspace.tables = vec![orders, customers, leads, invoices];
    workspace.relationships = vec![billed, invoiced];
    workspace.assets.push(etl);
    workspace.products.push(DataProduct {
        id: ProductId::generate(),
        domain_id: sales.clone(),
        name: "Revenue".to_owned(),
        payload: object(json!({ "status": "active", "outputPorts": [{ "name": "daily" }] })),
    });
    workspace.processes.push(Process {
        id: ProcessId::generate(),
        domain_id: sales.clone(),
        name: "Onboarding".to_owned(),
        payload: object(json!({
            "xml": "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<bpmn:definitions xmlns:bpmn=\"http://www.omg.org/spec/BPMN/20100524/MODEL\">\n  <bpmn:process isExecutable=\"false\"/>\n</bpmn:definitions>\n"
        })),
    });
    workspace.decisions.push(Decision {
        id: DecisionId::generate(),
        domain_id: finance.clone(),
        name: "Credit limit".to_owned(),
        payload: object(json!({
            "xml": "<definitions xmlns=\"https://www.omg.org/spec/DMN/20191111/MODEL/\">\n  <decision/>\n</definitions>\n"
        })),
    });
    workspace.articles.push(KnowledgeArticle {
        id: ArticleId::generate(),
        domain_id: None,
        title: "Glossary".to_owned(),
        payload: object(json!({ "content": "Order: a customer purchase." })),
    });
    workspace.articles.push(KnowledgeArticle {
        id: ArticleId::generate(),
        domain_id: Some(sales),
        title: "Sales playbook".to_owned(),
        payload: object(json!({ "content": "Call back within a day." })),
    });
    workspace.records.push(DecisionRecord {
        id: RecordId::generate(),
        domain_id: Some(finance),
        title: "Use UUID identifiers".to_owned(),
        payload: object(json!({ "status": "accepted" })),
    });

    workspace
}
