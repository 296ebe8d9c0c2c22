// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed records from/to the neutral structured model produced by the format engine.
//!
//! Identity keys (`id`, `name`/`title`, `domain_id`, `system_id`) are lifted out of the
//! document; whatever remains is kept as the opaque payload and written back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{
    ArticleId, AssetId, Column, ComputeAsset, DataProduct, Decision, DecisionId, DecisionRecord,
    Domain, DomainId, Id, KnowledgeArticle, Process, ProcessId, ProductId, RecordId, ResourceKind,
    System, SystemId, Table, TableId, WorkspaceId, SYSTEM_ID_KEY,
};

pub const CONTRACT_API_VERSION: &str = "v3.0.2";
pub const CONTRACT_KIND: &str = "DataContract";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is not a mapping")]
    NotAMapping,
    #[error("invalid document shape: {source}")]
    Shape {
        #[from]
        source: serde_json::Error,
    },
    #[error("contract document declares no tables")]
    NoTables,
    #[error("no owning domain")]
    NoDomain,
}

#[derive(Debug, Deserialize)]
struct TableDoc {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    visible_domains: Vec<String>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default, alias = "columns")]
    properties: Vec<ColumnDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnDoc {
    name: String,
    #[serde(
        default,
        rename = "logicalType",
        alias = "type",
        alias = "data_type",
        skip_serializing_if = "Option::is_none"
    )]
    logical_type: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default, rename = "primaryKey", alias = "primary_key")]
    primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing)]
    nullable: Option<bool>,
}

/// Where a document is being loaded into.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub workspace_id: &'a WorkspaceId,
    /// `None` for workspace-global knowledge articles and decision records.
    pub domain_id: Option<&'a DomainId>,
    /// File name minus owning prefix and suffix; used when the document carries no name.
    pub stem: &'a str,
}

impl DecodeContext<'_> {
    fn require_domain(&self) -> Result<DomainId, DocumentError> {
        self.domain_id.cloned().ok_or(DocumentError::NoDomain)
    }
}

#[derive(Debug, Clone)]
pub enum Decoded {
    Tables {
        tables: Vec<Table>,
        /// Document-level `system_id`, applied to tables without their own hint.
        system_hint: Option<String>,
    },
    Product(DataProduct),
    Asset(ComputeAsset),
    Process(Process),
    Decision(Decision),
    Article(KnowledgeArticle),
    Record(DecisionRecord),
}

fn into_object(model: Value) -> Result<Map<String, Value>, DocumentError> {
    match model {
        Value::Object(map) => Ok(map),
        _ => Err(DocumentError::NotAMapping),
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(value)) => Some(value),
        Some(Value::Number(value)) => Some(value.to_string()),
        _ => None,
    }
}

fn take_name(map: &mut Map<String, Value>, keys: &[&str], stem: &str) -> String {
    let mut found = None;
    for key in keys {
        let value = take_string(map, key).filter(|value| !value.trim().is_empty());
        if found.is_none() {
            found = value;
        }
    }
    found.unwrap_or_else(|| stem.to_owned())
}

/// The `domain_id` a document names for itself, used to place files without a domain
/// prefix. Contracts fall back to the first table's `primary_domain_id`.
pub fn declared_domain(kind: ResourceKind, model: &Value) -> Option<String> {
    let declared = model.get("domain_id").and_then(Value::as_str);
    let fallback = || {
        if kind != ResourceKind::TableContract {
            return None;
        }
        ["schema", "tables"]
            .iter()
            .find_map(|key| model.get(*key)?.as_array()?.first())
            .or(Some(model))
            .and_then(|table| table.get("primary_domain_id"))
            .and_then(Value::as_str)
    };
    declared.or_else(fallback).map(str::to_owned)
}

pub fn decode(
    kind: ResourceKind,
    model: Value,
    ctx: DecodeContext<'_>,
) -> Result<Decoded, DocumentError> {
    let mut map = into_object(model)?;
    map.remove("domain_id");

    match kind {
        ResourceKind::TableContract => decode_contract(map, ctx),
        ResourceKind::DataProduct => Ok(Decoded::Product(DataProduct {
            id: ProductId::normalize("product.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.require_domain()?,
            name: take_name(&mut map, &["name"], ctx.stem),
            payload: map,
        })),
        ResourceKind::ComputeAsset => Ok(Decoded::Asset(ComputeAsset {
            id: AssetId::normalize("asset.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.require_domain()?,
            name: take_name(&mut map, &["name"], ctx.stem),
            system_hint: take_string(&mut map, SYSTEM_ID_KEY),
            payload: map,
        })),
        ResourceKind::Process => Ok(Decoded::Process(Process {
            id: ProcessId::normalize("process.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.require_domain()?,
            name: take_name(&mut map, &["name"], ctx.stem),
            payload: map,
        })),
        ResourceKind::DecisionModel => Ok(Decoded::Decision(Decision {
            id: DecisionId::normalize("decision.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.require_domain()?,
            name: take_name(&mut map, &["name"], ctx.stem),
            payload: map,
        })),
        ResourceKind::KnowledgeArticle => Ok(Decoded::Article(KnowledgeArticle {
            id: ArticleId::normalize("article.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.domain_id.cloned(),
            title: take_name(&mut map, &["title", "name"], ctx.stem),
            payload: map,
        })),
        ResourceKind::DecisionRecord => Ok(Decoded::Record(DecisionRecord {
            id: RecordId::normalize("record.id", take_string(&mut map, "id").as_deref()),
            domain_id: ctx.domain_id.cloned(),
            title: take_name(&mut map, &["title", "name"], ctx.stem),
            payload: map,
        })),
    }
}

fn decode_contract(
    mut map: Map<String, Value>,
    ctx: DecodeContext<'_>,
) -> Result<Decoded, DocumentError> {
    let domain_id = ctx.require_domain()?;
    let system_hint = take_string(&mut map, SYSTEM_ID_KEY);

    let entries = match (map.remove("schema"), map.remove("tables")) {
        (Some(Value::Array(entries)), _) | (_, Some(Value::Array(entries))) => entries,
        _ if map.contains_key("name") => vec![Value::Object(map)],
        _ => return Err(DocumentError::NoTables),
    };
    if entries.is_empty() {
        return Err(DocumentError::NoTables);
    }

    let tables = entries
        .into_iter()
        .map(|entry| {
            let doc: TableDoc = serde_json::from_value(entry)?;
            Ok(Table {
                id: TableId::normalize("table.id", doc.id.as_deref()),
                workspace_id: ctx.workspace_id.clone(),
                primary_domain_id: domain_id.clone(),
                name: doc.name,
                columns: doc
                    .properties
                    .into_iter()
                    .map(|column| Column {
                        nullable: column.nullable.unwrap_or(!column.required),
                        name: column.name,
                        data_type: column.logical_type,
                        primary_key: column.primary_key,
                        description: column.description,
                    })
                    .collect(),
                visible_domains: doc
                    .visible_domains
                    .iter()
                    .filter_map(|id| DomainId::new(id.as_str()).ok())
                    .collect(),
                metadata: doc.metadata,
            })
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;

    Ok(Decoded::Tables {
        tables,
        system_hint,
    })
}

fn insert_str(map: &mut Map<String, Value>, key: &str, value: impl Into<String>) {
    map.insert(key.to_owned(), Value::String(value.into()));
}

fn encode_table(table: &Table) -> Value {
    let mut entry = Map::new();
    insert_str(&mut entry, "id", table.id.as_str());
    insert_str(&mut entry, "name", &table.name);
    insert_str(&mut entry, "primary_domain_id", table.primary_domain_id.as_str());
    if !table.visible_domains.is_empty() {
        entry.insert(
            "visible_domains".to_owned(),
            table
                .visible_domains
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect(),
        );
    }
    if !table.metadata.is_empty() {
        entry.insert("metadata".to_owned(), Value::Object(table.metadata.clone()));
    }
    let properties = table
        .columns
        .iter()
        .map(|column| {
            let doc = ColumnDoc {
                name: column.name.clone(),
                logical_type: column.data_type.clone(),
                required: !column.nullable,
                primary_key: column.primary_key,
                description: column.description.clone(),
                nullable: None,
            };
            serde_json::to_value(doc).unwrap_or(Value::Null)
        })
        .collect();
    entry.insert("properties".to_owned(), Value::Array(properties));
    Value::Object(entry)
}

/// One contract document holding `tables`; grouped under `system` when given.
pub fn encode_contract(domain: &Domain, system: Option<&System>, tables: &[&Table]) -> Value {
    let mut doc = Map::new();
    insert_str(&mut doc, "apiVersion", CONTRACT_API_VERSION);
    insert_str(&mut doc, "kind", CONTRACT_KIND);
    match (system, tables) {
        (Some(system), _) => {
            insert_str(&mut doc, "id", system.id.as_str());
            insert_str(&mut doc, "name", &system.name);
            insert_str(&mut doc, SYSTEM_ID_KEY, system.id.as_str());
        }
        (None, [table]) => {
            insert_str(&mut doc, "id", table.id.as_str());
            insert_str(&mut doc, "name", &table.name);
        }
        (None, _) => {}
    }
    insert_str(&mut doc, "domain_id", domain.id.as_str());
    doc.insert(
        "schema".to_owned(),
        tables.iter().map(|table| encode_table(table)).collect(),
    );
    Value::Object(doc)
}

fn with_identity<T>(
    payload: &Map<String, Value>,
    id: &Id<T>,
    name_key: &str,
    name: &str,
    domain_id: Option<&DomainId>,
) -> Map<String, Value> {
    let mut doc = payload.clone();
    insert_str(&mut doc, "id", id.as_str());
    insert_str(&mut doc, name_key, name);
    if let Some(domain_id) = domain_id {
        insert_str(&mut doc, "domain_id", domain_id.as_str());
    }
    doc
}

pub fn encode_product(product: &DataProduct) -> Value {
    Value::Object(with_identity(
        &product.payload,
        &product.id,
        "name",
        &product.name,
        Some(&product.domain_id),
    ))
}

/// `system_id` is the linked system, falling back to the asset's original hint.
pub fn encode_asset(asset: &ComputeAsset, system_id: Option<&SystemId>) -> Value {
    let mut doc = with_identity(
        &asset.payload,
        &asset.id,
        "name",
        &asset.name,
        Some(&asset.domain_id),
    );
    let hint = system_id
        .map(ToString::to_string)
        .or_else(|| asset.system_hint.clone());
    if let Some(hint) = hint {
        insert_str(&mut doc, SYSTEM_ID_KEY, hint);
    }
    Value::Object(doc)
}

/// Markup models carry no `domain_id`; ownership comes from the file name.
pub fn encode_process(process: &Process) -> Value {
    Value::Object(with_identity(
        &process.payload,
        &process.id,
        "name",
        &process.name,
        None,
    ))
}

pub fn encode_decision(decision: &Decision) -> Value {
    Value::Object(with_identity(
        &decision.payload,
        &decision.id,
        "name",
        &decision.name,
        None,
    ))
}

pub fn encode_article(article: &KnowledgeArticle) -> Value {
    Value::Object(with_identity(
        &article.payload,
        &article.id,
        "title",
        &article.title,
        article.domain_id.as_ref(),
    ))
}

pub fn encode_record(record: &DecisionRecord) -> Value {
    Value::Object(with_identity(
        &record.payload,
        &record.id,
        "title",
        &record.title,
        record.domain_id.as_ref(),
    ))
}
