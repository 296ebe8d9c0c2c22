// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reader for the legacy folder layout.
//!
//! ```text
//! acme/                 workspace folder (optional workspace.yaml header)
//!   sales/              one folder per domain
//!     domain.yaml       id, name, description, systems, tables, relationships, view_positions
//!     tables.yaml       used when domain.yaml has no `tables`
//!     systems.yaml      used when domain.yaml has no `systems`
//!     relationships.yaml
//!     *.odps.yaml ...   loose typed files owned by the folder's domain
//! ```
//!
//! The layout is read-only: saving always writes the flat layout.

use std::collections::BTreeSet;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::assemble::WorkspaceHeader;
use super::detect::WorkspaceLayout;
use super::dir::{file_name, join_path, parent_path, Directory};
use super::documents::{decode, DecodeContext, Decoded};
use super::loader::{DomainLoadResult, Loaded, LoadedParts, ResourceBatch, ResourceLoader};
use super::manifest::{DomainManifest, RelationshipManifest, SystemManifest, WorkspaceManifest};
use super::report::{LoadIssue, LoadReport};
use super::StoreError;
use crate::format::FormatEngine;
use crate::model::{Relationship, ResourceKind, ViewPositions, WorkspaceId};

const DOMAIN_FILE: &str = "domain.yaml";
const TABLES_FILE: &str = "tables.yaml";
const SYSTEMS_FILE: &str = "systems.yaml";
const RELATIONSHIPS_FILE: &str = "relationships.yaml";
const HEADER_FILE: &str = "workspace.yaml";

const FOLDER_FILES: [&str; 4] = [DOMAIN_FILE, TABLES_FILE, SYSTEMS_FILE, RELATIONSHIPS_FILE];

#[derive(Debug, Default, Deserialize)]
struct DomainDoc {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    view_positions: Option<serde_yaml::Value>,
    #[serde(default)]
    systems: Option<Vec<SystemManifest>>,
    #[serde(default)]
    tables: Option<Vec<Value>>,
    #[serde(default)]
    relationships: Option<Vec<RelationshipManifest>>,
}

/// A list stored either bare or under `key`.
fn yaml_list<T: DeserializeOwned>(text: &str, key: &str) -> Result<Vec<T>, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    match value {
        serde_yaml::Value::Null => Ok(Vec::new()),
        serde_yaml::Value::Mapping(mut map) => match map.remove(key) {
            Some(list) => serde_yaml::from_value(list),
            None => Ok(Vec::new()),
        },
        other => serde_yaml::from_value(other),
    }
}

struct FolderLoad {
    result: DomainLoadResult,
    relationships: Vec<Relationship>,
}

/// Reads an optional side file of a domain folder. Missing is empty; malformed is skipped.
async fn side_list<D: Directory, T: DeserializeOwned>(
    dir: &D,
    folder: &str,
    file: &str,
    key: &str,
    issues: &mut Vec<LoadIssue>,
) -> Vec<T> {
    let path = join_path(folder, file);
    let text = match dir.read_to_string(&path).await {
        Ok(text) => text,
        Err(err) if err.is_not_found() => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path, %err, "skipping unreadable legacy file");
            issues.push(LoadIssue::skipped(path, None, err));
            return Vec::new();
        }
    };
    yaml_list(&text, key).unwrap_or_else(|err| {
        tracing::warn!(path = %path, %err, "skipping malformed legacy file");
        issues.push(LoadIssue::skipped(path, None, err));
        Vec::new()
    })
}

async fn load_folder<D: Directory>(
    dir: &D,
    loader: &ResourceLoader<'_, D>,
    workspace_id: &WorkspaceId,
    folder: &str,
    position: usize,
    loose: Vec<(ResourceKind, String)>,
) -> Result<FolderLoad, StoreError> {
    let mut issues = Vec::new();
    let domain_path = join_path(folder, DOMAIN_FILE);

    let doc = match dir.read_to_string(&domain_path).await {
        Ok(text) if text.trim().is_empty() => DomainDoc::default(),
        Ok(text) => {
            serde_yaml::from_str(&text).map_err(|source| StoreError::ManifestYaml {
                path: domain_path.clone(),
                source,
            })?
        }
        Err(err) if err.is_not_found() => DomainDoc::default(),
        Err(err) => return Err(err),
    };

    let systems = match doc.systems {
        Some(systems) => systems,
        None => side_list(dir, folder, SYSTEMS_FILE, "systems", &mut issues).await,
    };
    let tables = match doc.tables {
        Some(tables) => tables,
        None => side_list(dir, folder, TABLES_FILE, "tables", &mut issues).await,
    };
    let relationship_entries = match doc.relationships {
        Some(relationships) => relationships,
        None => side_list(dir, folder, RELATIONSHIPS_FILE, "relationships", &mut issues).await,
    };

    let manifest = DomainManifest {
        id: doc.id,
        name: doc
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| Some(file_name(folder).to_owned())),
        description: doc.description,
        view_positions: doc
            .view_positions
            .and_then(|value| serde_yaml::from_value::<ViewPositions>(value).ok())
            .unwrap_or_default(),
        systems,
    };
    let domain = manifest.to_domain(workspace_id, position);

    let tables_path = join_path(folder, TABLES_FILE);
    let mut legacy_tables = Vec::new();
    if !tables.is_empty() {
        let ctx = DecodeContext {
            workspace_id,
            domain_id: Some(&domain.id),
            stem: "",
        };
        let model = serde_json::json!({ "tables": tables });
        match decode(ResourceKind::TableContract, model, ctx) {
            Ok(Decoded::Tables { tables, .. }) => {
                legacy_tables.extend(tables.into_iter().map(|table| Loaded {
                    system_hint: table.system_hint().map(str::to_owned),
                    value: table,
                    path: tables_path.clone(),
                    local_stem: String::new(),
                }));
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(folder, %err, "skipping legacy tables");
                issues.push(LoadIssue::skipped(
                    tables_path,
                    Some(ResourceKind::TableContract),
                    err,
                ));
            }
        }
    }

    let mut result = loader.load_domain(domain, loose, "").await;
    result.batch.tables.splice(0..0, legacy_tables);
    result.issues.splice(0..0, issues);
    result.files_read += 1;

    let mut relationships = Vec::with_capacity(relationship_entries.len());
    for (idx, entry) in relationship_entries.iter().enumerate() {
        match entry.to_relationship(workspace_id) {
            Some(relationship) => relationships.push(relationship),
            None => result.issues.push(LoadIssue::skipped(
                folder,
                None,
                format!("relationship #{} lacks a valid source or target table id", idx + 1),
            )),
        }
    }

    Ok(FolderLoad {
        result,
        relationships,
    })
}

fn label_name(label: &str) -> String {
    label
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("workspace")
        .to_owned()
}

/// Loads a legacy workspace given the paths found under `dir`.
pub async fn load_legacy<D: Directory>(
    dir: &D,
    engine: &dyn FormatEngine,
    paths: &[String],
) -> Result<LoadedParts, StoreError> {
    let mut report = LoadReport::new(WorkspaceLayout::Folder);

    let folders: BTreeSet<&str> = paths
        .iter()
        .filter(|path| path.contains('/') && FOLDER_FILES.contains(&file_name(path)))
        .map(|path| parent_path(path))
        .collect();
    // The shallowest folder decides which workspace folder is read.
    let Some(root) = folders
        .iter()
        .min_by_key(|folder| (folder.matches('/').count(), **folder))
        .map(|folder| parent_path(*folder))
    else {
        return Err(StoreError::NoWorkspaceFound);
    };
    let folders: Vec<&str> = folders
        .into_iter()
        .filter(|folder| parent_path(folder) == root)
        .collect();

    let header_path = join_path(root, HEADER_FILE);
    let header_manifest = if paths.contains(&header_path) {
        let text = dir.read_to_string(&header_path).await?;
        report.files_read += 1;
        WorkspaceManifest::from_yaml(&text).map_err(|source| StoreError::ManifestYaml {
            path: header_path.clone(),
            source,
        })?
    } else {
        WorkspaceManifest::default()
    };
    let fallback_name = if root.is_empty() {
        label_name(&dir.label())
    } else {
        file_name(root).to_owned()
    };
    let header: WorkspaceHeader = header_manifest.header(&fallback_name);

    let loader = ResourceLoader::new(dir, engine, &header.id);
    let typed_in = |folder: &str| -> Vec<(ResourceKind, String)> {
        paths
            .iter()
            .filter(|path| parent_path(path) == folder)
            .filter_map(|path| ResourceKind::from_file_name(file_name(path)).map(|kind| (kind, path.clone())))
            .collect()
    };

    let loads = join_all(folders.iter().enumerate().map(|(position, folder)| {
        load_folder(dir, &loader, &header.id, folder, position, typed_in(folder))
    }))
    .await;

    let mut domains = Vec::with_capacity(loads.len());
    let mut relationships = Vec::new();
    for load in loads {
        let FolderLoad {
            mut result,
            relationships: folder_relationships,
        } = load?;
        report.files_read += result.files_read;
        report.issues.append(&mut result.issues);
        relationships.extend(folder_relationships);
        domains.push(result);
    }

    // Loose files next to the domain folders: articles and records are global.
    let mut global = ResourceBatch::default();
    for (kind, path) in typed_in(root) {
        report.files_read += 1;
        if kind.is_domain_bound() {
            report.issues.push(LoadIssue::skipped(
                path.as_str(),
                Some(kind),
                "outside any domain folder",
            ));
            continue;
        }
        match loader.load_file(kind, &path, None, "").await {
            Ok(file) => global.absorb(file),
            Err(issue) => report.issues.push(issue),
        }
    }

    Ok(LoadedParts {
        header,
        domains,
        global,
        relationships,
        report,
    })
}
