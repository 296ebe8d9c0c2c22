// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Workspace → file records.
//!
//! Output is a pure function of the workspace: entities are visited in (name, id) order and
//! colliding file names get `_2`, `_3`, … in that order, so saving the same workspace twice
//! yields identical records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::categorize::{sanitize, README_NAME};
use super::detect::MANIFEST_SUFFIX;
use super::documents::{
    encode_article, encode_asset, encode_contract, encode_decision, encode_process,
    encode_product, encode_record,
};
use super::manifest::WorkspaceManifest;
use super::StoreError;
use crate::format::FormatEngine;
use crate::model::{Domain, DomainId, ResourceKind, Table, Workspace};

/// One file to be written: a relative `/`-separated path and its text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    pub contents: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveLayout {
    /// Typed subdirectories plus a generated README.
    #[default]
    Structured,
    /// Every file at the root, no README.
    Compact,
}

/// Hands out unique paths; the first claimant of a name keeps it.
#[derive(Debug, Default)]
struct PathAllocator {
    taken: BTreeSet<String>,
}

impl PathAllocator {
    fn allocate(&mut self, dir: &str, base: &str, extension: &str) -> String {
        let mut attempt = 1_usize;
        loop {
            let name = if attempt == 1 {
                format!("{base}{extension}")
            } else {
                format!("{base}_{attempt}{extension}")
            };
            let path = if dir.is_empty() {
                name
            } else {
                format!("{dir}/{name}")
            };
            // Case-insensitive filesystems would merge paths differing only in case.
            if self.taken.insert(path.to_ascii_lowercase()) {
                return path;
            }
            attempt += 1;
        }
    }
}

struct Planned {
    kind: ResourceKind,
    base: String,
    model: Value,
}

pub struct WorkspaceSerializer<'a> {
    engine: &'a dyn FormatEngine,
    layout: SaveLayout,
    readme: bool,
}

impl<'a> WorkspaceSerializer<'a> {
    pub fn new(engine: &'a dyn FormatEngine, layout: SaveLayout) -> Self {
        Self {
            engine,
            layout,
            readme: true,
        }
    }

    /// Whether the structured layout emits `README.md`.
    pub fn with_readme(mut self, readme: bool) -> Self {
        self.readme = readme;
        self
    }

    pub fn serialize(&self, workspace: &Workspace) -> Result<Vec<FileRecord>, StoreError> {
        let ws = sanitize(&workspace.name);
        let domain_keys: BTreeMap<&DomainId, String> = workspace
            .domains
            .iter()
            .map(|domain| (&domain.id, sanitize(&domain.name)))
            .collect();
        let domain_key = |domain_id: &DomainId| -> String {
            domain_keys.get(domain_id).cloned().unwrap_or_else(|| {
                tracing::warn!(domain_id = %domain_id, "entity references an unknown domain");
                sanitize(domain_id.as_str())
            })
        };

        let mut planned = plan_tables(workspace, &ws);

        let mut products: Vec<_> = workspace.products.iter().collect();
        products.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        for product in products {
            planned.push(Planned {
                kind: ResourceKind::DataProduct,
                base: format!("{ws}_{}_{}", domain_key(&product.domain_id), sanitize(&product.name)),
                model: encode_product(product),
            });
        }

        let mut assets: Vec<_> = workspace.assets.iter().collect();
        assets.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        for asset in assets {
            let system = workspace.system_of_asset(&asset.id);
            let base = match system {
                Some(system) => format!(
                    "{ws}_{}_{}_{}",
                    domain_key(&asset.domain_id),
                    sanitize(&system.name),
                    sanitize(&asset.name)
                ),
                None => format!("{ws}_{}_{}", domain_key(&asset.domain_id), sanitize(&asset.name)),
            };
            planned.push(Planned {
                kind: ResourceKind::ComputeAsset,
                base,
                model: encode_asset(asset, system.map(|system| &system.id)),
            });
        }

        let mut processes: Vec<_> = workspace.processes.iter().collect();
        processes.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        for process in processes {
            planned.push(Planned {
                kind: ResourceKind::Process,
                base: format!("{ws}_{}_{}", domain_key(&process.domain_id), sanitize(&process.name)),
                model: encode_process(process),
            });
        }

        let mut decisions: Vec<_> = workspace.decisions.iter().collect();
        decisions.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        for decision in decisions {
            planned.push(Planned {
                kind: ResourceKind::DecisionModel,
                base: format!("{ws}_{}_{}", domain_key(&decision.domain_id), sanitize(&decision.name)),
                model: encode_decision(decision),
            });
        }

        let scoped = |domain_id: Option<&DomainId>, title: &str| match domain_id {
            Some(domain_id) => format!("{ws}_{}_{}", domain_key(domain_id), sanitize(title)),
            None => format!("{ws}_{}", sanitize(title)),
        };

        let mut articles: Vec<_> = workspace.articles.iter().collect();
        articles.sort_by(|a, b| (&a.title, &a.id).cmp(&(&b.title, &b.id)));
        for article in articles {
            planned.push(Planned {
                kind: ResourceKind::KnowledgeArticle,
                base: scoped(article.domain_id.as_ref(), &article.title),
                model: encode_article(article),
            });
        }

        let mut records: Vec<_> = workspace.records.iter().collect();
        records.sort_by(|a, b| (&a.title, &a.id).cmp(&(&b.title, &b.id)));
        for record in records {
            planned.push(Planned {
                kind: ResourceKind::DecisionRecord,
                base: scoped(record.domain_id.as_ref(), &record.title),
                model: encode_record(record),
            });
        }

        let mut allocator = PathAllocator::default();
        let mut out = Vec::with_capacity(planned.len() + 2);

        let manifest_path = allocator.allocate("", &ws, MANIFEST_SUFFIX);
        let manifest = WorkspaceManifest::from_workspace(workspace)
            .to_yaml()
            .map_err(|source| StoreError::ManifestEncode {
                path: manifest_path.clone(),
                source,
            })?;
        out.push(FileRecord {
            path: manifest_path,
            contents: manifest,
        });

        if self.layout == SaveLayout::Structured && self.readme {
            allocator.taken.insert(README_NAME.to_ascii_lowercase());
            out.push(FileRecord {
                path: README_NAME.to_owned(),
                contents: render_readme(workspace),
            });
        }

        for file in planned {
            let dir = match self.layout {
                SaveLayout::Structured => file.kind.subdir(),
                SaveLayout::Compact => "",
            };
            let path = allocator.allocate(dir, &file.base, file.kind.extension());
            let contents = self
                .engine
                .to_text(file.kind, &file.model)
                .map_err(|source| StoreError::Encode {
                    kind: file.kind,
                    path: path.clone(),
                    source,
                })?;
            out.push(FileRecord { path, contents });
        }

        out.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(files = out.len(), layout = ?self.layout, "workspace serialized");
        Ok(out)
    }
}

/// Serializes with the default README behaviour.
pub fn serialize(
    workspace: &Workspace,
    engine: &dyn FormatEngine,
    layout: SaveLayout,
) -> Result<Vec<FileRecord>, StoreError> {
    WorkspaceSerializer::new(engine, layout).serialize(workspace)
}

fn by_name_then_id(a: &&Table, b: &&Table) -> std::cmp::Ordering {
    (&a.name, &a.id).cmp(&(&b.name, &b.id))
}

/// One contract file per non-empty system, then one per unassigned table.
fn plan_tables(workspace: &Workspace, ws: &str) -> Vec<Planned> {
    let mut planned = Vec::new();
    let mut grouped = BTreeSet::new();

    for domain in &workspace.domains {
        let mut systems: Vec<_> = domain.systems.iter().collect();
        systems.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));
        for system in systems {
            let mut tables: Vec<&Table> = workspace
                .tables
                .iter()
                .filter(|table| system.table_ids.contains(&table.id))
                .filter(|table| !grouped.contains(&table.id))
                .collect();
            if tables.is_empty() {
                continue;
            }
            tables.sort_by(by_name_then_id);
            grouped.extend(tables.iter().map(|table| table.id.clone()));
            planned.push(Planned {
                kind: ResourceKind::TableContract,
                base: format!("{ws}_{}_{}", sanitize(&domain.name), sanitize(&system.name)),
                model: encode_contract(domain, Some(system), &tables),
            });
        }
    }

    let mut unassigned: Vec<&Table> = workspace
        .tables
        .iter()
        .filter(|table| !grouped.contains(&table.id))
        .collect();
    unassigned.sort_by(by_name_then_id);
    for table in unassigned {
        let owner = workspace.domain(&table.primary_domain_id);
        let fallback;
        let domain: &Domain = match owner {
            Some(domain) => domain,
            None => {
                tracing::warn!(table = %table.name, domain_id = %table.primary_domain_id, "table references an unknown domain");
                fallback = Domain {
                    id: table.primary_domain_id.clone(),
                    workspace_id: workspace.id.clone(),
                    name: table.primary_domain_id.to_string(),
                    description: None,
                    view_positions: BTreeMap::new(),
                    systems: Vec::new(),
                };
                &fallback
            }
        };
        planned.push(Planned {
            kind: ResourceKind::TableContract,
            base: format!("{ws}_{}_{}", sanitize(&domain.name), sanitize(&table.name)),
            model: encode_contract(domain, None, &[table]),
        });
    }
    planned
}

const README_DOMAINS_HEADING: &str = "## Domains";

fn render_readme(workspace: &Workspace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", workspace.name);
    if let Some(description) = workspace
        .description
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        let _ = writeln!(out, "{}\n", description.trim());
    }

    let _ = writeln!(out, "{README_DOMAINS_HEADING}\n");
    let _ = writeln!(out, "| Domain | Systems | Tables |");
    let _ = writeln!(out, "|---|---:|---:|");
    for domain in &workspace.domains {
        let tables = workspace
            .tables
            .iter()
            .filter(|table| table.primary_domain_id == domain.id)
            .count();
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            domain.name.replace('|', "\\|"),
            domain.systems.len(),
            tables
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Relationships: {}", workspace.relationships.len());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "_Generated on save. Edits to this file are overwritten; set the description in the workspace instead._"
    );
    out
}

/// The description paragraph of a generated README, if any.
pub fn readme_description(text: &str) -> Option<String> {
    let mut lines = text.lines().skip_while(|line| line.trim().is_empty());
    lines.next().filter(|line| line.starts_with("# "))?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.starts_with("## "))
        .collect();
    let description = body.join("\n").trim().to_owned();
    (!description.is_empty()).then_some(description)
}
