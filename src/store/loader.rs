// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reads resource files into typed records.
//!
//! A file that cannot be read, parsed or validated is skipped with a [`LoadIssue`]; it never
//! aborts the load. Only the manifest is fatal.

use futures::future::join_all;
use serde_json::Value;

use super::assemble::WorkspaceHeader;
use super::categorize::{categorize, local_stem, workspace_prefix, DomainFilter};
use super::detect::{WorkspaceLayout, MANIFEST_SUFFIX};
use super::dir::{file_name, Directory};
use super::documents::{declared_domain, decode, DecodeContext, Decoded};
use super::manifest::WorkspaceManifest;
use super::report::{LoadIssue, LoadReport};
use super::serialize::readme_description;
use super::StoreError;
use crate::format::FormatEngine;
use crate::model::{
    ComputeAsset, DataProduct, Decision, DecisionRecord, Domain, DomainId, KnowledgeArticle,
    Process, Relationship, ResourceKind, Table, WorkspaceId,
};

/// A loaded entity together with the signals linkage needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub value: T,
    pub path: String,
    /// File name without owning prefix and suffix.
    pub local_stem: String,
    /// Raw `system_id` hint from the entity or its document.
    pub system_hint: Option<String>,
}

impl<T> Loaded<T> {
    pub fn bare(value: T) -> Self {
        Self {
            value,
            path: String::new(),
            local_stem: String::new(),
            system_hint: None,
        }
    }
}

/// One file's decoded content.
#[derive(Debug, Clone)]
pub struct FileLoad {
    pub decoded: Decoded,
    pub path: String,
    pub stem: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceBatch {
    pub tables: Vec<Loaded<Table>>,
    pub products: Vec<DataProduct>,
    pub assets: Vec<Loaded<ComputeAsset>>,
    pub processes: Vec<Process>,
    pub decisions: Vec<Decision>,
    pub articles: Vec<KnowledgeArticle>,
    pub records: Vec<DecisionRecord>,
}

impl ResourceBatch {
    pub fn absorb(&mut self, file: FileLoad) {
        let FileLoad {
            decoded,
            path,
            stem,
        } = file;
        match decoded {
            Decoded::Tables {
                tables,
                system_hint,
            } => {
                self.tables.extend(tables.into_iter().map(|table| Loaded {
                    system_hint: table
                        .system_hint()
                        .map(str::to_owned)
                        .or_else(|| system_hint.clone()),
                    value: table,
                    path: path.clone(),
                    local_stem: stem.clone(),
                }));
            }
            Decoded::Asset(asset) => self.assets.push(Loaded {
                system_hint: asset.system_hint.clone(),
                value: asset,
                path,
                local_stem: stem,
            }),
            Decoded::Product(product) => self.products.push(product),
            Decoded::Process(process) => self.processes.push(process),
            Decoded::Decision(decision) => self.decisions.push(decision),
            Decoded::Article(article) => self.articles.push(article),
            Decoded::Record(record) => self.records.push(record),
        }
    }

    pub fn merge(&mut self, other: ResourceBatch) {
        self.tables.extend(other.tables);
        self.products.extend(other.products);
        self.assets.extend(other.assets);
        self.processes.extend(other.processes);
        self.decisions.extend(other.decisions);
        self.articles.extend(other.articles);
        self.records.extend(other.records);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
            + self.products.len()
            + self.assets.len()
            + self.processes.len()
            + self.decisions.len()
            + self.articles.len()
            + self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A domain with everything loaded for it, before linkage.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainLoadResult {
    pub domain: Domain,
    pub batch: ResourceBatch,
    pub issues: Vec<LoadIssue>,
    pub files_read: usize,
}

impl DomainLoadResult {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            batch: ResourceBatch::default(),
            issues: Vec::new(),
            files_read: 0,
        }
    }
}

fn skip(path: &str, kind: ResourceKind, reason: impl std::fmt::Display) -> LoadIssue {
    tracing::warn!(path, %kind, %reason, "skipping resource file");
    LoadIssue::skipped(path, Some(kind), reason)
}

/// Reads and decodes resource files through the format engine.
pub struct ResourceLoader<'a, D> {
    dir: &'a D,
    engine: &'a dyn FormatEngine,
    workspace_id: &'a WorkspaceId,
}

impl<'a, D: Directory> ResourceLoader<'a, D> {
    pub fn new(dir: &'a D, engine: &'a dyn FormatEngine, workspace_id: &'a WorkspaceId) -> Self {
        Self {
            dir,
            engine,
            workspace_id,
        }
    }

    pub async fn read_model(&self, kind: ResourceKind, path: &str) -> Result<Value, LoadIssue> {
        tracing::debug!(path, %kind, "reading resource file");
        let text = self
            .dir
            .read_to_string(path)
            .await
            .map_err(|err| skip(path, kind, err))?;
        self.engine
            .parse(kind, &text)
            .map_err(|err| skip(path, kind, err))
    }

    pub fn decode_model(
        &self,
        kind: ResourceKind,
        path: &str,
        model: Value,
        domain_id: Option<&DomainId>,
        prefix: &str,
    ) -> Result<FileLoad, LoadIssue> {
        let stem = local_stem(path, prefix, kind);
        let ctx = DecodeContext {
            workspace_id: self.workspace_id,
            domain_id,
            stem: &stem,
        };
        let decoded = decode(kind, model, ctx).map_err(|err| skip(path, kind, err))?;
        Ok(FileLoad {
            decoded,
            path: path.to_owned(),
            stem,
        })
    }

    pub async fn load_file(
        &self,
        kind: ResourceKind,
        path: &str,
        domain_id: Option<&DomainId>,
        prefix: &str,
    ) -> Result<FileLoad, LoadIssue> {
        let model = self.read_model(kind, path).await?;
        self.decode_model(kind, path, model, domain_id, prefix)
    }

    /// Loads every file of one domain concurrently. Results keep `files` order.
    pub async fn load_domain(
        &self,
        domain: Domain,
        files: Vec<(ResourceKind, String)>,
        prefix: &str,
    ) -> DomainLoadResult {
        let outcomes = join_all(
            files
                .iter()
                .map(|(kind, path)| self.load_file(*kind, path, Some(&domain.id), prefix)),
        )
        .await;

        let mut result = DomainLoadResult::new(domain);
        result.files_read = files.len();
        for outcome in outcomes {
            match outcome {
                Ok(file) => result.batch.absorb(file),
                Err(issue) => result.issues.push(issue),
            }
        }
        tracing::debug!(
            domain = %result.domain.name,
            entities = result.batch.len(),
            skipped = result.issues.len(),
            "domain loaded"
        );
        result
    }
}

/// Everything read from a workspace directory, before linkage and assembly.
#[derive(Debug, Clone)]
pub struct LoadedParts {
    pub header: WorkspaceHeader,
    pub domains: Vec<DomainLoadResult>,
    /// Workspace-global knowledge articles and decision records.
    pub global: ResourceBatch,
    pub relationships: Vec<Relationship>,
    pub report: LoadReport,
}

fn workspace_name_from_manifest(path: &str) -> String {
    let name = file_name(path);
    name[..name.len().saturating_sub(MANIFEST_SUFFIX.len())].to_owned()
}

/// Loads a flat workspace given the paths found under `dir`.
pub async fn load_flat<D: Directory>(
    dir: &D,
    engine: &dyn FormatEngine,
    paths: &[String],
) -> Result<LoadedParts, StoreError> {
    let files = categorize(paths.iter().map(String::as_str));
    let mut report = LoadReport::new(WorkspaceLayout::Flat);

    let Some((manifest_path, extra)) = files.manifests.split_first() else {
        return Err(StoreError::NoWorkspaceFound);
    };
    for path in extra {
        tracing::warn!(path, "ignoring extra workspace manifest");
        report
            .issues
            .push(LoadIssue::ExtraManifestIgnored { path: path.clone() });
    }

    let text = dir.read_to_string(manifest_path).await?;
    let manifest =
        WorkspaceManifest::from_yaml(&text).map_err(|source| StoreError::ManifestYaml {
            path: manifest_path.clone(),
            source,
        })?;
    report.files_read += 1;

    let mut header = manifest.header(&workspace_name_from_manifest(manifest_path));
    if header.description.is_none() {
        if let Some(readme) = &files.readme {
            match dir.read_to_string(readme).await {
                Ok(text) => header.description = readme_description(&text),
                Err(err) => tracing::warn!(path = %readme, %err, "cannot read README"),
            }
        }
    }

    let domains: Vec<Domain> = manifest
        .domains
        .iter()
        .enumerate()
        .map(|(position, domain)| domain.to_domain(&header.id, position))
        .collect();

    let mut relationships = Vec::with_capacity(manifest.relationships.len());
    for (idx, entry) in manifest.relationships.iter().enumerate() {
        match entry.to_relationship(&header.id) {
            Some(relationship) => relationships.push(relationship),
            None => {
                tracing::warn!(path = %manifest_path, entry = idx + 1, "relationship lacks endpoints");
                report.issues.push(LoadIssue::skipped(
                    manifest_path.clone(),
                    None,
                    format!(
                        "relationship #{} lacks a valid source or target table id",
                        idx + 1
                    ),
                ));
            }
        }
    }

    // Read every resource file up front: a known `domain_id` in the document decides its
    // owner, the `{workspace}_{domain}_` file-name prefix is the fallback.
    let filter = DomainFilter::new(&header.name, domains.iter().map(|d| d.name.as_str()));
    let resources: Vec<(ResourceKind, &String)> = ResourceKind::ALL
        .into_iter()
        .flat_map(|kind| files.bucket(kind).iter().map(move |path| (kind, path)))
        .collect();

    let workspace_id = header.id.clone();
    let loader = ResourceLoader::new(dir, engine, &workspace_id);
    let models = join_all(
        resources
            .iter()
            .map(|(kind, path)| loader.read_model(*kind, path)),
    )
    .await;
    report.files_read += resources.len();

    let global_prefix = workspace_prefix(&header.name);
    let mut results: Vec<DomainLoadResult> =
        domains.into_iter().map(DomainLoadResult::new).collect();
    let mut global = ResourceBatch::default();
    for ((kind, path), outcome) in resources.into_iter().zip(models) {
        let model = match outcome {
            Ok(model) => model,
            Err(issue) => {
                report.issues.push(issue);
                continue;
            }
        };
        let declared = declared_domain(kind, &model)
            .and_then(|id| results.iter().position(|r| r.domain.id.as_str() == id));
        // Articles and records without a `domain_id` are workspace-wide whatever their name.
        let owner = match declared {
            Some(idx) => Some(idx),
            None if kind.is_domain_bound() => filter.owner_of(path),
            None => None,
        };

        let decoded = match owner {
            Some(idx) => {
                let prefix = filter.prefix_of(idx).unwrap_or_default();
                let domain_id = results[idx].domain.id.clone();
                loader
                    .decode_model(kind, path, model, Some(&domain_id), prefix)
                    .map(|file| results[idx].batch.absorb(file))
            }
            None if !kind.is_domain_bound() => loader
                .decode_model(kind, path, model, None, &global_prefix)
                .map(|file| global.absorb(file)),
            None => Err(skip(path, kind, "no known domain_id and no domain prefix")),
        };
        if let Err(issue) = decoded {
            report.issues.push(issue);
        }
    }

    for result in &results {
        tracing::debug!(
            domain = %result.domain.name,
            entities = result.batch.len(),
            "domain loaded"
        );
    }

    Ok(LoadedParts {
        header,
        domains: results,
        global,
        relationships,
        report,
    })
}
