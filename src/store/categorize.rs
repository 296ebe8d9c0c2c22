// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! File classification and per-domain routing for the flat layout.

use std::collections::BTreeMap;

use super::detect::is_manifest_name;
use super::dir::{file_name, parent_path};
use crate::model::ResourceKind;

pub const README_NAME: &str = "README.md";

/// Placeholder used when a name sanitizes to nothing.
pub const UNNAMED: &str = "unnamed";

/// Subdirectories written by the structured layout, in [`ResourceKind::ALL`] order.
pub const MANAGED_SUBDIRS: [&str; 7] = ["odcs", "odps", "cads", "bpmn", "dmn", "kb", "adr"];

/// Lower-cases and keeps ASCII alphanumerics only.
pub fn sanitize(name: &str) -> String {
    let out: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    if out.is_empty() {
        UNNAMED.to_owned()
    } else {
        out
    }
}

pub fn workspace_prefix(workspace: &str) -> String {
    format!("{}_", sanitize(workspace))
}

pub fn domain_prefix(workspace: &str, domain: &str) -> String {
    format!("{}_{}_", sanitize(workspace), sanitize(domain))
}

/// Whether the synchronizer owns a file with this name.
pub fn is_managed_file(name: &str) -> bool {
    ResourceKind::from_file_name(name).is_some() || is_manifest_name(name)
}

/// Paths of a flat workspace sorted into resource buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedFiles {
    buckets: BTreeMap<ResourceKind, Vec<String>>,
    pub manifests: Vec<String>,
    pub readme: Option<String>,
    /// Paths outside the allow-list or outside the scanned locations.
    pub ignored: Vec<String>,
}

impl CategorizedFiles {
    pub fn bucket(&self, kind: ResourceKind) -> &[String] {
        self.buckets.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Number of resource files across all buckets.
    pub fn resource_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

fn in_scanned_location(path: &str) -> bool {
    let parent = parent_path(path);
    parent.is_empty() || MANAGED_SUBDIRS.contains(&parent)
}

/// Buckets paths by suffix. Only the root and the managed subdirectories are considered;
/// the manifest and README are only recognized at the root.
pub fn categorize<'a, I>(paths: I) -> CategorizedFiles
where
    I: IntoIterator<Item = &'a str>,
{
    let mut files = CategorizedFiles::default();
    for path in paths {
        let name = file_name(path);
        let at_root = !path.contains('/');

        if at_root && is_manifest_name(name) {
            files.manifests.push(path.to_owned());
        } else if at_root && name.eq_ignore_ascii_case(README_NAME) {
            files.readme = Some(path.to_owned());
        } else if let Some(kind) = ResourceKind::from_file_name(name).filter(|_| in_scanned_location(path)) {
            files.buckets.entry(kind).or_default().push(path.to_owned());
        } else {
            files.ignored.push(path.to_owned());
        }
    }

    files.manifests.sort();
    for bucket in files.buckets.values_mut() {
        bucket.sort();
    }
    files.ignored.sort();
    files
}

/// Routes file names to domains by their `{workspace}_{domain}_` prefix.
#[derive(Debug, Clone)]
pub struct DomainFilter {
    domain_prefixes: Vec<String>,
}

impl DomainFilter {
    pub fn new<'a, I>(workspace: &str, domains: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            domain_prefixes: domains
                .into_iter()
                .map(|domain| domain_prefix(workspace, domain))
                .collect(),
        }
    }

    /// Index of the first domain whose prefix the file name carries.
    pub fn owner_of(&self, path: &str) -> Option<usize> {
        let name = file_name(path).to_ascii_lowercase();
        self.domain_prefixes
            .iter()
            .position(|prefix| name.starts_with(prefix))
    }

    pub fn prefix_of(&self, domain_index: usize) -> Option<&str> {
        self.domain_prefixes.get(domain_index).map(String::as_str)
    }
}

/// The subset of `paths` owned by one workspace/domain pair.
pub fn filter_for_domain<'a>(paths: &'a [String], workspace: &str, domain: &str) -> Vec<&'a str> {
    let prefix = domain_prefix(workspace, domain);
    paths
        .iter()
        .map(String::as_str)
        .filter(|path| file_name(path).to_ascii_lowercase().starts_with(&prefix))
        .collect()
}

/// File name with its owning prefix and resource suffix removed.
pub fn local_stem(path: &str, prefix: &str, kind: ResourceKind) -> String {
    let stem = kind.strip_suffix(file_name(path));
    let lower = stem.to_ascii_lowercase();
    if lower.starts_with(prefix) {
        stem[prefix.len()..].to_owned()
    } else {
        stem.to_owned()
    }
}
