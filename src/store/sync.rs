// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Reconciles a directory with an expected set of file records.

use std::collections::{BTreeSet, VecDeque};

use serde::Serialize;

use super::categorize::{is_managed_file, MANAGED_SUBDIRS};
use super::dir::{join_path, Directory, EntryKind};
use super::serialize::FileRecord;
use super::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub deleted: Vec<String>,
    pub failed_deletions: Vec<String>,
    /// Managed directories that exist but could not be listed.
    pub failed_listings: Vec<String>,
    pub written: usize,
}

impl SyncReport {
    pub fn is_complete(&self) -> bool {
        self.failed_deletions.is_empty() && self.failed_listings.is_empty()
    }
}

/// Managed files currently present under the root and the managed subdirectories.
async fn managed_files<D: Directory>(dir: &D, report: &mut SyncReport) -> Vec<String> {
    let mut found = Vec::new();
    let mut worklist: VecDeque<String> = std::iter::once(String::new())
        .chain(MANAGED_SUBDIRS.iter().map(|subdir| (*subdir).to_owned()))
        .collect();

    while let Some(path) = worklist.pop_front() {
        let entries = match dir.list(&path).await {
            Ok(entries) => entries,
            Err(err) if err.is_not_found() => continue,
            Err(err) => {
                tracing::warn!(dir = %path, %err, "cannot list directory; stale files may remain");
                report.failed_listings.push(path);
                continue;
            }
        };
        found.extend(
            entries
                .into_iter()
                .filter(|entry| entry.kind == EntryKind::File && is_managed_file(&entry.name))
                .map(|entry| join_path(&path, &entry.name)),
        );
    }
    found
}

/// Deletes stale managed files, then writes every expected record.
///
/// Deletion and listing failures are recorded and the sync continues; the first write
/// failure aborts and is returned. Files outside the managed allow-list are never touched.
pub async fn sync<D: Directory>(
    expected: &[FileRecord],
    dir: &D,
) -> Result<SyncReport, StoreError> {
    let mut report = SyncReport::default();
    let keep: BTreeSet<&str> = expected.iter().map(|record| record.path.as_str()).collect();

    for path in managed_files(dir, &mut report).await {
        if keep.contains(path.as_str()) {
            continue;
        }
        match dir.remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path, "deleted stale file");
                report.deleted.push(path);
            }
            Err(err) if err.is_not_found() => {}
            Err(err) => {
                tracing::warn!(path = %path, %err, "cannot delete stale file");
                report.failed_deletions.push(path);
            }
        }
    }

    for record in expected {
        if let Err(err) = dir.write(&record.path, record.contents.as_bytes()).await {
            tracing::warn!(path = %record.path, %err, "write failed; aborting sync");
            return Err(err);
        }
        report.written += 1;
    }

    tracing::debug!(
        written = report.written,
        deleted = report.deleted.len(),
        failed_deletions = report.failed_deletions.len(),
        "directory synchronized"
    );
    Ok(report)
}
