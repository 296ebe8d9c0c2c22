// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use rstest::{fixture, rstest};
use serde_json::Value;

use super::{SaveMode, SaveOutcome, WorkspaceFolder};
use crate::config::EngineConfig;
use crate::model::fixtures::sample_workspace;
use crate::model::{
    ArticleId, Column, DataProduct, DomainId, KnowledgeArticle, ProductId, SystemId, Table,
    Workspace,
};
use crate::store::dir::{
    DirEntry, Directory, FsDirectory, MemoryDirectory, Permission, PresetPicker,
};
use crate::store::report::LoadIssue;
use crate::store::serialize::SaveLayout;
use crate::store::StoreError;

const MANIFEST: &str = "acmecorp.workspace.yaml";
const CRM_TABLES: &str = "odcs/acmecorp_sales_crm.odcs.yaml";
const LEDGER_TABLES: &str = "odcs/acmecorp_finance_ledger.odcs.yaml";

struct FsTestCtx {
    _tmp: tempfile::TempDir,
    folder: WorkspaceFolder,
    dir: FsDirectory,
}

impl FsTestCtx {
    fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let folder = WorkspaceFolder::default();
        let dir = folder.open_fs(tmp.path().join("acme"));
        Self {
            _tmp: tmp,
            folder,
            dir,
        }
    }
}

#[fixture]
fn ctx() -> FsTestCtx {
    FsTestCtx::new()
}

#[fixture]
fn workspace() -> Workspace {
    sample_workspace()
}

#[fixture]
fn folder() -> WorkspaceFolder {
    WorkspaceFolder::default()
}

async fn saved(folder: &WorkspaceFolder, workspace: &Workspace) -> MemoryDirectory {
    let dir = MemoryDirectory::new();
    let outcome = folder.save(workspace, &dir, SaveMode::Manual).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(_)), "{outcome:?}");
    dir
}

fn system_id(workspace: &Workspace, name: &str) -> SystemId {
    workspace
        .domains
        .iter()
        .flat_map(|domain| &domain.systems)
        .find(|system| system.name == name)
        .map(|system| system.id.clone())
        .unwrap()
}

fn table_names_in(workspace: &Workspace, system_name: &str) -> BTreeSet<String> {
    let system_id = system_id(workspace, system_name);
    let system = workspace
        .domains
        .iter()
        .find_map(|domain| domain.system(&system_id))
        .unwrap();
    workspace
        .tables
        .iter()
        .filter(|table| system.table_ids.contains(&table.id))
        .map(|table| table.name.clone())
        .collect()
}

/// Loaded and original agree on everything a save persists, ignoring list order.
fn assert_same_workspace(loaded: &Workspace, original: &Workspace) {
    assert_eq!(loaded.id, original.id);
    assert_eq!(loaded.name, original.name);
    assert_eq!(loaded.owner_id, original.owner_id);
    assert_eq!(loaded.description, original.description);
    assert_eq!(loaded.created_at, original.created_at);
    assert_eq!(loaded.last_modified_at, original.last_modified_at);
    assert_eq!(loaded.domains, original.domains);
    assert_eq!(loaded.relationships, original.relationships);

    let mut tables = loaded.tables.clone();
    tables.sort_by(|a, b| a.id.cmp(&b.id));
    let mut expected = original.tables.clone();
    expected.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(tables, expected);

    fn keys<'a, T>(items: &'a [T], key: impl Fn(&'a T) -> String) -> BTreeSet<String> {
        items.iter().map(key).collect()
    }
    assert_eq!(
        keys(&loaded.assets, |a| format!("{} {} {}", a.id, a.domain_id, a.name)),
        keys(&original.assets, |a| format!("{} {} {}", a.id, a.domain_id, a.name)),
    );
    assert_eq!(
        keys(&loaded.products, |p| format!("{} {} {}", p.id, p.domain_id, p.name)),
        keys(&original.products, |p| format!("{} {} {}", p.id, p.domain_id, p.name)),
    );
    assert_eq!(
        keys(&loaded.processes, |p| format!("{} {} {}", p.id, p.domain_id, p.name)),
        keys(&original.processes, |p| format!("{} {} {}", p.id, p.domain_id, p.name)),
    );
    assert_eq!(
        keys(&loaded.decisions, |d| format!("{} {} {}", d.id, d.domain_id, d.name)),
        keys(&original.decisions, |d| format!("{} {} {}", d.id, d.domain_id, d.name)),
    );
    assert_eq!(
        keys(&loaded.articles, |a| format!("{} {:?} {}", a.id, a.domain_id, a.title)),
        keys(&original.articles, |a| format!("{} {:?} {}", a.id, a.domain_id, a.title)),
    );
    assert_eq!(
        keys(&loaded.records, |r| format!("{} {:?} {}", r.id, r.domain_id, r.title)),
        keys(&original.records, |r| format!("{} {:?} {}", r.id, r.domain_id, r.title)),
    );
}

/// Reports full access but every write fails with permission denied.
#[derive(Debug, Clone)]
struct RevokedAfterCheck(MemoryDirectory);

impl Directory for RevokedAfterCheck {
    fn label(&self) -> String {
        "revoked".to_owned()
    }

    async fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        self.0.list(dir).await
    }

    async fn read_to_string(&self, path: &str) -> Result<String, StoreError> {
        self.0.read_to_string(path).await
    }

    async fn write(&self, path: &str, contents: &[u8]) -> Result<(), StoreError> {
        self.0.write(path, contents).await
    }

    async fn remove_file(&self, path: &str) -> Result<(), StoreError> {
        self.0.remove_file(path).await
    }
}

#[rstest]
#[tokio::test]
async fn saved_workspace_loads_back_unchanged(folder: WorkspaceFolder, workspace: Workspace) {
    let dir = saved(&folder, &workspace).await;

    let loaded = folder.load(&dir).await.unwrap();
    assert!(loaded.report.is_clean(), "{:?}", loaded.report.issues);
    assert_eq!(loaded.report.files_read, 11);
    assert_same_workspace(&loaded.workspace, &workspace);
}

#[rstest]
#[tokio::test]
async fn filesystem_round_trip_leaves_user_files_alone(ctx: FsTestCtx, workspace: Workspace) {
    let root = ctx.dir.root().to_path_buf();
    std::fs::create_dir_all(root.join("odcs")).unwrap();
    std::fs::write(root.join("odcs").join("notes.md"), "keep me").unwrap();

    let outcome = ctx
        .folder
        .save(&workspace, &ctx.dir, SaveMode::Manual)
        .await
        .unwrap();
    let SaveOutcome::Saved(report) = outcome else {
        panic!("expected a save, got {outcome:?}");
    };
    assert_eq!(report.written, 12);
    assert!(report.deleted.is_empty());

    let loaded = ctx.folder.load(&ctx.dir).await.unwrap();
    assert_same_workspace(&loaded.workspace, &workspace);
    assert_eq!(
        std::fs::read_to_string(root.join("odcs").join("notes.md")).unwrap(),
        "keep me"
    );

    let leftovers: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".proteus.tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
}

#[rstest]
#[tokio::test]
async fn saving_twice_deletes_nothing(folder: WorkspaceFolder, workspace: Workspace) {
    let dir = saved(&folder, &workspace).await;
    let before = dir.files();

    let outcome = folder.save(&workspace, &dir, SaveMode::Manual).await.unwrap();
    let SaveOutcome::Saved(report) = outcome else {
        panic!("expected a save, got {outcome:?}");
    };
    assert!(report.deleted.is_empty());
    assert_eq!(dir.removal_count(), 0);
    assert_eq!(dir.files(), before);
}

#[rstest]
#[tokio::test]
async fn removed_entities_lose_their_files(folder: WorkspaceFolder, mut workspace: Workspace) {
    let dir = saved(&folder, &workspace).await;
    dir.insert("odcs/notes.md", "mine");
    dir.insert("sketch.txt", "mine");

    workspace.tables.retain(|table| table.name != "leads");
    let outcome = folder.save(&workspace, &dir, SaveMode::Autosave).await.unwrap();
    let SaveOutcome::Saved(report) = outcome else {
        panic!("expected a save, got {outcome:?}");
    };

    assert_eq!(report.deleted, vec!["odcs/acmecorp_marketing_leads.odcs.yaml"]);
    assert!(dir.contains("odcs/notes.md"));
    assert!(dir.contains("sketch.txt"));
}

#[rstest]
#[tokio::test]
async fn manifest_membership_beats_metadata(folder: WorkspaceFolder, workspace: Workspace) {
    let dir = saved(&folder, &workspace).await;
    let crm = system_id(&workspace, "CRM");
    let warehouse = system_id(&workspace, "Warehouse");
    let orders = workspace
        .tables
        .iter()
        .find(|table| table.name == "orders")
        .map(|table| table.id.to_string())
        .unwrap();

    // The CRM file now points at Warehouse; only `customers` keeps its manifest claim.
    let crm_file = dir.read(CRM_TABLES).unwrap();
    dir.insert(
        CRM_TABLES,
        crm_file.replace(crm.as_str(), warehouse.as_str()),
    );
    let mut manifest: serde_yaml::Value =
        serde_yaml::from_str(&dir.read(MANIFEST).unwrap()).unwrap();
    manifest["domains"][0]["systems"][0]["table_ids"]
        .as_sequence_mut()
        .unwrap()
        .retain(|id| id.as_str() != Some(orders.as_str()));
    dir.insert(MANIFEST, serde_yaml::to_string(&manifest).unwrap());

    let loaded = folder.load(&dir).await.unwrap().workspace;
    assert_eq!(
        table_names_in(&loaded, "CRM"),
        BTreeSet::from(["customers".to_owned()])
    );
    assert_eq!(
        table_names_in(&loaded, "Warehouse"),
        BTreeSet::from(["orders".to_owned()])
    );
}

/// One domain with one system, one table and one product, all named after `label`.
fn add_domain_with(workspace: &mut Workspace, domain_name: &str, label: &str) -> DomainId {
    let domain_id = workspace.add_domain(domain_name);
    let table = Table::new(workspace.id.clone(), domain_id.clone(), format!("{label}_rows"))
        .with_column(Column::new("id", "uuid").primary_key());
    if let Some(domain) = workspace.domain_mut(&domain_id) {
        let system_id = domain.add_system(label);
        if let Some(system) = domain.system_mut(&system_id) {
            system.table_ids.insert(table.id.clone());
        }
    }
    workspace.tables.push(table);
    workspace.products.push(DataProduct {
        id: ProductId::generate(),
        domain_id: domain_id.clone(),
        name: format!("{label} feed"),
        payload: Default::default(),
    });
    domain_id
}

#[rstest]
#[tokio::test]
async fn same_named_domains_keep_their_own_files(folder: WorkspaceFolder) {
    let mut workspace = Workspace::new("Acme Corp");
    let first = add_domain_with(&mut workspace, "Sales", "crm");
    let second = add_domain_with(&mut workspace, "sales!", "pos");

    let dir = saved(&folder, &workspace).await;
    let loaded = folder.load(&dir).await.unwrap();
    assert!(loaded.report.is_clean(), "{:?}", loaded.report.issues);
    assert_same_workspace(&loaded.workspace, &workspace);

    let owner_of = |name: &str| {
        loaded
            .workspace
            .tables
            .iter()
            .find(|table| table.name == name)
            .map(|table| table.primary_domain_id.clone())
    };
    assert_eq!(owner_of("crm_rows"), Some(first));
    assert_eq!(owner_of("pos_rows"), Some(second));
    assert_eq!(
        table_names_in(&loaded.workspace, "pos"),
        BTreeSet::from(["pos_rows".to_owned()])
    );
}

#[rstest]
#[tokio::test]
async fn global_articles_ignore_a_matching_domain_name(folder: WorkspaceFolder) {
    let mut workspace = Workspace::new("Acme Corp");
    let glossary = workspace.add_domain("Glossary");
    for (domain_id, content) in [(None, "terms"), (None, "more terms"), (Some(glossary), "scoped")] {
        workspace.articles.push(KnowledgeArticle {
            id: ArticleId::generate(),
            domain_id,
            title: "Glossary".to_owned(),
            payload: [("content".to_owned(), Value::from(content))].into_iter().collect(),
        });
    }

    let dir = saved(&folder, &workspace).await;
    assert!(dir.read("kb/acmecorp_glossary_2.kb.yaml").is_some());

    let loaded = folder.load(&dir).await.unwrap();
    assert!(loaded.report.is_clean(), "{:?}", loaded.report.issues);
    assert_same_workspace(&loaded.workspace, &workspace);
    let global = loaded
        .workspace
        .articles
        .iter()
        .filter(|article| article.domain_id.is_none())
        .count();
    assert_eq!(global, 2);
}

#[rstest]
#[tokio::test]
async fn unparsable_table_file_is_skipped(folder: WorkspaceFolder, workspace: Workspace) {
    let dir = saved(&folder, &workspace).await;
    dir.insert(LEDGER_TABLES, "schema: [unclosed\n");

    let loaded = folder.load(&dir).await.unwrap();
    let names: BTreeSet<_> = loaded
        .workspace
        .tables
        .iter()
        .map(|table| table.name.as_str())
        .collect();
    assert_eq!(names, BTreeSet::from(["customers", "leads", "orders"]));

    let skipped: Vec<_> = loaded.report.skipped().collect();
    assert_eq!(skipped.len(), 1, "{:?}", loaded.report.issues);
    assert!(matches!(
        skipped[0],
        LoadIssue::ResourceSkipped { path, .. } if path == LEDGER_TABLES
    ));
    assert!(table_names_in(&loaded.workspace, "Ledger").is_empty());

    // The relationship whose source failed to load falls back to its target's domain.
    let invoiced = loaded
        .workspace
        .relationships
        .iter()
        .find(|r| r.notes.as_deref() == Some("billing contact"))
        .unwrap();
    let sales = &loaded.workspace.domains[0];
    assert_eq!(invoiced.domain_id.as_ref(), Some(&sales.id));
}

#[rstest]
#[tokio::test]
async fn empty_directory_is_not_a_workspace(folder: WorkspaceFolder) {
    let err = folder.load(&MemoryDirectory::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::NoWorkspaceFound), "{err:?}");
}

#[rstest]
#[tokio::test]
async fn failed_load_leaves_the_store_untouched(folder: WorkspaceFolder, workspace: Workspace) {
    let mut store = Workspace::new("Scratch");
    assert!(folder.load_into(&MemoryDirectory::new(), &mut store).await.is_err());
    assert_eq!(store.name, "Scratch");

    let dir = saved(&folder, &workspace).await;
    let report = folder.load_into(&dir, &mut store).await.unwrap();
    assert!(report.is_clean());
    assert_same_workspace(&store, &workspace);

    let copy = MemoryDirectory::new();
    let outcome = folder.save_from(&store, &copy, SaveMode::Manual).await.unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    assert_eq!(copy.files(), dir.files());
}

#[rstest]
#[case(Permission::Prompt)]
#[case(Permission::Denied)]
#[tokio::test]
async fn autosave_without_access_is_skipped(
    folder: WorkspaceFolder,
    workspace: Workspace,
    #[case] permission: Permission,
) {
    let dir = MemoryDirectory::new();
    dir.set_permission(permission);

    let outcome = folder.save(&workspace, &dir, SaveMode::Autosave).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Skipped);
    assert_eq!(dir.write_count(), 0);

    let err = folder
        .save(&workspace, &dir, SaveMode::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied { .. }), "{err:?}");
}

#[rstest]
#[tokio::test]
async fn access_lost_mid_save(folder: WorkspaceFolder, workspace: Workspace) {
    let inner = MemoryDirectory::new();
    inner.set_permission(Permission::Denied);
    let dir = RevokedAfterCheck(inner);

    let outcome = folder.save(&workspace, &dir, SaveMode::Autosave).await.unwrap();
    assert_eq!(outcome, SaveOutcome::Skipped);

    let err = folder
        .save(&workspace, &dir, SaveMode::Manual)
        .await
        .unwrap_err();
    assert!(
        matches!(&err, StoreError::PermissionDenied { path } if path == "revoked"),
        "{err:?}"
    );
}

#[rstest]
#[tokio::test]
async fn dismissed_picker_cancels_the_save(folder: WorkspaceFolder, workspace: Workspace) {
    let outcome = folder
        .save_with_picker(&workspace, &PresetPicker::<MemoryDirectory>(None), SaveMode::Manual)
        .await
        .unwrap();
    assert_eq!(outcome, SaveOutcome::Cancelled);

    let dir = MemoryDirectory::new();
    let outcome = folder
        .save_with_picker(&workspace, &PresetPicker(Some(dir.clone())), SaveMode::Manual)
        .await
        .unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved(_)));
    assert!(dir.contains(MANIFEST));
}

#[rstest]
#[tokio::test]
async fn archive_loads_like_a_directory(folder: WorkspaceFolder, workspace: Workspace) {
    let bytes = folder.export_archive(&workspace).unwrap();
    let loaded = folder.load_archive(&bytes).await.unwrap();
    assert!(loaded.report.is_clean(), "{:?}", loaded.report.issues);
    assert_same_workspace(&loaded.workspace, &workspace);
}

#[rstest]
#[tokio::test]
async fn compact_layout_round_trips(workspace: Workspace) {
    let folder = WorkspaceFolder::new(EngineConfig::default().with_layout(SaveLayout::Compact));
    let dir = saved(&folder, &workspace).await;
    assert!(dir.paths().iter().all(|path| !path.contains('/')));
    assert!(!dir.contains("README.md"));

    let loaded = folder.load(&dir).await.unwrap();
    assert_same_workspace(&loaded.workspace, &workspace);
}
