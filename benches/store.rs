// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use proteus::format::DefaultFormatEngine;
use proteus::model::{Column, Table, Workspace};
use proteus::store::categorize::categorize;
use proteus::store::serialize::serialize;
use proteus::store::{MemoryDirectory, SaveLayout, WorkspaceFolder};

#[derive(Debug, Clone, Copy)]
enum Case {
    Small,
    Medium,
}

impl Case {
    /// Domains, systems per domain, tables per system.
    fn shape(self) -> (usize, usize, usize) {
        match self {
            Self::Small => (2, 2, 5),
            Self::Medium => (8, 4, 25),
        }
    }
}

fn build_workspace(case: Case) -> Workspace {
    let (domains, systems, tables) = case.shape();
    let mut workspace = Workspace::new("Bench Corp");

    for d in 0..domains {
        let domain_id = workspace.add_domain(format!("Domain {d}"));
        for s in 0..systems {
            let mut group = Vec::with_capacity(tables);
            for t in 0..tables {
                let table = Table::new(
                    workspace.id.clone(),
                    domain_id.clone(),
                    format!("table_{s}_{t}"),
                )
                .with_column(Column::new("id", "uuid").primary_key())
                .with_column(Column::new("payload", "string"));
                group.push(table);
            }

            let Some(domain) = workspace.domain_mut(&domain_id) else {
                continue;
            };
            let system_id = domain.add_system(format!("System {s}"));
            if let Some(system) = domain.system_mut(&system_id) {
                system.table_ids.extend(group.iter().map(|table| table.id.clone()));
            }
            workspace.tables.extend(group);
        }
    }
    workspace
}

// Benchmark identity (keep stable): group names `store.serialize`, `store.categorize` and
// `store.load`; case ids `small` / `medium`.
fn benches_store(c: &mut Criterion) {
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(err) => panic!("cannot build runtime: {err}"),
    };
    let folder = WorkspaceFolder::default();

    let cases: Vec<_> = [(Case::Small, "small"), (Case::Medium, "medium")]
        .into_iter()
        .map(|(case, id)| {
            let workspace = build_workspace(case);
            let records = serialize(&workspace, &DefaultFormatEngine, SaveLayout::Structured)
                .expect("serialize");
            (id, workspace, records)
        })
        .collect();

    let mut group = c.benchmark_group("store.serialize");
    for (id, workspace, _) in &cases {
        group.bench_function(*id, |b| {
            b.iter(|| {
                let records =
                    serialize(black_box(workspace), &DefaultFormatEngine, SaveLayout::Structured)
                        .expect("serialize");
                black_box(records.len())
            })
        });
    }
    group.finish();

    let mut group = c.benchmark_group("store.categorize");
    for (id, _, records) in &cases {
        let paths: Vec<&str> = records.iter().map(|record| record.path.as_str()).collect();
        group.bench_function(*id, |b| {
            b.iter(|| black_box(categorize(black_box(&paths).iter().copied()).resource_count()))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("store.load");
    for (id, _, records) in &cases {
        let dir = MemoryDirectory::from_records(records);
        group.bench_function(*id, |b| {
            b.iter(|| {
                let loaded = runtime.block_on(folder.load(black_box(&dir))).expect("load");
                black_box(loaded.workspace.tables.len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benches_store);
criterion_main!(benches);
