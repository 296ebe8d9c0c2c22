// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cross-entity linkage: table/asset → system and relationship → domain.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::loader::{DomainLoadResult, Loaded};
use super::report::{LinkedEntity, LoadIssue};
use crate::model::{DomainId, Id, Relationship, System, Table};

/// One way of finding an entity's system. Strategies are tried in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStrategy {
    /// The system lists the entity id in its manifest membership.
    ManifestMembership,
    /// The entity's `system_id` hint names a system of the same domain.
    MetadataSystemId,
    /// A system name occurs in the entity's file stem or name.
    NameMatch,
    /// The first system of the domain. Lossy.
    FirstSystemFallback,
}

impl LinkStrategy {
    pub const DEFAULT: [Self; 4] = [
        Self::ManifestMembership,
        Self::MetadataSystemId,
        Self::NameMatch,
        Self::FirstSystemFallback,
    ];
}

impl fmt::Display for LinkStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ManifestMembership => "manifest membership",
            Self::MetadataSystemId => "metadata system id",
            Self::NameMatch => "name match",
            Self::FirstSystemFallback => "first-system fallback",
        };
        f.write_str(label)
    }
}

/// The signals one entity offers for linkage.
#[derive(Debug, Clone, Copy)]
pub struct LinkCandidate<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub local_stem: &'a str,
    pub system_hint: Option<&'a str>,
}

impl<'a, T> From<(&'a Loaded<T>, &'a str, &'a str)> for LinkCandidate<'a> {
    fn from((loaded, id, name): (&'a Loaded<T>, &'a str, &'a str)) -> Self {
        Self {
            id,
            name,
            local_stem: &loaded.local_stem,
            system_hint: loaded.system_hint.as_deref(),
        }
    }
}

/// A system as seen by the resolver: its id, name and the entity ids its manifest claims.
#[derive(Debug, Clone)]
pub struct SystemClaims<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub claimed: BTreeSet<&'a str>,
}

impl<'a> SystemClaims<'a> {
    fn of<T>(system: &'a System, claimed: &'a BTreeSet<Id<T>>) -> Self {
        Self {
            id: system.id.as_str(),
            name: &system.name,
            claimed: claimed.iter().map(Id::as_str).collect(),
        }
    }
}

/// Alphanumeric, lower-cased match key; `None` when nothing is left.
fn match_key(text: &str) -> Option<String> {
    let key: String = text
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_lowercase())
        .collect();
    (!key.is_empty()).then_some(key)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkageResolver {
    strategies: Vec<LinkStrategy>,
}

impl Default for LinkageResolver {
    fn default() -> Self {
        Self::new(LinkStrategy::DEFAULT)
    }
}

impl LinkageResolver {
    pub fn new(strategies: impl IntoIterator<Item = LinkStrategy>) -> Self {
        Self {
            strategies: strategies.into_iter().collect(),
        }
    }

    /// The default order without the lossy first-system fallback.
    pub fn without_fallback() -> Self {
        Self::new(
            LinkStrategy::DEFAULT
                .into_iter()
                .filter(|strategy| *strategy != LinkStrategy::FirstSystemFallback),
        )
    }

    pub fn strategies(&self) -> &[LinkStrategy] {
        &self.strategies
    }

    /// Index of the system the candidate links to, and the strategy that decided it.
    pub fn resolve(
        &self,
        candidate: &LinkCandidate<'_>,
        systems: &[SystemClaims<'_>],
    ) -> Option<(usize, LinkStrategy)> {
        self.strategies.iter().find_map(|strategy| {
            let found = match strategy {
                LinkStrategy::ManifestMembership => systems
                    .iter()
                    .position(|system| system.claimed.contains(candidate.id)),
                LinkStrategy::MetadataSystemId => candidate
                    .system_hint
                    .and_then(|hint| systems.iter().position(|system| system.id == hint)),
                LinkStrategy::NameMatch => name_match(candidate, systems),
                LinkStrategy::FirstSystemFallback => (!systems.is_empty()).then_some(0),
            };
            found.map(|idx| (idx, *strategy))
        })
    }

    fn assign(
        &self,
        entity: LinkedEntity,
        candidates: &[LinkCandidate<'_>],
        systems: &[SystemClaims<'_>],
        issues: &mut Vec<LoadIssue>,
    ) -> Vec<Option<usize>> {
        candidates
            .iter()
            .map(|candidate| {
                let (idx, strategy) = self.resolve(candidate, systems)?;
                tracing::debug!(%entity, id = candidate.id, system = systems[idx].name, %strategy, "linked");
                if strategy == LinkStrategy::FirstSystemFallback {
                    tracing::warn!(
                        %entity,
                        id = candidate.id,
                        name = candidate.name,
                        system = systems[idx].name,
                        "no linkage signal; assigning to first system"
                    );
                    issues.push(LoadIssue::LinkageFallback {
                        entity,
                        id: candidate.id.to_owned(),
                        name: candidate.name.to_owned(),
                        system_id: systems[idx].id.to_owned(),
                    });
                }
                Some(idx)
            })
            .collect()
    }

    /// Rebuilds the domain's system membership sets from what actually loaded.
    ///
    /// Manifest claims are consumed as one signal; ids of entities that did not load are
    /// dropped.
    pub fn link_domain(&self, result: &mut DomainLoadResult) {
        let DomainLoadResult {
            domain,
            batch,
            issues,
            ..
        } = result;

        let (table_links, asset_links) = {
            let table_systems: Vec<_> = domain
                .systems
                .iter()
                .map(|system| SystemClaims::of(system, &system.table_ids))
                .collect();
            let asset_systems: Vec<_> = domain
                .systems
                .iter()
                .map(|system| SystemClaims::of(system, &system.asset_ids))
                .collect();

            let tables: Vec<_> = batch
                .tables
                .iter()
                .map(|t| LinkCandidate::from((t, t.value.id.as_str(), t.value.name.as_str())))
                .collect();
            let assets: Vec<_> = batch
                .assets
                .iter()
                .map(|a| LinkCandidate::from((a, a.value.id.as_str(), a.value.name.as_str())))
                .collect();

            (
                self.assign(LinkedEntity::Table, &tables, &table_systems, issues),
                self.assign(LinkedEntity::Asset, &assets, &asset_systems, issues),
            )
        };

        let claimed_before: usize = domain
            .systems
            .iter()
            .map(|system| system.table_ids.len() + system.asset_ids.len())
            .sum();
        for system in &mut domain.systems {
            system.table_ids.clear();
            system.asset_ids.clear();
        }
        for (table, link) in batch.tables.iter().zip(table_links) {
            if let Some(idx) = link {
                domain.systems[idx].table_ids.insert(table.value.id.clone());
            }
        }
        for (asset, link) in batch.assets.iter().zip(asset_links) {
            if let Some(idx) = link {
                domain.systems[idx].asset_ids.insert(asset.value.id.clone());
            }
        }

        let linked: usize = domain
            .systems
            .iter()
            .map(|system| system.table_ids.len() + system.asset_ids.len())
            .sum();
        if claimed_before > linked {
            tracing::debug!(
                domain = %domain.name,
                dropped = claimed_before - linked,
                "dropped manifest memberships of entities that did not load"
            );
        }
    }
}

/// Longest system name found in the stem or name; ties go to the earlier system.
fn name_match(candidate: &LinkCandidate<'_>, systems: &[SystemClaims<'_>]) -> Option<usize> {
    let haystacks: Vec<String> = [candidate.local_stem, candidate.name]
        .into_iter()
        .filter_map(match_key)
        .collect();
    if haystacks.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, system) in systems.iter().enumerate() {
        let Some(key) = match_key(system.name) else {
            continue;
        };
        let hit = haystacks.iter().any(|haystack| haystack.contains(&key));
        if hit && best.map_or(true, |(_, len)| key.len() > len) {
            best = Some((idx, key.len()));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Derives each relationship's domain from its endpoint tables: source first, then target.
///
/// Unresolvable relationships are kept with no domain and reported.
pub fn resolve_relationship_domains(
    relationships: &mut [Relationship],
    tables: &[Table],
) -> Vec<LoadIssue> {
    let domain_of: BTreeMap<&str, &DomainId> = tables
        .iter()
        .map(|table| (table.id.as_str(), &table.primary_domain_id))
        .collect();

    let mut issues = Vec::new();
    for relationship in relationships {
        let resolved = domain_of
            .get(relationship.source_table_id.as_str())
            .or_else(|| domain_of.get(relationship.target_table_id.as_str()))
            .map(|domain_id| (*domain_id).clone());
        if resolved.is_none() {
            tracing::warn!(id = %relationship.id, "relationship endpoints not loaded; domain unresolved");
            issues.push(LoadIssue::RelationshipUnresolved {
                id: relationship.id.to_string(),
            });
        }
        relationship.domain_id = resolved;
    }
    issues
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rstest::{fixture, rstest};

    use super::{
        resolve_relationship_domains, LinkCandidate, LinkStrategy, LinkageResolver, SystemClaims,
    };
    use crate::model::{
        ComputeAsset, Domain, DomainId, Relationship, Table, TableId, WorkspaceId,
    };
    use crate::store::loader::{DomainLoadResult, Loaded};
    use crate::store::report::LoadIssue;

    const CRM: &str = "11111111-1111-4111-8111-111111111111";
    const WAREHOUSE: &str = "22222222-2222-4222-8222-222222222222";

    fn systems<'a>(claimed_by_crm: &[&'a str]) -> Vec<SystemClaims<'a>> {
        vec![
            SystemClaims {
                id: CRM,
                name: "CRM",
                claimed: claimed_by_crm.iter().copied().collect(),
            },
            SystemClaims {
                id: WAREHOUSE,
                name: "Data Warehouse",
                claimed: BTreeSet::new(),
            },
        ]
    }

    fn candidate<'a>(stem: &'a str, hint: Option<&'a str>) -> LinkCandidate<'a> {
        LinkCandidate {
            id: "t-1",
            name: "orders",
            local_stem: stem,
            system_hint: hint,
        }
    }

    #[test]
    fn manifest_beats_metadata() {
        let resolver = LinkageResolver::default();
        let found = resolver.resolve(&candidate("orders", Some(WAREHOUSE)), &systems(&["t-1"]));
        assert_eq!(found, Some((0, LinkStrategy::ManifestMembership)));

        let found = resolver.resolve(&candidate("orders", Some(WAREHOUSE)), &systems(&[]));
        assert_eq!(found, Some((1, LinkStrategy::MetadataSystemId)));
    }

    #[test]
    fn name_match_prefers_longest_system_name() {
        let resolver = LinkageResolver::default();
        let mut all = systems(&[]);
        all.push(SystemClaims {
            id: "33333333-3333-4333-8333-333333333333",
            name: "warehouse",
            claimed: BTreeSet::new(),
        });

        let found = resolver.resolve(&candidate("datawarehouse_2", None), &all);
        assert_eq!(found, Some((1, LinkStrategy::NameMatch)));
        let found = resolver.resolve(&candidate("Warehouse", None), &all);
        assert_eq!(found, Some((2, LinkStrategy::NameMatch)));
    }

    #[test]
    fn fallback_is_last_and_optional() {
        let found = LinkageResolver::default().resolve(&candidate("misc", None), &systems(&[]));
        assert_eq!(found, Some((0, LinkStrategy::FirstSystemFallback)));

        let found = LinkageResolver::without_fallback().resolve(&candidate("misc", None), &systems(&[]));
        assert_eq!(found, None);
        assert_eq!(LinkageResolver::default().resolve(&candidate("misc", None), &[]), None);
    }

    #[fixture]
    fn sales() -> DomainLoadResult {
        let workspace_id = WorkspaceId::generate();
        let mut domain = Domain::new(workspace_id.clone(), "Sales");
        let crm = domain.add_system("CRM");
        domain.add_system("Billing");

        let orders = Table::new(workspace_id.clone(), domain.id.clone(), "orders");
        let misc = Table::new(workspace_id.clone(), domain.id.clone(), "misc");
        let system = domain.system_mut(&crm).expect("crm");
        system.table_ids.insert(orders.id.clone());
        system.table_ids.insert(TableId::generate());

        let mut result = DomainLoadResult::new(domain);
        result.batch.tables.push(Loaded::bare(orders));
        result.batch.tables.push(Loaded::bare(misc));
        let mut etl = Loaded::bare(ComputeAsset {
            id: crate::model::AssetId::generate(),
            domain_id: result.domain.id.clone(),
            name: "etl".to_owned(),
            system_hint: None,
            payload: Default::default(),
        });
        etl.local_stem = "billing_etl".to_owned();
        result.batch.assets.push(etl);
        result
    }

    #[rstest]
    fn link_domain_rebuilds_membership(mut sales: DomainLoadResult) {
        LinkageResolver::default().link_domain(&mut sales);

        let crm = &sales.domain.systems[0];
        let billing = &sales.domain.systems[1];
        assert_eq!(crm.table_ids.len(), 2, "claimed + fallback, dangling id dropped");
        assert!(crm.table_ids.contains(&sales.batch.tables[0].value.id));
        assert!(billing.asset_ids.contains(&sales.batch.assets[0].value.id));
        assert!(matches!(
            sales.issues.as_slice(),
            [LoadIssue::LinkageFallback { name, .. }] if name == "misc"
        ));
    }

    #[rstest]
    fn link_domain_without_fallback_leaves_entity_unassigned(mut sales: DomainLoadResult) {
        LinkageResolver::without_fallback().link_domain(&mut sales);
        assert_eq!(sales.domain.systems[0].table_ids.len(), 1);
        assert!(sales.issues.is_empty());
    }

    #[test]
    fn relationship_domain_prefers_source_then_target() {
        let workspace_id = WorkspaceId::generate();
        let sales = DomainId::generate();
        let finance = DomainId::generate();
        let orders = Table::new(workspace_id.clone(), sales.clone(), "orders");
        let invoices = Table::new(workspace_id.clone(), finance.clone(), "invoices");

        let mut relationships = vec![
            Relationship::new(workspace_id.clone(), orders.id.clone(), invoices.id.clone()),
            Relationship::new(workspace_id.clone(), TableId::generate(), invoices.id.clone()),
            Relationship::new(workspace_id.clone(), TableId::generate(), TableId::generate()),
        ];
        let issues = resolve_relationship_domains(&mut relationships, &[orders, invoices]);

        assert_eq!(relationships[0].domain_id.as_ref(), Some(&sales));
        assert_eq!(relationships[1].domain_id.as_ref(), Some(&finance));
        assert_eq!(relationships[2].domain_id, None);
        assert_eq!(
            issues,
            vec![LoadIssue::RelationshipUnresolved {
                id: relationships[2].id.to_string()
            }]
        );
    }
}
