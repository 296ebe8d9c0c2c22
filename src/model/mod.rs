// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! A workspace contains ordered domains; tables, relationships and the other resource classes
//! live in flat lists and refer to their domain (and system) by id.

#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod relationship;
pub mod resource;
pub mod table;
pub mod workspace;

pub use ids::{
    ArticleId, AssetId, DecisionId, DomainId, Id, IdError, ProcessId, ProductId, RecordId,
    RelationshipId, SystemId, TableId, WorkspaceId,
};
pub use relationship::{Cardinality, CardinalityEnd, Handles, Relationship};
pub use resource::{
    ComputeAsset, DataProduct, Decision, DecisionRecord, KnowledgeArticle, Process, ResourceKind,
};
pub use table::{Column, Table, SYSTEM_ID_KEY};
pub use workspace::{Domain, Position, System, ViewPositions, Workspace};
