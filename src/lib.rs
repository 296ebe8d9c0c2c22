// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus: workspace persistence and directory synchronization for multi-domain data-model
//! workspaces.
//!
//! A workspace is a set of domains, their systems and tables, relationships between tables and
//! a handful of companion documents (data products, compute assets, BPMN processes, DMN
//! decisions, knowledge articles and decision records). [`store::WorkspaceFolder`] loads one
//! from a directory in the current flat layout or the older folder-per-domain layout, and
//! saves it back as one file per entity.

pub mod config;
pub mod format;
pub mod logging;
pub mod model;
pub mod store;

pub use config::EngineConfig;
pub use store::{SaveMode, SaveOutcome, StoreError, WorkspaceFolder};
