// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Resource format parsing/export.
//!
//! The store never interprets format content itself: it hands file text to a [`FormatEngine`]
//! and gets back a neutral structured model (a JSON object), and the reverse on save. The
//! bundled [`DefaultFormatEngine`] treats the YAML formats (ODCS, ODPS, CADS, knowledge
//! articles, decision records) as plain YAML documents and BPMN/DMN as opaque markup whose
//! root `definitions` element carries the identity attributes.

pub mod engine;
pub mod markup;

use serde_json::Value;

use crate::model::ResourceKind;

pub use engine::DefaultFormatEngine;

/// The per-format conversion service the store delegates to.
pub trait FormatEngine: Send + Sync {
    /// Parses file text into a structured model. The result must be a JSON object.
    fn parse(&self, kind: ResourceKind, text: &str) -> Result<Value, FormatError>;

    /// Renders a structured model back to file text.
    fn to_text(&self, kind: ResourceKind, model: &Value) -> Result<String, FormatError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("document is empty")]
    Empty,
    #[error("{kind} document must be a mapping")]
    NotAMapping { kind: ResourceKind },
    #[error("invalid {kind} yaml: {source}")]
    Yaml {
        kind: ResourceKind,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {kind} markup: {reason}")]
    Markup { kind: ResourceKind, reason: String },
}
