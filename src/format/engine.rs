// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

use super::markup::{inject_identity, split_identity};
use super::{FormatEngine, FormatError};
use crate::model::ResourceKind;

/// Key holding the raw markup of BPMN/DMN models.
pub const MARKUP_KEY: &str = "xml";

const BPMN_SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" targetNamespace="http://bpmn.io/schema/bpmn">
</bpmn:definitions>
"#;

const DMN_SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="https://www.omg.org/spec/DMN/20191111/MODEL/" namespace="http://camunda.org/schema/1.0/dmn">
</definitions>
"#;

/// Built-in engine: YAML formats as generic documents, BPMN/DMN as opaque markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFormatEngine;

impl DefaultFormatEngine {
    fn parse_yaml(kind: ResourceKind, text: &str) -> Result<Value, FormatError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|source| FormatError::Yaml { kind, source })?;
        match value {
            Value::Object(_) => Ok(value),
            Value::Null => Err(FormatError::Empty),
            _ => Err(FormatError::NotAMapping { kind }),
        }
    }

    fn parse_markup(kind: ResourceKind, text: &str) -> Result<Value, FormatError> {
        let split = split_identity(text).map_err(|err| FormatError::Markup {
            kind,
            reason: err.to_string(),
        })?;

        let mut model = Map::new();
        if let Some(id) = split.id {
            model.insert("id".to_owned(), Value::String(id));
        }
        if let Some(name) = split.name {
            model.insert("name".to_owned(), Value::String(name));
        }
        model.insert(MARKUP_KEY.to_owned(), Value::String(split.body));
        Ok(Value::Object(model))
    }

    fn markup_to_text(kind: ResourceKind, model: &Map<String, Value>) -> Result<String, FormatError> {
        let skeleton = if kind == ResourceKind::Process {
            BPMN_SKELETON
        } else {
            DMN_SKELETON
        };
        let body = model
            .get(MARKUP_KEY)
            .and_then(Value::as_str)
            .unwrap_or(skeleton);
        let id = model.get("id").and_then(Value::as_str).unwrap_or_default();
        let name = model.get("name").and_then(Value::as_str).unwrap_or_default();

        inject_identity(body, id, name).map_err(|err| FormatError::Markup {
            kind,
            reason: err.to_string(),
        })
    }
}

impl FormatEngine for DefaultFormatEngine {
    fn parse(&self, kind: ResourceKind, text: &str) -> Result<Value, FormatError> {
        if text.trim().is_empty() {
            return Err(FormatError::Empty);
        }
        if kind.is_markup() {
            Self::parse_markup(kind, text)
        } else {
            Self::parse_yaml(kind, text)
        }
    }

    fn to_text(&self, kind: ResourceKind, model: &Value) -> Result<String, FormatError> {
        let Value::Object(map) = model else {
            return Err(FormatError::NotAMapping { kind });
        };
        if kind.is_markup() {
            Self::markup_to_text(kind, map)
        } else {
            serde_yaml::to_string(model).map_err(|source| FormatError::Yaml { kind, source })
        }
    }
}
