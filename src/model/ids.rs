// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A typed entity identifier.
///
/// Ids are always canonical hyphenated UUIDs. The original text is kept verbatim so an id
/// read from disk is written back byte-for-byte; external references (bookmarked views,
/// diagram positions) stay valid across load/save cycles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Generates a fresh random (v4) id.
    pub fn generate() -> Self {
        Self {
            value: Uuid::new_v4().hyphenated().to_string(),
            _marker: PhantomData,
        }
    }

    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_uuid(&value)?;
        Ok(Self {
            value,
            _marker: PhantomData,
        })
    }

    /// Keeps `raw` when it is a valid id, otherwise generates a fresh one.
    ///
    /// Absent or malformed ids are a normal condition on load and are corrected silently;
    /// the replacement is only visible in debug logs.
    pub fn normalize(field: &'static str, raw: Option<&str>) -> Self {
        match raw {
            Some(raw) => match Self::new(raw) {
                Ok(id) => id,
                Err(err) => {
                    let id = Self::generate();
                    tracing::debug!(field, value = raw, %err, replacement = %id, "replacing invalid id");
                    id
                }
            },
            None => {
                let id = Self::generate();
                tracing::debug!(field, replacement = %id, "generating missing id");
                id
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_string(self) -> String {
        self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl<T> Borrow<str> for Id<T> {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl<T> FromStr for Id<T> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<T> TryFrom<String> for Id<T> {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must be a hyphenated UUID")]
    NotUuid,
}

fn validate_uuid(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    // Only the canonical 36-character form; braced/urn/simple forms would not round-trip.
    if value.len() != 36 || Uuid::try_parse(value).is_err() {
        return Err(IdError::NotUuid);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorkspaceIdTag {}
pub type WorkspaceId = Id<WorkspaceIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomainIdTag {}
pub type DomainId = Id<DomainIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemIdTag {}
pub type SystemId = Id<SystemIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableIdTag {}
pub type TableId = Id<TableIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipIdTag {}
pub type RelationshipId = Id<RelationshipIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductIdTag {}
pub type ProductId = Id<ProductIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetIdTag {}
pub type AssetId = Id<AssetIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProcessIdTag {}
pub type ProcessId = Id<ProcessIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecisionIdTag {}
pub type DecisionId = Id<DecisionIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArticleIdTag {}
pub type ArticleId = Id<ArticleIdTag>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordIdTag {}
pub type RecordId = Id<RecordIdTag>;

#[cfg(test)]
mod tests {
    use super::{Id, IdError};

    #[test]
    fn id_rejects_empty() {
        let result: Result<Id<()>, _> = Id::new("");
        assert_eq!(result, Err(IdError::Empty));
    }

    #[test]
    fn id_rejects_non_canonical_uuid_forms() {
        for raw in [
            "orders",
            "{6f1c2a9e-3b0d-4c59-9a57-1c2f3e4d5a6b}",
            "6f1c2a9e3b0d4c599a571c2f3e4d5a6b",
        ] {
            let result: Result<Id<()>, _> = Id::new(raw);
            assert_eq!(result, Err(IdError::NotUuid), "{raw}");
        }
    }

    #[test]
    fn normalize_preserves_valid_ids_verbatim() {
        let raw = "6F1C2A9E-3B0D-4C59-9A57-1C2F3E4D5A6B";
        let id: Id<()> = Id::normalize("id", Some(raw));
        assert_eq!(id.as_str(), raw);
    }

    #[test]
    fn normalize_replaces_missing_and_invalid_ids() {
        let missing: Id<()> = Id::normalize("id", None);
        let invalid: Id<()> = Id::normalize("id", Some("table-1"));
        assert!(Id::<()>::new(missing.as_str()).is_ok());
        assert!(Id::<()>::new(invalid.as_str()).is_ok());
        assert_ne!(invalid.as_str(), "table-1");
        assert_ne!(missing, invalid);
    }
}
