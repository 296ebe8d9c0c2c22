// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Engine configuration.
//!
//! Every field has a default, so a config file only needs the keys it changes:
//!
//! ```yaml
//! durability: durable
//! layout: compact
//! fallback_to_first_system: false
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::store::dir::WriteDurability;
use crate::store::linkage::LinkageResolver;
use crate::store::serialize::SaveLayout;

/// How deep the loader descends below the workspace root. Deep enough for
/// `{workspace}/{domain}/{file}` legacy trees opened one level above the workspace.
pub const DEFAULT_SCAN_DEPTH: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether writes are fsynced before the rename.
    pub durability: WriteDurability,
    pub layout: SaveLayout,
    /// Link tables and assets that match nothing to the only system of their domain.
    pub fallback_to_first_system: bool,
    pub scan_depth: usize,
    /// Emit a generated `README.md` next to the manifest.
    pub readme: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            durability: WriteDurability::default(),
            layout: SaveLayout::default(),
            fallback_to_first_system: true,
            scan_depth: DEFAULT_SCAN_DEPTH,
            readme: true,
        }
    }
}

impl EngineConfig {
    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn with_layout(mut self, layout: SaveLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_fallback_linkage(mut self, enabled: bool) -> Self {
        self.fallback_to_first_system = enabled;
        self
    }

    pub fn with_scan_depth(mut self, depth: usize) -> Self {
        self.scan_depth = depth;
        self
    }

    pub fn with_readme(mut self, readme: bool) -> Self {
        self.readme = readme;
        self
    }

    /// Parses a YAML config. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn linkage_resolver(&self) -> LinkageResolver {
        if self.fallback_to_first_system {
            LinkageResolver::default()
        } else {
            LinkageResolver::without_fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::{ConfigError, EngineConfig, DEFAULT_SCAN_DEPTH};
    use crate::store::dir::WriteDurability;
    use crate::store::linkage::LinkStrategy;
    use crate::store::serialize::SaveLayout;

    #[test]
    fn empty_config_is_default() {
        let config = EngineConfig::from_yaml_str("  \n").expect("parse");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.scan_depth, DEFAULT_SCAN_DEPTH);
        assert!(config.readme);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config = EngineConfig::from_yaml_str("durability: durable\nlayout: compact\n")
            .expect("parse");
        assert_eq!(config.durability, WriteDurability::Durable);
        assert_eq!(config.layout, SaveLayout::Compact);
        assert!(config.fallback_to_first_system);
    }

    #[test]
    fn disabling_fallback_drops_the_strategy() {
        let config = EngineConfig::default().with_fallback_linkage(false);
        assert!(!config
            .linkage_resolver()
            .strategies()
            .contains(&LinkStrategy::FirstSystemFallback));
        assert!(EngineConfig::default()
            .linkage_resolver()
            .strategies()
            .contains(&LinkStrategy::FirstSystemFallback));
    }

    #[test]
    fn config_file_errors_carry_the_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"scan_depth: [not, a, number]\n").expect("write");

        let err = EngineConfig::from_yaml_file(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other:?}"),
        }

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            EngineConfig::from_yaml_file(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
