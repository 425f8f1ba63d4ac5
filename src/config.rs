use enumset::EnumSet;
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

use crate::{error::WeftError, query::ast::ClauseKind};

/// Matcher behavior knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySettings {
    /// Clause kinds that honor `any`/`all` selection over multi-valued
    /// targets (nested query expansions). Kinds outside the set fall back to
    /// `any` selection.
    #[serde(default = "default_multi_target")]
    pub multi_target: EnumSet<ClauseKind>,
}

fn default_multi_target() -> EnumSet<ClauseKind> {
    ClauseKind::In | ClauseKind::Named | ClauseKind::With | ClauseKind::LinkedFrom
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            multi_target: default_multi_target(),
        }
    }
}

/// Synchronizer behavior knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Refuse auto-connections that close a cycle onto an ancestor already
    /// reached through `Connected` edges in the current connect operation.
    #[serde(default = "default_true")]
    pub prevent_recursive_links: bool,
    /// Delete `Connected` nodes left with zero connections after a removal.
    #[serde(default = "default_true")]
    pub collect_orphans: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            prevent_recursive_links: true,
            collect_orphans: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeftConfig {
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub sync: SyncSettings,
}

impl WeftConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<WeftConfig, WeftError> {
        tracing::debug!("Attempting to read config from: {:?}", path.as_ref());
        if !path.as_ref().exists() {
            tracing::debug!("Config file not found, returning defaults.");
            return Ok(WeftConfig::default());
        }
        let content = read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<(), WeftError> {
        tracing::debug!("Attempting to write config to: {:?}", path.as_ref());
        let toml_string = toml::to_string(self)?;
        write(path, toml_string)?;
        Ok(())
    }
}
