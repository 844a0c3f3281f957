//! Configuration management for boardchain.
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, merged by `boardchain-cli`)
//! 2. Environment variables (`BOARDCHAIN_*` prefix)
//! 3. `boardchain.local.toml` (gitignored, local overrides)
//! 4. `boardchain.toml` (git-tracked, project config)
//! 5. `~/.config/boardchain/config.toml` (user defaults)
//! 6. Built-in defaults (lowest precedence)

mod error;
mod loader;
mod paths;

pub use error::{ConfigError, Result};
pub use loader::ConfigLoader;
pub use paths::Paths;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything either process type reads off disk/env before CLI flags are
/// layered on top.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardchainConfig {
    pub control_plane: ControlPlaneConfig,
    pub data_node: DataNodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    pub target_nodes: usize,
    pub data_exec: PathBuf,
    pub logs_dir: PathBuf,
    pub tick_interval_ms: u64,
    pub settle_ms: u64,
    /// Base directory for raft log/hardstate/snapshot persistence. Each
    /// replica writes under `data_dir/data_<id>/`.
    pub data_dir: PathBuf,
}

impl Default for ControlPlaneConfig {
    fn default() -> Self {
        Self {
            target_nodes: 5,
            data_exec: PathBuf::from("boardchain-data-node"),
            logs_dir: PathBuf::from(".boardchain/logs"),
            tick_interval_ms: 2_000,
            settle_ms: 50,
            data_dir: PathBuf::from(".boardchain/data"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataNodeConfig {
    pub logs_dir: PathBuf,
}

impl Default for DataNodeConfig {
    fn default() -> Self {
        Self { logs_dir: PathBuf::from(".boardchain/logs") }
    }
}

impl BoardchainConfig {
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    pub fn load_from_dir(project_dir: impl AsRef<std::path::Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_cli_defaults() {
        let config = BoardchainConfig::default();
        assert_eq!(config.control_plane.target_nodes, 5);
    }
}
