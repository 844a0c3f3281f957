//! Configuration loader with multi-source merging

use std::env;
use std::path::{Path, PathBuf};

use crate::{BoardchainConfig, ConfigError, Paths, Result};

pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")), env_prefix: "BOARDCHAIN".to_string() }
    }

    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(self) -> Result<BoardchainConfig> {
        let mut builder = config::Config::builder();

        let defaults = BoardchainConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults).map_err(ConfigError::Build)?);

        let paths = Paths::new();
        if let Ok(user_config_file) = paths.user_config_file() {
            if user_config_file.exists() {
                builder = builder.add_source(config::File::from(user_config_file).required(false));
            }
        }

        let project_config_file = Paths::project_config_file(&self.project_dir);
        if project_config_file.exists() {
            builder = builder.add_source(config::File::from(project_config_file).required(false));
        }

        let local_config_file = Paths::local_config_file(&self.project_dir);
        if local_config_file.exists() {
            builder = builder.add_source(config::File::from(local_config_file).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix(&self.env_prefix).separator("__").try_parsing(true));

        let built = builder.build()?;
        built.try_deserialize().map_err(ConfigError::Build)
    }

    pub fn load_or_default(self) -> BoardchainConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_built_in_defaults_with_no_files_present() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config = ConfigLoader::new().with_project_dir(temp_dir.path()).load().expect("failed to load config");
        assert_eq!(config.control_plane.target_nodes, 5);
    }

    #[test]
    fn project_config_overrides_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("boardchain.toml"), "[control_plane]\ntarget_nodes = 7\n").expect("failed to write project config");

        let config = ConfigLoader::new().with_project_dir(project_dir).load().expect("failed to load config");
        assert_eq!(config.control_plane.target_nodes, 7);
    }

    #[test]
    fn local_config_overrides_project_config() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(project_dir.join("boardchain.toml"), "[control_plane]\ntarget_nodes = 7\n").unwrap();
        fs::write(project_dir.join("boardchain.local.toml"), "[control_plane]\ntarget_nodes = 9\n").unwrap();

        let config = ConfigLoader::new().with_project_dir(project_dir).load().expect("failed to load config");
        assert_eq!(config.control_plane.target_nodes, 9);
    }
}
