//! Path utilities and XDG directory discovery

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::ConfigError;

/// XDG-compliant paths for boardchain.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self { project_dirs: ProjectDirs::from("com", "Boardchain", "boardchain") }
    }

    /// `~/.config/boardchain/`
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Xdg("failed to determine user config directory".to_string()))
    }

    /// `~/.config/boardchain/config.toml`
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// `boardchain.toml`, git-tracked project config.
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("boardchain.toml")
    }

    /// `boardchain.local.toml`, gitignored local overrides.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("boardchain.local.toml")
    }

    pub fn is_initialized(project_dir: impl AsRef<Path>) -> bool {
        Self::project_config_file(project_dir).exists()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn project_and_local_config_paths() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let project_dir = temp_dir.path();

        assert_eq!(Paths::project_config_file(project_dir), project_dir.join("boardchain.toml"));
        assert_eq!(Paths::local_config_file(project_dir), project_dir.join("boardchain.local.toml"));
        assert!(!Paths::is_initialized(project_dir));

        std::fs::write(Paths::project_config_file(project_dir), "[control_plane]\ntarget_nodes = 5\n").unwrap();
        assert!(Paths::is_initialized(project_dir));
    }
}
