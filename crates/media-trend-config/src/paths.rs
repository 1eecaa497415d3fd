use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const BASE_PATH_ENV: &str = "TRENDWATCH_BASE_PATH";

/// Mount point of the container image unless `TRENDWATCH_BASE_PATH` says otherwise
fn container_base_path() -> PathBuf {
    std::env::var_os(BASE_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/app"))
}

/// File layout shared by the CLI and the daemon.
///
/// ```text
/// <root>/config.toml
/// <root>/credentials.toml
/// <root>/data/history.json
/// <root>/logs/trendwatch.log[.YYYY-MM-DD]
/// ```
///
/// `<root>` is the container base path when that directory exists, and
/// `<user config dir>/trendwatch` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathManager {
    root: PathBuf,
    container: bool,
}

impl PathManager {
    pub fn detect() -> Result<Self> {
        let base = container_base_path();
        if base.is_dir() {
            return Ok(Self::container(base));
        }
        let root = dirs::config_dir()
            .context("Could not determine the user config directory")?
            .join("trendwatch");
        Ok(Self::user(root))
    }

    pub fn user(root: PathBuf) -> Self {
        Self { root, container: false }
    }

    pub fn container(root: PathBuf) -> Self {
        Self { root, container: true }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the layout came from the container base path
    pub fn is_container(&self) -> bool {
        self.container
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.root.join("credentials.toml")
    }

    /// Default location; `[history] file` in the config overrides it
    pub fn history_file(&self) -> PathBuf {
        self.data_dir().join("history.json")
    }

    /// Base name for the daemon's daily rolling log
    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir().join("trendwatch.log")
    }

    fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [self.root.clone(), self.data_dir(), self.log_dir()] {
            std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::detect().unwrap_or_else(|_| Self::container(container_base_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_under_root() {
        let paths = PathManager::user(PathBuf::from("/home/ana/.config/trendwatch"));
        assert_eq!(paths.config_file(), PathBuf::from("/home/ana/.config/trendwatch/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/home/ana/.config/trendwatch/credentials.toml"));
        assert_eq!(paths.history_file(), PathBuf::from("/home/ana/.config/trendwatch/data/history.json"));
        assert_eq!(paths.daemon_log_file(), PathBuf::from("/home/ana/.config/trendwatch/logs/trendwatch.log"));
        assert!(!paths.is_container());
    }

    #[test]
    fn test_ensure_directories_creates_data_and_logs() {
        let dir = TempDir::new().unwrap();
        let paths = PathManager::container(dir.path().join("app"));
        paths.ensure_directories().unwrap();

        assert!(paths.root().join("data").is_dir());
        assert!(paths.root().join("logs").is_dir());
        assert!(paths.is_container());
    }
}
