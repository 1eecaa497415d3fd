use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Secrets trendwatch needs at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secret {
    TmdbApiKey,
    HostToken,
}

impl Secret {
    pub fn label(&self) -> &'static str {
        match self {
            Secret::TmdbApiKey => "TMDB API key",
            Secret::HostToken => "Host API token",
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SecretsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tmdb_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host_api_token: Option<String>,
}

impl SecretsFile {
    fn slot(&mut self, secret: Secret) -> &mut Option<String> {
        match secret {
            Secret::TmdbApiKey => &mut self.tmdb_api_key,
            Secret::HostToken => &mut self.host_api_token,
        }
    }
}

/// `credentials.toml`, kept apart from `config.toml` so the config can be
/// shared without leaking the TMDB key or the host token.
pub struct CredentialStore {
    path: PathBuf,
    secrets: SecretsFile,
}

impl CredentialStore {
    /// Read the store at `path`; a missing file is an empty store
    pub fn open(path: PathBuf) -> Result<Self> {
        let secrets = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        } else {
            SecretsFile::default()
        };
        Ok(Self { path, secrets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Blank values count as unset
    pub fn get(&self, secret: Secret) -> Option<&String> {
        let value = match secret {
            Secret::TmdbApiKey => self.secrets.tmdb_api_key.as_ref(),
            Secret::HostToken => self.secrets.host_api_token.as_ref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, secret: Secret, value: String) {
        *self.secrets.slot(secret) = Some(value);
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(&self.secrets)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;
        restrict_to_owner(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}
