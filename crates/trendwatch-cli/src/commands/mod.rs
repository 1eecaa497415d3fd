pub mod clear;
pub mod config;
pub mod daemon;
pub mod history;
pub mod prompts;
pub mod run;
pub mod run_ui;

use color_eyre::Result;
use media_trend_config::{Config, CredentialStore, PathManager, Secret, MAX_HISTORY_CAPACITY};
use media_trend_core::{HistoryStore, RunConfig, RunExecutor, Subscriber, TrendPipeline};
use media_trend_models::Category;
use media_trend_sources::http::build_client;
use media_trend_sources::{HostClient, SourceFactory};
use std::sync::Arc;
use tracing::debug;

/// Load and validate the configuration file
pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found at {}. Run 'trendwatch config init' to create one.",
            config_file.display()
        ));
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Configuration validation failed: {}", e))?;
    Ok(config)
}

pub fn load_credentials(path_manager: &PathManager) -> Result<CredentialStore> {
    CredentialStore::open(path_manager.credentials_file())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {:#}", e))
}

/// History file and capacity, taken from the config when there is one
pub fn history_store(path_manager: &PathManager) -> (HistoryStore, usize) {
    let config = Config::load_from_file(&path_manager.config_file()).ok();
    let path = config
        .as_ref()
        .and_then(|c| c.history.file.clone())
        .unwrap_or_else(|| path_manager.history_file());
    let capacity = config
        .map(|c| c.history.effective_capacity())
        .unwrap_or(MAX_HISTORY_CAPACITY);
    (HistoryStore::new(path), capacity)
}

/// Wire the pipeline to the host and the configured sources
pub fn build_executor(config: &Config, only: Option<Category>, path_manager: &PathManager) -> Result<RunExecutor> {
    let cred_store = load_credentials(path_manager)?;

    let token = Config::resolve_host_token(cred_store.get(Secret::HostToken)).ok_or_else(|| {
        color_eyre::eyre::eyre!(
            "Host API token is not configured. Run 'trendwatch config set-key host-token' or set TRENDWATCH_HOST_TOKEN."
        )
    })?;
    let tmdb_api_key = config.resolve_tmdb_api_key(cred_store.get(Secret::TmdbApiKey));
    if tmdb_api_key.is_none() {
        debug!("No TMDB API key configured, categories with TMDB sources will be skipped");
    }

    let client = Arc::new(
        build_client(&config.fetch).map_err(|e| color_eyre::eyre::eyre!("{}", e))?,
    );
    let host = Arc::new(HostClient::new(client.clone(), &config.host.base_url, token));
    let factory = SourceFactory::new(client, config, tmdb_api_key);

    let history_path = config
        .history
        .file
        .clone()
        .unwrap_or_else(|| path_manager.history_file());

    let pipeline = TrendPipeline::new(
        Arc::new(factory),
        Subscriber::new(host.clone(), config.host.check_library),
        host.clone(),
        host,
        HistoryStore::new(history_path),
    );
    Ok(RunExecutor::new(pipeline, RunConfig::from_config(config, only)))
}
