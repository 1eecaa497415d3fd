//! Builds trend sources from configuration.
//!
//! The pipeline only sees `SourceProvider`, so tests can hand it in-memory
//! sources while the binary uses `SourceFactory` with a shared HTTP client.

use media_trend_config::{Config, SourceSpec};
use media_trend_models::Category;
use reqwest::Client;
use std::sync::Arc;
use crate::ranking::RankingSource;
use crate::tmdb::TmdbSource;
use crate::{SourceError, TrendSource};

pub trait SourceProvider: Send + Sync {
    /// Create the source described by `spec` for `category`
    fn create(&self, category: Category, spec: &SourceSpec) -> Result<Box<dyn TrendSource>, SourceError>;

    /// Whether TMDB-backed sources can be built at all
    fn has_tmdb_key(&self) -> bool;
}

pub struct SourceFactory {
    client: Arc<Client>,
    tmdb_base_url: String,
    tmdb_language: String,
    tmdb_api_key: Option<String>,
}

impl SourceFactory {
    pub fn new(client: Arc<Client>, config: &Config, tmdb_api_key: Option<String>) -> Self {
        Self {
            client,
            tmdb_base_url: config.tmdb.base_url.clone(),
            tmdb_language: config.tmdb.language.clone(),
            tmdb_api_key: tmdb_api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

impl SourceProvider for SourceFactory {
    fn create(&self, category: Category, spec: &SourceSpec) -> Result<Box<dyn TrendSource>, SourceError> {
        let kind = category.default_kind();
        match spec {
            SourceSpec::Tmdb { list, genre } => {
                let api_key = self
                    .tmdb_api_key
                    .clone()
                    .ok_or_else(|| SourceError::Config("TMDB API key is not configured".to_string()))?;
                let source = TmdbSource::new(
                    self.client.clone(),
                    &self.tmdb_base_url,
                    api_key,
                    self.tmdb_language.clone(),
                    *list,
                    *genre,
                    kind,
                )?;
                Ok(Box::new(source))
            }
            SourceSpec::Ranking(ranking) => {
                Ok(Box::new(RankingSource::new(self.client.clone(), ranking, kind)?))
            }
        }
    }

    fn has_tmdb_key(&self) -> bool {
        self.tmdb_api_key.is_some()
    }
}
