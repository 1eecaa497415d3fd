use async_trait::async_trait;
use media_trend_config::TmdbList;
use media_trend_models::{MediaKind, TrendItem};
use reqwest::Client;
use std::sync::Arc;
use tracing::trace;
use crate::http::check_status;
use crate::tmdb::api;
use crate::{SourceError, TrendSource};

/// One TMDB list (trending, popular, discover, ...) for one media kind
#[derive(Clone)]
pub struct TmdbSource {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    language: String,
    list: TmdbList,
    genre: Option<u32>,
    kind: MediaKind,
    name: String,
}

impl TmdbSource {
    pub fn new(
        client: Arc<Client>,
        base_url: &str,
        api_key: String,
        language: String,
        list: TmdbList,
        genre: Option<u32>,
        kind: MediaKind,
    ) -> Result<Self, SourceError> {
        if !list.supports(kind) {
            return Err(SourceError::Config(format!(
                "TMDB list '{}' does not exist for {}",
                list.as_str(),
                kind.tmdb_segment()
            )));
        }
        let name = match genre {
            Some(genre) => format!("tmdb:{}(genre:{})", list.as_str(), genre),
            None => format!("tmdb:{}", list.as_str()),
        };
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            language,
            list,
            genre,
            kind,
            name,
        })
    }

    /// Endpoint path for the list, without query parameters
    pub fn list_path(&self) -> String {
        let segment = self.kind.tmdb_segment();
        match self.list {
            TmdbList::TrendingDay => format!("/trending/{}/day", segment),
            TmdbList::TrendingWeek => format!("/trending/{}/week", segment),
            TmdbList::Popular => format!("/{}/popular", segment),
            TmdbList::TopRated => format!("/{}/top_rated", segment),
            TmdbList::NowPlaying => "/movie/now_playing".to_string(),
            TmdbList::Upcoming => "/movie/upcoming".to_string(),
            TmdbList::AiringToday => "/tv/airing_today".to_string(),
            TmdbList::OnTheAir => "/tv/on_the_air".to_string(),
            TmdbList::Discover => format!("/discover/{}", segment),
        }
    }

    fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
            ("page", page.to_string()),
        ];
        if self.list == TmdbList::Discover {
            query.push(("sort_by", "popularity.desc".to_string()));
            if let Some(genre) = self.genre {
                query.push(("with_genres", genre.to_string()));
            }
        }
        query
    }
}

#[async_trait]
impl TrendSource for TmdbSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<TrendItem>, SourceError> {
        let path = self.list_path();
        let url = format!("{}{}", self.base_url, path);
        trace!(source = %self.name, page, path = %path, "Requesting TMDB page");

        let response = self
            .client
            .get(&url)
            .query(&self.query(page))
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = check_status(response, &path)?;
        let body = response.text().await?;

        api::parse_results(&body, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(list: TmdbList, genre: Option<u32>, kind: MediaKind) -> TmdbSource {
        TmdbSource::new(
            Arc::new(Client::new()),
            "https://api.themoviedb.org/3/",
            "key".to_string(),
            "zh-CN".to_string(),
            list,
            genre,
            kind,
        )
        .unwrap()
    }

    #[test]
    fn test_list_paths() {
        assert_eq!(
            source(TmdbList::TrendingWeek, None, MediaKind::Series).list_path(),
            "/trending/tv/week"
        );
        assert_eq!(
            source(TmdbList::TopRated, None, MediaKind::Movie).list_path(),
            "/movie/top_rated"
        );
        assert_eq!(
            source(TmdbList::Discover, Some(16), MediaKind::Series).list_path(),
            "/discover/tv"
        );
    }

    #[test]
    fn test_discover_query_carries_genre() {
        let tmdb = source(TmdbList::Discover, Some(878), MediaKind::Movie);
        let query = tmdb.query(2);
        assert!(query.contains(&("page", "2".to_string())));
        assert!(query.contains(&("sort_by", "popularity.desc".to_string())));
        assert!(query.contains(&("with_genres", "878".to_string())));
        assert_eq!(tmdb.name(), "tmdb:discover(genre:878)");
    }

    #[test]
    fn test_rejects_list_for_wrong_kind() {
        let result = TmdbSource::new(
            Arc::new(Client::new()),
            "https://api.themoviedb.org/3",
            "key".to_string(),
            "en-US".to_string(),
            TmdbList::AiringToday,
            None,
            MediaKind::Movie,
        );
        assert!(matches!(result, Err(SourceError::Config(_))));
    }
}
