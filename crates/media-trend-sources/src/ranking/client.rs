use async_trait::async_trait;
use media_trend_config::RankingSpec;
use media_trend_models::{MediaKind, TrendItem};
use reqwest::Client;
use std::sync::Arc;
use tracing::trace;
use crate::http::{check_status, BROWSER_USER_AGENT};
use crate::ranking::parser::{parser_for, RankingParser};
use crate::{SourceError, TrendSource};

/// A single-page ranking endpoint (JSON list or HTML chart)
pub struct RankingSource {
    client: Arc<Client>,
    name: String,
    url: String,
    namespace: String,
    kind: MediaKind,
    parser: Box<dyn RankingParser>,
}

impl RankingSource {
    pub fn new(client: Arc<Client>, spec: &RankingSpec, kind: MediaKind) -> Result<Self, SourceError> {
        Ok(Self::with_parser(client, spec, kind, parser_for(spec)?))
    }

    pub fn with_parser(
        client: Arc<Client>,
        spec: &RankingSpec,
        kind: MediaKind,
        parser: Box<dyn RankingParser>,
    ) -> Self {
        Self {
            client,
            name: spec.name.clone(),
            url: spec.url.clone(),
            namespace: spec.namespace.clone(),
            kind: spec.media_kind.unwrap_or(kind),
            parser,
        }
    }

    fn referer(&self) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        Some(format!("{}://{}/", url.scheme(), url.host_str()?))
    }

    /// Parse a fetched body and namespace the ids
    pub fn items_from_body(&self, body: &str) -> Result<Vec<TrendItem>, SourceError> {
        let mut items = self.parser.parse(body, self.kind)?;
        for item in &mut items {
            item.external_id = format!("{}:{}", self.namespace, item.external_id);
        }
        Ok(items)
    }
}

#[async_trait]
impl TrendSource for RankingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<TrendItem>, SourceError> {
        // Ranking endpoints serve the whole chart on one page
        if page > 1 {
            return Ok(Vec::new());
        }
        trace!(source = %self.name, url = %self.url, "Requesting ranking page");

        let mut request = self
            .client
            .get(&self.url)
            .header("User-Agent", BROWSER_USER_AGENT);
        if let Some(referer) = self.referer() {
            request = request.header("Referer", referer);
        }

        let response = check_status(request.send().await?, &self.name)?;
        let body = response.text().await?;
        self.items_from_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_trend_config::RankingFormat;

    fn spec() -> RankingSpec {
        RankingSpec {
            name: "douban_movie_hot".to_string(),
            url: "https://movie.douban.com/j/search_subjects?type=movie&page_limit=50".to_string(),
            format: RankingFormat::Subjects,
            pattern: None,
            namespace: "douban".to_string(),
            media_kind: None,
        }
    }

    #[test]
    fn test_ids_are_namespaced() {
        let source = RankingSource::new(Arc::new(Client::new()), &spec(), MediaKind::Movie).unwrap();
        let items = source
            .items_from_body(r#"{"subjects": [{"id": "1292052", "title": "肖申克的救赎", "rate": "9.7"}]}"#)
            .unwrap();
        assert_eq!(items[0].external_id, "douban:1292052");
    }

    #[test]
    fn test_referer_is_site_root() {
        let source = RankingSource::new(Arc::new(Client::new()), &spec(), MediaKind::Movie).unwrap();
        assert_eq!(source.referer().as_deref(), Some("https://movie.douban.com/"));
    }

    #[test]
    fn test_media_kind_override() {
        let mut spec = spec();
        spec.media_kind = Some(MediaKind::Series);
        let source = RankingSource::new(Arc::new(Client::new()), &spec, MediaKind::Movie).unwrap();
        let items = source
            .items_from_body(r#"{"subjects": [{"id": "1", "title": "Show", "rate": "8"}]}"#)
            .unwrap();
        assert_eq!(items[0].kind, Some(MediaKind::Series));
    }

    #[tokio::test]
    async fn test_second_page_is_empty_without_request() {
        let mut spec = spec();
        spec.url = "http://127.0.0.1:9/unreachable".to_string();
        let source = RankingSource::new(Arc::new(Client::new()), &spec, MediaKind::Movie).unwrap();
        assert!(source.fetch_page(2).await.unwrap().is_empty());
    }
}
