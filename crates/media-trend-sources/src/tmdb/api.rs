use media_trend_models::{MediaKind, TrendItem};
use serde::Deserialize;
use crate::http::parse_year;
use crate::SourceError;

#[derive(Debug, Deserialize)]
struct TmdbPage {
    #[serde(default)]
    results: Vec<TmdbResult>,
}

#[derive(Debug, Deserialize)]
struct TmdbResult {
    id: u64,
    title: Option<String>,
    name: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    #[serde(default)]
    vote_average: f64,
    vote_count: Option<u32>,
    #[serde(default)]
    adult: bool,
    #[serde(default)]
    genre_ids: Vec<u32>,
    #[serde(default)]
    origin_country: Vec<String>,
    original_language: Option<String>,
    /// Only present on mixed lists
    media_type: Option<String>,
}

impl TmdbResult {
    fn kind(&self, fallback: MediaKind) -> MediaKind {
        match self.media_type.as_deref() {
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Series,
            _ => fallback,
        }
    }

    fn into_item(self, fallback: MediaKind) -> Option<TrendItem> {
        let kind = self.kind(fallback);
        // Movies carry `title`/`release_date`, shows `name`/`first_air_date`
        let (title, date) = match kind {
            MediaKind::Movie => (self.title.or(self.name), self.release_date.or(self.first_air_date)),
            MediaKind::Series => (self.name.or(self.title), self.first_air_date.or(self.release_date)),
        };
        let title = title.filter(|t| !t.trim().is_empty())?;

        Some(TrendItem {
            external_id: self.id.to_string(),
            tmdb_id: Some(self.id),
            title,
            year: date.as_deref().and_then(parse_year),
            rating: self.vote_average,
            vote_count: self.vote_count,
            adult: self.adult,
            genre_ids: self.genre_ids.into_iter().collect(),
            origin_countries: self.origin_country,
            original_language: self.original_language,
            kind: Some(kind),
        })
    }
}

/// Parse a TMDB list response (`{"results": [...]}`)
pub fn parse_results(body: &str, kind: MediaKind) -> Result<Vec<TrendItem>, SourceError> {
    let page: TmdbPage = serde_json::from_str(body)?;
    Ok(page
        .results
        .into_iter()
        .filter_map(|r| r.into_item(kind))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TV_PAGE: &str = r#"{
        "page": 1,
        "results": [
            {
                "id": 209867,
                "name": "Frieren: Beyond Journey's End",
                "first_air_date": "2023-09-29",
                "vote_average": 8.8,
                "vote_count": 412,
                "genre_ids": [16, 10759, 10765],
                "origin_country": ["JP"],
                "original_language": "ja"
            },
            {
                "id": 1399,
                "name": "Game of Thrones",
                "first_air_date": "2011-04-17",
                "vote_average": 8.4,
                "genre_ids": [10765, 18],
                "origin_country": ["US"],
                "original_language": "en"
            },
            {
                "id": 5,
                "name": "",
                "vote_average": 9.0
            }
        ],
        "total_pages": 20
    }"#;

    #[test]
    fn test_parse_tv_results() {
        let items = parse_results(TV_PAGE, MediaKind::Series).unwrap();
        assert_eq!(items.len(), 2);

        let frieren = &items[0];
        assert_eq!(frieren.external_id, "209867");
        assert_eq!(frieren.tmdb_id, Some(209867));
        assert_eq!(frieren.year, Some(2023));
        assert!(frieren.is_animation());
        assert!(frieren.is_japanese_origin());
        assert_eq!(frieren.kind, Some(MediaKind::Series));
        assert_eq!(frieren.vote_count, Some(412));
        assert!(!frieren.adult);

        assert_eq!(items[1].title, "Game of Thrones");
        assert!(!items[1].is_animation());
    }

    #[test]
    fn test_parse_movie_without_date() {
        let body = r#"{"results": [{"id": 603, "title": "The Matrix", "vote_average": 8.2, "release_date": ""}]}"#;
        let items = parse_results(body, MediaKind::Movie).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "The Matrix");
        assert_eq!(items[0].year, None);
    }

    #[test]
    fn test_parse_adult_flag_and_missing_votes() {
        let body = r#"{"results": [{"id": 7, "title": "After Hours", "vote_average": 7.5, "adult": true}]}"#;
        let items = parse_results(body, MediaKind::Movie).unwrap();
        assert!(items[0].adult);
        assert_eq!(items[0].vote_count, None);
    }

    #[test]
    fn test_missing_results_is_empty_page() {
        let items = parse_results(r#"{"page": 6}"#, MediaKind::Movie).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let err = parse_results("<html>rate limited</html>", MediaKind::Movie).unwrap_err();
        assert!(matches!(err, SourceError::Parse(_)));
    }
}
