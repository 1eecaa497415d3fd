//! Wire types of the host media server API.

use media_trend_models::{MediaKind, RecognizedMedia, SubscriptionRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::http::parse_year;

/// Body of `POST /api/v1/subscribe/`
#[derive(Debug, Serialize)]
pub struct SubscribeBody<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub media_type: &'static str,
    pub tmdbid: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    pub username: &'a str,
}

impl<'a> From<&'a SubscriptionRequest> for SubscribeBody<'a> {
    fn from(request: &'a SubscriptionRequest) -> Self {
        Self {
            name: &request.title,
            year: request.year.map(|y| y.to_string()),
            media_type: host_media_type(request.kind),
            tmdbid: request.tmdb_id,
            season: request.season,
            username: &request.username,
        }
    }
}

/// Generic `{success, message}` envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/v1/subscribe/media/{mediaid}` answers with the subscription or an empty object
#[derive(Debug, Deserialize)]
pub struct SubscriptionLookup {
    #[serde(default)]
    pub id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryLookup {
    #[serde(default)]
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecognizeResponse {
    #[serde(default)]
    pub media_info: Option<HostMediaInfo>,
}

#[derive(Debug, Deserialize)]
pub struct HostMediaInfo {
    #[serde(default)]
    pub tmdb_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Value,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub season: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody<'a> {
    pub title: &'a str,
    pub text: &'a str,
}

pub fn host_media_type(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "tv",
    }
}

fn parse_media_type(raw: &str) -> Option<MediaKind> {
    match raw.trim().to_lowercase().as_str() {
        "movie" | "电影" => Some(MediaKind::Movie),
        "tv" | "series" | "电视剧" => Some(MediaKind::Series),
        _ => None,
    }
}

impl HostMediaInfo {
    /// `None` when the host could not pin down a TMDB id
    pub fn into_recognized(self, fallback: Option<MediaKind>) -> Option<RecognizedMedia> {
        let tmdb_id = self.tmdb_id.filter(|id| *id > 0)?;
        let kind = self
            .media_type
            .as_deref()
            .and_then(parse_media_type)
            .or(fallback)?;
        let year = match &self.year {
            Value::String(s) => parse_year(s),
            Value::Number(n) => n.as_u64().map(|y| y as u32),
            _ => None,
        };
        Some(RecognizedMedia {
            tmdb_id,
            title: self.title.unwrap_or_default(),
            year,
            kind,
            season: self.season,
        })
    }
}
