use async_trait::async_trait;
use media_trend_models::{MediaKind, Notification, RecognizedMedia, SubscriptionRequest};
use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use tracing::{debug, trace};
use crate::host::api::{
    host_media_type, ApiResponse, LibraryLookup, MessageBody, RecognizeResponse, SubscribeBody,
    SubscriptionLookup,
};
use crate::http::check_status;
use crate::{MediaRecognizer, NotificationSink, SourceError, SubscriptionService};

const SUBSCRIBE_LOOKUP_PATH: &str = "/api/v1/subscribe/media";
const SUBSCRIBE_PATH: &str = "/api/v1/subscribe/";
const LIBRARY_EXISTS_PATH: &str = "/api/v1/mediaserver/exists";
const RECOGNIZE_PATH: &str = "/api/v1/media/recognize";
const MESSAGE_PATH: &str = "/api/v1/message/";

/// Client for the host media server: subscriptions, recognition and messages
#[derive(Clone)]
pub struct HostClient {
    client: Arc<Client>,
    base_url: String,
    token: String,
}

impl HostClient {
    pub fn new(client: Arc<Client>, base_url: &str, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
    }

    /// Media id in the host's `source:id` notation
    pub fn media_id(request: &SubscriptionRequest) -> String {
        format!("tmdb:{}", request.tmdb_id)
    }
}

#[async_trait]
impl SubscriptionService for HostClient {
    async fn subscription_exists(&self, request: &SubscriptionRequest) -> Result<bool, SourceError> {
        let path = format!("{}/{}", SUBSCRIBE_LOOKUP_PATH, Self::media_id(request));
        let mut builder = self.get(&path);
        if let Some(season) = request.season {
            builder = builder.query(&[("season", season)]);
        }

        let response = check_status(builder.send().await?, SUBSCRIBE_LOOKUP_PATH)?;
        let body = response.text().await?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(false);
        }
        let lookup: SubscriptionLookup = serde_json::from_str(&body)?;
        trace!(title = %request.title, exists = lookup.id.is_some(), "Subscription lookup");
        Ok(lookup.id.is_some())
    }

    async fn library_has(&self, request: &SubscriptionRequest) -> Result<bool, SourceError> {
        let response = self
            .get(LIBRARY_EXISTS_PATH)
            .query(&[
                ("tmdbid", request.tmdb_id.to_string()),
                ("type", host_media_type(request.kind).to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response, LIBRARY_EXISTS_PATH)?;
        let lookup: LibraryLookup = response.json().await?;
        Ok(lookup.exists)
    }

    async fn add_subscription(&self, request: &SubscriptionRequest) -> Result<(), SourceError> {
        debug!(title = %request.title, tmdb_id = request.tmdb_id, "Adding subscription");
        let response = self
            .post(SUBSCRIBE_PATH)
            .json(&SubscribeBody::from(request))
            .send()
            .await?;
        let response = check_status(response, SUBSCRIBE_PATH)?;
        let result: ApiResponse = response.json().await?;
        if result.success {
            Ok(())
        } else {
            Err(SourceError::Rejected(
                result.message.unwrap_or_else(|| "subscription refused".to_string()),
            ))
        }
    }
}

#[async_trait]
impl MediaRecognizer for HostClient {
    async fn recognize(
        &self,
        title: &str,
        year: Option<u32>,
        kind: Option<MediaKind>,
    ) -> Result<Option<RecognizedMedia>, SourceError> {
        let mut query = vec![("title", title.to_string())];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }
        if let Some(kind) = kind {
            query.push(("type", host_media_type(kind).to_string()));
        }

        let response = self.get(RECOGNIZE_PATH).query(&query).send().await?;
        let response = check_status(response, RECOGNIZE_PATH)?;
        let body: RecognizeResponse = response.json().await?;
        let media = body.media_info.and_then(|info| info.into_recognized(kind));
        trace!(title, recognized = media.is_some(), "Recognition result");
        Ok(media)
    }
}

#[async_trait]
impl NotificationSink for HostClient {
    async fn post(&self, notification: &Notification) -> Result<(), SourceError> {
        let body = MessageBody {
            title: &notification.title,
            text: &notification.text,
        };
        let response = self.post(MESSAGE_PATH).json(&body).send().await?;
        let response = check_status(response, MESSAGE_PATH)?;
        let result: ApiResponse = response.json().await?;
        if result.success {
            Ok(())
        } else {
            Err(SourceError::Rejected(
                result.message.unwrap_or_else(|| "message refused".to_string()),
            ))
        }
    }
}
