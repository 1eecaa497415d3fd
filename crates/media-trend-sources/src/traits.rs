use async_trait::async_trait;
use media_trend_models::{MediaKind, Notification, RecognizedMedia, SubscriptionRequest, TrendItem};
use crate::SourceError;

/// A paginated trend or ranking list
#[async_trait]
pub trait TrendSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch one page (1-based). An empty page means the list is exhausted.
    async fn fetch_page(&self, page: u32) -> Result<Vec<TrendItem>, SourceError>;
}

/// Subscription bookkeeping on the host media server
#[async_trait]
pub trait SubscriptionService: Send + Sync {
    async fn subscription_exists(&self, request: &SubscriptionRequest) -> Result<bool, SourceError>;

    /// Whether a completed copy is already in the library
    async fn library_has(&self, request: &SubscriptionRequest) -> Result<bool, SourceError>;

    async fn add_subscription(&self, request: &SubscriptionRequest) -> Result<(), SourceError>;
}

/// Resolves a free-text title to host metadata
#[async_trait]
pub trait MediaRecognizer: Send + Sync {
    async fn recognize(
        &self,
        title: &str,
        year: Option<u32>,
        kind: Option<MediaKind>,
    ) -> Result<Option<RecognizedMedia>, SourceError>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn post(&self, notification: &Notification) -> Result<(), SourceError>;
}
