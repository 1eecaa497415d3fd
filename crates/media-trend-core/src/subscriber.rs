use media_trend_models::SubscriptionRequest;
use media_trend_sources::SubscriptionService;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Added,
    AlreadySubscribed,
    InLibrary,
    /// Host error or refusal; the item is skipped
    Failed(String),
}

/// Asks the host about an item and subscribes it when nothing equivalent exists
#[derive(Clone)]
pub struct Subscriber {
    service: Arc<dyn SubscriptionService>,
    check_library: bool,
}

impl Subscriber {
    pub fn new(service: Arc<dyn SubscriptionService>, check_library: bool) -> Self {
        Self { service, check_library }
    }

    pub async fn subscribe(&self, request: &SubscriptionRequest) -> SubscribeOutcome {
        match self.service.subscription_exists(request).await {
            Ok(true) => {
                debug!("'{}' is already subscribed", request.title);
                return SubscribeOutcome::AlreadySubscribed;
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Subscription lookup for '{}' failed: {}", request.title, e);
                return SubscribeOutcome::Failed(e.to_string());
            }
        }

        if self.check_library {
            match self.service.library_has(request).await {
                Ok(true) => {
                    debug!("'{}' is already in the library", request.title);
                    return SubscribeOutcome::InLibrary;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!("Library lookup for '{}' failed: {}", request.title, e);
                    return SubscribeOutcome::Failed(e.to_string());
                }
            }
        }

        match self.service.add_subscription(request).await {
            Ok(()) => SubscribeOutcome::Added,
            Err(e) => {
                warn!("Failed to subscribe '{}': {}", request.title, e);
                SubscribeOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use media_trend_models::MediaKind;
    use media_trend_sources::SourceError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeHost {
        exists: bool,
        in_library: bool,
        reject: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl SubscriptionService for FakeHost {
        async fn subscription_exists(&self, _: &SubscriptionRequest) -> Result<bool, SourceError> {
            self.calls.lock().unwrap().push("exists");
            Ok(self.exists)
        }

        async fn library_has(&self, _: &SubscriptionRequest) -> Result<bool, SourceError> {
            self.calls.lock().unwrap().push("library");
            Ok(self.in_library)
        }

        async fn add_subscription(&self, _: &SubscriptionRequest) -> Result<(), SourceError> {
            self.calls.lock().unwrap().push("add");
            if self.reject {
                Err(SourceError::Rejected("already downloading".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn request() -> SubscriptionRequest {
        SubscriptionRequest {
            title: "Oppenheimer".to_string(),
            year: Some(2023),
            kind: MediaKind::Movie,
            tmdb_id: 872585,
            season: None,
            username: "trendwatch".to_string(),
        }
    }

    #[tokio::test]
    async fn test_adds_when_nothing_exists() {
        let host = Arc::new(FakeHost::default());
        let outcome = Subscriber::new(host.clone(), true).subscribe(&request()).await;
        assert_eq!(outcome, SubscribeOutcome::Added);
        assert_eq!(*host.calls.lock().unwrap(), vec!["exists", "library", "add"]);
    }

    #[tokio::test]
    async fn test_existing_subscription_short_circuits() {
        let host = Arc::new(FakeHost { exists: true, ..FakeHost::default() });
        let outcome = Subscriber::new(host.clone(), true).subscribe(&request()).await;
        assert_eq!(outcome, SubscribeOutcome::AlreadySubscribed);
        assert_eq!(*host.calls.lock().unwrap(), vec!["exists"]);
    }

    #[tokio::test]
    async fn test_library_check_is_optional() {
        let host = Arc::new(FakeHost { in_library: true, ..FakeHost::default() });
        assert_eq!(
            Subscriber::new(host.clone(), true).subscribe(&request()).await,
            SubscribeOutcome::InLibrary
        );

        let host = Arc::new(FakeHost { in_library: true, ..FakeHost::default() });
        assert_eq!(
            Subscriber::new(host.clone(), false).subscribe(&request()).await,
            SubscribeOutcome::Added
        );
        assert_eq!(*host.calls.lock().unwrap(), vec!["exists", "add"]);
    }

    #[tokio::test]
    async fn test_rejection_is_a_failure_not_a_panic() {
        let host = Arc::new(FakeHost { reject: true, ..FakeHost::default() });
        let outcome = Subscriber::new(host, true).subscribe(&request()).await;
        assert!(matches!(outcome, SubscribeOutcome::Failed(msg) if msg.contains("already downloading")));
    }
}
