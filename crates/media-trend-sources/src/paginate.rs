use futures::stream::{self, Stream};
use media_trend_config::{FetchConfig, MAX_PAGES};
use media_trend_models::TrendItem;
use rand::Rng;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;
use crate::{SourceError, TrendSource};

/// Pagination limits and pacing for one source
#[derive(Debug, Clone, Copy)]
pub struct PageSettings {
    pub max_pages: u32,
    pub delay: Duration,
    pub jitter: Duration,
}

impl PageSettings {
    pub fn from_config(fetch: &FetchConfig) -> Self {
        Self {
            max_pages: fetch.effective_max_pages(),
            delay: Duration::from_millis(fetch.request_delay_ms),
            jitter: Duration::from_millis(fetch.request_jitter_ms),
        }
    }

    fn next_delay(&self) -> Duration {
        if self.jitter.is_zero() {
            return self.delay;
        }
        let extra = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        self.delay + Duration::from_millis(extra)
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }
}

struct PageState {
    next_page: u32,
    buffer: VecDeque<TrendItem>,
    finished: bool,
}

/// Lazily walk a source page by page.
///
/// Pages are only requested when the consumer has drained the previous one,
/// so dropping the stream once enough items were accepted stops all further
/// requests. The stream ends on an empty page or after `max_pages`; a fetch
/// error is yielded once and ends it.
pub fn paginate<'a>(
    source: &'a dyn TrendSource,
    settings: PageSettings,
) -> impl Stream<Item = Result<TrendItem, SourceError>> + Send + 'a {
    let max_pages = settings.max_pages.clamp(1, MAX_PAGES);
    let initial = PageState {
        next_page: 1,
        buffer: VecDeque::new(),
        finished: false,
    };

    stream::unfold(initial, move |mut state| async move {
        loop {
            if let Some(item) = state.buffer.pop_front() {
                return Some((Ok(item), state));
            }
            if state.finished || state.next_page > max_pages {
                return None;
            }

            if state.next_page > 1 {
                let delay = settings.next_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let page = state.next_page;
            match source.fetch_page(page).await {
                Ok(items) if items.is_empty() => {
                    debug!(source = source.name(), page, "Empty page, source exhausted");
                    return None;
                }
                Ok(items) => {
                    debug!(source = source.name(), page, items = items.len(), "Fetched page");
                    state.buffer.extend(items);
                    state.next_page += 1;
                }
                Err(e) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FakeSource {
        pages: Vec<Result<Vec<TrendItem>, String>>,
        calls: AtomicU32,
    }

    impl FakeSource {
        fn new(pages: Vec<Result<Vec<TrendItem>, String>>) -> Self {
            Self { pages, calls: AtomicU32::new(0) }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TrendSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_page(&self, page: u32) -> Result<Vec<TrendItem>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.pages.get(page as usize - 1) {
                Some(Ok(items)) => Ok(items.clone()),
                Some(Err(msg)) => Err(SourceError::Transport(msg.clone())),
                None => Ok(Vec::new()),
            }
        }
    }

    fn page(start: usize, count: usize) -> Vec<TrendItem> {
        (start..start + count)
            .map(|i| TrendItem::new(i.to_string(), format!("Title {}", i), 8.0))
            .collect()
    }

    #[tokio::test]
    async fn test_stops_on_empty_page() {
        let source = FakeSource::new(vec![Ok(page(0, 3)), Ok(Vec::new()), Ok(page(3, 3))]);
        let items: Vec<_> = paginate(&source, PageSettings::default()).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_first_page_yields_nothing() {
        let source = FakeSource::new(vec![Ok(Vec::new())]);
        let items: Vec<_> = paginate(&source, PageSettings::default()).collect().await;

        assert!(items.is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_page_ceiling() {
        let pages = (0..8).map(|p| Ok(page(p * 2, 2))).collect();
        let source = FakeSource::new(pages);
        let settings = PageSettings { max_pages: 50, ..PageSettings::default() };
        let items: Vec<_> = paginate(&source, settings).collect().await;

        assert_eq!(items.len(), 10);
        assert_eq!(source.calls(), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_error_aborts_sequence() {
        let source = FakeSource::new(vec![
            Ok(page(0, 2)),
            Err("connection reset".to_string()),
            Ok(page(2, 2)),
        ]);
        let items: Vec<_> = paginate(&source, PageSettings::default()).collect().await;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok());
        assert!(items[1].is_ok());
        assert!(matches!(items[2], Err(SourceError::Transport(_))));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_consumer_stop_prevents_further_requests() {
        let source = FakeSource::new(vec![Ok(page(0, 4)), Ok(page(4, 4))]);
        let items: Vec<_> = paginate(&source, PageSettings::default()).take(3).collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(source.calls(), 1);
    }
}
