use anyhow::Result;
use chrono::Utc;
use futures::StreamExt;
use media_trend_config::{Config, SourceSpec};
use media_trend_models::{AddedItem, Category, HistoryRecord, SubscriptionRequest, TrendItem};
use media_trend_sources::{paginate, MediaRecognizer, NotificationSink, PageSettings, SourceProvider};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, trace, warn};
use crate::dedupe::is_duplicate;
use crate::filter::{rejection, year_rejection, Thresholds};
use crate::history::{History, HistoryStore};
use crate::notify::compose;
use crate::subscriber::{SubscribeOutcome, Subscriber};

/// Everything one run needs, fixed before the run starts
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub categories: Vec<CategoryPlan>,
    pub page_settings: PageSettings,
    pub username: String,
    pub notify: bool,
    pub history_capacity: usize,
}

#[derive(Debug, Clone)]
pub struct CategoryPlan {
    pub category: Category,
    pub thresholds: Thresholds,
    /// New subscriptions per source
    pub limit: usize,
    pub sources: Vec<SourceSpec>,
}

impl RunConfig {
    /// Snapshot of the enabled categories, or just `only` when given
    pub fn from_config(config: &Config, only: Option<Category>) -> Self {
        let categories = match only {
            Some(category) => vec![category],
            None => config.enabled_categories(),
        };
        let categories = categories
            .into_iter()
            .map(|category| {
                let section = config.category(category);
                CategoryPlan {
                    category,
                    thresholds: Thresholds::for_category(category, section),
                    limit: section.limit,
                    sources: section.effective_sources(category),
                }
            })
            .collect();

        Self {
            categories,
            page_settings: PageSettings::from_config(&config.fetch),
            username: config.host.username.clone(),
            notify: config.notify.enabled,
            history_capacity: config.history.effective_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SkipCounts {
    pub filtered: usize,
    pub duplicates: usize,
    /// Already subscribed or already in the library
    pub existing: usize,
    pub unrecognized: usize,
    pub failed: usize,
}

impl SkipCounts {
    pub fn total(&self) -> usize {
        self.filtered + self.duplicates + self.existing + self.unrecognized + self.failed
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub added: Vec<AddedItem>,
    pub skipped: SkipCounts,
    pub failed_sources: Vec<String>,
    pub aborted_categories: Vec<Category>,
    pub duration: Duration,
}

/// fetch → filter → dedupe → subscribe → notify
pub struct TrendPipeline {
    sources: Arc<dyn SourceProvider>,
    subscriber: Subscriber,
    recognizer: Arc<dyn MediaRecognizer>,
    notifier: Arc<dyn NotificationSink>,
    store: HistoryStore,
}

impl TrendPipeline {
    pub fn new(
        sources: Arc<dyn SourceProvider>,
        subscriber: Subscriber,
        recognizer: Arc<dyn MediaRecognizer>,
        notifier: Arc<dyn NotificationSink>,
        store: HistoryStore,
    ) -> Self {
        Self {
            sources,
            subscriber,
            recognizer,
            notifier,
            store,
        }
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    #[instrument(skip_all)]
    pub async fn run(&self, run: &RunConfig) -> Result<RunReport> {
        let start = Instant::now();
        let mut history = self.store.load(run.history_capacity)?;
        let mut report = RunReport::default();

        info!(
            categories = run.categories.len(),
            history = history.len(),
            "Starting trend run"
        );

        for plan in &run.categories {
            self.run_category(plan, run, &mut history, &mut report).await;
        }

        if run.notify {
            if let Some(notification) = compose(&report.added) {
                if let Err(e) = self.notifier.post(&notification).await {
                    warn!("Failed to send run summary: {}", e);
                }
            }
        }

        report.duration = start.elapsed();
        info!(
            added = report.added.len(),
            skipped = report.skipped.total(),
            failed_sources = report.failed_sources.len(),
            "Trend run finished in {:.1}s",
            report.duration.as_secs_f64()
        );
        Ok(report)
    }

    async fn run_category(
        &self,
        plan: &CategoryPlan,
        run: &RunConfig,
        history: &mut History,
        report: &mut RunReport,
    ) {
        if plan.sources.iter().any(|s| s.needs_tmdb_key()) && !self.sources.has_tmdb_key() {
            error!("[{}] TMDB API key is not configured, skipping category", plan.category);
            report.aborted_categories.push(plan.category);
            return;
        }

        for spec in &plan.sources {
            self.run_source(plan, spec, run, history, report).await;
        }
    }

    async fn run_source(
        &self,
        plan: &CategoryPlan,
        spec: &SourceSpec,
        run: &RunConfig,
        history: &mut History,
        report: &mut RunReport,
    ) {
        let source = match self.sources.create(plan.category, spec) {
            Ok(source) => source,
            Err(e) => {
                warn!("[{}] Cannot build source {}: {}", plan.category, spec.display_name(), e);
                report.failed_sources.push(spec.display_name());
                return;
            }
        };
        let name = source.name().to_string();
        debug!("[{}] Reading {}", plan.category, name);

        let mut items = Box::pin(paginate(source.as_ref(), run.page_settings));
        let mut added = 0;
        while added < plan.limit {
            let item = match items.next().await {
                Some(Ok(item)) => item,
                Some(Err(e)) => {
                    warn!("[{}] {} aborted: {}", plan.category, name, e);
                    report.failed_sources.push(name.clone());
                    break;
                }
                None => break,
            };

            let Some(record) = self
                .process_item(plan, &name, item, run, history, &mut report.skipped)
                .await
            else {
                continue;
            };

            info!("[{}] Subscribed '{}' ({:.1})", plan.category, record.title, record.rating);
            report.added.push(AddedItem::from(&record));
            history.insert(record);
            if let Err(e) = self.store.save(history) {
                warn!("Failed to save history: {}", e);
            }
            added += 1;
        }

        if added >= plan.limit {
            debug!("[{}] {} reached its limit of {}", plan.category, name, plan.limit);
        }
    }

    /// Returns the record to store when the item was subscribed
    async fn process_item(
        &self,
        plan: &CategoryPlan,
        source: &str,
        item: TrendItem,
        run: &RunConfig,
        history: &History,
        skipped: &mut SkipCounts,
    ) -> Option<HistoryRecord> {
        // Unrecognized items get their year from the host, so the year rule waits
        let thresholds = if item.tmdb_id.is_none() && item.year.is_none() {
            Thresholds { min_year: 0, ..plan.thresholds }
        } else {
            plan.thresholds
        };
        if let Some(reason) = rejection(&item, &thresholds) {
            trace!("[{}] Skipping '{}': {}", plan.category, item.title, reason);
            skipped.filtered += 1;
            return None;
        }

        let key = HistoryRecord::key_for(plan.category, &item.external_id);
        if is_duplicate(&key, history) {
            trace!("[{}] Skipping '{}': already in history", plan.category, item.title);
            skipped.duplicates += 1;
            return None;
        }

        let request = match self.build_request(plan, &item, run).await {
            Ok(request) => request,
            Err(skip) => {
                match skip {
                    Skip::Filtered => skipped.filtered += 1,
                    Skip::Unrecognized => skipped.unrecognized += 1,
                }
                return None;
            }
        };

        match self.subscriber.subscribe(&request).await {
            SubscribeOutcome::Added => Some(HistoryRecord {
                title: request.title,
                category: plan.category,
                external_id: item.external_id,
                tmdb_id: Some(request.tmdb_id),
                year: request.year,
                rating: item.rating,
                unique_key: key,
                source: source.to_string(),
                added_at: Utc::now(),
            }),
            SubscribeOutcome::AlreadySubscribed | SubscribeOutcome::InLibrary => {
                skipped.existing += 1;
                None
            }
            SubscribeOutcome::Failed(_) => {
                skipped.failed += 1;
                None
            }
        }
    }

    /// Items without a TMDB id go through host recognition first
    async fn build_request(
        &self,
        plan: &CategoryPlan,
        item: &TrendItem,
        run: &RunConfig,
    ) -> Result<SubscriptionRequest, Skip> {
        let kind = item.kind.unwrap_or_else(|| plan.category.default_kind());

        if let Some(tmdb_id) = item.tmdb_id {
            return Ok(SubscriptionRequest {
                title: item.title.clone(),
                year: item.year,
                kind,
                tmdb_id,
                season: None,
                username: run.username.clone(),
            });
        }

        let media = match self.recognizer.recognize(&item.title, item.year, Some(kind)).await {
            Ok(Some(media)) => media,
            Ok(None) => {
                debug!("[{}] Could not recognize '{}'", plan.category, item.title);
                return Err(Skip::Unrecognized);
            }
            Err(e) => {
                warn!("[{}] Recognition of '{}' failed: {}", plan.category, item.title, e);
                return Err(Skip::Unrecognized);
            }
        };

        let year = media.year.or(item.year);
        if let Some(reason) = year_rejection(year, plan.thresholds.min_year) {
            trace!("[{}] Skipping '{}' after recognition: {}", plan.category, item.title, reason);
            return Err(Skip::Filtered);
        }

        let title = if media.title.trim().is_empty() {
            item.title.clone()
        } else {
            media.title
        };
        Ok(SubscriptionRequest {
            title,
            year,
            kind: media.kind,
            tmdb_id: media.tmdb_id,
            season: media.season,
            username: run.username.clone(),
        })
    }
}

enum Skip {
    Filtered,
    Unrecognized,
}
