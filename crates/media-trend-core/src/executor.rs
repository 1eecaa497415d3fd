use media_trend_models::Category;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use crate::pipeline::{RunConfig, RunReport, TrendPipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Scheduled,
    Startup,
    Manual,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trigger::Scheduled => "scheduled",
            Trigger::Startup => "startup",
            Trigger::Manual => "manual",
        })
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("run failed: {0:#}")]
    Failed(#[from] anyhow::Error),
}

/// Runs the pipeline at most once at a time.
///
/// A trigger that arrives while a run is active is rejected rather than
/// queued, so scheduled and manual runs never share the history file.
#[derive(Clone)]
pub struct RunExecutor {
    pipeline: Arc<TrendPipeline>,
    run_config: Arc<RunConfig>,
    slot: Arc<Mutex<()>>,
}

impl RunExecutor {
    pub fn new(pipeline: TrendPipeline, run_config: RunConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            run_config: Arc::new(run_config),
            slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    /// Resolves once no run holds the slot
    pub async fn wait_idle(&self) {
        let _guard = self.slot.lock().await;
    }

    pub fn categories(&self) -> Vec<Category> {
        self.run_config.categories.iter().map(|p| p.category).collect()
    }

    fn acquire(&self, trigger: Trigger) -> Result<OwnedMutexGuard<()>, RunError> {
        self.slot.clone().try_lock_owned().map_err(|_| {
            warn!("Ignoring {} trigger: a run is already in progress", trigger);
            RunError::AlreadyRunning
        })
    }

    /// Run now and wait for the report
    pub async fn try_run(&self, trigger: Trigger) -> Result<RunReport, RunError> {
        let _guard = self.acquire(trigger)?;
        info!("Starting {} run", trigger);
        Ok(self.pipeline.run(&self.run_config).await?)
    }

    /// Claim the slot now and run in the background
    pub fn submit(&self, trigger: Trigger) -> Result<JoinHandle<Result<RunReport, RunError>>, RunError> {
        let guard = self.acquire(trigger)?;
        let pipeline = self.pipeline.clone();
        let run_config = self.run_config.clone();
        info!("Starting {} run", trigger);
        Ok(tokio::spawn(async move {
            let _guard = guard;
            Ok(pipeline.run(&run_config).await?)
        }))
    }
}
