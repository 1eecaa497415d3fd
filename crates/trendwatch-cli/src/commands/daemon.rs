use super::{build_executor, load_config};
use crate::output::Output;
use color_eyre::Result;
use media_trend_config::{default_scheduler_config, PathManager};
use media_trend_core::{RunError, RunExecutor, RunReport, Trigger};
use chrono_tz::Tz;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

pub struct Scheduler {
    scheduler: JobScheduler,
    executor: RunExecutor,
    cron: String,
    timezone: Tz,
}

impl Scheduler {
    pub async fn new(executor: RunExecutor, cron: String, timezone: Tz) -> Result<Self> {
        let scheduler = JobScheduler::new().await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create job scheduler: {:?}", e))?;

        Ok(Self {
            scheduler,
            executor,
            cron,
            timezone,
        })
    }

    pub async fn start(&mut self, run_on_startup: bool) -> Result<()> {
        let job_executor = self.executor.clone();
        let job = Job::new_async_tz(self.cron.as_str(), self.timezone, move |_uuid, _scheduler| {
            let executor = job_executor.clone();
            Box::pin(async move {
                let result = executor.try_run(Trigger::Scheduled).await;
                log_outcome(Trigger::Scheduled, result);
            })
        })
        .map_err(|e| color_eyre::eyre::eyre!("Invalid schedule '{}': {:?}", self.cron, e))?;

        self.scheduler.add(job).await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to register scheduled job: {:?}", e))?;
        self.scheduler.start().await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to start scheduler: {:?}", e))?;

        info!(
            operation = "scheduler_started",
            schedule = %self.cron,
            timezone = %self.timezone,
            categories = ?self.executor.categories(),
            "Scheduler started"
        );

        if run_on_startup {
            info!(operation = "scheduler_startup", "Running initial trend run on startup");
            spawn_run(&self.executor, Trigger::Startup);
        }

        self.wait_for_shutdown().await?;

        info!(operation = "scheduler_stopping", "Shutting down scheduler");
        self.scheduler.shutdown().await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to stop scheduler: {:?}", e))?;
        if self.executor.is_running() {
            info!("Waiting for the active run to finish");
            self.executor.wait_idle().await;
        }
        Ok(())
    }

    /// Serve SIGUSR1 as a manual trigger until Ctrl-C or SIGTERM
    #[cfg(unix)]
    async fn wait_for_shutdown(&self) -> Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut manual = signal(SignalKind::user_defined1())?;
        let mut terminate = signal(SignalKind::terminate())?;
        loop {
            tokio::select! {
                _ = manual.recv() => {
                    info!(operation = "manual_trigger", "Received SIGUSR1");
                    spawn_run(&self.executor, Trigger::Manual);
                }
                _ = terminate.recv() => return Ok(()),
                result = tokio::signal::ctrl_c() => return result.map_err(Into::into),
            }
        }
    }

    #[cfg(not(unix))]
    async fn wait_for_shutdown(&self) -> Result<()> {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

/// Hand a run to the executor; rejected if one is already active
fn spawn_run(executor: &RunExecutor, trigger: Trigger) {
    match executor.submit(trigger) {
        Ok(handle) => {
            tokio::spawn(async move {
                match handle.await {
                    Ok(result) => log_outcome(trigger, result),
                    Err(e) => error!(operation = "run_error", trigger = %trigger, error = %e, "Run task panicked"),
                }
            });
        }
        Err(e) => warn!(operation = "run_rejected", trigger = %trigger, "{}", e),
    }
}

fn log_outcome(trigger: Trigger, result: Result<RunReport, RunError>) {
    match result {
        Ok(report) => info!(
            operation = "run_complete",
            trigger = %trigger,
            added = report.added.len(),
            skipped = report.skipped.total(),
            failed_sources = report.failed_sources.len(),
            duration_ms = report.duration.as_millis() as u64,
            "Trend run completed"
        ),
        Err(RunError::AlreadyRunning) => warn!(
            operation = "run_rejected",
            trigger = %trigger,
            "Skipped: a run is already in progress"
        ),
        Err(e) => error!(operation = "run_error", trigger = %trigger, error = %e, "Trend run failed"),
    }
}

/// Accept standard 5-field cron by prepending a seconds field
pub fn normalize_cron(schedule: &str) -> Result<String> {
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    match fields.len() {
        5 => Ok(format!("0 {}", fields.join(" "))),
        6 | 7 => Ok(fields.join(" ")),
        n => Err(color_eyre::eyre::eyre!(
            "Cron expression '{}' has {} fields, expected 5, 6 or 7",
            schedule,
            n
        )),
    }
}

pub async fn run_daemon(
    schedule_override: Option<String>,
    run_now: bool,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;

    let scheduler_config = config.scheduler.clone().unwrap_or_else(default_scheduler_config);
    let schedule = schedule_override.unwrap_or_else(|| scheduler_config.schedule.clone());
    let cron = normalize_cron(&schedule)?;
    let run_on_startup = run_now || (scheduler_config.run_on_startup && !no_startup_run);
    let timezone = scheduler_config.tz().map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let executor = build_executor(&config, None, &path_manager)?;
    if executor.categories().is_empty() {
        output.warn("No categories are enabled; scheduled runs will do nothing.");
    }

    output.info(format!(
        "Trendwatch daemon running on schedule '{}' ({}) (Ctrl-C to stop)",
        schedule, timezone
    ));
    let mut scheduler = Scheduler::new(executor, cron, timezone).await?;
    scheduler.start(run_on_startup).await
}
