use anyhow::Result;
use media_trend_config::PathManager;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Default filter when `RUST_LOG` is unset.
///
/// `-v` opens up the trendwatch crates and keeps HTTP plumbing and the cron
/// scheduler's tick logs quiet; `-vv` shows everything.
fn default_directives(verbose_level: u8, quiet: bool) -> &'static str {
    match (quiet, verbose_level) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug,hyper=warn,reqwest=info,tokio_cron_scheduler=info",
        (false, _) => "trace",
    }
}

fn env_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    let directives = default_directives(verbose_level, quiet);
    if quiet {
        return EnvFilter::new(directives);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
}

/// `RUST_LOG_JSON=true|false` wins; otherwise JSON whenever stdout is not a terminal
fn use_json() -> bool {
    match std::env::var("RUST_LOG_JSON") {
        Ok(value) => value == "true",
        Err(_) => !io::stdout().is_terminal(),
    }
}

pub fn init_logging(verbose_level: u8, quiet: bool) -> Result<()> {
    init_logging_with_file(verbose_level, quiet, None)
}

/// Where the daemon writes its log. `None` inside a container, where stderr is collected instead.
pub fn daemon_log_file() -> Option<PathBuf> {
    let paths = PathManager::default();
    if paths.is_container() || Path::new("/.dockerenv").exists() {
        return None;
    }
    Some(paths.daemon_log_file())
}

/// `trendwatch.log` rolls into `trendwatch.YYYY-MM-DD` in the same directory
fn rolling_prefix(log_path: &Path) -> Result<(&Path, &str)> {
    let dir = log_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    let prefix = log_path
        .file_stem()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename: {}", log_path.display()))?;
    Ok((dir, prefix))
}

pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let (writer, ansi) = match log_file {
        Some(log_path) => {
            let (dir, prefix) = rolling_prefix(&log_path)?;
            std::fs::create_dir_all(dir)?;
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, prefix);
            (BoxMakeWriter::new(appender), false)
        }
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    // Exactly one of the two layers is installed
    let (json_layer, text_layer) = if use_json() {
        let layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(writer);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(ansi)
            .with_writer(writer);
        (None, Some(layer))
    };

    Registry::default()
        .with(env_filter(verbose_level, quiet))
        .with(json_layer)
        .with(text_layer)
        .try_init()?;
    Ok(())
}
