use super::history_store;
use crate::output::Output;
use color_eyre::Result;
use media_trend_config::PathManager;
use std::fs;

pub fn run_clear(all: bool, history: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_history(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("History and credentials cleared");
        return Ok(());
    }

    if !history && !credentials {
        output.warn("No clear option specified. Use --history, --credentials, or --all");
        output.println("\nExample: trendwatch clear --history");
        return Ok(());
    }

    if history {
        clear_history(&path_manager, output)?;
    }
    if credentials {
        clear_credentials(&path_manager, output)?;
    }
    Ok(())
}

fn clear_history(path_manager: &PathManager, output: &Output) -> Result<()> {
    let (store, _) = history_store(path_manager);
    let history_file = store.path();

    if history_file.exists() {
        fs::remove_file(history_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to remove history at {}: {}", history_file.display(), e))?;
        output.success(format!("Cleared history: {}", history_file.display()));
    } else {
        output.info("No history file found to clear");
    }
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if credentials_file.exists() {
        fs::remove_file(&credentials_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to remove credentials file at {}: {}", credentials_file.display(), e))?;
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }
    Ok(())
}
