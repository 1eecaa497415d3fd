use super::run_ui::RunUI;
use super::{build_executor, load_config};
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_trend_config::PathManager;
use media_trend_core::{RunReport, Trigger};
use media_trend_models::Category;

pub async fn run_once(category: Option<Category>, output: &Output) -> Result<()> {
    tracing::debug!("Run command started");

    let path_manager = PathManager::default();
    let config = load_config(&path_manager)?;
    let executor = build_executor(&config, category, &path_manager)?;

    if executor.categories().is_empty() {
        output.warn("No categories are enabled. Enable [movie], [series] or [anime] in the config, or pass --category.");
        return Ok(());
    }

    let ui = RunUI::new(output.is_human() && !output.is_quiet(), "Fetching trending lists...");
    let result = executor.try_run(Trigger::Manual).await;
    ui.finish();

    let report = result.map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    print_report(&report, output);
    Ok(())
}

pub fn print_report(report: &RunReport, output: &Output) {
    if !output.is_human() {
        match serde_json::to_value(report) {
            Ok(mut value) => {
                value["success"] = serde_json::Value::Bool(true);
                output.json(&value);
            }
            Err(e) => output.error(format!("Failed to serialize run report: {}", e)),
        }
        return;
    }

    for category in &report.aborted_categories {
        output.warn(format!("[{}] skipped: TMDB API key is not configured", category));
    }
    for source in &report.failed_sources {
        output.warn(format!("{} failed, see the log for details", source));
    }

    if report.added.is_empty() {
        output.success(format!(
            "Nothing new to subscribe ({} items skipped) in {:.1}s",
            report.skipped.total(),
            report.duration.as_secs_f64()
        ));
        return;
    }

    if !output.is_quiet() {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Category").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Source").add_attribute(comfy_table::Attribute::Bold),
        ]);
        for item in &report.added {
            table.add_row(vec![
                Cell::new(item.category.label()),
                Cell::new(&item.title),
                Cell::new(item.year.map(|y| y.to_string()).unwrap_or_default()),
                Cell::new(format!("{:.1}", item.rating)),
                Cell::new(&item.source),
            ]);
        }
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
        println!("{}", table);
    }

    output.success(format!(
        "Subscribed {} new item(s), skipped {} in {:.1}s",
        report.added.len(),
        report.skipped.total(),
        report.duration.as_secs_f64()
    ));
}
