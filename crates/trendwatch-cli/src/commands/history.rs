use super::history_store;
use super::prompts;
use crate::output::Output;
use crate::HistoryCommands;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_trend_config::PathManager;
use media_trend_core::{History, HistoryStore};
use media_trend_models::{Category, HistoryRecord};
use serde_json::json;

pub fn run_history(cmd: HistoryCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let (store, capacity) = history_store(&path_manager);
    let mut history = store.load(capacity)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load history from {}: {}", store.path().display(), e))?;

    match cmd {
        HistoryCommands::List { limit, category } => {
            list_history(&history, limit, category, output);
            Ok(())
        }
        HistoryCommands::Remove { key } => {
            match remove_entry(&store, &mut history, &key)? {
                Some(record) => output.success(format!("Removed '{}' ({}) from history", record.title, key)),
                None => output.warn(format!("No history entry with key '{}'", key)),
            }
            Ok(())
        }
        HistoryCommands::Clear { yes } => {
            if history.is_empty() {
                output.info("History is already empty");
                return Ok(());
            }
            let confirmed = yes || prompts::prompt_yes_no(
                &format!("Forget all {} history entries? Items may be subscribed again.", history.len()),
                Some(false),
            )?;
            if !confirmed {
                output.info("History left unchanged");
                return Ok(());
            }
            let count = clear_entries(&store, &mut history)?;
            output.success(format!("Cleared {} history entries", count));
            Ok(())
        }
    }
}

/// Drop one entry and persist; `None` when the key is unknown
fn remove_entry(store: &HistoryStore, history: &mut History, key: &str) -> Result<Option<HistoryRecord>> {
    let Some(record) = history.remove(key) else {
        return Ok(None);
    };
    store.save(history)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save history: {}", e))?;
    Ok(Some(record))
}

fn clear_entries(store: &HistoryStore, history: &mut History) -> Result<usize> {
    let count = history.len();
    history.clear();
    store.save(history)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save history: {}", e))?;
    Ok(count)
}

fn select(history: &History, limit: usize, category: Option<Category>) -> Vec<&HistoryRecord> {
    history
        .iter()
        .rev()
        .filter(|r| category.map_or(true, |c| r.category == c))
        .take(limit)
        .collect()
}

fn list_history(history: &History, limit: usize, category: Option<Category>, output: &Output) {
    let records = select(history, limit, category);

    if !output.is_human() {
        output.json(&json!({
            "total": history.len(),
            "capacity": history.capacity(),
            "entries": records,
        }));
        return;
    }

    if records.is_empty() {
        output.info("History is empty");
        return;
    }

    if !output.is_quiet() {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Key").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Rating").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Source").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Added").add_attribute(comfy_table::Attribute::Bold),
        ]);
        for record in &records {
            table.add_row(vec![
                Cell::new(&record.unique_key).fg(comfy_table::Color::Cyan),
                Cell::new(&record.title),
                Cell::new(record.year.map(|y| y.to_string()).unwrap_or_default()),
                Cell::new(format!("{:.1}", record.rating)),
                Cell::new(&record.source),
                Cell::new(record.added_at.format("%Y-%m-%d %H:%M").to_string()),
            ]);
        }
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
        println!("{}", table);
    }

    output.info(format!(
        "Showing {} of {} entries (capacity {})",
        records.len(),
        history.len(),
        history.capacity()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(category: Category, id: &str) -> HistoryRecord {
        HistoryRecord {
            title: id.to_string(),
            category,
            external_id: id.to_string(),
            tmdb_id: None,
            year: None,
            rating: 8.0,
            unique_key: HistoryRecord::key_for(category, id),
            source: "test".to_string(),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_select_newest_first_with_filter() {
        let history = History::from_records(
            vec![
                record(Category::Movie, "1"),
                record(Category::Anime, "2"),
                record(Category::Movie, "3"),
                record(Category::Movie, "4"),
            ],
            500,
        );

        let keys: Vec<_> = select(&history, 2, Some(Category::Movie))
            .into_iter()
            .map(|r| r.unique_key.as_str())
            .collect();
        assert_eq!(keys, vec!["movie:4", "movie:3"]);
        assert_eq!(select(&history, 10, None).len(), 4);
    }

    fn seeded_store(dir: &TempDir) -> (HistoryStore, History) {
        let store = HistoryStore::new(dir.path().join("history.json"));
        let history = History::from_records(
            vec![record(Category::Movie, "1"), record(Category::Series, "2")],
            500,
        );
        store.save(&history).unwrap();
        (store, history)
    }

    #[test]
    fn test_remove_entry_persists() {
        let dir = TempDir::new().unwrap();
        let (store, mut history) = seeded_store(&dir);

        let removed = remove_entry(&store, &mut history, "movie:1").unwrap();
        assert_eq!(removed.map(|r| r.unique_key), Some("movie:1".to_string()));

        let reloaded = store.load(500).unwrap();
        assert!(!reloaded.contains("movie:1"));
        assert!(reloaded.contains("series:2"));
    }

    #[test]
    fn test_remove_unknown_key_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let (store, mut history) = seeded_store(&dir);

        assert!(remove_entry(&store, &mut history, "anime:9").unwrap().is_none());
        assert_eq!(store.load(500).unwrap().len(), 2);
    }

    #[test]
    fn test_clear_entries_persists_empty_history() {
        let dir = TempDir::new().unwrap();
        let (store, mut history) = seeded_store(&dir);

        assert_eq!(clear_entries(&store, &mut history).unwrap(), 2);
        assert!(history.is_empty());
        assert!(store.load(500).unwrap().is_empty());
    }
}
