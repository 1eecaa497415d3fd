use super::prompts;
use crate::output::Output;
use crate::ConfigCommands;
use clap::ValueEnum;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use media_trend_config::{CategoryConfig, Config, PathManager, Secret};
use media_trend_models::Category;
use owo_colors::OwoColorize;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretKind {
    /// TMDB v3 API key
    TmdbApiKey,
    /// Bearer token for the host media server API
    HostToken,
}

impl From<SecretKind> for Secret {
    fn from(kind: SecretKind) -> Self {
        match kind {
            SecretKind::TmdbApiKey => Secret::TmdbApiKey,
            SecretKind::HostToken => Secret::HostToken,
        }
    }
}

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { host_url, force } => init_config(host_url, force, output),
        ConfigCommands::SetKey { key, value } => set_key(key, value, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Run 'trendwatch config init' to create one.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let cred_store = super::load_credentials(&path_manager)?;

    let tmdb_key = config.resolve_tmdb_api_key(cred_store.get(Secret::TmdbApiKey));
    let host_token = Config::resolve_host_token(cred_store.get(Secret::HostToken));
    let secret = |value: &Option<String>| match value {
        Some(v) if full => v.clone(),
        Some(v) => mask_string(v),
        None => "<not set>".to_string(),
    };

    if !output.is_human() {
        let categories: serde_json::Map<String, serde_json::Value> = Category::ALL
            .iter()
            .map(|c| (c.label().to_string(), category_json(*c, config.category(*c))))
            .collect();
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "host": {
                "base_url": config.host.base_url,
                "username": config.host.username,
                "check_library": config.host.check_library,
                "token": secret(&host_token),
            },
            "tmdb": {
                "language": config.tmdb.language,
                "base_url": config.tmdb.base_url,
                "api_key": secret(&tmdb_key),
            },
            "scheduler": config.scheduler.as_ref().map(|s| json!({
                "schedule": s.schedule,
                "timezone": s.timezone,
                "run_on_startup": s.run_on_startup,
            })),
            "notify": config.notify.enabled,
            "history_capacity": config.history.effective_capacity(),
            "categories": categories,
        }));
        return Ok(());
    }

    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{}\n", config_file.display().to_string().dimmed());

    let mut general = Table::new();
    general.set_header(vec![
        Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
    ]);
    general.add_row(vec![Cell::new("Host URL"), Cell::new(&config.host.base_url)]);
    general.add_row(vec![Cell::new("Host token"), Cell::new(secret(&host_token))]);
    general.add_row(vec![Cell::new("Subscriber name"), Cell::new(&config.host.username)]);
    general.add_row(vec![Cell::new("Check library"), Cell::new(config.host.check_library.to_string())]);
    general.add_row(vec![Cell::new("TMDB API key"), Cell::new(secret(&tmdb_key))]);
    general.add_row(vec![Cell::new("TMDB language"), Cell::new(&config.tmdb.language)]);
    if let Some(ref scheduler) = config.scheduler {
        general.add_row(vec![Cell::new("Schedule"), Cell::new(&scheduler.schedule)]);
        general.add_row(vec![Cell::new("Timezone"), Cell::new(&scheduler.timezone)]);
        general.add_row(vec![Cell::new("Run on startup"), Cell::new(scheduler.run_on_startup.to_string())]);
    }
    general.add_row(vec![Cell::new("Notify"), Cell::new(config.notify.enabled.to_string())]);
    general.add_row(vec![
        Cell::new("History capacity"),
        Cell::new(config.history.effective_capacity().to_string()),
    ]);
    general.load_preset(comfy_table::presets::UTF8_FULL);
    general.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}\n", general);

    let mut categories = Table::new();
    categories.set_header(vec![
        Cell::new("Category").fg(comfy_table::Color::Cyan).add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Enabled").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Min rating").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Min year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Min votes").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Limit").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Sources").add_attribute(comfy_table::Attribute::Bold),
    ]);
    for category in Category::ALL {
        let section = config.category(category);
        let sources: Vec<String> = section
            .effective_sources(category)
            .iter()
            .map(|s| s.display_name())
            .collect();
        categories.add_row(vec![
            Cell::new(category.label()),
            Cell::new(if section.enabled { "yes" } else { "no" }),
            Cell::new(format!("{:.1}", section.min_rating)),
            Cell::new(if section.min_year == 0 { "-".to_string() } else { section.min_year.to_string() }),
            Cell::new(section.min_votes.to_string()),
            Cell::new(section.limit.to_string()),
            Cell::new(sources.join("\n")),
        ]);
    }
    categories.load_preset(comfy_table::presets::UTF8_FULL);
    categories.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", categories);

    Ok(())
}

fn category_json(category: Category, section: &CategoryConfig) -> serde_json::Value {
    json!({
        "enabled": section.enabled,
        "min_rating": section.min_rating,
        "min_year": section.min_year,
        "min_votes": section.min_votes,
        "limit": section.limit,
        "exclude_anime": section.exclude_anime,
        "sources": section
            .effective_sources(category)
            .iter()
            .map(|s| s.display_name())
            .collect::<Vec<_>>(),
    })
}

fn init_config(host_url: Option<String>, force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at {}", config_file.display()));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    let host_url = match host_url {
        Some(url) => url,
        None => prompts::prompt_string("Host media server URL", Some("http://localhost:3000"))?,
    };

    let config = Config::template(host_url.trim());
    config.validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;
    config.save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    output.println("Next steps:");
    output.println("  trendwatch config set-key host-token");
    output.println("  trendwatch config set-key tmdb-api-key");
    Ok(())
}

fn set_key(kind: SecretKind, value: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager.ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let secret = Secret::from(kind);
    let label = secret.label();
    let value = match value {
        Some(v) => v.trim().to_string(),
        None => prompts::prompt_secret(label)?,
    };
    if value.is_empty() {
        return Err(color_eyre::eyre::eyre!("{} cannot be empty", label));
    }

    let mut cred_store = super::load_credentials(&path_manager)?;
    cred_store.set(secret, value);
    cred_store.save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {:#}", e))?;

    output.success(format!("{} saved to {}", label, cred_store.path().display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
