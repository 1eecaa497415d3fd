use chrono_tz::Tz;
use media_trend_models::{Category, MediaKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Hard ceiling on pages pulled from any one source per run
pub const MAX_PAGES: u32 = 5;

/// Hard ceiling on the number of history records kept
pub const MAX_HISTORY_CAPACITY: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    pub host: HostConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default = "default_movie_config")]
    pub movie: CategoryConfig,
    #[serde(default = "default_series_config")]
    pub series: CategoryConfig,
    #[serde(default = "default_anime_config")]
    pub anime: CategoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_schedule")]
    pub schedule: String,
    /// IANA zone the schedule is evaluated in
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub run_on_startup: bool,
}

impl SchedulerConfig {
    pub fn tz(&self) -> anyhow::Result<Tz> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("scheduler.timezone '{}' is not a known time zone: {}", self.timezone, e))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    /// Overrides the key from the credential store and `TMDB_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub base_url: String,
    /// Recorded on each subscription as the requesting user
    #[serde(default = "default_username")]
    pub username: String,
    /// Also ask the host whether a completed copy already sits in the library
    #[serde(default = "default_true")]
    pub check_library: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    /// Random extra delay in `0..=request_jitter_ms`
    #[serde(default)]
    pub request_jitter_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    #[serde(default)]
    pub proxy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 0 disables the check
    #[serde(default = "default_min_rating")]
    pub min_rating: f64,
    /// 0 disables the check
    #[serde(default)]
    pub min_year: u32,
    /// Minimum TMDB vote count; items without a count are not checked
    #[serde(default = "default_min_votes")]
    pub min_votes: u32,
    /// Maximum number of new subscriptions per source per run
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    /// Skip items that also qualify as anime (only meaningful for `[series]`)
    #[serde(default)]
    pub exclude_anime: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceSpec {
    Tmdb {
        list: TmdbList,
        #[serde(default)]
        genre: Option<u32>,
    },
    Ranking(RankingSpec),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TmdbList {
    TrendingDay,
    TrendingWeek,
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
    AiringToday,
    OnTheAir,
    Discover,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingSpec {
    pub name: String,
    pub url: String,
    pub format: RankingFormat,
    /// Regex with named groups `id`, `title`, `rating` and optionally `year`
    #[serde(default)]
    pub pattern: Option<String>,
    /// Prefix for item ids so they cannot collide with TMDB ids
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub media_kind: Option<MediaKind>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RankingFormat {
    /// `{"subjects": [{"id", "title", "rate"}]}`
    Subjects,
    /// TMDB-shaped `{"results": [...]}`
    Results,
    /// HTML matched with a configured regex
    Pattern,
}

impl TmdbList {
    pub fn as_str(&self) -> &'static str {
        match self {
            TmdbList::TrendingDay => "trending_day",
            TmdbList::TrendingWeek => "trending_week",
            TmdbList::Popular => "popular",
            TmdbList::TopRated => "top_rated",
            TmdbList::NowPlaying => "now_playing",
            TmdbList::Upcoming => "upcoming",
            TmdbList::AiringToday => "airing_today",
            TmdbList::OnTheAir => "on_the_air",
            TmdbList::Discover => "discover",
        }
    }

    /// Whether TMDB serves this list for the given kind
    pub fn supports(&self, kind: MediaKind) -> bool {
        match self {
            TmdbList::NowPlaying | TmdbList::Upcoming => kind == MediaKind::Movie,
            TmdbList::AiringToday | TmdbList::OnTheAir => kind == MediaKind::Series,
            _ => true,
        }
    }
}

impl RankingFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingFormat::Subjects => "subjects",
            RankingFormat::Results => "results",
            RankingFormat::Pattern => "pattern",
        }
    }

    /// Whether parsed items carry the genre and origin data the anime rules need
    pub fn carries_genres(&self) -> bool {
        matches!(self, RankingFormat::Results)
    }
}

impl SourceSpec {
    pub fn display_name(&self) -> String {
        match self {
            SourceSpec::Tmdb { list, genre: Some(genre) } => {
                format!("tmdb:{}(genre:{})", list.as_str(), genre)
            }
            SourceSpec::Tmdb { list, genre: None } => format!("tmdb:{}", list.as_str()),
            SourceSpec::Ranking(spec) => spec.name.clone(),
        }
    }

    pub fn needs_tmdb_key(&self) -> bool {
        matches!(self, SourceSpec::Tmdb { .. })
    }
}

impl CategoryConfig {
    /// Configured sources, or the built-in default list for the category
    pub fn effective_sources(&self, category: Category) -> Vec<SourceSpec> {
        if !self.sources.is_empty() {
            return self.sources.clone();
        }
        let list = match category {
            Category::Movie => TmdbList::TrendingDay,
            Category::Series | Category::Anime => TmdbList::TrendingWeek,
        };
        vec![SourceSpec::Tmdb { list, genre: None }]
    }
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 10 * * *".to_string() // Daily at 10:00
}

/// `TZ` when it names an IANA zone, else UTC
fn default_timezone() -> String {
    std::env::var("TZ")
        .ok()
        .map(|tz| tz.trim().to_string())
        .filter(|tz| tz.parse::<Tz>().is_ok())
        .unwrap_or_else(|| "UTC".to_string())
}

fn default_language() -> String {
    "zh-CN".to_string()
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_username() -> String {
    "trendwatch".to_string()
}

fn default_request_delay_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    MAX_PAGES
}

fn default_history_capacity() -> usize {
    MAX_HISTORY_CAPACITY
}

fn default_min_rating() -> f64 {
    7.0
}

fn default_min_votes() -> u32 {
    100
}

fn default_limit() -> usize {
    10
}

fn default_namespace() -> String {
    "rank".to_string()
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        timezone: default_timezone(),
        run_on_startup: false,
    }
}

pub fn default_movie_config() -> CategoryConfig {
    CategoryConfig {
        enabled: false,
        min_rating: 7.0,
        min_year: 0,
        min_votes: default_min_votes(),
        limit: 10,
        sources: vec![SourceSpec::Tmdb { list: TmdbList::TrendingDay, genre: None }],
        exclude_anime: false,
    }
}

pub fn default_series_config() -> CategoryConfig {
    CategoryConfig {
        enabled: false,
        min_rating: 7.5,
        min_year: 0,
        min_votes: default_min_votes(),
        limit: 10,
        sources: vec![SourceSpec::Tmdb { list: TmdbList::TrendingWeek, genre: None }],
        exclude_anime: false,
    }
}

pub fn default_anime_config() -> CategoryConfig {
    CategoryConfig {
        enabled: false,
        min_rating: 7.0,
        min_year: 0,
        min_votes: default_min_votes(),
        limit: 10,
        sources: vec![SourceSpec::Tmdb { list: TmdbList::TrendingWeek, genre: None }],
        exclude_anime: false,
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: default_language(),
            base_url: default_tmdb_base_url(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay_ms(),
            request_jitter_ms: 0,
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            proxy: None,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            file: None,
        }
    }
}

impl FetchConfig {
    pub fn effective_max_pages(&self) -> u32 {
        self.max_pages.clamp(1, MAX_PAGES)
    }
}

impl HistoryConfig {
    pub fn effective_capacity(&self) -> usize {
        self.capacity.clamp(1, MAX_HISTORY_CAPACITY)
    }
}

impl Config {
    /// Starting point written by `config init`
    pub fn template(host_url: &str) -> Self {
        let mut movie = default_movie_config();
        movie.enabled = true;
        Self {
            scheduler: Some(default_scheduler_config()),
            tmdb: TmdbConfig::default(),
            host: HostConfig {
                base_url: host_url.to_string(),
                username: default_username(),
                check_library: true,
            },
            fetch: FetchConfig::default(),
            notify: NotifyConfig::default(),
            history: HistoryConfig::default(),
            movie,
            series: default_series_config(),
            anime: default_anime_config(),
        }
    }

    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn category(&self, category: Category) -> &CategoryConfig {
        match category {
            Category::Movie => &self.movie,
            Category::Series => &self.series,
            Category::Anime => &self.anime,
        }
    }

    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.category(*c).enabled)
            .collect()
    }

    /// Config value first, then credential store, then `TMDB_API_KEY`
    pub fn resolve_tmdb_api_key(&self, stored: Option<&String>) -> Option<String> {
        self.tmdb
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| stored.cloned())
            .or_else(|| std::env::var("TMDB_API_KEY").ok().filter(|k| !k.trim().is_empty()))
    }

    /// Credential store first, then `TRENDWATCH_HOST_TOKEN`
    pub fn resolve_host_token(stored: Option<&String>) -> Option<String> {
        stored
            .cloned()
            .or_else(|| std::env::var("TRENDWATCH_HOST_TOKEN").ok())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("host.base_url is required"));
        }
        if !self.host.base_url.starts_with("http://") && !self.host.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("host.base_url must start with http:// or https://"));
        }

        if let Some(ref scheduler) = self.scheduler {
            let fields = scheduler.schedule.split_whitespace().count();
            if !(5..=7).contains(&fields) {
                return Err(anyhow::anyhow!(
                    "scheduler.schedule must be a cron expression with 5-7 fields, got '{}'",
                    scheduler.schedule
                ));
            }
            scheduler.tz()?;
        }

        // Checked even when disabled, `run --category anime` can still select it
        validate_anime_sources(&self.anime)?;

        for category in Category::ALL {
            let section = self.category(category);
            if !section.enabled {
                continue;
            }
            if !(0.0..=10.0).contains(&section.min_rating) {
                return Err(anyhow::anyhow!(
                    "[{}] min_rating must be between 0 and 10",
                    category
                ));
            }
            if section.limit == 0 {
                return Err(anyhow::anyhow!("[{}] limit must be greater than 0", category));
            }

            for source in section.effective_sources(category) {
                match source {
                    SourceSpec::Tmdb { list, genre } => {
                        if !list.supports(category.default_kind()) {
                            return Err(anyhow::anyhow!(
                                "[{}] TMDB list '{}' is not available for this category",
                                category,
                                list.as_str()
                            ));
                        }
                        if genre.is_some() && list != TmdbList::Discover {
                            return Err(anyhow::anyhow!(
                                "[{}] genre is only supported with the 'discover' list",
                                category
                            ));
                        }
                    }
                    SourceSpec::Ranking(spec) => validate_ranking(category, &spec)?,
                }
            }
        }

        Ok(())
    }
}

fn validate_anime_sources(section: &CategoryConfig) -> anyhow::Result<()> {
    for source in &section.sources {
        if let SourceSpec::Ranking(spec) = source {
            if !spec.format.carries_genres() {
                return Err(anyhow::anyhow!(
                    "[anime] ranking '{}' uses format '{}' which has no genre or origin data, so no item \
                     could pass the anime rules; use a TMDB source or a 'results' ranking",
                    spec.name,
                    spec.format.as_str()
                ));
            }
        }
    }
    Ok(())
}

fn validate_ranking(category: Category, spec: &RankingSpec) -> anyhow::Result<()> {
    if spec.url.trim().is_empty() {
        return Err(anyhow::anyhow!("[{}] ranking '{}' has no url", category, spec.name));
    }
    if spec.format != RankingFormat::Pattern {
        return Ok(());
    }
    let pattern = spec.pattern.as_deref().ok_or_else(|| {
        anyhow::anyhow!(
            "[{}] ranking '{}' uses format 'pattern' but has no pattern",
            category,
            spec.name
        )
    })?;
    let regex = Regex::new(pattern).map_err(|e| {
        anyhow::anyhow!("[{}] ranking '{}' has an invalid pattern: {}", category, spec.name, e)
    })?;
    let names: Vec<&str> = regex.capture_names().flatten().collect();
    for required in ["id", "title", "rating"] {
        if !names.contains(&required) {
            return Err(anyhow::anyhow!(
                "[{}] ranking '{}' pattern is missing the named group '{}'",
                category,
                spec.name,
                required
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config::template("http://localhost:3000");

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded.host.base_url, "http://localhost:3000");
        assert!(loaded.movie.enabled);
        assert!(!loaded.series.enabled);
        assert_eq!(loaded.movie.sources, default_movie_config().sources);
    }

    #[test]
    fn test_scheduler_timezone_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        let mut config = Config::template("http://localhost:3000");
        config.scheduler = Some(SchedulerConfig {
            schedule: "0 10 * * *".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            run_on_startup: true,
        });
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        let scheduler = loaded.scheduler.as_ref().unwrap();
        assert_eq!(scheduler.timezone, "Asia/Shanghai");
        assert_eq!(scheduler.tz().unwrap(), chrono_tz::Asia::Shanghai);
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_timezone() {
        let mut config = Config::template("http://localhost:3000");
        if let Some(scheduler) = config.scheduler.as_mut() {
            scheduler.timezone = "Mars/Olympus_Mons".to_string();
        }
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_toml_uses_category_defaults() {
        let config: Config = toml::from_str(
            r#"
            [host]
            base_url = "http://mp.local:3000"
            "#,
        )
        .unwrap();

        assert_eq!(config.movie.min_rating, 7.0);
        assert_eq!(config.series.min_rating, 7.5);
        assert_eq!(config.movie.min_votes, 100);
        assert_eq!(config.fetch.effective_max_pages(), MAX_PAGES);
        assert_eq!(config.history.effective_capacity(), MAX_HISTORY_CAPACITY);
        assert!(config.enabled_categories().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sources_parse_from_inline_tables() {
        let config: Config = toml::from_str(
            r#"
            [host]
            base_url = "http://mp.local:3000"

            [movie]
            enabled = true
            min_rating = 6.5
            limit = 5
            sources = [
                { source = "tmdb", list = "discover", genre = 878 },
                { source = "ranking", name = "hot", url = "https://example.com/hot.json", format = "subjects", namespace = "douban" },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(config.movie.sources.len(), 2);
        assert_eq!(
            config.movie.sources[0],
            SourceSpec::Tmdb { list: TmdbList::Discover, genre: Some(878) }
        );
        match &config.movie.sources[1] {
            SourceSpec::Ranking(spec) => {
                assert_eq!(spec.format, RankingFormat::Subjects);
                assert_eq!(spec.namespace, "douban");
            }
            other => panic!("unexpected source: {:?}", other),
        }
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_list_for_wrong_kind() {
        let mut config = Config::template("http://localhost:3000");
        config.series.enabled = true;
        config.series.sources = vec![SourceSpec::Tmdb { list: TmdbList::NowPlaying, genre: None }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_pattern_requires_named_groups() {
        let mut config = Config::template("http://localhost:3000");
        let mut spec = RankingSpec {
            name: "chart".to_string(),
            url: "https://example.com/chart".to_string(),
            format: RankingFormat::Pattern,
            pattern: Some(r#"subject/(?P<id>\d+)/.*?title="(?P<title>[^"]+)""#.to_string()),
            namespace: "douban".to_string(),
            media_kind: None,
        };
        config.movie.sources = vec![SourceSpec::Ranking(spec.clone())];
        assert!(config.validate().is_err());

        spec.pattern = Some(
            r#"subject/(?P<id>\d+)/.*?title="(?P<title>[^"]+)".*?(?P<rating>[\d.]+)"#.to_string(),
        );
        config.movie.sources = vec![SourceSpec::Ranking(spec)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_anime_needs_genre_data() {
        let mut config = Config::template("http://localhost:3000");
        let mut spec = RankingSpec {
            name: "douban_anime".to_string(),
            url: "https://movie.douban.com/j/search_subjects?type=tv&tag=日本动画".to_string(),
            format: RankingFormat::Subjects,
            pattern: None,
            namespace: "douban".to_string(),
            media_kind: None,
        };
        // Disabled sections are checked too
        config.anime.sources = vec![SourceSpec::Ranking(spec.clone())];
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("douban_anime"));

        spec.format = RankingFormat::Results;
        config.anime.sources = vec![SourceSpec::Ranking(spec.clone())];
        assert!(config.validate().is_ok());

        // Movies and series recognise ranking items through the host
        spec.format = RankingFormat::Subjects;
        config.anime.sources.clear();
        config.series.enabled = true;
        config.series.sources = vec![SourceSpec::Ranking(spec)];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_host_url() {
        let config = Config::template("mp.local");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_sources_fallback() {
        let mut section = default_anime_config();
        section.sources.clear();
        assert_eq!(
            section.effective_sources(Category::Anime),
            vec![SourceSpec::Tmdb { list: TmdbList::TrendingWeek, genre: None }]
        );
    }

    #[test]
    fn test_resolve_tmdb_api_key_prefers_config() {
        let mut config = Config::template("http://localhost:3000");
        let stored = "stored".to_string();
        assert_eq!(config.resolve_tmdb_api_key(Some(&stored)), Some("stored".to_string()));

        config.tmdb.api_key = Some("override".to_string());
        assert_eq!(config.resolve_tmdb_api_key(Some(&stored)), Some("override".to_string()));
    }
}
