pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{
    CategoryConfig, Config, FetchConfig, HistoryConfig, HostConfig, NotifyConfig, RankingFormat,
    RankingSpec, SchedulerConfig, SourceSpec, TmdbConfig, TmdbList, default_anime_config,
    default_movie_config, default_scheduler_config, default_series_config, MAX_HISTORY_CAPACITY,
    MAX_PAGES,
};
pub use credentials::{CredentialStore, Secret};
pub use paths::PathManager;
