pub mod api;
pub mod client;

pub use api::parse_results;
pub use client::TmdbSource;
