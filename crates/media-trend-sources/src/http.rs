use media_trend_config::FetchConfig;
use reqwest::{Client, Response};
use std::time::Duration;
use crate::SourceError;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Shared client for every outbound request of a run
pub fn build_client(fetch: &FetchConfig) -> Result<Client, SourceError> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(fetch.timeout_secs.max(1)))
        .user_agent(concat!("trendwatch/", env!("CARGO_PKG_VERSION")));

    if let Some(ref proxy) = fetch.proxy {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| SourceError::Config(format!("invalid proxy '{}': {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Turn a non-2xx response into `SourceError::Status`
pub fn check_status(response: Response, endpoint: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Leading four digits of a date or year string (`"2023-05-01"` → 2023)
pub fn parse_year(raw: &str) -> Option<u32> {
    let digits: String = raw.trim().chars().take(4).collect();
    if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}
