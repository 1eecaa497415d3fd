use serde::{Deserialize, Serialize};
use crate::MediaKind;

/// What gets handed to the host subscription service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionRequest {
    pub title: String,
    pub year: Option<u32>,
    pub kind: MediaKind,
    pub tmdb_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    pub username: String,
}

/// Metadata the host resolved from a free-text title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecognizedMedia {
    pub tmdb_id: u64,
    pub title: String,
    pub year: Option<u32>,
    pub kind: MediaKind,
    pub season: Option<u32>,
}
