use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::Category;

/// A previously subscribed item, kept only for deduplication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub title: String,
    pub category: Category,
    pub external_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    pub rating: f64,
    /// `category:external_id`
    pub unique_key: String,
    /// Name of the list the item came from
    pub source: String,
    pub added_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn key_for(category: Category, external_id: &str) -> String {
        format!("{}:{}", category.label(), external_id)
    }
}

/// One line of a run summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddedItem {
    pub category: Category,
    pub title: String,
    pub year: Option<u32>,
    pub rating: f64,
    pub source: String,
}

impl From<&HistoryRecord> for AddedItem {
    fn from(record: &HistoryRecord) -> Self {
        Self {
            category: record.category,
            title: record.title.clone(),
            year: record.year,
            rating: record.rating,
            source: record.source.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        assert_eq!(HistoryRecord::key_for(Category::Movie, "603"), "movie:603");
        assert_eq!(
            HistoryRecord::key_for(Category::Anime, "douban:1292052"),
            "anime:douban:1292052"
        );
    }
}
