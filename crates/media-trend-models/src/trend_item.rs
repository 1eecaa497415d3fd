use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::MediaKind;

/// TMDB genre id for animation
pub const ANIMATION_GENRE_ID: u32 = 16;

/// One entry of a trend or ranking list, as fetched.
///
/// Never persisted directly; a `HistoryRecord` is written once the item
/// has been subscribed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendItem {
    /// Identifier in the upstream service (namespaced for ranking sources, e.g. `douban:1292052`)
    pub external_id: String,
    /// Known TMDB id; `None` means the host has to recognise the title first
    pub tmdb_id: Option<u64>,
    pub title: String,
    pub year: Option<u32>,
    /// 0-10 scale
    pub rating: f64,
    /// `None` when the source publishes no vote count
    #[serde(default)]
    pub vote_count: Option<u32>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub genre_ids: BTreeSet<u32>,
    #[serde(default)]
    pub origin_countries: Vec<String>,
    pub original_language: Option<String>,
    pub kind: Option<MediaKind>,
}

impl TrendItem {
    pub fn new(external_id: impl Into<String>, title: impl Into<String>, rating: f64) -> Self {
        Self {
            external_id: external_id.into(),
            tmdb_id: None,
            title: title.into(),
            year: None,
            rating,
            vote_count: None,
            adult: false,
            genre_ids: BTreeSet::new(),
            origin_countries: Vec::new(),
            original_language: None,
            kind: None,
        }
    }

    pub fn is_animation(&self) -> bool {
        self.genre_ids.contains(&ANIMATION_GENRE_ID)
    }

    /// Origin country includes Japan or original language is Japanese
    pub fn is_japanese_origin(&self) -> bool {
        self.origin_countries.iter().any(|c| c.eq_ignore_ascii_case("JP"))
            || self
                .original_language
                .as_deref()
                .map(|l| l.eq_ignore_ascii_case("ja"))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_japanese_origin_by_country_or_language() {
        let mut item = TrendItem::new("1", "Frieren", 9.0);
        assert!(!item.is_japanese_origin());

        item.origin_countries = vec!["US".to_string(), "JP".to_string()];
        assert!(item.is_japanese_origin());

        item.origin_countries.clear();
        item.original_language = Some("ja".to_string());
        assert!(item.is_japanese_origin());
    }

    #[test]
    fn test_animation_tag() {
        let mut item = TrendItem::new("1", "Frieren", 9.0);
        assert!(!item.is_animation());
        item.genre_ids.insert(ANIMATION_GENRE_ID);
        assert!(item.is_animation());
    }
}
