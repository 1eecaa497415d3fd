use serde::{Deserialize, Serialize};
use std::fmt;

/// User-facing bucket an item is subscribed under.
///
/// The label is part of every history key, so it is fixed to one spelling
/// per variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    Series,
    Anime,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Movie, Category::Series, Category::Anime];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::Series => "series",
            Category::Anime => "anime",
        }
    }

    /// Media kind used when an item carries no kind of its own
    pub fn default_kind(&self) -> MediaKind {
        match self {
            Category::Movie => MediaKind::Movie,
            Category::Series | Category::Anime => MediaKind::Series,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "movie" | "movies" => Some(Category::Movie),
            "series" | "tv" | "show" => Some(Category::Series),
            "anime" => Some(Category::Anime),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    /// Path segment TMDB uses for this kind
    pub fn tmdb_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "tv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_canonical() {
        assert_eq!(Category::Movie.label(), "movie");
        assert_eq!(Category::Series.label(), "series");
        assert_eq!(Category::Anime.label(), "anime");
        assert_eq!(Category::from_label("TV"), Some(Category::Series));
        assert_eq!(Category::from_label("cartoon"), None);
    }

    #[test]
    fn test_default_kind() {
        assert_eq!(Category::Movie.default_kind(), MediaKind::Movie);
        assert_eq!(Category::Anime.default_kind(), MediaKind::Series);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Category::Anime).unwrap();
        assert_eq!(json, "\"anime\"");
        let kind: MediaKind = serde_json::from_str("\"series\"").unwrap();
        assert_eq!(kind, MediaKind::Series);
    }
}
