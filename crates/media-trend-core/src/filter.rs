use media_trend_config::CategoryConfig;
use media_trend_models::{Category, TrendItem};
use std::fmt;

/// Acceptance thresholds for one category
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// 0 disables the check
    pub min_rating: f64,
    /// 0 disables the check
    pub min_year: u32,
    /// 0 disables the check
    pub min_votes: u32,
    /// Require the animation genre plus a Japanese origin signal
    pub anime_only: bool,
    /// Reject items that would qualify as anime
    pub exclude_anime: bool,
}

impl Thresholds {
    pub fn for_category(category: Category, config: &CategoryConfig) -> Self {
        Self {
            min_rating: config.min_rating,
            min_year: config.min_year,
            min_votes: config.min_votes,
            anime_only: category == Category::Anime,
            exclude_anime: category == Category::Series && config.exclude_anime,
        }
    }
}

/// Why an item was turned away
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    Adult,
    LowRating { rating: f64, min: f64 },
    FewVotes { votes: u32, min: u32 },
    TooOld { year: u32, min: u32 },
    MissingYear,
    NotAnimation,
    NotJapanese,
    IsAnime,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Adult => write!(f, "adult title"),
            Rejection::LowRating { rating, min } => write!(f, "rating {:.1} below {:.1}", rating, min),
            Rejection::FewVotes { votes, min } => write!(f, "{} votes below {}", votes, min),
            Rejection::TooOld { year, min } => write!(f, "year {} before {}", year, min),
            Rejection::MissingYear => write!(f, "no release year"),
            Rejection::NotAnimation => write!(f, "not tagged as animation"),
            Rejection::NotJapanese => write!(f, "not of Japanese origin"),
            Rejection::IsAnime => write!(f, "anime is handled by its own category"),
        }
    }
}

pub fn passes(item: &TrendItem, thresholds: &Thresholds) -> bool {
    rejection(item, thresholds).is_none()
}

/// First failed rule, checked in order adult, rating, votes, year, anime
pub fn rejection(item: &TrendItem, thresholds: &Thresholds) -> Option<Rejection> {
    if item.adult {
        return Some(Rejection::Adult);
    }
    if thresholds.min_rating > 0.0 && item.rating < thresholds.min_rating {
        return Some(Rejection::LowRating {
            rating: item.rating,
            min: thresholds.min_rating,
        });
    }
    if let Some(votes) = item.vote_count {
        if votes < thresholds.min_votes {
            return Some(Rejection::FewVotes {
                votes,
                min: thresholds.min_votes,
            });
        }
    }
    if let Some(rejection) = year_rejection(item.year, thresholds.min_year) {
        return Some(rejection);
    }
    if thresholds.anime_only {
        if !item.is_animation() {
            return Some(Rejection::NotAnimation);
        }
        if !item.is_japanese_origin() {
            return Some(Rejection::NotJapanese);
        }
    }
    if thresholds.exclude_anime && item.is_animation() && item.is_japanese_origin() {
        return Some(Rejection::IsAnime);
    }
    None
}

/// Year rule on its own, re-checked once recognition has filled in a year
pub fn year_rejection(year: Option<u32>, min_year: u32) -> Option<Rejection> {
    if min_year == 0 {
        return None;
    }
    match year {
        None => Some(Rejection::MissingYear),
        Some(year) if year < min_year => Some(Rejection::TooOld { year, min: min_year }),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_trend_models::ANIMATION_GENRE_ID;

    fn thresholds(min_rating: f64, min_year: u32) -> Thresholds {
        Thresholds {
            min_rating,
            min_year,
            min_votes: 0,
            anime_only: false,
            exclude_anime: false,
        }
    }

    fn anime_item(genre: bool, country: Option<&str>, language: Option<&str>) -> TrendItem {
        let mut item = TrendItem::new("1", "Show", 8.5);
        if genre {
            item.genre_ids.insert(ANIMATION_GENRE_ID);
        }
        item.origin_countries = country.map(|c| vec![c.to_string()]).unwrap_or_default();
        item.original_language = language.map(String::from);
        item
    }

    #[test]
    fn test_rating_boundary_is_inclusive() {
        let t = thresholds(7.0, 0);
        assert!(passes(&TrendItem::new("1", "Exact", 7.0), &t));
        assert!(passes(&TrendItem::new("2", "Above", 7.1), &t));
        assert_eq!(
            rejection(&TrendItem::new("3", "Below", 6.9), &t),
            Some(Rejection::LowRating { rating: 6.9, min: 7.0 })
        );
    }

    #[test]
    fn test_zero_thresholds_disable_checks() {
        let item = TrendItem::new("1", "Unrated", 0.0);
        assert!(passes(&item, &thresholds(0.0, 0)));
    }

    #[test]
    fn test_missing_year_only_fails_with_minimum() {
        let item = TrendItem::new("1", "Undated", 8.0);
        assert!(passes(&item, &thresholds(7.0, 0)));
        assert_eq!(rejection(&item, &thresholds(7.0, 2020)), Some(Rejection::MissingYear));
    }

    #[test]
    fn test_year_threshold() {
        let mut item = TrendItem::new("1", "Old", 8.0);
        item.year = Some(2019);
        assert_eq!(
            rejection(&item, &thresholds(0.0, 2020)),
            Some(Rejection::TooOld { year: 2019, min: 2020 })
        );
        item.year = Some(2020);
        assert!(passes(&item, &thresholds(0.0, 2020)));
    }

    #[test]
    fn test_vote_count_threshold() {
        let t = Thresholds { min_votes: 100, ..thresholds(0.0, 0) };
        let mut item = TrendItem::new("1", "Niche", 8.0);
        item.vote_count = Some(99);
        assert_eq!(rejection(&item, &t), Some(Rejection::FewVotes { votes: 99, min: 100 }));

        item.vote_count = Some(100);
        assert!(passes(&item, &t));

        // Ranking sources publish no counts
        item.vote_count = None;
        assert!(passes(&item, &t));
    }

    #[test]
    fn test_adult_titles_always_rejected() {
        let mut item = TrendItem::new("1", "After Hours", 9.0);
        item.adult = true;
        assert_eq!(rejection(&item, &thresholds(0.0, 0)), Some(Rejection::Adult));
    }

    #[test]
    fn test_anime_requires_genre_regardless_of_origin() {
        let t = Thresholds { anime_only: true, ..thresholds(0.0, 0) };
        assert_eq!(
            rejection(&anime_item(false, Some("JP"), Some("ja")), &t),
            Some(Rejection::NotAnimation)
        );
    }

    #[test]
    fn test_anime_requires_japanese_signal() {
        let t = Thresholds { anime_only: true, ..thresholds(0.0, 0) };
        assert_eq!(
            rejection(&anime_item(true, Some("US"), Some("en")), &t),
            Some(Rejection::NotJapanese)
        );
        assert!(passes(&anime_item(true, Some("JP"), None), &t));
        assert!(passes(&anime_item(true, None, Some("ja")), &t));
    }

    #[test]
    fn test_exclude_anime_from_series() {
        let t = Thresholds { exclude_anime: true, ..thresholds(0.0, 0) };
        assert_eq!(rejection(&anime_item(true, Some("JP"), None), &t), Some(Rejection::IsAnime));
        // Western animation stays in series
        assert!(passes(&anime_item(true, Some("US"), Some("en")), &t));
    }

    #[test]
    fn test_thresholds_for_category() {
        let mut config = media_trend_config::default_series_config();
        config.exclude_anime = true;
        let series = Thresholds::for_category(Category::Series, &config);
        assert!(series.exclude_anime);
        assert_eq!(series.min_votes, 100);
        assert!(!series.anime_only);

        let anime = Thresholds::for_category(Category::Anime, &media_trend_config::default_anime_config());
        assert!(anime.anime_only);
        assert!(!anime.exclude_anime);
    }
}
