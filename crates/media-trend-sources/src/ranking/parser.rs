//! Response parsers for ranking endpoints.
//!
//! Each parser turns one response body into items with source-native ids.
//! Markup changes upstream surface here as a parse error or an empty
//! result, and are pinned down by the fixtures in `parser/tests.rs`.

use media_trend_config::{RankingFormat, RankingSpec};
use media_trend_models::{MediaKind, TrendItem};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use crate::http::parse_year;
use crate::tmdb;
use crate::SourceError;

pub trait RankingParser: Send + Sync {
    fn parse(&self, body: &str, kind: MediaKind) -> Result<Vec<TrendItem>, SourceError>;
}

/// Build the parser a ranking spec asks for
pub fn parser_for(spec: &RankingSpec) -> Result<Box<dyn RankingParser>, SourceError> {
    match spec.format {
        RankingFormat::Subjects => Ok(Box::new(SubjectsParser)),
        RankingFormat::Results => Ok(Box::new(ResultsParser)),
        RankingFormat::Pattern => {
            let pattern = spec.pattern.as_deref().ok_or_else(|| {
                SourceError::Config(format!("ranking '{}' has no pattern", spec.name))
            })?;
            Ok(Box::new(PatternParser::new(pattern)?))
        }
    }
}

/// `{"subjects": [{"id": "1292052", "title": "...", "rate": "9.7"}]}`
pub struct SubjectsParser;

#[derive(Debug, Deserialize)]
struct SubjectsPage {
    #[serde(default)]
    subjects: Vec<Subject>,
}

#[derive(Debug, Deserialize)]
struct Subject {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    title: String,
    #[serde(default)]
    rate: Value,
    #[serde(default)]
    year: Value,
}

/// Ids and ratings arrive as either strings or numbers
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_rating(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(0.0)
}

impl RankingParser for SubjectsParser {
    fn parse(&self, body: &str, kind: MediaKind) -> Result<Vec<TrendItem>, SourceError> {
        let page: SubjectsPage = serde_json::from_str(body)?;
        Ok(page
            .subjects
            .into_iter()
            .filter_map(|subject| {
                let id = value_to_string(&subject.id)?;
                let title = subject.title.trim();
                if title.is_empty() {
                    return None;
                }
                let mut item = TrendItem::new(
                    id,
                    title,
                    value_to_string(&subject.rate).map(|r| parse_rating(&r)).unwrap_or(0.0),
                );
                item.year = value_to_string(&subject.year).and_then(|y| parse_year(&y));
                item.kind = Some(kind);
                Some(item)
            })
            .collect())
    }
}

/// TMDB-shaped JSON served by a third party
pub struct ResultsParser;

impl RankingParser for ResultsParser {
    fn parse(&self, body: &str, kind: MediaKind) -> Result<Vec<TrendItem>, SourceError> {
        tmdb::parse_results(body, kind)
    }
}

/// HTML matched with an operator-supplied regex.
///
/// Required named groups: `id`, `title`, `rating`; `year` is optional.
pub struct PatternParser {
    regex: Regex,
}

impl PatternParser {
    pub fn new(pattern: &str) -> Result<Self, SourceError> {
        let regex = Regex::new(pattern)
            .map_err(|e| SourceError::Config(format!("invalid ranking pattern: {}", e)))?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        for required in ["id", "title", "rating"] {
            if !names.contains(&required) {
                return Err(SourceError::Config(format!(
                    "ranking pattern is missing the named group '{}'",
                    required
                )));
            }
        }
        Ok(Self { regex })
    }
}

impl RankingParser for PatternParser {
    fn parse(&self, body: &str, kind: MediaKind) -> Result<Vec<TrendItem>, SourceError> {
        let mut items = Vec::new();
        for captures in self.regex.captures_iter(body) {
            let id = captures.name("id").map(|m| m.as_str().trim()).unwrap_or("");
            let title = captures.name("title").map(|m| m.as_str().trim()).unwrap_or("");
            if id.is_empty() || title.is_empty() {
                continue;
            }
            let rating = captures
                .name("rating")
                .map(|m| parse_rating(m.as_str()))
                .unwrap_or(0.0);

            let mut item = TrendItem::new(id, title, rating);
            item.year = captures.name("year").and_then(|m| parse_year(m.as_str()));
            item.kind = Some(kind);
            items.push(item);
        }

        // A non-empty page that matches nothing almost always means the markup moved
        if items.is_empty() && !body.trim().is_empty() {
            return Err(SourceError::Parse(
                "ranking pattern matched nothing in a non-empty page".to_string(),
            ));
        }
        Ok(items)
    }
}
