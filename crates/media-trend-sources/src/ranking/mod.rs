pub mod client;
pub mod parser;

pub use client::RankingSource;
pub use parser::{parser_for, PatternParser, RankingParser, ResultsParser, SubjectsParser};
