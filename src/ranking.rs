//! Display ordering for a result set
use crate::error::FindoraError;
use crate::search::SearchResult;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankCriterion {
    /// Most matches first
    #[default]
    Relevance,
    /// Most recently modified first
    Date,
    /// Largest first
    Size,
}

impl fmt::Display for RankCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankCriterion::Relevance => write!(f, "relevance"),
            RankCriterion::Date => write!(f, "date"),
            RankCriterion::Size => write!(f, "size"),
        }
    }
}

impl FromStr for RankCriterion {
    type Err = FindoraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "relevance" => Ok(RankCriterion::Relevance),
            "date" => Ok(RankCriterion::Date),
            "size" => Ok(RankCriterion::Size),
            other => Err(FindoraError::Config(format!("unknown sort criterion '{other}'"))),
        }
    }
}

/// Order `results` by `criterion`, descending. The sort is stable, so equal
/// keys keep the order they came in.
pub fn rank(mut results: Vec<SearchResult>, criterion: RankCriterion) -> Vec<SearchResult> {
    match criterion {
        RankCriterion::Relevance => results.sort_by_key(|r| Reverse(r.matches.len())),
        RankCriterion::Date => results.sort_by_key(|r| Reverse(r.modified)),
        RankCriterion::Size => results.sort_by_key(|r| Reverse(r.file_size)),
    }
    results
}
