//! Query engine for a caller's TV records.
//!
//! Shapes one user's full record set into a page of results. The engine is a pure
//! function of `(records, query)`; scoping the set to the caller happens before it
//! gets here.
//!
//! # Modes
//!
//! Exactly one mode applies per call, picked in this order:
//!
//! 1. **Paginate** when both `page` and `limit` are positive integers
//! 2. **Search** when `search` is non-empty (case-insensitive, manufacturer or model)
//! 3. **Filter** when any of `startDate`, `endDate`, `type` is given (conjunctive)
//! 4. **All** otherwise
//!
//! Modes do not compose: a request carrying `page`, `limit` and `search` is only
//! paginated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Tv, parse_date};

/// Raw query-string parameters, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Smart / non-smart filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SmartKind {
    Smart,
    NonSmart,
}

impl SmartKind {
    /// Parse the wire value; anything else is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "smart" => Some(Self::Smart),
            "nonSmart" => Some(Self::NonSmart),
            _ => None,
        }
    }

    fn matches(self, tv: &Tv) -> bool {
        match self {
            Self::Smart => tv.is_smart,
            Self::NonSmart => !tv.is_smart,
        }
    }
}

/// A parsed, typed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TvQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub kind: Option<SmartKind>,
}

/// The single mode a query resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryMode {
    Paginate { page: u32, limit: u32 },
    Search(String),
    Filter {
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
        kind: Option<SmartKind>,
    },
    All,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage<T> {
    pub items: Vec<T>,
    pub total_pages: u64,
}

/// Error raised while parsing query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A date parameter was present but unparsable.
    InvalidDate { param: &'static str, value: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDate { param, value } => {
                write!(f, "invalid date for '{}': {:?}", param, value)
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl TvQuery {
    /// Parse raw parameters.
    ///
    /// `page`/`limit` that are zero or not integers count as absent, as does an empty
    /// `search`. Dates equal to the literal `undefined` are ignored; any other
    /// unparsable date is an error.
    pub fn from_params(params: &QueryParams) -> Result<Self, QueryError> {
        Ok(Self {
            page: parse_positive(params.page.as_deref()),
            limit: parse_positive(params.limit.as_deref()),
            search: params
                .search
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            start_date: parse_date_param("startDate", params.start_date.as_deref())?,
            end_date: parse_date_param("endDate", params.end_date.as_deref())?,
            kind: params.kind.as_deref().and_then(SmartKind::parse),
        })
    }

    /// Resolve which mode applies.
    pub fn mode(&self) -> QueryMode {
        if let (Some(page), Some(limit)) = (self.page, self.limit) {
            return QueryMode::Paginate { page, limit };
        }
        if let Some(search) = &self.search {
            return QueryMode::Search(search.clone());
        }
        if self.start_date.is_some() || self.end_date.is_some() || self.kind.is_some() {
            return QueryMode::Filter {
                start_date: self.start_date,
                end_date: self.end_date,
                kind: self.kind,
            };
        }
        QueryMode::All
    }

    /// Apply this query to a caller's full record set (in creation order).
    pub fn apply(&self, tvs: Vec<Tv>) -> QueryPage<Tv> {
        match self.mode() {
            QueryMode::Paginate { page, limit } => paginate(tvs, page, limit),
            QueryMode::Search(needle) => {
                let needle = needle.to_lowercase();
                let items = tvs
                    .into_iter()
                    .filter(|tv| {
                        tv.manufacturer.to_lowercase().contains(&needle)
                            || tv.model.to_lowercase().contains(&needle)
                    })
                    .collect();
                QueryPage { items, total_pages: 1 }
            }
            QueryMode::Filter {
                start_date,
                end_date,
                kind,
            } => {
                let items = tvs
                    .into_iter()
                    .filter(|tv| start_date.is_none_or(|start| start <= tv.fabrication_date))
                    .filter(|tv| end_date.is_none_or(|end| tv.fabrication_date <= end))
                    .filter(|tv| kind.is_none_or(|k| k.matches(tv)))
                    .collect();
                QueryPage { items, total_pages: 1 }
            }
            QueryMode::All => QueryPage {
                items: tvs,
                total_pages: 1,
            },
        }
    }
}

fn paginate(tvs: Vec<Tv>, page: u32, limit: u32) -> QueryPage<Tv> {
    let total = tvs.len() as u64;
    let limit = u64::from(limit);
    let offset = u64::from(page - 1).saturating_mul(limit);
    let items = tvs
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();
    QueryPage {
        items,
        total_pages: total.div_ceil(limit),
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

fn parse_date_param(
    param: &'static str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, QueryError> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() || v == "undefined" => Ok(None),
        Some(v) => parse_date(v).map(Some).ok_or_else(|| QueryError::InvalidDate {
            param,
            value: v.to_string(),
        }),
    }
}
