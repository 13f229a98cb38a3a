//! Validation functions for API query parameters
//!
//! Everything here runs before a datastore is touched, so a rejected request
//! never costs a query.

use clickhouse_lib::TimeBucket;
use primitives::{Category, MAINNET_CHAIN_ID, Page, QueryError, TESTNET_CHAIN_ID};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Largest page the list endpoint serves.
pub const MAX_PAGE_SIZE: i64 = 100;
/// Largest number of buckets or leaderboard entries served.
pub const MAX_LIMIT: i64 = 100;
/// Number of buckets or leaderboard entries when none is requested.
pub const DEFAULT_LIMIT: u64 = 10;

/// Query parameters of the transaction list
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListQuery {
    /// Category to list: `bridge`, `transfer` or `redeem`
    #[serde(rename = "type")]
    pub category: Option<String>,
    /// Page size, at most 100; non-positive values select the default of 10
    pub size: Option<i64>,
    /// Rows to skip; negative values are treated as 0
    pub offset: Option<i64>,
    /// Zero-based page number, used when `offset` is absent
    pub page: Option<i64>,
}

/// Query parameters of time-series endpoints
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct StatsQuery {
    /// Bucket width, `day` when absent
    pub time_bucket: Option<String>,
    /// Number of most recent buckets, 1 to 100
    pub limit: Option<i64>,
    /// `mainnet` or `testnet`, the configured settlement chain when absent
    pub network: Option<String>,
}

/// Query parameters of leaderboard endpoints
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct LeaderboardQuery {
    /// Number of ranked entries, 1 to 100
    pub limit: Option<i64>,
    /// `mainnet` or `testnet`, the configured settlement chain when absent
    pub network: Option<String>,
}

/// Query parameters selecting only a network
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct NetworkQuery {
    /// `mainnet` or `testnet`, the configured settlement chain when absent
    pub network: Option<String>,
}

/// Parse a required category name.
pub fn parse_category(raw: Option<&str>) -> Result<Category, QueryError> {
    let raw = raw.ok_or_else(|| QueryError::validation("type", "missing transaction type"))?;
    raw.parse().map_err(|reason: String| QueryError::validation("type", reason))
}

/// Parse a bucket name, defaulting to `day`.
pub fn parse_bucket(raw: Option<&str>) -> Result<TimeBucket, QueryError> {
    raw.map_or(Ok(TimeBucket::Day), |raw| {
        raw.parse().map_err(|reason: String| QueryError::validation("time_bucket", reason))
    })
}

/// Map a network name to the chain it settles on.
pub fn resolve_network(raw: Option<&str>, settlement_chain: &str) -> Result<String, QueryError> {
    match raw {
        None => Ok(settlement_chain.to_owned()),
        Some("mainnet") => Ok(MAINNET_CHAIN_ID.to_owned()),
        Some("testnet") => Ok(TESTNET_CHAIN_ID.to_owned()),
        Some(other) => Err(QueryError::validation("network", format!("unknown network `{other}`"))),
    }
}

/// Check a bucket or leaderboard limit.
pub fn validate_limit(raw: Option<i64>) -> Result<u64, QueryError> {
    match raw {
        None => Ok(DEFAULT_LIMIT),
        Some(limit @ 1..=MAX_LIMIT) => Ok(limit.unsigned_abs()),
        Some(_) => Err(QueryError::validation("limit", format!("must be between 1 and {MAX_LIMIT}"))),
    }
}

/// Resolve the list window. An explicit offset wins over a page number.
pub fn resolve_page(params: &ListQuery) -> Result<Page, QueryError> {
    let size = params.size.unwrap_or(0);
    if size > MAX_PAGE_SIZE {
        return Err(QueryError::validation("size", format!("must be at most {MAX_PAGE_SIZE}")));
    }
    Ok(match (params.offset, params.page) {
        (Some(offset), _) => Page::new(size, offset),
        (None, Some(page)) => Page::from_page_number(size, page),
        (None, None) => Page::new(size, 0),
    })
}
