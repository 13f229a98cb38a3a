//! Data types for the bridgescope API.
//!
//! These structs define the JSON responses returned by the API server. They
//! are provided in a separate crate so that consumers such as the explorer
//! frontend can depend on them without pulling in the rest of the server
//! implementation.

#![allow(missing_docs)]

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clickhouse_lib::{AddressAmount, ChainAmount, PathAmount};
use primitives::{Category, QueryError, Status, TransferType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Token moved by a cross-chain transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Asset {
    pub name: String,
    pub symbol: String,
    pub address: String,
    pub decimals: u8,
    pub is_native: bool,
}

/// Fields shared by both ends of a cross-chain transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BaseDocument {
    pub chain: String,
    pub chain_display_name: String,
    pub tx_hash: String,
    pub block_height: u64,
    pub status: String,
    pub value: String,
    pub fee: String,
    pub asset: Asset,
    /// Unix seconds, `0` until observed
    pub created_at: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SourceDocument {
    #[serde(flatten)]
    pub base: BaseDocument,
    pub sender_address: String,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DestinationDocument {
    #[serde(flatten)]
    pub base: BaseDocument,
    pub receiver_address: String,
}

/// Normalized view of a bridge, transfer or redeem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CrossChainDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub status: Status,
    pub command_id: String,
    pub transfer_type: TransferType,
    pub source: SourceDocument,
    pub destination: DestinationDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionListResponse {
    pub data: Vec<CrossChainDocument>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChartPoint {
    /// Bucket start in unix seconds
    pub time: u64,
    pub data: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub total_txs: u64,
    pub total_volumes: u64,
    pub total_users: u64,
}

/// Ranked aggregates of one leaderboard dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Leaderboard {
    Addresses(Vec<AddressAmount>),
    Chains(Vec<ChainAmount>),
    Paths(Vec<PathAmount>),
}

impl Leaderboard {
    pub fn len(&self) -> usize {
        match self {
            Self::Addresses(rows) => rows.len(),
            Self::Chains(rows) => rows.len(),
            Self::Paths(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardResponse {
    pub data: Leaderboard,
}

/// Everything the stats page renders, in one response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub txs: Vec<ChartPoint>,
    pub volumes: Vec<ChartPoint>,
    pub active_users: Vec<ChartPoint>,
    pub new_users: Vec<ChartPoint>,
    pub summary: SummaryResponse,
    pub top_users: Vec<AddressAmount>,
    pub top_bridges: Vec<AddressAmount>,
    pub top_source_chains_by_volume: Vec<ChainAmount>,
    pub top_destination_chains_by_volume: Vec<ChainAmount>,
    pub top_paths_by_volume: Vec<PathAmount>,
    pub top_source_chains_by_tx: Vec<ChainAmount>,
    pub top_destination_chains_by_tx: Vec<ChainAmount>,
    pub top_paths_by_tx: Vec<PathAmount>,
}

/// Problem details returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(
        r#type: impl Into<String>,
        title: impl Into<String>,
        status: StatusCode,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            r#type: r#type.into(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
        }
    }

    /// Generic datastore failure. Details stay in the server logs.
    pub fn database_error() -> Self {
        Self::new(
            "database-error",
            "Database error",
            StatusCode::INTERNAL_SERVER_ERROR,
            "A datastore query failed, please retry",
        )
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl From<QueryError> for ErrorResponse {
    fn from(err: QueryError) -> Self {
        match &err {
            QueryError::Validation { .. } => {
                Self::new("invalid-params", "Bad Request", StatusCode::BAD_REQUEST, err.to_string())
            }
            QueryError::NotFound { .. } => {
                Self::new("not-found", "Not Found", StatusCode::NOT_FOUND, err.to_string())
            }
            QueryError::Timeout { .. } => {
                Self::new("timeout", "Gateway Timeout", StatusCode::GATEWAY_TIMEOUT, err.to_string())
            }
            QueryError::Infrastructure { .. } => Self::database_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base(chain: &str) -> BaseDocument {
        BaseDocument {
            chain: chain.to_owned(),
            chain_display_name: chain.to_owned(),
            tx_hash: "0xaa".to_owned(),
            block_height: 7,
            status: "pending".to_owned(),
            value: "100".to_owned(),
            fee: "0".to_owned(),
            asset: Asset {
                name: "sBTC".to_owned(),
                symbol: "sBTC".to_owned(),
                address: "0xtoken".to_owned(),
                decimals: 8,
                is_native: false,
            },
            created_at: 0,
        }
    }

    #[test]
    fn document_uses_type_key_and_flattens_sides() {
        let doc = CrossChainDocument {
            id: "0xaa".to_owned(),
            category: Category::Transfer,
            status: Status::Pending,
            command_id: String::new(),
            transfer_type: TransferType::SendToken,
            source: SourceDocument {
                base: base("evm|1"),
                sender_address: "0xsender".to_owned(),
                log_index: 3,
            },
            destination: DestinationDocument {
                base: base("evm|56"),
                receiver_address: "0xreceiver".to_owned(),
            },
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["transfer_type"], "send_token");
        assert_eq!(json["source"]["chain"], "evm|1");
        assert_eq!(json["source"]["log_index"], 3);
        assert_eq!(json["destination"]["receiver_address"], "0xreceiver");
        assert_eq!(json["destination"]["asset"]["decimals"], 8);
    }

    #[test]
    fn leaderboard_serializes_without_tag() {
        let board = Leaderboard::Chains(vec![ChainAmount { chain: "evm|1".to_owned(), amount: 5 }]);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json, serde_json::json!([{ "chain": "evm|1", "amount": 5 }]));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn query_errors_map_to_http_status() {
        let cases = [
            (QueryError::validation("size", "must be at most 100"), 400, "invalid-params"),
            (QueryError::NotFound { entity: "bridge", key: "0xaa".to_owned() }, 404, "not-found"),
            (
                QueryError::Timeout { operation: "list", after: Duration::from_secs(30) },
                504,
                "timeout",
            ),
            (QueryError::infrastructure("list", eyre_report()), 500, "database-error"),
        ];
        for (err, status, kind) in cases {
            let resp = ErrorResponse::from(err);
            assert_eq!(resp.status, status);
            assert_eq!(resp.r#type, kind);
        }
    }

    #[test]
    fn infrastructure_detail_hides_cause() {
        let resp = ErrorResponse::from(QueryError::infrastructure("list", eyre_report()));
        assert!(!resp.detail.contains("connection refused"));
    }

    fn eyre_report() -> eyre::Report {
        eyre::eyre!("connection refused")
    }
}
