//! Cross-chain query engine and its HTTP API
//!
//! Raw bridge, transfer and redeem rows are read from the indexer and
//! relayer stores, normalized into one document shape, and aggregated into
//! merged time series and leaderboards.

pub mod fanout;
pub mod normalize;
pub mod routes;
pub mod state;
pub mod stats;
pub mod transactions;
pub mod validation;


use api_types::*;
use utoipa::OpenApi;

pub use routes::router;
pub use state::ApiState;

/// `OpenAPI` documentation structure
#[derive(Debug, OpenApi)]
#[openapi(
    paths(
        routes::transactions::list_transactions,
        routes::transactions::get_transaction,
        routes::stats::dashboard,
        routes::stats::summary,
        routes::stats::chart,
        routes::stats::volume_leaderboard,
        routes::stats::transaction_leaderboard,
        routes::stats::leaderboard
    ),
    components(
        schemas(
            validation::ListQuery,
            validation::StatsQuery,
            validation::LeaderboardQuery,
            validation::NetworkQuery,
            CrossChainDocument,
            SourceDocument,
            DestinationDocument,
            BaseDocument,
            Asset,
            TransactionListResponse,
            ChartPoint,
            ChartResponse,
            SummaryResponse,
            Leaderboard,
            LeaderboardResponse,
            DashboardResponse,
            HealthResponse,
            ErrorResponse,
            clickhouse_lib::AddressAmount,
            clickhouse_lib::ChainAmount,
            clickhouse_lib::PathAmount,
            primitives::Category,
            primitives::Status,
            primitives::TransferType
        )
    ),
    tags(
        (name = "bridgescope", description = "Cross-chain transaction and stats endpoints")
    ),
    info(
        title = "bridgescope API",
        description = "Normalized cross-chain transactions and merged analytics",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
