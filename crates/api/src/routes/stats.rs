//! Stats endpoints: dashboard, summary, charts and leaderboards

use api_types::{
    ChartResponse, DashboardResponse, ErrorResponse, LeaderboardResponse, SummaryResponse,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use primitives::QueryError;

use crate::{
    state::ApiState,
    stats::{self, ChartKind, LeaderboardDimension},
    validation::{
        LeaderboardQuery, NetworkQuery, StatsQuery, parse_bucket, resolve_network, validate_limit,
    },
};

#[utoipa::path(
    get,
    path = "/stats",
    params(
        StatsQuery
    ),
    responses(
        (status = 200, description = "Series, summary and leaderboards", body = DashboardResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get everything the stats page renders
pub async fn dashboard(
    Query(params): Query<StatsQuery>,
    State(state): State<ApiState>,
) -> Result<Json<DashboardResponse>, ErrorResponse> {
    let bucket = parse_bucket(params.time_bucket.as_deref())?;
    let limit = validate_limit(params.limit)?;
    let chain = resolve_network(params.network.as_deref(), state.settlement_chain())?;
    let resp = stats::dashboard(state.stores(), bucket, limit, &chain).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/stats/summary",
    params(
        NetworkQuery
    ),
    responses(
        (status = 200, description = "Deposit totals", body = SummaryResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get total deposits, deposited volume and stakers
pub async fn summary(
    Query(params): Query<NetworkQuery>,
    State(state): State<ApiState>,
) -> Result<Json<SummaryResponse>, ErrorResponse> {
    let chain = resolve_network(params.network.as_deref(), state.settlement_chain())?;
    Ok(Json(stats::summary(state.stores(), &chain).await?))
}

#[utoipa::path(
    get,
    path = "/stats/chart/{chart}",
    params(
        ("chart" = String, Path, description = "`txs`, `volumes`, `active-users` or `new-users`"),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Merged time series, oldest bucket first", body = ChartResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get one time series merged over all sources
pub async fn chart(
    Path(chart): Path<String>,
    Query(params): Query<StatsQuery>,
    State(state): State<ApiState>,
) -> Result<Json<ChartResponse>, ErrorResponse> {
    let kind: ChartKind = chart.parse()?;
    let bucket = parse_bucket(params.time_bucket.as_deref())?;
    let limit = validate_limit(params.limit)?;
    let data = stats::chart(state.stores(), kind, bucket, limit).await?;
    Ok(Json(ChartResponse { data }))
}

async fn serve_leaderboard(
    state: &ApiState,
    dimension: LeaderboardDimension,
    params: &LeaderboardQuery,
) -> Result<Json<LeaderboardResponse>, ErrorResponse> {
    let limit = validate_limit(params.limit)?;
    let chain = resolve_network(params.network.as_deref(), state.settlement_chain())?;
    let data = stats::leaderboard(state.stores(), dimension, limit, &chain).await?;
    Ok(Json(LeaderboardResponse { data }))
}

fn volume_dimension(board: &str) -> Result<LeaderboardDimension, QueryError> {
    match board {
        "top-users" => Ok(LeaderboardDimension::TopUsers),
        "top-bridges" => Ok(LeaderboardDimension::TopBridges),
        "top-source-chains" => Ok(LeaderboardDimension::SourceChainsByVolume),
        "top-destination-chains" => Ok(LeaderboardDimension::DestinationChainsByVolume),
        "top-paths" => Ok(LeaderboardDimension::PathsByVolume),
        other => Err(QueryError::validation("leaderboard", format!("unknown leaderboard `{other}`"))),
    }
}

fn transaction_dimension(board: &str) -> Result<LeaderboardDimension, QueryError> {
    match board {
        "top-source-chains" => Ok(LeaderboardDimension::SourceChainsByTx),
        "top-destination-chains" => Ok(LeaderboardDimension::DestinationChainsByTx),
        "top-paths" => Ok(LeaderboardDimension::PathsByTx),
        other => Err(QueryError::validation("leaderboard", format!("unknown leaderboard `{other}`"))),
    }
}

#[utoipa::path(
    get,
    path = "/stats/volume/{board}",
    params(
        ("board" = String, Path, description = "`top-users`, `top-bridges`, `top-source-chains`, `top-destination-chains` or `top-paths`"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Entries ranked by volume", body = LeaderboardResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get a leaderboard ranked by transferred volume
pub async fn volume_leaderboard(
    Path(board): Path<String>,
    Query(params): Query<LeaderboardQuery>,
    State(state): State<ApiState>,
) -> Result<Json<LeaderboardResponse>, ErrorResponse> {
    serve_leaderboard(&state, volume_dimension(&board)?, &params).await
}

#[utoipa::path(
    get,
    path = "/stats/transaction/{board}",
    params(
        ("board" = String, Path, description = "`top-source-chains`, `top-destination-chains` or `top-paths`"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Entries ranked by transfer count", body = LeaderboardResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get a leaderboard ranked by number of transfers
pub async fn transaction_leaderboard(
    Path(board): Path<String>,
    Query(params): Query<LeaderboardQuery>,
    State(state): State<ApiState>,
) -> Result<Json<LeaderboardResponse>, ErrorResponse> {
    serve_leaderboard(&state, transaction_dimension(&board)?, &params).await
}

#[utoipa::path(
    get,
    path = "/stats/leaderboard/{dimension}",
    params(
        ("dimension" = String, Path, description = "Leaderboard dimension, e.g. `paths-by-tx`"),
        LeaderboardQuery
    ),
    responses(
        (status = 200, description = "Ranked entries", body = LeaderboardResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get a leaderboard by dimension name
pub async fn leaderboard(
    Path(dimension): Path<String>,
    Query(params): Query<LeaderboardQuery>,
    State(state): State<ApiState>,
) -> Result<Json<LeaderboardResponse>, ErrorResponse> {
    serve_leaderboard(&state, dimension.parse()?, &params).await
}
