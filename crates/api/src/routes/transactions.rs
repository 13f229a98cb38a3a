//! Transaction list and lookup endpoints

use api_types::{CrossChainDocument, ErrorResponse, TransactionListResponse};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    state::ApiState,
    transactions,
    validation::{ListQuery, parse_category, resolve_page},
};

#[utoipa::path(
    get,
    path = "/x",
    params(
        ListQuery
    ),
    responses(
        (status = 200, description = "One page of normalized transactions", body = TransactionListResponse),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse),
        (status = 504, description = "Query deadline exceeded", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// List bridges, transfers or redeems, newest first
pub async fn list_transactions(
    Query(params): Query<ListQuery>,
    State(state): State<ApiState>,
) -> Result<Json<TransactionListResponse>, ErrorResponse> {
    let category = parse_category(params.category.as_deref())?;
    let page = resolve_page(&params)?;
    let resp =
        transactions::list(state.stores(), state.settlement_chain(), category, page).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/x/{type}/{tx_hash}",
    params(
        ("type" = String, Path, description = "`bridge`, `transfer` or `redeem`"),
        ("tx_hash" = String, Path, description = "Originating transaction hash")
    ),
    responses(
        (status = 200, description = "Normalized transaction", body = CrossChainDocument),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 404, description = "No transaction with this hash", body = ErrorResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "bridgescope"
)]
/// Get one transaction by its originating tx hash
pub async fn get_transaction(
    Path((kind, tx_hash)): Path<(String, String)>,
    State(state): State<ApiState>,
) -> Result<Json<CrossChainDocument>, ErrorResponse> {
    let category = parse_category(Some(&kind))?;
    let doc =
        transactions::get(state.stores(), state.settlement_chain(), category, &tx_hash).await?;
    Ok(Json(doc))
}
