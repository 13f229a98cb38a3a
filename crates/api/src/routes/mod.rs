//! API route definitions

pub mod stats;
pub mod transactions;

use crate::{ApiDoc, state::ApiState};
use axum::{Router, routing::get};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stats::*;
use transactions::*;

/// Build the router with all API endpoints.
pub fn router(state: ApiState) -> Router {
    let api_routes = Router::new()
        .route("/x", get(list_transactions))
        .route("/x/:type/:tx_hash", get(get_transaction))
        .route("/stats", get(dashboard))
        .route("/stats/summary", get(summary))
        .route("/stats/chart/:chart", get(chart))
        .route("/stats/volume/:board", get(volume_leaderboard))
        .route("/stats/transaction/:board", get(transaction_leaderboard))
        .route("/stats/leaderboard/:dimension", get(leaderboard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .with_state(state)
}
