use api_types::HealthResponse;
use axum::Json;

/// Health check handler returning `{ "status": "ok" }`.
///
/// Liveness only: datastores are not queried.
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let Json(body) = handler().await;
        assert_eq!(body.status, "ok");
    }
}
