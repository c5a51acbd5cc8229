use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let block_number = match state.payments.block_number().await {
        Ok(block) => Some(block),
        Err(e) => {
            tracing::warn!("Health check RPC call failed: {}", e);
            None
        }
    };

    let status = if block_number.is_some() {
        "healthy"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_rpc: block_number.is_some(),
        block_number,
        payer: state.payments.payer(),
        relay_enabled: state.payments.relay_enabled(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
