pub mod health;
pub mod payments;

pub use health::*;
pub use payments::*;

use crate::services::{PaymentService, SubmissionCache};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub payments: Arc<PaymentService>,
    pub submissions: Arc<SubmissionCache>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(payments: Arc<PaymentService>, submissions: Arc<SubmissionCache>) -> Self {
        Self {
            payments,
            submissions,
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/payments", post(send_payment))
        .route("/api/payments/estimate", post(estimate_cost))
        .route("/api/balance/:address", get(get_balance))
        .route(
            "/api/transactions/:hash/confirmation",
            get(wait_for_confirmation),
        )
        .route("/api/transactions/:hash/relay-status", get(relay_status))
        .with_state(state)
}
