use crate::{
    error::{ApiError, PaymentError},
    handlers::AppState,
    models::{
        ApiResponse, BalanceView, ConfirmationStatus, FeeEstimate, PaymentOptions, PaymentRequest,
        PaymentResult,
    },
    services::SubmissionCache,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use ethers::types::{Address, H256};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

/// Longest confirmation wait a single HTTP request may hold open.
const MAX_CONFIRMATION_WAIT: Duration = Duration::from_secs(600);

#[derive(Debug, Deserialize)]
pub struct SendPaymentBody {
    #[serde(flatten)]
    pub request: PaymentRequest,
    #[serde(flatten)]
    pub options: PaymentOptions,
}

#[derive(Debug, Deserialize)]
pub struct EstimateBody {
    pub recipient: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmationQuery {
    pub confirmations: Option<u64>,
    pub timeout_ms: Option<u64>,
}

pub async fn send_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendPaymentBody>,
) -> Result<(StatusCode, Json<PaymentResult>), ApiError> {
    let submit = state.payments.send_payment(&body.request, &body.options);

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|key| !key.is_empty());

    let result = match idempotency_key {
        Some(key) => {
            let fingerprint = SubmissionCache::fingerprint(&body.request, &body.options);
            state
                .submissions
                .get_or_submit(key, fingerprint, submit)
                .await?
        }
        None => submit.await,
    };

    let status = result
        .error()
        .map(PaymentError::status_code)
        .unwrap_or(StatusCode::OK);

    Ok((status, Json(result)))
}

pub async fn estimate_cost(
    State(state): State<AppState>,
    Json(body): Json<EstimateBody>,
) -> Json<ApiResponse<FeeEstimate>> {
    let estimate = state
        .payments
        .estimate_cost(&body.recipient, &body.amount)
        .await;

    Json(ApiResponse::ok(estimate))
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<BalanceView>>, ApiError> {
    let owner = Address::from_str(address.trim())
        .map_err(|_| ApiError::InvalidAddress(address.clone()))?;

    let balance = state.payments.get_balance(owner).await?;

    Ok(Json(ApiResponse::ok(BalanceView {
        address: owner,
        units: balance.units(),
        balance,
    })))
}

pub async fn wait_for_confirmation(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Json<ApiResponse<ConfirmationStatus>>, ApiError> {
    let tx_hash = parse_tx_hash(&hash)?;
    let timeout = query
        .timeout_ms
        .map(|ms| Duration::from_millis(ms).min(MAX_CONFIRMATION_WAIT));

    let status = state
        .payments
        .wait_for_confirmation(tx_hash, query.confirmations, timeout)
        .await;

    Ok(Json(ApiResponse::ok(status)))
}

pub async fn relay_status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let tx_hash = parse_tx_hash(&hash)?;

    let status = state
        .payments
        .transaction_status(tx_hash)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("relay status for {:?}", tx_hash)))?;

    Ok(Json(ApiResponse::ok(status)))
}

fn parse_tx_hash(raw: &str) -> Result<H256, ApiError> {
    let hex_part = raw.trim().trim_start_matches("0x");
    if hex_part.len() != 64 {
        return Err(ApiError::InvalidTransactionHash(raw.to_string()));
    }

    H256::from_str(hex_part).map_err(|e| ApiError::InvalidTransactionHash(format!("{}: {}", raw, e)))
}
