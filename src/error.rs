use crate::models::TokenAmount;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Signer error: {0}")]
    Signer(String),

    #[error("RPC call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug, Clone)]
#[error("Failed to fetch token balance for {owner:?}: {reason}")]
pub struct BalanceQueryError {
    pub owner: Address,
    pub reason: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Idempotency key {key} was already used for a different payment")]
pub struct IdempotencyConflict {
    pub key: String,
}

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Relay timed out after {0:?}")]
    Timeout(Duration),

    #[error("Relay rejected transfer: {0}")]
    Rejected(String),

    #[error("Relay response missing transaction hash")]
    MissingTransactionHash,

    #[error("Relay returned malformed transaction hash: {0}")]
    MalformedTransactionHash(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("amount is empty")]
    Empty,

    #[error("amount must not be negative: {0}")]
    Negative(String),

    #[error("amount is not a decimal number: {0}")]
    Malformed(String),

    #[error("amount {value} has more than {max} decimal places")]
    TooManyDecimals { value: String, max: u8 },

    #[error("amount is too large to represent: {0}")]
    Overflow(String),

    #[error("unsupported token precision: {0} decimals")]
    UnsupportedPrecision(u8),
}

/// Error kinds surfaced to callers of `send_payment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidRecipient,
    InvalidAmount,
    AmountTooLarge,
    InsufficientBalance,
    BalanceUnavailable,
    SubmissionFailure,
}

#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentError {
    #[error("Invalid recipient address: {reason}")]
    InvalidRecipient { reason: String },

    #[error("Invalid payment amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Payment amount too large: {requested} exceeds maximum of {max}")]
    AmountTooLarge { requested: String, max: TokenAmount },

    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance {
        required: TokenAmount,
        available: TokenAmount,
    },

    #[error("Could not read payer balance: {reason}")]
    BalanceUnavailable { reason: String },

    #[error("Transfer submission failed: {reason}")]
    SubmissionFailure { reason: String },
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidRecipient { .. } => ErrorKind::InvalidRecipient,
            PaymentError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            PaymentError::AmountTooLarge { .. } => ErrorKind::AmountTooLarge,
            PaymentError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            PaymentError::BalanceUnavailable { .. } => ErrorKind::BalanceUnavailable,
            PaymentError::SubmissionFailure { .. } => ErrorKind::SubmissionFailure,
        }
    }

    /// True when the failure happened before anything was handed to the chain or relay,
    /// so the caller can correct the input and try again.
    pub fn is_safe_to_retry(&self) -> bool {
        !matches!(self, PaymentError::SubmissionFailure { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidRecipient | ErrorKind::InvalidAmount | ErrorKind::AmountTooLarge => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::InsufficientBalance => StatusCode::PAYMENT_REQUIRED,
            ErrorKind::BalanceUnavailable | ErrorKind::SubmissionFailure => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<AmountParseError> for PaymentError {
    fn from(err: AmountParseError) -> Self {
        PaymentError::InvalidAmount {
            reason: err.to_string(),
        }
    }
}

impl From<BalanceQueryError> for PaymentError {
    fn from(err: BalanceQueryError) -> Self {
        PaymentError::BalanceUnavailable { reason: err.reason }
    }
}

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid transaction hash: {0}")]
    InvalidTransactionHash(String),

    #[error(transparent)]
    BalanceQuery(#[from] BalanceQueryError),

    #[error(transparent)]
    IdempotencyConflict(#[from] IdempotencyConflict),

    #[error("Not found: {0}")]
    NotFound(String),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code) = match &self {
            ApiError::InvalidAddress(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            ApiError::InvalidTransactionHash(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_TRANSACTION_HASH")
            }
            ApiError::BalanceQuery(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::IdempotencyConflict(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "IDEMPOTENCY_KEY_REUSED")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}
