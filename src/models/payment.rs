use crate::error::{ErrorKind, PaymentError};
use ethers::types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A user's intent to send `amount` tokens to `recipient`.
///
/// Both fields are kept exactly as entered; they are validated by the executor before any
/// network call is made.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub recipient: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl PaymentRequest {
    pub fn new(recipient: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Parse a `0x`-prefixed, 40 hex digit account address.
pub fn parse_recipient(input: &str) -> Result<Address, PaymentError> {
    let invalid = |reason: &str| PaymentError::InvalidRecipient {
        reason: format!("{} ({})", reason, input),
    };

    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| invalid("missing 0x prefix"))?;

    if hex_part.len() != 40 {
        return Err(invalid("expected 40 hex characters"));
    }

    let bytes = hex::decode(hex_part).map_err(|_| invalid("not hexadecimal"))?;
    let address = Address::from_slice(&bytes);

    if address.is_zero() {
        return Err(invalid("zero address cannot receive transfers"));
    }

    Ok(address)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentOptions {
    /// Overrides the configured relay toggle for this payment only.
    #[serde(default)]
    pub use_relay: Option<bool>,
    /// Skips estimation and submits with this gas limit.
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPath {
    Relay,
    Direct,
}

/// Terminal outcome of a single `send_payment` call.
///
/// Either `success` is true and a transaction hash is present, or `error` is present.
/// Fields are private so the two shapes can only be built through `submitted`/`failed`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResult {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tx_hash: Option<H256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<SubmissionPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<PaymentError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gas_used: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    block_number: Option<u64>,
}

impl PaymentResult {
    pub fn submitted(tx_hash: H256, path: SubmissionPath) -> Self {
        Self {
            success: true,
            tx_hash: Some(tx_hash),
            path: Some(path),
            error: None,
            gas_used: None,
            block_number: None,
        }
    }

    pub fn failed(error: PaymentError) -> Self {
        Self {
            success: false,
            tx_hash: None,
            path: None,
            error: Some(error),
            gas_used: None,
            block_number: None,
        }
    }

    /// Attach inclusion details reported alongside the submission (relay responses only).
    pub fn with_inclusion(mut self, block_number: Option<u64>, gas_used: Option<U256>) -> Self {
        if self.success {
            self.block_number = block_number;
            self.gas_used = gas_used;
        }
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn tx_hash(&self) -> Option<H256> {
        self.tx_hash
    }

    pub fn path(&self) -> Option<SubmissionPath> {
        self.path
    }

    pub fn error(&self) -> Option<&PaymentError> {
        self.error.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(PaymentError::kind)
    }

    pub fn gas_used(&self) -> Option<U256> {
        self.gas_used
    }

    pub fn block_number(&self) -> Option<u64> {
        self.block_number
    }
}
