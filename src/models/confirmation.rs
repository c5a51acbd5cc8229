use ethers::types::U256;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationState {
    /// Mined successfully and buried under the required number of blocks.
    Confirmed,
    /// Mined, but execution reverted; the transfer did not take effect.
    Reverted,
    /// Not observed at the required depth before the deadline.
    TimedOut,
}

/// Result of watching a submitted transaction. Separate from the `PaymentResult` that
/// produced the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationStatus {
    pub confirmed: bool,
    pub state: ConfirmationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_used: Option<U256>,
}

impl ConfirmationStatus {
    pub fn confirmed(block_number: u64, gas_used: Option<U256>) -> Self {
        Self {
            confirmed: true,
            state: ConfirmationState::Confirmed,
            block_number: Some(block_number),
            gas_used,
        }
    }

    pub fn reverted(block_number: u64, gas_used: Option<U256>) -> Self {
        Self {
            confirmed: false,
            state: ConfirmationState::Reverted,
            block_number: Some(block_number),
            gas_used,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            confirmed: false,
            state: ConfirmationState::TimedOut,
            block_number: None,
            gas_used: None,
        }
    }
}
