use crate::error::RelayError;
use async_trait::async_trait;
use ethers::types::{Address, Bytes, H256, U256};
use serde::Serialize;
use std::collections::BTreeMap;

/// Unsigned transfer call handed to the relay for broadcast.
#[derive(Debug, Clone, Serialize)]
pub struct RelayTransaction {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub gas: U256,
    pub value: U256,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelayIntent {
    pub transaction: RelayTransaction,
    pub metadata: BTreeMap<String, String>,
}

/// A relay's acknowledgement that it broadcast the transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySubmission {
    pub tx_hash: H256,
    pub gas_used: Option<U256>,
    pub block_number: Option<u64>,
}

/// Best-effort submission service. Any error makes the executor fall back to a direct
/// transfer, so implementations should fail fast rather than retry.
#[async_trait]
pub trait PaymentRelay: Send + Sync {
    async fn submit(&self, intent: &RelayIntent) -> Result<RelaySubmission, RelayError>;

    async fn transaction_status(&self, tx_hash: H256) -> Result<serde_json::Value, RelayError>;
}
