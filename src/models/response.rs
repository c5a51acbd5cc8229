use crate::models::TokenAmount;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct BalanceView {
    pub address: Address,
    pub balance: TokenAmount,
    pub units: U256,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub chain_rpc: bool,
    pub block_number: Option<u64>,
    pub payer: Address,
    pub relay_enabled: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
