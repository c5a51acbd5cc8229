use crate::{
    error::RelayError,
    services::{PaymentRelay, RelayIntent, RelaySubmission},
};
use async_trait::async_trait;
use ethers::types::{H256, U256};
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

/// x402-style relay reached over HTTP.
///
/// `POST {base}/transactions/submit` takes a [`RelayIntent`];
/// `GET {base}/transactions/{hash}/status` returns the relay's view of a transaction.
pub struct HttpRelay {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    transaction_hash: Option<String>,
    gas_used: Option<Value>,
    block_number: Option<Value>,
    error: Option<String>,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        tracing::info!("Relay client configured for {}", base_url);

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    fn map_http(&self, e: reqwest::Error) -> RelayError {
        if e.is_timeout() {
            RelayError::Timeout(self.timeout)
        } else {
            RelayError::Http(e)
        }
    }
}

#[async_trait]
impl PaymentRelay for HttpRelay {
    async fn submit(&self, intent: &RelayIntent) -> Result<RelaySubmission, RelayError> {
        let response = self
            .client
            .post(format!("{}/transactions/submit", self.base_url))
            .json(intent)
            .send()
            .await
            .map_err(|e| self.map_http(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Rejected(format!("HTTP {}", status)));
        }

        let body: SubmitResponse = response.json().await.map_err(|e| self.map_http(e))?;

        if !body.success {
            return Err(RelayError::Rejected(
                body.error
                    .unwrap_or_else(|| "relay reported failure".to_string()),
            ));
        }

        let raw_hash = body
            .transaction_hash
            .filter(|hash| !hash.trim().is_empty())
            .ok_or(RelayError::MissingTransactionHash)?;

        let tx_hash = H256::from_str(raw_hash.trim().trim_start_matches("0x"))
            .map_err(|_| RelayError::MalformedTransactionHash(raw_hash.clone()))?;

        tracing::debug!("Relay submission accepted: {:?}", tx_hash);

        Ok(RelaySubmission {
            tx_hash,
            gas_used: body.gas_used.as_ref().and_then(parse_quantity),
            block_number: body
                .block_number
                .as_ref()
                .and_then(parse_quantity)
                .filter(|n| *n <= U256::from(u64::MAX))
                .map(|n| n.as_u64()),
        })
    }

    async fn transaction_status(&self, tx_hash: H256) -> Result<Value, RelayError> {
        let response = self
            .client
            .get(format!("{}/transactions/{:?}/status", self.base_url, tx_hash))
            .send()
            .await
            .map_err(|e| self.map_http(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Rejected(format!("HTTP {}", status)));
        }

        response.json().await.map_err(|e| self.map_http(e))
    }
}

/// Relays report quantities as JSON numbers, decimal strings or `0x` hex strings.
fn parse_quantity(value: &Value) -> Option<U256> {
    match value {
        Value::Number(n) => n.as_u64().map(U256::from),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => U256::from_str_radix(hex, 16).ok(),
                None => U256::from_dec_str(s).ok(),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantities_in_any_encoding() {
        assert_eq!(parse_quantity(&json!(21000)), Some(U256::from(21_000u64)));
        assert_eq!(parse_quantity(&json!("21000")), Some(U256::from(21_000u64)));
        assert_eq!(parse_quantity(&json!("0x5208")), Some(U256::from(21_000u64)));
        assert_eq!(parse_quantity(&json!(null)), None);
        assert_eq!(parse_quantity(&json!("lots")), None);
    }
}
