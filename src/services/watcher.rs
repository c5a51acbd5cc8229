use crate::{
    error::ChainError,
    models::ConfirmationStatus,
    services::chain::{with_deadline, ChainClient},
};
use ethers::types::H256;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polls for a transaction receipt until it reaches the requested depth.
///
/// Dropping the future returned by `wait_for_confirmation` only stops the polling; the
/// submitted transaction is unaffected.
#[derive(Clone)]
pub struct ConfirmationWatcher {
    chain: Arc<dyn ChainClient>,
    poll_interval: Duration,
    rpc_timeout: Duration,
}

impl ConfirmationWatcher {
    pub fn new(chain: Arc<dyn ChainClient>, poll_interval: Duration, rpc_timeout: Duration) -> Self {
        Self {
            chain,
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            rpc_timeout,
        }
    }

    /// Never errors: a slow network yields `TimedOut`, a failed execution yields `Reverted`.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: H256,
        confirmations: u64,
        timeout: Duration,
    ) -> ConfirmationStatus {
        let required = confirmations.max(1);

        tracing::info!(
            "Waiting for {} confirmation(s) of {:?} (timeout {:?})",
            required,
            tx_hash,
            timeout
        );

        match tokio::time::timeout(timeout, self.poll(tx_hash, required)).await {
            Ok(status) => status,
            Err(_) => {
                tracing::info!("Transaction {:?} not confirmed within {:?}", tx_hash, timeout);
                ConfirmationStatus::timed_out()
            }
        }
    }

    async fn poll(&self, tx_hash: H256, required: u64) -> ConfirmationStatus {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.check(tx_hash, required).await {
                Ok(Some(status)) => return status,
                Ok(None) => tracing::debug!("Transaction {:?} not yet at required depth", tx_hash),
                // Transient RPC failures are retried on the next tick.
                Err(e) => tracing::warn!("Receipt poll for {:?} failed: {}", tx_hash, e),
            }
        }
    }

    async fn check(&self, tx_hash: H256, required: u64) -> Result<Option<ConfirmationStatus>, ChainError> {
        let receipt = with_deadline(self.rpc_timeout, self.chain.transaction_receipt(tx_hash)).await?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };
        let Some(mined_in) = receipt.block_number.map(|n| n.as_u64()) else {
            return Ok(None);
        };

        if receipt.status == Some(0u64.into()) {
            tracing::warn!("Transaction {:?} reverted in block {}", tx_hash, mined_in);
            return Ok(Some(ConfirmationStatus::reverted(mined_in, receipt.gas_used)));
        }

        if required > 1 {
            let head = with_deadline(self.rpc_timeout, self.chain.block_number()).await?;
            let depth = head.saturating_sub(mined_in) + 1;
            if depth < required {
                tracing::debug!("Transaction {:?} at depth {}/{}", tx_hash, depth, required);
                return Ok(None);
            }
        }

        tracing::info!("Transaction {:?} confirmed in block {}", tx_hash, mined_in);
        Ok(Some(ConfirmationStatus::confirmed(mined_in, receipt.gas_used)))
    }
}
