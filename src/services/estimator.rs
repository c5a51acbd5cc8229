use crate::{
    models::{parse_recipient, FeeEstimate, TokenAmount},
    services::chain::{with_deadline, ChainClient},
};
use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::Duration;

/// Default gas for an ERC-20 transfer when simulation is unavailable.
pub const DEFAULT_GAS_LIMIT: u64 = 100_000;

/// Advisory gas/fee estimation. Never fails: a failed simulation degrades to the
/// fallback gas constant, and a missing fee sample leaves the native cost unset.
#[derive(Clone)]
pub struct CostEstimator {
    chain: Arc<dyn ChainClient>,
    token: Address,
    decimals: u8,
    fallback_gas: U256,
    rpc_timeout: Duration,
}

impl CostEstimator {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        token: Address,
        decimals: u8,
        fallback_gas: U256,
        rpc_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            token,
            decimals,
            fallback_gas,
            rpc_timeout,
        }
    }

    pub fn fallback_gas(&self) -> U256 {
        self.fallback_gas
    }

    /// Estimate a transfer described by raw user input.
    pub async fn estimate_cost(&self, payer: Address, recipient: &str, amount: &str) -> FeeEstimate {
        let gas = match (
            parse_recipient(recipient),
            TokenAmount::parse(amount, self.decimals),
        ) {
            (Ok(to), Ok(amount)) => self.estimate_gas(payer, to, amount.units()).await,
            (Err(e), _) => {
                tracing::warn!("Skipping gas simulation: {}", e);
                FeeEstimate::fallback(self.fallback_gas)
            }
            (_, Err(e)) => {
                tracing::warn!("Skipping gas simulation: {}", e);
                FeeEstimate::fallback(self.fallback_gas)
            }
        };

        match with_deadline(self.rpc_timeout, self.chain.gas_price()).await {
            Ok(price) => gas.with_gas_price(price),
            Err(e) => {
                tracing::warn!("Gas price unavailable, native cost indeterminate: {}", e);
                gas
            }
        }
    }

    /// Simulate `transfer(to, units)` from `payer`; falls back to the constant on any error.
    pub async fn estimate_gas(&self, payer: Address, to: Address, units: U256) -> FeeEstimate {
        let simulation = self
            .chain
            .estimate_transfer_gas(self.token, payer, to, units);

        match with_deadline(self.rpc_timeout, simulation).await {
            Ok(gas) => {
                tracing::debug!("Simulated transfer gas: {}", gas);
                FeeEstimate::simulated(gas)
            }
            Err(e) => {
                tracing::warn!(
                    "Gas estimation failed, using fallback of {}: {}",
                    self.fallback_gas,
                    e
                );
                FeeEstimate::fallback(self.fallback_gas)
            }
        }
    }
}
