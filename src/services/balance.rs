use crate::{
    error::BalanceQueryError,
    models::TokenAmount,
    services::chain::{with_deadline, ChainClient},
};
use ethers::types::Address;
use std::sync::Arc;
use std::time::Duration;

/// Reads token balances straight from the chain. No caching: every call is a fresh read.
#[derive(Clone)]
pub struct BalanceOracle {
    chain: Arc<dyn ChainClient>,
    token: Address,
    decimals: u8,
    rpc_timeout: Duration,
}

impl BalanceOracle {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        token: Address,
        decimals: u8,
        rpc_timeout: Duration,
    ) -> Self {
        Self {
            chain,
            token,
            decimals,
            rpc_timeout,
        }
    }

    pub async fn get_balance(&self, owner: Address) -> Result<TokenAmount, BalanceQueryError> {
        let units = with_deadline(self.rpc_timeout, self.chain.token_balance(self.token, owner))
            .await
            .map_err(|e| {
                tracing::error!("Error fetching token balance for {:?}: {}", owner, e);
                BalanceQueryError {
                    owner,
                    reason: e.to_string(),
                }
            })?;

        let balance = TokenAmount::from_units(units, self.decimals);
        tracing::debug!("Balance of {:?}: {}", owner, balance);

        Ok(balance)
    }
}
