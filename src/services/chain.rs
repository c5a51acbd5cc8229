use crate::error::ChainError;
use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, H256, U256};
use std::future::Future;
use std::time::Duration;

/// Read-only chain access needed by the payment flow.
///
/// Implementations are shared between concurrent payments and must not hold per-call
/// session state.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// `balanceOf(owner)` on the token contract.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError>;

    /// Simulate `transfer(to, amount)` sent from `from` and return the gas it would use.
    async fn estimate_transfer_gas(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, ChainError>;

    async fn gas_price(&self) -> Result<U256, ChainError>;

    async fn transaction_receipt(&self, tx_hash: H256)
        -> Result<Option<TransactionReceipt>, ChainError>;

    async fn block_number(&self) -> Result<u64, ChainError>;
}

/// The payer's signing wallet, supplied by the surrounding application.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    fn address(&self) -> Address;

    /// Sign and broadcast `transfer(to, amount)` on the token contract.
    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
        gas_limit: U256,
    ) -> Result<H256, ChainError>;
}

/// Run a chain call under a deadline so no suspension point can hang forever.
pub async fn with_deadline<T, F>(limit: Duration, call: F) -> Result<T, ChainError>
where
    F: Future<Output = Result<T, ChainError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ChainError::Timeout(limit)),
    }
}
