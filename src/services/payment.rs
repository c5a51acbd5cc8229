use crate::{
    config::PaymentSettings,
    error::{BalanceQueryError, ChainError},
    models::{ConfirmationStatus, FeeEstimate, PaymentOptions, PaymentRequest, PaymentResult, TokenAmount},
    services::{
        balance::BalanceOracle,
        chain::{with_deadline, ChainClient, WalletSigner},
        estimator::CostEstimator,
        executor::TransferExecutor,
        relay::PaymentRelay,
        watcher::ConfirmationWatcher,
    },
};
use ethers::types::{Address, H256};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for callers: owns its collaborators, holds no per-payment state.
#[derive(Clone)]
pub struct PaymentService {
    chain: Arc<dyn ChainClient>,
    signer: Arc<dyn WalletSigner>,
    relay: Option<Arc<dyn PaymentRelay>>,
    balances: BalanceOracle,
    estimator: CostEstimator,
    executor: TransferExecutor,
    watcher: ConfirmationWatcher,
    settings: PaymentSettings,
}

impl PaymentService {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        signer: Arc<dyn WalletSigner>,
        relay: Option<Arc<dyn PaymentRelay>>,
        settings: PaymentSettings,
    ) -> Self {
        let balances = BalanceOracle::new(
            chain.clone(),
            settings.token,
            settings.decimals,
            settings.rpc_timeout,
        );
        let estimator = CostEstimator::new(
            chain.clone(),
            settings.token,
            settings.decimals,
            settings.fallback_gas_limit,
            settings.rpc_timeout,
        );
        let executor = TransferExecutor::new(
            signer.clone(),
            relay.clone(),
            balances.clone(),
            estimator.clone(),
            settings.clone(),
        );
        let watcher = ConfirmationWatcher::new(
            chain.clone(),
            settings.poll_interval,
            settings.rpc_timeout,
        );

        tracing::info!(
            "Payment service ready (payer {:?}, token {:?}, relay configured: {})",
            signer.address(),
            settings.token,
            relay.is_some()
        );

        Self {
            chain,
            signer,
            relay,
            balances,
            estimator,
            executor,
            watcher,
            settings,
        }
    }

    pub fn payer(&self) -> Address {
        self.signer.address()
    }

    pub fn settings(&self) -> &PaymentSettings {
        &self.settings
    }

    pub fn relay_enabled(&self) -> bool {
        self.settings.relay_enabled && self.relay.is_some()
    }

    /// Latest block number; used as a connectivity check.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        with_deadline(self.settings.rpc_timeout, self.chain.block_number()).await
    }

    pub async fn send_payment(&self, request: &PaymentRequest, options: &PaymentOptions) -> PaymentResult {
        self.executor.execute(request, options).await
    }

    pub async fn get_balance(&self, owner: Address) -> Result<TokenAmount, BalanceQueryError> {
        self.balances.get_balance(owner).await
    }

    pub async fn estimate_cost(&self, recipient: &str, amount: &str) -> FeeEstimate {
        self.estimator
            .estimate_cost(self.signer.address(), recipient, amount)
            .await
    }

    /// `confirmations` defaults to 1 and `timeout` to the configured confirmation timeout.
    pub async fn wait_for_confirmation(
        &self,
        tx_hash: H256,
        confirmations: Option<u64>,
        timeout: Option<Duration>,
    ) -> ConfirmationStatus {
        self.watcher
            .wait_for_confirmation(
                tx_hash,
                confirmations.unwrap_or(1),
                timeout.unwrap_or(self.settings.confirmation_timeout),
            )
            .await
    }

    /// The relay's own view of a transaction; `None` if there is no relay or it errored.
    pub async fn transaction_status(&self, tx_hash: H256) -> Option<serde_json::Value> {
        let relay = self.relay.as_ref()?;

        match tokio::time::timeout(self.settings.relay_timeout, relay.transaction_status(tx_hash)).await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(e)) => {
                tracing::warn!("Failed to get transaction status for {:?}: {}", tx_hash, e);
                None
            }
            Err(_) => {
                tracing::warn!("Relay status lookup for {:?} timed out", tx_hash);
                None
            }
        }
    }
}
