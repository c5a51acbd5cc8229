use crate::{contracts::IERC20, error::ChainError, services::ChainClient};
use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    prelude::*,
    providers::{Http, Provider},
    types::{Address, TransactionReceipt, H256, U256},
};
use std::future::Future;
use std::sync::Arc;

/// JSON-RPC chain access with an optional fallback endpoint for reads.
pub struct EthersChain {
    primary: Arc<Provider<Http>>,
    fallback: Option<Arc<Provider<Http>>>,
}

impl EthersChain {
    pub fn new(rpc_url: &str, fallback_url: Option<&str>) -> Result<Self> {
        let primary = Arc::new(Provider::<Http>::try_from(rpc_url)?);

        let fallback = if let Some(url) = fallback_url {
            Some(Arc::new(Provider::<Http>::try_from(url)?))
        } else {
            None
        };

        Ok(Self { primary, fallback })
    }

    pub fn provider(&self) -> Arc<Provider<Http>> {
        self.primary.clone()
    }

    pub async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        self.read("decimals", move |provider| async move {
            let contract = IERC20::new(token, provider);
            let call = contract.decimals();
            call.call().await.map_err(contract_error)
        })
        .await
    }

    pub async fn has_code(&self, address: Address) -> Result<bool, ChainError> {
        self.read("get_code", move |provider| async move {
            let code = provider.get_code(address, None).await?;
            Ok::<_, ChainError>(!code.is_empty())
        })
        .await
    }

    async fn read<T, F, Fut>(&self, what: &str, call: F) -> Result<T, ChainError>
    where
        F: Fn(Arc<Provider<Http>>) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ChainError>> + Send,
        T: Send,
    {
        match call(self.primary.clone()).await {
            Ok(value) => Ok(value),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!("Primary RPC failed for {}, trying fallback: {}", what, e);
                    call(fallback.clone()).await
                }
                None => Err(e),
            },
        }
    }
}

fn contract_error<M: Middleware>(e: ContractError<M>) -> ChainError {
    ChainError::Contract(e.to_string())
}

#[async_trait]
impl ChainClient for EthersChain {
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        self.read("balanceOf", move |provider| async move {
            let contract = IERC20::new(token, provider);
            let call = contract.balance_of(owner);
            call.call().await.map_err(contract_error)
        })
        .await
    }

    async fn estimate_transfer_gas(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, ChainError> {
        self.read("estimate_gas", move |provider| async move {
            let contract = IERC20::new(token, provider);
            let call = contract.transfer(to, amount).from(from);
            call.estimate_gas().await.map_err(contract_error)
        })
        .await
    }

    async fn gas_price(&self) -> Result<U256, ChainError> {
        self.read("gas_price", |provider| async move {
            Ok::<_, ChainError>(provider.get_gas_price().await?)
        })
        .await
    }

    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.read("get_transaction_receipt", move |provider| async move {
            Ok::<_, ChainError>(provider.get_transaction_receipt(tx_hash).await?)
        })
        .await
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.read("get_block_number", |provider| async move {
            Ok::<_, ChainError>(provider.get_block_number().await?.as_u64())
        })
        .await
    }
}
