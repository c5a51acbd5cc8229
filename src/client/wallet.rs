use crate::{contracts::IERC20, error::ChainError, services::WalletSigner};
use anyhow::Result;
use async_trait::async_trait;
use ethers::{
    prelude::*,
    providers::{Http, Provider},
    types::{Address, H256, U256},
};
use std::sync::Arc;

/// Signs token transfers with a locally held private key.
pub struct LocalWalletSigner {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl LocalWalletSigner {
    pub fn new(rpc_url: &str, private_key: &str, chain_id: u64) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)?;

        let wallet = private_key
            .parse::<LocalWallet>()?
            .with_chain_id(chain_id);

        let client = Arc::new(SignerMiddleware::new(provider, wallet));

        Ok(Self { client })
    }
}

#[async_trait]
impl WalletSigner for LocalWalletSigner {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn submit_transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
        gas_limit: U256,
    ) -> Result<H256, ChainError> {
        let usdc = IERC20::new(token, self.client.clone());
        let tx = usdc.transfer(to, amount).gas(gas_limit);

        let pending_tx = tx
            .send()
            .await
            .map_err(|e| ChainError::Signer(e.to_string()))?;

        Ok(pending_tx.tx_hash())
    }
}
