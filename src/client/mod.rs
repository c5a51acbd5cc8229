pub mod chain;
pub mod relay;
pub mod wallet;

pub use chain::EthersChain;
pub use relay::HttpRelay;
pub use wallet::LocalWalletSigner;

use crate::{
    config::Config,
    services::{PaymentRelay, PaymentService},
};
use anyhow::Result;
use std::sync::Arc;

/// Wire the chain client, signing wallet and (optional) relay from configuration.
pub fn build_payment_service(config: &Config) -> Result<(Arc<EthersChain>, PaymentService)> {
    let chain = Arc::new(EthersChain::new(
        &config.rpc_url,
        config.rpc_fallback_url.as_deref(),
    )?);
    let signer = Arc::new(LocalWalletSigner::new(
        &config.rpc_url,
        &config.payer_private_key,
        config.chain_id,
    )?);

    let relay: Option<Arc<dyn PaymentRelay>> = match &config.relay_url {
        Some(url) => Some(Arc::new(HttpRelay::new(
            url.clone(),
            config.payment.relay_timeout,
        )?)),
        None => None,
    };

    let service = PaymentService::new(chain.clone(), signer, relay, config.payment.clone());

    Ok((chain, service))
}
