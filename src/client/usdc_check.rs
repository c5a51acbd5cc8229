use anyhow::{bail, Result};
use giftpay::{
    client::build_payment_service,
    config::Config,
    models::{PaymentOptions, PaymentRequest, USDC_DECIMALS},
    services::ChainClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let (chain, service) = build_payment_service(&config)?;
    let token = config.payment.token;

    println!("GiftPay USDC Integration Check");
    println!("==============================");
    println!("RPC: {}", config.rpc_url);
    println!("Token: {:?}", token);
    println!("Payer: {:?}", service.payer());
    println!();

    println!("1. Checking token contract...");
    if !chain.has_code(token).await? {
        bail!("No contract code at {:?}", token);
    }
    println!("   [OK] Contract deployed");

    println!("2. Checking token decimals...");
    let decimals = chain.token_decimals(token).await?;
    if decimals != config.payment.decimals {
        println!(
            "   [WARN] Expected {} decimals, contract reports {}",
            config.payment.decimals, decimals
        );
    } else if decimals != USDC_DECIMALS {
        println!("   [WARN] Token has {} decimals, USDC uses {}", decimals, USDC_DECIMALS);
    } else {
        println!("   [OK] {} decimals", decimals);
    }

    println!("3. Reading payer balance...");
    let balance = service.get_balance(service.payer()).await?;
    println!("   [OK] Balance: {}", balance);

    println!("4. Checking network connectivity...");
    let block = chain.block_number().await?;
    println!("   [OK] Latest block: {}", block);

    println!("5. Sampling gas price...");
    let gas_price = chain.gas_price().await?;
    println!(
        "   [OK] {} wei ({} gwei)",
        gas_price,
        ethers::utils::format_units(gas_price, "gwei")?
    );

    let (Ok(recipient), Ok(amount)) = (
        std::env::var("CHECK_SEND_TO"),
        std::env::var("CHECK_SEND_AMOUNT"),
    ) else {
        println!();
        println!("All checks passed (set CHECK_SEND_TO and CHECK_SEND_AMOUNT to test a transfer)");
        return Ok(());
    };

    println!();
    println!("6. Estimating transfer cost...");
    let estimate = service.estimate_cost(&recipient, &amount).await;
    println!(
        "   Gas: {} (degraded: {}), native cost: {}",
        estimate.gas_units,
        estimate.degraded,
        estimate
            .native_cost_eth()
            .unwrap_or_else(|| "unknown".to_string())
    );

    println!("7. Sending {} to {}...", amount, recipient);
    let request = PaymentRequest::new(recipient, amount).with_description("integration check");
    let result = service
        .send_payment(&request, &PaymentOptions::default())
        .await;

    let Some(tx_hash) = result.tx_hash() else {
        let reason = result
            .error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        bail!("Payment failed: {}", reason);
    };
    println!("   [OK] Submitted via {:?}: {:?}", result.path(), tx_hash);

    println!("8. Waiting for confirmation...");
    let status = service.wait_for_confirmation(tx_hash, Some(1), None).await;
    println!("   {}", serde_json::to_string_pretty(&status)?);

    if !status.confirmed {
        bail!("Transaction {:?} not confirmed ({:?})", tx_hash, status.state);
    }

    println!();
    println!("All checks passed");
    Ok(())
}
