//! Balance reads and advisory cost estimation.

mod common;

use common::*;
use ethers::types::U256;
use giftpay::{config::PaymentSettings, services::DEFAULT_GAS_LIMIT};
use std::sync::atomic::Ordering;
use tokio_test::{assert_err, assert_ok};

// ============================================================================
// BALANCE ORACLE
// ============================================================================

#[tokio::test]
async fn test_balance_is_scaled_to_token_decimals() {
    let h = harness(MockChain::with_balance("1234.5"), MockSigner::default(), None);

    let balance = assert_ok!(h.service.get_balance(payer()).await);

    assert_eq!(balance.units(), U256::from(1_234_500_000u64));
    assert_eq!(balance.to_string(), "1234.5");
}

#[tokio::test]
async fn test_empty_wallet_reads_zero() {
    let h = harness(MockChain::with_balance("0"), MockSigner::default(), None);

    let balance = assert_ok!(h.service.get_balance(recipient()).await);

    assert!(balance.is_zero());
    assert_eq!(balance.to_string(), "0");
}

/// A failed read is an error, never a zero balance.
#[tokio::test]
async fn test_failed_read_is_not_zero() {
    let chain = MockChain {
        balance: None,
        ..MockChain::default()
    };
    let h = harness(chain, MockSigner::default(), None);

    let err = assert_err!(h.service.get_balance(payer()).await);

    assert_eq!(err.owner, payer());
    assert!(err.reason.contains("balanceOf reverted"));
}

// ============================================================================
// COST ESTIMATOR
// ============================================================================

#[tokio::test]
async fn test_simulated_estimate_with_fee_sample() {
    let h = harness(MockChain::default(), MockSigner::default(), None);

    let estimate = h.service.estimate_cost(RECIPIENT, "10.00").await;

    assert!(!estimate.degraded);
    assert_eq!(estimate.gas_units, U256::from(65_000u64));
    assert_eq!(estimate.gas_price_wei, Some(U256::from(1_000_000_000u64)));
    assert_eq!(
        estimate.native_cost_wei,
        Some(U256::from(65_000_000_000_000u64))
    );
    assert_eq!(h.chain.estimate_calls.load(Ordering::SeqCst), 1);
}

/// A reverting simulation (e.g. over-balance) degrades to the fallback constant.
#[tokio::test]
async fn test_failed_simulation_uses_fallback() {
    let chain = MockChain {
        gas_estimate: None,
        ..MockChain::default()
    };
    let h = harness(chain, MockSigner::default(), None);

    let estimate = h.service.estimate_cost(RECIPIENT, "999999").await;

    assert!(estimate.degraded);
    assert_eq!(estimate.gas_units, U256::from(DEFAULT_GAS_LIMIT));
    assert!(estimate.native_cost_wei.is_some());
}

/// Garbage input still produces an estimate, without simulating.
#[tokio::test]
async fn test_unparseable_input_skips_simulation() {
    let h = harness(MockChain::default(), MockSigner::default(), None);

    let estimate = h.service.estimate_cost("0xinvalid", "10").await;
    assert!(estimate.degraded);
    assert_eq!(estimate.gas_units, U256::from(DEFAULT_GAS_LIMIT));

    let estimate = h.service.estimate_cost(RECIPIENT, "ten").await;
    assert!(estimate.degraded);

    assert_eq!(h.chain.estimate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_fee_sample_leaves_cost_unset() {
    let chain = MockChain {
        gas_price: None,
        ..MockChain::default()
    };
    let h = harness(chain, MockSigner::default(), None);

    let estimate = h.service.estimate_cost(RECIPIENT, "1").await;

    assert!(!estimate.degraded);
    assert_eq!(estimate.gas_units, U256::from(65_000u64));
    assert!(estimate.gas_price_wei.is_none());
    assert!(estimate.native_cost_wei.is_none());
}

#[tokio::test]
async fn test_configured_fallback_gas() {
    let chain = MockChain {
        gas_estimate: None,
        gas_price: None,
        ..MockChain::default()
    };
    let settings = PaymentSettings {
        fallback_gas_limit: U256::from(120_000u64),
        ..test_settings()
    };
    let h = harness_with_settings(chain, MockSigner::default(), None, settings);

    let estimate = h.service.estimate_cost(RECIPIENT, "1").await;

    assert!(estimate.degraded);
    assert_eq!(estimate.gas_units, U256::from(120_000u64));
}
