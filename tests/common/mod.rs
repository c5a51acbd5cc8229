#![allow(dead_code)]

use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, H256, U256, U64};
use giftpay::{
    config::PaymentSettings,
    error::{ChainError, RelayError},
    models::TokenAmount,
    services::{ChainClient, PaymentRelay, PaymentService, RelayIntent, RelaySubmission, WalletSigner},
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PAYER: &str = "0x1111111111111111111111111111111111111111";
pub const RECIPIENT: &str = "0x2222222222222222222222222222222222222222";

pub fn payer() -> Address {
    PAYER.parse().unwrap()
}

pub fn recipient() -> Address {
    RECIPIENT.parse().unwrap()
}

pub fn usdc(amount: &str) -> U256 {
    TokenAmount::parse(amount, 6).unwrap().units()
}

/// Settings with short timeouts so failure paths finish quickly.
pub fn test_settings() -> PaymentSettings {
    PaymentSettings {
        relay_timeout: Duration::from_millis(200),
        rpc_timeout: Duration::from_millis(200),
        poll_interval: Duration::from_millis(10),
        confirmation_timeout: Duration::from_millis(300),
        ..PaymentSettings::default()
    }
}

// ============================================================================
// CHAIN
// ============================================================================

pub struct MockChain {
    /// `None` makes `balanceOf` fail.
    pub balance: Option<U256>,
    /// `None` makes simulation revert.
    pub gas_estimate: Option<U256>,
    /// `None` makes the fee sample unavailable.
    pub gas_price: Option<U256>,
    pub receipts: Mutex<HashMap<H256, TransactionReceipt>>,
    pub head: AtomicU64,
    /// Number of receipt lookups that fail before lookups start succeeding.
    pub receipt_failures: AtomicUsize,

    pub balance_calls: AtomicUsize,
    pub estimate_calls: AtomicUsize,
    pub gas_price_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            balance: Some(usdc("500.00")),
            gas_estimate: Some(U256::from(65_000u64)),
            gas_price: Some(U256::from(1_000_000_000u64)),
            receipts: Mutex::new(HashMap::new()),
            head: AtomicU64::new(1_000),
            receipt_failures: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            estimate_calls: AtomicUsize::new(0),
            gas_price_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
            block_calls: AtomicUsize::new(0),
        }
    }
}

impl MockChain {
    pub fn with_balance(amount: &str) -> Self {
        Self {
            balance: Some(usdc(amount)),
            ..Self::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
            + self.estimate_calls.load(Ordering::SeqCst)
            + self.gas_price_calls.load(Ordering::SeqCst)
            + self.receipt_calls.load(Ordering::SeqCst)
            + self.block_calls.load(Ordering::SeqCst)
    }

    pub fn mine(&self, tx_hash: H256, block: u64, succeeded: bool) {
        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_number: Some(U64::from(block)),
            gas_used: Some(U256::from(52_000u64)),
            status: Some(U64::from(u64::from(succeeded))),
            ..Default::default()
        };
        self.receipts.lock().unwrap().insert(tx_hash, receipt);
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256, ChainError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balance
            .ok_or_else(|| ChainError::Contract("balanceOf reverted".to_string()))
    }

    async fn estimate_transfer_gas(
        &self,
        _token: Address,
        _from: Address,
        _to: Address,
        _amount: U256,
    ) -> Result<U256, ChainError> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.gas_estimate
            .ok_or_else(|| ChainError::Contract("execution reverted".to_string()))
    }

    async fn gas_price(&self) -> Result<U256, ChainError> {
        self.gas_price_calls.fetch_add(1, Ordering::SeqCst);
        self.gas_price
            .ok_or_else(|| ChainError::Contract("fee history unavailable".to_string()))
    }

    async fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.receipt_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.receipt_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(ChainError::Contract("connection reset".to_string()));
        }

        Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned())
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.head.load(Ordering::SeqCst))
    }
}

// ============================================================================
// SIGNER
// ============================================================================

pub struct MockSigner {
    pub address: Address,
    pub fail_with: Option<String>,
    pub submit_calls: AtomicUsize,
    pub last_gas: Mutex<Option<U256>>,
    pub last_amount: Mutex<Option<U256>>,
}

impl Default for MockSigner {
    fn default() -> Self {
        Self {
            address: payer(),
            fail_with: None,
            submit_calls: AtomicUsize::new(0),
            last_gas: Mutex::new(None),
            last_amount: Mutex::new(None),
        }
    }
}

impl MockSigner {
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

pub fn direct_hash(n: usize) -> H256 {
    H256::from_low_u64_be(0xd1_0000 + n as u64)
}

#[async_trait]
impl WalletSigner for MockSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn submit_transfer(
        &self,
        _token: Address,
        _to: Address,
        amount: U256,
        gas_limit: U256,
    ) -> Result<H256, ChainError> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_gas.lock().unwrap() = Some(gas_limit);
        *self.last_amount.lock().unwrap() = Some(amount);

        match &self.fail_with {
            Some(reason) => Err(ChainError::Signer(reason.clone())),
            None => Ok(direct_hash(n)),
        }
    }
}

// ============================================================================
// RELAY
// ============================================================================

pub enum RelayBehavior {
    Accept(H256),
    Reject,
    Hang,
    EmptyHash,
}

pub struct MockRelay {
    pub behavior: RelayBehavior,
    pub submit_calls: AtomicUsize,
    pub last_intent: Mutex<Option<RelayIntent>>,
}

impl MockRelay {
    pub fn new(behavior: RelayBehavior) -> Self {
        Self {
            behavior,
            submit_calls: AtomicUsize::new(0),
            last_intent: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

pub fn relay_hash() -> H256 {
    H256::repeat_byte(0x42)
}

#[async_trait]
impl PaymentRelay for MockRelay {
    async fn submit(&self, intent: &RelayIntent) -> Result<RelaySubmission, RelayError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_intent.lock().unwrap() = Some(intent.clone());

        match &self.behavior {
            RelayBehavior::Accept(tx_hash) => Ok(RelaySubmission {
                tx_hash: *tx_hash,
                gas_used: None,
                block_number: None,
            }),
            RelayBehavior::Reject => Err(RelayError::Rejected("relay unavailable".to_string())),
            RelayBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(RelayError::Timeout(Duration::from_secs(30)))
            }
            RelayBehavior::EmptyHash => Ok(RelaySubmission {
                tx_hash: H256::zero(),
                gas_used: None,
                block_number: None,
            }),
        }
    }

    async fn transaction_status(&self, tx_hash: H256) -> Result<serde_json::Value, RelayError> {
        Ok(serde_json::json!({
            "transactionHash": format!("{:?}", tx_hash),
            "status": "pending",
        }))
    }
}

// ============================================================================
// SERVICE
// ============================================================================

pub struct Harness {
    pub chain: Arc<MockChain>,
    pub signer: Arc<MockSigner>,
    pub relay: Option<Arc<MockRelay>>,
    pub service: PaymentService,
}

pub fn harness(chain: MockChain, signer: MockSigner, relay: Option<MockRelay>) -> Harness {
    harness_with_settings(chain, signer, relay, test_settings())
}

pub fn harness_with_settings(
    chain: MockChain,
    signer: MockSigner,
    relay: Option<MockRelay>,
    settings: PaymentSettings,
) -> Harness {
    let chain = Arc::new(chain);
    let signer = Arc::new(signer);
    let relay = relay.map(Arc::new);

    let service = PaymentService::new(
        chain.clone(),
        signer.clone(),
        relay.clone().map(|r| r as Arc<dyn PaymentRelay>),
        settings,
    );

    Harness {
        chain,
        signer,
        relay,
        service,
    }
}
