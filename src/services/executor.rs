use crate::{
    config::PaymentSettings,
    contracts::encode_transfer,
    error::{AmountParseError, PaymentError},
    models::{
        parse_recipient, PaymentOptions, PaymentRequest, PaymentResult, SubmissionPath,
        TokenAmount,
    },
    services::{
        balance::BalanceOracle,
        chain::{with_deadline, WalletSigner},
        estimator::CostEstimator,
        relay::{PaymentRelay, RelayIntent, RelayTransaction},
    },
};
use ethers::types::{Address, U256};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Stages a payment passes through, in order. Logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Validating,
    BalanceChecking,
    RelayAttempt,
    DirectAttempt,
    Submitted,
    Failed,
}

impl fmt::Display for TransferStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferStage::Validating => "validating",
            TransferStage::BalanceChecking => "balance_checking",
            TransferStage::RelayAttempt => "relay_attempt",
            TransferStage::DirectAttempt => "direct_attempt",
            TransferStage::Submitted => "submitted",
            TransferStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A request that passed validation: everything is in integer token-unit space from here on.
#[derive(Debug, Clone)]
pub struct ValidatedTransfer {
    pub recipient: Address,
    pub amount: TokenAmount,
}

/// Turns a payment request into exactly one submitted transfer.
///
/// Relay and direct submission never run concurrently: the relay is tried first (when
/// enabled) and the direct path only runs after the relay has definitively failed.
#[derive(Clone)]
pub struct TransferExecutor {
    signer: Arc<dyn WalletSigner>,
    relay: Option<Arc<dyn PaymentRelay>>,
    balances: BalanceOracle,
    estimator: CostEstimator,
    settings: PaymentSettings,
}

impl TransferExecutor {
    pub fn new(
        signer: Arc<dyn WalletSigner>,
        relay: Option<Arc<dyn PaymentRelay>>,
        balances: BalanceOracle,
        estimator: CostEstimator,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            signer,
            relay,
            balances,
            estimator,
            settings,
        }
    }

    pub fn validate(&self, request: &PaymentRequest) -> Result<ValidatedTransfer, PaymentError> {
        let recipient = parse_recipient(&request.recipient)?;
        let amount = TokenAmount::parse(&request.amount, self.settings.decimals).map_err(|e| {
            match e {
                // An amount that overflows U256 is always above the ceiling.
                AmountParseError::Overflow(requested) => PaymentError::AmountTooLarge {
                    requested,
                    max: self.settings.max_amount,
                },
                other => other.into(),
            }
        })?;

        if amount.is_zero() {
            return Err(PaymentError::InvalidAmount {
                reason: format!("amount must be greater than zero: {}", request.amount.trim()),
            });
        }
        if amount.units() > self.settings.max_amount.units() {
            return Err(PaymentError::AmountTooLarge {
                requested: amount.to_string(),
                max: self.settings.max_amount,
            });
        }

        Ok(ValidatedTransfer { recipient, amount })
    }

    pub async fn execute(&self, request: &PaymentRequest, options: &PaymentOptions) -> PaymentResult {
        match self.run(request, options).await {
            Ok(result) => {
                transition(TransferStage::Submitted);
                result
            }
            Err(e) => {
                transition(TransferStage::Failed);
                tracing::error!(kind = ?e.kind(), "Payment failed: {}", e);
                PaymentResult::failed(e)
            }
        }
    }

    async fn run(
        &self,
        request: &PaymentRequest,
        options: &PaymentOptions,
    ) -> Result<PaymentResult, PaymentError> {
        transition(TransferStage::Validating);
        let transfer = self.validate(request)?;
        let payer = self.signer.address();

        tracing::info!(
            "Sending {} tokens from {:?} to {:?}",
            transfer.amount,
            payer,
            transfer.recipient
        );

        // The estimate runs alongside the balance read; neither submits anything.
        transition(TransferStage::BalanceChecking);
        let (balance, gas_limit) = futures::join!(
            self.balances.get_balance(payer),
            self.gas_limit(payer, &transfer, options),
        );
        let balance = balance?;

        if balance.units() < transfer.amount.units() {
            return Err(PaymentError::InsufficientBalance {
                required: transfer.amount,
                available: balance,
            });
        }

        if self.relay_requested(options) {
            if let Some(relay) = &self.relay {
                transition(TransferStage::RelayAttempt);
                let intent = self.relay_intent(payer, &transfer, gas_limit, request);

                match self.try_relay(relay.as_ref(), &intent).await {
                    Some(result) => return Ok(result),
                    None => tracing::warn!("Relay submission failed, falling back to direct transfer"),
                }
            }
        }

        transition(TransferStage::DirectAttempt);
        self.submit_direct(&transfer, gas_limit).await
    }

    fn relay_requested(&self, options: &PaymentOptions) -> bool {
        options.use_relay.unwrap_or(self.settings.relay_enabled)
    }

    async fn gas_limit(
        &self,
        payer: Address,
        transfer: &ValidatedTransfer,
        options: &PaymentOptions,
    ) -> U256 {
        match options.gas_limit {
            Some(limit) => U256::from(limit),
            None => {
                self.estimator
                    .estimate_gas(payer, transfer.recipient, transfer.amount.units())
                    .await
                    .gas_units
            }
        }
    }

    fn relay_intent(
        &self,
        payer: Address,
        transfer: &ValidatedTransfer,
        gas_limit: U256,
        request: &PaymentRequest,
    ) -> RelayIntent {
        let mut metadata: BTreeMap<String, String> = request.metadata.clone();
        metadata.insert("type".to_string(), "gift_payment".to_string());
        metadata.insert("amount".to_string(), transfer.amount.to_string());
        metadata.insert("token".to_string(), format!("{:?}", self.settings.token));
        if let Some(description) = &request.description {
            metadata.insert("description".to_string(), description.clone());
        }

        RelayIntent {
            transaction: RelayTransaction {
                from: payer,
                to: self.settings.token,
                data: encode_transfer(transfer.recipient, transfer.amount.units()),
                gas: gas_limit,
                value: U256::zero(),
            },
            metadata,
        }
    }

    /// Returns `None` on any relay failure; the error is logged and never surfaced.
    async fn try_relay(&self, relay: &dyn PaymentRelay, intent: &RelayIntent) -> Option<PaymentResult> {
        let limit = self.settings.relay_timeout;

        match tokio::time::timeout(limit, relay.submit(intent)).await {
            Ok(Ok(submission)) if submission.tx_hash.is_zero() => {
                tracing::warn!("Relay reported success with an empty transaction hash");
                None
            }
            Ok(Ok(submission)) => {
                tracing::info!("Relay accepted transfer: {:?}", submission.tx_hash);
                Some(
                    PaymentResult::submitted(submission.tx_hash, SubmissionPath::Relay)
                        .with_inclusion(submission.block_number, submission.gas_used),
                )
            }
            Ok(Err(e)) => {
                tracing::warn!("Relay error: {}", e);
                None
            }
            Err(_) => {
                tracing::warn!("Relay timed out after {:?}", limit);
                None
            }
        }
    }

    async fn submit_direct(
        &self,
        transfer: &ValidatedTransfer,
        gas_limit: U256,
    ) -> Result<PaymentResult, PaymentError> {
        let submission = self.signer.submit_transfer(
            self.settings.token,
            transfer.recipient,
            transfer.amount.units(),
            gas_limit,
        );

        let tx_hash = with_deadline(self.settings.rpc_timeout, submission)
            .await
            .map_err(|e| PaymentError::SubmissionFailure {
                reason: e.to_string(),
            })?;

        tracing::info!("Direct transfer submitted: {:?}", tx_hash);

        Ok(PaymentResult::submitted(tx_hash, SubmissionPath::Direct))
    }
}

fn transition(stage: TransferStage) {
    tracing::debug!(stage = %stage, "Payment stage");
}
