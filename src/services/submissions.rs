use crate::error::IdempotencyConflict;
use crate::models::{PaymentOptions, PaymentRequest, PaymentResult};
use moka::future::Cache;
use std::future::Future;
use std::time::Duration;

/// A submitted payment and the request that produced it.
#[derive(Debug, Clone)]
struct Submission {
    fingerprint: String,
    result: PaymentResult,
}

/// Remembers submitted payments by caller-supplied idempotency key.
///
/// Concurrent calls with the same key share one execution. Only results carrying a
/// transaction hash are stored, so a failed attempt can be retried under the same key.
/// Reusing a key for a different request is refused.
pub struct SubmissionCache {
    results: Cache<String, Submission>,
}

impl SubmissionCache {
    pub fn new(ttl: Duration) -> Self {
        let results = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(ttl)
            .build();

        Self { results }
    }

    /// Identifies the payment a key was first used for.
    pub fn fingerprint(request: &PaymentRequest, options: &PaymentOptions) -> String {
        format!("{:?}|{:?}", request, options)
    }

    pub async fn get_or_submit<F>(
        &self,
        key: &str,
        fingerprint: String,
        submit: F,
    ) -> Result<PaymentResult, IdempotencyConflict>
    where
        F: Future<Output = PaymentResult>,
    {
        let attempt = fingerprint.clone();
        let outcome = self
            .results
            .try_get_with_by_ref(key, async move {
                let result = submit.await;
                let submission = Submission {
                    fingerprint: attempt,
                    result,
                };

                // Failures are handed back to waiters but never cached.
                if submission.result.tx_hash().is_some() {
                    Ok(submission)
                } else {
                    Err(submission)
                }
            })
            .await;

        let submission = match outcome {
            Ok(submission) => submission,
            Err(failed) => (*failed).clone(),
        };

        if submission.fingerprint != fingerprint {
            tracing::warn!("Idempotency key {} reused for a different payment", key);
            return Err(IdempotencyConflict {
                key: key.to_string(),
            });
        }

        if let Some(tx_hash) = submission.result.tx_hash() {
            tracing::debug!("Idempotency key {} maps to {:?}", key, tx_hash);
        }

        Ok(submission.result)
    }
}
