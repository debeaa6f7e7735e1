use super::{deposits, payments};
use crate::domain::ports::LedgerStore;
use crate::domain::{Amount, Balance, Job, JobId, ProfileId};
use crate::error::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(10);

/// The entry point for the marketplace payment core.
///
/// `PaymentEngine` owns the ledger store and exposes the two money-moving
/// operations. It is the outer half of the transaction coordinator: each
/// operation runs in one store transaction, and operations that fail with a
/// retryable lock timeout are re-run with linear backoff. Business failures
/// are returned immediately; retrying them would fail identically.
#[derive(Clone)]
pub struct PaymentEngine {
    store: Arc<dyn LedgerStore>,
    max_attempts: u32,
    backoff: Duration,
}

impl PaymentEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_retry(store, DEFAULT_MAX_ATTEMPTS, DEFAULT_BACKOFF)
    }

    pub fn with_retry(store: Arc<dyn LedgerStore>, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            store,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Pays for one job on behalf of the authenticated client and returns
    /// the updated job record.
    pub async fn pay_for_job(&self, payer_id: ProfileId, job_id: JobId) -> Result<Job> {
        let result = self
            .retry(|| payments::pay_for_job(self.store.as_ref(), payer_id, job_id))
            .await;
        match &result {
            Ok(job) => info!(payer_id, job_id, price = %job.price.value(), "job paid"),
            Err(err) => warn!(payer_id, job_id, error = %err, "payment rejected"),
        }
        result
    }

    /// Deposits into a client's balance, bounded by the unpaid-work cap,
    /// and returns the updated balance.
    pub async fn deposit_balance(&self, account_id: ProfileId, amount: Amount) -> Result<Balance> {
        let result = self
            .retry(|| deposits::deposit_balance(self.store.as_ref(), account_id, amount))
            .await;
        match &result {
            Ok(balance) => info!(account_id, amount = %amount.value(), %balance, "deposit accepted"),
            Err(err) => warn!(account_id, amount = %amount.value(), error = %err, "deposit rejected"),
        }
        result
    }

    async fn retry<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, error = %err, "transient failure, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
