use super::{Contract, ContractId, Job, JobId, Profile, ProfileId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

pub type LedgerTxBox = Box<dyn LedgerTx>;

/// Storage backend able to open atomic units of work.
///
/// Correctness must not assume single-process exclusivity: a database-backed
/// implementation shared by several server instances has to provide the same
/// row-lock semantics the in-memory fake does.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn begin(&self) -> Result<LedgerTxBox>;
}

/// One transaction against the ledger, with "select for update" row locking.
///
/// A locked row blocks every other transaction that tries to lock it until
/// this one commits or rolls back; a wait that outlives the store's
/// configured window fails with the retryable `LockTimeout`. Mutations
/// (`adjust_balance`, `mark_job_paid`) stay invisible to other transactions
/// until `commit`.
///
/// Lock discipline: any code path that locks more than one profile row must
/// acquire the locks in ascending id order. The trait cannot enforce this;
/// the use cases do.
#[async_trait]
pub trait LedgerTx: Send {
    /// Locks a profile row exclusively and returns this transaction's view
    /// of it. Re-locking a row already held by this transaction is a no-op.
    async fn lock_profile(&mut self, id: ProfileId) -> Result<Profile>;

    /// Locks a job row exclusively and returns this transaction's view of it.
    async fn lock_job(&mut self, id: JobId) -> Result<Job>;

    /// Plain read; contracts are immutable within this core.
    async fn contract(&mut self, id: ContractId) -> Result<Contract>;

    /// Applies a signed delta to a profile balance the transaction has
    /// locked. The write is buffered until commit.
    async fn adjust_balance(&mut self, id: ProfileId, delta: Decimal) -> Result<()>;

    /// Flags a locked job row paid with the given timestamp, buffered until
    /// commit.
    async fn mark_job_paid(&mut self, id: JobId, when: DateTime<Utc>) -> Result<()>;

    /// Sum of prices of unpaid jobs whose contract's client is `client_id`.
    /// Read-committed: the summed rows are not individually locked.
    async fn sum_unpaid_job_prices(&mut self, client_id: ProfileId) -> Result<Decimal>;

    /// Publishes all buffered writes atomically and releases the row locks.
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Discards all buffered writes and releases the row locks.
    async fn rollback(self: Box<Self>);
}
