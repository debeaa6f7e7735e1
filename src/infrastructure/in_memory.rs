use crate::domain::ports::{LedgerStore, LedgerTx, LedgerTxBox};
use crate::domain::{
    Balance, Contract, ContractId, Job, JobId, Profile, ProfileId,
};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::timeout;

const DEFAULT_LOCK_WAIT: Duration = Duration::from_secs(5);

/// Identifies a lockable row. Contracts are immutable in this core and have
/// no lock entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RowKey {
    Profile(ProfileId),
    Job(JobId),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Profile(id) => write!(f, "profile {id}"),
            RowKey::Job(id) => write!(f, "job {id}"),
        }
    }
}

#[derive(Default)]
struct Tables {
    profiles: HashMap<ProfileId, Profile>,
    contracts: HashMap<ContractId, Contract>,
    jobs: HashMap<JobId, Job>,
}

/// One async mutex per row key. Holding the guard is holding the row lock;
/// the guard is released when the owning transaction commits or rolls back.
/// `tokio::sync::Mutex` queues waiters fairly, so a blocked transaction
/// resumes as soon as the holder finishes.
#[derive(Default)]
struct LockTable {
    rows: Mutex<HashMap<RowKey, Arc<Mutex<()>>>>,
}

impl LockTable {
    async fn acquire(&self, key: RowKey, wait: Duration) -> Result<OwnedMutexGuard<()>> {
        let slot = {
            let mut rows = self.rows.lock().await;
            rows.entry(key).or_default().clone()
        };
        timeout(wait, slot.lock_owned())
            .await
            .map_err(|_| PaymentError::LockTimeout(key.to_string()))
    }
}

/// A thread-safe in-memory ledger store with "select for update" row locks.
///
/// Serves as the injectable storage fake for the payment core: transactions
/// buffer their writes and publish them atomically on commit, and a locked
/// row blocks every other transaction until the holder finishes or the
/// configured lock-wait window elapses.
#[derive(Clone)]
pub struct MemoryLedger {
    tables: Arc<RwLock<Tables>>,
    locks: Arc<LockTable>,
    lock_wait: Duration,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::with_lock_wait(DEFAULT_LOCK_WAIT)
    }

    pub fn with_lock_wait(lock_wait: Duration) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            locks: Arc::new(LockTable::default()),
            lock_wait,
        }
    }

    // Seeding stands in for the profile/contract/job collaborators that
    // create state outside this core.

    pub async fn insert_profile(&self, profile: Profile) -> Result<()> {
        if profile.balance.is_negative() {
            return Err(PaymentError::Validation(format!(
                "profile {} has a negative balance",
                profile.id
            )));
        }
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.id, profile);
        Ok(())
    }

    pub async fn insert_contract(&self, contract: Contract) -> Result<()> {
        let mut tables = self.tables.write().await;
        let client = tables
            .profiles
            .get(&contract.client_id)
            .ok_or(PaymentError::ProfileNotFound(contract.client_id))?;
        if !client.is_client() {
            return Err(PaymentError::Validation(format!(
                "profile {} is not a client",
                contract.client_id
            )));
        }
        let contractor = tables
            .profiles
            .get(&contract.contractor_id)
            .ok_or(PaymentError::ProfileNotFound(contract.contractor_id))?;
        if contractor.is_client() {
            return Err(PaymentError::Validation(format!(
                "profile {} is not a contractor",
                contract.contractor_id
            )));
        }
        tables.contracts.insert(contract.id, contract);
        Ok(())
    }

    pub async fn insert_job(&self, job: Job) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.contracts.contains_key(&job.contract_id) {
            return Err(PaymentError::ContractNotFound(job.contract_id));
        }
        tables.jobs.insert(job.id, job);
        Ok(())
    }

    /// Unlocked read of committed state, for display and assertions only.
    pub async fn profile(&self, id: ProfileId) -> Result<Profile> {
        let tables = self.tables.read().await;
        tables
            .profiles
            .get(&id)
            .cloned()
            .ok_or(PaymentError::ProfileNotFound(id))
    }

    /// Unlocked read of committed state, for display and assertions only.
    pub async fn job(&self, id: JobId) -> Result<Job> {
        let tables = self.tables.read().await;
        tables
            .jobs
            .get(&id)
            .cloned()
            .ok_or(PaymentError::JobNotFound(id))
    }

    /// All committed profiles, ascending by id.
    pub async fn profiles(&self) -> Vec<Profile> {
        let tables = self.tables.read().await;
        let mut profiles: Vec<Profile> = tables.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| p.id);
        profiles
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn begin(&self) -> Result<LedgerTxBox> {
        Ok(Box::new(MemoryTx {
            tables: Arc::clone(&self.tables),
            locks: Arc::clone(&self.locks),
            lock_wait: self.lock_wait,
            guards: HashMap::new(),
            profile_writes: HashMap::new(),
            job_writes: HashMap::new(),
        }))
    }
}

/// One in-flight transaction. Row locks are the guards it holds; writes go
/// to the buffers and become visible to other transactions only at commit.
pub struct MemoryTx {
    tables: Arc<RwLock<Tables>>,
    locks: Arc<LockTable>,
    lock_wait: Duration,
    guards: HashMap<RowKey, OwnedMutexGuard<()>>,
    profile_writes: HashMap<ProfileId, Profile>,
    job_writes: HashMap<JobId, Job>,
}

impl MemoryTx {
    async fn lock_row(&mut self, key: RowKey) -> Result<()> {
        // Idempotent: re-locking a row this transaction already holds is a
        // no-op, which also rules out self-deadlock.
        if !self.guards.contains_key(&key) {
            let guard = self.locks.acquire(key, self.lock_wait).await?;
            self.guards.insert(key, guard);
        }
        Ok(())
    }

    fn holds(&self, key: RowKey) -> bool {
        self.guards.contains_key(&key)
    }
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn lock_profile(&mut self, id: ProfileId) -> Result<Profile> {
        self.lock_row(RowKey::Profile(id)).await?;
        if let Some(profile) = self.profile_writes.get(&id) {
            return Ok(profile.clone());
        }
        let tables = self.tables.read().await;
        tables
            .profiles
            .get(&id)
            .cloned()
            .ok_or(PaymentError::ProfileNotFound(id))
    }

    async fn lock_job(&mut self, id: JobId) -> Result<Job> {
        self.lock_row(RowKey::Job(id)).await?;
        if let Some(job) = self.job_writes.get(&id) {
            return Ok(job.clone());
        }
        let tables = self.tables.read().await;
        tables
            .jobs
            .get(&id)
            .cloned()
            .ok_or(PaymentError::JobNotFound(id))
    }

    async fn contract(&mut self, id: ContractId) -> Result<Contract> {
        let tables = self.tables.read().await;
        tables
            .contracts
            .get(&id)
            .cloned()
            .ok_or(PaymentError::ContractNotFound(id))
    }

    async fn adjust_balance(&mut self, id: ProfileId, delta: Decimal) -> Result<()> {
        if !self.holds(RowKey::Profile(id)) {
            return Err(PaymentError::Validation(format!(
                "balance of profile {id} adjusted without holding its lock"
            )));
        }
        let mut profile = match self.profile_writes.get(&id) {
            Some(profile) => profile.clone(),
            None => {
                let tables = self.tables.read().await;
                tables
                    .profiles
                    .get(&id)
                    .cloned()
                    .ok_or(PaymentError::ProfileNotFound(id))?
            }
        };
        profile.balance += Balance::new(delta);
        self.profile_writes.insert(id, profile);
        Ok(())
    }

    async fn mark_job_paid(&mut self, id: JobId, when: DateTime<Utc>) -> Result<()> {
        if !self.holds(RowKey::Job(id)) {
            return Err(PaymentError::Validation(format!(
                "job {id} marked paid without holding its lock"
            )));
        }
        let mut job = match self.job_writes.get(&id) {
            Some(job) => job.clone(),
            None => {
                let tables = self.tables.read().await;
                tables
                    .jobs
                    .get(&id)
                    .cloned()
                    .ok_or(PaymentError::JobNotFound(id))?
            }
        };
        job.mark_paid(when);
        self.job_writes.insert(id, job);
        Ok(())
    }

    async fn sum_unpaid_job_prices(&mut self, client_id: ProfileId) -> Result<Decimal> {
        // Read-committed: summed rows are not locked. Jobs this transaction
        // already touched are read through the write buffer.
        let tables = self.tables.read().await;
        let mut total = Decimal::ZERO;
        for job in tables.jobs.values() {
            let job = self.job_writes.get(&job.id).unwrap_or(job);
            if job.paid {
                continue;
            }
            if let Some(contract) = tables.contracts.get(&job.contract_id)
                && contract.client_id == client_id
            {
                total += job.price.value();
            }
        }
        Ok(total)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let tx = *self;
        let mut tables = tx.tables.write().await;
        for profile in tx.profile_writes.values() {
            if profile.balance.is_negative() {
                return Err(PaymentError::Validation(format!(
                    "refusing to commit a negative balance for profile {}",
                    profile.id
                )));
            }
        }
        for (id, profile) in tx.profile_writes {
            tables.profiles.insert(id, profile);
        }
        for (id, job) in tx.job_writes {
            tables.jobs.insert(id, job);
        }
        drop(tables);
        // Row guards drop here, after the writes are visible.
        Ok(())
    }

    async fn rollback(self: Box<Self>) {
        // Dropping the transaction discards the write buffers and releases
        // the row guards.
    }
}
