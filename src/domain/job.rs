use super::money::Amount;
use super::{ContractId, JobId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A priced unit of work under a contract, payable at most once.
///
/// `paid` transitions `false -> true` exactly once and never back;
/// `payment_date` is set iff `paid` is true.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Job {
    pub id: JobId,
    pub contract_id: ContractId,
    pub description: String,
    pub price: Amount,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
}

impl Job {
    /// Marks the job paid at `when`. Idempotence is the caller's concern:
    /// the payment processor rejects already-paid jobs before reaching this.
    pub fn mark_paid(&mut self, when: DateTime<Utc>) {
        self.paid = true;
        self.payment_date = Some(when);
    }
}
