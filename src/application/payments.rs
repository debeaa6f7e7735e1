use crate::domain::ports::{LedgerStore, LedgerTx};
use crate::domain::{Job, JobId, ProfileId};
use crate::error::{PaymentError, Result};
use chrono::Utc;

/// Moves a job's price from the paying client to the contractor and marks
/// the job paid, exactly once, inside one transaction.
///
/// Check order: job existence, already-paid, payer authorization, then
/// funds. Account rows are locked in ascending id order; that order is the
/// deadlock-prevention invariant shared by every code path that can hold
/// more than one profile lock.
pub async fn pay_for_job(
    store: &dyn LedgerStore,
    payer_id: ProfileId,
    job_id: JobId,
) -> Result<Job> {
    let mut tx = store.begin().await?;
    match pay_in_tx(tx.as_mut(), payer_id, job_id).await {
        Ok(job) => {
            tx.commit().await?;
            Ok(job)
        }
        Err(err) => {
            tx.rollback().await;
            Err(err)
        }
    }
}

async fn pay_in_tx(
    tx: &mut dyn LedgerTx,
    payer_id: ProfileId,
    job_id: JobId,
) -> Result<Job> {
    let mut job = tx.lock_job(job_id).await?;
    if job.paid {
        return Err(PaymentError::AlreadyPaid(job_id));
    }

    let contract = tx.contract(job.contract_id).await?;
    if contract.client_id != payer_id {
        return Err(PaymentError::Unauthorized(
            "only the contract's client may pay for this job".to_string(),
        ));
    }

    // Ascending id order, never "payer first".
    let contractor_id = contract.contractor_id;
    let payer = if payer_id <= contractor_id {
        let payer = tx.lock_profile(payer_id).await?;
        tx.lock_profile(contractor_id).await?;
        payer
    } else {
        tx.lock_profile(contractor_id).await?;
        tx.lock_profile(payer_id).await?
    };

    let price = job.price.value();
    if payer.balance.value() < price {
        return Err(PaymentError::InsufficientFunds {
            balance: payer.balance.value(),
            price,
        });
    }

    tx.adjust_balance(payer_id, -price).await?;
    tx.adjust_balance(contractor_id, price).await?;

    let now = Utc::now();
    tx.mark_job_paid(job_id, now).await?;
    job.mark_paid(now);
    Ok(job)
}
