use crate::domain::ports::{LedgerStore, LedgerTx};
use crate::domain::{Amount, Balance, ProfileId};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// A client may deposit at most a quarter of the total price of their
/// currently unpaid jobs. Ties deposits to outstanding obligations instead
/// of allowing unbounded balance inflation.
pub const DEPOSIT_CAP_RATIO: Decimal = dec!(0.25);

/// Adds `amount` to a client's balance, bounded by the deposit cap,
/// inside one transaction. Returns the updated balance.
///
/// Amount positivity is enforced by `Amount` before any transaction opens.
pub async fn deposit_balance(
    store: &dyn LedgerStore,
    account_id: ProfileId,
    amount: Amount,
) -> Result<Balance> {
    let mut tx = store.begin().await?;
    match deposit_in_tx(tx.as_mut(), account_id, amount).await {
        Ok(balance) => {
            tx.commit().await?;
            Ok(balance)
        }
        Err(err) => {
            tx.rollback().await;
            Err(err)
        }
    }
}

async fn deposit_in_tx(
    tx: &mut dyn LedgerTx,
    account_id: ProfileId,
    amount: Amount,
) -> Result<Balance> {
    let profile = tx.lock_profile(account_id).await?;
    if !profile.is_client() {
        return Err(PaymentError::Unauthorized(
            "only clients can deposit balance".to_string(),
        ));
    }

    // The summed jobs are not locked; a job created concurrently can only
    // raise the true cap, so a stale sum fails safe. See DESIGN.md.
    let total_unpaid = tx.sum_unpaid_job_prices(account_id).await?;
    let cap = total_unpaid * DEPOSIT_CAP_RATIO;
    if amount.value() > cap {
        return Err(PaymentError::DepositLimitExceeded {
            max: cap.round_dp(2),
        });
    }

    tx.adjust_balance(account_id, amount.value()).await?;
    Ok(profile.balance + amount.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Contract, ContractStatus, Job, Profile, Role};
    use crate::infrastructure::in_memory::MemoryLedger;
    use rust_decimal_macros::dec;

    async fn fixture(unpaid_total: Decimal) -> MemoryLedger {
        let ledger = MemoryLedger::new();
        ledger
            .insert_profile(Profile {
                id: 1,
                first_name: "Cora".to_string(),
                last_name: "Klein".to_string(),
                profession: "Manager".to_string(),
                role: Role::Client,
                balance: Balance::new(dec!(10.0)),
            })
            .await
            .unwrap();
        ledger
            .insert_profile(Profile {
                id: 2,
                first_name: "Miles".to_string(),
                last_name: "Ferris".to_string(),
                profession: "Welder".to_string(),
                role: Role::Contractor,
                balance: Balance::ZERO,
            })
            .await
            .unwrap();
        ledger
            .insert_contract(Contract {
                id: 1,
                client_id: 1,
                contractor_id: 2,
                terms: "ongoing work".to_string(),
                status: ContractStatus::InProgress,
            })
            .await
            .unwrap();
        ledger
            .insert_job(Job {
                id: 1,
                contract_id: 1,
                description: "outstanding".to_string(),
                price: unpaid_total.try_into().unwrap(),
                paid: false,
                payment_date: None,
            })
            .await
            .unwrap();
        ledger
    }

    #[tokio::test]
    async fn test_deposit_at_the_cap_succeeds() {
        let ledger = fixture(dec!(200.0)).await;

        let balance = deposit_balance(&ledger, 1, dec!(50.0).try_into().unwrap())
            .await
            .unwrap();
        assert_eq!(balance, Balance::new(dec!(60.0)));
        assert_eq!(
            ledger.profile(1).await.unwrap().balance,
            Balance::new(dec!(60.0))
        );
    }

    #[tokio::test]
    async fn test_deposit_over_the_cap_is_rejected_with_the_cap() {
        let ledger = fixture(dec!(200.0)).await;

        let err = deposit_balance(&ledger, 1, dec!(50.01).try_into().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::DepositLimitExceeded { max } if max == dec!(50.00)
        ));
        assert_eq!(
            ledger.profile(1).await.unwrap().balance,
            Balance::new(dec!(10.0))
        );
    }

    #[tokio::test]
    async fn test_contractor_may_not_deposit() {
        let ledger = fixture(dec!(200.0)).await;

        let err = deposit_balance(&ledger, 2, dec!(1.0).try_into().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_unknown_account_fails_not_found() {
        let ledger = fixture(dec!(200.0)).await;

        let err = deposit_balance(&ledger, 9, dec!(1.0).try_into().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::ProfileNotFound(9)));
    }

    #[tokio::test]
    async fn test_no_unpaid_work_means_zero_cap() {
        let ledger = fixture(dec!(200.0)).await;
        let mut tx = ledger.begin().await.unwrap();
        tx.lock_job(1).await.unwrap();
        tx.mark_job_paid(1, chrono::Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        let err = deposit_balance(&ledger, 1, dec!(0.01).try_into().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PaymentError::DepositLimitExceeded { max } if max == Decimal::ZERO
        ));
    }
}
