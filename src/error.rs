use crate::domain::{ContractId, JobId, ProfileId};
use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("{0}")]
    Validation(String),
    #[error("profile {0} not found")]
    ProfileNotFound(ProfileId),
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("contract {0} not found")]
    ContractNotFound(ContractId),
    #[error("{0}")]
    Unauthorized(String),
    #[error("job {0} is already paid")]
    AlreadyPaid(JobId),
    #[error("insufficient funds: balance {balance} is below job price {price}")]
    InsufficientFunds { balance: Decimal, price: Decimal },
    #[error("deposit exceeds allowed limit, max: {max}")]
    DepositLimitExceeded { max: Decimal },
    #[error("lock wait timed out on {0}")]
    LockTimeout(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PaymentError {
    /// Retryable failures committed nothing; re-running them with the same
    /// input can succeed. Business-rule failures will fail identically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }
}
