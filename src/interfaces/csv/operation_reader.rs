use crate::domain::{JobId, ProfileId};
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    Deposit,
    Pay,
}

/// One row of the operation stream. `profile` is the acting account, as the
/// identity collaborator would have resolved it from a request credential.
/// `deposit` rows carry an amount, `pay` rows carry a job id.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationType,
    pub profile: ProfileId,
    pub job: Option<JobId>,
    pub amount: Option<Decimal>,
}

pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<Operation, PaymentError>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}
