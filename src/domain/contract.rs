use super::{ContractId, ProfileId};
use serde::{Deserialize, Serialize};

/// Contract lifecycle. `New` advances to `InProgress` when the first job is
/// created under it (done by the job-creation collaborator, outside this
/// core). `Terminated` is part of the model but no operation here sets it.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    New,
    InProgress,
    Terminated,
}

/// An agreement between a client profile and a contractor profile.
///
/// Contracts are immutable within the payment core: they are only read to
/// resolve who is allowed to pay for a job and who receives the funds.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Contract {
    pub id: ContractId,
    pub client_id: ProfileId,
    pub contractor_id: ProfileId,
    pub terms: String,
    #[serde(default)]
    pub status: ContractStatus,
}
