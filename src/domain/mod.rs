pub mod contract;
pub mod job;
pub mod money;
pub mod ports;
pub mod profile;

pub use contract::{Contract, ContractStatus};
pub use job::Job;
pub use money::{Amount, Balance};
pub use profile::{Profile, Role};

pub type ProfileId = u32;
pub type ContractId = u32;
pub type JobId = u32;
