use crate::domain::{Contract, Job, Profile};
use crate::error::Result;
use crate::infrastructure::in_memory::MemoryLedger;
use serde::Deserialize;
use std::io::Read;

/// Initial marketplace state, as the excluded CRUD collaborators would have
/// created it: profiles first, then contracts referencing them, then jobs.
#[derive(Debug, Deserialize, Default)]
pub struct SeedData {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl SeedData {
    pub fn from_reader(source: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(source)?)
    }

    /// Loads the fixture into the ledger. Referential checks (contract
    /// endpoints, job contracts, role and balance constraints) are done by
    /// the store's insert methods.
    pub async fn load_into(self, ledger: &MemoryLedger) -> Result<()> {
        for profile in self.profiles {
            ledger.insert_profile(profile).await?;
        }
        for contract in self.contracts {
            ledger.insert_contract(contract).await?;
        }
        for job in self.jobs {
            ledger.insert_job(job).await?;
        }
        Ok(())
    }
}
