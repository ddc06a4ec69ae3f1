use crate::domain::contract::Contract;
use crate::domain::job::Job;
use crate::domain::ports::{ContractRepository, LedgerStore};
use crate::domain::profile::Profile;
use crate::error::Result;
use tracing::info;

/// Records loaded into an empty store before serving requests.
#[derive(Debug, Default, Clone)]
pub struct Seed {
    pub profiles: Vec<Profile>,
    pub contracts: Vec<Contract>,
    pub jobs: Vec<Job>,
}

impl Seed {
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.contracts.is_empty() && self.jobs.is_empty()
    }

    /// Writes every record through the store ports, which validate them.
    pub async fn load(
        self,
        ledger: &dyn LedgerStore,
        repository: &dyn ContractRepository,
    ) -> Result<()> {
        let (profiles, contracts, jobs) =
            (self.profiles.len(), self.contracts.len(), self.jobs.len());
        for profile in self.profiles {
            ledger.store_profile(profile).await?;
        }
        for contract in self.contracts {
            repository.store_contract(contract).await?;
        }
        for job in self.jobs {
            repository.store_job(job).await?;
        }
        info!(profiles, contracts, jobs, "Seeded store");
        Ok(())
    }
}
