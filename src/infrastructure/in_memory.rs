use crate::domain::contract::Contract;
use crate::domain::ids::{ContractId, JobId, ProfileId};
use crate::domain::job::Job;
use crate::domain::money::Balance;
use crate::domain::ports::{ContractRepository, LedgerStore, LedgerTransaction};
use crate::domain::profile::Profile;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

#[derive(Default)]
struct State {
    profiles: HashMap<ProfileId, Profile>,
    contracts: HashMap<ContractId, Contract>,
    jobs: HashMap<JobId, Job>,
}

impl State {
    fn contracts_for_party(&self, profile_id: ProfileId) -> Vec<Contract> {
        let mut contracts: Vec<Contract> = self
            .contracts
            .values()
            .filter(|c| c.is_party(profile_id))
            .cloned()
            .collect();
        contracts.sort_by_key(|c| c.id);
        contracts
    }

    fn jobs_for_contracts(&self, contract_ids: &[ContractId]) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .values()
            .filter(|j| contract_ids.contains(&j.contract_id))
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.id);
        jobs
    }
}

/// A thread-safe in-memory store for profiles, contracts and jobs.
///
/// All three tables sit behind one `Arc<RwLock<_>>`. A ledger transaction
/// holds the write half for its whole lifetime, which serialises settlements
/// and keeps readers out until the staged writes are applied.
/// Ideal for testing or small datasets where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStore {
    async fn store_profile(&self, profile: Profile) -> Result<()> {
        profile.validate()?;
        let mut state = self.state.write().await;
        state.profiles.insert(profile.id, profile);
        Ok(())
    }

    async fn profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| p.id);
        Ok(profiles)
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.state.clone().write_owned().await;
        Ok(Box::new(InMemoryTransaction {
            state: guard,
            profiles: HashMap::new(),
            jobs: HashMap::new(),
        }))
    }
}

#[async_trait]
impl ContractRepository for InMemoryStore {
    async fn store_contract(&self, contract: Contract) -> Result<()> {
        let mut state = self.state.write().await;
        state.contracts.insert(contract.id, contract);
        Ok(())
    }

    async fn store_job(&self, job: Job) -> Result<()> {
        job.validate()?;
        let mut state = self.state.write().await;
        state.jobs.insert(job.id, job);
        Ok(())
    }

    async fn contract(&self, id: ContractId) -> Result<Option<Contract>> {
        let state = self.state.read().await;
        Ok(state.contracts.get(&id).cloned())
    }

    async fn contracts_for_party(&self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        let state = self.state.read().await;
        Ok(state.contracts_for_party(profile_id))
    }

    async fn jobs_for_contracts(&self, contract_ids: &[ContractId]) -> Result<Vec<Job>> {
        let state = self.state.read().await;
        Ok(state.jobs_for_contracts(contract_ids))
    }
}

/// Staged writes over an exclusively held state.
struct InMemoryTransaction {
    state: OwnedRwLockWriteGuard<State>,
    profiles: HashMap<ProfileId, Profile>,
    jobs: HashMap<JobId, Job>,
}

impl InMemoryTransaction {
    fn staged_job(&self, id: JobId) -> Option<Job> {
        self.jobs
            .get(&id)
            .or_else(|| self.state.jobs.get(&id))
            .cloned()
    }
}

#[async_trait]
impl LedgerTransaction for InMemoryTransaction {
    async fn profile(&mut self, id: ProfileId) -> Result<Option<Profile>> {
        Ok(self
            .profiles
            .get(&id)
            .or_else(|| self.state.profiles.get(&id))
            .cloned())
    }

    async fn contract(&mut self, id: ContractId) -> Result<Option<Contract>> {
        Ok(self.state.contracts.get(&id).cloned())
    }

    async fn job(&mut self, id: JobId) -> Result<Option<Job>> {
        Ok(self.staged_job(id))
    }

    async fn contracts_for_party(&mut self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        Ok(self.state.contracts_for_party(profile_id))
    }

    async fn jobs_for_contracts(&mut self, contract_ids: &[ContractId]) -> Result<Vec<Job>> {
        let mut jobs = self.state.jobs_for_contracts(contract_ids);
        for job in jobs.iter_mut() {
            if let Some(staged) = self.jobs.get(&job.id) {
                *job = staged.clone();
            }
        }
        Ok(jobs)
    }

    async fn adjust_balance(&mut self, id: ProfileId, delta: Balance) -> Result<Profile> {
        let mut profile = self.profile(id).await?.ok_or_else(|| {
            PaymentError::StorageError(format!("Profile {} not found in ledger", id))
        })?;
        profile.adjust(delta)?;
        self.profiles.insert(id, profile.clone());
        Ok(profile)
    }

    async fn mark_job_paid(&mut self, id: JobId, at: DateTime<Utc>) -> Result<Job> {
        let mut job = self
            .staged_job(id)
            .ok_or_else(|| PaymentError::StorageError(format!("Job {} not found", id)))?;
        job.mark_paid(at)?;
        self.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryTransaction {
            mut state,
            profiles,
            jobs,
        } = *self;
        state.profiles.extend(profiles);
        state.jobs.extend(jobs);
        Ok(())
    }
}
