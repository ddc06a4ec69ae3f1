use super::contract::Contract;
use super::ids::{ContractId, JobId, ProfileId};
use super::job::Job;
use super::money::Balance;
use super::profile::Profile;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persisted balances per profile.
///
/// Mutation only happens through a [`LedgerTransaction`] obtained from
/// [`LedgerStore::begin`], which groups balance adjustments with the job
/// update into one all-or-nothing unit.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn store_profile(&self, profile: Profile) -> Result<()>;
    async fn profile(&self, id: ProfileId) -> Result<Option<Profile>>;
    /// All profiles ordered by id, read from one consistent view.
    async fn all_profiles(&self) -> Result<Vec<Profile>>;
    /// Opens an atomic unit. Units are serialised against each other, and
    /// readers never observe a unit's writes before it commits.
    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>>;
}

/// An open atomic unit over balances and job payment state.
///
/// Writes are staged and only become visible on [`commit`](Self::commit).
/// Dropping the unit without committing discards every staged write.
#[async_trait]
pub trait LedgerTransaction: Send {
    async fn profile(&mut self, id: ProfileId) -> Result<Option<Profile>>;
    async fn contract(&mut self, id: ContractId) -> Result<Option<Contract>>;
    async fn job(&mut self, id: JobId) -> Result<Option<Job>>;
    async fn contracts_for_party(&mut self, profile_id: ProfileId) -> Result<Vec<Contract>>;
    async fn jobs_for_contracts(&mut self, contract_ids: &[ContractId]) -> Result<Vec<Job>>;
    /// Adds `delta` to the profile's balance. Fails if the profile is absent
    /// or the balance would become negative.
    async fn adjust_balance(&mut self, id: ProfileId, delta: Balance) -> Result<Profile>;
    /// Sets paid and the payment date. Fails if the job is absent or already paid.
    async fn mark_job_paid(&mut self, id: JobId, at: DateTime<Utc>) -> Result<Job>;
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// Persisted contracts and jobs.
///
/// Lookups return raw rows; callers restrict them through an access scope.
#[async_trait]
pub trait ContractRepository: Send + Sync {
    async fn store_contract(&self, contract: Contract) -> Result<()>;
    async fn store_job(&self, job: Job) -> Result<()>;
    async fn contract(&self, id: ContractId) -> Result<Option<Contract>>;
    /// Contracts where the profile is client or contractor, ordered by id.
    async fn contracts_for_party(&self, profile_id: ProfileId) -> Result<Vec<Contract>>;
    /// Jobs belonging to any of the given contracts, ordered by id.
    async fn jobs_for_contracts(&self, contract_ids: &[ContractId]) -> Result<Vec<Job>>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type ContractRepositoryBox = Box<dyn ContractRepository>;
