use crate::domain::contract::Contract;
use crate::domain::ids::{ContractId, JobId, ProfileId};
use crate::domain::job::Job;
use crate::domain::money::Balance;
use crate::domain::ports::{ContractRepository, LedgerStore, LedgerTransaction};
use crate::domain::profile::Profile;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Column Family for storing profiles and their balances.
pub const CF_PROFILES: &str = "profiles";
/// Column Family for storing contracts.
pub const CF_CONTRACTS: &str = "contracts";
/// Column Family for storing jobs.
pub const CF_JOBS: &str = "jobs";

/// A persistent store implementation using RocksDB.
///
/// Profiles, contracts and jobs live in separate Column Families keyed by
/// their big-endian id. A ledger transaction holds the store's write lock,
/// stages its writes in memory and commits them as a single `WriteBatch`, so
/// a settlement is persisted entirely or not at all. List reads go through a
/// snapshot and never see half of a batch.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = [CF_PROFILES, CF_CONTRACTS, CF_JOBS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();
        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Returns true when no profile has been written yet.
    pub fn is_empty(&self) -> Result<bool> {
        let cf = cf_handle(&self.db, CF_PROFILES)?;
        Ok(self
            .db
            .iterator_cf(cf, IteratorMode::Start)
            .next()
            .is_none())
    }

    async fn put<T: Serialize + Sync>(&self, name: &str, key: u32, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        let _guard = self.write_lock.lock().await;
        let cf = cf_handle(&self.db, name)?;
        self.db.put_cf(cf, key.to_be_bytes(), bytes)?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(
        &self,
        name: &str,
        mut keep: impl FnMut(&T) -> bool,
    ) -> Result<Vec<T>> {
        let cf = cf_handle(&self.db, name)?;
        let snapshot = self.db.snapshot();
        let mut rows = Vec::new();
        for item in snapshot.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let row: T = serde_json::from_slice(&value)?;
            if keep(&row) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

impl From<rocksdb::Error> for PaymentError {
    fn from(e: rocksdb::Error) -> Self {
        PaymentError::StorageError(format!("RocksDB error: {}", e))
    }
}

fn cf_handle<'a>(db: &'a DB, name: &str) -> Result<&'a ColumnFamily> {
    db.cf_handle(name).ok_or_else(|| {
        PaymentError::StorageError(format!("Column family '{}' not found", name))
    })
}

fn get<T: DeserializeOwned>(db: &DB, name: &str, key: u32) -> Result<Option<T>> {
    let cf = cf_handle(db, name)?;
    match db.get_pinned_cf(cf, key.to_be_bytes())? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

#[async_trait]
impl LedgerStore for RocksDBStore {
    async fn store_profile(&self, profile: Profile) -> Result<()> {
        profile.validate()?;
        self.put(CF_PROFILES, profile.id.0, &profile).await
    }

    async fn profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        get(&self.db, CF_PROFILES, id.0)
    }

    async fn all_profiles(&self) -> Result<Vec<Profile>> {
        // Keys are big-endian, so iteration order is id order.
        self.scan(CF_PROFILES, |_: &Profile| true)
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTransaction>> {
        let guard = self.write_lock.clone().lock_owned().await;
        Ok(Box::new(RocksDBTransaction {
            db: self.db.clone(),
            _guard: guard,
            profiles: HashMap::new(),
            jobs: HashMap::new(),
        }))
    }
}

#[async_trait]
impl ContractRepository for RocksDBStore {
    async fn store_contract(&self, contract: Contract) -> Result<()> {
        self.put(CF_CONTRACTS, contract.id.0, &contract).await
    }

    async fn store_job(&self, job: Job) -> Result<()> {
        job.validate()?;
        self.put(CF_JOBS, job.id.0, &job).await
    }

    async fn contract(&self, id: ContractId) -> Result<Option<Contract>> {
        get(&self.db, CF_CONTRACTS, id.0)
    }

    async fn contracts_for_party(&self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        self.scan(CF_CONTRACTS, |c: &Contract| c.is_party(profile_id))
    }

    async fn jobs_for_contracts(&self, contract_ids: &[ContractId]) -> Result<Vec<Job>> {
        self.scan(CF_JOBS, |j: &Job| contract_ids.contains(&j.contract_id))
    }
}

/// Staged writes committed as one `WriteBatch` while holding the write lock.
struct RocksDBTransaction {
    db: Arc<DB>,
    _guard: OwnedMutexGuard<()>,
    profiles: HashMap<ProfileId, Profile>,
    jobs: HashMap<JobId, Job>,
}

impl RocksDBTransaction {
    fn staged_job(&self, id: JobId) -> Result<Option<Job>> {
        match self.jobs.get(&id) {
            Some(job) => Ok(Some(job.clone())),
            None => get(&self.db, CF_JOBS, id.0),
        }
    }
}

#[async_trait]
impl LedgerTransaction for RocksDBTransaction {
    async fn profile(&mut self, id: ProfileId) -> Result<Option<Profile>> {
        match self.profiles.get(&id) {
            Some(profile) => Ok(Some(profile.clone())),
            None => get(&self.db, CF_PROFILES, id.0),
        }
    }

    async fn contract(&mut self, id: ContractId) -> Result<Option<Contract>> {
        get(&self.db, CF_CONTRACTS, id.0)
    }

    async fn job(&mut self, id: JobId) -> Result<Option<Job>> {
        self.staged_job(id)
    }

    async fn contracts_for_party(&mut self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        let cf = cf_handle(&self.db, CF_CONTRACTS)?;
        let mut contracts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let contract: Contract = serde_json::from_slice(&value)?;
            if contract.is_party(profile_id) {
                contracts.push(contract);
            }
        }
        Ok(contracts)
    }

    async fn jobs_for_contracts(&mut self, contract_ids: &[ContractId]) -> Result<Vec<Job>> {
        let cf = cf_handle(&self.db, CF_JOBS)?;
        let mut jobs = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let job: Job = serde_json::from_slice(&value)?;
            if contract_ids.contains(&job.contract_id) {
                jobs.push(self.jobs.get(&job.id).cloned().unwrap_or(job));
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
            .staged_job(id)?
            .ok_or_else(|| PaymentError::StorageError(format!("Job {} not found", id)))?;
        job.mark_paid(at)?;
        self.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let mut batch = WriteBatch::default();
        {
            let profiles_cf = cf_handle(&self.db, CF_PROFILES)?;
            for (id, profile) in &self.profiles {
                batch.put_cf(profiles_cf, id.0.to_be_bytes(), serde_json::to_vec(profile)?);
            }
            let jobs_cf = cf_handle(&self.db, CF_JOBS)?;
            for (id, job) in &self.jobs {
                batch.put_cf(jobs_cf, id.0.to_be_bytes(), serde_json::to_vec(job)?);
            }
        }
        self.db.write(batch)?;
        Ok(())
    }
}
