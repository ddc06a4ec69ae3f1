#![allow(dead_code)]

use jobpay::application::seed::Seed;
use jobpay::domain::contract::{Contract, ContractStatus};
use jobpay::domain::ids::{ContractId, JobId, ProfileId};
use jobpay::domain::job::Job;
use jobpay::domain::money::{Amount, Balance};
use jobpay::domain::profile::{Profile, Role};
use jobpay::infrastructure::in_memory::InMemoryStore;
use rand::Rng;
use rust_decimal::Decimal;
use std::path::PathBuf;

pub const SEED_DIR: &str = "tests/fixtures/seed";

pub fn seed_dir() -> PathBuf {
    PathBuf::from(SEED_DIR)
}

pub fn amount(cents: i64) -> Amount {
    Amount::new(Decimal::new(cents, 2)).unwrap()
}

pub fn balance(cents: i64) -> Balance {
    Balance::new(Decimal::new(cents, 2))
}

/// One client and one contractor sharing a single in-progress contract with one job.
pub fn single_job_seed(client_cents: i64, price_cents: i64) -> Seed {
    Seed {
        profiles: vec![
            Profile::new(ProfileId(1), Role::Client, balance(client_cents)),
            Profile::new(ProfileId(2), Role::Contractor, Balance::ZERO),
        ],
        contracts: vec![Contract::new(
            ContractId(1),
            ProfileId(1),
            ProfileId(2),
            ContractStatus::InProgress,
        )],
        jobs: vec![Job::new(JobId(1), ContractId(1), amount(price_cents))],
    }
}

/// `clients` clients and `contractors` contractors with random balances,
/// one random contract per client and `jobs_per_contract` unpaid jobs each.
/// Client ids come first, then contractor ids.
pub fn random_seed(clients: u32, contractors: u32, jobs_per_contract: u32) -> Seed {
    let mut rng = rand::thread_rng();
    let mut seed = Seed::default();

    for id in 1..=clients {
        let cents = rng.gen_range(0..50_000);
        seed.profiles
            .push(Profile::new(ProfileId(id), Role::Client, balance(cents)));
    }
    for id in clients + 1..=clients + contractors {
        let cents = rng.gen_range(0..50_000);
        seed.profiles
            .push(Profile::new(ProfileId(id), Role::Contractor, balance(cents)));
    }

    let statuses = [
        ContractStatus::New,
        ContractStatus::InProgress,
        ContractStatus::Terminated,
    ];
    let mut job_id = 1;
    for client in 1..=clients {
        let contractor = rng.gen_range(clients + 1..=clients + contractors);
        let status = statuses[rng.gen_range(0..statuses.len())];
        seed.contracts.push(Contract::new(
            ContractId(client),
            ProfileId(client),
            ProfileId(contractor),
            status,
        ));
        for _ in 0..jobs_per_contract {
            let price = rng.gen_range(1..20_000);
            seed.jobs
                .push(Job::new(JobId(job_id), ContractId(client), amount(price)));
            job_id += 1;
        }
    }
    seed
}

pub async fn store_from(seed: Seed) -> InMemoryStore {
    let store = InMemoryStore::new();
    seed.load(&store, &store).await.unwrap();
    store
}
