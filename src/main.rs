use clap::{Parser, Subcommand};
use jobpay::application::query::QueryService;
use jobpay::application::seed::Seed;
use jobpay::application::settlement::SettlementEngine;
use jobpay::domain::ids::{ContractId, JobId, ProfileId};
use jobpay::domain::money::Amount;
use jobpay::domain::ports::{ContractRepositoryBox, LedgerStoreBox};
use jobpay::domain::profile::Profile;
use jobpay::infrastructure::in_memory::InMemoryStore;
use jobpay::interfaces::csv::balance_writer::BalanceWriter;
use jobpay::interfaces::csv::seed_reader::read_seed_dir;
use jobpay::logging;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "JOBPAY_DB_PATH", global = true)]
    db_path: Option<PathBuf>,

    /// Directory holding profiles.csv, contracts.csv and jobs.csv.
    /// A persistent database is only seeded while it is empty.
    #[arg(long, env = "JOBPAY_SEED", global = true)]
    seed: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one contract the profile is a party to.
    Contract {
        id: u32,
        #[arg(long)]
        profile: u32,
    },
    /// List the profile's new and in-progress contracts.
    Contracts {
        #[arg(long)]
        profile: u32,
    },
    /// List unpaid jobs on the profile's in-progress contracts.
    UnpaidJobs {
        #[arg(long)]
        profile: u32,
    },
    /// Pay a job as the contract's client.
    Pay {
        job_id: u32,
        #[arg(long)]
        profile: u32,
    },
    /// Deposit money into a client's balance.
    Deposit {
        amount: Decimal,
        #[arg(long)]
        profile: u32,
    },
    /// Write every profile's balance as CSV.
    Balances,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let seed = match &cli.seed {
        Some(dir) => read_seed_dir(dir).into_diagnostic()?,
        None => Seed::default(),
    };
    let (ledger, repository) = open_stores(cli.db_path, seed).await?;

    let engine = SettlementEngine::new(ledger);
    let queries = QueryService::new(repository);

    let outcome = match cli.command {
        Command::Contract { id, profile } => queries
            .get_contract(ProfileId(profile), ContractId(id))
            .await
            .map(|c| to_json(&c)),
        Command::Contracts { profile } => queries
            .list_active_contracts(ProfileId(profile))
            .await
            .map(|c| to_json(&c)),
        Command::UnpaidJobs { profile } => queries
            .list_unpaid_jobs(ProfileId(profile))
            .await
            .map(|j| to_json(&j)),
        Command::Pay { job_id, profile } => engine
            .pay_job(ProfileId(profile), JobId(job_id))
            .await
            .map(|j| to_json(&j)),
        Command::Deposit { amount, profile } => deposit(&engine, profile, amount)
            .await
            .map(|p| to_json(&p)),
        Command::Balances => {
            let profiles = engine.balances().await.into_diagnostic()?;
            let stdout = io::stdout();
            let mut writer = BalanceWriter::new(stdout.lock());
            writer.write_profiles(profiles).into_diagnostic()?;
            return Ok(());
        }
    };

    match outcome {
        Ok(json) => {
            println!("{}", json.into_diagnostic()?);
            Ok(())
        }
        Err(e) => {
            let body = ErrorBody {
                code: e.code(),
                message: e.to_string(),
            };
            println!("{}", serde_json::to_string(&body).into_diagnostic()?);
            Err(e).into_diagnostic()
        }
    }
}

async fn deposit(
    engine: &SettlementEngine,
    profile: u32,
    amount: Decimal,
) -> jobpay::error::Result<Profile> {
    let amount = Amount::new(amount)?;
    engine.deposit(ProfileId(profile), amount).await
}

fn to_json<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

async fn open_stores(
    db_path: Option<PathBuf>,
    seed: Seed,
) -> Result<(LedgerStoreBox, ContractRepositoryBox)> {
    if let Some(db_path) = db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use jobpay::infrastructure::rocksdb::RocksDBStore;

            let store = RocksDBStore::open(db_path).into_diagnostic()?;
            if !seed.is_empty() && store.is_empty().into_diagnostic()? {
                seed.load(&store, &store).await.into_diagnostic()?;
            }
            return Ok((Box::new(store.clone()), Box::new(store)));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            tracing::warn!(
                path = %db_path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
        }
    }

    let store = InMemoryStore::new();
    seed.load(&store, &store).await.into_diagnostic()?;
    Ok((Box::new(store.clone()), Box::new(store)))
}
