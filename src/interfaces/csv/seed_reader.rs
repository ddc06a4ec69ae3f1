use crate::application::seed::Seed;
use crate::error::{PaymentError, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::Read;
use std::marker::PhantomData;
use std::path::Path;

pub const PROFILES_FILE: &str = "profiles.csv";
pub const CONTRACTS_FILE: &str = "contracts.csv";
pub const JOBS_FILE: &str = "jobs.csv";

/// Reads seed records of type `T` from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<T>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct RecordReader<R: Read, T> {
    reader: csv::Reader<R>,
    _record: PhantomData<T>,
}

impl<R: Read, T: DeserializeOwned> RecordReader<R, T> {
    /// Creates a new `RecordReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self {
            reader,
            _record: PhantomData,
        }
    }

    /// Returns an iterator that lazily reads and deserializes records.
    pub fn records(self) -> impl Iterator<Item = Result<T>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(PaymentError::from))
    }
}

/// Loads `profiles.csv`, `contracts.csv` and `jobs.csv` from a directory.
///
/// A malformed row fails the whole load; a partially seeded ledger would
/// break the conservation of balances.
pub fn read_seed_dir(dir: &Path) -> Result<Seed> {
    Ok(Seed {
        profiles: read_file(&dir.join(PROFILES_FILE))?,
        contracts: read_file(&dir.join(CONTRACTS_FILE))?,
        jobs: read_file(&dir.join(JOBS_FILE))?,
    })
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| {
        PaymentError::ValidationError(format!("Cannot open {}: {}", path.display(), e))
    })?;
    RecordReader::new(file).records().collect()
}
