use crate::domain::ids::JobId;
use crate::domain::money::Balance;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    /// Absent, owned by someone else, or not eligible for the operation.
    /// Kept coarse so callers learn nothing about other parties' rows.
    #[error("Not found")]
    NotFound,
    #[error("Payment not allowed: price {required} exceeds available balance {available}")]
    PayNotAllowed {
        required: Balance,
        available: Balance,
    },
    #[error("Deposit not allowed: {requested} exceeds the limit of {limit}")]
    DepositNotAllowed { requested: Balance, limit: Balance },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Settlement of job {job_id} failed: {source}")]
    SettlementFailed {
        job_id: JobId,
        #[source]
        source: Box<PaymentError>,
    },
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl PaymentError {
    /// Machine-readable code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::NotFound => "NOT_FOUND",
            PaymentError::PayNotAllowed { .. } => "PAY_NOT_ALLOWED",
            PaymentError::DepositNotAllowed { .. } => "DEPOSIT_NOT_ALLOWED",
            PaymentError::ValidationError(_) => "VALIDATION",
            _ => "UNKNOWN",
        }
    }

    /// True for rejections decided by domain rules rather than infrastructure.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            PaymentError::PayNotAllowed { .. } | PaymentError::DepositNotAllowed { .. }
        )
    }
}
