use super::ids::{ContractId, JobId};
use super::money::Amount;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A unit of billable work under a contract.
///
/// `paid` is either unset or `true`, never `false`, and `payment_date` is
/// present exactly when `paid` is set.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Job {
    pub id: JobId,
    #[serde(rename = "contractId")]
    pub contract_id: ContractId,
    #[serde(default)]
    pub description: String,
    pub price: Amount,
    #[serde(default)]
    pub paid: Option<bool>,
    #[serde(rename = "paymentDate", default)]
    pub payment_date: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(id: JobId, contract_id: ContractId, price: Amount) -> Self {
        Self {
            id,
            contract_id,
            description: String::new(),
            price,
            paid: None,
            payment_date: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.paid == Some(true)
    }

    /// Marks the job paid. Fails if it already is; a job is never paid twice.
    pub fn mark_paid(&mut self, at: DateTime<Utc>) -> Result<()> {
        if self.is_paid() {
            return Err(PaymentError::ValidationError(format!(
                "Job {} is already paid",
                self.id
            )));
        }
        self.paid = Some(true);
        self.payment_date = Some(at);
        Ok(())
    }

    /// Checks the invariants a stored job must satisfy.
    pub fn validate(&self) -> Result<()> {
        match (self.paid, self.payment_date) {
            (Some(false), _) => Err(PaymentError::ValidationError(format!(
                "Job {} has paid=false; unpaid jobs leave the flag unset",
                self.id
            ))),
            (Some(true), None) | (None, Some(_)) => Err(PaymentError::ValidationError(format!(
                "Job {} must carry a payment date exactly when paid",
                self.id
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn job() -> Job {
        Job::new(JobId(1), ContractId(1), Amount::new(dec!(40)).unwrap())
    }

    #[test]
    fn test_mark_paid_once() {
        let mut job = job();
        assert!(!job.is_paid());
        let now = Utc::now();
        job.mark_paid(now).unwrap();
        assert!(job.is_paid());
        assert_eq!(job.payment_date, Some(now));
        assert!(job.validate().is_ok());

        assert!(job.mark_paid(Utc::now()).is_err());
        assert_eq!(job.payment_date, Some(now));
    }

    #[test]
    fn test_validate_rejects_paid_false() {
        let mut job = job();
        job.paid = Some(false);
        assert!(matches!(job.validate(), Err(PaymentError::ValidationError(_))));
    }

    #[test]
    fn test_validate_rejects_date_without_flag() {
        let mut job = job();
        job.payment_date = Some(Utc::now());
        assert!(job.validate().is_err());

        let mut job = self::job();
        job.paid = Some(true);
        assert!(job.validate().is_err());
    }
}
