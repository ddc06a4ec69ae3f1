use super::ids::ProfileId;
use super::money::Balance;
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Contractor,
}

/// An account acting as either a client or a contractor.
///
/// The balance is only ever changed through a ledger adjustment inside an
/// atomic unit (settlement or deposit).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Profile {
    pub id: ProfileId,
    #[serde(rename = "firstName", default)]
    pub first_name: String,
    #[serde(rename = "lastName", default)]
    pub last_name: String,
    #[serde(default)]
    pub profession: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub balance: Balance,
}

impl Profile {
    pub fn new(id: ProfileId, role: Role, balance: Balance) -> Self {
        Self {
            id,
            first_name: String::new(),
            last_name: String::new(),
            profession: String::new(),
            role,
            balance,
        }
    }

    pub fn is_client(&self) -> bool {
        self.role == Role::Client
    }

    /// Checks the invariants a stored profile must satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.balance.is_negative() {
            return Err(PaymentError::ValidationError(format!(
                "Profile {} has a negative balance",
                self.id
            )));
        }
        Ok(())
    }

    /// Applies a signed balance delta, refusing to go below zero.
    pub fn adjust(&mut self, delta: Balance) -> Result<()> {
        let next = self.balance.checked_add(delta).ok_or_else(|| {
            PaymentError::ValidationError(format!(
                "Adjustment of {} overflows the balance of profile {}",
                delta, self.id
            ))
        })?;
        if next.is_negative() {
            return Err(PaymentError::ValidationError(format!(
                "Adjustment of {} would overdraw profile {}",
                delta, self.id
            )));
        }
        self.balance = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_adjust_credit_and_debit() {
        let mut profile = Profile::new(ProfileId(1), Role::Client, Balance::new(dec!(100)));
        profile.adjust(Balance::new(dec!(-40))).unwrap();
        assert_eq!(profile.balance, Balance::new(dec!(60)));
        profile.adjust(Balance::new(dec!(15.5))).unwrap();
        assert_eq!(profile.balance, Balance::new(dec!(75.5)));
    }

    #[test]
    fn test_adjust_refuses_overdraw() {
        let mut profile = Profile::new(ProfileId(1), Role::Client, Balance::new(dec!(10)));
        let result = profile.adjust(Balance::new(dec!(-40)));
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
        assert_eq!(profile.balance, Balance::new(dec!(10)));
    }

    #[test]
    fn test_adjust_to_exactly_zero() {
        let mut profile = Profile::new(ProfileId(1), Role::Client, Balance::new(dec!(40)));
        profile.adjust(Balance::new(dec!(-40))).unwrap();
        assert_eq!(profile.balance, Balance::ZERO);
    }

    #[test]
    fn test_adjust_refuses_overflow() {
        let mut profile =
            Profile::new(ProfileId(2), Role::Contractor, Balance::new(Decimal::MAX));
        let result = profile.adjust(Balance::new(dec!(40)));
        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
        assert_eq!(profile.balance, Balance::new(Decimal::MAX));
    }

    #[test]
    fn test_validate_negative_balance() {
        let profile = Profile::new(ProfileId(3), Role::Contractor, Balance::new(dec!(-1)));
        assert!(profile.validate().is_err());
    }
}
