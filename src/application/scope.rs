use crate::domain::contract::Contract;
use crate::domain::ids::ProfileId;
use crate::error::{PaymentError, Result};

/// Restricts visibility of contracts, and the jobs under them, to the
/// profiles that are a party to them.
///
/// Every read in the query service and the payment lookup go through a scope;
/// there is no unscoped read path in the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessScope {
    profile_id: ProfileId,
}

impl AccessScope {
    pub fn for_profile(profile_id: ProfileId) -> Self {
        Self { profile_id }
    }

    pub fn profile_id(&self) -> ProfileId {
        self.profile_id
    }

    /// The profile is the contract's client or its contractor.
    pub fn permits(&self, contract: &Contract) -> bool {
        contract.is_party(self.profile_id)
    }

    /// The profile is the contract's client. Required to pay its jobs.
    pub fn permits_as_client(&self, contract: &Contract) -> bool {
        contract.client_id == self.profile_id
    }

    /// Turns an absent or foreign contract into `NotFound`.
    pub fn visible(&self, contract: Option<Contract>) -> Result<Contract> {
        contract
            .filter(|c| self.permits(c))
            .ok_or(PaymentError::NotFound)
    }

    /// Drops every contract the profile is not a party to.
    pub fn retain(&self, contracts: Vec<Contract>) -> Vec<Contract> {
        contracts.into_iter().filter(|c| self.permits(c)).collect()
    }
}
