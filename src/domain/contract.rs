use super::ids::{ContractId, ProfileId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    New,
    InProgress,
    Terminated,
}

impl ContractStatus {
    /// New and in-progress contracts are listed; terminated ones are not.
    pub fn is_active(&self) -> bool {
        matches!(self, ContractStatus::New | ContractStatus::InProgress)
    }
}

/// An agreement between one client and one contractor.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Contract {
    pub id: ContractId,
    #[serde(default)]
    pub terms: String,
    pub status: ContractStatus,
    #[serde(rename = "clientId")]
    pub client_id: ProfileId,
    #[serde(rename = "contractorId")]
    pub contractor_id: ProfileId,
}

impl Contract {
    pub fn new(
        id: ContractId,
        client_id: ProfileId,
        contractor_id: ProfileId,
        status: ContractStatus,
    ) -> Self {
        Self {
            id,
            terms: String::new(),
            status,
            client_id,
            contractor_id,
        }
    }

    pub fn is_party(&self, profile_id: ProfileId) -> bool {
        self.client_id == profile_id || self.contractor_id == profile_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_activity() {
        assert!(ContractStatus::New.is_active());
        assert!(ContractStatus::InProgress.is_active());
        assert!(!ContractStatus::Terminated.is_active());
    }

    #[test]
    fn test_status_deserialization() {
        let status: ContractStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, ContractStatus::InProgress);
    }
}
