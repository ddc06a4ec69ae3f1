use super::scope::AccessScope;
use crate::domain::contract::{Contract, ContractStatus};
use crate::domain::ids::{ContractId, ProfileId};
use crate::domain::job::Job;
use crate::domain::ports::ContractRepositoryBox;
use crate::error::Result;
use tracing::debug;

/// Read endpoints over contracts and jobs, each scoped to the acting profile.
pub struct QueryService {
    repository: ContractRepositoryBox,
}

impl QueryService {
    pub fn new(repository: ContractRepositoryBox) -> Self {
        Self { repository }
    }

    /// Returns the contract if the profile is a party to it, `NotFound` otherwise.
    pub async fn get_contract(&self, profile_id: ProfileId, id: ContractId) -> Result<Contract> {
        let scope = AccessScope::for_profile(profile_id);
        scope.visible(self.repository.contract(id).await?)
    }

    /// Contracts the profile is a party to that are not terminated.
    pub async fn list_active_contracts(&self, profile_id: ProfileId) -> Result<Vec<Contract>> {
        let scope = AccessScope::for_profile(profile_id);
        let contracts = self.scoped_contracts(&scope).await?;
        Ok(contracts
            .into_iter()
            .filter(|c| c.status.is_active())
            .collect())
    }

    /// Unpaid jobs on in-progress contracts the profile is a party to.
    pub async fn list_unpaid_jobs(&self, profile_id: ProfileId) -> Result<Vec<Job>> {
        let scope = AccessScope::for_profile(profile_id);
        let contract_ids: Vec<ContractId> = self
            .scoped_contracts(&scope)
            .await?
            .into_iter()
            .filter(|c| c.status == ContractStatus::InProgress)
            .map(|c| c.id)
            .collect();
        if contract_ids.is_empty() {
            return Ok(Vec::new());
        }

        let jobs = self.repository.jobs_for_contracts(&contract_ids).await?;
        Ok(jobs
            .into_iter()
            .filter(|job| !job.is_paid() && contract_ids.contains(&job.contract_id))
            .collect())
    }

    async fn scoped_contracts(&self, scope: &AccessScope) -> Result<Vec<Contract>> {
        let contracts = self
            .repository
            .contracts_for_party(scope.profile_id())
            .await?;
        let scoped = scope.retain(contracts);
        debug!(profile = %scope.profile_id(), count = scoped.len(), "Scoped contracts");
        Ok(scoped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::seed::fixtures::seeded_store;
    use crate::domain::ids::JobId;
    use crate::error::PaymentError;

    async fn service() -> QueryService {
        QueryService::new(Box::new(seeded_store().await))
    }

    #[tokio::test]
    async fn test_get_contract_as_client_and_contractor() {
        let service = service().await;
        let as_client = service.get_contract(ProfileId(1), ContractId(1)).await.unwrap();
        let as_contractor = service.get_contract(ProfileId(3), ContractId(1)).await.unwrap();
        assert_eq!(as_client, as_contractor);
        assert_eq!(as_client.client_id, ProfileId(1));
    }

    #[tokio::test]
    async fn test_get_contract_hides_foreign_rows() {
        let service = service().await;
        let result = service.get_contract(ProfileId(5), ContractId(1)).await;
        assert!(matches!(result, Err(PaymentError::NotFound)));

        let missing = service.get_contract(ProfileId(1), ContractId(99)).await;
        assert!(matches!(missing, Err(PaymentError::NotFound)));
    }

    #[tokio::test]
    async fn test_list_active_contracts_excludes_terminated() {
        let service = service().await;
        let contracts = service.list_active_contracts(ProfileId(1)).await.unwrap();
        let ids: Vec<ContractId> = contracts.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![ContractId(1), ContractId(4)]);
        assert!(contracts.iter().all(|c| c.status != ContractStatus::Terminated));
    }

    #[tokio::test]
    async fn test_list_active_contracts_empty_is_ok() {
        let service = service().await;
        let contracts = service.list_active_contracts(ProfileId(5)).await.unwrap();
        assert!(contracts.is_empty());
    }

    #[tokio::test]
    async fn test_list_unpaid_jobs_only_in_progress() {
        let service = service().await;

        // Job 2 is on a terminated contract, job 4 is paid, job 5 is on a new contract.
        let jobs = service.list_unpaid_jobs(ProfileId(1)).await.unwrap();
        let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![JobId(1)]);

        let jobs = service.list_unpaid_jobs(ProfileId(4)).await.unwrap();
        let ids: Vec<JobId> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![JobId(3)]);
    }

    #[tokio::test]
    async fn test_list_unpaid_jobs_outsider_sees_nothing() {
        let service = service().await;
        assert!(service.list_unpaid_jobs(ProfileId(5)).await.unwrap().is_empty());
    }
}
