use super::scope::AccessScope;
use crate::domain::contract::ContractStatus;
use crate::domain::ids::{JobId, ProfileId};
use crate::domain::job::Job;
use crate::domain::money::{Amount, Balance};
use crate::domain::ports::{LedgerStoreBox, LedgerTransaction};
use crate::domain::profile::Profile;
use crate::error::{PaymentError, Result};
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{error, info, warn};

/// Share of a client's outstanding job total they may deposit at once.
pub const DEPOSIT_LIMIT_RATIO: Decimal = dec!(0.25);

/// Moves money between profiles.
///
/// `SettlementEngine` is the only component that mutates balances or job
/// payment state. Every mutation runs inside one ledger transaction, and
/// preconditions are evaluated inside that same transaction so that two
/// concurrent attempts on the same job cannot both pass them.
pub struct SettlementEngine {
    ledger: LedgerStoreBox,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine` over the given ledger store.
    pub fn new(ledger: LedgerStoreBox) -> Self {
        Self { ledger }
    }

    /// Pays a job's price from the contract's client to its contractor.
    ///
    /// Fails with `NotFound` when the job is absent, already paid, on a
    /// contract that is not in progress, or when `acting` is not the
    /// contract's client. Fails with `PayNotAllowed` when the client cannot
    /// cover the price. Neither failure mutates anything. Any error raised
    /// while applying the transfer rolls the whole unit back and surfaces as
    /// `SettlementFailed`.
    pub async fn pay_job(&self, acting: ProfileId, job_id: JobId) -> Result<Job> {
        let failed = |source: PaymentError| PaymentError::SettlementFailed {
            job_id,
            source: Box::new(source),
        };

        let mut tx = self.ledger.begin().await.map_err(failed)?;
        let (job, client, contractor) = match check_payable(tx.as_mut(), acting, job_id).await {
            Ok(parties) => parties,
            Err(PaymentError::NotFound) => return Err(PaymentError::NotFound),
            Err(e) if e.is_business_rule() => {
                warn!(profile = %acting, job = %job_id, "Payment rejected: {}", e);
                return Err(e);
            }
            Err(e) => return Err(failed(e)),
        };

        match transfer(tx, &job, client, contractor).await {
            Ok(paid) => {
                info!(
                    job = %job_id,
                    client = %client,
                    contractor = %contractor,
                    price = %job.price,
                    "Job paid"
                );
                Ok(paid)
            }
            Err(e) => {
                error!(job = %job_id, "Settlement rolled back: {}", e);
                Err(failed(e))
            }
        }
    }

    /// Credits a client's balance.
    ///
    /// A client may not deposit more than a quarter of the total price of
    /// their unpaid jobs on in-progress contracts.
    pub async fn deposit(&self, acting: ProfileId, amount: Amount) -> Result<Profile> {
        let mut tx = self.ledger.begin().await?;
        let profile = tx
            .profile(acting)
            .await?
            .filter(Profile::is_client)
            .ok_or(PaymentError::NotFound)?;

        let outstanding = outstanding_for_client(tx.as_mut(), profile.id).await?;
        let limit = outstanding.fraction(DEPOSIT_LIMIT_RATIO);
        let requested = Balance::from(amount);
        if requested > limit {
            let err = PaymentError::DepositNotAllowed { requested, limit };
            warn!(profile = %acting, "Deposit rejected: {}", err);
            return Err(err);
        }

        let updated = tx.adjust_balance(profile.id, requested).await?;
        tx.commit().await?;
        info!(profile = %acting, amount = %amount, balance = %updated.balance, "Deposit applied");
        Ok(updated)
    }

    /// Every profile with its current balance, ordered by id.
    pub async fn balances(&self) -> Result<Vec<Profile>> {
        self.ledger.all_profiles().await
    }
}

/// Returns the job with its client and contractor ids if `acting` may pay it now.
async fn check_payable(
    tx: &mut dyn LedgerTransaction,
    acting: ProfileId,
    job_id: JobId,
) -> Result<(Job, ProfileId, ProfileId)> {
    let scope = AccessScope::for_profile(acting);

    let job = tx.job(job_id).await?.ok_or(PaymentError::NotFound)?;
    if job.is_paid() {
        return Err(PaymentError::NotFound);
    }
    let contract = tx
        .contract(job.contract_id)
        .await?
        .filter(|c| c.status == ContractStatus::InProgress && scope.permits_as_client(c))
        .ok_or(PaymentError::NotFound)?;

    let client = tx
        .profile(contract.client_id)
        .await?
        .ok_or(PaymentError::NotFound)?;
    let required = Balance::from(job.price);
    if client.balance < required {
        return Err(PaymentError::PayNotAllowed {
            required,
            available: client.balance,
        });
    }

    Ok((job, contract.client_id, contract.contractor_id))
}

/// Applies the three mutations and commits. Dropping `tx` on error discards them.
async fn transfer(
    mut tx: Box<dyn LedgerTransaction>,
    job: &Job,
    client: ProfileId,
    contractor: ProfileId,
) -> Result<Job> {
    let price = Balance::from(job.price);
    tx.adjust_balance(contractor, price).await?;
    tx.adjust_balance(client, -price).await?;
    let paid = tx.mark_job_paid(job.id, Utc::now()).await?;
    tx.commit().await?;
    Ok(paid)
}

async fn outstanding_for_client(
    tx: &mut dyn LedgerTransaction,
    client: ProfileId,
) -> Result<Balance> {
    let contract_ids: Vec<_> = tx
        .contracts_for_party(client)
        .await?
        .into_iter()
        .filter(|c| c.client_id == client && c.status == ContractStatus::InProgress)
        .map(|c| c.id)
        .collect();
    if contract_ids.is_empty() {
        return Ok(Balance::ZERO);
    }
    let prices = tx
        .jobs_for_contracts(&contract_ids)
        .await?
        .into_iter()
        .filter(|job| !job.is_paid())
        .map(|job| Balance::from(job.price));
    Balance::checked_sum(prices).ok_or_else(|| {
        PaymentError::ValidationError(format!(
            "Outstanding job total of client {} overflows",
            client
        ))
    })
}
