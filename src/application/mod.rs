//! Application layer containing the use cases.
//!
//! `SettlementEngine` owns every mutation (job payment and deposits) and runs
//! each one inside a single ledger transaction. `QueryService` serves the
//! read side; both restrict rows through an `AccessScope`.

pub mod query;
pub mod scope;
pub mod seed;
pub mod settlement;
