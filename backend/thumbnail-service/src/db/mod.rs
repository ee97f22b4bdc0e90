//! Persistence: the credit ledger and the generation record store

pub mod accounts;
pub mod generations;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Account, ChargedGeneration, GenerationRecord, GenerationStats, NewAccount, NewGeneration,
    StatsRange,
};

pub use accounts::PgCreditLedger;
pub use generations::PgGenerationStore;

/// Per-account spendable balance
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn balance(&self, account_id: Uuid) -> Result<i64>;

    async fn check_sufficient_credits(&self, account_id: Uuid, cost: i64) -> Result<bool> {
        Ok(self.balance(account_id).await? >= cost)
    }

    /// Subtract `cost` only if the balance covers it; returns the new balance
    async fn deduct(&self, account_id: Uuid, cost: i64) -> Result<i64>;

    /// Credit a grant; returns the new balance
    async fn add(&self, account_id: Uuid, amount: i64) -> Result<i64>;

    /// Create the account on first sight with `trial_credits`; existing
    /// accounts are returned untouched
    async fn provision(&self, account: NewAccount, trial_credits: i64) -> Result<Account>;

    async fn health_check(&self) -> Result<()>;
}

#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Insert the record and deduct its cost as one unit of work
    async fn record_and_charge(&self, generation: NewGeneration) -> Result<ChargedGeneration>;

    /// Newest first
    async fn list_for_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>>;

    async fn stats(&self, range: StatsRange) -> Result<GenerationStats>;
}
