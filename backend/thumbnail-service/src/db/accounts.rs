//! Postgres credit ledger

use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::CreditLedger;
use crate::error::{Result, ThumbnailError};
use crate::models::{Account, NewAccount};

pub struct PgCreditLedger {
    pool: PgPool,
}

impl PgCreditLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, display_name, credits, subscription_tier,
                   subscription_status, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ThumbnailError::AccountNotFound(account_id))
    }
}

/// Conditional deduction shared by the ledger and the generation transaction.
///
/// Zero affected rows means either the account is missing or its balance is
/// short; a follow-up read on the same executor tells them apart.
pub(crate) async fn deduct_with<'c, E>(executor: E, account_id: Uuid, cost: i64) -> Result<Option<i64>>
where
    E: PgExecutor<'c>,
{
    if cost <= 0 {
        return Err(ThumbnailError::Validation(
            "deduction must be a positive number of credits".to_string(),
        ));
    }

    let remaining = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE accounts
        SET credits = credits - $2, updated_at = NOW()
        WHERE id = $1 AND credits >= $2
        RETURNING credits
        "#,
    )
    .bind(account_id)
    .bind(cost)
    .fetch_optional(executor)
    .await?;

    Ok(remaining)
}

pub(crate) async fn account_exists<'c, E>(executor: E, account_id: Uuid) -> Result<bool>
where
    E: PgExecutor<'c>,
{
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
        .bind(account_id)
        .fetch_one(executor)
        .await?;
    Ok(exists)
}

#[async_trait]
impl CreditLedger for PgCreditLedger {
    async fn balance(&self, account_id: Uuid) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT credits FROM accounts WHERE id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ThumbnailError::AccountNotFound(account_id))
    }

    async fn deduct(&self, account_id: Uuid, cost: i64) -> Result<i64> {
        if let Some(remaining) = deduct_with(&self.pool, account_id, cost).await? {
            tracing::info!(account_id = %account_id, cost, remaining, "Credits deducted");
            return Ok(remaining);
        }

        if account_exists(&self.pool, account_id).await? {
            Err(ThumbnailError::InsufficientCredits { required: cost })
        } else {
            Err(ThumbnailError::AccountNotFound(account_id))
        }
    }

    async fn add(&self, account_id: Uuid, amount: i64) -> Result<i64> {
        if amount <= 0 {
            return Err(ThumbnailError::Validation(
                "grant must be a positive number of credits".to_string(),
            ));
        }

        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE accounts
            SET credits = credits + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING credits
            "#,
        )
        .bind(account_id)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ThumbnailError::AccountNotFound(account_id))?;

        tracing::info!(account_id = %account_id, amount, balance, "Credits granted");
        Ok(balance)
    }

    async fn provision(&self, account: NewAccount, trial_credits: i64) -> Result<Account> {
        let inserted = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, display_name, credits, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            RETURNING id, email, display_name, credits, subscription_tier,
                      subscription_status, created_at, updated_at
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(trial_credits)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => ThumbnailError::Validation(
                format!("email {} is already registered", account.email),
            ),
            _ => ThumbnailError::Database(e),
        })?;

        match inserted {
            Some(created) => {
                tracing::info!(
                    account_id = %created.id,
                    trial_credits,
                    "Account provisioned with trial bonus"
                );
                Ok(created)
            }
            None => self.get_account(account.id).await,
        }
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
