//! Postgres generation record store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::accounts::{account_exists, deduct_with};
use super::GenerationStore;
use crate::error::{Result, ThumbnailError};
use crate::models::{
    ChargedGeneration, GenerationRecord, GenerationStats, GenerationType, NewGeneration,
    StatsRange, TypeStats,
};

#[derive(Debug, FromRow)]
struct GenerationRow {
    id: Uuid,
    account_id: Uuid,
    generation_type: String,
    output_image_url: String,
    credit_cost: i64,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<GenerationRow> for GenerationRecord {
    type Error = ThumbnailError;

    fn try_from(row: GenerationRow) -> Result<Self> {
        let generation_type = GenerationType::parse(&row.generation_type).ok_or_else(|| {
            ThumbnailError::Internal(format!(
                "unknown generation_type in row {}: {}",
                row.id, row.generation_type
            ))
        })?;

        Ok(GenerationRecord {
            id: row.id,
            account_id: row.account_id,
            generation_type,
            output_image_url: row.output_image_url,
            credit_cost: row.credit_cost,
            metadata: row.metadata,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct TypeStatsRow {
    generation_type: String,
    generations: i64,
    credits_charged: i64,
}

pub struct PgGenerationStore {
    pool: PgPool,
}

impl PgGenerationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn record_and_charge(&self, generation: NewGeneration) -> Result<ChargedGeneration> {
        let metadata = serde_json::to_value(&generation.metadata)
            .map_err(|e| ThumbnailError::Internal(format!("serialize metadata: {}", e)))?;

        let mut tx = self.pool.begin().await?;

        let remaining = match deduct_with(&mut *tx, generation.account_id, generation.credit_cost)
            .await?
        {
            Some(remaining) => remaining,
            None => {
                let exists = account_exists(&mut *tx, generation.account_id).await?;
                tx.rollback().await?;
                return Err(if exists {
                    ThumbnailError::InsufficientCredits {
                        required: generation.credit_cost,
                    }
                } else {
                    ThumbnailError::AccountNotFound(generation.account_id)
                });
            }
        };

        let row = sqlx::query_as::<_, GenerationRow>(
            r#"
            INSERT INTO generations (
                id, account_id, generation_type, output_image_url,
                credit_cost, metadata, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING id, account_id, generation_type, output_image_url,
                      credit_cost, metadata, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(generation.account_id)
        .bind(generation.generation_type.as_str())
        .bind(&generation.output_image_url)
        .bind(generation.credit_cost)
        .bind(&metadata)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let record = GenerationRecord::try_from(row)?;
        tracing::info!(
            generation_id = %record.id,
            account_id = %record.account_id,
            generation_type = record.generation_type.as_str(),
            credit_cost = record.credit_cost,
            remaining_credits = remaining,
            "Generation recorded and charged"
        );

        Ok(ChargedGeneration {
            record,
            remaining_credits: remaining,
        })
    }

    async fn list_for_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GenerationRecord>> {
        let rows = sqlx::query_as::<_, GenerationRow>(
            r#"
            SELECT id, account_id, generation_type, output_image_url,
                   credit_cost, metadata, created_at
            FROM generations
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(GenerationRecord::try_from).collect()
    }

    async fn stats(&self, range: StatsRange) -> Result<GenerationStats> {
        let rows = sqlx::query_as::<_, TypeStatsRow>(
            r#"
            SELECT generation_type,
                   COUNT(*) AS generations,
                   COALESCE(SUM(credit_cost), 0)::BIGINT AS credits_charged
            FROM generations
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
            GROUP BY generation_type
            ORDER BY generation_type
            "#,
        )
        .bind(range.from)
        .bind(range.to)
        .fetch_all(&self.pool)
        .await?;

        let (total_accounts, outstanding_credits) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COALESCE(SUM(credits), 0)::BIGINT FROM accounts",
        )
        .fetch_one(&self.pool)
        .await?;

        let by_type = rows
            .into_iter()
            .filter_map(|row| {
                GenerationType::parse(&row.generation_type).map(|generation_type| TypeStats {
                    generation_type,
                    generations: row.generations,
                    credits_charged: row.credits_charged,
                })
            })
            .collect::<Vec<_>>();

        Ok(GenerationStats {
            from: range.from,
            to: range.to,
            total_generations: by_type.iter().map(|t| t.generations).sum(),
            total_credits_charged: by_type.iter().map(|t| t.credits_charged).sum(),
            by_type,
            total_accounts,
            outstanding_credits,
        })
    }
}
