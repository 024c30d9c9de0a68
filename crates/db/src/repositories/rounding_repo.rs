//! Repository for the `price_rounding_tiers` table.

use printshop_core::pricing::{normalize_tiers, RoundingCategory, RoundingTable, RoundingTier};
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::rounding::RoundingTierRow;

const COLUMNS: &str = "id, category, ceiling, unit, created_at";

/// Reads and replaces per-category rounding tier lists.
pub struct RoundingRepo;

impl RoundingRepo {
    /// Every stored tier, grouped by category with ascending ceilings and
    /// the unbounded tier last.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<RoundingTierRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM price_rounding_tiers \
             ORDER BY category, ceiling ASC NULLS LAST"
        );
        sqlx::query_as::<_, RoundingTierRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Load the full table used by the rounding post-processor.
    pub async fn load_table(pool: &PgPool) -> Result<RoundingTable, DbError> {
        let rows = Self::list_all(pool).await?;
        let tiers = rows
            .into_iter()
            .map(RoundingTierRow::into_tier)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RoundingTable::from_rows(tiers)?)
    }

    /// Replace the tier list of `category` in one transaction.
    ///
    /// The list is validated before anything is deleted.
    pub async fn replace_category(
        pool: &PgPool,
        category: RoundingCategory,
        tiers: Vec<RoundingTier>,
    ) -> Result<Vec<RoundingTierRow>, DbError> {
        let tiers = normalize_tiers(tiers)?;
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM price_rounding_tiers WHERE category = $1")
            .bind(category.as_str())
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO price_rounding_tiers (category, ceiling, unit) \
             VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        let mut rows = Vec::with_capacity(tiers.len());
        for tier in &tiers {
            let row = sqlx::query_as::<_, RoundingTierRow>(&insert)
                .bind(category.as_str())
                .bind(tier.ceiling)
                .bind(tier.unit)
                .fetch_one(&mut *tx)
                .await?;
            rows.push(row);
        }

        tx.commit().await?;
        tracing::info!(category = category.as_str(), tiers = rows.len(), "Replaced rounding tiers");
        Ok(rows)
    }
}
