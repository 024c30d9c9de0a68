//! Repository for the `production_groups` table.

use printshop_core::types::DbId;
use sqlx::PgPool;

use crate::models::production_group::{CreateProductionGroup, ProductionGroup};

const COLUMNS: &str = "id, parent_id, name, sort_order, created_at, updated_at";

/// Provides create and read operations for production groups.
pub struct ProductionGroupRepo;

impl ProductionGroupRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProductionGroup,
    ) -> Result<ProductionGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO production_groups (parent_id, name, sort_order) \
             VALUES ($1, $2, COALESCE($3, 0)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductionGroup>(&query)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductionGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM production_groups WHERE id = $1");
        sqlx::query_as::<_, ProductionGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All groups, roots first, then by sort order within each parent.
    pub async fn list(pool: &PgPool) -> Result<Vec<ProductionGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM production_groups \
             ORDER BY parent_id NULLS FIRST, sort_order, name"
        );
        sqlx::query_as::<_, ProductionGroup>(&query)
            .fetch_all(pool)
            .await
    }

    /// Direct children of `parent_id`.
    pub async fn list_children(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<ProductionGroup>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM production_groups WHERE parent_id = $1 \
             ORDER BY sort_order, name"
        );
        sqlx::query_as::<_, ProductionGroup>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }
}
