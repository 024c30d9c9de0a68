//! Repository for the `production_settings` table.
//!
//! Callers resolve the pricing rule before calling in; the repository only
//! writes rules that already passed [`PricingRule::validate`].

use printshop_core::pricing::PricingRule;
use printshop_core::types::DbId;
use sqlx::PgPool;

use crate::error::DbError;
use crate::models::production_setting::{
    CreateProductionSetting, ProductionSetting, UpdateProductionSetting,
};

const COLUMNS: &str = "id, production_group_id, name, pricing_type, pricing_params, \
    setting_fee, print_method, vendor, is_active, created_at, updated_at";

/// Provides CRUD operations for production settings.
pub struct ProductionSettingRepo;

impl ProductionSettingRepo {
    /// Insert a new setting. `rule` is stored as its type tag plus JSON params.
    pub async fn create(
        pool: &PgPool,
        input: &CreateProductionSetting,
        rule: &PricingRule,
    ) -> Result<ProductionSetting, DbError> {
        let params = rule.params_json()?;
        let query = format!(
            "INSERT INTO production_settings \
                (production_group_id, name, pricing_type, pricing_params, setting_fee, \
                 print_method, vendor) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), $6, $7) \
             RETURNING {COLUMNS}"
        );
        let setting = sqlx::query_as::<_, ProductionSetting>(&query)
            .bind(input.production_group_id)
            .bind(&input.name)
            .bind(rule.pricing_type().as_str())
            .bind(params)
            .bind(input.setting_fee)
            .bind(&input.print_method)
            .bind(&input.vendor)
            .fetch_one(pool)
            .await?;
        Ok(setting)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductionSetting>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM production_settings WHERE id = $1");
        sqlx::query_as::<_, ProductionSetting>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_group(
        pool: &PgPool,
        production_group_id: DbId,
        include_inactive: bool,
    ) -> Result<Vec<ProductionSetting>, sqlx::Error> {
        let filter = if include_inactive {
            ""
        } else {
            " AND is_active = true"
        };
        let query = format!(
            "SELECT {COLUMNS} FROM production_settings \
             WHERE production_group_id = $1{filter} ORDER BY name, id"
        );
        sqlx::query_as::<_, ProductionSetting>(&query)
            .bind(production_group_id)
            .fetch_all(pool)
            .await
    }

    /// Update a setting. Only non-`None` fields are applied; `rule`, when
    /// present, replaces both the type tag and the params.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProductionSetting,
        rule: Option<&PricingRule>,
    ) -> Result<Option<ProductionSetting>, DbError> {
        let params = rule.map(PricingRule::params_json).transpose()?;
        let query = format!(
            "UPDATE production_settings SET \
                name = COALESCE($2, name), \
                pricing_type = COALESCE($3, pricing_type), \
                pricing_params = COALESCE($4, pricing_params), \
                setting_fee = COALESCE($5, setting_fee), \
                print_method = COALESCE($6, print_method), \
                vendor = COALESCE($7, vendor), \
                is_active = COALESCE($8, is_active) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let setting = sqlx::query_as::<_, ProductionSetting>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(rule.map(|r| r.pricing_type().as_str()))
            .bind(params)
            .bind(input.setting_fee)
            .bind(&input.print_method)
            .bind(&input.vendor)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await?;
        Ok(setting)
    }

    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE production_settings SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
