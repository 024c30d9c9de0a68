//! Production setting entity model and DTOs.
//!
//! The row stores the pricing strategy as a `pricing_type` tag plus a JSONB
//! parameter object. Callers work with the resolved
//! [`PricingRule`](printshop_core::pricing::PricingRule) instead.

use printshop_core::error::CoreError;
use printshop_core::pricing::{resolve, PricingRule};
use printshop_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `production_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductionSetting {
    pub id: DbId,
    pub production_group_id: DbId,
    pub name: String,
    pub pricing_type: String,
    pub pricing_params: serde_json::Value,
    pub setting_fee: Decimal,
    pub print_method: Option<String>,
    pub vendor: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ProductionSetting {
    /// Resolve the stored strategy.
    pub fn rule(&self) -> Result<PricingRule, CoreError> {
        resolve(&self.pricing_type, &self.pricing_params)
    }
}

/// DTO for creating a new setting.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductionSetting {
    pub production_group_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub pricing_type: String,
    #[serde(default = "empty_params")]
    pub pricing_params: serde_json::Value,
    pub setting_fee: Option<Decimal>,
    pub print_method: Option<String>,
    pub vendor: Option<String>,
}

impl CreateProductionSetting {
    pub fn rule(&self) -> Result<PricingRule, CoreError> {
        resolve(&self.pricing_type, &self.pricing_params)
    }
}

/// DTO for updating a setting. All fields optional.
///
/// `pricing_type` and `pricing_params` are merged with the stored values and
/// re-resolved before anything is written.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProductionSetting {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub pricing_type: Option<String>,
    pub pricing_params: Option<serde_json::Value>,
    pub setting_fee: Option<Decimal>,
    pub print_method: Option<String>,
    pub vendor: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateProductionSetting {
    /// The rule after applying this patch to `current`, if the patch touches
    /// pricing at all.
    pub fn merged_rule(&self, current: &ProductionSetting) -> Result<Option<PricingRule>, CoreError> {
        if self.pricing_type.is_none() && self.pricing_params.is_none() {
            return Ok(None);
        }
        let pricing_type = self.pricing_type.as_deref().unwrap_or(&current.pricing_type);
        let params = self.pricing_params.as_ref().unwrap_or(&current.pricing_params);
        resolve(pricing_type, params).map(Some)
    }
}

fn empty_params() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
