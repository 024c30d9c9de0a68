//! Price rounding tier model.

use printshop_core::error::CoreError;
use printshop_core::pricing::{RoundingCategory, RoundingTier};
use printshop_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `price_rounding_tiers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoundingTierRow {
    pub id: DbId,
    pub category: String,
    pub ceiling: Option<Decimal>,
    pub unit: Decimal,
    pub created_at: Timestamp,
}

impl RoundingTierRow {
    pub fn into_tier(self) -> Result<(RoundingCategory, RoundingTier), CoreError> {
        let category = RoundingCategory::from_str_db(&self.category)?;
        Ok((
            category,
            RoundingTier {
                ceiling: self.ceiling,
                unit: self.unit,
            },
        ))
    }
}
