//! Handlers for the `/rounding` resource.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use printshop_core::error::CoreError;
use printshop_core::pricing::rounding::FALLBACK_CATEGORY;
use printshop_core::pricing::{round_price, round_to_fixed_unit, RoundingCategory, RoundingTier};
use printshop_db::repositories::RoundingRepo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReplaceTiers {
    pub tiers: Vec<RoundingTier>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub price: Decimal,
    pub category: Option<String>,
    pub fixed_unit: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub price: Decimal,
    pub rounded: Decimal,
    /// Tier list actually used; `None` for a fixed unit.
    pub category: Option<RoundingCategory>,
}

/// GET /api/v1/rounding
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let table = RoundingRepo::load_table(&state.pool).await?;
    Ok(Json(DataResponse { data: table }))
}

/// PUT /api/v1/rounding/{category}
///
/// Replaces the whole tier list of one category.
pub async fn replace(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(input): Json<ReplaceTiers>,
) -> AppResult<impl IntoResponse> {
    let category = RoundingCategory::from_str_db(&category)?;
    if input.tiers.is_empty() {
        return Err(CoreError::Validation(format!(
            "Tier list for '{}' must not be empty",
            category.as_str()
        ))
        .into());
    }
    let rows = RoundingRepo::replace_category(&state.pool, category, input.tiers).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/rounding/preview
pub async fn preview(
    State(state): State<AppState>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<impl IntoResponse> {
    let response = match input.fixed_unit {
        Some(unit) => PreviewResponse {
            price: input.price,
            rounded: round_to_fixed_unit(input.price, unit)?,
            category: None,
        },
        None => {
            let requested = input.category.as_deref().unwrap_or_default();
            let table = RoundingRepo::load_table(&state.pool).await?;
            PreviewResponse {
                price: input.price,
                rounded: round_price(input.price, requested, &table)?,
                category: Some(RoundingCategory::parse(requested).unwrap_or(FALLBACK_CATEGORY)),
            }
        }
    };
    Ok(Json(DataResponse { data: response }))
}
