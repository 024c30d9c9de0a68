//! Handlers for the `/production-settings` resource and quoting.
//!
//! Pricing parameters are resolved into a [`PricingRule`] before anything is
//! written, so a stored setting always resolves cleanly on read.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use printshop_core::error::CoreError;
use printshop_core::pricing::{build_quote, OrderParams, Quote, RoundingCategory, RoundingMode};
use printshop_core::types::DbId;
use printshop_db::models::production_setting::{
    CreateProductionSetting, ProductionSetting, UpdateProductionSetting,
};
use printshop_db::repositories::{ProductionSettingRepo, RoundingRepo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::production_group::ensure_group_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /{id}/quote`.
///
/// Order fields sit at the top level next to the optional rounding overrides.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub order: OrderParams,
    /// Overrides the category derived from the setting's print method.
    pub rounding_category: Option<String>,
    /// Operator-chosen rounding unit; takes precedence over the tier table.
    pub fixed_unit: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub production_setting_id: DbId,
    /// Category whose tiers were looked up; `None` when the fallback was used
    /// or a fixed unit was supplied.
    pub rounding_category: Option<RoundingCategory>,
    #[serde(flatten)]
    pub quote: Quote,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/production-settings
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProductionSetting>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let rule = input.rule()?;
    ensure_group_exists(&state, input.production_group_id).await?;

    let setting = ProductionSettingRepo::create(&state.pool, &input, &rule).await?;
    tracing::info!(
        id = setting.id,
        pricing_type = %setting.pricing_type,
        "Production setting created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: setting })))
}

/// GET /api/v1/production-settings/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let setting = find_setting(&state, id).await?;
    Ok(Json(DataResponse { data: setting }))
}

/// PUT /api/v1/production-settings/{id}
///
/// A patch touching `pricing_type` or `pricing_params` is merged with the
/// stored values and must resolve before it is written.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProductionSetting>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let current = find_setting(&state, id).await?;
    let rule = input.merged_rule(&current)?;

    let setting = ProductionSettingRepo::update(&state.pool, id, &input, rule.as_ref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProductionSetting",
            id,
        }))?;
    Ok(Json(DataResponse { data: setting }))
}

/// DELETE /api/v1/production-settings/{id}
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_setting(&state, id).await?;
    ProductionSettingRepo::deactivate(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// POST /api/v1/production-settings/{id}/quote
///
/// Resolves the setting's strategy, prices the order, and rounds the unit
/// price with the category's tier list (or the supplied fixed unit).
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(request): Json<QuoteRequest>,
) -> AppResult<impl IntoResponse> {
    let setting = find_setting(&state, id).await?;
    if !setting.is_active {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Production setting {id} is inactive"
        ))));
    }
    let rule = setting.rule()?;

    let (quote, rounding_category) = match request.fixed_unit {
        Some(unit) => {
            let quote = build_quote(
                &rule,
                &request.order,
                setting.setting_fee,
                RoundingMode::FixedUnit(unit),
            )?;
            (quote, None)
        }
        None => {
            let category = rounding_category_for(&setting, request.rounding_category.as_deref());
            let table = RoundingRepo::load_table(&state.pool).await?;
            let quote = build_quote(
                &rule,
                &request.order,
                setting.setting_fee,
                RoundingMode::Tiered {
                    table: &table,
                    category,
                },
            )?;
            (quote, category)
        }
    };

    tracing::debug!(
        id,
        pricing_type = %setting.pricing_type,
        raw_unit_price = %quote.raw_unit_price,
        unit_price = %quote.unit_price,
        total = %quote.total,
        "Quote computed"
    );
    Ok(Json(DataResponse {
        data: QuoteResponse {
            production_setting_id: id,
            rounding_category,
            quote,
        },
    }))
}

/// Explicit override first, then the setting's print method.
fn rounding_category_for(
    setting: &ProductionSetting,
    requested: Option<&str>,
) -> Option<RoundingCategory> {
    match requested {
        Some(name) => RoundingCategory::parse(name),
        None => setting
            .print_method
            .as_deref()
            .and_then(RoundingCategory::for_print_method),
    }
}

async fn find_setting(state: &AppState, id: DbId) -> AppResult<ProductionSetting> {
    ProductionSettingRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProductionSetting",
            id,
        }))
}
