//! Handlers for the `/production-groups` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use printshop_core::error::CoreError;
use printshop_core::types::DbId;
use printshop_db::models::production_group::CreateProductionGroup;
use printshop_db::repositories::{ProductionGroupRepo, ProductionSettingRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/production-groups
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let groups = ProductionGroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /api/v1/production-groups
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProductionGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if let Some(parent_id) = input.parent_id {
        ensure_group_exists(&state, parent_id).await?;
    }
    let group = ProductionGroupRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// GET /api/v1/production-groups/{id}/settings?include_inactive=false
pub async fn list_settings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    ensure_group_exists(&state, id).await?;
    let settings =
        ProductionSettingRepo::list_by_group(&state.pool, id, params.include_inactive).await?;
    Ok(Json(DataResponse { data: settings }))
}

pub(crate) async fn ensure_group_exists(state: &AppState, id: DbId) -> AppResult<()> {
    ProductionGroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProductionGroup",
            id,
        }))?;
    Ok(())
}
