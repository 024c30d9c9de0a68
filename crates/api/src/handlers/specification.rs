//! Handlers for the `/specifications` resource.
//!
//! Area and orientation are never accepted from clients; the repository
//! derives them from the dimensions on every write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use printshop_core::error::CoreError;
use printshop_core::specification::LinkOutcome;
use printshop_core::types::DbId;
use printshop_db::models::specification::{
    CreateSpecification, LinkPair, Specification, UpdateSpecification,
};
use printshop_db::repositories::{NormalizationReport, SpecificationRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::query::IncludeInactiveParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of `POST /{id}/pair`.
#[derive(Debug, Serialize)]
pub struct LinkPairResponse {
    pub outcome: LinkOutcome,
    pub specification: Specification,
}

/// A linked pair from the auto-link pass.
#[derive(Debug, Serialize)]
pub struct LinkedPair {
    pub id: DbId,
    pub pair_id: DbId,
}

/// Result of the normalization maintenance endpoint.
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    #[serde(flatten)]
    pub areas: NormalizationReport,
    pub names_stripped: u64,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/specifications?include_inactive=false
///
/// Ordered by area ascending, then width descending.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let specs = SpecificationRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(DataResponse { data: specs }))
}

/// POST /api/v1/specifications
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSpecification>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let spec = SpecificationRepo::create(&state.pool, &input).await?;
    tracing::info!(id = spec.id, name = %spec.name, area_sqm = %spec.area_sqm, "Specification created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: spec })))
}

/// GET /api/v1/specifications/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let spec = SpecificationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Specification",
            id,
        }))?;
    Ok(Json(DataResponse { data: spec }))
}

/// PUT /api/v1/specifications/{id}
///
/// A dimension change also rewrites a paired partner.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSpecification>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let spec = SpecificationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Specification",
            id,
        }))?;
    Ok(Json(DataResponse { data: spec }))
}

/// DELETE /api/v1/specifications/{id}
///
/// Soft delete. Returns 204 whether or not the row was already inactive,
/// 404 if it does not exist.
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if SpecificationRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Specification",
            id,
        }));
    }
    SpecificationRepo::deactivate(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Pairing and maintenance
// ---------------------------------------------------------------------------

/// POST /api/v1/specifications/{id}/pair
pub async fn link_pair(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<LinkPair>,
) -> AppResult<impl IntoResponse> {
    let (specification, outcome) =
        SpecificationRepo::link_pair(&state.pool, id, input.pair_id).await?;
    Ok(Json(DataResponse {
        data: LinkPairResponse {
            outcome,
            specification,
        },
    }))
}

/// POST /api/v1/specifications/maintenance/auto-link
pub async fn auto_link(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let linked = SpecificationRepo::auto_link_pairs(&state.pool)
        .await?
        .into_iter()
        .map(|(id, pair_id)| LinkedPair { id, pair_id })
        .collect::<Vec<_>>();
    Ok(Json(DataResponse { data: linked }))
}

/// POST /api/v1/specifications/maintenance/normalize
///
/// Runs the area pass, then the name pass. Each pass commits on its own.
pub async fn normalize(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let areas = SpecificationRepo::normalize_areas(&state.pool).await?;
    let names_stripped = SpecificationRepo::strip_name_suffixes(&state.pool).await?;
    Ok(Json(DataResponse {
        data: NormalizeResponse {
            areas,
            names_stripped,
        },
    }))
}
