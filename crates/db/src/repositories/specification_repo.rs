//! Repository for the `specifications` table.
//!
//! Area and orientation are computed here, at write time, through
//! `printshop_core::specification`. Pairing and the maintenance passes run
//! inside a single transaction with the affected rows locked, so concurrent
//! passes cannot pair one specification with two partners.

use std::collections::HashMap;

use printshop_core::error::CoreError;
use printshop_core::specification::{
    check_link, is_swapped_match, orientation_for, plan_auto_link, recompute_area,
    reconcile_pair_area, strip_decorative_name_suffix, LinkOutcome,
};
use printshop_core::types::DbId;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::DbError;
use crate::models::specification::{CreateSpecification, Specification, UpdateSpecification};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, width_mm, height_mm, orientation, area_sqm, pair_id, \
    for_indigo, for_inkjet, for_album, for_frame, for_booklet, is_active, sort_order, \
    created_at, updated_at";

/// Ordering used by every selection list.
const SELECTION_ORDER: &str = "ORDER BY area_sqm ASC, width_mm DESC, id ASC";

/// Outcome of [`SpecificationRepo::normalize_areas`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    /// Rows whose area or orientation was rewritten.
    pub areas_updated: u64,
    /// Pairs whose stored areas disagreed and were set to a common value.
    pub pairs_reconciled: u64,
}

/// Provides CRUD, pairing, and maintenance operations for specifications.
pub struct SpecificationRepo;

impl SpecificationRepo {
    /// Insert a new specification, deriving area and orientation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSpecification,
    ) -> Result<Specification, DbError> {
        let area = recompute_area(input.width_mm, input.height_mm)?;
        let orientation = orientation_for(input.width_mm, input.height_mm);
        let query = format!(
            "INSERT INTO specifications \
                (name, width_mm, height_mm, orientation, area_sqm, \
                 for_indigo, for_inkjet, for_album, for_frame, for_booklet, is_active, sort_order) \
             VALUES ($1, $2, $3, $4, $5, \
                 COALESCE($6, false), COALESCE($7, false), COALESCE($8, false), \
                 COALESCE($9, false), COALESCE($10, false), COALESCE($11, true), COALESCE($12, 0)) \
             RETURNING {COLUMNS}"
        );
        let spec = sqlx::query_as::<_, Specification>(&query)
            .bind(&input.name)
            .bind(input.width_mm)
            .bind(input.height_mm)
            .bind(orientation.as_str())
            .bind(area)
            .bind(input.for_indigo)
            .bind(input.for_inkjet)
            .bind(input.for_album)
            .bind(input.for_frame)
            .bind(input.for_booklet)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await?;
        Ok(spec)
    }

    /// Find a specification by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Specification>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM specifications WHERE id = $1");
        sqlx::query_as::<_, Specification>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List specifications for selection, optionally including inactive ones.
    ///
    /// Ordered by area ascending, then width descending.
    pub async fn list(
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<Specification>, sqlx::Error> {
        let query = if include_inactive {
            format!("SELECT {COLUMNS} FROM specifications {SELECTION_ORDER}")
        } else {
            format!("SELECT {COLUMNS} FROM specifications WHERE is_active = true {SELECTION_ORDER}")
        };
        sqlx::query_as::<_, Specification>(&query).fetch_all(pool).await
    }

    /// Update a specification. Only non-`None` fields are applied.
    ///
    /// A dimension change recomputes area and orientation; if the row is
    /// paired, the partner receives the swapped dimensions and the same area.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSpecification,
    ) -> Result<Option<Specification>, DbError> {
        let mut tx = pool.begin().await?;

        let Some(current) = lock_one(&mut tx, id).await? else {
            return Ok(None);
        };

        let width = input.width_mm.unwrap_or(current.width_mm);
        let height = input.height_mm.unwrap_or(current.height_mm);
        let dimensions_changed = width != current.width_mm || height != current.height_mm;
        let area = if dimensions_changed {
            recompute_area(width, height)?
        } else {
            current.area_sqm
        };
        let orientation = orientation_for(width, height);

        let query = format!(
            "UPDATE specifications SET \
                name = COALESCE($2, name), \
                width_mm = $3, \
                height_mm = $4, \
                orientation = $5, \
                area_sqm = $6, \
                for_indigo = COALESCE($7, for_indigo), \
                for_inkjet = COALESCE($8, for_inkjet), \
                for_album = COALESCE($9, for_album), \
                for_frame = COALESCE($10, for_frame), \
                for_booklet = COALESCE($11, for_booklet), \
                is_active = COALESCE($12, is_active), \
                sort_order = COALESCE($13, sort_order) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Specification>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(width)
            .bind(height)
            .bind(orientation.as_str())
            .bind(area)
            .bind(input.for_indigo)
            .bind(input.for_inkjet)
            .bind(input.for_album)
            .bind(input.for_frame)
            .bind(input.for_booklet)
            .bind(input.is_active)
            .bind(input.sort_order)
            .fetch_one(&mut *tx)
            .await?;

        if dimensions_changed {
            if let Some(partner_id) = current.pair_id {
                write_derived(
                    &mut tx,
                    partner_id,
                    height,
                    width,
                    orientation_for(height, width).as_str(),
                    area,
                )
                .await?;
                tracing::info!(id, partner_id, "Propagated swapped dimensions to partner");
            }
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Deactivate a specification (set is_active = false).
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE specifications SET is_active = false WHERE id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Link `a_id` and `b_id` as rotated partners.
    ///
    /// Both rows are locked for the duration of the check-and-set. Fails with
    /// `NotFound` for a missing row, `Validation` when the dimensions are not
    /// an exact swap, and `Conflict` when either side already has another
    /// partner. Linking an already-linked pair is a no-op.
    pub async fn link_pair(
        pool: &PgPool,
        a_id: DbId,
        b_id: DbId,
    ) -> Result<(Specification, LinkOutcome), DbError> {
        let mut tx = pool.begin().await?;

        // Lock in id order so two concurrent links cannot deadlock.
        let (first, second) = if a_id <= b_id { (a_id, b_id) } else { (b_id, a_id) };
        let first_row = lock_one(&mut tx, first).await?;
        let second_row = lock_one(&mut tx, second).await?;
        let by_id = |id: DbId| {
            [&first_row, &second_row]
                .into_iter()
                .flatten()
                .find(|s| s.id == id)
                .cloned()
                .ok_or(CoreError::NotFound {
                    entity: "Specification",
                    id,
                })
        };
        let a = by_id(a_id)?;
        let b = by_id(b_id)?;

        let outcome = check_link(&a.shape(), &b.shape())?;
        if outcome == LinkOutcome::AlreadyLinked {
            tx.commit().await?;
            return Ok((a, outcome));
        }
        if !is_swapped_match(&a.shape(), &b.shape()) {
            return Err(CoreError::Validation(format!(
                "Specifications {a_id} ({}x{}) and {b_id} ({}x{}) are not rotated partners",
                a.width_mm, a.height_mm, b.width_mm, b.height_mm
            ))
            .into());
        }

        let area = reconcile_pair_area(a.area_sqm, b.area_sqm);
        set_pair(&mut tx, b_id, a_id, area).await?;
        let linked = set_pair(&mut tx, a_id, b_id, area).await?;

        tx.commit().await?;
        tracing::info!(a_id, b_id, %area, "Linked specification pair");
        Ok((linked, outcome))
    }

    /// Link every active unpaired specification with its first exact
    /// rotated match. Returns the linked `(id, partner_id)` pairs.
    pub async fn auto_link_pairs(pool: &PgPool) -> Result<Vec<(DbId, DbId)>, DbError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM specifications \
             WHERE is_active = true AND pair_id IS NULL \
             ORDER BY id \
             FOR UPDATE"
        );
        let rows = sqlx::query_as::<_, Specification>(&query)
            .fetch_all(&mut *tx)
            .await?;
        let shapes: Vec<_> = rows.iter().map(Specification::shape).collect();
        let areas: HashMap<DbId, Decimal> = rows.iter().map(|s| (s.id, s.area_sqm)).collect();

        let planned = plan_auto_link(&shapes);
        for &(a_id, b_id) in &planned {
            let area = reconcile_pair_area(areas[&a_id], areas[&b_id]);
            set_pair(&mut tx, a_id, b_id, area).await?;
            set_pair(&mut tx, b_id, a_id, area).await?;
        }

        tx.commit().await?;
        tracing::info!(
            candidates = rows.len(),
            linked = planned.len(),
            "Auto-link pass complete"
        );
        Ok(planned)
    }

    /// Maintenance pass: recompute area and orientation for every row from
    /// its own dimensions, then give each pair a common area.
    ///
    /// Target values are settled before anything is written, so a second run
    /// over already-normalized rows reports nothing.
    pub async fn normalize_areas(pool: &PgPool) -> Result<NormalizationReport, DbError> {
        let mut tx = pool.begin().await?;
        let mut report = NormalizationReport::default();

        let query = format!("SELECT {COLUMNS} FROM specifications ORDER BY id FOR UPDATE");
        let rows = sqlx::query_as::<_, Specification>(&query)
            .fetch_all(&mut *tx)
            .await?;

        let mut own_areas: HashMap<DbId, Decimal> = HashMap::with_capacity(rows.len());
        for spec in &rows {
            own_areas.insert(spec.id, recompute_area(spec.width_mm, spec.height_mm)?);
        }
        let stored: HashMap<DbId, Decimal> = rows.iter().map(|s| (s.id, s.area_sqm)).collect();

        let mut targets = own_areas.clone();
        for spec in &rows {
            let Some(partner_id) = spec.pair_id else {
                continue;
            };
            // Visit each pair once, from its lower id.
            if partner_id < spec.id {
                continue;
            }
            let (Some(&own), Some(&theirs)) = (own_areas.get(&spec.id), own_areas.get(&partner_id))
            else {
                continue;
            };
            if own == theirs {
                continue;
            }
            let common = reconcile_pair_area(own, theirs);
            targets.insert(spec.id, common);
            targets.insert(partner_id, common);

            let settled = stored.get(&spec.id) == Some(&common)
                && stored.get(&partner_id) == Some(&common);
            if !settled {
                tracing::warn!(
                    id = spec.id,
                    partner_id,
                    %own,
                    %theirs,
                    %common,
                    "Paired specifications had different areas"
                );
                report.pairs_reconciled += 1;
            }
        }

        for spec in &rows {
            let Some(&area) = targets.get(&spec.id) else {
                continue;
            };
            let orientation = orientation_for(spec.width_mm, spec.height_mm);
            if area != spec.area_sqm || orientation.as_str() != spec.orientation {
                write_derived(
                    &mut tx,
                    spec.id,
                    spec.width_mm,
                    spec.height_mm,
                    orientation.as_str(),
                    area,
                )
                .await?;
                report.areas_updated += 1;
            }
        }

        tx.commit().await?;
        tracing::info!(
            rows = rows.len(),
            areas_updated = report.areas_updated,
            pairs_reconciled = report.pairs_reconciled,
            "Area normalization complete"
        );
        Ok(report)
    }

    /// Maintenance pass: strip decorative orientation suffixes from every
    /// name. Names that would become empty are left alone. Returns the
    /// number of rows changed.
    pub async fn strip_name_suffixes(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let rows: Vec<(DbId, String)> =
            sqlx::query_as("SELECT id, name FROM specifications ORDER BY id FOR UPDATE")
                .fetch_all(&mut *tx)
                .await?;

        let mut changed = 0u64;
        for (id, name) in rows {
            let stripped = strip_decorative_name_suffix(&name);
            if stripped == name || stripped.is_empty() {
                continue;
            }
            sqlx::query("UPDATE specifications SET name = $2 WHERE id = $1")
                .bind(id)
                .bind(&stripped)
                .execute(&mut *tx)
                .await?;
            tracing::debug!(id, from = %name, to = %stripped, "Stripped name suffix");
            changed += 1;
        }

        tx.commit().await?;
        tracing::info!(changed, "Name suffix pass complete");
        Ok(changed)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

async fn lock_one(
    tx: &mut Transaction<'_, Postgres>,
    id: DbId,
) -> Result<Option<Specification>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM specifications WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Specification>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

async fn set_pair(
    tx: &mut Transaction<'_, Postgres>,
    id: DbId,
    pair_id: DbId,
    area: Decimal,
) -> Result<Specification, sqlx::Error> {
    let query = format!(
        "UPDATE specifications SET pair_id = $2, area_sqm = $3 WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Specification>(&query)
        .bind(id)
        .bind(pair_id)
        .bind(area)
        .fetch_one(&mut **tx)
        .await
}

async fn write_derived(
    tx: &mut Transaction<'_, Postgres>,
    id: DbId,
    width_mm: Decimal,
    height_mm: Decimal,
    orientation: &str,
    area: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE specifications SET width_mm = $2, height_mm = $3, orientation = $4, area_sqm = $5 \
         WHERE id = $1",
    )
    .bind(id)
    .bind(width_mm)
    .bind(height_mm)
    .bind(orientation)
    .bind(area)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
