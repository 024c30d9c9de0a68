//! Production group entity model and DTOs.
//!
//! Groups form a tree (group -> subgroups); every production setting hangs
//! off exactly one node.

use printshop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `production_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductionGroup {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new group. `parent_id = None` creates a root.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProductionGroup {
    pub parent_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub sort_order: Option<i32>,
}
