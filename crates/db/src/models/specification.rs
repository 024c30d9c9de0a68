//! Specification entity model and DTOs.
//!
//! A specification is a physical sheet size. `orientation` and `area_sqm`
//! are derived from the dimensions when the row is written; clients never
//! send them.

use printshop_core::error::CoreError;
use printshop_core::specification::{Orientation, SelectionKey, SpecShape};
use printshop_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `specifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Specification {
    pub id: DbId,
    pub name: String,
    pub width_mm: Decimal,
    pub height_mm: Decimal,
    pub orientation: String,
    pub area_sqm: Decimal,
    pub pair_id: Option<DbId>,
    pub for_indigo: bool,
    pub for_inkjet: bool,
    pub for_album: bool,
    pub for_frame: bool,
    pub for_booklet: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Specification {
    /// The fields pairing decisions look at.
    pub fn shape(&self) -> SpecShape {
        SpecShape {
            id: self.id,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            pair_id: self.pair_id,
        }
    }

    pub fn orientation(&self) -> Result<Orientation, CoreError> {
        Orientation::from_str_db(&self.orientation)
    }
}

impl SelectionKey for Specification {
    fn selection_id(&self) -> DbId {
        self.id
    }

    fn selection_area(&self) -> Decimal {
        self.area_sqm
    }

    fn selection_width(&self) -> Decimal {
        self.width_mm
    }
}

/// DTO for creating a new specification.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateSpecification {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub width_mm: Decimal,
    pub height_mm: Decimal,
    pub for_indigo: Option<bool>,
    pub for_inkjet: Option<bool>,
    pub for_album: Option<bool>,
    pub for_frame: Option<bool>,
    pub for_booklet: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// DTO for updating an existing specification. All fields optional.
///
/// Changing a dimension recomputes area and orientation, and keeps a paired
/// partner's swapped dimensions in step.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSpecification {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub width_mm: Option<Decimal>,
    pub height_mm: Option<Decimal>,
    pub for_indigo: Option<bool>,
    pub for_inkjet: Option<bool>,
    pub for_album: Option<bool>,
    pub for_frame: Option<bool>,
    pub for_booklet: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// DTO for linking a specification with its rotated partner.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkPair {
    pub pair_id: DbId,
}
