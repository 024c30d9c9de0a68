//! Paper/print specification normalization.
//!
//! Derived fields (area, orientation), the symmetric pairing invariant between
//! a specification and its 90-degree rotated partner, display-name cleanup,
//! and the ordering used by selection lists. All functions are pure; the
//! repository layer calls them at write time inside its transactions.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Decimal places kept for `area_sqm`. Applied once, at write time.
pub const AREA_PRECISION: u32 = 6;

/// Square millimetres per square metre.
const MM2_PER_M2: i64 = 1_000_000;

/// Largest accepted width or height, in millimetres.
pub const MAX_DIMENSION_MM: i64 = 10_000;

/// Decimal places a stored width or height can hold (NUMERIC(10,2)).
pub const DIMENSION_SCALE: u32 = 2;

/// Trailing orientation annotations in English and Korean, e.g. `(landscape)`
/// or `(가로)`. Repeated annotations are removed in one pass.
static DECORATIVE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\s*\(\s*(?:landscape|portrait|square|가로형?|세로형?|정사각형?|정방형)\s*\))+\s*$",
    )
    .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// Orientation of a sheet, derived from its width and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    /// Parse an orientation string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "landscape" => Ok(Self::Landscape),
            "portrait" => Ok(Self::Portrait),
            "square" => Ok(Self::Square),
            _ => Err(CoreError::Validation(format!(
                "Invalid orientation '{s}'. Must be one of: landscape, portrait, square"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
            Self::Square => "square",
        }
    }
}

/// Square when width equals height, landscape when wider, portrait otherwise.
pub fn orientation_for(width_mm: Decimal, height_mm: Decimal) -> Orientation {
    match width_mm.cmp(&height_mm) {
        Ordering::Equal => Orientation::Square,
        Ordering::Greater => Orientation::Landscape,
        Ordering::Less => Orientation::Portrait,
    }
}

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// Validate that width and height are positive and within bounds.
pub fn validate_dimensions(width_mm: Decimal, height_mm: Decimal) -> Result<(), CoreError> {
    if width_mm <= Decimal::ZERO || height_mm <= Decimal::ZERO {
        return Err(CoreError::Validation(
            "Width and height must be greater than 0".to_string(),
        ));
    }
    let max = Decimal::from(MAX_DIMENSION_MM);
    if width_mm > max || height_mm > max {
        return Err(CoreError::Validation(format!(
            "Dimensions must not exceed {MAX_DIMENSION_MM}mm (got {width_mm}x{height_mm})"
        )));
    }
    // Area and orientation are derived from exactly the stored values.
    if width_mm.normalize().scale() > DIMENSION_SCALE
        || height_mm.normalize().scale() > DIMENSION_SCALE
    {
        return Err(CoreError::Validation(format!(
            "Dimensions allow at most {DIMENSION_SCALE} decimal places (got {width_mm}x{height_mm})"
        )));
    }
    Ok(())
}

/// Area in square metres, rounded half-up to [`AREA_PRECISION`] places.
///
/// Symmetric in its arguments, so a specification and its rotated partner
/// always produce the same value from their own dimensions.
pub fn recompute_area(width_mm: Decimal, height_mm: Decimal) -> Result<Decimal, CoreError> {
    validate_dimensions(width_mm, height_mm)?;
    let raw = width_mm * height_mm / Decimal::from(MM2_PER_M2);
    Ok(round_area(raw))
}

fn round_area(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AREA_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

/// Common area for two paired specifications.
///
/// Partners represent the same physical sheet, so when their stored areas
/// disagree (legacy rows written at another precision) both get the average.
pub fn reconcile_pair_area(a_area: Decimal, b_area: Decimal) -> Decimal {
    if a_area == b_area {
        return round_area(a_area);
    }
    round_area((a_area + b_area) / Decimal::from(2))
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

/// The subset of a specification row that pairing decisions depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecShape {
    pub id: DbId,
    pub width_mm: Decimal,
    pub height_mm: Decimal,
    pub pair_id: Option<DbId>,
}

/// Result of checking whether two specifications may be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOutcome {
    /// Both sides are free (or already point at each other on one side only).
    Link,
    /// The two are already mutual partners; linking again changes nothing.
    AlreadyLinked,
}

/// True when `b` is `a` rotated by 90 degrees.
///
/// Square sheets never match, since a square rotated is itself.
pub fn is_swapped_match(a: &SpecShape, b: &SpecShape) -> bool {
    a.id != b.id
        && a.width_mm != a.height_mm
        && a.width_mm == b.height_mm
        && a.height_mm == b.width_mm
}

/// Decide whether `a` and `b` may be linked as partners.
///
/// Fails with `Conflict` if either side is already paired with a different
/// specification. Dimension equality is the caller's responsibility.
pub fn check_link(a: &SpecShape, b: &SpecShape) -> Result<LinkOutcome, CoreError> {
    if a.id == b.id {
        return Err(CoreError::Validation(format!(
            "Specification {} cannot be paired with itself",
            a.id
        )));
    }
    if a.pair_id == Some(b.id) && b.pair_id == Some(a.id) {
        return Ok(LinkOutcome::AlreadyLinked);
    }
    for (side, other) in [(a, b), (b, a)] {
        if let Some(existing) = side.pair_id {
            if existing != other.id {
                return Err(CoreError::Conflict(format!(
                    "Specification {} is already paired with {existing}",
                    side.id
                )));
            }
        }
    }
    Ok(LinkOutcome::Link)
}

/// Plan an auto-link pass over `specs`.
///
/// Walks specifications in id order; each unpaired one is linked with the
/// first unpaired candidate (also in id order) whose dimensions are exactly
/// swapped. Specifications that already have a pair, or that were claimed
/// earlier in the same pass, are skipped.
pub fn plan_auto_link(specs: &[SpecShape]) -> Vec<(DbId, DbId)> {
    let mut ordered: Vec<&SpecShape> = specs.iter().collect();
    ordered.sort_by_key(|s| s.id);

    let mut taken: HashSet<DbId> = ordered
        .iter()
        .filter(|s| s.pair_id.is_some())
        .map(|s| s.id)
        .collect();
    let mut planned = Vec::new();

    for spec in &ordered {
        if taken.contains(&spec.id) {
            continue;
        }
        let candidate = ordered
            .iter()
            .find(|c| !taken.contains(&c.id) && is_swapped_match(spec, c));
        if let Some(partner) = candidate {
            taken.insert(spec.id);
            taken.insert(partner.id);
            planned.push((spec.id, partner.id));
        }
    }

    planned
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Remove trailing parenthetical orientation annotations from a display name.
///
/// `"A4 (landscape)"` and `"A4 (가로)"` both become `"A4"`. Idempotent.
pub fn strip_decorative_name_suffix(name: &str) -> String {
    DECORATIVE_SUFFIX_RE.replace(name, "").trim_end().to_string()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Fields a specification-like value exposes for selection ordering.
pub trait SelectionKey {
    fn selection_id(&self) -> DbId;
    fn selection_area(&self) -> Decimal;
    fn selection_width(&self) -> Decimal;
}

/// Area ascending, then width descending, then id ascending.
pub fn selection_order<T: SelectionKey>(a: &T, b: &T) -> Ordering {
    a.selection_area()
        .cmp(&b.selection_area())
        .then_with(|| b.selection_width().cmp(&a.selection_width()))
        .then_with(|| a.selection_id().cmp(&b.selection_id()))
}

/// Sort in place with [`selection_order`]. The sort is stable.
pub fn sort_for_selection<T: SelectionKey>(items: &mut [T]) {
    items.sort_by(selection_order);
}

impl SelectionKey for SpecShape {
    fn selection_id(&self) -> DbId {
        self.id
    }

    fn selection_area(&self) -> Decimal {
        // Shapes carry no stored area; derive it exactly for ordering only.
        self.width_mm * self.height_mm / Decimal::from(MM2_PER_M2)
    }

    fn selection_width(&self) -> Decimal {
        self.width_mm
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
