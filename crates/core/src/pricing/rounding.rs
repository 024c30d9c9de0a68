//! Price rounding post-processor.
//!
//! Snaps a computed unit price to a human-friendly increment. Each print
//! category owns an ordered tier list of `(ceiling, unit)` pairs; the first
//! tier whose ceiling exceeds the price decides the unit. Tables are plain
//! data handed in by the caller.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::amount;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Print-method-derived category selecting a rounding tier list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingCategory {
    Indigo,
    Inkjet,
    Album,
    Frame,
}

/// Category used when the requested one is unknown or missing.
pub const FALLBACK_CATEGORY: RoundingCategory = RoundingCategory::Inkjet;

impl RoundingCategory {
    pub const ALL: [RoundingCategory; 4] = [Self::Indigo, Self::Inkjet, Self::Album, Self::Frame];

    /// Parse a category name; `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Parse a category string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::parse(s).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid rounding category '{s}'. Must be one of: indigo, inkjet, album, frame"
            ))
        })
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indigo => "indigo",
            Self::Inkjet => "inkjet",
            Self::Album => "album",
            Self::Frame => "frame",
        }
    }

    /// Derive the category from a production setting's print method label.
    pub fn for_print_method(method: &str) -> Option<Self> {
        let method = method.to_lowercase();
        [
            (Self::Indigo, ["indigo", "인디고"]),
            (Self::Inkjet, ["inkjet", "잉크젯"]),
            (Self::Album, ["album", "앨범"]),
            (Self::Frame, ["frame", "액자"]),
        ]
        .into_iter()
        .find(|(_, keys)| keys.iter().any(|k| method.contains(k)))
        .map(|(category, _)| category)
    }
}

// ---------------------------------------------------------------------------
// Tiers
// ---------------------------------------------------------------------------

/// Prices below `ceiling` round to multiples of `unit`. A `None` ceiling is
/// unbounded and belongs last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundingTier {
    pub ceiling: Option<Decimal>,
    pub unit: Decimal,
}

/// Validate a tier list and return it sorted (ascending ceilings, unbounded last).
pub fn normalize_tiers(mut tiers: Vec<RoundingTier>) -> Result<Vec<RoundingTier>, CoreError> {
    for tier in &tiers {
        if tier.unit <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Rounding unit must be greater than 0, got {}",
                tier.unit
            )));
        }
        if let Some(ceiling) = tier.ceiling {
            if ceiling <= Decimal::ZERO {
                return Err(CoreError::Validation(format!(
                    "Rounding ceiling must be greater than 0, got {ceiling}"
                )));
            }
        }
    }

    tiers.sort_by(|a, b| match (a.ceiling, b.ceiling) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    if tiers.iter().filter(|t| t.ceiling.is_none()).count() > 1 {
        return Err(CoreError::Validation(
            "Only one unbounded rounding tier is allowed".to_string(),
        ));
    }
    if tiers
        .windows(2)
        .any(|w| w[0].ceiling.is_some() && w[0].ceiling == w[1].ceiling)
    {
        return Err(CoreError::Validation(
            "Rounding tier ceilings must be unique".to_string(),
        ));
    }
    Ok(tiers)
}

/// Tier lists keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundingTable {
    tiers: BTreeMap<RoundingCategory, Vec<RoundingTier>>,
}

impl RoundingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(category, tier)` rows in any order.
    pub fn from_rows<I>(rows: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = (RoundingCategory, RoundingTier)>,
    {
        let mut grouped: BTreeMap<RoundingCategory, Vec<RoundingTier>> = BTreeMap::new();
        for (category, tier) in rows {
            grouped.entry(category).or_default().push(tier);
        }
        let mut table = Self::new();
        for (category, tiers) in grouped {
            table.set_tiers(category, tiers)?;
        }
        Ok(table)
    }

    /// Replace the tier list of one category.
    pub fn set_tiers(
        &mut self,
        category: RoundingCategory,
        tiers: Vec<RoundingTier>,
    ) -> Result<(), CoreError> {
        let tiers = normalize_tiers(tiers)?;
        self.tiers.insert(category, tiers);
        Ok(())
    }

    /// Builder form of [`RoundingTable::set_tiers`].
    pub fn with_tiers(
        mut self,
        category: RoundingCategory,
        tiers: Vec<RoundingTier>,
    ) -> Result<Self, CoreError> {
        self.set_tiers(category, tiers)?;
        Ok(self)
    }

    /// Tier list for `category`, falling back to [`FALLBACK_CATEGORY`] when
    /// the category is missing.
    pub fn tiers_for(&self, category: Option<RoundingCategory>) -> &[RoundingTier] {
        let category = category.unwrap_or(FALLBACK_CATEGORY);
        self.tiers
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Rounding
// ---------------------------------------------------------------------------

fn snap(price: Decimal, unit: Decimal) -> Result<Decimal, CoreError> {
    let steps = amount::div(price, unit)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    amount::mul(steps, unit)
}

/// Round `price` with the tier list of `category`.
///
/// Unknown categories use the inkjet list. Prices `<= 0` are returned
/// unchanged, as is any price when the selected list is empty. Fails only
/// when the snapped price is out of range.
pub fn round_price(
    price: Decimal,
    category: &str,
    table: &RoundingTable,
) -> Result<Decimal, CoreError> {
    round_price_in(price, RoundingCategory::parse(category), table)
}

/// [`round_price`] for an already-parsed category.
pub fn round_price_in(
    price: Decimal,
    category: Option<RoundingCategory>,
    table: &RoundingTable,
) -> Result<Decimal, CoreError> {
    if price <= Decimal::ZERO {
        return Ok(price);
    }
    let tiers = table.tiers_for(category);
    let tier = tiers
        .iter()
        .find(|t| t.ceiling.is_some_and(|c| c > price))
        .or_else(|| tiers.last());
    match tier {
        Some(t) => snap(price, t.unit),
        None => Ok(price),
    }
}

/// Round `price` to a caller-supplied unit, bypassing the tier table.
pub fn round_to_fixed_unit(price: Decimal, unit: Decimal) -> Result<Decimal, CoreError> {
    if unit <= Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Rounding unit must be greater than 0, got {unit}"
        )));
    }
    if price <= Decimal::ZERO {
        return Ok(price);
    }
    snap(price, unit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn tier(ceiling: Option<i64>, unit: i64) -> RoundingTier {
        RoundingTier {
            ceiling: ceiling.map(Decimal::from),
            unit: d(unit),
        }
    }

    fn table() -> RoundingTable {
        RoundingTable::new()
            .with_tiers(
                RoundingCategory::Indigo,
                vec![tier(None, 100), tier(Some(500), 10), tier(Some(1000), 50)],
            )
            .unwrap()
            .with_tiers(
                RoundingCategory::Inkjet,
                vec![tier(Some(10_000), 100), tier(None, 1000)],
            )
            .unwrap()
    }

    #[test]
    fn indigo_large_price_uses_unbounded_tier() {
        assert_eq!(round_price(d(1234), "indigo", &table()).unwrap(), d(1200));
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(round_price(d(1250), "indigo", &table()).unwrap(), d(1300));
        assert_eq!(round_price(d(1249), "indigo", &table()).unwrap(), d(1200));
        assert_eq!(round_price(d(25), "indigo", &table()).unwrap(), d(30));
    }

    #[test]
    fn ceiling_is_exclusive() {
        // 500 is not below the 500 ceiling, so the 50-unit tier applies.
        assert_eq!(round_price(d(500), "indigo", &table()).unwrap(), d(500));
        assert_eq!(round_price(d(520), "indigo", &table()).unwrap(), d(500));
        assert_eq!(round_price(d(499), "indigo", &table()).unwrap(), d(500));
    }

    #[test]
    fn zero_and_negative_pass_through() {
        for category in ["indigo", "inkjet", "album", "nonsense"] {
            assert_eq!(
                round_price(Decimal::ZERO, category, &table()).unwrap(),
                Decimal::ZERO
            );
            assert_eq!(round_price(d(-50), category, &table()).unwrap(), d(-50));
        }
    }

    #[test]
    fn unknown_category_falls_back_to_inkjet() {
        assert_eq!(round_price(d(1234), "poster", &table()).unwrap(), d(1200));
        assert_eq!(round_price(d(12_345), "poster", &table()).unwrap(), d(12_000));
    }

    #[test]
    fn category_name_is_case_insensitive() {
        assert_eq!(round_price(d(1234), "INDIGO", &table()).unwrap(), d(1200));
    }

    #[test]
    fn empty_list_returns_price_unchanged() {
        assert_eq!(round_price(d(1234), "album", &table()).unwrap(), d(1234));
        assert_eq!(
            round_price(d(1234), "poster", &RoundingTable::new()).unwrap(),
            d(1234)
        );
    }

    #[test]
    fn fixed_unit_rounding() {
        assert_eq!(round_to_fixed_unit(d(1234), d(500)).unwrap(), d(1000));
        assert_eq!(round_to_fixed_unit(d(1250), d(500)).unwrap(), d(1500));
        assert_eq!(
            round_to_fixed_unit(Decimal::new(12345, 2), Decimal::new(5, 1)).unwrap(),
            Decimal::new(1235, 1)
        );
        assert_eq!(round_to_fixed_unit(d(-5), d(10)).unwrap(), d(-5));
    }

    #[test]
    fn out_of_range_quotient_is_rejected() {
        assert_matches!(
            round_to_fixed_unit(d(1_000_000_000_000_000_000), Decimal::new(1, 12)),
            Err(CoreError::Validation(_))
        );

        let tiny = RoundingTable::new()
            .with_tiers(
                RoundingCategory::Inkjet,
                vec![RoundingTier {
                    ceiling: None,
                    unit: Decimal::new(1, 12),
                }],
            )
            .unwrap();
        assert_matches!(
            round_price(Decimal::MAX, "inkjet", &tiny),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn fixed_unit_rejects_non_positive_unit() {
        assert_matches!(
            round_to_fixed_unit(d(100), Decimal::ZERO),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn tiers_are_sorted_with_unbounded_last() {
        let t = table();
        let tiers = t.tiers_for(Some(RoundingCategory::Indigo));
        assert_eq!(tiers[0].ceiling, Some(d(500)));
        assert_eq!(tiers[1].ceiling, Some(d(1000)));
        assert_eq!(tiers[2].ceiling, None);
    }

    #[test]
    fn invalid_tier_lists_rejected() {
        assert_matches!(
            normalize_tiers(vec![tier(None, 10), tier(None, 100)]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            normalize_tiers(vec![tier(Some(500), 10), tier(Some(500), 50)]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            normalize_tiers(vec![tier(None, 0)]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn from_rows_groups_by_category() {
        let t = RoundingTable::from_rows(vec![
            (RoundingCategory::Frame, tier(None, 1000)),
            (RoundingCategory::Frame, tier(Some(10_000), 100)),
        ])
        .unwrap();
        assert_eq!(t.tiers_for(Some(RoundingCategory::Frame)).len(), 2);
    }

    #[test]
    fn print_method_maps_to_category() {
        assert_eq!(
            RoundingCategory::for_print_method("HP Indigo 7900"),
            Some(RoundingCategory::Indigo)
        );
        assert_eq!(
            RoundingCategory::for_print_method("잉크젯 대형"),
            Some(RoundingCategory::Inkjet)
        );
        assert_eq!(RoundingCategory::for_print_method("offset"), None);
    }
}
