//! Quantity-tiered price entries.
//!
//! A [`PriceEntry`] maps an optional specification and an inclusive
//! quantity range to a price. A missing minimum means 0 and a missing
//! maximum means unbounded.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::calculator::Sides;
use crate::pricing::strategy::validate_non_negative;
use crate::types::DbId;

/// One `(specification?, quantity range) -> price` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// `None` applies to any specification without its own entries.
    #[serde(default)]
    pub specification_id: Option<DbId>,
    #[serde(default)]
    pub min_quantity: Option<i64>,
    #[serde(default)]
    pub max_quantity: Option<i64>,
    /// Single-sided unit price.
    pub price: Decimal,
    #[serde(default)]
    pub double_side_price: Option<Decimal>,
}

impl PriceEntry {
    /// Inclusive lower bound.
    pub fn min(&self) -> i64 {
        self.min_quantity.unwrap_or(0)
    }

    /// Whether `quantity` falls inside this entry's inclusive range.
    pub fn contains(&self, quantity: i64) -> bool {
        quantity >= self.min() && self.max_quantity.map_or(true, |max| quantity <= max)
    }

    /// Unit price for the requested side count, if configured.
    pub fn price_for(&self, sides: Sides) -> Option<Decimal> {
        match sides {
            Sides::Single => Some(self.price),
            Sides::Double => self.double_side_price,
        }
    }
}

/// Find the entry for `specification_id` and `quantity`.
///
/// Entries for the specification itself win over generic entries. A
/// specification that has its own entries never falls back to the generic
/// ones, even when none of its ranges match.
pub fn find_entry(
    entries: &[PriceEntry],
    specification_id: Option<DbId>,
    quantity: i64,
) -> Option<&PriceEntry> {
    let has_own = specification_id.is_some()
        && entries.iter().any(|e| e.specification_id == specification_id);
    let key = if has_own { specification_id } else { None };
    entries
        .iter()
        .find(|e| e.specification_id == key && e.contains(quantity))
}

/// Check the tier invariant for every specification group.
///
/// Within a group the ranges must start at 0, be contiguous and
/// non-overlapping, and only the last range may be (and must be) unbounded.
pub fn validate_price_entries(entries: &[PriceEntry]) -> Result<(), CoreError> {
    let mut groups: BTreeMap<Option<DbId>, Vec<&PriceEntry>> = BTreeMap::new();
    for entry in entries {
        validate_non_negative(entry.price, "price")?;
        if let Some(double) = entry.double_side_price {
            validate_non_negative(double, "double_side_price")?;
        }
        if let Some(max) = entry.max_quantity {
            if max < entry.min() {
                return Err(CoreError::Validation(format!(
                    "Quantity range {}..={max} is empty",
                    entry.min()
                )));
            }
        }
        if entry.min() < 0 {
            return Err(CoreError::Validation(format!(
                "min_quantity must not be negative, got {}",
                entry.min()
            )));
        }
        groups.entry(entry.specification_id).or_default().push(entry);
    }

    for (spec, mut tiers) in groups {
        let label = match spec {
            Some(id) => format!("specification {id}"),
            None => "generic entries".to_string(),
        };
        tiers.sort_by_key(|e| e.min());

        let mut expected_min = 0;
        let last = tiers.len() - 1;
        for (i, tier) in tiers.iter().enumerate() {
            if tier.min() != expected_min {
                return Err(CoreError::Validation(format!(
                    "Quantity tiers for {label} must be contiguous from 0: expected a tier \
                     starting at {expected_min}, found one starting at {}",
                    tier.min()
                )));
            }
            match (tier.max_quantity, i == last) {
                (Some(max), false) => expected_min = max + 1,
                (None, true) => {}
                (Some(_), true) => {
                    return Err(CoreError::Validation(format!(
                        "The last quantity tier for {label} must be unbounded"
                    )));
                }
                (None, false) => {
                    return Err(CoreError::Validation(format!(
                        "Only the last quantity tier for {label} may be unbounded"
                    )));
                }
            }
        }
    }
    Ok(())
}
