//! Pricing types and the strategy resolver.
//!
//! A production setting is stored as a `pricing_type` string plus a JSON
//! parameter object. [`resolve`] turns that pair into a [`PricingRule`], a
//! sum type whose variants carry only the fields their strategy reads. The
//! set of pricing types is closed: an unknown type is an error, never a
//! default strategy.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::price_table::{validate_price_entries, PriceEntry};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Pricing type
// ---------------------------------------------------------------------------

/// Declared pricing type of a production setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    /// Flat price per sheet.
    PerSheet,
    /// Unit price per paper/output specification, sides and quantity tier.
    PaperOutputSpec,
    /// N-up booklet pricing, tiered by page-count breakpoints.
    NupPageRange,
    /// Binding priced per page, times quantity.
    BindingPage,
    /// Finishing priced per unit of quantity.
    FinishingQty,
    /// Finishing priced per page, independent of quantity.
    FinishingPage,
}

impl PricingType {
    /// Every recognized pricing type.
    pub const ALL: [PricingType; 6] = [
        Self::PerSheet,
        Self::PaperOutputSpec,
        Self::NupPageRange,
        Self::BindingPage,
        Self::FinishingQty,
        Self::FinishingPage,
    ];

    /// Parse a pricing type string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                CoreError::UnsupportedPricingType(format!(
                    "'{s}'. Valid types: {}",
                    valid.join(", ")
                ))
            })
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerSheet => "per_sheet",
            Self::PaperOutputSpec => "paper_output_spec",
            Self::NupPageRange => "nup_page_range",
            Self::BindingPage => "binding_page",
            Self::FinishingQty => "finishing_qty",
            Self::FinishingPage => "finishing_page",
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerSheetParams {
    pub base_price: Decimal,
}

/// N-up factor of a specification, with an optional price weight used by
/// indigo-style paper pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NupFactor {
    pub specification_id: DbId,
    pub nup: u32,
    #[serde(default)]
    pub weight: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperOutputSpecParams {
    pub entries: Vec<PriceEntry>,
    #[serde(default)]
    pub nup_factors: Vec<NupFactor>,
}

/// Base price of one page-count tier for one specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierPrice {
    pub page_count: u32,
    pub specification_id: DbId,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NupPageRangeParams {
    /// Page-count breakpoints, strictly ascending (e.g. 20/30/40/50/60).
    pub breakpoints: Vec<u32>,
    pub tier_prices: Vec<TierPrice>,
    pub price_per_page: Decimal,
    #[serde(default)]
    pub nup_factors: Vec<NupFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPageParams {
    pub price_per_page: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPriceParams {
    pub unit_price: Decimal,
}

// ---------------------------------------------------------------------------
// Pricing rule
// ---------------------------------------------------------------------------

/// A resolved pricing strategy, one variant per [`PricingType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pricing_type", content = "params", rename_all = "snake_case")]
pub enum PricingRule {
    PerSheet(PerSheetParams),
    PaperOutputSpec(PaperOutputSpecParams),
    NupPageRange(NupPageRangeParams),
    BindingPage(PerPageParams),
    FinishingQty(UnitPriceParams),
    FinishingPage(UnitPriceParams),
}

impl PricingRule {
    pub fn pricing_type(&self) -> PricingType {
        match self {
            Self::PerSheet(_) => PricingType::PerSheet,
            Self::PaperOutputSpec(_) => PricingType::PaperOutputSpec,
            Self::NupPageRange(_) => PricingType::NupPageRange,
            Self::BindingPage(_) => PricingType::BindingPage,
            Self::FinishingQty(_) => PricingType::FinishingQty,
            Self::FinishingPage(_) => PricingType::FinishingPage,
        }
    }

    /// The parameter object as stored next to `pricing_type`.
    pub fn params_json(&self) -> Result<serde_json::Value, CoreError> {
        let value = match self {
            Self::PerSheet(p) => serde_json::to_value(p),
            Self::PaperOutputSpec(p) => serde_json::to_value(p),
            Self::NupPageRange(p) => serde_json::to_value(p),
            Self::BindingPage(p) => serde_json::to_value(p),
            Self::FinishingQty(p) | Self::FinishingPage(p) => serde_json::to_value(p),
        };
        value.map_err(|e| CoreError::Internal(format!("Failed to encode pricing params: {e}")))
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::PerSheet(p) => validate_non_negative(p.base_price, "base_price"),
            Self::PaperOutputSpec(p) => {
                validate_price_entries(&p.entries)?;
                validate_nup_factors(&p.nup_factors)
            }
            Self::NupPageRange(p) => validate_page_range(p),
            Self::BindingPage(p) => validate_non_negative(p.price_per_page, "price_per_page"),
            Self::FinishingQty(p) | Self::FinishingPage(p) => {
                validate_non_negative(p.unit_price, "unit_price")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolve a stored `(pricing_type, params)` pair into a validated rule.
///
/// Only the fields of the declared type are read; anything else in `params`
/// is ignored.
pub fn resolve(pricing_type: &str, params: &serde_json::Value) -> Result<PricingRule, CoreError> {
    let kind = PricingType::from_str_db(pricing_type)?;
    let rule = match kind {
        PricingType::PerSheet => PricingRule::PerSheet(parse_params(kind, params)?),
        PricingType::PaperOutputSpec => PricingRule::PaperOutputSpec(parse_params(kind, params)?),
        PricingType::NupPageRange => PricingRule::NupPageRange(parse_params(kind, params)?),
        PricingType::BindingPage => PricingRule::BindingPage(parse_params(kind, params)?),
        PricingType::FinishingQty => PricingRule::FinishingQty(parse_params(kind, params)?),
        PricingType::FinishingPage => PricingRule::FinishingPage(parse_params(kind, params)?),
    };
    rule.validate()?;
    Ok(rule)
}

fn parse_params<T: DeserializeOwned>(
    kind: PricingType,
    params: &serde_json::Value,
) -> Result<T, CoreError> {
    T::deserialize(params).map_err(|e| {
        CoreError::Validation(format!(
            "Invalid parameters for pricing type '{}': {e}",
            kind.as_str()
        ))
    })
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn validate_non_negative(value: Decimal, name: &str) -> Result<(), CoreError> {
    if value < Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}

fn validate_nup_factors(factors: &[NupFactor]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for f in factors {
        if f.nup == 0 {
            return Err(CoreError::Validation(format!(
                "N-up factor for specification {} must be at least 1",
                f.specification_id
            )));
        }
        if let Some(weight) = f.weight {
            validate_non_negative(weight, "weight")?;
        }
        if !seen.insert(f.specification_id) {
            return Err(CoreError::Validation(format!(
                "Duplicate N-up factor for specification {}",
                f.specification_id
            )));
        }
    }
    Ok(())
}

fn validate_page_range(p: &NupPageRangeParams) -> Result<(), CoreError> {
    if p.breakpoints.is_empty() {
        return Err(CoreError::Validation(
            "At least one page-count breakpoint is required".to_string(),
        ));
    }
    if p.breakpoints[0] == 0 {
        return Err(CoreError::Validation(
            "Page-count breakpoints must be greater than 0".to_string(),
        ));
    }
    if p.breakpoints.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CoreError::Validation(format!(
            "Page-count breakpoints must be strictly ascending, got {:?}",
            p.breakpoints
        )));
    }
    validate_non_negative(p.price_per_page, "price_per_page")?;

    let mut seen = HashSet::new();
    for tp in &p.tier_prices {
        if !p.breakpoints.contains(&tp.page_count) {
            return Err(CoreError::Validation(format!(
                "Tier price references unknown breakpoint {}",
                tp.page_count
            )));
        }
        validate_non_negative(tp.price, "tier price")?;
        if !seen.insert((tp.page_count, tp.specification_id)) {
            return Err(CoreError::Validation(format!(
                "Duplicate tier price for breakpoint {} and specification {}",
                tp.page_count, tp.specification_id
            )));
        }
    }
    validate_nup_factors(&p.nup_factors)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
