//! Quote assembly: calculation followed by unit-price rounding.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CoreError;
use crate::pricing::amount;
use crate::pricing::calculator::{calculate, OrderParams};
use crate::pricing::page_range::PageRangeBreakdown;
use crate::pricing::rounding::{round_price_in, round_to_fixed_unit, RoundingCategory, RoundingTable};
use crate::pricing::strategy::{validate_non_negative, PricingRule, PricingType};

/// How the raw unit price is snapped before billing.
#[derive(Debug, Clone, Copy)]
pub enum RoundingMode<'a> {
    /// Tier table lookup; `None` uses the fallback category.
    Tiered {
        table: &'a RoundingTable,
        category: Option<RoundingCategory>,
    },
    /// Operator override with a single unit.
    FixedUnit(Decimal),
}

/// A complete price for one order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub pricing_type: PricingType,
    pub quantity: i64,
    pub raw_unit_price: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub setting_fee: Decimal,
    pub total: Decimal,
    pub breakdown: Option<PageRangeBreakdown>,
}

/// Price an order line end to end.
pub fn build_quote(
    rule: &PricingRule,
    params: &OrderParams,
    setting_fee: Decimal,
    rounding: RoundingMode<'_>,
) -> Result<Quote, CoreError> {
    validate_non_negative(setting_fee, "setting_fee")?;
    let calc = calculate(rule, params)?;

    let unit_price = match rounding {
        RoundingMode::Tiered { table, category } => {
            round_price_in(calc.unit_price, category, table)?
        }
        RoundingMode::FixedUnit(unit) => round_to_fixed_unit(calc.unit_price, unit)?,
    };
    let line_total = if calc.quantity_applied {
        amount::times(unit_price, params.quantity)?
    } else {
        unit_price
    };

    let total = amount::add(line_total, setting_fee)?;

    Ok(Quote {
        pricing_type: rule.pricing_type(),
        quantity: params.quantity,
        raw_unit_price: calc.unit_price,
        unit_price,
        line_total,
        setting_fee,
        total,
        breakdown: calc.breakdown,
    })
}
