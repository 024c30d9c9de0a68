//! Raw price calculation for every pricing strategy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::pricing::amount;
use crate::pricing::page_range::{self, PageRangeBreakdown};
use crate::pricing::price_table::find_entry;
use crate::pricing::strategy::PricingRule;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Single- or double-sided printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sides {
    #[default]
    Single,
    Double,
}

/// Order parameters, already deserialized by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderParams {
    pub quantity: i64,
    #[serde(default)]
    pub specification_id: Option<DbId>,
    #[serde(default)]
    pub page_count: Option<i64>,
    #[serde(default)]
    pub sides: Sides,
}

impl OrderParams {
    fn require_specification(&self) -> Result<DbId, CoreError> {
        self.specification_id.ok_or_else(|| {
            CoreError::Validation("This pricing type requires a specification_id".to_string())
        })
    }

    fn require_page_count(&self) -> Result<i64, CoreError> {
        match self.page_count {
            Some(p) if p > 0 => Ok(p),
            Some(p) => Err(CoreError::Validation(format!(
                "Page count must be greater than 0, got {p}"
            ))),
            None => Err(CoreError::Validation(
                "This pricing type requires a page_count".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Raw (unrounded) price of one order line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculation {
    pub unit_price: Decimal,
    pub total: Decimal,
    /// False for strategies whose price does not scale with quantity.
    pub quantity_applied: bool,
    pub breakdown: Option<PageRangeBreakdown>,
}

impl Calculation {
    fn per_quantity(unit_price: Decimal, quantity: i64) -> Result<Self, CoreError> {
        Ok(Self {
            unit_price,
            total: amount::times(unit_price, quantity)?,
            quantity_applied: true,
            breakdown: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Run `rule` against `params`.
///
/// Either returns a complete price or fails; fields the strategy does not
/// use (a page count for per-sheet pricing, say) are ignored.
pub fn calculate(rule: &PricingRule, params: &OrderParams) -> Result<Calculation, CoreError> {
    let quantity = params.quantity;
    if quantity < 0 {
        return Err(CoreError::Validation(format!(
            "Quantity must not be negative, got {quantity}"
        )));
    }

    match rule {
        PricingRule::PerSheet(p) => Calculation::per_quantity(p.base_price, quantity),

        PricingRule::PaperOutputSpec(p) => {
            let spec = params.require_specification()?;
            let entry = find_entry(&p.entries, Some(spec), quantity).ok_or_else(|| {
                CoreError::MissingPrice(format!(
                    "No price for specification {spec} at quantity {quantity}"
                ))
            })?;
            let base = entry.price_for(params.sides).ok_or_else(|| {
                CoreError::MissingPrice(format!(
                    "No double-sided price for specification {spec}"
                ))
            })?;
            let weight = p
                .nup_factors
                .iter()
                .find(|f| f.specification_id == spec)
                .and_then(|f| f.weight)
                .unwrap_or(Decimal::ONE);
            Calculation::per_quantity(amount::mul(base, weight)?, quantity)
        }

        PricingRule::NupPageRange(p) => {
            let spec = params.require_specification()?;
            let pages = params.require_page_count()?;
            let breakdown = page_range::price_for_pages(p, spec, pages)?;
            let unit_price = breakdown.unit_price;
            Ok(Calculation {
                unit_price,
                total: amount::times(unit_price, quantity)?,
                quantity_applied: true,
                breakdown: Some(breakdown),
            })
        }

        PricingRule::BindingPage(p) => {
            let pages = params.require_page_count()?;
            Calculation::per_quantity(amount::times(p.price_per_page, pages)?, quantity)
        }

        PricingRule::FinishingQty(p) => Calculation::per_quantity(p.unit_price, quantity),

        PricingRule::FinishingPage(p) => {
            let pages = params.require_page_count()?;
            let unit_price = amount::times(p.unit_price, pages)?;
            Ok(Calculation {
                unit_price,
                total: unit_price,
                quantity_applied: false,
                breakdown: None,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::pricing::price_table::PriceEntry;
    use crate::pricing::strategy::{
        NupFactor, NupPageRangeParams, PaperOutputSpecParams, PerPageParams, PerSheetParams,
        TierPrice, UnitPriceParams,
    };

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn order(quantity: i64) -> OrderParams {
        OrderParams {
            quantity,
            specification_id: None,
            page_count: None,
            sides: Sides::Single,
        }
    }

    fn per_sheet(base: i64) -> PricingRule {
        PricingRule::PerSheet(PerSheetParams { base_price: d(base) })
    }

    fn paper() -> PricingRule {
        PricingRule::PaperOutputSpec(PaperOutputSpecParams {
            entries: vec![
                PriceEntry {
                    specification_id: Some(1),
                    min_quantity: None,
                    max_quantity: Some(99),
                    price: d(500),
                    double_side_price: Some(d(800)),
                },
                PriceEntry {
                    specification_id: Some(1),
                    min_quantity: Some(100),
                    max_quantity: None,
                    price: d(400),
                    double_side_price: None,
                },
                PriceEntry {
                    specification_id: None,
                    min_quantity: None,
                    max_quantity: None,
                    price: d(1000),
                    double_side_price: None,
                },
            ],
            nup_factors: vec![NupFactor {
                specification_id: 2,
                nup: 2,
                weight: Some(Decimal::new(5, 1)),
            }],
        })
    }

    // -- per_sheet --

    #[test]
    fn per_sheet_zero_quantity_is_free() {
        let calc = calculate(&per_sheet(250), &order(0)).unwrap();
        assert_eq!(calc.total, Decimal::ZERO);
    }

    #[test]
    fn per_sheet_scales_linearly() {
        for n in [1, 2, 7, 1000] {
            let calc = calculate(&per_sheet(250), &order(n)).unwrap();
            assert_eq!(calc.total, d(n) * d(250));
            assert_eq!(calc.unit_price, d(250));
        }
    }

    #[test]
    fn negative_quantity_rejected_for_every_strategy() {
        let rules = [
            per_sheet(1),
            paper(),
            PricingRule::FinishingQty(UnitPriceParams { unit_price: d(1) }),
            PricingRule::FinishingPage(UnitPriceParams { unit_price: d(1) }),
        ];
        for rule in &rules {
            assert_matches!(calculate(rule, &order(-1)), Err(CoreError::Validation(_)));
        }
    }

    #[test]
    fn per_sheet_ignores_unused_fields() {
        let mut params = order(3);
        params.page_count = Some(-10);
        params.specification_id = Some(999);
        let calc = calculate(&per_sheet(100), &params).unwrap();
        assert_eq!(calc.total, d(300));
    }

    // -- paper_output_spec --

    #[test]
    fn paper_uses_quantity_tier() {
        let mut params = order(50);
        params.specification_id = Some(1);
        assert_eq!(calculate(&paper(), &params).unwrap().total, d(25_000));

        params.quantity = 200;
        assert_eq!(calculate(&paper(), &params).unwrap().unit_price, d(400));
    }

    #[test]
    fn paper_double_sided_price() {
        let mut params = order(10);
        params.specification_id = Some(1);
        params.sides = Sides::Double;
        assert_eq!(calculate(&paper(), &params).unwrap().unit_price, d(800));
    }

    #[test]
    fn paper_double_sided_missing_price() {
        let mut params = order(100);
        params.specification_id = Some(1);
        params.sides = Sides::Double;
        assert_matches!(
            calculate(&paper(), &params),
            Err(CoreError::MissingPrice(_))
        );
    }

    #[test]
    fn paper_applies_nup_weight_on_generic_entry() {
        let mut params = order(4);
        params.specification_id = Some(2);
        let calc = calculate(&paper(), &params).unwrap();
        assert_eq!(calc.unit_price, d(500));
        assert_eq!(calc.total, d(2_000));
    }

    #[test]
    fn paper_requires_specification() {
        assert_matches!(
            calculate(&paper(), &order(1)),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn paper_without_any_matching_entry_is_missing_price() {
        let rule = PricingRule::PaperOutputSpec(PaperOutputSpecParams {
            entries: vec![],
            nup_factors: vec![],
        });
        let mut params = order(1);
        params.specification_id = Some(1);
        assert_matches!(calculate(&rule, &params), Err(CoreError::MissingPrice(_)));
    }

    // -- nup_page_range --

    fn booklet() -> PricingRule {
        PricingRule::NupPageRange(NupPageRangeParams {
            breakpoints: vec![20, 30, 40, 50, 60],
            tier_prices: vec![
                TierPrice {
                    page_count: 20,
                    specification_id: 5,
                    price: d(35_000),
                },
                TierPrice {
                    page_count: 30,
                    specification_id: 5,
                    price: d(40_000),
                },
            ],
            price_per_page: d(500),
            nup_factors: vec![],
        })
    }

    fn booklet_order(pages: Option<i64>, quantity: i64) -> OrderParams {
        OrderParams {
            quantity,
            specification_id: Some(5),
            page_count: pages,
            sides: Sides::Single,
        }
    }

    #[test]
    fn page_range_multiplies_by_quantity() {
        let calc = calculate(&booklet(), &booklet_order(Some(25), 3)).unwrap();
        assert_eq!(calc.unit_price, d(40_000));
        assert_eq!(calc.total, d(120_000));
        assert_eq!(calc.breakdown.unwrap().tier_page_count, 30);
    }

    #[test]
    fn page_range_requires_positive_page_count() {
        assert_matches!(
            calculate(&booklet(), &booklet_order(None, 1)),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            calculate(&booklet(), &booklet_order(Some(0), 1)),
            Err(CoreError::Validation(_))
        );
    }

    // -- binding / finishing --

    #[test]
    fn binding_page_is_per_page_times_quantity() {
        let rule = PricingRule::BindingPage(PerPageParams {
            price_per_page: d(30),
        });
        let mut params = order(10);
        params.page_count = Some(40);
        let calc = calculate(&rule, &params).unwrap();
        assert_eq!(calc.unit_price, d(1_200));
        assert_eq!(calc.total, d(12_000));
    }

    #[test]
    fn finishing_qty_is_unit_times_quantity() {
        let rule = PricingRule::FinishingQty(UnitPriceParams { unit_price: d(150) });
        assert_eq!(calculate(&rule, &order(8)).unwrap().total, d(1_200));
    }

    #[test]
    fn finishing_page_ignores_quantity() {
        let rule = PricingRule::FinishingPage(UnitPriceParams { unit_price: d(20) });
        let mut params = order(100);
        params.page_count = Some(12);
        let calc = calculate(&rule, &params).unwrap();
        assert_eq!(calc.total, d(240));
        assert!(!calc.quantity_applied);
    }

    // -- overflow --

    #[test]
    fn huge_quantity_is_rejected_not_panicking() {
        let rule = PricingRule::PerSheet(PerSheetParams {
            base_price: d(10_000_000_000),
        });
        assert_matches!(
            calculate(&rule, &order(i64::MAX)),
            Err(CoreError::Validation(msg)) if msg.contains("out of range")
        );
    }

    #[test]
    fn huge_page_count_is_rejected_not_panicking() {
        let rule = PricingRule::FinishingPage(UnitPriceParams {
            unit_price: Decimal::MAX,
        });
        let mut params = order(1);
        params.page_count = Some(2);
        assert_matches!(calculate(&rule, &params), Err(CoreError::Validation(_)));

        let params = booklet_order(Some(i64::MAX), 1);
        let mut rule = booklet();
        if let PricingRule::NupPageRange(p) = &mut rule {
            p.tier_prices.push(TierPrice {
                page_count: 60,
                specification_id: 5,
                price: d(55_000),
            });
            p.price_per_page = Decimal::MAX;
        }
        assert_matches!(calculate(&rule, &params), Err(CoreError::Validation(_)));
    }
}
