//! N-up booklet pricing tiered by page-count breakpoints.
//!
//! A page count rounds *up* to the smallest breakpoint that holds it, and
//! that tier's base price applies. Above the highest breakpoint the highest
//! tier is extended linearly by `price_per_page` for every extra page.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CoreError;
use crate::pricing::amount;
use crate::pricing::strategy::NupPageRangeParams;
use crate::types::DbId;

/// How an N-up unit price was assembled, for display next to the quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRangeBreakdown {
    pub page_count: i64,
    /// The breakpoint the page count was priced at.
    pub tier_page_count: u32,
    pub tier_base_price: Decimal,
    /// Pages beyond the tier's page count (non-zero only above the top tier).
    pub overage_pages: i64,
    pub price_per_page: Decimal,
    pub overage_price: Decimal,
    pub nup: Option<u32>,
    pub unit_price: Decimal,
}

/// Smallest breakpoint `>= page_count`, or the largest one when the page
/// count exceeds them all. `None` only for an empty breakpoint list.
pub fn select_breakpoint(breakpoints: &[u32], page_count: i64) -> Option<u32> {
    breakpoints
        .iter()
        .copied()
        .filter(|b| i64::from(*b) >= page_count)
        .min()
        .or_else(|| breakpoints.iter().copied().max())
}

/// Price one copy of a `page_count`-page product in `specification_id`.
pub fn price_for_pages(
    params: &NupPageRangeParams,
    specification_id: DbId,
    page_count: i64,
) -> Result<PageRangeBreakdown, CoreError> {
    if page_count <= 0 {
        return Err(CoreError::Validation(format!(
            "Page count must be greater than 0, got {page_count}"
        )));
    }

    let tier = select_breakpoint(&params.breakpoints, page_count).ok_or_else(|| {
        CoreError::MissingPrice("No page-count breakpoints are configured".to_string())
    })?;

    let base = params
        .tier_prices
        .iter()
        .find(|tp| tp.page_count == tier && tp.specification_id == specification_id)
        .map(|tp| tp.price)
        .ok_or_else(|| {
            CoreError::MissingPrice(format!(
                "No price for the {tier}-page tier and specification {specification_id}"
            ))
        })?;

    let overage_pages = (page_count - i64::from(tier)).max(0);
    let overage_price = amount::times(params.price_per_page, overage_pages)?;
    let unit_price = amount::add(base, overage_price)?;
    let nup = params
        .nup_factors
        .iter()
        .find(|f| f.specification_id == specification_id)
        .map(|f| f.nup);

    Ok(PageRangeBreakdown {
        page_count,
        tier_page_count: tier,
        tier_base_price: base,
        overage_pages,
        price_per_page: params.price_per_page,
        overage_price,
        nup,
        unit_price,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::pricing::strategy::{NupFactor, TierPrice};

    const SPEC: DbId = 11;

    fn tier(page_count: u32, price: i64) -> TierPrice {
        TierPrice {
            page_count,
            specification_id: SPEC,
            price: Decimal::from(price),
        }
    }

    /// Breakpoints 20/30/40/50/60, priced at 20 and 30 only, 500 per page.
    fn booklet() -> NupPageRangeParams {
        NupPageRangeParams {
            breakpoints: vec![20, 30, 40, 50, 60],
            tier_prices: vec![tier(20, 35_000), tier(30, 40_000)],
            price_per_page: Decimal::from(500),
            nup_factors: vec![],
        }
    }

    #[test]
    fn breakpoint_selection_rounds_up() {
        let bps = [20, 30, 40, 50, 60];
        assert_eq!(select_breakpoint(&bps, 1), Some(20));
        assert_eq!(select_breakpoint(&bps, 20), Some(20));
        assert_eq!(select_breakpoint(&bps, 21), Some(30));
        assert_eq!(select_breakpoint(&bps, 60), Some(60));
        assert_eq!(select_breakpoint(&bps, 61), Some(60));
        assert_eq!(select_breakpoint(&[], 10), None);
    }

    #[test]
    fn exact_breakpoint_has_no_overage() {
        let b = price_for_pages(&booklet(), SPEC, 20).unwrap();
        assert_eq!(b.unit_price, Decimal::from(35_000));
        assert_eq!(b.overage_pages, 0);
    }

    #[test]
    fn between_breakpoints_rounds_up_without_overage() {
        let b = price_for_pages(&booklet(), SPEC, 25).unwrap();
        assert_eq!(b.tier_page_count, 30);
        assert_eq!(b.overage_pages, 0);
        assert_eq!(b.unit_price, Decimal::from(40_000));
    }

    #[test]
    fn above_top_breakpoint_extrapolates() {
        let mut params = booklet();
        params.tier_prices.push(tier(60, 55_000));
        let b = price_for_pages(&params, SPEC, 65).unwrap();
        assert_eq!(b.tier_page_count, 60);
        assert_eq!(b.overage_pages, 5);
        assert_eq!(b.overage_price, Decimal::from(2_500));
        assert_eq!(b.unit_price, Decimal::from(57_500));
    }

    #[test]
    fn overage_overflow_is_rejected() {
        let mut params = booklet();
        params.tier_prices.push(tier(60, 55_000));
        params.price_per_page = Decimal::MAX;
        assert_matches!(
            price_for_pages(&params, SPEC, 62),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn missing_tier_price_fails() {
        // 35 pages rounds up to the unpriced 40-page tier.
        assert_matches!(
            price_for_pages(&booklet(), SPEC, 35),
            Err(CoreError::MissingPrice(_))
        );
        // Above 60 with no 60-page price.
        assert_matches!(
            price_for_pages(&booklet(), SPEC, 65),
            Err(CoreError::MissingPrice(_))
        );
    }

    #[test]
    fn missing_specification_price_fails() {
        assert_matches!(
            price_for_pages(&booklet(), SPEC + 1, 20),
            Err(CoreError::MissingPrice(_))
        );
    }

    #[test]
    fn non_positive_page_count_rejected() {
        assert_matches!(
            price_for_pages(&booklet(), SPEC, 0),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            price_for_pages(&booklet(), SPEC, -4),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn breakdown_reports_nup() {
        let mut params = booklet();
        params.nup_factors.push(NupFactor {
            specification_id: SPEC,
            nup: 4,
            weight: None,
        });
        let b = price_for_pages(&params, SPEC, 20).unwrap();
        assert_eq!(b.nup, Some(4));
    }
}
