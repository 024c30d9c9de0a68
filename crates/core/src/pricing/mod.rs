//! Quote pricing: strategy resolution, calculation, and price rounding.
//!
//! Data flows one way:
//!
//! ```text
//! setting (pricing_type + params) --resolve--> PricingRule
//! PricingRule + OrderParams --calculate--> Calculation (raw unit price)
//! raw unit price --round_price / round_to_fixed_unit--> billed unit price
//! ```
//!
//! [`quote::build_quote`] runs the whole chain.

mod amount;
pub mod calculator;
pub mod page_range;
pub mod price_table;
pub mod quote;
pub mod rounding;
pub mod strategy;

pub use calculator::{calculate, Calculation, OrderParams, Sides};
pub use quote::{build_quote, Quote, RoundingMode};
pub use rounding::{
    normalize_tiers, round_price, round_price_in, round_to_fixed_unit, RoundingCategory,
    RoundingTable, RoundingTier,
};
pub use strategy::{resolve, PricingRule, PricingType};
