//! Overflow-checked price arithmetic.
//!
//! Quantities and page counts come straight from the request and configured
//! prices have no upper bound, so every product or sum that feeds a quote
//! goes through these helpers instead of the panicking operators.

use rust_decimal::Decimal;

use crate::error::CoreError;

fn out_of_range() -> CoreError {
    CoreError::Validation("Price out of range".to_string())
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> Result<Decimal, CoreError> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

pub(crate) fn add(a: Decimal, b: Decimal) -> Result<Decimal, CoreError> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub(crate) fn div(a: Decimal, b: Decimal) -> Result<Decimal, CoreError> {
    a.checked_div(b).ok_or_else(out_of_range)
}

/// `price * count` for an integer count such as a quantity or page count.
pub(crate) fn times(price: Decimal, count: i64) -> Result<Decimal, CoreError> {
    mul(price, Decimal::from(count))
}
