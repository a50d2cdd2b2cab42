use rust_decimal::{Decimal, RoundingStrategy};

/// Scale of monetary amounts in the target document.
pub const AMOUNT_SCALE: u32 = 2;

/// Scale of tax and adjustment percentages in the target document.
pub const PERCENT_SCALE: u32 = 2;

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a monetary amount to [`AMOUNT_SCALE`].
pub fn round_amount(value: Decimal) -> Decimal {
    round_half_up(value, AMOUNT_SCALE)
}

/// Round a percentage to [`PERCENT_SCALE`].
pub fn round_percent(value: Decimal) -> Decimal {
    round_half_up(value, PERCENT_SCALE)
}

/// `a * b / c`, or `None` if an intermediate result overflows or `c` is zero.
pub fn checked_mul_div(a: Decimal, b: Decimal, c: Decimal) -> Option<Decimal> {
    a.checked_mul(b)?.checked_div(c)
}
