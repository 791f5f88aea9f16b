/// Converts a price in major currency units to cents, rounding to the
/// nearest cent. Returns `None` for NaN, infinities, and amounts whose cent
/// value does not fit in an `i64`.
pub fn dollars_to_cents(amount: f64) -> Option<i64> {
    if !amount.is_finite() {
        return None;
    }
    let cents = (amount * 100.0).round();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if cents < i64::MIN as f64 || cents >= i64::MAX as f64 {
        return None;
    }
    Some(cents as i64)
}
