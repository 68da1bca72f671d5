//! Major/minor currency unit conversion.
//!
//! Prices travel through the cart as major-unit floats (`19.99`) and through
//! checkout, orders and the payment provider as integer minor units (`1999`).
//! The conversion happens once, here, using round-half-up on the decimal value
//! the float prints as, so `19.99` is always `1999` regardless of binary drift.

const MINOR_PER_MAJOR: i64 = 100;

/// Convert a major-unit amount to integer minor units.
///
/// Returns `None` for negative, non-finite or out-of-range amounts.
pub fn to_minor_units(major: f64) -> Option<i64> {
    if !major.is_finite() || major < 0.0 {
        return None;
    }

    // `Display` for f64 prints the shortest decimal that round-trips and never
    // uses exponent notation.
    let text = major.to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text.as_str(), ""),
    };

    let whole: i64 = whole.parse().ok()?;
    let mut digits = fraction.bytes().map(|b| i64::from(b - b'0'));
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().is_some_and(|d| d >= 5);

    whole
        .checked_mul(MINOR_PER_MAJOR)?
        .checked_add(tenths * 10 + hundredths)?
        .checked_add(i64::from(round_up))
}
