//! Money helpers.
//!
//! Amounts are integer minor units ([`Cents`]) everywhere inside the system.
//! Conversion to decimal major units only happens at the edges (gateway
//! payloads, display strings).

use crate::error::CoreError;
use crate::types::Cents;

/// The only currency the marketplace sells in.
pub const CURRENCY: &str = "BRL";

/// Lowest/highest accepted commission rate, in percent.
pub const MIN_COMMISSION_RATE: f64 = 0.0;
pub const MAX_COMMISSION_RATE: f64 = 100.0;

/// Commission credited to an affiliate for a sale.
///
/// `rate` is a percentage (`10.0` means 10%). The result is rounded to the
/// nearest cent, half away from zero.
pub fn compute_commission(amount: Cents, rate: f64) -> Cents {
    (amount as f64 * rate / 100.0).round() as Cents
}

/// Validate a commission rate expressed in percent.
pub fn validate_commission_rate(rate: f64) -> Result<(), CoreError> {
    if !rate.is_finite() || !(MIN_COMMISSION_RATE..=MAX_COMMISSION_RATE).contains(&rate) {
        return Err(CoreError::Validation(format!(
            "Commission rate must be between {MIN_COMMISSION_RATE} and {MAX_COMMISSION_RATE}"
        )));
    }
    Ok(())
}

/// Validate a course price.
pub fn validate_price(price: Cents) -> Result<(), CoreError> {
    if price < 0 {
        return Err(CoreError::Validation("Price must not be negative".into()));
    }
    Ok(())
}

/// Render cents as a decimal string with two fraction digits (`29700` -> `"297.00"`).
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Convert cents to a decimal major-unit amount for gateway requests.
pub fn major_from_cents(amount: Cents) -> f64 {
    amount as f64 / 100.0
}
