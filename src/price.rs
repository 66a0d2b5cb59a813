//! Price text normalization
//!
//! Menu pages render prices as free text (`"€ 8,50"`, `"12.00 €"`). Only
//! digits and decimal separators are kept; a comma is read as a decimal
//! point.

/// Placeholder substituted when price text cannot be parsed.
pub const SENTINEL_PRICE: f64 = 9999.99;

/// Parse price text into a number, or `None` when it is not a price.
pub fn try_parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// Parse price text, falling back to [`SENTINEL_PRICE`]. Never fails.
pub fn parse_price(text: &str) -> f64 {
    try_parse_price(text).unwrap_or(SENTINEL_PRICE)
}
