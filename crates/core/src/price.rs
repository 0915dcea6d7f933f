//! Price text normalization.
//!
//! Site price texts come in every shape (`"1.234,56 TL"`, `"₺499"`,
//! `"12,90"`). Normalization strips every non-digit and reads what is left
//! as a base-10 integer, so decimal separators are dropped along with
//! currency symbols: `"12,90"` becomes `1290`.

/// Value returned when the digit string cannot be represented.
pub const PRICE_PARSE_FAILED: i64 = -1;

/// Value returned when the text holds no digits at all.
pub const PRICE_MISSING: i64 = 0;

/// Convert raw price text to an integer.
///
/// Total over all inputs: never panics. Returns [`PRICE_MISSING`] when no
/// digit is present and [`PRICE_PARSE_FAILED`] when the digits overflow.
pub fn normalize(text: &str) -> i64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return PRICE_MISSING;
    }

    match digits.parse::<i64>() {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(price_text = text, error = %e, "price parse failed");
            PRICE_PARSE_FAILED
        }
    }
}

/// Whether a normalized price can take part in ranking.
pub fn is_rankable(price: i64) -> bool {
    price > 0
}
