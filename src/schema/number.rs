//! Amount cleaning and coercion.
//!
//! Investment and settlement figures arrive as locale-formatted OCR text:
//! thousands separators (half- or full-width), unit suffixes (万元/元),
//! full-width digits. Coercion folds these away, parses, and rounds to two
//! decimal places; unparsable text degrades to the original string rather
//! than aborting the document.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::model::AttrValue;

static UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[万元]").unwrap());
static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(?:\.\d+)?%$").unwrap());
static AMOUNT_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[\d,，]+(?:[.．]\d+)?$").unwrap());

/// Round to two decimal places (the declared precision of settlement and
/// amount fields).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Strip separators, units, and width variants from a raw amount string.
pub fn clean_amount(raw: &str) -> String {
    let folded: String = raw.nfkc().collect();
    let no_units = UNIT_RE.replace_all(&folded, "");
    no_units
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}

/// Parse a raw amount cell into a number, degrading to the verbatim text
/// when the cell is not numeric.
pub fn coerce_amount(raw: &str) -> AttrValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return AttrValue::Text(String::new());
    }
    let cleaned = clean_amount(trimmed);
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => AttrValue::Number(round2(value)),
        _ => {
            log::debug!("number: kept non-numeric amount {:?}", trimmed);
            AttrValue::Text(trimmed.to_string())
        }
    }
}

/// Check whether a token is a signed percentage string such as `-28.03%`.
///
/// The final-account pipeline preserves these verbatim (positive = under
/// budget); recognition only drives row splitting.
pub fn is_signed_percent(token: &str) -> bool {
    PERCENT_RE.is_match(&token.nfkc().collect::<String>())
}

/// Check whether a token looks like a (possibly signed) currency amount.
pub fn is_amount_token(token: &str) -> bool {
    let folded: String = token.nfkc().collect();
    AMOUNT_TOKEN_RE.is_match(&folded) && folded.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("1,234.56万元"), "1234.56");
        assert_eq!(clean_amount("１，２３４．５"), "1234.5");
        assert_eq!(clean_amount(" 12 345 "), "12345");
    }

    #[test]
    fn test_coerce_amount_rounds_two_places() {
        assert_eq!(coerce_amount("1234.567").as_number(), Some(1234.57));
        assert_eq!(coerce_amount("98,765万元").as_number(), Some(98765.0));
    }

    #[test]
    fn test_coerce_amount_keeps_text_on_failure() {
        let v = coerce_amount("按实结算");
        assert_eq!(v.as_text(), Some("按实结算"));
    }

    #[test]
    fn test_coerce_empty() {
        assert_eq!(coerce_amount("  ").as_text(), Some(""));
    }

    #[test]
    fn test_signed_percent() {
        assert!(is_signed_percent("-28.03%"));
        assert!(is_signed_percent("5%"));
        assert!(!is_signed_percent("28.03"));
        assert!(!is_signed_percent("百分之五"));
    }

    #[test]
    fn test_amount_token() {
        assert!(is_amount_token("-1,234.56"));
        assert!(is_amount_token("300"));
        assert!(!is_amount_token("ZB-001"));
        assert!(!is_amount_token("工程"));
    }
}
