//! Regex patterns shared by the cell rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Line breaks as emitted by the table detector inside a single cell
    pub static ref LINE_BREAK: Regex = Regex::new(r"\r\n|\r|\n").unwrap();

    // Straight and typographic double quotes
    pub static ref DOUBLE_QUOTES: Regex = Regex::new(r#"["\u{201C}\u{201D}]"#).unwrap();

    // Any whitespace, including non-breaking spaces
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Access key after cleaning: ASCII digits only
    pub static ref ACCESS_KEY: Regex = Regex::new(r"^[0-9]+$").unwrap();

    // Amount after locale normalization, e.g. "-1234.56"
    pub static ref PLAIN_DECIMAL: Regex = Regex::new(
        r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_decimal() {
        for ok in ["1234.56", "-10.00", "+3", "0.5", ".50", "45."] {
            assert!(PLAIN_DECIMAL.is_match(ok), "{ok}");
        }
        for bad in ["", "abc", "1.2.3", "1_000", "12a", "-", "1e5"] {
            assert!(!PLAIN_DECIMAL.is_match(bad), "{bad}");
        }
    }

    #[test]
    fn test_access_key_rejects_unicode_digits() {
        assert!(ACCESS_KEY.is_match("0123456789"));
        assert!(!ACCESS_KEY.is_match("١٢٣"));
        assert!(!ACCESS_KEY.is_match("12 34"));
    }
}
