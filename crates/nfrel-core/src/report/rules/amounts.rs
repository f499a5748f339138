//! Amount parsing for Brazilian-formatted report values ("R$ 1.234,56").

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::cells::{sanitize_cell, LineBreak};
use super::patterns::{PLAIN_DECIMAL, WHITESPACE};

/// One deterministic text transform of the amount normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountStep {
    /// Generic cell cleaning, joining wrapped lines without a space.
    SanitizeCell,
    /// Drop the currency symbol wherever it appears.
    StripCurrency,
    /// Drop all whitespace, including non-breaking spaces.
    RemoveWhitespace,
    /// Drop every `.` thousands separator.
    RemoveThousandsSeparator,
    /// Turn the `,` decimal separator into `.`.
    DecimalCommaToPoint,
}

/// Normalization applied to amount cells, in order.
pub const BRL_NORMALIZATION: [AmountStep; 5] = [
    AmountStep::SanitizeCell,
    AmountStep::StripCurrency,
    AmountStep::RemoveWhitespace,
    AmountStep::RemoveThousandsSeparator,
    AmountStep::DecimalCommaToPoint,
];

impl AmountStep {
    fn apply(self, text: &str, currency_symbol: &str) -> String {
        match self {
            AmountStep::SanitizeCell => sanitize_cell(Some(text), LineBreak::Remove),
            AmountStep::StripCurrency if !currency_symbol.is_empty() => {
                text.replace(currency_symbol, "")
            }
            AmountStep::StripCurrency => text.to_string(),
            AmountStep::RemoveWhitespace => WHITESPACE.replace_all(text, "").into_owned(),
            AmountStep::RemoveThousandsSeparator => text.replace('.', ""),
            AmountStep::DecimalCommaToPoint => text.replace(',', "."),
        }
    }
}

/// Outcome of parsing one amount cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAmount {
    /// A valid amount.
    Value(Decimal),
    /// Absent cell, or nothing left after normalization.
    Blank,
    /// Text that is not a number after normalization.
    Invalid { cleaned: String },
}

impl ParsedAmount {
    /// The amount, or zero when parsing failed.
    pub fn value(&self) -> Decimal {
        match self {
            ParsedAmount::Value(v) => *v,
            _ => Decimal::ZERO,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParsedAmount::Value(_))
    }
}

/// Parser for locale-formatted amount cells.
#[derive(Debug, Clone)]
pub struct MonetaryParser {
    currency_symbol: String,
    steps: Vec<AmountStep>,
}

impl MonetaryParser {
    /// Create a parser for "R$" amounts.
    pub fn new() -> Self {
        Self {
            currency_symbol: "R$".to_string(),
            steps: BRL_NORMALIZATION.to_vec(),
        }
    }

    /// Set the currency symbol stripped from cells.
    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    /// The normalization steps, in application order.
    pub fn steps(&self) -> &[AmountStep] {
        &self.steps
    }

    /// Run the normalization pipeline on raw cell text.
    pub fn normalize(&self, raw: &str) -> String {
        self.steps
            .iter()
            .fold(raw.to_string(), |text, step| step.apply(&text, &self.currency_symbol))
    }

    /// Parse a raw amount cell.
    pub fn parse(&self, raw: Option<&str>) -> ParsedAmount {
        let Some(raw) = raw else {
            return ParsedAmount::Blank;
        };

        let cleaned = self.normalize(raw);
        if cleaned.is_empty() {
            return ParsedAmount::Blank;
        }

        if !PLAIN_DECIMAL.is_match(&cleaned) {
            return ParsedAmount::Invalid { cleaned };
        }

        match Decimal::from_str(&cleaned) {
            Ok(value) => ParsedAmount::Value(value),
            Err(_) => ParsedAmount::Invalid { cleaned },
        }
    }
}

impl Default for MonetaryParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a Brazilian-formatted amount (e.g., "R$ 1.234,56" or "45,00").
pub fn parse_brl_amount(s: &str) -> Option<Decimal> {
    match MonetaryParser::new().parse(Some(s)) {
        ParsedAmount::Value(v) => Some(v),
        _ => None,
    }
}

/// Format amount in Brazilian style (1.234,56), without currency symbol.
///
/// Halves round away from zero, as printed totals do.
pub fn format_brl_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let s = format!("{:.2}", rounded);
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let Some((integer_part, decimal_part)) = unsigned.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    format!("{}{},{}", sign, formatted, decimal_part)
}
