//! Cell sanitizing: strips layout noise left by the table detector.

use crate::models::record::Anomaly;

use super::patterns::{ACCESS_KEY, DOUBLE_QUOTES, LINE_BREAK, WHITESPACE};

/// What an embedded line break turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineBreak {
    /// Join wrapped text with a single space ("01/01/2024\n10:00" -> "01/01/2024 10:00").
    Space,
    /// Join wrapped text directly, for values split mid-token.
    Remove,
}

impl LineBreak {
    fn replacement(self) -> &'static str {
        match self {
            LineBreak::Space => " ",
            LineBreak::Remove => "",
        }
    }
}

/// Clean a single raw cell. Absent cells become the empty string.
pub fn sanitize_cell(raw: Option<&str>, line_break: LineBreak) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    let joined = LINE_BREAK.replace_all(raw, line_break.replacement());
    let unquoted = DOUBLE_QUOTES.replace_all(&joined, "");
    unquoted.trim().to_string()
}

/// Clean an access key cell.
///
/// Returns the key as digits only, or an empty string for a blank cell.
/// Anything else is rejected whole: the caller leaves the field empty.
pub fn sanitize_access_key(raw: Option<&str>, max_len: usize) -> Result<String, Anomaly> {
    let cleaned = sanitize_cell(raw, LineBreak::Remove);
    let digits = WHITESPACE.replace_all(&cleaned, "");

    if digits.is_empty() {
        return Ok(String::new());
    }

    if ACCESS_KEY.is_match(&digits) && digits.len() <= max_len {
        Ok(digits.into_owned())
    } else {
        Err(Anomaly::InvalidAccessKey { raw: cleaned })
    }
}
