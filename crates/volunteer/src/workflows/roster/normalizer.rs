use crate::workflows::eligibility::levels::{is_unset, parse_float_prefix};

/// Strip byte-order marks and zero-width spaces that spreadsheet exports leave behind, then
/// trim.
pub(crate) fn normalize_cell(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}

/// Header text with inner whitespace collapsed so `學系 代碼` and `學系代碼` agree.
pub(crate) fn normalize_header(value: &str) -> String {
    normalize_cell(value).split_whitespace().collect::<Vec<_>>().join("")
}

/// Requirement cells: the dash placeholders and blanks mean "not required".
pub(crate) fn requirement_text(value: &str) -> Option<String> {
    if is_unset(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// Standard-table thresholds fall back to 0 when the cell is not numeric.
pub(crate) fn threshold(value: &str) -> f64 {
    match parse_float_prefix(value) {
        Some(parsed) if !parsed.is_nan() => parsed,
        _ => 0.0,
    }
}
