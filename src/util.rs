// Utility helpers for parsing and basic statistics.
//
// This module centralizes the lenient number handling for uploaded tables so
// the rest of the code can assume clean, typed values.
use crate::types::Cell;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in spreadsheet exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (so `NaN`, `inf` and
///   unit suffixes like `12mm` never become numbers).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok()
}

/// Classify one raw text field from a delimited file.
pub fn parse_cell(s: &str) -> Cell {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match parse_f64_safe(Some(trimmed)) {
        Some(v) => Cell::Number(v),
        None => Cell::Text(trimmed.to_string()),
    }
}

/// Whole-number view of a float; `None` for fractional values like `201401.5`.
pub fn as_integer(v: f64) -> Option<i64> {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// `{:.1}` without thousands separators, as consumed by R.
pub fn format_one_decimal(v: f64) -> String {
    format!("{:.1}", v)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234.5`).
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `1,320 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lenient_numbers() {
        assert_eq!(parse_f64_safe(Some(" 36.9 ")), Some(36.9));
        assert_eq!(parse_f64_safe(Some("1,234.5")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("-7.4")), Some(-7.4));
        assert_eq!(parse_f64_safe(Some("12mm")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn classifies_cells() {
        assert_eq!(parse_cell("201401"), Cell::Number(201401.0));
        assert_eq!(parse_cell("   "), Cell::Empty);
        assert_eq!(parse_cell("n/a"), Cell::Text("n/a".to_string()));
    }

    #[test]
    fn integers_only_when_whole() {
        assert_eq!(as_integer(201401.0), Some(201401));
        assert_eq!(as_integer(-3.0), Some(-3));
        assert_eq!(as_integer(201401.5), None);
        assert_eq!(as_integer(f64::NAN), None);
    }

    #[test]
    fn formats_numbers() {
        assert_eq!(format_one_decimal(39.1455), "39.1");
        assert_eq!(format_one_decimal(-11.9727), "-12.0");
        assert_eq!(format_one_decimal(5.0), "5.0");
        assert_eq!(format_number(1234.56, 1), "1,234.6");
        assert_eq!(format_number(-7.44, 1), "-7.4");
        assert_eq!(format_int(1320usize), "1,320");
    }
}
