//! Null-safe numeric helpers
//!
//! Every helper maps NaN, infinities and missing operands to `None` so a bad
//! input degrades one field instead of leaking NaN into published values.

/// Keep a value only if it is a finite number
pub fn finite(x: Option<f64>) -> Option<f64> {
    x.filter(|v| v.is_finite())
}

/// Round half away from zero to `dp` decimal places
pub fn round_to(x: f64, dp: u32) -> Option<f64> {
    if !x.is_finite() {
        return None;
    }
    let factor = 10f64.powi(dp as i32);
    let rounded = (x * factor).round() / factor;
    rounded.is_finite().then_some(rounded)
}

/// Round to 2 decimal places
pub fn round2(x: f64) -> Option<f64> {
    round_to(x, 2)
}

/// `a / b`, or `None` if either side is missing, non-finite, or `b == 0`
pub fn safe_div(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let a = finite(a)?;
    let b = finite(b)?;
    if b == 0.0 {
        return None;
    }
    finite(Some(a / b))
}

/// Parse a number written in either Argentine (`1.312,000`) or plain
/// (`1312.0`) notation.
///
/// A comma marks the decimal separator, in which case dots are thousands
/// separators. Without a comma the text is parsed as-is. A trailing `%` is
/// ignored.
pub fn parse_ar_number(raw: &str) -> Option<f64> {
    let s = raw.trim().trim_end_matches('%').trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    let parsed = if s.contains(',') {
        s.replace('.', "").replace(',', ".").parse::<f64>()
    } else {
        s.parse::<f64>()
    };
    finite(parsed.ok())
}
