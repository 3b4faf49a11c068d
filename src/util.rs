// Utility helpers for loose JSON fields and number formatting.
//
// The processed dataset is hand-assembled from scraped text, so numbers may
// arrive as strings and strings may arrive as anything. These helpers give
// the rest of the code typed values or `None`.
use num_format::{Locale, ToFormattedString};
use serde_json::Value;

/// Read a JSON value as an integer.
///
/// - Numbers are accepted if they are integral (`3` or `3.0`).
/// - Strings are trimmed and parsed (`" 03 "` -> `3`).
/// - Everything else, including `null`, is `None`.
pub fn value_to_i32(v: Option<&Value>) -> Option<i32> {
    match v? {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return i32::try_from(i).ok();
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
                Some(f as i32)
            } else {
                None
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<i32>().ok()
        }
        _ => None,
    }
}

/// Read a JSON value as text. Numbers are rendered so that a bare hour stored
/// as `8` still reads as `"8"`; `null` and containers are `None`.
pub fn value_to_string(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `en` thousands separators, e.g. `1,234.50`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
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
    // Counts in console messages, e.g. `9,855 records loaded`.
    n.to_formatted_string(&Locale::en)
}
