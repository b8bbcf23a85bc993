//! Lenient numeric parsing for form- and document-sourced values.

use serde_json::Value;

/// Parse a heterogeneous input value into a finite number.
///
/// Numbers pass through, `null` and anything non-scalar become `0`, strings
/// are parsed with locale disambiguation (see [`parse_number_str`]). Never
/// fails; malformed input is worth `0`, not an error.
pub fn parse_number_input(value: &Value) -> f64 {
    match value {
        Value::Number(number) => sanitize(number.as_f64().unwrap_or(0.0)),
        Value::String(text) => parse_number_str(text),
        _ => 0.0,
    }
}

/// Parse a human-entered numeric string.
///
/// Handles both `1.234,56` and `1,234.56` conventions: when both separators
/// appear, whichever comes later is the decimal point. A lone comma is a
/// thousands separator when it precedes exactly three digits after a
/// non-zero leading group, and a decimal point otherwise.
pub fn parse_number_str(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let mut normalized: String = trimmed.chars().filter(|ch| !ch.is_whitespace()).collect();
    let has_comma = normalized.contains(',');
    let has_dot = normalized.contains('.');

    if has_comma && has_dot {
        let last_comma = normalized.rfind(',').unwrap_or(0);
        let last_dot = normalized.rfind('.').unwrap_or(0);
        if last_comma > last_dot {
            // European style: dots group thousands, the comma is decimal.
            normalized = normalized.replace('.', "");
            normalized = normalized.replacen(',', ".", 1);
        } else {
            normalized = normalized.replace(',', "");
        }
    } else if has_comma {
        let parts: Vec<&str> = normalized.split(',').collect();
        if parts.len() > 2 {
            // Multiple commas can only be thousands separators.
            normalized = parts.concat();
        } else {
            let int_part = parts[0];
            let frac_part = parts.get(1).copied().unwrap_or("");
            let is_zero_int = int_part == "0";
            if frac_part.len() == 3 && !is_zero_int {
                normalized = format!("{int_part}{frac_part}");
            } else {
                normalized = format!("{int_part}.{frac_part}");
            }
        }
    }

    normalized.retain(|ch| ch.is_ascii_digit() || ch == '.' || ch == '-');

    match normalized.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => parsed,
        _ => 0.0,
    }
}

/// Map a non-finite numeric field to zero so downstream sums stay finite.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
