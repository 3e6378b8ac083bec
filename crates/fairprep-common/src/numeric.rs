//! Numeric text parsing and formatting.

/// Removes one layer of matching surrounding quotes (`"5"` or `'5'`).
pub fn strip_quotes(value: &str) -> &str {
    let trimmed = value.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

/// Parse a text cell as `f64`.
///
/// Accepts:
/// - plain numbers: "123", "-45.67", "1.5e3"
/// - surrounding whitespace or quotes: "  7 ", "\"7\""
/// - grouped thousands: "1,234,567.5"
/// - "inf" / "-inf"
///
/// Empty text and "nan" are missing, not numbers.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let cleaned = strip_quotes(value);
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("nan") {
        return None;
    }
    if let Ok(parsed) = cleaned.parse::<f64>() {
        return if parsed.is_nan() { None } else { Some(parsed) };
    }
    if has_thousands_groups(cleaned) {
        return cleaned.replace(',', "").parse::<f64>().ok();
    }
    None
}

fn has_thousands_groups(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    let integer_part = unsigned.split('.').next().unwrap_or_default();
    let mut groups = integer_part.split(',');
    let Some(head) = groups.next() else {
        return false;
    };
    if head.is_empty() || head.len() > 3 || !head.chars().all(|ch| ch.is_ascii_digit()) {
        return false;
    }
    let mut saw_group = false;
    for group in groups {
        if group.len() != 3 || !group.chars().all(|ch| ch.is_ascii_digit()) {
            return false;
        }
        saw_group = true;
    }
    saw_group
}

/// Formats a floating-point number without a trailing fractional zero.
///
/// Integral values print as integers ("1", "-20"), everything else uses the
/// shortest round-trip representation.
pub fn format_numeric(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
