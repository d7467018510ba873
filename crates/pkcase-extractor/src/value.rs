//! Central value parsing
//!
//! Values are kept as text throughout extraction. These helpers recover a
//! number for aggregation: plain floats (`"0.32"`) and two-sided ranges
//! (`"1.5-2.5"`, `"10 to 20"`), the latter reduced to their midpoint.

fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

fn range_bounds(text: &str) -> Option<(f64, f64)> {
    let by_dash: Vec<&str> = text.split('-').collect();
    let parts = if by_dash.len() == 2 {
        by_dash
    } else {
        let by_word: Vec<&str> = text.split("to").collect();
        if by_word.len() != 2 {
            return None;
        }
        by_word
    };

    Some((parse_float(parts[0])?, parse_float(parts[1])?))
}

pub fn is_float(text: &str) -> bool {
    parse_float(text).is_some()
}

/// `a-b` or `a to b` with both bounds numeric
///
/// A single `-` decides the separator: `"a-b to c"` is not retried on `to`.
pub fn is_range(text: &str) -> bool {
    range_bounds(text).is_some()
}

pub fn range_midpoint(text: &str) -> Option<f64> {
    range_bounds(text).map(|(low, high)| (low + high) / 2.0)
}

/// Float value, or range midpoint when the text is a range
pub fn numeric_value(text: &str) -> Option<f64> {
    parse_float(text).or_else(|| range_midpoint(text))
}
