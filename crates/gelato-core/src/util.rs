//! Shared utility functions used across multiple modules.

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Whether a string is empty once surrounding whitespace is removed.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Aggregation key for a flavour: trimmed and case-folded.
pub fn fold_flavour(flavour: &str) -> String {
    flavour.trim().to_lowercase()
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Round half-up to one decimal place.
pub fn round1(value: f64) -> f64 {
    round_to(value, 10.0)
}

/// Round half-up to two decimal places.
pub fn round2(value: f64) -> f64 {
    round_to(value, 100.0)
}

// Statistics are never negative, so `f64::round` (half away from zero)
// is half-up here.
fn round_to(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

/// Percentage of `part` in `whole`, rounded to one decimal; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        round1(part as f64 / whole as f64 * 100.0)
    }
}
