//! Shared validation helpers.

/// Push an error if `value` is outside `[min, max]`.
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Schemes the web engine already owns; intercepting them would break
/// ordinary page loads.
pub(crate) const RESERVED_SCHEMES: &[&str] = &[
    "http", "https", "file", "about", "data", "blob", "ws", "wss", "javascript", "ftp",
];

/// RFC 3986 scheme syntax, restricted to lowercase so it matches how the
/// engines normalize it.
pub(crate) fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '-' | '.'))
}
