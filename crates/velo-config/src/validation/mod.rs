//! Full configuration validation.
//!
//! Validates window geometry, the intercepted scheme, and tray menu ids.
//! All problems are collected into one error so a user sees every issue
//! at once.

mod helpers;
#[cfg(test)]
mod tests;

use std::collections::HashSet;

use crate::schema::VeloConfig;
use helpers::{is_valid_scheme, validate_range, RESERVED_SCHEMES};
use velo_common::{ConfigError, MenuEntry};

const MIN_DIMENSION: u32 = 100;
const MAX_DIMENSION: u32 = 16384;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &VeloConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_window(config, &mut errors);
    validate_webview(config, &mut errors);
    validate_menu(&config.tray.menu, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_window(config: &VeloConfig, errors: &mut Vec<String>) {
    let window = &config.window;
    validate_range(errors, "window.width", window.width, MIN_DIMENSION, MAX_DIMENSION);
    validate_range(errors, "window.height", window.height, MIN_DIMENSION, MAX_DIMENSION);

    if let Some(min) = window.min_size {
        validate_range(errors, "window.min_size.width", min.width, 1, MAX_DIMENSION);
        validate_range(errors, "window.min_size.height", min.height, 1, MAX_DIMENSION);
    }
    if let Some(max) = window.max_size {
        validate_range(errors, "window.max_size.width", max.width, 1, MAX_DIMENSION);
        validate_range(errors, "window.max_size.height", max.height, 1, MAX_DIMENSION);
    }
    if let (Some(min), Some(max)) = (window.min_size, window.max_size) {
        if min.width > max.width || min.height > max.height {
            errors.push(format!(
                "window.min_size {}x{} exceeds window.max_size {}x{}",
                min.width, min.height, max.width, max.height
            ));
        }
    }
}

fn validate_webview(config: &VeloConfig, errors: &mut Vec<String>) {
    let webview = &config.webview;
    if webview.url.trim().is_empty() {
        errors.push("webview.url must not be empty".into());
    }
    if !is_valid_scheme(&webview.scheme) {
        errors.push(format!("webview.scheme {:?} is not a valid URL scheme", webview.scheme));
    } else if RESERVED_SCHEMES.contains(&webview.scheme.as_str()) {
        errors.push(format!(
            "webview.scheme {:?} is handled by the web engine and cannot be intercepted",
            webview.scheme
        ));
    }
}

/// Explicit menu ids must be non-zero and unique across the whole tree.
fn validate_menu(entries: &[MenuEntry], errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    collect_menu_ids(entries, &mut seen, errors);
}

fn collect_menu_ids(entries: &[MenuEntry], seen: &mut HashSet<u32>, errors: &mut Vec<String>) {
    for entry in entries {
        if let Some(id) = entry.id {
            if id.is_root() {
                errors.push(format!("tray.menu entry {:?} uses reserved id 0", entry.label));
            } else if !seen.insert(id.0) {
                errors.push(format!("tray.menu id {id} is used more than once"));
            }
        }
        if let Some(children) = &entry.submenu {
            collect_menu_ids(children, seen, errors);
        }
    }
}
