//! Text shaping for native menu strings and tooltips.

/// Longest tooltip the shell accepts, in UTF-16 code units. Windows stores
/// tooltips in a fixed 128-unit buffer including the terminator; the same
/// bound is applied everywhere so a tooltip looks the same on every platform.
pub const TOOLTIP_MAX_UTF16: usize = 127;

/// Join a label and its shortcut into the single display string the native
/// menu shows. Native menus right-align whatever follows the tab.
pub fn display_text(label: &str, shortcut: &str) -> String {
    if shortcut.is_empty() {
        label.to_string()
    } else {
        format!("{label}\t{shortcut}")
    }
}

/// Cut `text` to at most [`TOOLTIP_MAX_UTF16`] UTF-16 units without
/// splitting a character.
pub fn truncate_tooltip(text: &str) -> &str {
    let mut units = 0;
    for (idx, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > TOOLTIP_MAX_UTF16 {
            return &text[..idx];
        }
    }
    text
}
