use super::*;
use crate::schema::SizeConfig;
use velo_common::MenuEntry;

fn error_text(config: &VeloConfig) -> String {
    match validate(config) {
        Err(ConfigError::ValidationError(msg)) => msg,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn default_config_is_valid() {
    assert!(validate(&VeloConfig::default()).is_ok());
}

#[test]
fn window_too_small_is_rejected() {
    let mut config = VeloConfig::default();
    config.window.width = 10;
    let msg = error_text(&config);
    assert!(msg.contains("window.width = 10"));
}

#[test]
fn min_larger_than_max_is_rejected() {
    let mut config = VeloConfig::default();
    config.window.min_size = Some(SizeConfig {
        width: 800,
        height: 600,
    });
    config.window.max_size = Some(SizeConfig {
        width: 640,
        height: 480,
    });
    let msg = error_text(&config);
    assert!(msg.contains("exceeds window.max_size"));
}

#[test]
fn reserved_scheme_is_rejected() {
    let mut config = VeloConfig::default();
    config.webview.scheme = "https".into();
    let msg = error_text(&config);
    assert!(msg.contains("cannot be intercepted"));
}

#[test]
fn malformed_scheme_is_rejected() {
    for scheme in ["", "1app", "My App", "APP"] {
        let mut config = VeloConfig::default();
        config.webview.scheme = scheme.into();
        let msg = error_text(&config);
        assert!(msg.contains("not a valid URL scheme"), "scheme {scheme:?}");
    }
}

#[test]
fn scheme_with_allowed_punctuation_is_valid() {
    let mut config = VeloConfig::default();
    config.webview.scheme = "app-v2.local+x".into();
    assert!(validate(&config).is_ok());
}

#[test]
fn empty_url_is_rejected() {
    let mut config = VeloConfig::default();
    config.webview.url = "   ".into();
    assert!(error_text(&config).contains("webview.url"));
}

#[test]
fn duplicate_menu_ids_across_submenus_are_rejected() {
    let mut config = VeloConfig::default();
    config.tray.menu = vec![
        MenuEntry::item("A").with_id(3),
        MenuEntry::submenu("More", vec![MenuEntry::item("B").with_id(3)]),
    ];
    assert!(error_text(&config).contains("id 3 is used more than once"));
}

#[test]
fn reserved_menu_id_is_rejected() {
    let mut config = VeloConfig::default();
    config.tray.menu = vec![MenuEntry::item("Root?").with_id(0)];
    assert!(error_text(&config).contains("reserved id 0"));
}

#[test]
fn all_errors_are_collected() {
    let mut config = VeloConfig::default();
    config.window.width = 1;
    config.window.height = 1;
    config.webview.scheme = "file".into();
    let msg = error_text(&config);
    assert!(msg.contains("window.width"));
    assert!(msg.contains("window.height"));
    assert!(msg.contains("\"file\""));
}
