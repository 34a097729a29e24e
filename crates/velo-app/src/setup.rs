//! Turning config and CLI flags into what `run_app` needs.

use std::path::{Path, PathBuf};

use velo_common::{MenuItemId, WindowSize};
use velo_config::schema::SizeConfig;
use velo_config::{resolve_relative, VeloConfig};
use velo_tray::TrayController;
use velo_webview::AppOptions;

use crate::cli::Args;

/// Config plus the file it came from, for resolving relative paths.
pub struct Loaded {
    pub config: VeloConfig,
    pub path: Option<PathBuf>,
    /// Why the defaults are in use, when loading failed.
    pub problem: Option<String>,
}

impl Loaded {
    /// Resolve a path written in the config file.
    pub fn resolve(&self, value: &str) -> PathBuf {
        match &self.path {
            Some(path) => resolve_relative(path, value),
            None => PathBuf::from(value),
        }
    }

    fn read(&self, what: &str, value: &str) -> Option<Vec<u8>> {
        let path = self.resolve(value);
        match std::fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!("{what} {} unreadable: {e}", path.display());
                None
            }
        }
    }
}

/// Load the config named by `--config`, or the default one. Failures fall
/// back to defaults and are kept in [`Loaded::problem`].
pub fn load(args: &Args) -> Loaded {
    let (result, path) = match &args.config {
        Some(raw) => {
            let path = PathBuf::from(raw);
            (velo_config::load_from_path(&path), Some(path))
        }
        None => (
            velo_config::load_config(),
            velo_config::default_config_path().ok(),
        ),
    };
    match result {
        Ok(config) => Loaded {
            config,
            path,
            problem: None,
        },
        Err(e) => Loaded {
            config: VeloConfig::default(),
            path,
            problem: Some(e.to_string()),
        },
    }
}

fn window_size(size: &SizeConfig) -> WindowSize {
    WindowSize::new(size.width, size.height)
}

pub fn app_options(loaded: &Loaded, args: &Args) -> AppOptions {
    let window = &loaded.config.window;
    let webview = &loaded.config.webview;

    let mut options = AppOptions::new(
        args.url.as_deref().unwrap_or(&webview.url),
        &window.title,
        window.width,
        window.height,
    )
    .with_scheme(&webview.scheme);

    options.min_size = window.min_size.as_ref().map(window_size);
    options.max_size = window.max_size.as_ref().map(window_size);
    options.always_on_top = window.always_on_top;
    options.start_hidden = window.start_hidden;
    options.devtools = webview.devtools || cfg!(debug_assertions);
    options.user_agent = webview.user_agent.clone();
    options.icon = window
        .icon
        .as_deref()
        .and_then(|icon| loaded.read("window icon", icon));
    options.injected_script = webview.injected_script.as_deref().and_then(|script| {
        loaded
            .read("injected script", script)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    });
    options
}

/// Directory served under the app scheme.
pub fn assets_dir(loaded: &Loaded, args: &Args) -> PathBuf {
    if let Some(dir) = &args.assets {
        return PathBuf::from(dir);
    }
    match &loaded.config.webview.assets {
        Some(dir) => loaded.resolve(dir),
        None => PathBuf::from("assets"),
    }
}

/// Build the tray model from config. The native icon appears once the loop
/// starts.
pub fn build_tray(loaded: &Loaded, args: &Args, assets: &Path) -> Option<TrayController> {
    let config = &loaded.config.tray;
    if args.no_tray || !config.enabled {
        tracing::info!("Tray disabled");
        return None;
    }

    let mut tray = TrayController::new();
    tray.initialize();

    let icon = match &config.icon {
        Some(icon) => loaded.read("tray icon", icon),
        None => std::fs::read(assets.join("icon.png")).ok(),
    };
    if let Some(bytes) = icon {
        tray.set_icon(&bytes);
    }
    tray.set_icon_as_template(config.icon_as_template);
    tray.set_tooltip(&config.tooltip);
    if let Some(title) = &config.title {
        tray.set_title(title);
    }
    let ids = tray.apply_menu(MenuItemId::ROOT, &config.menu);
    tracing::info!("Tray menu built ({} items)", ids.len());
    Some(tray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["velo"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn loaded_from(toml: &str) -> (tempfile::TempDir, Loaded) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();
        let config = velo_config::load_from_path(&path).unwrap();
        (
            dir,
            Loaded {
                config,
                path: Some(path),
                problem: None,
            },
        )
    }

    #[test]
    fn unreadable_config_falls_back_with_problem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[window\n").unwrap();
        let loaded = load(&args(&["--config", path.to_str().unwrap()]));
        assert!(loaded.problem.is_some());
        assert_eq!(loaded.config.window.title, "Velo");
        assert_eq!(loaded.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn invalid_config_values_fall_back_with_problem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[window]\ntitle = \"Mine\"\nwidth = 5\n").unwrap();
        let loaded = load(&args(&["--config", path.to_str().unwrap()]));
        let problem = loaded.problem.unwrap();
        assert!(problem.contains("window.width"), "{problem}");
        assert_eq!(loaded.config.window.title, "Velo");
    }

    #[test]
    fn options_follow_config() {
        let (_dir, loaded) = loaded_from(
            r#"
[window]
title = "Notes"
width = 800
height = 600
min_size = { width = 400, height = 300 }
start_hidden = true

[webview]
url = "app://localhost/notes.html"
scheme = "app"
"#,
        );
        let options = app_options(&loaded, &args(&[]));
        assert_eq!(options.title, "Notes");
        assert_eq!((options.width, options.height), (800, 600));
        assert_eq!(options.min_size, Some(WindowSize::new(400, 300)));
        assert!(options.start_hidden);
        assert_eq!(options.scheme, "app");
        assert_eq!(options.url, "app://localhost/notes.html");
    }

    #[test]
    fn url_flag_overrides_config() {
        let (_dir, loaded) = loaded_from("");
        let options = app_options(&loaded, &args(&["--url", "https://example.com"]));
        assert_eq!(options.url, "https://example.com");
    }

    #[test]
    fn injected_script_is_read_relative_to_config() {
        let (dir, loaded) = loaded_from(
            r#"
[webview]
injected_script = "inject.js"
"#,
        );
        std::fs::write(dir.path().join("inject.js"), "window.injected = true;").unwrap();
        let options = app_options(&loaded, &args(&[]));
        assert_eq!(
            options.injected_script.as_deref(),
            Some("window.injected = true;")
        );
    }

    #[test]
    fn missing_files_are_skipped() {
        let (_dir, loaded) = loaded_from(
            r#"
[window]
icon = "missing.ico"
"#,
        );
        let options = app_options(&loaded, &args(&[]));
        assert!(options.icon.is_none());
    }

    #[test]
    fn assets_dir_precedence() {
        let (dir, loaded) = loaded_from(
            r#"
[webview]
assets = "site"
"#,
        );
        assert_eq!(assets_dir(&loaded, &args(&[])), dir.path().join("site"));
        assert_eq!(
            assets_dir(&loaded, &args(&["--assets", "/srv/www"])),
            PathBuf::from("/srv/www")
        );
    }

    #[test]
    fn tray_built_from_default_menu() {
        let (dir, loaded) = loaded_from("");
        let tray = build_tray(&loaded, &args(&[]), dir.path()).unwrap();
        assert!(tray.is_initialized());
        assert!(!tray.has_native_icon());
        assert_eq!(tray.tooltip(), Some("Velo"));
        assert_eq!(tray.item(99u32).unwrap().label, "Quit");
        assert_eq!(tray.item(1u32).unwrap().label, "Show Window");
    }

    #[test]
    fn tray_template_icon_follows_config() {
        let (dir, loaded) = loaded_from("[tray]\nicon_as_template = true\n");
        let tray = build_tray(&loaded, &args(&[]), dir.path()).unwrap();
        assert!(tray.icon_as_template());
    }

    #[test]
    fn no_tray_flag_or_config_disables_tray() {
        let (dir, loaded) = loaded_from("");
        assert!(build_tray(&loaded, &args(&["--no-tray"]), dir.path()).is_none());

        let (dir, loaded) = loaded_from("[tray]\nenabled = false\n");
        assert!(build_tray(&loaded, &args(&[]), dir.path()).is_none());
    }
}
