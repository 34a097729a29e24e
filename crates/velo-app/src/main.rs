mod cli;
mod host;
mod setup;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};
use velo_webview::AssetProvider;

const DEFAULT_LOG_DIRECTIVE: &str = "velo=info";

fn env_filter(directive: &str) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    match directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(e) => {
            eprintln!("invalid log level {directive:?}: {e}");
            filter.add_directive(LevelFilter::INFO.into())
        }
    }
}

fn main() {
    let args = cli::parse();

    // Logging starts before the config is read; the config's level takes
    // over afterwards unless `--log-level` was given.
    let initial = args.log_level.as_deref().unwrap_or(DEFAULT_LOG_DIRECTIVE);
    let (filter, filter_handle) = reload::Layer::<_, Registry>::new(env_filter(initial));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Velo v{} starting...", env!("CARGO_PKG_VERSION"));

    let loaded = setup::load(&args);
    if let Some(problem) = &loaded.problem {
        tracing::warn!("Config load failed, using defaults: {problem}");
    }
    if let Some(path) = &loaded.path {
        tracing::info!("Config path: {}", path.display());
    }
    tracing::debug!("Config: {}", velo_config::config_to_json(&loaded.config));
    if args.log_level.is_none() && loaded.config.logging.level != initial {
        let level = &loaded.config.logging.level;
        if let Err(e) = filter_handle.reload(env_filter(level)) {
            tracing::warn!("Log level {level} not applied: {e}");
        }
    }

    let options = setup::app_options(&loaded, &args);
    let assets_dir = setup::assets_dir(&loaded, &args);
    tracing::info!("Serving {}:// from {}", options.scheme, assets_dir.display());
    let tray = setup::build_tray(&loaded, &args, &assets_dir);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    let mut host = host::DemoHost::new(
        AssetProvider::new(assets_dir),
        runtime.handle().clone(),
        tray.is_some(),
    );

    tracing::info!("Entering event loop");
    if let Err(e) = velo_webview::run_app(options, tray, &mut host) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}
