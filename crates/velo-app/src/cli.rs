use clap::Parser;

/// Velo: a web page in a native window, with a tray icon.
#[derive(Parser, Debug)]
#[command(name = "velo", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// First URL to load instead of the configured one.
    #[arg(long)]
    pub url: Option<String>,

    /// Directory served under the app scheme.
    #[arg(long)]
    pub assets: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Run without a tray icon.
    #[arg(long)]
    pub no_tray: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
