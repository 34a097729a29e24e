//! Embedded web surface configuration.

use serde::{Deserialize, Serialize};

/// Settings for the web surface and its intercepted scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebviewConfig {
    /// First URL to load once the surface is up.
    pub url: String,
    /// Reserved scheme whose loads are routed to the host (`velo://...`).
    pub scheme: String,
    /// Enable dev tools (always on in debug builds).
    pub devtools: bool,
    pub user_agent: Option<String>,
    /// Path to a script injected into every document before page scripts.
    pub injected_script: Option<String>,
    /// Directory served under the reserved scheme, relative to the config
    /// file when not absolute.
    pub assets: Option<String>,
}

impl Default for WebviewConfig {
    fn default() -> Self {
        Self {
            url: "velo://localhost/index.html".into(),
            scheme: "velo".into(),
            devtools: cfg!(debug_assertions),
            user_agent: None,
            injected_script: None,
            assets: None,
        }
    }
}
