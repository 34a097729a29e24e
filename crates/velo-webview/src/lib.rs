//! Native window hosting a web page, with an optional tray icon.
//!
//! [`run_app`] opens one window containing one webview and blocks until
//! quit. Loads under the reserved scheme become [`SchemeTask`]s handed to the
//! host; page script talks to the host through `window.__velo`.

pub mod app;
pub mod bridge;
pub mod command;
pub mod content;
pub mod events;
pub mod ipc;
pub mod outbox;
pub mod scheme;
pub mod shell;

pub use app::{run_app, AppOptions, DEFAULT_SCHEME};
pub use bridge::{supports_size_limits, WebviewBridge};
pub use command::{ShellCommand, ShellProxy, TrayCommand};
pub use content::AssetProvider;
pub use events::{DropEvent, EventQueue, PageLoadState, ShellEvent};
pub use ipc::{MessageReply, PageRequest};
pub use scheme::{SchemeResponse, SchemeTask};
pub use shell::{Shell, ShellHost};
