//! System tray controller: a status icon with an ID-addressed menu.
//!
//! The menu lives in a [`MenuForest`] owned by the [`TrayController`]; the
//! native icon is a projection of it behind the [`TrayBackend`] seam. The
//! controller can run its own event loop ([`TrayController::run_event_loop`])
//! or be driven by a host loop through [`TrayController::dispatch`].

pub mod backend;
pub mod controller;
pub mod event_loop;
pub mod events;
pub mod forest;
pub mod native;
pub mod quit;
pub mod template;
pub mod text;

pub use backend::TrayBackend;
pub use controller::TrayController;
pub use event_loop::TrayHost;
pub use events::TrayEvent;
pub use forest::{MenuForest, MenuNode, MenuSlot, NodeKind, Rejection};
pub use native::NativeTray;
pub use quit::QuitHandle;
pub use text::{display_text, truncate_tooltip, TOOLTIP_MAX_UTF16};
