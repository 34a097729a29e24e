//! The native window and the web surface inside it.
//!
//! `WebviewBridge` owns one winit window and one wry webview. Every window
//! operation is a no-op until [`run_app`](crate::run_app) has created them;
//! getters return `None` in that state.

use tracing::{debug, info, warn};
use velo_common::{decode_icon, PlatformError, WindowPosition, WindowSize};
use velo_tray::QuitHandle;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::window::{Fullscreen, Icon, Window, WindowLevel};
use wry::WebView;

use crate::ipc::{js_callback, js_receive, MessageReply};
use crate::outbox::Outbox;
use crate::scheme::platform_url;

mod handlers;
mod lifecycle;

/// Whether the window manager honours min/max size limits here.
pub fn supports_size_limits() -> bool {
    cfg!(any(
        target_os = "windows",
        target_os = "macos",
        target_os = "linux",
        target_os = "freebsd",
        target_os = "openbsd",
        target_os = "netbsd",
        target_os = "dragonfly"
    ))
}

pub struct WebviewBridge {
    // Field order is drop order: the webview must go before its window.
    pub(crate) webview: Option<WebView>,
    pub(crate) window: Option<Window>,
    scheme: String,
    current_url: String,
    outbox: Outbox,
    quit: QuitHandle,
}

impl WebviewBridge {
    /// A bridge with no window yet, serving `scheme`.
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            webview: None,
            window: None,
            scheme: scheme.into(),
            current_url: String::new(),
            outbox: Outbox::new(),
            quit: QuitHandle::new(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Whether the window and webview exist.
    pub fn is_attached(&self) -> bool {
        self.window.is_some() && self.webview.is_some()
    }

    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    fn with_window(&self, op: &str, f: impl FnOnce(&Window)) {
        match &self.window {
            Some(window) => f(window),
            None => debug!(op, "no window yet, ignored"),
        }
    }

    // =========================================================================
    // Script
    // =========================================================================

    /// Run `js` in the page. Fire and forget.
    pub fn eval(&self, js: &str) {
        match &self.webview {
            Some(webview) => {
                if let Err(e) = webview.evaluate_script(js) {
                    warn!("script evaluation failed: {e}");
                }
            }
            None => debug!("no webview yet, eval ignored"),
        }
    }

    /// Deliver `payload` to the page's `onMessage` listeners, holding it
    /// until the page has signalled it is ready.
    pub fn send_message(&mut self, payload: &serde_json::Value) {
        if let Some(script) = self.outbox.submit(js_receive(payload)) {
            self.eval(&script);
        }
    }

    /// Settle the page promise waiting on `id`.
    pub fn send_callback(&self, id: &str, result: &serde_json::Value) {
        self.eval(&js_callback(id, result));
    }

    pub fn reply(&self, reply: &MessageReply) {
        self.send_callback(&reply.id, &reply.result);
    }

    pub fn is_page_ready(&self) -> bool {
        self.outbox.is_ready()
    }

    pub fn pending_messages(&self) -> usize {
        self.outbox.pending()
    }

    pub(crate) fn mark_page_ready(&mut self) {
        if self.outbox.is_ready() {
            return;
        }
        let queued = self.outbox.mark_ready();
        debug!(queued = queued.len(), "page ready");
        for script in queued {
            self.eval(&script);
        }
    }

    pub(crate) fn page_navigating(&mut self, url: &str) {
        self.current_url = url.to_string();
        self.outbox.reset();
    }

    // =========================================================================
    // Window operations
    // =========================================================================

    pub fn set_title(&self, title: &str) {
        self.with_window("set_title", |w| w.set_title(title));
    }

    /// Set the client area size in logical pixels.
    pub fn set_size(&self, size: WindowSize) {
        self.with_window("set_size", |w| {
            let _ = w.request_inner_size(LogicalSize::new(size.width, size.height));
        });
    }

    pub fn set_min_size(&self, size: Option<WindowSize>) -> Result<(), PlatformError> {
        if !supports_size_limits() {
            return Err(PlatformError::NotSupported(
                "minimum window size on this platform".into(),
            ));
        }
        self.with_window("set_min_size", |w| {
            w.set_min_inner_size(size.map(|s| LogicalSize::new(s.width, s.height)));
        });
        Ok(())
    }

    pub fn set_max_size(&self, size: Option<WindowSize>) -> Result<(), PlatformError> {
        if !supports_size_limits() {
            return Err(PlatformError::NotSupported(
                "maximum window size on this platform".into(),
            ));
        }
        self.with_window("set_max_size", |w| {
            w.set_max_inner_size(size.map(|s| LogicalSize::new(s.width, s.height)));
        });
        Ok(())
    }

    /// Move the window's outer top-left corner, in physical pixels.
    pub fn set_position(&self, position: WindowPosition) {
        self.with_window("set_position", |w| {
            w.set_outer_position(PhysicalPosition::new(position.x, position.y));
        });
    }

    pub fn get_position(&self) -> Option<WindowPosition> {
        let position = self.window.as_ref()?.outer_position().ok()?;
        Some(WindowPosition::new(position.x, position.y))
    }

    /// Client area size in logical pixels.
    pub fn get_size(&self) -> Option<WindowSize> {
        let window = self.window.as_ref()?;
        let size = window.inner_size().to_logical::<u32>(window.scale_factor());
        Some(WindowSize::new(size.width, size.height))
    }

    pub fn show(&self) {
        self.with_window("show", |w| {
            w.set_visible(true);
            w.focus_window();
        });
    }

    pub fn hide(&self) {
        self.with_window("hide", |w| w.set_visible(false));
    }

    pub fn minimize(&self) {
        self.with_window("minimize", |w| w.set_minimized(true));
    }

    pub fn maximize(&self) {
        self.with_window("maximize", |w| w.set_maximized(true));
    }

    pub fn fullscreen(&self) {
        self.with_window("fullscreen", |w| {
            w.set_fullscreen(Some(Fullscreen::Borderless(None)));
        });
    }

    pub fn un_fullscreen(&self) {
        self.with_window("un_fullscreen", |w| w.set_fullscreen(None));
    }

    /// Undo a minimize, or failing that a maximize.
    pub fn restore(&self) {
        self.with_window("restore", |w| {
            if w.is_minimized() == Some(true) {
                w.set_minimized(false);
            } else if w.is_maximized() {
                w.set_maximized(false);
            }
        });
    }

    pub fn set_always_on_top(&self, on_top: bool) {
        self.with_window("set_always_on_top", |w| {
            w.set_window_level(if on_top {
                WindowLevel::AlwaysOnTop
            } else {
                WindowLevel::Normal
            });
        });
    }

    /// Window icon from raw image bytes. Undecodable bytes keep the
    /// current icon.
    pub fn set_icon(&self, bytes: &[u8]) {
        let image = match decode_icon(bytes) {
            Ok(image) => image,
            Err(e) => {
                warn!("window icon not changed: {e}");
                return;
            }
        };
        let (rgba, width, height) = image.into_parts();
        match Icon::from_rgba(rgba, width, height) {
            Ok(icon) => self.with_window("set_icon", |w| w.set_window_icon(Some(icon))),
            Err(e) => warn!("window icon not changed: {e}"),
        }
    }

    /// Navigate the page. URLs under the reserved scheme are rewritten to
    /// the form this platform's engine expects.
    pub fn set_url(&mut self, url: &str) {
        let Some(webview) = &self.webview else {
            debug!("no webview yet, set_url ignored");
            return;
        };
        let target = platform_url(url, &self.scheme);
        match webview.load_url(&target) {
            Ok(()) => {
                info!(url = %target, "navigating");
                self.current_url = target;
                self.outbox.reset();
            }
            Err(e) => warn!(url = %target, "navigation failed: {e}"),
        }
    }

    /// Destroy the webview and window and ask the loop to exit.
    pub fn close(&mut self) {
        self.teardown();
        self.terminate();
    }

    // =========================================================================
    // Loop control
    // =========================================================================

    /// Ask the event loop to exit. Does not wait for it.
    pub fn terminate(&self) {
        info!("terminate requested");
        self.quit.request();
    }

    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn window_operations_before_window_are_noops() {
        let mut bridge = WebviewBridge::new("velo");
        bridge.set_title("x");
        bridge.set_size(WindowSize::new(800, 600));
        bridge.set_position(WindowPosition::new(10, 10));
        bridge.show();
        bridge.hide();
        bridge.minimize();
        bridge.maximize();
        bridge.fullscreen();
        bridge.un_fullscreen();
        bridge.restore();
        bridge.set_always_on_top(true);
        bridge.set_url("velo://localhost/other.html");
        bridge.eval("1 + 1");
        bridge.send_callback("1", &json!(null));

        assert!(!bridge.is_attached());
        assert_eq!(bridge.get_position(), None);
        assert_eq!(bridge.get_size(), None);
        assert_eq!(bridge.current_url(), "");
    }

    #[test]
    fn size_limits_report_capability() {
        let bridge = WebviewBridge::new("velo");
        let result = bridge.set_min_size(Some(WindowSize::new(300, 200)));
        if supports_size_limits() {
            assert!(result.is_ok());
            assert!(bridge.set_max_size(None).is_ok());
        } else {
            assert!(matches!(result, Err(PlatformError::NotSupported(_))));
        }
    }

    #[test]
    fn bad_icon_bytes_are_tolerated() {
        let bridge = WebviewBridge::new("velo");
        bridge.set_icon(b"not an image");
        bridge.set_icon(&[]);
    }

    #[test]
    fn messages_wait_for_page_ready() {
        let mut bridge = WebviewBridge::new("velo");
        bridge.send_message(&json!({"n": 1}));
        bridge.send_message(&json!({"n": 2}));
        assert!(!bridge.is_page_ready());
        assert_eq!(bridge.pending_messages(), 2);

        bridge.mark_page_ready();
        assert!(bridge.is_page_ready());
        assert_eq!(bridge.pending_messages(), 0);

        bridge.page_navigating("velo://localhost/next.html");
        assert!(!bridge.is_page_ready());
        assert_eq!(bridge.current_url(), "velo://localhost/next.html");
        bridge.send_message(&json!({"n": 3}));
        assert_eq!(bridge.pending_messages(), 1);
    }

    #[test]
    fn terminate_and_close_request_quit() {
        let mut bridge = WebviewBridge::new("velo");
        let handle = bridge.quit_handle();
        bridge.close();
        bridge.close();
        assert!(handle.is_requested());
        assert!(!bridge.is_attached());
    }
}
