//! The composed shell handed to host callbacks, and the host contract.

use tracing::{debug, info, warn};
use velo_common::{ClickButton, MenuItemId};
use velo_tray::{TrayController, TrayEvent};

use crate::bridge::WebviewBridge;
use crate::command::{ShellCommand, ShellProxy, TrayCommand};
use crate::events::{DropEvent, PageLoadState, ShellEvent};
use crate::ipc::{is_ready_message, MessageReply};
use crate::scheme::SchemeTask;

/// Host logic plugged into [`run_app`](crate::run_app).
///
/// Every callback runs on the event-loop thread. Only
/// [`on_scheme_request`](Self::on_scheme_request) is required: every task it
/// receives must eventually be finished, from any thread.
pub trait ShellHost {
    /// The window, webview and tray exist.
    fn on_ready(&mut self, _shell: &mut Shell) {}

    /// A leaf tray menu item was selected.
    fn on_menu_click(&mut self, _shell: &mut Shell, _id: MenuItemId) {}

    fn on_tray_click(&mut self, _shell: &mut Shell, _button: ClickButton) {}

    /// Text posted by page script. A returned reply settles the page's
    /// pending `invoke` promise with the same id.
    fn on_page_message(&mut self, _shell: &mut Shell, _text: &str) -> Option<MessageReply> {
        None
    }

    fn on_scheme_request(&mut self, shell: &mut Shell, task: SchemeTask, url: &str);

    fn on_page_load(&mut self, _shell: &mut Shell, _state: PageLoadState, _url: &str) {}

    fn on_title_changed(&mut self, _shell: &mut Shell, _title: &str) {}

    fn on_drag_drop(&mut self, _shell: &mut Shell, _event: DropEvent) {}

    /// The user asked to close the window. Return `false` to keep running,
    /// for example after hiding the window to the tray.
    fn on_close_requested(&mut self, _shell: &mut Shell) -> bool {
        true
    }

    /// The loop is about to return.
    fn on_exit(&mut self, _shell: &mut Shell) {}
}

/// Everything the host can drive from a callback.
pub struct Shell {
    pub bridge: WebviewBridge,
    pub tray: Option<TrayController>,
    proxy: ShellProxy,
}

impl Shell {
    pub fn new(bridge: WebviewBridge, tray: Option<TrayController>, proxy: ShellProxy) -> Self {
        Self {
            bridge,
            tray,
            proxy,
        }
    }

    /// A handle other threads can use to post commands to this shell.
    pub fn proxy(&self) -> ShellProxy {
        self.proxy.clone()
    }

    /// Ask the loop to exit.
    pub fn quit(&self) {
        self.bridge.terminate();
    }

    /// Whether the bridge or the tray has asked the loop to exit.
    pub fn quit_requested(&self) -> bool {
        self.bridge.quit_handle().is_requested()
            || self
                .tray
                .as_ref()
                .is_some_and(|tray| tray.quit_handle().is_requested())
    }

    /// Route one queued event to the host.
    pub fn dispatch<H: ShellHost + ?Sized>(&mut self, host: &mut H, event: ShellEvent) {
        match event {
            ShellEvent::PageMessage { body } => {
                self.bridge.mark_page_ready();
                if is_ready_message(&body) {
                    return;
                }
                if let Some(reply) = host.on_page_message(self, &body) {
                    self.bridge.reply(&reply);
                }
            }
            ShellEvent::SchemeRequest(task) => {
                let url = task.url();
                host.on_scheme_request(self, task, &url);
            }
            ShellEvent::PageLoad { state, url } => {
                if state == PageLoadState::Started {
                    self.bridge.page_navigating(&url);
                }
                host.on_page_load(self, state, &url);
            }
            ShellEvent::TitleChanged { title } => host.on_title_changed(self, &title),
            ShellEvent::DragDrop(event) => host.on_drag_drop(self, event),
            ShellEvent::Tray(event) => {
                let routed = self.tray.as_mut().and_then(|tray| tray.dispatch(event));
                match routed {
                    Some(TrayEvent::MenuItemActivated(id)) => {
                        debug!(%id, "tray menu click");
                        host.on_menu_click(self, id);
                    }
                    Some(TrayEvent::IconClicked(button)) => host.on_tray_click(self, button),
                    None => {}
                }
            }
        }
    }

    /// Run one command posted through a [`ShellProxy`].
    pub fn apply(&mut self, command: ShellCommand) {
        match command {
            ShellCommand::Eval(js) => self.bridge.eval(&js),
            ShellCommand::SetUrl(url) => self.bridge.set_url(&url),
            ShellCommand::SetTitle(title) => self.bridge.set_title(&title),
            ShellCommand::SetSize(size) => self.bridge.set_size(size),
            ShellCommand::SetPosition(position) => self.bridge.set_position(position),
            ShellCommand::SetMinSize(size) => {
                if let Err(e) = self.bridge.set_min_size(size) {
                    warn!("minimum size not applied: {e}");
                }
            }
            ShellCommand::SetMaxSize(size) => {
                if let Err(e) = self.bridge.set_max_size(size) {
                    warn!("maximum size not applied: {e}");
                }
            }
            ShellCommand::SetAlwaysOnTop(on_top) => self.bridge.set_always_on_top(on_top),
            ShellCommand::SendMessage(payload) => self.bridge.send_message(&payload),
            ShellCommand::Reply(reply) => self.bridge.reply(&reply),
            ShellCommand::Show => self.bridge.show(),
            ShellCommand::Hide => self.bridge.hide(),
            ShellCommand::Minimize => self.bridge.minimize(),
            ShellCommand::Maximize => self.bridge.maximize(),
            ShellCommand::Restore => self.bridge.restore(),
            ShellCommand::Fullscreen => self.bridge.fullscreen(),
            ShellCommand::UnFullscreen => self.bridge.un_fullscreen(),
            ShellCommand::Close => self.bridge.close(),
            ShellCommand::Tray(command) => self.apply_tray(command),
        }
    }

    fn apply_tray(&mut self, command: TrayCommand) {
        let Some(tray) = self.tray.as_mut() else {
            debug!(?command, "no tray, command ignored");
            return;
        };
        match command {
            TrayCommand::SetIcon(bytes) => tray.set_icon(&bytes),
            TrayCommand::SetTooltip(text) => tray.set_tooltip(&text),
            TrayCommand::SetTitle(text) => tray.set_title(&text),
            TrayCommand::SetItemLabel(id, text) => tray.set_item_label(id, &text),
            TrayCommand::SetItemChecked(id, checked) => tray.set_item_checked(id, checked),
            TrayCommand::SetItemDisabled(id, disabled) => tray.set_item_disabled(id, disabled),
        }
    }

    /// Remove the tray icon and destroy the window. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if let Some(tray) = self.tray.as_mut() {
            tray.shutdown();
        }
        self.bridge.teardown();
        info!("shell shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::READY_MESSAGE;
    use crate::scheme::SchemeResponse;
    use serde_json::json;
    use std::sync::mpsc;
    use velo_common::WindowSize;
    use velo_tray::QuitHandle;
    use wry::http::Request;

    #[derive(Default)]
    struct RecordingHost {
        messages: Vec<String>,
        urls: Vec<String>,
        loads: Vec<(PageLoadState, String)>,
        drops: Vec<DropEvent>,
        titles: Vec<String>,
    }

    impl ShellHost for RecordingHost {
        fn on_page_message(&mut self, _shell: &mut Shell, text: &str) -> Option<MessageReply> {
            self.messages.push(text.to_string());
            crate::ipc::PageRequest::from_json(text).map(|req| req.reply(json!("pong")))
        }

        fn on_scheme_request(&mut self, _shell: &mut Shell, mut task: SchemeTask, url: &str) {
            self.urls.push(url.to_string());
            task.set_response_meta(200, "text/plain", "");
            task.append_data(url.as_bytes());
            task.finish();
        }

        fn on_page_load(&mut self, _shell: &mut Shell, state: PageLoadState, url: &str) {
            self.loads.push((state, url.to_string()));
        }

        fn on_title_changed(&mut self, _shell: &mut Shell, title: &str) {
            self.titles.push(title.to_string());
        }

        fn on_drag_drop(&mut self, _shell: &mut Shell, event: DropEvent) {
            self.drops.push(event);
        }
    }

    fn shell() -> (Shell, mpsc::Receiver<ShellCommand>) {
        let bridge = WebviewBridge::new("velo");
        let (proxy, rx) = ShellProxy::new(bridge.quit_handle());
        (Shell::new(bridge, None, proxy), rx)
    }

    fn scheme_event(url: &str) -> (ShellEvent, mpsc::Receiver<SchemeResponse>) {
        let (tx, rx) = mpsc::channel();
        let request = Request::builder().uri(url).body(Vec::new()).unwrap();
        let task = SchemeTask::new(request, move |response| {
            let _ = tx.send(response);
        });
        (ShellEvent::SchemeRequest(task), rx)
    }

    #[test]
    fn scheme_request_reaches_host_and_finishes_once() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        let (event, responses) = scheme_event("velo://localhost/app.js");

        shell.dispatch(&mut host, event);

        assert_eq!(host.urls, vec!["velo://localhost/app.js".to_string()]);
        let response = responses.try_recv().unwrap();
        assert_eq!(response.body().as_ref(), b"velo://localhost/app.js");
        assert!(responses.try_recv().is_err());
    }

    #[test]
    fn ready_message_is_consumed_by_the_bridge() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        shell.bridge.send_message(&json!("queued"));
        assert_eq!(shell.bridge.pending_messages(), 1);

        shell.dispatch(
            &mut host,
            ShellEvent::PageMessage {
                body: READY_MESSAGE.into(),
            },
        );

        assert!(host.messages.is_empty());
        assert!(shell.bridge.is_page_ready());
        assert_eq!(shell.bridge.pending_messages(), 0);
    }

    #[test]
    fn first_page_message_also_marks_ready() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        shell.dispatch(&mut host, ShellEvent::PageMessage { body: "hi".into() });
        assert_eq!(host.messages, vec!["hi".to_string()]);
        assert!(shell.bridge.is_page_ready());
    }

    #[test]
    fn navigation_start_resets_readiness() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        shell.dispatch(&mut host, ShellEvent::PageMessage { body: "hi".into() });
        shell.dispatch(
            &mut host,
            ShellEvent::PageLoad {
                state: PageLoadState::Started,
                url: "velo://localhost/two.html".into(),
            },
        );
        assert!(!shell.bridge.is_page_ready());
        assert_eq!(shell.bridge.current_url(), "velo://localhost/two.html");
        assert_eq!(host.loads.len(), 1);
    }

    #[test]
    fn title_and_drop_events_are_forwarded() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        shell.dispatch(&mut host, ShellEvent::TitleChanged { title: "Doc".into() });
        shell.dispatch(&mut host, ShellEvent::DragDrop(DropEvent::Leave));
        assert_eq!(host.titles, vec!["Doc".to_string()]);
        assert_eq!(host.drops, vec![DropEvent::Leave]);
    }

    #[test]
    fn tray_events_without_tray_are_ignored() {
        let (mut shell, _rx) = shell();
        let mut host = RecordingHost::default();
        shell.dispatch(
            &mut host,
            ShellEvent::Tray(TrayEvent::MenuItemActivated(MenuItemId(1))),
        );
        shell.apply(ShellCommand::Tray(TrayCommand::SetTooltip("x".into())));
    }

    #[test]
    fn commands_without_window_are_harmless() {
        let (mut shell, rx) = shell();
        let proxy = shell.proxy();
        proxy.eval("x()");
        proxy.send(ShellCommand::Show);
        proxy.send_message(json!(1));
        for command in rx.try_iter() {
            shell.apply(command);
        }
        assert_eq!(shell.bridge.pending_messages(), 1);
    }

    #[test]
    fn window_commands_apply_without_a_window() {
        let (mut shell, rx) = shell();
        let proxy = shell.proxy();
        for command in [
            ShellCommand::Fullscreen,
            ShellCommand::UnFullscreen,
            ShellCommand::SetAlwaysOnTop(true),
            ShellCommand::SetMinSize(Some(WindowSize::new(320, 240))),
            ShellCommand::SetMaxSize(None),
        ] {
            proxy.send(command);
        }
        for command in rx.try_iter() {
            shell.apply(command);
        }
        assert!(!shell.quit_requested());

        proxy.send(ShellCommand::Close);
        for command in rx.try_iter() {
            shell.apply(command);
        }
        assert!(shell.quit_requested());
        assert!(!shell.bridge.is_attached());
    }

    #[test]
    fn quit_through_bridge_or_proxy() {
        let (shell, _rx) = shell();
        assert!(!shell.quit_requested());
        shell.proxy().quit();
        assert!(shell.quit_requested());

        let (shell, _rx) = {
            let bridge = WebviewBridge::new("velo");
            let (proxy, rx) = ShellProxy::new(QuitHandle::new());
            (Shell::new(bridge, None, proxy), rx)
        };
        shell.quit();
        assert!(shell.quit_requested());
    }

    #[test]
    fn shutdown_twice_is_safe() {
        let (mut shell, _rx) = shell();
        shell.shutdown();
        shell.shutdown();
        assert!(!shell.bridge.is_attached());
    }
}
