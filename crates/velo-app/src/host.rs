//! The demo host: serves the asset directory and reacts to the tray.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::runtime::Handle;
use velo_common::{ClickButton, MenuItemId};
use velo_webview::{
    AssetProvider, DropEvent, MessageReply, PageLoadState, PageRequest, SchemeTask, Shell,
    ShellHost,
};

pub const MENU_SHOW: MenuItemId = MenuItemId(1);
pub const MENU_HIDE: MenuItemId = MenuItemId(2);
pub const MENU_QUIT: MenuItemId = MenuItemId(99);

pub struct DemoHost {
    assets: Arc<AssetProvider>,
    runtime: Handle,
    /// Closing the window hides it instead while a tray icon is up.
    hide_on_close: bool,
}

impl DemoHost {
    pub fn new(assets: AssetProvider, runtime: Handle, hide_on_close: bool) -> Self {
        Self {
            assets: Arc::new(assets),
            runtime,
            hide_on_close,
        }
    }

    /// Answer a page `invoke`. Unknown commands get an error object.
    fn answer(&self, shell: &mut Shell, payload: &Value) -> Value {
        match payload.get("cmd").and_then(Value::as_str) {
            Some("version") => json!(env!("CARGO_PKG_VERSION")),
            Some("ping") => json!("pong"),
            Some("window.size") => match shell.bridge.get_size() {
                Some(size) => json!({ "width": size.width, "height": size.height }),
                None => Value::Null,
            },
            Some("tray.tooltip") => {
                let text = payload.get("text").and_then(Value::as_str).unwrap_or("");
                match shell.tray.as_mut() {
                    Some(tray) => {
                        tray.set_tooltip(text);
                        json!(true)
                    }
                    None => json!(false),
                }
            }
            Some("quit") => {
                shell.quit();
                json!(true)
            }
            other => json!({ "error": format!("unknown command {other:?}") }),
        }
    }
}

impl ShellHost for DemoHost {
    fn on_ready(&mut self, shell: &mut Shell) {
        tracing::info!("Shell ready at {}", shell.bridge.current_url());
        shell
            .bridge
            .send_message(&json!({ "event": "ready", "tray": shell.tray.is_some() }));
    }

    fn on_menu_click(&mut self, shell: &mut Shell, id: MenuItemId) {
        match id {
            MENU_SHOW => shell.bridge.show(),
            MENU_HIDE => shell.bridge.hide(),
            MENU_QUIT => shell.quit(),
            other => {
                tracing::debug!(id = %other, "menu item forwarded to page");
                shell.bridge.send_message(&json!({ "event": "menu", "id": other.0 }));
            }
        }
    }

    fn on_tray_click(&mut self, shell: &mut Shell, button: ClickButton) {
        if button == ClickButton::Left {
            shell.bridge.show();
        }
    }

    fn on_page_message(&mut self, shell: &mut Shell, text: &str) -> Option<MessageReply> {
        let Some(request) = PageRequest::from_json(text) else {
            tracing::debug!(len = text.len(), "page message");
            return None;
        };
        let result = self.answer(shell, &request.payload);
        Some(request.reply(result))
    }

    fn on_scheme_request(&mut self, _shell: &mut Shell, task: SchemeTask, url: &str) {
        tracing::debug!(url, "serving asset");
        let assets = Arc::clone(&self.assets);
        self.runtime.spawn_blocking(move || assets.serve(task));
    }

    fn on_page_load(&mut self, _shell: &mut Shell, state: PageLoadState, url: &str) {
        if state == PageLoadState::Finished {
            tracing::info!("Loaded {url}");
        }
    }

    fn on_drag_drop(&mut self, shell: &mut Shell, event: DropEvent) {
        if let DropEvent::Drop { paths, .. } = event {
            let paths: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            shell
                .bridge
                .send_message(&json!({ "event": "drop", "paths": paths }));
        }
    }

    fn on_close_requested(&mut self, shell: &mut Shell) -> bool {
        if self.hide_on_close && shell.tray.is_some() {
            tracing::info!("Window hidden to tray");
            shell.bridge.hide();
            return false;
        }
        true
    }

    fn on_exit(&mut self, _shell: &mut Shell) {
        tracing::info!("Shell exiting");
    }
}
