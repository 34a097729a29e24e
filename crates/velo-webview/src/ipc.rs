//! Script bridge between the page and the host.
//!
//! - **Page -> host**: `window.__velo.postMessage(value)` posts text through
//!   wry's `window.ipc`; objects are serialized as JSON first.
//!   `window.__velo.invoke(payload)` additionally returns a promise that the
//!   host settles with a [`MessageReply`].
//! - **Host -> page**: scripts built by [`js_callback`] and [`js_receive`] are
//!   evaluated in the page.

use serde::{Deserialize, Serialize};

/// Body the bridge script posts once the page can receive messages.
pub const READY_MESSAGE: &str = r#"{"__velo":"ready"}"#;

/// Injected before any page script runs.
pub const IPC_INIT_SCRIPT: &str = r#"
(function() {
    if (window.__velo) { return; }
    var nextId = 0;
    var listeners = [];
    window.__velo = {
        postMessage: function(msg) {
            window.ipc.postMessage(typeof msg === 'string' ? msg : JSON.stringify(msg));
        },
        invoke: function(payload) {
            var id = String(++nextId);
            return new Promise(function(resolve) {
                window.__velo.callbacks[id] = resolve;
                window.__velo.postMessage({ id: id, payload: payload === undefined ? null : payload });
            });
        },
        callbacks: {},
        _resolve: function(id, result) {
            var cb = window.__velo.callbacks[id];
            if (cb) {
                delete window.__velo.callbacks[id];
                cb(result);
            }
        },
        onMessage: function(listener) {
            listeners.push(listener);
        },
        receive: function(payload) {
            for (var i = 0; i < listeners.length; i++) {
                try { listeners[i](payload); } catch (e) { console.error(e); }
            }
        }
    };
    var ready = function() { window.ipc.postMessage('{"__velo":"ready"}'); };
    if (document.readyState === 'loading') {
        document.addEventListener('DOMContentLoaded', ready);
    } else {
        ready();
    }
})();
"#;

/// Answer to a page `invoke`, delivered to the matching promise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageReply {
    pub id: String,
    pub result: serde_json::Value,
}

impl MessageReply {
    pub fn new(id: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            result,
        }
    }
}

/// A message posted through `window.__velo.invoke`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRequest {
    pub id: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl PageRequest {
    /// Parse an invoke envelope. Plain `postMessage` text yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn reply(&self, result: serde_json::Value) -> MessageReply {
        MessageReply::new(self.id.clone(), result)
    }
}

pub fn is_ready_message(body: &str) -> bool {
    body == READY_MESSAGE
}

/// Script that settles the page promise waiting on `id`.
pub fn js_callback(id: &str, result: &serde_json::Value) -> String {
    format!(
        "window.__velo && window.__velo._resolve({}, {});",
        json_literal(&serde_json::Value::String(id.to_string())),
        json_literal(result),
    )
}

/// Script that hands `payload` to the page's `onMessage` listeners.
pub fn js_receive(payload: &serde_json::Value) -> String {
    format!(
        "window.__velo && window.__velo.receive({});",
        json_literal(payload)
    )
}

fn json_literal(value: &serde_json::Value) -> String {
    // U+2028/2029 are legal in JSON but end a statement in older engines.
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
