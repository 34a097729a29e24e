use tracing::{debug, warn};
use wry::http::StatusCode;
use wry::WebViewBuilder;

use crate::events::{DropEvent, EventQueue, PageLoadState, ShellEvent};
use crate::scheme::{matches_scheme, plain_response, SchemeTask};

use super::WebviewBridge;

// =============================================================================
// HANDLER ATTACHMENTS
// =============================================================================

impl WebviewBridge {
    pub(super) fn attach_ipc_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: EventQueue,
    ) -> WebViewBuilder<'a> {
        builder.with_ipc_handler(move |request| {
            let body = request.into_body();
            debug!(body_len = body.len(), "message from page");
            events.push(ShellEvent::PageMessage { body });
        })
    }

    pub(super) fn attach_page_load_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: EventQueue,
    ) -> WebViewBuilder<'a> {
        builder.with_on_page_load_handler(move |event, url| {
            let state = PageLoadState::from(event);
            debug!(?state, url = %url, "page load");
            events.push(ShellEvent::PageLoad { state, url });
        })
    }

    pub(super) fn attach_title_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: EventQueue,
    ) -> WebViewBuilder<'a> {
        builder.with_document_title_changed_handler(move |title| {
            debug!(title = %title, "title changed");
            events.push(ShellEvent::TitleChanged { title });
        })
    }

    /// File drops are reported to the host and never reach the engine, so
    /// a dropped file does not navigate the page away.
    pub(super) fn attach_drag_drop_handler<'a>(
        builder: WebViewBuilder<'a>,
        events: EventQueue,
    ) -> WebViewBuilder<'a> {
        builder.with_drag_drop_handler(move |event| {
            if let Some(event) = DropEvent::from_wry(event) {
                events.push(ShellEvent::DragDrop(event));
            }
            true
        })
    }

    /// Every load under `scheme` is paused and turned into a [`SchemeTask`].
    pub(super) fn attach_scheme_handler<'a>(
        builder: WebViewBuilder<'a>,
        scheme: &str,
        events: EventQueue,
    ) -> WebViewBuilder<'a> {
        let reserved = scheme.to_string();
        builder.with_asynchronous_custom_protocol(
            scheme.to_string(),
            move |_webview_id, request, responder| {
                let url = request.uri().to_string();
                if !matches_scheme(&url, &reserved) {
                    warn!(url = %url, "request routed to the scheme handler does not match it");
                    responder.respond(plain_response(StatusCode::NOT_FOUND, "not found"));
                    return;
                }
                let task = SchemeTask::new(request, move |response| responder.respond(response));
                debug!(task = %task.id(), url = %url, "scheme request intercepted");
                events.push(ShellEvent::SchemeRequest(task));
            },
        )
    }
}
