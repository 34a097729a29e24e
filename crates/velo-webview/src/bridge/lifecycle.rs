use tracing::{debug, info, warn};
use velo_common::{decode_icon, VeloError};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Icon, Window, WindowAttributes, WindowLevel};
use wry::{WebView, WebViewBuilder};

use crate::app::AppOptions;
use crate::events::EventQueue;
use crate::ipc::IPC_INIT_SCRIPT;
use crate::scheme::platform_url;

use super::WebviewBridge;

fn window_attributes(options: &AppOptions) -> WindowAttributes {
    let mut attrs = WindowAttributes::default()
        .with_title(&options.title)
        .with_inner_size(LogicalSize::new(options.width, options.height))
        .with_visible(!options.start_hidden);

    if let Some(min) = options.min_size {
        attrs = attrs.with_min_inner_size(LogicalSize::new(min.width, min.height));
    }
    if let Some(max) = options.max_size {
        attrs = attrs.with_max_inner_size(LogicalSize::new(max.width, max.height));
    }
    if options.always_on_top {
        attrs = attrs.with_window_level(WindowLevel::AlwaysOnTop);
    }
    if let Some(bytes) = &options.icon {
        match decode_icon(bytes).map(|image| image.into_parts()) {
            Ok((rgba, width, height)) => match Icon::from_rgba(rgba, width, height) {
                Ok(icon) => attrs = attrs.with_window_icon(Some(icon)),
                Err(e) => warn!("window icon ignored: {e}"),
            },
            Err(e) => warn!("window icon ignored: {e}"),
        }
    }
    attrs
}

impl WebviewBridge {
    /// Create the window and the webview inside it, then navigate.
    ///
    /// Called once from the loop's `resumed`. Any failure here is a startup
    /// failure: nothing is kept and the caller leaves the loop.
    pub(crate) fn create(
        &mut self,
        event_loop: &ActiveEventLoop,
        options: &AppOptions,
        events: &EventQueue,
    ) -> Result<(), VeloError> {
        if self.is_attached() {
            debug!("window already created");
            return Ok(());
        }

        let window = event_loop
            .create_window(window_attributes(options))
            .map_err(|e| VeloError::Startup(format!("window creation failed: {e}")))?;

        let webview = self.build_webview(&window, options, events)?;

        self.current_url = platform_url(&options.url, &self.scheme);
        self.webview = Some(webview);
        self.window = Some(window);
        info!(url = %self.current_url, scheme = %self.scheme, "window and webview created");
        Ok(())
    }

    fn build_webview(
        &self,
        window: &Window,
        options: &AppOptions,
        events: &EventQueue,
    ) -> Result<WebView, VeloError> {
        let mut builder = WebViewBuilder::new()
            .with_devtools(options.devtools)
            .with_initialization_script(IPC_INIT_SCRIPT);

        if let Some(script) = &options.injected_script {
            builder = builder.with_initialization_script(script);
        }
        if let Some(ua) = &options.user_agent {
            builder = builder.with_user_agent(ua);
        }

        builder = Self::attach_ipc_handler(builder, events.clone());
        builder = Self::attach_page_load_handler(builder, events.clone());
        builder = Self::attach_title_handler(builder, events.clone());
        builder = Self::attach_drag_drop_handler(builder, events.clone());
        builder = Self::attach_scheme_handler(builder, &self.scheme, events.clone());

        builder
            .with_url(platform_url(&options.url, &self.scheme))
            .build(window)
            .map_err(|e| VeloError::Startup(format!("web engine unavailable: {e}")))
    }

    /// Keep the webview filling the client area.
    pub(crate) fn sync_bounds(&self) {
        let (Some(window), Some(webview)) = (&self.window, &self.webview) else {
            return;
        };
        let size = window.inner_size().to_logical::<u32>(window.scale_factor());
        let bounds = wry::Rect {
            position: wry::dpi::LogicalPosition::new(0, 0).into(),
            size: wry::dpi::LogicalSize::new(size.width, size.height).into(),
        };
        if let Err(e) = webview.set_bounds(bounds) {
            debug!("webview resize failed: {e}");
        }
    }

    /// Drop the webview, then its window. Safe to call repeatedly.
    pub(crate) fn teardown(&mut self) {
        let had_webview = self.webview.take().is_some();
        let had_window = self.window.take().is_some();
        if had_webview || had_window {
            info!("window and webview destroyed");
        }
    }
}
