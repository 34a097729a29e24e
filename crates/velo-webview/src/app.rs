//! Window creation options and the blocking application loop.

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};
use velo_common::{VeloError, WindowSize};
use velo_tray::{native, TrayController};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::bridge::WebviewBridge;
use crate::command::{ShellCommand, ShellProxy};
use crate::events::{EventQueue, ShellEvent};
use crate::shell::{Shell, ShellHost};

/// How often the loop wakes when nothing has signalled it.
const POLL_INTERVAL: Duration = Duration::from_millis(16);

pub const DEFAULT_SCHEME: &str = "velo";

/// Everything needed to open the window and its webview.
#[derive(Debug, Clone, PartialEq)]
pub struct AppOptions {
    /// First page to load. URLs under `scheme` are served by the host.
    pub url: String,
    /// Script run in every page before its own scripts.
    pub injected_script: Option<String>,
    /// Window icon as encoded image bytes.
    pub icon: Option<Vec<u8>>,
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Reserved URL scheme routed to [`ShellHost::on_scheme_request`].
    pub scheme: String,
    pub min_size: Option<WindowSize>,
    pub max_size: Option<WindowSize>,
    pub always_on_top: bool,
    /// Create the window invisible, e.g. for tray-first apps.
    pub start_hidden: bool,
    pub devtools: bool,
    pub user_agent: Option<String>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            url: format!("{DEFAULT_SCHEME}://localhost/index.html"),
            injected_script: None,
            icon: None,
            title: "Velo".into(),
            width: 1024,
            height: 768,
            scheme: DEFAULT_SCHEME.into(),
            min_size: None,
            max_size: None,
            always_on_top: false,
            start_hidden: false,
            devtools: cfg!(debug_assertions),
            user_agent: None,
        }
    }
}

impl AppOptions {
    pub fn new(url: impl Into<String>, title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_injected_script(mut self, script: impl Into<String>) -> Self {
        self.injected_script = Some(script.into());
        self
    }

    pub fn with_icon(mut self, bytes: Vec<u8>) -> Self {
        self.icon = Some(bytes);
        self
    }
}

#[derive(Debug)]
enum Wake {
    Now,
}

struct AppRunner<'a, H: ShellHost + ?Sized> {
    shell: Shell,
    host: &'a mut H,
    options: AppOptions,
    events: EventQueue,
    commands: Receiver<ShellCommand>,
    started: bool,
    failure: Option<VeloError>,
}

impl<H: ShellHost + ?Sized> AppRunner<'_, H> {
    /// Windows may only be created once the loop has resumed.
    fn start(&mut self, event_loop: &ActiveEventLoop) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(e) = self
            .shell
            .bridge
            .create(event_loop, &self.options, &self.events)
        {
            error!("{e}");
            self.failure = Some(e);
            event_loop.exit();
            return;
        }
        if let Some(tray) = self.shell.tray.as_mut() {
            tray.on_event_loop_started();
        }
        self.host.on_ready(&mut self.shell);
    }

    fn drain(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.shell.apply(command);
        }
        for event in self.events.drain() {
            self.shell.dispatch(self.host, event);
        }
    }

    fn exit_if_requested(&mut self, event_loop: &ActiveEventLoop) -> bool {
        if self.shell.quit_requested() {
            event_loop.exit();
            return true;
        }
        false
    }
}

impl<H: ShellHost + ?Sized> ApplicationHandler<Wake> for AppRunner<'_, H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.start(event_loop);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window close requested");
                if self.host.on_close_requested(&mut self.shell) {
                    self.shell.quit();
                }
                self.exit_if_requested(event_loop);
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    self.shell.bridge.sync_bounds();
                }
            }
            _ => {}
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, _event: Wake) {
        self.drain();
        self.exit_if_requested(event_loop);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.drain();
        native::pump_platform_events();
        if self.exit_if_requested(event_loop) {
            return;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + POLL_INTERVAL));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.failure.is_none() {
            self.host.on_exit(&mut self.shell);
        }
        self.shell.shutdown();
    }
}

/// Open the window described by `options`, optionally alongside `tray`, and
/// block until the host, the tray or a [`ShellProxy`] asks to quit.
///
/// Returns [`VeloError::Startup`] when the window or web engine cannot be
/// created. The tray icon and the window are gone when this returns.
pub fn run_app<H: ShellHost + ?Sized>(
    options: AppOptions,
    tray: Option<TrayController>,
    host: &mut H,
) -> velo_common::Result<()> {
    if let Err(e) = native::init_platform() {
        // Without GTK neither the tray nor the webview can exist on Linux.
        return Err(VeloError::Startup(e.to_string()));
    }

    let event_loop = EventLoop::<Wake>::with_user_event()
        .build()
        .map_err(|e| VeloError::Startup(format!("event loop unavailable: {e}")))?;

    let waker = {
        let proxy = event_loop.create_proxy();
        move || {
            let _ = proxy.send_event(Wake::Now);
        }
    };

    let events = EventQueue::new().with_waker(waker.clone());
    let bridge = WebviewBridge::new(options.scheme.clone());
    bridge.quit_handle().set_waker(waker.clone());
    let (proxy, commands) = ShellProxy::new(bridge.quit_handle());

    if let Some(tray) = &tray {
        tray.quit_handle().set_waker(waker);
        let sink = events.clone();
        native::install_event_sink(move |event| sink.push(ShellEvent::Tray(event)));
    } else {
        debug!("running without a tray icon");
    }

    info!(url = %options.url, scheme = %options.scheme, "starting app loop");
    let mut runner = AppRunner {
        shell: Shell::new(bridge, tray, proxy),
        host,
        options,
        events,
        commands,
        started: false,
        failure: None,
    };
    let result = event_loop.run_app(&mut runner);

    native::clear_event_sink();
    runner.shell.bridge.quit_handle().clear_waker();
    if let Some(tray) = runner.shell.tray.as_ref() {
        tray.quit_handle().clear_waker();
    }
    runner.shell.shutdown();

    if let Some(failure) = runner.failure.take() {
        return Err(failure);
    }
    result.map_err(|e| {
        warn!("event loop ended with an error: {e}");
        VeloError::Platform(velo_common::PlatformError::EventLoop(e.to_string()))
    })?;
    info!("app loop stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_serve_the_reserved_scheme() {
        let options = AppOptions::default();
        assert_eq!(options.scheme, "velo");
        assert!(options.url.starts_with("velo://"));
        assert_eq!((options.width, options.height), (1024, 768));
        assert!(!options.start_hidden);
    }

    #[test]
    fn new_keeps_remaining_defaults() {
        let options = AppOptions::new("https://example.com", "Example", 640, 480)
            .with_scheme("app")
            .with_injected_script("window.x = 1;");
        assert_eq!(options.url, "https://example.com");
        assert_eq!(options.title, "Example");
        assert_eq!(options.scheme, "app");
        assert_eq!(options.injected_script.as_deref(), Some("window.x = 1;"));
        assert!(options.icon.is_none());
    }
}
