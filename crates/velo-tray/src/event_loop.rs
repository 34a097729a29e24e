//! Standalone event loop for a tray-only process.
//!
//! When a webview is also running, its loop drives the tray instead and
//! this module is not used.

use std::time::{Duration, Instant};

use tracing::{debug, info};
use velo_common::{ClickButton, MenuItemId, PlatformError};
use winit::application::ApplicationHandler;
use winit::event::{StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::backend::TrayBackend;
use crate::controller::TrayController;
use crate::events::TrayEvent;
use crate::native::{self, NativeTray};

/// How often the loop wakes to drain platform work it cannot be notified of.
const PLATFORM_PUMP_INTERVAL: Duration = Duration::from_millis(16);

/// Receives tray input while [`TrayController::run_event_loop`] blocks.
pub trait TrayHost<B: TrayBackend = NativeTray> {
    /// The native icon exists and the loop is live.
    fn on_ready(&mut self, _tray: &mut TrayController<B>) {}

    /// A leaf menu item was selected.
    fn on_menu_click(&mut self, tray: &mut TrayController<B>, id: MenuItemId);

    /// The icon itself was clicked. The menu is shown regardless.
    fn on_tray_click(&mut self, _tray: &mut TrayController<B>, _button: ClickButton) {}

    /// The loop has stopped. The icon is still registered and is removed
    /// once this returns.
    fn on_exit(&mut self, _tray: &mut TrayController<B>) {}
}

/// Pass one native event through the controller to the host.
fn route<B: TrayBackend, H: TrayHost<B>>(
    tray: &mut TrayController<B>,
    host: &mut H,
    event: TrayEvent,
) {
    match tray.dispatch(event) {
        Some(TrayEvent::MenuItemActivated(id)) => {
            debug!(%id, "menu click");
            host.on_menu_click(tray, id);
        }
        Some(TrayEvent::IconClicked(button)) => host.on_tray_click(tray, button),
        None => {}
    }
}

/// Loop teardown: the host sees the tray one last time, then it goes away.
fn finish<B: TrayBackend, H: TrayHost<B>>(tray: &mut TrayController<B>, host: &mut H) {
    host.on_exit(tray);
    let quit = tray.quit_handle();
    quit.clear_waker();
    quit.reset();
    tray.shutdown();
}

#[derive(Debug)]
enum LoopEvent {
    Tray(TrayEvent),
    Wake,
}

struct TrayRunner<'a, H: TrayHost> {
    tray: &'a mut TrayController,
    host: &'a mut H,
    started: bool,
}

impl<H: TrayHost> TrayRunner<'_, H> {
    fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.tray.on_event_loop_started();
        self.host.on_ready(self.tray);
    }
}

impl<H: TrayHost> ApplicationHandler<LoopEvent> for TrayRunner<'_, H> {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if cause == StartCause::Init {
            self.start();
        }
    }

    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {
        self.start();
    }

    fn window_event(&mut self, _: &ActiveEventLoop, _: WindowId, _: WindowEvent) {}

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: LoopEvent) {
        match event {
            LoopEvent::Tray(event) => route(self.tray, self.host, event),
            LoopEvent::Wake => {}
        }
        if self.tray.quit_handle().is_requested() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        native::pump_platform_events();
        if self.tray.quit_handle().is_requested() {
            event_loop.exit();
            return;
        }
        if cfg!(target_os = "linux") {
            event_loop.set_control_flow(ControlFlow::WaitUntil(
                Instant::now() + PLATFORM_PUMP_INTERVAL,
            ));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}

impl TrayController<NativeTray> {
    /// Block the calling thread running the native event loop until
    /// [`quit`](Self::quit) is requested. The icon is removed before
    /// returning.
    pub fn run_event_loop<H: TrayHost>(&mut self, host: &mut H) -> Result<(), PlatformError> {
        let event_loop = EventLoop::<LoopEvent>::with_user_event()
            .build()
            .map_err(|e| PlatformError::EventLoop(e.to_string()))?;

        let proxy = event_loop.create_proxy();
        native::install_event_sink(move |event| {
            let _ = proxy.send_event(LoopEvent::Tray(event));
        });
        let proxy = event_loop.create_proxy();
        self.quit_handle().set_waker(move || {
            let _ = proxy.send_event(LoopEvent::Wake);
        });

        info!("tray event loop running");
        let mut runner = TrayRunner {
            tray: self,
            host,
            started: false,
        };
        let result = event_loop
            .run_app(&mut runner)
            .map_err(|e| PlatformError::EventLoop(e.to_string()));

        native::clear_event_sink();
        finish(self, host);
        info!("tray event loop stopped");
        result
    }
}
