//! Simple 2D scene: two textured sprites under a fixed orthographic camera.
//!
//! winit drives the event loop via `ApplicationHandler`. Window events are
//! forwarded to the `FrameLoop`, and every `RedrawRequested` runs one frame:
//!
//!   1. measure the delta from millisecond ticks
//!   2. advance the animation and rebuild both model matrices
//!   3. clear, draw the player and the spinning weapon, present
//!
//! A close request runs and presents one last frame immediately, then exits;
//! it never waits for a redraw the platform may not deliver. Startup failures (missing sprite or shader, no GPU) are logged
//! once and the process exits with a failure status.

mod error;
mod renderer;
mod sprites;

use std::process::ExitCode;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use error::StartupError;
use renderer::SceneRenderer;
use s2d_core::{Camera2D, FrameLoop, LoopEvent, LoopStatus, SceneState, TickSource};
use s2d_platform::PlatformConfig;

struct DemoState {
    window: Arc<Window>,
    frame_loop: FrameLoop,
    renderer: SceneRenderer,
}

impl DemoState {
    fn new(window: Arc<Window>) -> Result<Self, StartupError> {
        let scene = SceneState::new(Camera2D::default());
        let renderer = SceneRenderer::new(window.clone(), &scene)?;
        Ok(Self {
            window,
            frame_loop: FrameLoop::new(scene),
            renderer,
        })
    }
}

struct App {
    config: PlatformConfig,
    ticks: TickSource,
    state: Option<DemoState>,
    startup_error: Option<StartupError>,
}

impl App {
    fn new(ticks: TickSource) -> Self {
        Self {
            config: PlatformConfig::default(),
            ticks,
            state: None,
            startup_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), StartupError> {
        let window = s2d_platform::create_window(event_loop, &self.config)?;
        log::info!(
            "Window created: {}x{}",
            self.config.width,
            self.config.height
        );
        self.state = Some(DemoState::new(window)?);
        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.startup_error.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };
        if state.frame_loop.status() == LoopStatus::Stopped {
            return;
        }

        let now_ms = self.ticks.now_ms();
        let status = if let WindowEvent::RedrawRequested = event {
            state.frame_loop.run_frame(now_ms, &mut state.renderer)
        } else {
            state
                .frame_loop
                .process_event(loop_event(&event), now_ms, &mut state.renderer)
        };

        if status == LoopStatus::Stopped {
            log::info!("Exiting after {} frames", state.frame_loop.clock().frame_count);
            event_loop.exit();
        }
    }
}

/// Classify a window event for the frame loop. Only closing the window quits.
fn loop_event(event: &WindowEvent) -> LoopEvent {
    match event {
        WindowEvent::CloseRequested => LoopEvent::WindowClosed,
        WindowEvent::Destroyed => LoopEvent::Quit,
        _ => LoopEvent::Other,
    }
}

fn run() -> Result<(), StartupError> {
    // Ticks count from here, so the first frame's delta includes startup time.
    let ticks = TickSource::start();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(ticks);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Simple 2D scene starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
