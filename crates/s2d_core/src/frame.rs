//! Per-frame orchestration, independent of any windowing or GPU backend.
//!
//! The platform layer forwards events through [`FrameLoop::process_event`] and
//! calls [`FrameLoop::run_frame`] once per redraw. A quit request never cuts a
//! frame short: the frame in which it is observed is still updated, rendered
//! and presented, and only then does the loop report [`LoopStatus::Stopped`].
//! That frame runs as soon as the quit arrives, without waiting on a redraw.

use crate::scene::SceneState;
use crate::time::FrameClock;

const FPS_LOG_INTERVAL: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEvent {
    /// Explicit application quit.
    Quit,
    /// The window's close button or equivalent.
    WindowClosed,
    /// Anything else; ignored.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Running,
    Stopped,
}

/// Draws the scene and presents it. Implementations own their GPU resources.
pub trait FrameRenderer {
    fn render(&mut self, scene: &SceneState);
}

pub struct FrameLoop {
    clock: FrameClock,
    scene: SceneState,
    quit_requested: bool,
    status: LoopStatus,
}

impl FrameLoop {
    pub fn new(scene: SceneState) -> Self {
        Self {
            clock: FrameClock::new(),
            scene,
            quit_requested: false,
            status: LoopStatus::Running,
        }
    }

    pub fn handle_event(&mut self, event: LoopEvent) {
        match event {
            LoopEvent::Quit | LoopEvent::WindowClosed => {
                if !self.quit_requested {
                    log::info!("Quit requested ({:?}), finishing current frame", event);
                }
                self.quit_requested = true;
            }
            LoopEvent::Other => {}
        }
    }

    /// Feed a non-redraw event. A quit request is not left waiting for the
    /// next redraw: the frame is run and presented right away so the loop
    /// stops even if the platform never redraws again.
    pub fn process_event<R>(
        &mut self,
        event: LoopEvent,
        now_ms: u64,
        renderer: &mut R,
    ) -> LoopStatus
    where
        R: FrameRenderer + ?Sized,
    {
        self.handle_event(event);
        if self.quit_requested {
            self.run_frame(now_ms, renderer)
        } else {
            self.status
        }
    }

    /// Run one frame at `now_ms` (milliseconds since startup).
    pub fn run_frame<R>(&mut self, now_ms: u64, renderer: &mut R) -> LoopStatus
    where
        R: FrameRenderer + ?Sized,
    {
        if self.status == LoopStatus::Stopped {
            return LoopStatus::Stopped;
        }

        let dt = self.clock.tick(now_ms);
        self.scene.update(dt);
        renderer.render(&self.scene);

        if self.clock.frame_count % FPS_LOG_INTERVAL == 0 {
            log::debug!(
                "frame {}: {:.1} fps, x={:.3}, rotation={:.1} deg",
                self.clock.frame_count,
                self.clock.smoothed_fps,
                self.scene.params.x_offset,
                self.scene.params.rotation_deg
            );
        }

        if self.quit_requested {
            self.status = LoopStatus::Stopped;
        }
        self.status
    }

    pub fn status(&self) -> LoopStatus {
        self.status
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }
}
