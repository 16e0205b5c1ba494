use std::sync::Arc;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

pub struct PlatformConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    /// Place the window in the middle of the primary monitor when one is known.
    pub centered: bool,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            title: "Hello, World!".to_string(),
            width: 640,
            height: 480,
            resizable: false,
            centered: true,
        }
    }
}

pub fn create_window(
    event_loop: &ActiveEventLoop,
    config: &PlatformConfig,
) -> Result<Arc<Window>, OsError> {
    let size = LogicalSize::new(config.width, config.height);
    let mut attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(size)
        .with_resizable(config.resizable);

    if config.centered {
        match event_loop.primary_monitor() {
            Some(monitor) => {
                let window_size: PhysicalSize<u32> = size.to_physical(monitor.scale_factor());
                let origin = centered_origin(monitor.position(), monitor.size(), window_size);
                attrs = attrs.with_position(origin);
            }
            None => log::debug!("No primary monitor reported; leaving window placement to the OS"),
        }
    }

    let window = event_loop.create_window(attrs)?;
    Ok(Arc::new(window))
}

/// Top-left corner that centres a window of `window_size` on a monitor.
/// Windows larger than the monitor are pinned to the monitor origin.
pub fn centered_origin(
    monitor_position: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window_size: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let slack_x = monitor_size.width.saturating_sub(window_size.width) / 2;
    let slack_y = monitor_size.height.saturating_sub(window_size.height) / 2;
    PhysicalPosition::new(
        monitor_position.x + slack_x as i32,
        monitor_position.y + slack_y as i32,
    )
}
