use s2d_render::{GpuError, ShaderError, TextureError};
use thiserror::Error;
use winit::error::{EventLoopError, OsError};

/// Anything that stops the demo before its first frame.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("window creation failed: {0}")]
    Window(#[from] OsError),
    #[error("event loop failed: {0}")]
    EventLoop(#[from] EventLoopError),
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("asset load failed: {0}")]
    Texture(#[from] TextureError),
}
