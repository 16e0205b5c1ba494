pub mod animation;
pub mod camera;
pub mod frame;
pub mod scene;
pub mod time;

pub use animation::AnimationParams;
pub use camera::Camera2D;
pub use frame::{FrameLoop, FrameRenderer, LoopEvent, LoopStatus};
pub use scene::SceneState;
pub use time::{FrameClock, TickSource};
