pub mod gpu_context;
pub mod sprite_program;
pub mod texture;
pub mod vertex;

pub use gpu_context::{GpuContext, GpuError};
pub use sprite_program::{GlobalsUniform, ShaderError, ShaderSources, SpriteProgram};
pub use texture::{DecodedImage, Texture, TextureError};
pub use vertex::{QuadVertex, QUAD_VERTICES};
