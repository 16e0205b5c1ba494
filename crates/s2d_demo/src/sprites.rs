//! The two sprite textures drawn every frame.

use std::path::Path;

use s2d_render::{DecodedImage, SpriteProgram, Texture, TextureError};

pub const PLAYER_SPRITE_PATH: &str = "assets/mario.jpg";
pub const WEAPON_SPRITE_PATH: &str = "assets/sword.jpg";

/// Sprite images in draw order: the translating player, then the spinning weapon.
pub const SPRITE_PATHS: [&str; 2] = [PLAYER_SPRITE_PATH, WEAPON_SPRITE_PATH];

pub struct SpriteTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// Decode every image before touching the GPU. Stops at the first failure.
pub fn decode_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DecodedImage>, TextureError> {
    paths.iter().map(|path| DecodedImage::load(path)).collect()
}

pub struct SpriteSet {
    sprites: Vec<SpriteTexture>,
}

impl SpriteSet {
    pub fn load<P: AsRef<Path>>(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        program: &SpriteProgram,
        paths: &[P],
    ) -> Result<Self, TextureError> {
        let images = decode_all(paths)?;
        let mut sprites = Vec::with_capacity(images.len());
        for (image, path) in images.iter().zip(paths) {
            let path: &Path = path.as_ref();
            let texture = Texture::from_decoded(device, queue, image, path)?;
            let bind_group = program.create_texture_bind_group(device, &texture);
            log::info!(
                "Loaded sprite '{}' ({}x{})",
                path.display(),
                texture.size.0,
                texture.size.1
            );
            sprites.push(SpriteTexture {
                texture,
                bind_group,
            });
        }
        Ok(Self { sprites })
    }

    /// Sprites in draw order.
    pub fn as_slice(&self) -> &[SpriteTexture] {
        &self.sprites
    }

    /// Bytes of RGBA8 texel data held on the GPU for all sprites.
    pub fn texture_bytes(&self) -> u64 {
        self.sprites
            .iter()
            .map(|s| u64::from(s.texture.size.0) * u64::from(s.texture.size.1) * 4)
            .sum()
    }
}
