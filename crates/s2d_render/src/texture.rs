//! Image decoding and GPU texture upload.
//!
//! Decoding (`DecodedImage`) is kept apart from upload (`Texture`) so a bad
//! asset is reported before any GPU object exists. A `Texture` owns its wgpu
//! objects and releases them when dropped.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("unable to read image '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to decode image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("image '{}' has zero width or height", path.display())]
    Empty { path: PathBuf },
    #[error(
        "image '{}' is {width}x{height}, larger than the device limit of {max}",
        path.display()
    )]
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

/// Tightly packed RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TextureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, path)
    }

    /// Decode an in-memory image; `path` is only used for error reporting.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self, TextureError> {
        let rgba = image::load_from_memory(bytes)
            .map_err(|source| TextureError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }

    /// Reject images a texture of side `max` can't hold.
    pub fn ensure_fits(&self, max: u32, path: &Path) -> Result<(), TextureError> {
        if self.width > max || self.height > max {
            return Err(TextureError::TooLarge {
                path: path.to_path_buf(),
                width: self.width,
                height: self.height,
                max,
            });
        }
        Ok(())
    }
}

pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

impl Texture {
    /// Upload a decoded image, checking it against the device's 2D texture
    /// limit first. `path` labels the GPU objects and any error.
    pub fn from_decoded(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &DecodedImage,
        path: &Path,
    ) -> Result<Self, TextureError> {
        image.ensure_fits(device.limits().max_texture_dimension_2d, path)?;
        let label = path.to_string_lossy();
        Ok(Self::from_rgba8(
            device,
            queue,
            &image.pixels,
            image.width,
            image.height,
            &label,
        ))
    }

    /// Single mip level, `Rgba8UnormSrgb`, nearest-neighbour sampling.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        log::debug!("Uploaded texture '{}' ({}x{})", label, width, height);

        Self {
            texture,
            view,
            sampler,
            size: (width, height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str, extension: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "s2d_texture_test_{}_{}_{}.{}",
            name_hint,
            std::process::id(),
            nanos,
            extension
        ))
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = temp_file_path("missing", "jpg");
        let result = DecodedImage::load(&path);
        match result {
            Err(TextureError::Read { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn error_message_names_the_file() {
        let path = temp_file_path("named", "jpg");
        let err = DecodedImage::load(&path).expect_err("file should not exist");
        assert!(err.to_string().contains(&*path.to_string_lossy()));
    }

    #[test]
    fn corrupt_file_is_a_decode_error() {
        let path = temp_file_path("corrupt", "png");
        fs::write(&path, b"definitely not an image").expect("failed to write temp file");
        let result = DecodedImage::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(TextureError::Decode { .. })));
    }

    fn solid_image(width: u32, height: u32) -> DecodedImage {
        DecodedImage {
            width,
            height,
            pixels: vec![255; (width * height * 4) as usize],
        }
    }

    #[test]
    fn image_within_limit_fits() {
        let path = Path::new("assets/sprite.png");
        assert!(solid_image(64, 32).ensure_fits(64, path).is_ok());
    }

    #[test]
    fn oversized_image_is_rejected_with_dimensions() {
        let path = Path::new("assets/huge.png");
        let err = solid_image(8, 20)
            .ensure_fits(16, path)
            .expect_err("20 rows exceed a 16 texel limit");
        match err {
            TextureError::TooLarge {
                path: reported,
                width,
                height,
                max,
            } => {
                assert_eq!(reported, path);
                assert_eq!((width, height, max), (8, 20, 16));
            }
            other => panic!("expected TooLarge, got {:?}", other),
        }
    }

    #[test]
    fn png_decodes_to_rgba8() {
        let path = temp_file_path("valid", "png");
        let mut img = image::RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        img.put_pixel(2, 1, image::Rgb([0, 0, 255]));
        img.save(&path).expect("failed to write temp png");

        let decoded = DecodedImage::load(&path);
        let _ = fs::remove_file(&path);
        let decoded = decoded.expect("png should decode");

        assert_eq!((decoded.width, decoded.height), (3, 2));
        assert_eq!(decoded.pixels.len(), 3 * 2 * 4);
        assert_eq!(&decoded.pixels[0..4], &[255, 0, 0, 255]);
        let last = decoded.pixels.len() - 4;
        assert_eq!(&decoded.pixels[last..], &[0, 0, 255, 255]);
    }
}
