//! Sprite shader program: a vertex and a fragment WGSL module linked into one
//! render pipeline, plus the uniform state they read.
//!
//! Bind groups:
//!  - group 0: `GlobalsUniform` (view, projection, tint color)
//!  - group 1: sprite texture + sampler
//!  - group 2: per-sprite model matrix, one slot per sprite selected by
//!    dynamic offset so each draw in a pass can use its own matrix

use std::fs;
use std::path::{Path, PathBuf};

use glam::Mat4;
use thiserror::Error;

use crate::texture::Texture;
use crate::vertex::QuadVertex;

/// Shader location of the vertex position attribute.
pub const POSITION_ATTRIBUTE: u32 = 0;

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("unable to read shader '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl Default for GlobalsUniform {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY.to_cols_array_2d(),
            projection: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// WGSL source text for the two shader stages.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn load(
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        Ok(Self {
            vertex: read_source(vertex_path.as_ref())?,
            fragment: read_source(fragment_path.as_ref())?,
        })
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Round `size` up to the next multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    if alignment == 0 {
        return size;
    }
    size.div_ceil(alignment) * alignment
}

/// Byte offset of `slot` in a buffer of `slots` entries spaced `stride` apart.
pub fn slot_offset(stride: u64, slots: u32, slot: u32) -> Option<u32> {
    if slot >= slots {
        return None;
    }
    u32::try_from(stride * u64::from(slot)).ok()
}

pub struct SpriteProgram {
    pub render_pipeline: wgpu::RenderPipeline,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    globals: GlobalsUniform,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    model_stride: u64,
    model_slots: u32,
}

impl SpriteProgram {
    /// Compile both stages and link them for `surface_format`. `model_slots`
    /// is the number of sprites that can be drawn with distinct model
    /// matrices in one frame.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        sources: &ShaderSources,
        model_slots: u32,
    ) -> Self {
        let model_slots = model_slots.max(1);
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(sources.vertex.as_str().into()),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(sources.fragment.as_str().into()),
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Globals Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let model_size = std::mem::size_of::<ModelUniform>() as u64;
        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(model_size),
                    },
                    count: None,
                }],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[
                &globals_bind_group_layout,
                &texture_bind_group_layout,
                &model_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let globals = GlobalsUniform::default();
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Uniform Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let model_stride = aligned_stride(
            model_size,
            u64::from(device.limits().min_uniform_buffer_offset_alignment),
        );
        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Uniform Buffer"),
            size: model_stride * u64::from(model_slots),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Model Bind Group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(model_size),
                }),
            }],
        });

        log::info!(
            "Sprite program linked ({} model slots, stride {} bytes)",
            model_slots,
            model_stride
        );

        Self {
            render_pipeline,
            texture_bind_group_layout,
            globals,
            globals_buffer,
            globals_bind_group,
            model_buffer,
            model_bind_group,
            model_stride,
            model_slots,
        }
    }

    pub fn set_view_matrix(&mut self, view: Mat4) {
        self.globals.view = view.to_cols_array_2d();
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.globals.projection = projection.to_cols_array_2d();
    }

    pub fn set_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.globals.color = [r, g, b, a];
    }

    /// Upload view, projection and color set since the last flush.
    pub fn flush_globals(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&self.globals));
    }

    /// Write `model` into `slot`. Out-of-range slots are logged and skipped.
    pub fn set_model_matrix(&self, queue: &wgpu::Queue, slot: u32, model: Mat4) {
        let Some(offset) = self.checked_slot_offset(slot) else {
            return;
        };
        let uniform = ModelUniform {
            model: model.to_cols_array_2d(),
        };
        queue.write_buffer(&self.model_buffer, u64::from(offset), bytemuck::bytes_of(&uniform));
    }

    /// Make this program current in `pass` with its globals bound.
    pub fn activate(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
    }

    /// Select the model matrix written to `slot` for subsequent draws.
    /// Returns `false`, leaving the binding untouched, for an out-of-range slot.
    pub fn bind_model(&self, pass: &mut wgpu::RenderPass<'_>, slot: u32) -> bool {
        match self.checked_slot_offset(slot) {
            Some(offset) => {
                pass.set_bind_group(2, &self.model_bind_group, &[offset]);
                true
            }
            None => false,
        }
    }

    fn checked_slot_offset(&self, slot: u32) -> Option<u32> {
        let offset = slot_offset(self.model_stride, self.model_slots, slot);
        if offset.is_none() {
            log::error!(
                "Model slot {} out of range (program has {})",
                slot,
                self.model_slots
            );
        }
        offset
    }

    pub fn bind_texture(&self, pass: &mut wgpu::RenderPass<'_>, bind_group: &wgpu::BindGroup) {
        pass.set_bind_group(1, bind_group, &[]);
    }

    pub fn create_texture_bind_group(
        &self,
        device: &wgpu::Device,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Texture Bind Group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn shader_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shaders")
    }

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "s2d_shader_test_{}_{}_{}.wgsl",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn validated_module(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("WGSL parse error:\n{}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("WGSL validation error: {:?}", e));
        module
    }

    /// `(group, binding, size in bytes)` of the global called `name`.
    fn resource(module: &naga::Module, name: &str) -> (u32, u32, u32) {
        let (_, var) = module
            .global_variables
            .iter()
            .find(|(_, var)| var.name.as_deref() == Some(name))
            .unwrap_or_else(|| panic!("shader has no global '{}'", name));
        let binding = var
            .binding
            .as_ref()
            .unwrap_or_else(|| panic!("global '{}' has no binding", name));
        let size = module.types[var.ty].inner.size(module.to_ctx());
        (binding.group, binding.binding, size)
    }

    fn bundled_sources() -> ShaderSources {
        let dir = shader_dir();
        ShaderSources::load(dir.join("vertex.wgsl"), dir.join("fragment.wgsl"))
            .expect("bundled shaders should be readable")
    }

    #[test]
    fn bundled_shaders_validate() {
        let sources = bundled_sources();
        let vertex = validated_module(&sources.vertex);
        let fragment = validated_module(&sources.fragment);

        assert!(vertex
            .entry_points
            .iter()
            .any(|ep| ep.name == "vs_main" && ep.stage == naga::ShaderStage::Vertex));
        assert!(fragment
            .entry_points
            .iter()
            .any(|ep| ep.name == "fs_main" && ep.stage == naga::ShaderStage::Fragment));
    }

    #[test]
    fn shader_uniforms_match_rust_layouts() {
        let sources = bundled_sources();
        let vertex = validated_module(&sources.vertex);
        let fragment = validated_module(&sources.fragment);

        let globals_size = std::mem::size_of::<GlobalsUniform>() as u32;
        let model_size = std::mem::size_of::<ModelUniform>() as u32;
        assert_eq!(resource(&vertex, "globals"), (0, 0, globals_size));
        assert_eq!(resource(&fragment, "globals"), (0, 0, globals_size));
        assert_eq!(resource(&vertex, "object"), (2, 0, model_size));

        let (group, binding, _) = resource(&fragment, "sprite_texture");
        assert_eq!((group, binding), (1, 0));
        let (group, binding, _) = resource(&fragment, "sprite_sampler");
        assert_eq!((group, binding), (1, 1));
    }

    #[test]
    fn vertex_position_uses_position_attribute() {
        let vertex = validated_module(&bundled_sources().vertex);
        let entry = vertex
            .entry_points
            .iter()
            .find(|ep| ep.name == "vs_main")
            .expect("vertex entry point");
        let locations: Vec<u32> = entry
            .function
            .arguments
            .iter()
            .filter_map(|arg| match arg.binding {
                Some(naga::Binding::Location { location, .. }) => Some(location),
                _ => None,
            })
            .collect();
        assert_eq!(locations, vec![POSITION_ATTRIBUTE]);
    }

    #[test]
    fn missing_fragment_shader_reports_its_path() {
        let vertex = temp_file_path("vertex");
        fs::write(&vertex, "// empty").expect("failed to write temp shader");
        let fragment = temp_file_path("fragment_missing");

        let result = ShaderSources::load(&vertex, &fragment);
        let _ = fs::remove_file(&vertex);
        match result {
            Err(ShaderError::Read { path, .. }) => assert_eq!(path, fragment),
            other => panic!("expected read error, got {:?}", other),
        }
    }

    #[test]
    fn stride_rounds_up_to_alignment() {
        assert_eq!(aligned_stride(64, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
        assert_eq!(aligned_stride(64, 0), 64);
    }

    #[test]
    fn slot_offsets_step_by_stride() {
        assert_eq!(slot_offset(256, 2, 0), Some(0));
        assert_eq!(slot_offset(256, 2, 1), Some(256));
    }

    #[test]
    fn out_of_range_slot_has_no_offset() {
        assert_eq!(slot_offset(256, 2, 2), None);
        assert_eq!(slot_offset(256, 2, u32::MAX), None);
    }

    #[test]
    fn globals_layout_matches_wgsl() {
        // Two mat4x4<f32> followed by a vec4<f32>.
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 144);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }

    #[test]
    fn default_globals_are_identity_and_white() {
        let globals = GlobalsUniform::default();
        assert_eq!(globals.view, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(globals.color, [1.0; 4]);
    }
}
