//! GPU side of the frame: clear, upload the quad, draw each sprite, present.

use std::sync::Arc;

use glam::Mat4;
use s2d_core::{FrameRenderer, SceneState};
use s2d_render::{GpuContext, ShaderSources, SpriteProgram, QUAD_VERTICES};
use winit::window::Window;

use crate::error::StartupError;
use crate::sprites::{SpriteSet, SPRITE_PATHS};

pub const VERTEX_SHADER_PATH: &str = "shaders/vertex.wgsl";
pub const FRAGMENT_SHADER_PATH: &str = "shaders/fragment.wgsl";

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 1.0,
    g: 1.0,
    b: 0.0,
    a: 1.0,
};
const SPRITE_TINT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct SceneRenderer {
    gpu: GpuContext,
    program: SpriteProgram,
    sprites: SpriteSet,
    quad_buffer: wgpu::Buffer,
}

impl SceneRenderer {
    pub fn new(window: Arc<Window>, scene: &SceneState) -> Result<Self, StartupError> {
        let gpu = GpuContext::new(window)?;

        let sources = ShaderSources::load(VERTEX_SHADER_PATH, FRAGMENT_SHADER_PATH)?;
        let mut program = SpriteProgram::new(
            &gpu.device,
            gpu.surface_format,
            &sources,
            SPRITE_PATHS.len() as u32,
        );
        program.set_projection_matrix(scene.projection_matrix());
        program.set_view_matrix(scene.view_matrix());
        let [r, g, b, a] = SPRITE_TINT;
        program.set_color(r, g, b, a);
        program.flush_globals(&gpu.queue);

        let sprites = SpriteSet::load(&gpu.device, &gpu.queue, &program, &SPRITE_PATHS)?;
        log::info!(
            "{} sprites resident ({} KiB of texture memory)",
            sprites.as_slice().len(),
            sprites.texture_bytes() / 1024
        );
        let model_count = scene.model_matrices().len();
        if sprites.as_slice().len() != model_count {
            log::warn!(
                "{} sprites loaded for {} model matrices; unmatched entries are not drawn",
                sprites.as_slice().len(),
                model_count
            );
        }

        let quad_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Quad Vertex Buffer"),
            size: std::mem::size_of_val(&QUAD_VERTICES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            gpu,
            program,
            sprites,
            quad_buffer,
        })
    }
}

impl FrameRenderer for SceneRenderer {
    fn render(&mut self, scene: &SceneState) {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let models = scene.model_matrices();
        let draws = pair_with_models(&models, self.sprites.as_slice());
        for &(slot, model, _) in &draws {
            self.program.set_model_matrix(&self.gpu.queue, slot, model);
        }
        self.gpu
            .queue
            .write_buffer(&self.quad_buffer, 0, bytemuck::cast_slice(&QUAD_VERTICES));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.program.activate(&mut render_pass);
            render_pass.set_vertex_buffer(0, self.quad_buffer.slice(..));

            let vertex_count = QUAD_VERTICES.len() as u32;
            for &(slot, _, sprite) in &draws {
                if !self.program.bind_model(&mut render_pass, slot) {
                    continue;
                }
                self.program
                    .bind_texture(&mut render_pass, &sprite.bind_group);
                render_pass.draw(0..vertex_count, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

/// Pair each sprite with the model matrix at the same position and the
/// uniform slot it is drawn from. Unmatched entries on either side are dropped.
fn pair_with_models<'a, T>(models: &[Mat4], sprites: &'a [T]) -> Vec<(u32, Mat4, &'a T)> {
    models
        .iter()
        .zip(sprites)
        .enumerate()
        .map(|(slot, (model, sprite))| (slot as u32, *model, sprite))
        .collect()
}
