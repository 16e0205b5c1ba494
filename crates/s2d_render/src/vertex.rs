use crate::sprite_program::POSITION_ATTRIBUTE;

/// Position-only vertex. Texture coordinates are derived in the vertex shader
/// from the quad's local position.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

/// Unit square centred on the origin as two counter-clockwise triangles.
pub const QUAD_VERTICES: [QuadVertex; 6] = [
    QuadVertex { position: [-0.5, -0.5] },
    QuadVertex { position: [0.5, -0.5] },
    QuadVertex { position: [0.5, 0.5] },
    QuadVertex { position: [-0.5, -0.5] },
    QuadVertex { position: [0.5, 0.5] },
    QuadVertex { position: [-0.5, 0.5] },
];

impl QuadVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(QuadVertex, position) as wgpu::BufferAddress,
                    shader_location: POSITION_ATTRIBUTE,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
