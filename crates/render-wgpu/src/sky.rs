use crate::gpu::DEPTH_FORMAT;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};
use prism_assets::{Mesh, Vertex};
use prism_render::FrameCamera;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct SkyUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub zenith: [f32; 4],
    pub horizon: [f32; 4],
    pub ground: [f32; 4],
}

/// Colours of the procedural sky gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyGradient {
    pub zenith: Vec4,
    pub horizon: Vec4,
    pub ground: Vec4,
}

impl Default for SkyGradient {
    fn default() -> Self {
        Self {
            zenith: Vec4::new(0.12, 0.25, 0.55, 1.0),
            horizon: Vec4::new(0.65, 0.75, 0.85, 1.0),
            ground: Vec4::new(0.18, 0.16, 0.14, 1.0),
        }
    }
}

impl SkyUniforms {
    /// The view keeps only its rotation so the sky never moves with the camera.
    pub fn new(camera: &FrameCamera, gradient: &SkyGradient) -> Self {
        let mut view = camera.view;
        view.w_axis = Vec4::W;
        let view_proj: Mat4 = camera.projection * view;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            zenith: gradient.zenith.to_array(),
            horizon: gradient.horizon.to_array(),
            ground: gradient.ground.to_array(),
        }
    }
}

/// Unit cube drawn around the camera at the far plane.
pub struct SkyPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    gradient: SkyGradient,
}

impl SkyPass {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sky_uniforms"),
            size: std::mem::size_of::<SkyUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky_bind_group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SKY_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sky_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_sky"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_sky"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Seen from inside, so the faces that would normally be kept are culled.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Front),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let cube = Mesh::cube();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_vertices"),
            contents: bytemuck::cast_slice(&cube.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sky_indices"),
            contents: bytemuck::cast_slice(&cube.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: cube.index_count(),
            gradient: SkyGradient::default(),
        }
    }

    pub fn gradient(&self) -> SkyGradient {
        self.gradient
    }

    pub fn set_gradient(&mut self, gradient: SkyGradient) {
        self.gradient = gradient;
    }

    pub fn prepare(&self, queue: &wgpu::Queue, camera: &FrameCamera) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&SkyUniforms::new(camera, &self.gradient)),
        );
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn sky_uniform_size() {
        assert_eq!(std::mem::size_of::<SkyUniforms>(), 112);
    }

    #[test]
    fn sky_ignores_camera_translation() {
        let projection = Mat4::perspective_lh(1.0, 1.0, 0.01, 1000.0);
        let at = |position: Vec3| FrameCamera {
            view: Mat4::look_to_lh(position, Vec3::Z, Vec3::Y),
            projection,
            position,
        };
        let gradient = SkyGradient::default();
        let near = SkyUniforms::new(&at(Vec3::ZERO), &gradient);
        let far = SkyUniforms::new(&at(Vec3::new(40.0, -3.0, 12.0)), &gradient);
        assert_eq!(near.view_proj, far.view_proj);
    }

    #[test]
    fn gradient_is_copied() {
        let camera = FrameCamera {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
        };
        let gradient = SkyGradient {
            zenith: Vec4::X,
            horizon: Vec4::Y,
            ground: Vec4::Z,
        };
        let uniforms = SkyUniforms::new(&camera, &gradient);
        assert_eq!(uniforms.zenith, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(uniforms.ground, [0.0, 0.0, 1.0, 0.0]);
    }
}
