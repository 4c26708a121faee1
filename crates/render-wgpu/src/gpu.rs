use crate::shaders;
use crate::sky::SkyPass;
use bytemuck::{Pod, Zeroable};
use prism_assets::{AssetStore, Vertex};
use prism_render::{DrawCall, FramePacket, Renderer};
use wgpu::util::DeviceExt;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 8;

/// Dynamic uniform offsets must be multiples of the device's
/// `min_uniform_buffer_offset_alignment`, which is at most 256.
pub const OBJECT_STRIDE: u64 = 256;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const INITIAL_OBJECT_CAPACITY: usize = 64;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub struct GpuDirectionalLight {
    pub direction: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, Pod, Zeroable)]
pub struct GpuPointLight {
    pub position: [f32; 3],
    pub range: f32,
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Per-frame uniforms: camera and lights.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub directional_count: u32,
    pub ambient: [f32; 3],
    pub point_count: u32,
    pub directional: [GpuDirectionalLight; MAX_DIRECTIONAL_LIGHTS],
    pub point: [GpuPointLight; MAX_POINT_LIGHTS],
}

impl FrameUniforms {
    /// Pack a frame. Lights past the fixed capacity are dropped.
    pub fn from_packet(frame: &FramePacket) -> Self {
        let lighting = &frame.lighting;
        if lighting.directional.len() > MAX_DIRECTIONAL_LIGHTS {
            tracing::warn!(
                count = lighting.directional.len(),
                max = MAX_DIRECTIONAL_LIGHTS,
                "too many directional lights, extras dropped"
            );
        }
        if lighting.point.len() > MAX_POINT_LIGHTS {
            tracing::warn!(
                count = lighting.point.len(),
                max = MAX_POINT_LIGHTS,
                "too many point lights, extras dropped"
            );
        }

        let mut directional = [GpuDirectionalLight::default(); MAX_DIRECTIONAL_LIGHTS];
        for (slot, light) in directional.iter_mut().zip(&lighting.directional) {
            *slot = GpuDirectionalLight {
                direction: light.direction.to_array(),
                intensity: light.intensity,
                color: light.color.to_array(),
                _pad: 0.0,
            };
        }
        let mut point = [GpuPointLight::default(); MAX_POINT_LIGHTS];
        for (slot, light) in point.iter_mut().zip(&lighting.point) {
            *slot = GpuPointLight {
                position: light.position.to_array(),
                range: light.range,
                color: light.color.to_array(),
                intensity: light.intensity,
            };
        }

        Self {
            view: frame.camera.view.to_cols_array_2d(),
            proj: frame.camera.projection.to_cols_array_2d(),
            camera_position: frame.camera.position.to_array(),
            directional_count: lighting.directional.len().min(MAX_DIRECTIONAL_LIGHTS) as u32,
            ambient: lighting.ambient.to_array(),
            point_count: lighting.point.len().min(MAX_POINT_LIGHTS) as u32,
            directional,
            point,
        }
    }
}

/// Per-draw uniforms, one [`OBJECT_STRIDE`] slot each.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub world: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
    pub color_tint: [f32; 4],
    pub roughness: f32,
    pub _pad: [f32; 3],
}

impl ObjectUniforms {
    pub fn from_draw(draw: &DrawCall) -> Self {
        Self {
            world: draw.world.to_cols_array_2d(),
            world_inverse_transpose: draw.world_inverse_transpose.to_cols_array_2d(),
            color_tint: draw.color_tint.to_array(),
            roughness: draw.roughness,
            _pad: [0.0; 3],
        }
    }
}

/// Lay out one [`ObjectUniforms`] per draw at [`OBJECT_STRIDE`] intervals.
pub fn pack_objects(draws: &[DrawCall]) -> Vec<u8> {
    let size = std::mem::size_of::<ObjectUniforms>();
    let stride = OBJECT_STRIDE as usize;
    let mut bytes = vec![0u8; draws.len() * stride];
    for (i, draw) in draws.iter().enumerate() {
        let uniforms = ObjectUniforms::from_draw(draw);
        bytes[i * stride..i * stride + size].copy_from_slice(bytemuck::bytes_of(&uniforms));
    }
    bytes
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu renderer for assembled frames.
pub struct WgpuRenderer {
    lit_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_buffer: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    object_capacity: usize,
    meshes: Vec<GpuMesh>,
    sky: SkyPass,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniforms>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let (object_buffer, object_bind_group) =
            Self::create_object_buffer(device, &object_layout, INITIAL_OBJECT_CAPACITY);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LIT_SHADER.into()),
        });

        let lit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &lit_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &lit_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Outward faces wind clockwise on screen under a left-handed view.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sky = SkyPass::new(device, surface_format);
        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            lit_pipeline,
            frame_buffer,
            frame_bind_group,
            object_layout,
            object_buffer,
            object_bind_group,
            object_capacity: INITIAL_OBJECT_CAPACITY,
            meshes: Vec::new(),
            sky,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn sky_mut(&mut self) -> &mut SkyPass {
        &mut self.sky
    }

    /// Upload meshes added to the store since the last call. The store is
    /// append-only, so handles index straight into the uploaded list.
    pub fn sync_meshes(&mut self, device: &wgpu::Device, assets: &AssetStore) {
        for (handle, mesh) in assets.meshes().skip(self.meshes.len()) {
            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_vertices", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{}_indices", mesh.name)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            tracing::debug!(handle = handle.0, name = %mesh.name, "mesh uploaded");
            self.meshes.push(GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: mesh.index_count(),
            });
        }
    }

    /// Render one frame: lit meshes, then the sky behind them. Returns the
    /// number of draws issued.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        frame: &FramePacket,
        assets: &AssetStore,
    ) -> usize {
        self.sync_meshes(device, assets);
        self.ensure_object_capacity(device, frame.draws.len());

        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_packet(frame)),
        );
        if !frame.draws.is_empty() {
            queue.write_buffer(&self.object_buffer, 0, &pack_objects(&frame.draws));
        }
        self.sky.prepare(queue, &frame.camera);

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        let mut issued = 0;
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.1,
                            b: 0.15,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.lit_pipeline);
            pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (i, draw) in frame.draws.iter().enumerate() {
                let Some(mesh) = self.meshes.get(draw.mesh.0 as usize) else {
                    tracing::warn!(mesh = draw.mesh.0, "draw references unknown mesh");
                    continue;
                };
                let offset = (i as u64 * OBJECT_STRIDE) as u32;
                pass.set_bind_group(1, &self.object_bind_group, &[offset]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                issued += 1;
            }

            self.sky.draw(&mut pass);
        }

        queue.submit(std::iter::once(encoder.finish()));
        issued
    }

    fn ensure_object_capacity(&mut self, device: &wgpu::Device, draws: usize) {
        if draws <= self.object_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        let (buffer, bind_group) =
            Self::create_object_buffer(device, &self.object_layout, capacity);
        self.object_buffer = buffer;
        self.object_bind_group = bind_group;
        self.object_capacity = capacity;
        tracing::debug!(capacity, "object uniform buffer grown");
    }

    fn create_object_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: capacity as u64 * OBJECT_STRIDE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ObjectUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// A [`WgpuRenderer`] bound to one surface texture, usable through the
/// [`Renderer`] trait.
pub struct SurfaceTarget<'a> {
    pub renderer: &'a mut WgpuRenderer,
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub view: &'a wgpu::TextureView,
}

impl Renderer for SurfaceTarget<'_> {
    type Output = usize;

    fn render(&mut self, frame: &FramePacket, assets: &AssetStore) -> usize {
        self.renderer
            .render(self.device, self.queue, self.view, frame, assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use prism_render::FrameAssembler;
    use prism_scene::{PointLight, Scene, SceneConfig};

    fn demo_packet(scene: &mut Scene) -> FramePacket {
        FrameAssembler::new().assemble(scene).unwrap()
    }

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(std::mem::size_of::<GpuDirectionalLight>(), 32);
        assert_eq!(std::mem::size_of::<GpuPointLight>(), 32);
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 160);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 544);
        assert!(std::mem::size_of::<ObjectUniforms>() as u64 <= OBJECT_STRIDE);
    }

    #[test]
    fn frame_uniforms_carry_camera_and_lights() {
        let mut scene = Scene::from_config(&SceneConfig::default(), 1.0).unwrap();
        let packet = demo_packet(&mut scene);
        let uniforms = FrameUniforms::from_packet(&packet);
        assert_eq!(uniforms.view, packet.camera.view.to_cols_array_2d());
        assert_eq!(uniforms.proj, packet.camera.projection.to_cols_array_2d());
        assert_eq!(uniforms.camera_position, [0.0, 0.0, -5.0]);
        assert_eq!(uniforms.directional_count, 2);
        assert_eq!(uniforms.point_count, 2);
        assert_eq!(
            uniforms.point[0].position,
            packet.lighting.point[0].position.to_array()
        );
        assert_eq!(uniforms.point[2].range, 0.0);
    }

    #[test]
    fn excess_point_lights_are_dropped() {
        let mut scene = Scene::from_config(&SceneConfig::default(), 1.0).unwrap();
        scene.lighting_mut().point = (0..12)
            .map(|i| PointLight::new(Vec3::new(i as f32, 0.0, 0.0), Vec3::ONE, 1.0, 5.0))
            .collect();
        let uniforms = FrameUniforms::from_packet(&demo_packet(&mut scene));
        assert_eq!(uniforms.point_count, MAX_POINT_LIGHTS as u32);
        assert_eq!(uniforms.point[7].position, [7.0, 0.0, 0.0]);
    }

    #[test]
    fn objects_are_packed_at_stride() {
        let mut scene = Scene::from_config(&SceneConfig::default(), 1.0).unwrap();
        let packet = demo_packet(&mut scene);
        let bytes = pack_objects(&packet.draws);
        assert_eq!(bytes.len(), packet.draws.len() * OBJECT_STRIDE as usize);

        let size = std::mem::size_of::<ObjectUniforms>();
        let start = OBJECT_STRIDE as usize;
        let second: ObjectUniforms = bytemuck::pod_read_unaligned(&bytes[start..start + size]);
        let draw = &packet.draws[1];
        assert_eq!(second.world, draw.world.to_cols_array_2d());
        assert_eq!(
            second.world_inverse_transpose,
            draw.world_inverse_transpose.to_cols_array_2d()
        );
        assert_eq!(Vec4::from_array(second.color_tint), draw.color_tint);
        assert_eq!(second.roughness, draw.roughness);
    }

    #[test]
    fn packing_no_draws_is_empty() {
        assert!(pack_objects(&[]).is_empty());
    }
}
