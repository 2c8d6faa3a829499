//! The fixed demo scene, rendered into an offscreen color target each frame.

use std::time::Instant;

use encase::ShaderType;
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;
use wgpu::{
    BindGroup, Buffer, Color, CommandEncoder, Device, Extent3d, IndexFormat, LoadOp, Operations,
    Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment, RenderPassDescriptor,
    RenderPipeline, TextureDescriptor, TextureDimension, TextureFormat, TextureUsages,
    TextureView, VertexAttribute, VertexBufferLayout, VertexFormat, VertexStepMode,
};

use crate::camera::Camera;
use crate::catalog::uniform_bytes;
use crate::color_buffer::{ColorBuffer, COLOR_FORMAT};
use crate::error::ResourceCreationError;
use crate::mesh::{shape, GpuMesh, Mesh};

pub const CLEAR_COLOR: Color = Color {
    r: 0.3,
    g: 0.3,
    b: 0.4,
    a: 1.0,
};

pub const AMBIENT: Vec3 = Vec3::new(0.3, 0.3, 0.4);
pub const SPECULAR_POWER: f32 = 256.0;

pub const ORBIT_RADIUS: f32 = 20.0;
pub const ORBIT_SPEED: f32 = 0.7;

const CUBE_CENTER: Vec3 = Vec3::new(42.0, 7.5, -10.0);
const CRATE_CENTER: Vec3 = Vec3::new(-10.0, 6.0, -90.0);
const ORBIT_HEIGHT: f32 = 10.0;

const ORBIT_LIGHT_COLOR: Vec3 = Vec3::new(0.8, 0.8, 1.0);
const ORBIT_LIGHT_INTENSITY: f32 = 10.0;
const STATIC_LIGHT_POSITION: Vec3 = Vec3::new(-70.0, 30.0, -100.0);
const STATIC_LIGHT_COLOR: Vec3 = Vec3::new(1.0, 0.8, 0.2);
const STATIC_LIGHT_INTENSITY: f32 = 40.0;

/// Index of the marker sphere that follows the orbiting light.
const ORBIT_MARKER: usize = 3;

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct SceneUniform {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub ambient: Vec3,
    pub specular_power: f32,
    pub lights: [PointLight; 2],
}

#[derive(Clone, Copy, Debug, ShaderType)]
pub struct ModelUniform {
    pub model: Mat4,
    pub color: Vec3,
    pub emissive: f32,
    pub pattern: u32,
}

/// One scene object before GPU upload.
pub struct ModelDesc {
    pub mesh: Mesh,
    pub transform: Mat4,
    pub color: Vec3,
    pub emissive: bool,
    pub checkered: bool,
}

impl ModelDesc {
    fn uniform(&self) -> ModelUniform {
        ModelUniform {
            model: self.transform,
            color: self.color,
            emissive: if self.emissive { 1.0 } else { 0.0 },
            pattern: if self.checkered { 1 } else { 0 },
        }
    }
}

/// World position of the orbiting light at a given orbit angle.
pub fn orbit_position(angle: f32) -> Vec3 {
    Vec3::new(
        CUBE_CENTER.x + angle.cos() * ORBIT_RADIUS,
        ORBIT_HEIGHT,
        CUBE_CENTER.z + angle.sin() * ORBIT_RADIUS,
    )
}

/// Both point lights for a given orbit angle, intensities premultiplied.
pub fn scene_lights(orbit_angle: f32) -> [PointLight; 2] {
    [
        PointLight {
            position: orbit_position(orbit_angle),
            color: ORBIT_LIGHT_COLOR * ORBIT_LIGHT_INTENSITY,
        },
        PointLight {
            position: STATIC_LIGHT_POSITION,
            color: STATIC_LIGHT_COLOR * STATIC_LIGHT_INTENSITY,
        },
    ]
}

/// The demo scene: checkered ground, a stone block, a wooden crate, and an
/// emissive marker sphere per light.
pub fn demo_models() -> Vec<ModelDesc> {
    vec![
        ModelDesc {
            mesh: shape::plane(400.0),
            transform: Mat4::IDENTITY,
            color: Vec3::new(0.55, 0.55, 0.6),
            emissive: false,
            checkered: true,
        },
        ModelDesc {
            mesh: shape::cuboid(15.0, 15.0, 15.0),
            transform: Mat4::from_rotation_translation(
                Quat::from_rotation_y(30.0_f32.to_radians()),
                CUBE_CENTER,
            ),
            color: Vec3::new(0.6, 0.6, 0.65),
            emissive: false,
            checkered: false,
        },
        ModelDesc {
            mesh: shape::cuboid(12.0, 12.0, 12.0),
            transform: Mat4::from_rotation_translation(
                Quat::from_rotation_y(40.0_f32.to_radians()),
                CRATE_CENTER,
            ),
            color: Vec3::new(0.55, 0.35, 0.2),
            emissive: false,
            checkered: false,
        },
        ModelDesc {
            mesh: shape::uv_sphere(1.5, 16),
            transform: Mat4::from_translation(orbit_position(0.0)),
            color: ORBIT_LIGHT_COLOR,
            emissive: true,
            checkered: false,
        },
        ModelDesc {
            mesh: shape::uv_sphere(1.5, 16),
            transform: Mat4::from_translation(STATIC_LIGHT_POSITION),
            color: STATIC_LIGHT_COLOR,
            emissive: true,
            checkered: false,
        },
    ]
}

struct Model {
    mesh: GpuMesh,
    bind_group: BindGroup,
    uniform: Buffer,
}

pub struct SceneRenderer {
    pipeline: RenderPipeline,
    scene_uniform: Buffer,
    scene_bind_group: BindGroup,
    models: Vec<Model>,
    target: ColorBuffer,
    depth_view: TextureView,
    orbit_angle: f32,
    orbit_enabled: bool,
}

impl SceneRenderer {
    pub fn new(device: &Device, width: u32, height: u32) -> Result<Self, ResourceCreationError> {
        let target = ColorBuffer::allocate(device, "Glaze Scene Target", width, height)?;
        let depth_view = create_depth_view(device, width, height);

        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glaze Scene Uniform"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(SceneUniform::min_size()),
                },
                count: None,
            }],
        });

        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Glaze Model Uniform"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(ModelUniform::min_size()),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Glaze Scene"),
            bind_group_layouts: &[&scene_layout, &model_layout],
            push_constant_ranges: &[],
        });

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Glaze Scene"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let vertex_attributes = [
            [VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: VertexFormat::Float32x3,
            }],
            [VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: VertexFormat::Float32x3,
            }],
            [VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: VertexFormat::Float32x2,
            }],
        ];

        let vertex_buffers = vertex_attributes
            .iter()
            .map(|attributes| VertexBufferLayout {
                array_stride: attributes[0].format.size(),
                step_mode: VertexStepMode::Vertex,
                attributes,
            })
            .collect::<Vec<_>>();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Glaze Scene"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: "vertex",
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: "fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
        });

        let scene_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Glaze Scene Uniform"),
            size: SceneUniform::min_size().get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Glaze Scene Uniform"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform.as_entire_binding(),
            }],
        });

        let models = demo_models()
            .into_iter()
            .map(|desc| {
                let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Glaze Model Uniform"),
                    contents: &uniform_bytes(&desc.uniform()),
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                });

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("Glaze Model Uniform"),
                    layout: &model_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    }],
                });

                Model {
                    mesh: GpuMesh::new(device, &desc.mesh),
                    bind_group,
                    uniform,
                }
            })
            .collect();

        Ok(Self {
            pipeline,
            scene_uniform,
            scene_bind_group,
            models,
            target,
            depth_view,
            orbit_angle: 0.0,
            orbit_enabled: true,
        })
    }

    pub fn target(&self) -> &ColorBuffer {
        &self.target
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn toggle_orbit(&mut self) -> bool {
        self.orbit_enabled = !self.orbit_enabled;
        self.orbit_enabled
    }

    pub fn resize(
        &mut self,
        device: &Device,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceCreationError> {
        if self.target.width() != width || self.target.height() != height {
            self.target.resize(device, width, height)?;
            self.depth_view = create_depth_view(device, width, height);
        }

        Ok(())
    }

    /// Advances the orbit, uploads per-frame uniforms and records the scene
    /// pass into `encoder`.
    pub fn render(
        &mut self,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        camera: &Camera,
        delta_time: f32,
    ) {
        let start = Instant::now();

        if self.orbit_enabled {
            self.orbit_angle += ORBIT_SPEED * delta_time;
        }

        let lights = scene_lights(self.orbit_angle);

        let scene = SceneUniform {
            view_proj: camera.view_proj(),
            camera_position: camera.position,
            ambient: AMBIENT,
            specular_power: SPECULAR_POWER,
            lights,
        };
        queue.write_buffer(&self.scene_uniform, 0, &uniform_bytes(&scene));

        let marker = ModelUniform {
            model: Mat4::from_translation(lights[0].position),
            color: ORBIT_LIGHT_COLOR,
            emissive: 1.0,
            pattern: 0,
        };
        queue.write_buffer(
            &self.models[ORBIT_MARKER].uniform,
            0,
            &uniform_bytes(&marker),
        );

        let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("Glaze Scene Pass"),
            color_attachments: &[Some(RenderPassColorAttachment {
                view: self.target.target_view(),
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(CLEAR_COLOR),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(Operations {
                    load: LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);

        for model in &self.models {
            pass.set_bind_group(1, &model.bind_group, &[]);
            pass.set_vertex_buffer(0, model.mesh.positions.slice(..));
            pass.set_vertex_buffer(1, model.mesh.normals.slice(..));
            pass.set_vertex_buffer(2, model.mesh.uvs.slice(..));
            pass.set_index_buffer(model.mesh.indices.slice(..), IndexFormat::Uint32);
            pass.draw_indexed(0..model.mesh.index_count, 0, 0..1);
        }

        drop(pass);
        log::trace!("Scene Pass took: {:?}", start.elapsed());
    }
}

fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
    let depth = device.create_texture(&TextureDescriptor {
        label: Some("Glaze Depth Target"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: TextureFormat::Depth32Float,
        usage: TextureUsages::RENDER_ATTACHMENT,
    });

    depth.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_has_ground_props_and_markers() {
        let models = demo_models();
        assert_eq!(models.len(), 5);

        let emissive = models.iter().filter(|m| m.emissive).count();
        assert_eq!(emissive, 2);

        let checkered = models.iter().filter(|m| m.checkered).count();
        assert_eq!(checkered, 1);
        assert!(models[0].checkered);
    }

    #[test]
    fn markers_start_at_the_light_positions() {
        let models = demo_models();
        let lights = scene_lights(0.0);

        let orbit_marker = models[ORBIT_MARKER].transform.w_axis.truncate();
        assert!((orbit_marker - lights[0].position).length() < 1e-5);

        let static_marker = models[4].transform.w_axis.truncate();
        assert!((static_marker - lights[1].position).length() < 1e-5);
    }

    #[test]
    fn orbit_stays_on_its_circle() {
        for step in 0..16 {
            let angle = step as f32 * std::f32::consts::TAU / 16.0;
            let position = orbit_position(angle);

            let dx = position.x - CUBE_CENTER.x;
            let dz = position.z - CUBE_CENTER.z;
            let radius = (dx * dx + dz * dz).sqrt();

            assert!((radius - ORBIT_RADIUS).abs() < 1e-3);
            assert_eq!(position.y, ORBIT_HEIGHT);
        }
    }

    #[test]
    fn light_colors_carry_their_intensities() {
        let lights = scene_lights(0.0);
        assert_eq!(lights[0].color, Vec3::new(8.0, 8.0, 10.0));
        assert_eq!(lights[1].color, Vec3::new(40.0, 32.0, 8.0));
    }

    #[test]
    fn gpu_structs_round_to_uniform_alignment() {
        assert_eq!(SceneUniform::min_size().get(), 160);
        assert_eq!(ModelUniform::min_size().get(), 96);
        assert_eq!(SceneUniform::min_size().get() % 16, 0);
        assert_eq!(ModelUniform::min_size().get() % 16, 0);
    }

    #[test]
    fn packed_scene_uniform_matches_declared_size() {
        let scene = SceneUniform {
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            ambient: AMBIENT,
            specular_power: SPECULAR_POWER,
            lights: scene_lights(0.0),
        };

        assert_eq!(
            uniform_bytes(&scene).len() as u64,
            SceneUniform::min_size().get()
        );
    }
}
