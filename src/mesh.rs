use glam::{Vec2, Vec3};
use wgpu::util::DeviceExt;
use wgpu::{Buffer, BufferUsages, Device};

/// Indexed triangle mesh with one position, normal and uv per vertex.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Mesh attributes uploaded into one vertex buffer per attribute.
#[derive(Debug)]
pub struct GpuMesh {
    pub positions: Buffer,
    pub normals: Buffer,
    pub uvs: Buffer,
    pub indices: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &Device, mesh: &Mesh) -> Self {
        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Glaze Mesh Positions"),
            contents: bytemuck::cast_slice(&mesh.positions),
            usage: BufferUsages::VERTEX,
        });
        let normals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Glaze Mesh Normals"),
            contents: bytemuck::cast_slice(&mesh.normals),
            usage: BufferUsages::VERTEX,
        });
        let uvs = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Glaze Mesh Uvs"),
            contents: bytemuck::cast_slice(&mesh.uvs),
            usage: BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Glaze Mesh Indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });

        Self {
            positions,
            normals,
            uvs,
            indices,
            index_count: mesh.indices.len() as u32,
        }
    }
}

pub mod shape {
    use super::Mesh;
    use glam::{Vec2, Vec3};

    pub fn cuboid(width: f32, height: f32, depth: f32) -> Mesh {
        let width = width / 2.0;
        let height = height / 2.0;
        let depth = depth / 2.0;

        let positions = vec![
            // Front
            [-width, -height, depth],
            [width, -height, depth],
            [width, height, depth],
            [-width, height, depth],
            // Back
            [-width, -height, -depth],
            [-width, height, -depth],
            [width, height, -depth],
            [width, -height, -depth],
            // Left
            [-width, -height, depth],
            [-width, height, depth],
            [-width, height, -depth],
            [-width, -height, -depth],
            // Right
            [width, -height, -depth],
            [width, height, -depth],
            [width, height, depth],
            [width, -height, depth],
            // Top
            [-width, height, depth],
            [width, height, depth],
            [width, height, -depth],
            [-width, height, -depth],
            // Bottom
            [-width, -height, depth],
            [-width, -height, -depth],
            [width, -height, -depth],
            [width, -height, depth],
        ];

        let normals = vec![
            // Front
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0],
            // Back
            [0.0, 0.0, -1.0],
            [0.0, 0.0, -1.0],
            [0.0, 0.0, -1.0],
            [0.0, 0.0, -1.0],
            // Left
            [-1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            // Right
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            // Top
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            // Bottom
            [0.0, -1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, -1.0, 0.0],
        ];

        let uvs = vec![
            // Front
            [1.0, 1.0],
            [0.0, 1.0],
            [0.0, 0.0],
            [1.0, 0.0],
            // Back
            [0.0, 1.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            // Left
            [0.0, 1.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            // Right
            [0.0, 1.0],
            [0.0, 0.0],
            [1.0, 0.0],
            [1.0, 1.0],
            // Top
            [1.0, 0.0],
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            // Bottom
            [1.0, 1.0],
            [1.0, 0.0],
            [0.0, 0.0],
            [0.0, 1.0],
        ];

        let indices = vec![
            0, 1, 2, 2, 3, 0, // Front
            4, 5, 6, 6, 7, 4, // Back
            8, 9, 10, 10, 11, 8, // Left
            12, 13, 14, 14, 15, 12, // Right
            16, 17, 18, 18, 19, 16, // Top
            20, 21, 22, 22, 23, 20, // Bottom
        ];

        Mesh {
            positions: positions.into_iter().map(Vec3::from).collect(),
            normals: normals.into_iter().map(Vec3::from).collect(),
            uvs: uvs.into_iter().map(Vec2::from).collect(),
            indices,
        }
    }

    /// Flat square in the xz plane, facing up, uvs spanning the full quad.
    pub fn plane(size: f32) -> Mesh {
        let half = size / 2.0;

        Mesh {
            positions: vec![
                Vec3::new(-half, 0.0, -half),
                Vec3::new(half, 0.0, -half),
                Vec3::new(half, 0.0, half),
                Vec3::new(-half, 0.0, half),
            ],
            normals: vec![Vec3::Y; 4],
            uvs: vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    pub fn uv_sphere(radius: f32, segments: u32) -> Mesh {
        let mut mesh = Mesh::new();

        let mut index: usize = 0;

        for y in 0..=segments {
            let v = y as f32 / segments as f32;
            let latitude = (v * std::f32::consts::PI) - std::f32::consts::FRAC_PI_2;

            for x in 0..=segments {
                let u = x as f32 / segments as f32;
                let longitude = u * std::f32::consts::PI * 2.0;

                let normal = Vec3::new(
                    longitude.cos() * latitude.cos(),
                    latitude.sin(),
                    longitude.sin() * latitude.cos(),
                );

                mesh.positions.push(normal * radius);
                mesh.normals.push(normal);
                mesh.uvs.push(Vec2::new(u, v));

                if x > 0 && y > 0 {
                    let a = index - segments as usize - 2;
                    let b = index - segments as usize - 1;
                    let c = index - 1;
                    let d = index;

                    mesh.indices.push(a as u32);
                    mesh.indices.push(c as u32);
                    mesh.indices.push(b as u32);

                    mesh.indices.push(b as u32);
                    mesh.indices.push(c as u32);
                    mesh.indices.push(d as u32);
                }

                index += 1;
            }
        }

        mesh
    }
}
