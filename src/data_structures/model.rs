//! Mesh geometry and the GPU resources created from it.
//!
//! [`Geometry`] is the CPU-side result of reading a glTF primitive. [`GpuMesh`] is
//! created lazily the first time a mesh is uploaded and owns the vertex, index and
//! instance buffers plus the [`Material`] bind group that holds the surface texture.

use cgmath::{EuclideanSpace, InnerSpace, MetricSpace};
use wgpu::util::DeviceExt;

use crate::data_structures::{instance::InstanceRaw, texture::Texture};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Triangle list geometry of a single glTF primitive.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Axis-aligned bounds of all vertex positions in local space, `None` if empty.
    pub fn bounds(&self) -> Option<Bounds> {
        self.vertices
            .iter()
            .map(|v| cgmath::Point3::from(v.position))
            .fold(None, |acc: Option<Bounds>, p| {
                Some(match acc {
                    Some(bounds) => bounds.grow(p),
                    None => Bounds { min: p, max: p },
                })
            })
    }

    /// Fills in face normals for primitives that were exported without them.
    pub fn compute_flat_normals(&mut self) {
        for c in self.indices.chunks_exact(3) {
            let p0: cgmath::Vector3<f32> = self.vertices[c[0] as usize].position.into();
            let p1: cgmath::Vector3<f32> = self.vertices[c[1] as usize].position.into();
            let p2: cgmath::Vector3<f32> = self.vertices[c[2] as usize].position.into();
            let normal = (p1 - p0).cross(p2 - p0);
            let normal = if normal.magnitude2() > f32::EPSILON {
                normal.normalize()
            } else {
                cgmath::Vector3::unit_y()
            };
            for &i in c {
                self.vertices[i as usize].normal = normal.into();
            }
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Bounds {
    pub fn grow(self, p: cgmath::Point3<f32>) -> Self {
        Bounds {
            min: cgmath::Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: cgmath::Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        self.grow(other.min).grow(other.max)
    }

    pub fn center(&self) -> cgmath::Point3<f32> {
        self.min.midpoint(self.max)
    }

    pub fn radius(&self) -> f32 {
        self.min.distance(self.max) / 2.0
    }

    /// Bounds of the eight corners after applying `matrix`.
    pub fn transformed(&self, matrix: &cgmath::Matrix4<f32>) -> Self {
        use cgmath::Transform;
        let corners = [
            (self.min.x, self.min.y, self.min.z),
            (self.min.x, self.min.y, self.max.z),
            (self.min.x, self.max.y, self.min.z),
            (self.min.x, self.max.y, self.max.z),
            (self.max.x, self.min.y, self.min.z),
            (self.max.x, self.min.y, self.max.z),
            (self.max.x, self.max.y, self.min.z),
            (self.max.x, self.max.y, self.max.z),
        ];
        let first = matrix.transform_point(corners[0].into());
        corners[1..].iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |bounds, &corner| bounds.grow(matrix.transform_point(corner.into())),
        )
    }
}

/// Per-material uniform: the glTF base colour factor.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
}

pub struct Material {
    pub name: String,
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        base_color: [f32; 4],
        surface: &Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} material uniform")),
            contents: bytemuck::cast_slice(&[MaterialUniform { base_color }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = mk_material_bind_group(device, name, surface, &uniform, layout);
        Self {
            name: name.to_string(),
            uniform,
            bind_group,
        }
    }

    /// Swaps the bound surface texture. The uniform buffer is reused.
    pub fn rebind(&mut self, device: &wgpu::Device, surface: &Texture, layout: &wgpu::BindGroupLayout) {
        self.bind_group = mk_material_bind_group(device, &self.name, surface, &self.uniform, layout);
    }
}

fn mk_material_bind_group(
    device: &wgpu::Device,
    name: &str,
    surface: &Texture,
    uniform: &wgpu::Buffer,
    layout: &wgpu::BindGroupLayout,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&surface.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&surface.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform.as_entire_binding(),
            },
        ],
        label: Some(name),
    })
}

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub instance_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: Material,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        geometry: &Geometry,
        world: &cgmath::Matrix4<f32>,
        material: Material,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Instance Buffer", name)),
            contents: bytemuck::cast_slice(&[InstanceRaw::from_world(world)]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            vertex_buffer,
            index_buffer,
            instance_buffer,
            num_elements: geometry.indices.len() as u32,
            material,
        }
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(
        &mut self,
        mesh: &'a GpuMesh,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(
        &mut self,
        mesh: &'b GpuMesh,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_vertex_buffer(1, mesh.instance_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &mesh.material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }
}
