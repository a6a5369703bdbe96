//! Scene graph and hierarchical scene organization.
//!
//! A loaded model is a tree of [`SceneNode`]s. Groups carry transforms and children,
//! meshes carry geometry and the single surface-texture slot that the presenter binds
//! or clears. Mesh nodes own their GPU state and re-upload their material only when
//! marked with [`MeshNode::mark_needs_update`].

use anyhow::bail;
use cgmath::SquareMatrix;

use crate::{
    data_structures::{
        instance::Instance,
        model::{self, Bounds, Geometry, GpuMesh, Material},
        texture::{GpuTextures, TextureHandle},
    },
    render::Instanced,
};

/// Node of a loaded model: either a group of nodes or a single drawable mesh.
#[derive(Debug)]
pub enum SceneNode {
    Group(GroupNode),
    Mesh(MeshNode),
}

#[derive(Debug)]
pub struct GroupNode {
    pub name: String,
    pub local: Instance,
    world: cgmath::Matrix4<f32>,
    pub children: Vec<SceneNode>,
}

impl GroupNode {
    pub fn new(name: &str, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            world: cgmath::Matrix4::identity(),
            children,
        }
    }
}

pub struct MeshNode {
    pub name: String,
    pub local: Instance,
    world: cgmath::Matrix4<f32>,
    pub geometry: Geometry,
    pub base_color: [f32; 4],
    surface_texture: Option<TextureHandle>,
    needs_update: bool,
    gpu: Option<GpuMesh>,
}

impl std::fmt::Debug for MeshNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshNode")
            .field("name", &self.name)
            .field("vertices", &self.geometry.vertices.len())
            .field("surface_texture", &self.surface_texture)
            .field("needs_update", &self.needs_update)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}

impl MeshNode {
    pub fn new(name: &str, geometry: Geometry, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            world: cgmath::Matrix4::identity(),
            geometry,
            base_color,
            surface_texture: None,
            needs_update: true,
            gpu: None,
        }
    }

    pub fn surface_texture(&self) -> Option<&TextureHandle> {
        self.surface_texture.as_ref()
    }

    /// Replaces the surface-texture slot. `None` clears it.
    ///
    /// Call [`mark_needs_update`](Self::mark_needs_update) afterwards so the material
    /// is rebound before the next frame.
    pub fn set_surface_texture(&mut self, texture: Option<TextureHandle>) {
        self.surface_texture = texture;
    }

    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn world_transform(&self) -> &cgmath::Matrix4<f32> {
        &self.world
    }

    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.gpu.as_ref()
    }

    /// Creates the GPU mesh on first use and rebinds the material if the slot changed.
    pub fn write_to_buffers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        textures: &mut GpuTextures,
    ) {
        if !self.needs_update && self.gpu.is_some() {
            return;
        }
        let surface = textures.surface(device, queue, self.surface_texture.as_ref());
        match &mut self.gpu {
            Some(gpu) => gpu.material.rebind(device, surface, layout),
            None => {
                let material = Material::new(device, &self.name, self.base_color, surface, layout);
                self.gpu = Some(GpuMesh::new(
                    device,
                    &self.name,
                    &self.geometry,
                    &self.world,
                    material,
                ));
            }
        }
        self.needs_update = false;
    }
}

impl SceneNode {
    pub fn name(&self) -> &str {
        match self {
            SceneNode::Group(group) => &group.name,
            SceneNode::Mesh(mesh) => &mesh.name,
        }
    }

    pub fn local_transform(&self) -> &Instance {
        match self {
            SceneNode::Group(group) => &group.local,
            SceneNode::Mesh(mesh) => &mesh.local,
        }
    }

    pub fn set_local_transform(&mut self, instance: Instance) {
        match self {
            SceneNode::Group(group) => group.local = instance,
            SceneNode::Mesh(mesh) => mesh.local = instance,
        }
    }

    pub fn children(&self) -> &[SceneNode] {
        match self {
            SceneNode::Group(group) => &group.children,
            SceneNode::Mesh(_) => &[],
        }
    }

    /// Visits every mesh node at any depth. Group nodes are walked, never handed out.
    pub fn for_each_mesh_mut(&mut self, mut visit: impl FnMut(&mut MeshNode)) {
        let mut worklist: Vec<&mut SceneNode> = vec![self];
        while let Some(node) = worklist.pop() {
            match node {
                SceneNode::Mesh(mesh) => visit(mesh),
                SceneNode::Group(group) => worklist.extend(group.children.iter_mut()),
            }
        }
    }

    /// All mesh nodes at any depth, in depth-first order.
    pub fn meshes(&self) -> Vec<&MeshNode> {
        let mut meshes = Vec::new();
        let mut worklist: Vec<&SceneNode> = vec![self];
        while let Some(node) = worklist.pop() {
            match node {
                SceneNode::Mesh(mesh) => meshes.push(mesh),
                SceneNode::Group(group) => worklist.extend(group.children.iter().rev()),
            }
        }
        meshes
    }

    /// Recomputes world matrices from the local transforms below `parent`.
    pub fn update_world_transforms(&mut self, parent: &cgmath::Matrix4<f32>) {
        match self {
            SceneNode::Mesh(mesh) => mesh.world = parent * mesh.local.to_matrix(),
            SceneNode::Group(group) => {
                group.world = parent * group.local.to_matrix();
                let world = group.world;
                group
                    .children
                    .iter_mut()
                    .for_each(|child| child.update_world_transforms(&world));
            }
        }
    }

    pub fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&cgmath::Matrix4::identity());
    }

    /// World-space bounds of all mesh geometry, `None` for a scene without vertices.
    pub fn world_bounds(&self) -> Option<Bounds> {
        self.meshes()
            .into_iter()
            .filter_map(|mesh| mesh.geometry.bounds().map(|b| b.transformed(&mesh.world)))
            .reduce(Bounds::union)
    }

    /// Uploads every mesh that is new or was marked as needing an update.
    pub fn write_to_buffers(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        textures: &mut GpuTextures,
    ) {
        self.for_each_mesh_mut(|mesh| mesh.write_to_buffers(device, queue, layout, textures));
    }

    pub fn get_render(&self) -> Vec<Instanced<'_>> {
        self.meshes()
            .into_iter()
            .filter_map(|mesh| mesh.gpu.as_ref())
            .map(|mesh| Instanced { mesh })
            .collect()
    }
}

/// Converts a glTF node and its subtree.
///
/// A node with exactly one primitive and no children becomes a [`MeshNode`]. Every
/// other node becomes a [`GroupNode`] holding one mesh node per primitive followed by
/// its converted children.
pub fn to_scene_node(node: gltf::scene::Node, buf: &[Vec<u8>]) -> anyhow::Result<SceneNode> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let mut meshes: Vec<SceneNode> = match node.mesh() {
        Some(mesh) => {
            let count = mesh.primitives().len();
            mesh.primitives()
                .map(|primitive| {
                    let primitive_name = if count == 1 {
                        name.clone()
                    } else {
                        format!("{}.{}", name, primitive.index())
                    };
                    to_mesh_node(&primitive_name, &primitive, buf).map(SceneNode::Mesh)
                })
                .collect::<anyhow::Result<_>>()?
        }
        None => Vec::new(),
    };

    let mut scene_node = if meshes.len() == 1 && node.children().len() == 0 {
        meshes.remove(0)
    } else {
        let children = node
            .children()
            .map(|child| to_scene_node(child, buf))
            .collect::<anyhow::Result<Vec<_>>>()?;
        meshes.extend(children);
        SceneNode::Group(GroupNode::new(&name, meshes))
    };
    scene_node.set_local_transform(node.transform().into());
    Ok(scene_node)
}

fn to_mesh_node(
    name: &str,
    primitive: &gltf::Primitive,
    buf: &[Vec<u8>],
) -> anyhow::Result<MeshNode> {
    let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

    let mut vertices = Vec::new();
    if let Some(vertex_attribute) = reader.read_positions() {
        vertex_attribute.for_each(|vertex| {
            vertices.push(model::ModelVertex {
                position: vertex,
                ..Default::default()
            })
        });
    }
    let has_normals = match reader.read_normals() {
        Some(normal_attribute) => {
            vertices
                .iter_mut()
                .zip(normal_attribute)
                .for_each(|(vertex, normal)| vertex.normal = normal);
            true
        }
        None => false,
    };
    if let Some(tex_coord_attribute) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
        vertices
            .iter_mut()
            .zip(tex_coord_attribute)
            .for_each(|(vertex, tex_coord)| vertex.tex_coords = tex_coord);
    }

    let indices = match reader.read_indices() {
        Some(indices_raw) => indices_raw.into_u32().collect::<Vec<u32>>(),
        // Non-indexed primitives draw their vertices in order
        None => (0..vertices.len() as u32).collect(),
    };
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        bail!(
            "primitive {} of {} indexes vertex {index} but has only {} vertices",
            primitive.index(),
            name,
            vertices.len()
        );
    }
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::warn!(
            "primitive {} of {} uses {:?}, drawing it as a triangle list",
            primitive.index(),
            name,
            primitive.mode()
        );
    }

    let mut geometry = Geometry { vertices, indices };
    if !has_normals {
        geometry.compute_flat_normals();
    }
    let base_color = primitive
        .material()
        .pbr_metallic_roughness()
        .base_color_factor();

    Ok(MeshNode::new(name, geometry, base_color))
}
