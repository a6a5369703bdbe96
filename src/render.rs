//! Render composition and pipeline batching.
//!
//! The frame is described as a [`Render`] tree which the shell sorts into one batch
//! per pipeline before drawing: lit meshes first, then the flat overlay.

use crate::data_structures::model::GpuMesh;

/// A mesh drawn by the basic pipeline with its own instance buffer.
pub struct Instanced<'a> {
    pub mesh: &'a GpuMesh,
}

/// Flat (2D overlay) geometry: vertex and index buffers with a bind group.
pub struct Flat<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub group: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// Specifies how parts of the frame are rendered.
///
/// - `None` renders nothing
/// - `Default(Instanced)` renders a single opaque mesh
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque meshes
/// - `GUI(Flat)` renders overlay elements on top of the scene
/// - `Composed(Vec<Render>)` recursively renders a composition of renders
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    Defaults(Vec<Instanced<'a>>),
    GUI(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>, guis: &mut Vec<Flat<'a>>) {
        match self {
            Render::Default(instanced) => basics.push(instanced),
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::GUI(flat) => guis.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(basics, guis)),
            Render::None => (),
        }
    }
}
