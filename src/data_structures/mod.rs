//! Viewer data structures: meshes, instances, textures and the scene graph.
//!
//! - `model` contains geometry, bounds, materials and GPU mesh resources
//! - `texture` contains decoded texture handles and GPU texture wrappers
//! - `instance` holds node transforms and their per-instance GPU layout
//! - `scene_graph` is the typed group/mesh hierarchy of a loaded model

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
