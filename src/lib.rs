//! bake-view
//!
//! A single-window glTF viewer that shows one of two fixed variants of a scene: the
//! plain model, or a second model with a baked lighting texture applied to every mesh.
//! One overlay button toggles between them; the camera orbits the model. Runs natively
//! and in the browser (WebGL through wgpu).
//!
//! High-level modules
//! - `viewer`: view state, variants and the button label
//! - `presenter`: asset cache, fetching and binding the surface texture onto meshes
//! - `button`: layout and hit-testing of the overlay button
//! - `camera`: orbit camera, controller and uniforms for view/projection
//! - `config`: start-up configuration
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, meshes, instances and textures
//! - `flow`: the winit event loop
//! - `pipelines`: render pipelines (basic, gui, light)
//! - `resources`: helpers to load models and textures
//! - `render`: render composition for batching draws per pipeline
//!

pub mod button;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
#[cfg(feature = "ui")]
pub mod label;
pub mod pipelines;
pub mod presenter;
pub mod render;
pub mod resources;
pub mod viewer;

pub use config::ViewerConfig;
pub use flow::run;
pub use presenter::{AssetCache, ModelPresenter};
pub use viewer::{Variant, VariantConfig, ViewState, Viewer};

/// Browser entry point: renders into the `<canvas id="canvas">` element.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run(ViewerConfig::default()).map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{e:#}")))
}
