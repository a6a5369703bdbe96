//! Render pipelines: the lit mesh pipeline, the overlay pipeline and the light uniform.

pub mod basic;
pub mod gui;
pub mod light;
