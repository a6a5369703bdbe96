use std::path::PathBuf;

/// Start-up configuration of the viewer window, camera and lighting.
///
/// Everything has a working default; `main` runs with `ViewerConfig::default()`.
#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    /// Directory the model and texture references are resolved against (native only,
    /// the web build fetches from `<origin>/assets/`).
    pub asset_dir: PathBuf,
    pub clear_colour: wgpu::Color,
    pub camera: CameraConfig,
    pub light: LightConfig,
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fovy: cgmath::Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    /// Radians per dragged pixel
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Initial orbit angles; the distance and target are set by framing the model.
    pub yaw: cgmath::Deg<f32>,
    pub pitch: cgmath::Deg<f32>,
}

#[derive(Clone, Debug)]
pub struct LightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Baked shadows".to_string(),
            asset_dir: PathBuf::from("./").join("assets"),
            clear_colour: wgpu::Color {
                r: 0.92,
                g: 0.92,
                b: 0.92,
                a: 1.0,
            },
            camera: CameraConfig::default(),
            light: LightConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: cgmath::Deg(50.0),
            znear: 0.01,
            zfar: 2000.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
            yaw: cgmath::Deg(35.0),
            pitch: cgmath::Deg(25.0),
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 10.0, 7.5],
            color: [1.0, 1.0, 1.0],
        }
    }
}
