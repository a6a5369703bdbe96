//! Orbit camera, projection and the controller that maps pointer input onto them.
//!
//! The camera circles a target point: left drag rotates, right drag pans the target
//! and the mouse wheel changes the distance.

use std::f32::consts::FRAC_PI_2;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::data_structures::model::Bounds;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.01;
const MIN_DISTANCE: f32 = 0.05;
const MAX_DISTANCE: f32 = 1000.0;

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    /// Horizontal rotation around the target's up axis
    pub yaw: Rad<f32>,
    /// Elevation above the horizon, kept just short of the poles
    pub pitch: Rad<f32>,
}

impl OrbitCamera {
    pub fn new<T: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        target: T,
        distance: f32,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            target: target.into(),
            distance: distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            yaw: yaw.into(),
            pitch: Rad(pitch.into().0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2)),
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        self.target
            + Vector3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            )
    }

    pub fn rotate(&mut self, delta_yaw: Rad<f32>, delta_pitch: Rad<f32>) {
        self.yaw += delta_yaw;
        self.pitch = Rad((self.pitch + delta_pitch).0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
    }

    /// Positive `delta` moves closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance * (1.0 - delta * 0.1)).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Moves the target in the view plane, scaled by the distance so panning feels the
    /// same at every zoom level.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = (self.target - self.eye()).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward).normalize();

        let pan_speed = self.distance * 0.001;
        self.target += right * -delta_x * pan_speed;
        self.target += up * delta_y * pan_speed;
    }

    /// Centres the target on `bounds` and backs off until its bounding sphere fits the
    /// vertical field of view. Yaw and pitch are kept.
    pub fn frame(&mut self, bounds: &Bounds, fovy: Rad<f32>) {
        let radius = bounds.radius().max(MIN_DISTANCE);
        let half_fov = (fovy.0 / 2.0).max(0.01);
        self.target = bounds.center();
        self.distance = (radius / half_fov.sin() * 1.1).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }
}

#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.eye().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Turns window events into orbit movements.
///
/// Input is accumulated between frames and applied in [`update`](Self::update).
#[derive(Debug)]
pub struct CameraController {
    rotate_speed: f32,
    zoom_speed: f32,
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    rotate: (f32, f32),
    pan: (f32, f32),
    scroll: f32,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            drag: Drag::None,
            cursor: None,
            rotate: (0.0, 0.0),
            pan: (0.0, 0.0),
            scroll: 0.0,
        }
    }

    /// Starts a rotate (left) or pan (right) drag. The viewer calls this only for
    /// presses that did not land on the overlay button.
    pub fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        self.drag = match (button, state) {
            (MouseButton::Left, ElementState::Pressed) => Drag::Rotate,
            (MouseButton::Right, ElementState::Pressed) => Drag::Pan,
            (_, ElementState::Released) => Drag::None,
            _ => self.drag,
        };
    }

    pub fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let Some(last) = self.cursor {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            match self.drag {
                Drag::Rotate => {
                    self.rotate.0 += dx;
                    self.rotate.1 += dy;
                }
                Drag::Pan => {
                    self.pan.0 += dx;
                    self.pan.1 += dy;
                }
                Drag::None => (),
            }
        }
        self.cursor = Some(position);
    }

    pub fn handle_scroll(&mut self, delta: &MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, scroll) => *scroll,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => *scroll as f32 / 50.0,
        };
    }

    /// Feeds cursor and wheel events. Button presses are routed through
    /// [`handle_mouse_input`](Self::handle_mouse_input) by the caller.
    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor_moved(*position),
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
            }
            WindowEvent::MouseWheel { delta, .. } => self.handle_scroll(delta),
            _ => (),
        }
    }

    /// Applies the input gathered since the last frame. Pointer deltas are absolute
    /// distances, so the frame time does not scale them.
    pub fn update(&mut self, camera: &mut OrbitCamera, _dt: Duration) {
        let (dx, dy) = std::mem::take(&mut self.rotate);
        if dx != 0.0 || dy != 0.0 {
            camera.rotate(Rad(-dx * self.rotate_speed), Rad(dy * self.rotate_speed));
        }
        let (px, py) = std::mem::take(&mut self.pan);
        if px != 0.0 || py != 0.0 {
            camera.pan(px, py);
        }
        let scroll = std::mem::take(&mut self.scroll);
        if scroll != 0.0 {
            camera.zoom(scroll * self.zoom_speed);
        }
    }
}

/// Everything the render loop needs to keep the camera uniform on the GPU current.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}
