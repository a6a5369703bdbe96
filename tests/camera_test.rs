use bake_view::{
    camera::{CameraController, OrbitCamera},
    data_structures::model::Bounds,
};
use cgmath::{Deg, InnerSpace, MetricSpace, Point3, Rad};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta},
};

fn camera() -> OrbitCamera {
    OrbitCamera::new((0.0, 0.0, 0.0), 10.0, Deg(0.0), Deg(0.0))
}

#[test]
fn should_keep_the_eye_at_the_orbit_distance() {
    let mut camera = camera();
    camera.rotate(Rad(1.2), Rad(0.4));

    assert!((camera.eye().distance(camera.target) - 10.0).abs() < 1e-4);
}

#[test]
fn should_clamp_pitch_short_of_the_poles() {
    let mut camera = camera();

    camera.rotate(Rad(0.0), Rad(10.0));
    assert!(camera.pitch.0 < std::f32::consts::FRAC_PI_2);

    camera.rotate(Rad(0.0), Rad(-20.0));
    assert!(camera.pitch.0 > -std::f32::consts::FRAC_PI_2);
}

#[test]
fn should_clamp_zoom() {
    let mut camera = camera();

    camera.zoom(5.0);
    camera.zoom(9.0);
    assert!(camera.distance > 0.0);

    (0..200).for_each(|_| camera.zoom(-5.0));
    assert!(camera.distance <= 1000.0);
}

#[test]
fn should_frame_the_bounds() {
    let mut camera = camera();
    let bounds = Bounds {
        min: Point3::new(-1.0, 0.0, -1.0),
        max: Point3::new(3.0, 2.0, 1.0),
    };

    camera.frame(&bounds, Deg(50.0).into());

    assert_eq!(camera.target, Point3::new(1.0, 1.0, 0.0));
    assert!(camera.distance > bounds.radius());
    assert_eq!(camera.yaw, Rad(0.0));
}

#[test]
fn should_rotate_only_while_dragging() {
    let mut camera = camera();
    let mut controller = CameraController::new(0.01, 1.0);

    controller.handle_cursor_moved(PhysicalPosition::new(100.0, 100.0));
    controller.handle_cursor_moved(PhysicalPosition::new(150.0, 100.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert_eq!(camera.yaw, Rad(0.0));

    controller.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
    controller.handle_cursor_moved(PhysicalPosition::new(200.0, 100.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert!((camera.yaw.0 + 0.5).abs() < 1e-6);

    controller.handle_mouse_input(MouseButton::Left, ElementState::Released);
    controller.handle_cursor_moved(PhysicalPosition::new(300.0, 100.0));
    controller.update(&mut camera, Duration::from_millis(16));
    assert!((camera.yaw.0 + 0.5).abs() < 1e-6);
}

#[test]
fn should_pan_the_target_with_the_right_button() {
    let mut camera = camera();
    let mut controller = CameraController::new(0.01, 1.0);

    controller.handle_cursor_moved(PhysicalPosition::new(100.0, 100.0));
    controller.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
    controller.handle_cursor_moved(PhysicalPosition::new(100.0, 50.0));
    controller.update(&mut camera, Duration::from_millis(16));

    assert!(camera.target.y < 0.0);
    assert!((camera.eye().distance(camera.target) - 10.0).abs() < 1e-4);
}

#[test]
fn should_zoom_in_on_scroll() {
    let mut camera = camera();
    let mut controller = CameraController::new(0.01, 1.0);

    controller.handle_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
    controller.update(&mut camera, Duration::from_millis(16));

    assert!(camera.distance < 10.0);
    assert!((camera.eye() - camera.target).magnitude() < 10.0);
}
