use bake_view::button::{self, Button, Rect, estimate_label_size, layout};
use winit::dpi::PhysicalPosition;

const WINDOW: (u32, u32) = (1280, 720);
const LABEL: (f32, f32) = (140.0, 20.0);

fn at(x: f64, y: f64) -> PhysicalPosition<f64> {
    PhysicalPosition::new(x, y)
}

#[test]
fn should_anchor_the_button_to_the_top_right_corner() {
    let rect = layout(LABEL, WINDOW, 1.0);

    assert_eq!(
        rect,
        Rect {
            left: 1280.0 - 130.0 - 180.0,
            top: 40.0,
            width: 180.0,
            height: 40.0,
        }
    );
    assert_eq!(rect.right(), 1150.0);
}

#[test]
fn should_stay_inside_narrow_windows() {
    let rect = layout(LABEL, (200, 400), 1.0);

    assert_eq!(rect.left, 0.0);
}

#[test]
fn should_follow_the_window_on_resize() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);

    button.resize((800, 600));

    assert_eq!(button.rect().right(), 800.0 - button::RIGHT);
    assert_eq!(button.label_origin(), (button.rect().left + 20.0, 50.0));
}

#[test]
fn should_resize_around_a_new_label() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);
    let right = button.rect().right();

    button.set_label("Without Baked Shadows", (170.0, 20.0), WINDOW);

    assert_eq!(button.label(), "Without Baked Shadows");
    assert_eq!(button.rect().width, 210.0);
    assert_eq!(button.rect().right(), right);
}

#[test]
fn should_report_hover_changes_only() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);
    let inside = at(1000.0, 60.0);

    assert!(button.cursor_moved(inside));
    assert!(button.is_hovered());
    assert!(!button.cursor_moved(at(1001.0, 61.0)));
    assert!(button.cursor_moved(at(10.0, 10.0)));
    assert!(!button.is_hovered());
}

#[test]
fn should_click_when_press_and_release_land_on_the_button() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);
    button.cursor_moved(at(1000.0, 60.0));

    assert!(button.press());
    assert!(button.release());
}

#[test]
fn should_ignore_presses_outside_the_button() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);
    button.cursor_moved(at(400.0, 400.0));
    assert!(!button.press());

    // Dragging onto the button and releasing there is not a click
    button.cursor_moved(at(1000.0, 60.0));
    assert!(!button.release());
}

#[test]
fn should_cancel_a_click_when_the_cursor_leaves() {
    let mut button = Button::new("With Baked Shadows", LABEL, WINDOW, 1.0);
    button.cursor_moved(at(1000.0, 60.0));
    assert!(button.press());

    button.cursor_left();

    assert!(!button.release());
}

#[test]
fn should_build_a_counter_clockwise_quad_in_device_coordinates() {
    let rect = Rect {
        left: 0.0,
        top: 0.0,
        width: 50.0,
        height: 25.0,
    };

    let quad = rect.to_ndc_quad(100, 100);

    let positions: Vec<[f32; 2]> = quad
        .iter()
        .map(|vertex| [vertex.position[0], vertex.position[1]])
        .collect();
    assert_eq!(positions, [[-1.0, 1.0], [-1.0, 0.5], [0.0, 0.5], [0.0, 1.0]]);
    for triangle in button::QUAD_INDICES.chunks(3) {
        let [a, b, c] = [0, 1, 2].map(|i| positions[triangle[i] as usize]);
        let area = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(area > 0.0, "triangle {triangle:?} is clockwise");
    }
}

#[test]
fn should_estimate_wider_labels_for_longer_text() {
    let short = estimate_label_size("With Baked Shadows", 1.0);
    let long = estimate_label_size("Without Baked Shadows", 1.0);

    assert!(long.0 > short.0);
    assert_eq!(short.1, button::LINE_HEIGHT);
}

#[test]
fn should_scale_offsets_and_padding_on_high_density_displays() {
    let rect = layout((280.0, 40.0), (2560, 1440), 2.0);

    assert_eq!(
        rect,
        Rect {
            left: 2560.0 - 260.0 - 360.0,
            top: 80.0,
            width: 360.0,
            height: 80.0,
        }
    );
}

#[test]
fn should_move_the_label_with_the_scale_factor() {
    let mut button = Button::new("With Baked Shadows", LABEL, (2560, 1440), 1.0);

    button.rescale(2.0, (280.0, 40.0), (2560, 1440));

    assert_eq!(button.rect().top, 80.0);
    assert_eq!(button.rect().right(), 2560.0 - 260.0);
    assert_eq!(button.label_origin(), (button.rect().left + 40.0, 100.0));
}

#[test]
fn should_estimate_labels_in_physical_pixels() {
    let logical = estimate_label_size("With Baked Shadows", 1.0);
    let doubled = estimate_label_size("With Baked Shadows", 2.0);

    assert_eq!(doubled, (logical.0 * 2.0, logical.1 * 2.0));
}
