//! The overlay toggle button.
//!
//! Layout is done in physical pixels with the origin in the top-left corner of the
//! window. The constants below are logical pixels and are multiplied by the window's
//! scale factor. The button is pinned to the top-right corner and sized around its
//! label.

use winit::dpi::PhysicalPosition;

use crate::pipelines::gui::Vertex;

/// Distance from the top window edge to the button.
pub const TOP: f32 = 40.0;
/// Distance from the right window edge to the button.
pub const RIGHT: f32 = 130.0;
pub const PADDING_X: f32 = 20.0;
pub const PADDING_Y: f32 = 10.0;
pub const FONT_SIZE: f32 = 16.0;
pub const LINE_HEIGHT: f32 = 20.0;

pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
pub const FOREGROUND: [u8; 4] = [255, 255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, position: PhysicalPosition<f64>) -> bool {
        let (x, y) = (position.x as f32, position.y as f32);
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }

    /// Two counter-clockwise triangles covering the rect, in normalized device
    /// coordinates of a `width` x `height` window.
    pub fn to_ndc_quad(&self, width: u32, height: u32) -> [Vertex; 4] {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let x0 = self.left / w * 2.0 - 1.0;
        let x1 = self.right() / w * 2.0 - 1.0;
        let y0 = 1.0 - self.bottom() / h * 2.0;
        let y1 = 1.0 - self.top / h * 2.0;
        [
            Vertex {
                position: [x0, y1, 0.0],
                tex_coords: [0.0, 0.0],
            },
            Vertex {
                position: [x0, y0, 0.0],
                tex_coords: [0.0, 1.0],
            },
            Vertex {
                position: [x1, y0, 0.0],
                tex_coords: [1.0, 1.0],
            },
            Vertex {
                position: [x1, y1, 0.0],
                tex_coords: [1.0, 0.0],
            },
        ]
    }
}

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Label, placement and pointer state of the toggle button.
#[derive(Clone, Debug)]
pub struct Button {
    label: String,
    label_size: (f32, f32),
    scale: f32,
    rect: Rect,
    hovered: bool,
    pressed: bool,
}

impl Button {
    /// `label_size` is in physical pixels, `scale` is the window's scale factor.
    pub fn new(label: &str, label_size: (f32, f32), window: (u32, u32), scale: f32) -> Self {
        Self {
            label: label.to_string(),
            label_size,
            scale,
            rect: layout(label_size, window, scale),
            hovered: false,
            pressed: false,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Top-left corner of the label text inside the button.
    pub fn label_origin(&self) -> (f32, f32) {
        (
            self.rect.left + PADDING_X * self.scale,
            self.rect.top + PADDING_Y * self.scale,
        )
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_label(&mut self, label: &str, label_size: (f32, f32), window: (u32, u32)) {
        self.label = label.to_string();
        self.label_size = label_size;
        self.rect = layout(label_size, window, self.scale);
    }

    pub fn resize(&mut self, window: (u32, u32)) {
        self.rect = layout(self.label_size, window, self.scale);
    }

    /// Moves the button to another scale factor; the label is measured again by the
    /// caller at the new scale.
    pub fn rescale(&mut self, scale: f32, label_size: (f32, f32), window: (u32, u32)) {
        self.scale = scale;
        self.label_size = label_size;
        self.rect = layout(label_size, window, scale);
    }

    /// Tracks the cursor. Returns `true` when the hover state changed.
    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> bool {
        let hovered = self.rect.contains(position);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    pub fn cursor_left(&mut self) {
        self.hovered = false;
        self.pressed = false;
    }

    /// A press over the button arms it and is consumed (returns `true`).
    pub fn press(&mut self) -> bool {
        self.pressed = self.hovered;
        self.pressed
    }

    /// A release completes a click when the press started on the button and the
    /// cursor is still over it.
    pub fn release(&mut self) -> bool {
        let clicked = self.pressed && self.hovered;
        self.pressed = false;
        clicked
    }
}

/// Places a button around a label of `label_size` pixels in a `window` of pixels.
///
/// The right edge sits [`RIGHT`] logical pixels left of the window edge but never
/// leaves the window on narrow screens.
pub fn layout(label_size: (f32, f32), window: (u32, u32), scale: f32) -> Rect {
    let width = label_size.0 + 2.0 * PADDING_X * scale;
    let height = label_size.1 + 2.0 * PADDING_Y * scale;
    let left = (window.0 as f32 - RIGHT * scale - width).max(0.0);
    Rect {
        left,
        top: TOP * scale,
        width,
        height,
    }
}

/// Label extent in physical pixels used when no font shaping is available: an average
/// glyph is a bit more than half as wide as the font is tall.
pub fn estimate_label_size(label: &str, scale: f32) -> (f32, f32) {
    (
        label.chars().count() as f32 * FONT_SIZE * 0.55 * scale,
        LINE_HEIGHT * scale,
    )
}
