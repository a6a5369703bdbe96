//! Button label text, shaped and drawn with glyphon.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, SwashCache,
    TextArea, TextAtlas, TextBounds, TextRenderer, Viewport,
};

use crate::{
    button::{self, Button},
    data_structures::texture::Texture,
};

pub struct LabelRenderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    viewport: Viewport,
    atlas: TextAtlas,
    renderer: TextRenderer,
    buffer: Buffer,
}

impl LabelRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        let mut font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, format);
        // Shares the depth attachment of the scene pass but never tests against it
        let renderer = TextRenderer::new(
            &mut atlas,
            device,
            wgpu::MultisampleState::default(),
            Some(wgpu::DepthStencilState {
                format: Texture::DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Always,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
        );
        let buffer = Buffer::new(
            &mut font_system,
            Metrics::new(button::FONT_SIZE, button::LINE_HEIGHT),
        );
        Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            renderer,
            buffer,
        }
    }

    /// Shapes `label` at the window's `scale` factor and returns its extent in physical
    /// pixels.
    pub fn set_label(&mut self, label: &str, scale: f32) -> (f32, f32) {
        self.buffer.set_metrics(
            &mut self.font_system,
            Metrics::new(button::FONT_SIZE * scale, button::LINE_HEIGHT * scale),
        );
        self.buffer.set_size(&mut self.font_system, None, None);
        self.buffer.set_text(
            &mut self.font_system,
            label,
            &Attrs::new().family(Family::SansSerif),
            Shaping::Advanced,
            None,
        );
        self.buffer.shape_until_scroll(&mut self.font_system, false);
        self.buffer
            .layout_runs()
            .fold((0.0f32, 0.0f32), |(width, height), run| {
                (width.max(run.line_w), height + run.line_height)
            })
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        button: &Button,
        window: (u32, u32),
    ) -> anyhow::Result<()> {
        self.viewport.update(
            queue,
            Resolution {
                width: window.0,
                height: window.1,
            },
        );
        let rect = button.rect();
        let (left, top) = button.label_origin();
        let [r, g, b, _] = button::FOREGROUND;
        self.renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            [TextArea {
                buffer: &self.buffer,
                left,
                top,
                scale: 1.0,
                bounds: TextBounds {
                    left: rect.left as i32,
                    top: rect.top as i32,
                    right: rect.right() as i32,
                    bottom: rect.bottom() as i32,
                },
                default_color: Color::rgb(r, g, b),
                custom_glyphs: &[],
            }],
            &mut self.swash_cache,
        )?;
        Ok(())
    }

    pub fn render(&self, render_pass: &mut wgpu::RenderPass<'_>) -> anyhow::Result<()> {
        self.renderer
            .render(&self.atlas, &self.viewport, render_pass)?;
        Ok(())
    }

    /// Drops glyphs that were not used by the last frame.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
