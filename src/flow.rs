//! Application event loop.
//!
//! The [`App`] owns the [`Viewer`] and, once the window exists, the GPU [`Context`]
//! together with the overlay button. Each frame follows this pattern:
//! 1. Collect window events; route clicks to the button or the orbit controls
//! 2. Update the camera uniform
//! 3. Upload meshes whose surface texture changed
//! 4. Render the scene, then the button on top
//! 5. Present the frame
//!
//! Assets are fetched off the render path: natively by blocking on a private tokio
//! runtime, on the web with `spawn_local`. Either way the result comes back as a
//! [`FlowEvent::Loaded`] through the event-loop proxy and the current variant is
//! presented again.

use std::{collections::HashSet, fmt::Debug, iter, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::{CursorIcon, Window},
};

use crate::{
    button::{Button, QUAD_INDICES},
    config::ViewerConfig,
    context::Context,
    data_structures::{model::DrawMesh, scene_graph::SceneNode, texture::Texture},
    pipelines::gui::ButtonMesh,
    presenter::{self, FetchedAssets},
    render::{Flat, Instanced, Render},
    viewer::Viewer,
};

#[cfg(feature = "ui")]
use crate::label::LabelRenderer;

pub(crate) enum FlowEvent {
    /// The GPU context is ready (web only, native initializes synchronously).
    #[allow(dead_code)]
    Initialized(anyhow::Result<Context>),
    Loaded(anyhow::Result<FetchedAssets>),
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(ctx) => f
                .debug_tuple("Initialized")
                .field(&ctx.as_ref().map(|_| "Context"))
                .finish(),
            Self::Loaded(assets) => f.debug_tuple("Loaded").field(assets).finish(),
        }
    }
}

/// The button and the GPU resources that draw it.
struct Overlay {
    button: Button,
    mesh: ButtonMesh,
    #[cfg(feature = "ui")]
    label: LabelRenderer,
}

/// GPU context and overlay, present once the window is created.
struct AppState {
    ctx: Context,
    overlay: Overlay,
    is_surface_configured: bool,
}

impl AppState {
    fn new(ctx: Context, label: &str, title: &str) -> Self {
        let window = ctx.window_size();
        let scale = ctx.window.scale_factor() as f32;
        #[cfg(feature = "ui")]
        let mut label_renderer = LabelRenderer::new(&ctx.device, &ctx.queue, ctx.config.format);
        #[cfg(feature = "ui")]
        let label_size = label_renderer.set_label(label, scale);
        #[cfg(not(feature = "ui"))]
        let label_size = {
            ctx.window.set_title(&format!("{title} | {label}"));
            crate::button::estimate_label_size(label, scale)
        };
        #[cfg(feature = "ui")]
        let _ = title;

        let button = Button::new(label, label_size, window, scale);
        let mesh = ButtonMesh::new(&ctx.device, &ctx.queue, &ctx.gui_layout, &button, window);
        Self {
            ctx,
            overlay: Overlay {
                button,
                mesh,
                #[cfg(feature = "ui")]
                label: label_renderer,
            },
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
            self.overlay.button.resize((width, height));
            self.overlay
                .mesh
                .write_to_buffer(&self.ctx.queue, &self.overlay.button, (width, height));
        }
    }

    fn set_label(&mut self, label: &str, title: &str) {
        let window = self.ctx.window_size();
        let scale = self.ctx.window.scale_factor() as f32;
        #[cfg(feature = "ui")]
        let label_size = self.overlay.label.set_label(label, scale);
        #[cfg(not(feature = "ui"))]
        let label_size = {
            self.ctx.window.set_title(&format!("{title} | {label}"));
            crate::button::estimate_label_size(label, scale)
        };
        #[cfg(feature = "ui")]
        let _ = title;

        self.overlay.button.set_label(label, label_size, window);
        self.overlay
            .mesh
            .write_to_buffer(&self.ctx.queue, &self.overlay.button, window);
    }

    /// Lays the button out again after the window moved to a display with another
    /// scale factor.
    fn rescale(&mut self, scale: f32) {
        let window = self.ctx.window_size();
        let label = self.overlay.button.label().to_string();
        #[cfg(feature = "ui")]
        let label_size = self.overlay.label.set_label(&label, scale);
        #[cfg(not(feature = "ui"))]
        let label_size = crate::button::estimate_label_size(&label, scale);

        self.overlay.button.rescale(scale, label_size, window);
        self.overlay
            .mesh
            .write_to_buffer(&self.ctx.queue, &self.overlay.button, window);
    }

    fn update_cursor(&self) {
        let icon = if self.overlay.button.is_hovered() {
            CursorIcon::Pointer
        } else {
            CursorIcon::Default
        };
        self.ctx.window.set_cursor(icon);
    }

    fn update_camera(&mut self, dt: instant::Duration) {
        let camera = &mut self.ctx.camera;
        camera.controller.update(&mut camera.camera, dt);
        camera
            .uniform
            .update_view_proj(&camera.camera, &self.ctx.projection);
        self.ctx
            .queue
            .write_buffer(&camera.buffer, 0, bytemuck::cast_slice(&[camera.uniform]));
    }

    fn render(&mut self, scene: Option<&mut SceneNode>) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let ctx = &mut self.ctx;
        let scene: Option<&SceneNode> = match scene {
            Some(scene) => {
                scene.write_to_buffers(
                    &ctx.device,
                    &ctx.queue,
                    &ctx.material_layout,
                    &mut ctx.textures,
                );
                Some(&*scene)
            }
            None => None,
        };

        #[cfg(feature = "ui")]
        if let Err(e) = self.overlay.label.prepare(
            &ctx.device,
            &ctx.queue,
            &self.overlay.button,
            (ctx.config.width, ctx.config.height),
        ) {
            log::error!("Unable to prepare the button label: {e}");
        }

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(ctx.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            let frame = Render::Composed(vec![
                scene.map_or(Render::None, |scene| Render::Defaults(scene.get_render())),
                Render::GUI(Flat {
                    vertex: &self.overlay.mesh.vertex_buffer,
                    index: &self.overlay.mesh.index_buffer,
                    group: &self.overlay.mesh.bind_group,
                    amount: QUAD_INDICES.len(),
                }),
            ]);
            let mut basics: Vec<Instanced> = Vec::new();
            let mut guis: Vec<Flat> = Vec::new();
            frame.set_pipelines(&mut basics, &mut guis);

            render_pass.set_pipeline(&ctx.pipelines.basic);
            for instanced in basics {
                render_pass.draw_mesh(instanced.mesh, &ctx.camera.bind_group, &ctx.light.bind_group);
            }

            render_pass.set_pipeline(&ctx.pipelines.gui);
            for flat in guis {
                render_pass.set_bind_group(0, flat.group, &[]);
                render_pass.set_vertex_buffer(0, flat.vertex.slice(..));
                render_pass.set_index_buffer(flat.index.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..flat.amount as u32, 0, 0..1);
            }

            #[cfg(feature = "ui")]
            if let Err(e) = self.overlay.label.render(&mut render_pass) {
                log::error!("Unable to render the button label: {e}");
            }
        }

        ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        #[cfg(feature = "ui")]
        self.overlay.label.trim();
        Ok(())
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    config: ViewerConfig,
    viewer: Viewer,
    state: Option<AppState>,
    fetching: bool,
    framed: HashSet<&'static str>,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config,
            viewer: Viewer::new(),
            state: None,
            fetching: false,
            framed: HashSet::new(),
            last_time: Instant::now(),
            error: None,
        })
    }

    /// Logs a fatal error and stops the event loop; [`run`] returns the error.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }

    fn initialized(&mut self, event_loop: &ActiveEventLoop, ctx: Context) {
        let mut state = AppState::new(ctx, self.viewer.button_label(), &self.config.title);
        let size = state.ctx.window.inner_size();
        state.resize(size.width, size.height);
        state.ctx.window.request_redraw();
        self.state = Some(state);
        self.show_current_variant(event_loop);
    }

    /// Presents the current variant, fetching its assets first if they are not cached.
    fn show_current_variant(&mut self, event_loop: &ActiveEventLoop) {
        let config = self.viewer.variant_config();
        let request = self.viewer.presenter().cache().missing(&config);
        if !request.is_empty() {
            // A fetch in flight presents the then-current variant when it lands
            if !self.fetching {
                log::info!("loading {request:?}");
                self.fetching = true;
                self.spawn_fetch(request);
            }
            return;
        }

        let scene = match self.viewer.presenter_mut().present(&config) {
            Ok(scene) => scene,
            Err(e) => return self.fail(event_loop, e),
        };
        if let Some(state) = &mut self.state {
            if self.framed.insert(config.model) {
                if let Some(bounds) = scene.world_bounds() {
                    state
                        .ctx
                        .camera
                        .camera
                        .frame(&bounds, state.ctx.projection.fovy);
                }
            }
            state.ctx.window.request_redraw();
        }
    }

    fn spawn_fetch(&self, request: presenter::AssetRequest) {
        let fut = presenter::fetch(self.config.asset_dir.clone(), request);
        let proxy = self.proxy.clone();

        #[cfg(not(target_arch = "wasm32"))]
        {
            let resolved = self.async_runtime.block_on(fut);
            if let Err(err) = proxy.send_event(FlowEvent::Loaded(resolved)) {
                log::error!("Event loop was closed before the assets arrived: {err}");
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                let resolved = fut.await;
                if let Err(err) = proxy.send_event(FlowEvent::Loaded(resolved)) {
                    log::error!("Event loop was closed before the assets arrived: {err}");
                }
            });
        }
    }

    fn toggle(&mut self, event_loop: &ActiveEventLoop) {
        self.viewer.toggle();
        let label = self.viewer.button_label();
        if let Some(state) = &mut self.state {
            state.set_label(label, &self.config.title);
        }
        self.show_current_variant(event_loop);
    }

    fn window_attributes(&self) -> anyhow::Result<winit::window::WindowAttributes> {
        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(&self.config.title);

        #[cfg(target_arch = "wasm32")]
        {
            use anyhow::Context as _;
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = web_sys::window().context("no browser window")?;
            let document = window.document().context("no document")?;
            let canvas = document
                .get_element_by_id(CANVAS_ID)
                .with_context(|| format!("no element with id \"{CANVAS_ID}\""))?;
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        Ok(window_attributes)
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window = match self
            .window_attributes()
            .and_then(|attributes| Ok(event_loop.create_window(attributes)?))
        {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e),
        };

        let init_future = {
            let config = self.config.clone();
            async move { Context::new(window, &config).await }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok(ctx) => self.initialized(event_loop, ctx),
                Err(e) => self.fail(event_loop, e),
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = init_future.await;
                if proxy.send_event(FlowEvent::Initialized(ctx)).is_err() {
                    log::error!("Event loop was closed before the context was created");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(Ok(ctx)) => self.initialized(event_loop, ctx),
            FlowEvent::Initialized(Err(e)) => self.fail(event_loop, e),
            FlowEvent::Loaded(Ok(fetched)) => {
                self.fetching = false;
                self.viewer
                    .presenter_mut()
                    .cache_mut()
                    .insert_fetched(fetched);
                // The variant may have changed while the assets were loading
                self.show_current_variant(event_loop);
            }
            FlowEvent::Loaded(Err(e)) => {
                self.fetching = false;
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // general stuff
        state.ctx.camera.controller.handle_window_events(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                state.rescale(scale_factor as f32);
                state.ctx.window.request_redraw();
            }
            WindowEvent::CursorMoved { position, .. } => {
                if state.overlay.button.cursor_moved(position) {
                    state.update_cursor();
                }
            }
            WindowEvent::CursorLeft { .. } => {
                state.overlay.button.cursor_left();
                state.update_cursor();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } if state.overlay.button.press() => (),
            WindowEvent::MouseInput {
                state: ElementState::Released,
                button: MouseButton::Left,
                ..
            } => {
                state
                    .ctx
                    .camera
                    .controller
                    .handle_mouse_input(MouseButton::Left, ElementState::Released);
                if state.overlay.button.release() {
                    self.toggle(event_loop);
                }
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => state
                .ctx
                .camera
                .controller
                .handle_mouse_input(button, button_state),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                state.update_camera(dt);
                match state.render(self.viewer.presenter_mut().scene_mut()) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the viewer window and runs until it is closed or an asset fails to load.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("Could not initialize logger: {e}").into());
        }
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
