use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::{Vec3, Vec4};
use prism_input::{Action, InputState, MoveAction};
use prism_render::{FrameAssembler, Renderer};
use prism_render_wgpu::{SurfaceTarget, WgpuRenderer};
use prism_scene::config::WindowConfig;
use prism_scene::{Scene, SceneConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "prism-desktop", about = "Prism desktop demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (defaults to the built-in demo scene)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// What a key does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Binding {
    Move(MoveAction),
    Trigger(Action),
}

fn bind_key(key: KeyCode) -> Option<Binding> {
    let binding = match key {
        KeyCode::KeyW => Binding::Move(MoveAction::Forward),
        KeyCode::KeyS => Binding::Move(MoveAction::Backward),
        KeyCode::KeyA => Binding::Move(MoveAction::Left),
        KeyCode::KeyD => Binding::Move(MoveAction::Right),
        KeyCode::Space => Binding::Move(MoveAction::Up),
        KeyCode::KeyX => Binding::Move(MoveAction::Down),
        KeyCode::BracketLeft => Binding::Trigger(Action::PreviousCamera),
        KeyCode::BracketRight => Binding::Trigger(Action::NextCamera),
        KeyCode::F1 => Binding::Trigger(Action::ToggleOverlay),
        KeyCode::Escape => Binding::Trigger(Action::Quit),
        _ => return None,
    };
    Some(binding)
}

/// Application state.
struct AppState {
    scene: Scene,
    window: WindowConfig,
    assembler: FrameAssembler,
    input: InputState,
    show_overlay: bool,
    last_frame: Instant,
    fps: f32,
    size: PhysicalSize<u32>,
}

/// Events that end held input. They reach the app even when egui consumed
/// them, otherwise a key or look drag released over the overlay stays on.
fn releases_input(event: &WindowEvent) -> bool {
    match event {
        WindowEvent::KeyboardInput { event, .. } => event.state == ElementState::Released,
        WindowEvent::MouseInput { state, .. } => *state == ElementState::Released,
        WindowEvent::Focused(focused) => !focused,
        _ => false,
    }
}

impl AppState {
    fn new(config: &SceneConfig) -> Result<Self> {
        let scene = Scene::from_config(config, config.window.aspect_ratio())?;
        Ok(Self {
            scene,
            window: config.window.clone(),
            assembler: FrameAssembler::new(),
            input: InputState::new(),
            show_overlay: true,
            last_frame: Instant::now(),
            fps: 0.0,
            size: PhysicalSize::new(config.window.width, config.window.height),
        })
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, repeat: bool) {
        match bind_key(key) {
            Some(Binding::Move(action)) if pressed => self.input.press(action),
            Some(Binding::Move(action)) => self.input.release(action),
            Some(Binding::Trigger(action)) if pressed && !repeat => self.input.trigger(action),
            _ => {}
        }
    }

    /// Drops held movement and mouse-look; their releases will not arrive.
    fn focus_lost(&mut self) {
        self.input.clear();
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.size = size;
        self.scene.resize(size.width, size.height);
    }

    /// Seconds since the last frame, capped so a stall does not teleport the camera.
    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;
        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps * 0.9 + instant_fps * 0.1
            };
        }
        dt
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::SidePanel::left("overlay")
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.heading(self.window.title.as_str());
                ui.separator();
                ui.label(format!("{:.0} fps", self.fps));
                ui.label(format!("Window: {} x {}", self.size.width, self.size.height));
                ui.separator();

                ui.heading("Camera");
                let index = self.scene.active_camera_index();
                let count = self.scene.camera_count();
                ui.label(format!("Active: {} / {}", index + 1, count));
                ui.horizontal(|ui| {
                    if ui.button("Previous ([)").clicked() {
                        self.scene.previous_camera();
                    }
                    if ui.button("Next (])").clicked() {
                        self.scene.next_camera();
                    }
                });
                let camera = self.scene.active_camera_mut();
                let p = camera.position();
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                let mut fov = camera.field_of_view().to_degrees();
                if ui
                    .add(egui::Slider::new(&mut fov, 20.0..=120.0).text("FOV"))
                    .changed()
                {
                    camera.set_field_of_view(fov.to_radians());
                }
                ui.separator();

                ui.heading("Entities");
                for (i, entity) in self.scene.entities_mut().iter_mut().enumerate() {
                    ui.push_id(i, |ui| {
                        egui::CollapsingHeader::new(entity.name().to_owned()).show(ui, |ui| {
                            let transform = entity.transform_mut();
                            if let Some(v) =
                                vec3_editor(ui, "Position", transform.position(), 0.1)
                            {
                                transform.set_position(v);
                            }
                            if let Some(v) =
                                vec3_editor(ui, "Rotation", transform.pitch_yaw_roll(), 0.05)
                            {
                                transform.set_rotation(v);
                            }
                            if let Some(v) = vec3_editor(ui, "Scale", transform.scale(), 0.05) {
                                transform.set_scale(v);
                            }
                        });
                    });
                }
                ui.separator();

                ui.heading("Materials");
                let handles: Vec<_> = self.scene.assets().materials().map(|(h, _)| h).collect();
                for handle in handles {
                    let Ok(material) = self.scene.assets_mut().material_mut(handle) else {
                        continue;
                    };
                    ui.push_id(handle.0, |ui| {
                        ui.horizontal(|ui| {
                            let mut tint = material.color_tint().to_array();
                            if ui.color_edit_button_rgba_unmultiplied(&mut tint).changed() {
                                material.set_color_tint(Vec4::from_array(tint));
                            }
                            ui.label(material.name.as_str());
                        });
                        let mut roughness = material.roughness();
                        if ui
                            .add(egui::Slider::new(&mut roughness, 0.0..=1.0).text("Roughness"))
                            .changed()
                        {
                            material.set_roughness(roughness);
                        }
                    });
                }

                ui.separator();
                ui.small("F1: Overlay | RMB: Look | WASD: Move | Space/X: Up/Down");
                ui.small("[ ]: Camera | Esc: Quit");
            });
    }
}

/// Three drag fields. Returns the new value when any of them changed.
fn vec3_editor(ui: &mut egui::Ui, label: &str, value: Vec3, speed: f32) -> Option<Vec3> {
    let mut v = value.to_array();
    ui.label(label);
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut v[0]).prefix("X: ").speed(speed));
        ui.add(egui::DragValue::new(&mut v[1]).prefix("Y: ").speed(speed));
        ui.add(egui::DragValue::new(&mut v[2]).prefix("Z: ").speed(speed));
    });
    let v = Vec3::from_array(v);
    (v != value).then_some(v)
}

/// Everything that exists only once the window is up.
struct GpuContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl GpuContext {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        window: &WindowConfig,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(window.title.clone())
            .with_inner_size(PhysicalSize::new(window.width, window.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("prism_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<GpuContext>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        // Overlay edits land before the scene is updated and assembled.
        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let dt = self.state.tick();
        let snapshot = self.state.input.take_snapshot();
        if snapshot.triggered(Action::Quit) {
            tracing::info!("quit requested");
            event_loop.exit();
            return;
        }
        if snapshot.triggered(Action::ToggleOverlay) {
            self.state.show_overlay = !self.state.show_overlay;
        }
        self.state.scene.update(dt, &snapshot);

        let packet = match self.state.assembler.assemble(&mut self.state.scene) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::error!("frame assembly failed: {e}");
                return;
            }
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        SurfaceTarget {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
        }
        .render(&packet, self.state.scene.assets());

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match GpuContext::new(event_loop, &self.egui_ctx, &self.state.window) {
            Ok(gpu) => {
                self.state.resize(gpu.window.inner_size());
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed && !releases_input(&event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Focused(false) => {
                self.state.focus_lost();
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(true);
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
                self.state.resize(new_size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed, repeat);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                let looking = btn_state == ElementState::Pressed;
                self.state.input.set_look_active(looking);
                if let Some(gpu) = &self.gpu {
                    gpu.window.set_cursor_visible(!looking);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .input
                .add_pointer_delta(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("prism-desktop starting");

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SceneConfig::default(),
    };
    let state = AppState::new(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
