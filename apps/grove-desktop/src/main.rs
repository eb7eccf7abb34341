use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec3;
use grove_assets::{primitives, AssetLibrary, GradientRamp, ToonMaterial};
use grove_common::{Color, MaterialHandle, MeshHandle, NodeId, Transform};
use grove_input::{Keymap, WalkController};
use grove_render::{FrameLoop, FrameStats};
use grove_render_wgpu::WgpuRenderer;
use grove_scene::{Camera, Helper, MeshInstance, NodeKind, Scene, SceneError};
use grove_tools::{DebugPanel, SceneInspector, Tunable, TunableGroup, TunableSource};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "grove-desktop", about = "Toon-shaded grove walkthrough")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Gradient ramp image; the built-in three-tone ramp is used when the
    /// file cannot be read
    #[arg(long, default_value = "assets/images/three-tone.png")]
    ramp: PathBuf,
}

/// Demo assets plus the handles the scene refers to them by.
struct DemoAssets {
    library: AssetLibrary,
    floor_mesh: MeshHandle,
    stem_mesh: MeshHandle,
    foliage_mesh: MeshHandle,
    floor_material: MaterialHandle,
    stem_material: MaterialHandle,
    foliage_material: MaterialHandle,
}

fn build_assets() -> DemoAssets {
    let mut library = AssetLibrary::new();

    let floor_mesh = library.add_mesh("floor", primitives::plane(100.0, 100.0));
    let stem_mesh = library.add_mesh("stem", primitives::cylinder(1.0, 1.0, 7.0, 8));
    let foliage_mesh = library.add_mesh("foliage", primitives::dodecahedron(5.0));

    let floor_material = library.add_material(ToonMaterial {
        name: "grass".into(),
        color: Color::from_hex(0x0c8142),
        ..ToonMaterial::default()
    });
    let stem_material = library.add_material(ToonMaterial {
        name: "bark".into(),
        color: Color::from_hex(0x81592f),
        ..ToonMaterial::default()
    });
    let foliage_material = library.add_material(ToonMaterial {
        name: "leaves".into(),
        color: Color::from_hex(0x0c8142),
        ..ToonMaterial::default()
    });

    DemoAssets {
        library,
        floor_mesh,
        stem_mesh,
        foliage_mesh,
        floor_material,
        stem_material,
        foliage_material,
    }
}

/// Node ids the app keeps reaching for after assembly.
struct SceneIds {
    tree: NodeId,
}

/// Assemble the grove: ground plane, a two-part tree, and debug helpers,
/// under the default sun and ambient lights.
fn build_scene(assets: &DemoAssets) -> Result<(Scene, SceneIds), SceneError> {
    let mut scene = Scene {
        background: Color::from_hex(0x408efb),
        ..Scene::default()
    };

    scene.graph.add_root(
        "axes",
        Transform::default(),
        NodeKind::Helper(Helper::Axes { size: 5.0 }),
    );
    scene.graph.add_root(
        "sun_frustum",
        Transform::default(),
        NodeKind::Helper(Helper::ShadowFrustum),
    );
    scene.graph.add_root(
        "floor",
        Transform::default(),
        NodeKind::Mesh(MeshInstance {
            mesh: assets.floor_mesh,
            material: assets.floor_material,
            cast_shadow: false,
            receive_shadow: true,
        }),
    );

    let tree = scene.graph.add_root(
        "tree",
        Transform::from_position(Vec3::new(3.0, 0.0, -3.0)),
        NodeKind::Group,
    );
    scene.graph.add_child(
        tree,
        "stem",
        Transform::from_position(Vec3::new(0.0, 3.5, 0.0)),
        NodeKind::Mesh(MeshInstance {
            mesh: assets.stem_mesh,
            material: assets.stem_material,
            cast_shadow: true,
            receive_shadow: false,
        }),
    )?;
    scene.graph.add_child(
        tree,
        "foliage",
        Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
        NodeKind::Mesh(MeshInstance {
            mesh: assets.foliage_mesh,
            material: assets.foliage_material,
            cast_shadow: true,
            receive_shadow: false,
        }),
    )?;

    Ok((scene, SceneIds { tree }))
}

/// Live slider bindings over the scene, grouped the way the panel shows
/// them. Rebuilt each frame; edits land directly in the scene.
struct SceneTuning<'a> {
    scene: &'a mut Scene,
    tree: NodeId,
}

impl TunableSource for SceneTuning<'_> {
    fn tunables(&mut self) -> Vec<TunableGroup<'_>> {
        let scene = &mut *self.scene;
        let mut groups = vec![
            TunableGroup {
                name: "Sun Light",
                tunables: vec![
                    Tunable::new("x", &mut scene.sun.position.x, -100.0, 100.0, 1.0),
                    Tunable::new("y", &mut scene.sun.position.y, -100.0, 100.0, 1.0),
                    Tunable::new("z", &mut scene.sun.position.z, -100.0, 100.0, 1.0),
                    Tunable::new("intensity", &mut scene.sun.intensity, 0.0, 1.0, 0.1),
                ],
            },
            TunableGroup {
                name: "Ambient Light",
                tunables: vec![Tunable::new(
                    "intensity",
                    &mut scene.ambient.intensity,
                    0.0,
                    1.0,
                    0.1,
                )],
            },
        ];
        if let Some(node) = scene.graph.node_mut(self.tree) {
            groups.push(TunableGroup {
                name: "Tree",
                tunables: vec![
                    Tunable::new("x", &mut node.transform.position.x, -100.0, 100.0, 1.0),
                    Tunable::new("y", &mut node.transform.position.y, -100.0, 100.0, 1.0),
                    Tunable::new("z", &mut node.transform.position.z, -100.0, 100.0, 1.0),
                ],
            });
        }
        groups
    }
}

/// Panel status line for frame timing. The average covers only the recent
/// window; the count is the running total.
fn frame_status(stats: &FrameStats) -> String {
    format!(
        "Frame: {:.1} ms avg; {} frames total",
        stats.average.as_secs_f64() * 1000.0,
        stats.frames
    )
}

/// Everything the app mutates outside the GPU stack.
struct AppState {
    scene: Scene,
    ids: SceneIds,
    camera: Camera,
    keymap: Keymap,
    controller: WalkController,
    panel: DebugPanel,
    pointer_locked: bool,
}

struct GpuApp {
    state: AppState,
    assets: DemoAssets,
    ramp: GradientRamp,
    frame_loop: FrameLoop,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(ramp: GradientRamp) -> Result<Self> {
        let assets = build_assets();
        let (scene, ids) = build_scene(&assets)?;
        tracing::info!(
            nodes = scene.object_count(),
            meshes = assets.library.mesh_count(),
            materials = assets.library.material_count(),
            "demo scene assembled"
        );

        Ok(Self {
            state: AppState {
                scene,
                ids,
                camera: Camera::default(),
                keymap: Keymap::wasd(),
                controller: WalkController::default(),
                panel: DebugPanel::new(),
                pointer_locked: false,
            },
            assets,
            ramp,
            frame_loop: FrameLoop::new(),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        })
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.state.panel.toggle(),
            KeyCode::Escape => self.release_pointer(),
            _ => {
                if let Some(command) = self.state.keymap.command_for(key) {
                    self.state
                        .controller
                        .apply(command, &mut self.state.camera);
                }
            }
        }
    }

    fn capture_pointer(&mut self) {
        if self.state.pointer_locked {
            return;
        }
        let Some(window) = &self.window else {
            return;
        };
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.state.pointer_locked = true;
                tracing::debug!("pointer captured");
            }
            Err(e) => tracing::warn!("cursor grab failed: {e}"),
        }
    }

    fn release_pointer(&mut self) {
        if !self.state.pointer_locked {
            return;
        }
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.state.pointer_locked = false;
        tracing::debug!("pointer released");
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Grove")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("grove_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            &config,
            &self.assets.library,
            &self.ramp,
            self.state.scene.sun.shadow.map_size,
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(egui_winit) = &mut self.egui_winit {
            let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect = config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                // Key repeats pass through: holding a key walks at the OS
                // repeat rate, one step per event.
                if key_state == ElementState::Pressed {
                    self.handle_key(key);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.capture_pointer();
            }
            WindowEvent::Focused(false) => {
                self.release_pointer();
            }
            WindowEvent::RedrawRequested => {
                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
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

                // Stats cover the frames completed before this one.
                let stats = self.frame_loop.stats();
                let status = [
                    SceneInspector::summary(&self.state.scene).to_string(),
                    format!(
                        "Camera: ({:.1}, {:.1}, {:.1})",
                        self.state.camera.position.x,
                        self.state.camera.position.y,
                        self.state.camera.position.z
                    ),
                    frame_status(&stats),
                ];

                self.frame_loop.tick(|| {
                    if let Some(renderer) = &self.renderer {
                        renderer.render(
                            device,
                            queue,
                            &view,
                            &self.state.scene,
                            &self.state.camera,
                        );
                    }

                    let raw_input = self
                        .egui_winit
                        .as_mut()
                        .unwrap()
                        .take_egui_input(self.window.as_ref().unwrap());
                    let mut tuning = SceneTuning {
                        scene: &mut self.state.scene,
                        tree: self.state.ids.tree,
                    };
                    let panel = &self.state.panel;
                    let full_output = self.egui_ctx.run(raw_input, |ctx| {
                        panel.show(ctx, &mut tuning, &status);
                    });

                    self.egui_winit.as_mut().unwrap().handle_platform_output(
                        self.window.as_ref().unwrap(),
                        full_output.platform_output,
                    );

                    let paint_jobs = self
                        .egui_ctx
                        .tessellate(full_output.shapes, full_output.pixels_per_point);

                    let screen_descriptor = egui_wgpu::ScreenDescriptor {
                        size_in_pixels: [
                            self.config.as_ref().unwrap().width,
                            self.config.as_ref().unwrap().height,
                        ],
                        pixels_per_point: full_output.pixels_per_point,
                    };

                    {
                        let egui_renderer = self.egui_renderer.as_mut().unwrap();
                        for (id, image_delta) in &full_output.textures_delta.set {
                            egui_renderer.update_texture(device, queue, *id, image_delta);
                        }
                        let mut encoder =
                            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                                label: Some("egui_encoder"),
                            });
                        egui_renderer.update_buffers(
                            device,
                            queue,
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
                            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                        }
                        queue.submit(std::iter::once(encoder.finish()));
                        for id in &full_output.textures_delta.free {
                            egui_renderer.free_texture(id);
                        }
                    }
                });

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
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
            if self.state.pointer_locked {
                self.state.controller.look(
                    delta.0 as f32,
                    delta.1 as f32,
                    &mut self.state.camera,
                );
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("grove-desktop starting");

    let ramp = match GradientRamp::load(&cli.ramp) {
        Ok(ramp) => {
            tracing::info!(path = %cli.ramp.display(), steps = ramp.len(), "gradient ramp loaded");
            ramp
        }
        Err(e) => {
            tracing::warn!(
                path = %cli.ramp.display(),
                "ramp image not loaded ({e}), using built-in three-tone ramp"
            );
            GradientRamp::three_tone()
        }
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(ramp)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_has_fixed_cardinality() {
        let assets = build_assets();
        let (scene, ids) = build_scene(&assets).expect("build scene");
        // axes + frustum helper + floor + tree group + stem + foliage
        assert_eq!(scene.object_count(), 6);
        let tree = scene.graph.node(ids.tree).expect("tree node");
        assert_eq!(tree.children().len(), 2);
    }

    #[test]
    fn every_instance_resolves_in_the_library() {
        let assets = build_assets();
        let (scene, _) = build_scene(&assets).expect("build scene");
        for (_, node) in scene.graph.iter() {
            if let NodeKind::Mesh(mesh) = &node.kind {
                assert!(assets.library.mesh(mesh.mesh).is_some());
                assert!(assets.library.material(mesh.material).is_some());
            }
        }
    }

    #[test]
    fn floor_receives_without_casting() {
        let assets = build_assets();
        let (scene, _) = build_scene(&assets).expect("build scene");
        let (_, floor) = scene
            .graph
            .iter()
            .find(|(_, node)| node.name == "floor")
            .expect("floor node");
        let NodeKind::Mesh(mesh) = &floor.kind else {
            panic!("floor is not a mesh");
        };
        assert!(mesh.receive_shadow);
        assert!(!mesh.cast_shadow);
    }

    #[test]
    fn tree_parts_cast_shadows() {
        let assets = build_assets();
        let (scene, ids) = build_scene(&assets).expect("build scene");
        let tree = scene.graph.node(ids.tree).expect("tree node");
        for child in tree.children() {
            let node = scene.graph.node(*child).expect("tree child");
            let NodeKind::Mesh(mesh) = &node.kind else {
                panic!("tree child is not a mesh");
            };
            assert!(mesh.cast_shadow);
            assert!(!mesh.receive_shadow);
        }
    }

    #[test]
    fn tuning_exposes_sun_ambient_and_tree() {
        let assets = build_assets();
        let (mut scene, ids) = build_scene(&assets).expect("build scene");
        let mut tuning = SceneTuning {
            scene: &mut scene,
            tree: ids.tree,
        };
        let groups = tuning.tunables();
        let names: Vec<&str> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, ["Sun Light", "Ambient Light", "Tree"]);
        assert_eq!(groups[0].tunables.len(), 4);
        assert_eq!(groups[1].tunables.len(), 1);
        assert_eq!(groups[2].tunables.len(), 3);

        let sun_x = &groups[0].tunables[0];
        assert_eq!((sun_x.min, sun_x.max, sun_x.step), (-100.0, 100.0, 1.0));
        let sun_intensity = &groups[0].tunables[3];
        assert_eq!(
            (sun_intensity.min, sun_intensity.max, sun_intensity.step),
            (0.0, 1.0, 0.1)
        );
        let ambient = &groups[1].tunables[0];
        assert_eq!((ambient.min, ambient.max, ambient.step), (0.0, 1.0, 0.1));
        let tree_y = &groups[2].tunables[1];
        assert_eq!((tree_y.min, tree_y.max, tree_y.step), (-100.0, 100.0, 1.0));
    }

    #[test]
    fn tuning_edits_land_in_the_scene() {
        let assets = build_assets();
        let (mut scene, ids) = build_scene(&assets).expect("build scene");
        {
            let mut tuning = SceneTuning {
                scene: &mut scene,
                tree: ids.tree,
            };
            let mut groups = tuning.tunables();
            *groups[0].tunables[3].value = 0.4;
            *groups[2].tunables[1].value = 12.0;
        }
        assert_eq!(scene.sun.intensity, 0.4);
        let tree = scene.graph.node(ids.tree).expect("tree node");
        assert_eq!(tree.transform.position.y, 12.0);
    }

    #[test]
    fn frame_status_separates_window_average_from_total() {
        let mut frame_loop = FrameLoop::with_window(4);
        for _ in 0..6 {
            frame_loop.tick(|| {});
        }
        let status = frame_status(&frame_loop.stats());
        assert!(status.starts_with("Frame:"));
        assert!(status.ends_with("6 frames total"));
    }

    #[test]
    fn scene_constants_match_the_walkthrough() {
        let assets = build_assets();
        let (scene, ids) = build_scene(&assets).expect("build scene");
        assert_eq!(scene.background, Color::from_hex(0x408efb));
        assert_eq!(scene.sun.position, Vec3::new(100.0, 100.0, 100.0));
        assert_eq!(scene.sun.intensity, 1.0);
        assert_eq!(scene.ambient.intensity, 1.0);
        let tree = scene.graph.node(ids.tree).expect("tree node");
        assert_eq!(tree.transform.position, Vec3::new(3.0, 0.0, -3.0));
    }
}
