use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glam::Vec2;
use globe_core::camera::ray_sphere;
use globe_core::geo::unproject;
use globe_core::location::{locations_from_json, sample_locations, Location};
use globe_core::overlay::OverlayEvent;
use globe_core::pointer::{PointerEvent, PointerKind};
use globe_core::render_loop::{FrameScheduler, FrameTick, LoopControl, ManualScheduler};
use globe_core::scene::SceneAssets;
use globe_core::GlobeApp;
use globe_render::texture::{decode_or, placeholder_glow, placeholder_surface, RgbaImage};
use globe_render::GpuState;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

const BASE_TITLE: &str = "Trip Globe";
// one wheel "line" in DOM deltaY units
const LINE_DELTA_PX: f32 = 100.0;

#[derive(Parser, Debug)]
#[command(about = "Desktop viewer for the interactive trip globe", version)]
struct Args {
    /// JSON array of trip records; the built-in sample trips when omitted
    #[arg(long)]
    locations: Option<PathBuf>,

    /// Equirectangular surface image; a placeholder when unreadable
    #[arg(long)]
    surface: Option<PathBuf>,

    /// Marker glow sprite
    #[arg(long)]
    glow: Option<PathBuf>,
}

fn load_locations(path: Option<&Path>) -> anyhow::Result<Vec<Location>> {
    let Some(path) = path else {
        return Ok(sample_locations());
    };
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    locations_from_json(&json).with_context(|| format!("parse {}", path.display()))
}

/// Read an image the scene names from disk, falling back to `placeholder`.
fn load_image(path: &str, placeholder: fn() -> RgbaImage) -> RgbaImage {
    match fs::read(path) {
        Ok(bytes) => decode_or(Some(&bytes), path, placeholder),
        Err(e) => {
            log::warn!("[assets] {path}: {e}; using placeholder");
            placeholder()
        }
    }
}

fn asset_name(path: Option<&Path>, default: &str) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| default.to_string())
}

struct Viewer {
    window: &'static Window,
    gpu: GpuState<'static>,
    app: GlobeApp,
    started: Instant,
    cursor: Vec2,
    rendered_generation: u64,
}

impl Viewer {
    fn now(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    fn logical(&self, p: PhysicalPosition<f64>) -> Vec2 {
        let l = p.to_logical::<f64>(self.window.scale_factor());
        Vec2::new(l.x as f32, l.y as f32)
    }

    fn pointer(&mut self, kind: PointerKind, at: Vec2) {
        let now = self.now();
        self.app.handle_pointer(PointerEvent::new(kind, at.x, at.y), now);
    }

    /// Log the lat/lng under the cursor, if it is over the globe.
    fn log_geo_under(&self, at: Vec2) {
        let view = self.app.render_loop().pick_view(self.app.scene(), self.app.config());
        let ray = view.camera.screen_to_world_ray(at, view.viewport);
        let centre = view.globe_model.transform_point3(glam::Vec3::ZERO);
        if let Some(t) = ray_sphere(ray, centre, view.globe_radius) {
            let local = view.globe_model.inverse().transform_point3(ray.origin + ray.dir * t);
            let geo = unproject(local);
            log::info!("[pointer] lat {:.2} lng {:.2}", geo.lat, geo.lng);
        }
    }

    fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.gpu.resize_if_needed(size.width, size.height);
        let l = size.to_logical::<f64>(self.window.scale_factor());
        self.app.resize(l.width as f32, l.height as f32);
    }

    fn frame(&mut self, tick: FrameTick) -> LoopControl {
        let out = self.app.tick(tick);
        if self.app.generation() != self.rendered_generation {
            self.gpu.rebuild_scene(self.app.scene());
            self.rendered_generation = self.app.generation();
        }
        match self.gpu.render(&out, self.app.scene()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => self.gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("[frame] GPU out of memory; stopping");
                return LoopControl::Stop;
            }
            Err(e) => log::warn!("[frame] render error: {:?}", e),
        }
        self.present_overlay();
        LoopControl::Continue
    }

    /// The card shows up as the window title.
    fn present_overlay(&mut self) {
        let events: Vec<OverlayEvent> = self.app.overlay_mut().drain_events().collect();
        for ev in events {
            match ev {
                OverlayEvent::Shown { .. } => {
                    if let Some(loc) = self.app.overlay().selected() {
                        log::info!(
                            "[overlay] {} | {} | hosted by {}",
                            loc.title,
                            loc.place_name,
                            loc.host_name
                        );
                        self.window
                            .set_title(&format!("{BASE_TITLE} - {} ({})", loc.title, loc.place_name));
                    }
                }
                OverlayEvent::Released => self.window.set_title(BASE_TITLE),
                OverlayEvent::Moved | OverlayEvent::FadeStarted => {}
            }
        }
        if self.app.overlay().needs_placement() {
            let at = self.app.place_overlay(Vec2::ZERO);
            log::debug!("[overlay] anchored at ({:.0}, {:.0})", at.x, at.y);
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Args::parse();

    let locations = load_locations(args.locations.as_deref())?;
    let assets = SceneAssets {
        surface_image: asset_name(args.surface.as_deref(), globe_core::constants::DEFAULT_SURFACE_IMAGE),
        glow_image: asset_name(args.glow.as_deref(), globe_core::constants::DEFAULT_GLOW_IMAGE),
    };

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title(BASE_TITLE)
        .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0))
        .build(&event_loop)?;
    // the surface borrows the window for the rest of the process
    let window: &'static Window = Box::leak(Box::new(window));

    let started = Instant::now();
    let size = window.inner_size();
    let logical = size.to_logical::<f64>(window.scale_factor());
    let app = GlobeApp::new(
        locations,
        Vec2::new(logical.width as f32, logical.height as f32),
        assets,
        started.elapsed(),
    );
    let surface_image = load_image(&app.scene().sphere().surface_image, placeholder_surface);
    let glow_image = load_image(app.scene().glow_image(), placeholder_glow);
    let gpu = pollster::block_on(GpuState::new(
        window,
        size.width,
        size.height,
        app.scene(),
        &surface_image,
        &glow_image,
    ))?;

    let viewer = Rc::new(RefCell::new(Viewer {
        window,
        gpu,
        app,
        started,
        cursor: Vec2::ZERO,
        rendered_generation: 0,
    }));
    let mut scheduler = ManualScheduler::new();
    let frame_viewer = viewer.clone();
    scheduler.start(Box::new(move |tick| frame_viewer.borrow_mut().frame(tick)));

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => {
            let mut v = viewer.borrow_mut();
            match event {
                WindowEvent::CloseRequested => {
                    v.app.teardown();
                    scheduler.stop();
                    elwt.exit();
                }
                WindowEvent::Resized(size) => v.resize(size),
                WindowEvent::CursorMoved { position, .. } => {
                    let at = v.logical(position);
                    v.cursor = at;
                    v.pointer(PointerKind::Move, at);
                }
                WindowEvent::CursorLeft { .. } => {
                    let at = v.cursor;
                    v.pointer(PointerKind::Leave, at);
                }
                WindowEvent::MouseInput {
                    state,
                    button: MouseButton::Left,
                    ..
                } => {
                    let kind = match state {
                        ElementState::Pressed => PointerKind::Down,
                        ElementState::Released => PointerKind::Up,
                    };
                    let at = v.cursor;
                    if kind == PointerKind::Down {
                        v.log_geo_under(at);
                    }
                    v.pointer(kind, at);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    // DOM convention: positive deltaY scrolls down, i.e. zooms out
                    let dy = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * LINE_DELTA_PX,
                        MouseScrollDelta::PixelDelta(p) => -(p.y as f32),
                    };
                    v.app.handle_wheel(dy);
                }
                WindowEvent::Touch(touch) => {
                    let kind = match touch.phase {
                        TouchPhase::Started => PointerKind::TouchStart,
                        TouchPhase::Moved => PointerKind::TouchMove,
                        TouchPhase::Ended | TouchPhase::Cancelled => PointerKind::TouchEnd,
                    };
                    let at = v.logical(touch.location);
                    v.pointer(kind, at);
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = viewer.borrow().now();
            if !scheduler.pump(now) || !scheduler.is_running() {
                elwt.exit();
                return;
            }
            viewer.borrow().window.request_redraw();
        }
        _ => {}
    })?;
    Ok(())
}
