//! Wiring of scene, loop, pointer pipeline and overlay into one engine that
//! front-ends drive with ticks and input events.

use std::time::Duration;

use glam::Vec2;
use log::{info, warn};

use crate::constants::STAR_SEED;
use crate::error::GlobeError;
use crate::location::{locations_from_json, validate_locations, Location};
use crate::overlay::OverlayMachine;
use crate::pointer::{OverlayRequest, PointerEvent, PointerKind, PointerPipeline};
use crate::render_loop::{FrameOutput, FrameTick, RenderLoop};
use crate::responsive::ResponsiveConfig;
use crate::scene::{SceneAssets, SceneGraph};

pub struct GlobeApp {
    config: ResponsiveConfig,
    assets: SceneAssets,
    scene: SceneGraph,
    render_loop: RenderLoop,
    pointer: PointerPipeline,
    overlay: OverlayMachine,
    /// Bumped on every scene rebuild so renderers know to re-upload.
    generation: u64,
    torn_down: bool,
}

impl GlobeApp {
    pub fn new(locations: Vec<Location>, viewport: Vec2, assets: SceneAssets, now: Duration) -> Self {
        let config = ResponsiveConfig::for_viewport(viewport.x, viewport.y);
        let scene = SceneGraph::build(locations, &config, &assets, STAR_SEED);
        info!(
            "[app] mounted {}x{} (narrow: {})",
            config.viewport.x, config.viewport.y, config.narrow
        );
        Self {
            render_loop: RenderLoop::new(&config, now),
            pointer: PointerPipeline::new(),
            overlay: OverlayMachine::new(),
            config,
            assets,
            scene,
            generation: 0,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &ResponsiveConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn overlay(&self) -> &OverlayMachine {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut OverlayMachine {
        &mut self.overlay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// One frame: animate, then fire due overlay timers.
    pub fn tick(&mut self, tick: FrameTick) -> FrameOutput {
        let out = self.render_loop.tick(tick, &mut self.scene, &self.config);
        if !self.torn_down {
            self.overlay.advance(tick.now);
        }
        out
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Duration) {
        if self.torn_down {
            return;
        }
        let orbit = self.render_loop.orbit_mut();
        match event.kind {
            PointerKind::Down | PointerKind::TouchStart => orbit.begin_drag(event.position),
            PointerKind::Move | PointerKind::TouchMove => orbit.drag_to(event.position, self.config.viewport.y),
            PointerKind::Up | PointerKind::TouchEnd | PointerKind::Leave => orbit.end_drag(),
        }
        let view = self.render_loop.pick_view(&self.scene, &self.config);
        self.pointer.handle(event, &view, &mut self.scene, &self.config);
        self.apply_requests(now);
    }

    pub fn handle_wheel(&mut self, delta_y: f32) {
        if !self.torn_down {
            self.render_loop.orbit_mut().zoom(delta_y);
        }
    }

    /// New viewport size in CSS pixels. Animations keep running.
    pub fn resize(&mut self, width: f32, height: f32) {
        let config = ResponsiveConfig::for_viewport(width, height);
        if config == self.config {
            return;
        }
        self.scene.apply_responsive(&config);
        self.render_loop.resize(&config);
        self.config = config;
    }

    /// Replace the location set. Animation state carries over; the overlay
    /// and hover state are reset.
    pub fn set_locations(&mut self, locations: Vec<Location>) -> Result<(), GlobeError> {
        let locations = validate_locations(locations)?;
        self.overlay.dismiss();
        self.pointer.reset();
        self.scene = SceneGraph::build(locations, &self.config, &self.assets, STAR_SEED);
        self.generation += 1;
        Ok(())
    }

    pub fn set_locations_json(&mut self, json: &str) -> Result<(), GlobeError> {
        let locations = locations_from_json(json)?;
        self.set_locations(locations)
    }

    /// Clamp the overlay card once its rendered size is known.
    pub fn place_overlay(&mut self, card: Vec2) -> Vec2 {
        self.overlay.place(card, self.config.viewport, self.config.narrow)
    }

    /// Cancel timers and drop hover state. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.overlay.teardown();
        self.pointer.reset();
        self.torn_down = true;
        info!("[app] torn down");
    }

    fn apply_requests(&mut self, now: Duration) {
        for req in self.pointer.drain_requests() {
            match req {
                OverlayRequest::Select { location, anchor } => match self.scene.location(location) {
                    Some(loc) => self.overlay.select(loc.clone(), anchor, now),
                    None => warn!("[app] select for unknown location {location}"),
                },
                OverlayRequest::Hide => self.overlay.request_hide(now),
                OverlayRequest::ArmHide => self.overlay.arm_hide(now),
            }
        }
    }
}
