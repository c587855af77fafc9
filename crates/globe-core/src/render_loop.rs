//! Per-frame animation: orbit damping, entrance scale, marker pulse,
//! visibility culling and star drift.

use std::time::Duration;

use glam::{Mat4, Quat, Vec3};
use log::{debug, info};

use crate::camera::{Camera, CameraState};
use crate::constants::*;
use crate::orbit::OrbitControls;
use crate::pointer::PickView;
use crate::responsive::ResponsiveConfig;
use crate::scene::SceneGraph;

/// Frame metadata handed to the loop callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick {
    pub index: u64,
    /// Time since the scheduler started.
    pub now: Duration,
    /// Time since the previous tick; zero on the first.
    pub dt: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

pub type FrameCallback = Box<dyn FnMut(FrameTick) -> LoopControl>;

/// Something that calls back once per display frame until stopped.
pub trait FrameScheduler {
    fn start(&mut self, callback: FrameCallback);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Turns absolute timestamps into [`FrameTick`]s.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    index: u64,
    last: Option<Duration>,
}

impl FrameClock {
    pub fn tick(&mut self, now: Duration) -> FrameTick {
        let dt = self.last.map(|l| now.saturating_sub(l)).unwrap_or_default();
        let tick = FrameTick {
            index: self.index,
            now,
            dt,
        };
        self.index += 1;
        self.last = Some(now);
        tick
    }
}

/// Scheduler pumped by its owner: tests inject synthetic ticks and the native
/// event loop pumps it once per redraw.
#[derive(Default)]
pub struct ManualScheduler {
    callback: Option<FrameCallback>,
    clock: FrameClock,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame at `now`. Returns false when not running.
    pub fn pump(&mut self, now: Duration) -> bool {
        let Some(cb) = self.callback.as_mut() else {
            return false;
        };
        let tick = self.clock.tick(now);
        if cb(tick) == LoopControl::Stop {
            self.callback = None;
        }
        true
    }
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, callback: FrameCallback) {
        self.clock = FrameClock::default();
        self.callback = Some(callback);
    }

    fn stop(&mut self) {
        self.callback = None;
    }

    fn is_running(&self) -> bool {
        self.callback.is_some()
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

/// Grow-in of the globe. Frame-counted, monotonic and self-terminating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceAnimation {
    progress: f32,
}

impl Default for EntranceAnimation {
    fn default() -> Self {
        Self::new()
    }
}

impl EntranceAnimation {
    pub fn new() -> Self {
        Self { progress: 0.0 }
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= 1.0
    }

    /// Advance one frame. No-op once finished.
    pub fn step(&mut self) {
        if !self.is_finished() {
            self.progress = (self.progress + ENTRANCE_STEP_PER_FRAME).min(1.0);
        }
    }

    pub fn scale(&self) -> f32 {
        if self.is_finished() {
            return 1.0;
        }
        let e = ease_out_cubic(self.progress);
        ENTRANCE_INITIAL_SCALE + (1.0 - ENTRANCE_INITIAL_SCALE) * e
    }
}

/// A marker ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerInstance {
    pub marker: usize,
    pub position: Vec3,
    /// World-space sprite size.
    pub scale: f32,
    pub opacity: f32,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub tick: FrameTick,
    pub camera: Camera,
    pub globe_model: Mat4,
    pub radius: f32,
    pub star_model: Mat4,
    pub markers: Vec<MarkerInstance>,
}

#[derive(Debug, Clone)]
pub struct RenderLoop {
    orbit: OrbitControls,
    entrance: EntranceAnimation,
    star_rotation: f32,
    created_at: Duration,
    camera_state: CameraState,
    last_camera: Camera,
}

impl RenderLoop {
    pub fn new(config: &ResponsiveConfig, created_at: Duration) -> Self {
        let orbit = OrbitControls::from_config(config);
        let camera_state = CameraState::new(config.camera_distance, config.aspect());
        let last_camera = Camera::new(orbit.eye(Vec3::ZERO), camera_state);
        Self {
            orbit,
            entrance: EntranceAnimation::new(),
            star_rotation: 0.0,
            created_at,
            camera_state,
            last_camera,
        }
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    pub fn entrance(&self) -> &EntranceAnimation {
        &self.entrance
    }

    pub fn star_rotation(&self) -> f32 {
        self.star_rotation
    }

    pub fn camera(&self) -> &Camera {
        &self.last_camera
    }

    /// Apply a new viewport. The orbit distance only snaps when the
    /// breakpoint distance changes, so a user zoom survives small resizes.
    pub fn resize(&mut self, config: &ResponsiveConfig) {
        if (self.camera_state.distance - config.camera_distance).abs() > f32::EPSILON {
            self.orbit.reset_distance(config);
        }
        self.orbit.set_auto_rotate(config.auto_rotate_rad_per_sec());
        self.camera_state = CameraState::new(config.camera_distance, config.aspect());
        self.last_camera.aspect = self.camera_state.aspect;
    }

    pub fn globe_model(&self, scene: &SceneGraph) -> Mat4 {
        globe_model(scene.orientation(), self.entrance.scale())
    }

    /// Geometry for pointer rays, matching what was last drawn.
    pub fn pick_view(&self, scene: &SceneGraph, config: &ResponsiveConfig) -> PickView {
        PickView {
            camera: self.last_camera.clone(),
            globe_model: self.globe_model(scene),
            globe_radius: config.radius * self.entrance.scale(),
            marker_scale: self.entrance.scale(),
            viewport: config.viewport,
        }
    }

    pub fn tick(&mut self, tick: FrameTick, scene: &mut SceneGraph, config: &ResponsiveConfig) -> FrameOutput {
        if !self.orbit.is_enabled() && tick.now.saturating_sub(self.created_at) >= CONTROLS_ENABLE_DELAY {
            info!("[loop] orbit controls enabled");
            self.orbit.set_enabled(true);
        }

        // 1. orbit
        self.orbit.update(tick.dt.as_secs_f32());
        let camera = Camera::new(self.orbit.eye(Vec3::ZERO), self.camera_state);

        // 2. entrance
        let was_running = !self.entrance.is_finished();
        self.entrance.step();
        if was_running && self.entrance.is_finished() {
            debug!("[loop] entrance finished at frame {}", tick.index);
        }
        let entrance_scale = self.entrance.scale();
        let model = globe_model(scene.orientation(), entrance_scale);
        let center = model.transform_point3(Vec3::ZERO);

        // 3 + 4. pulse, then cull
        let t = tick.now.as_secs_f32();
        let mut markers = Vec::with_capacity(scene.markers().len());
        for (i, m) in scene.markers_mut().iter_mut().enumerate() {
            m.pulse(t);
            let world = m.world_position(&model);
            m.visible = crate::marker::is_visible(camera.eye, center, world);
            if m.visible {
                markers.push(MarkerInstance {
                    marker: i,
                    position: world,
                    scale: m.current_scale * entrance_scale,
                    opacity: m.opacity,
                });
            }
        }

        // 5. stars
        self.star_rotation += STAR_ROTATION_PER_FRAME;
        let star_model = Mat4::from_quat(
            Quat::from_rotation_y(self.star_rotation) * Quat::from_rotation_x(self.star_rotation),
        );

        self.last_camera = camera.clone();
        FrameOutput {
            tick,
            camera,
            globe_model: model,
            radius: config.radius,
            star_model,
            markers,
        }
    }
}

pub fn globe_model(orientation: Quat, scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(Vec3::splat(scale), orientation, Vec3::ZERO)
}
