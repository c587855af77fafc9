//! Spherical orbit camera with damped rotation, clamped zoom and idle
//! auto-rotation. Panning is not supported.

use glam::{Vec2, Vec3};

use crate::constants::*;
use crate::responsive::ResponsiveConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Angle about +Y, 0 looking from +z.
    azimuth: f32,
    /// Angle from +Y, in (0, pi).
    polar: f32,
    distance: f32,
    /// Pending rotation, bled off a fraction per frame.
    delta_azimuth: f32,
    delta_polar: f32,
    /// Multiplicative zoom applied at the next update.
    pending_zoom: f32,
    min_distance: f32,
    max_distance: f32,
    /// Radians per second when idle.
    auto_rotate: f32,
    enabled: bool,
    drag_from: Option<Vec2>,
}

impl OrbitControls {
    /// `limits` is the (min, max) zoom distance.
    pub fn new(distance: f32, limits: (f32, f32), auto_rotate_rad_per_sec: f32) -> Self {
        Self {
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance,
            delta_azimuth: 0.0,
            delta_polar: 0.0,
            pending_zoom: 1.0,
            min_distance: limits.0,
            max_distance: limits.1,
            auto_rotate: auto_rotate_rad_per_sec,
            enabled: false,
            drag_from: None,
        }
    }

    pub fn from_config(config: &ResponsiveConfig) -> Self {
        Self::new(
            config.camera_distance,
            (config.min_distance, config.max_distance),
            config.auto_rotate_rad_per_sec(),
        )
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.drag_from = None;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn distance_limits(&self) -> (f32, f32) {
        (self.min_distance, self.max_distance)
    }

    pub fn set_auto_rotate(&mut self, rad_per_sec: f32) {
        self.auto_rotate = rad_per_sec;
    }

    /// New resting distance and zoom limits (viewport breakpoint change).
    pub fn reset_distance(&mut self, config: &ResponsiveConfig) {
        self.distance = config.camera_distance;
        self.min_distance = config.min_distance;
        self.max_distance = config.max_distance;
        self.pending_zoom = 1.0;
    }

    pub fn begin_drag(&mut self, at: Vec2) {
        if self.enabled {
            self.drag_from = Some(at);
        }
    }

    /// Accumulate rotation for a pointer move; a full viewport height is
    /// `2 pi * ORBIT_ROTATE_SPEED` radians.
    pub fn drag_to(&mut self, at: Vec2, viewport_height: f32) {
        let Some(from) = self.drag_from else {
            return;
        };
        let d = at - from;
        let k = std::f32::consts::TAU * ORBIT_ROTATE_SPEED / viewport_height.max(1.0);
        self.delta_azimuth -= d.x * k;
        self.delta_polar -= d.y * k;
        self.drag_from = Some(at);
    }

    pub fn end_drag(&mut self) {
        self.drag_from = None;
    }

    /// Wheel input; positive `delta_y` zooms out.
    pub fn zoom(&mut self, delta_y: f32) {
        if !self.enabled || delta_y == 0.0 {
            return;
        }
        let step = ORBIT_ZOOM_BASE.powf(delta_y.abs() * 0.01);
        if delta_y < 0.0 {
            self.pending_zoom *= step;
        } else {
            self.pending_zoom /= step;
        }
    }

    /// Advance by `dt` seconds. Damping is exponential and frame-rate
    /// independent: at 60 Hz exactly `ORBIT_DAMPING_FACTOR` of the pending
    /// delta is applied per frame.
    pub fn update(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        if self.drag_from.is_none() {
            self.delta_azimuth += self.auto_rotate * dt;
        }
        let frames = dt * ORBIT_REFERENCE_FPS;
        let alpha = 1.0 - (1.0 - ORBIT_DAMPING_FACTOR).powf(frames);
        let applied_az = self.delta_azimuth * alpha;
        let applied_po = self.delta_polar * alpha;
        self.azimuth += applied_az;
        self.polar = (self.polar + applied_po).clamp(ORBIT_POLAR_EPSILON, std::f32::consts::PI - ORBIT_POLAR_EPSILON);
        self.delta_azimuth -= applied_az;
        self.delta_polar -= applied_po;

        self.distance = (self.distance * self.pending_zoom).clamp(self.min_distance, self.max_distance);
        self.pending_zoom = 1.0;
    }

    /// Camera position for an orbit about `target`.
    pub fn eye(&self, target: Vec3) -> Vec3 {
        let s = self.polar.sin();
        target
            + self.distance
                * Vec3::new(s * self.azimuth.sin(), self.polar.cos(), s * self.azimuth.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn starts_on_positive_z() {
        let o = OrbitControls::new(6.5, (4.5, 12.5), 0.0);
        assert!((o.eye(Vec3::ZERO) - Vec3::new(0.0, 0.0, 6.5)).length() < 1e-5);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut o = OrbitControls::new(6.5, (4.5, 12.5), 0.0);
        o.begin_drag(Vec2::ZERO);
        o.drag_to(Vec2::new(100.0, 0.0), 800.0);
        o.zoom(-500.0);
        o.update(DT);
        assert_eq!(o.azimuth(), 0.0);
        assert_eq!(o.distance(), 6.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut o = OrbitControls::new(6.5, (4.5, 12.5), 0.0);
        o.set_enabled(true);
        for _ in 0..200 {
            o.zoom(-1000.0);
            o.update(DT);
        }
        assert_eq!(o.distance(), 4.5);
        for _ in 0..200 {
            o.zoom(1000.0);
            o.update(DT);
        }
        assert_eq!(o.distance(), 12.5);
    }

    #[test]
    fn limits_come_from_the_viewport_config() {
        let narrow = ResponsiveConfig::for_viewport(375.0, 700.0);
        let mut o = OrbitControls::from_config(&narrow);
        assert_eq!(o.distance(), 7.0);
        assert_eq!(o.distance_limits(), (narrow.min_distance, narrow.max_distance));
        assert_eq!(o.distance_limits(), (5.0, 13.0));

        let medium = ResponsiveConfig::for_viewport(900.0, 700.0);
        o.reset_distance(&medium);
        assert_eq!(o.distance(), 6.0);
        assert_eq!(o.distance_limits(), (4.0, 12.0));
    }

    #[test]
    fn drag_delta_is_damped_not_instant() {
        let mut o = OrbitControls::new(6.5, (4.5, 12.5), 0.0);
        o.set_enabled(true);
        o.begin_drag(Vec2::ZERO);
        o.drag_to(Vec2::new(-200.0, 0.0), 800.0);
        o.end_drag();
        let total = std::f32::consts::TAU * ORBIT_ROTATE_SPEED * 200.0 / 800.0;
        o.update(DT);
        assert!((o.azimuth() - total * ORBIT_DAMPING_FACTOR).abs() < 1e-4);
        for _ in 0..600 {
            o.update(DT);
        }
        assert!((o.azimuth() - total).abs() < 1e-3);
    }

    #[test]
    fn damping_is_frame_rate_independent() {
        let mut a = OrbitControls::new(6.5, (4.5, 12.5), 0.0);
        let mut b = a.clone();
        for o in [&mut a, &mut b] {
            o.set_enabled(true);
            o.begin_drag(Vec2::ZERO);
            o.drag_to(Vec2::new(300.0, 0.0), 800.0);
            o.end_drag();
        }
        for _ in 0..60 {
            a.update(1.0 / 60.0);
        }
        for _ in 0..30 {
            b.update(1.0 / 30.0);
        }
        assert!((a.azimuth() - b.azimuth()).abs() < 1e-4);
    }
}
