use glam::{Mat4, Vec3};

use crate::constants::*;
use crate::geo::{project, GeoPoint};

/// Glow sprite for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Index into the scene's location list.
    pub location: usize,
    /// Local to the globe, `radius * (1 + MARKER_SURFACE_OFFSET)` from its centre.
    pub position: Vec3,
    pub base_scale: f32,
    pub current_scale: f32,
    pub opacity: f32,
    pub visible: bool,
    pub hovered: bool,
}

impl Marker {
    pub fn new(location: usize, geo: GeoPoint, radius: f32, base_scale: f32) -> Self {
        Self {
            location,
            position: project(geo, radius, MARKER_SURFACE_OFFSET),
            base_scale,
            current_scale: base_scale,
            opacity: MARKER_BASE_OPACITY,
            visible: true,
            hovered: false,
        }
    }

    /// Follow a radius change. Keeps the hover boost if active.
    pub fn reproject(&mut self, geo: GeoPoint, radius: f32, base_scale: f32) {
        self.position = project(geo, radius, MARKER_SURFACE_OFFSET);
        self.base_scale = base_scale;
        self.current_scale = if self.hovered {
            base_scale * MARKER_HOVER_SCALE
        } else {
            base_scale
        };
    }

    pub fn boost(&mut self) {
        self.hovered = true;
        self.current_scale = self.base_scale * MARKER_HOVER_SCALE;
        self.opacity = MARKER_HOVER_OPACITY;
    }

    pub fn restore(&mut self) {
        self.hovered = false;
        self.current_scale = self.base_scale;
        self.opacity = MARKER_BASE_OPACITY;
    }

    /// Idle breathing; hovered markers keep their boost.
    pub fn pulse(&mut self, t_secs: f32) {
        if self.hovered {
            return;
        }
        let amplitude = MARKER_PULSE_AMPLITUDE * self.base_scale / MARKER_BASE_SCALE;
        self.current_scale = self.base_scale + amplitude * (t_secs * MARKER_PULSE_FREQUENCY).sin();
        self.opacity = MARKER_BASE_OPACITY;
    }

    pub fn world_position(&self, globe_model: &Mat4) -> Vec3 {
        globe_model.transform_point3(self.position)
    }
}

/// Front-hemisphere test: the angle between camera->centre and camera->marker
/// must stay under `VISIBILITY_ANGLE_FACTOR * pi/2`.
pub fn is_visible(camera_eye: Vec3, globe_center: Vec3, marker_world: Vec3) -> bool {
    let to_center = globe_center - camera_eye;
    let to_marker = marker_world - camera_eye;
    if to_marker.length_squared() <= f32::EPSILON || to_center.length_squared() <= f32::EPSILON {
        return false;
    }
    to_center.angle_between(to_marker) < VISIBILITY_ANGLE_FACTOR * std::f32::consts::FRAC_PI_2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> Marker {
        Marker::new(0, GeoPoint { lat: 10.0, lng: 20.0 }, 2.2, MARKER_BASE_SCALE)
    }

    #[test]
    fn pulse_stays_within_amplitude() {
        let mut m = marker();
        for i in 0..200 {
            m.pulse(i as f32 * 0.037);
            assert!((m.current_scale - m.base_scale).abs() <= MARKER_PULSE_AMPLITUDE + 1e-6);
        }
    }

    #[test]
    fn hover_survives_pulse_until_restored() {
        let mut m = marker();
        m.boost();
        m.pulse(1.0);
        assert!((m.current_scale - 0.3).abs() < 1e-6);
        assert_eq!(m.opacity, MARKER_HOVER_OPACITY);
        m.restore();
        assert_eq!(m.current_scale, m.base_scale);
        assert_eq!(m.opacity, MARKER_BASE_OPACITY);
    }

    #[test]
    fn reproject_tracks_radius() {
        let mut m = marker();
        m.reproject(GeoPoint { lat: 10.0, lng: 20.0 }, 1.8, 0.2 * 1.8 / 2.2);
        assert!((m.position.length() - 1.8 * 1.035).abs() < 1e-4);
    }

    #[test]
    fn near_side_visible_far_side_not() {
        let eye = Vec3::new(0.0, 0.0, 6.5);
        assert!(is_visible(eye, Vec3::ZERO, Vec3::new(0.0, 0.0, 2.2)));
        assert!(!is_visible(eye, Vec3::ZERO, Vec3::new(0.0, 0.0, 20.0)));
    }
}
