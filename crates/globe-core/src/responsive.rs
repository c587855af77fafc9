use glam::Vec2;

use crate::constants::*;

/// Every viewport-derived parameter in one place.
///
/// Recomputed on mount and on every resize, then applied in place to the
/// camera, orbit limits and markers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponsiveConfig {
    /// Viewport size in CSS pixels.
    pub viewport: Vec2,
    pub narrow: bool,
    pub radius: f32,
    pub camera_distance: f32,
    /// OrbitControls units; see [`ResponsiveConfig::auto_rotate_rad_per_sec`].
    pub auto_rotate_speed: f32,
    pub marker_base_scale: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ResponsiveConfig {
    pub fn for_viewport(width: f32, height: f32) -> Self {
        let width = width.max(1.0);
        let height = height.max(1.0);
        let narrow = width <= NARROW_MAX_WIDTH;
        let radius = radius_for_width(width);
        let camera_distance = camera_distance_for_width(width);
        Self {
            viewport: Vec2::new(width, height),
            narrow,
            radius,
            camera_distance,
            auto_rotate_speed: if narrow {
                NARROW_AUTO_ROTATE_SPEED
            } else {
                WIDE_AUTO_ROTATE_SPEED
            },
            marker_base_scale: MARKER_BASE_SCALE * radius / WIDE_RADIUS,
            min_distance: camera_distance - ORBIT_MIN_DISTANCE_OFFSET,
            max_distance: camera_distance + ORBIT_MAX_DISTANCE_OFFSET,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.x / self.viewport.y
    }

    /// A full turn every `60 / speed` seconds.
    pub fn auto_rotate_rad_per_sec(&self) -> f32 {
        std::f32::consts::TAU / 60.0 * self.auto_rotate_speed
    }

    /// Where the overlay card should be anchored for a pointer at `pointer`.
    pub fn card_anchor(&self, pointer: Vec2) -> Vec2 {
        let offset = if self.narrow {
            OVERLAY_NARROW_OFFSET
        } else {
            OVERLAY_WIDE_OFFSET
        };
        pointer + Vec2::from(offset)
    }
}

pub fn radius_for_width(width: f32) -> f32 {
    if width <= NARROW_MAX_WIDTH {
        NARROW_RADIUS
    } else if width <= MEDIUM_MAX_WIDTH {
        MEDIUM_RADIUS
    } else {
        WIDE_RADIUS
    }
}

pub fn camera_distance_for_width(width: f32) -> f32 {
    if width <= NARROW_MAX_WIDTH {
        NARROW_CAMERA_DISTANCE
    } else if width <= MEDIUM_MAX_WIDTH {
        MEDIUM_CAMERA_DISTANCE
    } else {
        WIDE_CAMERA_DISTANCE
    }
}
