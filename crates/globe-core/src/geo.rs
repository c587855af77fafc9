use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::GlobeError;

/// A latitude/longitude pair in degrees.
///
/// `lat` lies in [-90, 90] and `lng` in [-180, 180]; both constructors keep
/// that true, so downstream projection never has to re-check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f32,
    pub lng: f32,
}

impl GeoPoint {
    pub fn new(lat: f32, lng: f32) -> Result<Self, GlobeError> {
        let ok = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if ok {
            Ok(Self { lat, lng })
        } else {
            Err(GlobeError::InvalidGeoPoint { lat, lng })
        }
    }

    /// Clamp into range. Non-finite components collapse to 0.
    pub fn clamped(lat: f32, lng: f32) -> Self {
        let fix = |v: f32, lim: f32| if v.is_finite() { v.clamp(-lim, lim) } else { 0.0 };
        Self {
            lat: fix(lat, 90.0),
            lng: fix(lng, 180.0),
        }
    }
}

/// Place a geographic point on a sphere of `radius`, lifted by
/// `surface_offset` (a fraction of the radius).
///
/// Longitude 0 faces +x and longitude -90 faces +z. This matches the
/// UV-sphere texture convention `u = (lng + 180) / 360` used by
/// [`crate::scene::sphere_mesh`].
pub fn project(geo: GeoPoint, radius: f32, surface_offset: f32) -> Vec3 {
    let phi = (90.0 - geo.lat).to_radians();
    let theta = (geo.lng + 180.0).to_radians();
    let r = radius * (1.0 + surface_offset);
    Vec3::new(
        -r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}

/// Inverse of [`project`]. Longitude is reported in [-180, 180); at the poles
/// it is undefined and comes back as whatever `atan2` yields.
pub fn unproject(position: Vec3) -> GeoPoint {
    let r = position.length();
    if r <= f32::EPSILON {
        return GeoPoint { lat: 0.0, lng: 0.0 };
    }
    let phi = (position.y / r).clamp(-1.0, 1.0).acos();
    let theta = position.z.atan2(-position.x);
    let lat = 90.0 - phi.to_degrees();
    let mut lng = theta.to_degrees() - 180.0;
    if lng < -180.0 {
        lng += 360.0;
    }
    GeoPoint::clamped(lat, lng)
}
