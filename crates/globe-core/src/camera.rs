//! Perspective camera and the screen/world conversions built on it.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::constants::{CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR};

/// Field of view, orbit distance and aspect as derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub fov_deg: f32,
    pub distance: f32,
    pub aspect: f32,
}

impl CameraState {
    pub fn new(distance: f32, aspect: f32) -> Self {
        Self {
            fov_deg: CAMERA_FOV_DEG,
            distance,
            aspect,
        }
    }
}

/// Right-handed camera with perspective projection.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(eye: Vec3, state: CameraState) -> Self {
        Self {
            eye,
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: state.aspect,
            fovy_radians: state.fov_deg.to_radians(),
            znear: CAMERA_NEAR,
            zfar: CAMERA_FAR,
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a viewport point given in CSS pixels.
    pub fn screen_to_world_ray(&self, pointer: Vec2, viewport: Vec2) -> Ray {
        let ndc_x = 2.0 * pointer.x / viewport.x.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * pointer.y / viewport.y.max(1.0);
        let inv = self.view_proj().inverse();
        let far = inv * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        let far = far.truncate() / far.w;
        Ray {
            origin: self.eye,
            dir: (far - self.eye).normalize_or_zero(),
        }
    }

    /// Project a world point to viewport pixels; `None` when behind the camera.
    pub fn world_to_screen(&self, p: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_proj() * p.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Nearest non-negative hit distance along a unit-length ray.
#[inline]
pub fn ray_sphere(ray: Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    (t >= 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 6.5), CameraState::new(6.5, 1.5))
    }

    #[test]
    fn centre_ray_points_at_target() {
        let ray = camera().screen_to_world_ray(Vec2::new(600.0, 400.0), Vec2::new(1200.0, 800.0));
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn screen_round_trip() {
        let cam = camera();
        let vp = Vec2::new(1200.0, 800.0);
        let p = Vec3::new(0.7, -0.4, 1.2);
        let s = cam.world_to_screen(p, vp).expect("in front");
        let ray = cam.screen_to_world_ray(s, vp);
        let to_p = (p - ray.origin).normalize();
        assert!(ray.dir.dot(to_p) > 0.9999);
    }

    #[test]
    fn ray_sphere_hits_front_face() {
        let ray = Ray { origin: Vec3::new(0.0, 0.0, 5.0), dir: Vec3::NEG_Z };
        let t = ray_sphere(ray, Vec3::ZERO, 1.0).expect("hit");
        assert!((t - 4.0).abs() < 1e-5);
        assert!(ray_sphere(ray, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
    }
}
