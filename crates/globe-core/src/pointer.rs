//! Pointer hit-testing against markers.
//!
//! The pipeline owns hover boosts and emits [`OverlayRequest`]s; it never
//! touches overlay state directly.

use std::collections::VecDeque;

use glam::{Mat4, Vec2, Vec3};
use log::trace;
use smallvec::SmallVec;

use crate::camera::{ray_sphere, Camera, Ray};
use crate::responsive::ResponsiveConfig;
use crate::scene::SceneGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Move,
    Down,
    /// Button released; ends a drag, no hit-test.
    Up,
    TouchStart,
    TouchMove,
    TouchEnd,
    Leave,
}

/// A device event in viewport CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Vec2,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Vec2::new(x, y),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayRequest {
    Select { location: usize, anchor: Vec2 },
    Hide,
    ArmHide,
}

/// Geometry snapshot from the latest frame, used to cast pointer rays.
#[derive(Debug, Clone, PartialEq)]
pub struct PickView {
    pub camera: Camera,
    pub globe_model: Mat4,
    /// World radius of the sphere, entrance scale included.
    pub globe_radius: f32,
    /// World scale factor applied to marker sprites.
    pub marker_scale: f32,
    pub viewport: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub marker: usize,
    pub distance: f32,
}

/// Every visible marker the ray passes through, nearest first. Hits behind
/// the globe surface are dropped.
pub fn intersect_markers(ray: Ray, view: &PickView, scene: &SceneGraph) -> SmallVec<[Hit; 8]> {
    let globe_t = ray_sphere(ray, view.globe_model.transform_point3(Vec3::ZERO), view.globe_radius);
    let mut hits: SmallVec<[Hit; 8]> = scene
        .markers()
        .iter()
        .enumerate()
        .filter(|(_, m)| m.visible)
        .filter_map(|(i, m)| {
            let center = m.world_position(&view.globe_model);
            let radius = m.current_scale * view.marker_scale * 0.5;
            let t = ray_sphere(ray, center, radius)?;
            match globe_t {
                Some(g) if g < t && (ray.origin + ray.dir * g).distance(center) > radius => None,
                _ => Some(Hit { marker: i, distance: t }),
            }
        })
        .collect();
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

#[derive(Debug, Default)]
pub struct PointerPipeline {
    hovered: Option<usize>,
    requests: VecDeque<OverlayRequest>,
}

impl PointerPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn drain_requests(&mut self) -> std::collections::vec_deque::Drain<'_, OverlayRequest> {
        self.requests.drain(..)
    }

    pub fn handle(&mut self, event: PointerEvent, view: &PickView, scene: &mut SceneGraph, config: &ResponsiveConfig) {
        match event.kind {
            PointerKind::Move | PointerKind::Down | PointerKind::TouchStart | PointerKind::TouchMove => {
                let ray = view.camera.screen_to_world_ray(event.position, view.viewport);
                match intersect_markers(ray, view, scene).first().copied() {
                    Some(hit) => {
                        let idx = hit.marker;
                        for (i, m) in scene.markers_mut().iter_mut().enumerate() {
                            if i == idx {
                                m.boost();
                            } else {
                                m.restore();
                            }
                        }
                        self.hovered = Some(idx);
                        let location = scene.markers()[idx].location;
                        trace!("[pointer] hit marker {idx}");
                        self.requests.push_back(OverlayRequest::Select {
                            location,
                            anchor: config.card_anchor(event.position),
                        });
                    }
                    None => {
                        self.restore_all(scene);
                        self.requests.push_back(OverlayRequest::Hide);
                    }
                }
            }
            PointerKind::Leave => {
                self.restore_all(scene);
                self.requests.push_back(OverlayRequest::Hide);
            }
            PointerKind::TouchEnd => self.requests.push_back(OverlayRequest::ArmHide),
            PointerKind::Up => {}
        }
    }

    /// Drop hover state, e.g. when the scene is rebuilt.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.requests.clear();
    }

    fn restore_all(&mut self, scene: &mut SceneGraph) {
        self.hovered = None;
        for m in scene.markers_mut() {
            m.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;
    use crate::geo::GeoPoint;
    use crate::location::Location;
    use crate::scene::SceneAssets;

    fn loc(id: &str, lat: f32, lng: f32) -> Location {
        Location {
            id: id.into(),
            title: id.into(),
            place_name: id.into(),
            geo: GeoPoint { lat, lng },
            host_name: String::new(),
            host_image: String::new(),
        }
    }

    fn setup(locs: Vec<Location>) -> (SceneGraph, PickView, ResponsiveConfig) {
        let cfg = ResponsiveConfig::for_viewport(1200.0, 800.0);
        let scene = SceneGraph::build(locs, &cfg, &SceneAssets::default(), 1);
        let view = PickView {
            camera: Camera::new(Vec3::new(0.0, 0.0, cfg.camera_distance), CameraState::new(cfg.camera_distance, cfg.aspect())),
            // identity orientation: lng -90 faces the camera
            globe_model: Mat4::IDENTITY,
            globe_radius: cfg.radius,
            marker_scale: 1.0,
            viewport: cfg.viewport,
        };
        (scene, view, cfg)
    }

    #[test]
    fn front_marker_is_hit_and_boosted() {
        let (mut scene, view, cfg) = setup(vec![loc("front", 0.0, -90.0), loc("side", 0.0, 0.0)]);
        let mut p = PointerPipeline::new();
        p.handle(PointerEvent::new(PointerKind::Move, 600.0, 400.0), &view, &mut scene, &cfg);
        assert_eq!(p.hovered(), Some(0));
        assert!(scene.markers()[0].hovered);
        assert!(!scene.markers()[1].hovered);
        let reqs: Vec<_> = p.drain_requests().collect();
        assert_eq!(
            reqs,
            vec![OverlayRequest::Select {
                location: 0,
                anchor: Vec2::new(620.0, 380.0)
            }]
        );
    }

    #[test]
    fn nearest_of_overlapping_markers_wins() {
        // the farther marker is listed first; both sit on the centre ray
        let (mut scene, view, cfg) = setup(vec![loc("behind", 0.0, -90.5), loc("nearest", 0.0, -90.0)]);
        let ray = view.camera.screen_to_world_ray(Vec2::new(600.0, 400.0), view.viewport);
        let hits = intersect_markers(ray, &view, &scene);
        assert_eq!(hits.iter().map(|h| h.marker).collect::<Vec<_>>(), vec![1, 0]);
        assert!(hits[0].distance < hits[1].distance);

        let mut p = PointerPipeline::new();
        p.handle(PointerEvent::new(PointerKind::Move, 600.0, 400.0), &view, &mut scene, &cfg);
        assert_eq!(p.hovered(), Some(1));
        assert!(scene.markers()[1].hovered);
        assert!(!scene.markers()[0].hovered);
        assert_eq!(
            p.drain_requests().collect::<Vec<_>>(),
            vec![OverlayRequest::Select {
                location: 1,
                anchor: Vec2::new(620.0, 380.0)
            }]
        );
    }

    #[test]
    fn back_marker_is_occluded() {
        let (mut scene, view, cfg) = setup(vec![loc("back", 0.0, 90.0)]);
        let ray = view.camera.screen_to_world_ray(Vec2::new(600.0, 400.0), view.viewport);
        assert!(intersect_markers(ray, &view, &scene).is_empty());
        let mut p = PointerPipeline::new();
        p.handle(PointerEvent::new(PointerKind::Down, 600.0, 400.0), &view, &mut scene, &cfg);
        assert_eq!(p.drain_requests().collect::<Vec<_>>(), vec![OverlayRequest::Hide]);
    }

    #[test]
    fn leave_restores_everything() {
        let (mut scene, view, cfg) = setup(vec![loc("front", 0.0, -90.0)]);
        let mut p = PointerPipeline::new();
        p.handle(PointerEvent::new(PointerKind::Move, 600.0, 400.0), &view, &mut scene, &cfg);
        p.handle(PointerEvent::new(PointerKind::Leave, 0.0, 0.0), &view, &mut scene, &cfg);
        assert!(scene.markers().iter().all(|m| !m.hovered));
        assert_eq!(p.hovered(), None);
    }

    #[test]
    fn touch_end_arms_hide() {
        let (mut scene, view, cfg) = setup(vec![]);
        let mut p = PointerPipeline::new();
        p.handle(PointerEvent::new(PointerKind::TouchEnd, 0.0, 0.0), &view, &mut scene, &cfg);
        assert_eq!(p.drain_requests().collect::<Vec<_>>(), vec![OverlayRequest::ArmHide]);
    }
}
