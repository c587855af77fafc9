// Host-side tests for the globe engine driven the way the front-ends drive it:
// synthetic frame ticks, pointer events in CSS pixels, and overlay timers.

use std::time::Duration;

use glam::{Vec2, Vec3};
use globe_core::geo::GeoPoint;
use globe_core::location::{locations_from_json, sample_locations, Location};
use globe_core::overlay::{OverlayEvent, OverlayPhase};
use globe_core::pointer::{PointerEvent, PointerKind};
use globe_core::render_loop::{FrameClock, FrameOutput};
use globe_core::scene::SceneAssets;
use globe_core::GlobeApp;
use pretty_assertions::assert_eq;

const FRAME: Duration = Duration::from_millis(16);
const WIDE: Vec2 = Vec2::new(1440.0, 900.0);

struct Harness {
    app: GlobeApp,
    clock: FrameClock,
    now: Duration,
    last: Option<FrameOutput>,
}

impl Harness {
    fn new(locations: Vec<Location>, viewport: Vec2) -> Self {
        Self {
            app: GlobeApp::new(locations, viewport, SceneAssets::default(), Duration::ZERO),
            clock: FrameClock::default(),
            now: Duration::ZERO,
            last: None,
        }
    }

    fn frames(&mut self, n: usize) -> &FrameOutput {
        for _ in 0..n {
            let tick = self.clock.tick(self.now);
            self.last = Some(self.app.tick(tick));
            self.now += FRAME;
        }
        self.last.as_ref().expect("at least one frame")
    }

    /// Tick until a frame at or after `until` has run.
    fn run_until(&mut self, until: Duration) {
        loop {
            let at = self.now;
            self.frames(1);
            if at >= until {
                break;
            }
        }
    }

    /// Past the entrance and the controls delay.
    fn settled(locations: Vec<Location>) -> Self {
        let mut h = Self::new(locations, WIDE);
        h.frames(80);
        h
    }

    fn pointer(&mut self, kind: PointerKind, at: Vec2) {
        self.app.handle_pointer(PointerEvent::new(kind, at.x, at.y), self.now);
    }

    fn screen_of(&self, marker: usize) -> Vec2 {
        let out = self.last.as_ref().expect("rendered");
        let model = self.app.render_loop().globe_model(self.app.scene());
        let world = self.app.scene().markers()[marker].world_position(&model);
        out.camera
            .world_to_screen(world, self.app.config().viewport)
            .expect("in front of the camera")
    }

    /// Marker whose direction from the centre is closest to the camera's.
    fn most_frontal(&self) -> usize {
        let out = self.last.as_ref().expect("rendered");
        let eye = out.camera.eye.normalize();
        let model = self.app.render_loop().globe_model(self.app.scene());
        self.app
            .scene()
            .markers()
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                let da = a.world_position(&model).normalize().dot(eye);
                let db = b.world_position(&model).normalize().dot(eye);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
            .expect("markers")
    }

    fn events(&mut self) -> Vec<OverlayEvent> {
        self.app.overlay_mut().drain_events().collect()
    }
}

fn trip(id: &str, lat: f32, lng: f32) -> Location {
    Location {
        id: id.into(),
        title: id.into(),
        place_name: id.into(),
        geo: GeoPoint { lat, lng },
        host_name: "Host".into(),
        host_image: format!("{id}.jpeg"),
    }
}

const EUROPE: [&str; 6] = ["zurich", "munich", "vienna", "milan", "prague", "frankfurt"];

/// Six trips clustered in central Europe plus a handful in south-east Asia.
fn europe_and_asia() -> Vec<Location> {
    vec![
        trip("zurich", 47.37, 8.54),
        trip("munich", 48.14, 11.58),
        trip("vienna", 48.21, 14.9),
        trip("milan", 45.46, 9.19),
        trip("prague", 50.08, 14.44),
        trip("frankfurt", 50.11, 8.68),
        trip("bangkok", 15.87, 100.99),
        trip("bali", -8.34, 115.09),
        trip("hanoi", 21.03, 105.85),
        trip("kuala-lumpur", 3.14, 101.69),
    ]
}

fn id_of(h: &Harness, marker: usize) -> String {
    let loc = h.app.scene().markers()[marker].location;
    h.app.scene().location(loc).expect("location").id.clone()
}

#[test]
fn hovering_a_marker_shows_its_location() {
    let mut h = Harness::settled(sample_locations());
    let target = h.most_frontal();
    let at = h.screen_of(target);

    h.pointer(PointerKind::Move, at);

    let overlay = h.app.overlay();
    assert_eq!(overlay.phase(), OverlayPhase::Showing);
    assert_eq!(overlay.selected().map(|l| l.id.clone()), Some(id_of(&h, target)));
    // wide layouts anchor right of and above the cursor
    assert_eq!(overlay.screen_position(), at + Vec2::new(20.0, -20.0));
    assert!(h.app.scene().markers()[target].hovered);
    assert_eq!(
        h.events(),
        vec![OverlayEvent::Shown {
            location: id_of(&h, target)
        }]
    );
}

#[test]
fn moving_to_empty_space_starts_the_fade() {
    let mut h = Harness::settled(sample_locations());
    let target = h.most_frontal();
    let at = h.screen_of(target);
    h.pointer(PointerKind::Move, at);
    h.events();

    h.pointer(PointerKind::Move, Vec2::new(5.0, 5.0));

    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hiding);
    assert!(h.app.scene().markers().iter().all(|m| !m.hovered));
    assert_eq!(h.events(), vec![OverlayEvent::FadeStarted]);

    h.run_until(h.now + Duration::from_millis(400));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hidden);
    assert_eq!(h.app.overlay().selected(), None);
    assert_eq!(h.events(), vec![OverlayEvent::Released]);
}

#[test]
fn overlay_hides_after_delay_then_releases_after_fade() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    let shown_at = h.now;
    h.pointer(PointerKind::Move, at);
    h.events();

    h.run_until(shown_at + Duration::from_millis(2400));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);

    h.run_until(shown_at + Duration::from_millis(2500));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hiding);
    assert_eq!(h.events(), vec![OverlayEvent::FadeStarted]);

    h.run_until(shown_at + Duration::from_millis(2900));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hidden);
    assert_eq!(h.app.overlay().outstanding_timers(), 0);
}

#[test]
fn five_different_selections_end_in_one_release() {
    let mut h = Harness::settled(sample_locations());
    let mut last_select = h.now;
    for i in 0..5 {
        let loc = h.app.scene().location(i).expect("location").clone();
        last_select = h.now;
        h.app.overlay_mut().select(loc, Vec2::new(100.0, 100.0), last_select);
        assert_eq!(h.app.overlay().outstanding_timers(), 1);
        h.run_until(last_select + Duration::from_millis(400));
        assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);
    }
    assert_eq!(h.app.overlay().selected().map(|l| l.id.clone()), Some(id_of(&h, 4)));

    h.run_until(last_select + Duration::from_millis(2900));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hidden);
    assert_eq!(h.app.overlay().outstanding_timers(), 0);
    let events = h.events();
    assert_eq!(events.iter().filter(|e| matches!(e, OverlayEvent::Shown { .. })).count(), 5);
    assert_eq!(events.iter().filter(|e| **e == OverlayEvent::FadeStarted).count(), 1);
    assert_eq!(events.iter().filter(|e| **e == OverlayEvent::Released).count(), 1);
}

#[test]
fn rapid_selections_keep_a_single_hide_timer() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    for _ in 0..10 {
        h.pointer(PointerKind::Move, at);
        h.frames(1);
        assert_eq!(h.app.overlay().outstanding_timers(), 1);
    }
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);
    // one Shown, then only anchor moves for the same location
    let events = h.events();
    assert_eq!(events.iter().filter(|e| matches!(e, OverlayEvent::Shown { .. })).count(), 1);
    assert_eq!(events.iter().filter(|e| **e == OverlayEvent::Moved).count(), 9);
}

#[test]
fn reselecting_during_fade_cancels_cleanup() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    h.pointer(PointerKind::Move, at);
    h.pointer(PointerKind::Leave, at);
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hiding);

    h.frames(2);
    h.pointer(PointerKind::Move, at);
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);
    assert_eq!(h.app.overlay().outstanding_timers(), 1);

    // the cancelled cleanup never releases the card
    h.run_until(h.now + Duration::from_millis(1000));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);
}

#[test]
fn touch_lift_restarts_the_hide_delay() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    h.pointer(PointerKind::TouchStart, at);
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);

    h.run_until(h.now + Duration::from_millis(2000));
    let lifted = h.now;
    h.pointer(PointerKind::TouchEnd, at);

    h.run_until(lifted + Duration::from_millis(2400));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Showing);
    h.run_until(lifted + Duration::from_millis(2500));
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hiding);
}

#[test]
fn teardown_silences_every_timer() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    h.pointer(PointerKind::Move, at);

    h.app.teardown();
    h.app.teardown();
    assert!(h.app.is_torn_down());
    assert_eq!(h.app.overlay().outstanding_timers(), 0);

    h.run_until(h.now + Duration::from_secs(5));
    h.pointer(PointerKind::Move, at);
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hidden);
    assert!(h.events().is_empty());
}

#[test]
fn far_side_marker_cannot_be_picked() {
    // Europe sits roughly 97 degrees from the south-east Asia focus, well
    // past the horizon seen from the wide camera distance.
    let json = r#"[
        {"title": "Epic Europe", "location": {"name": "Europe", "lat": 48.8566, "lng": 2.3522},
         "host": {"name": "Khushbu", "image": "k.jpeg"}, "slug": "epic-europe"},
        {"title": "Thailand", "location": {"name": "Thailand", "lat": 15.87, "lng": 100.9925},
         "host": {"name": "Komal", "image": "k.jpeg"}, "slug": "thailand"},
        {"title": "Bali", "location": {"name": "Bali", "lat": -8.3405, "lng": 115.092},
         "host": {"name": "Garima", "image": "g.webp"}, "slug": "bali"}
    ]"#;
    let mut h = Harness::settled(locations_from_json(json).expect("valid"));
    let europe = h.app.scene().index_of("epic-europe").expect("europe");

    let eye = h.last.as_ref().expect("rendered").camera.eye;
    let model = h.app.render_loop().globe_model(h.app.scene());
    let world = h.app.scene().markers()[europe].world_position(&model);
    assert!(world.dot(eye) < 0.0, "europe should face away from the camera");

    let at = h.screen_of(europe);
    h.pointer(PointerKind::Move, at);
    assert_eq!(h.app.overlay().selected(), None);
    assert!(!h.app.scene().markers()[europe].hovered);

    // the facing markers still pick
    let front = h.most_frontal();
    assert_ne!(front, europe);
    let at = h.screen_of(front);
    h.pointer(PointerKind::Move, at);
    assert_eq!(h.app.overlay().selected().map(|l| l.id.as_str()), Some(id_of(&h, front).as_str()));
}

#[test]
fn european_cluster_starts_behind_the_horizon() {
    for (viewport, radius, distance) in [(Vec2::new(375.0, 700.0), 1.8, 7.0), (WIDE, 2.2, 6.5)] {
        let mut h = Harness::new(europe_and_asia(), viewport);
        h.frames(80);
        assert_eq!((h.app.config().radius, h.app.config().camera_distance), (radius, distance));

        let eye = h.last.as_ref().expect("rendered").camera.eye;
        let model = h.app.render_loop().globe_model(h.app.scene());
        for id in EUROPE {
            let marker = h.app.scene().index_of(id).expect("europe marker");
            let world = h.app.scene().markers()[marker].world_position(&model);
            // past the silhouette: the sphere hides it from the camera
            let horizon = world.length() / eye.length();
            assert!(world.normalize().dot(eye.normalize()) < horizon, "{id} should be over the horizon");

            let at = h.screen_of(marker);
            h.pointer(PointerKind::Move, at);
            assert_eq!(h.app.overlay().selected(), None, "{id} should not pick");
            assert!(!h.app.scene().markers()[marker].hovered);
        }

        let front = h.most_frontal();
        assert!(!EUROPE.contains(&id_of(&h, front).as_str()));
        let at = h.screen_of(front);
        h.pointer(PointerKind::Move, at);
        assert_eq!(h.app.overlay().selected().map(|l| l.id.clone()), Some(id_of(&h, front)));
    }
}

#[test]
fn drag_rotates_the_camera_once_controls_are_live() {
    let mut h = Harness::new(sample_locations(), WIDE);
    h.frames(2);
    let before = h.app.render_loop().orbit().azimuth();
    h.pointer(PointerKind::Down, Vec2::new(700.0, 450.0));
    h.pointer(PointerKind::Move, Vec2::new(500.0, 450.0));
    h.pointer(PointerKind::Up, Vec2::new(500.0, 450.0));
    h.frames(1);
    // still locked: only auto-rotation, which is tiny over one frame
    assert!((h.app.render_loop().orbit().azimuth() - before).abs() < 0.01);

    h.frames(70);
    let before = h.app.render_loop().orbit().azimuth();
    h.pointer(PointerKind::Down, Vec2::new(700.0, 450.0));
    h.pointer(PointerKind::Move, Vec2::new(500.0, 450.0));
    h.pointer(PointerKind::Up, Vec2::new(500.0, 450.0));
    h.frames(30);
    // dragging left swings the camera towards +azimuth
    assert!(h.app.render_loop().orbit().azimuth() - before > 0.1);
}

#[test]
fn wheel_zoom_stays_inside_limits() {
    let mut h = Harness::settled(sample_locations());
    let (min, max) = h.app.render_loop().orbit().distance_limits();
    assert_eq!((min, max), (4.5, 12.5));
    assert_eq!((min, max), (h.app.config().min_distance, h.app.config().max_distance));

    for _ in 0..200 {
        h.app.handle_wheel(-500.0);
        h.frames(1);
    }
    assert_eq!(h.app.render_loop().orbit().distance(), min);

    for _ in 0..200 {
        h.app.handle_wheel(500.0);
        h.frames(1);
    }
    assert_eq!(h.app.render_loop().orbit().distance(), max);
}

#[test]
fn replacing_locations_resets_overlay_and_bumps_generation() {
    let mut h = Harness::settled(sample_locations());
    let at = h.screen_of(h.most_frontal());
    h.pointer(PointerKind::Move, at);
    h.events();

    let json = r#"[{"title": "Bali", "location": {"name": "Bali", "lat": -8.34, "lng": 115.09},
                    "host": {"name": "Garima", "image": "g.webp"}, "slug": "bali"}]"#;
    h.app.set_locations_json(json).expect("valid");

    assert_eq!(h.app.generation(), 1);
    assert_eq!(h.app.scene().markers().len(), 1);
    assert_eq!(h.app.overlay().phase(), OverlayPhase::Hidden);
    assert_eq!(h.events(), vec![OverlayEvent::Released]);

    // the rebuilt scene still names the mounted images
    assert_eq!(h.app.scene().sphere().surface_image, SceneAssets::default().surface_image);
    assert_eq!(h.app.scene().glow_image(), SceneAssets::default().glow_image);

    // a bad payload leaves the scene alone
    assert!(h.app.set_locations_json(r#"[{"slug": "x"}]"#).is_err());
    assert_eq!(h.app.generation(), 1);
    assert_eq!(h.app.scene().markers().len(), 1);
}

#[test]
fn resize_across_a_breakpoint_moves_markers_with_the_surface() {
    let mut h = Harness::settled(sample_locations());
    h.app.resize(375.0, 700.0);
    assert!(h.app.config().narrow);
    assert_eq!(h.app.config().radius, 1.8);
    assert_eq!(h.app.render_loop().orbit().distance(), 7.0);
    assert_eq!(
        h.app.render_loop().orbit().distance_limits(),
        (h.app.config().min_distance, h.app.config().max_distance)
    );
    assert_eq!(h.app.render_loop().orbit().distance_limits(), (5.0, 13.0));
    let out = h.frames(1).clone();
    assert_eq!(out.radius, 1.8);
    for m in h.app.scene().markers() {
        assert!((m.position.length() - 1.8 * 1.035).abs() < 1e-4);
    }

    // same breakpoint: a user zoom survives
    h.app.handle_wheel(-300.0);
    h.frames(1);
    let zoomed = h.app.render_loop().orbit().distance();
    h.app.resize(400.0, 700.0);
    assert_eq!(h.app.render_loop().orbit().distance(), zoomed);
}

#[test]
fn narrow_selection_anchors_below_the_finger() {
    let mut h = Harness::new(sample_locations(), Vec2::new(375.0, 700.0));
    h.frames(80);
    let at = h.screen_of(h.most_frontal());
    h.pointer(PointerKind::TouchStart, at);
    assert_eq!(h.app.overlay().screen_position(), at + Vec2::new(-140.0, 20.0));

    let placed = h.app.place_overlay(Vec2::new(280.0, 200.0));
    assert!(placed.x >= 20.0 && placed.x + 280.0 <= 375.0 - 20.0 + 1e-3);
    assert!(!h.app.overlay().needs_placement());
}

#[test]
fn markers_sit_just_above_the_surface() {
    let h = Harness::settled(sample_locations());
    let radius = h.app.config().radius;
    for m in h.app.scene().markers() {
        assert!((m.position.length() - radius * 1.035).abs() < 1e-4);
        assert!(m.position != Vec3::ZERO);
    }
}
