use std::time::Duration;

// Shared tuning constants used by both web and native frontends.

// Projection
pub const MARKER_SURFACE_OFFSET: f32 = 0.035; // markers float 3.5% of the radius above the surface

// Sphere
pub const SPHERE_WIDTH_SEGMENTS: u32 = 64;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 64;
pub const SPHERE_BUMP_SCALE: f32 = 0.05;
pub const SPHERE_SHININESS: f32 = 15.0;
pub const SPHERE_SPECULAR: [f32; 3] = [0.2, 0.2, 0.2]; // 0x333333

// Lighting
pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const KEY_LIGHT_INTENSITY: f32 = 1.2;
pub const KEY_LIGHT_POSITION: [f32; 3] = [5.0, 3.0, 5.0];
pub const RIM_LIGHT_INTENSITY: f32 = 0.4;
pub const RIM_LIGHT_POSITION: [f32; 3] = [-5.0, 3.0, -5.0];

// Starfield
pub const STAR_COUNT: usize = 6000;
pub const STAR_HALF_EXTENT: f32 = 1000.0; // x/y span is [-1000, 1000]
pub const STAR_DEPTH: f32 = 2000.0; // z span is [-2000, 0], behind the sphere
pub const STAR_MAX_SIZE: f32 = 2.5;
pub const STAR_OPACITY: f32 = 0.8;
pub const STAR_ROTATION_PER_FRAME: f32 = 0.0001; // radians about X and Y
pub const STAR_SEED: u64 = 42;

// Markers
pub const MARKER_BASE_SCALE: f32 = 0.2; // sprite size at the widest radius
pub const MARKER_PULSE_AMPLITUDE: f32 = 0.03; // relative to MARKER_BASE_SCALE
pub const MARKER_PULSE_FREQUENCY: f32 = 3.0; // radians per second
pub const MARKER_HOVER_SCALE: f32 = 1.5; // multiplier over base scale
pub const MARKER_BASE_OPACITY: f32 = 0.7;
pub const MARKER_HOVER_OPACITY: f32 = 0.9;
pub const MARKER_COLOR: [f32; 3] = [0.576, 0.706, 0.878]; // 0x93b4e0
pub const MAX_MARKERS: usize = 64;

// Culling: slightly stricter than the geometric horizon
pub const VISIBILITY_ANGLE_FACTOR: f32 = 0.89;

// Entrance animation
pub const ENTRANCE_STEP_PER_FRAME: f32 = 0.015;
pub const ENTRANCE_INITIAL_SCALE: f32 = 0.001;
pub const CONTROLS_ENABLE_DELAY: Duration = Duration::from_millis(1000);

// Orbit controls
pub const ORBIT_DAMPING_FACTOR: f32 = 0.05; // fraction of the pending delta applied per 60 Hz frame
pub const ORBIT_REFERENCE_FPS: f32 = 60.0;
pub const ORBIT_ROTATE_SPEED: f32 = 0.4;
pub const ORBIT_ZOOM_BASE: f32 = 0.95; // distance multiplier per 100 wheel units
pub const ORBIT_MIN_DISTANCE_OFFSET: f32 = 2.0;
pub const ORBIT_MAX_DISTANCE_OFFSET: f32 = 6.0;
pub const ORBIT_POLAR_EPSILON: f32 = 1e-6;

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 2000.0;

// Overlay card
pub const OVERLAY_HIDE_DELAY: Duration = Duration::from_millis(2500);
pub const OVERLAY_FADE_DURATION: Duration = Duration::from_millis(400);
pub const OVERLAY_MARGIN: f32 = 20.0;
pub const OVERLAY_NARROW_OFFSET: [f32; 2] = [-140.0, 20.0]; // below, centred-ish under a finger
pub const OVERLAY_WIDE_OFFSET: [f32; 2] = [20.0, -20.0]; // right of and above the cursor
pub const OVERLAY_WIDE_FLIP_GAP: f32 = 40.0;

// Responsive breakpoints (CSS pixels)
pub const NARROW_MAX_WIDTH: f32 = 768.0;
pub const MEDIUM_MAX_WIDTH: f32 = 1024.0;
pub const NARROW_RADIUS: f32 = 1.8;
pub const MEDIUM_RADIUS: f32 = 2.0;
pub const WIDE_RADIUS: f32 = 2.2;
pub const NARROW_CAMERA_DISTANCE: f32 = 7.0;
pub const MEDIUM_CAMERA_DISTANCE: f32 = 6.0;
pub const WIDE_CAMERA_DISTANCE: f32 = 6.5;
pub const NARROW_AUTO_ROTATE_SPEED: f32 = 0.4;
pub const WIDE_AUTO_ROTATE_SPEED: f32 = 0.6;

// Default focus when no location falls in the focus region
pub const DEFAULT_FOCUS_LAT: f32 = 15.0;
pub const DEFAULT_FOCUS_LNG: f32 = 100.0;

// Asset references
pub const DEFAULT_SURFACE_IMAGE: &str = "/earth-nasa.jpg";
pub const DEFAULT_GLOW_IMAGE: &str = "/glow.png";
