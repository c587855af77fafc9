//! Element ids, asset URLs and DOM-side tuning for the web front-end.

use globe_core::constants::{DEFAULT_GLOW_IMAGE, DEFAULT_SURFACE_IMAGE};

pub const CANVAS_ID: &str = "globe-canvas";
pub const LOCATIONS_ELEMENT_ID: &str = "globe-locations"; // <script type="application/json">
pub const CARD_ELEMENT_ID: &str = "globe-card";

// Backing store = CSS size * min(devicePixelRatio, MAX_PIXEL_RATIO)
pub const MAX_PIXEL_RATIO: f64 = 2.0;

// Card fade; keep in step with OVERLAY_FADE_DURATION
pub const CARD_TRANSITION: &str = "opacity 0.4s ease, transform 0.4s ease";
pub const CARD_HIDDEN_SCALE: f32 = 0.98;
pub const CARD_WIDTH_PX: u32 = 280;
// Host photo box; sized up front so the card measures the same before and after it loads
pub const CARD_IMAGE_PX: u32 = 48;
pub const CARD_ROW_MIN_HEIGHT_PX: u32 = 64;

/// Where a mounted globe finds its canvas, data and images.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeOptions {
    pub canvas_id: String,
    pub locations_element_id: String,
    pub surface_url: String,
    pub glow_url: String,
}

impl Default for GlobeOptions {
    fn default() -> Self {
        Self {
            canvas_id: CANVAS_ID.to_string(),
            locations_element_id: LOCATIONS_ELEMENT_ID.to_string(),
            surface_url: DEFAULT_SURFACE_IMAGE.to_string(),
            glow_url: DEFAULT_GLOW_IMAGE.to_string(),
        }
    }
}

impl GlobeOptions {
    pub fn for_canvas(canvas_id: &str) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            ..Self::default()
        }
    }
}
