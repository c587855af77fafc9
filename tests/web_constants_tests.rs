// Host-side tests for the web front-end's constants, mount options and card
// styles. The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
#[path = "../src/constants.rs"]
mod constants;
#[path = "../src/card_style.rs"]
mod card_style;

use card_style::*;
use constants::*;
use glam::Vec2;
use pretty_assertions::assert_eq;

#[test]
fn default_options_point_at_the_page_elements() {
    let opts = GlobeOptions::default();
    assert_eq!(opts.canvas_id, CANVAS_ID);
    assert_eq!(opts.locations_element_id, LOCATIONS_ELEMENT_ID);
    assert_eq!(opts.surface_url, globe_core::constants::DEFAULT_SURFACE_IMAGE);
    assert_eq!(opts.glow_url, globe_core::constants::DEFAULT_GLOW_IMAGE);
}

#[test]
fn for_canvas_overrides_only_the_canvas() {
    let opts = GlobeOptions::for_canvas("hero-globe");
    assert_eq!(
        opts,
        GlobeOptions {
            canvas_id: "hero-globe".to_string(),
            ..GlobeOptions::default()
        }
    );
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn card_styling_is_sane() {
    assert!(MAX_PIXEL_RATIO >= 1.0);
    assert!(CARD_HIDDEN_SCALE > 0.9 && CARD_HIDDEN_SCALE < 1.0);
    // the CSS fade must last as long as the overlay's cleanup timer
    let secs = globe_core::constants::OVERLAY_FADE_DURATION.as_secs_f32();
    assert!(CARD_TRANSITION.contains(&format!("{secs}s")));
    assert!(CARD_WIDTH_PX as f32 + 2.0 * globe_core::constants::OVERLAY_MARGIN <= 375.0);
}

#[test]
fn card_image_has_a_fixed_box() {
    // the card is measured before the photo loads, so no dimension may depend on it
    let img = image_style();
    assert!(img.contains(&format!("width:{CARD_IMAGE_PX}px;")));
    assert!(img.contains(&format!("height:{CARD_IMAGE_PX}px;")));
    assert!(img.contains("flex:none"));
    assert!(!img.contains('%'));
    assert!(row_style().contains(&format!("min-height:{CARD_ROW_MIN_HEIGHT_PX}px")));
    assert!(CARD_IMAGE_PX <= CARD_ROW_MIN_HEIGHT_PX);
}

#[test]
fn hidden_card_shrinks_about_its_centre() {
    let hidden = card_style(Vec2::new(40.0, 60.0), false);
    assert!(hidden.contains("transform-origin:center;"));
    assert!(hidden.contains(&format!("transform:scale({CARD_HIDDEN_SCALE})")));
    assert!(hidden.contains("opacity:0;"));
    assert!(hidden.contains("left:40px;top:60px;"));

    let shown = card_style(Vec2::new(40.0, 60.0), true);
    assert!(shown.contains("transform:scale(1)"));
    assert!(shown.contains("opacity:1;"));
    assert!(shown.contains(&format!("width:{CARD_WIDTH_PX}px;")));
}
