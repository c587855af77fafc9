use glam::Vec2;
use globe_core::location::{locations_from_json, sample_locations, Location};
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::constants::MAX_PIXEL_RATIO;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    let el = document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?;
    el.dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{id} is not a canvas: {:?}", e)))
}

#[inline]
pub fn pixel_ratio() -> f64 {
    web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .clamp(1.0, MAX_PIXEL_RATIO)
}

/// CSS size of the canvas.
pub fn css_size(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(rect.width().max(1.0) as f32, rect.height().max(1.0) as f32)
}

/// Match the backing store to the CSS size at the capped pixel ratio and
/// return the CSS size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> Vec2 {
    let dpr = pixel_ratio();
    let rect = canvas.get_bounding_client_rect();
    let w_px = (rect.width() * dpr) as u32;
    let h_px = (rect.height() * dpr) as u32;
    if canvas.width() != w_px.max(1) {
        canvas.set_width(w_px.max(1));
    }
    if canvas.height() != h_px.max(1) {
        canvas.set_height(h_px.max(1));
    }
    css_size(canvas)
}

/// Canvas-local CSS pixel position of a pointer event.
pub fn pointer_canvas_px(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Vec2 {
    let rect = canvas.get_bounding_client_rect();
    Vec2::new(
        (ev.client_x() as f64 - rect.left()) as f32,
        (ev.client_y() as f64 - rect.top()) as f32,
    )
}

/// Locations from an embedded JSON element, or the built-in samples when the
/// element is absent or invalid.
pub fn read_locations(document: &web::Document, element_id: &str) -> Vec<Location> {
    let Some(text) = document
        .get_element_by_id(element_id)
        .and_then(|el| el.text_content())
    else {
        log::info!("[dom] no #{element_id}; using sample trips");
        return sample_locations();
    };
    match locations_from_json(&text) {
        Ok(locations) => locations,
        Err(e) => {
            log::error!("[dom] #{element_id}: {e}; using sample trips");
            sample_locations()
        }
    }
}
