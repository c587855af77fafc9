//! DOM presenter for the info card. Reads [`OverlayMachine`] events after each
//! frame; owns nothing but the element.
//!
//! [`OverlayMachine`]: globe_core::overlay::OverlayMachine

use glam::Vec2;
use globe_core::location::Location;
use globe_core::overlay::OverlayEvent;
use globe_core::GlobeApp;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::card_style::{card_style, image_style, row_style, text_column_style};
use crate::constants::{CARD_ELEMENT_ID, CARD_IMAGE_PX};

pub struct OverlayCard {
    document: web::Document,
    element: Option<web::Element>,
    origin: Vec2,
    visible: bool,
}

impl OverlayCard {
    pub fn new(document: web::Document) -> Self {
        Self {
            document,
            element: None,
            origin: Vec2::ZERO,
            visible: false,
        }
    }

    /// Apply pending overlay events, then place the card if a new anchor is
    /// waiting for its measured size.
    pub fn present(&mut self, app: &mut GlobeApp, canvas: &web::HtmlCanvasElement) {
        let events: Vec<OverlayEvent> = app.overlay_mut().drain_events().collect();
        for ev in events {
            match ev {
                OverlayEvent::Shown { .. } => {
                    if let Some(loc) = app.overlay().selected().cloned() {
                        self.render(&loc);
                    }
                }
                OverlayEvent::Moved => {}
                OverlayEvent::FadeStarted => {
                    self.visible = false;
                    self.restyle();
                }
                OverlayEvent::Released => self.release(),
            }
        }
        if app.overlay().needs_placement() {
            let Some(el) = self.element.as_ref() else {
                return;
            };
            // layout size; the bounding rect would include the hidden scale
            let size = match el.dyn_ref::<web::HtmlElement>() {
                Some(html) => Vec2::new(html.offset_width() as f32, html.offset_height() as f32),
                None => {
                    let rect = el.get_bounding_client_rect();
                    Vec2::new(rect.width() as f32, rect.height() as f32)
                }
            };
            let placed = app.place_overlay(size);
            // overlay positions are canvas-local; the card is fixed to the page
            let c = canvas.get_bounding_client_rect();
            self.origin = placed + Vec2::new(c.left() as f32, c.top() as f32);
            self.visible = true;
            self.restyle();
        }
    }

    fn render(&mut self, loc: &Location) {
        let el = match self.element.take() {
            Some(el) => el,
            None => match self.create() {
                Some(el) => el,
                None => return,
            },
        };
        el.set_inner_html("");
        let size = CARD_IMAGE_PX.to_string();
        if let Some(row) = self.append(&el, "div", None, &[], &row_style()) {
            self.append(
                &row,
                "img",
                None,
                &[
                    ("src", loc.host_image.as_str()),
                    ("alt", loc.host_name.as_str()),
                    ("width", size.as_str()),
                    ("height", size.as_str()),
                ],
                &image_style(),
            );
            if let Some(text) = self.append(&row, "div", None, &[], text_column_style()) {
                self.append(&text, "div", Some(loc.title.as_str()), &[], "font-weight:600;");
                self.append(&text, "div", Some(loc.place_name.as_str()), &[], "opacity:0.8;");
                let host = format!("Hosted by {}", loc.host_name);
                self.append(&text, "div", Some(host.as_str()), &[], "opacity:0.8;margin-top:4px;");
            }
        }
        self.element = Some(el);
        // laid out invisibly until placed
        self.visible = false;
        self.restyle();
    }

    fn create(&self) -> Option<web::Element> {
        let el = self.document.create_element("div").ok()?;
        el.set_id(CARD_ELEMENT_ID);
        let body = self.document.body()?;
        if let Err(e) = body.append_child(&el) {
            log::error!("[overlay] append card: {:?}", e);
            return None;
        }
        Some(el)
    }

    fn append(
        &self,
        parent: &web::Element,
        tag: &str,
        text: Option<&str>,
        attrs: &[(&str, &str)],
        style: &str,
    ) -> Option<web::Element> {
        let child = self.document.create_element(tag).ok()?;
        for (k, v) in attrs {
            _ = child.set_attribute(k, v);
        }
        _ = child.set_attribute("style", style);
        if text.is_some() {
            child.set_text_content(text);
        }
        parent.append_child(&child).ok()?;
        Some(child)
    }

    fn restyle(&self) {
        if let Some(el) = &self.element {
            _ = el.set_attribute("style", &card_style(self.origin, self.visible));
        }
    }

    /// Remove the element from the page.
    pub fn release(&mut self) {
        if let Some(el) = self.element.take() {
            el.remove();
        }
        self.visible = false;
    }
}

impl Drop for OverlayCard {
    fn drop(&mut self) {
        self.release();
    }
}
