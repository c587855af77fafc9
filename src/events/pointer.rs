use std::cell::RefCell;
use std::rc::Rc;

use globe_core::pointer::{PointerEvent, PointerKind};
use wasm_bindgen::JsCast;
use web_sys as web;

use super::EventListener;
use crate::dom;
use crate::mount::Mounted;

const POINTER_EVENTS: [&str; 5] = [
    "pointermove",
    "pointerdown",
    "pointerup",
    "pointercancel",
    "pointerleave",
];

/// Engine event for a DOM pointer event, or None when it is ignored.
pub fn pointer_kind(dom_type: &str, pointer_type: &str) -> Option<PointerKind> {
    let touch = pointer_type == "touch";
    match (dom_type, touch) {
        ("pointermove", false) => Some(PointerKind::Move),
        ("pointermove", true) => Some(PointerKind::TouchMove),
        ("pointerdown", false) => Some(PointerKind::Down),
        ("pointerdown", true) => Some(PointerKind::TouchStart),
        ("pointerup" | "pointercancel", false) => Some(PointerKind::Up),
        ("pointerup" | "pointercancel", true) => Some(PointerKind::TouchEnd),
        // a lifted finger also leaves; the delayed hide handles touch
        ("pointerleave", false) => Some(PointerKind::Leave),
        _ => None,
    }
}

pub fn wire_pointer_handlers(state: &Rc<RefCell<Mounted>>) -> Vec<EventListener> {
    let canvas = state.borrow().canvas().clone();
    let mut listeners: Vec<EventListener> = POINTER_EVENTS
        .into_iter()
        .map(|kind| {
            let state = state.clone();
            let canvas_for_listener = canvas.clone();
            EventListener::new(canvas.as_ref(), kind, move |ev| {
                let Some(ev) = ev.dyn_ref::<web::PointerEvent>() else {
                    return;
                };
                let Some(kind) = pointer_kind(&ev.type_(), &ev.pointer_type()) else {
                    return;
                };
                if matches!(kind, PointerKind::Down | PointerKind::TouchStart) {
                    _ = canvas_for_listener.set_pointer_capture(ev.pointer_id());
                }
                let pos = dom::pointer_canvas_px(ev, &canvas_for_listener);
                state.borrow_mut().pointer(PointerEvent::new(kind, pos.x, pos.y));
            })
        })
        .collect();

    let state = state.clone();
    listeners.push(EventListener::new(canvas.as_ref(), "wheel", move |ev| {
        let Some(ev) = ev.dyn_ref::<web::WheelEvent>() else {
            return;
        };
        ev.prevent_default();
        state.borrow_mut().app_mut().handle_wheel(ev.delta_y() as f32);
    }));
    listeners
}
