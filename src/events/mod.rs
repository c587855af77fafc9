use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use crate::dom;
use crate::mount::Mounted;

pub mod pointer;

/// A registered DOM listener, removed again on drop.
pub struct EventListener {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl EventListener {
    pub fn new(target: &web::EventTarget, kind: &'static str, handler: impl FnMut(web::Event) + 'static) -> Self {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
            log::error!("[events] add {kind} listener: {:?}", e);
        }
        Self {
            target: target.clone(),
            kind,
            closure,
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

pub fn wire_resize(state: &Rc<RefCell<Mounted>>) -> Option<EventListener> {
    let window = web::window()?;
    let state = state.clone();
    Some(EventListener::new(window.as_ref(), "resize", move |_ev| {
        let mut s = state.borrow_mut();
        let css = dom::sync_canvas_backing_size(s.canvas());
        s.app_mut().resize(css.x, css.y);
    }))
}
