use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use globe_core::render_loop::{FrameCallback, FrameClock, FrameScheduler, LoopControl};
use instant::Instant;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// Monotonic time since mount, shared by frame ticks and input events.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

#[derive(Default)]
struct RafInner {
    callback: Option<FrameCallback>,
    closure: Option<Closure<dyn FnMut(f64)>>,
    handle: Option<i32>,
    frame_clock: FrameClock,
    running: bool,
}

impl RafInner {
    fn request_next(&mut self) {
        let (Some(window), Some(closure)) = (web::window(), self.closure.as_ref()) else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(h) => self.handle = Some(h),
            Err(e) => {
                log::error!("[frame] requestAnimationFrame failed: {:?}", e);
                self.running = false;
            }
        }
    }
}

/// `requestAnimationFrame`-driven scheduler.
pub struct RafScheduler {
    inner: Rc<RefCell<RafInner>>,
    clock: Clock,
}

impl RafScheduler {
    pub fn new(clock: Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(RafInner::default())),
            clock,
        }
    }

    fn make_closure(inner: Weak<RefCell<RafInner>>, clock: Clock) -> Closure<dyn FnMut(f64)> {
        Closure::wrap(Box::new(move |_ts: f64| {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let (tick, callback) = {
                let mut i = inner.borrow_mut();
                i.handle = None;
                if !i.running {
                    return;
                }
                (i.frame_clock.tick(clock.now()), i.callback.take())
            };
            let Some(mut callback) = callback else {
                return;
            };
            // no borrow held: the callback may stop the scheduler
            let control = callback(tick);
            let mut i = inner.borrow_mut();
            if control == LoopControl::Continue && i.running {
                i.callback = Some(callback);
                i.request_next();
            } else {
                log::info!("[frame] loop stopped at frame {}", tick.index);
                i.running = false;
            }
        }) as Box<dyn FnMut(f64)>)
    }
}

impl FrameScheduler for RafScheduler {
    fn start(&mut self, callback: FrameCallback) {
        let mut i = self.inner.borrow_mut();
        if i.closure.is_none() {
            i.closure = Some(Self::make_closure(Rc::downgrade(&self.inner), self.clock));
        }
        i.callback = Some(callback);
        i.frame_clock = FrameClock::default();
        i.running = true;
        if i.handle.is_none() {
            i.request_next();
        }
    }

    fn stop(&mut self) {
        let mut i = self.inner.borrow_mut();
        i.running = false;
        i.callback = None;
        if let (Some(h), Some(window)) = (i.handle.take(), web::window()) {
            _ = window.cancel_animation_frame(h);
        }
    }

    fn is_running(&self) -> bool {
        self.inner.borrow().running
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
