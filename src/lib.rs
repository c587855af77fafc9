#![cfg(target_arch = "wasm32")]
//! Browser front-end: mounts the globe on a canvas, wires DOM input, drives
//! frames with `requestAnimationFrame` and presents the info card.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use globe_core::render_loop::FrameScheduler;
use globe_core::scene::SceneAssets;
use globe_core::GlobeApp;
use globe_render::GpuState;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

mod assets;
mod card_style;
mod constants;
mod dom;
mod events;
mod frame;
mod mount;
mod overlay;

use constants::GlobeOptions;
use events::EventListener;
use frame::{Clock, RafScheduler};
use mount::Mounted;
use overlay::OverlayCard;

thread_local! {
    static AUTO_MOUNTED: RefCell<Option<GlobeHandle>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("globe-web starting");

    let has_canvas = dom::window_document()
        .and_then(|d| d.get_element_by_id(constants::CANVAS_ID))
        .is_some();
    if !has_canvas {
        log::info!("no #{}; waiting for mount_globe()", constants::CANVAS_ID);
        return Ok(());
    }
    let handle = mount(GlobeOptions::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))?;
    AUTO_MOUNTED.with(|m| *m.borrow_mut() = Some(handle));
    Ok(())
}

/// Mount a globe on the canvas with id `canvas_id`.
#[wasm_bindgen]
pub fn mount_globe(canvas_id: &str) -> Result<GlobeHandle, JsValue> {
    mount(GlobeOptions::for_canvas(canvas_id)).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}

struct Session {
    state: Rc<RefCell<Mounted>>,
    scheduler: Rc<RefCell<RafScheduler>>,
    listeners: Vec<EventListener>,
}

/// JS-facing handle; destroying it (or dropping it) tears the globe down.
#[wasm_bindgen]
pub struct GlobeHandle {
    session: Option<Session>,
}

#[wasm_bindgen]
impl GlobeHandle {
    /// Stop the frame loop, remove listeners and the card, release the GPU.
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.scheduler.borrow_mut().stop();
        drop(session.listeners);
        session.state.borrow_mut().teardown();
        log::info!("[mount] destroyed");
    }

    /// Replace the trips shown on the globe with a JSON array of records.
    pub fn set_locations(&mut self, json: &str) -> Result<(), JsValue> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| JsValue::from_str("globe destroyed"))?;
        let result = session.state.borrow_mut().set_locations_json(json);
        result.map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Drop for GlobeHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn mount(options: GlobeOptions) -> anyhow::Result<GlobeHandle> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let canvas = dom::canvas_by_id(&document, &options.canvas_id)?;
    // let touch drags reach the pointer handlers instead of scrolling
    _ = canvas.style().set_property("touch-action", "none");

    let css = dom::sync_canvas_backing_size(&canvas);
    let locations = dom::read_locations(&document, &options.locations_element_id);
    let clock = Clock::start();
    let assets = SceneAssets {
        surface_image: options.surface_url.clone(),
        glow_image: options.glow_url.clone(),
    };
    let app = GlobeApp::new(locations, css, assets, clock.now());
    let state = Rc::new(RefCell::new(Mounted::new(
        app,
        canvas,
        OverlayCard::new(document),
        clock,
    )));
    let scheduler = Rc::new(RefCell::new(RafScheduler::new(clock)));

    let mut listeners = events::pointer::wire_pointer_handlers(&state);
    listeners.extend(events::wire_resize(&state));

    init_gpu(Rc::downgrade(&state), Rc::downgrade(&scheduler));
    Ok(GlobeHandle {
        session: Some(Session {
            state,
            scheduler,
            listeners,
        }),
    })
}

/// Fetch the textures the scene names, create the GPU state and start the
/// loop. Gives up quietly if the globe is destroyed in the meantime.
fn init_gpu(state: Weak<RefCell<Mounted>>, scheduler: Weak<RefCell<RafScheduler>>) {
    spawn_local(async move {
        // no RefCell borrow may live across an await
        let Some((surface_url, glow_url)) = state.upgrade().map(|s| {
            let s = s.borrow();
            let scene = s.app().scene();
            (scene.sphere().surface_image.clone(), scene.glow_image().to_string())
        }) else {
            return;
        };
        let surface = assets::load_surface(&surface_url).await;
        let glow = assets::load_glow(&glow_url).await;

        let Some((canvas, scene, generation)) = state.upgrade().map(|s| {
            let s = s.borrow();
            (s.canvas().clone(), s.app().scene().clone(), s.app().generation())
        }) else {
            return;
        };
        let (width, height) = (canvas.width(), canvas.height());
        let gpu = match GpuState::new(wgpu::SurfaceTarget::Canvas(canvas), width, height, &scene, &surface, &glow).await {
            Ok(g) => g,
            Err(e) => {
                log::error!("WebGPU init error: {:?}", e);
                return;
            }
        };

        let (Some(state), Some(scheduler)) = (state.upgrade(), scheduler.upgrade()) else {
            return;
        };
        if state.borrow().app().is_torn_down() {
            return;
        }
        state.borrow_mut().attach_gpu(gpu, generation);
        let frame_state = state.clone();
        scheduler
            .borrow_mut()
            .start(Box::new(move |tick| frame_state.borrow_mut().frame(tick)));
    });
}
