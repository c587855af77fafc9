use globe_core::pointer::PointerEvent;
use globe_core::render_loop::{FrameTick, LoopControl};
use globe_core::{GlobeApp, GlobeError};
use globe_render::GpuState;
use web_sys as web;

use crate::frame::Clock;
use crate::overlay::OverlayCard;

/// Everything one mounted globe owns on the page.
pub struct Mounted {
    app: GlobeApp,
    canvas: web::HtmlCanvasElement,
    gpu: Option<GpuState<'static>>,
    card: OverlayCard,
    clock: Clock,
    rendered_generation: u64,
}

impl Mounted {
    pub fn new(app: GlobeApp, canvas: web::HtmlCanvasElement, card: OverlayCard, clock: Clock) -> Self {
        Self {
            app,
            canvas,
            gpu: None,
            card,
            clock,
            rendered_generation: 0,
        }
    }

    pub fn app(&self) -> &GlobeApp {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut GlobeApp {
        &mut self.app
    }

    pub fn canvas(&self) -> &web::HtmlCanvasElement {
        &self.canvas
    }

    /// `generation` is the scene generation the GPU buffers were built from.
    pub fn attach_gpu(&mut self, gpu: GpuState<'static>, generation: u64) {
        self.gpu = Some(gpu);
        self.rendered_generation = generation;
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        let now = self.clock.now();
        self.app.handle_pointer(event, now);
    }

    pub fn set_locations_json(&mut self, json: &str) -> Result<(), GlobeError> {
        self.app.set_locations_json(json)?;
        log::info!("[mount] {} locations loaded", self.app.scene().locations().len());
        Ok(())
    }

    pub fn frame(&mut self, tick: FrameTick) -> LoopControl {
        if self.app.is_torn_down() {
            return LoopControl::Stop;
        }
        let out = self.app.tick(tick);
        if let Some(gpu) = self.gpu.as_mut() {
            if self.app.generation() != self.rendered_generation {
                gpu.rebuild_scene(self.app.scene());
                self.rendered_generation = self.app.generation();
            }
            gpu.resize_if_needed(self.canvas.width(), self.canvas.height());
            match gpu.render(&out, self.app.scene()) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("[frame] GPU out of memory; stopping");
                    return LoopControl::Stop;
                }
                Err(e) => log::warn!("[frame] render error: {:?}", e),
            }
        }
        self.card.present(&mut self.app, &self.canvas);
        LoopControl::Continue
    }

    /// Cancel timers, remove the card and drop GPU resources.
    pub fn teardown(&mut self) {
        self.app.teardown();
        self.card.release();
        self.gpu = None;
    }
}
