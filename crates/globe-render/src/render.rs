use globe_core::render_loop::FrameOutput;
use globe_core::scene::SceneGraph;

mod globe;
mod helpers;
mod markers;
mod stars;
mod targets;

use globe::GlobePass;
use markers::MarkersPass;
use stars::StarsPass;
use targets::DepthTarget;

use crate::texture::RgbaImage;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.004,
    g: 0.004,
    b: 0.012,
    a: 1.0,
};

/// Surface, device and the three draw passes (stars, globe, markers).
pub struct GpuState<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
    quad_vb: wgpu::Buffer,
    globe: GlobePass,
    stars: StarsPass,
    markers: MarkersPass,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'w>>,
        width: u32,
        height: u32,
        scene: &SceneGraph,
        surface_image: &RgbaImage,
        glow_image: &RgbaImage,
    ) -> anyhow::Result<Self> {
        let width = width.max(1);
        let height = height.max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(target)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Default limits keep older WebGPU implementations happy
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {}x{} {:?}", width, height, format);

        let depth = DepthTarget::new(&device, width, height);
        let quad_vb = helpers::quad_vertex_buffer(&device);
        let globe = GlobePass::new(&device, &queue, format, scene, surface_image);
        let stars = StarsPass::new(&device, format, scene.stars());
        let markers = MarkersPass::new(&device, &queue, format, glow_image);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth,
            quad_vb,
            globe,
            stars,
            markers,
            width,
            height,
        })
    }

    /// Pick up a rebuilt scene. The sphere mesh is unit-sized and shared, so
    /// only the starfield needs new buffers.
    pub fn rebuild_scene(&mut self, scene: &SceneGraph) {
        self.stars.set_stars(&self.device, scene.stars());
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth.recreate(&self.device, width, height);
        }
    }

    /// Reapply the current configuration after a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self, frame: &FrameOutput, scene: &SceneGraph) -> Result<(), wgpu::SurfaceError> {
        self.globe.prepare(&self.queue, frame, scene);
        self.stars.prepare(&self.queue, frame);
        self.markers.prepare(&self.queue, frame);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("globe_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.stars.draw(&mut rpass, &self.quad_vb);
            self.globe.draw(&mut rpass);
            // after the globe so the depth test hides far-side glows
            self.markers.draw(&mut rpass, &self.quad_vb);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}
