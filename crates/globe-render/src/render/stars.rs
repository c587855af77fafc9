use globe_core::constants::{CAMERA_FOV_DEG, STAR_OPACITY};
use globe_core::render_loop::FrameOutput;
use globe_core::scene::Star;
use wgpu::util::DeviceExt;

use super::helpers::{self, PipelineSpec};

// Smallest star drawn, in size units, so zero-size stars stay visible.
const STAR_MIN_SIZE: f32 = 0.3;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct StarInstance {
    pos: [f32; 3],
    size: f32,
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct StarsUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    params: [f32; 4],
}

/// Star size is in screen units at unit depth; the quad's world size grows
/// with depth so perspective keeps the apparent size.
pub(crate) fn world_size_per_unit() -> f32 {
    (CAMERA_FOV_DEG.to_radians() * 0.5).tan()
}

pub(crate) fn star_instances(stars: &[Star]) -> Vec<StarInstance> {
    stars
        .iter()
        .map(|s| StarInstance {
            pos: s.position.to_array(),
            size: s.size,
        })
        .collect()
}

pub(crate) struct StarsPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bg: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

impl StarsPass {
    pub(crate) fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat, stars: &[Star]) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stars_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/stars.wgsl").into()),
        });
        let bgl = helpers::uniform_layout(device, "stars_bgl");
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stars_pl"),
            bind_group_layouts: &[&bgl],
            push_constant_ranges: &[],
        });
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32,
                    offset: 12,
                    shader_location: 2,
                },
            ],
        };
        let pipeline = helpers::make_pipeline(
            device,
            PipelineSpec {
                label: "stars_pipeline",
                layout: &pl,
                shader: &shader,
                buffers: &[helpers::QUAD_LAYOUT, instance_layout],
                color_format,
                blend: wgpu::BlendState::ALPHA_BLENDING,
                depth_write: false,
                cull_mode: None,
            },
        );
        let (uniform_buffer, uniform_bg) =
            helpers::uniform_buffer(device, "stars_uniforms", &bgl, std::mem::size_of::<StarsUniforms>());
        let (instance_buffer, instance_count) = Self::upload(device, stars);
        Self {
            pipeline,
            uniform_buffer,
            uniform_bg,
            instance_buffer,
            instance_count,
        }
    }

    fn upload(device: &wgpu::Device, stars: &[Star]) -> (wgpu::Buffer, u32) {
        let instances = star_instances(stars);
        // wgpu rejects zero-sized vertex buffers
        let contents: &[u8] = if instances.is_empty() {
            &[0u8; std::mem::size_of::<StarInstance>()]
        } else {
            bytemuck::cast_slice(&instances)
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stars_instances"),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });
        (buffer, instances.len() as u32)
    }

    pub(crate) fn set_stars(&mut self, device: &wgpu::Device, stars: &[Star]) {
        self.instance_buffer.destroy();
        let (buffer, count) = Self::upload(device, stars);
        self.instance_buffer = buffer;
        self.instance_count = count;
    }

    pub(crate) fn prepare(&self, queue: &wgpu::Queue, frame: &FrameOutput) {
        let u = StarsUniforms {
            view: frame.camera.view_matrix().to_cols_array_2d(),
            proj: frame.camera.projection_matrix().to_cols_array_2d(),
            model: frame.star_model.to_cols_array_2d(),
            params: [STAR_OPACITY, world_size_per_unit(), STAR_MIN_SIZE, 0.0],
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, quad_vb: &wgpu::Buffer) {
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.uniform_bg, &[]);
        rpass.set_vertex_buffer(0, quad_vb.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.draw(0..6, 0..self.instance_count);
    }
}
