use globe_core::constants::{MARKER_COLOR, MAX_MARKERS};
use globe_core::render_loop::{FrameOutput, MarkerInstance};

use super::helpers::{self, PipelineSpec};
use crate::texture::RgbaImage;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SpriteInstance {
    pos: [f32; 3],
    scale: f32,
    color: [f32; 4],
}

impl From<&MarkerInstance> for SpriteInstance {
    fn from(m: &MarkerInstance) -> Self {
        Self {
            pos: m.position.to_array(),
            scale: m.scale,
            color: [MARKER_COLOR[0], MARKER_COLOR[1], MARKER_COLOR[2], m.opacity],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SpriteUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
}

/// Additive: overlapping glows brighten instead of occluding.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

pub(crate) fn sprite_instances(markers: &[MarkerInstance]) -> Vec<SpriteInstance> {
    markers.iter().take(MAX_MARKERS).map(SpriteInstance::from).collect()
}

pub(crate) struct MarkersPass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bg: wgpu::BindGroup,
    texture_bg: wgpu::BindGroup,
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
}

impl MarkersPass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        glow: &RgbaImage,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("markers_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/markers.wgsl").into()),
        });
        let uniform_bgl = helpers::uniform_layout(device, "markers_uniform_bgl");
        let texture_bgl = helpers::texture_layout(device, "markers_texture_bgl");
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("markers_pl"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl],
            push_constant_ranges: &[],
        });
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
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
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x4,
                    offset: 16,
                    shader_location: 3,
                },
            ],
        };
        let pipeline = helpers::make_pipeline(
            device,
            PipelineSpec {
                label: "markers_pipeline",
                layout: &pl,
                shader: &shader,
                buffers: &[helpers::QUAD_LAYOUT, instance_layout],
                color_format,
                blend: ADDITIVE,
                depth_write: false,
                cull_mode: None,
            },
        );
        let (uniform_buffer, uniform_bg) = helpers::uniform_buffer(
            device,
            "markers_uniforms",
            &uniform_bgl,
            std::mem::size_of::<SpriteUniforms>(),
        );
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("markers_instances"),
            size: (std::mem::size_of::<SpriteInstance>() * MAX_MARKERS) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let sampler = helpers::linear_sampler(device, "glow_sampler", wgpu::AddressMode::ClampToEdge);
        let (_tex, view) = helpers::upload_rgba(device, queue, "glow", glow);
        let texture_bg = helpers::texture_bind_group(device, "glow_bg", &texture_bgl, &view, &sampler);
        Self {
            pipeline,
            uniform_buffer,
            uniform_bg,
            texture_bg,
            instance_buffer,
            instance_count: 0,
        }
    }

    pub(crate) fn prepare(&mut self, queue: &wgpu::Queue, frame: &FrameOutput) {
        let u = SpriteUniforms {
            view: frame.camera.view_matrix().to_cols_array_2d(),
            proj: frame.camera.projection_matrix().to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
        let instances = sprite_instances(&frame.markers);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
        self.instance_count = instances.len() as u32;
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, quad_vb: &wgpu::Buffer) {
        if self.instance_count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.uniform_bg, &[]);
        rpass.set_bind_group(1, &self.texture_bg, &[]);
        rpass.set_vertex_buffer(0, quad_vb.slice(..));
        rpass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        rpass.draw(0..6, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn instance_carries_colour_and_opacity() {
        let m = MarkerInstance {
            marker: 3,
            position: Vec3::new(0.0, 2.0, 0.0),
            scale: 0.25,
            opacity: 0.9,
        };
        let s = SpriteInstance::from(&m);
        assert_eq!(s.pos, [0.0, 2.0, 0.0]);
        assert_eq!(s.scale, 0.25);
        assert_eq!(s.color[3], 0.9);
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }

    #[test]
    fn instances_are_capped() {
        let m = MarkerInstance {
            marker: 0,
            position: Vec3::ZERO,
            scale: 0.2,
            opacity: 0.7,
        };
        assert_eq!(sprite_instances(&vec![m; MAX_MARKERS + 5]).len(), MAX_MARKERS);
    }
}
