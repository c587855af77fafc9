use glam::Vec4;
use globe_core::render_loop::FrameOutput;
use globe_core::scene::{sphere_mesh, SceneGraph};
use wgpu::util::DeviceExt;

use super::helpers::{self, PipelineSpec};
use crate::texture::RgbaImage;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SphereVertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct GlobeUniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    ambient: [f32; 4],
    key_dir: [f32; 4],
    key_color: [f32; 4],
    rim_dir: [f32; 4],
    rim_color: [f32; 4],
    specular: [f32; 4],
    material: [f32; 4],
}

impl GlobeUniforms {
    pub(crate) fn new(frame: &FrameOutput, scene: &SceneGraph, texel: [f32; 2]) -> Self {
        let lights = scene.lighting();
        let sphere = scene.sphere();
        let rgb = |v: glam::Vec3| v.extend(0.0).to_array();
        Self {
            view_proj: frame.camera.view_proj().to_cols_array_2d(),
            model: frame.globe_model.to_cols_array_2d(),
            camera_pos: frame.camera.eye.extend(1.0).to_array(),
            ambient: rgb(lights.ambient_color * lights.ambient_intensity),
            key_dir: rgb(lights.key.direction()),
            key_color: rgb(lights.key.color * lights.key.intensity),
            rim_dir: rgb(lights.rim.direction()),
            rim_color: rgb(lights.rim.color * lights.rim.intensity),
            specular: sphere.specular.extend(sphere.shininess).to_array(),
            material: Vec4::new(frame.radius, sphere.bump_scale, texel[0], texel[1]).to_array(),
        }
    }
}

pub(crate) struct GlobePass {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bg: wgpu::BindGroup,
    texture_bg: wgpu::BindGroup,
    texel: [f32; 2],
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GlobePass {
    pub(crate) fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        scene: &SceneGraph,
        surface: &RgbaImage,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../shaders/globe.wgsl").into()),
        });
        let uniform_bgl = helpers::uniform_layout(device, "globe_uniform_bgl");
        let texture_bgl = helpers::texture_layout(device, "globe_texture_bgl");
        let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe_pl"),
            bind_group_layouts: &[&uniform_bgl, &texture_bgl],
            push_constant_ranges: &[],
        });
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 24,
                    shader_location: 2,
                },
            ],
        };
        let pipeline = helpers::make_pipeline(
            device,
            PipelineSpec {
                label: "globe_pipeline",
                layout: &pl,
                shader: &shader,
                buffers: &[vertex_layout],
                color_format,
                blend: wgpu::BlendState::REPLACE,
                depth_write: true,
                cull_mode: None,
            },
        );
        let (uniform_buffer, uniform_bg) = helpers::uniform_buffer(
            device,
            "globe_uniforms",
            &uniform_bgl,
            std::mem::size_of::<GlobeUniforms>(),
        );

        // unit sphere; the radius is applied in the vertex shader
        let sphere = scene.sphere();
        let mesh = sphere_mesh(sphere.width_segments, sphere.height_segments);
        let vertices: Vec<SphereVertex> = mesh
            .positions
            .iter()
            .zip(&mesh.normals)
            .zip(&mesh.uvs)
            .map(|((p, n), uv)| SphereVertex {
                position: *p,
                normal: *n,
                uv: *uv,
            })
            .collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe_vb"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe_ib"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let sampler = helpers::linear_sampler(device, "globe_sampler", wgpu::AddressMode::Repeat);
        let (_tex, view) = helpers::upload_rgba(device, queue, "globe_surface", surface);
        let texture_bg = helpers::texture_bind_group(device, "globe_texture_bg", &texture_bgl, &view, &sampler);

        Self {
            pipeline,
            uniform_buffer,
            uniform_bg,
            texture_bg,
            texel: surface.texel(),
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    pub(crate) fn prepare(&self, queue: &wgpu::Queue, frame: &FrameOutput, scene: &SceneGraph) {
        let u = GlobeUniforms::new(frame, scene, self.texel);
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&u));
    }

    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.uniform_bg, &[]);
        rpass.set_bind_group(1, &self.texture_bg, &[]);
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        rpass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_shader() {
        // ten vec4-aligned members: two mat4 and eight vec4
        assert_eq!(std::mem::size_of::<GlobeUniforms>(), 2 * 64 + 8 * 16);
        assert_eq!(std::mem::size_of::<SphereVertex>(), 32);
    }
}
