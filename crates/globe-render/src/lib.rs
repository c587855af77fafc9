//! wgpu renderer for the trip globe, shared by the web and native front-ends.
//!
//! Draws one [`globe_core::render_loop::FrameOutput`] per call: a starfield,
//! the lit textured sphere, then additive glow sprites for visible markers.

pub mod render;
pub mod texture;

pub use render::GpuState;
pub use texture::{decode_image, decode_or, placeholder_glow, placeholder_surface, RgbaImage};
