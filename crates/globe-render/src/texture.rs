//! Image decoding for the surface and glow textures, with placeholders for
//! missing or undecodable assets.

use anyhow::Context;
use log::{info, warn};

/// Tightly packed RGBA8, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    /// Texel size in uv units.
    pub fn texel(&self) -> [f32; 2] {
        [1.0 / self.width.max(1) as f32, 1.0 / self.height.max(1) as f32]
    }
}

pub fn decode_image(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .context("decode image")?
        .to_rgba8();
    let (width, height) = img.dimensions();
    Ok(RgbaImage {
        width,
        height,
        pixels: img.into_raw(),
    })
}

/// Decode `bytes`, or fall back to `placeholder` with a warning.
pub fn decode_or(bytes: Option<&[u8]>, label: &str, placeholder: fn() -> RgbaImage) -> RgbaImage {
    match bytes.map(decode_image) {
        Some(Ok(img)) => {
            info!("[texture] {label}: {}x{}", img.width, img.height);
            img
        }
        Some(Err(e)) => {
            warn!("[texture] {label}: {e:#}; using placeholder");
            placeholder()
        }
        None => placeholder(),
    }
}

/// Flat ocean blue with lighter polar caps.
pub fn placeholder_surface() -> RgbaImage {
    let (width, height) = (64u32, 32u32);
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let lat = 90.0 - (y as f32 + 0.5) / height as f32 * 180.0;
        let px: [u8; 4] = if lat.abs() > 70.0 {
            [220, 228, 235, 255]
        } else {
            [18, 52, 96, 255]
        };
        for _ in 0..width {
            pixels.extend_from_slice(&px);
        }
    }
    RgbaImage { width, height, pixels }
}

/// Soft radial falloff, white with alpha.
pub fn placeholder_glow() -> RgbaImage {
    let size = 64u32;
    let c = (size as f32 - 1.0) * 0.5;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 - c).hypot(y as f32 - c) / c).min(1.0);
            let a = (1.0 - d).powi(2);
            pixels.extend_from_slice(&[255, 255, 255, (a * 255.0).round() as u8]);
        }
    }
    RgbaImage {
        width: size,
        height: size,
        pixels,
    }
}
