use globe_render::texture::{decode_or, placeholder_glow, placeholder_surface, RgbaImage};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!(format!("fetch {url}: {:?}", e)))?;
    let resp: web::Response = resp
        .dyn_into()
        .map_err(|e| anyhow::anyhow!(format!("fetch {url}: not a Response: {:?}", e)))?;
    if !resp.ok() {
        anyhow::bail!("fetch {url}: HTTP {}", resp.status());
    }
    let buf = resp
        .array_buffer()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
    let buf = JsFuture::from(buf)
        .await
        .map_err(|e| anyhow::anyhow!(format!("read {url}: {:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

async fn load_image(url: &str, placeholder: fn() -> RgbaImage) -> RgbaImage {
    match fetch_bytes(url).await {
        Ok(bytes) => decode_or(Some(&bytes), url, placeholder),
        Err(e) => {
            log::warn!("[assets] {e:#}; using placeholder");
            placeholder()
        }
    }
}

pub async fn load_surface(url: &str) -> RgbaImage {
    load_image(url, placeholder_surface).await
}

pub async fn load_glow(url: &str) -> RgbaImage {
    load_image(url, placeholder_glow).await
}
