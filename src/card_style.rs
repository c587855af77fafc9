//! Inline styles for the info card. Every box has a fixed size up front so the
//! card can be measured and clamped before its image has loaded.

use glam::Vec2;

use crate::constants::{CARD_HIDDEN_SCALE, CARD_IMAGE_PX, CARD_ROW_MIN_HEIGHT_PX, CARD_TRANSITION, CARD_WIDTH_PX};

/// The card element itself. Hidden cards shrink slightly about their centre.
pub fn card_style(origin: Vec2, visible: bool) -> String {
    let (opacity, scale) = if visible { (1.0, 1.0) } else { (0.0, CARD_HIDDEN_SCALE) };
    format!(
        "position:fixed;left:{:.0}px;top:{:.0}px;width:{}px;box-sizing:border-box;z-index:10;\
         pointer-events:none;opacity:{};transform:scale({});transform-origin:center;transition:{};\
         color:#e8eef8;font:14px system-ui;background:rgba(10,14,24,0.88);padding:12px;\
         border-radius:10px;border:1px solid rgba(147,180,224,0.35);",
        origin.x, origin.y, CARD_WIDTH_PX, opacity, scale, CARD_TRANSITION
    )
}

/// Host photo beside the text column.
pub fn row_style() -> String {
    format!("display:flex;gap:12px;align-items:center;min-height:{CARD_ROW_MIN_HEIGHT_PX}px;")
}

pub fn image_style() -> String {
    format!(
        "width:{0}px;height:{0}px;flex:none;object-fit:cover;border-radius:6px;display:block;",
        CARD_IMAGE_PX
    )
}

pub fn text_column_style() -> &'static str {
    "display:flex;flex-direction:column;min-width:0;"
}
