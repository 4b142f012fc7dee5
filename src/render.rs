use crate::core::DiscSurface;
use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Canvas 2D drawing surface. Callers work in CSS pixels; the backing store is scaled
/// by `pixel_ratio`.
pub struct CanvasSurface {
    ctx: web::CanvasRenderingContext2d,
    pixel_ratio: f64,
    fill_rgb: Option<[u8; 3]>,
}

impl CanvasSurface {
    /// `None` when the canvas has no 2D context.
    pub fn attach(canvas: &web::HtmlCanvasElement) -> Option<Self> {
        let ctx = match canvas.get_context("2d") {
            Ok(Some(obj)) => obj.dyn_into::<web::CanvasRenderingContext2d>().ok()?,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("canvas 2d context error: {:?}", e);
                return None;
            }
        };
        Some(Self {
            ctx,
            pixel_ratio: 1.0,
            fill_rgb: None,
        })
    }

    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio.max(0.1);
    }
}

impl DiscSurface for CanvasSurface {
    fn clear(&mut self, width: f32, height: f32) {
        let r = self.pixel_ratio;
        _ = self.ctx.set_transform(r, 0.0, 0.0, r, 0.0, 0.0);
        self.ctx.set_global_alpha(1.0);
        self.ctx.clear_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn fill_disc(&mut self, center: Vec2, radius: f32, rgb: [u8; 3], alpha: f32) {
        if self.fill_rgb != Some(rgb) {
            let style = format!("rgb({}, {}, {})", rgb[0], rgb[1], rgb[2]);
            #[allow(deprecated)]
            self.ctx.set_fill_style(&JsValue::from_str(&style));
            self.fill_rgb = Some(rgb);
        }
        self.ctx.set_global_alpha(alpha as f64);
        self.ctx.begin_path();
        _ = self
            .ctx
            .arc(center.x as f64, center.y as f64, radius as f64, 0.0, TAU);
        self.ctx.fill();
    }
}
