//! Browser canvas backend

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::surface::{Color, DrawingTarget, Fill, Surface, css_color};
use crate::sim::Rect;

/// Image source the canvas can blit
#[derive(Debug, Clone)]
pub enum WebImage {
    Element(HtmlImageElement),
    /// Sprite cut out at load time
    Canvas(HtmlCanvasElement),
}

/// `CanvasRenderingContext2d` as a `Surface`
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    size: Vec2,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        Self {
            ctx,
            size: Vec2::new(width as f32, height as f32),
        }
    }

    fn apply_fill(&self, fill: &Fill<'_>) {
        match fill {
            Fill::Solid(color) => self.ctx.set_fill_style_str(&css_color(*color)),
            Fill::Linear { from, to, stops } => {
                let gradient = self.ctx.create_linear_gradient(
                    from.x as f64,
                    from.y as f64,
                    to.x as f64,
                    to.y as f64,
                );
                for stop in stops.iter() {
                    let _ = gradient.add_color_stop(stop.offset.clamp(0.0, 1.0), &css_color(stop.color));
                }
                self.ctx.set_fill_style_canvas_gradient(&gradient);
            }
        }
    }
}

impl Surface for CanvasSurface {
    type Image = WebImage;

    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.size.x as f64, self.size.y as f64);
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill<'_>) {
        self.apply_fill(fill);
        let size = rect.size();
        self.ctx.fill_rect(
            rect.min.x as f64,
            rect.min.y as f64,
            size.x as f64,
            size.y as f64,
        );
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, fill: &Fill<'_>) {
        self.apply_fill(fill);
        self.ctx.begin_path();
        let _ = self.ctx.ellipse(
            center.x as f64,
            center.y as f64,
            radii.x.max(0.0) as f64,
            radii.y.max(0.0) as f64,
            0.0,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn glow_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color, glow: f32) {
        let css = css_color(color);
        self.ctx.save();
        self.ctx.set_stroke_style_str(&css);
        self.ctx.set_shadow_color(&css);
        self.ctx.set_shadow_blur(glow as f64);
        self.ctx.set_line_width(width as f64);
        self.ctx.set_line_cap("round");
        self.ctx.begin_path();
        self.ctx.move_to(from.x as f64, from.y as f64);
        self.ctx.line_to(to.x as f64, to.y as f64);
        self.ctx.stroke();
        self.ctx.restore();
    }

    fn draw_image(&mut self, image: &WebImage, dest: Rect) {
        let size = dest.size();
        let (x, y, w, h) = (
            dest.min.x as f64,
            dest.min.y as f64,
            size.x as f64,
            size.y as f64,
        );
        let _ = match image {
            WebImage::Element(img) => self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h),
            WebImage::Canvas(canvas) => self
                .ctx
                .draw_image_with_html_canvas_element_and_dw_and_dh(canvas, x, y, w, h),
        };
    }

    fn image_size(&self, image: &WebImage) -> Option<Vec2> {
        let (w, h) = match image {
            WebImage::Element(img) => (img.natural_width(), img.natural_height()),
            WebImage::Canvas(canvas) => (canvas.width(), canvas.height()),
        };
        (w > 0 && h > 0).then(|| Vec2::new(w as f32, h as f32))
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        let _ = self.ctx.translate(offset.x as f64, offset.y as f64);
    }

    fn rotate(&mut self, radians: f32) {
        let _ = self.ctx.rotate(radians as f64);
    }
}

impl DrawingTarget for HtmlCanvasElement {
    type Surface = CanvasSurface;

    fn context_2d(&self) -> Option<CanvasSurface> {
        let ctx = self
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(CanvasSurface::new(ctx, self.width(), self.height()))
    }
}
