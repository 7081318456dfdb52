//! 2D raster drawing surface
//!
//! The small set of canvas operations the scene needs. The browser backend
//! wraps `CanvasRenderingContext2d`; the headless backend records commands.

use glam::Vec2;

use crate::sim::Rect;

/// Straight RGBA color, components in 0-1
pub type Color = [f32; 4];

/// Gradient color stop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

/// How a shape is filled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill<'a> {
    Solid(Color),
    /// Linear gradient between two points
    Linear {
        from: Vec2,
        to: Vec2,
        stops: &'a [ColorStop],
    },
}

/// A fixed-size 2D drawing context
pub trait Surface {
    /// Drawable image handle
    type Image;

    /// Pixel size of the surface
    fn size(&self) -> Vec2;

    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rect, fill: &Fill<'_>);

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, fill: &Fill<'_>);

    /// Stroke a line with a soft glow around it
    fn glow_line(&mut self, from: Vec2, to: Vec2, width: f32, color: Color, glow: f32);

    /// Blit an image scaled into `dest`
    fn draw_image(&mut self, image: &Self::Image, dest: Rect);

    /// Natural image size, `None` if it has not decoded
    fn image_size(&self, image: &Self::Image) -> Option<Vec2>;

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);

    fn rotate(&mut self, radians: f32);
}

/// Something that may hand out a 2D surface (a canvas element)
pub trait DrawingTarget {
    type Surface: Surface;

    fn context_2d(&self) -> Option<Self::Surface>;
}

/// CSS `rgba()` string for a color
pub fn css_color(color: Color) -> String {
    let [r, g, b, a] = color.map(|c| c.clamp(0.0, 1.0));
    format!(
        "rgba({}, {}, {}, {:.3})",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
        a
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color([1.0, 0.0, 0.5, 1.0]), "rgba(255, 0, 128, 1.000)");
        assert_eq!(css_color([2.0, -1.0, 0.0, 0.25]), "rgba(255, 0, 0, 0.250)");
    }
}
