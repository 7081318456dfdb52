//! Headless drawing backend
//!
//! Records draw calls instead of rasterizing. Used by the native binary and by
//! render tests.

use glam::Vec2;

use super::surface::{Color, DrawingTarget, Fill, Surface};
use crate::sim::Rect;

/// Placeholder image: a name plus an optional decoded size
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessImage {
    pub name: String,
    pub size: Option<Vec2>,
}

impl HeadlessImage {
    pub fn new(name: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            size: Some(Vec2::new(width, height)),
        }
    }

    /// An image that never finished decoding
    pub fn broken(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
        }
    }
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    FillRect { rect: Rect, gradient: bool },
    FillEllipse { center: Vec2, radii: Vec2, alpha: f32 },
    GlowLine { from: Vec2, to: Vec2 },
    Image { name: String, dest: Rect },
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
}

/// Recording surface
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl HeadlessSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width, height),
            commands: Vec::new(),
        }
    }

    /// Commands since the last `Clear`
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .unwrap_or(0);
        &self.commands[start..]
    }

    /// Names of images drawn in the last frame, in order
    pub fn images_drawn(&self) -> Vec<&str> {
        self.last_frame()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Image { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn fill_alpha(fill: &Fill<'_>) -> f32 {
    match fill {
        Fill::Solid(color) => color[3],
        Fill::Linear { stops, .. } => stops.iter().map(|s| s.color[3]).fold(0.0, f32::max),
    }
}

impl Surface for HeadlessSurface {
    type Image = HeadlessImage;

    fn size(&self) -> Vec2 {
        self.size
    }

    fn clear(&mut self) {
        // Keeps memory flat across long headless runs
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, fill: &Fill<'_>) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            gradient: matches!(fill, Fill::Linear { .. }),
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, fill: &Fill<'_>) {
        self.commands.push(DrawCommand::FillEllipse {
            center,
            radii,
            alpha: fill_alpha(fill),
        });
    }

    fn glow_line(&mut self, from: Vec2, to: Vec2, _width: f32, _color: Color, _glow: f32) {
        self.commands.push(DrawCommand::GlowLine { from, to });
    }

    fn draw_image(&mut self, image: &HeadlessImage, dest: Rect) {
        self.commands.push(DrawCommand::Image {
            name: image.name.clone(),
            dest,
        });
    }

    fn image_size(&self, image: &HeadlessImage) -> Option<Vec2> {
        image.size
    }

    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, radians: f32) {
        self.commands.push(DrawCommand::Rotate(radians));
    }
}

/// Canvas stand-in; `supports_2d = false` models a host without a 2D context
#[derive(Debug, Clone, Copy)]
pub struct HeadlessCanvas {
    pub width: f32,
    pub height: f32,
    pub supports_2d: bool,
}

impl HeadlessCanvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            supports_2d: true,
        }
    }
}

impl DrawingTarget for HeadlessCanvas {
    type Surface = HeadlessSurface;

    fn context_2d(&self) -> Option<HeadlessSurface> {
        self.supports_2d
            .then(|| HeadlessSurface::new(self.width, self.height))
    }
}
