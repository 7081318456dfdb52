//! 2D rendering module
//!
//! The scene is drawn through the `Surface` trait: canvas 2D in the browser,
//! a recording backend everywhere else.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod headless;
pub mod scene;
pub mod surface;

pub use headless::{HeadlessCanvas, HeadlessImage, HeadlessSurface};
pub use scene::{FrameContext, render};
pub use surface::{Color, ColorStop, DrawingTarget, Fill, Surface};
