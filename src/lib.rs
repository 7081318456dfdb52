//! Astro Gate - a canvas arcade shooter for a gated mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, spawning, collisions, run state)
//! - `renderer`: 2D drawing surface abstraction and frame composition
//! - `engine`: Frame loop, control surface and snapshot notification
//! - `assets`: Sprite bundle manifest, loading and sprite extraction
//! - `input`: Device-independent control intent aggregation
//! - `tuning`: Data-driven difficulty profiles

pub mod assets;
pub mod engine;
pub mod error;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use engine::{Engine, EngineOptions, EngineSlot, Snapshot};
pub use error::{AssetError, EngineError, TuningError};
pub use input::{ControlIntent, InputAggregator};
pub use settings::Settings;
pub use tuning::{Difficulty, DifficultyProfile, DifficultyTable};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Playfield size used by the stock page layout
    pub const DEFAULT_PLAYFIELD_WIDTH: f32 = 390.0;
    pub const DEFAULT_PLAYFIELD_HEIGHT: f32 = 640.0;

    /// Reference frame time (60 Hz) that per-tick speeds are expressed against
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Frame scale clamp, keeps stalls from producing one huge integration step
    pub const MIN_FRAME_SCALE: f32 = 0.5;
    pub const MAX_FRAME_SCALE: f32 = 2.2;

    /// Ship sprite size
    pub const SHIP_WIDTH: f32 = 56.0;
    pub const SHIP_HEIGHT: f32 = 64.0;
    /// Gap between the ship sprite bottom and the playfield bottom
    pub const SHIP_BOTTOM_GAP: f32 = 22.0;
    /// Horizontal travel margins
    pub const MARGIN_LEFT: f32 = 6.0;
    pub const MARGIN_RIGHT: f32 = 6.0;
    /// Hitbox inset as a fraction of the sprite size (per side)
    pub const HITBOX_INSET_X: f32 = 0.22;
    pub const HITBOX_INSET_Y: f32 = 0.16;

    /// Twin cannon emission points, measured from the ship center
    pub const CANNON_OFFSET_X: f32 = 12.0;
    pub const CANNON_OFFSET_Y: f32 = 6.0;
    /// Projectiles are discarded past this distance above the top edge
    pub const PROJECTILE_MARGIN: f32 = 24.0;
    /// Rendered projectile length
    pub const PROJECTILE_LENGTH: f32 = 14.0;

    /// Asteroid radius range (min inclusive, max exclusive)
    pub const ASTEROID_MIN_RADIUS: f32 = 16.0;
    pub const ASTEROID_MAX_RADIUS: f32 = 34.0;
    /// Asteroid speed jitter around the difficulty base speed
    pub const ASTEROID_SPEED_JITTER_MIN: f32 = -0.35;
    pub const ASTEROID_SPEED_JITTER_MAX: f32 = 0.9;
    /// Spin magnitude range (radians per reference frame)
    pub const ASTEROID_MIN_SPIN: f32 = 0.008;
    pub const ASTEROID_MAX_SPIN: f32 = 0.035;
    /// Asteroids are discarded once their center passes this far below the bottom edge
    pub const ASTEROID_MISS_MARGIN: f32 = 56.0;

    /// Shrunk collision radii relative to the nominal sprite radius
    pub const PROJECTILE_HIT_SCALE: f32 = 0.76;
    pub const SHIP_HIT_SCALE: f32 = 0.78;

    /// Ship shows its firing pose for this long after a shot
    pub const FIRE_FLASH_MS: f32 = 95.0;

    /// Preallocated entity capacity
    pub const MAX_PROJECTILES: usize = 128;
    pub const MAX_ASTEROIDS: usize = 96;
}

/// Convert elapsed milliseconds into the clamped integration scale
#[inline]
pub fn frame_scale(delta_ms: f32) -> f32 {
    use consts::*;
    if !delta_ms.is_finite() {
        return MIN_FRAME_SCALE;
    }
    (delta_ms / REFERENCE_FRAME_MS).clamp(MIN_FRAME_SCALE, MAX_FRAME_SCALE)
}

/// Squared distance between two points
#[inline]
pub fn distance_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}
