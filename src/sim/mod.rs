//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and sequence of
//! (intent, delta) pairs, a run plays out identically:
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod pool;
pub mod state;
pub mod tick;

pub use collision::{Rect, circle_hits_point, circle_hits_rect};
pub use pool::Pool;
pub use state::{Asteroid, GameState, Playfield, Projectile, RunPhase, RunState, Ship};
pub use tick::{TickReport, nearest_threat_sq, tick};
