//! Game state and core simulation types
//!
//! Everything the update phase mutates lives here. Rendering only reads it.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::pool::Pool;
use crate::consts::*;
use crate::tuning::DifficultyProfile;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Active gameplay
    Running,
    /// Simulation suspended, rendering continues
    Paused,
    /// Ship destroyed; terminal
    GameOver,
}

/// Playfield dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Portrait layouts use the mobile background art
    pub fn is_portrait(&self) -> bool {
        self.height >= self.width
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYFIELD_WIDTH, DEFAULT_PLAYFIELD_HEIGHT)
    }
}

/// The player's ship. `pos` is the top-left corner of the sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ship {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Ship {
    /// Centered horizontally, resting near the bottom edge
    pub fn new(playfield: &Playfield) -> Self {
        let size = Vec2::new(SHIP_WIDTH, SHIP_HEIGHT);
        let mut ship = Self {
            pos: Vec2::new(
                playfield.width / 2.0 - size.x / 2.0,
                playfield.height - size.y - SHIP_BOTTOM_GAP,
            ),
            size,
        };
        ship.clamp_to(playfield);
        ship
    }

    pub fn min_x() -> f32 {
        MARGIN_LEFT
    }

    pub fn max_x(&self, playfield: &Playfield) -> f32 {
        (playfield.width - self.size.x - MARGIN_RIGHT).max(MARGIN_LEFT)
    }

    pub fn clamp_to(&mut self, playfield: &Playfield) {
        self.pos.x = self.pos.x.clamp(Self::min_x(), self.max_x(playfield));
    }

    /// Move sideways, staying inside the legal horizontal range
    pub fn shift(&mut self, dx: f32, playfield: &Playfield) {
        self.pos.x += dx;
        self.clamp_to(playfield);
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Full sprite bounds
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Inset rectangle used for collisions only
    pub fn hitbox(&self) -> Rect {
        self.bounds().inset(HITBOX_INSET_X, HITBOX_INSET_Y)
    }

    /// Twin cannon emission points
    pub fn cannons(&self) -> [Vec2; 2] {
        let y = self.pos.y + CANNON_OFFSET_Y;
        let cx = self.center_x();
        [
            Vec2::new(cx - CANNON_OFFSET_X, y),
            Vec2::new(cx + CANNON_OFFSET_X, y),
        ]
    }
}

/// A cannon shot travelling up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub speed: f32,
    pub alive: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            speed,
            alive: true,
        }
    }
}

/// A falling, spinning rock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Asteroid {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    /// Current rotation (radians)
    pub rotation: f32,
    /// Rotation per reference frame (radians)
    pub spin: f32,
    /// Index into the asset bundle's asteroid sprites
    pub sprite: usize,
    pub alive: bool,
}

impl Asteroid {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            pos,
            radius,
            speed,
            rotation: 0.0,
            spin: 0.0,
            sprite: 0,
            alive: true,
        }
    }
}

/// Score and lifecycle flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    pub game_over: bool,
    pub paused: bool,
}

impl RunState {
    pub fn phase(&self) -> RunPhase {
        if self.game_over {
            RunPhase::GameOver
        } else if self.paused {
            RunPhase::Paused
        } else {
            RunPhase::Running
        }
    }
}

/// Complete simulation state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    pub playfield: Playfield,
    /// Tuning picked at construction, fixed for the run
    pub profile: DifficultyProfile,
    pub run: RunState,
    pub ship: Ship,
    pub projectiles: Pool<Projectile>,
    pub asteroids: Pool<Asteroid>,
    /// Milliseconds of unpaused simulation
    pub sim_time_ms: f64,
    /// Simulation time of the last fire event
    pub last_shot_ms: Option<f64>,
    /// Simulation time of the last asteroid spawn
    pub last_spawn_ms: Option<f64>,
    /// Fire events so far (each fires both cannons)
    pub shots_fired: u64,
    /// Number of asteroid sprites to pick from
    pub sprite_count: usize,
    rng: Pcg32,
}

impl GameState {
    /// Create a new run with the given seed
    pub fn new(playfield: Playfield, profile: DifficultyProfile, seed: u64) -> Self {
        Self {
            playfield,
            profile,
            run: RunState::default(),
            ship: Ship::new(&playfield),
            projectiles: Pool::with_capacity(MAX_PROJECTILES),
            asteroids: Pool::with_capacity(MAX_ASTEROIDS),
            sim_time_ms: 0.0,
            last_shot_ms: None,
            last_spawn_ms: None,
            shots_fired: 0,
            sprite_count: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn with_sprite_count(mut self, sprite_count: usize) -> Self {
        self.sprite_count = sprite_count;
        self
    }

    pub fn phase(&self) -> RunPhase {
        self.run.phase()
    }

    pub fn fire_ready(&self, now_ms: f64) -> bool {
        self.last_shot_ms
            .is_none_or(|last| now_ms - last >= self.profile.fire_cooldown_ms as f64)
    }

    pub fn spawn_due(&self, now_ms: f64) -> bool {
        self.last_spawn_ms
            .is_none_or(|last| now_ms - last >= self.profile.spawn_interval_ms as f64)
    }

    /// Fire both cannons
    pub fn fire(&mut self, now_ms: f64) {
        let speed = self.profile.projectile_speed;
        for muzzle in self.ship.cannons() {
            if !self.projectiles.push(Projectile::new(muzzle, speed)) {
                log::debug!("Projectile pool full, shot dropped");
            }
        }
        self.last_shot_ms = Some(now_ms);
        self.shots_fired += 1;
    }

    /// Spawn a randomized asteroid just above the top edge
    pub fn spawn_random_asteroid(&mut self) {
        let rng = &mut self.rng;
        let radius = rng.random_range(ASTEROID_MIN_RADIUS..ASTEROID_MAX_RADIUS);
        let lo = radius;
        let hi = (self.playfield.width - radius).max(lo);
        let x = if hi > lo { rng.random_range(lo..=hi) } else { lo };
        let base = self.profile.asteroid_speed;
        let jitter = rng.random_range(ASTEROID_SPEED_JITTER_MIN..ASTEROID_SPEED_JITTER_MAX);
        let speed = (base + jitter).max(base * 0.4);
        let rotation = rng.random_range(0.0..std::f32::consts::TAU);
        let spin_mag = rng.random_range(ASTEROID_MIN_SPIN..ASTEROID_MAX_SPIN);
        let spin = if rng.random_bool(0.5) { spin_mag } else { -spin_mag };
        let sprite = if self.sprite_count > 0 {
            rng.random_range(0..self.sprite_count)
        } else {
            0
        };

        let asteroid = Asteroid {
            pos: Vec2::new(x, -radius),
            radius,
            speed,
            rotation,
            spin,
            sprite,
            alive: true,
        };
        if !self.asteroids.push(asteroid) {
            log::debug!("Asteroid pool full, spawn dropped");
        }
    }

    /// Place a specific asteroid (scenario setup)
    pub fn spawn_asteroid_at(&mut self, pos: Vec2, radius: f32, speed: f32) -> bool {
        self.asteroids.push(Asteroid::new(pos, radius, speed))
    }

    /// Place a specific projectile (scenario setup)
    pub fn spawn_projectile_at(&mut self, pos: Vec2) -> bool {
        let speed = self.profile.projectile_speed;
        self.projectiles.push(Projectile::new(pos, speed))
    }
}
