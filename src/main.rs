//! Astro Gate entry point
//!
//! The browser build is driven from JavaScript through `astro_gate::web`.
//! Natively this runs a headless autopilot session on a manual clock and
//! logs the outcome, which is handy for checking tuning changes.
//!
//! Usage: `astro-gate [easy|normal|hard] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    use std::cell::Cell;
    use std::rc::Rc;

    use astro_gate::assets::{AssetBundle, AssetManifest};
    use astro_gate::consts::*;
    use astro_gate::engine::{Engine, GameOverLatch, ManualClock, Snapshot};
    use astro_gate::renderer::HeadlessCanvas;
    use astro_gate::sim::{GameState, nearest_threat_sq};
    use astro_gate::{ControlIntent, Difficulty, Settings};

    /// Frame step of the simulated display (60 Hz)
    const FRAME_MS: f64 = 16.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u64 = 60 * 60 * 10;
    /// Start dodging when an asteroid center is this close to the hitbox
    const DODGE_DISTANCE: f32 = 90.0;

    /// Steer under the lowest asteroid, sidestep anything too close
    fn steer(state: &GameState) -> ControlIntent {
        let ship_x = state.ship.center_x();
        let threatened =
            nearest_threat_sq(state).is_some_and(|d| d < DODGE_DISTANCE * DODGE_DISTANCE);

        if threatened {
            let hitbox = state.ship.hitbox();
            let closest = state.asteroids.iter().min_by(|a, b| {
                let da = (a.pos - hitbox.closest_point(a.pos)).length_squared();
                let db = (b.pos - hitbox.closest_point(b.pos)).length_squared();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
            if let Some(rock) = closest {
                let away = if rock.pos.x >= ship_x { -1.0 } else { 1.0 };
                return ControlIntent::new(away, true);
            }
        }

        let target = state
            .asteroids
            .iter()
            .filter(|a| a.pos.y > 0.0)
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal));
        let lateral = match target {
            Some(rock) => ((rock.pos.x - ship_x) / CANNON_OFFSET_X).clamp(-1.0, 1.0),
            None => 0.0,
        };
        ControlIntent::new(lateral, true)
    }

    pub fn run() {
        let settings = Settings::load();
        let mut args = std::env::args().skip(1);
        let difficulty = args
            .next()
            .and_then(|a| Difficulty::from_str(&a))
            .unwrap_or(settings.difficulty);
        let mut options = settings.engine_options();
        options.difficulty = difficulty;
        if let Some(seed) = args.next().and_then(|a| a.parse().ok()) {
            options.seed = seed;
        }
        let seed = options.seed;

        let clock = ManualClock::new();
        let canvas = HeadlessCanvas::new(DEFAULT_PLAYFIELD_WIDTH, DEFAULT_PLAYFIELD_HEIGHT);
        let assets = Rc::new(AssetBundle::headless(&AssetManifest::default()));
        let mut engine = match Engine::new(&canvas, options, assets, clock.scheduler()) {
            Ok(engine) => engine,
            Err(err) => {
                log::error!("Engine construction failed: {}", err);
                std::process::exit(1);
            }
        };

        let final_score = Rc::new(Cell::new(None));
        let sink = final_score.clone();
        let mut latch = GameOverLatch::new();
        engine.start(move |snapshot: Snapshot| {
            if let Some(score) = latch.observe(&snapshot) {
                sink.set(Some(score));
            }
        });

        while engine.frames() < MAX_FRAMES && final_score.get().is_none() {
            engine.set_controls(engine.inspect(steer));
            clock.advance(FRAME_MS);
        }

        let snapshot = engine.snapshot();
        let (shots, seconds) = engine.inspect(|s| (s.shots_fired, s.sim_time_ms / 1000.0));
        engine.destroy();

        log::info!(
            "{} run, seed {}: score {} after {:.1}s ({} volleys, game over: {})",
            difficulty.as_str(),
            seed,
            snapshot.score,
            seconds,
            shots,
            snapshot.is_game_over
        );
        println!("{}", snapshot.score);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Astro Gate (native) starting...");
    autopilot::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is astro_gate::web, this is just to satisfy the compiler
}
