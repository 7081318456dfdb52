//! Engine lifecycle
//!
//! Owns one run: the simulation state, the drawing surface and the frame loop.
//! Each scheduled frame computes the delta, advances the simulation (unless
//! paused or over), renders, then notifies the observer.

pub mod observer;
pub mod scheduler;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;

use crate::assets::AssetBundle;
use crate::consts::{FIRE_FLASH_MS, REFERENCE_FRAME_MS};
use crate::error::EngineError;
use crate::input::ControlIntent;
use crate::renderer::{DrawingTarget, FrameContext, Surface, render};
use crate::sim::{GameState, Playfield, RunPhase, tick};
use crate::tuning::{Difficulty, DifficultyTable};

pub use observer::{CallbackObserver, GameOverLatch, Snapshot, SnapshotObserver, SnapshotQueue};
#[cfg(target_arch = "wasm32")]
pub use scheduler::AnimationFrameScheduler;
pub use scheduler::{FrameCallback, FrameScheduler, ManualClock, ManualScheduler};

/// Construction parameters
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub difficulty: Difficulty,
    /// RNG seed for asteroid spawns
    pub seed: u64,
    /// Tuning override, defaults to the built-in table
    pub tuning: Option<DifficultyTable>,
    pub reduced_motion: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            seed: 0,
            tuning: None,
            reduced_motion: false,
        }
    }
}

impl EngineOptions {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            seed,
            ..Self::default()
        }
    }
}

struct Core<S: Surface> {
    state: GameState,
    controls: ControlIntent,
    surface: S,
    assets: Rc<AssetBundle<S::Image>>,
    last_frame_ms: Option<f64>,
    /// Host time of the most recent shot, for the fire pose
    last_shot_wall_ms: Option<f64>,
    reduced_motion: bool,
    frames: u64,
}

impl<S: Surface> Core<S> {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.state.run.score,
            is_game_over: self.state.run.game_over,
            is_paused: self.state.run.paused,
        }
    }

    fn frame(&mut self, now_ms: f64) -> Snapshot {
        let delta_ms = match self.last_frame_ms {
            Some(previous) => now_ms - previous,
            None => REFERENCE_FRAME_MS as f64,
        };
        self.last_frame_ms = Some(now_ms);

        if self.state.phase() == RunPhase::Running
            && tick(&mut self.state, &self.controls, delta_ms).shots > 0
        {
            self.last_shot_wall_ms = Some(now_ms);
        }

        let context = FrameContext {
            wall_ms: now_ms,
            firing: self.controls.firing(),
            fire_flash: self
                .last_shot_wall_ms
                .is_some_and(|shot| now_ms - shot <= FIRE_FLASH_MS as f64),
            reduced_motion: self.reduced_motion,
        };
        render(&mut self.surface, &self.state, &self.assets, &context);
        self.frames += 1;
        self.snapshot()
    }
}

type ObserverSlot = Rc<RefCell<Option<Box<dyn SnapshotObserver>>>>;

/// Cloneable control half of an engine
///
/// Input handlers and observers hold one of these to steer a running engine.
pub struct EngineHandle<S: Surface> {
    core: Rc<RefCell<Core<S>>>,
}

impl<S: Surface> Clone for EngineHandle<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}

impl<S: Surface> EngineHandle<S> {
    /// Replace the control intent; takes effect on the next tick
    pub fn set_controls(&self, controls: ControlIntent) {
        self.core.borrow_mut().controls = controls;
    }

    pub fn set_paused(&self, paused: bool) {
        let mut core = self.core.borrow_mut();
        if core.state.run.paused != paused {
            log::debug!("Engine {}", if paused { "paused" } else { "resumed" });
        }
        core.state.run.paused = paused;
    }

    pub fn snapshot(&self) -> Snapshot {
        self.core.borrow().snapshot()
    }

    pub fn phase(&self) -> RunPhase {
        self.core.borrow().state.phase()
    }
}

/// A single game run bound to a surface and a frame scheduler
pub struct Engine<S: Surface + 'static, F: FrameScheduler> {
    handle: EngineHandle<S>,
    observer: ObserverSlot,
    scheduler: F,
}

impl<S: Surface + 'static, F: FrameScheduler> Engine<S, F> {
    /// Build an engine for `target`
    ///
    /// Fails if the target has no 2D context, the bundle has no asteroid
    /// sprites, or the tuning override is invalid.
    pub fn new<T>(
        target: &T,
        options: EngineOptions,
        assets: Rc<AssetBundle<S::Image>>,
        scheduler: F,
    ) -> Result<Self, EngineError>
    where
        T: DrawingTarget<Surface = S>,
    {
        let surface = target
            .context_2d()
            .ok_or(EngineError::ContextUnavailable)?;
        assets.validate()?;
        let table = options.tuning.unwrap_or_default();
        table.validate()?;

        let size: Vec2 = surface.size();
        let playfield = Playfield::new(size.x, size.y);
        let state = GameState::new(playfield, table.profile(options.difficulty), options.seed)
            .with_sprite_count(assets.asteroids.len());

        log::info!(
            "Engine ready: {} on {}x{} (seed {})",
            options.difficulty.as_str(),
            size.x,
            size.y,
            options.seed
        );

        let core = Core {
            state,
            controls: ControlIntent::default(),
            surface,
            assets,
            last_frame_ms: None,
            last_shot_wall_ms: None,
            reduced_motion: options.reduced_motion,
            frames: 0,
        };
        Ok(Self {
            handle: EngineHandle {
                core: Rc::new(RefCell::new(core)),
            },
            observer: Rc::new(RefCell::new(None)),
            scheduler,
        })
    }

    pub fn handle(&self) -> EngineHandle<S> {
        self.handle.clone()
    }

    pub fn set_controls(&self, controls: ControlIntent) {
        self.handle.set_controls(controls);
    }

    pub fn set_paused(&self, paused: bool) {
        self.handle.set_paused(paused);
    }

    pub fn snapshot(&self) -> Snapshot {
        self.handle.snapshot()
    }

    pub fn phase(&self) -> RunPhase {
        self.handle.phase()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Frames rendered so far
    pub fn frames(&self) -> u64 {
        self.handle.core.borrow().frames
    }

    /// Read the simulation state
    pub fn inspect<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.handle.core.borrow().state)
    }

    /// Mutate the simulation state directly (scenario setup and tooling)
    pub fn with_state_mut<R>(&self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.handle.core.borrow_mut().state)
    }

    /// Read the drawing surface
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.handle.core.borrow().surface)
    }

    /// Begin the frame loop, reporting to `observer` after every render
    ///
    /// On a running engine this only swaps the observer.
    pub fn start(&mut self, observer: impl SnapshotObserver + 'static) {
        *self.observer.borrow_mut() = Some(Box::new(observer));
        if self.scheduler.is_running() {
            return;
        }

        let core = self.handle.core.clone();
        core.borrow_mut().last_frame_ms = None;
        let observer = self.observer.clone();
        self.scheduler.start(Box::new(move |now_ms| {
            let snapshot = core.borrow_mut().frame(now_ms);
            notify(&observer, snapshot);
        }));
        log::info!("Engine started");
    }

    /// Stop the frame loop; the run state is left untouched
    pub fn destroy(&mut self) {
        if self.scheduler.is_running() {
            log::info!("Engine destroyed");
        }
        self.scheduler.cancel();
    }
}

impl<S: Surface + 'static, F: FrameScheduler> Drop for Engine<S, F> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Deliver a snapshot with no borrow held, so the observer may call back in
fn notify(slot: &ObserverSlot, snapshot: Snapshot) {
    let taken = slot.borrow_mut().take();
    let Some(mut observer) = taken else {
        return;
    };
    observer.on_snapshot(snapshot);
    let mut current = slot.borrow_mut();
    // A replacement installed during the callback wins
    if current.is_none() {
        *current = Some(observer);
    }
}

/// Owner of at most one live engine
///
/// Launching always tears down the previous engine first, so two frame loops
/// never run against the same surface.
pub struct EngineSlot<S: Surface + 'static, F: FrameScheduler> {
    current: Option<Engine<S, F>>,
}

impl<S: Surface + 'static, F: FrameScheduler> Default for EngineSlot<S, F> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<S: Surface + 'static, F: FrameScheduler> EngineSlot<S, F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the current engine, then build and store a new one
    ///
    /// If `build` fails the slot is left empty.
    pub fn launch(
        &mut self,
        build: impl FnOnce() -> Result<Engine<S, F>, EngineError>,
    ) -> Result<&mut Engine<S, F>, EngineError> {
        self.teardown();
        let engine = build()?;
        Ok(self.current.insert(engine))
    }

    pub fn current(&self) -> Option<&Engine<S, F>> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut Engine<S, F>> {
        self.current.as_mut()
    }

    pub fn teardown(&mut self) {
        if let Some(mut previous) = self.current.take() {
            previous.destroy();
        }
    }
}
