//! Frame scheduling
//!
//! A `FrameScheduler` calls a frame callback once per display refresh with a
//! millisecond timestamp. The browser uses `requestAnimationFrame`; tests and
//! the native binary drive frames by hand through `ManualClock`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Invoked once per frame with the host timestamp (ms)
pub type FrameCallback = Box<dyn FnMut(f64)>;

pub trait FrameScheduler {
    /// Begin calling `frame` every frame, replacing any previous callback
    fn start(&mut self, frame: FrameCallback);

    /// Stop calling back. Safe to call repeatedly or before `start`.
    fn cancel(&mut self);

    fn is_running(&self) -> bool;
}

#[derive(Default)]
struct LoopSlot {
    callback: Option<FrameCallback>,
    active: bool,
    generation: u64,
}

#[derive(Default)]
struct ClockInner {
    now_ms: f64,
    loops: Vec<Weak<RefCell<LoopSlot>>>,
}

/// Hand-driven frame clock
///
/// Every scheduler created from the clock fires when the clock advances,
/// so two loops left running are both observable.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at a given timestamp
    pub fn starting_at(now_ms: f64) -> Self {
        let clock = Self::default();
        clock.inner.borrow_mut().now_ms = now_ms;
        clock
    }

    /// New scheduler bound to this clock
    pub fn scheduler(&self) -> ManualScheduler {
        let slot = Rc::new(RefCell::new(LoopSlot::default()));
        let mut inner = self.inner.borrow_mut();
        inner.loops.retain(|weak| weak.strong_count() > 0);
        inner.loops.push(Rc::downgrade(&slot));
        ManualScheduler { slot }
    }

    /// Number of schedulers currently running a loop
    pub fn running_loops(&self) -> usize {
        self.inner
            .borrow()
            .loops
            .iter()
            .filter_map(Weak::upgrade)
            .filter(|slot| slot.borrow().active)
            .count()
    }

    /// Advance by `delta_ms` and deliver one frame to every running loop
    pub fn advance(&self, delta_ms: f64) {
        let (now, slots) = {
            let mut inner = self.inner.borrow_mut();
            inner.now_ms += delta_ms;
            inner.loops.retain(|weak| weak.strong_count() > 0);
            let slots: Vec<_> = inner.loops.iter().filter_map(Weak::upgrade).collect();
            (inner.now_ms, slots)
        };

        for slot in slots {
            let (callback, generation) = {
                let mut s = slot.borrow_mut();
                if !s.active {
                    continue;
                }
                (s.callback.take(), s.generation)
            };
            let Some(mut callback) = callback else {
                continue;
            };
            callback(now);
            // Put it back unless the loop was cancelled or restarted meanwhile
            let mut s = slot.borrow_mut();
            if s.active && s.generation == generation && s.callback.is_none() {
                s.callback = Some(callback);
            }
        }
    }

    /// Advance in equal steps covering `total_ms`
    pub fn run_for(&self, total_ms: f64, step_ms: f64) {
        if step_ms <= 0.0 {
            return;
        }
        let steps = (total_ms / step_ms).round() as u64;
        for _ in 0..steps {
            self.advance(step_ms);
        }
    }
}

/// Scheduler half of `ManualClock`
pub struct ManualScheduler {
    slot: Rc<RefCell<LoopSlot>>,
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self, frame: FrameCallback) {
        let mut slot = self.slot.borrow_mut();
        slot.callback = Some(frame);
        slot.active = true;
        slot.generation += 1;
    }

    fn cancel(&mut self) {
        let mut slot = self.slot.borrow_mut();
        slot.active = false;
        slot.generation += 1;
        slot.callback = None;
    }

    fn is_running(&self) -> bool {
        self.slot.borrow().active
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AnimationFrameScheduler;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;

    use super::{FrameCallback, FrameScheduler};

    #[derive(Default)]
    struct RafState {
        closure: RefCell<Option<Closure<dyn FnMut(f64)>>>,
        handle: Cell<Option<i32>>,
        active: Cell<bool>,
    }

    impl RafState {
        fn request_next(&self) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Some(closure) = self.closure.borrow().as_ref() {
                let handle = window
                    .request_animation_frame(closure.as_ref().unchecked_ref())
                    .ok();
                self.handle.set(handle);
            }
        }

        fn cancel_pending(&self) {
            if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    /// `requestAnimationFrame` loop
    #[derive(Default)]
    pub struct AnimationFrameScheduler {
        state: Rc<RafState>,
    }

    impl AnimationFrameScheduler {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl FrameScheduler for AnimationFrameScheduler {
        fn start(&mut self, mut frame: FrameCallback) {
            self.state.cancel_pending();
            self.state.active.set(true);

            let weak: Weak<RafState> = Rc::downgrade(&self.state);
            let closure = Closure::wrap(Box::new(move |timestamp: f64| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                state.handle.set(None);
                if !state.active.get() {
                    return;
                }
                frame(timestamp);
                if state.active.get() {
                    state.request_next();
                }
            }) as Box<dyn FnMut(f64)>);

            // The previous closure (if any) is only replaced outside of its own frame
            *self.state.closure.borrow_mut() = Some(closure);
            self.state.request_next();
        }

        fn cancel(&mut self) {
            self.state.active.set(false);
            self.state.cancel_pending();
        }

        fn is_running(&self) -> bool {
            self.state.active.get()
        }
    }

    impl Drop for AnimationFrameScheduler {
        fn drop(&mut self) {
            self.cancel();
        }
    }
}
