//! Snapshot notification
//!
//! The engine pushes a `Snapshot` to one observer after every rendered tick.
//! Owners can use a closure, the bounded `SnapshotQueue`, or anything else
//! implementing `SnapshotObserver`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Immutable per-tick summary of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub score: u64,
    pub is_game_over: bool,
    pub is_paused: bool,
}

pub trait SnapshotObserver {
    fn on_snapshot(&mut self, snapshot: Snapshot);
}

impl<F: FnMut(Snapshot)> SnapshotObserver for F {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self(snapshot)
    }
}

/// Shared ring of the most recent snapshots
///
/// Clones share the same buffer; when full the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct SnapshotQueue {
    buffer: Rc<RefCell<VecDeque<Snapshot>>>,
    capacity: usize,
}

impl SnapshotQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: Rc::new(RefCell::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn push(&self, snapshot: Snapshot) {
        let mut buffer = self.buffer.borrow_mut();
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(snapshot);
    }

    /// Remove and return everything queued, oldest first
    pub fn drain(&self) -> Vec<Snapshot> {
        self.buffer.borrow_mut().drain(..).collect()
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.buffer.borrow().back().copied()
    }

    pub fn len(&self) -> usize {
        self.buffer.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }
}

impl SnapshotObserver for SnapshotQueue {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.push(snapshot);
    }
}

/// Reports the game-over transition once per run
///
/// The engine keeps notifying after game over; owners that submit scores feed
/// every snapshot through the latch and act only on `Some`.
#[derive(Debug, Clone, Default)]
pub struct GameOverLatch {
    fired: bool,
}

impl GameOverLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final score the first time a game-over snapshot is seen
    pub fn observe(&mut self, snapshot: &Snapshot) -> Option<u64> {
        if snapshot.is_game_over && !self.fired {
            self.fired = true;
            return Some(snapshot.score);
        }
        None
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Arm again for a new run
    pub fn reset(&mut self) {
        self.fired = false;
    }
}

/// Forwards snapshots to fallible owner callbacks
///
/// `on_update` runs every frame and `on_game_over` once with the final score.
/// A failing callback is logged and does not stop later deliveries.
pub struct CallbackObserver<U, G> {
    on_update: U,
    on_game_over: Option<G>,
    latch: GameOverLatch,
}

impl<U, G, E> CallbackObserver<U, G>
where
    U: FnMut(&Snapshot) -> Result<(), E>,
    G: FnMut(u64) -> Result<(), E>,
    E: Debug,
{
    pub fn new(on_update: U, on_game_over: Option<G>) -> Self {
        Self {
            on_update,
            on_game_over,
            latch: GameOverLatch::new(),
        }
    }
}

impl<U, G, E> SnapshotObserver for CallbackObserver<U, G>
where
    U: FnMut(&Snapshot) -> Result<(), E>,
    G: FnMut(u64) -> Result<(), E>,
    E: Debug,
{
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        if let Err(err) = (self.on_update)(&snapshot) {
            log::warn!("Snapshot callback failed: {:?}", err);
        }
        if let (Some(score), Some(callback)) =
            (self.latch.observe(&snapshot), self.on_game_over.as_mut())
        {
            if let Err(err) = callback(score) {
                log::warn!("Game over callback failed: {:?}", err);
            }
        }
    }
}
