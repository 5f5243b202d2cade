//! Timer seam for the tick loop.
//!
//! The game never sleeps or polls: it asks a [`Scheduler`] for repeating
//! intervals and is called back through [`crate::game::Game::fire`] with the
//! handle that elapsed. In the browser this is `window.setInterval`; headless
//! hosts and tests use [`ManualScheduler`], which runs on virtual time.

use std::cell::RefCell;
use std::rc::Rc;

use super::Game;

/// Opaque token for one scheduled interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(pub u32);

pub trait Scheduler {
    /// Start a repeating interval. The first callback arrives one period from now.
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle;
    /// Cancel an interval. Unknown or already-cleared handles are ignored.
    fn clear_interval(&mut self, handle: TimerHandle);
}

#[derive(Debug)]
struct ManualTimer {
    handle: TimerHandle,
    period_ms: u32,
    due_at: u64,
}

#[derive(Debug, Default)]
struct ManualClock {
    now_ms: u64,
    next_id: u32,
    timers: Vec<ManualTimer>,
}

/// Virtual-time scheduler. Clones share the same clock, so one copy can be
/// handed to a `Game` while the host keeps another to drive time forward.
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    clock: Rc<RefCell<ManualClock>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.borrow().now_ms
    }

    /// Live intervals and their periods, oldest first.
    pub fn active(&self) -> Vec<(TimerHandle, u32)> {
        self.clock
            .borrow()
            .timers
            .iter()
            .map(|t| (t.handle, t.period_ms))
            .collect()
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.clock.borrow().timers.iter().any(|t| t.handle == handle)
    }

    /// Pop the earliest interval due at or before `until_ms`, moving the clock
    /// to its deadline and re-arming it for the next period.
    pub fn pop_due(&self, until_ms: u64) -> Option<TimerHandle> {
        let mut clock = self.clock.borrow_mut();
        let timer = clock
            .timers
            .iter_mut()
            .filter(|t| t.due_at <= until_ms)
            .min_by_key(|t| (t.due_at, t.handle.0))?;
        let due_at = timer.due_at;
        timer.due_at += u64::from(timer.period_ms);
        let handle = timer.handle;
        clock.now_ms = due_at;
        Some(handle)
    }

    /// Advance virtual time by `ms`, firing every interval that elapses, in order.
    pub fn run_for(&self, game: &mut Game, ms: u64) {
        let until = self.now_ms() + ms;
        while let Some(handle) = self.pop_due(until) {
            game.fire(handle);
        }
        self.clock.borrow_mut().now_ms = until;
    }
}

impl Scheduler for ManualScheduler {
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        let mut clock = self.clock.borrow_mut();
        clock.next_id += 1;
        let handle = TimerHandle(clock.next_id);
        let due_at = clock.now_ms + u64::from(period_ms.max(1));
        clock.timers.push(ManualTimer {
            handle,
            period_ms: period_ms.max(1),
            due_at,
        });
        handle
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        self.clock.borrow_mut().timers.retain(|t| t.handle != handle);
    }
}
