//! `window.setInterval` backed [`Scheduler`].
//!
//! A cleared interval's closure may be the one currently running (a tick that
//! wins, a speed change routed from inside a tick), so it is parked in
//! `RETIRED` and dropped at the start of the next timer dispatch instead.

use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::game::{Scheduler, TimerHandle};

thread_local! {
    static RETIRED: RefCell<Vec<Closure<dyn FnMut()>>> = const { RefCell::new(Vec::new()) };
}

/// Drop closures of intervals cleared during earlier callbacks.
pub(super) fn drop_retired() {
    RETIRED.with(|retired| retired.borrow_mut().clear());
}

#[derive(Default)]
pub struct IntervalScheduler {
    next_id: u32,
    live: HashMap<TimerHandle, (i32, Closure<dyn FnMut()>)>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for IntervalScheduler {
    fn set_interval(&mut self, period_ms: u32) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle(self.next_id);
        let closure = Closure::wrap(Box::new(move || super::dispatch_timer(handle)) as Box<dyn FnMut()>);
        let timeout = i32::try_from(period_ms).unwrap_or(i32::MAX);
        let id = window().map(|w| {
            w.set_interval_with_callback_and_timeout_and_arguments_0(closure.as_ref().unchecked_ref(), timeout)
        });
        match id {
            Some(Ok(id)) => {
                self.live.insert(handle, (id, closure));
            }
            Some(Err(err)) => log::error!("setInterval failed: {err:?}"),
            None => log::error!("no window to schedule on"),
        }
        handle
    }

    fn clear_interval(&mut self, handle: TimerHandle) {
        let Some((id, closure)) = self.live.remove(&handle) else {
            return;
        };
        if let Some(w) = window() {
            w.clear_interval_with_handle(id);
        }
        RETIRED.with(|retired| retired.borrow_mut().push(closure));
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        let handles: Vec<TimerHandle> = self.live.keys().copied().collect();
        for handle in handles {
            self.clear_interval(handle);
        }
    }
}
