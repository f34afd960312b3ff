//! Foreground / home-page tracking.
//!
//! Each flag has one writer: the window lifecycle owns `foreground`, the UI
//! owns `on_home`. Readers tolerate seeing either side of a transition, so
//! relaxed atomics are enough.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleState {
    pub is_foreground: bool,
    pub is_on_home: bool,
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self {
            is_foreground: false,
            is_on_home: true,
        }
    }
}

#[derive(Debug)]
pub struct LifecycleTracker {
    foreground: AtomicBool,
    on_home: AtomicBool,
}

impl Default for LifecycleTracker {
    fn default() -> Self {
        Self::with_state(LifecycleState::default())
    }
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: LifecycleState) -> Self {
        Self {
            foreground: AtomicBool::new(state.is_foreground),
            on_home: AtomicBool::new(state.is_on_home),
        }
    }

    pub fn on_foreground_enter(&self) {
        log::debug!("[LIFECYCLE] foreground");
        self.foreground.store(true, Ordering::Relaxed);
    }

    pub fn on_foreground_exit(&self) {
        log::debug!("[LIFECYCLE] background");
        self.foreground.store(false, Ordering::Relaxed);
    }

    pub fn set_on_home_page(&self, on_home: bool) {
        log::debug!("[LIFECYCLE] on_home={}", on_home);
        self.on_home.store(on_home, Ordering::Relaxed);
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::Relaxed)
    }

    pub fn is_on_home(&self) -> bool {
        self.on_home.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> LifecycleState {
        LifecycleState {
            is_foreground: self.is_foreground(),
            is_on_home: self.is_on_home(),
        }
    }
}
