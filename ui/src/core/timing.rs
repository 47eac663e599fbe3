//! High-resolution timing utilities shared by the task views.
//!
//! Engines never read a clock themselves. Views stamp events with [`now`] and
//! pass the stamps in, which keeps reaction-time scoring testable with
//! fabricated timestamps.

use serde::{Deserialize, Serialize};

/// Monotonic timestamp in milliseconds since an arbitrary, per-process origin.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct InstantStamp(pub f64);

impl InstantStamp {
    pub fn from_ms(ms: f64) -> Self {
        Self(ms)
    }

    pub fn as_ms(self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`. Negative when the clock went backwards.
    pub fn millis_since(self, earlier: InstantStamp) -> f64 {
        self.0 - earlier.0
    }
}

#[cfg(target_arch = "wasm32")]
pub fn now() -> InstantStamp {
    let ms = web_sys::window()
        .and_then(|win| win.performance())
        .map(|perf| perf.now())
        .unwrap_or_default();
    InstantStamp(ms)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now() -> InstantStamp {
    use once_cell::sync::Lazy;
    use std::time::Instant;

    static ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);
    InstantStamp(ORIGIN.elapsed().as_secs_f64() * 1000.0)
}

#[cfg(target_arch = "wasm32")]
pub async fn sleep_ms(ms: u64) {
    gloo_timers::future::TimeoutFuture::new(ms.min(u32::MAX as u64) as u32).await;
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}

/// Fixed-interval round scheduler owned by a view.
///
/// The view wakes up periodically and asks [`RoundTicker::due`] whether the
/// current round has run its course; the engine stays unaware of wall-clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTicker {
    pub interval_ms: u64,
    round_started: Option<InstantStamp>,
}

impl RoundTicker {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            round_started: None,
        }
    }

    /// Mark the start of a new round.
    pub fn restart(&mut self, at: InstantStamp) {
        self.round_started = Some(at);
    }

    pub fn stop(&mut self) {
        self.round_started = None;
    }

    pub fn is_running(&self) -> bool {
        self.round_started.is_some()
    }

    pub fn due(&self, at: InstantStamp) -> bool {
        match self.round_started {
            Some(started) => at.millis_since(started) >= self.interval_ms as f64,
            None => false,
        }
    }

    /// Milliseconds left in the current round, zero once due or when stopped.
    pub fn remaining_ms(&self, at: InstantStamp) -> u64 {
        match self.round_started {
            Some(started) => {
                let left = self.interval_ms as f64 - at.millis_since(started);
                left.max(0.0).ceil() as u64
            }
            None => 0,
        }
    }
}

/// Session countdown (Speed Match). Purely derived from the start stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    pub duration_secs: u32,
    started: Option<InstantStamp>,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            duration_secs,
            started: None,
        }
    }

    pub fn start(&mut self, at: InstantStamp) {
        self.started = Some(at);
    }

    pub fn stop(&mut self) {
        self.started = None;
    }

    /// Whole seconds left, rounded up so the display reads `60` right after start.
    pub fn remaining_secs(&self, at: InstantStamp) -> u32 {
        match self.started {
            Some(started) => {
                let total_ms = self.duration_secs as f64 * 1000.0;
                let left_ms = (total_ms - at.millis_since(started).max(0.0)).max(0.0);
                (left_ms / 1000.0).ceil() as u32
            }
            None => self.duration_secs,
        }
    }

    pub fn expired(&self, at: InstantStamp) -> bool {
        self.started.is_some() && self.remaining_secs(at) == 0
    }
}
