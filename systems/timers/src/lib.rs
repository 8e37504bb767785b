#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Simulation-time timers.
//!
//! Timers advance on simulated seconds, so they respect the clock's speed
//! multiplier and clamping. Intervals re-arm from their due instant rather
//! than from the tick that observed them, which keeps their long-run rate
//! independent of tick granularity.

use lane_defence_core::{OwnerId, Seconds};

/// Expiry behaviour of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimerKind {
    /// Fires once after the delay, then disappears.
    Timeout(Seconds),
    /// Fires repeatedly, once per period, until cancelled.
    Interval(Seconds),
}

/// Notification that a timer came due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFired {
    /// Owner that scheduled the timer.
    pub owner: OwnerId,
    /// Caller-chosen tag distinguishing an owner's timers.
    pub tag: u32,
}

#[derive(Clone, Copy, Debug)]
struct TimerEntry {
    owner: OwnerId,
    tag: u32,
    kind: TimerKind,
    due: Seconds,
}

/// Scheduler of simulation-time timeouts and intervals.
#[derive(Debug, Default)]
pub struct TimerSystem {
    elapsed: Seconds,
    entries: Vec<TimerEntry>,
    scratch: Vec<TimerEntry>,
}

impl TimerSystem {
    /// Creates an empty timer system at simulation time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total simulated seconds accumulated so far.
    #[must_use]
    pub fn current_time(&self) -> Seconds {
        self.elapsed
    }

    /// Number of timers currently pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.entries.len()
    }

    /// Schedules a timer for the provided owner.
    ///
    /// An owner may hold many timers; the tag tells their firings apart.
    pub fn schedule(&mut self, owner: OwnerId, tag: u32, kind: TimerKind) {
        let delay = match kind {
            TimerKind::Timeout(delay) | TimerKind::Interval(delay) => delay,
        };
        self.entries.push(TimerEntry {
            owner,
            tag,
            kind,
            due: self.elapsed + delay.max(0.0),
        });
    }

    /// Cancels every timer held by the provided owner; unknown owners are a
    /// no-op.
    pub fn cancel(&mut self, owner: OwnerId) {
        self.entries.retain(|entry| entry.owner != owner);
    }

    /// Advances simulated time and collects timers that came due.
    ///
    /// Due timers fire in scheduling order. A timeout fires once and is
    /// dropped; an interval fires and re-arms from its due instant, so a
    /// large tick fires it at most once but never lets it drift.
    pub fn advance(&mut self, dt: Seconds, out: &mut Vec<TimerFired>) {
        self.elapsed += dt.max(0.0);

        self.scratch.clear();
        std::mem::swap(&mut self.entries, &mut self.scratch);
        for mut entry in self.scratch.drain(..) {
            if entry.due > self.elapsed {
                self.entries.push(entry);
                continue;
            }

            out.push(TimerFired {
                owner: entry.owner,
                tag: entry.tag,
            });
            if let TimerKind::Interval(period) = entry.kind {
                entry.due += period.max(f32::EPSILON);
                self.entries.push(entry);
            }
        }
    }
}
