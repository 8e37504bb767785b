#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-phase update scheduling for the Lane Defence engine.
//!
//! The [`Clock`] converts caller-supplied wall time into clamped frame
//! deltas. The [`UpdateRegistry`] holds per-phase ordered callback lists and
//! invokes them in registration order. Callbacks receive a mutable context
//! but never the registry itself, so a running phase observes a fixed
//! snapshot of its registrants; mutations requested from inside a pass go
//! through an [`UpdateQueue`] and become visible when the driver applies the
//! queue between phases.

use std::fmt;
use std::time::Duration;

use lane_defence_core::{OwnerId, Seconds, UpdatePhase, NOMINAL_DELTA};

/// Default upper bound on a single frame delta, in seconds.
///
/// Long host stalls are absorbed instead of propagated into the simulation.
pub const DEFAULT_MAX_DELTA: Seconds = 1.0 / 15.0;

/// Tracks wall time and produces clamped per-frame deltas.
#[derive(Clone, Debug)]
pub struct Clock {
    last_sample: Option<Duration>,
    max_delta: Seconds,
    speed: f32,
}

impl Clock {
    /// Creates a clock with the default delta clamp and unit speed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_sample: None,
            max_delta: DEFAULT_MAX_DELTA,
            speed: 1.0,
        }
    }

    /// Current speed multiplier applied to every delta.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Sets the speed multiplier; negative values clamp to zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    /// Upper bound applied to the measured delta before the speed multiplier.
    #[must_use]
    pub const fn max_delta(&self) -> Seconds {
        self.max_delta
    }

    /// Sets the delta clamp; negative values clamp to zero.
    pub fn set_max_delta(&mut self, max_delta: Seconds) {
        self.max_delta = max_delta.max(0.0);
    }

    /// Samples the monotonic wall clock and returns the frame delta.
    ///
    /// The first sample has no predecessor and yields the nominal delta.
    /// Wall time running backward saturates to a zero delta rather than
    /// producing a negative one.
    pub fn advance(&mut self, now: Duration) -> Seconds {
        let measured = match self.last_sample {
            None => NOMINAL_DELTA,
            Some(last) => now.saturating_sub(last).as_secs_f32(),
        };
        self.last_sample = Some(now);
        measured.min(self.max_delta) * self.speed
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

type Callback<C> = Box<dyn FnMut(&mut C, Seconds)>;

struct Registrant<C> {
    owner: OwnerId,
    callback: Callback<C>,
}

/// Per-phase ordered lists of update callbacks keyed by owner identity.
pub struct UpdateRegistry<C> {
    phases: [Vec<Registrant<C>>; UpdatePhase::COUNT],
}

impl<C> UpdateRegistry<C> {
    /// Creates a registry with every phase empty.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phases: std::array::from_fn(|_| Vec::new()),
        }
    }

    /// Appends a callback for the provided phase and owner.
    ///
    /// Callbacks registered for the same phase run in registration order.
    pub fn register<F>(&mut self, phase: UpdatePhase, owner: OwnerId, callback: F)
    where
        F: FnMut(&mut C, Seconds) + 'static,
    {
        self.phases[phase.index()].push(Registrant {
            owner,
            callback: Box::new(callback),
        });
    }

    /// Removes every callback the owner registered for the phase.
    ///
    /// Unregistering an owner without registrations is a silent no-op.
    pub fn unregister(&mut self, phase: UpdatePhase, owner: OwnerId) {
        self.phases[phase.index()].retain(|registrant| registrant.owner != owner);
    }

    /// Removes every callback the owner registered, across all phases.
    pub fn unregister_owner(&mut self, owner: OwnerId) {
        for phase in &mut self.phases {
            phase.retain(|registrant| registrant.owner != owner);
        }
    }

    /// Invokes the phase's callbacks in registration order.
    ///
    /// The registrant list cannot change while the pass runs; requests made
    /// from inside callbacks arrive through an [`UpdateQueue`] and take
    /// effect once [`UpdateRegistry::apply_queued`] drains it.
    pub fn run_phase(&mut self, phase: UpdatePhase, ctx: &mut C, dt: Seconds) {
        for registrant in &mut self.phases[phase.index()] {
            (registrant.callback)(ctx, dt);
        }
    }

    /// Drains queued registration requests into the registry.
    pub fn apply_queued(&mut self, queue: &mut UpdateQueue<C>) {
        for op in queue.ops.drain(..) {
            match op {
                QueuedOp::Register {
                    phase,
                    owner,
                    callback,
                } => self.phases[phase.index()].push(Registrant { owner, callback }),
                QueuedOp::Unregister { phase, owner } => {
                    self.phases[phase.index()].retain(|registrant| registrant.owner != owner);
                }
                QueuedOp::UnregisterOwner { owner } => {
                    for phase in &mut self.phases {
                        phase.retain(|registrant| registrant.owner != owner);
                    }
                }
            }
        }
    }

    /// Number of callbacks registered for the provided phase.
    #[must_use]
    pub fn len(&self, phase: UpdatePhase) -> usize {
        self.phases[phase.index()].len()
    }

    /// Total number of callbacks registered across all phases.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Reports whether no callbacks are registered anywhere.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}

impl<C> Default for UpdateRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for UpdateRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for phase in UpdatePhase::ORDER {
            let _ = map.entry(&phase, &self.len(phase));
        }
        map.finish()
    }
}

enum QueuedOp<C> {
    Register {
        phase: UpdatePhase,
        owner: OwnerId,
        callback: Callback<C>,
    },
    Unregister {
        phase: UpdatePhase,
        owner: OwnerId,
    },
    UnregisterOwner {
        owner: OwnerId,
    },
}

/// Registration requests deferred until the current phase pass completes.
pub struct UpdateQueue<C> {
    ops: Vec<QueuedOp<C>>,
}

impl<C> UpdateQueue<C> {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Queues a registration for the provided phase and owner.
    pub fn register<F>(&mut self, phase: UpdatePhase, owner: OwnerId, callback: F)
    where
        F: FnMut(&mut C, Seconds) + 'static,
    {
        self.ops.push(QueuedOp::Register {
            phase,
            owner,
            callback: Box::new(callback),
        });
    }

    /// Queues removal of the owner's callbacks for the provided phase.
    pub fn unregister(&mut self, phase: UpdatePhase, owner: OwnerId) {
        self.ops.push(QueuedOp::Unregister { phase, owner });
    }

    /// Queues removal of the owner's callbacks across all phases.
    pub fn unregister_owner(&mut self, owner: OwnerId) {
        self.ops.push(QueuedOp::UnregisterOwner { owner });
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Reports whether no requests are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl<C> Default for UpdateQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for UpdateQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("len", &self.ops.len())
            .finish()
    }
}
