//! Per-enemy ledgers of active timed effects.
//!
//! A ledger keeps three ordered lists, one per application kind. One-time
//! entries apply on the next settle and vanish; for-duration entries apply
//! their full amount every settle until expiry; over-time entries apply
//! pro-rated by elapsed time. Timed kinds never stack per source: a second
//! application from the same source replaces the first and restarts its
//! expiry clock.

use lane_defence_core::{Attribute, Effect, EffectKind, Seconds, TowerId};

/// Damage application extracted from a settle pass, in application order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// Hit points to subtract.
    pub amount: f32,
    /// Tower the damage is attributed to.
    pub source: TowerId,
}

/// Boundary transition of one effect kind's active set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectTransition {
    /// Kind whose active set changed.
    pub kind: EffectKind,
    /// `true` for empty to non-empty, `false` for non-empty to empty.
    pub active: bool,
}

#[derive(Clone, Copy, Debug)]
struct OneTimeEntry {
    amount: f32,
    source: TowerId,
}

#[derive(Clone, Copy, Debug)]
struct TimedEntry {
    attribute: Attribute,
    amount: f32,
    source: TowerId,
    expires_at: Seconds,
}

impl TimedEntry {
    fn is_expired(&self, now: Seconds) -> bool {
        now >= self.expires_at
    }
}

/// Ledger of active timed effects attached to one enemy.
#[derive(Clone, Debug, Default)]
pub struct EffectLedger {
    one_time: Vec<OneTimeEntry>,
    for_duration: Vec<TimedEntry>,
    over_time: Vec<TimedEntry>,
    duration_active: bool,
    over_time_active: bool,
}

impl EffectLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held for the provided kind.
    #[must_use]
    pub fn len(&self, kind: EffectKind) -> usize {
        match kind {
            EffectKind::OneTime => self.one_time.len(),
            EffectKind::ForDuration => self.for_duration.len(),
            EffectKind::OverTime => self.over_time.len(),
        }
    }

    /// Reports whether no entries of any kind are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.one_time.is_empty() && self.for_duration.is_empty() && self.over_time.is_empty()
    }

    /// Records an effect from the provided source.
    ///
    /// One-time effects append unconditionally; multiple simultaneous hits
    /// from different sources all land. Timed effects replace any existing
    /// entry with the same attribute and source, restarting the expiry.
    pub fn apply(&mut self, effect: Effect, source: TowerId, now: Seconds) {
        match effect {
            Effect::Damage { amount } => self.one_time.push(OneTimeEntry { amount, source }),
            Effect::Slow { amount, duration } => {
                replace_by_source(&mut self.for_duration, Attribute::Throttle, source);
                self.for_duration.push(TimedEntry {
                    attribute: Attribute::Throttle,
                    amount,
                    source,
                    expires_at: now + duration,
                });
            }
            Effect::Burn { rate, duration } => {
                replace_by_source(&mut self.over_time, Attribute::Health, source);
                self.over_time.push(TimedEntry {
                    attribute: Attribute::Health,
                    amount: rate,
                    source,
                    expires_at: now + duration,
                });
            }
        }
    }

    /// Settles the ledger for one tick and returns the throttle to apply.
    ///
    /// Damage applications are pushed into `hits` in deterministic order:
    /// one-time entries first, then for-duration, then over-time pro-rated
    /// by `min(time remaining, dt)`. Expired timed entries are dropped
    /// after applying. Boundary transitions of the timed kinds are pushed
    /// into `transitions`; a non-affectable enemy clears everything
    /// immediately.
    pub fn settle(
        &mut self,
        dt: Seconds,
        now: Seconds,
        affectable: bool,
        hits: &mut Vec<Hit>,
        transitions: &mut Vec<EffectTransition>,
    ) -> f32 {
        if !affectable {
            self.clear(transitions);
            return 0.0;
        }

        let mut throttle = 0.0;

        for entry in self.one_time.drain(..) {
            hits.push(Hit {
                amount: entry.amount,
                source: entry.source,
            });
        }

        for entry in &self.for_duration {
            match entry.attribute {
                Attribute::Throttle => throttle += entry.amount,
                Attribute::Health => hits.push(Hit {
                    amount: entry.amount,
                    source: entry.source,
                }),
            }
        }
        self.for_duration.retain(|entry| !entry.is_expired(now));

        for entry in &self.over_time {
            let remaining = (entry.expires_at - now).max(0.0);
            let span = remaining.min(dt);
            if span <= 0.0 {
                continue;
            }
            let amount = span * entry.amount;
            match entry.attribute {
                Attribute::Health => hits.push(Hit {
                    amount,
                    source: entry.source,
                }),
                Attribute::Throttle => throttle += amount,
            }
        }
        self.over_time.retain(|entry| !entry.is_expired(now));

        self.note_transition(
            EffectKind::ForDuration,
            !self.for_duration.is_empty(),
            transitions,
        );
        self.note_transition(
            EffectKind::OverTime,
            !self.over_time.is_empty(),
            transitions,
        );

        throttle
    }

    /// Drops every entry, emitting end transitions for active timed kinds.
    pub fn clear(&mut self, transitions: &mut Vec<EffectTransition>) {
        self.one_time.clear();
        self.for_duration.clear();
        self.over_time.clear();
        self.note_transition(EffectKind::ForDuration, false, transitions);
        self.note_transition(EffectKind::OverTime, false, transitions);
    }

    fn note_transition(
        &mut self,
        kind: EffectKind,
        active: bool,
        transitions: &mut Vec<EffectTransition>,
    ) {
        let flag = match kind {
            EffectKind::ForDuration => &mut self.duration_active,
            EffectKind::OverTime => &mut self.over_time_active,
            EffectKind::OneTime => return,
        };
        if *flag != active {
            *flag = active;
            transitions.push(EffectTransition { kind, active });
        }
    }
}

fn replace_by_source(entries: &mut Vec<TimedEntry>, attribute: Attribute, source: TowerId) {
    entries.retain(|entry| entry.source != source || entry.attribute != attribute);
}
