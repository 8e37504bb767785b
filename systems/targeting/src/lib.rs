#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Target selection over registered enemies with a per-tick candidate cache.
//!
//! Enemies opt in by registration; queries rank the registered, currently
//! targetable enemies by how close they are to escaping. The ranked list is
//! built lazily from an [`EnemyView`] on the first query after an
//! invalidation and reused by every query until the next one, so all towers
//! in a tick agree on the same candidate order.

use glam::Vec2;
use lane_defence_core::{EnemyId, EnemyView, TargetSnapshot};

/// Predicate deciding whether a candidate position is inside a tower's
/// reach. Receives the tower origin, the candidate position, and the squared
/// range threshold.
pub type RangePredicate = dyn Fn(Vec2, Vec2, f32) -> bool;

fn within_squared_distance(origin: Vec2, candidate: Vec2, range_squared: f32) -> bool {
    origin.distance_squared(candidate) <= range_squared
}

/// Ranked index of targetable enemies.
pub struct TargetingIndex {
    registered: Vec<EnemyId>,
    cache: Option<Vec<TargetSnapshot>>,
    range_predicate: Option<Box<RangePredicate>>,
}

impl Default for TargetingIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TargetingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TargetingIndex")
            .field("registered", &self.registered.len())
            .field("cached", &self.cache.is_some())
            .field("custom_predicate", &self.range_predicate.is_some())
            .finish()
    }
}

impl TargetingIndex {
    /// Creates an empty index using the squared-distance range check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registered: Vec::new(),
            cache: None,
            range_predicate: None,
        }
    }

    /// Number of registered enemies, targetable or not.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Registers an enemy as a targeting candidate.
    ///
    /// Registering an already-registered enemy is a no-op; registration
    /// order is preserved and acts as the tie-break for equal distances.
    pub fn add_targetable(&mut self, enemy: EnemyId) {
        if !self.registered.contains(&enemy) {
            self.registered.push(enemy);
            self.cache = None;
        }
    }

    /// Unregisters an enemy; unknown ids are a no-op.
    pub fn remove_targetable(&mut self, enemy: EnemyId) {
        let before = self.registered.len();
        self.registered.retain(|candidate| *candidate != enemy);
        if self.registered.len() != before {
            self.cache = None;
        }
    }

    /// Drops the ranked cache so the next query rebuilds it.
    ///
    /// Called once per tick, before any system queries targets.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Replaces the range check used by queries.
    ///
    /// The default check compares squared distances; a custom predicate can
    /// model cones, walls, or minimum ranges without touching the ranking.
    pub fn set_range_predicate<F>(&mut self, predicate: F)
    where
        F: Fn(Vec2, Vec2, f32) -> bool + 'static,
    {
        self.range_predicate = Some(Box::new(predicate));
    }

    /// Restores the squared-distance range check.
    pub fn clear_range_predicate(&mut self) {
        self.range_predicate = None;
    }

    /// Highest-priority candidate within range of the origin, if any.
    ///
    /// Candidates are ranked ascending by remaining distance to the path
    /// destination, so the enemy closest to escaping wins.
    pub fn nearest_in_range(
        &mut self,
        view: &EnemyView,
        origin: Vec2,
        range_squared: f32,
    ) -> Option<TargetSnapshot> {
        self.ensure_cache(view);
        let in_range = |candidate: Vec2| match &self.range_predicate {
            Some(predicate) => predicate(origin, candidate, range_squared),
            None => within_squared_distance(origin, candidate, range_squared),
        };
        self.cache
            .as_ref()
            .and_then(|ranked| {
                ranked
                    .iter()
                    .find(|candidate| in_range(candidate.position))
            })
            .copied()
    }

    /// Collects every candidate within range, in priority order.
    pub fn all_in_range(
        &mut self,
        view: &EnemyView,
        origin: Vec2,
        range_squared: f32,
        out: &mut Vec<TargetSnapshot>,
    ) {
        self.ensure_cache(view);
        let in_range = |candidate: Vec2| match &self.range_predicate {
            Some(predicate) => predicate(origin, candidate, range_squared),
            None => within_squared_distance(origin, candidate, range_squared),
        };
        if let Some(ranked) = &self.cache {
            out.extend(
                ranked
                    .iter()
                    .filter(|candidate| in_range(candidate.position)),
            );
        }
    }

    fn ensure_cache(&mut self, view: &EnemyView) {
        if self.cache.is_some() {
            return;
        }

        let mut ranked: Vec<TargetSnapshot> = self
            .registered
            .iter()
            .filter_map(|enemy| view.get(*enemy))
            .filter(|snapshot| snapshot.targetable)
            .map(|snapshot| TargetSnapshot {
                enemy: snapshot.id,
                position: snapshot.position,
                velocity: snapshot.velocity,
                distance_to_destination: snapshot.distance_to_destination,
            })
            .collect();
        // Stable sort keeps registration order for equal distances.
        ranked.sort_by(|a, b| {
            a.distance_to_destination
                .partial_cmp(&b.distance_to_destination)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        self.cache = Some(ranked);
    }
}
