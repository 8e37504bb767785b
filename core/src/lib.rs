#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the vocabulary that connects the scheduler, the
//! authoritative world, and pure systems. The world mutates state during
//! fixed update phases and broadcasts [`Event`] values for consumers to
//! react to deterministically. Systems read immutable snapshot views and
//! respond with new records such as [`Strike`] batches; they never hold
//! owning references into the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Simulated time expressed in seconds.
pub type Seconds = f32;

/// Nominal frame delta used when no previous clock sample exists.
pub const NOMINAL_DELTA: Seconds = 1.0 / 60.0;

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identity used to key registrations in the update registry and timer
/// service.
///
/// Owners are plain handles, never owning references, so double removal is
/// always a harmless no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(u32);

impl OwnerId {
    /// Creates a new owner identity with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the owner identity.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One of the nine fixed, globally ordered steps executed once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpdatePhase {
    /// Bookkeeping that must precede input handling, such as cache
    /// invalidation.
    PreInput,
    /// Input evaluation.
    Input,
    /// Reactions to freshly evaluated input.
    PostInput,
    /// General per-tick logic, including combat.
    Update,
    /// Preparation for the physics pass.
    PrePhysics,
    /// Motion integration.
    Physics,
    /// Reactions to settled positions, including effect ledgers.
    PostPhysics,
    /// Timer expiry and cooldown accounting.
    Timers,
    /// Final read-only preparation before the host renders.
    PreRender,
}

impl UpdatePhase {
    /// Number of phases in the schedule.
    pub const COUNT: usize = 9;

    /// The fixed global execution order of all phases.
    pub const ORDER: [UpdatePhase; UpdatePhase::COUNT] = [
        UpdatePhase::PreInput,
        UpdatePhase::Input,
        UpdatePhase::PostInput,
        UpdatePhase::Update,
        UpdatePhase::PrePhysics,
        UpdatePhase::Physics,
        UpdatePhase::PostPhysics,
        UpdatePhase::Timers,
        UpdatePhase::PreRender,
    ];

    /// Position of the phase within the fixed execution order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            UpdatePhase::PreInput => 0,
            UpdatePhase::Input => 1,
            UpdatePhase::PostInput => 2,
            UpdatePhase::Update => 3,
            UpdatePhase::PrePhysics => 4,
            UpdatePhase::Physics => 5,
            UpdatePhase::PostPhysics => 6,
            UpdatePhase::Timers => 7,
            UpdatePhase::PreRender => 8,
        }
    }
}

/// Attribute of an enemy that a timed effect mutates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Hit points; damage and burns drain it.
    Health,
    /// Speed reduction; slows raise it, movement floors the result at zero.
    Throttle,
}

/// Application kind of a timed effect, which selects its ledger list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Applied once on the next settle, then discarded.
    OneTime,
    /// Applied at full amount every settle until expiry.
    ForDuration,
    /// Applied pro-rated by elapsed time every settle until expiry.
    OverTime,
}

/// Effect that a tower inflicts on an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Instantaneous damage subtracted from health.
    Damage {
        /// Hit points removed when the effect settles.
        amount: f32,
    },
    /// Speed reduction sustained for a fixed duration.
    Slow {
        /// Units per second subtracted from the enemy's speed.
        amount: f32,
        /// Seconds the reduction persists after application.
        duration: Seconds,
    },
    /// Damage applied continuously over a fixed duration.
    Burn {
        /// Hit points removed per second while the burn is active.
        rate: f32,
        /// Seconds the burn persists after application.
        duration: Seconds,
    },
}

impl Effect {
    /// Attribute the effect mutates when it settles.
    #[must_use]
    pub const fn attribute(self) -> Attribute {
        match self {
            Effect::Damage { .. } | Effect::Burn { .. } => Attribute::Health,
            Effect::Slow { .. } => Attribute::Throttle,
        }
    }

    /// Ledger list the effect belongs to.
    #[must_use]
    pub const fn kind(self) -> EffectKind {
        match self {
            Effect::Damage { .. } => EffectKind::OneTime,
            Effect::Slow { .. } => EffectKind::ForDuration,
            Effect::Burn { .. } => EffectKind::OverTime,
        }
    }
}

/// Types of towers that can be placed along a lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Direct-hit tower dealing one-time damage.
    Cannon,
    /// Chilling tower applying a for-duration slow.
    Frost,
    /// Incendiary tower applying an over-time burn.
    Ember,
}

impl TowerKind {
    /// Returns the tower's targeting range measured in world units.
    #[must_use]
    pub const fn range(self) -> f32 {
        match self {
            TowerKind::Cannon => 120.0,
            TowerKind::Frost => 90.0,
            TowerKind::Ember => 100.0,
        }
    }

    /// Squared targeting range, the form the targeting comparator consumes.
    #[must_use]
    pub const fn range_squared(self) -> f32 {
        self.range() * self.range()
    }

    /// Seconds the tower must wait between strikes.
    #[must_use]
    pub const fn cooldown(self) -> Seconds {
        match self {
            TowerKind::Cannon => 0.8,
            TowerKind::Frost => 1.5,
            TowerKind::Ember => 2.0,
        }
    }

    /// Effect a strike from this tower inflicts.
    #[must_use]
    pub const fn effect(self) -> Effect {
        match self {
            TowerKind::Cannon => Effect::Damage { amount: 25.0 },
            TowerKind::Frost => Effect::Slow {
                amount: 30.0,
                duration: 2.0,
            },
            TowerKind::Ember => Effect::Burn {
                rate: 10.0,
                duration: 3.0,
            },
        }
    }
}

/// Hit-point pair with a one-shot death latch.
///
/// `current` may go negative transiently; the alive-to-dead transition is
/// reported exactly once regardless of how many hits land in the same tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    max: f32,
    current: f32,
    dead: bool,
}

impl Health {
    /// Creates a health pool filled to the provided maximum.
    #[must_use]
    pub const fn new(max: f32) -> Self {
        Self {
            max,
            current: max,
            dead: false,
        }
    }

    /// Maximum hit points of the pool.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Current hit points; may be negative after a lethal hit.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Remaining health as a fraction of the maximum.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.current / self.max
    }

    /// Reports whether the death latch has not yet fired.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.dead
    }

    /// Subtracts the provided amount and returns `true` exactly once, on the
    /// hit that crosses zero.
    pub fn damage(&mut self, amount: f32) -> bool {
        self.current -= amount;
        if self.current <= 0.0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }
}

/// Request that a tower's effect be applied to an enemy.
///
/// Produced by the combat system, executed by the world. The aim point leads
/// the target by its estimated motion and exists for presentation consumers;
/// effect application itself is by identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strike {
    /// Tower delivering the effect.
    pub tower: TowerId,
    /// Enemy receiving the effect.
    pub enemy: EnemyId,
    /// Effect to apply.
    pub effect: Effect,
    /// Estimated position of the enemy at impact time.
    pub aim: Vec2,
}

/// Events broadcast by the world after each phase pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Confirms that an enemy entered the simulation.
    EnemySpawned {
        /// Identifier assigned to the newly spawned enemy.
        enemy: EnemyId,
    },
    /// Reports that an enemy's health crossed zero.
    EnemyDied {
        /// Enemy whose death latch fired.
        enemy: EnemyId,
        /// Tower whose hit crossed the threshold.
        source: TowerId,
    },
    /// Reports that an enemy reached the end of its path and escaped.
    EnemyReachedEnd {
        /// Enemy that escaped.
        enemy: EnemyId,
    },
    /// Reports that an effect kind's active set became non-empty.
    EffectStarted {
        /// Enemy the effect is acting on.
        enemy: EnemyId,
        /// Kind whose active set transitioned.
        kind: EffectKind,
    },
    /// Reports that an effect kind's active set became empty.
    EffectEnded {
        /// Enemy the effect was acting on.
        enemy: EnemyId,
        /// Kind whose active set transitioned.
        kind: EffectKind,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower that was placed.
        kind: TowerKind,
    },
    /// Confirms that a tower delivered a strike.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was struck.
        enemy: EnemyId,
    },
}

/// Snapshot of a single targetable candidate, ordered by its distance to the
/// path destination (closest to escaping first).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetSnapshot {
    /// Enemy the snapshot was captured from.
    pub enemy: EnemyId,
    /// Position at capture time.
    pub position: Vec2,
    /// Velocity at capture time, used for look-ahead aiming.
    pub velocity: Vec2,
    /// Remaining path length to the destination.
    pub distance_to_destination: f32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// World position of the enemy.
    pub position: Vec2,
    /// Current velocity of the enemy.
    pub velocity: Vec2,
    /// Remaining path length to the destination, zero for free movers.
    pub distance_to_destination: f32,
    /// Whether the enemy is eligible for target selection.
    pub targetable: bool,
    /// Health pool of the enemy.
    pub health: Health,
}

/// Read-only snapshot describing all enemies in the simulation.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided enemy, if any.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was placed.
    pub kind: TowerKind,
    /// World position of the tower.
    pub position: Vec2,
    /// Seconds until the tower may strike again; zero means ready.
    pub ready_in: Seconds,
}

/// Read-only snapshot describing all towers in the simulation.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn enemy_id_round_trips_through_bincode() {
        assert_round_trip(&EnemyId::new(7));
    }

    #[test]
    fn effect_variants_round_trip_through_bincode() {
        assert_round_trip(&Effect::Damage { amount: 25.0 });
        assert_round_trip(&Effect::Slow {
            amount: 8.0,
            duration: 2.0,
        });
        assert_round_trip(&Effect::Burn {
            rate: 10.0,
            duration: 3.0,
        });
    }

    #[test]
    fn event_round_trips_through_bincode() {
        assert_round_trip(&Event::EnemyDied {
            enemy: EnemyId::new(3),
            source: TowerId::new(9),
        });
        assert_round_trip(&Event::EffectStarted {
            enemy: EnemyId::new(3),
            kind: EffectKind::OverTime,
        });
    }

    #[test]
    fn phase_order_is_total_and_stable() {
        assert_eq!(UpdatePhase::ORDER.len(), UpdatePhase::COUNT);
        for (expected, phase) in UpdatePhase::ORDER.iter().enumerate() {
            assert_eq!(phase.index(), expected);
        }
        assert_eq!(UpdatePhase::ORDER[0], UpdatePhase::PreInput);
        assert_eq!(UpdatePhase::ORDER[8], UpdatePhase::PreRender);
    }

    #[test]
    fn effects_map_to_their_attribute_and_kind() {
        assert_eq!(
            Effect::Damage { amount: 1.0 }.attribute(),
            Attribute::Health
        );
        assert_eq!(
            Effect::Slow {
                amount: 1.0,
                duration: 1.0
            }
            .attribute(),
            Attribute::Throttle
        );
        assert_eq!(
            Effect::Burn {
                rate: 1.0,
                duration: 1.0
            }
            .kind(),
            EffectKind::OverTime
        );
    }

    #[test]
    fn health_reports_death_exactly_once() {
        let mut health = Health::new(100.0);
        assert!(!health.damage(60.0));
        assert!(health.damage(90.0));
        assert!(health.current() < 0.0);
        assert!(!health.damage(10.0), "death latch must fire only once");
        assert!(!health.is_alive());
    }

    #[test]
    fn negative_health_is_preserved_for_overkill() {
        let mut health = Health::new(100.0);
        assert!(health.damage(150.0));
        assert!((health.current() - -50.0).abs() < f32::EPSILON);
    }

    #[test]
    fn enemy_view_sorts_and_finds_by_id() {
        let snapshot = |id: u32| EnemySnapshot {
            id: EnemyId::new(id),
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            distance_to_destination: 0.0,
            targetable: true,
            health: Health::new(1.0),
        };
        let view = EnemyView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(view.get(EnemyId::new(2)).is_some());
        assert!(view.get(EnemyId::new(3)).is_none());
    }

    #[test]
    fn tower_tuning_is_internally_consistent() {
        for kind in [TowerKind::Cannon, TowerKind::Frost, TowerKind::Ember] {
            assert!(kind.range() > 0.0);
            assert!(kind.cooldown() > 0.0);
            assert!((kind.range_squared() - kind.range() * kind.range()).abs() < f32::EPSILON);
            assert_eq!(kind.effect().kind(), expected_kind(kind));
        }
    }

    fn expected_kind(kind: TowerKind) -> EffectKind {
        match kind {
            TowerKind::Cannon => EffectKind::OneTime,
            TowerKind::Frost => EffectKind::ForDuration,
            TowerKind::Ember => EffectKind::OverTime,
        }
    }
}
