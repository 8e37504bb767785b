#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the Lane Defence engine.
//!
//! The world owns every enemy and tower and is the only place their state
//! mutates. Mutation happens in dedicated passes driven by the update
//! schedule: strikes land in the update phase, motion integrates in the
//! physics phase, effect ledgers settle right after, cooldowns tick with the
//! timers. Each pass appends [`Event`] values describing what changed;
//! consumers never observe intermediate state.

mod effects;
mod motion;
mod path;

pub use effects::{EffectLedger, EffectTransition, Hit};
pub use motion::{BallisticMotion, LinearMotion, Motion, MotionOutcome, PathMotion};
pub use path::{Path, PathCursor, PathSegment};

use glam::Vec2;
use lane_defence_core::{
    EnemyId, EnemySnapshot, EnemyView, Event, Health, Seconds, Strike, TowerId, TowerKind,
    TowerSnapshot, TowerView,
};

/// Enemy walking the lane.
#[derive(Debug)]
struct Enemy {
    id: EnemyId,
    position: Vec2,
    health: Health,
    motion: Motion,
    ledger: EffectLedger,
}

/// Placed tower with its cooldown state.
#[derive(Debug)]
struct Tower {
    id: TowerId,
    kind: TowerKind,
    position: Vec2,
    ready_in: Seconds,
}

/// Authoritative container of all simulation state.
#[derive(Debug, Default)]
pub struct World {
    enemies: Vec<Enemy>,
    towers: Vec<Tower>,
    next_enemy: u32,
    next_tower: u32,
    hit_scratch: Vec<Hit>,
    transition_scratch: Vec<EffectTransition>,
    escaped_scratch: Vec<EnemyId>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enemies currently alive in the world.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    /// Number of towers placed in the world.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Reports whether the provided enemy still exists.
    #[must_use]
    pub fn contains_enemy(&self, enemy: EnemyId) -> bool {
        self.enemies.iter().any(|candidate| candidate.id == enemy)
    }

    /// Spawns an enemy with the provided motion strategy and full health.
    ///
    /// Identifiers are allocated monotonically and never reused.
    pub fn spawn_enemy(
        &mut self,
        position: Vec2,
        max_health: f32,
        motion: Motion,
        out_events: &mut Vec<Event>,
    ) -> EnemyId {
        let id = EnemyId::new(self.next_enemy);
        self.next_enemy += 1;
        self.enemies.push(Enemy {
            id,
            position,
            health: Health::new(max_health),
            motion,
            ledger: EffectLedger::new(),
        });
        out_events.push(Event::EnemySpawned { enemy: id });
        id
    }

    /// Removes the provided enemy; removing an unknown id is a no-op.
    pub fn remove_enemy(&mut self, enemy: EnemyId) {
        self.enemies.retain(|candidate| candidate.id != enemy);
    }

    /// Places a tower of the provided kind at a fixed position.
    ///
    /// New towers start ready to fire.
    pub fn spawn_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> TowerId {
        let id = TowerId::new(self.next_tower);
        self.next_tower += 1;
        self.towers.push(Tower {
            id,
            kind,
            position,
            ready_in: 0.0,
        });
        out_events.push(Event::TowerPlaced { tower: id, kind });
        id
    }

    /// Records an effect against an enemy's ledger.
    ///
    /// Effects aimed at a missing or already-dead enemy are silently
    /// dropped; strikes resolve against snapshots and may arrive stale.
    pub fn apply_effect(
        &mut self,
        enemy: EnemyId,
        effect: lane_defence_core::Effect,
        source: TowerId,
        now: Seconds,
    ) {
        if let Some(target) = self
            .enemies
            .iter_mut()
            .find(|candidate| candidate.id == enemy)
        {
            if target.health.is_alive() {
                target.ledger.apply(effect, source, now);
            }
        }
    }

    /// Executes a batch of strikes produced by the combat system.
    ///
    /// Each strike resets its tower's cooldown and books the effect into the
    /// target's ledger. Strikes whose target no longer exists are discarded
    /// without firing the tower.
    pub fn apply_strikes(&mut self, strikes: &[Strike], now: Seconds, out_events: &mut Vec<Event>) {
        for strike in strikes {
            let alive = self
                .enemies
                .iter()
                .any(|candidate| candidate.id == strike.enemy && candidate.health.is_alive());
            if !alive {
                continue;
            }

            if let Some(tower) = self
                .towers
                .iter_mut()
                .find(|candidate| candidate.id == strike.tower)
            {
                tower.ready_in = tower.kind.cooldown();
            }
            self.apply_effect(strike.enemy, strike.effect, strike.tower, now);
            out_events.push(Event::TowerFired {
                tower: strike.tower,
                enemy: strike.enemy,
            });
        }
    }

    /// Integrates every enemy's motion by one physics step.
    ///
    /// Enemies whose path cursor becomes terminal report
    /// [`Event::EnemyReachedEnd`] exactly once and are despawned after the
    /// pass.
    pub fn simulate_physics(&mut self, dt: Seconds, out_events: &mut Vec<Event>) {
        self.escaped_scratch.clear();
        for enemy in &mut self.enemies {
            let outcome = enemy.motion.integrate(&mut enemy.position, dt);
            if outcome.reached_end {
                out_events.push(Event::EnemyReachedEnd { enemy: enemy.id });
                self.escaped_scratch.push(enemy.id);
            }
        }
        if !self.escaped_scratch.is_empty() {
            let escaped = std::mem::take(&mut self.escaped_scratch);
            self.enemies
                .retain(|candidate| !escaped.contains(&candidate.id));
            self.escaped_scratch = escaped;
        }
    }

    /// Settles every enemy's effect ledger for one tick.
    ///
    /// Throttle sums feed back into motion, damage hits land in ledger
    /// order, and the hit that crosses zero attributes the death to its
    /// source tower. Dead enemies are despawned after the whole pass so a
    /// single tick never observes a partially removed set.
    pub fn settle_effects(&mut self, dt: Seconds, now: Seconds, out_events: &mut Vec<Event>) {
        for enemy in &mut self.enemies {
            self.hit_scratch.clear();
            self.transition_scratch.clear();

            let throttle = enemy.ledger.settle(
                dt,
                now,
                enemy.health.is_alive(),
                &mut self.hit_scratch,
                &mut self.transition_scratch,
            );
            enemy.motion.set_throttle(throttle);

            for hit in &self.hit_scratch {
                if enemy.health.damage(hit.amount) {
                    out_events.push(Event::EnemyDied {
                        enemy: enemy.id,
                        source: hit.source,
                    });
                }
            }
            for transition in &self.transition_scratch {
                out_events.push(if transition.active {
                    Event::EffectStarted {
                        enemy: enemy.id,
                        kind: transition.kind,
                    }
                } else {
                    Event::EffectEnded {
                        enemy: enemy.id,
                        kind: transition.kind,
                    }
                });
            }
        }
        self.enemies.retain(|candidate| candidate.health.is_alive());
    }

    /// Advances every tower's cooldown toward readiness.
    pub fn tick_cooldowns(&mut self, dt: Seconds) {
        for tower in &mut self.towers {
            tower.ready_in = (tower.ready_in - dt).max(0.0);
        }
    }
}

/// Read-only queries over the world, exposed as immutable snapshot views.
pub mod query {
    use super::{EnemySnapshot, EnemyView, TowerSnapshot, TowerView, World};

    /// Captures a snapshot view of every enemy.
    ///
    /// Enemies are targetable while their death latch has not fired.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                velocity: enemy.motion.velocity(),
                distance_to_destination: enemy.motion.distance_to_destination(),
                targetable: enemy.health.is_alive(),
                health: enemy.health,
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a snapshot view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                kind: tower.kind,
                position: tower.position,
                ready_in: tower.ready_in,
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{Effect, EffectKind};

    fn lane() -> Path {
        Path::from_waypoints(&[Vec2::ZERO, Vec2::new(10.0, 0.0)])
    }

    fn walker(speed: f32) -> Motion {
        Motion::AlongPath(PathMotion::new(lane(), Vec2::ZERO, speed))
    }

    #[test]
    fn spawn_allocates_monotonic_ids_and_reports_it() {
        let mut world = World::new();
        let mut events = Vec::new();

        let first = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);
        let second = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);

        assert!(second > first);
        assert_eq!(world.enemy_count(), 2);
        assert_eq!(
            events,
            vec![
                Event::EnemySpawned { enemy: first },
                Event::EnemySpawned { enemy: second },
            ]
        );
    }

    #[test]
    fn removing_an_unknown_enemy_is_a_no_op() {
        let mut world = World::new();
        let mut events = Vec::new();
        let id = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);

        world.remove_enemy(id);
        world.remove_enemy(id);
        world.remove_enemy(EnemyId::new(999));

        assert_eq!(world.enemy_count(), 0);
    }

    #[test]
    fn overkill_damage_reports_one_death_and_preserves_negative_health() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);
        let source = TowerId::new(0);

        world.apply_effect(enemy, Effect::Damage { amount: 75.0 }, source, 0.0);
        world.apply_effect(enemy, Effect::Damage { amount: 75.0 }, source, 0.0);

        events.clear();
        world.settle_effects(1.0 / 60.0, 0.0, &mut events);

        let deaths: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDied { .. }))
            .collect();
        assert_eq!(deaths.len(), 1);
        assert_eq!(deaths[0], &Event::EnemyDied { enemy, source });
        assert_eq!(world.enemy_count(), 0, "dead enemies despawn after the pass");
    }

    #[test]
    fn death_is_attributed_to_the_hit_that_crosses_zero() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);
        let opener = TowerId::new(1);
        let finisher = TowerId::new(2);

        world.apply_effect(enemy, Effect::Damage { amount: 60.0 }, opener, 0.0);
        world.apply_effect(enemy, Effect::Damage { amount: 60.0 }, finisher, 0.0);

        events.clear();
        world.settle_effects(1.0 / 60.0, 0.0, &mut events);

        assert!(events.contains(&Event::EnemyDied {
            enemy,
            source: finisher
        }));
    }

    #[test]
    fn slow_feeds_back_into_motion_throttle() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(10.0), &mut events);
        world.apply_effect(
            enemy,
            Effect::Slow {
                amount: 4.0,
                duration: 5.0,
            },
            TowerId::new(0),
            0.0,
        );

        world.settle_effects(1.0 / 60.0, 0.0, &mut events);
        world.simulate_physics(1.0, &mut events);

        let view = query::enemy_view(&world);
        let snapshot = view.get(enemy).expect("enemy");
        assert!((snapshot.position.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn expired_slow_restores_speed_and_notifies_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(10.0), &mut events);
        world.apply_effect(
            enemy,
            Effect::Slow {
                amount: 4.0,
                duration: 0.5,
            },
            TowerId::new(0),
            0.0,
        );

        events.clear();
        world.settle_effects(0.25, 0.25, &mut events);
        assert_eq!(
            events,
            vec![Event::EffectStarted {
                enemy,
                kind: EffectKind::ForDuration
            }]
        );

        events.clear();
        world.settle_effects(0.25, 0.5, &mut events);
        assert_eq!(
            events,
            vec![Event::EffectEnded {
                enemy,
                kind: EffectKind::ForDuration
            }]
        );

        events.clear();
        world.settle_effects(0.25, 0.75, &mut events);
        assert!(events.is_empty(), "no repeated end notification");

        // Half a second of travel keeps the walker on its 10-unit lane.
        world.simulate_physics(0.5, &mut events);
        let view = query::enemy_view(&world);
        assert_eq!(
            view.get(enemy).expect("enemy").velocity,
            Vec2::new(10.0, 0.0),
            "full speed restored after expiry"
        );
    }

    #[test]
    fn escaping_enemy_reports_reached_end_once_and_despawns() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(6.0), &mut events);

        events.clear();
        world.simulate_physics(1.0, &mut events);
        assert!(events.is_empty());

        world.simulate_physics(1.0, &mut events);
        assert_eq!(events, vec![Event::EnemyReachedEnd { enemy }]);
        assert_eq!(world.enemy_count(), 0);

        events.clear();
        world.simulate_physics(1.0, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn strikes_reset_cooldowns_and_report_firing() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);
        let tower = world.spawn_tower(TowerKind::Cannon, Vec2::new(0.0, 5.0), &mut events);

        events.clear();
        world.apply_strikes(
            &[Strike {
                tower,
                enemy,
                effect: TowerKind::Cannon.effect(),
                aim: Vec2::ZERO,
            }],
            0.0,
            &mut events,
        );

        assert_eq!(events, vec![Event::TowerFired { tower, enemy }]);
        let view = query::tower_view(&world);
        let snapshot = view.iter().next().expect("tower");
        assert!((snapshot.ready_in - TowerKind::Cannon.cooldown()).abs() < f32::EPSILON);

        world.tick_cooldowns(0.5);
        let view = query::tower_view(&world);
        assert!((view.iter().next().expect("tower").ready_in - 0.3).abs() < 1e-5);
    }

    #[test]
    fn strikes_against_despawned_enemies_are_discarded() {
        let mut world = World::new();
        let mut events = Vec::new();
        let enemy = world.spawn_enemy(Vec2::ZERO, 100.0, walker(1.0), &mut events);
        let tower = world.spawn_tower(TowerKind::Cannon, Vec2::ZERO, &mut events);
        world.remove_enemy(enemy);

        events.clear();
        world.apply_strikes(
            &[Strike {
                tower,
                enemy,
                effect: TowerKind::Cannon.effect(),
                aim: Vec2::ZERO,
            }],
            0.0,
            &mut events,
        );

        assert!(events.is_empty());
        let view = query::tower_view(&world);
        assert_eq!(view.iter().next().expect("tower").ready_in, 0.0);
    }

    #[test]
    fn enemy_view_reflects_motion_and_destination_distance() {
        let mut world = World::new();
        let mut events = Vec::new();
        let near = world.spawn_enemy(Vec2::ZERO, 50.0, walker(2.0), &mut events);
        let far = world.spawn_enemy(Vec2::ZERO, 50.0, walker(1.0), &mut events);

        world.simulate_physics(1.0, &mut events);

        let view = query::enemy_view(&world);
        let near_snapshot = view.get(near).expect("near");
        let far_snapshot = view.get(far).expect("far");
        assert!((near_snapshot.distance_to_destination - 8.0).abs() < 1e-4);
        assert!((far_snapshot.distance_to_destination - 9.0).abs() < 1e-4);
        assert_eq!(near_snapshot.velocity, Vec2::new(2.0, 0.0));
        assert!(near_snapshot.targetable);
    }
}
