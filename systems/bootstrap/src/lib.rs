#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Assembles the engine into a runnable simulation session.
//!
//! A [`Session`] owns the clock, the update registry, and a [`SimContext`]
//! holding the world and every system. Construction wires the built-in
//! passes to their phases; each [`Session::tick`] samples the clock once and
//! drives all nine phases in order, draining events and timer firings to the
//! caller afterwards.

use std::time::Duration;

use glam::Vec2;
use lane_defence_core::{
    EnemyId, Event, OwnerId, Seconds, TowerId, TowerKind, UpdatePhase,
};
use lane_defence_scheduler::{Clock, UpdateQueue, UpdateRegistry};
use lane_defence_system_combat::TowerCombat;
use lane_defence_system_targeting::TargetingIndex;
use lane_defence_system_timers::{TimerFired, TimerKind, TimerSystem};
use lane_defence_world::{query, Motion, Path, PathMotion, World};

const OWNER_TARGETING: OwnerId = OwnerId::new(u32::MAX - 1);
const OWNER_COMBAT: OwnerId = OwnerId::new(u32::MAX - 2);
const OWNER_PHYSICS: OwnerId = OwnerId::new(u32::MAX - 3);
const OWNER_EFFECTS: OwnerId = OwnerId::new(u32::MAX - 4);
const OWNER_TIMERS: OwnerId = OwnerId::new(u32::MAX - 5);

/// Mutable state every update callback receives.
///
/// Fields are public so custom callbacks registered by hosts can reach the
/// world and systems; the registry itself is not in here, so callbacks defer
/// registration changes through [`SimContext::queue`].
pub struct SimContext {
    /// Authoritative simulation state.
    pub world: World,
    /// Ranked target index, invalidated at the start of every tick.
    pub targeting: TargetingIndex,
    /// Tower firing pass.
    pub combat: TowerCombat,
    /// Simulation-time timers.
    pub timers: TimerSystem,
    /// Events accumulated during the current tick.
    pub events: Vec<Event>,
    /// Timer firings accumulated during the current tick.
    pub fired_timers: Vec<TimerFired>,
    /// Strike batch reused across ticks.
    pub strike_scratch: Vec<lane_defence_core::Strike>,
    /// Deferred registry mutations requested from inside callbacks.
    pub queue: UpdateQueue<SimContext>,
}

impl std::fmt::Debug for SimContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimContext")
            .field("world", &self.world)
            .field("targeting", &self.targeting)
            .field("pending_events", &self.events.len())
            .finish()
    }
}

/// Fully wired simulation instance.
#[derive(Debug)]
pub struct Session {
    clock: Clock,
    registry: UpdateRegistry<SimContext>,
    ctx: SimContext,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session with the built-in passes wired to their phases.
    #[must_use]
    pub fn new() -> Self {
        let mut registry: UpdateRegistry<SimContext> = UpdateRegistry::new();

        registry.register(UpdatePhase::PreInput, OWNER_TARGETING, |ctx, _| {
            ctx.targeting.invalidate();
        });

        registry.register(UpdatePhase::Update, OWNER_COMBAT, |ctx, _| {
            ctx.strike_scratch.clear();
            let towers = query::tower_view(&ctx.world);
            let enemies = query::enemy_view(&ctx.world);
            ctx.combat
                .handle(&towers, &mut ctx.targeting, &enemies, &mut ctx.strike_scratch);
            let now = ctx.timers.current_time();
            ctx.world
                .apply_strikes(&ctx.strike_scratch, now, &mut ctx.events);
        });

        registry.register(UpdatePhase::Physics, OWNER_PHYSICS, |ctx, dt| {
            ctx.world.simulate_physics(dt, &mut ctx.events);
        });

        registry.register(UpdatePhase::PostPhysics, OWNER_EFFECTS, |ctx, dt| {
            let now = ctx.timers.current_time();
            ctx.world.settle_effects(dt, now, &mut ctx.events);
        });

        registry.register(UpdatePhase::Timers, OWNER_TIMERS, |ctx, dt| {
            ctx.timers.advance(dt, &mut ctx.fired_timers);
            ctx.world.tick_cooldowns(dt);
        });

        Self {
            clock: Clock::new(),
            registry,
            ctx: SimContext {
                world: World::new(),
                targeting: TargetingIndex::new(),
                combat: TowerCombat::new(),
                timers: TimerSystem::new(),
                events: Vec::new(),
                fired_timers: Vec::new(),
                strike_scratch: Vec::new(),
                queue: UpdateQueue::new(),
            },
        }
    }

    /// Runs one full tick at the provided monotonic wall time.
    ///
    /// All nine phases run in their fixed order; deferred registry requests
    /// apply between phases. Events and timer firings produced during the
    /// tick are appended to the output buffers. Returns the frame delta.
    pub fn tick(
        &mut self,
        now: Duration,
        out_events: &mut Vec<Event>,
        out_timers: &mut Vec<TimerFired>,
    ) -> Seconds {
        let dt = self.clock.advance(now);
        for phase in UpdatePhase::ORDER {
            self.registry.run_phase(phase, &mut self.ctx, dt);
            self.registry.apply_queued(&mut self.ctx.queue);
        }

        // Enemies that left the world this tick stop being candidates.
        for event in &self.ctx.events {
            match event {
                Event::EnemyDied { enemy, .. } | Event::EnemyReachedEnd { enemy } => {
                    self.ctx.targeting.remove_targetable(*enemy);
                }
                _ => {}
            }
        }

        out_events.append(&mut self.ctx.events);
        out_timers.append(&mut self.ctx.fired_timers);
        dt
    }

    /// Spawns an enemy walking the provided waypoints and registers it as a
    /// targeting candidate.
    pub fn spawn_enemy_along(
        &mut self,
        waypoints: &[Vec2],
        speed: f32,
        max_health: f32,
    ) -> EnemyId {
        let origin = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        let motion = Motion::AlongPath(PathMotion::new(
            Path::from_waypoints(waypoints),
            origin,
            speed,
        ));
        self.spawn_enemy(origin, max_health, motion)
    }

    /// Spawns an enemy with an arbitrary motion strategy and registers it as
    /// a targeting candidate.
    pub fn spawn_enemy(&mut self, position: Vec2, max_health: f32, motion: Motion) -> EnemyId {
        let id = self
            .ctx
            .world
            .spawn_enemy(position, max_health, motion, &mut self.ctx.events);
        self.ctx.targeting.add_targetable(id);
        id
    }

    /// Removes an enemy and its targeting registration; unknown ids are a
    /// no-op.
    pub fn despawn_enemy(&mut self, enemy: EnemyId) {
        self.ctx.world.remove_enemy(enemy);
        self.ctx.targeting.remove_targetable(enemy);
    }

    /// Places a tower of the provided kind.
    pub fn place_tower(&mut self, kind: TowerKind, position: Vec2) -> TowerId {
        self.ctx
            .world
            .spawn_tower(kind, position, &mut self.ctx.events)
    }

    /// Sets the simulation speed multiplier; negative values clamp to zero.
    pub fn set_speed(&mut self, speed: f32) {
        self.clock.set_speed(speed);
    }

    /// Sets the upper bound on a single frame delta.
    pub fn set_max_delta(&mut self, max_delta: Seconds) {
        self.clock.set_max_delta(max_delta);
    }

    /// Schedules a timer on the session's timer system.
    pub fn schedule_timer(&mut self, owner: OwnerId, tag: u32, kind: TimerKind) {
        self.ctx.timers.schedule(owner, tag, kind);
    }

    /// Cancels every timer held by the provided owner.
    pub fn cancel_timers(&mut self, owner: OwnerId) {
        self.ctx.timers.cancel(owner);
    }

    /// Registers a custom update callback for the provided phase and owner.
    ///
    /// Callable between ticks; from inside a callback, use
    /// [`SimContext::queue`] instead.
    pub fn register<F>(&mut self, phase: UpdatePhase, owner: OwnerId, callback: F)
    where
        F: FnMut(&mut SimContext, Seconds) + 'static,
    {
        self.registry.register(phase, owner, callback);
    }

    /// Removes the owner's callbacks for the provided phase.
    pub fn unregister(&mut self, phase: UpdatePhase, owner: OwnerId) {
        self.registry.unregister(phase, owner);
    }

    /// Removes the owner's callbacks across all phases.
    pub fn unregister_owner(&mut self, owner: OwnerId) {
        self.registry.unregister_owner(owner);
    }

    /// Read access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.ctx.world
    }

    /// Read access to the clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Total simulated seconds accumulated so far.
    #[must_use]
    pub fn current_time(&self) -> Seconds {
        self.ctx.timers.current_time()
    }
}
