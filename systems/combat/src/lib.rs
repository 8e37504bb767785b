#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tower firing decisions.
//!
//! A pure system: it reads the tower and enemy views, asks the targeting
//! index for the best candidate per ready tower, and emits [`Strike`]
//! records for the world to execute. It never mutates simulation state
//! itself, so the pass is trivially replayable.

use lane_defence_core::{Strike, TowerView};
use lane_defence_system_targeting::TargetingIndex;

/// Horizon in seconds used to lead moving targets when aiming.
const AIM_LEAD: f32 = 0.15;

/// Per-tick firing pass over all placed towers.
#[derive(Debug, Default)]
pub struct TowerCombat;

impl TowerCombat {
    /// Creates the combat system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Collects one strike per ready tower that has a target in range.
    ///
    /// Towers are visited in view order (ascending id), so two towers in
    /// range of the same enemy both fire at it within the same tick. The aim
    /// point leads the target by its current velocity.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        targeting: &mut TargetingIndex,
        enemies: &lane_defence_core::EnemyView,
        out: &mut Vec<Strike>,
    ) {
        for tower in towers.iter() {
            if tower.ready_in > 0.0 {
                continue;
            }

            let Some(target) =
                targeting.nearest_in_range(enemies, tower.position, tower.kind.range_squared())
            else {
                continue;
            };

            out.push(Strike {
                tower: tower.id,
                enemy: target.enemy,
                effect: tower.kind.effect(),
                aim: target.position + target.velocity * AIM_LEAD,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use lane_defence_core::{
        Effect, EnemyId, EnemySnapshot, EnemyView, Health, TowerId, TowerKind, TowerSnapshot,
    };

    fn enemy(id: u32, position: Vec2, distance: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position,
            velocity: Vec2::ZERO,
            distance_to_destination: distance,
            targetable: true,
            health: Health::new(100.0),
        }
    }

    fn tower(id: u32, kind: TowerKind, position: Vec2, ready_in: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            position,
            ready_in,
        }
    }

    fn registered_index(ids: &[u32]) -> TargetingIndex {
        let mut index = TargetingIndex::new();
        for id in ids {
            index.add_targetable(EnemyId::new(*id));
        }
        index
    }

    #[test]
    fn ready_tower_strikes_the_highest_priority_target() {
        let towers =
            TowerView::from_snapshots(vec![tower(0, TowerKind::Cannon, Vec2::ZERO, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(1, Vec2::new(10.0, 0.0), 50.0),
            enemy(2, Vec2::new(20.0, 0.0), 10.0),
        ]);
        let mut index = registered_index(&[1, 2]);
        let mut strikes = Vec::new();

        TowerCombat::new().handle(&towers, &mut index, &enemies, &mut strikes);

        assert_eq!(strikes.len(), 1);
        assert_eq!(strikes[0].enemy, EnemyId::new(2));
        assert_eq!(strikes[0].effect, Effect::Damage { amount: 25.0 });
    }

    #[test]
    fn cooling_towers_hold_fire() {
        let towers =
            TowerView::from_snapshots(vec![tower(0, TowerKind::Cannon, Vec2::ZERO, 0.4)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::ZERO, 5.0)]);
        let mut index = registered_index(&[1]);
        let mut strikes = Vec::new();

        TowerCombat::new().handle(&towers, &mut index, &enemies, &mut strikes);

        assert!(strikes.is_empty());
    }

    #[test]
    fn out_of_range_enemies_draw_no_fire() {
        let towers =
            TowerView::from_snapshots(vec![tower(0, TowerKind::Frost, Vec2::ZERO, 0.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::new(500.0, 0.0), 5.0)]);
        let mut index = registered_index(&[1]);
        let mut strikes = Vec::new();

        TowerCombat::new().handle(&towers, &mut index, &enemies, &mut strikes);

        assert!(strikes.is_empty());
    }

    #[test]
    fn multiple_towers_converge_on_the_same_target() {
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Cannon, Vec2::new(0.0, 10.0), 0.0),
            tower(1, TowerKind::Frost, Vec2::new(0.0, -10.0), 0.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![enemy(1, Vec2::ZERO, 5.0)]);
        let mut index = registered_index(&[1]);
        let mut strikes = Vec::new();

        TowerCombat::new().handle(&towers, &mut index, &enemies, &mut strikes);

        assert_eq!(strikes.len(), 2);
        assert_eq!(strikes[0].tower, TowerId::new(0));
        assert_eq!(strikes[1].tower, TowerId::new(1));
        assert!(strikes.iter().all(|strike| strike.enemy == EnemyId::new(1)));
    }

    #[test]
    fn aim_leads_a_moving_target() {
        let towers =
            TowerView::from_snapshots(vec![tower(0, TowerKind::Cannon, Vec2::ZERO, 0.0)]);
        let mut moving = enemy(1, Vec2::new(4.0, 0.0), 5.0);
        moving.velocity = Vec2::new(10.0, 0.0);
        let enemies = EnemyView::from_snapshots(vec![moving]);
        let mut index = registered_index(&[1]);
        let mut strikes = Vec::new();

        TowerCombat::new().handle(&towers, &mut index, &enemies, &mut strikes);

        assert!((strikes[0].aim - Vec2::new(5.5, 0.0)).length() < 1e-4);
    }
}
