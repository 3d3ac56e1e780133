//! Mining state machine.
//!
//! Holding the pointer on a target accumulates time; every full interval
//! applies one hit. Changing target, releasing, or leaving every target
//! discards progress.

use tracing::{debug, trace};

use terra_rs_world::block_registry::SoundKey;
use terra_rs_world::capability::{Damageable, DropSpec, Hoverable, Mineable};
use terra_rs_world::coords::{Aabb, CoordMap, MatrixPos, WorldPos};
use terra_rs_world::flora::PlantId;
use terra_rs_world::grid::WorldGrid;

use crate::config::MiningConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MineTarget {
    Block(MatrixPos),
    Plant(PlantId),
}

impl MineTarget {
    /// The target under `p`: trees and bushes win over the block behind them.
    pub fn at(grid: &WorldGrid, p: WorldPos) -> Option<Self> {
        if let Some(plant) = grid.find_tree_at(p) {
            return Some(MineTarget::Plant(plant.id));
        }
        grid.find_block_at(p).map(|b| MineTarget::Block(b.pos))
    }

    /// Hover outline, or `None` once the target is gone.
    pub fn bounds(self, grid: &WorldGrid) -> Option<Aabb> {
        match self {
            MineTarget::Block(pos) => grid.block(pos).map(|b| b.bounds(grid.coords())),
            MineTarget::Plant(id) => grid.plant(id).map(|p| p.bounds(grid.coords())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum MiningState {
    #[default]
    Idle,
    Targeting { target: MineTarget, elapsed: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MiningOutcome {
    /// The target took a hit and survived.
    Hit {
        target: MineTarget,
        life: u32,
        max_life: u32,
        sound: SoundKey,
    },
    /// The target was removed from the grid; `drop` is what it leaves.
    Destroyed {
        target: MineTarget,
        drop: DropSpec,
        sound: SoundKey,
    },
}

/// What a hit needs to know about a target, read before mutating it.
struct StrikeProfile {
    drop: DropSpec,
    dig: SoundKey,
    brk: SoundKey,
    max_life: u32,
}

fn strike_profile<M: Mineable + ?Sized>(m: &M, coords: &CoordMap) -> StrikeProfile {
    StrikeProfile {
        drop: m.drop_spec(coords),
        dig: m.dig_sound(),
        brk: m.break_sound(),
        max_life: m.max_life(),
    }
}

pub struct MiningController {
    config: MiningConfig,
    state: MiningState,
}

impl MiningController {
    pub fn new(config: MiningConfig) -> Self {
        Self {
            config,
            state: MiningState::Idle,
        }
    }

    pub fn state(&self) -> MiningState {
        self.state
    }

    /// Advance one frame. `pointer` is `None` while mining input is released.
    pub fn update(
        &mut self,
        grid: &mut WorldGrid,
        pointer: Option<WorldPos>,
        dt: f32,
    ) -> Option<MiningOutcome> {
        let Some(target) = pointer.and_then(|p| MineTarget::at(grid, p)) else {
            if self.state != MiningState::Idle {
                trace!("mining cancelled");
            }
            self.state = MiningState::Idle;
            return None;
        };

        let elapsed = match self.state {
            MiningState::Targeting {
                target: current,
                elapsed,
            } if current == target => elapsed + dt,
            _ => {
                trace!(?target, "mining target acquired");
                self.state = MiningState::Targeting {
                    target,
                    elapsed: 0.0,
                };
                return None;
            }
        };

        if elapsed < self.config.interval {
            self.state = MiningState::Targeting { target, elapsed };
            return None;
        }

        self.state = MiningState::Targeting {
            target,
            elapsed: 0.0,
        };
        let outcome = self.strike(grid, target);
        if outcome.is_none() {
            self.state = MiningState::Idle;
        }
        outcome
    }

    /// Apply one hit. `None` if the target vanished in the meantime.
    fn strike(&mut self, grid: &mut WorldGrid, target: MineTarget) -> Option<MiningOutcome> {
        let damage = self.config.damage;
        let (profile, life) = match target {
            MineTarget::Block(pos) => {
                let p = strike_profile(grid.block(pos)?, grid.coords());
                (p, grid.damage_block(pos, damage)?)
            }
            MineTarget::Plant(id) => {
                let p = strike_profile(grid.plant(id)?, grid.coords());
                (p, grid.damage_plant(id, damage)?)
            }
        };

        if life > 0 {
            trace!(?target, life, "mining hit");
            return Some(MiningOutcome::Hit {
                target,
                life,
                max_life: profile.max_life,
                sound: profile.dig,
            });
        }

        match target {
            MineTarget::Block(pos) => {
                grid.remove_block(pos);
            }
            MineTarget::Plant(id) => {
                grid.remove_plant(id);
            }
        }
        self.state = MiningState::Idle;
        debug!(?target, item = ?profile.drop.item, "target destroyed");
        Some(MiningOutcome::Destroyed {
            target,
            drop: profile.drop,
            sound: profile.brk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_rs_world::block_registry::BlockKind;
    use terra_rs_world::flora::{Flora, PlantKind};
    use terra_rs_world::item_registry::ItemKind;
    use terra_rs_world::terrain::BlockMatrix;

    /// 6 columns x 4 rows of dirt on the bottom row.
    fn grid() -> WorldGrid {
        let matrix = BlockMatrix::from_cells(
            6,
            4,
            (0..6).map(|c| (MatrixPos::new(c, 3), BlockKind::Dirt)),
        );
        WorldGrid::new(matrix, CoordMap::new(32.0, 6, 2), Flora::new())
    }

    fn controller(interval: f32) -> MiningController {
        MiningController::new(MiningConfig {
            interval,
            damage: 1,
        })
    }

    #[test]
    fn nothing_under_pointer_stays_idle() {
        let mut g = grid();
        let mut m = controller(1.0);
        let sky = g.matrix_to_world(MatrixPos::new(2, 0));
        assert_eq!(m.update(&mut g, Some(sky), 0.5), None);
        assert_eq!(m.state(), MiningState::Idle);
    }

    #[test]
    fn retarget_resets_progress() {
        let mut g = grid();
        let mut m = controller(1.0);
        let x = g.matrix_to_world(MatrixPos::new(1, 3));
        let y = g.matrix_to_world(MatrixPos::new(2, 3));

        m.update(&mut g, Some(x), 0.0);
        for _ in 0..9 {
            assert_eq!(m.update(&mut g, Some(x), 0.1), None);
        }
        assert!(matches!(
            m.state(),
            MiningState::Targeting { elapsed, .. } if (elapsed - 0.9).abs() < 1e-4
        ));

        m.update(&mut g, Some(y), 0.1);
        assert_eq!(
            m.state(),
            MiningState::Targeting {
                target: MineTarget::Block(MatrixPos::new(2, 3)),
                elapsed: 0.0,
            }
        );
        let max = BlockKind::Dirt.info().max_life;
        assert_eq!(g.block(MatrixPos::new(1, 3)).unwrap().life(), max);
    }

    #[test]
    fn release_discards_progress() {
        let mut g = grid();
        let mut m = controller(1.0);
        let x = g.matrix_to_world(MatrixPos::new(1, 3));
        m.update(&mut g, Some(x), 0.0);
        m.update(&mut g, Some(x), 0.8);
        m.update(&mut g, None, 0.1);
        assert_eq!(m.state(), MiningState::Idle);

        m.update(&mut g, Some(x), 0.0);
        assert_eq!(m.update(&mut g, Some(x), 0.5), None);
    }

    #[test]
    fn hits_then_destroys_block() {
        let mut g = grid();
        let mut m = controller(0.25);
        let pos = MatrixPos::new(3, 3);
        let p = g.matrix_to_world(pos);

        m.update(&mut g, Some(p), 0.0);
        let first = m.update(&mut g, Some(p), 0.25);
        assert!(matches!(first, Some(MiningOutcome::Hit { life: 1, .. })));

        let second = m.update(&mut g, Some(p), 0.25);
        match second {
            Some(MiningOutcome::Destroyed { target, drop, .. }) => {
                assert_eq!(target, MineTarget::Block(pos));
                assert_eq!(drop.item, ItemKind::Dirt);
                assert_eq!(drop.position, p);
            }
            other => panic!("expected destruction, got {other:?}"),
        }
        assert_eq!(g.block_type_at(pos), None);
        assert_eq!(m.state(), MiningState::Idle);
        assert_eq!(g.check_consistency(), Ok(()));
    }

    #[test]
    fn trees_take_priority_over_blocks() {
        let top = MatrixPos::new(2, 3);
        let mut flora = Flora::new();
        let base = {
            let c = CoordMap::new(32.0, 6, 2).matrix_to_world(top);
            WorldPos::new(c.x, c.y - 16.0)
        };
        let id = flora.insert(PlantKind::Tree, base);
        let matrix = BlockMatrix::from_cells(
            6,
            4,
            (0..6).map(|c| (MatrixPos::new(c, 3), BlockKind::Grass)),
        );
        let mut g = WorldGrid::new(matrix, CoordMap::new(32.0, 6, 2), flora);
        // Fill the cell the trunk stands in so both candidates cover the point.
        let behind = MatrixPos::new(2, 2);
        g.place_block(behind, BlockKind::Dirt).unwrap();
        let trunk = WorldPos::new(base.x, base.y - 8.0);
        assert_eq!(g.find_block_at(trunk).map(|b| b.pos), Some(behind));
        assert!(g.find_tree_at(trunk).is_some());
        assert_eq!(MineTarget::at(&g, trunk), Some(MineTarget::Plant(id)));

        let mut m = controller(0.1);
        m.update(&mut g, Some(trunk), 0.0);
        let mut felled = None;
        for _ in 0..10 {
            let outcome = m.update(&mut g, Some(trunk), 0.1);
            if let Some(MiningOutcome::Destroyed { drop, .. }) = outcome {
                felled = Some(drop);
                break;
            }
        }
        let drop = felled.expect("tree should fall");
        assert_eq!(drop.item, ItemKind::Wood);
        assert_eq!(drop.quantity, 3);
        assert!(g.plant(id).is_none());
        assert!(g.block(top).is_some());
        // With the tree gone the block behind it becomes the target.
        assert_eq!(g.block(behind).map(|b| b.kind), Some(BlockKind::Dirt));
        assert_eq!(MineTarget::at(&g, trunk), Some(MineTarget::Block(behind)));
    }
}
