//! Scripted headless session.
//!
//! The player stands on the middle column. The script alternates between
//! digging the columns around them and building the same columns back up with
//! whatever it collected, one column per step.

use serde::Serialize;
use tracing::{debug, error, info, trace};

use terra_rs_game::game_world::{GameEvent, GameWorld, TickInput};
use terra_rs_game::inventory::{Hotbar, ItemStack};
use terra_rs_world::coords::{MatrixPos, WorldPos};
use terra_rs_world::grid::WorldGrid;

use crate::config::SessionSection;

const OFFSETS: [i32; 4] = [-2, -1, 1, 2];

#[derive(Debug, Default, Serialize)]
pub struct SessionReport {
    pub seed: u64,
    pub ticks: u64,
    pub elapsed_seconds: f64,
    pub blocks_placed: u32,
    pub blocks_destroyed: u32,
    pub plants_felled: u32,
    pub drops_spawned: u32,
    pub drops_merged: u32,
    pub drops_picked_up: u32,
    pub items_picked_up: u32,
    pub drops_expired: u32,
    pub live_drops: usize,
    pub grid_consistent: bool,
    pub hotbar: Vec<Option<ItemStack>>,
}

impl SessionReport {
    pub fn record(&mut self, event: &GameEvent) {
        match event {
            GameEvent::BlockPlaced { .. } => self.blocks_placed += 1,
            GameEvent::BlockDestroyed { .. } => self.blocks_destroyed += 1,
            GameEvent::PlantFelled { .. } => self.plants_felled += 1,
            GameEvent::DropSpawned { .. } => self.drops_spawned += 1,
            GameEvent::DropMerged { .. } => self.drops_merged += 1,
            GameEvent::DropPickedUp { quantity, .. } => {
                self.drops_picked_up += 1;
                self.items_picked_up += quantity;
            }
            GameEvent::DropExpired { .. } => self.drops_expired += 1,
            _ => {}
        }
    }
}

struct Script {
    center: i32,
    step_ticks: u64,
}

impl Script {
    fn input(&self, game: &mut GameWorld, tick: u64, dt: f32) -> TickInput {
        let step = tick / self.step_ticks;
        let col = self.center + OFFSETS[(step % OFFSETS.len() as u64) as usize];
        let building = (step / OFFSETS.len() as u64) % 2 == 1;

        if building {
            select_placeable(&mut game.inventory);
        }
        let grid = &game.grid;
        let player = standing_spot(grid, self.center);

        if building {
            let cadence = (self.step_ticks / 3).max(1);
            let pointer = grid
                .matrix()
                .surface_row(col)
                .map(|row| grid.matrix_to_world(MatrixPos::new(col, row - 1)))
                .unwrap_or(player);
            TickInput {
                dt,
                pointer,
                player,
                mine_held: false,
                place_pressed: tick % cadence == 0,
            }
        } else {
            TickInput {
                dt,
                pointer: dig_point(grid, col).unwrap_or(player),
                player,
                mine_held: true,
                place_pressed: false,
            }
        }
    }
}

/// Center of the empty cell right above a column's surface.
fn standing_spot(grid: &WorldGrid, col: i32) -> WorldPos {
    let row = grid.matrix().surface_row(col).unwrap_or(grid.rows() as i32);
    grid.matrix_to_world(MatrixPos::new(col, row - 1))
}

/// A plant rooted in the column, else the column's surface block.
fn dig_point(grid: &WorldGrid, col: i32) -> Option<WorldPos> {
    let half = grid.coords().block_size() * 0.5;
    grid.plants()
        .find(|p| grid.world_to_matrix(p.base).col == col)
        .map(|p| WorldPos::new(p.base.x, p.base.y - half))
        .or_else(|| {
            grid.matrix()
                .surface_row(col)
                .map(|row| grid.matrix_to_world(MatrixPos::new(col, row)))
        })
}

fn select_placeable(hotbar: &mut Hotbar) {
    let slot = hotbar.slots().iter().position(|s| {
        s.is_some_and(|stack| stack.item.placeable_block().is_some())
    });
    if let Some(slot) = slot {
        hotbar.select(slot);
    }
}

/// Drive `game` through the scripted session and summarise what happened.
pub fn run(game: &mut GameWorld, seed: u64, session: &SessionSection) -> SessionReport {
    let script = Script {
        center: game.grid.columns() as i32 / 2,
        step_ticks: session.step_ticks,
    };
    let mut report = SessionReport {
        seed,
        ..Default::default()
    };

    for tick in 0..session.ticks {
        if tick % session.step_ticks == 0 {
            debug!(tick, step = tick / session.step_ticks, "script step");
        }
        let input = script.input(game, tick, session.dt);
        game.tick(&input);
        for event in game.drain_events() {
            trace!(?event, "game event");
            report.record(&event);
        }
    }

    report.ticks = game.current_tick();
    report.elapsed_seconds = game.elapsed();
    report.live_drops = game.drops().len();
    report.grid_consistent = match game.grid.check_consistency() {
        Ok(()) => true,
        Err(fault) => {
            error!(%fault, "grid inconsistent after session");
            false
        }
    };
    report.hotbar = game.inventory.slots().to_vec();

    info!(
        ticks = report.ticks,
        destroyed = report.blocks_destroyed,
        placed = report.blocks_placed,
        picked_up = report.items_picked_up,
        "session finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use terra_rs_game::config::GameConfig;
    use terra_rs_world::block_registry::BlockKind;
    use terra_rs_world::config::TerrainConfig;
    use terra_rs_world::coords::CoordMap;
    use terra_rs_world::flora::Flora;
    use terra_rs_world::terrain::BlockMatrix;

    /// 16 columns, flat dirt from row 5 down to row 9.
    fn flat_game() -> GameWorld {
        let cells = (0..16)
            .flat_map(|c| (5..10).map(move |r| (MatrixPos::new(c, r), BlockKind::Dirt)));
        let matrix = BlockMatrix::from_cells(16, 10, cells);
        let grid = WorldGrid::new(matrix, CoordMap::new(32.0, 16, 5), Flora::new());
        GameWorld::with_hotbar(grid, GameConfig::default())
    }

    fn session(ticks: u64) -> SessionSection {
        SessionSection {
            ticks,
            ..Default::default()
        }
    }

    #[test]
    fn flat_world_dig_and_build() {
        let mut game = flat_game();
        let report = run(&mut game, 0, &session(8 * 90));

        assert_eq!(report.ticks, 720);
        assert!(report.blocks_destroyed > 0);
        assert!(report.items_picked_up > 0);
        assert!(report.blocks_placed > 0);
        assert!(report.grid_consistent);
        assert_eq!(report.hotbar.len(), 9);
    }

    #[test]
    fn report_counts_events() {
        let mut report = SessionReport::default();
        report.record(&GameEvent::BlockDestroyed {
            pos: MatrixPos::new(0, 0),
            kind: BlockKind::Stone,
        });
        report.record(&GameEvent::DropPickedUp {
            id: terra_rs_game::components::DropId(1),
            item: terra_rs_world::item_registry::ItemKind::Stone,
            quantity: 3,
        });
        assert_eq!(report.blocks_destroyed, 1);
        assert_eq!(report.drops_picked_up, 1);
        assert_eq!(report.items_picked_up, 3);
    }

    #[test]
    fn generated_world_session_stays_consistent() {
        let terrain = TerrainConfig {
            columns: 48,
            ..Default::default()
        };
        let grid = WorldGrid::generate(&terrain, &mut StdRng::seed_from_u64(42));
        let mut game = GameWorld::with_hotbar(grid, GameConfig::default());
        let report = run(&mut game, 42, &session(400));
        assert_eq!(report.ticks, 400);
        assert!(report.grid_consistent);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"blocks_destroyed\""));
    }
}
