//! The world grid: block matrix, block index, plants, and coordinate map.
//!
//! `WorldGrid` is the only writer of the matrix and the block index. Every
//! mutation updates both, plus the neighbor snapshots of the adjacent blocks,
//! before returning. In debug builds each mutation re-checks the cells it
//! touched and panics on any disagreement.

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::block::{Block, Neighbors};
use crate::block_registry::BlockKind;
use crate::capability::{Damageable, Hoverable};
use crate::config::TerrainConfig;
use crate::coords::{CoordMap, MatrixPos, WorldPos};
use crate::error::{ConsistencyFault, PlaceError};
use crate::flora::{scatter_flora, Flora, Plant, PlantId, PlantKind};
use crate::heightmap::HeightMapGenerator;
use crate::terrain::{BlockMatrix, TerrainMatrixBuilder};

/// Changes journaled by the grid, drained by the game layer once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    Placed {
        pos: MatrixPos,
        kind: BlockKind,
        neighbors: Neighbors,
    },
    Removed {
        pos: MatrixPos,
        kind: BlockKind,
    },
    /// A block's neighbor snapshot changed because an adjacent cell did.
    Reshaped { pos: MatrixPos, neighbors: Neighbors },
    PlantRemoved { id: PlantId, kind: PlantKind },
}

pub struct WorldGrid {
    matrix: BlockMatrix,
    blocks: HashMap<MatrixPos, Block>,
    flora: Flora,
    coords: CoordMap,
    events: Vec<GridEvent>,
}

impl WorldGrid {
    /// Wrap a populated matrix, creating one block entity per occupied cell.
    pub fn new(matrix: BlockMatrix, coords: CoordMap, flora: Flora) -> Self {
        let mut grid = Self {
            blocks: HashMap::with_capacity(matrix.occupied().count()),
            matrix,
            flora,
            coords,
            events: Vec::new(),
        };
        let cells: Vec<_> = grid.matrix.occupied().collect();
        for (pos, kind) in cells {
            let neighbors = grid.neighbors_of(pos);
            grid.blocks.insert(pos, Block::new(kind, pos, neighbors));
        }
        grid
    }

    /// Run the full generation pipeline: height map, matrix, flora.
    pub fn generate<R: Rng + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Self {
        let profile = HeightMapGenerator::new(config).generate(config.columns as usize, rng);
        let matrix = TerrainMatrixBuilder::new(config).build(&profile, rng);
        let coords = CoordMap::new(config.block_size, config.columns, profile.max_height());
        let flora = scatter_flora(&matrix, &coords, config, rng);
        let grid = Self::new(matrix, coords, flora);
        info!(
            columns = grid.columns(),
            rows = grid.rows(),
            blocks = grid.block_count(),
            plants = grid.flora.len(),
            "world generated"
        );
        grid
    }

    pub fn columns(&self) -> u32 {
        self.matrix.columns()
    }

    pub fn rows(&self) -> u32 {
        self.matrix.rows()
    }

    pub fn coords(&self) -> &CoordMap {
        &self.coords
    }

    pub fn matrix(&self) -> &BlockMatrix {
        &self.matrix
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn in_bounds(&self, pos: MatrixPos) -> bool {
        self.matrix.in_bounds(pos)
    }

    /// Bounds-checked lookup. Out of range is simply absent.
    pub fn block_type_at(&self, pos: MatrixPos) -> Option<BlockKind> {
        self.matrix.get(pos)
    }

    pub fn is_occupied(&self, pos: MatrixPos) -> bool {
        self.block_type_at(pos).is_some()
    }

    pub fn has_occupied_neighbor(&self, pos: MatrixPos) -> bool {
        pos.neighbors().iter().any(|&(_, n)| self.is_occupied(n))
    }

    pub fn block(&self, pos: MatrixPos) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    pub fn plant(&self, id: PlantId) -> Option<&Plant> {
        self.flora.get(id)
    }

    pub fn plants(&self) -> impl Iterator<Item = &Plant> {
        self.flora.iter()
    }

    pub fn matrix_to_world(&self, pos: MatrixPos) -> WorldPos {
        self.coords.matrix_to_world(pos)
    }

    pub fn world_to_matrix(&self, p: WorldPos) -> MatrixPos {
        self.coords.world_to_matrix(p)
    }

    /// Read-only placement check: in bounds, empty, and supported.
    pub fn can_place(&self, pos: MatrixPos) -> Result<(), PlaceError> {
        if !self.in_bounds(pos) {
            return Err(PlaceError::OutOfBounds(pos));
        }
        if self.is_occupied(pos) {
            return Err(PlaceError::Occupied(pos));
        }
        if !self.has_occupied_neighbor(pos) {
            return Err(PlaceError::Unsupported(pos));
        }
        Ok(())
    }

    /// Place a new block and update the four adjacent snapshots.
    pub fn place_block(&mut self, pos: MatrixPos, kind: BlockKind) -> Result<Block, PlaceError> {
        if let Err(e) = self.can_place(pos) {
            debug!(%pos, ?kind, "placement rejected: {e}");
            return Err(e);
        }

        self.matrix.set(pos, Some(kind));
        let block = Block::new(kind, pos, self.neighbors_of(pos));
        self.blocks.insert(pos, block);
        self.events.push(GridEvent::Placed {
            pos,
            kind,
            neighbors: block.neighbors,
        });
        self.mark_neighbors(pos, true);

        debug!(%pos, ?kind, "block placed");
        self.debug_check_around(pos);
        Ok(block)
    }

    /// Remove the block at `pos`. Removing an empty cell is a no-op.
    pub fn remove_block(&mut self, pos: MatrixPos) -> Option<Block> {
        let block = self.blocks.remove(&pos)?;
        self.matrix.set(pos, None);
        self.events.push(GridEvent::Removed {
            pos,
            kind: block.kind,
        });
        self.mark_neighbors(pos, false);

        debug!(%pos, kind = ?block.kind, "block removed");
        self.debug_check_around(pos);
        Some(block)
    }

    /// Damage a block. Returns the remaining life, or `None` if no block is there.
    pub fn damage_block(&mut self, pos: MatrixPos, amount: u32) -> Option<u32> {
        self.blocks.get_mut(&pos).map(|b| b.apply_damage(amount))
    }

    pub fn damage_plant(&mut self, id: PlantId, amount: u32) -> Option<u32> {
        self.flora.get_mut(id).map(|p| p.apply_damage(amount))
    }

    /// Remove a plant. Removing a missing plant is a no-op.
    pub fn remove_plant(&mut self, id: PlantId) -> Option<Plant> {
        let plant = self.flora.remove(id)?;
        self.events.push(GridEvent::PlantRemoved {
            id,
            kind: plant.kind,
        });
        debug!(%id, kind = ?plant.kind, "plant removed");
        Some(plant)
    }

    /// The live block whose cell contains `p`.
    pub fn find_block_at(&self, p: WorldPos) -> Option<&Block> {
        self.blocks.get(&self.world_to_matrix(p))
    }

    /// The first tree or bush whose bounds contain `p`.
    pub fn find_tree_at(&self, p: WorldPos) -> Option<&Plant> {
        self.flora.iter().find(|plant| plant.bounds(&self.coords).contains(p))
    }

    pub fn drain_events(&mut self) -> Vec<GridEvent> {
        std::mem::take(&mut self.events)
    }

    /// Full scan of matrix/index agreement and every neighbor snapshot.
    pub fn check_consistency(&self) -> Result<(), ConsistencyFault> {
        for row in 0..self.rows() as i32 {
            for col in 0..self.columns() as i32 {
                self.check_cell(MatrixPos::new(col, row))?;
            }
        }
        for (&key, block) in &self.blocks {
            if key != block.pos {
                return Err(ConsistencyFault::OrphanBlock {
                    key,
                    stored: block.pos,
                });
            }
        }
        Ok(())
    }

    fn check_cell(&self, pos: MatrixPos) -> Result<(), ConsistencyFault> {
        let matrix = self.matrix.get(pos).is_some();
        let block = self.blocks.get(&pos);
        if matrix != block.is_some() {
            return Err(ConsistencyFault::IndexMismatch {
                pos,
                matrix,
                indexed: block.is_some(),
            });
        }
        if let Some(block) = block {
            if Some(block.kind) != self.matrix.get(pos) {
                return Err(ConsistencyFault::KindMismatch { pos });
            }
            if block.neighbors != self.neighbors_of(pos) {
                return Err(ConsistencyFault::StaleNeighbors { pos });
            }
        }
        Ok(())
    }

    fn debug_check_around(&self, pos: MatrixPos) {
        if cfg!(debug_assertions) {
            let cells = std::iter::once(pos).chain(pos.neighbors().map(|(_, n)| n));
            for cell in cells.filter(|&c| self.in_bounds(c)) {
                if let Err(fault) = self.check_cell(cell) {
                    panic!("world grid invariant violated: {fault}");
                }
            }
        }
    }

    /// Snapshot computed fresh from the matrix.
    fn neighbors_of(&self, pos: MatrixPos) -> Neighbors {
        let mut n = Neighbors::default();
        for (side, adjacent) in pos.neighbors() {
            n.set(side, self.is_occupied(adjacent));
        }
        n
    }

    /// Flip the bit facing `pos` on each adjacent block.
    fn mark_neighbors(&mut self, pos: MatrixPos, occupied: bool) {
        for (side, adjacent) in pos.neighbors() {
            if let Some(block) = self.blocks.get_mut(&adjacent) {
                block.neighbors.set(side.opposite(), occupied);
                self.events.push(GridEvent::Reshaped {
                    pos: adjacent,
                    neighbors: block.neighbors,
                });
            }
        }
    }
}
