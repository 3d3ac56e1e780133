//! Block matrix storage and the elevation-to-matrix builder.

use rand::Rng;
use tracing::debug;

use crate::block_registry::BlockKind;
use crate::config::TerrainConfig;
use crate::coords::MatrixPos;
use crate::heightmap::ElevationProfile;

/// Fixed-size 2-D grid of optional block kinds, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatrix {
    columns: u32,
    rows: u32,
    cells: Vec<Option<BlockKind>>,
}

impl BlockMatrix {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            cells: vec![None; columns as usize * rows as usize],
        }
    }

    /// Hand-authored matrix. Cells outside `columns x rows` are dropped.
    pub fn from_cells(
        columns: u32,
        rows: u32,
        cells: impl IntoIterator<Item = (MatrixPos, BlockKind)>,
    ) -> Self {
        let mut matrix = Self::new(columns, rows);
        for (pos, kind) in cells {
            matrix.set(pos, Some(kind));
        }
        matrix
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn in_bounds(&self, pos: MatrixPos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as u32) < self.columns
            && (pos.row as u32) < self.rows
    }

    fn index(&self, pos: MatrixPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.row as usize * self.columns as usize + pos.col as usize)
    }

    /// Kind stored at `pos`; `None` when empty or out of bounds.
    pub fn get(&self, pos: MatrixPos) -> Option<BlockKind> {
        self.index(pos).and_then(|i| self.cells[i])
    }

    /// Write a cell. Out-of-bounds writes are ignored and return `false`.
    pub(crate) fn set(&mut self, pos: MatrixPos, kind: Option<BlockKind>) -> bool {
        match self.index(pos) {
            Some(i) => {
                self.cells[i] = kind;
                true
            }
            None => false,
        }
    }

    /// First occupied row in a column, scanning from the top.
    pub fn surface_row(&self, col: i32) -> Option<i32> {
        (0..self.rows as i32).find(|&row| self.get(MatrixPos::new(col, row)).is_some())
    }

    /// Every occupied cell in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (MatrixPos, BlockKind)> + '_ {
        let columns = self.columns as usize;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|kind| (MatrixPos::new((i % columns) as i32, (i / columns) as i32), kind))
        })
    }
}

/// Turns an elevation profile into a `BlockMatrix`.
pub struct TerrainMatrixBuilder<'a> {
    config: &'a TerrainConfig,
}

impl<'a> TerrainMatrixBuilder<'a> {
    pub fn new(config: &'a TerrainConfig) -> Self {
        Self { config }
    }

    /// Build the matrix. Rows = tallest elevation + base depth.
    ///
    /// Each column is filled from `max_elevation - elevation` downward for
    /// `elevation + base_depth` rows: grass on top, then `dirt_rows` of dirt,
    /// then stone with probability `min(stone_clamp, depth_ratio * stone_factor)`.
    pub fn build<R: Rng + ?Sized>(&self, profile: &ElevationProfile, rng: &mut R) -> BlockMatrix {
        let cfg = self.config;
        let max_elevation = profile.max_height();
        let columns = profile.len() as u32;
        let rows = max_elevation + cfg.base_depth;
        let mut matrix = BlockMatrix::new(columns, rows);
        let mut stone_cells = 0usize;

        for (col, &elevation) in profile.heights().iter().enumerate() {
            let surface_row = max_elevation - elevation;
            let total = elevation + cfg.base_depth;

            for depth in 0..total {
                let row = surface_row + depth;
                if row >= rows {
                    break;
                }
                let kind = if depth == 0 {
                    BlockKind::Grass
                } else if depth <= cfg.dirt_rows {
                    BlockKind::Dirt
                } else {
                    let depth_ratio = depth as f64 / total as f64;
                    let p = (depth_ratio * cfg.stone_factor).min(cfg.stone_clamp).clamp(0.0, 1.0);
                    if rng.gen_bool(p) {
                        stone_cells += 1;
                        BlockKind::Stone
                    } else {
                        BlockKind::Dirt
                    }
                };
                matrix.set(MatrixPos::new(col as i32, row as i32), Some(kind));
            }
        }

        debug!(columns, rows, stone_cells, "built block matrix");
        matrix
    }
}
