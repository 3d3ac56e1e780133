//! Matrix and world-space coordinates, and the affine map between them.
//!
//! World space is continuous with `y` growing downward. Matrix row 0 is the
//! top of the block matrix, which is the surface of the tallest column.

use std::fmt;

/// Discrete `(column, row)` cell coordinate. Signed so that positions just
/// outside the matrix can be represented and then rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatrixPos {
    pub col: i32,
    pub row: i32,
}

impl MatrixPos {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The cell one step in `side`'s direction.
    pub fn offset(self, side: Side) -> Self {
        let (dc, dr) = side.delta();
        Self::new(self.col.saturating_add(dc), self.row.saturating_add(dr))
    }

    /// The four axis-adjacent cells, paired with the side they lie on.
    pub fn neighbors(self) -> [(Side, MatrixPos); 4] {
        Side::ALL.map(|side| (side, self.offset(side)))
    }
}

impl fmt::Display for MatrixPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// One of the four axis-aligned sides of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Top, Side::Bottom];

    /// `(dcol, drow)` step. Top is row - 1 because rows grow downward.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Side::Left => (-1, 0),
            Side::Right => (1, 0),
            Side::Top => (0, -1),
            Side::Bottom => (0, 1),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
        }
    }
}

/// Continuous world-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: WorldPos) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: WorldPos) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

/// Axis-aligned bounding box in world space. `min` is inclusive, `max` exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: WorldPos,
    pub max: WorldPos,
}

impl Aabb {
    pub fn contains(&self, p: WorldPos) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }
}

/// Invertible affine map between matrix cells and world space.
///
/// Cell `(col, row)` maps to its center. The inverse floors, and since every
/// center sits half a block away from the nearest cell edge, the round trip is
/// exact for every cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordMap {
    block_size: f32,
    origin_col: i32,
    origin_row: i32,
}

impl CoordMap {
    /// `columns` centers the world horizontally; `max_height` puts world `y = 0`
    /// at the row just below the tallest column's surface band.
    pub fn new(block_size: f32, columns: u32, max_height: u32) -> Self {
        debug_assert!(block_size > 0.0, "block size must be positive");
        Self {
            block_size,
            origin_col: (columns / 2) as i32,
            origin_row: max_height as i32,
        }
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Center of a cell in world space.
    pub fn matrix_to_world(&self, pos: MatrixPos) -> WorldPos {
        WorldPos {
            x: ((pos.col as i64 - self.origin_col as i64) as f32 + 0.5) * self.block_size,
            y: ((pos.row as i64 - self.origin_row as i64) as f32 + 0.5) * self.block_size,
        }
    }

    /// The cell containing a world point. The result may be out of bounds;
    /// far, infinite and NaN coordinates saturate to cells no matrix contains.
    pub fn world_to_matrix(&self, p: WorldPos) -> MatrixPos {
        MatrixPos {
            col: cell_index(p.x, self.block_size, self.origin_col),
            row: cell_index(p.y, self.block_size, self.origin_row),
        }
    }

    /// World-space bounds of a cell.
    pub fn cell_bounds(&self, pos: MatrixPos) -> Aabb {
        let c = self.matrix_to_world(pos);
        let half = self.block_size * 0.5;
        Aabb {
            min: WorldPos::new(c.x - half, c.y - half),
            max: WorldPos::new(c.x + half, c.y + half),
        }
    }
}

fn cell_index(v: f32, block_size: f32, origin: i32) -> i32 {
    let cell = (v / block_size).floor();
    if cell.is_nan() {
        return i32::MIN;
    }
    // `as` saturates at the i32 range.
    (cell as i32).saturating_add(origin)
}
