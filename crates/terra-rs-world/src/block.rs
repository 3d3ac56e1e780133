//! Block entities and their neighbor snapshots.

use crate::block_registry::{BlockKind, SoundKey};
use crate::capability::{Damageable, DropSpec, Hoverable, Mineable};
use crate::coords::{Aabb, CoordMap, MatrixPos, Side};

/// Occupancy of the four axis-adjacent cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Neighbors {
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    pub fn set(&mut self, side: Side, occupied: bool) {
        match side {
            Side::Left => self.left = occupied,
            Side::Right => self.right = occupied,
            Side::Top => self.top = occupied,
            Side::Bottom => self.bottom = occupied,
        }
    }

    pub fn count(&self) -> usize {
        Side::ALL.iter().filter(|&&s| self.get(s)).count()
    }

    /// Visual variant implied by the snapshot. Only exposed blocks slope.
    pub fn shape(&self) -> SurfaceShape {
        if self.top {
            return SurfaceShape::Flat;
        }
        match (self.left, self.right) {
            (true, true) => SurfaceShape::Flat,
            (false, true) => SurfaceShape::SlopeLeft,
            (true, false) => SurfaceShape::SlopeRight,
            (false, false) => SurfaceShape::Peak,
        }
    }
}

/// Sprite variant picked from a neighbor snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceShape {
    Flat,
    /// Falls away toward the left.
    SlopeLeft,
    /// Falls away toward the right.
    SlopeRight,
    /// Exposed on top and both sides.
    Peak,
}

/// A live block. Owned by `WorldGrid`, which is the only place it is created or
/// destroyed; `pos` is a back-reference into the matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub pos: MatrixPos,
    pub neighbors: Neighbors,
    life: u32,
    max_life: u32,
}

impl Block {
    pub(crate) fn new(kind: BlockKind, pos: MatrixPos, neighbors: Neighbors) -> Self {
        let max_life = kind.info().max_life;
        Self {
            kind,
            pos,
            neighbors,
            life: max_life,
            max_life,
        }
    }

    pub fn shape(&self) -> SurfaceShape {
        self.neighbors.shape()
    }
}

impl Damageable for Block {
    fn life(&self) -> u32 {
        self.life
    }

    fn max_life(&self) -> u32 {
        self.max_life
    }

    fn apply_damage(&mut self, amount: u32) -> u32 {
        self.life = self.life.saturating_sub(amount);
        self.life
    }
}

impl Mineable for Block {
    fn drop_spec(&self, coords: &CoordMap) -> DropSpec {
        let info = self.kind.info();
        DropSpec {
            item: info.drop,
            quantity: info.drop_quantity,
            position: coords.matrix_to_world(self.pos),
        }
    }

    fn dig_sound(&self) -> SoundKey {
        self.kind.info().dig_sound
    }

    fn break_sound(&self) -> SoundKey {
        self.kind.info().break_sound
    }
}

impl Hoverable for Block {
    fn bounds(&self, coords: &CoordMap) -> Aabb {
        coords.cell_bounds(self.pos)
    }
}
