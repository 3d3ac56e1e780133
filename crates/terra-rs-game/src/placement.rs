//! Read-only placement validation for the block preview and the place action.

use terra_rs_world::block_registry::BlockKind;
use terra_rs_world::coords::{MatrixPos, WorldPos};
use terra_rs_world::grid::WorldGrid;
use terra_rs_world::item_registry::ItemKind;

use crate::error::PlacementRejection;

/// The cell a valid placement would fill and what would go there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementTarget {
    pub pos: MatrixPos,
    pub kind: BlockKind,
}

#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator {
    reach: f32,
}

impl PlacementValidator {
    pub fn new(reach: f32) -> Self {
        Self { reach }
    }

    /// Check a placement without touching the grid. The caller consumes the
    /// inventory unit and calls `WorldGrid::place_block` on success.
    pub fn validate(
        &self,
        grid: &WorldGrid,
        player: WorldPos,
        pointer: WorldPos,
        selected: Option<ItemKind>,
    ) -> Result<PlacementTarget, PlacementRejection> {
        let item = selected.ok_or(PlacementRejection::NothingSelected)?;
        let kind = item
            .placeable_block()
            .ok_or(PlacementRejection::NotPlaceable(item))?;
        if player.distance(pointer) > self.reach {
            return Err(PlacementRejection::OutOfReach);
        }
        let pos = grid.world_to_matrix(pointer);
        grid.can_place(pos)?;
        Ok(PlacementTarget { pos, kind })
    }

    pub fn is_valid(
        &self,
        grid: &WorldGrid,
        player: WorldPos,
        pointer: WorldPos,
        selected: Option<ItemKind>,
    ) -> bool {
        self.validate(grid, player, pointer, selected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_rs_world::coords::CoordMap;
    use terra_rs_world::error::PlaceError;
    use terra_rs_world::flora::Flora;
    use terra_rs_world::terrain::BlockMatrix;

    fn grid() -> WorldGrid {
        let matrix = BlockMatrix::from_cells(
            6,
            4,
            (0..6).map(|c| (MatrixPos::new(c, 3), BlockKind::Stone)),
        );
        WorldGrid::new(matrix, CoordMap::new(32.0, 6, 2), Flora::new())
    }

    #[test]
    fn valid_target_above_floor() {
        let g = grid();
        let v = PlacementValidator::new(500.0);
        let cell = MatrixPos::new(2, 2);
        let p = g.matrix_to_world(cell);
        assert_eq!(
            v.validate(&g, p, p, Some(ItemKind::Wood)),
            Ok(PlacementTarget {
                pos: cell,
                kind: BlockKind::Wood,
            })
        );
        // Validation alone never changes the grid.
        assert_eq!(g.block_type_at(cell), None);
    }

    #[test]
    fn rejections() {
        let g = grid();
        let v = PlacementValidator::new(500.0);
        let floating = MatrixPos::new(2, 0);
        let p = g.matrix_to_world(floating);

        assert_eq!(
            v.validate(&g, p, p, None),
            Err(PlacementRejection::NothingSelected)
        );
        assert_eq!(
            v.validate(&g, p, p, Some(ItemKind::Berry)),
            Err(PlacementRejection::NotPlaceable(ItemKind::Berry))
        );
        assert_eq!(
            v.validate(&g, p, p, Some(ItemKind::Dirt)),
            Err(PlacementRejection::Cell(PlaceError::Unsupported(floating)))
        );
        let occupied = MatrixPos::new(0, 3);
        let q = g.matrix_to_world(occupied);
        assert_eq!(
            v.validate(&g, q, q, Some(ItemKind::Dirt)),
            Err(PlacementRejection::Cell(PlaceError::Occupied(occupied)))
        );
    }

    #[test]
    fn out_of_reach() {
        let g = grid();
        let v = PlacementValidator::new(40.0);
        let target = g.matrix_to_world(MatrixPos::new(4, 2));
        let player = g.matrix_to_world(MatrixPos::new(0, 2));
        assert_eq!(
            v.validate(&g, player, target, Some(ItemKind::Dirt)),
            Err(PlacementRejection::OutOfReach)
        );
        assert!(!v.is_valid(&g, player, target, Some(ItemKind::Dirt)));
    }
}
