//! Trees and bushes.
//!
//! Plants live outside the block matrix: they never occupy a cell, never
//! support a placed block, and are addressed only by `PlantId`.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use tracing::debug;

use crate::block_registry::{BlockKind, SoundKey};
use crate::capability::{Damageable, DropSpec, Hoverable, Mineable};
use crate::config::TerrainConfig;
use crate::coords::{Aabb, CoordMap, MatrixPos, WorldPos};
use crate::item_registry::ItemKind;
use crate::terrain::BlockMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlantId(pub u64);

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlantKind {
    Tree,
    Bush,
}

/// Static properties of a plant kind. Sizes are in blocks.
#[derive(Debug, Clone)]
pub struct PlantInfo {
    pub width: f32,
    pub height: f32,
    pub max_life: u32,
    pub drop: ItemKind,
    pub drop_quantity: u32,
    pub dig_sound: SoundKey,
    pub break_sound: SoundKey,
}

static TREE: PlantInfo = PlantInfo {
    width: 1.0,
    height: 4.0,
    max_life: 5,
    drop: ItemKind::Wood,
    drop_quantity: 3,
    dig_sound: SoundKey::DigWood,
    break_sound: SoundKey::BreakWood,
};

static BUSH: PlantInfo = PlantInfo {
    width: 1.0,
    height: 1.0,
    max_life: 1,
    drop: ItemKind::Berry,
    drop_quantity: 1,
    dig_sound: SoundKey::Rustle,
    break_sound: SoundKey::Rustle,
};

impl PlantKind {
    pub fn info(self) -> &'static PlantInfo {
        match self {
            PlantKind::Tree => &TREE,
            PlantKind::Bush => &BUSH,
        }
    }
}

/// A tree or bush standing at `base`, the bottom-center of its trunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Plant {
    pub id: PlantId,
    pub kind: PlantKind,
    pub base: WorldPos,
    life: u32,
}

impl Plant {
    pub fn new(id: PlantId, kind: PlantKind, base: WorldPos) -> Self {
        Self {
            id,
            kind,
            base,
            life: kind.info().max_life,
        }
    }
}

impl Damageable for Plant {
    fn life(&self) -> u32 {
        self.life
    }

    fn max_life(&self) -> u32 {
        self.kind.info().max_life
    }

    fn apply_damage(&mut self, amount: u32) -> u32 {
        self.life = self.life.saturating_sub(amount);
        self.life
    }
}

impl Mineable for Plant {
    /// Drops appear half a block above the base.
    fn drop_spec(&self, coords: &CoordMap) -> DropSpec {
        let info = self.kind.info();
        DropSpec {
            item: info.drop,
            quantity: info.drop_quantity,
            position: WorldPos::new(self.base.x, self.base.y - coords.block_size() * 0.5),
        }
    }

    fn dig_sound(&self) -> SoundKey {
        self.kind.info().dig_sound
    }

    fn break_sound(&self) -> SoundKey {
        self.kind.info().break_sound
    }
}

impl Hoverable for Plant {
    fn bounds(&self, coords: &CoordMap) -> Aabb {
        let info = self.kind.info();
        let half_w = info.width * coords.block_size() * 0.5;
        let h = info.height * coords.block_size();
        Aabb {
            min: WorldPos::new(self.base.x - half_w, self.base.y - h),
            max: WorldPos::new(self.base.x + half_w, self.base.y),
        }
    }
}

/// Identity-keyed plant collection. Iteration follows id order.
#[derive(Debug, Default)]
pub struct Flora {
    plants: BTreeMap<PlantId, Plant>,
    next_id: u64,
}

impl Flora {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plant and return its id.
    pub fn insert(&mut self, kind: PlantKind, base: WorldPos) -> PlantId {
        let id = PlantId(self.next_id);
        self.next_id += 1;
        self.plants.insert(id, Plant::new(id, kind, base));
        id
    }

    pub fn get(&self, id: PlantId) -> Option<&Plant> {
        self.plants.get(&id)
    }

    pub fn get_mut(&mut self, id: PlantId) -> Option<&mut Plant> {
        self.plants.get_mut(&id)
    }

    pub fn remove(&mut self, id: PlantId) -> Option<Plant> {
        self.plants.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plant> {
        self.plants.values()
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

/// Scatter trees and bushes on grass surface cells, at most one per column.
pub fn scatter_flora<R: Rng + ?Sized>(
    matrix: &BlockMatrix,
    coords: &CoordMap,
    config: &TerrainConfig,
    rng: &mut R,
) -> Flora {
    let mut flora = Flora::new();
    let half = coords.block_size() * 0.5;

    for col in 0..matrix.columns() as i32 {
        let Some(surface) = matrix.surface_row(col) else {
            continue;
        };
        let surface_pos = MatrixPos::new(col, surface);
        if matrix.get(surface_pos) != Some(BlockKind::Grass) {
            continue;
        }

        let roll: f64 = rng.gen();
        let kind = if roll < config.tree_chance {
            PlantKind::Tree
        } else if roll < config.tree_chance + config.bush_chance {
            PlantKind::Bush
        } else {
            continue;
        };

        let top = coords.matrix_to_world(surface_pos);
        flora.insert(kind, WorldPos::new(top.x, top.y - half));
    }

    debug!(plants = flora.len(), "scattered flora");
    flora
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat_matrix(columns: u32) -> BlockMatrix {
        BlockMatrix::from_cells(
            columns,
            3,
            (0..columns as i32).flat_map(|c| {
                [
                    (MatrixPos::new(c, 1), BlockKind::Grass),
                    (MatrixPos::new(c, 2), BlockKind::Dirt),
                ]
            }),
        )
    }

    #[test]
    fn ids_are_unique_and_ordered() {
        let mut flora = Flora::new();
        let a = flora.insert(PlantKind::Tree, WorldPos::default());
        let b = flora.insert(PlantKind::Bush, WorldPos::default());
        assert!(a < b);
        let ids: Vec<_> = flora.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn tree_bounds_stand_on_base() {
        let coords = CoordMap::new(10.0, 4, 0);
        let tree = Plant::new(PlantId(0), PlantKind::Tree, WorldPos::new(5.0, 0.0));
        let b = tree.bounds(&coords);
        assert_eq!(b.min, WorldPos::new(0.0, -40.0));
        assert_eq!(b.max, WorldPos::new(10.0, 0.0));
        assert!(b.contains(WorldPos::new(5.0, -1.0)));
        assert!(!b.contains(WorldPos::new(5.0, 1.0)));
    }

    #[test]
    fn tree_drops_wood() {
        let coords = CoordMap::new(10.0, 4, 0);
        let tree = Plant::new(PlantId(0), PlantKind::Tree, WorldPos::new(5.0, 0.0));
        let spec = tree.drop_spec(&coords);
        assert_eq!(spec.item, ItemKind::Wood);
        assert_eq!(spec.quantity, 3);
        assert_eq!(spec.position, WorldPos::new(5.0, -5.0));
    }

    #[test]
    fn always_tree_fills_every_grass_column() {
        let matrix = flat_matrix(8);
        let coords = CoordMap::new(32.0, 8, 2);
        let cfg = TerrainConfig {
            tree_chance: 1.0,
            bush_chance: 0.0,
            ..Default::default()
        };
        let flora = scatter_flora(&matrix, &coords, &cfg, &mut StdRng::seed_from_u64(0));
        assert_eq!(flora.len(), 8);
        for plant in flora.iter() {
            assert_eq!(plant.kind, PlantKind::Tree);
            // Base sits on the top edge of the grass cell.
            let grass = coords.world_to_matrix(WorldPos::new(plant.base.x, plant.base.y + 1.0));
            assert_eq!(matrix.get(grass), Some(BlockKind::Grass));
        }
    }

    #[test]
    fn no_flora_when_chances_are_zero() {
        let matrix = flat_matrix(8);
        let coords = CoordMap::new(32.0, 8, 2);
        let cfg = TerrainConfig {
            tree_chance: 0.0,
            bush_chance: 0.0,
            ..Default::default()
        };
        let flora = scatter_flora(&matrix, &coords, &cfg, &mut StdRng::seed_from_u64(0));
        assert!(flora.is_empty());
    }

    #[test]
    fn plants_skip_non_grass_surfaces() {
        let matrix = BlockMatrix::from_cells(2, 2, [
            (MatrixPos::new(0, 0), BlockKind::Stone),
            (MatrixPos::new(1, 1), BlockKind::Grass),
        ]);
        let coords = CoordMap::new(32.0, 2, 1);
        let cfg = TerrainConfig {
            tree_chance: 0.0,
            bush_chance: 1.0,
            ..Default::default()
        };
        let flora = scatter_flora(&matrix, &coords, &cfg, &mut StdRng::seed_from_u64(0));
        assert_eq!(flora.len(), 1);
        let bush = flora.iter().next().unwrap();
        assert_eq!(bush.kind, PlantKind::Bush);
        assert_eq!(coords.world_to_matrix(bush.base).col, 1);
    }
}
