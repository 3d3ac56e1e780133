//! Capabilities shared by every minable world entity.

use crate::block_registry::SoundKey;
use crate::coords::{Aabb, CoordMap, WorldPos};
use crate::item_registry::ItemKind;

/// What a destroyed entity leaves behind, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropSpec {
    pub item: ItemKind,
    pub quantity: u32,
    pub position: WorldPos,
}

/// Something with life that can be worn down.
pub trait Damageable {
    fn life(&self) -> u32;

    fn max_life(&self) -> u32;

    /// Subtract `amount` (saturating at zero) and return the remaining life.
    fn apply_damage(&mut self, amount: u32) -> u32;

    fn is_destroyed(&self) -> bool {
        self.life() == 0
    }
}

/// Something the mining controller can target.
pub trait Mineable: Damageable {
    fn drop_spec(&self, coords: &CoordMap) -> DropSpec;

    fn dig_sound(&self) -> SoundKey;

    fn break_sound(&self) -> SoundKey;
}

/// Something the rendering layer can outline under the pointer.
pub trait Hoverable {
    fn bounds(&self, coords: &CoordMap) -> Aabb;
}
