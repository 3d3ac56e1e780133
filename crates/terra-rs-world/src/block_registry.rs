//! Block property registry.
//!
//! Maps each `BlockKind` to its durability, drop, and sound keys. Every kind
//! the terrain builder or the player can produce has an entry.

use serde::{Deserialize, Serialize};

use crate::item_registry::ItemKind;

/// Closed set of block types that can occupy a matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Grass,
    Dirt,
    Stone,
    Wood,
}

/// Sound keys handed to the audio layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundKey {
    DigSoft,
    DigHard,
    DigWood,
    BreakSoft,
    BreakHard,
    BreakWood,
    Place,
    Pickup,
    Rustle,
}

/// Properties for a single block type.
#[derive(Debug, Clone)]
pub struct BlockInfo {
    pub kind: BlockKind,
    pub name: &'static str,
    /// Hits needed to destroy the block at the default mining damage.
    pub max_life: u32,
    /// Item dropped when the block is destroyed.
    pub drop: ItemKind,
    pub drop_quantity: u32,
    /// Played on every mining hit.
    pub dig_sound: SoundKey,
    /// Played when the block is destroyed.
    pub break_sound: SoundKey,
}

macro_rules! block {
    ($kind:ident, $name:expr, life: $life:expr, drops: $drop:ident x $qty:expr, $dig:ident / $brk:ident) => {
        BlockInfo {
            kind: BlockKind::$kind,
            name: $name,
            max_life: $life,
            drop: ItemKind::$drop,
            drop_quantity: $qty,
            dig_sound: SoundKey::$dig,
            break_sound: SoundKey::$brk,
        }
    };
}

static BLOCK_DATA: &[BlockInfo] = &[
    block!(Grass, "grass", life: 2, drops: Dirt x 1, DigSoft / BreakSoft),
    block!(Dirt, "dirt", life: 2, drops: Dirt x 1, DigSoft / BreakSoft),
    block!(Stone, "stone", life: 4, drops: Stone x 1, DigHard / BreakHard),
    block!(Wood, "wood", life: 3, drops: Wood x 1, DigWood / BreakWood),
];

impl BlockKind {
    pub const ALL: [BlockKind; 4] = [
        BlockKind::Grass,
        BlockKind::Dirt,
        BlockKind::Stone,
        BlockKind::Wood,
    ];

    /// Static properties for this kind.
    pub fn info(self) -> &'static BlockInfo {
        // BLOCK_DATA is ordered like the enum.
        &BLOCK_DATA[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}
