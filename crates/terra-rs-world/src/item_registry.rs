//! Item registry: stack sizes, display names, and which items place blocks.

use serde::{Deserialize, Serialize};

use crate::block_registry::BlockKind;

/// Closed set of item types that can exist as drops or inventory stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Dirt,
    Stone,
    Wood,
    Berry,
}

/// Properties for a single item type.
#[derive(Debug, Clone)]
pub struct ItemInfo {
    pub kind: ItemKind,
    pub name: &'static str,
    pub max_stack_size: u32,
    /// The block this item places, if any.
    pub places: Option<BlockKind>,
}

static ITEM_DATA: &[ItemInfo] = &[
    ItemInfo {
        kind: ItemKind::Dirt,
        name: "dirt",
        max_stack_size: 64,
        places: Some(BlockKind::Dirt),
    },
    ItemInfo {
        kind: ItemKind::Stone,
        name: "stone",
        max_stack_size: 64,
        places: Some(BlockKind::Stone),
    },
    ItemInfo {
        kind: ItemKind::Wood,
        name: "wood",
        max_stack_size: 64,
        places: Some(BlockKind::Wood),
    },
    ItemInfo {
        kind: ItemKind::Berry,
        name: "berry",
        max_stack_size: 16,
        places: None,
    },
];

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [
        ItemKind::Dirt,
        ItemKind::Stone,
        ItemKind::Wood,
        ItemKind::Berry,
    ];

    pub fn info(self) -> &'static ItemInfo {
        &ITEM_DATA[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn max_stack_size(self) -> u32 {
        self.info().max_stack_size
    }

    /// The block kind this item places, or `None` for non-placeable items.
    pub fn placeable_block(self) -> Option<BlockKind> {
        self.info().places
    }
}
