//! Game-level rejections.

use thiserror::Error;

use terra_rs_world::error::PlaceError;
use terra_rs_world::item_registry::ItemKind;

/// Why the block preview is not drawn / the placement did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementRejection {
    #[error("no item selected")]
    NothingSelected,

    #[error("{0:?} does not place a block")]
    NotPlaceable(ItemKind),

    #[error("pointer is out of reach")]
    OutOfReach,

    #[error(transparent)]
    Cell(#[from] PlaceError),
}
