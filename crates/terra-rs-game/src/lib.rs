//! Game logic: the simulation context, mining, placement, the drop economy,
//! and the player inventory.

pub mod components;
pub mod config;
pub mod drops;
pub mod error;
pub mod game_world;
pub mod inventory;
pub mod mining;
pub mod placement;
