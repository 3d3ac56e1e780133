//! World model: terrain generation, the block grid, plants, and coordinates.

pub mod block;
pub mod block_registry;
pub mod capability;
pub mod config;
pub mod coords;
pub mod error;
pub mod flora;
pub mod grid;
pub mod heightmap;
pub mod item_registry;
pub mod terrain;
