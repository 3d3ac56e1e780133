//! ECS components for dropped items.

use std::fmt;

use bevy_ecs::prelude::*;

use terra_rs_world::coords::WorldPos;
use terra_rs_world::item_registry::ItemKind;

/// Stable identity of a drop, reported in events.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DropId(pub u64);

impl fmt::Display for DropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "drop#{}", self.0)
    }
}

/// An item stack lying in the world.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct ItemDrop {
    pub item: ItemKind,
    /// Always > 0 while the drop is live; zero means already consumed.
    pub quantity: u32,
    /// Simulation time (seconds) at which the drop was created.
    pub spawned_at: f64,
}

/// Position in world space.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl From<WorldPos> for Position {
    fn from(p: WorldPos) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Position> for WorldPos {
    fn from(p: Position) -> Self {
        WorldPos::new(p.x, p.y)
    }
}

/// Velocity in world units per second.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    /// Velocity of magnitude `speed` pointing from `from` to `to`. Zero when
    /// the points coincide.
    pub fn toward(from: WorldPos, to: WorldPos, speed: f32) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return Self::default();
        }
        Self {
            x: dx / len * speed,
            y: dy / len * speed,
        }
    }
}

/// Marker: this drop has been claimed by the player this tick.
#[derive(Component, Debug)]
pub struct PendingPickup;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toward_has_requested_speed() {
        let v = Velocity::toward(WorldPos::new(0.0, 0.0), WorldPos::new(3.0, 4.0), 10.0);
        assert!((v.x - 6.0).abs() < 1e-5);
        assert!((v.y - 8.0).abs() < 1e-5);
    }

    #[test]
    fn toward_self_is_zero() {
        let p = WorldPos::new(2.0, 2.0);
        assert_eq!(Velocity::toward(p, p, 50.0), Velocity::default());
    }
}
