//! Simulation context: the grid, the drop ECS world, the inventory, the mining
//! controller, the clock, and the outbound event queue.

use std::sync::atomic::{AtomicU64, Ordering};

use bevy_ecs::prelude::*;
use tracing::debug;

use terra_rs_world::block::{Block, Neighbors, SurfaceShape};
use terra_rs_world::block_registry::{BlockKind, SoundKey};
use terra_rs_world::coords::{Aabb, MatrixPos, WorldPos};
use terra_rs_world::flora::{PlantId, PlantKind};
use terra_rs_world::grid::{GridEvent, WorldGrid};
use terra_rs_world::item_registry::ItemKind;

use crate::components::DropId;
use crate::config::GameConfig;
use crate::drops::{DropEconomy, DropSnapshot};
use crate::error::PlacementRejection;
use crate::inventory::{Hotbar, Inventory};
use crate::mining::{MineTarget, MiningController, MiningOutcome, MiningState};
use crate::placement::{PlacementTarget, PlacementValidator};

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Outgoing events queued during a tick for the rendering and audio layers.
#[derive(Resource, Default)]
pub struct OutgoingEvents {
    pub events: Vec<GameEvent>,
}

/// Frame counter and simulation time in seconds.
#[derive(Resource, Debug, Default)]
pub struct SimClock {
    pub tick: u64,
    pub elapsed: f64,
}

/// Drop ID allocator.
#[derive(Resource)]
pub struct DropIdAllocator {
    next: AtomicU64,
}

impl DropIdAllocator {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }

    pub fn allocate(&self) -> DropId {
        DropId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Next ID that will be allocated.
    pub fn current(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

pub(crate) fn emit(world: &mut World, event: GameEvent) {
    world.resource_mut::<OutgoingEvents>().events.push(event);
}

// ---------------------------------------------------------------------------
// Game events (core -> rendering/audio)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    BlockPlaced {
        pos: MatrixPos,
        kind: BlockKind,
        shape: SurfaceShape,
    },
    BlockDestroyed {
        pos: MatrixPos,
        kind: BlockKind,
    },
    /// An adjacent cell changed; re-pick the sprite.
    BlockReshaped {
        pos: MatrixPos,
        neighbors: Neighbors,
        shape: SurfaceShape,
    },
    BlockDamaged {
        pos: MatrixPos,
        life: u32,
        max_life: u32,
    },
    PlantDamaged {
        id: PlantId,
        life: u32,
        max_life: u32,
    },
    PlantFelled {
        id: PlantId,
        kind: PlantKind,
    },
    DropSpawned {
        id: DropId,
        item: ItemKind,
        quantity: u32,
        position: WorldPos,
    },
    /// `quantity` is the target's new total.
    DropMerged {
        source: DropId,
        target: DropId,
        quantity: u32,
    },
    DropPickedUp {
        id: DropId,
        item: ItemKind,
        quantity: u32,
    },
    DropExpired {
        id: DropId,
    },
    PlaySound {
        sound: SoundKey,
        volume: f32,
    },
    FloatingText {
        text: String,
        position: WorldPos,
        scale: f32,
    },
}

impl From<GridEvent> for GameEvent {
    fn from(event: GridEvent) -> Self {
        match event {
            GridEvent::Placed {
                pos,
                kind,
                neighbors,
            } => GameEvent::BlockPlaced {
                pos,
                kind,
                shape: neighbors.shape(),
            },
            GridEvent::Removed { pos, kind } => GameEvent::BlockDestroyed { pos, kind },
            GridEvent::Reshaped { pos, neighbors } => GameEvent::BlockReshaped {
                pos,
                neighbors,
                shape: neighbors.shape(),
            },
            GridEvent::PlantRemoved { id, kind } => GameEvent::PlantFelled { id, kind },
        }
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Everything the core reads from the input and camera adapters for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInput {
    pub dt: f32,
    /// Pointer in world space.
    pub pointer: WorldPos,
    pub player: WorldPos,
    pub mine_held: bool,
    pub place_pressed: bool,
}

// ---------------------------------------------------------------------------
// GameWorld
// ---------------------------------------------------------------------------

pub struct GameWorld<I: Inventory = Hotbar> {
    /// Drop entities plus the clock, ID allocator, and event resources.
    pub world: World,
    pub grid: WorldGrid,
    pub inventory: I,
    config: GameConfig,
    mining: MiningController,
    placement: PlacementValidator,
    drops: DropEconomy,
}

impl GameWorld<Hotbar> {
    pub fn with_hotbar(grid: WorldGrid, config: GameConfig) -> Self {
        let hotbar = Hotbar::new(config.player.hotbar_slots);
        Self::new(grid, hotbar, config)
    }
}

impl<I: Inventory> GameWorld<I> {
    pub fn new(grid: WorldGrid, inventory: I, config: GameConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(OutgoingEvents::default());
        world.insert_resource(SimClock::default());
        world.insert_resource(DropIdAllocator::new(1));

        Self {
            world,
            grid,
            inventory,
            mining: MiningController::new(config.mining.clone()),
            placement: PlacementValidator::new(config.player.reach),
            drops: DropEconomy::new(config.drops.clone()),
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Run one frame: clock, mining, placement, then the drop economy.
    pub fn tick(&mut self, input: &TickInput) {
        {
            let mut clock = self.world.resource_mut::<SimClock>();
            clock.tick += 1;
            clock.elapsed += f64::from(input.dt);
        }

        let in_reach = input.player.distance(input.pointer) <= self.config.player.reach;
        let mine_pointer = (input.mine_held && in_reach).then_some(input.pointer);
        let outcome = self.mining.update(&mut self.grid, mine_pointer, input.dt);
        self.flush_grid_events();
        if let Some(outcome) = outcome {
            self.apply_mining_outcome(outcome);
        }

        if input.place_pressed {
            if let Err(reason) = self.place(input.player, input.pointer) {
                debug!(%reason, "placement skipped");
            }
        }

        self.drops.tick(&mut self.world, &mut self.inventory, input.player, input.dt);
    }

    /// Drain all pending outgoing events.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.world.resource_mut::<OutgoingEvents>().events)
    }

    pub fn current_tick(&self) -> u64 {
        self.world.resource::<SimClock>().tick
    }

    pub fn elapsed(&self) -> f64 {
        self.world.resource::<SimClock>().elapsed
    }

    pub fn mining_state(&self) -> MiningState {
        self.mining.state()
    }

    /// Read-only preview check for the block under the pointer.
    pub fn can_place_at(
        &self,
        player: WorldPos,
        pointer: WorldPos,
    ) -> Result<PlacementTarget, PlacementRejection> {
        self.placement.validate(
            &self.grid,
            player,
            pointer,
            self.inventory.selected_item_type(),
        )
    }

    /// Validate, consume one unit of the selected item, and place its block.
    pub fn place(
        &mut self,
        player: WorldPos,
        pointer: WorldPos,
    ) -> Result<Block, PlacementRejection> {
        let target = self.can_place_at(player, pointer)?;
        let item = self
            .inventory
            .use_selected_item()
            .ok_or(PlacementRejection::NothingSelected)?;
        match self.grid.place_block(target.pos, target.kind) {
            Ok(block) => {
                self.flush_grid_events();
                emit(
                    &mut self.world,
                    GameEvent::PlaySound {
                        sound: SoundKey::Place,
                        volume: 1.0,
                    },
                );
                Ok(block)
            }
            Err(e) => {
                self.inventory.add_item(item, 1);
                Err(e.into())
            }
        }
    }

    /// Outline of the mine target under the pointer.
    pub fn hover_bounds(&self, pointer: WorldPos) -> Option<Aabb> {
        MineTarget::at(&self.grid, pointer)?.bounds(&self.grid)
    }

    pub fn spawn_drop(
        &mut self,
        item: ItemKind,
        quantity: u32,
        position: WorldPos,
    ) -> Option<DropId> {
        self.drops.spawn(&mut self.world, item, quantity, position)
    }

    /// Live drops ordered by id.
    pub fn drops(&mut self) -> Vec<DropSnapshot> {
        DropEconomy::snapshot(&mut self.world)
    }

    fn apply_mining_outcome(&mut self, outcome: MiningOutcome) {
        match outcome {
            MiningOutcome::Hit {
                target,
                life,
                max_life,
                sound,
            } => {
                let event = match target {
                    MineTarget::Block(pos) => GameEvent::BlockDamaged {
                        pos,
                        life,
                        max_life,
                    },
                    MineTarget::Plant(id) => GameEvent::PlantDamaged { id, life, max_life },
                };
                emit(&mut self.world, event);
                emit(&mut self.world, GameEvent::PlaySound { sound, volume: 1.0 });
            }
            MiningOutcome::Destroyed { drop, sound, .. } => {
                emit(&mut self.world, GameEvent::PlaySound { sound, volume: 1.0 });
                self.drops.spawn(&mut self.world, drop.item, drop.quantity, drop.position);
            }
        }
    }

    fn flush_grid_events(&mut self) {
        let events = self.grid.drain_events();
        self.world
            .resource_mut::<OutgoingEvents>()
            .events
            .extend(events.into_iter().map(GameEvent::from));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
