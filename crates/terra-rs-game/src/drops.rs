//! Item drop economy: peer merging, player pickup, motion, despawn.
//!
//! Drops are ECS entities (`DropId`, `ItemDrop`, `Position`, `Velocity`). Only
//! the systems in this module mutate them; everything else goes through
//! [`DropEconomy::spawn`].

use std::collections::HashSet;

use bevy_ecs::prelude::*;
use bevy_ecs::query::Has;
use tracing::{debug, trace};

use terra_rs_world::block_registry::SoundKey;
use terra_rs_world::coords::WorldPos;
use terra_rs_world::item_registry::ItemKind;

use crate::components::{DropId, ItemDrop, PendingPickup, Position, Velocity};
use crate::config::DropConfig;
use crate::game_world::{emit, DropIdAllocator, GameEvent, SimClock};
use crate::inventory::Inventory;

/// Read-only view of a live drop, for rendering and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropSnapshot {
    pub id: DropId,
    pub item: ItemKind,
    pub quantity: u32,
    pub position: WorldPos,
    pub velocity: Velocity,
    pub age: f64,
}

/// Per-tick copy of the fields the phases read.
#[derive(Debug, Clone, Copy)]
struct DropView {
    entity: Entity,
    id: DropId,
    item: ItemKind,
    quantity: u32,
    pos: WorldPos,
    age: f64,
    pending: bool,
}

impl DropView {
    fn is_active(&self) -> bool {
        !self.pending && self.quantity > 0
    }
}

pub struct DropEconomy {
    config: DropConfig,
}

impl DropEconomy {
    pub fn new(config: DropConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DropConfig {
        &self.config
    }

    /// Create a drop. A zero quantity creates nothing.
    pub fn spawn(
        &self,
        world: &mut World,
        item: ItemKind,
        quantity: u32,
        position: WorldPos,
    ) -> Option<DropId> {
        if quantity == 0 {
            return None;
        }
        let id = world.resource::<DropIdAllocator>().allocate();
        let now = world.resource::<SimClock>().elapsed;
        world.spawn((
            id,
            ItemDrop {
                item,
                quantity,
                spawned_at: now,
            },
            Position::from(position),
            Velocity::default(),
        ));
        emit(
            world,
            GameEvent::DropSpawned {
                id,
                item,
                quantity,
                position,
            },
        );
        debug!(%id, ?item, quantity, "drop spawned");
        Some(id)
    }

    /// Run every drop phase for one frame, in order.
    pub fn tick<I: Inventory + ?Sized>(
        &self,
        world: &mut World,
        inventory: &mut I,
        player: WorldPos,
        dt: f32,
    ) {
        system_purge_consumed(world);
        self.merge_phase(world, player);
        self.pickup_phase(world, inventory, player, dt);
        if self.config.integrate_motion {
            system_integrate_motion(world, dt, self.config.damping);
        }
        system_expire(world, self.config.despawn_after);
    }

    /// Live drops ordered by id.
    pub fn snapshot(world: &mut World) -> Vec<DropSnapshot> {
        let now = world.resource::<SimClock>().elapsed;
        let mut query = world.query::<(&DropId, &ItemDrop, &Position, &Velocity)>();
        let mut out: Vec<DropSnapshot> = query
            .iter(world)
            .filter(|(_, drop, _, _)| drop.quantity > 0)
            .map(|(id, drop, pos, vel)| DropSnapshot {
                id: *id,
                item: drop.item,
                quantity: drop.quantity,
                position: (*pos).into(),
                velocity: *vel,
                age: now - drop.spawned_at,
            })
            .collect();
        out.sort_by_key(|d| d.id);
        out
    }

    /// One predicate for "the player owns this drop", shared by both phases.
    fn in_player_range(&self, drop: &DropView, player: WorldPos) -> bool {
        drop.age >= self.config.pickup_cooldown
            && drop.pos.distance(player) <= self.config.pickup_radius
    }

    fn merge_phase(&self, world: &mut World, player: WorldPos) {
        let drops = collect_views(world);
        let mut claimed: HashSet<Entity> = HashSet::new();
        let mut merges: Vec<(DropView, DropView)> = Vec::new();
        let mut steering: Vec<(Entity, Velocity)> = Vec::new();

        // Both sides of a merge must be past their creation cooldown.
        for drop in drops
            .iter()
            .filter(|d| d.is_active() && d.age >= self.config.merge_cooldown)
        {
            if claimed.contains(&drop.entity) {
                continue;
            }

            let eligible = |other: &&DropView| {
                other.entity != drop.entity
                    && other.item == drop.item
                    && other.is_active()
                    && other.age >= self.config.merge_cooldown
            };

            let candidate = drops
                .iter()
                .filter(eligible)
                .filter(|o| !claimed.contains(&o.entity))
                .map(|o| (o, o.pos.distance(drop.pos)))
                .filter(|(_, d)| *d <= self.config.merge_radius)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((target, _)) = candidate {
                claimed.insert(drop.entity);
                claimed.insert(target.entity);
                merges.push((*drop, *target));
                continue;
            }

            if self.in_player_range(drop, player) {
                continue;
            }

            let nearest = drops
                .iter()
                .filter(eligible)
                .map(|o| (o, o.pos.distance(drop.pos)))
                .filter(|(_, d)| *d <= self.config.attraction_radius)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((peer, _)) = nearest {
                steering.push((
                    drop.entity,
                    Velocity::toward(drop.pos, peer.pos, self.config.attraction_speed),
                ));
            }
        }

        for (entity, v) in steering {
            if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
                *vel = v;
            }
        }
        apply_merges(world, &merges);
    }

    fn pickup_phase<I: Inventory + ?Sized>(
        &self,
        world: &mut World,
        inventory: &mut I,
        player: WorldPos,
        dt: f32,
    ) {
        let mut collected = Vec::new();
        for drop in collect_views(world)
            .into_iter()
            .filter(|d| d.is_active() && self.in_player_range(d, player))
        {
            let distance = drop.pos.distance(player);
            // Never step past the player in one frame.
            let speed = self.config.pull_speed.min(distance / dt.max(f32::EPSILON));
            if let Some(mut vel) = world.get_mut::<Velocity>(drop.entity) {
                *vel = Velocity::toward(drop.pos, player, speed);
            }
            if distance <= self.config.pickup_distance {
                world.entity_mut(drop.entity).insert(PendingPickup);
                collected.push(drop);
            }
        }

        for drop in collected {
            world.despawn(drop.entity);
            let leftover = inventory.add_item(drop.item, drop.quantity).min(drop.quantity);
            let absorbed = drop.quantity - leftover;

            if absorbed > 0 {
                let scale = feedback_scale(absorbed);
                emit(
                    world,
                    GameEvent::DropPickedUp {
                        id: drop.id,
                        item: drop.item,
                        quantity: absorbed,
                    },
                );
                emit(
                    world,
                    GameEvent::PlaySound {
                        sound: SoundKey::Pickup,
                        volume: (0.5 + 0.05 * absorbed as f32).min(1.0),
                    },
                );
                emit(
                    world,
                    GameEvent::FloatingText {
                        text: format!("+{absorbed} {}", drop.item.name()),
                        position: player,
                        scale,
                    },
                );
            }
            debug!(id = %drop.id, item = ?drop.item, absorbed, leftover, "drop picked up");

            if leftover > 0 {
                self.spawn(world, drop.item, leftover, player);
            }
        }
    }
}

/// Label size for a pickup of `quantity` units.
fn feedback_scale(quantity: u32) -> f32 {
    (1.0 + quantity.saturating_sub(1) as f32 * 0.05).min(1.5)
}

fn collect_views(world: &mut World) -> Vec<DropView> {
    let now = world.resource::<SimClock>().elapsed;
    let mut query = world.query::<(Entity, &DropId, &ItemDrop, &Position, Has<PendingPickup>)>();
    let mut views: Vec<DropView> = query
        .iter(world)
        .map(|(entity, id, drop, pos, pending)| DropView {
            entity,
            id: *id,
            item: drop.item,
            quantity: drop.quantity,
            pos: (*pos).into(),
            age: now - drop.spawned_at,
            pending,
        })
        .collect();
    views.sort_by_key(|v| v.id);
    views
}

/// Transfer each source's quantity into its target. Pairs whose target went
/// inactive since the scan are skipped.
fn apply_merges(world: &mut World, merges: &[(DropView, DropView)]) {
    for (source, target) in merges {
        let Some(src) = world.get::<ItemDrop>(source.entity).copied() else {
            continue;
        };
        if src.quantity == 0 || world.get::<PendingPickup>(target.entity).is_some() {
            continue;
        }
        let total = {
            let Some(mut tgt) = world.get_mut::<ItemDrop>(target.entity) else {
                continue;
            };
            if tgt.quantity == 0 {
                continue;
            }
            tgt.quantity += src.quantity;
            tgt.quantity
        };
        world.despawn(source.entity);
        emit(
            world,
            GameEvent::DropMerged {
                source: source.id,
                target: target.id,
                quantity: total,
            },
        );
        debug!(source = %source.id, target = %target.id, total, "drops merged");
    }
}

// ---------------------------------------------------------------------------
// Systems (manual, called by DropEconomy::tick)
// ---------------------------------------------------------------------------

/// Drops with no quantity left are already spent; remove them silently.
fn system_purge_consumed(world: &mut World) {
    let spent: Vec<Entity> = world
        .query::<(Entity, &ItemDrop)>()
        .iter(world)
        .filter(|(_, drop)| drop.quantity == 0)
        .map(|(entity, _)| entity)
        .collect();
    for entity in spent {
        world.despawn(entity);
    }
}

fn system_integrate_motion(world: &mut World, dt: f32, damping: f32) {
    let keep = (1.0 - damping * dt).max(0.0);
    let mut query = world.query::<(&mut Position, &mut Velocity)>();
    for (mut pos, mut vel) in query.iter_mut(world) {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
        vel.x *= keep;
        vel.y *= keep;
    }
}

fn system_expire(world: &mut World, despawn_after: f64) {
    let now = world.resource::<SimClock>().elapsed;
    let expired: Vec<(Entity, DropId)> = world
        .query::<(Entity, &DropId, &ItemDrop)>()
        .iter(world)
        .filter(|(_, _, drop)| now - drop.spawned_at >= despawn_after)
        .map(|(entity, id, _)| (entity, *id))
        .collect();
    for (entity, id) in expired {
        world.despawn(entity);
        emit(world, GameEvent::DropExpired { id });
        trace!(%id, "drop expired");
    }
}
