//! Player inventory.
//!
//! The simulation talks to the inventory only through [`Inventory`]; the
//! hotbar below is the default implementation. Stacks fill existing slots of
//! the same item first, then empty slots, left to right.

use serde::Serialize;
use tracing::debug;

use terra_rs_world::item_registry::ItemKind;

/// What the drop economy and the placement path need from an inventory.
pub trait Inventory {
    /// Insert up to `quantity` units of `item`. Returns the leftover that did not fit.
    fn add_item(&mut self, item: ItemKind, quantity: u32) -> u32;

    /// Consume one unit of the selected stack and return its item.
    fn use_selected_item(&mut self) -> Option<ItemKind>;

    fn selected_item_type(&self) -> Option<ItemKind>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemStack {
    pub item: ItemKind,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemKind, count: u32) -> Self {
        Self { item, count }
    }

    /// Room left before the stack hits its item's cap.
    pub fn space(&self) -> u32 {
        self.item.max_stack_size().saturating_sub(self.count)
    }
}

/// A fixed row of slots with one selected.
#[derive(Debug, Clone)]
pub struct Hotbar {
    slots: Vec<Option<ItemStack>>,
    held_slot: usize,
}

impl Hotbar {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size.max(1)],
            held_slot: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn slots(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    pub fn held_slot(&self) -> usize {
        self.held_slot
    }

    /// Select a slot. Out-of-range indices are ignored.
    pub fn select(&mut self, slot: usize) -> bool {
        if slot >= self.slots.len() {
            return false;
        }
        self.held_slot = slot;
        true
    }

    pub fn get_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Overwrite a slot. Counts above the item's cap are clamped; zero clears it.
    pub fn set_slot(&mut self, slot: usize, stack: Option<ItemStack>) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = stack
                .filter(|st| st.count > 0)
                .map(|st| ItemStack::new(st.item, st.count.min(st.item.max_stack_size())));
        }
    }

    pub fn held_item(&self) -> Option<&ItemStack> {
        self.get_slot(self.held_slot)
    }

    /// Total units of `item` across every slot.
    pub fn count_of(&self, item: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item == item)
            .map(|s| s.count)
            .sum()
    }
}

impl Default for Hotbar {
    fn default() -> Self {
        Self::new(9)
    }
}

impl Inventory for Hotbar {
    fn add_item(&mut self, item: ItemKind, quantity: u32) -> u32 {
        let mut remaining = quantity;

        for stack in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if stack.item == item {
                let moved = stack.space().min(remaining);
                stack.count += moved;
                remaining -= moved;
            }
        }

        for slot in self.slots.iter_mut() {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let moved = item.max_stack_size().min(remaining);
                *slot = Some(ItemStack::new(item, moved));
                remaining -= moved;
            }
        }

        if remaining > 0 {
            debug!(?item, quantity, leftover = remaining, "hotbar full");
        }
        remaining
    }

    fn use_selected_item(&mut self) -> Option<ItemKind> {
        let slot = self.slots.get_mut(self.held_slot)?;
        let stack = slot.as_mut()?;
        let item = stack.item;
        stack.count -= 1;
        if stack.count == 0 {
            *slot = None;
        }
        Some(item)
    }

    fn selected_item_type(&self) -> Option<ItemKind> {
        self.held_item().map(|s| s.item)
    }
}
