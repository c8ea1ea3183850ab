//! Use-item requests
//!
//! A client asks to use the item in `(bag, slot)`. The item's spell is cast
//! on the user, which is how food, drink and similar consumables put their
//! auras on a unit.

use bevy::prelude::*;
use bytes::Buf;
use std::collections::HashMap;

use crate::aura::SpellId;

use super::events::{CastSpellRequest, UseItemPacket};

/// Bag index the client sends for the backpack itself.
pub const CLIENT_BACKPACK_BAG: u8 = 0xFF;
/// Bag index the inventory stores backpack items under.
pub const BACKPACK_BAG: u8 = 19;

/// Decoded use-item request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UseItemRequest {
    pub bag: u8,
    pub slot: u8,
}

impl UseItemRequest {
    /// Parse the leading `(bag, slot)` pair. Shorter payloads are ignored.
    pub fn parse(mut payload: &[u8]) -> Option<Self> {
        if payload.remaining() < 2 {
            return None;
        }
        let mut bag = payload.get_u8();
        let slot = payload.get_u8();
        if bag == CLIENT_BACKPACK_BAG {
            bag = BACKPACK_BAG;
        }
        Some(Self { bag, slot })
    }
}

/// Items a unit carries, reduced to the spell each one casts on use.
#[derive(Component, Clone, Debug, Default)]
pub struct Inventory {
    items: HashMap<(u8, u8), SpellId>,
}

impl Inventory {
    pub fn with_item(mut self, bag: u8, slot: u8, spell_id: SpellId) -> Self {
        self.items.insert((bag, slot), spell_id);
        self
    }

    pub fn item_spell(&self, bag: u8, slot: u8) -> Option<SpellId> {
        self.items.get(&(bag, slot)).copied()
    }
}

/// Handle one use-item packet. Always answers with the neutral result 0,
/// whether or not an item was found.
pub fn handle_use_item(
    unit: Entity,
    payload: &[u8],
    inventory: Option<&Inventory>,
    casts: &mut EventWriter<CastSpellRequest>,
) -> u32 {
    let Some(request) = UseItemRequest::parse(payload) else {
        debug!("Ignoring short use-item packet ({} bytes)", payload.len());
        return 0;
    };

    let Some(spell_id) = inventory.and_then(|inv| inv.item_spell(request.bag, request.slot)) else {
        debug!("No usable item in bag {} slot {}", request.bag, request.slot);
        return 0;
    };

    casts.send(CastSpellRequest {
        caster: unit,
        target: unit,
        spell_id,
    });
    0
}

/// System: route incoming use-item packets.
pub fn process_use_item_packets(
    mut packets: EventReader<UseItemPacket>,
    inventories: Query<&Inventory>,
    mut casts: EventWriter<CastSpellRequest>,
) {
    for packet in packets.read() {
        handle_use_item(packet.unit, &packet.payload, inventories.get(packet.unit).ok(), &mut casts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_two_bytes() {
        assert_eq!(UseItemRequest::parse(&[]), None);
        assert_eq!(UseItemRequest::parse(&[3]), None);
        assert_eq!(
            UseItemRequest::parse(&[3, 7]),
            Some(UseItemRequest { bag: 3, slot: 7 })
        );
    }

    #[test]
    fn test_parse_maps_client_backpack() {
        let request = UseItemRequest::parse(&[0xFF, 23, 0xAA]).unwrap();
        assert_eq!(request.bag, BACKPACK_BAG);
        assert_eq!(request.slot, 23);
    }

    #[test]
    fn test_inventory_lookup() {
        let inventory = Inventory::default().with_item(BACKPACK_BAG, 23, 433);
        assert_eq!(inventory.item_spell(BACKPACK_BAG, 23), Some(433));
        assert_eq!(inventory.item_spell(BACKPACK_BAG, 24), None);
    }
}
