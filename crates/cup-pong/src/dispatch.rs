use std::collections::{BTreeMap, HashMap};

use pong_engine::{CollisionPair, EntityId, PartId};

/// Routes input and collision events to the ball that owns them.
///
/// Keyed by entity id for drags and by collision part for contacts. Each
/// entry points at a slot index in the game's ball list. Entries are removed
/// when their ball leaves the simulation.
#[derive(Debug, Default)]
pub struct DispatchTable {
    entities: HashMap<EntityId, (usize, Vec<PartId>)>,
    parts: HashMap<PartId, usize>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: EntityId, parts: &[PartId], slot: usize) {
        self.deregister(id);
        for part in parts {
            self.parts.insert(*part, slot);
        }
        self.entities.insert(id, (slot, parts.to_vec()));
    }

    /// Drop `id` and all its parts. Returns the slot it pointed at.
    pub fn deregister(&mut self, id: EntityId) -> Option<usize> {
        let (slot, parts) = self.entities.remove(&id)?;
        for part in parts {
            self.parts.remove(&part);
        }
        Some(slot)
    }

    pub fn slot_for_entity(&self, id: EntityId) -> Option<usize> {
        self.entities.get(&id).map(|(slot, _)| *slot)
    }

    pub fn slot_for_part(&self, part: PartId) -> Option<usize> {
        self.parts.get(&part).copied()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Group collision pairs by owning slot, in slot order. A pair between two
    /// registered balls goes to both; a pair touching no ball is dropped.
    pub fn route(&self, pairs: &[CollisionPair]) -> BTreeMap<usize, Vec<CollisionPair>> {
        let mut routed: BTreeMap<usize, Vec<CollisionPair>> = BTreeMap::new();
        for pair in pairs {
            let a = self.slot_for_part(pair.part_a);
            let b = self.slot_for_part(pair.part_b);
            if let Some(slot) = a {
                routed.entry(slot).or_default().push(*pair);
            }
            if let Some(slot) = b.filter(|slot| Some(*slot) != a) {
                routed.entry(slot).or_default().push(*pair);
            }
        }
        routed
    }
}
