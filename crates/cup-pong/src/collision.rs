use std::collections::HashSet;

use glam::Vec2;
use pong_engine::{CollisionPair, PartId};

/// Scene facts every ball reads but never writes: which collision parts
/// belong to the table, where the cup is, and whether sound is on.
#[derive(Debug, Clone)]
pub struct TableContext {
    table_ids: HashSet<PartId>,
    pub cup: Vec2,
    pub sound_enabled: bool,
}

impl TableContext {
    pub fn new(cup: Vec2) -> Self {
        Self {
            table_ids: HashSet::new(),
            cup,
            sound_enabled: true,
        }
    }

    pub fn add_table_part(&mut self, part: PartId) {
        self.table_ids.insert(part);
    }

    pub fn is_table(&self, part: PartId) -> bool {
        self.table_ids.contains(&part)
    }

    pub fn table_part_count(&self) -> usize {
        self.table_ids.len()
    }

    /// Flip the sound setting and return the new value.
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }
}

/// What a contact means for the ball that owns one side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Solid contact with the table surface.
    Table,
    /// Overlap with a kill zone.
    Sensor,
    /// Anything else: walls, other balls.
    Other,
}

/// Classify `pair` from the point of view of a ball made of `own` parts.
/// `None` when the pair does not involve the ball, or only involves it.
pub fn classify(pair: &CollisionPair, own: &[PartId], table: &TableContext) -> Option<Contact> {
    let mine = own.iter().find(|part| pair.involves(**part))?;
    let other = pair.other(*mine)?;
    if own.contains(&other) {
        return None;
    }
    Some(if pair.sensor {
        Contact::Sensor
    } else if table.is_table(other) {
        Contact::Table
    } else {
        Contact::Other
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pong_engine::EntityId;

    fn pair(a: u32, b: u32, sensor: bool) -> CollisionPair {
        CollisionPair {
            entity_a: EntityId(a),
            entity_b: EntityId(b),
            part_a: PartId(a),
            part_b: PartId(b),
            started: true,
            sensor,
        }
    }

    fn table() -> TableContext {
        let mut table = TableContext::new(Vec2::ZERO);
        table.add_table_part(PartId(10));
        table
    }

    #[test]
    fn classifies_from_either_side() {
        let table = table();
        let own = [PartId(1)];
        assert_eq!(classify(&pair(1, 10, false), &own, &table), Some(Contact::Table));
        assert_eq!(classify(&pair(10, 1, false), &own, &table), Some(Contact::Table));
        assert_eq!(classify(&pair(1, 20, true), &own, &table), Some(Contact::Sensor));
        assert_eq!(classify(&pair(2, 1, false), &own, &table), Some(Contact::Other));
    }

    #[test]
    fn foreign_pairs_are_not_classified() {
        let table = table();
        assert_eq!(classify(&pair(2, 10, false), &[PartId(1)], &table), None);
        assert_eq!(classify(&pair(1, 2, false), &[PartId(1), PartId(2)], &table), None);
    }

    #[test]
    fn toggle_sound_flips() {
        let mut table = table();
        assert!(table.sound_enabled);
        assert!(!table.toggle_sound());
        assert!(table.toggle_sound());
        assert_eq!(table.table_part_count(), 1);
    }
}
