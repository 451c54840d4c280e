use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use combat_core::env::{SpatialKind, SpatialOracle};
use combat_core::{EntityId, Living, Position};

#[derive(Clone, Copy, Debug)]
struct Presence {
    position: Position,
    player: bool,
}

/// Position index used for broadcast fan-out.
///
/// Kept apart from the entity cells so a radius query never takes a
/// living's lock. Updated on spawn, move and removal.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    entries: RwLock<HashMap<EntityId, Presence>>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, living: &Living) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                living.id,
                Presence {
                    position: living.position,
                    player: living.is_player(),
                },
            );
    }

    pub fn remove(&self, id: EntityId) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

impl SpatialOracle for SpatialIndex {
    fn entities_within_radius(
        &self,
        point: &Position,
        radius: u32,
        kind: SpatialKind,
    ) -> Vec<EntityId> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut found: Vec<EntityId> = entries
            .iter()
            .filter(|(_, presence)| kind == SpatialKind::Livings || presence.player)
            .filter(|(_, presence)| presence.position.is_within(point, radius))
            .map(|(id, _)| *id)
            .collect();
        found.sort();
        found
    }
}
