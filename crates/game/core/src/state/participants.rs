use std::collections::HashMap;

use crate::state::{EntityId, Living};

/// Read-only snapshots of third parties involved in one swing.
///
/// Guards, interceptors, the attacker's group leader and pet owners are
/// copied in before the defender is locked, so resolution never needs a
/// second live reference.
#[derive(Clone, Debug, Default)]
pub struct Participants {
    livings: HashMap<EntityId, Living>,
}

impl Participants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, living: Living) {
        self.livings.insert(living.id, living);
    }

    pub fn get(&self, id: EntityId) -> Option<&Living> {
        self.livings.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.livings.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.livings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.livings.is_empty()
    }
}

impl FromIterator<Living> for Participants {
    fn from_iter<I: IntoIterator<Item = Living>>(iter: I) -> Self {
        let mut participants = Self::new();
        for living in iter {
            participants.insert(living);
        }
        participants
    }
}
