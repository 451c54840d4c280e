use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use combat_core::EntityId;
use combat_core::env::{GroupOracle, GroupView};

#[derive(Debug, Default)]
struct Groups {
    /// Leader to members, leader first.
    by_leader: HashMap<EntityId, Vec<EntityId>>,
    leader_of: HashMap<EntityId, EntityId>,
}

impl Groups {
    fn detach(&mut self, member: EntityId) {
        let Some(leader) = self.leader_of.remove(&member) else {
            return;
        };
        if leader == member {
            if let Some(members) = self.by_leader.remove(&leader) {
                for other in members {
                    self.leader_of.remove(&other);
                }
            }
            return;
        }
        if let Some(members) = self.by_leader.get_mut(&leader) {
            members.retain(|id| *id != member);
            if members.len() < 2 {
                self.by_leader.remove(&leader);
                self.leader_of.remove(&leader);
            }
        }
    }
}

/// Group membership table.
///
/// A living belongs to at most one group. Groups of fewer than two members
/// are dissolved.
#[derive(Debug, Default)]
pub struct GroupTable {
    groups: RwLock<Groups>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forms a group led by `leader`. Everyone involved leaves their
    /// previous group first.
    pub fn form(&self, leader: EntityId, members: &[EntityId]) {
        let mut groups = self.groups.write().unwrap_or_else(PoisonError::into_inner);
        let mut roster = vec![leader];
        for id in members {
            if !roster.contains(id) {
                roster.push(*id);
            }
        }
        for id in &roster {
            groups.detach(*id);
        }
        if roster.len() < 2 {
            return;
        }
        for id in &roster {
            groups.leader_of.insert(*id, leader);
        }
        groups.by_leader.insert(leader, roster);
    }

    /// Removes `member` from its group. A leaving leader disbands it.
    pub fn leave(&self, member: EntityId) {
        self.groups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .detach(member);
    }
}

impl GroupOracle for GroupTable {
    fn group_of(&self, member: EntityId) -> Option<GroupView> {
        let groups = self.groups.read().unwrap_or_else(PoisonError::into_inner);
        let leader = *groups.leader_of.get(&member)?;
        let members = groups.by_leader.get(&leader)?.clone();
        Some(GroupView { leader, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forming_and_leaving() {
        let table = GroupTable::new();
        table.form(EntityId(1), &[EntityId(2), EntityId(3)]);

        let view = table.group_of(EntityId(3)).unwrap();
        assert_eq!(view.leader, EntityId(1));
        assert_eq!(view.members, vec![EntityId(1), EntityId(2), EntityId(3)]);

        table.leave(EntityId(2));
        assert_eq!(table.group_of(EntityId(1)).unwrap().members.len(), 2);
        assert!(table.group_of(EntityId(2)).is_none());

        table.leave(EntityId(1));
        assert!(table.group_of(EntityId(3)).is_none());
    }

    #[test]
    fn joining_a_new_group_leaves_the_old_one() {
        let table = GroupTable::new();
        table.form(EntityId(1), &[EntityId(2)]);
        table.form(EntityId(3), &[EntityId(2)]);

        assert!(table.group_of(EntityId(1)).is_none());
        assert_eq!(table.group_of(EntityId(2)).unwrap().leader, EntityId(3));
    }
}
