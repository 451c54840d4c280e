use crate::state::{EntityId, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpatialKind {
    /// Player-controlled observers only.
    Players,
    Livings,
}

/// Radius queries, used only to fan out notifications.
pub trait SpatialOracle: Send + Sync {
    fn entities_within_radius(&self, point: &Position, radius: u32, kind: SpatialKind)
    -> Vec<EntityId>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoSpatial;

impl SpatialOracle for NoSpatial {
    fn entities_within_radius(&self, _: &Position, _: u32, _: SpatialKind) -> Vec<EntityId> {
        Vec::new()
    }
}

/// Snapshot of a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupView {
    pub leader: EntityId,
    pub members: Vec<EntityId>,
}

/// Group membership lookup.
pub trait GroupOracle: Send + Sync {
    fn group_of(&self, member: EntityId) -> Option<GroupView>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoGroups;

impl GroupOracle for NoGroups {
    fn group_of(&self, _: EntityId) -> Option<GroupView> {
        None
    }
}
