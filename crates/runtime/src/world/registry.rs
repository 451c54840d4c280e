//! Entity registry: one mutual-exclusion cell per living.
//!
//! Ids are handed out by a monotonic counter and never reused, so a stale id
//! simply resolves to `None`. No code path holds two cells at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::{Mutex, MutexGuard};

use combat_core::{EntityId, Living, ResourceKind};

use crate::api::{Result, RuntimeError};

/// Run state of one recurring timer.
///
/// Arming bumps the generation; a sleeping task compares its own generation
/// on wake-up and exits when it is stale. Mutate only with the owning
/// living's lock held.
#[derive(Debug, Default)]
pub struct TimerSlot {
    generation: AtomicU64,
    running: AtomicBool,
}

impl TimerSlot {
    /// Marks the timer running. `None` if it already was.
    pub fn arm(&self) -> Option<u64> {
        if self.running.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::Acquire) && self.generation.load(Ordering::Acquire) == generation
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The task armed as `generation` stopped on its own.
    pub fn finish(&self, generation: u64) {
        if self.generation.load(Ordering::Acquire) == generation {
            self.running.store(false, Ordering::Release);
        }
    }

    /// Invalidates any armed task. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.running.swap(false, Ordering::AcqRel)
    }
}

/// A registered living and its regeneration timers.
#[derive(Debug)]
pub struct EntityCell {
    id: EntityId,
    living: Mutex<Living>,
    regen: [TimerSlot; 3],
}

impl EntityCell {
    fn new(living: Living) -> Self {
        Self {
            id: living.id,
            living: Mutex::new(living),
            regen: Default::default(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub async fn lock(&self) -> MutexGuard<'_, Living> {
        self.living.lock().await
    }

    pub async fn snapshot(&self) -> Living {
        self.living.lock().await.clone()
    }

    pub fn regen_slot(&self, kind: ResourceKind) -> &TimerSlot {
        match kind {
            ResourceKind::Health => &self.regen[0],
            ResourceKind::Mana => &self.regen[1],
            ResourceKind::Endurance => &self.regen[2],
        }
    }

    /// Cancels all three regeneration timers. Safe to call repeatedly.
    pub fn cancel_regen(&self) {
        for slot in &self.regen {
            slot.cancel();
        }
    }
}

#[derive(Debug)]
pub struct EntityRegistry {
    next_id: AtomicU32,
    cells: RwLock<HashMap<EntityId, Arc<EntityCell>>>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicU32::new(1),
            cells: RwLock::new(HashMap::new()),
        }
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh id.
    pub fn allocate_id(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Registers `living` under its own id.
    pub fn insert(&self, living: Living) -> Result<Arc<EntityCell>> {
        let id = living.id;
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        if cells.contains_key(&id) {
            return Err(RuntimeError::DuplicateEntity(id));
        }
        self.next_id.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
        let cell = Arc::new(EntityCell::new(living));
        cells.insert(id, Arc::clone(&cell));
        Ok(cell)
    }

    pub fn get(&self, id: EntityId) -> Option<Arc<EntityCell>> {
        self.cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn require(&self, id: EntityId) -> Result<Arc<EntityCell>> {
        self.get(id).ok_or(RuntimeError::UnknownEntity(id))
    }

    pub fn remove(&self, id: EntityId) -> Option<Arc<EntityCell>> {
        self.cells
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self
            .cells
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.cells.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones the living behind `id`, locking it only for the copy.
    pub async fn snapshot(&self, id: EntityId) -> Option<Living> {
        let cell = self.get(id)?;
        Some(cell.snapshot().await)
    }
}
