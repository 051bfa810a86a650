//! Reference-counted target-list pool.
//!
//! All steps belonging to one cast share one resolved target list, so
//! targeting runs once per cast rather than once per step. The pool owns
//! both the lists and their reference counts; callers only ever hold a
//! plain `ListHandle` id, and a list returns to the free pool exactly
//! when its count reaches zero.
//!
//! ## Checkout protocol
//!
//! `acquire` hands out a handle with one reference (the creator's).
//! Schedule work by calling `retain` once per pending step, then drop the
//! creator's reference with `release`. The count is then exactly the
//! number of steps still pointing at the list.

use smallvec::SmallVec;

use super::entity::EntityId;

/// Most casts touch only a handful of targets.
pub type TargetList = SmallVec<[EntityId; 8]>;

/// Handle to a pooled target list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListHandle(u32);

impl ListHandle {
    /// Get the raw slot index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Slot {
    list: TargetList,
    refs: u32,
}

/// Pool of reference-counted target lists.
#[derive(Debug, Default)]
pub struct TargetListPool {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TargetListPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out an empty list with a reference count of one.
    pub fn acquire(&mut self) -> ListHandle {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize].refs = 1;
            ListHandle(idx)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                list: TargetList::new(),
                refs: 1,
            });
            ListHandle(idx)
        }
    }

    /// Add one reference to a live list.
    pub fn retain(&mut self, handle: ListHandle) {
        let slot = &mut self.slots[handle.0 as usize];
        debug_assert!(slot.refs > 0, "retain on released list {}", handle.0);
        if slot.refs > 0 {
            slot.refs += 1;
        }
    }

    /// Drop one reference. When the count reaches zero the list is
    /// cleared and recycled; returns `true` in that case.
    ///
    /// Releasing an already-free handle is a guarded no-op.
    pub fn release(&mut self, handle: ListHandle) -> bool {
        let slot = &mut self.slots[handle.0 as usize];
        if slot.refs == 0 {
            log::warn!("double release of target list {}", handle.0);
            return false;
        }
        slot.refs -= 1;
        if slot.refs == 0 {
            slot.list.clear();
            self.free.push(handle.0);
            true
        } else {
            false
        }
    }

    /// Read a live list.
    #[must_use]
    pub fn get(&self, handle: ListHandle) -> &[EntityId] {
        let slot = &self.slots[handle.0 as usize];
        debug_assert!(slot.refs > 0, "read of released list {}", handle.0);
        &slot.list
    }

    /// Mutable access to a live list (used while filling after acquire).
    pub fn get_mut(&mut self, handle: ListHandle) -> &mut TargetList {
        let slot = &mut self.slots[handle.0 as usize];
        debug_assert!(slot.refs > 0, "write to released list {}", handle.0);
        &mut slot.list
    }

    /// Current reference count of a handle's slot.
    #[must_use]
    pub fn ref_count(&self, handle: ListHandle) -> u32 {
        self.slots[handle.0 as usize].refs
    }

    /// Number of slots currently checked out.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_starts_with_one_ref() {
        let mut pool = TargetListPool::new();
        let h = pool.acquire();
        assert_eq!(pool.ref_count(h), 1);
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn test_retain_release_cycle() {
        let mut pool = TargetListPool::new();
        let h = pool.acquire();
        pool.get_mut(h).push(EntityId(1));

        // Three steps share the list, creator reference dropped.
        pool.retain(h);
        pool.retain(h);
        pool.retain(h);
        assert!(!pool.release(h));
        assert_eq!(pool.ref_count(h), 3);

        assert!(!pool.release(h));
        assert!(!pool.release(h));
        assert!(pool.release(h));
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn test_recycled_list_is_empty() {
        let mut pool = TargetListPool::new();
        let h = pool.acquire();
        pool.get_mut(h).push(EntityId(1));
        pool.get_mut(h).push(EntityId(2));
        assert!(pool.release(h));

        let h2 = pool.acquire();
        assert_eq!(h, h2); // slot reused
        assert!(pool.get(h2).is_empty());
    }

    #[test]
    fn test_double_release_is_guarded() {
        let mut pool = TargetListPool::new();
        let h = pool.acquire();
        assert!(pool.release(h));
        assert!(!pool.release(h));
        assert_eq!(pool.live_count(), 0);

        // Pool is still usable afterwards.
        let h2 = pool.acquire();
        assert_eq!(pool.ref_count(h2), 1);
    }

    #[test]
    fn test_independent_slots() {
        let mut pool = TargetListPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        pool.get_mut(a).push(EntityId(1));
        pool.get_mut(b).push(EntityId(2));

        assert_eq!(pool.get(a), &[EntityId(1)][..]);
        assert_eq!(pool.get(b), &[EntityId(2)][..]);
        pool.release(a);
        assert_eq!(pool.get(b), &[EntityId(2)][..]);
    }
}
