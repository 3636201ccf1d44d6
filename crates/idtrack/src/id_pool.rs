use fixedbitset::FixedBitSet;

/// A bounded pool of small, reusable track identifiers in `[1, max_id]`.
///
/// Identifier `0` is never handed out: it is the "not yet assigned" value. `max_id + 1` is never handed out either so
/// a caller can reserve it for "no identity available". `allocate` always returns the smallest free identifier.
#[derive(Debug, Clone)]
pub struct IdPool {
    /// Bit `i` is set while identifier `i` is held. Bit `0` is never set.
    held: FixedBitSet,
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new(98)
    }
}

impl IdPool {
    /// Returns a new IdPool
    ///
    /// # Parameters
    ///
    /// * `max_id`: The largest identifier the pool will allocate. A `max_id` of 0 yields a pool that is always exhausted.
    pub fn new(max_id: u32) -> IdPool {
        IdPool {
            held: FixedBitSet::with_capacity(max_id as usize + 1),
        }
    }

    /// Returns the number of identifiers the pool can hand out.
    pub fn capacity(&self) -> usize {
        self.held.len() - 1
    }

    /// Returns the number of identifiers currently held.
    pub fn held_count(&self) -> usize {
        self.held.count_ones(..)
    }

    /// Returns true if `id` is currently held.
    pub fn is_held(&self, id: u32) -> bool {
        id != 0 && self.held.contains(id as usize)
    }

    /// Take the smallest free identifier, or `None` if every identifier is held.
    pub fn allocate(&mut self) -> Option<u32> {
        let id = (1..self.held.len()).find(|&id| !self.held.contains(id))?;
        self.held.insert(id);
        Some(id as u32)
    }

    /// Return `id` to the pool. Identifiers that are out of range or not held are ignored.
    pub fn release(&mut self, id: u32) {
        if id != 0 && (id as usize) < self.held.len() {
            self.held.set(id as usize, false);
        }
    }

    /// Release every identifier.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn allocates_smallest_first() {
        let mut pool = IdPool::default();
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(pool.allocate(), Some(3));

        pool.release(2);
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(pool.allocate(), Some(4));
    }

    #[test]
    fn exhausted_pool_returns_none() {
        let mut pool = IdPool::default();
        let ids = (0..98).filter_map(|_| pool.allocate()).collect::<Vec<_>>();
        assert_eq!(ids, (1..=98).collect::<Vec<_>>());
        assert_eq!(pool.held_count(), 98);
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn released_id_is_reused_before_99() {
        let mut pool = IdPool::default();
        (0..98).for_each(|_| {
            pool.allocate();
        });

        pool.release(37);
        assert!(!pool.is_held(37));
        assert_eq!(pool.allocate(), Some(37));
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn release_ignores_unknown_ids() {
        let mut pool = IdPool::new(3);
        assert_eq!(pool.allocate(), Some(1));

        pool.release(0);
        pool.release(2);
        pool.release(99);
        assert_eq!(pool.held_count(), 1);
        assert!(pool.is_held(1));
        assert!(!pool.is_held(0));
    }

    #[test]
    fn empty_pool() {
        let mut pool = IdPool::new(0);
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn clear_releases_everything() {
        let mut pool = IdPool::new(2);
        pool.allocate();
        pool.allocate();
        assert_eq!(pool.allocate(), None);

        pool.clear();
        assert_eq!(pool.held_count(), 0);
        assert_eq!(pool.allocate(), Some(1));
    }
}
