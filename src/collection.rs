use rand::Rng;

use crate::cell::Membership;
use crate::error::CollectionError;

/// Fixed-capacity, insertion-ordered set of handles.
///
/// Every member knows its own position through a [`Membership`] store, so
/// removal by handle needs no search. Removal compacts the sequence and keeps
/// the remaining members in insertion order, which makes position 0 the
/// oldest member still present.
#[derive(Debug, Clone)]
pub struct IndexedCollection<K> {
    items: Vec<K>,
    capacity: usize,
}

impl<K: Copy + Eq> IndexedCollection<K> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item` and records its slot as the new last position.
    pub fn add<M>(&mut self, item: K, members: &mut M) -> Result<(), CollectionError>
    where
        M: Membership<K> + ?Sized,
    {
        if self.items.len() == self.capacity {
            return Err(CollectionError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        members.set_slot(item, self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Removes `item` using its stored slot and shifts later members left.
    pub fn remove<M>(&mut self, item: K, members: &mut M) -> Result<(), CollectionError>
    where
        M: Membership<K> + ?Sized,
    {
        let slot = members.slot(item);
        if self.items.get(slot) != Some(&item) {
            return Err(CollectionError::NotMember { slot });
        }

        self.remove_slot(slot, members);
        Ok(())
    }

    /// Removes and returns the oldest member.
    pub fn remove_oldest<M>(&mut self, members: &mut M) -> Result<K, CollectionError>
    where
        M: Membership<K> + ?Sized,
    {
        if self.items.is_empty() {
            return Err(CollectionError::Empty);
        }

        Ok(self.remove_slot(0, members))
    }

    /// Removes and returns a member drawn uniformly from those present.
    pub fn remove_random<R, M>(&mut self, rng: &mut R, members: &mut M) -> Result<K, CollectionError>
    where
        R: Rng + ?Sized,
        M: Membership<K> + ?Sized,
    {
        if self.items.is_empty() {
            return Err(CollectionError::Empty);
        }

        let slot = rng.gen_range(0..self.items.len());
        Ok(self.remove_slot(slot, members))
    }

    /// Returns true when `item` is stored at the slot it claims.
    #[must_use]
    pub fn contains<M>(&self, item: K, members: &M) -> bool
    where
        M: Membership<K> + ?Sized,
    {
        self.items.get(members.slot(item)) == Some(&item)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn get(&self, slot: usize) -> Option<K> {
        self.items.get(slot).copied()
    }

    #[must_use]
    pub fn oldest(&self) -> Option<K> {
        self.items.first().copied()
    }

    #[must_use]
    pub fn newest(&self) -> Option<K> {
        self.items.last().copied()
    }

    /// Members from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = K> + '_ {
        self.items.iter().copied()
    }

    fn remove_slot<M>(&mut self, slot: usize, members: &mut M) -> K
    where
        M: Membership<K> + ?Sized,
    {
        let removed = self.items.remove(slot);
        for (index, item) in self.items.iter().enumerate().skip(slot) {
            members.set_slot(*item, index);
        }
        removed
    }
}
