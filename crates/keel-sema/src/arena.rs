// arena.rs
//
// Typed, append-only storage for one compilation unit.
//
// Every long-lived record (nodes, symbols, types) is allocated here and
// addressed by a `u32` handle. Nothing is freed individually; the whole arena
// goes away with its compilation.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A handle type that indexes an [`Arena`].
pub trait ArenaId: Copy {
    fn from_slot(slot: u32) -> Self;
    fn slot(self) -> usize;
}

/// Implement [`ArenaId`] for handles declared with `define_entity_id!`.
macro_rules! arena_id {
    ($($id:ty),* $(,)?) => {
        $(
            impl $crate::arena::ArenaId for $id {
                #[inline]
                fn from_slot(slot: u32) -> Self {
                    <$id>::new(slot)
                }

                #[inline]
                fn slot(self) -> usize {
                    <$id>::index(self) as usize
                }
            }
        )*
    };
}
pub(crate) use arena_id;

pub struct Arena<I, T> {
    items: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _id: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            _id: PhantomData,
        }
    }

    /// Store `value` and return its handle.
    ///
    /// # Panics
    /// When the handle space (`u32`) is exhausted.
    pub fn alloc(&mut self, value: T) -> I {
        let slot = u32::try_from(self.items.len()).expect("arena id space exhausted");
        self.items.push(value);
        I::from_slot(slot)
    }

    /// Allocate a zero-initialized record.
    pub fn alloc_default(&mut self) -> I
    where
        T: Default,
    {
        self.alloc(T::default())
    }

    pub fn get(&self, id: I) -> &T {
        &self.items[id.slot()]
    }

    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.slot()]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Next handle `alloc` would return.
    pub fn next_id(&self) -> I {
        I::from_slot(self.items.len() as u32)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(slot, item)| (I::from_slot(slot as u32), item))
    }
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T: Clone> Clone for Arena<I, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _id: PhantomData,
        }
    }
}

impl<I, T> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    keel_identity::define_entity_id! {
        struct SlotId;
    }
    arena_id!(SlotId);

    #[test]
    fn handles_are_dense_and_stable() {
        let mut arena: Arena<SlotId, &str> = Arena::new();
        assert_eq!(arena.next_id(), SlotId::new(0));
        let a = arena.alloc("a");
        let b = arena.alloc("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena[a], "a");
        arena[b] = "c";
        assert_eq!(arena.get(b), &"c");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn default_allocation_is_zeroed() {
        let mut arena: Arena<SlotId, (u32, bool)> = Arena::with_capacity(4);
        let id = arena.alloc_default();
        assert_eq!(arena[id], (0, false));
        assert!(!arena.is_empty());
    }

    #[test]
    fn iteration_pairs_handles_with_items() {
        let mut arena: Arena<SlotId, u8> = Arena::new();
        arena.alloc(10);
        arena.alloc(20);
        let pairs: Vec<_> = arena.iter().map(|(id, v)| (id.index(), *v)).collect();
        assert_eq!(pairs, vec![(0, 10), (1, 20)]);
    }
}
