// intern.rs
//
// String interning for identifiers, package names and file names.

use std::hash::BuildHasher;

use hashbrown::HashTable;
use rustc_hash::FxBuildHasher;

crate::define_entity_id! {
    /// Handle to an interned string. Two names are equal iff their text is.
    pub struct Name;
}

impl Name {
    /// The empty string, interned by every [`Interner`] at index 0.
    pub const EMPTY: Name = Name::new(0);
}

/// Interns strings to unique [`Name`] handles.
///
/// The hash table stores only handles; the text lives once in `strings`.
#[derive(Clone)]
pub struct Interner {
    table: HashTable<Name>,
    strings: Vec<Box<str>>,
    hasher: FxBuildHasher,
}

impl Default for Interner {
    fn default() -> Self {
        let mut interner = Self {
            table: HashTable::new(),
            strings: Vec::new(),
            hasher: FxBuildHasher,
        };
        let empty = interner.intern("");
        debug_assert_eq!(empty, Name::EMPTY);
        interner
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("len", &self.strings.len())
            .finish_non_exhaustive()
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Name {
        // Hash once, reuse for both lookup and insert.
        let hash = self.hasher.hash_one(s);
        let strings = &self.strings;
        if let Some(&name) = self.table.find(hash, |&n| &*strings[n.slot()] == s) {
            return name;
        }

        let index = u32::try_from(self.strings.len()).expect("interner id space exhausted");
        let name = Name::new(index);
        self.strings.push(s.into());

        let strings = &self.strings;
        let hasher = &self.hasher;
        self.table
            .insert_unique(hash, name, |&n| hasher.hash_one(&*strings[n.slot()]));
        name
    }

    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.slot()]
    }

    /// Look up a string without interning it.
    pub fn lookup(&self, s: &str) -> Option<Name> {
        let hash = self.hasher.hash_one(s);
        self.table
            .find(hash, |&n| &*self.strings[n.slot()] == s)
            .copied()
    }

    /// Returns the number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Intern `prefix` followed by the text of `base`.
    pub fn intern_with_prefix(&mut self, prefix: &str, base: Name) -> Name {
        let joined = format!("{}{}", prefix, self.resolve(base));
        self.intern(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_name() {
        let mut interner = Interner::new();
        let a = interner.intern("hello");
        let b = interner.intern("hello");
        let c = interner.intern("world");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let name = interner.intern("test");
        assert_eq!(interner.resolve(name), "test");
    }

    #[test]
    fn empty_string_is_preinterned() {
        let mut interner = Interner::new();
        assert!(interner.is_empty());
        assert_eq!(interner.intern(""), Name::EMPTY);
        assert_eq!(interner.resolve(Name::EMPTY), "");
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert_eq!(interner.lookup("x"), None);
        let x = interner.intern("x");
        assert_eq!(interner.lookup("x"), Some(x));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn prefix_interning() {
        let mut interner = Interner::new();
        let base = interner.intern("init");
        let joined = interner.intern_with_prefix("main.", base);
        assert_eq!(interner.resolve(joined), "main.init");
    }
}
