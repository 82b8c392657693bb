//! Typed index handles.
//!
//! Every arena-backed table in the compiler hands out `u32` handles. The
//! macro keeps the handles distinct at the type level so a node index can
//! never be used where a symbol index is expected.

/// Define a `Copy` newtype over `u32` used as an index into a compiler table.
#[macro_export]
macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> u32 {
                self.0
            }

            /// Index as a `usize` for slice access.
            #[inline]
            pub const fn slot(self) -> usize {
                self.0 as usize
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}
