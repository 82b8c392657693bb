// lib.rs
//
// Identity primitives shared by every keel crate: interned names, raw source
// positions and the line history that maps them back to user-visible files.

mod entities;
mod history;
mod intern;
mod pos;

pub use history::{HistoryEntry, LineHistory, Position};
pub use intern::{Interner, Name};
pub use pos::Pos;
