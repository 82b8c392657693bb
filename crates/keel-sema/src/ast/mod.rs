// ast/mod.rs
//
// Syntax-tree nodes shared by every phase after parsing.
//
// Nodes live in a NodeArena and link to each other by NodeId. Sequences
// (argument lists, statement blocks, case lists) are right-leaning `List`
// chains walked with ListCursor.

mod list;
mod node;
mod op;

pub use list::{ListCursor, ListIter};
pub use node::{Addable, Children, Class, Node, NodeArena, NodeId, UINF};
pub use op::{Op, Slot};
