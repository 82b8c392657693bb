// symbols/mod.rs
//
// Global symbol table and the declaration stack that scopes its bindings.

mod dcl;
mod table;

pub use dcl::{Binding, Checkpoint, DclStack, DeclContext, Redeclaration, Role};
pub use table::{Lexical, NHASH, SymId, Symbol, SymbolTable, is_exported_name};
