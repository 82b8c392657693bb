//! Keel semantic core: symbols and scopes, types and their layout, the AST
//! node arena, constant folding and package export data.

pub mod arena;
pub mod ast;
pub mod bits;
pub mod config;
pub mod constant;
pub mod diagnostics;
pub mod errors;
pub mod export;
pub mod symbols;
pub mod types;

mod context;

// Re-exports: public API surface
pub use config::{SemaConfig, Target};
pub use context::{Compilation, CompilationBuilder, DeclLists, FuncLocals, FuncScope};
pub use diagnostics::{Diagnostics, TypeError};
pub use errors::{FatalError, LayoutError, SemanticError};
pub use export::{ExportPackage, ExportRecord};
pub use types::{TypeArena, TypeId, TypeKind};
