// symbols/dcl.rs
//
// Declaration stack: an undo log over symbol bindings.
//
// Opening a scope pushes a mark and allocates a fresh block number. Every
// binding change records the symbol's previous binding; popping to a mark
// replays the log backwards, so shadowing is undone exactly.

use keel_identity::{Name, Pos};

use crate::ast::{Class, NodeId};
use crate::symbols::table::{Lexical, SymId, SymbolTable};
use crate::types::TypeId;

/// Everything a declaration changes on a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Binding {
    pub oname: Option<NodeId>,
    pub otype: Option<TypeId>,
    pub oconst: Option<NodeId>,
    pub opack: Option<Name>,
    pub lexical: Lexical,
    pub block: u32,
    pub vargen: u32,
    pub last_pos: Pos,
}

/// What a declaration binds a name to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Var(NodeId),
    Type(TypeId),
    Const(NodeId),
    Package(Name),
}

impl Role {
    pub fn lexical(self) -> Lexical {
        match self {
            Role::Var(_) => Lexical::Name,
            Role::Type(_) => Lexical::Type,
            Role::Const(_) => Lexical::Const,
            Role::Package(_) => Lexical::Package,
        }
    }
}

/// Where a variable declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclContext {
    Extern,
    Auto,
    Param,
    ParamOut,
}

impl DeclContext {
    pub fn class(self) -> Class {
        match self {
            DeclContext::Extern => Class::Extern,
            DeclContext::Auto => Class::Auto,
            DeclContext::Param => Class::Param,
            DeclContext::ParamOut => Class::ParamOut,
        }
    }
}

/// A name was declared twice in one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redeclaration {
    pub sym: SymId,
    pub previous: Pos,
}

#[derive(Debug, Clone, Copy)]
enum Entry {
    Mark { block: u32 },
    Push { sym: SymId, saved: Binding },
}

/// Position in the declaration stack returned by [`DclStack::mark`].
#[must_use = "an open scope must be popped with pop_to"]
#[derive(Debug, PartialEq, Eq)]
pub struct Checkpoint {
    depth: usize,
    block: u32,
}

impl Checkpoint {
    /// Block number of the scope this checkpoint opened.
    pub fn block(&self) -> u32 {
        self.block
    }
}

#[derive(Debug, Clone)]
pub struct DclStack {
    entries: Vec<Entry>,
    block: u32,
    blockgen: u32,
    open: usize,
}

impl Default for DclStack {
    fn default() -> Self {
        Self::new()
    }
}

impl DclStack {
    /// Package scope is block 1; block 0 holds predeclared names.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            block: 1,
            blockgen: 1,
            open: 0,
        }
    }

    pub fn block(&self) -> u32 {
        self.block
    }

    /// Number of scopes opened and not yet popped.
    pub fn depth(&self) -> usize {
        self.open
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a scope with a fresh block number.
    pub fn mark(&mut self) -> Checkpoint {
        let depth = self.entries.len();
        self.entries.push(Entry::Mark { block: self.block });
        self.blockgen += 1;
        self.block = self.blockgen;
        self.open += 1;
        tracing::trace!(block = self.block, depth, "open scope");
        Checkpoint {
            depth,
            block: self.block,
        }
    }

    /// Close every scope opened since `checkpoint`, restoring each touched
    /// symbol to its binding before the mark.
    ///
    /// # Panics
    /// If the checkpoint was already popped by an enclosing `pop_to`.
    pub fn pop_to(&mut self, table: &mut SymbolTable, checkpoint: Checkpoint) {
        assert!(
            matches!(self.entries.get(checkpoint.depth), Some(Entry::Mark { .. })),
            "stale scope checkpoint for block {}",
            checkpoint.block
        );
        let mut restored = 0usize;
        while self.entries.len() > checkpoint.depth {
            match self.entries.pop() {
                Some(Entry::Push { sym, saved }) => {
                    table.get_mut(sym).restore(saved);
                    restored += 1;
                }
                Some(Entry::Mark { block }) => {
                    self.block = block;
                    self.open -= 1;
                }
                None => break,
            }
        }
        tracing::trace!(block = self.block, restored, "close scope");
    }

    /// Bind `sym` in the current block, logging its previous binding.
    pub fn push_binding(
        &mut self,
        table: &mut SymbolTable,
        sym: SymId,
        role: Role,
        pos: Pos,
    ) -> Binding {
        let saved = table.get(sym).binding();
        self.entries.push(Entry::Push { sym, saved });
        table.get_mut(sym).bind(role, self.block, pos);
        saved
    }

    /// Declare `sym` in the current block.
    ///
    /// A name already bound in this block is a redeclaration and keeps its
    /// first binding. A name bound in an outer block is shadowed.
    pub fn declare(
        &mut self,
        table: &mut SymbolTable,
        sym: SymId,
        role: Role,
        pos: Pos,
    ) -> Result<Binding, Redeclaration> {
        let current = table.get(sym);
        if current.is_bound() && current.block == self.block {
            tracing::debug!(name = table.name(sym), block = self.block, "redeclaration");
            return Err(Redeclaration {
                sym,
                previous: current.last_pos,
            });
        }
        Ok(self.push_binding(table, sym, role, pos))
    }
}
