// context/declare.rs
//
// Declaring and resolving names: variables, constants, types, functions and
// methods, plus the deferred layout check for recursive type declarations.

use keel_identity::Pos;

use crate::ast::{Class, Node, NodeId, Op};
use crate::errors::{LayoutError, SemanticError};
use crate::symbols::{Checkpoint, DeclContext, Redeclaration, Role, SymId, is_exported_name};
use crate::types::{Field, TypeId, TypeKind};

use super::Compilation;

/// An open function body, returned by [`Compilation::begin_func`].
#[must_use = "a function scope must be closed with end_func"]
#[derive(Debug)]
pub struct FuncScope {
    checkpoint: Checkpoint,
    saved_autodcl: Vec<NodeId>,
    saved_paramdcl: Vec<NodeId>,
}

/// Names declared inside a function body, handed back by `end_func`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FuncLocals {
    pub params: Vec<NodeId>,
    pub autos: Vec<NodeId>,
}

impl Compilation {
    pub fn open_scope(&mut self) -> Checkpoint {
        self.dcl.mark()
    }

    pub fn close_scope(&mut self, checkpoint: Checkpoint) {
        self.dcl.pop_to(&mut self.symbols, checkpoint);
    }

    fn at_package_level(&self) -> bool {
        self.dcl.block() == 1 && self.funcdepth == 0
    }

    fn redeclared(&mut self, err: Redeclaration, pos: Pos) {
        let error = SemanticError::Redeclared {
            name: self.symbols.name(err.sym).to_string(),
            previous: self.position_string(err.previous),
        };
        self.report(error, pos);
    }

    /// Queue an exported package-level symbol for export.
    fn note_export(&mut self, sym: SymId) {
        if !self.at_package_level() || !is_exported_name(self.symbols.name(sym)) {
            return;
        }
        let symbol = self.symbols.get_mut(sym);
        if !symbol.export {
            symbol.export = true;
            self.lists.exportlist.push(sym);
        }
    }

    /// Declare a variable, parameter or result.
    ///
    /// A redeclaration in the same block is reported and the first binding
    /// kept; the returned name node is then marked diagnosed.
    pub fn declare_var(&mut self, sym: SymId, ty: TypeId, ctx: DeclContext, pos: Pos) -> NodeId {
        let vargen = match ctx {
            DeclContext::Extern => 0,
            _ => self.next_vargen(),
        };
        let n = self.nodes.alloc(Node {
            op: Op::Name,
            sym: Some(sym),
            ty: Some(ty),
            pos,
            ullman: 1,
            class: ctx.class(),
            funcdepth: self.funcdepth,
            vargen,
            ..Node::default()
        });

        if let Err(err) = self.dcl.declare(&mut self.symbols, sym, Role::Var(n), pos) {
            self.redeclared(err, pos);
            self.nodes.get_mut(n).diag = true;
            return n;
        }
        self.symbols.get_mut(sym).vargen = vargen;
        match ctx {
            DeclContext::Extern => {
                self.lists.externdcl.push(n);
                self.note_export(sym);
            }
            DeclContext::Auto => self.lists.autodcl.push(n),
            DeclContext::Param | DeclContext::ParamOut => self.lists.paramdcl.push(n),
        }
        tracing::trace!(name = self.symbols.name(sym), ?ctx, vargen, "declared var");
        n
    }

    /// Declare a named function at package level.
    pub fn declare_func(&mut self, sym: SymId, ty: TypeId, pos: Pos) -> NodeId {
        let n = self.declare_var(sym, ty, DeclContext::Extern, pos);
        self.nodes.get_mut(n).class = Class::Func;
        n
    }

    /// Bind `sym` to a constant. `value` must be a literal node.
    ///
    /// An overflowed value is reported here; uses of the constant resolve to
    /// copies that are already diagnosed.
    pub fn declare_const(&mut self, sym: SymId, value: NodeId, pos: Pos) {
        let node = self.nodes.get(value);
        if !node.is_literal() {
            let name = self.symbols.name(sym).to_string();
            self.diagnose(value, SemanticError::NotConstant { name });
            return;
        }
        if node.val.is_some_and(|v| v.overflowed()) {
            self.diagnose(value, SemanticError::ConstantOverflow);
        }
        match self.dcl.declare(&mut self.symbols, sym, Role::Const(value), pos) {
            Ok(_) => self.note_export(sym),
            Err(err) => self.redeclared(err, pos),
        }
    }

    /// Declare a named type.
    ///
    /// With no definition the type is a forward declaration, completed later
    /// by [`Compilation::update_forward`]. Declaring the same name again in
    /// the same block with a definition completes a pending forward.
    pub fn declare_type(&mut self, sym: SymId, def: Option<TypeKind>, pos: Pos) -> TypeId {
        let symbol = self.symbols.get(sym);
        if let Some(existing) = symbol.otype
            && symbol.block == self.dcl.block()
            && self.types.is_forward(existing)
            && def.is_some()
        {
            if let Some(kind) = def {
                self.update_forward(existing, kind, pos);
            }
            return existing;
        }

        let ty = self.types.new_forward(sym);
        if let Err(err) = self.dcl.declare(&mut self.symbols, sym, Role::Type(ty), pos) {
            self.redeclared(err, pos);
            return TypeId::ERROR;
        }
        self.note_export(sym);
        if let Some(kind) = def {
            self.update_forward(ty, kind, pos);
        }
        ty
    }

    /// Complete a forward type and check that it has a finite size.
    pub fn update_forward(&mut self, fwd: TypeId, kind: TypeKind, pos: Pos) {
        if !self.types.is_forward(fwd) {
            let name = self.display_type(fwd);
            self.report(
                SemanticError::Redeclared {
                    name,
                    previous: self.position_string(pos),
                },
                pos,
            );
            return;
        }
        self.types.update_forward(fwd, kind);
        self.check_width(fwd, pos);
    }

    /// Resolve a name used as a value.
    ///
    /// Variables resolve to their declaration node and constants to a fresh
    /// copy of their literal. An undeclared name is reported once per symbol
    /// and yields a diagnosed `NoName` node.
    pub fn resolve_name(&mut self, sym: SymId, pos: Pos) -> NodeId {
        let symbol = self.symbols.get(sym);
        if let Some(n) = symbol.oname {
            return n;
        }
        if let Some(value) = symbol.oconst {
            let copy = self.nodes.copy_subtree(value);
            self.nodes.get_mut(copy).pos = pos;
            return copy;
        }
        if let Some(ty) = symbol.otype {
            return self.nodes.alloc(Node {
                op: Op::Type,
                sym: Some(sym),
                ty: Some(ty),
                pos,
                ullman: 1,
                ..Node::default()
            });
        }
        if symbol.opack.is_some() {
            return self.nodes.make_name(sym, pos);
        }

        let first = !symbol.undef;
        self.symbols.get_mut(sym).undef = true;
        let n = self.nodes.alloc(Node {
            op: Op::NoName,
            sym: Some(sym),
            ty: Some(TypeId::ERROR),
            pos,
            ullman: 1,
            diag: true,
            ..Node::default()
        });
        if first {
            let name = self.symbols.name(sym).to_string();
            self.report(SemanticError::UndefinedName { name }, pos);
        }
        n
    }

    /// Resolve a name used as a type. Unknown names are reported once and
    /// resolve to the error type.
    pub fn resolve_type(&mut self, sym: SymId, pos: Pos) -> TypeId {
        let symbol = self.symbols.get(sym);
        if let Some(ty) = symbol.otype {
            return ty;
        }
        if !symbol.undef {
            self.symbols.get_mut(sym).undef = true;
            let name = self.symbols.name(sym).to_string();
            self.report(SemanticError::UndefinedType { name }, pos);
        }
        TypeId::ERROR
    }

    // ========================================================================
    // Functions and methods
    // ========================================================================

    /// Open a function body and declare the named receiver, parameters and
    /// results of `sig_ty`.
    pub fn begin_func(&mut self, sig_ty: TypeId, pos: Pos) -> FuncScope {
        let checkpoint = self.dcl.mark();
        self.funcdepth += 1;
        let scope = FuncScope {
            checkpoint,
            saved_autodcl: std::mem::take(&mut self.lists.autodcl),
            saved_paramdcl: std::mem::take(&mut self.lists.paramdcl),
        };

        let Some(sig) = self.types.func_sig(sig_ty).cloned() else {
            tracing::debug!(?sig_ty, "function scope without a signature");
            return scope;
        };
        let inputs = sig.args().map(|f| (f, DeclContext::Param));
        let outputs = sig.results.iter().map(|f| (f, DeclContext::ParamOut));
        for (field, ctx) in inputs.chain(outputs) {
            if let Some(name) = field.name {
                self.declare_var(name, field.ty, ctx, pos);
            }
        }
        tracing::trace!(funcdepth = self.funcdepth, "begin func");
        scope
    }

    /// Close a function body, restoring the enclosing declaration lists.
    pub fn end_func(&mut self, scope: FuncScope) -> FuncLocals {
        self.dcl.pop_to(&mut self.symbols, scope.checkpoint);
        self.funcdepth -= 1;
        let locals = FuncLocals {
            params: std::mem::replace(&mut self.lists.paramdcl, scope.saved_paramdcl),
            autos: std::mem::replace(&mut self.lists.autodcl, scope.saved_autodcl),
        };
        tracing::trace!(
            funcdepth = self.funcdepth,
            params = locals.params.len(),
            autos = locals.autos.len(),
            "end func"
        );
        locals
    }

    /// Attach method `name` of type `func_ty` to the named type behind
    /// `receiver` (which may be a pointer to it).
    pub fn add_method(&mut self, receiver: TypeId, name: SymId, func_ty: TypeId, pos: Pos) -> bool {
        let base = match self.types.kind(receiver) {
            TypeKind::Ptr(elem) => *elem,
            _ => receiver,
        };
        let invalid = if self.types.is_ptr(base) {
            Some("pointer to pointer")
        } else if self.types.sym(base).is_none() {
            Some("unnamed type")
        } else if self.types.is_interface(base) {
            Some("interface type")
        } else {
            None
        };
        if let Some(reason) = invalid {
            let ty = self.display_type(receiver);
            self.report(SemanticError::InvalidReceiver { ty, reason }, pos);
            return false;
        }
        if self.types.find_method(base, name).is_some() {
            let error = SemanticError::DuplicateMethod {
                receiver: self.display_type(base),
                name: self.symbols.name(name).to_string(),
            };
            self.report(error, pos);
            return false;
        }

        self.types.add_method(base, Field::named(name, func_ty));
        if !self.lists.signatlist.contains(&base) {
            self.lists.signatlist.push(base);
        }
        tracing::trace!(receiver = ?base, method = self.symbols.name(name), "added method");
        true
    }

    // ========================================================================
    // Layout checks
    // ========================================================================

    /// Queue layout checks until `resume_layout`, for mutually recursive
    /// declarations that are not complete yet.
    ///
    /// # Panics
    /// If layout checking is already deferred.
    pub fn defer_layout(&mut self) {
        assert!(
            self.deferred_layout.is_none(),
            "defer_layout called while already deferred"
        );
        self.deferred_layout = Some(Vec::new());
    }

    /// Run every queued layout check.
    pub fn resume_layout(&mut self) {
        let queued = self.deferred_layout.take().unwrap_or_default();
        tracing::debug!(count = queued.len(), "resuming layout checks");
        for (ty, pos) in queued {
            self.check_width_now(ty, pos);
        }
    }

    /// Check that `ty` has a finite, known size, now or when layout
    /// checking resumes.
    pub fn check_width(&mut self, ty: TypeId, pos: Pos) {
        if let Some(queue) = self.deferred_layout.as_mut() {
            queue.push((ty, pos));
            return;
        }
        self.check_width_now(ty, pos);
    }

    fn check_width_now(&mut self, ty: TypeId, pos: Pos) {
        let error = match self.types.width_and_alignment(ty) {
            Ok(_) | Err(LayoutError::NoWidth(_)) => return,
            Err(LayoutError::InfiniteSize(_)) => SemanticError::InvalidRecursiveType {
                name: self.display_type(ty),
            },
            Err(LayoutError::UnresolvedForward(fwd)) => {
                if let Some(sym) = self.types.sym(fwd) {
                    if self.symbols.get(sym).undef {
                        return;
                    }
                    self.symbols.get_mut(sym).undef = true;
                }
                SemanticError::UndefinedType {
                    name: self.display_type(fwd),
                }
            }
            Err(LayoutError::TooLarge(_)) => SemanticError::TypeTooLarge {
                name: self.display_type(ty),
            },
        };
        self.report(error, pos);
    }
}
