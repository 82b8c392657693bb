// context/mod.rs
//
// The compilation context: every table one compilation unit reads and
// mutates, bundled into a single value.
//
// Independent units use independent `Compilation`s; nothing here is global.

mod declare;

use keel_identity::{LineHistory, Pos, Position};

use crate::ast::{NodeArena, NodeId};
use crate::config::{SemaConfig, Target};
use crate::constant::StringPool;
use crate::diagnostics::{Diagnostics, TypeError};
use crate::errors::{FatalError, SemanticError};
use crate::symbols::{DclStack, Role, SymId, SymbolTable};
use crate::types::{Kind, TypeArena, TypeDisplay, TypeId};

pub use declare::{FuncLocals, FuncScope};

/// Declaration lists filled as names are declared.
#[derive(Debug, Clone, Default)]
pub struct DeclLists {
    /// Package-level variables and functions.
    pub externdcl: Vec<NodeId>,
    /// Locals of the function being compiled.
    pub autodcl: Vec<NodeId>,
    /// Parameters and results of the function being compiled.
    pub paramdcl: Vec<NodeId>,
    /// Exported package-level symbols, in declaration order.
    pub exportlist: Vec<SymId>,
    /// Named receiver types with pending method signatures.
    pub signatlist: Vec<TypeId>,
}

pub struct Compilation {
    config: SemaConfig,
    pub symbols: SymbolTable,
    pub dcl: DclStack,
    pub types: TypeArena,
    pub nodes: NodeArena,
    pub strings: StringPool,
    pub history: LineHistory,
    pub lists: DeclLists,
    diagnostics: Diagnostics,
    vargen: u32,
    funcdepth: u32,
    deferred_layout: Option<Vec<(TypeId, Pos)>>,
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("package", &self.config.package)
            .field("symbols", &self.symbols)
            .field("types", &self.types)
            .field("errors", &self.diagnostics.count())
            .finish_non_exhaustive()
    }
}

impl Compilation {
    pub fn new(config: SemaConfig) -> Self {
        let mut compilation = Self {
            symbols: SymbolTable::new(&config.package),
            dcl: DclStack::new(),
            types: TypeArena::with_target(config.target),
            nodes: NodeArena::new(),
            strings: StringPool::new(),
            history: LineHistory::new(),
            lists: DeclLists::default(),
            diagnostics: Diagnostics::new(config.error_limit),
            vargen: 0,
            funcdepth: 0,
            deferred_layout: None,
            config,
        };
        compilation.declare_universe();
        compilation
    }

    /// Bind the predeclared names at block 0, outside every scope, so no
    /// `pop_to` can remove them.
    fn declare_universe(&mut self) {
        for kind in Kind::BASIC {
            if let Some(ty) = TypeId::basic(kind) {
                self.bind_universe(kind.name(), Role::Type(ty));
            }
        }
        self.bind_universe("byte", Role::Type(TypeId::BYTE));

        let t = self.nodes.bool_const(true, Pos::NONE);
        let f = self.nodes.bool_const(false, Pos::NONE);
        let nil = self.nodes.nil_const(Pos::NONE);
        self.bind_universe("true", Role::Const(t));
        self.bind_universe("false", Role::Const(f));
        self.bind_universe("nil", Role::Const(nil));
        tracing::debug!(symbols = self.symbols.len(), "declared universe");
    }

    fn bind_universe(&mut self, name: &str, role: Role) {
        let sym = self.symbols.lookup(name);
        self.symbols.get_mut(sym).bind(role, 0, Pos::NONE);
    }

    pub fn config(&self) -> &SemaConfig {
        &self.config
    }

    pub fn target(&self) -> &Target {
        &self.config.target
    }

    pub fn funcdepth(&self) -> u32 {
        self.funcdepth
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Report a recoverable error and continue.
    pub fn report(&mut self, error: SemanticError, pos: Pos) {
        self.diagnostics.report(error, pos);
    }

    /// Report an error against a node once. Later reports against the same
    /// node are dropped.
    pub fn diagnose(&mut self, n: NodeId, error: SemanticError) {
        let node = self.nodes.get_mut(n);
        if node.diag {
            return;
        }
        node.diag = true;
        let pos = node.pos;
        self.report(error, pos);
    }

    /// Abort once the error ceiling has been reached.
    pub fn check_limit(&self) -> Result<(), FatalError> {
        self.diagnostics.check_limit()
    }

    pub fn errors(&self) -> &[TypeError] {
        self.diagnostics.errors()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.count()
    }

    pub fn take_errors(&mut self) -> Vec<TypeError> {
        self.diagnostics.take()
    }

    /// No errors were reported.
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn position(&self, pos: Pos) -> Option<Position<'_>> {
        self.history.resolve(pos)
    }

    /// `file:line`, or the raw counter when the history does not cover it.
    pub fn position_string(&self, pos: Pos) -> String {
        match self.position(pos) {
            Some(p) => p.to_string(),
            None => format!("line {}", pos.raw()),
        }
    }

    /// `file:line: message`.
    pub fn render(&self, error: &TypeError) -> String {
        match self.position(error.pos) {
            Some(p) => format!("{}: {}", p, error.error),
            None => error.error.to_string(),
        }
    }

    pub fn display_type(&self, ty: TypeId) -> String {
        TypeDisplay::new(&self.types, &self.symbols, ty).to_string()
    }

    pub(crate) fn next_vargen(&mut self) -> u32 {
        self.vargen += 1;
        self.vargen
    }
}

/// Builds a [`Compilation`] from configuration options.
#[derive(Debug, Clone, Default)]
pub struct CompilationBuilder {
    config: SemaConfig,
}

impl CompilationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: Target) -> Self {
        self.config.target = target;
        self
    }

    /// Errors tolerated before compilation aborts. Zero means no limit.
    pub fn error_limit(mut self, limit: usize) -> Self {
        self.config.error_limit = limit;
        self
    }

    pub fn package(mut self, name: &str) -> Self {
        self.config.package = name.to_string();
        self
    }

    pub fn build(self) -> Compilation {
        Compilation::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::Lexical;

    #[test]
    fn universe_is_predeclared() {
        let mut c = CompilationBuilder::new().build();
        let int = c.symbols.lookup("int");
        assert_eq!(c.symbols.get(int).otype, Some(TypeId::INT));
        assert_eq!(c.symbols.get(int).block, 0);
        let byte = c.symbols.lookup("byte");
        assert_eq!(c.symbols.get(byte).otype, Some(TypeId::UINT8));
        let t = c.symbols.lookup("true");
        assert_eq!(c.symbols.get(t).lexical, Lexical::Const);
        assert!(c.succeeded());
    }

    #[test]
    fn builder_applies_options() {
        let c = CompilationBuilder::new()
            .package("demo")
            .error_limit(3)
            .target(Target {
                ptr_width: 4,
                int_width: 4,
                max_align: 4,
            })
            .build();
        assert_eq!(c.config().package, "demo");
        assert_eq!(c.config().error_limit, 3);
        assert_eq!(c.target().ptr_width, 4);
        assert_eq!(c.symbols.names().resolve(c.symbols.local_package()), "demo");
    }

    #[test]
    fn render_uses_history() {
        let mut c = CompilationBuilder::new().build();
        c.history.record_file_push("main.k", Pos::new(1), 1);
        c.report(SemanticError::DivisionByZero, Pos::new(3));
        let rendered = c.render(&c.errors()[0]);
        assert_eq!(rendered, "main.k:3: division by zero");
    }
}
