// symbols/table.rs
//
// Interned (package, name) symbols in a fixed-size chained hash table.

use keel_identity::{Interner, Name, Pos};

use crate::arena::{Arena, arena_id};
use crate::ast::NodeId;
use crate::symbols::dcl::{Binding, Role};
use crate::types::TypeId;

keel_identity::define_entity_id! {
    /// Handle to a symbol. Symbols are never removed.
    pub struct SymId;
}
arena_id!(SymId);

/// Number of hash buckets. Must be a power of two.
pub const NHASH: usize = 1024;
const HASH_MULTIPLIER: u32 = 3;

/// What the active binding of a symbol denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lexical {
    #[default]
    Name,
    Type,
    Const,
    Package,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub package: Name,
    pub name: Name,

    /// Variable, parameter or function name node.
    pub oname: Option<NodeId>,
    pub otype: Option<TypeId>,
    /// Literal node of a constant.
    pub oconst: Option<NodeId>,
    /// Package this name refers to when used as a qualifier.
    pub opack: Option<Name>,
    pub lexical: Lexical,

    /// Block number of the active binding.
    pub block: u32,
    pub vargen: u32,
    pub last_pos: Pos,

    /// An "undefined" diagnostic has already been issued.
    pub undef: bool,
    pub export: bool,
    pub exported: bool,
    pub imported: bool,

    link: Option<SymId>,
}

impl Symbol {
    fn new(package: Name, name: Name) -> Self {
        Self {
            package,
            name,
            oname: None,
            otype: None,
            oconst: None,
            opack: None,
            lexical: Lexical::Name,
            block: 0,
            vargen: 0,
            last_pos: Pos::NONE,
            undef: false,
            export: false,
            exported: false,
            imported: false,
            link: None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.oname.is_some() || self.otype.is_some() || self.oconst.is_some() || self.opack.is_some()
    }

    /// Snapshot of the active binding.
    pub fn binding(&self) -> Binding {
        Binding {
            oname: self.oname,
            otype: self.otype,
            oconst: self.oconst,
            opack: self.opack,
            lexical: self.lexical,
            block: self.block,
            vargen: self.vargen,
            last_pos: self.last_pos,
        }
    }

    pub(crate) fn restore(&mut self, saved: Binding) {
        self.oname = saved.oname;
        self.otype = saved.otype;
        self.oconst = saved.oconst;
        self.opack = saved.opack;
        self.lexical = saved.lexical;
        self.block = saved.block;
        self.vargen = saved.vargen;
        self.last_pos = saved.last_pos;
    }

    /// Replace the active binding. A name denotes one thing per scope, so
    /// the other roles are cleared.
    pub(crate) fn bind(&mut self, role: Role, block: u32, pos: Pos) {
        self.oname = None;
        self.otype = None;
        self.oconst = None;
        self.opack = None;
        match role {
            Role::Var(node) => self.oname = Some(node),
            Role::Type(ty) => self.otype = Some(ty),
            Role::Const(node) => self.oconst = Some(node),
            Role::Package(pkg) => self.opack = Some(pkg),
        }
        self.lexical = role.lexical();
        self.block = block;
        self.last_pos = pos;
    }
}

/// Exported names start with an upper-case letter.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Registry of every symbol in the compilation, keyed by (package, name).
///
/// Owns the identifier interner. Buckets chain symbols in insertion order, so
/// repeated lookups of a name always return the same [`SymId`].
pub struct SymbolTable {
    names: Interner,
    buckets: Box<[Option<SymId>]>,
    symbols: Arena<SymId, Symbol>,
    local: Name,
}

impl std::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.symbols.len())
            .finish_non_exhaustive()
    }
}

impl SymbolTable {
    pub fn new(local_package: &str) -> Self {
        let mut names = Interner::new();
        let local = names.intern(local_package);
        Self {
            names,
            buckets: vec![None; NHASH].into_boxed_slice(),
            symbols: Arena::new(),
            local,
        }
    }

    /// Multiplicative string hash over the name, then the package.
    pub fn hash(package: &str, name: &str) -> usize {
        let h = name
            .bytes()
            .chain(package.bytes())
            .fold(0u32, |h, c| h.wrapping_mul(HASH_MULTIPLIER).wrapping_add(c as u32));
        h as usize & (NHASH - 1)
    }

    pub fn local_package(&self) -> Name {
        self.local
    }

    pub fn names(&self) -> &Interner {
        &self.names
    }

    pub fn intern(&mut self, text: &str) -> Name {
        self.names.intern(text)
    }

    /// Symbol for `name` in the local package, created on first sight.
    pub fn lookup(&mut self, name: &str) -> SymId {
        let package = self.names.resolve(self.local).to_string();
        self.lookup_in_package(&package, name)
    }

    /// Symbol for `name` in `package`, created on first sight.
    pub fn lookup_in_package(&mut self, package: &str, name: &str) -> SymId {
        let bucket = Self::hash(package, name);
        let pkg = self.names.intern(package);
        let ident = self.names.intern(name);

        let mut last = None;
        let mut cursor = self.buckets[bucket];
        while let Some(id) = cursor {
            let sym = &self.symbols[id];
            if sym.package == pkg && sym.name == ident {
                return id;
            }
            last = Some(id);
            cursor = sym.link;
        }

        let id = self.symbols.alloc(Symbol::new(pkg, ident));
        match last {
            Some(tail) => self.symbols[tail].link = Some(id),
            None => self.buckets[bucket] = Some(id),
        }
        tracing::trace!(package, name, bucket, "new symbol");
        id
    }

    /// Find an existing symbol without creating one.
    pub fn find(&self, package: &str, name: &str) -> Option<SymId> {
        let pkg = self.names.lookup(package)?;
        let ident = self.names.lookup(name)?;
        self.bucket_chain(Self::hash(package, name))
            .find(|&id| self.symbols[id].package == pkg && self.symbols[id].name == ident)
    }

    /// Symbols of one bucket in chain order.
    pub fn bucket_chain(&self, bucket: usize) -> impl Iterator<Item = SymId> + '_ {
        std::iter::successors(self.buckets[bucket], move |&id| self.symbols[id].link)
    }

    pub fn get(&self, id: SymId) -> &Symbol {
        &self.symbols[id]
    }

    pub fn get_mut(&mut self, id: SymId) -> &mut Symbol {
        &mut self.symbols[id]
    }

    pub fn name(&self, id: SymId) -> &str {
        self.names.resolve(self.symbols[id].name)
    }

    pub fn package(&self, id: SymId) -> &str {
        self.names.resolve(self.symbols[id].package)
    }

    /// `package.name`.
    pub fn qualified(&self, id: SymId) -> String {
        format!("{}.{}", self.package(id), self.name(id))
    }

    pub fn is_local(&self, id: SymId) -> bool {
        self.symbols[id].package == self.local
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymId, &Symbol)> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_idempotent() {
        let mut table = SymbolTable::new("main");
        let x = table.lookup("x");
        assert_eq!(table.lookup("x"), x);
        assert_eq!(table.lookup_in_package("main", "x"), x);
        assert_ne!(table.lookup_in_package("fmt", "x"), x);
        assert_eq!(table.qualified(x), "main.x");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn find_does_not_create() {
        let mut table = SymbolTable::new("main");
        assert_eq!(table.find("main", "y"), None);
        let y = table.lookup("y");
        assert_eq!(table.find("main", "y"), Some(y));
        assert_eq!(table.find("other", "y"), None);
    }

    #[test]
    fn collisions_chain_in_insertion_order() {
        let mut table = SymbolTable::new("p");
        // Find three names sharing a bucket.
        let target = SymbolTable::hash("p", "a0");
        let colliding: Vec<String> = (0..100_000)
            .map(|i| format!("a{i}"))
            .filter(|n| SymbolTable::hash("p", n) == target)
            .take(3)
            .collect();
        assert_eq!(colliding.len(), 3);

        let ids: Vec<SymId> = colliding.iter().map(|n| table.lookup(n)).collect();
        assert_eq!(table.bucket_chain(target).collect::<Vec<_>>(), ids);
        assert_eq!(table.lookup(&colliding[1]), ids[1]);
    }

    #[test]
    fn hash_stays_in_table() {
        for name in ["", "x", "a_much_longer_identifier_name", "Ünïcödé"] {
            assert!(SymbolTable::hash("pkg", name) < NHASH);
        }
    }

    #[test]
    fn exported_names_start_upper_case() {
        assert!(is_exported_name("Println"));
        assert!(!is_exported_name("println"));
        assert!(!is_exported_name("_X"));
        assert!(!is_exported_name(""));
    }

    #[test]
    fn binding_restores_exactly() {
        let mut table = SymbolTable::new("main");
        let x = table.lookup("x");
        let before = table.get(x).binding();
        table
            .get_mut(x)
            .bind(Role::Type(TypeId::INT), 3, Pos::new(7));
        assert!(table.get(x).is_bound());
        assert_eq!(table.get(x).lexical, Lexical::Type);
        table.get_mut(x).restore(before);
        assert_eq!(table.get(x).binding(), before);
        assert!(!table.get(x).is_bound());
    }
}
