// export.rs
//
// Export and import of package-level declarations as structured records.
//
// Export walks the export list and emits one record per symbol, preceded by
// a record for every local named type it references, so an importer always
// meets a type's declaration before its uses (recursive types refer to
// themselves by name). Import rebuilds symbol bindings and types from the
// records; importing the same records twice changes nothing.

use keel_identity::Pos;
use keel_mparith::{MpFlt, MpInt};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::Compilation;
use crate::ast::{Class, Node, Op};
use crate::constant::Val;
use crate::errors::{FatalError, SemanticError};
use crate::symbols::{Role, SymId};
use crate::types::{ArrayBound, ChanDir, Field, FieldVec, FuncSig, Kind, TypeId, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRecord {
    Basic(Kind),
    /// Reference to a named type declared by its own record.
    Named {
        package: String,
        name: String,
    },
    Ptr(Box<TypeRecord>),
    /// `bound: None` is a slice.
    Array {
        bound: Option<u64>,
        elem: Box<TypeRecord>,
    },
    Struct(Vec<FieldRecord>),
    Chan {
        dir: ChanDir,
        elem: Box<TypeRecord>,
    },
    Map {
        key: Box<TypeRecord>,
        value: Box<TypeRecord>,
    },
    Interface(Vec<FieldRecord>),
    Func(FuncRecord),
    Nil,
    Ideal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: Option<String>,
    pub ty: TypeRecord,
    #[serde(default)]
    pub embedded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FuncRecord {
    pub receiver: Vec<FieldRecord>,
    pub params: Vec<FieldRecord>,
    pub results: Vec<FieldRecord>,
    pub results_named: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstRecord {
    Bool(bool),
    /// Decimal text.
    Int(String),
    /// `mantissa * 2^exp`, mantissa in decimal.
    Float { mantissa: String, exp: i32 },
    Str(Vec<u8>),
    Nil,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportRecord {
    Const {
        name: String,
        ty: TypeRecord,
        value: ConstRecord,
    },
    Var {
        name: String,
        ty: TypeRecord,
    },
    Type {
        name: String,
        def: TypeRecord,
        methods: Vec<FieldRecord>,
    },
    Func {
        name: String,
        ty: FuncRecord,
    },
}

impl ExportRecord {
    pub fn name(&self) -> &str {
        match self {
            ExportRecord::Const { name, .. }
            | ExportRecord::Var { name, .. }
            | ExportRecord::Type { name, .. }
            | ExportRecord::Func { name, .. } => name,
        }
    }
}

/// The records one package exports, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPackage {
    pub package: String,
    pub records: Vec<ExportRecord>,
}

impl ExportPackage {
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn decode(text: &str) -> Result<Self, FatalError> {
        serde_json::from_str(text).map_err(|e| FatalError::CorruptImport {
            reason: e.to_string(),
        })
    }
}

fn corrupt(reason: impl Into<String>) -> FatalError {
    FatalError::CorruptImport {
        reason: reason.into(),
    }
}

// ============================================================================
// Export
// ============================================================================

struct Exporter<'a> {
    c: &'a Compilation,
    /// Named types whose record is emitted or in progress.
    emitted: FxHashSet<TypeId>,
    records: Vec<ExportRecord>,
}

impl Exporter<'_> {
    fn type_record(&mut self, ty: TypeId) -> TypeRecord {
        let c = self.c;
        if let Some(sym) = c.types.sym(ty) {
            if c.symbols.is_local(sym) {
                self.emit_type(ty, sym);
            }
            return TypeRecord::Named {
                package: c.symbols.package(sym).to_string(),
                name: c.symbols.name(sym).to_string(),
            };
        }
        self.kind_record(ty)
    }

    fn kind_record(&mut self, ty: TypeId) -> TypeRecord {
        match self.c.types.kind(ty).clone() {
            TypeKind::Basic(kind) => TypeRecord::Basic(kind),
            TypeKind::Ptr(elem) => TypeRecord::Ptr(Box::new(self.type_record(elem))),
            TypeKind::Array { elem, bound } => TypeRecord::Array {
                bound: match bound {
                    ArrayBound::Fixed(n) => Some(n),
                    ArrayBound::Dynamic => None,
                },
                elem: Box::new(self.type_record(elem)),
            },
            TypeKind::Struct(fields) => TypeRecord::Struct(self.field_records(&fields)),
            TypeKind::Chan { elem, dir } => TypeRecord::Chan {
                dir,
                elem: Box::new(self.type_record(elem)),
            },
            TypeKind::Map { key, value } => TypeRecord::Map {
                key: Box::new(self.type_record(key)),
                value: Box::new(self.type_record(value)),
            },
            TypeKind::Interface(methods) => TypeRecord::Interface(self.field_records(&methods)),
            TypeKind::Func(sig) => TypeRecord::Func(self.func_record(&sig)),
            TypeKind::Ideal => TypeRecord::Ideal,
            TypeKind::Nil => TypeRecord::Nil,
            TypeKind::Forward | TypeKind::Error => {
                tracing::warn!(?ty, "exporting incomplete type");
                TypeRecord::Nil
            }
        }
    }

    fn field_records(&mut self, fields: &[Field]) -> Vec<FieldRecord> {
        fields
            .iter()
            .map(|f| FieldRecord {
                name: f.name.map(|s| self.c.symbols.name(s).to_string()),
                ty: self.type_record(f.ty),
                embedded: f.embedded,
            })
            .collect()
    }

    fn func_record(&mut self, sig: &FuncSig) -> FuncRecord {
        FuncRecord {
            receiver: self.field_records(&sig.receiver),
            params: self.field_records(&sig.params),
            results: self.field_records(&sig.results),
            results_named: sig.results_named,
        }
    }

    fn func_type_record(&mut self, ty: TypeId) -> FuncRecord {
        match self.c.types.func_sig(ty).cloned() {
            Some(sig) => self.func_record(&sig),
            None => FuncRecord::default(),
        }
    }

    /// Emit the declaration of a local named type after everything it
    /// references.
    fn emit_type(&mut self, ty: TypeId, sym: SymId) {
        if !self.emitted.insert(ty) {
            return;
        }
        let def = self.kind_record(ty);
        let methods: Vec<Field> = self.c.types.methods(ty).to_vec();
        let methods = self.field_records(&methods);
        self.records.push(ExportRecord::Type {
            name: self.c.symbols.name(sym).to_string(),
            def,
            methods,
        });
    }

    fn export_symbol(&mut self, sym: SymId) {
        let c = self.c;
        let symbol = c.symbols.get(sym);
        let name = c.symbols.name(sym).to_string();
        if let Some(ty) = symbol.otype {
            self.emit_type(ty, sym);
        } else if let Some(n) = symbol.oconst {
            let node = c.nodes.get(n);
            if node.val.is_some_and(|v| v.overflowed()) {
                tracing::debug!(name, "skipping overflowed constant");
                return;
            }
            let ty = node.ty.unwrap_or(TypeId::IDEAL);
            let value = match node.val {
                Some(Val::Bool(b)) => ConstRecord::Bool(b),
                Some(Val::Int(v)) => ConstRecord::Int(v.to_string()),
                Some(Val::Float(v)) => {
                    let (mant, exp) = v.parts();
                    ConstRecord::Float {
                        mantissa: mant.to_string(),
                        exp,
                    }
                }
                Some(Val::Str(s)) => ConstRecord::Str(c.strings.get(s).to_vec()),
                Some(Val::Nil) | Some(Val::Reg(_)) | None => ConstRecord::Nil,
            };
            let ty = self.type_record(ty);
            self.records.push(ExportRecord::Const { name, ty, value });
        } else if let Some(n) = symbol.oname {
            let node = c.nodes.get(n);
            let ty = node.ty.unwrap_or(TypeId::ERROR);
            let record = if node.class == Class::Func {
                ExportRecord::Func {
                    name,
                    ty: self.func_type_record(ty),
                }
            } else {
                ExportRecord::Var {
                    name,
                    ty: self.type_record(ty),
                }
            };
            self.records.push(record);
        } else {
            tracing::debug!(name, "skipping unbound export");
        }
    }
}

impl Compilation {
    /// Records for every exported symbol, in dependency order.
    pub fn export_records(&self) -> ExportPackage {
        let mut exporter = Exporter {
            c: self,
            emitted: FxHashSet::default(),
            records: Vec::new(),
        };
        for &sym in &self.lists.exportlist {
            exporter.export_symbol(sym);
        }
        let package = self
            .symbols
            .names()
            .resolve(self.symbols.local_package())
            .to_string();
        tracing::debug!(package, records = exporter.records.len(), "exported package");
        ExportPackage {
            package,
            records: exporter.records,
        }
    }

    // ========================================================================
    // Import
    // ========================================================================

    /// Bind the declarations of another package.
    ///
    /// Declarations already imported identically are left alone; a
    /// conflicting redeclaration is reported and the existing binding kept.
    /// Malformed records abort the import.
    pub fn import_records(&mut self, export: &ExportPackage) -> Result<(), FatalError> {
        let pkg = export.package.as_str();
        if pkg.is_empty() {
            return Err(corrupt("empty package name"));
        }
        let mut placeholders = Vec::new();
        for record in &export.records {
            if record.name().is_empty() {
                return Err(corrupt("record with empty name"));
            }
            tracing::trace!(package = pkg, name = record.name(), "importing record");
            self.import_record(pkg, record, &mut placeholders)?;
        }

        if let Some(&fwd) = placeholders.iter().find(|&&t| self.types.is_forward(t)) {
            return Err(corrupt(format!(
                "type {} referenced but never declared",
                self.display_type(fwd)
            )));
        }
        tracing::debug!(package = pkg, records = export.records.len(), "imported package");
        Ok(())
    }

    fn import_record(
        &mut self,
        pkg: &str,
        record: &ExportRecord,
        placeholders: &mut Vec<TypeId>,
    ) -> Result<(), FatalError> {
        match record {
            ExportRecord::Type { name, def, methods } => {
                let ty = self.import_named(pkg, name, placeholders)?;
                let kind = self.import_kind(pkg, def, placeholders)?;
                if self.types.is_forward(ty) {
                    self.types.update_forward(ty, kind);
                } else {
                    let candidate = self.kind_type(kind);
                    if !self.types.structural_equal(ty, candidate) {
                        self.incompatible(pkg, name);
                        return Ok(());
                    }
                }
                for method in methods {
                    let Some(mname) = &method.name else {
                        return Err(corrupt(format!("unnamed method on {pkg}.{name}")));
                    };
                    let msym = self.symbols.lookup_in_package(pkg, mname);
                    let mty = self.import_type(pkg, &method.ty, placeholders)?;
                    match self.types.find_method(ty, msym).map(|m| m.ty) {
                        None => self.types.add_method(ty, Field::named(msym, mty)),
                        Some(existing) if self.types.structural_equal(existing, mty) => {}
                        Some(_) => self.incompatible(pkg, name),
                    }
                }
            }
            ExportRecord::Const { name, ty, value } => {
                let ty = self.import_type(pkg, ty, placeholders)?;
                let val = self.import_value(value)?;
                let sym = self.symbols.lookup_in_package(pkg, name);
                let symbol = self.symbols.get(sym);
                let (existing, bound) = (symbol.oconst, symbol.is_bound());
                match existing {
                    Some(n) => {
                        let node = self.nodes.get(n);
                        if node.val != Some(val) || node.ty != Some(ty) {
                            self.incompatible(pkg, name);
                        }
                    }
                    None if bound => self.incompatible(pkg, name),
                    None => {
                        let n = self.nodes.make_literal(val, ty, Pos::NONE);
                        self.bind_import(sym, Role::Const(n));
                    }
                }
            }
            ExportRecord::Var { name, ty } => {
                let ty = self.import_type(pkg, ty, placeholders)?;
                self.import_var(pkg, name, ty, Class::Extern);
            }
            ExportRecord::Func { name, ty } => {
                let sig = self.import_sig(pkg, ty, placeholders)?;
                let ty = self.types.make_func(sig);
                self.import_var(pkg, name, ty, Class::Func);
            }
        }
        Ok(())
    }

    fn incompatible(&mut self, pkg: &str, name: &str) {
        self.report(
            SemanticError::IncompatibleImport {
                name: format!("{pkg}.{name}"),
            },
            Pos::NONE,
        );
    }

    /// Imported bindings are permanent: they are not logged on the
    /// declaration stack, so no scope pop removes them.
    fn bind_import(&mut self, sym: SymId, role: Role) {
        let block = self.dcl.block();
        let symbol = self.symbols.get_mut(sym);
        symbol.bind(role, block, Pos::NONE);
        symbol.imported = true;
    }

    fn import_var(&mut self, pkg: &str, name: &str, ty: TypeId, class: Class) {
        let sym = self.symbols.lookup_in_package(pkg, name);
        let symbol = self.symbols.get(sym);
        let (existing, bound) = (symbol.oname, symbol.is_bound());
        match existing {
            Some(n) => {
                let existing = self.nodes.get(n).ty.unwrap_or(TypeId::ERROR);
                if !self.types.structural_equal(existing, ty) {
                    self.incompatible(pkg, name);
                }
            }
            None if bound => self.incompatible(pkg, name),
            None => {
                let n = self.nodes.alloc(Node {
                    op: Op::Name,
                    sym: Some(sym),
                    ty: Some(ty),
                    ullman: 1,
                    class,
                    ..Node::default()
                });
                self.bind_import(sym, Role::Var(n));
            }
        }
    }

    /// The type bound to `pkg.name`, creating a forward placeholder when the
    /// name has not been seen yet.
    fn import_named(
        &mut self,
        pkg: &str,
        name: &str,
        placeholders: &mut Vec<TypeId>,
    ) -> Result<TypeId, FatalError> {
        if name.is_empty() {
            return Err(corrupt("named type with empty name"));
        }
        let sym = self.symbols.lookup_in_package(pkg, name);
        let symbol = self.symbols.get(sym);
        if let Some(ty) = symbol.otype {
            return Ok(ty);
        }
        if symbol.is_bound() {
            return Err(corrupt(format!("{pkg}.{name} is not a type")));
        }
        let fwd = self.types.new_forward(sym);
        self.bind_import(sym, Role::Type(fwd));
        placeholders.push(fwd);
        Ok(fwd)
    }

    fn import_type(
        &mut self,
        pkg: &str,
        record: &TypeRecord,
        placeholders: &mut Vec<TypeId>,
    ) -> Result<TypeId, FatalError> {
        match record {
            TypeRecord::Named { package, name } => self.import_named(package, name, placeholders),
            TypeRecord::Basic(kind) => {
                TypeId::basic(*kind).ok_or_else(|| corrupt(format!("{kind} is not a basic type")))
            }
            TypeRecord::Nil => Ok(TypeId::NIL),
            TypeRecord::Ideal => Ok(TypeId::IDEAL),
            _ => {
                let kind = self.import_kind(pkg, record, placeholders)?;
                Ok(self.kind_type(kind))
            }
        }
    }

    fn import_fields(
        &mut self,
        pkg: &str,
        fields: &[FieldRecord],
        placeholders: &mut Vec<TypeId>,
    ) -> Result<FieldVec, FatalError> {
        fields
            .iter()
            .map(|f| {
                Ok(Field {
                    name: f
                        .name
                        .as_deref()
                        .map(|name| self.symbols.lookup_in_package(pkg, name)),
                    ty: self.import_type(pkg, &f.ty, placeholders)?,
                    embedded: f.embedded,
                })
            })
            .collect()
    }

    fn import_sig(
        &mut self,
        pkg: &str,
        record: &FuncRecord,
        placeholders: &mut Vec<TypeId>,
    ) -> Result<FuncSig, FatalError> {
        Ok(FuncSig {
            receiver: self.import_fields(pkg, &record.receiver, placeholders)?,
            params: self.import_fields(pkg, &record.params, placeholders)?,
            results: self.import_fields(pkg, &record.results, placeholders)?,
            results_named: record.results_named,
        })
    }

    fn import_kind(
        &mut self,
        pkg: &str,
        record: &TypeRecord,
        placeholders: &mut Vec<TypeId>,
    ) -> Result<TypeKind, FatalError> {
        let kind = match record {
            TypeRecord::Basic(kind) if kind.is_basic() => TypeKind::Basic(*kind),
            TypeRecord::Basic(kind) => return Err(corrupt(format!("{kind} is not a basic type"))),
            TypeRecord::Named { package, name } => {
                let ty = self.import_named(package, name, placeholders)?;
                self.types.kind(ty).clone()
            }
            TypeRecord::Ptr(elem) => TypeKind::Ptr(self.import_type(pkg, elem, placeholders)?),
            TypeRecord::Array { bound, elem } => TypeKind::Array {
                elem: self.import_type(pkg, elem, placeholders)?,
                bound: bound.map_or(ArrayBound::Dynamic, ArrayBound::Fixed),
            },
            TypeRecord::Struct(fields) => {
                TypeKind::Struct(self.import_fields(pkg, fields, placeholders)?)
            }
            TypeRecord::Chan { dir, elem } => TypeKind::Chan {
                elem: self.import_type(pkg, elem, placeholders)?,
                dir: *dir,
            },
            TypeRecord::Map { key, value } => TypeKind::Map {
                key: self.import_type(pkg, key, placeholders)?,
                value: self.import_type(pkg, value, placeholders)?,
            },
            TypeRecord::Interface(methods) => {
                TypeKind::Interface(self.import_fields(pkg, methods, placeholders)?)
            }
            TypeRecord::Func(sig) => TypeKind::Func(self.import_sig(pkg, sig, placeholders)?),
            TypeRecord::Nil => TypeKind::Nil,
            TypeRecord::Ideal => TypeKind::Ideal,
        };
        Ok(kind)
    }

    /// Anonymous type of shape `kind`.
    fn kind_type(&mut self, kind: TypeKind) -> TypeId {
        match kind {
            TypeKind::Basic(k) => TypeId::basic(k).unwrap_or(TypeId::ERROR),
            TypeKind::Ptr(elem) => self.types.make_pointer_to(elem),
            TypeKind::Array { elem, bound } => self.types.make_array(bound, elem),
            TypeKind::Struct(fields) => self.types.make_struct(fields),
            TypeKind::Chan { elem, dir } => self.types.make_chan(elem, dir),
            TypeKind::Map { key, value } => self.types.make_map(key, value),
            TypeKind::Interface(methods) => self.types.make_interface(methods),
            TypeKind::Func(sig) => self.types.make_func(sig),
            TypeKind::Ideal => TypeId::IDEAL,
            TypeKind::Nil => TypeId::NIL,
            TypeKind::Forward | TypeKind::Error => TypeId::ERROR,
        }
    }

    fn import_value(&mut self, record: &ConstRecord) -> Result<Val, FatalError> {
        let parse_int = |text: &str| {
            MpInt::parse(text).map_err(|e| corrupt(format!("constant {text:?}: {e}")))
        };
        Ok(match record {
            ConstRecord::Bool(b) => Val::Bool(*b),
            ConstRecord::Int(text) => Val::Int(parse_int(text)?),
            ConstRecord::Float { mantissa, exp } => {
                Val::Float(MpFlt::from_parts(parse_int(mantissa)?, *exp))
            }
            ConstRecord::Str(bytes) => Val::Str(self.strings.intern(bytes)),
            ConstRecord::Nil => Val::Nil,
        })
    }
}

#[cfg(test)]
mod tests {
    use keel_identity::Pos;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    use super::*;
    use crate::CompilationBuilder;
    use crate::symbols::DeclContext;

    fn exporter() -> Compilation {
        let mut c = CompilationBuilder::new().package("geom").build();
        let (point, x, y, next) = (
            c.symbols.lookup("Point"),
            c.symbols.lookup("x"),
            c.symbols.lookup("y"),
            c.symbols.lookup("next"),
        );
        let pt = c.declare_type(point, None, Pos::new(1));
        let ptr = c.types.make_pointer_to(pt);
        c.update_forward(
            pt,
            TypeKind::Struct(smallvec![
                Field::named(x, TypeId::INT),
                Field::named(y, TypeId::INT),
                Field::named(next, ptr),
            ]),
            Pos::new(1),
        );

        let origin = c.symbols.lookup("Origin");
        c.declare_var(origin, ptr, DeclContext::Extern, Pos::new(2));

        let max = c.symbols.lookup("Max");
        let lit = c.nodes.int_const(1 << 40, Pos::new(3));
        c.declare_const(max, lit, Pos::new(3));

        let norm = c.symbols.lookup("Norm");
        let sig = FuncSig::new(FieldVec::new(), smallvec![Field::anon(TypeId::FLOAT64)]);
        let fn_ty = c.types.make_func(sig);
        assert!(c.add_method(ptr, norm, fn_ty, Pos::new(4)));
        c
    }

    #[test]
    fn export_order_and_shape() {
        let c = exporter();
        let export = c.export_records();
        assert_eq!(export.package, "geom");
        let names: Vec<&str> = export.records.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Point", "Origin", "Max"]);
        let ExportRecord::Type { methods, .. } = &export.records[0] else {
            panic!("expected a type record");
        };
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn overflowed_constants_are_not_exported() {
        let mut c = exporter();
        let big = c.symbols.lookup("Big");
        let huge = "9".repeat(200);
        let lit = c.literal(crate::constant::LiteralText::Int(&huge), Pos::new(9));
        c.declare_const(big, lit, Pos::new(9));
        assert_eq!(c.error_count(), 1);

        let export = c.export_records();
        assert!(export.records.iter().all(|r| r.name() != "Big"));

        let mut importer = CompilationBuilder::new().build();
        importer.import_records(&export).unwrap();
        assert!(importer.succeeded());
    }

    #[test]
    fn import_rebuilds_bindings() {
        let export = exporter().export_records();
        let text = export.encode().unwrap();
        let decoded = ExportPackage::decode(&text).unwrap();
        assert_eq!(decoded, export);

        let mut c = CompilationBuilder::new().build();
        c.import_records(&decoded).unwrap();
        assert!(c.succeeded());

        let point = c.symbols.lookup_in_package("geom", "Point");
        let pt = c.symbols.get(point).otype.unwrap();
        assert!(c.symbols.get(point).imported);
        assert_eq!(c.display_type(pt), "geom.Point");
        assert_eq!(c.types.fields(pt).len(), 3);
        assert_eq!(c.types.methods(pt).len(), 1);

        let origin = c.symbols.lookup_in_package("geom", "Origin");
        let n = c.symbols.get(origin).oname.unwrap();
        assert_eq!(c.display_type(c.nodes.get(n).ty.unwrap()), "*geom.Point");

        let max = c.symbols.lookup_in_package("geom", "Max");
        let k = c.symbols.get(max).oconst.unwrap();
        assert_eq!(c.nodes.get(k).int_val(), Some(&MpInt::from_i64(1 << 40)));
    }

    #[test]
    fn reimport_is_a_no_op() {
        let export = exporter().export_records();
        let mut c = CompilationBuilder::new().build();
        c.import_records(&export).unwrap();
        let point = c.symbols.lookup_in_package("geom", "Point");
        let before = c.symbols.get(point).binding();
        c.import_records(&export).unwrap();
        assert_eq!(c.symbols.get(point).binding(), before);
        assert_eq!(c.types.methods(before.otype.unwrap()).len(), 1);
        assert!(c.succeeded());
    }

    #[test]
    fn conflicting_reimport_is_reported() {
        let mut export = exporter().export_records();
        let mut c = CompilationBuilder::new().build();
        c.import_records(&export).unwrap();
        for record in &mut export.records {
            if let ExportRecord::Var { ty, .. } = record {
                *ty = TypeRecord::Basic(Kind::String);
            }
        }
        c.import_records(&export).unwrap();
        assert_eq!(
            c.errors()[0].error,
            SemanticError::IncompatibleImport {
                name: "geom.Origin".into()
            }
        );
    }

    #[test]
    fn corrupt_records_abort() {
        let mut c = CompilationBuilder::new().build();
        let empty = ExportPackage {
            package: "p".into(),
            records: vec![ExportRecord::Var {
                name: String::new(),
                ty: TypeRecord::Basic(Kind::Int),
            }],
        };
        assert!(matches!(
            c.import_records(&empty),
            Err(FatalError::CorruptImport { .. })
        ));

        let dangling = ExportPackage {
            package: "p".into(),
            records: vec![ExportRecord::Var {
                name: "V".into(),
                ty: TypeRecord::Named {
                    package: "p".into(),
                    name: "Missing".into(),
                },
            }],
        };
        assert!(matches!(
            c.import_records(&dangling),
            Err(FatalError::CorruptImport { .. })
        ));

        let not_a_type = ExportPackage {
            package: "p".into(),
            records: vec![ExportRecord::Var {
                name: "W".into(),
                ty: TypeRecord::Named {
                    package: "p".into(),
                    name: "V".into(),
                },
            }],
        };
        assert!(matches!(
            c.import_records(&not_a_type),
            Err(FatalError::CorruptImport { .. })
        ));

        assert!(matches!(
            ExportPackage::decode("{not json"),
            Err(FatalError::CorruptImport { .. })
        ));
    }
}
