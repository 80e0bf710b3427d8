//! Negotiation entry points.
//!
//! A compilation negotiates in two steps:
//!
//! 1. [`TypesContext::predeclare`] registers every top-level name (types,
//!    generics, imports, functions, variables), then resolves type bodies
//!    and function signatures, so forward references and mutual recursion
//!    resolve no matter the order statements are later negotiated in.
//! 2. [`TypesContext::negotiate`] checks one top-level statement. It must be
//!    called at most once per statement, after the statements it depends on.

mod expr;
mod stmt;

use have_ast::{
    CodeBlock, FuncDecl, IfaceStmt, LabelSet, ObjectKind, Stmt, StmtKind, StructStmt,
    TopLevelStmt, TypeDeclStmt,
};
use have_common::Span;
use have_types::{CustomType, DeclId, Field, FuncType, IfaceMethod, IfaceType, Method, StructType, Type};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::context::TypesContext;
use crate::env::PACKAGE;
use crate::error::TypeError;

/// Control-flow context of the function (or top-level statement) being
/// negotiated.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    /// `None` outside of functions.
    pub(crate) results: Option<Vec<Type>>,
    /// A bare `return` is allowed when every result is named.
    pub(crate) named_results: bool,
    pub(crate) labels: LabelSet,
    pub(crate) breakables: Vec<Breakable>,
}

#[derive(Debug)]
pub(crate) struct Breakable {
    pub(crate) label: Option<String>,
    pub(crate) is_loop: bool,
}

type Errors = Vec<TypeError>;

impl TypesContext {
    /// Register the names of all top-level statements, then resolve their
    /// declared types and signatures.
    pub fn predeclare(&mut self, stmts: &mut [TopLevelStmt]) -> Result<(), Errors> {
        let mut errors = Vec::new();
        for top in stmts.iter_mut() {
            if let Err(e) = self.declare_names(&mut top.stmt) {
                errors.push(e);
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        let mut declared_types = Vec::new();
        for top in stmts.iter_mut() {
            match self.declare_signatures(&mut top.stmt) {
                Ok(Some(decl)) => declared_types.push((decl, top.stmt.span)),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        let mut reported = FxHashSet::default();
        for (decl, span) in declared_types {
            if let Some(names) = self.types.containment_cycle(decl) {
                // Every member of a cycle finds it; report it once.
                let mut members = names.clone();
                members.sort();
                if reported.insert(members) {
                    errors.push(TypeError::RecursiveType { names, span });
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Negotiate one predeclared top-level statement.
    pub fn negotiate(&mut self, stmt: &mut Stmt) -> Result<(), Errors> {
        self.frames.push(Frame::default());
        let mut result = self.collect_labels(std::slice::from_mut(stmt));
        if result.is_ok() {
            result = self.top_level(stmt);
        }
        self.frames.pop();
        result.map_err(|e| vec![e])?;
        debug_assert_no_placeholders(stmt);
        Ok(())
    }

    /// Negotiate the body of a freshly parsed instantiation. Its names are not
    /// bound in any scope; the caller has reserved its object or declaration.
    pub(crate) fn negotiate_instance(&mut self, stmt: &mut Stmt) -> Result<(), Errors> {
        let span = stmt.span;
        let result = match &mut stmt.kind {
            StmtKind::Struct(s) => self.define_struct(s, span).and_then(|()| match s.decl {
                Some(decl) => match self.types.containment_cycle(decl) {
                    Some(names) => Err(TypeError::RecursiveType { names, span }),
                    None => Ok(()),
                },
                None => Ok(()),
            }),
            StmtKind::Func(f) => self.instance_func(f, span),
            _ => unreachable!("instantiations are functions or structs"),
        };
        result.map_err(|e| vec![e])?;
        debug_assert_no_placeholders(stmt);
        Ok(())
    }

    fn instance_func(&mut self, f: &mut FuncDecl, span: Span) -> Result<(), TypeError> {
        let sig = self.resolve_signature(f, span)?;
        // Set before the body so recursive calls see the signature.
        if let Some(object) = f.object {
            self.objects.get_mut(object).kind = ObjectKind::Var(Type::Func(sig));
        }
        self.func_body(f)
    }

    fn top_level(&mut self, stmt: &mut Stmt) -> Result<(), TypeError> {
        let span = stmt.span;
        match &mut stmt.kind {
            // Signatures and type bodies were resolved by `predeclare`.
            StmtKind::Func(f) => return self.func_body(f),
            StmtKind::Struct(_)
            | StmtKind::TypeDecl(_)
            | StmtKind::Iface(_)
            | StmtKind::Generic(_)
            | StmtKind::Import(_) => return Ok(()),
            StmtKind::Var(v) => return self.var_stmt(v, span, true),
            _ => {}
        }
        self.stmt(stmt)
    }

    /// First predeclaration pass: bind the name, with its type left open.
    fn declare_names(&mut self, stmt: &mut Stmt) -> Result<(), TypeError> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Struct(StructStmt { name, decl, .. })
            | StmtKind::TypeDecl(TypeDeclStmt { name, decl, .. })
            | StmtKind::Iface(IfaceStmt { name, decl, .. }) => {
                *decl = Some(self.declare_type_name(name, span)?);
            }
            StmtKind::Generic(template) => {
                let name = template.name.clone();
                let id = self.register_template(template.clone());
                self.bind_new(&name, span, ObjectKind::Generic(id))?;
            }
            StmtKind::Import(import) => {
                let id = self.bind_new(&import.name, span, ObjectKind::Package(import.package.clone()))?;
                import.object = Some(id);
                let mut exported: Vec<(&String, &Type)> = import.package.types.iter().collect();
                exported.sort_by(|a, b| a.0.cmp(b.0));
                for (type_name, underlying) in exported {
                    let decl = self.types.declare(
                        type_name.clone(),
                        Some(import.name.clone()),
                        underlying.clone(),
                    );
                    self.package_types
                        .insert((import.name.clone(), type_name.clone()), decl);
                }
            }
            StmtKind::Func(f) if f.receiver.is_none() => {
                let id = self.bind_new(&f.name, span, ObjectKind::Var(Type::Unknown))?;
                f.object = Some(id);
            }
            StmtKind::Var(v) => {
                for decl in &mut v.decls {
                    for var in &mut decl.vars {
                        if var.is_blank() {
                            continue;
                        }
                        let id = self.bind_new(&var.name, var.span, ObjectKind::Var(Type::Unknown))?;
                        var.object = Some(id);
                    }
                }
            }
            _ => {}
        }
        trace!(span = ?span, "declared top-level names");
        Ok(())
    }

    /// Second predeclaration pass: resolve what the names stand for. Returns
    /// the declaration of a named type so the caller can check for cycles.
    fn declare_signatures(&mut self, stmt: &mut Stmt) -> Result<Option<DeclId>, TypeError> {
        let span = stmt.span;
        match &mut stmt.kind {
            StmtKind::Struct(s) => {
                self.define_struct(s, span)?;
                Ok(s.decl)
            }
            StmtKind::TypeDecl(t) => {
                self.define_type_decl(t, span)?;
                Ok(t.decl)
            }
            StmtKind::Iface(i) => {
                self.define_iface(i, span)?;
                Ok(i.decl)
            }
            StmtKind::Func(f) => {
                let sig = self.resolve_signature(f, span)?;
                match &f.receiver {
                    None => {
                        if let Some(object) = f.object {
                            self.objects.get_mut(object).kind = ObjectKind::Var(Type::Func(sig));
                        }
                    }
                    Some(recv) => self.attach_method(f.name.clone(), &recv.ty, sig, span)?,
                }
                Ok(None)
            }
            StmtKind::Var(v) => {
                for decl in &mut v.decls {
                    for var in &mut decl.vars {
                        if var.ty == Type::Unknown {
                            continue;
                        }
                        self.resolve_type(&mut var.ty, var.span)?;
                        if let Some(object) = var.object {
                            self.objects.get_mut(object).kind = ObjectKind::Var(var.ty.clone());
                        }
                    }
                }
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    /// Bind a new object in the innermost scope, rejecting redeclarations.
    pub(crate) fn bind_new(
        &mut self,
        name: &str,
        span: Span,
        kind: ObjectKind,
    ) -> Result<have_ast::ObjectId, TypeError> {
        // Top-level names also clash with instantiations of earlier units.
        let at_package = self.env.depth() == PACKAGE + 1;
        let existing = self.env.lookup_local(name).or_else(|| match at_package {
            true => self.inst_names.get(name).copied(),
            false => None,
        });
        if let Some(existing) = existing {
            return Err(TypeError::Redeclared {
                name: name.to_string(),
                span,
                first: self.objects.get(existing).span,
            });
        }
        let id = self.objects.alloc(name, span, kind);
        self.env.insert(name.to_string(), id);
        Ok(id)
    }

    pub(crate) fn declare_type_name(&mut self, name: &str, span: Span) -> Result<DeclId, TypeError> {
        let decl = self.types.declare(name, None, Type::Unknown);
        let ty = Type::Custom(CustomType {
            name: name.to_string(),
            package: None,
            decl: Some(decl),
        });
        self.bind_new(name, span, ObjectKind::TypeName(ty))?;
        Ok(decl)
    }

    pub(crate) fn define_struct(&mut self, s: &mut StructStmt, span: Span) -> Result<(), TypeError> {
        let mut fields = Vec::with_capacity(s.fields.len());
        for field in &mut s.fields {
            if fields.iter().any(|f: &Field| f.name == field.name) {
                return Err(TypeError::Redeclared {
                    name: field.name.clone(),
                    span: field.span,
                    first: span,
                });
            }
            self.resolve_type(&mut field.ty, field.span)?;
            fields.push(Field {
                name: field.name.clone(),
                ty: field.ty.clone(),
            });
        }
        if let Some(decl) = s.decl {
            self.types.set_aliased(
                decl,
                Type::Struct(StructType {
                    name: s.name.clone(),
                    fields,
                }),
            );
        }
        Ok(())
    }

    pub(crate) fn define_type_decl(&mut self, t: &mut TypeDeclStmt, span: Span) -> Result<(), TypeError> {
        self.resolve_type(&mut t.ty, span)?;
        if let Some(decl) = t.decl {
            self.types.set_aliased(decl, t.ty.clone());
        }
        Ok(())
    }

    pub(crate) fn define_iface(&mut self, i: &mut IfaceStmt, span: Span) -> Result<(), TypeError> {
        let mut methods: Vec<IfaceMethod> = Vec::with_capacity(i.methods.len());
        for m in &mut i.methods {
            if methods.iter().any(|seen| seen.name == m.name) {
                return Err(TypeError::Redeclared {
                    name: m.name.clone(),
                    span: m.span,
                    first: span,
                });
            }
            for t in m.ty.args.iter_mut().chain(m.ty.results.iter_mut()) {
                self.resolve_type(t, m.span)?;
            }
            methods.push(IfaceMethod {
                name: m.name.clone(),
                ty: m.ty.clone(),
            });
        }
        if let Some(decl) = i.decl {
            self.types.set_aliased(
                decl,
                Type::Interface(IfaceType {
                    name: i.name.clone(),
                    methods,
                }),
            );
        }
        Ok(())
    }

    fn attach_method(&mut self, name: String, recv: &Type, sig: FuncType, span: Span) -> Result<(), TypeError> {
        let (base, ptr_receiver) = match recv {
            Type::Pointer(to) => (to.as_ref(), true),
            other => (other, false),
        };
        let decl = match base {
            Type::Custom(CustomType {
                decl: Some(decl),
                package: None,
                ..
            }) => *decl,
            _ => {
                return Err(TypeError::invalid(
                    format!("invalid receiver type `{}`", recv),
                    span,
                ))
            }
        };
        if matches!(self.types.get(decl).aliased, Type::Interface(_) | Type::Pointer(_)) {
            return Err(TypeError::invalid(
                format!("invalid receiver type `{}`", recv),
                span,
            ));
        }
        let is_field = matches!(
            &self.types.get(decl).aliased,
            Type::Struct(s) if s.field(&name).is_some()
        );
        if is_field || !self.types.add_method(decl, name.clone(), Method { ty: sig, ptr_receiver }) {
            return Err(TypeError::Redeclared {
                name: format!("{}.{}", self.types.get(decl).name, name),
                span,
                first: span,
            });
        }
        Ok(())
    }

    /// Resolve receiver, parameter and result types in place.
    pub(crate) fn resolve_signature(&mut self, f: &mut FuncDecl, span: Span) -> Result<FuncType, TypeError> {
        if let Some(recv) = &mut f.receiver {
            let recv_span = if recv.span.is_empty() { span } else { recv.span };
            self.resolve_type(&mut recv.ty, recv_span)?;
        }
        for v in f.params.iter_mut().chain(f.results.iter_mut()) {
            let var_span = if v.span.is_empty() { span } else { v.span };
            self.resolve_type(&mut v.ty, var_span)?;
        }
        if f.variadic && !matches!(f.params.last().map(|p| &p.ty), Some(Type::Slice(_))) {
            return Err(TypeError::invalid("variadic parameter must be a slice", span));
        }
        Ok(f.signature())
    }

    /// Negotiate a function body against its resolved signature.
    pub(crate) fn func_body(&mut self, f: &mut FuncDecl) -> Result<(), TypeError> {
        let results = f.results.iter().map(|r| r.ty.clone()).collect();
        self.frames.push(Frame {
            results: Some(results),
            named_results: f.results.iter().all(|r| !r.name.is_empty()),
            ..Frame::default()
        });
        self.env.push_scope();
        let result = self.bind_signature(f).and_then(|()| {
            self.collect_labels(&mut f.body.stmts)?;
            self.block_stmts(&mut f.body)
        });
        self.env.pop_scope();
        self.frames.pop();
        result
    }

    fn bind_signature(&mut self, f: &mut FuncDecl) -> Result<(), TypeError> {
        let vars = f
            .receiver
            .iter_mut()
            .chain(f.params.iter_mut())
            .chain(f.results.iter_mut());
        for v in vars {
            if v.name.is_empty() || v.is_blank() {
                continue;
            }
            let id = self.bind_new(&v.name, v.span, ObjectKind::Var(v.ty.clone()))?;
            v.object = Some(id);
        }
        Ok(())
    }

    /// Register every label of a function body (not of nested literals) in
    /// the current frame.
    pub(crate) fn collect_labels(&mut self, stmts: &mut [Stmt]) -> Result<(), TypeError> {
        for stmt in stmts {
            match &mut stmt.kind {
                StmtKind::Label(l) => {
                    let frame = self.frames.last_mut().expect("negotiation frame");
                    if let Err(first) = frame.labels.add(&l.name, stmt.span) {
                        return Err(TypeError::DuplicateLabel {
                            name: l.name.clone(),
                            span: stmt.span,
                            first,
                        });
                    }
                    let id = self.objects.alloc(l.name.clone(), stmt.span, ObjectKind::Label);
                    l.object = Some(id);
                }
                StmtKind::If(s) => {
                    for b in &mut s.branches {
                        self.collect_block_labels(&mut b.body)?;
                    }
                }
                StmtKind::Switch(s) => {
                    for b in &mut s.branches {
                        self.collect_block_labels(&mut b.body)?;
                    }
                }
                StmtKind::For(s) => self.collect_block_labels(&mut s.body)?,
                StmtKind::ForRange(s) => self.collect_block_labels(&mut s.body)?,
                StmtKind::When(w) => {
                    for b in &mut w.branches {
                        self.collect_block_labels(&mut b.body)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn collect_block_labels(&mut self, block: &mut CodeBlock) -> Result<(), TypeError> {
        self.collect_labels(&mut block.stmts)
    }

    /// Replace named references, package-qualified types and generic
    /// instances in `ty` with resolved named types.
    pub(crate) fn resolve_type(&mut self, ty: &mut Type, span: Span) -> Result<(), TypeError> {
        match ty {
            Type::Custom(c) if c.decl.is_some() => Ok(()),
            Type::Custom(c) => {
                let resolved = match c.package.clone() {
                    None => self.lookup_type_name(&c.name, span)?,
                    Some(pkg) => self.lookup_package_type(&pkg, &c.name, span)?,
                };
                *ty = resolved;
                Ok(())
            }
            Type::GenericInstance(g) => {
                let name = g.name.clone();
                let mut params = std::mem::take(&mut g.params);
                for p in &mut params {
                    self.resolve_type(p, span)?;
                }
                let object = self.env.lookup(&name).ok_or_else(|| TypeError::Undeclared {
                    name: name.clone(),
                    span,
                })?;
                let id = match self.objects.get(object).kind {
                    ObjectKind::Generic(id) => id,
                    _ => return Err(TypeError::NotGeneric { name, span }),
                };
                if !self.template(id).is_struct() {
                    return Err(TypeError::NotAType { name, span });
                }
                let target = self.instantiate(id, params, span)?;
                *ty = target
                    .as_type()
                    .expect("struct instantiations declare a named type");
                Ok(())
            }
            Type::GenericParam(p) => match p.concrete.take() {
                Some(concrete) => {
                    *ty = *concrete;
                    self.resolve_type(ty, span)
                }
                None => Err(TypeError::Undeclared {
                    name: p.name.clone(),
                    span,
                }),
            },
            Type::Unknown => Err(TypeError::CannotInfer {
                what: "type".to_string(),
                span,
            }),
            _ => {
                for child in ty.subtypes_mut() {
                    self.resolve_type(child, span)?;
                }
                Ok(())
            }
        }
    }

    fn lookup_type_name(&self, name: &str, span: Span) -> Result<Type, TypeError> {
        let object = self.env.lookup(name).ok_or_else(|| TypeError::Undeclared {
            name: name.to_string(),
            span,
        })?;
        match &self.objects.get(object).kind {
            ObjectKind::TypeName(ty) => Ok(ty.clone()),
            _ => Err(TypeError::NotAType {
                name: name.to_string(),
                span,
            }),
        }
    }

    pub(crate) fn lookup_package_type(&self, pkg: &str, name: &str, span: Span) -> Result<Type, TypeError> {
        match self.env.lookup(pkg).map(|id| &self.objects.get(id).kind) {
            Some(ObjectKind::Package(_)) => {}
            Some(_) => {
                return Err(TypeError::NotAType {
                    name: format!("{}.{}", pkg, name),
                    span,
                })
            }
            None => {
                return Err(TypeError::Undeclared {
                    name: pkg.to_string(),
                    span,
                })
            }
        }
        match self.package_types.get(&(pkg.to_string(), name.to_string())) {
            Some(&decl) => Ok(Type::Custom(CustomType {
                name: name.to_string(),
                package: Some(pkg.to_string()),
                decl: Some(decl),
            })),
            None => Err(TypeError::UnresolvedImport {
                package: pkg.to_string(),
                member: name.to_string(),
                span,
            }),
        }
    }
}

/// No placeholder type may survive negotiation.
fn debug_assert_no_placeholders(stmt: &mut Stmt) {
    if cfg!(debug_assertions) {
        have_ast::walk::live_stmt_types_mut(stmt, &mut |t: &mut Type| {
            assert!(
                !t.has_placeholders(),
                "placeholder type `{}` survived negotiation",
                t
            );
        });
    }
}
