//! Declared and referenced top-level names.
//!
//! Each top-level statement is wrapped once in a [`TopLevelStmt`], which
//! computes the names the statement introduces (`decls`) and the free names
//! it refers to (`deps`). The orchestrator orders negotiation from these.

use std::collections::BTreeSet;

use have_common::Span;
use have_types::Type;
use rustc_hash::FxHashSet;

use crate::expr::{Expr, ExprKind, FuncDecl, Variable};
use crate::stmt::{CodeBlock, GenericBody, RangeVars, Stmt, StmtKind, SwitchValue, VarStmt};

/// Pipeline state of one top-level statement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StmtState {
    Unchecked,
    Negotiating,
    Negotiated,
    Generated,
}

#[derive(Debug)]
pub struct TopLevelStmt {
    pub stmt: Stmt,
    pub state: StmtState,
    decls: Vec<String>,
    deps: Vec<String>,
}

impl TopLevelStmt {
    /// # Panics
    ///
    /// Panics if `stmt` is a shape that cannot stand at top level
    /// (`pass`, `return`, `when`).
    pub fn new(stmt: Stmt) -> Self {
        let decls = declared_names(&stmt);
        let deps = referenced_names(&stmt, &decls);
        TopLevelStmt {
            stmt,
            state: StmtState::Unchecked,
            decls,
            deps,
        }
    }

    /// Names this statement introduces at top level.
    pub fn decls(&self) -> &[String] {
        &self.decls
    }

    /// Free names this statement refers to, sorted.
    pub fn deps(&self) -> &[String] {
        &self.deps
    }

    pub fn span(&self) -> Span {
        self.stmt.span
    }
}

fn declared_names(stmt: &Stmt) -> Vec<String> {
    match &stmt.kind {
        StmtKind::Var(v) => v.vars().map(|v| v.name.clone()).collect(),
        StmtKind::Func(f) => match f.receiver_type_name() {
            Some(recv) => vec![format!("{}.{}", recv, f.name)],
            None => vec![f.name.clone()],
        },
        StmtKind::Struct(s) => vec![s.name.clone()],
        StmtKind::TypeDecl(t) => vec![t.name.clone()],
        StmtKind::Iface(i) => vec![i.name.clone()],
        StmtKind::Generic(g) => vec![g.name.clone()],
        StmtKind::Import(_)
        | StmtKind::Assign(_)
        | StmtKind::Send(_)
        | StmtKind::Switch(_)
        | StmtKind::Expr(_)
        | StmtKind::If(_)
        | StmtKind::For(_)
        | StmtKind::ForRange(_)
        | StmtKind::Branch(_)
        | StmtKind::Label(_) => Vec::new(),
        StmtKind::Pass | StmtKind::Return(_) | StmtKind::When(_) => {
            panic!("statement cannot appear at top level: {:?}", stmt.kind)
        }
    }
}

fn referenced_names(stmt: &Stmt, decls: &[String]) -> Vec<String> {
    let mut collector = DepCollector::default();
    collector.push();
    collector.stmt(stmt);
    collector
        .free
        .into_iter()
        .filter(|name| !decls.contains(name))
        .collect()
}

/// Walks a statement keeping a stack of locally bound names.
#[derive(Default)]
struct DepCollector {
    scopes: Vec<FxHashSet<String>>,
    free: BTreeSet<String>,
}

impl DepCollector {
    fn push(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    fn pop(&mut self) {
        self.scopes.pop();
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|s| s.contains(name))
    }

    fn reference(&mut self, name: &str) {
        if name != have_types::BLANK && !self.is_bound(name) {
            self.free.insert(name.to_string());
        }
    }

    fn ty(&mut self, ty: &Type) {
        ty.walk(&mut |t: &Type| {
            match t {
                Type::Custom(c) => match &c.package {
                    Some(pkg) => self.reference(pkg),
                    None => self.reference(&c.name),
                },
                Type::GenericInstance(g) => match &g.package {
                    Some(pkg) => self.reference(pkg),
                    None => self.reference(&g.name),
                },
                _ => {}
            }
            true
        });
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Var(v) => self.var_stmt(v),
            StmtKind::Func(f) => self.func(f),
            StmtKind::Assign(a) => {
                for e in a.lhs.iter().chain(a.rhs.iter()) {
                    self.expr(e);
                }
            }
            StmtKind::Send(s) => {
                self.expr(&s.channel);
                self.expr(&s.value);
            }
            StmtKind::Struct(s) => {
                for field in &s.fields {
                    self.ty(&field.ty);
                }
            }
            StmtKind::TypeDecl(t) => self.ty(&t.ty),
            StmtKind::Iface(i) => {
                for m in &i.methods {
                    for t in m.ty.args.iter().chain(m.ty.results.iter()) {
                        self.ty(t);
                    }
                }
            }
            StmtKind::Pass | StmtKind::Branch(_) | StmtKind::Label(_) | StmtKind::Import(_) => {}
            StmtKind::If(s) => {
                self.push();
                for b in &s.branches {
                    if let Some(scoped) = &b.scoped {
                        self.var_stmt(scoped);
                    }
                    if let Some(cond) = &b.condition {
                        self.expr(cond);
                    }
                    self.block(&b.body);
                }
                self.pop();
            }
            StmtKind::Switch(s) => {
                self.push();
                if let Some(scoped) = &s.scoped {
                    self.var_stmt(scoped);
                }
                let bind = match &s.value {
                    Some(SwitchValue::Expr(e)) => {
                        self.expr(e);
                        None
                    }
                    Some(SwitchValue::Type(ts)) => {
                        self.expr(&ts.subject);
                        ts.bind.as_deref()
                    }
                    None => None,
                };
                for b in &s.branches {
                    for v in b.values.iter().flatten() {
                        self.expr(v);
                    }
                    self.push();
                    if let Some(name) = bind {
                        self.bind(name);
                    }
                    self.block(&b.body);
                    self.pop();
                }
                self.pop();
            }
            StmtKind::For(s) => {
                self.push();
                if let Some(scoped) = &s.scoped {
                    self.var_stmt(scoped);
                }
                if let Some(cond) = &s.condition {
                    self.expr(cond);
                }
                if let Some(repeat) = &s.repeat {
                    self.stmt(repeat);
                }
                self.block(&s.body);
                self.pop();
            }
            StmtKind::ForRange(s) => {
                self.expr(&s.series);
                self.push();
                match &s.vars {
                    RangeVars::Scoped(vars) => {
                        for v in vars {
                            self.variable(v);
                        }
                    }
                    RangeVars::Outside(exprs) => {
                        for e in exprs {
                            self.expr(e);
                        }
                    }
                }
                self.block(&s.body);
                self.pop();
            }
            StmtKind::Expr(e) => self.expr(e),
            StmtKind::Return(r) => {
                for e in &r.values {
                    self.expr(e);
                }
            }
            StmtKind::When(w) => {
                for t in &w.args {
                    self.ty(t);
                }
                for b in &w.branches {
                    for t in b.predicates.iter().filter_map(|p| p.ty.as_ref()) {
                        self.ty(t);
                    }
                    self.block(&b.body);
                }
            }
            StmtKind::Generic(g) => {
                self.push();
                for p in &g.params {
                    self.bind(p);
                }
                match &g.body {
                    GenericBody::Func(f) => self.func(f),
                    GenericBody::Struct(s) => {
                        for field in &s.fields {
                            self.ty(&field.ty);
                        }
                    }
                }
                self.pop();
            }
        }
    }

    fn block(&mut self, code: &CodeBlock) {
        self.push();
        for stmt in &code.stmts {
            self.stmt(stmt);
        }
        self.pop();
    }

    /// Initializers are read before the names they initialize are bound.
    fn var_stmt(&mut self, v: &VarStmt) {
        for decl in &v.decls {
            for init in &decl.inits {
                self.expr(init);
            }
            for var in &decl.vars {
                self.variable(var);
            }
        }
    }

    fn variable(&mut self, v: &Variable) {
        self.ty(&v.ty);
        self.bind(&v.name);
    }

    fn func(&mut self, f: &FuncDecl) {
        self.push();
        if let Some(recv) = &f.receiver {
            self.variable(recv);
        }
        for v in f.params.iter().chain(f.results.iter()) {
            self.variable(v);
        }
        self.block(&f.body);
        self.pop();
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Blank | ExprKind::Nil | ExprKind::Lit(_) => {}
            ExprKind::Ident(id) => self.reference(&id.name),
            ExprKind::Binary(b) => {
                self.expr(&b.left);
                self.expr(&b.right);
            }
            ExprKind::Unary(u) => self.expr(&u.operand),
            ExprKind::Call(c) => {
                self.expr(&c.callee);
                for a in &c.args {
                    self.expr(a);
                }
            }
            ExprKind::Index(i) => {
                self.expr(&i.base);
                for e in &i.index {
                    self.expr(e);
                }
            }
            ExprKind::Slice(s) => {
                self.expr(&s.base);
                if let Some(lo) = &s.lo {
                    self.expr(lo);
                }
                if let Some(hi) = &s.hi {
                    self.expr(hi);
                }
            }
            ExprKind::Dot(d) => self.expr(&d.left),
            ExprKind::TypeAssert(t) => {
                self.expr(&t.left);
                if let Some(target) = &t.target {
                    self.ty(target);
                }
            }
            ExprKind::Compound(c) => {
                self.ty(&c.ty);
                // Bare identifier keys of struct literals are member names.
                let keys_are_members = !matches!(
                    c.ty,
                    Type::Map(_) | Type::Slice(_) | Type::Array(_)
                );
                for el in &c.elems {
                    match &el.key {
                        Some(Expr {
                            kind: ExprKind::Ident(_),
                            ..
                        }) if keys_are_members => {}
                        Some(key) => self.expr(key),
                        None => {}
                    }
                    self.expr(&el.value);
                }
            }
            ExprKind::FuncLit(f) => self.func(f),
            ExprKind::Type(t) => self.ty(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;
    use crate::expr::BinaryOp;

    #[test]
    fn var_statement_declares_all_names() {
        let top = TopLevelStmt::new(build::var(&["a", "b"], vec![build::int(1), build::int(2)]));
        assert_eq!(top.decls(), ["a", "b"]);
        assert!(top.deps().is_empty());
        assert_eq!(top.state, StmtState::Unchecked);
    }

    #[test]
    fn deps_are_free_identifiers_and_types() {
        // var v T = x + y
        let stmt = build::typed_var(
            "v",
            Type::named("T"),
            Some(build::binary(BinaryOp::Add, build::ident("x"), build::ident("y"))),
        );
        let top = TopLevelStmt::new(stmt);
        assert_eq!(top.decls(), ["v"]);
        assert_eq!(top.deps(), ["T", "x", "y"]);
    }

    #[test]
    fn locally_bound_names_are_not_deps() {
        // func f(a int) int:
        //     b = a + g
        //     return b
        let body = vec![
            build::var(&["b"], vec![build::binary(BinaryOp::Add, build::ident("a"), build::ident("g"))]),
            build::ret(vec![build::ident("b")]),
        ];
        let f = build::func("f", vec![build::param("a", Type::int())], vec![Type::int()], body);
        let top = TopLevelStmt::new(build::func_stmt(f));
        assert_eq!(top.decls(), ["f"]);
        assert_eq!(top.deps(), ["g"]);
    }

    #[test]
    fn recursion_is_not_a_dependency() {
        let body = vec![build::expr_stmt(build::call(build::ident("loop_forever"), vec![]))];
        let f = build::func("loop_forever", vec![], vec![], body);
        let top = TopLevelStmt::new(build::func_stmt(f));
        assert!(top.deps().is_empty());
    }

    #[test]
    fn methods_declare_qualified_names() {
        let recv = build::param("p", Type::pointer(Type::named("Point")));
        let f = build::method(recv, build::func("Norm", vec![], vec![Type::float64()], vec![]));
        let top = TopLevelStmt::new(build::func_stmt(f));
        assert_eq!(top.decls(), ["Point.Norm"]);
        assert_eq!(top.deps(), ["Point"]);
    }

    #[test]
    fn scoped_variables_stay_inside_their_construct() {
        // if t = 1; t == u: print(t)
        let stmt = build::if_stmt(vec![build::if_branch(
            Some(build::scoped(vec![("t", build::int(1))])),
            Some(build::binary(BinaryOp::Eq, build::ident("t"), build::ident("u"))),
            vec![build::expr_stmt(build::call(build::ident("print"), vec![build::ident("t")]))],
        )]);
        let top = TopLevelStmt::new(stmt);
        assert!(top.decls().is_empty());
        assert_eq!(top.deps(), ["print", "u"]);
    }

    #[test]
    fn struct_literal_keys_are_members() {
        let lit = build::keyed_compound(
            Type::named("Point"),
            vec![(build::ident("x"), build::ident("px"))],
        );
        let top = TopLevelStmt::new(build::var(&["p"], vec![lit]));
        assert_eq!(top.deps(), ["Point", "px"]);
    }

    #[test]
    fn generic_params_are_bound() {
        let stmt = build::generic_struct(
            "List",
            &["T"],
            vec![
                ("head", Type::generic_param("T")),
                ("next", Type::pointer(Type::generic_instance("List", vec![Type::generic_param("T")]))),
                ("meta", Type::named("Meta")),
            ],
        );
        let top = TopLevelStmt::new(stmt);
        assert_eq!(top.decls(), ["List"]);
        assert_eq!(top.deps(), ["Meta"]);
    }

    #[test]
    #[should_panic(expected = "cannot appear at top level")]
    fn return_at_top_level_is_fatal() {
        TopLevelStmt::new(build::ret(vec![]));
    }
}
