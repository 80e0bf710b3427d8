//! Traversal of every type slot in a tree.
//!
//! Generic instantiation substitutes parameters through these walkers, and
//! negotiation uses them to check that no placeholder type survives.

use have_types::Type;

use crate::expr::{Expr, ExprKind, FuncDecl, Variable};
use crate::stmt::{CodeBlock, GenericBody, RangeVars, Stmt, StmtKind, SwitchValue, VarStmt};

/// Call `f` on every type stored in `stmt`, including negotiated expression
/// types. Types are visited whole; `f` decides whether to descend.
pub fn stmt_types_mut<F: FnMut(&mut Type)>(stmt: &mut Stmt, f: &mut F) {
    walk_stmt(stmt, f, false)
}

/// Like [`stmt_types_mut`], but skips the bodies of `when` branches that
/// negotiation did not select.
pub fn live_stmt_types_mut<F: FnMut(&mut Type)>(stmt: &mut Stmt, f: &mut F) {
    walk_stmt(stmt, f, true)
}

fn walk_stmt<F: FnMut(&mut Type)>(stmt: &mut Stmt, f: &mut F, live: bool) {
    match &mut stmt.kind {
        StmtKind::Var(v) => var_stmt(v, f, live),
        StmtKind::Func(decl) => func_decl(decl, f, live),
        StmtKind::Assign(a) => {
            for e in a.lhs.iter_mut().chain(a.rhs.iter_mut()) {
                walk_expr(e, f, live);
            }
        }
        StmtKind::Send(s) => {
            walk_expr(&mut s.channel, f, live);
            walk_expr(&mut s.value, f, live);
        }
        StmtKind::Struct(s) => {
            for field in &mut s.fields {
                f(&mut field.ty);
            }
        }
        StmtKind::TypeDecl(t) => f(&mut t.ty),
        StmtKind::Iface(i) => {
            for m in &mut i.methods {
                for t in m.ty.args.iter_mut().chain(m.ty.results.iter_mut()) {
                    f(t);
                }
            }
        }
        StmtKind::Pass | StmtKind::Branch(_) | StmtKind::Label(_) | StmtKind::Import(_) => {}
        StmtKind::If(s) => {
            for b in &mut s.branches {
                if let Some(scoped) = &mut b.scoped {
                    var_stmt(scoped, f, live);
                }
                if let Some(cond) = &mut b.condition {
                    walk_expr(cond, f, live);
                }
                block(&mut b.body, f, live);
            }
        }
        StmtKind::Switch(s) => {
            if let Some(scoped) = &mut s.scoped {
                var_stmt(scoped, f, live);
            }
            match &mut s.value {
                Some(SwitchValue::Expr(e)) => walk_expr(e, f, live),
                Some(SwitchValue::Type(ts)) => walk_expr(&mut ts.subject, f, live),
                None => {}
            }
            for b in &mut s.branches {
                for v in b.values.iter_mut().flatten() {
                    walk_expr(v, f, live);
                }
                if let Some(bound) = &mut b.bound {
                    variable(bound, f);
                }
                block(&mut b.body, f, live);
            }
        }
        StmtKind::For(s) => {
            if let Some(scoped) = &mut s.scoped {
                var_stmt(scoped, f, live);
            }
            if let Some(cond) = &mut s.condition {
                walk_expr(cond, f, live);
            }
            if let Some(repeat) = &mut s.repeat {
                walk_stmt(repeat, f, live);
            }
            block(&mut s.body, f, live);
        }
        StmtKind::ForRange(s) => {
            match &mut s.vars {
                RangeVars::Scoped(vars) => vars.iter_mut().for_each(|v| variable(v, f)),
                RangeVars::Outside(exprs) => exprs.iter_mut().for_each(|e| walk_expr(e, f, live)),
            }
            walk_expr(&mut s.series, f, live);
            block(&mut s.body, f, live);
        }
        StmtKind::Expr(e) => walk_expr(e, f, live),
        StmtKind::Return(r) => {
            for e in &mut r.values {
                walk_expr(e, f, live);
            }
        }
        StmtKind::When(w) => {
            for t in &mut w.args {
                f(t);
            }
            for b in &mut w.branches {
                for p in &mut b.predicates {
                    if let Some(t) = &mut p.ty {
                        f(t);
                    }
                }
                if live && !b.active {
                    continue;
                }
                block(&mut b.body, f, live);
            }
        }
        // A nested template keeps its own parameters.
        StmtKind::Generic(_) => {}
    }
}

pub fn expr_types_mut<F: FnMut(&mut Type)>(expr: &mut Expr, f: &mut F) {
    walk_expr(expr, f, false)
}

fn walk_expr<F: FnMut(&mut Type)>(expr: &mut Expr, f: &mut F, live: bool) {
    if let Some(ty) = &mut expr.ty {
        f(ty);
    }
    match &mut expr.kind {
        ExprKind::Blank | ExprKind::Nil | ExprKind::Lit(_) | ExprKind::Ident(_) => {}
        ExprKind::Binary(b) => {
            walk_expr(&mut b.left, f, live);
            walk_expr(&mut b.right, f, live);
        }
        ExprKind::Unary(u) => walk_expr(&mut u.operand, f, live),
        ExprKind::Call(c) => {
            walk_expr(&mut c.callee, f, live);
            for a in &mut c.args {
                walk_expr(a, f, live);
            }
        }
        ExprKind::Index(i) => {
            walk_expr(&mut i.base, f, live);
            for e in &mut i.index {
                walk_expr(e, f, live);
            }
        }
        ExprKind::Slice(s) => {
            walk_expr(&mut s.base, f, live);
            if let Some(lo) = &mut s.lo {
                walk_expr(lo, f, live);
            }
            if let Some(hi) = &mut s.hi {
                walk_expr(hi, f, live);
            }
        }
        ExprKind::Dot(d) => walk_expr(&mut d.left, f, live),
        ExprKind::TypeAssert(t) => {
            walk_expr(&mut t.left, f, live);
            if let Some(target) = &mut t.target {
                f(target);
            }
        }
        ExprKind::Compound(c) => {
            f(&mut c.ty);
            for el in &mut c.elems {
                if let Some(k) = &mut el.key {
                    walk_expr(k, f, live);
                }
                walk_expr(&mut el.value, f, live);
            }
        }
        ExprKind::FuncLit(decl) => func_decl(decl, f, live),
        ExprKind::Type(t) => f(t),
    }
}

pub fn generic_body_types_mut<F: FnMut(&mut Type)>(body: &mut GenericBody, f: &mut F) {
    match body {
        GenericBody::Func(decl) => func_decl(decl, f, false),
        GenericBody::Struct(s) => {
            for field in &mut s.fields {
                f(&mut field.ty);
            }
        }
    }
}

fn func_decl<F: FnMut(&mut Type)>(decl: &mut FuncDecl, f: &mut F, live: bool) {
    if let Some(recv) = &mut decl.receiver {
        variable(recv, f);
    }
    for v in decl.params.iter_mut().chain(decl.results.iter_mut()) {
        variable(v, f);
    }
    block(&mut decl.body, f, live);
}

fn var_stmt<F: FnMut(&mut Type)>(stmt: &mut VarStmt, f: &mut F, live: bool) {
    for decl in &mut stmt.decls {
        for v in &mut decl.vars {
            variable(v, f);
        }
        for init in &mut decl.inits {
            walk_expr(init, f, live);
        }
    }
}

fn variable<F: FnMut(&mut Type)>(v: &mut Variable, f: &mut F) {
    f(&mut v.ty);
}

fn block<F: FnMut(&mut Type)>(code: &mut CodeBlock, f: &mut F, live: bool) {
    for stmt in &mut code.stmts {
        walk_stmt(stmt, f, live);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;

    #[test]
    fn reaches_nested_type_slots() {
        let body = vec![
            build::typed_var("x", Type::generic_param("T"), None),
            build::ret(vec![build::call(
                build::type_expr(Type::generic_param("T")),
                vec![build::ident("x")],
            )]),
        ];
        let decl = build::func(
            "Id",
            vec![build::param("v", Type::generic_param("T"))],
            vec![Type::generic_param("T")],
            body,
        );
        let mut stmt = build::func_stmt(decl);

        let mut count = 0;
        stmt_types_mut(&mut stmt, &mut |t: &mut Type| {
            if matches!(t, Type::GenericParam(_)) {
                *t = Type::int();
                count += 1;
            }
        });
        assert_eq!(count, 4);

        let mut leftover = false;
        stmt_types_mut(&mut stmt, &mut |t: &mut Type| leftover |= t.has_placeholders());
        assert!(!leftover);
    }

    #[test]
    fn live_walk_skips_unselected_when_bodies() {
        use crate::stmt::{PredicateKind, WhenBranch, WhenPredicate};

        let branch = |ty: Type, active: bool| WhenBranch {
            span: Default::default(),
            predicates: vec![WhenPredicate {
                kind: PredicateKind::Is,
                ty: Some(ty.clone()),
            }],
            body: CodeBlock::new(vec![build::typed_var("x", Type::generic_param("T"), None)]),
            active,
        };
        let mut stmt = build::when(
            vec![Type::int()],
            vec![branch(Type::int(), true), branch(Type::string(), false)],
        );

        let mut all = 0;
        stmt_types_mut(&mut stmt, &mut |t: &mut Type| all += t.has_placeholders() as usize);
        let mut live = 0;
        live_stmt_types_mut(&mut stmt, &mut |t: &mut Type| live += t.has_placeholders() as usize);
        assert_eq!(all, 2);
        assert_eq!(live, 1);
    }
}
