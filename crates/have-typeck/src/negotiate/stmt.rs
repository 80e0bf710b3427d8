//! Statement negotiation.

use have_ast::{
    AssignStmt, BinaryOp, BranchKind, BranchStmt, CodeBlock, ExprKind, ForRangeStmt, ForStmt,
    IfStmt, ObjectKind, PredicateKind, RangeVars, ReturnStmt, SendStmt, Stmt, StmtKind,
    SwitchBranch, SwitchStmt, SwitchValue, TypeSwitch, VarDecl, VarStmt, Variable, WhenStmt,
};
use have_ast::Expr;
use have_common::Span;
use have_types::{ChanDir, Type};
use tracing::trace;

use super::expr::is_addressable;
use super::{Breakable, Frame};
use crate::compat;
use crate::context::TypesContext;
use crate::error::TypeError;

fn or_span(own: Span, fallback: Span) -> Span {
    if own.is_empty() {
        fallback
    } else {
        own
    }
}

impl TypesContext {
    fn frame(&self) -> &Frame {
        self.frames.last().expect("negotiation always runs inside a frame")
    }

    fn frame_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("negotiation always runs inside a frame")
    }

    /// Negotiate a nested body in its own scope.
    pub(crate) fn block(&mut self, code: &mut CodeBlock) -> Result<(), TypeError> {
        self.env.push_scope();
        let result = self.block_stmts(code);
        self.env.pop_scope();
        result
    }

    /// Negotiate statements in the current scope.
    pub(crate) fn block_stmts(&mut self, code: &mut CodeBlock) -> Result<(), TypeError> {
        for stmt in &mut code.stmts {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn stmt(&mut self, stmt: &mut Stmt) -> Result<(), TypeError> {
        let span = stmt.span;
        let label = stmt.label().map(str::to_string);
        match &mut stmt.kind {
            StmtKind::Var(v) => self.var_stmt(v, span, false),
            StmtKind::Assign(a) => self.assign(a, span),
            StmtKind::Send(s) => self.send(s, span),
            StmtKind::Struct(s) => {
                s.decl = Some(self.declare_type_name(&s.name, span)?);
                self.define_struct(s, span)
            }
            StmtKind::TypeDecl(t) => {
                t.decl = Some(self.declare_type_name(&t.name, span)?);
                self.define_type_decl(t, span)
            }
            StmtKind::Iface(i) => {
                i.decl = Some(self.declare_type_name(&i.name, span)?);
                self.define_iface(i, span)
            }
            StmtKind::Func(_) | StmtKind::Import(_) | StmtKind::Generic(_) => Err(TypeError::invalid(
                "declaration is only allowed at top level",
                span,
            )),
            StmtKind::Pass | StmtKind::Label(_) => Ok(()),
            StmtKind::If(s) => self.if_stmt(s),
            StmtKind::Switch(s) => self.switch(s, label, span),
            StmtKind::For(s) => self.for_stmt(s, label, span),
            StmtKind::ForRange(s) => self.for_range(s, label, span),
            StmtKind::Expr(e) => self.expr(e, None).map(|_| ()),
            StmtKind::Branch(b) => self.branch(b, span),
            StmtKind::Return(r) => self.return_stmt(r, span),
            StmtKind::When(w) => self.when(w, span),
        }
    }

    /// Negotiate a chain of declaration groups and bind their names left to
    /// right. Top-level names were bound by predeclaration and only get their
    /// types here.
    pub(crate) fn var_stmt(&mut self, v: &mut VarStmt, span: Span, top_level: bool) -> Result<(), TypeError> {
        for decl in &mut v.decls {
            self.var_decl(decl, span)?;
            for var in &mut decl.vars {
                if var.is_blank() {
                    continue;
                }
                if top_level {
                    if let Some(object) = var.object {
                        self.objects.get_mut(object).kind = ObjectKind::Var(var.ty.clone());
                    }
                } else {
                    let id = self.bind_new(&var.name, var.span, ObjectKind::Var(var.ty.clone()))?;
                    var.object = Some(id);
                }
                trace!(name = %var.name, ty = %var.ty, "declared variable");
            }
        }
        Ok(())
    }

    /// The initializer clause of `if`, `for` or `switch`. It is written as a
    /// single `:=`, so a multi-value group must stand alone.
    fn scoped_clause(&mut self, v: &mut VarStmt, span: Span) -> Result<(), TypeError> {
        if v.decls.len() > 1 {
            if let Some(decl) = v.decls.iter().find(|d| d.is_tuple_init()) {
                return Err(TypeError::invalid(
                    "multi-value initializer cannot be chained with other declarations",
                    or_span(decl.inits[0].span, span),
                ));
            }
        }
        self.var_stmt(v, span, false)
    }

    fn var_decl(&mut self, decl: &mut VarDecl, span: Span) -> Result<(), TypeError> {
        let VarDecl { vars, inits } = decl;
        for var in vars.iter_mut() {
            if var.ty != Type::Unknown {
                self.resolve_type(&mut var.ty, or_span(var.span, span))?;
            }
        }

        if vars.len() > 1 && inits.len() == 1 {
            let init = &mut inits[0];
            let found = self.expr(init, None)?;
            let members = match found {
                Type::Tuple(members) if members.len() == vars.len() => members,
                Type::Tuple(members) => {
                    return Err(TypeError::ValueCount {
                        expected: vars.len(),
                        found: members.len(),
                        span: init.span,
                    })
                }
                _ => {
                    return Err(TypeError::ValueCount {
                        expected: vars.len(),
                        found: 1,
                        span: init.span,
                    })
                }
            };
            for (var, member) in vars.iter_mut().zip(members) {
                if var.ty == Type::Unknown {
                    var.ty = member;
                } else if !compat::assignable(&self.types, &member, &var.ty) {
                    return Err(TypeError::mismatch(&var.ty, &member, init.span));
                }
            }
            return Ok(());
        }

        if inits.len() > vars.len() {
            return Err(TypeError::ValueCount {
                expected: vars.len(),
                found: inits.len(),
                span,
            });
        }
        for (i, var) in vars.iter_mut().enumerate() {
            match inits.get_mut(i) {
                Some(init) if var.ty == Type::Unknown => var.ty = self.value(init, None)?,
                Some(init) => self.expect_assignable(init, &var.ty)?,
                None if var.ty == Type::Unknown => {
                    return Err(TypeError::CannotInfer {
                        what: format!("type of `{}`", var.name),
                        span: or_span(var.span, span),
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    /// The type stored through an assignment target; `None` for `_`.
    fn assign_target(&mut self, target: &mut Expr) -> Result<Option<Type>, TypeError> {
        if target.is_blank() {
            return Ok(None);
        }
        let ty = self.value(target, None)?;
        let string_index = match &target.kind {
            ExprKind::Index(i) => i
                .base
                .ty
                .as_ref()
                .is_some_and(|t| compat::is_string(&self.types, t)),
            _ => false,
        };
        if !is_addressable(target) || string_index {
            return Err(TypeError::NotAddressable { span: target.span });
        }
        Ok(Some(ty))
    }

    fn assign(&mut self, a: &mut AssignStmt, span: Span) -> Result<(), TypeError> {
        if let Some(op) = a.op {
            if a.lhs.len() != 1 || a.rhs.len() != 1 {
                return Err(TypeError::ValueCount {
                    expected: 1,
                    found: a.rhs.len(),
                    span,
                });
            }
            let Some(lt) = self.assign_target(&mut a.lhs[0])? else {
                return Err(TypeError::invalid("cannot use `_` as a value", a.lhs[0].span));
            };
            if op.is_shift() {
                self.integer_operand(&mut a.rhs[0])?;
                if !compat::is_integer(&self.types, &lt) {
                    return Err(TypeError::invalid(
                        format!("shifted operand must be an integer, found `{}`", lt),
                        a.lhs[0].span,
                    ));
                }
                return Ok(());
            }
            let rt = self.value(&mut a.rhs[0], Some(&lt))?;
            self.binary_result(op, &lt, &rt, span)?;
            return Ok(());
        }

        if a.lhs.len() > 1 && a.rhs.len() == 1 {
            let found = self.expr(&mut a.rhs[0], None)?;
            let members = match found {
                Type::Tuple(members) if members.len() == a.lhs.len() => members,
                Type::Tuple(members) => {
                    return Err(TypeError::ValueCount {
                        expected: a.lhs.len(),
                        found: members.len(),
                        span,
                    })
                }
                _ => {
                    return Err(TypeError::ValueCount {
                        expected: a.lhs.len(),
                        found: 1,
                        span,
                    })
                }
            };
            for (target, member) in a.lhs.iter_mut().zip(members) {
                if let Some(ty) = self.assign_target(target)? {
                    if !compat::assignable(&self.types, &member, &ty) {
                        return Err(TypeError::mismatch(&ty, &member, a.rhs[0].span));
                    }
                }
            }
            return Ok(());
        }

        if a.lhs.len() != a.rhs.len() {
            return Err(TypeError::ValueCount {
                expected: a.lhs.len(),
                found: a.rhs.len(),
                span,
            });
        }
        for (target, value) in a.lhs.iter_mut().zip(a.rhs.iter_mut()) {
            match self.assign_target(target)? {
                Some(ty) => self.expect_assignable(value, &ty)?,
                None => {
                    self.value(value, None)?;
                }
            }
        }
        Ok(())
    }

    fn send(&mut self, s: &mut SendStmt, span: Span) -> Result<(), TypeError> {
        let ty = self.value(&mut s.channel, None)?;
        let elem = match self.types.root_type(&ty) {
            Type::Chan(c) if c.dir != ChanDir::Receive => c.of.as_ref().clone(),
            _ => {
                return Err(TypeError::invalid(
                    format!("cannot send to `{}`", ty),
                    span,
                ))
            }
        };
        self.expect_assignable(&mut s.value, &elem)
    }

    fn condition(&mut self, cond: &mut Expr) -> Result<(), TypeError> {
        let hint = Type::bool();
        let ty = self.value(cond, Some(&hint))?;
        if !compat::is_bool(&self.types, &ty) {
            return Err(TypeError::NonBoolCondition {
                found: ty,
                span: cond.span,
            });
        }
        Ok(())
    }

    fn if_stmt(&mut self, s: &mut IfStmt) -> Result<(), TypeError> {
        // Each initializer scope encloses the branches after it.
        let mut scopes = 0;
        let result = self.if_branches(s, &mut scopes);
        for _ in 0..scopes {
            self.env.pop_scope();
        }
        result
    }

    fn if_branches(&mut self, s: &mut IfStmt, scopes: &mut usize) -> Result<(), TypeError> {
        let last = s.branches.len().saturating_sub(1);
        for (i, branch) in s.branches.iter_mut().enumerate() {
            if let Some(scoped) = &mut branch.scoped {
                self.env.push_scope();
                *scopes += 1;
                self.scoped_clause(scoped, branch.span)?;
            }
            match &mut branch.condition {
                Some(cond) => self.condition(cond)?,
                None if i == 0 => return Err(TypeError::invalid("missing condition in `if`", branch.span)),
                None if i != last => {
                    return Err(TypeError::invalid("`else` must be the last branch", branch.span))
                }
                None => {}
            }
            self.block(&mut branch.body)?;
        }
        Ok(())
    }

    fn with_breakable<T>(
        &mut self,
        label: Option<String>,
        is_loop: bool,
        f: impl FnOnce(&mut Self) -> Result<T, TypeError>,
    ) -> Result<T, TypeError> {
        self.frame_mut().breakables.push(Breakable { label, is_loop });
        let result = f(self);
        self.frame_mut().breakables.pop();
        result
    }

    fn switch(&mut self, s: &mut SwitchStmt, label: Option<String>, span: Span) -> Result<(), TypeError> {
        if s.branches.iter().filter(|b| b.values.is_none()).count() > 1 {
            return Err(TypeError::invalid("multiple defaults in `switch`", span));
        }
        self.env.push_scope();
        let result = self.switch_inner(s, label, span);
        self.env.pop_scope();
        result
    }

    fn switch_inner(&mut self, s: &mut SwitchStmt, label: Option<String>, span: Span) -> Result<(), TypeError> {
        if let Some(scoped) = &mut s.scoped {
            self.scoped_clause(scoped, span)?;
        }
        let branches = &mut s.branches;
        match &mut s.value {
            Some(SwitchValue::Type(ts)) => {
                self.with_breakable(label, false, |ctx| ctx.type_switch(ts, branches, span))
            }
            Some(SwitchValue::Expr(e)) => {
                let subject = self.value(e, None)?;
                self.with_breakable(label, false, |ctx| ctx.value_switch(Some(&subject), branches))
            }
            None => self.with_breakable(label, false, |ctx| ctx.value_switch(None, branches)),
        }
    }

    fn value_switch(&mut self, subject: Option<&Type>, branches: &mut [SwitchBranch]) -> Result<(), TypeError> {
        for branch in branches {
            for value in branch.values.iter_mut().flatten() {
                match subject {
                    Some(subject) => {
                        let found = self.value(value, Some(subject))?;
                        self.binary_result(BinaryOp::Eq, subject, &found, value.span)?;
                    }
                    None => self.condition(value)?,
                }
            }
            self.block(&mut branch.body)?;
        }
        Ok(())
    }

    fn type_switch(&mut self, ts: &mut TypeSwitch, branches: &mut [SwitchBranch], span: Span) -> Result<(), TypeError> {
        let subject = self.value(&mut ts.subject, None)?;
        let Some(iface) = compat::as_interface(&self.types, &subject) else {
            return Err(TypeError::NotInterface { ty: subject, span });
        };
        for branch in branches {
            let mut cases = Vec::new();
            for value in branch.values.iter_mut().flatten() {
                let ty = self.type_arg(value)?;
                if compat::as_interface(&self.types, &ty).is_none()
                    && !compat::implements(&self.types, &ty, &iface)
                {
                    return Err(TypeError::invalid(
                        format!("impossible type switch case: `{}` cannot have dynamic type `{}`", subject, ty),
                        value.span,
                    ));
                }
                cases.push(ty);
            }
            let Some(name) = &ts.bind else {
                self.block(&mut branch.body)?;
                continue;
            };
            // A single-type case binds that type; anything else keeps the subject's.
            let bound_ty = match cases.as_slice() {
                [only] => only.clone(),
                _ => subject.clone(),
            };
            self.env.push_scope();
            let result = self
                .bind_new(name, branch.span, ObjectKind::Var(bound_ty.clone()))
                .and_then(|id| {
                    branch.bound = Some(Variable {
                        name: name.clone(),
                        span: branch.span,
                        ty: bound_ty,
                        object: Some(id),
                    });
                    self.block_stmts(&mut branch.body)
                });
            self.env.pop_scope();
            result?;
        }
        Ok(())
    }

    fn for_stmt(&mut self, s: &mut ForStmt, label: Option<String>, span: Span) -> Result<(), TypeError> {
        self.env.push_scope();
        let result = self.for_inner(s, label, span);
        self.env.pop_scope();
        result
    }

    fn for_inner(&mut self, s: &mut ForStmt, label: Option<String>, span: Span) -> Result<(), TypeError> {
        if let Some(scoped) = &mut s.scoped {
            self.scoped_clause(scoped, span)?;
        }
        if let Some(cond) = &mut s.condition {
            self.condition(cond)?;
        }
        if let Some(repeat) = &mut s.repeat {
            if !matches!(
                repeat.kind,
                StmtKind::Assign(_) | StmtKind::Expr(_) | StmtKind::Send(_)
            ) {
                return Err(TypeError::invalid("invalid repeat statement in `for`", repeat.span));
            }
            self.stmt(repeat)?;
        }
        let body = &mut s.body;
        self.with_breakable(label, true, |ctx| ctx.block(body))
    }

    fn for_range(&mut self, s: &mut ForRangeStmt, label: Option<String>, span: Span) -> Result<(), TypeError> {
        let series = self.value(&mut s.series, None)?;
        let produced = match self.types.root_type(&series).clone() {
            Type::Slice(of) => vec![Type::int(), *of],
            Type::Array(a) => vec![Type::int(), *a.of],
            Type::Pointer(to) => match self.types.root_type(&to).clone() {
                Type::Array(a) => vec![Type::int(), *a.of],
                _ => return Err(cannot_range(&series, s.series.span)),
            },
            Type::Map(m) => vec![*m.by, *m.of],
            Type::Chan(c) if c.dir != ChanDir::Send => vec![*c.of],
            _ if compat::is_string(&self.types, &series) => vec![Type::int(), Type::rune()],
            _ if compat::is_integer(&self.types, &series) => vec![series.clone()],
            _ => return Err(cannot_range(&series, s.series.span)),
        };
        let count = match &s.vars {
            RangeVars::Scoped(vars) => vars.len(),
            RangeVars::Outside(exprs) => exprs.len(),
        };
        if count > produced.len() {
            return Err(TypeError::ValueCount {
                expected: produced.len(),
                found: count,
                span,
            });
        }

        self.env.push_scope();
        let result = self.range_vars(&mut s.vars, produced, span).and_then(|()| {
            let body = &mut s.body;
            self.with_breakable(label, true, |ctx| ctx.block(body))
        });
        self.env.pop_scope();
        result
    }

    fn range_vars(&mut self, vars: &mut RangeVars, produced: Vec<Type>, span: Span) -> Result<(), TypeError> {
        match vars {
            RangeVars::Scoped(vars) => {
                for (var, ty) in vars.iter_mut().zip(produced) {
                    var.ty = ty;
                    if var.is_blank() {
                        continue;
                    }
                    let id = self.bind_new(&var.name, or_span(var.span, span), ObjectKind::Var(var.ty.clone()))?;
                    var.object = Some(id);
                }
            }
            RangeVars::Outside(exprs) => {
                for (target, ty) in exprs.iter_mut().zip(produced) {
                    if let Some(expected) = self.assign_target(target)? {
                        if !compat::assignable(&self.types, &ty, &expected) {
                            return Err(TypeError::mismatch(&expected, &ty, target.span));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn branch(&mut self, b: &BranchStmt, span: Span) -> Result<(), TypeError> {
        let frame = self.frame();
        if b.kind == BranchKind::Goto {
            return match &b.label {
                Some(name) if frame.labels.contains(name) => Ok(()),
                Some(name) => Err(TypeError::UnresolvedLabel {
                    name: name.clone(),
                    span,
                }),
                None => Err(TypeError::invalid("`goto` requires a label", span)),
            };
        }
        let needs_loop = b.kind == BranchKind::Continue;
        let found = frame.breakables.iter().rev().any(|target| {
            (!needs_loop || target.is_loop)
                && match &b.label {
                    Some(name) => target.label.as_deref() == Some(name.as_str()),
                    None => true,
                }
        });
        if found {
            return Ok(());
        }
        match &b.label {
            Some(name) => Err(TypeError::UnresolvedLabel {
                name: name.clone(),
                span,
            }),
            None => Err(TypeError::BranchOutside {
                keyword: b.kind.keyword().to_string(),
                span,
            }),
        }
    }

    fn return_stmt(&mut self, r: &mut ReturnStmt, span: Span) -> Result<(), TypeError> {
        let frame = self.frame();
        let Some(results) = frame.results.clone() else {
            return Err(TypeError::invalid("`return` outside a function", span));
        };
        if r.values.is_empty() {
            if results.is_empty() || frame.named_results {
                return Ok(());
            }
            return Err(TypeError::ValueCount {
                expected: results.len(),
                found: 0,
                span,
            });
        }
        if r.values.len() == 1 && results.len() > 1 {
            let value = &mut r.values[0];
            let found = self.expr(value, None)?;
            let members = match found {
                Type::Tuple(members) => members,
                _ => vec![found],
            };
            if members.len() != results.len() {
                return Err(TypeError::ValueCount {
                    expected: results.len(),
                    found: members.len(),
                    span,
                });
            }
            for (member, expected) in members.iter().zip(&results) {
                if !compat::assignable(&self.types, member, expected) {
                    return Err(TypeError::mismatch(expected, member, value.span));
                }
            }
            return Ok(());
        }
        if r.values.len() != results.len() {
            return Err(TypeError::ValueCount {
                expected: results.len(),
                found: r.values.len(),
                span,
            });
        }
        for (value, expected) in r.values.iter_mut().zip(&results) {
            self.expect_assignable(value, expected)?;
        }
        Ok(())
    }

    /// Select the first branch whose predicates all hold and negotiate only
    /// that one.
    fn when(&mut self, w: &mut WhenStmt, span: Span) -> Result<(), TypeError> {
        for arg in &mut w.args {
            self.resolve_type(arg, span)?;
        }
        let mut chosen = None;
        for (i, branch) in w.branches.iter_mut().enumerate() {
            if branch.predicates.len() != w.args.len() {
                return Err(TypeError::ValueCount {
                    expected: w.args.len(),
                    found: branch.predicates.len(),
                    span: or_span(branch.span, span),
                });
            }
            let mut holds = true;
            for (pred, arg) in branch.predicates.iter_mut().zip(&w.args) {
                if pred.kind == PredicateKind::Default {
                    continue;
                }
                let Some(ty) = &mut pred.ty else {
                    return Err(TypeError::CannotInfer {
                        what: "predicate type".to_string(),
                        span: or_span(branch.span, span),
                    });
                };
                self.resolve_type(ty, or_span(branch.span, span))?;
                holds &= match pred.kind {
                    PredicateKind::Is => ty == arg,
                    PredicateKind::Implements => {
                        let Some(iface) = compat::as_interface(&self.types, ty) else {
                            return Err(TypeError::NotInterface {
                                ty: ty.clone(),
                                span: or_span(branch.span, span),
                            });
                        };
                        compat::implements(&self.types, arg, &iface)
                    }
                    PredicateKind::Default => true,
                };
            }
            if holds && chosen.is_none() {
                chosen = Some(i);
            }
        }
        if let Some(i) = chosen {
            trace!(branch = i, "selected `when` branch");
            let branch = &mut w.branches[i];
            branch.active = true;
            self.block(&mut branch.body)?;
        }
        Ok(())
    }
}

fn cannot_range(ty: &Type, span: Span) -> TypeError {
    TypeError::invalid(format!("cannot range over `{}`", ty), span)
}
