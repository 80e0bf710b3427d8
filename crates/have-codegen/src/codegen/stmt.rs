//! Statement emission.

use have_ast::{
    AssignStmt, BranchStmt, Expr, ForRangeStmt, ForStmt, FuncDecl, IfStmt, IfaceStmt, RangeVars,
    Stmt, StmtKind, StructStmt, SwitchStmt, SwitchValue, VarDecl, VarStmt, Variable,
};
use have_types::Type;

use super::{emits_nothing, CodeGen};

impl CodeGen<'_> {
    pub(crate) fn stmt(&mut self, stmt: &Stmt) {
        if let Some(label) = stmt.label() {
            self.out.write(label);
            self.out.write(":");
            self.out.newline();
        }
        match &stmt.kind {
            StmtKind::Var(v) => self.var_stmt(v),
            StmtKind::Func(f) => self.func_decl(f),
            StmtKind::Assign(a) => self.assign(a),
            StmtKind::Send(s) => {
                self.expr(&s.channel);
                self.out.write(" <- ");
                self.expr(&s.value);
            }
            StmtKind::Struct(s) => self.struct_decl(s),
            StmtKind::TypeDecl(t) => {
                self.out.write("type ");
                self.out.write(&t.name);
                self.out.write(" ");
                self.ty(&t.ty);
            }
            StmtKind::Iface(i) => self.iface_decl(i),
            StmtKind::Pass | StmtKind::Generic(_) => {}
            StmtKind::If(s) => self.if_stmt(s),
            StmtKind::Switch(s) => self.switch(s),
            StmtKind::For(s) => self.for_stmt(s),
            StmtKind::ForRange(s) => self.for_range(s),
            StmtKind::Expr(e) => self.expr(e),
            StmtKind::Branch(b) => self.branch(b),
            StmtKind::Return(r) => {
                self.out.write("return");
                if !r.values.is_empty() {
                    self.out.write(" ");
                    self.comma_sep(&r.values, |g, v| g.expr(v));
                }
            }
            StmtKind::Label(l) => {
                self.out.write(&l.name);
                self.out.write(":");
            }
            StmtKind::Import(i) => {
                self.out.write("import ");
                self.out.write(&i.name);
                self.out.write(&format!(" {:?}", i.path));
            }
            // The selected body keeps its own scope.
            StmtKind::When(w) => {
                if let Some(branch) = w.active_branch() {
                    self.block(&branch.body);
                }
            }
        }
    }

    // ── Declarations ─────────────────────────────────────────────────

    /// One `var` line per declaration group.
    fn var_stmt(&mut self, v: &VarStmt) {
        for (i, decl) in v.decls.iter().enumerate() {
            if i > 0 {
                self.out.newline();
            }
            self.out.write("var ");
            self.names(&decl.vars);
            self.out.write(" = ");
            self.initializers(decl);
        }
    }

    /// `a, b := (T1)(x), (T2)(y)` for `if`/`for`/`switch` clauses.
    pub(crate) fn scoped(&mut self, v: &VarStmt) {
        if let [decl] = v.decls.as_slice() {
            if decl.is_tuple_init() {
                self.names(&decl.vars);
                self.out.write(" := ");
                self.expr(&decl.inits[0]);
                return;
            }
        }
        let vars: Vec<&Variable> = v.vars().collect();
        self.comma_sep(&vars, |g, var| g.out.write(&var.name));
        self.out.write(" := ");
        let mut first = true;
        for decl in &v.decls {
            for (var, init) in decl.pairs() {
                if !first {
                    self.out.write(", ");
                }
                first = false;
                self.initial_value(var, init);
            }
        }
    }

    fn names(&mut self, vars: &[Variable]) {
        self.comma_sep(vars, |g, var| g.out.write(&var.name));
    }

    /// Converted initializers, zero values for names without one. A single
    /// multi-value initializer is written as is.
    fn initializers(&mut self, decl: &VarDecl) {
        if decl.is_tuple_init() {
            self.expr(&decl.inits[0]);
            return;
        }
        let pairs: Vec<(&Variable, Option<&Expr>)> = decl.pairs().collect();
        self.comma_sep(&pairs, |g, (var, init)| g.initial_value(var, *init));
    }

    /// `(T)(value)`, making the inferred type visible in the output.
    fn initial_value(&mut self, var: &Variable, init: Option<&Expr>) {
        self.out.write("(");
        self.ty(&var.ty);
        self.out.write(")(");
        match init {
            Some(value) => self.expr(value),
            None => {
                let zero = var.ty.zero_value(self.types);
                self.out.write(&zero);
            }
        }
        self.out.write(")");
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.out.write("func ");
        if let Some(recv) = &f.receiver {
            self.out.write("(");
            self.param(recv, false);
            self.out.write(") ");
        }
        self.out.write(&f.name);
        self.signature(f);
        self.out.write(" ");
        self.block(&f.body);
    }

    /// `(a T, b ...U) (R1, R2)`
    pub(crate) fn signature(&mut self, f: &FuncDecl) {
        self.out.write("(");
        let last = f.params.len().saturating_sub(1);
        for (i, param) in f.params.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            self.param(param, f.variadic && i == last);
        }
        self.out.write(")");

        let named = f.results.iter().any(|r| !r.name.is_empty());
        match f.results.as_slice() {
            [] => {}
            [only] if !named => {
                self.out.write(" ");
                self.ty(&only.ty);
            }
            results => {
                self.out.write(" (");
                self.comma_sep(results, |g, r| g.param(r, false));
                self.out.write(")");
            }
        }
    }

    fn param(&mut self, var: &Variable, variadic: bool) {
        if !var.name.is_empty() {
            self.out.write(&var.name);
            self.out.write(" ");
        }
        match (&var.ty, variadic) {
            (Type::Slice(of), true) => {
                self.out.write("...");
                self.ty(of);
            }
            (ty, _) => self.ty(ty),
        }
    }

    fn struct_decl(&mut self, s: &StructStmt) {
        self.out.write("type ");
        self.out.write(&s.name);
        if s.fields.is_empty() {
            self.out.write(" struct {}");
            return;
        }
        self.out.write(" struct {");
        self.out.indent();
        for field in &s.fields {
            self.out.newline();
            self.out.write(&field.name);
            self.out.write(" ");
            self.ty(&field.ty);
        }
        self.out.dedent();
        self.out.newline();
        self.out.write("}");
    }

    fn iface_decl(&mut self, i: &IfaceStmt) {
        self.out.write("type ");
        self.out.write(&i.name);
        if i.methods.is_empty() {
            self.out.write(" interface {}");
            return;
        }
        self.out.write(" interface {");
        self.out.indent();
        for method in &i.methods {
            self.out.newline();
            self.out.write(&method.name);
            self.out.write(&method.ty.header());
        }
        self.out.dedent();
        self.out.newline();
        self.out.write("}");
    }

    // ── Simple statements ────────────────────────────────────────────

    fn assign(&mut self, a: &AssignStmt) {
        self.comma_sep(&a.lhs, |g, e| g.expr(e));
        match a.op {
            Some(op) => {
                self.out.write(" ");
                self.out.write(op.symbol());
                self.out.write("= ");
            }
            None => self.out.write(" = "),
        }
        self.comma_sep(&a.rhs, |g, e| g.expr(e));
    }

    fn branch(&mut self, b: &BranchStmt) {
        self.out.write(b.kind.keyword());
        if let Some(label) = &b.label {
            self.out.write(" ");
            self.out.write(label);
        }
    }

    // ── Control flow ─────────────────────────────────────────────────

    fn if_stmt(&mut self, s: &IfStmt) {
        for (i, branch) in s.branches.iter().enumerate() {
            if i > 0 {
                self.out.write(" else ");
            }
            if let Some(condition) = &branch.condition {
                self.out.write("if ");
                if let Some(scoped) = &branch.scoped {
                    self.scoped(scoped);
                    self.out.write("; ");
                }
                self.expr(condition);
                self.out.write(" ");
            }
            self.block(&branch.body);
        }
    }

    /// `for cond {` when there is only a condition, the three-clause form
    /// otherwise.
    fn for_stmt(&mut self, s: &ForStmt) {
        self.out.write("for ");
        if s.scoped.is_none() && s.repeat.is_none() {
            if let Some(condition) = &s.condition {
                self.expr(condition);
                self.out.write(" ");
            }
        } else {
            if let Some(scoped) = &s.scoped {
                self.scoped(scoped);
            }
            self.out.write(";");
            if let Some(condition) = &s.condition {
                self.out.write(" ");
                self.expr(condition);
            }
            self.out.write(";");
            if let Some(repeat) = &s.repeat {
                self.out.write(" ");
                self.stmt(repeat);
            }
            self.out.write(" ");
        }
        self.block(&s.body);
    }

    fn for_range(&mut self, s: &ForRangeStmt) {
        self.out.write("for ");
        match &s.vars {
            RangeVars::Scoped(vars) if !vars.is_empty() => {
                self.names(vars);
                self.out.write(" := ");
            }
            RangeVars::Outside(exprs) if !exprs.is_empty() => {
                self.comma_sep(exprs, |g, e| g.expr(e));
                self.out.write(" = ");
            }
            _ => {}
        }
        self.out.write("range ");
        self.expr(&s.series);
        self.out.write(" ");
        self.block(&s.body);
    }

    fn switch(&mut self, s: &SwitchStmt) {
        self.out.write("switch ");
        if let Some(scoped) = &s.scoped {
            self.scoped(scoped);
            self.out.write("; ");
        }
        match &s.value {
            Some(SwitchValue::Expr(value)) => {
                self.expr(value);
                self.out.write(" ");
            }
            Some(SwitchValue::Type(ts)) => {
                if let Some(bind) = &ts.bind {
                    self.out.write(bind);
                    self.out.write(" := ");
                }
                self.expr(&ts.subject);
                self.out.write(".(type) ");
            }
            None => {}
        }
        self.out.write("{");
        for branch in &s.branches {
            self.out.newline();
            match &branch.values {
                Some(values) => {
                    self.out.write("case ");
                    self.comma_sep(values, |g, v| g.expr(v));
                    self.out.write(":");
                }
                None => self.out.write("default:"),
            }
            self.out.indent();
            for stmt in branch.body.stmts.iter().filter(|s| !emits_nothing(s)) {
                self.out.newline();
                self.stmt(stmt);
            }
            self.out.dedent();
        }
        self.out.newline();
        self.out.write("}");
    }
}
