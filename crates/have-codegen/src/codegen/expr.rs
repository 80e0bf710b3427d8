//! Expression emission.
//!
//! Operator expressions are always fully parenthesized, so the output never
//! depends on operator precedence.

use have_ast::{CallExpr, CompoundLit, Expr, ExprKind};
use have_types::Type;

use super::CodeGen;

impl CodeGen<'_> {
    pub(crate) fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Blank => self.out.write("_"),
            ExprKind::Nil => self.out.write("nil"),
            ExprKind::Lit(lit) => self.out.write(&lit.raw),
            ExprKind::Ident(id) => self.out.write(&id.name),
            ExprKind::Binary(b) => {
                self.out.write("(");
                self.expr(&b.left);
                self.out.write(" ");
                self.out.write(b.op.symbol());
                self.out.write(" ");
                self.expr(&b.right);
                self.out.write(")");
            }
            ExprKind::Unary(u) => {
                self.out.write("(");
                self.out.write(u.op.symbol());
                self.expr(&u.operand);
                self.out.write(")");
            }
            ExprKind::Call(call) => self.call(call),
            ExprKind::Index(index) => match &index.instance {
                // `Name[T1, T2]` naming an instantiation.
                Some(name) => self.out.write(name),
                None => {
                    self.expr(&index.base);
                    self.out.write("[");
                    self.comma_sep(&index.index, |g, i| g.expr(i));
                    self.out.write("]");
                }
            },
            ExprKind::Slice(s) => {
                self.expr(&s.base);
                self.out.write("[");
                if let Some(lo) = &s.lo {
                    self.expr(lo);
                }
                self.out.write(":");
                if let Some(hi) = &s.hi {
                    self.expr(hi);
                }
                self.out.write("]");
            }
            ExprKind::Dot(d) => {
                self.expr(&d.left);
                self.out.write(".");
                self.out.write(&d.member);
            }
            ExprKind::TypeAssert(a) => {
                self.expr(&a.left);
                self.out.write(".(");
                match &a.target {
                    Some(target) => self.ty(target),
                    None => self.out.write("type"),
                }
                self.out.write(")");
            }
            ExprKind::Compound(c) => self.compound(c),
            ExprKind::FuncLit(f) => {
                self.out.write("func");
                self.signature(f);
                self.out.write(" ");
                self.block(&f.body);
            }
            ExprKind::Type(ty) => self.ty(ty),
        }
    }

    /// Calls, conversions `T(x)` and builtin calls with type arguments.
    fn call(&mut self, call: &CallExpr) {
        match &call.callee.kind {
            ExprKind::Type(target) if needs_parens(target) => {
                self.out.write("(");
                self.ty(target);
                self.out.write(")");
            }
            _ => self.expr(&call.callee),
        }
        self.out.write("(");
        self.comma_sep(&call.args, |g, a| g.expr(a));
        if call.ellipsis {
            self.out.write("...");
        }
        self.out.write(")");
    }

    /// `T{a, b}` / `T{k: v}`; the type is left out where it was elided in an
    /// enclosing literal.
    fn compound(&mut self, c: &CompoundLit) {
        if c.ty != Type::Unknown {
            self.ty(&c.ty);
        }
        self.out.write("{");
        for (i, elem) in c.elems.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            if let Some(key) = &elem.key {
                self.expr(key);
                self.out.write(": ");
            }
            self.expr(&elem.value);
        }
        self.out.write("}");
    }
}

/// Conversion targets that would otherwise parse as part of the operand.
fn needs_parens(ty: &Type) -> bool {
    matches!(ty, Type::Pointer(_) | Type::Func(_) | Type::Chan(_))
}
