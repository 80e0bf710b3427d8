//! Expression negotiation.
//!
//! Every expression is negotiated against an optional type hint. Untyped
//! constants (literals, `nil`, and operator trees built only from them) adopt
//! the hint when it fits, and fall back to their default type otherwise.

use have_ast::{
    BasicLit, BinaryExpr, BinaryOp, CallExpr, CompoundLit, DotExpr, Expr, ExprKind, IndexExpr,
    LitKind, ObjectKind, SliceExpr, TypeAssertExpr, UnaryExpr, UnaryOp,
};
use have_common::Span;
use have_types::{ChanDir, SimpleType, Type};

use crate::compat;
use crate::context::TypesContext;
use crate::error::TypeError;

/// Whether `expr` is a constant whose type comes from its context.
pub(crate) fn is_untyped(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Lit(_) | ExprKind::Nil => true,
        ExprKind::Unary(u) => {
            matches!(u.op, UnaryOp::Neg | UnaryOp::Plus | UnaryOp::Not | UnaryOp::BitNot)
                && is_untyped(&u.operand)
        }
        ExprKind::Binary(b) => {
            !b.op.is_comparison() && !b.op.is_shift() && is_untyped(&b.left) && is_untyped(&b.right)
        }
        _ => false,
    }
}

/// Rank of the widest numeric literal in an untyped constant tree:
/// int < rune < float64 < complex128.
fn constant_rank(expr: &Expr) -> Option<usize> {
    match &expr.kind {
        ExprKind::Lit(lit) => match lit.kind {
            LitKind::Int => Some(0),
            LitKind::Char => Some(1),
            LitKind::Float => Some(2),
            LitKind::Imag => Some(3),
            LitKind::String | LitKind::Bool => None,
        },
        ExprKind::Unary(u) => constant_rank(&u.operand),
        ExprKind::Binary(b) => constant_rank(&b.left).max(constant_rank(&b.right)),
        _ => None,
    }
}

const RANKED_DEFAULTS: [SimpleType; 4] = [
    SimpleType::Int,
    SimpleType::Rune,
    SimpleType::Float64,
    SimpleType::Complex128,
];

fn expr_name(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Ident(id) => id.name.clone(),
        ExprKind::Dot(d) => format!("{}.{}", expr_name(&d.left), d.member),
        ExprKind::Type(t) => t.to_string(),
        _ => "expression".to_string(),
    }
}

impl TypesContext {
    /// Negotiate `expr` and return its type. Calls may yield a tuple: empty
    /// for calls without a value, several members for multi-value calls.
    pub(crate) fn expr(&mut self, expr: &mut Expr, hint: Option<&Type>) -> Result<Type, TypeError> {
        let span = expr.span;
        let ty = match &mut expr.kind {
            ExprKind::Blank => {
                return Err(TypeError::invalid("cannot use `_` as a value", span));
            }
            ExprKind::Nil => match hint {
                Some(h) if compat::is_nilable(&self.types, h) => h.clone(),
                Some(h) => {
                    return Err(TypeError::invalid(format!("cannot use `nil` as `{}`", h), span))
                }
                None => {
                    return Err(TypeError::CannotInfer {
                        what: "type of `nil`".to_string(),
                        span,
                    })
                }
            },
            ExprKind::Lit(lit) => self.literal(lit, hint),
            ExprKind::Ident(_) => self.ident_value(expr)?,
            ExprKind::Binary(b) => self.binary(b, hint, span)?,
            ExprKind::Unary(u) => self.unary(u, hint, span)?,
            ExprKind::Call(call) => self.call(call, span)?,
            ExprKind::Index(index) => self.index(index, span)?,
            ExprKind::Slice(s) => self.slice_expr(s, span)?,
            ExprKind::Dot(d) => self.dot(d, span)?,
            ExprKind::TypeAssert(a) => self.type_assert(a, span)?,
            ExprKind::Compound(c) => self.compound(c, hint, span)?,
            ExprKind::FuncLit(decl) => {
                let sig = self.resolve_signature(decl, span)?;
                self.func_body(decl)?;
                Type::Func(sig)
            }
            ExprKind::Type(t) => {
                return Err(TypeError::NotAValue {
                    name: t.to_string(),
                    span,
                })
            }
        };
        expr.ty = Some(ty.clone());
        Ok(ty)
    }

    /// Negotiate an expression that must produce exactly one value.
    pub(crate) fn value(&mut self, expr: &mut Expr, hint: Option<&Type>) -> Result<Type, TypeError> {
        let ty = self.expr(expr, hint)?;
        match &ty {
            Type::Tuple(members) if members.is_empty() => Err(TypeError::invalid(
                format!("`{}` has no value", expr_name(expr)),
                expr.span,
            )),
            Type::Tuple(members) => Err(TypeError::ValueCount {
                expected: 1,
                found: members.len(),
                span: expr.span,
            }),
            _ => Ok(ty),
        }
    }

    /// Negotiate `expr` as a value stored where `target` is required.
    pub(crate) fn expect_assignable(&mut self, expr: &mut Expr, target: &Type) -> Result<(), TypeError> {
        let found = self.value(expr, Some(target))?;
        if !compat::assignable(&self.types, &found, target) {
            return Err(TypeError::mismatch(target, &found, expr.span));
        }
        Ok(())
    }

    /// Negotiate an expression that must denote a type.
    pub(crate) fn type_arg(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        match self.as_type_expr(expr)? {
            Some(ty) => Ok(ty),
            None => {
                // Report undeclared names as such.
                if let ExprKind::Ident(id) = &expr.kind {
                    if self.env.lookup(&id.name).is_none() {
                        return Err(TypeError::Undeclared {
                            name: id.name.clone(),
                            span: expr.span,
                        });
                    }
                }
                Err(TypeError::NotAType {
                    name: expr_name(expr),
                    span: expr.span,
                })
            }
        }
    }

    /// Negotiate an operand that must be an integer (sizes, indices, shift
    /// counts).
    pub(crate) fn integer_operand(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        let hint = Type::int();
        let ty = self.value(expr, Some(&hint))?;
        if !compat::is_integer(&self.types, &ty) {
            return Err(TypeError::invalid(
                format!("expected an integer, found `{}`", ty),
                expr.span,
            ));
        }
        Ok(ty)
    }

    /// If `expr` denotes a type, rewrite it into a type expression and return
    /// the resolved type.
    pub(crate) fn as_type_expr(&mut self, expr: &mut Expr) -> Result<Option<Type>, TypeError> {
        let span = expr.span;
        let resolved = match &mut expr.kind {
            ExprKind::Type(t) => {
                self.resolve_type(t, span)?;
                return Ok(Some(t.clone()));
            }
            ExprKind::Ident(id) => match self.env.lookup(&id.name).map(|o| &self.objects.get(o).kind) {
                Some(ObjectKind::TypeName(ty)) => ty.clone(),
                _ => return Ok(None),
            },
            ExprKind::Dot(d) => {
                let Some(pkg) = d.left.as_ident() else {
                    return Ok(None);
                };
                match self.env.lookup(&pkg.name).map(|o| &self.objects.get(o).kind) {
                    Some(ObjectKind::Package(p)) if p.types.contains_key(&d.member) => {
                        self.lookup_package_type(&pkg.name, &d.member, span)?
                    }
                    _ => return Ok(None),
                }
            }
            ExprKind::Index(index) => {
                let Some(base) = index.base.as_ident() else {
                    return Ok(None);
                };
                let id = match self.env.lookup(&base.name).map(|o| &self.objects.get(o).kind) {
                    Some(ObjectKind::Generic(id)) if self.template(*id).is_struct() => *id,
                    _ => return Ok(None),
                };
                let args = self.type_args(&mut index.index)?;
                let target = self.instantiate(id, args, span)?;
                target
                    .as_type()
                    .expect("struct instantiations declare a named type")
            }
            _ => return Ok(None),
        };
        expr.kind = ExprKind::Type(resolved.clone());
        Ok(Some(resolved))
    }

    fn type_args(&mut self, exprs: &mut [Expr]) -> Result<Vec<Type>, TypeError> {
        exprs.iter_mut().map(|e| self.type_arg(e)).collect()
    }

    fn literal(&self, lit: &BasicLit, hint: Option<&Type>) -> Type {
        let root = hint.and_then(|h| compat::simple_root(&self.types, h));
        let fits = match lit.kind {
            LitKind::Int | LitKind::Char => root.is_some_and(SimpleType::is_numeric),
            LitKind::Float => root.is_some_and(|s| s.is_float() || s.is_complex()),
            LitKind::Imag => root.is_some_and(SimpleType::is_complex),
            LitKind::String => root == Some(SimpleType::String),
            LitKind::Bool => root == Some(SimpleType::Bool),
        };
        match hint {
            Some(h) if fits => h.clone(),
            _ => Type::Simple(match lit.kind {
                LitKind::Int => SimpleType::Int,
                LitKind::Float => SimpleType::Float64,
                LitKind::Imag => SimpleType::Complex128,
                LitKind::Char => SimpleType::Rune,
                LitKind::String => SimpleType::String,
                LitKind::Bool => SimpleType::Bool,
            }),
        }
    }

    fn ident_value(&mut self, expr: &mut Expr) -> Result<Type, TypeError> {
        let span = expr.span;
        let ExprKind::Ident(id) = &mut expr.kind else {
            unreachable!()
        };
        if id.name == have_types::BLANK {
            return Err(TypeError::invalid("cannot use `_` as a value", span));
        }
        let object = self.env.lookup(&id.name).ok_or_else(|| TypeError::Undeclared {
            name: id.name.clone(),
            span,
        })?;
        id.object = Some(object);
        match &self.objects.get(object).kind {
            ObjectKind::Var(Type::Unknown) => Err(TypeError::CannotInfer {
                what: format!("type of `{}`", id.name),
                span,
            }),
            ObjectKind::Var(ty) => Ok(ty.clone()),
            _ => Err(TypeError::NotAValue {
                name: id.name.clone(),
                span,
            }),
        }
    }

    /// Negotiate both operands, the untyped one last so it can adopt the
    /// other's type. Two untyped operands without a hint combine at the
    /// wider default type.
    fn operands(
        &mut self,
        left: &mut Expr,
        right: &mut Expr,
        hint: Option<&Type>,
    ) -> Result<(Type, Type), TypeError> {
        match (is_untyped(left), is_untyped(right)) {
            (true, false) => {
                let rt = self.value(right, hint)?;
                let lt = self.value(left, Some(&rt))?;
                Ok((lt, rt))
            }
            (false, true) => {
                let lt = self.value(left, hint)?;
                let rt = self.value(right, Some(&lt))?;
                Ok((lt, rt))
            }
            (true, true) => {
                let widest = match hint {
                    Some(h) => Some(h.clone()),
                    None => constant_rank(left)
                        .max(constant_rank(right))
                        .map(|rank| Type::Simple(RANKED_DEFAULTS[rank])),
                };
                let lt = self.value(left, widest.as_ref())?;
                let rt = self.value(right, Some(&lt))?;
                Ok((lt, rt))
            }
            (false, false) => {
                let lt = self.value(left, hint)?;
                let rt = self.value(right, hint.or(Some(&lt)))?;
                Ok((lt, rt))
            }
        }
    }

    fn binary(&mut self, b: &mut BinaryExpr, hint: Option<&Type>, span: Span) -> Result<Type, TypeError> {
        let op = b.op;
        if op.is_logical() {
            let bool_hint = Type::bool();
            let lt = self.value(&mut b.left, Some(&bool_hint))?;
            let rt = self.value(&mut b.right, Some(&lt))?;
            if !compat::is_bool(&self.types, &lt) || lt != rt {
                return Err(self.bad_operands(op, &lt, &rt, span));
            }
            return Ok(lt);
        }
        if op.is_shift() {
            let lt = self.value(&mut b.left, hint)?;
            self.integer_operand(&mut b.right)?;
            if !compat::is_integer(&self.types, &lt) {
                return Err(TypeError::invalid(
                    format!("shifted operand must be an integer, found `{}`", lt),
                    b.left.span,
                ));
            }
            return Ok(lt);
        }
        // Comparisons produce bool; the hint says nothing about the operands.
        let operand_hint = if op.is_comparison() { None } else { hint };
        let (lt, rt) = self.operands(&mut b.left, &mut b.right, operand_hint)?;
        self.binary_result(op, &lt, &rt, span)
    }

    /// Type of `lt op rt`, for operands already negotiated.
    pub(crate) fn binary_result(&self, op: BinaryOp, lt: &Type, rt: &Type, span: Span) -> Result<Type, TypeError> {
        let table = &self.types;
        if op.is_equality() {
            let related = lt == rt || compat::assignable(table, lt, rt) || compat::assignable(table, rt, lt);
            if !related {
                return Err(self.bad_operands(op, lt, rt, span));
            }
            let nil_compare = compat::is_nilable(table, lt);
            if !nil_compare && !compat::comparable(table, lt) {
                return Err(TypeError::invalid(format!("`{}` is not comparable", lt), span));
            }
            return Ok(Type::bool());
        }
        if lt != rt {
            return Err(self.bad_operands(op, lt, rt, span));
        }
        if op.is_comparison() {
            if !compat::ordered(table, lt) {
                return Err(TypeError::invalid(format!("`{}` is not ordered", lt), span));
            }
            return Ok(Type::bool());
        }
        let ok = if op.is_integer_only() {
            compat::is_integer(table, lt)
        } else if op == BinaryOp::Add {
            compat::is_numeric(table, lt) || compat::is_string(table, lt)
        } else {
            compat::is_numeric(table, lt)
        };
        if !ok {
            return Err(TypeError::invalid(
                format!("operator `{}` not defined on `{}`", op.symbol(), lt),
                span,
            ));
        }
        Ok(lt.clone())
    }

    fn bad_operands(&self, op: BinaryOp, lt: &Type, rt: &Type, span: Span) -> TypeError {
        TypeError::invalid(
            format!("mismatched operands `{}` {} `{}`", lt, op.symbol(), rt),
            span,
        )
    }

    fn unary(&mut self, u: &mut UnaryExpr, hint: Option<&Type>, span: Span) -> Result<Type, TypeError> {
        match u.op {
            UnaryOp::Neg | UnaryOp::Plus => {
                let ty = self.value(&mut u.operand, hint)?;
                if !compat::is_numeric(&self.types, &ty) {
                    return Err(self.bad_unary(u.op, &ty, span));
                }
                Ok(ty)
            }
            UnaryOp::Not => {
                let ty = self.value(&mut u.operand, hint)?;
                if !compat::is_bool(&self.types, &ty) {
                    return Err(self.bad_unary(u.op, &ty, span));
                }
                Ok(ty)
            }
            UnaryOp::BitNot => {
                let ty = self.value(&mut u.operand, hint)?;
                if !compat::is_integer(&self.types, &ty) {
                    return Err(self.bad_unary(u.op, &ty, span));
                }
                Ok(ty)
            }
            UnaryOp::Deref => {
                let ty = self.value(&mut u.operand, None)?;
                match self.types.root_type(&ty) {
                    Type::Pointer(to) => Ok(to.as_ref().clone()),
                    _ => Err(self.bad_unary(u.op, &ty, span)),
                }
            }
            UnaryOp::Addr => {
                let inner_hint = match hint.map(|h| self.types.root_type(h)) {
                    Some(Type::Pointer(to)) => Some(to.as_ref().clone()),
                    _ => None,
                };
                let ty = self.value(&mut u.operand, inner_hint.as_ref())?;
                if !is_addressable(&u.operand) && !matches!(u.operand.kind, ExprKind::Compound(_)) {
                    return Err(TypeError::NotAddressable {
                        span: u.operand.span,
                    });
                }
                Ok(Type::pointer(ty))
            }
            UnaryOp::Recv => {
                let ty = self.value(&mut u.operand, None)?;
                match self.types.root_type(&ty) {
                    Type::Chan(c) if c.dir != ChanDir::Send => Ok(c.of.as_ref().clone()),
                    _ => Err(self.bad_unary(u.op, &ty, span)),
                }
            }
        }
    }

    fn bad_unary(&self, op: UnaryOp, ty: &Type, span: Span) -> TypeError {
        TypeError::invalid(
            format!("operator `{}` not defined on `{}`", op.symbol(), ty),
            span,
        )
    }

    fn call(&mut self, call: &mut CallExpr, span: Span) -> Result<Type, TypeError> {
        if let ExprKind::Ident(id) = &mut call.callee.kind {
            if let Some(object) = self.env.lookup(&id.name) {
                if let ObjectKind::Builtin(builtin) = self.objects.get(object).kind {
                    id.object = Some(object);
                    return self.builtin_call(builtin, call, span);
                }
            }
        }
        if let Some(target) = self.as_type_expr(&mut call.callee)? {
            return self.conversion(call, target, span);
        }

        let callee_ty = self.value(&mut call.callee, None)?;
        let sig = match self.types.root_type(&callee_ty) {
            Type::Func(f) => f.clone(),
            _ => {
                return Err(TypeError::NotAFunction {
                    ty: callee_ty,
                    span: call.callee.span,
                })
            }
        };
        self.call_args(call, &sig.args, sig.variadic, span)?;
        Ok(match sig.results.len() {
            1 => sig.results[0].clone(),
            _ => Type::Tuple(sig.results),
        })
    }

    fn call_args(&mut self, call: &mut CallExpr, params: &[Type], variadic: bool, span: Span) -> Result<(), TypeError> {
        // `f(g())` where `g` returns exactly the parameters of `f`.
        if call.args.len() == 1 && params.len() > 1 && !call.ellipsis {
            if let ExprKind::Call(_) = call.args[0].kind {
                let ty = self.expr(&mut call.args[0], None)?;
                if let Type::Tuple(members) = &ty {
                    if members.len() != params.len() {
                        return Err(TypeError::ArgCount {
                            expected: params.len(),
                            found: members.len(),
                            span,
                        });
                    }
                    for (found, expected) in members.iter().zip(params) {
                        if !compat::assignable(&self.types, found, expected) {
                            return Err(TypeError::mismatch(expected, found, call.args[0].span));
                        }
                    }
                    return Ok(());
                }
                return Err(TypeError::ArgCount {
                    expected: params.len(),
                    found: 1,
                    span,
                });
            }
        }

        let found = call.args.len();
        let fixed = if variadic { params.len().saturating_sub(1) } else { params.len() };
        let count_ok = if call.ellipsis {
            variadic && found == params.len()
        } else if variadic {
            found >= fixed
        } else {
            found == fixed
        };
        if !count_ok {
            return Err(TypeError::ArgCount {
                expected: params.len(),
                found,
                span,
            });
        }
        for (i, arg) in call.args.iter_mut().enumerate() {
            let expected = if i < fixed || call.ellipsis {
                params[i].clone()
            } else {
                match &params[fixed] {
                    Type::Slice(of) => of.as_ref().clone(),
                    other => other.clone(),
                }
            };
            self.expect_assignable(arg, &expected)?;
        }
        Ok(())
    }

    fn conversion(&mut self, call: &mut CallExpr, target: Type, span: Span) -> Result<Type, TypeError> {
        if call.args.len() != 1 || call.ellipsis {
            return Err(TypeError::ArgCount {
                expected: 1,
                found: call.args.len(),
                span,
            });
        }
        let arg = &mut call.args[0];
        let found = self.value(arg, Some(&target))?;
        if !compat::convertible(&self.types, &found, &target) {
            return Err(TypeError::invalid(
                format!("cannot convert `{}` to `{}`", found, target),
                arg.span,
            ));
        }
        Ok(target)
    }

    fn index(&mut self, index: &mut IndexExpr, span: Span) -> Result<Type, TypeError> {
        // `Name[T1, T2]` naming a generic function instantiation.
        if let ExprKind::Ident(base) = &mut index.base.kind {
            if let Some(object) = self.env.lookup(&base.name) {
                if let ObjectKind::Generic(id) = self.objects.get(object).kind {
                    base.object = Some(object);
                    if self.template(id).is_struct() {
                        return Err(TypeError::NotAValue {
                            name: base.name.clone(),
                            span,
                        });
                    }
                    let args = self.type_args(&mut index.index)?;
                    let target = self.instantiate(id, args, span)?;
                    index.instance = Some(target.name.clone());
                    return match self.objects.get(target.object).var_type() {
                        Some(Type::Unknown) | None => Err(TypeError::CannotInfer {
                            what: format!("signature of `{}`", target.name),
                            span,
                        }),
                        Some(ty) => Ok(ty.clone()),
                    };
                }
            }
        }

        let base_ty = self.value(&mut index.base, None)?;
        if index.index.len() != 1 {
            return Err(TypeError::NotGeneric {
                name: expr_name(&index.base),
                span,
            });
        }
        let key = &mut index.index[0];
        let root = self.types.root_type(&base_ty).clone();
        match root {
            Type::Slice(of) => {
                self.integer_operand(key)?;
                Ok(*of)
            }
            Type::Array(a) => {
                self.integer_operand(key)?;
                Ok(*a.of)
            }
            Type::Pointer(to) => match self.types.root_type(&to).clone() {
                Type::Array(a) => {
                    self.integer_operand(key)?;
                    Ok(*a.of)
                }
                _ => Err(TypeError::invalid(format!("cannot index `{}`", base_ty), span)),
            },
            Type::Map(m) => {
                self.expect_assignable(key, &m.by)?;
                Ok(*m.of)
            }
            _ if compat::is_string(&self.types, &base_ty) => {
                self.integer_operand(key)?;
                Ok(Type::Simple(SimpleType::Byte))
            }
            _ => Err(TypeError::invalid(format!("cannot index `{}`", base_ty), span)),
        }
    }

    fn slice_expr(&mut self, s: &mut SliceExpr, span: Span) -> Result<Type, TypeError> {
        let base_ty = self.value(&mut s.base, None)?;
        for bound in [s.lo.as_deref_mut(), s.hi.as_deref_mut()].into_iter().flatten() {
            self.integer_operand(bound)?;
        }
        let root = self.types.root_type(&base_ty).clone();
        match root {
            Type::Slice(_) => Ok(base_ty),
            Type::Array(a) => Ok(Type::Slice(a.of)),
            Type::Pointer(to) => match self.types.root_type(&to).clone() {
                Type::Array(a) => Ok(Type::Slice(a.of)),
                _ => Err(TypeError::invalid(format!("cannot slice `{}`", base_ty), span)),
            },
            _ if compat::is_string(&self.types, &base_ty) => Ok(base_ty),
            _ => Err(TypeError::invalid(format!("cannot slice `{}`", base_ty), span)),
        }
    }

    fn dot(&mut self, d: &mut DotExpr, span: Span) -> Result<Type, TypeError> {
        // Package member.
        if let ExprKind::Ident(left) = &mut d.left.kind {
            if let Some(object) = self.env.lookup(&left.name) {
                if let ObjectKind::Package(pkg) = &self.objects.get(object).kind {
                    left.object = Some(object);
                    return match pkg.members.get(&d.member) {
                        Some(ty) => Ok(ty.clone()),
                        None if pkg.types.contains_key(&d.member) => Err(TypeError::NotAValue {
                            name: format!("{}.{}", left.name, d.member),
                            span,
                        }),
                        None => Err(TypeError::UnresolvedImport {
                            package: left.name.clone(),
                            member: d.member.clone(),
                            span,
                        }),
                    };
                }
            }
        }

        let left_ty = self.value(&mut d.left, None)?;
        self.member(&left_ty, &d.member, span)
    }

    /// Field or method `name` of a value of type `ty`, looking through one
    /// pointer.
    pub(crate) fn member(&self, ty: &Type, name: &str, span: Span) -> Result<Type, TypeError> {
        let base = match self.types.root_type(ty) {
            Type::Pointer(to) => to.as_ref(),
            _ => ty,
        };
        if let Type::Struct(s) = self.types.root_type(base) {
            if let Some(field) = s.field(name) {
                return Ok(field.ty.clone());
            }
        }
        if let Some(sig) = compat::method_set(&self.types, ty).remove(name) {
            return Ok(Type::Func(sig));
        }
        // Pointer-receiver methods are callable on addressable values.
        if let Some(method) = self
            .types
            .decl_of(base)
            .and_then(|decl| self.types.method(decl, name))
        {
            return Ok(Type::Func(method.ty.clone()));
        }
        Err(TypeError::NoSuchField {
            ty: ty.clone(),
            field: name.to_string(),
            span,
        })
    }

    fn type_assert(&mut self, a: &mut TypeAssertExpr, span: Span) -> Result<Type, TypeError> {
        let left_ty = self.value(&mut a.left, None)?;
        if compat::as_interface(&self.types, &left_ty).is_none() {
            return Err(TypeError::NotInterface { ty: left_ty, span });
        }
        match &mut a.target {
            Some(target) => {
                self.resolve_type(target, span)?;
                Ok(target.clone())
            }
            None => Err(TypeError::invalid("use of `.(type)` outside a type switch", span)),
        }
    }

    fn compound(&mut self, c: &mut CompoundLit, hint: Option<&Type>, span: Span) -> Result<Type, TypeError> {
        if c.ty == Type::Unknown {
            match hint {
                Some(h) => c.ty = h.clone(),
                None => {
                    return Err(TypeError::CannotInfer {
                        what: "type of composite literal".to_string(),
                        span,
                    })
                }
            }
        } else {
            self.resolve_type(&mut c.ty, span)?;
        }
        let ty = c.ty.clone();
        let root = self.types.root_type(&ty).clone();
        match root {
            Type::Struct(s) => {
                let keyed = c.elems.iter().any(|e| e.key.is_some());
                if keyed && c.elems.iter().any(|e| e.key.is_none()) {
                    return Err(TypeError::invalid(
                        "mixture of field:value and value elements in struct literal",
                        span,
                    ));
                }
                if !keyed && !c.elems.is_empty() && c.elems.len() != s.fields.len() {
                    return Err(TypeError::ValueCount {
                        expected: s.fields.len(),
                        found: c.elems.len(),
                        span,
                    });
                }
                for (i, elem) in c.elems.iter_mut().enumerate() {
                    let field = match &mut elem.key {
                        Some(key) => {
                            let key_span = key.span;
                            let ExprKind::Ident(id) = &mut key.kind else {
                                return Err(TypeError::invalid("struct literal keys must be field names", key_span));
                            };
                            id.member_name = true;
                            s.field(&id.name).ok_or_else(|| TypeError::NoSuchField {
                                ty: ty.clone(),
                                field: id.name.clone(),
                                span: key_span,
                            })?
                        }
                        None => &s.fields[i],
                    };
                    self.expect_assignable(&mut elem.value, &field.ty)?;
                }
            }
            Type::Slice(of) => {
                for elem in &mut c.elems {
                    if let Some(key) = &mut elem.key {
                        self.integer_operand(key)?;
                    }
                    self.expect_assignable(&mut elem.value, &of)?;
                }
            }
            Type::Array(a) => {
                if c.elems.len() > a.size {
                    return Err(TypeError::ValueCount {
                        expected: a.size,
                        found: c.elems.len(),
                        span,
                    });
                }
                for elem in &mut c.elems {
                    if let Some(key) = &mut elem.key {
                        self.integer_operand(key)?;
                    }
                    self.expect_assignable(&mut elem.value, &a.of)?;
                }
            }
            Type::Map(m) => {
                for elem in &mut c.elems {
                    let Some(key) = &mut elem.key else {
                        return Err(TypeError::invalid("missing key in map literal", elem.value.span));
                    };
                    self.expect_assignable(key, &m.by)?;
                    self.expect_assignable(&mut elem.value, &m.of)?;
                }
            }
            _ => {
                return Err(TypeError::invalid(
                    format!("invalid composite literal type `{}`", ty),
                    span,
                ))
            }
        }
        Ok(ty)
    }
}

/// Whether `expr` denotes a storage location.
pub(crate) fn is_addressable(expr: &Expr) -> bool {
    match &expr.kind {
        ExprKind::Ident(id) => id.name != have_types::BLANK,
        ExprKind::Index(_) | ExprKind::Dot(_) => true,
        ExprKind::Unary(u) => u.op == UnaryOp::Deref,
        _ => false,
    }
}
