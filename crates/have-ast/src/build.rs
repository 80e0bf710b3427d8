//! Node constructors.
//!
//! Parsers and tests build trees through these helpers instead of spelling
//! out every struct. All nodes get a default span; use `with_span` where
//! positions matter.

use have_types::{FuncType, Type};

use crate::expr::{
    BasicLit, BinaryExpr, BinaryOp, CallExpr, CompoundLit, DotExpr, Element, Expr, ExprKind,
    FuncDecl, Ident, IndexExpr, LitKind, SliceExpr, TypeAssertExpr, UnaryExpr, UnaryOp, Variable,
};
use crate::stmt::{
    AssignStmt, BranchKind, BranchStmt, CodeBlock, FieldDecl, ForRangeStmt, ForStmt, GenericBody,
    GenericTemplate, IfBranch, IfStmt, IfaceMethodDecl, IfaceStmt, ImportStmt, LabelStmt,
    PackageHandle, RangeVars, ReturnStmt, SendStmt, Stmt, StmtKind, StructStmt, SwitchBranch,
    SwitchStmt, SwitchValue, TypeDeclStmt, TypeSwitch, VarDecl, VarStmt, WhenStmt,
};

// ── Expressions ────────────────────────────────────────────────────────

fn lit(kind: LitKind, raw: impl Into<String>) -> Expr {
    Expr::new(ExprKind::Lit(BasicLit {
        kind,
        raw: raw.into(),
    }))
}

pub fn int(value: i64) -> Expr {
    lit(LitKind::Int, value.to_string())
}

pub fn float(raw: &str) -> Expr {
    lit(LitKind::Float, raw)
}

/// A string literal; `value` is the unquoted content.
pub fn string(value: &str) -> Expr {
    lit(LitKind::String, format!("\"{}\"", value.escape_default()))
}

pub fn char_lit(value: char) -> Expr {
    lit(LitKind::Char, format!("'{}'", value.escape_default()))
}

pub fn bool_lit(value: bool) -> Expr {
    lit(LitKind::Bool, value.to_string())
}

pub fn nil() -> Expr {
    Expr::new(ExprKind::Nil)
}

pub fn blank() -> Expr {
    Expr::new(ExprKind::Blank)
}

pub fn ident(name: &str) -> Expr {
    Expr::new(ExprKind::Ident(Ident {
        name: name.to_string(),
        object: None,
        member_name: false,
    }))
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::new(ExprKind::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    Expr::new(ExprKind::Unary(UnaryExpr {
        op,
        operand: Box::new(operand),
    }))
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Call(CallExpr {
        callee: Box::new(callee),
        args,
        ellipsis: false,
    }))
}

pub fn index(base: Expr, index: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Index(IndexExpr {
        base: Box::new(base),
        index,
        instance: None,
    }))
}

pub fn slice(base: Expr, lo: Option<Expr>, hi: Option<Expr>) -> Expr {
    Expr::new(ExprKind::Slice(SliceExpr {
        base: Box::new(base),
        lo: lo.map(Box::new),
        hi: hi.map(Box::new),
    }))
}

pub fn dot(left: Expr, member: &str) -> Expr {
    Expr::new(ExprKind::Dot(DotExpr {
        left: Box::new(left),
        member: member.to_string(),
    }))
}

pub fn assert_type(left: Expr, target: Option<Type>) -> Expr {
    Expr::new(ExprKind::TypeAssert(TypeAssertExpr {
        left: Box::new(left),
        target,
    }))
}

pub fn type_expr(ty: Type) -> Expr {
    Expr::new(ExprKind::Type(ty))
}

pub fn compound(ty: Type, values: Vec<Expr>) -> Expr {
    Expr::new(ExprKind::Compound(CompoundLit {
        ty,
        elems: values
            .into_iter()
            .map(|value| Element { key: None, value })
            .collect(),
    }))
}

pub fn keyed_compound(ty: Type, pairs: Vec<(Expr, Expr)>) -> Expr {
    Expr::new(ExprKind::Compound(CompoundLit {
        ty,
        elems: pairs
            .into_iter()
            .map(|(key, value)| Element {
                key: Some(key),
                value,
            })
            .collect(),
    }))
}

pub fn func_lit(decl: FuncDecl) -> Expr {
    Expr::new(ExprKind::FuncLit(Box::new(decl)))
}

// ── Declarations ───────────────────────────────────────────────────────

pub fn param(name: &str, ty: Type) -> Variable {
    Variable::new(name, ty)
}

pub fn func(name: &str, params: Vec<Variable>, results: Vec<Type>, body: Vec<Stmt>) -> FuncDecl {
    FuncDecl {
        name: name.to_string(),
        receiver: None,
        params,
        results: results.into_iter().map(|ty| Variable::new("", ty)).collect(),
        variadic: false,
        body: CodeBlock::new(body),
        object: None,
    }
}

pub fn method(recv: Variable, mut decl: FuncDecl) -> FuncDecl {
    decl.receiver = Some(recv);
    decl
}

pub fn func_stmt(decl: FuncDecl) -> Stmt {
    Stmt::new(StmtKind::Func(decl))
}

/// `var a, b = x, y` with every type left to inference.
pub fn var(names: &[&str], inits: Vec<Expr>) -> Stmt {
    Stmt::new(StmtKind::Var(VarStmt {
        decls: vec![VarDecl {
            vars: names.into_iter().map(|n| Variable::new(*n, Type::Unknown)).collect(),
            inits,
        }],
    }))
}

pub fn typed_var(name: &str, ty: Type, init: Option<Expr>) -> Stmt {
    Stmt::new(StmtKind::Var(VarStmt {
        decls: vec![VarDecl {
            vars: vec![Variable::new(name, ty)],
            inits: init.into_iter().collect(),
        }],
    }))
}

/// Scoped initializer clause `a = x, b = y`.
pub fn scoped(pairs: Vec<(&str, Expr)>) -> VarStmt {
    VarStmt {
        decls: pairs
            .into_iter()
            .map(|(name, init)| VarDecl {
                vars: vec![Variable::new(name, Type::Unknown)],
                inits: vec![init],
            })
            .collect(),
    }
}

/// Scoped clause built from whole groups, e.g. `a, b = two()` then `c = 3`.
pub fn scoped_groups(groups: Vec<(Vec<&str>, Vec<Expr>)>) -> VarStmt {
    VarStmt {
        decls: groups
            .into_iter()
            .map(|(names, inits)| VarDecl {
                vars: names.into_iter().map(|n| Variable::new(n, Type::Unknown)).collect(),
                inits,
            })
            .collect(),
    }
}

pub fn struct_stmt(name: &str, fields: Vec<(&str, Type)>) -> Stmt {
    Stmt::new(StmtKind::Struct(struct_decl(name, fields)))
}

fn struct_decl(name: &str, fields: Vec<(&str, Type)>) -> StructStmt {
    StructStmt {
        name: name.to_string(),
        fields: fields
            .into_iter()
            .map(|(n, ty)| FieldDecl {
                name: n.to_string(),
                span: Default::default(),
                ty,
            })
            .collect(),
        decl: None,
    }
}

pub fn type_decl(name: &str, ty: Type) -> Stmt {
    Stmt::new(StmtKind::TypeDecl(TypeDeclStmt {
        name: name.to_string(),
        ty,
        decl: None,
    }))
}

pub fn iface(name: &str, methods: Vec<(&str, FuncType)>) -> Stmt {
    Stmt::new(StmtKind::Iface(IfaceStmt {
        name: name.to_string(),
        methods: methods
            .into_iter()
            .map(|(n, ty)| IfaceMethodDecl {
                name: n.to_string(),
                span: Default::default(),
                ty,
            })
            .collect(),
        decl: None,
    }))
}

pub fn import(name: &str, package: PackageHandle) -> Stmt {
    Stmt::new(StmtKind::Import(ImportStmt {
        name: name.to_string(),
        path: package.path.clone(),
        package,
        object: None,
    }))
}

pub fn generic_func(params: &[&str], decl: FuncDecl) -> Stmt {
    Stmt::new(StmtKind::Generic(GenericTemplate {
        name: decl.name.clone(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body: GenericBody::Func(decl),
        code: String::new(),
        imports: Vec::new(),
        offset: 0,
    }))
}

pub fn generic_struct(name: &str, params: &[&str], fields: Vec<(&str, Type)>) -> Stmt {
    Stmt::new(StmtKind::Generic(GenericTemplate {
        name: name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
        body: GenericBody::Struct(struct_decl(name, fields)),
        code: String::new(),
        imports: Vec::new(),
        offset: 0,
    }))
}

// ── Statements ─────────────────────────────────────────────────────────

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::new(StmtKind::Expr(expr))
}

pub fn pass() -> Stmt {
    Stmt::new(StmtKind::Pass)
}

pub fn assign(lhs: Vec<Expr>, rhs: Vec<Expr>) -> Stmt {
    Stmt::new(StmtKind::Assign(AssignStmt { lhs, op: None, rhs }))
}

pub fn op_assign(lhs: Expr, op: BinaryOp, rhs: Expr) -> Stmt {
    Stmt::new(StmtKind::Assign(AssignStmt {
        lhs: vec![lhs],
        op: Some(op),
        rhs: vec![rhs],
    }))
}

pub fn send(channel: Expr, value: Expr) -> Stmt {
    Stmt::new(StmtKind::Send(SendStmt { channel, value }))
}

pub fn ret(values: Vec<Expr>) -> Stmt {
    Stmt::new(StmtKind::Return(ReturnStmt { values }))
}

pub fn label(name: &str) -> Stmt {
    Stmt::new(StmtKind::Label(LabelStmt {
        name: name.to_string(),
        object: None,
    }))
}

pub fn branch(kind: BranchKind, label: Option<&str>) -> Stmt {
    Stmt::new(StmtKind::Branch(BranchStmt {
        kind,
        label: label.map(str::to_string),
    }))
}

pub fn if_branch(scoped: Option<VarStmt>, condition: Option<Expr>, body: Vec<Stmt>) -> IfBranch {
    IfBranch {
        span: Default::default(),
        scoped,
        condition,
        body: CodeBlock::new(body),
    }
}

pub fn if_stmt(branches: Vec<IfBranch>) -> Stmt {
    Stmt::new(StmtKind::If(IfStmt { branches }))
}

pub fn for_stmt(
    scoped: Option<VarStmt>,
    condition: Option<Expr>,
    repeat: Option<Stmt>,
    body: Vec<Stmt>,
) -> Stmt {
    Stmt::new(StmtKind::For(ForStmt {
        label: None,
        scoped,
        condition,
        repeat: repeat.map(Box::new),
        body: CodeBlock::new(body),
    }))
}

pub fn for_range(vars: &[&str], series: Expr, body: Vec<Stmt>) -> Stmt {
    Stmt::new(StmtKind::ForRange(ForRangeStmt {
        label: None,
        vars: RangeVars::Scoped(vars.iter().map(|n| Variable::new(*n, Type::Unknown)).collect()),
        series,
        body: CodeBlock::new(body),
    }))
}

pub fn case(values: Option<Vec<Expr>>, body: Vec<Stmt>) -> SwitchBranch {
    SwitchBranch {
        span: Default::default(),
        values,
        body: CodeBlock::new(body),
        bound: None,
    }
}

pub fn switch(value: Option<Expr>, branches: Vec<SwitchBranch>) -> Stmt {
    Stmt::new(StmtKind::Switch(SwitchStmt {
        label: None,
        scoped: None,
        value: value.map(SwitchValue::Expr),
        branches,
    }))
}

pub fn type_switch(bind: Option<&str>, subject: Expr, branches: Vec<SwitchBranch>) -> Stmt {
    Stmt::new(StmtKind::Switch(SwitchStmt {
        label: None,
        scoped: None,
        value: Some(SwitchValue::Type(TypeSwitch {
            bind: bind.map(str::to_string),
            subject,
        })),
        branches,
    }))
}

pub fn when(args: Vec<Type>, branches: Vec<crate::stmt::WhenBranch>) -> Stmt {
    Stmt::new(StmtKind::When(WhenStmt { args, branches }))
}
