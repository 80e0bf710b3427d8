//! Expression nodes.

use have_common::Span;
use have_types::{FuncType, Type};

use crate::object::ObjectId;
use crate::stmt::CodeBlock;

/// An expression with its source span and, once negotiated, its type.
#[derive(Clone, Debug)]
pub struct Expr {
    pub span: Span,
    pub kind: ExprKind,
    /// `None` until negotiation assigns a type.
    pub ty: Option<Type>,
}

#[derive(Clone, Debug)]
pub enum ExprKind {
    /// `_`, or the absence of an expression.
    Blank,
    Nil,
    Lit(BasicLit),
    Ident(Ident),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    Dot(DotExpr),
    TypeAssert(TypeAssertExpr),
    Compound(CompoundLit),
    FuncLit(Box<FuncDecl>),
    /// A type in expression position: conversion targets, `make`/`new`
    /// arguments, type-switch cases.
    Type(Type),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
    Bool,
}

/// A literal, kept as its source text (quotes included for strings).
#[derive(Clone, Debug)]
pub struct BasicLit {
    pub kind: LitKind,
    pub raw: String,
}

#[derive(Clone, Debug)]
pub struct Ident {
    pub name: String,
    pub object: Option<ObjectId>,
    /// Set by negotiation when the identifier is a struct member name used as
    /// a compound literal key; such identifiers bind to no object.
    pub member_name: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    Xor,
    AndNot,
    Shl,
    Shr,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::Xor => "^",
            BinaryOp::AndNot => "&^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }

    /// `==` and `!=`, which also apply to non-ordered types.
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }

    /// Operators restricted to integer operands.
    pub fn is_integer_only(self) -> bool {
        matches!(
            self,
            BinaryOp::Rem
                | BinaryOp::BitAnd
                | BinaryOp::BitOr
                | BinaryOp::Xor
                | BinaryOp::AndNot
                | BinaryOp::Shl
                | BinaryOp::Shr
        )
    }
}

#[derive(Clone, Debug)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    Deref,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Deref => "*",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

#[derive(Clone, Debug)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    /// `f(a, b...)`
    pub ellipsis: bool,
}

/// `a[i]`, or `Name[T1, T2]` naming a generic function instantiation.
#[derive(Clone, Debug)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Vec<Expr>,
    /// External name of the instantiation, once negotiation resolves one.
    pub instance: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SliceExpr {
    pub base: Box<Expr>,
    pub lo: Option<Box<Expr>>,
    pub hi: Option<Box<Expr>>,
}

#[derive(Clone, Debug)]
pub struct DotExpr {
    pub left: Box<Expr>,
    pub member: String,
}

/// `x.(T)`; `target` is `None` for the `x.(type)` form of type switches.
#[derive(Clone, Debug)]
pub struct TypeAssertExpr {
    pub left: Box<Expr>,
    pub target: Option<Type>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CompoundKind {
    Empty,
    ListLike,
    MapLike,
}

#[derive(Clone, Debug)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// `T{...}`. `ty` is `Unknown` when elided inside an enclosing literal.
#[derive(Clone, Debug)]
pub struct CompoundLit {
    pub ty: Type,
    pub elems: Vec<Element>,
}

impl CompoundLit {
    pub fn kind(&self) -> CompoundKind {
        match self.elems.first() {
            None => CompoundKind::Empty,
            Some(e) if e.key.is_some() => CompoundKind::MapLike,
            Some(_) => CompoundKind::ListLike,
        }
    }
}

/// A declared name with its (possibly still unknown) type.
///
/// Used for variables, function parameters and results, receivers, range
/// variables and type-switch bindings.
#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub span: Span,
    pub ty: Type,
    pub object: Option<ObjectId>,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Variable {
            name: name.into(),
            span: Span::default(),
            ty,
            object: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.name == have_types::BLANK
    }
}

/// A function body with its signature. Appears as a top-level or method
/// declaration (`StmtKind::Func`) and as a function literal.
#[derive(Clone, Debug)]
pub struct FuncDecl {
    /// Empty for function literals.
    pub name: String,
    pub receiver: Option<Variable>,
    pub params: Vec<Variable>,
    /// Result names may be empty.
    pub results: Vec<Variable>,
    pub variadic: bool,
    pub body: CodeBlock,
    pub object: Option<ObjectId>,
}

impl FuncDecl {
    pub fn signature(&self) -> FuncType {
        FuncType {
            args: self.params.iter().map(|p| p.ty.clone()).collect(),
            results: self.results.iter().map(|r| r.ty.clone()).collect(),
            variadic: self.variadic,
        }
    }

    pub fn is_method(&self) -> bool {
        self.receiver.is_some()
    }

    /// Base name of the receiver's type, looking through one pointer.
    pub fn receiver_type_name(&self) -> Option<String> {
        let recv = self.receiver.as_ref()?;
        let base = match &recv.ty {
            Type::Pointer(to) => to.as_ref(),
            other => other,
        };
        match base {
            Type::Custom(c) => Some(c.name.clone()),
            Type::GenericInstance(g) => Some(g.name.clone()),
            _ => None,
        }
    }

    pub fn ptr_receiver(&self) -> bool {
        matches!(
            self.receiver.as_ref().map(|r| &r.ty),
            Some(Type::Pointer(_))
        )
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr {
            span: Span::default(),
            kind,
            ty: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The name if this is a plain identifier.
    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match &self.kind {
            ExprKind::Blank => true,
            ExprKind::Ident(id) => id.name == have_types::BLANK,
            _ => false,
        }
    }
}
