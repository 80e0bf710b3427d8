//! Abstract syntax model for the Have compiler.
//!
//! The external parser produces an ordered list of [`Stmt`] values. Nodes are
//! structurally fixed after parsing; negotiation only fills in the slots left
//! open for it (identifier bindings, expression types, declaration ids,
//! instantiation names).
//!
//! # Architecture
//!
//! - [`expr`]: expression node set
//! - [`stmt`]: statement node set, code blocks, generic templates
//! - [`object`]: named entities that identifiers resolve to
//! - [`deps`]: `TopLevelStmt` with its declared and referenced names
//! - [`walk`]: mutable traversal of every type slot in a statement
//! - [`build`]: node constructors for parsers and tests

pub mod build;
pub mod deps;
pub mod expr;
pub mod object;
pub mod stmt;
pub mod walk;

pub use deps::{StmtState, TopLevelStmt};
pub use expr::{
    BasicLit, BinaryExpr, BinaryOp, CallExpr, CompoundKind, CompoundLit, DotExpr, Element, Expr,
    ExprKind, FuncDecl, Ident, IndexExpr, LitKind, SliceExpr, TypeAssertExpr, UnaryExpr, UnaryOp,
    Variable,
};
pub use object::{Builtin, GenericId, Object, ObjectArena, ObjectId, ObjectKind};
pub use stmt::{
    AssignStmt, BranchKind, BranchStmt, CodeBlock, FieldDecl, ForRangeStmt, ForStmt,
    GenericBody, GenericTemplate, IfBranch, IfStmt, IfaceMethodDecl, IfaceStmt, ImportStmt,
    LabelSet, LabelStmt, PackageHandle, PredicateKind, RangeVars, ReturnStmt, SendStmt, Stmt,
    StmtKind, StructStmt, SwitchBranch, SwitchStmt, SwitchValue, TypeDeclStmt, TypeSwitch,
    VarDecl, VarStmt, WhenBranch, WhenPredicate, WhenStmt,
};
