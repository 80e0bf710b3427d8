//! Statement nodes.

use have_common::Span;
use have_types::{DeclId, FuncType, Type};
use rustc_hash::FxHashMap;

use crate::expr::{BinaryOp, Expr, FuncDecl, Variable};
use crate::object::ObjectId;

#[derive(Clone, Debug)]
pub struct Stmt {
    pub span: Span,
    pub kind: StmtKind,
}

#[derive(Clone, Debug)]
pub enum StmtKind {
    Var(VarStmt),
    Func(FuncDecl),
    Assign(AssignStmt),
    Send(SendStmt),
    Struct(StructStmt),
    TypeDecl(TypeDeclStmt),
    Iface(IfaceStmt),
    Pass,
    If(IfStmt),
    Switch(SwitchStmt),
    For(ForStmt),
    ForRange(ForRangeStmt),
    Expr(Expr),
    Branch(BranchStmt),
    Return(ReturnStmt),
    Label(LabelStmt),
    Import(ImportStmt),
    When(WhenStmt),
    Generic(GenericTemplate),
}

impl Stmt {
    pub fn new(kind: StmtKind) -> Self {
        Stmt {
            span: Span::default(),
            kind,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The label attached to a labelable statement.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            StmtKind::For(s) => s.label.as_deref(),
            StmtKind::ForRange(s) => s.label.as_deref(),
            StmtKind::Switch(s) => s.label.as_deref(),
            _ => None,
        }
    }
}

/// Statements in one `{ ... }` body.
#[derive(Clone, Debug, Default)]
pub struct CodeBlock {
    pub stmts: Vec<Stmt>,
}

impl CodeBlock {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        CodeBlock { stmts }
    }
}

/// Labels declared in one function body.
#[derive(Debug, Default)]
pub struct LabelSet {
    labels: FxHashMap<String, Span>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label. On a duplicate, returns the span of the first one.
    pub fn add(&mut self, name: &str, span: Span) -> Result<(), Span> {
        if let Some(&first) = self.labels.get(name) {
            return Err(first);
        }
        self.labels.insert(name.to_string(), span);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }
}

/// One `a, b = x, y` group. Names past the last initializer get none.
#[derive(Clone, Debug, Default)]
pub struct VarDecl {
    pub vars: Vec<Variable>,
    pub inits: Vec<Expr>,
}

impl VarDecl {
    /// Every variable with its initializer, if it has one.
    pub fn pairs(&self) -> impl Iterator<Item = (&Variable, Option<&Expr>)> {
        self.vars
            .iter()
            .enumerate()
            .map(move |(i, v)| (v, self.inits.get(i)))
    }

    /// `a, b = f()`: one initializer producing several values.
    pub fn is_tuple_init(&self) -> bool {
        self.vars.len() > 1 && self.inits.len() == 1
    }
}

/// A chain of declaration groups, declared left to right.
#[derive(Clone, Debug, Default)]
pub struct VarStmt {
    pub decls: Vec<VarDecl>,
}

impl VarStmt {
    pub fn vars(&self) -> impl Iterator<Item = &Variable> {
        self.decls.iter().flat_map(|d| d.vars.iter())
    }

    pub fn var_count(&self) -> usize {
        self.decls.iter().map(|d| d.vars.len()).sum()
    }
}

/// `a, b = x, y` or `a op= x` when `op` is set.
#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub op: Option<BinaryOp>,
    pub rhs: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct SendStmt {
    pub channel: Expr,
    pub value: Expr,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub span: Span,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct StructStmt {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub decl: Option<DeclId>,
}

/// `type Name T`
#[derive(Clone, Debug)]
pub struct TypeDeclStmt {
    pub name: String,
    pub ty: Type,
    pub decl: Option<DeclId>,
}

#[derive(Clone, Debug)]
pub struct IfaceMethodDecl {
    pub name: String,
    pub span: Span,
    pub ty: FuncType,
}

#[derive(Clone, Debug)]
pub struct IfaceStmt {
    pub name: String,
    pub methods: Vec<IfaceMethodDecl>,
    pub decl: Option<DeclId>,
}

#[derive(Clone, Debug)]
pub struct IfBranch {
    pub span: Span,
    pub scoped: Option<VarStmt>,
    /// `None` only for a trailing `else`.
    pub condition: Option<Expr>,
    pub body: CodeBlock,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
}

#[derive(Clone, Debug)]
pub struct TypeSwitch {
    /// `v` in `switch v := x.(type)`.
    pub bind: Option<String>,
    pub subject: Expr,
}

#[derive(Clone, Debug)]
pub enum SwitchValue {
    Expr(Expr),
    Type(TypeSwitch),
}

#[derive(Clone, Debug)]
pub struct SwitchBranch {
    pub span: Span,
    /// `None` for `default`. Type expressions in a type switch.
    pub values: Option<Vec<Expr>>,
    pub body: CodeBlock,
    /// The type-switch binding as seen in this branch only.
    pub bound: Option<Variable>,
}

#[derive(Clone, Debug)]
pub struct SwitchStmt {
    pub label: Option<String>,
    pub scoped: Option<VarStmt>,
    /// `None` for a free-form switch over boolean cases.
    pub value: Option<SwitchValue>,
    pub branches: Vec<SwitchBranch>,
}

#[derive(Clone, Debug)]
pub struct ForStmt {
    pub label: Option<String>,
    pub scoped: Option<VarStmt>,
    pub condition: Option<Expr>,
    /// Any simple statement.
    pub repeat: Option<Box<Stmt>>,
    pub body: CodeBlock,
}

#[derive(Clone, Debug)]
pub enum RangeVars {
    /// `for k, v in s` declaring new variables.
    Scoped(Vec<Variable>),
    /// Iteration assigning to variables declared outside the loop.
    Outside(Vec<Expr>),
}

#[derive(Clone, Debug)]
pub struct ForRangeStmt {
    pub label: Option<String>,
    pub vars: RangeVars,
    pub series: Expr,
    pub body: CodeBlock,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
}

impl BranchKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BranchStmt {
    pub kind: BranchKind,
    pub label: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub values: Vec<Expr>,
}

#[derive(Clone, Debug)]
pub struct LabelStmt {
    pub name: String,
    pub object: Option<ObjectId>,
}

/// A resolved package, as handed over by the import resolver.
#[derive(Clone, Debug, Default)]
pub struct PackageHandle {
    pub path: String,
    /// Exported values (functions, variables, constants) by name.
    pub members: FxHashMap<String, Type>,
    /// Exported named types by name, with their underlying types.
    pub types: FxHashMap<String, Type>,
}

#[derive(Clone, Debug)]
pub struct ImportStmt {
    pub name: String,
    pub path: String,
    pub package: PackageHandle,
    pub object: Option<ObjectId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PredicateKind {
    Is,
    Implements,
    Default,
}

#[derive(Clone, Debug)]
pub struct WhenPredicate {
    pub kind: PredicateKind,
    /// `None` for `default`.
    pub ty: Option<Type>,
}

#[derive(Clone, Debug)]
pub struct WhenBranch {
    pub span: Span,
    /// One predicate per `when` argument.
    pub predicates: Vec<WhenPredicate>,
    pub body: CodeBlock,
    /// Set by negotiation on the single selected branch.
    pub active: bool,
}

/// Compile-time selection between bodies based on type predicates.
#[derive(Clone, Debug)]
pub struct WhenStmt {
    pub args: Vec<Type>,
    pub branches: Vec<WhenBranch>,
}

impl WhenStmt {
    pub fn active_branch(&self) -> Option<&WhenBranch> {
        self.branches.iter().find(|b| b.active)
    }
}

#[derive(Clone, Debug)]
pub enum GenericBody {
    Func(FuncDecl),
    Struct(StructStmt),
}

/// An uninstantiated generic function or struct.
#[derive(Clone, Debug)]
pub struct GenericTemplate {
    pub name: String,
    pub params: Vec<String>,
    /// Parsed body, with parameters appearing as `Type::GenericParam`.
    pub body: GenericBody,
    /// Source text of the declaration, for re-parsing.
    pub code: String,
    /// Import names in effect where the template was declared.
    pub imports: Vec<String>,
    /// Byte offset of `code` in its file.
    pub offset: u32,
}

impl GenericTemplate {
    pub fn is_struct(&self) -> bool {
        matches!(self.body, GenericBody::Struct(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build;

    #[test]
    fn excess_names_get_no_initializer() {
        let decl = VarDecl {
            vars: vec![
                Variable::new("a", Type::int()),
                Variable::new("b", Type::int()),
                Variable::new("c", Type::int()),
            ],
            inits: vec![build::int(1), build::int(2)],
        };
        let inits: Vec<bool> = decl.pairs().map(|(_, init)| init.is_some()).collect();
        assert_eq!(inits, [true, true, false]);
        assert!(!decl.is_tuple_init());
    }

    #[test]
    fn var_chain_counts_all_groups() {
        let stmt = VarStmt {
            decls: vec![
                VarDecl {
                    vars: vec![Variable::new("a", Type::Unknown)],
                    inits: vec![build::int(1)],
                },
                VarDecl {
                    vars: vec![Variable::new("b", Type::Unknown), Variable::new("c", Type::Unknown)],
                    inits: vec![build::call(build::ident("f"), vec![])],
                },
            ],
        };
        assert_eq!(stmt.var_count(), 3);
        let names: Vec<&str> = stmt.vars().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(stmt.decls[1].is_tuple_init());
    }

    #[test]
    fn duplicate_label_reports_first_site() {
        let mut labels = LabelSet::new();
        assert!(labels.add("outer", Span::new(0, 5)).is_ok());
        assert_eq!(labels.add("outer", Span::new(20, 25)), Err(Span::new(0, 5)));
        assert!(labels.contains("outer"));
        assert!(!labels.contains("inner"));
    }

    #[test]
    fn label_only_on_labelable_statements() {
        let mut stmt = build::for_stmt(None, Some(build::bool_lit(true)), None, vec![]);
        if let StmtKind::For(f) = &mut stmt.kind {
            f.label = Some("loop".into());
        }
        assert_eq!(stmt.label(), Some("loop"));
        assert_eq!(build::expr_stmt(build::int(1)).label(), None);
    }
}
