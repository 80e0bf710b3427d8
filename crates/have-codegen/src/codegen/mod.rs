//! Target text emission from negotiated statements.
//!
//! - [`CodeGen`]: borrows the type table and the output buffer
//! - [`stmt`]: statements, declarations and blocks
//! - [`expr`]: expressions and types in expression position

mod expr;
mod stmt;

use have_ast::{CodeBlock, Stmt, StmtKind};
use have_types::{Type, TypeTable};
use tracing::trace;

use crate::chunk::CodeChunk;

// ── CodeGen ──────────────────────────────────────────────────────────

/// Generation context for one compilation.
///
/// Holds the named-type table (for zero values of named types) and the
/// buffer every statement is appended to.
pub struct CodeGen<'a> {
    pub(crate) types: &'a TypeTable,
    pub(crate) out: &'a mut CodeChunk,
}

impl<'a> CodeGen<'a> {
    pub fn new(types: &'a TypeTable, out: &'a mut CodeChunk) -> Self {
        CodeGen { types, out }
    }

    /// Emit one top-level statement followed by exactly one newline.
    ///
    /// Statements that render to nothing (`pass`, generic templates) leave
    /// the buffer untouched; returns whether anything was written.
    pub fn top_level(&mut self, stmt: &Stmt) -> bool {
        debug_assert_eq!(self.out.level(), 0, "top-level emission inside a block");
        if emits_nothing(stmt) {
            return false;
        }
        let start = self.out.len();
        self.stmt(stmt);
        self.out.write("\n");
        trace!(bytes = self.out.len() - start, "generated top-level statement");
        true
    }

    /// `{`, one indented line per statement, `}` on its own line.
    pub(crate) fn block(&mut self, body: &CodeBlock) {
        self.out.write("{");
        self.out.indent();
        for stmt in body.stmts.iter().filter(|s| !emits_nothing(s)) {
            self.out.newline();
            self.stmt(stmt);
        }
        self.out.dedent();
        self.out.newline();
        self.out.write("}");
    }

    /// Write `items` separated by `, `.
    pub(crate) fn comma_sep<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write(", ");
            }
            each(self, item);
        }
    }

    pub(crate) fn ty(&mut self, ty: &Type) {
        assert!(
            !ty.has_placeholders(),
            "generating unresolved type `{}`",
            ty
        );
        self.out.write(&ty.to_string());
    }
}

/// Whether `stmt` renders to no text at all.
fn emits_nothing(stmt: &Stmt) -> bool {
    match &stmt.kind {
        StmtKind::Pass | StmtKind::Generic(_) => true,
        StmtKind::When(w) => w.active_branch().is_none(),
        _ => false,
    }
}
