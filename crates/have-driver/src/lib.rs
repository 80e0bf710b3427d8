//! Have compilation pipeline.
//!
//! Takes the parsed top-level statements of one unit and drives them through
//! predeclaration, negotiation and generation. Negotiation runs over the whole
//! unit before anything is generated, so output is produced only for units
//! that negotiate without errors.
//!
//! # Architecture
//!
//! - [`graph`]: dependency graph over top-level statements and the
//!   negotiation order derived from it
//! - [`Compiler`]: owns the negotiation context and the output buffer

pub mod graph;

use have_ast::{Stmt, StmtState, TopLevelStmt};
use have_codegen::{CodeChunk, CodeGen, GenConfig};
use have_typeck::{Config, TemplateParser, TypeError, TypesContext};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::graph::StmtGraph;

/// Settings for a whole compilation.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompileOptions {
    pub typeck: Config,
    pub codegen: GenConfig,
}

/// Compiles units into one output buffer.
///
/// Units compiled by the same `Compiler` share a package scope: names
/// declared by an earlier unit are visible to later ones.
pub struct Compiler {
    ctx: TypesContext,
    out: CodeChunk,
    /// Instantiations already written to `out`.
    emitted: usize,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Compiler {
            ctx: TypesContext::new(options.typeck),
            out: options.codegen.chunk(),
            emitted: 0,
        }
    }

    /// A compiler that re-parses generic bodies with `parser`.
    pub fn with_parser(options: CompileOptions, parser: Box<dyn TemplateParser>) -> Self {
        Compiler {
            ctx: TypesContext::with_parser(options.typeck, parser),
            out: options.codegen.chunk(),
            emitted: 0,
        }
    }

    /// Negotiate and generate one unit.
    ///
    /// Returns the text this unit appended: every statement in source order,
    /// then the instantiations it requested. On failure the buffer is left
    /// untouched and every error found across the unit is returned.
    pub fn compile(&mut self, stmts: Vec<Stmt>) -> Result<String, Vec<TypeError>> {
        let mut tops: Vec<TopLevelStmt> = stmts.into_iter().map(TopLevelStmt::new).collect();
        self.ctx.predeclare(&mut tops)?;

        let graph = StmtGraph::build(&tops);
        let order = graph.negotiation_order();
        debug!(
            statements = tops.len(),
            components = order.len(),
            "negotiation order"
        );

        let mut errors = Vec::new();
        for id in order.into_iter().flatten() {
            let top = &mut tops[id.0 as usize];
            top.state = StmtState::Negotiating;
            trace!(stmt = id.0, decls = ?top.decls(), "negotiating");
            match self.ctx.negotiate(&mut top.stmt) {
                Ok(()) => top.state = StmtState::Negotiated,
                Err(mut errs) => {
                    debug!(stmt = id.0, errors = errs.len(), "negotiation failed");
                    errors.append(&mut errs);
                }
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let start = self.out.len();
        let mut gen = CodeGen::new(&self.ctx.types, &mut self.out);
        for top in &mut tops {
            debug_assert_eq!(top.state, StmtState::Negotiated);
            gen.top_level(&top.stmt);
            top.state = StmtState::Generated;
        }
        let mut emitted = 0;
        for inst in self.ctx.instantiations().skip(self.emitted) {
            trace!(instance = %inst.target.name, "generating instantiation");
            gen.top_level(&inst.stmt);
            emitted += 1;
        }
        self.emitted += emitted;
        debug!(
            bytes = self.out.len() - start,
            instantiations = emitted,
            "generated unit"
        );
        Ok(self.out.read_all()[start..].to_string())
    }

    /// Everything generated so far.
    pub fn read_all(&self) -> &str {
        self.out.read_all()
    }

    pub fn context(&self) -> &TypesContext {
        &self.ctx
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}
