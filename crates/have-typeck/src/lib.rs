//! Have type negotiation.
//!
//! Negotiation walks each top-level statement post-order, binds every
//! identifier to an object, assigns a concrete type to every expression and
//! replaces generic placeholders with on-demand instantiations. A statement
//! that negotiates successfully can be handed to code generation.
//!
//! # Architecture
//!
//! - [`context`]: `TypesContext`, the per-compilation state threaded through
//!   every pass (objects, named types, scopes, instantiation cache)
//! - [`env`]: scope stack mapping names to objects
//! - [`builtins`]: universe scope and builtin function calls
//! - [`compat`]: assignability, method sets and operand classes
//! - [`negotiate`]: predeclaration and statement/expression negotiation
//! - [`generics`]: template re-parsing seam and memoized instantiation
//! - [`error`]: `TypeError`
//! - [`diagnostics`]: ariadne and JSON rendering of errors

pub mod builtins;
pub mod compat;
pub mod context;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod generics;
pub mod negotiate;

use serde::Deserialize;

pub use context::TypesContext;
pub use error::TypeError;
pub use generics::{InstKey, InstState, Instantiation, SubstitutingParser, TemplateParser};

/// Negotiation settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How deeply instantiations may trigger further instantiations.
    pub max_instantiation_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_instantiation_depth: 64,
        }
    }
}

/// Errors collected over a whole compilation unit.
#[derive(Debug, Default)]
pub struct TypeckResult {
    pub errors: Vec<TypeError>,
}

impl TypeckResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render every error as an ariadne diagnostic.
    pub fn render_errors(&self, source: &str, filename: &str) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| diagnostics::render_diagnostic(e, source, filename))
            .collect()
    }
}
