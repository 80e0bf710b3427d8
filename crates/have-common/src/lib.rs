//! Shared primitives for the Have compiler crates.
//!
//! - [`span`]: byte-offset source spans and on-demand line/column lookup
//! - [`error`]: errors reported by the external parser

pub mod error;
pub mod span;

pub use error::ParseError;
pub use span::{LineIndex, Span};
