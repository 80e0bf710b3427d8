//! Have target source generation.
//!
//! Generation walks negotiated statements and appends their target-language
//! rendering to a [`CodeChunk`]. It never reports errors: every statement it
//! is handed must have negotiated successfully, and a violated precondition
//! (an unresolved type, an uninstantiated generic) is an internal panic.
//!
//! # Architecture
//!
//! - [`chunk`]: `CodeChunk`, the append-only output buffer
//! - [`codegen`]: `CodeGen`, statement and expression emission

pub mod chunk;
pub mod codegen;

use serde::Deserialize;

pub use chunk::CodeChunk;
pub use codegen::CodeGen;

/// Generation settings.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenConfig {
    /// Indentation unit per nesting level.
    pub indent: String,
}

impl Default for GenConfig {
    fn default() -> Self {
        GenConfig {
            indent: "\t".to_string(),
        }
    }
}

impl GenConfig {
    /// An empty buffer using this configuration.
    pub fn chunk(&self) -> CodeChunk {
        CodeChunk::new(self.indent.clone())
    }
}
