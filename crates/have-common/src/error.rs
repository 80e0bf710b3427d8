use std::fmt;

use serde::Serialize;

use crate::span::Span;

/// An error reported by the external lexer/parser.
///
/// The core never produces these itself; they reach it when a generic
/// template is re-parsed with concrete arguments and the parser rejects the
/// substituted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
