//! Negotiation errors.
//!
//! Every variant carries the span it reports against. Failures of a nested
//! generic instantiation are aggregated into one `Instantiation` error that
//! keeps the full list.

use std::fmt;

use have_common::{ParseError, Span};
use have_types::Type;

/// A recoverable, user-facing error found during negotiation.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// A name is used but not declared in any enclosing scope.
    Undeclared { name: String, span: Span },
    /// A name is declared twice in one scope.
    Redeclared {
        name: String,
        span: Span,
        first: Span,
    },
    /// A value's type is not assignable to the type required by its context.
    Mismatch {
        expected: Type,
        found: Type,
        span: Span,
    },
    /// A name used in type position does not denote a type.
    NotAType { name: String, span: Span },
    /// A type, package or generic is used where a value is required.
    NotAValue { name: String, span: Span },
    NotAFunction { ty: Type, span: Span },
    /// A call passes the wrong number of arguments.
    ArgCount {
        expected: usize,
        found: usize,
        span: Span,
    },
    /// The number of values does not match the number of receivers
    /// (assignments, declarations, returns, range variables).
    ValueCount {
        expected: usize,
        found: usize,
        span: Span,
    },
    NoSuchField {
        ty: Type,
        field: String,
        span: Span,
    },
    /// An operator or statement is applied to operands it does not accept.
    InvalidOperation { message: String, span: Span },
    NonBoolCondition { found: Type, span: Span },
    DuplicateLabel {
        name: String,
        span: Span,
        first: Span,
    },
    UnresolvedLabel { name: String, span: Span },
    /// `break`/`continue` outside any loop or switch that accepts it.
    BranchOutside { keyword: String, span: Span },
    /// No type can be determined for a declaration or expression.
    CannotInfer { what: String, span: Span },
    UnresolvedImport {
        package: String,
        member: String,
        span: Span,
    },
    NotAddressable { span: Span },
    /// Type arguments given to something that is not a generic.
    NotGeneric { name: String, span: Span },
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },
    /// A named type that contains itself by value, directly or through an
    /// alias chain.
    RecursiveType { names: Vec<String>, span: Span },
    NotInterface { ty: Type, span: Span },
    /// Instantiating a generic failed; `errors` are the nested failures.
    Instantiation {
        name: String,
        span: Span,
        errors: Vec<TypeError>,
    },
    /// Nested instantiations exceeded the configured depth.
    InstantiationDepth {
        name: String,
        limit: usize,
        span: Span,
    },
    /// The parser rejected a generic body after substitution.
    Reparse { error: ParseError },
}

impl TypeError {
    pub fn span(&self) -> Span {
        match self {
            TypeError::Undeclared { span, .. }
            | TypeError::Redeclared { span, .. }
            | TypeError::Mismatch { span, .. }
            | TypeError::NotAType { span, .. }
            | TypeError::NotAValue { span, .. }
            | TypeError::NotAFunction { span, .. }
            | TypeError::ArgCount { span, .. }
            | TypeError::ValueCount { span, .. }
            | TypeError::NoSuchField { span, .. }
            | TypeError::InvalidOperation { span, .. }
            | TypeError::NonBoolCondition { span, .. }
            | TypeError::DuplicateLabel { span, .. }
            | TypeError::UnresolvedLabel { span, .. }
            | TypeError::BranchOutside { span, .. }
            | TypeError::CannotInfer { span, .. }
            | TypeError::UnresolvedImport { span, .. }
            | TypeError::NotAddressable { span }
            | TypeError::NotGeneric { span, .. }
            | TypeError::GenericArity { span, .. }
            | TypeError::RecursiveType { span, .. }
            | TypeError::NotInterface { span, .. }
            | TypeError::Instantiation { span, .. }
            | TypeError::InstantiationDepth { span, .. } => *span,
            TypeError::Reparse { error } => error.span,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>, span: Span) -> Self {
        TypeError::InvalidOperation {
            message: message.into(),
            span,
        }
    }

    pub(crate) fn mismatch(expected: &Type, found: &Type, span: Span) -> Self {
        TypeError::Mismatch {
            expected: expected.clone(),
            found: found.clone(),
            span,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::Undeclared { name, .. } => write!(f, "undeclared name `{}`", name),
            TypeError::Redeclared { name, .. } => {
                write!(f, "`{}` redeclared in this scope", name)
            }
            TypeError::Mismatch {
                expected, found, ..
            } => {
                write!(f, "type mismatch: expected `{}`, found `{}`", expected, found)
            }
            TypeError::NotAType { name, .. } => write!(f, "`{}` is not a type", name),
            TypeError::NotAValue { name, .. } => {
                write!(f, "`{}` is not a value", name)
            }
            TypeError::NotAFunction { ty, .. } => {
                write!(f, "cannot call non-function of type `{}`", ty)
            }
            TypeError::ArgCount {
                expected, found, ..
            } => {
                write!(
                    f,
                    "wrong argument count: expected {}, found {}",
                    expected, found
                )
            }
            TypeError::ValueCount {
                expected, found, ..
            } => {
                write!(
                    f,
                    "value count mismatch: expected {}, found {}",
                    expected, found
                )
            }
            TypeError::NoSuchField { ty, field, .. } => {
                write!(f, "type `{}` has no field or method `{}`", ty, field)
            }
            TypeError::InvalidOperation { message, .. } => {
                write!(f, "invalid operation: {}", message)
            }
            TypeError::NonBoolCondition { found, .. } => {
                write!(f, "non-boolean condition of type `{}`", found)
            }
            TypeError::DuplicateLabel { name, .. } => {
                write!(f, "label `{}` already defined", name)
            }
            TypeError::UnresolvedLabel { name, .. } => {
                write!(f, "label `{}` not defined", name)
            }
            TypeError::BranchOutside { keyword, .. } => {
                write!(f, "`{}` is not in a loop or switch", keyword)
            }
            TypeError::CannotInfer { what, .. } => {
                write!(f, "cannot infer {}", what)
            }
            TypeError::UnresolvedImport {
                package, member, ..
            } => {
                write!(f, "package `{}` has no member `{}`", package, member)
            }
            TypeError::NotAddressable { .. } => {
                write!(f, "cannot assign to unaddressable value")
            }
            TypeError::NotGeneric { name, .. } => {
                write!(f, "`{}` is not a generic", name)
            }
            TypeError::GenericArity {
                name,
                expected,
                found,
                ..
            } => {
                write!(
                    f,
                    "generic `{}` takes {} type arguments, found {}",
                    name, expected, found
                )
            }
            TypeError::RecursiveType { names, .. } => {
                write!(f, "invalid recursive type: {}", names.join(" -> "))?;
                if let Some(first) = names.first() {
                    write!(f, " -> {}", first)?;
                }
                Ok(())
            }
            TypeError::NotInterface { ty, .. } => {
                write!(f, "`{}` is not an interface", ty)
            }
            TypeError::Instantiation { name, errors, .. } => {
                write!(
                    f,
                    "instantiation of `{}` failed with {} error(s)",
                    name,
                    errors.len()
                )
            }
            TypeError::InstantiationDepth { name, limit, .. } => {
                write!(
                    f,
                    "instantiating `{}` exceeds the nesting limit of {}",
                    name, limit
                )
            }
            TypeError::Reparse { error } => {
                write!(f, "generic body does not parse: {}", error)
            }
        }
    }
}

impl std::error::Error for TypeError {}
