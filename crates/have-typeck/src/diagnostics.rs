//! Ariadne-based diagnostic rendering for negotiation errors.
//!
//! Human-readable output is colorless so it can be compared in tests. The
//! JSON form is one line per error, for editors and build tools.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use have_common::Span;
use have_types::Type;
use serde::Serialize;

use crate::error::TypeError;

// ── Error Codes ────────────────────────────────────────────────────────

/// Assign a unique error code to each TypeError variant.
pub fn error_code(err: &TypeError) -> &'static str {
    match err {
        TypeError::Mismatch { .. } => "E0001",
        TypeError::Undeclared { .. } => "E0002",
        TypeError::Redeclared { .. } => "E0003",
        TypeError::NotAType { .. } => "E0004",
        TypeError::NotAValue { .. } => "E0005",
        TypeError::NotAFunction { .. } => "E0006",
        TypeError::ArgCount { .. } => "E0007",
        TypeError::ValueCount { .. } => "E0008",
        TypeError::NoSuchField { .. } => "E0009",
        TypeError::InvalidOperation { .. } => "E0010",
        TypeError::NonBoolCondition { .. } => "E0011",
        TypeError::DuplicateLabel { .. } => "E0012",
        TypeError::UnresolvedLabel { .. } => "E0013",
        TypeError::BranchOutside { .. } => "E0014",
        TypeError::CannotInfer { .. } => "E0015",
        TypeError::UnresolvedImport { .. } => "E0016",
        TypeError::NotAddressable { .. } => "E0017",
        TypeError::NotGeneric { .. } => "E0018",
        TypeError::GenericArity { .. } => "E0019",
        TypeError::RecursiveType { .. } => "E0020",
        TypeError::NotInterface { .. } => "E0021",
        TypeError::Instantiation { .. } => "E0022",
        TypeError::InstantiationDepth { .. } => "E0023",
        TypeError::Reparse { .. } => "E0024",
    }
}

// ── Labels and Help ────────────────────────────────────────────────────

/// Message for the primary label.
fn primary_label(err: &TypeError) -> String {
    match err {
        TypeError::Mismatch { expected, .. } => format!("expected `{}`", expected),
        TypeError::Undeclared { .. } => "not found in this scope".to_string(),
        TypeError::Redeclared { .. } | TypeError::DuplicateLabel { .. } => "redeclared here".to_string(),
        TypeError::ArgCount { expected, .. } => format!("expected {} argument(s)", expected),
        TypeError::ValueCount { expected, .. } => format!("expected {} value(s)", expected),
        TypeError::NonBoolCondition { found, .. } => format!("this is `{}`", found),
        TypeError::RecursiveType { .. } => "cycle starts here".to_string(),
        TypeError::Instantiation { .. } | TypeError::InstantiationDepth { .. } => {
            "requested here".to_string()
        }
        other => other.to_string(),
    }
}

/// Secondary spans worth pointing at.
fn related_spans(err: &TypeError) -> Vec<(Span, String)> {
    match err {
        TypeError::Redeclared { first, span, .. } | TypeError::DuplicateLabel { first, span, .. }
            if first != span =>
        {
            vec![(*first, "first declared here".to_string())]
        }
        _ => Vec::new(),
    }
}

/// Suggest a fix when one is plausible.
fn fix_suggestion(err: &TypeError) -> Option<String> {
    match err {
        TypeError::Mismatch {
            expected, found, ..
        } => conversion_hint(expected, found),
        TypeError::NonBoolCondition { .. } => Some("use a comparison, e.g. `x != 0`".to_string()),
        TypeError::RecursiveType { .. } => {
            Some("refer to the type through a pointer, slice or map instead".to_string())
        }
        TypeError::InstantiationDepth { .. } => {
            Some("raise `max_instantiation_depth` if the nesting is intended".to_string())
        }
        TypeError::BranchOutside { keyword, .. } if keyword == "continue" => {
            Some("`continue` is only valid inside `for`".to_string())
        }
        _ => None,
    }
}

fn conversion_hint(expected: &Type, found: &Type) -> Option<String> {
    let numeric = |t: &Type| matches!(t, Type::Simple(s) if s.is_numeric());
    if numeric(expected) && numeric(found) {
        return Some(format!("convert explicitly: `{}(...)`", expected));
    }
    None
}

// ── Span Helpers ───────────────────────────────────────────────────────

/// Clamp a span to the source and widen empty spans to one character.
fn clamp(span: Span, source_len: usize) -> Range<usize> {
    let s = (span.start as usize).min(source_len);
    let e = (span.end as usize).min(source_len).max(s);
    if s == e {
        s..e.saturating_add(1).min(source_len)
    } else {
        s..e
    }
}

// ── Main Rendering Function ────────────────────────────────────────────

/// Render a type error into a formatted diagnostic string using ariadne.
///
/// Failed instantiations list their nested errors as notes.
pub fn render_diagnostic(error: &TypeError, source: &str, _filename: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();
    let span = clamp(error.span(), source_len);

    let mut builder = Report::build(ReportKind::Error, span.clone())
        .with_code(error_code(error))
        .with_message(error.to_string())
        .with_config(config)
        .with_label(
            Label::new(span)
                .with_message(primary_label(error))
                .with_color(Color::Red),
        );
    for (related, message) in related_spans(error) {
        builder.add_label(
            Label::new(clamp(related, source_len))
                .with_message(message)
                .with_color(Color::Blue),
        );
    }
    if let TypeError::Instantiation { errors, .. } = error {
        for nested in errors {
            builder = builder.with_note(nested.to_string());
        }
    }
    if let Some(fix) = fix_suggestion(error) {
        builder.set_help(fix);
    }

    let mut buf = Vec::new();
    let cache = Source::from(source);
    builder
        .finish()
        .write(cache, &mut buf)
        .expect("failed to write diagnostic");
    String::from_utf8_lossy(&buf).into_owned()
}

// ── JSON Output ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct JsonSpan {
    start: u32,
    end: u32,
    label: String,
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    code: &'static str,
    severity: &'static str,
    message: String,
    file: String,
    spans: Vec<JsonSpan>,
    fix: Option<String>,
    /// Nested failures of an instantiation.
    related: Vec<JsonDiagnostic>,
}

fn json_diagnostic(error: &TypeError, filename: &str) -> JsonDiagnostic {
    let span = error.span();
    let mut spans = vec![JsonSpan {
        start: span.start,
        end: span.end,
        label: primary_label(error),
    }];
    for (related, label) in related_spans(error) {
        spans.push(JsonSpan {
            start: related.start,
            end: related.end,
            label,
        });
    }
    let related = match error {
        TypeError::Instantiation { errors, .. } => {
            errors.iter().map(|e| json_diagnostic(e, filename)).collect()
        }
        _ => Vec::new(),
    };
    JsonDiagnostic {
        code: error_code(error),
        severity: "error",
        message: error.to_string(),
        file: filename.to_string(),
        spans,
        fix: fix_suggestion(error),
        related,
    }
}

/// Render a type error as a single-line JSON object.
pub fn render_json(error: &TypeError, filename: &str) -> String {
    serde_json::to_string(&json_diagnostic(error, filename))
        .expect("diagnostics serialize to JSON")
}
