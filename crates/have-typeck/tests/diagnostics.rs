//! Rendering of negotiation errors.

use have_common::{ParseError, Span};
use have_types::Type;
use have_typeck::diagnostics::{error_code, render_diagnostic, render_json};
use have_typeck::{TypeError, TypeckResult};

// ── Helpers ────────────────────────────────────────────────────────────

const SOURCE: &str = "var x int = \"hello\"\nvar x = 2\n";

fn mismatch() -> TypeError {
    TypeError::Mismatch {
        expected: Type::int(),
        found: Type::string(),
        span: Span::new(12, 19),
    }
}

fn json(err: &TypeError) -> serde_json::Value {
    serde_json::from_str(&render_json(err, "main.hv")).expect("valid JSON")
}

// ── Human-readable ─────────────────────────────────────────────────────

#[test]
fn mismatch_diagnostic() {
    let output = render_diagnostic(&mismatch(), SOURCE, "main.hv");
    assert!(output.contains("E0001"), "{}", output);
    assert!(
        output.contains("type mismatch: expected `int`, found `string`"),
        "{}",
        output
    );
    assert!(output.contains("expected `int`"), "{}", output);
}

#[test]
fn redeclaration_points_at_both_sites() {
    let err = TypeError::Redeclared {
        name: "x".into(),
        span: Span::new(24, 25),
        first: Span::new(4, 5),
    };
    let output = render_diagnostic(&err, SOURCE, "main.hv");
    assert!(output.contains("`x` redeclared in this scope"), "{}", output);
    assert!(output.contains("redeclared here"), "{}", output);
    assert!(output.contains("first declared here"), "{}", output);
}

#[test]
fn numeric_mismatch_suggests_conversion() {
    let err = TypeError::Mismatch {
        expected: Type::float64(),
        found: Type::int(),
        span: Span::new(0, 3),
    };
    let output = render_diagnostic(&err, SOURCE, "main.hv");
    assert!(output.contains("convert explicitly: `float64(...)`"), "{}", output);
}

#[test]
fn failed_instantiation_lists_nested_errors() {
    let err = TypeError::Instantiation {
        name: "Max".into(),
        span: Span::new(0, 3),
        errors: vec![TypeError::InvalidOperation {
            message: "operator `>` not defined on `bool`".into(),
            span: Span::new(0, 1),
        }],
    };
    let output = render_diagnostic(&err, SOURCE, "main.hv");
    assert!(output.contains("E0022"), "{}", output);
    assert!(output.contains("requested here"), "{}", output);
    assert!(output.contains("operator `>` not defined on `bool`"), "{}", output);
}

#[test]
fn spans_past_end_of_source_are_clamped() {
    let err = TypeError::Undeclared {
        name: "y".into(),
        span: Span::new(500, 510),
    };
    let output = render_diagnostic(&err, SOURCE, "main.hv");
    assert!(output.contains("undeclared name `y`"), "{}", output);
}

#[test]
fn result_renders_every_error() {
    let result = TypeckResult {
        errors: vec![
            mismatch(),
            TypeError::Reparse {
                error: ParseError::new("unexpected `]`", Span::new(0, 1)),
            },
        ],
    };
    assert!(!result.is_ok());
    let rendered = result.render_errors(SOURCE, "main.hv");
    assert_eq!(rendered.len(), 2);
    assert!(rendered[1].contains("E0024"), "{}", rendered[1]);
    assert!(TypeckResult::default().is_ok());
}

// ── JSON ───────────────────────────────────────────────────────────────

#[test]
fn json_carries_code_spans_and_fix() {
    let err = TypeError::NonBoolCondition {
        found: Type::int(),
        span: Span::new(3, 4),
    };
    let value = json(&err);
    assert_eq!(value["code"], "E0011");
    assert_eq!(value["severity"], "error");
    assert_eq!(value["file"], "main.hv");
    assert_eq!(value["spans"][0]["start"], 3);
    assert_eq!(value["spans"][0]["end"], 4);
    assert_eq!(value["spans"][0]["label"], "this is `int`");
    assert_eq!(value["fix"], "use a comparison, e.g. `x != 0`");
}

#[test]
fn json_is_a_single_line() {
    let rendered = render_json(&mismatch(), "main.hv");
    assert!(!rendered.contains('\n'));
    assert_eq!(json(&mismatch())["fix"], serde_json::Value::Null);
}

#[test]
fn json_nests_instantiation_failures() {
    let err = TypeError::Instantiation {
        name: "Pair".into(),
        span: Span::new(0, 4),
        errors: vec![TypeError::Undeclared {
            name: "Q".into(),
            span: Span::new(1, 2),
        }],
    };
    let value = json(&err);
    assert_eq!(value["code"], error_code(&err));
    let related = value["related"].as_array().expect("related list");
    assert_eq!(related.len(), 1);
    assert_eq!(related[0]["code"], "E0002");
    assert_eq!(related[0]["message"], "undeclared name `Q`");
}
