//! End-to-end compilation: parsed statements in, target text out.

use have_ast::build::*;
use have_ast::{BinaryOp, Expr, Stmt, UnaryOp};
use have_driver::{CompileOptions, Compiler};
use have_typeck::TypeError;
use have_types::Type;

// ── Helpers ────────────────────────────────────────────────────────────

/// Compile one unit with default options, panicking on type errors.
fn transpile(stmts: Vec<Stmt>) -> String {
    match Compiler::default().compile(stmts) {
        Ok(text) => text,
        Err(errors) => panic!("unexpected type errors: {:?}", errors),
    }
}

/// Compile one unit that must fail, returning its errors.
fn transpile_expect_errors(stmts: Vec<Stmt>) -> Vec<TypeError> {
    match Compiler::default().compile(stmts) {
        Ok(text) => panic!("expected type errors, generated:\n{}", text),
        Err(errors) => errors,
    }
}

fn print_call(text: &str) -> Stmt {
    expr_stmt(call(ident("print"), vec![string(text)]))
}

fn eq(l: Expr, r: Expr) -> Expr {
    binary(BinaryOp::Eq, l, r)
}

/// `func Max[T](a T, b T) T { if a > b { return a }; return b }`
fn max_template() -> Stmt {
    let t = || Type::generic_param("T");
    generic_func(
        &["T"],
        func(
            "Max",
            vec![param("a", t()), param("b", t())],
            vec![t()],
            vec![
                if_stmt(vec![if_branch(
                    None,
                    Some(binary(BinaryOp::Gt, ident("a"), ident("b"))),
                    vec![ret(vec![ident("a")])],
                )]),
                ret(vec![ident("b")]),
            ],
        ),
    )
}

// ── Expressions ────────────────────────────────────────────────────────

#[test]
fn literals() {
    assert_eq!(transpile(vec![expr_stmt(int(1))]), "1\n");
    assert_eq!(transpile(vec![expr_stmt(string("bla"))]), "\"bla\"\n");
    assert_eq!(transpile(vec![expr_stmt(bool_lit(true))]), "true\n");
    assert_eq!(transpile(vec![expr_stmt(bool_lit(false))]), "false\n");
}

#[test]
fn arithmetic() {
    let sum = binary(BinaryOp::Add, int(1), int(1));
    insta::assert_snapshot!(transpile(vec![expr_stmt(sum)]).trim_end(), @"(1 + 1)");
    let neg = binary(BinaryOp::Add, int(1), unary(UnaryOp::Neg, int(1)));
    insta::assert_snapshot!(transpile(vec![expr_stmt(neg)]).trim_end(), @"(1 + (-1))");
}

#[test]
fn mixed_constant_kinds_widen() {
    let product = var(&["x"], vec![binary(BinaryOp::Mul, int(2), float("3.14"))]);
    insta::assert_snapshot!(transpile(vec![product]).trim_end(), @"var x = (float64)((2 * 3.14))");
    let rune_sum = var(&["r"], vec![binary(BinaryOp::Add, int(1), char_lit('a'))]);
    insta::assert_snapshot!(transpile(vec![rune_sum]).trim_end(), @"var r = (rune)((1 + 'a'))");
}

#[test]
fn builtin_call() {
    insta::assert_snapshot!(transpile(vec![print_call("test")]).trim_end(), @r#"print("test")"#);
}

// ── Statements ─────────────────────────────────────────────────────────

#[test]
fn function_declaration() {
    let f = func("a", vec![], vec![], vec![expr_stmt(int(1))]);
    assert_eq!(transpile(vec![func_stmt(f)]), "func a() {\n\t1\n}\n");
}

#[test]
fn if_statement() {
    let stmt = if_stmt(vec![if_branch(None, Some(eq(int(1), int(2))), vec![expr_stmt(int(1))])]);
    assert_eq!(transpile(vec![stmt]), "if (1 == 2) {\n\t1\n}\n");
}

#[test]
fn if_with_initializer() {
    let stmt = if_stmt(vec![if_branch(
        Some(scoped(vec![("t", int(1))])),
        Some(eq(ident("t"), int(2))),
        vec![expr_stmt(int(1))],
    )]);
    assert_eq!(
        transpile(vec![stmt]),
        "if t := (int)(1); (t == 2) {\n\t1\n}\n"
    );
}

#[test]
fn if_with_two_initializers() {
    let stmt = if_stmt(vec![if_branch(
        Some(scoped(vec![("t", int(1)), ("k", string("bbb"))])),
        Some(binary(
            BinaryOp::And,
            eq(ident("t"), int(2)),
            eq(ident("k"), string("bbb")),
        )),
        vec![expr_stmt(int(1))],
    )]);
    assert_eq!(
        transpile(vec![stmt]),
        "if t, k := (int)(1), (string)(\"bbb\"); ((t == 2) && (k == \"bbb\")) {\n\t1\n}\n"
    );
}

fn two() -> Stmt {
    func_stmt(func(
        "two",
        vec![],
        vec![Type::int(), Type::int()],
        vec![ret(vec![int(1), int(2)])],
    ))
}

#[test]
fn if_with_multi_value_initializer() {
    let stmt = if_stmt(vec![if_branch(
        Some(scoped_groups(vec![(vec!["a", "b"], vec![call(ident("two"), vec![])])])),
        Some(eq(ident("a"), ident("b"))),
        vec![expr_stmt(int(1))],
    )]);
    assert_eq!(
        transpile(vec![two(), stmt]),
        "func two() (int, int) {\n\treturn 1, 2\n}\nif a, b := two(); (a == b) {\n\t1\n}\n"
    );
}

#[test]
fn multi_value_initializer_cannot_be_chained() {
    let stmt = if_stmt(vec![if_branch(
        Some(scoped_groups(vec![
            (vec!["a", "b"], vec![call(ident("two"), vec![])]),
            (vec!["c"], vec![int(3)]),
        ])),
        Some(eq(ident("b"), ident("c"))),
        vec![],
    )]);
    let errors = transpile_expect_errors(vec![two(), stmt]);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(matches!(errors[0], TypeError::InvalidOperation { .. }), "{:?}", errors);
}

#[test]
fn if_else() {
    let stmt = if_stmt(vec![
        if_branch(None, Some(eq(int(1), int(2))), vec![expr_stmt(int(1))]),
        if_branch(None, None, vec![expr_stmt(int(2))]),
    ]);
    assert_eq!(
        transpile(vec![stmt]),
        "if (1 == 2) {\n\t1\n} else {\n\t2\n}\n"
    );
}

#[test]
fn else_if_chain() {
    let stmt = if_stmt(vec![
        if_branch(None, Some(eq(int(1), int(2))), vec![expr_stmt(int(1))]),
        if_branch(None, Some(eq(int(3), int(4))), vec![expr_stmt(int(2))]),
        if_branch(None, None, vec![expr_stmt(int(3))]),
    ]);
    assert_eq!(
        transpile(vec![stmt]),
        "if (1 == 2) {\n\t1\n} else if (3 == 4) {\n\t2\n} else {\n\t3\n}\n"
    );
}

#[test]
fn three_clause_for() {
    let stmt = for_stmt(
        Some(scoped(vec![("x", int(0))])),
        Some(binary(BinaryOp::Lt, ident("x"), int(100))),
        Some(print_call("a")),
        vec![print_call("b")],
    );
    assert_eq!(
        transpile(vec![stmt]),
        "for x := (int)(0); (x < 100); print(\"a\") {\n\tprint(\"b\")\n}\n"
    );
}

// ── Units ──────────────────────────────────────────────────────────────

#[test]
fn forward_references_keep_source_order() {
    // var y = x + 1
    // var x = 2
    let out = transpile(vec![
        var(&["y"], vec![binary(BinaryOp::Add, ident("x"), int(1))]),
        var(&["x"], vec![int(2)]),
    ]);
    assert_eq!(out, "var y = (int)((x + 1))\nvar x = (int)(2)\n");
}

#[test]
fn functions_can_call_later_functions() {
    let first = func(
        "first",
        vec![],
        vec![Type::int()],
        vec![ret(vec![call(ident("second"), vec![])])],
    );
    let second = func("second", vec![], vec![Type::int()], vec![ret(vec![int(7)])]);
    let out = transpile(vec![func_stmt(first), func_stmt(second)]);
    assert_eq!(
        out,
        "func first() int {\n\treturn second()\n}\nfunc second() int {\n\treturn 7\n}\n"
    );
}

#[test]
fn instantiations_follow_the_unit() {
    let out = transpile(vec![
        max_template(),
        var(
            &["m"],
            vec![call(index(ident("Max"), vec![type_expr(Type::int())]), vec![int(1), int(2)])],
        ),
    ]);
    assert_eq!(
        out,
        "var m = (int)(Max_int(1, 2))\n\
         func Max_int(a int, b int) int {\n\
         \tif (a > b) {\n\
         \t\treturn a\n\
         \t}\n\
         \treturn b\n\
         }\n"
    );
}

#[test]
fn generic_struct_instance_is_declared() {
    let out = transpile(vec![
        generic_struct(
            "Pair",
            &["K", "V"],
            vec![("key", Type::generic_param("K")), ("val", Type::generic_param("V"))],
        ),
        typed_var(
            "p",
            Type::generic_instance("Pair", vec![Type::string(), Type::int()]),
            None,
        ),
    ]);
    assert_eq!(
        out,
        "var p = (Pair_string_int)(Pair_string_int{})\n\
         type Pair_string_int struct {\n\
         \tkey string\n\
         \tval int\n\
         }\n"
    );
}

#[test]
fn instance_names_never_repeat_a_declaration() {
    let box_of = |name: &str, arg: Type| typed_var(name, Type::generic_instance("Box", vec![arg]), None);
    let out = transpile(vec![
        generic_struct("Box", &["T"], vec![("val", Type::generic_param("T"))]),
        type_decl("slice_int", Type::int()),
        max_template(),
        func_stmt(func("Max_int", vec![], vec![], vec![])),
        box_of("a", Type::named("slice_int")),
        box_of("b", Type::slice(Type::int())),
        var(
            &["m"],
            vec![call(index(ident("Max"), vec![type_expr(Type::int())]), vec![int(1), int(2)])],
        ),
    ]);
    assert_eq!(out.matches("type Box_slice_int struct").count(), 1, "{}", out);
    assert_eq!(out.matches("type Box_slice_int_2 struct").count(), 1, "{}", out);
    assert_eq!(out.matches("func Max_int(").count(), 1, "{}", out);
    assert!(out.contains("var m = (int)(Max_int_2(1, 2))"), "{}", out);
}

#[test]
fn self_containing_type_is_an_error() {
    let errors = transpile_expect_errors(vec![
        type_decl("A", Type::array(1, Type::named("A"))),
        typed_var("x", Type::named("A"), None),
    ]);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(matches!(errors[0], TypeError::RecursiveType { .. }), "{:?}", errors);
}

#[test]
fn errors_are_collected_across_statements() {
    let errors = transpile_expect_errors(vec![
        expr_stmt(ident("missing")),
        var(&["ok"], vec![int(1)]),
        expr_stmt(call(ident("gone"), vec![])),
    ]);
    assert_eq!(errors.len(), 2, "{:?}", errors);
    assert!(errors.iter().all(|e| matches!(e, TypeError::Undeclared { .. })), "{:?}", errors);
}

#[test]
fn failed_unit_generates_nothing() {
    let mut compiler = Compiler::default();
    let result = compiler.compile(vec![
        var(&["a"], vec![int(1)]),
        var(&["b"], vec![binary(BinaryOp::Add, int(1), string("x"))]),
    ]);
    assert!(result.is_err());
    assert_eq!(compiler.read_all(), "");
}

#[test]
fn later_units_see_earlier_declarations() {
    let mut compiler = Compiler::default();
    let first = compiler
        .compile(vec![max_template(), var(&["x"], vec![int(1)])])
        .unwrap();
    assert_eq!(first, "var x = (int)(1)\n");

    let call_max = |arg: Expr| {
        call(index(ident("Max"), vec![type_expr(Type::int())]), vec![ident("x"), arg])
    };
    let second = compiler.compile(vec![var(&["y"], vec![call_max(int(2))])]).unwrap();
    assert!(second.starts_with("var y = (int)(Max_int(x, 2))\nfunc Max_int("), "{}", second);

    // The instantiation is emitted once.
    let third = compiler.compile(vec![var(&["z"], vec![call_max(int(3))])]).unwrap();
    assert_eq!(third, "var z = (int)(Max_int(x, 3))\n");
    assert_eq!(compiler.read_all().matches("func Max_int(").count(), 1);
}

#[test]
fn indentation_follows_options() {
    let options: CompileOptions =
        serde_json::from_str(r#"{"codegen": {"indent": "    "}}"#).unwrap();
    let f = func("a", vec![], vec![], vec![expr_stmt(int(1))]);
    let out = Compiler::new(options).compile(vec![func_stmt(f)]).unwrap();
    assert_eq!(out, "func a() {\n    1\n}\n");
}
