//! Negotiation of whole statements against a fresh context.

use have_ast::build::*;
use have_ast::{
    BinaryOp, BranchKind, Expr, ExprKind, IfBranch, PredicateKind, Stmt, StmtKind, TopLevelStmt,
    UnaryOp, WhenBranch, WhenPredicate,
};
use have_common::Span;
use have_types::{FuncType, IfaceType, SimpleType, Type};
use have_typeck::{TypeError, TypesContext};

// ── Helpers ────────────────────────────────────────────────────────────

/// Predeclare and negotiate `stmts` in order, stopping at the first error.
fn check(stmts: Vec<Stmt>) -> Result<(TypesContext, Vec<TopLevelStmt>), Vec<TypeError>> {
    let mut ctx = TypesContext::default();
    let mut tops: Vec<TopLevelStmt> = stmts.into_iter().map(TopLevelStmt::new).collect();
    ctx.predeclare(&mut tops)?;
    for top in &mut tops {
        ctx.negotiate(&mut top.stmt)?;
    }
    Ok((ctx, tops))
}

fn check_ok(stmts: Vec<Stmt>) -> Vec<TopLevelStmt> {
    match check(stmts) {
        Ok((_, tops)) => tops,
        Err(errors) => panic!("unexpected errors: {:?}", errors),
    }
}

fn check_err(stmts: Vec<Stmt>) -> TypeError {
    match check(stmts) {
        Ok(_) => panic!("expected a negotiation error"),
        Err(mut errors) => {
            assert_eq!(errors.len(), 1, "expected exactly one error: {:?}", errors);
            errors.remove(0)
        }
    }
}

/// Type of the first variable declared by a `var` statement.
fn var_type(stmt: &Stmt) -> &Type {
    match &stmt.kind {
        StmtKind::Var(v) => &v.decls[0].vars[0].ty,
        other => panic!("expected a var statement, found {:?}", other),
    }
}

fn expr_type(stmt: &Stmt) -> &Type {
    match &stmt.kind {
        StmtKind::Expr(e) => e.ty.as_ref().expect("negotiated expression has a type"),
        other => panic!("expected an expression statement, found {:?}", other),
    }
}

fn func_body(stmt: &Stmt) -> &[Stmt] {
    match &stmt.kind {
        StmtKind::Func(f) => &f.body.stmts,
        other => panic!("expected a function, found {:?}", other),
    }
}

fn add(l: Expr, r: Expr) -> Expr {
    binary(BinaryOp::Add, l, r)
}

fn eq(l: Expr, r: Expr) -> Expr {
    binary(BinaryOp::Eq, l, r)
}

fn empty_iface() -> Type {
    Type::Interface(IfaceType::default())
}

// ── Literals and Inference ─────────────────────────────────────────────

#[test]
fn untyped_literals_take_default_types() {
    let tops = check_ok(vec![
        var(&["i"], vec![int(1)]),
        var(&["f"], vec![float("1.5")]),
        var(&["s"], vec![string("bla")]),
        var(&["b"], vec![bool_lit(true)]),
        var(&["r"], vec![char_lit('x')]),
    ]);
    let types: Vec<String> = tops.iter().map(|t| var_type(&t.stmt).to_string()).collect();
    assert_eq!(types, ["int", "float64", "string", "bool", "rune"]);
}

#[test]
fn untyped_literal_adopts_declared_type() {
    let tops = check_ok(vec![typed_var("x", Type::float64(), Some(int(1)))]);
    let StmtKind::Var(v) = &tops[0].stmt.kind else {
        unreachable!()
    };
    assert_eq!(v.decls[0].inits[0].ty, Some(Type::float64()));
}

#[test]
fn untyped_operand_follows_typed_side() {
    let tops = check_ok(vec![
        typed_var("x", Type::float64(), None),
        var(&["y"], vec![binary(BinaryOp::Mul, ident("x"), int(2))]),
    ]);
    assert_eq!(var_type(&tops[1].stmt), &Type::float64());
}

#[test]
fn constant_expression_keeps_default_type() {
    let tops = check_ok(vec![expr_stmt(add(int(1), unary(UnaryOp::Neg, int(1))))]);
    assert_eq!(expr_type(&tops[0].stmt), &Type::int());
}

#[test]
fn mixed_constant_kinds_take_the_wider_default() {
    let tops = check_ok(vec![
        var(&["f"], vec![binary(BinaryOp::Mul, int(2), float("3.14"))]),
        var(&["r"], vec![add(int(1), char_lit('a'))]),
        var(&["g"], vec![add(int(1), binary(BinaryOp::Mul, int(2), float("0.5")))]),
    ]);
    let types: Vec<String> = tops.iter().map(|t| var_type(&t.stmt).to_string()).collect();
    assert_eq!(types, ["float64", "rune", "float64"]);
}

#[test]
fn mixed_constants_follow_a_declared_type() {
    let tops = check_ok(vec![typed_var(
        "c",
        Type::Simple(SimpleType::Complex128),
        Some(binary(BinaryOp::Mul, int(2), float("3.14"))),
    )]);
    assert_eq!(var_type(&tops[0].stmt), &Type::Simple(SimpleType::Complex128));
}

#[test]
fn comparison_yields_bool() {
    let tops = check_ok(vec![expr_stmt(eq(int(1), int(2)))]);
    assert_eq!(expr_type(&tops[0].stmt), &Type::bool());
}

#[test]
fn mismatched_initializer() {
    let err = check_err(vec![typed_var("s", Type::string(), Some(int(1)))]);
    assert_eq!(
        err,
        TypeError::Mismatch {
            expected: Type::string(),
            found: Type::int(),
            span: Span::default(),
        }
    );
}

#[test]
fn mismatched_operands() {
    let err = check_err(vec![expr_stmt(add(int(1), string("a")))]);
    assert!(matches!(err, TypeError::InvalidOperation { .. }), "{:?}", err);
    assert!(err.to_string().contains("mismatched operands"), "{}", err);
}

#[test]
fn nil_needs_a_nilable_context() {
    check_ok(vec![typed_var("p", Type::pointer(Type::int()), Some(nil()))]);

    let err = check_err(vec![var(&["p"], vec![nil()])]);
    assert!(matches!(err, TypeError::CannotInfer { .. }), "{:?}", err);
    assert!(err.to_string().contains("nil"), "{}", err);

    let err = check_err(vec![typed_var("n", Type::int(), Some(nil()))]);
    assert!(matches!(err, TypeError::InvalidOperation { .. }), "{:?}", err);
}

#[test]
fn uninitialized_untyped_var_cannot_be_inferred() {
    let err = check_err(vec![var(&["x"], vec![])]);
    assert_eq!(err.to_string(), "cannot infer type of `x`");
}

// ── Names and Scopes ───────────────────────────────────────────────────

#[test]
fn undeclared_name() {
    let err = check_err(vec![expr_stmt(add(ident("missing"), int(1)))]);
    assert_eq!(
        err,
        TypeError::Undeclared {
            name: "missing".into(),
            span: Span::default(),
        }
    );
}

#[test]
fn top_level_redeclaration() {
    let err = check_err(vec![
        var(&["x"], vec![int(1)]),
        var(&["x"], vec![int(2)]).with_span(Span::new(10, 15)),
    ]);
    assert!(matches!(err, TypeError::Redeclared { ref name, .. } if name == "x"), "{:?}", err);
}

#[test]
fn identifiers_bind_to_their_objects() {
    let tops = check_ok(vec![
        var(&["x"], vec![int(1)]),
        var(&["y"], vec![ident("x")]),
    ]);
    let StmtKind::Var(x) = &tops[0].stmt.kind else {
        unreachable!()
    };
    let StmtKind::Var(y) = &tops[1].stmt.kind else {
        unreachable!()
    };
    let ExprKind::Ident(id) = &y.decls[0].inits[0].kind else {
        unreachable!()
    };
    assert!(id.object.is_some());
    assert_eq!(id.object, x.decls[0].vars[0].object);
}

#[test]
fn if_scoped_variable_is_not_visible_after_the_statement() {
    let stmts = vec![
        func_stmt(func(
            "f",
            vec![],
            vec![],
            vec![
                if_stmt(vec![if_branch(
                    Some(scoped(vec![("t", int(1))])),
                    Some(eq(ident("t"), int(2))),
                    vec![expr_stmt(ident("t"))],
                )]),
                expr_stmt(ident("t")),
            ],
        )),
    ];
    let err = check_err(stmts);
    assert!(matches!(err, TypeError::Undeclared { ref name, .. } if name == "t"), "{:?}", err);
}

#[test]
fn scoped_initializers_see_earlier_names() {
    let tops = check_ok(vec![if_stmt(vec![if_branch(
        Some(scoped(vec![("t", int(1)), ("k", add(ident("t"), int(1)))])),
        Some(eq(ident("k"), int(2))),
        vec![expr_stmt(int(1))],
    )])]);
    let StmtKind::If(s) = &tops[0].stmt.kind else {
        unreachable!()
    };
    let scoped = s.branches[0].scoped.as_ref().unwrap();
    let types: Vec<&Type> = scoped.vars().map(|v| &v.ty).collect();
    assert_eq!(types, [&Type::int(), &Type::int()]);
}

#[test]
fn multi_value_group_stands_alone_in_a_clause() {
    let two = func_stmt(func(
        "two",
        vec![],
        vec![Type::int(), Type::int()],
        vec![ret(vec![int(1), int(2)])],
    ));
    let clause = |groups| {
        if_stmt(vec![if_branch(
            Some(scoped_groups(groups)),
            Some(bool_lit(true)),
            vec![],
        )])
    };

    check_ok(vec![
        two.clone(),
        clause(vec![(vec!["a", "b"], vec![call(ident("two"), vec![])])]),
    ]);

    let err = check_err(vec![
        two,
        clause(vec![
            (vec!["a", "b"], vec![call(ident("two"), vec![])]),
            (vec!["c"], vec![int(3)]),
        ]),
    ]);
    assert!(matches!(err, TypeError::InvalidOperation { .. }), "{:?}", err);
    assert!(err.to_string().contains("multi-value initializer"), "{}", err);
}

#[test]
fn non_bool_condition() {
    let err = check_err(vec![if_stmt(vec![if_branch(
        None,
        Some(int(1)),
        vec![expr_stmt(int(1))],
    )])]);
    assert_eq!(
        err,
        TypeError::NonBoolCondition {
            found: Type::int(),
            span: Span::default(),
        }
    );
}

#[test]
fn else_must_be_last() {
    let branches: Vec<IfBranch> = vec![
        if_branch(None, Some(bool_lit(true)), vec![]),
        if_branch(None, None, vec![]),
        if_branch(None, Some(bool_lit(false)), vec![]),
    ];
    let err = check_err(vec![if_stmt(branches)]);
    assert!(matches!(err, TypeError::InvalidOperation { .. }), "{:?}", err);
}

// ── Functions and Calls ────────────────────────────────────────────────

#[test]
fn forward_function_reference() {
    let tops = check_ok(vec![
        var(&["x"], vec![call(ident("later"), vec![int(1)])]),
        func_stmt(func(
            "later",
            vec![param("a", Type::int())],
            vec![Type::string()],
            vec![ret(vec![string("done")])],
        )),
    ]);
    assert_eq!(var_type(&tops[0].stmt), &Type::string());
}

#[test]
fn call_argument_count() {
    let err = check_err(vec![
        func_stmt(func("one", vec![param("a", Type::int())], vec![], vec![])),
        expr_stmt(call(ident("one"), vec![int(1), int(2)])),
    ]);
    assert!(
        matches!(err, TypeError::ArgCount { expected: 1, found: 2, .. }),
        "{:?}",
        err
    );
}

#[test]
fn multi_value_call_unpacks_into_declaration() {
    let tops = check_ok(vec![
        func_stmt(func(
            "pair",
            vec![],
            vec![Type::int(), Type::string()],
            vec![ret(vec![int(1), string("a")])],
        )),
        var(&["a", "b"], vec![call(ident("pair"), vec![])]),
    ]);
    let StmtKind::Var(v) = &tops[1].stmt.kind else {
        unreachable!()
    };
    let types: Vec<&Type> = v.vars().map(|v| &v.ty).collect();
    assert_eq!(types, [&Type::int(), &Type::string()]);
}

#[test]
fn bare_return_needs_named_results() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![Type::int()],
        vec![ret(vec![])],
    ))]);
    assert!(
        matches!(err, TypeError::ValueCount { expected: 1, found: 0, .. }),
        "{:?}",
        err
    );

    let mut named = func("g", vec![], vec![Type::int()], vec![ret(vec![])]);
    named.results[0].name = "n".into();
    check_ok(vec![func_stmt(named)]);
}

#[test]
fn return_outside_function() {
    let err = check_err(vec![if_stmt(vec![if_branch(
        None,
        Some(bool_lit(true)),
        vec![ret(vec![])],
    )])]);
    assert!(err.to_string().contains("`return` outside a function"), "{}", err);
}

#[test]
fn conversion_of_untyped_constant() {
    let tops = check_ok(vec![var(
        &["x"],
        vec![call(ident("int64"), vec![int(1)])],
    )]);
    assert_eq!(var_type(&tops[0].stmt).to_string(), "int64");
}

#[test]
fn nested_declarations_are_rejected() {
    let err = check_err(vec![func_stmt(func(
        "outer",
        vec![],
        vec![],
        vec![func_stmt(func("inner", vec![], vec![], vec![]))],
    ))]);
    assert!(err.to_string().contains("only allowed at top level"), "{}", err);
}

// ── Control Flow ───────────────────────────────────────────────────────

#[test]
fn break_outside_loop() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![branch(BranchKind::Break, None)],
    ))]);
    assert!(
        matches!(err, TypeError::BranchOutside { ref keyword, .. } if keyword == "break"),
        "{:?}",
        err
    );
}

#[test]
fn continue_needs_a_loop_not_a_switch() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![switch(
            Some(int(1)),
            vec![case(Some(vec![int(1)]), vec![branch(BranchKind::Continue, None)])],
        )],
    ))]);
    assert!(
        matches!(err, TypeError::BranchOutside { ref keyword, .. } if keyword == "continue"),
        "{:?}",
        err
    );

    check_ok(vec![func_stmt(func(
        "g",
        vec![],
        vec![],
        vec![switch(
            Some(int(1)),
            vec![case(Some(vec![int(1)]), vec![branch(BranchKind::Break, None)])],
        )],
    ))]);
}

#[test]
fn labels_are_unique_per_function() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![
            label("again").with_span(Span::new(0, 6)),
            label("again").with_span(Span::new(20, 26)),
        ],
    ))]);
    assert_eq!(
        err,
        TypeError::DuplicateLabel {
            name: "again".into(),
            span: Span::new(20, 26),
            first: Span::new(0, 6),
        }
    );
}

#[test]
fn goto_unknown_label() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![branch(BranchKind::Goto, Some("nowhere"))],
    ))]);
    assert!(
        matches!(err, TypeError::UnresolvedLabel { ref name, .. } if name == "nowhere"),
        "{:?}",
        err
    );

    check_ok(vec![func_stmt(func(
        "g",
        vec![],
        vec![],
        vec![label("top"), branch(BranchKind::Goto, Some("top"))],
    ))]);
}

#[test]
fn three_clause_for() {
    let tops = check_ok(vec![for_stmt(
        Some(scoped(vec![("x", int(0))])),
        Some(binary(BinaryOp::Lt, ident("x"), int(100))),
        Some(expr_stmt(call(ident("print"), vec![string("a")]))),
        vec![expr_stmt(call(ident("print"), vec![string("b")]))],
    )]);
    let StmtKind::For(f) = &tops[0].stmt.kind else {
        unreachable!()
    };
    assert_eq!(f.scoped.as_ref().unwrap().decls[0].vars[0].ty, Type::int());
}

#[test]
fn range_variables_take_key_and_element_types() {
    let tops = check_ok(vec![
        typed_var("m", Type::map(Type::string(), Type::bool()), None),
        for_range(&["k", "v"], ident("m"), vec![]),
        for_range(&["i", "c"], string("abc"), vec![]),
    ]);
    let range_types = |stmt: &Stmt| -> Vec<String> {
        let StmtKind::ForRange(r) = &stmt.kind else {
            unreachable!()
        };
        let have_ast::RangeVars::Scoped(vars) = &r.vars else {
            unreachable!()
        };
        vars.iter().map(|v| v.ty.to_string()).collect()
    };
    assert_eq!(range_types(&tops[1].stmt), ["string", "bool"]);
    assert_eq!(range_types(&tops[2].stmt), ["int", "rune"]);
}

#[test]
fn assignment_target_must_be_addressable() {
    let err = check_err(vec![
        func_stmt(func("f", vec![], vec![Type::int()], vec![ret(vec![int(1)])])),
        assign(vec![call(ident("f"), vec![])], vec![int(2)]),
    ]);
    assert!(matches!(err, TypeError::NotAddressable { .. }), "{:?}", err);
}

// ── Types, Methods and Interfaces ──────────────────────────────────────

fn point_decls() -> Vec<Stmt> {
    vec![
        struct_stmt("Point", vec![("x", Type::int()), ("y", Type::int())]),
        func_stmt(method(
            param("p", Type::named("Point")),
            func(
                "Sum",
                vec![],
                vec![Type::int()],
                vec![ret(vec![add(dot(ident("p"), "x"), dot(ident("p"), "y"))])],
            ),
        )),
    ]
}

#[test]
fn method_call_on_struct_literal() {
    let mut stmts = point_decls();
    stmts.push(var(
        &["s"],
        vec![call(
            dot(compound(Type::named("Point"), vec![int(1), int(2)]), "Sum"),
            vec![],
        )],
    ));
    let tops = check_ok(stmts);
    assert_eq!(var_type(&tops[2].stmt), &Type::int());
}

#[test]
fn unknown_field() {
    let mut stmts = point_decls();
    stmts.push(typed_var("p", Type::named("Point"), None));
    stmts.push(expr_stmt(dot(ident("p"), "z")));
    let err = check_err(stmts);
    assert!(
        matches!(err, TypeError::NoSuchField { ref field, .. } if field == "z"),
        "{:?}",
        err
    );
}

#[test]
fn keyed_struct_literal_marks_member_names() {
    let mut stmts = point_decls();
    stmts.push(var(
        &["p"],
        vec![keyed_compound(
            Type::named("Point"),
            vec![(ident("x"), int(1)), (ident("y"), int(2))],
        )],
    ));
    let tops = check_ok(stmts);
    let StmtKind::Var(v) = &tops[2].stmt.kind else {
        unreachable!()
    };
    let ExprKind::Compound(lit) = &v.decls[0].inits[0].kind else {
        unreachable!()
    };
    let key = lit.elems[0].key.as_ref().unwrap().as_ident().unwrap();
    assert!(key.member_name);
    assert!(key.object.is_none());
}

fn shape_decls() -> Vec<Stmt> {
    vec![
        iface("Shape", vec![("Area", FuncType::new(vec![], vec![Type::float64()]))]),
        struct_stmt("Square", vec![("side", Type::float64())]),
        func_stmt(method(
            param("s", Type::named("Square")),
            func(
                "Area",
                vec![],
                vec![Type::float64()],
                vec![ret(vec![binary(
                    BinaryOp::Mul,
                    dot(ident("s"), "side"),
                    dot(ident("s"), "side"),
                )])],
            ),
        )),
        struct_stmt("Circle", vec![("r", Type::float64())]),
    ]
}

#[test]
fn struct_with_method_implements_interface() {
    let mut stmts = shape_decls();
    stmts.push(typed_var(
        "sh",
        Type::named("Shape"),
        Some(compound(Type::named("Square"), vec![int(2)])),
    ));
    check_ok(stmts);
}

#[test]
fn struct_without_method_does_not_implement_interface() {
    let mut stmts = shape_decls();
    stmts.push(typed_var(
        "sh",
        Type::named("Shape"),
        Some(compound(Type::named("Circle"), vec![int(1)])),
    ));
    let err = check_err(stmts);
    assert!(matches!(err, TypeError::Mismatch { .. }), "{:?}", err);
}

#[test]
fn duplicate_method() {
    let mut stmts = point_decls();
    stmts.push(func_stmt(method(
        param("q", Type::named("Point")),
        func("Sum", vec![], vec![Type::int()], vec![ret(vec![int(0)])]),
    )));
    let err = check_err(stmts);
    assert!(
        matches!(err, TypeError::Redeclared { ref name, .. } if name == "Point.Sum"),
        "{:?}",
        err
    );
}

#[test]
fn alias_cycle_is_reported_once() {
    let result = check(vec![
        type_decl("A", Type::named("B")),
        type_decl("B", Type::named("A")),
    ]);
    let Err(errors) = result else {
        panic!("expected an alias cycle")
    };
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(errors[0].to_string(), "invalid recursive type: A -> B -> A");
}

#[test]
fn array_containing_itself_is_rejected() {
    let err = check_err(vec![
        type_decl("A", Type::array(1, Type::named("A"))),
        typed_var("x", Type::named("A"), None),
    ]);
    assert!(matches!(err, TypeError::RecursiveType { .. }), "{:?}", err);
    assert_eq!(err.to_string(), "invalid recursive type: A -> A");
}

#[test]
fn struct_containing_itself_is_rejected() {
    let err = check_err(vec![
        struct_stmt("Node", vec![("val", Type::int()), ("next", Type::named("Node"))]),
        struct_stmt("Outer", vec![("inner", Type::array(2, Type::named("Node")))]),
    ]);
    assert_eq!(err.to_string(), "invalid recursive type: Node -> Node");
}

#[test]
fn indirection_breaks_recursion() {
    check_ok(vec![
        struct_stmt(
            "Node",
            vec![
                ("next", Type::pointer(Type::named("Node"))),
                ("kids", Type::slice(Type::named("Node"))),
                ("index", Type::map(Type::string(), Type::named("Node"))),
            ],
        ),
        typed_var("n", Type::named("Node"), None),
    ]);
}

#[test]
fn named_type_over_builtin_is_distinct() {
    let err = check_err(vec![
        type_decl("Celsius", Type::float64()),
        typed_var("c", Type::named("Celsius"), Some(float("1.5"))),
        typed_var("f", Type::float64(), Some(ident("c"))),
    ]);
    assert!(matches!(err, TypeError::Mismatch { .. }), "{:?}", err);
}

#[test]
fn type_switch_binds_per_branch() {
    let tops = check_ok(vec![
        typed_var("v", empty_iface(), Some(int(1))),
        type_switch(
            Some("x"),
            ident("v"),
            vec![
                case(
                    Some(vec![type_expr(Type::int())]),
                    vec![expr_stmt(add(ident("x"), int(1)))],
                ),
                case(None, vec![]),
            ],
        ),
    ]);
    let StmtKind::Switch(s) = &tops[1].stmt.kind else {
        unreachable!()
    };
    let bound: Vec<String> = s
        .branches
        .iter()
        .map(|b| b.bound.as_ref().unwrap().ty.to_string())
        .collect();
    assert_eq!(bound, ["int", "interface{}"]);
}

#[test]
fn type_switch_needs_interface_subject() {
    let err = check_err(vec![
        var(&["n"], vec![int(1)]),
        type_switch(None, ident("n"), vec![case(None, vec![])]),
    ]);
    assert!(matches!(err, TypeError::NotInterface { .. }), "{:?}", err);
}

// ── When ───────────────────────────────────────────────────────────────

fn when_branch(kind: PredicateKind, ty: Option<Type>, body: Vec<Stmt>) -> WhenBranch {
    WhenBranch {
        span: Span::default(),
        predicates: vec![WhenPredicate { kind, ty }],
        body: have_ast::CodeBlock::new(body),
        active: false,
    }
}

fn when_actives(stmt: &Stmt) -> Vec<bool> {
    let StmtKind::When(w) = &func_body(stmt)[0].kind else {
        unreachable!()
    };
    w.branches.iter().map(|b| b.active).collect()
}

#[test]
fn when_selects_first_matching_branch_only() {
    let tops = check_ok(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![when(
            vec![Type::int()],
            vec![
                when_branch(
                    PredicateKind::Is,
                    Some(Type::string()),
                    vec![expr_stmt(ident("undefined_in_dead_branch"))],
                ),
                when_branch(PredicateKind::Is, Some(Type::int()), vec![expr_stmt(int(1))]),
                when_branch(PredicateKind::Default, None, vec![expr_stmt(int(2))]),
            ],
        )],
    ))]);
    assert_eq!(when_actives(&tops[0].stmt), [false, true, false]);
}

#[test]
fn when_implements_predicate() {
    let stringer = iface(
        "Stringer",
        vec![("String", FuncType::new(vec![], vec![Type::string()]))],
    );
    let tops = check_ok(vec![
        stringer,
        func_stmt(func(
            "f",
            vec![],
            vec![],
            vec![when(
                vec![Type::int()],
                vec![
                    when_branch(PredicateKind::Implements, Some(Type::named("Stringer")), vec![]),
                    when_branch(PredicateKind::Default, None, vec![]),
                ],
            )],
        )),
    ]);
    assert_eq!(when_actives(&tops[1].stmt), [false, true]);
}

#[test]
fn when_implements_needs_an_interface() {
    let err = check_err(vec![func_stmt(func(
        "f",
        vec![],
        vec![],
        vec![when(
            vec![Type::int()],
            vec![when_branch(PredicateKind::Implements, Some(Type::string()), vec![])],
        )],
    ))]);
    assert!(matches!(err, TypeError::NotInterface { .. }), "{:?}", err);
}
