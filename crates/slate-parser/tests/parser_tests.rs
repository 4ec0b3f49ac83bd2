//! Integration tests for the Slate parser.

use slate_lexer::Lexer;
use slate_parser::Parser;
use slate_types::ast::*;
use slate_types::{ErrorCode, SourceFile};

fn parse(source: &str) -> slate_parser::ParseResult {
    let sf = SourceFile::new("test.sl", source);
    let lex = Lexer::new(&sf).lex();
    assert!(
        !lex.errors.has_errors(),
        "lex errors: {:?}",
        lex.errors.errors
    );
    Parser::new(lex.tokens, &sf).parse()
}

fn parse_ok(source: &str) -> Program {
    let result = parse(source);
    assert!(
        !result.errors.has_errors(),
        "parse errors:\n{}",
        result
            .errors
            .errors
            .iter()
            .map(|e| format!("  [{}] {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("\n")
    );
    result.program.expect("no program after successful parse")
}

/// Parse a single-method class and return the method.
fn parse_method(body: &str) -> MethodDecl {
    let source = format!("class T {{ {body} }}");
    let prog = parse_ok(&source);
    prog.classes[0].methods[0].clone()
}

// ─────────────────────────────────────────────────────────────
// Declarations
// ─────────────────────────────────────────────────────────────

#[test]
fn minimal_class() {
    let prog = parse_ok("class Empty { }");
    assert_eq!(prog.classes.len(), 1);
    assert_eq!(prog.classes[0].name.name, "Empty");
    assert!(prog.classes[0].fields.is_empty());
    assert!(prog.classes[0].methods.is_empty());
}

#[test]
fn two_classes() {
    let prog = parse_ok("class A { } class B { }");
    assert_eq!(prog.classes.len(), 2);
    assert_eq!(prog.classes[1].name.name, "B");
}

#[test]
fn field_declaration() {
    let prog = parse_ok("class C { field count: int = 0; }");
    let field = &prog.classes[0].fields[0];
    assert_eq!(field.name.name, "count");
    assert_eq!(field.ty.kind, TypeAnnKind::Int);
    assert_eq!(field.default.kind, ExprKind::IntLit(0));
}

#[test]
fn list_field_type() {
    let prog = parse_ok("class C { field xs: list<int> = []; }");
    let field = &prog.classes[0].fields[0];
    match &field.ty.kind {
        TypeAnnKind::List(elem) => assert_eq!(elem.kind, TypeAnnKind::Int),
        other => panic!("expected list type, got {other:?}"),
    }
}

#[test]
fn method_with_params_and_return_type() {
    let m = parse_method("fn add(a: int, b: int) -> int { return a + b; }");
    assert_eq!(m.name.name, "add");
    assert_eq!(m.params.len(), 2);
    assert_eq!(m.params[1].name.name, "b");
    assert_eq!(m.ret.as_ref().unwrap().kind, TypeAnnKind::Int);
}

#[test]
fn method_without_return_type_is_void() {
    let m = parse_method("fn go() { }");
    assert!(m.ret.is_none());
}

#[test]
fn fields_and_methods_interleave() {
    let prog = parse_ok(
        "class C {
            field a: int = 1;
            fn first() { }
            field b: int = 2;
            fn second() { }
        }",
    );
    assert_eq!(prog.classes[0].fields.len(), 2);
    assert_eq!(prog.classes[0].methods.len(), 2);
}

// ─────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────

#[test]
fn let_with_annotation() {
    let m = parse_method("fn go() { let x: float = 1.5; }");
    match &m.body.stmts[0].kind {
        StmtKind::Let { name, ty, .. } => {
            assert_eq!(name.name, "x");
            assert_eq!(ty.as_ref().unwrap().kind, TypeAnnKind::Float);
        }
        other => panic!("expected let, got {other:?}"),
    }
}

#[test]
fn assignment_targets() {
    let m = parse_method(
        "fn go() {
            let x = 1;
            x = 2;
            self.count = 3;
            xs[0] = 4;
        }",
    );
    match &m.body.stmts[1].kind {
        StmtKind::Assign {
            target: Place::Name(id),
            ..
        } => assert_eq!(id.name, "x"),
        other => panic!("expected name assign, got {other:?}"),
    }
    match &m.body.stmts[2].kind {
        StmtKind::Assign {
            target: Place::Field(id),
            ..
        } => assert_eq!(id.name, "count"),
        other => panic!("expected field assign, got {other:?}"),
    }
    assert!(matches!(
        &m.body.stmts[3].kind,
        StmtKind::Assign {
            target: Place::Index { .. },
            ..
        }
    ));
}

#[test]
fn if_else_chain() {
    let m = parse_method(
        "fn sign(n: int) -> int {
            if n > 0 { return 1; } else if n < 0 { return 0 - 1; } else { return 0; }
        }",
    );
    match &m.body.stmts[0].kind {
        StmtKind::If { else_block, .. } => {
            let nested = else_block.as_ref().unwrap();
            assert!(matches!(nested.stmts[0].kind, StmtKind::If { .. }));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn while_and_for_loops() {
    let m = parse_method(
        "fn go(xs: list<int>) {
            while true { }
            for x in xs { }
        }",
    );
    assert!(matches!(m.body.stmts[0].kind, StmtKind::While { .. }));
    match &m.body.stmts[1].kind {
        StmtKind::For { var, .. } => assert_eq!(var.name, "x"),
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn bare_return_and_raise() {
    let m = parse_method("fn go() { return; raise \"boom\"; }");
    assert!(matches!(m.body.stmts[0].kind, StmtKind::Return(None)));
    assert!(matches!(m.body.stmts[1].kind, StmtKind::Raise(_)));
}

// ─────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────

/// Extract the expression of a method shaped `fn go() { return <expr>; }`.
fn parse_expr(expr: &str) -> Expr {
    let m = parse_method(&format!("fn go() {{ return {expr}; }}"));
    match &m.body.stmts[0].kind {
        StmtKind::Return(Some(e)) => e.clone(),
        other => panic!("expected return with value, got {other:?}"),
    }
}

#[test]
fn precedence_mul_over_add() {
    let e = parse_expr("1 + 2 * 3");
    match e.kind {
        ExprKind::Binary { op: BinOp::Add, right, .. } => {
            assert!(matches!(
                right.kind,
                ExprKind::Binary { op: BinOp::Mul, .. }
            ));
        }
        other => panic!("expected +, got {other:?}"),
    }
}

#[test]
fn precedence_comparison_over_and() {
    let e = parse_expr("a < b && c > d");
    assert!(matches!(
        e.kind,
        ExprKind::Binary { op: BinOp::And, .. }
    ));
}

#[test]
fn unary_operators_stack() {
    let e = parse_expr("!!ok");
    match e.kind {
        ExprKind::Unary { op: UnOp::Not, operand } => {
            assert!(matches!(
                operand.kind,
                ExprKind::Unary { op: UnOp::Not, .. }
            ));
        }
        other => panic!("expected unary, got {other:?}"),
    }
}

#[test]
fn self_field_and_self_call() {
    let field = parse_expr("self.count");
    assert_eq!(field.kind, ExprKind::SelfField("count".into()));

    let call = parse_expr("self.helper(1)");
    match call.kind {
        ExprKind::SelfCall { name, args } => {
            assert_eq!(name.name, "helper");
            assert_eq!(args.len(), 1);
        }
        other => panic!("expected self call, got {other:?}"),
    }
}

#[test]
fn sibling_call_and_index() {
    let e = parse_expr("helper(xs)[0]");
    match e.kind {
        ExprKind::Index { base, .. } => {
            assert!(matches!(base.kind, ExprKind::Call { .. }));
        }
        other => panic!("expected index, got {other:?}"),
    }
}

#[test]
fn list_literal() {
    let e = parse_expr("[1, 2, 3]");
    match e.kind {
        ExprKind::ListLit(elems) => assert_eq!(elems.len(), 3),
        other => panic!("expected list literal, got {other:?}"),
    }
}

#[test]
fn empty_list_literal() {
    let e = parse_expr("[]");
    assert_eq!(e.kind, ExprKind::ListLit(vec![]));
}

// ─────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────

#[test]
fn no_class_is_a_structure_error() {
    let result = parse("fn add() { }");
    assert!(result.program.is_none());
    assert!(result
        .errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NO_CLASS_DECLARED));
}

#[test]
fn missing_semicolon() {
    let result = parse("class C { fn go() { let x = 1 } }");
    assert!(result.errors.has_errors());
    assert_eq!(result.errors.errors[0].code, ErrorCode::UNEXPECTED_TOKEN);
}

#[test]
fn chained_comparison_rejected() {
    let result = parse("class C { fn go() { let x = 1 < 2 < 3; } }");
    assert!(result.errors.has_errors());
}

#[test]
fn assign_to_literal_rejected() {
    let result = parse("class C { fn go() { 1 = 2; } }");
    assert!(result
        .errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::ASSIGN_TO_NON_PLACE));
}

#[test]
fn deep_expression_nesting_rejected() {
    let nested = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    let result = parse(&format!("class C {{ fn go() {{ let x = {nested}; }} }}"));
    assert!(result
        .errors
        .errors
        .iter()
        .any(|e| e.code == ErrorCode::NESTING_TOO_DEEP));
}

#[test]
fn recovery_continues_after_bad_member() {
    let result = parse(
        "class C {
            field bad int = 1;
            fn good() { }
        }",
    );
    assert!(result.errors.has_errors());
    let prog = result.program.expect("program should survive recovery");
    assert_eq!(prog.classes[0].methods.len(), 1);
    assert_eq!(prog.classes[0].methods[0].name.name, "good");
}

#[test]
fn error_spans_point_at_the_problem() {
    let result = parse("class C {\n  fn go() {\n    let x = ;\n  }\n}");
    assert!(result.errors.has_errors());
    let diag = &result.errors.errors[0];
    assert_eq!(diag.span.line, 3);
    assert_eq!(diag.source_line, "    let x = ;");
}
