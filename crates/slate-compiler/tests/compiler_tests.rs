//! Integration tests for the Slate compilation pipeline and checker.

use slate_compiler::{compile, CompiledUnit};
use slate_types::{CompileErrors, ErrorCode, SourceFile};

fn build(source: &str) -> Result<CompiledUnit, CompileErrors> {
    compile(&SourceFile::new("test.sl", source))
}

fn build_ok(source: &str) -> CompiledUnit {
    match build(source) {
        Ok(unit) => unit,
        Err(diags) => panic!(
            "compile errors:\n{}",
            diags
                .errors
                .iter()
                .map(|e| format!("  {}", e.report_line()))
                .collect::<Vec<_>>()
                .join("\n")
        ),
    }
}

fn build_err(source: &str) -> CompileErrors {
    match build(source) {
        Ok(_) => panic!("expected compile errors"),
        Err(diags) => diags,
    }
}

fn has_code(diags: &CompileErrors, code: ErrorCode) -> bool {
    diags.errors.iter().any(|e| e.code == code)
}

// ─────────────────────────────────────────────────────────────
// Pipeline
// ─────────────────────────────────────────────────────────────

#[test]
fn minimal_program_compiles() {
    let unit = build_ok("class C { fn add(a: int, b: int) -> int { return a + b; } }");
    assert!(unit.class("C").is_some());
    assert!(unit.method("C", "add").is_some());
    assert!(unit.method("C", "sub").is_none());
    assert!(unit.class("D").is_none());
}

#[test]
fn lex_errors_surface_as_diagnostics() {
    let diags = build_err("class C { fn go() { let x = 1 @ 2; } }");
    assert!(has_code(&diags, ErrorCode::UNEXPECTED_TOKEN));
}

#[test]
fn parse_errors_surface_as_diagnostics() {
    let diags = build_err("class C { fn go( { } }");
    assert!(diags.has_errors());
}

#[test]
fn diagnostic_count_matches_reported_errors() {
    // Two independent type errors in two methods.
    let diags = build_err(
        "class C {
            fn a() -> int { return \"x\"; }
            fn b() -> string { return 1; }
        }",
    );
    assert_eq!(diags.total_errors, 2);
    assert_eq!(diags.errors.len(), 2);
}

#[test]
fn diagnostics_keep_report_order() {
    let diags = build_err(
        "class C {
            fn a() { return 1; }
            fn b() { return 2; }
        }",
    );
    assert!(diags.errors[0].span.line < diags.errors[1].span.line);
}

#[test]
fn identical_sources_build_independent_units() {
    let source = "class C { fn id(n: int) -> int { return n; } }";
    let a = build_ok(source);
    let b = build_ok(source);
    assert_eq!(a.fingerprint_hex(), b.fingerprint_hex());
    // Distinct allocations, same observable shape.
    assert_eq!(
        a.class_names().collect::<Vec<_>>(),
        b.class_names().collect::<Vec<_>>()
    );
}

#[test]
fn report_line_format_is_stable() {
    let diags = build_err("class C { fn go() -> int { return \"no\"; } }");
    let line = diags.errors[0].report_line();
    assert!(
        line.starts_with("E201 : "),
        "unexpected report line: {line}"
    );
    assert!(line.contains(" at (1,"), "unexpected report line: {line}");
}

// ─────────────────────────────────────────────────────────────
// Name resolution
// ─────────────────────────────────────────────────────────────

#[test]
fn undefined_variable() {
    let diags = build_err("class C { fn go() -> int { return missing; } }");
    assert!(has_code(&diags, ErrorCode::UNDEFINED_NAME));
}

#[test]
fn undefined_method() {
    let diags = build_err("class C { fn go() { nothing(); } }");
    assert!(has_code(&diags, ErrorCode::UNDEFINED_METHOD));
}

#[test]
fn undefined_field() {
    let diags = build_err("class C { fn go() -> int { return self.missing; } }");
    assert!(has_code(&diags, ErrorCode::UNDEFINED_FIELD));
}

#[test]
fn duplicate_method_names_rejected() {
    // Invocation resolves by name alone, so overloads are not allowed.
    let diags = build_err(
        "class C {
            fn go(a: int) { }
            fn go(a: string) { }
        }",
    );
    assert!(has_code(&diags, ErrorCode::DUPLICATE_DEFINITION));
}

#[test]
fn duplicate_class_rejected() {
    let diags = build_err("class C { } class C { }");
    assert!(has_code(&diags, ErrorCode::DUPLICATE_DEFINITION));
}

#[test]
fn bare_name_reads_a_field() {
    build_ok(
        "class C {
            field count: int = 0;
            fn get() -> int { return count; }
        }",
    );
}

#[test]
fn locals_shadow_fields() {
    build_ok(
        "class C {
            field count: int = 0;
            fn get() -> string {
                let count = \"local\";
                return count;
            }
        }",
    );
}

// ─────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────

#[test]
fn arithmetic_promotion() {
    build_ok(
        "class C {
            fn mix(a: int, b: float) -> float { return a + b; }
            fn whole(a: int, b: int) -> int { return a * b; }
        }",
    );
}

#[test]
fn int_widens_to_float_but_not_back() {
    build_ok("class C { fn go() -> float { return 1; } }");
    let diags = build_err("class C { fn go() -> int { return 1.5; } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn string_concatenation() {
    build_ok("class C { fn greet(name: string) -> string { return \"hi \" + name; } }");
}

#[test]
fn string_plus_int_rejected() {
    let diags = build_err("class C { fn go() -> string { return \"n=\" + 1; } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn condition_must_be_bool() {
    let diags = build_err("class C { fn go() { if 1 { } } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn wrong_argument_count() {
    let diags = build_err(
        "class C {
            fn pair(a: int, b: int) -> int { return a + b; }
            fn go() -> int { return pair(1); }
        }",
    );
    assert!(has_code(&diags, ErrorCode::WRONG_ARG_COUNT));
}

#[test]
fn argument_type_mismatch() {
    let diags = build_err(
        "class C {
            fn double(n: int) -> int { return n * 2; }
            fn go() -> int { return double(\"two\"); }
        }",
    );
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn len_builtin() {
    build_ok(
        "class C {
            fn total(xs: list<int>, s: string) -> int { return len(xs) + len(s); }
        }",
    );
    let diags = build_err("class C { fn go() -> int { return len(1); } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
    let diags = build_err("class C { fn go() -> int { return len(); } }");
    assert!(has_code(&diags, ErrorCode::WRONG_ARG_COUNT));
}

#[test]
fn indexing_rules() {
    build_ok(
        "class C {
            fn first(xs: list<string>) -> string { return xs[0]; }
        }",
    );
    let diags = build_err("class C { fn go() -> int { return 5[0]; } }");
    assert!(has_code(&diags, ErrorCode::NOT_INDEXABLE));
}

#[test]
fn for_needs_a_list() {
    let diags = build_err("class C { fn go() { for x in 1 { } } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
    build_ok(
        "class C {
            fn sum(xs: list<int>) -> int {
                let total = 0;
                for x in xs { total = total + x; }
                return total;
            }
        }",
    );
}

#[test]
fn raise_needs_a_string() {
    let diags = build_err("class C { fn go() { raise 42; } }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn void_rules() {
    let diags = build_err(
        "class C {
            fn go() { }
            fn use_it() { let x = go(); }
        }",
    );
    assert!(has_code(&diags, ErrorCode::VOID_VALUE_USED));

    let diags = build_err("class C { field f: void = 0; }");
    assert!(has_code(&diags, ErrorCode::UNKNOWN_TYPE));
}

#[test]
fn missing_return_detected() {
    let diags = build_err(
        "class C {
            fn go(n: int) -> int {
                if n > 0 { return 1; }
            }
        }",
    );
    assert!(has_code(&diags, ErrorCode::MISSING_RETURN));
}

#[test]
fn return_on_both_branches_is_enough() {
    build_ok(
        "class C {
            fn go(n: int) -> int {
                if n > 0 { return 1; } else { return 0; }
            }
        }",
    );
}

#[test]
fn raise_counts_as_an_exit() {
    build_ok(
        "class C {
            fn go(n: int) -> int {
                if n > 0 { return 1; } else { raise \"negative\"; }
            }
        }",
    );
}

// ─────────────────────────────────────────────────────────────
// Fields
// ─────────────────────────────────────────────────────────────

#[test]
fn field_default_type_checked() {
    let diags = build_err("class C { field n: int = \"zero\"; }");
    assert!(has_code(&diags, ErrorCode::TYPE_MISMATCH));
}

#[test]
fn field_defaults_cannot_use_self_or_methods() {
    let diags = build_err(
        "class C {
            field a: int = 1;
            field b: int = self.a;
        }",
    );
    assert!(has_code(&diags, ErrorCode::UNDEFINED_FIELD));

    let diags = build_err(
        "class C {
            field n: int = make();
            fn make() -> int { return 1; }
        }",
    );
    assert!(has_code(&diags, ErrorCode::UNDEFINED_METHOD));
}

// ─────────────────────────────────────────────────────────────
// Warnings
// ─────────────────────────────────────────────────────────────

#[test]
fn unreachable_code_is_a_warning_not_an_error() {
    let unit = build_ok(
        "class C {
            fn go() -> int {
                return 1;
                let dead = 2;
            }
        }",
    );
    assert_eq!(unit.warnings().len(), 1);
    assert_eq!(unit.warnings()[0].code, ErrorCode::UNREACHABLE_CODE);
}
