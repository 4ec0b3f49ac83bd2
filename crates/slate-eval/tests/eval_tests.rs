//! Integration tests for the Slate evaluator.

use std::time::Duration;

use slate_compiler::{compile, CompiledUnit};
use slate_eval::{EvalError, EvalResult, Evaluator, Limits, Value};
use slate_types::SourceFile;

fn build_ok(source: &str) -> CompiledUnit {
    match compile(&SourceFile::new("test.sl", source)) {
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

fn test_limits() -> Limits {
    Limits {
        wall_clock: None,
        ..Limits::default()
    }
}

/// Compile, instantiate the first class, and invoke one method.
fn run(source: &str, class: &str, method: &str, args: &[Value]) -> EvalResult<Value> {
    run_limited(source, class, method, args, test_limits())
}

fn run_limited(
    source: &str,
    class: &str,
    method: &str,
    args: &[Value],
    limits: Limits,
) -> EvalResult<Value> {
    let unit = build_ok(source);
    let mut eval = Evaluator::new(&unit, limits);
    let mut instance = eval
        .instantiate(class)
        .expect("instantiation trapped")
        .expect("class not found");
    let method = eval
        .resolve_method(&instance, method)
        .expect("method not found");
    eval.call(&mut instance, method, args)
}

// ─────────────────────────────────────────────────────────────
// Invocation basics
// ─────────────────────────────────────────────────────────────

#[test]
fn add_two_ints() {
    let result = run(
        "class Solution { fn add(a: int, b: int) -> int { return a + b; } }",
        "Solution",
        "add",
        &[Value::Int(2), Value::Int(3)],
    );
    assert_eq!(result, Ok(Value::Int(5)));
}

#[test]
fn no_argument_method() {
    let result = run(
        "class C { fn greeting() -> string { return \"hello\"; } }",
        "C",
        "greeting",
        &[],
    );
    assert_eq!(result, Ok(Value::Str("hello".into())));
}

#[test]
fn void_method_returns_unit() {
    let result = run(
        "class C { field n: int = 0; fn set(v: int) { self.n = v; } }",
        "C",
        "set",
        &[Value::Int(7)],
    );
    assert_eq!(result, Ok(Value::Unit));
}

#[test]
fn missing_class_is_none_not_error() {
    let unit = build_ok("class C { fn go() -> int { return 1; } }");
    let mut eval = Evaluator::new(&unit, test_limits());
    assert!(eval.instantiate("Nope").unwrap().is_none());
}

#[test]
fn missing_method_is_none() {
    let unit = build_ok("class C { fn go() -> int { return 1; } }");
    let mut eval = Evaluator::new(&unit, test_limits());
    let instance = eval.instantiate("C").unwrap().unwrap();
    assert!(eval.resolve_method(&instance, "nope").is_none());
}

#[test]
fn arity_mismatch_is_an_error() {
    let result = run(
        "class C { fn add(a: int, b: int) -> int { return a + b; } }",
        "C",
        "add",
        &[Value::Int(1)],
    );
    assert_eq!(
        result,
        Err(EvalError::ArityMismatch {
            method: "add".into(),
            expected: 2,
            received: 1,
        })
    );
}

#[test]
fn argument_type_mismatch_is_an_error() {
    let result = run(
        "class C { fn add(a: int, b: int) -> int { return a + b; } }",
        "C",
        "add",
        &[Value::Str("2".into()), Value::Int(3)],
    );
    assert!(matches!(result, Err(EvalError::TypeMismatch(_))));
}

#[test]
fn int_argument_widens_to_float_parameter() {
    let result = run(
        "class C { fn half(x: float) -> float { return x / 2.0; } }",
        "C",
        "half",
        &[Value::Int(5)],
    );
    assert_eq!(result, Ok(Value::Float(2.5)));
}

#[test]
fn list_arguments_conform_elementwise() {
    let result = run(
        "class C {
            fn sum(xs: list<int>) -> int {
                let total = 0;
                for x in xs { total = total + x; }
                return total;
            }
        }",
        "C",
        "sum",
        &[Value::List(vec![
            Value::Int(1),
            Value::Int(2),
            Value::Int(3),
            Value::Int(4),
            Value::Int(5),
        ])],
    );
    assert_eq!(result, Ok(Value::Int(15)));
}

// ─────────────────────────────────────────────────────────────
// Fields and state
// ─────────────────────────────────────────────────────────────

#[test]
fn field_defaults_are_evaluated_at_instantiation() {
    let unit = build_ok("class C { field n: int = 2 + 3; field s: string = \"hi\"; fn go() {} }");
    let mut eval = Evaluator::new(&unit, test_limits());
    let instance = eval.instantiate("C").unwrap().unwrap();
    assert_eq!(instance.field("n"), Some(&Value::Int(5)));
    assert_eq!(instance.field("s"), Some(&Value::Str("hi".into())));
}

#[test]
fn int_default_widens_into_float_field() {
    let unit = build_ok("class C { field x: float = 3; fn go() {} }");
    let mut eval = Evaluator::new(&unit, test_limits());
    let instance = eval.instantiate("C").unwrap().unwrap();
    assert_eq!(instance.field("x"), Some(&Value::Float(3.0)));
}

#[test]
fn field_mutation_persists_across_calls() {
    let unit = build_ok(
        "class Counter {
            field n: int = 0;
            fn bump() { self.n = self.n + 1; }
            fn get() -> int { return self.n; }
        }",
    );
    let mut eval = Evaluator::new(&unit, test_limits());
    let mut instance = eval.instantiate("Counter").unwrap().unwrap();
    let bump = eval.resolve_method(&instance, "bump").unwrap();
    eval.call(&mut instance, bump, &[]).unwrap();
    eval.call(&mut instance, bump, &[]).unwrap();
    let get = eval.resolve_method(&instance, "get").unwrap();
    assert_eq!(eval.call(&mut instance, get, &[]), Ok(Value::Int(2)));
}

#[test]
fn bare_name_assignment_reaches_fields() {
    let result = run(
        "class C {
            field n: int = 0;
            fn go() -> int { n = 9; return n; }
        }",
        "C",
        "go",
        &[],
    );
    assert_eq!(result, Ok(Value::Int(9)));
}

#[test]
fn local_shadows_field_of_same_name() {
    let result = run(
        "class C {
            field n: int = 1;
            fn go() -> int { let n = 2; return n + self.n; }
        }",
        "C",
        "go",
        &[],
    );
    assert_eq!(result, Ok(Value::Int(3)));
}

// ─────────────────────────────────────────────────────────────
// Control flow
// ─────────────────────────────────────────────────────────────

#[test]
fn if_else_chains() {
    let source = "class C {
        fn sign(x: int) -> string {
            if x > 0 { return \"pos\"; }
            else if x < 0 { return \"neg\"; }
            else { return \"zero\"; }
        }
    }";
    assert_eq!(
        run(source, "C", "sign", &[Value::Int(4)]),
        Ok(Value::Str("pos".into()))
    );
    assert_eq!(
        run(source, "C", "sign", &[Value::Int(-4)]),
        Ok(Value::Str("neg".into()))
    );
    assert_eq!(
        run(source, "C", "sign", &[Value::Int(0)]),
        Ok(Value::Str("zero".into()))
    );
}

#[test]
fn while_loop_runs() {
    let result = run(
        "class C {
            fn pow2(n: int) -> int {
                let r = 1;
                let i = 0;
                while i < n { r = r * 2; i = i + 1; }
                return r;
            }
        }",
        "C",
        "pow2",
        &[Value::Int(10)],
    );
    assert_eq!(result, Ok(Value::Int(1024)));
}

#[test]
fn return_escapes_nested_loops() {
    let result = run(
        "class C {
            fn find(xs: list<int>, target: int) -> int {
                let i = 0;
                while i < len(xs) {
                    if xs[i] == target { return i; }
                    i = i + 1;
                }
                return -1;
            }
        }",
        "C",
        "find",
        &[
            Value::List(vec![Value::Int(4), Value::Int(8), Value::Int(15)]),
            Value::Int(8),
        ],
    );
    assert_eq!(result, Ok(Value::Int(1)));
}

#[test]
fn sibling_method_calls_recurse() {
    let result = run(
        "class C {
            fn fib(n: int) -> int {
                if n < 2 { return n; }
                return fib(n - 1) + fib(n - 2);
            }
        }",
        "C",
        "fib",
        &[Value::Int(10)],
    );
    assert_eq!(result, Ok(Value::Int(55)));
}

#[test]
fn self_call_form_works() {
    let result = run(
        "class C {
            fn double(x: int) -> int { return x * 2; }
            fn quad(x: int) -> int { return self.double(self.double(x)); }
        }",
        "C",
        "quad",
        &[Value::Int(3)],
    );
    assert_eq!(result, Ok(Value::Int(12)));
}

// ─────────────────────────────────────────────────────────────
// Values and operators
// ─────────────────────────────────────────────────────────────

#[test]
fn string_concat_and_len() {
    let result = run(
        "class C { fn tag(s: string) -> string { return s + \"!\"; } }",
        "C",
        "tag",
        &[Value::Str("abc".into())],
    );
    assert_eq!(result, Ok(Value::Str("abc!".into())));

    let result = run(
        "class C { fn size(s: string) -> int { return len(s); } }",
        "C",
        "size",
        &[Value::Str("abc".into())],
    );
    assert_eq!(result, Ok(Value::Int(3)));
}

#[test]
fn mixed_numeric_arithmetic_promotes_to_float() {
    let result = run(
        "class C { fn go() -> float { return 1 + 0.5; } }",
        "C",
        "go",
        &[],
    );
    assert_eq!(result, Ok(Value::Float(1.5)));
}

#[test]
fn list_index_write() {
    let result = run(
        "class C {
            fn swap_first(xs: list<int>) -> list<int> {
                let tmp = xs[0];
                xs[0] = xs[1];
                xs[1] = tmp;
                return xs;
            }
        }",
        "C",
        "swap_first",
        &[Value::List(vec![Value::Int(1), Value::Int(2)])],
    );
    assert_eq!(
        result,
        Ok(Value::List(vec![Value::Int(2), Value::Int(1)]))
    );
}

#[test]
fn user_len_method_shadows_builtin() {
    let result = run(
        "class C {
            fn len(xs: list<int>) -> int { return 42; }
            fn go(xs: list<int>) -> int { return len(xs); }
        }",
        "C",
        "go",
        &[Value::List(vec![Value::Int(1)])],
    );
    assert_eq!(result, Ok(Value::Int(42)));
}

// ─────────────────────────────────────────────────────────────
// Traps
// ─────────────────────────────────────────────────────────────

#[test]
fn division_by_zero_traps() {
    let result = run(
        "class C { fn div(a: int, b: int) -> int { return a / b; } }",
        "C",
        "div",
        &[Value::Int(1), Value::Int(0)],
    );
    assert!(matches!(result, Err(EvalError::ArithmeticTrap(_))));
}

#[test]
fn int_overflow_traps() {
    let result = run(
        "class C { fn bump(x: int) -> int { return x + 1; } }",
        "C",
        "bump",
        &[Value::Int(i32::MAX)],
    );
    assert!(matches!(result, Err(EvalError::ArithmeticTrap(_))));
}

#[test]
fn index_out_of_bounds_traps() {
    let result = run(
        "class C { fn first(xs: list<int>) -> int { return xs[5]; } }",
        "C",
        "first",
        &[Value::List(vec![Value::Int(1)])],
    );
    assert_eq!(
        result,
        Err(EvalError::IndexOutOfBounds { index: 5, len: 1 })
    );
}

#[test]
fn negative_index_traps() {
    let result = run(
        "class C { fn at(xs: list<int>, i: int) -> int { return xs[i]; } }",
        "C",
        "at",
        &[Value::List(vec![Value::Int(1)]), Value::Int(-1)],
    );
    assert_eq!(
        result,
        Err(EvalError::IndexOutOfBounds { index: -1, len: 1 })
    );
}

#[test]
fn raise_surfaces_its_message() {
    let result = run(
        "class C { fn boom() { raise \"bad input\"; } }",
        "C",
        "boom",
        &[],
    );
    assert_eq!(result, Err(EvalError::Raised("bad input".into())));
}

// ─────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────

#[test]
fn infinite_loop_exhausts_gas() {
    let limits = Limits {
        gas: 10_000,
        wall_clock: None,
        ..Limits::default()
    };
    let result = run_limited(
        "class C { fn spin() { while true { } } }",
        "C",
        "spin",
        &[],
        limits,
    );
    assert_eq!(result, Err(EvalError::GasExhausted(10_000)));
}

#[test]
fn runaway_recursion_hits_depth_cap() {
    let limits = Limits {
        call_depth: 16,
        wall_clock: None,
        ..Limits::default()
    };
    let result = run_limited(
        "class C { fn go(n: int) -> int { return go(n + 1); } }",
        "C",
        "go",
        &[Value::Int(0)],
        limits,
    );
    assert_eq!(result, Err(EvalError::CallDepthExceeded(16)));
}

#[test]
fn expired_deadline_stops_execution() {
    let limits = Limits {
        wall_clock: Some(Duration::ZERO),
        ..Limits::default()
    };
    let result = run_limited(
        "class C { fn spin() { while true { } } }",
        "C",
        "spin",
        &[],
        limits,
    );
    assert_eq!(result, Err(EvalError::DeadlineExceeded));
}

#[test]
fn gas_accumulates_across_calls() {
    let unit = build_ok("class C { fn go() -> int { return 1 + 2; } }");
    let mut eval = Evaluator::new(&unit, test_limits());
    let mut instance = eval.instantiate("C").unwrap().unwrap();
    let go = eval.resolve_method(&instance, "go").unwrap();
    eval.call(&mut instance, go, &[]).unwrap();
    let after_one = eval.gas_used();
    eval.call(&mut instance, go, &[]).unwrap();
    assert!(eval.gas_used() > after_one);
}
