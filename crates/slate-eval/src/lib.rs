//! Slate evaluator.
//!
//! Executes a [`slate_compiler::CompiledUnit`] by walking the checked AST:
//! instantiate a class, resolve a method, invoke it with typed arguments.
//! All execution runs under [`Limits`] — a gas budget, an optional
//! wall-clock deadline, and a call-depth cap.

mod env;
mod error;
mod evaluator;
mod value;

pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, Instance, Limits};
pub use value::Value;
