//! Runtime error types for the Slate evaluator.
//!
//! Every variant carries enough text to be surfaced verbatim as an
//! invocation-failure message.

use thiserror::Error;

/// Evaluation error — anything that aborts a method invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Division by zero or 32-bit overflow.
    #[error("arithmetic trap: {0}")]
    ArithmeticTrap(String),

    /// A `raise` statement in the submission.
    #[error("{0}")]
    Raised(String),

    #[error("index {index} is out of bounds for a list of length {len}")]
    IndexOutOfBounds { index: i64, len: usize },

    /// A value did not match the shape an operation needed. The checker
    /// rules these out for compiled code; they can still arise when decoded
    /// request arguments do not fit the method signature.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),

    #[error("method '{method}' expects {expected} argument(s), received {received}")]
    ArityMismatch {
        method: String,
        expected: usize,
        received: usize,
    },

    /// The gas budget ran out — the submission looped too long.
    #[error("execution budget of {0} steps exhausted")]
    GasExhausted(u64),

    /// The wall-clock deadline passed.
    #[error("execution deadline exceeded")]
    DeadlineExceeded,

    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(u32),
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
