//! Shared types for the Slate compiler.
//!
//! This crate defines the AST node types, source spans, and diagnostic
//! types used across all pipeline stages.

mod diag;
mod span;
pub mod ast;

pub use diag::{Category, CompileErrors, Diagnostic, ErrorCode, Severity, MAX_DIAGNOSTICS};
pub use span::{SourceFile, Span};
