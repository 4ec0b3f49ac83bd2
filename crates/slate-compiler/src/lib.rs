//! Slate compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! Submission text → Lexer → Parser → Checker → CompiledUnit
//! ```
//!
//! Every call builds a fresh lexer, parser, and checker — no state survives
//! between compilations, so a malformed submission cannot affect the next
//! one.

mod checker;
mod env;
mod ty;
mod unit;

pub use checker::Checker;
pub use ty::Type;
pub use unit::CompiledUnit;

use slate_lexer::Lexer;
use slate_parser::Parser;
use slate_types::{CompileErrors, SourceFile};

/// Compile one submission to a [`CompiledUnit`].
///
/// Returns the ordered error diagnostics if any stage reports an error.
/// Warnings never fail the build; they are carried on the unit.
pub fn compile(source: &SourceFile) -> Result<CompiledUnit, CompileErrors> {
    let lexed = Lexer::new(source).lex();
    if lexed.errors.has_errors() {
        return Err(lexed.errors);
    }
    let mut diagnostics = lexed.errors;

    let parsed = Parser::new(lexed.tokens, source).parse();
    diagnostics.extend(parsed.errors);
    let program = match (parsed.program, diagnostics.has_errors()) {
        (Some(program), false) => program,
        _ => return Err(diagnostics),
    };

    let mut checker = Checker::new(&mut diagnostics, source);
    checker.check(&program);
    if diagnostics.has_errors() {
        return Err(diagnostics);
    }

    Ok(CompiledUnit::new(
        program,
        &source.source,
        diagnostics.warnings,
    ))
}
