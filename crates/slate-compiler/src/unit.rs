//! The in-memory result of a successful compilation.

use sha2::{Digest, Sha256};
use slate_types::ast::{ClassDecl, MethodDecl, Program};
use slate_types::Diagnostic;

/// A successfully compiled submission.
///
/// Owns the checked AST and answers type-name/method-name lookups for the
/// invoker. One unit exists per request; units are never cached or shared
/// across requests, so two compilations of the same text are fully
/// independent.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    program: Program,
    /// SHA-256 of the submission text, for logging and duplicate spotting.
    fingerprint: [u8; 32],
    /// Non-blocking diagnostics that rode along with the successful build.
    warnings: Vec<Diagnostic>,
}

impl CompiledUnit {
    pub(crate) fn new(program: Program, source: &str, warnings: Vec<Diagnostic>) -> Self {
        let fingerprint = Sha256::digest(source.as_bytes()).into();
        Self {
            program,
            fingerprint,
            warnings,
        }
    }

    /// Look up a class by name.
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.program.classes.iter().find(|c| c.name.name == name)
    }

    /// Look up a method by class and method name.
    pub fn method(&self, class_name: &str, method_name: &str) -> Option<&MethodDecl> {
        self.class(class_name)?.method(method_name)
    }

    /// Names of every class defined by the unit.
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.program.classes.iter().map(|c| c.name.name.as_str())
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Hex form of the source fingerprint.
    pub fn fingerprint_hex(&self) -> String {
        self.fingerprint.iter().map(|b| format!("{b:02x}")).collect()
    }
}
