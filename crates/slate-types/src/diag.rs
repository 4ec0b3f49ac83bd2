use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostics collected past this count are tallied but not stored.
pub const MAX_DIAGNOSTICS: usize = 20;

/// Diagnostic severity. Only errors fail a compilation; warnings ride along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, derived from the code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Syntax,
    Type,
    Name,
    Structure,
    Flow,
}

/// Numeric diagnostic code (E100–E599).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INT_LITERAL_OUT_OF_RANGE: Self = Self(102);
    pub const NESTING_TOO_DEEP: Self = Self(103);
    pub const INVALID_ESCAPE: Self = Self(104);

    // ── Type (E200–E299) ──
    pub const UNKNOWN_TYPE: Self = Self(200);
    pub const TYPE_MISMATCH: Self = Self(201);
    pub const WRONG_ARG_COUNT: Self = Self(202);
    pub const NOT_INDEXABLE: Self = Self(203);
    pub const MISSING_RETURN: Self = Self(204);
    pub const VOID_VALUE_USED: Self = Self(205);

    // ── Name (E300–E399) ──
    pub const UNDEFINED_NAME: Self = Self(300);
    pub const UNDEFINED_METHOD: Self = Self(301);
    pub const UNDEFINED_FIELD: Self = Self(302);
    pub const DUPLICATE_DEFINITION: Self = Self(303);

    // ── Structure (E400–E499) ──
    pub const NO_CLASS_DECLARED: Self = Self(400);
    pub const ASSIGN_TO_NON_PLACE: Self = Self(401);

    // ── Flow (E500–E599, warnings) ──
    pub const UNREACHABLE_CODE: Self = Self(500);

    pub fn category(self) -> Category {
        match self.0 {
            100..=199 => Category::Syntax,
            200..=299 => Category::Type,
            300..=399 => Category::Name,
            400..=499 => Category::Structure,
            _ => Category::Flow,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => write!(f, "syntax"),
            Self::Type => write!(f, "type"),
            Self::Name => write!(f, "name"),
            Self::Structure => write!(f, "structure"),
            Self::Flow => write!(f, "flow"),
        }
    }
}

/// One compiler-reported problem with a source position.
///
/// The execution engine renders these for the submitter as
/// `"<code> : <message> at (<line>,<column>)"` — see [`Diagnostic::report_line`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Submission file name.
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The offending source line, for context.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// The single-line report format the execution endpoint returns.
    pub fn report_line(&self) -> String {
        format!(
            "{} : {} at ({},{})",
            self.code, self.message, self.span.line, self.span.col
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.code, self.category, self.message
        )
    }
}

impl std::error::Error for Diagnostic {}

/// Ordered diagnostics from one compilation, errors and warnings separately.
///
/// Insertion order is the order the pipeline stages reported them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn at_capacity(&self) -> bool {
        self.total_errors >= MAX_DIAGNOSTICS
    }

    pub fn push_error(&mut self, diag: Diagnostic) {
        if self.errors.len() < MAX_DIAGNOSTICS {
            self.errors.push(diag);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, diag: Diagnostic) {
        self.warnings.push(diag);
        self.total_warnings += 1;
    }

    /// Absorb another stage's diagnostics, preserving order.
    pub fn extend(&mut self, other: CompileErrors) {
        let uncounted_errors = other.total_errors.saturating_sub(other.errors.len());
        for e in other.errors {
            self.push_error(e);
        }
        self.total_errors += uncounted_errors;
        let uncounted_warnings = other.total_warnings.saturating_sub(other.warnings.len());
        for w in other.warnings {
            self.push_warning(w);
        }
        self.total_warnings += uncounted_warnings;
    }
}
