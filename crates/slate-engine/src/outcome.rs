//! Terminal request outcomes and their status classification.

use slate_types::CompileErrors;

/// The single terminal state of one execute request. Exactly one variant
/// is produced per request.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The method ran to completion; the payload is its stringified result.
    Completed(String),
    /// The class or method named in the request does not exist in the
    /// compiled unit. Renders as an empty-body success, kept as its own
    /// variant so a host can choose to surface it instead.
    TargetMissing,
    /// Compilation reported at least one error.
    CompileFailed(CompileErrors),
    /// The submission raised or trapped during execution; the payload is
    /// the failure message.
    Faulted(String),
    /// A required input was blank. Nothing was compiled or executed.
    Rejected(String),
    /// A defect in the engine itself (a caught panic).
    Internal(String),
}

/// Transport-agnostic status classification for an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    ClientError,
    ExpectationFailed,
    ServerError,
}

impl Outcome {
    /// Which status class a host should map this outcome to.
    ///
    /// A fault during execution is a server error carrying the failure
    /// message: the submission's exception escapes the invoke phase
    /// uncaught, so it classifies with engine panics, not with results.
    pub fn status(&self) -> StatusClass {
        match self {
            Self::Completed(_) | Self::TargetMissing => StatusClass::Ok,
            Self::Rejected(_) => StatusClass::ClientError,
            Self::CompileFailed(_) => StatusClass::ExpectationFailed,
            Self::Faulted(_) | Self::Internal(_) => StatusClass::ServerError,
        }
    }

    /// The response body text for this outcome.
    ///
    /// Compile failures render one newline-terminated line per diagnostic
    /// in report order, `"<code> : <message> at (<line>,<column>)"`.
    pub fn body(&self) -> String {
        match self {
            Self::Completed(text) => text.clone(),
            Self::TargetMissing => String::new(),
            Self::CompileFailed(diags) => diags
                .errors
                .iter()
                .map(|d| format!("{}\n", d.report_line()))
                .collect(),
            Self::Faulted(message) | Self::Rejected(message) | Self::Internal(message) => {
                message.clone()
            }
        }
    }
}
