//! Slate execution engine.
//!
//! One request carries a question id, a class name, a method name, and raw
//! submission text. The engine validates the inputs, compiles the text,
//! decodes the question's sample arguments, invokes the named method, and
//! reports exactly one [`Outcome`]:
//!
//! ```text
//! Validating → Compiling → {CompileFailed | ResolvingParams}
//!            → Invoking  → {Completed | TargetMissing | Faulted}
//! ```
//!
//! Every request compiles from scratch and owns its unit exclusively —
//! there is no cache and no shared mutable state, so concurrent requests
//! cannot observe each other.

mod outcome;
mod params;
mod questions;

pub use outcome::{Outcome, StatusClass};
pub use params::{decode_args, ParamKind};
pub use questions::{QuestionSource, SampleQuestions};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use log::{debug, warn};
use slate_compiler::compile;
use slate_eval::{Evaluator, Limits, Value};
use slate_types::SourceFile;

/// One compile-and-execute request.
#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub question_id: u32,
    pub class_name: String,
    pub method_name: String,
    pub source: String,
}

/// The request orchestrator.
///
/// Holds only read-only configuration (the question source and the
/// evaluator limits); `execute` borrows it immutably, so one engine can
/// serve concurrent requests.
pub struct Engine<Q = SampleQuestions> {
    questions: Q,
    limits: Limits,
}

impl Engine<SampleQuestions> {
    /// An engine over the built-in sample question bank.
    pub fn new() -> Self {
        Self::with_questions(SampleQuestions::new())
    }
}

impl Default for Engine<SampleQuestions> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q: QuestionSource> Engine<Q> {
    pub fn with_questions(questions: Q) -> Self {
        Self {
            questions,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Run one request to its terminal outcome.
    ///
    /// Blank inputs short-circuit before anything is compiled or executed.
    /// The whole compile+invoke pipeline runs under `catch_unwind`, so a
    /// panic anywhere inside it surfaces as [`Outcome::Internal`] instead
    /// of tearing down the host.
    pub fn execute(&self, request: &ExecuteRequest) -> Outcome {
        if let Some(reason) = validate(request) {
            debug!("rejected request: {reason}");
            return Outcome::Rejected(reason);
        }
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(request))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload);
                warn!("pipeline panicked: {message}");
                Outcome::Internal(message)
            }
        }
    }

    fn run(&self, request: &ExecuteRequest) -> Outcome {
        let source = SourceFile::new("submission.sl", &request.source);
        let unit = match compile(&source) {
            Ok(unit) => unit,
            Err(diags) => {
                debug!("compilation failed with {} error(s)", diags.total_errors);
                return Outcome::CompileFailed(diags);
            }
        };
        debug!(
            "compiled submission {} ({} warning(s))",
            unit.fingerprint_hex(),
            unit.warnings().len()
        );

        let (payload, kind) = self.questions.resolve(request.question_id);
        let args = decode_args(payload.as_deref(), kind);
        let args = args.as_deref().unwrap_or(&[]);

        let mut eval = Evaluator::new(&unit, self.limits.clone());
        let mut instance = match eval.instantiate(&request.class_name) {
            Ok(Some(instance)) => instance,
            Ok(None) => {
                debug!("class '{}' not found", request.class_name);
                return Outcome::TargetMissing;
            }
            Err(err) => return Outcome::Faulted(err.to_string()),
        };
        let method = match eval.resolve_method(&instance, &request.method_name) {
            Some(method) => method,
            None => {
                debug!(
                    "method '{}' not found on '{}'",
                    request.method_name, request.class_name
                );
                return Outcome::TargetMissing;
            }
        };
        match eval.call(&mut instance, method, args) {
            Ok(value) => Outcome::Completed(render(value)),
            Err(err) => Outcome::Faulted(err.to_string()),
        }
    }
}

fn validate(request: &ExecuteRequest) -> Option<String> {
    if request.source.trim().is_empty() {
        return Some("source must not be blank".to_string());
    }
    if request.class_name.trim().is_empty() {
        return Some("class name must not be blank".to_string());
    }
    if request.method_name.trim().is_empty() {
        return Some("method name must not be blank".to_string());
    }
    None
}

fn render(value: Value) -> String {
    value.to_string()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected internal failure".to_string()
    }
}
