//! Question lookup: id → (sample payload, parameter shape).
//!
//! In a full deployment this data lives in an external store; the engine
//! only depends on the [`QuestionSource`] trait, so the built-in bank can
//! be swapped for a real backend without touching the compile/invoke core.

use std::collections::BTreeMap;

use crate::params::ParamKind;

/// Read-only question metadata. Implementations must be safe to share
/// across concurrent requests.
pub trait QuestionSource: Send + Sync {
    /// The serialized sample arguments and the tag describing how to decode
    /// them. Unknown ids resolve to `(None, ParamKind::Invalid)`.
    fn resolve(&self, id: u32) -> (Option<String>, ParamKind);

    /// Every id this source knows about, ascending.
    fn ids(&self) -> Vec<u32>;

    /// Human-readable description of one question.
    fn describe(&self, id: u32) -> String {
        format!("Question : {id}")
    }
}

/// The built-in sample bank.
#[derive(Debug, Clone)]
pub struct SampleQuestions {
    entries: BTreeMap<u32, (String, ParamKind)>,
}

impl SampleQuestions {
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(1, (serde_json::json!(1).to_string(), ParamKind::Int));
        entries.insert(2, (serde_json::json!("abc").to_string(), ParamKind::String));
        entries.insert(
            3,
            (serde_json::json!([1, 2, 3, 4, 5]).to_string(), ParamKind::IntList),
        );
        entries.insert(
            4,
            (
                serde_json::json!(["abc", "xyz", "pqr"]).to_string(),
                ParamKind::StringList,
            ),
        );
        entries.insert(5, (serde_json::json!(1.345).to_string(), ParamKind::Double));
        Self { entries }
    }
}

impl Default for SampleQuestions {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionSource for SampleQuestions {
    fn resolve(&self, id: u32) -> (Option<String>, ParamKind) {
        match self.entries.get(&id) {
            Some((payload, kind)) => (Some(payload.clone()), *kind),
            None => (None, ParamKind::Invalid),
        }
    }

    fn ids(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }
}
