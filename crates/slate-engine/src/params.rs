//! Parameter codec: serialized sample payloads → typed argument lists.
//!
//! Every question carries one serialized payload and one [`ParamKind`] tag
//! saying how to decode it. The two travel together; decoding a payload
//! under a different tag than the one it was stored with is a caller bug.

use slate_eval::Value;

/// The closed set of parameter shapes a question can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// No declared shape. A payload under this tag decodes through the
    /// untyped fallback (any JSON scalar, wrapped as one argument).
    Invalid,
    Int,
    String,
    Double,
    Float,
    IntList,
    StringList,
}

/// Decode a payload into a positional argument list.
///
/// Returns `None` for a missing or blank payload (a zero-argument call,
/// not an error) and for any payload that does not parse under `kind` —
/// decoding is deliberately fail-open, the invocation proceeds without
/// arguments and the arity check reports the mismatch if there is one.
///
/// List kinds decode to the whole argument list; scalar kinds decode to a
/// single wrapped argument. Integers parse as i64 and must fit in i32,
/// since that is the width Slate's `int` has.
pub fn decode_args(payload: Option<&str>, kind: ParamKind) -> Option<Vec<Value>> {
    let payload = payload?.trim();
    if payload.is_empty() {
        return None;
    }
    match kind {
        ParamKind::Int => {
            let n: i64 = serde_json::from_str(payload).ok()?;
            Some(vec![Value::Int(i32::try_from(n).ok()?)])
        }
        ParamKind::String => {
            let s: String = serde_json::from_str(payload).ok()?;
            Some(vec![Value::Str(s)])
        }
        ParamKind::Double | ParamKind::Float => {
            let n: f64 = serde_json::from_str(payload).ok()?;
            Some(vec![Value::Float(n)])
        }
        ParamKind::IntList => {
            let raw: Vec<i64> = serde_json::from_str(payload).ok()?;
            raw.into_iter()
                .map(|n| i32::try_from(n).ok().map(Value::Int))
                .collect()
        }
        ParamKind::StringList => {
            let raw: Vec<String> = serde_json::from_str(payload).ok()?;
            Some(raw.into_iter().map(Value::Str).collect())
        }
        ParamKind::Invalid => decode_untyped(payload),
    }
}

fn decode_untyped(payload: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<serde_json::Value>(payload).ok()? {
        serde_json::Value::Number(n) => {
            let value = match n.as_i64() {
                Some(i) => Value::Int(i32::try_from(i).ok()?),
                None => Value::Float(n.as_f64()?),
            };
            Some(vec![value])
        }
        serde_json::Value::String(s) => Some(vec![Value::Str(s)]),
        serde_json::Value::Bool(b) => Some(vec![Value::Bool(b)]),
        _ => None,
    }
}
