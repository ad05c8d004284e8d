pub mod decoded;
pub mod stack;

pub use decoded::*;
pub use stack::*;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::is_valid_name;

/// Domain assigned to imported traces that carry no usable domain name.
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// One recorded invocation of an effectively enabled domain.
///
/// Serializes to the wire form consumed by `post`/`load_traces`:
/// `timestamp`, `domain`, `args`, `error` (`{"stack": ...}`), optional
/// `structured`, and any passthrough properties from an imported trace.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    /// Capture time in milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Domain active at capture
    pub domain: String,

    /// Positional arguments as passed by the caller
    pub args: Vec<Value>,

    /// Call-stack snapshot taken when the trace was created
    pub error: CallStack,

    /// Key/value metadata used for structured filtering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured: Option<Map<String, Value>>,

    /// Unrecognized properties of an imported trace, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Trace {
    pub fn new(domain: impl Into<String>, args: Vec<Value>, timestamp: i64, error: CallStack) -> Self {
        let structured = extract_structured(&args);
        Self {
            timestamp,
            domain: domain.into(),
            args,
            error,
            structured,
            extra: Map::new(),
        }
    }

    /// Rebuild a trace from an untyped JSON object, filling gaps.
    ///
    /// - missing/non-numeric `timestamp` → `now`
    /// - missing/empty `domain`, or one with an empty segment → [`UNKNOWN_DOMAIN`]
    /// - non-array `args` → wrapped into a single-element list
    /// - missing `error` → `placeholder()`
    /// - every other property is preserved in `extra`
    pub fn from_value(value: Value, now: i64, placeholder: impl FnOnce() -> CallStack) -> Self {
        let mut fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let timestamp = fields
            .remove("timestamp")
            .and_then(|ts| ts.as_i64().or_else(|| ts.as_f64().map(|f| f as i64)))
            .unwrap_or(now);

        let domain = fields
            .remove("domain")
            .and_then(|d| d.as_str().map(str::to_string))
            .filter(|d| is_valid_name(d))
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string());

        let args = match fields.remove("args") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Null],
        };

        let error = match fields.remove("error") {
            Some(Value::Null) | None => placeholder(),
            Some(raw) => CallStack::from_value(&raw),
        };

        let structured = match fields.remove("structured") {
            Some(Value::Object(map)) => Some(map),
            _ => None,
        };

        Self {
            timestamp,
            domain,
            args,
            error,
            structured,
            extra: fields,
        }
    }

    /// Structured metadata, empty when the trace carries none.
    pub fn structured_or_empty(&self) -> Map<String, Value> {
        self.structured.clone().unwrap_or_default()
    }
}

/// Pull structured metadata out of call arguments.
///
/// The last argument that is an object with an object-valued `structured`
/// key wins: `bug("saved", json!({"structured": {"severity": "high"}}))`.
pub fn extract_structured(args: &[Value]) -> Option<Map<String, Value>> {
    args.iter()
        .rev()
        .find_map(|arg| arg.get("structured").and_then(Value::as_object).cloned())
}

/// Guarantee a `structured` mapping is present on the trace.
pub fn parse_structured(mut trace: Trace) -> Trace {
    if trace.structured.is_none() {
        trace.structured = Some(Map::new());
    }
    trace
}

/// Keep only traces whose structured metadata has `key == value`.
pub fn filter_structured(traces: &[Trace], key: &str, value: &Value) -> Vec<Trace> {
    traces
        .iter()
        .filter(|trace| {
            trace
                .structured
                .as_ref()
                .and_then(|map| map.get(key))
                .is_some_and(|found| found == value)
        })
        .cloned()
        .collect()
}

/// Parse serialized trace text into untyped trace objects.
pub fn parse_trace_text(text: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text)?;
    into_trace_values(value)
}

/// Unwrap an already-parsed payload into its trace objects.
pub fn into_trace_values(value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(Error::TracesNotArray),
    }
}
