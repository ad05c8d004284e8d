use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Display-oriented view of a trace produced by `decode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTrace {
    /// Fresh unique id (UUID v4), not stable across decodes
    pub id: String,

    /// RFC 3339 timestamp with millisecond precision
    pub timestamp: String,

    pub domain: String,
    pub args: Vec<Value>,

    /// Parsed frames, innermost first; never absent, possibly empty
    pub stack: Vec<StackFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub function: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}
