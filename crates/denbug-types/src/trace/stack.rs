use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

// NOTE: Call stacks are captured eagerly but rendered lazily.
// `Backtrace::force_capture` only walks the stack; symbol resolution happens
// the first time the backtrace is formatted. Traces that are never decoded or
// exported never pay for resolution.

/// Opaque call-stack snapshot attached to every trace.
///
/// Either a native backtrace captured in-process, or raw frame lines that came
/// in with an imported trace. Parsing into structured frames is deferred to
/// decode time.
#[derive(Clone)]
pub enum CallStack {
    Captured(Arc<Backtrace>),
    Frames(Vec<String>),
}

impl CallStack {
    /// Capture the current thread's stack.
    pub fn capture() -> Self {
        CallStack::Captured(Arc::new(Backtrace::force_capture()))
    }

    /// A stack with no frames, used when capture is switched off.
    pub fn empty() -> Self {
        CallStack::Frames(Vec::new())
    }

    /// Split stack text (one frame per line) into raw frames.
    pub fn from_stack_text(text: &str) -> Self {
        CallStack::Frames(text.lines().map(str::to_string).collect())
    }

    /// Interpret an imported `error` property.
    ///
    /// Accepts `{"stack": "..."}` or a bare string; any other value yields an
    /// empty stack rather than an error.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(text) => Self::from_stack_text(text),
            Value::Object(map) => map
                .get("stack")
                .and_then(Value::as_str)
                .map(Self::from_stack_text)
                .unwrap_or_else(Self::empty),
            _ => Self::empty(),
        }
    }

    /// Raw frame lines.
    ///
    /// Native frames are rendered as `symbol at file:line:column`, or just
    /// `symbol` when the location is unknown.
    pub fn frames(&self) -> Vec<String> {
        match self {
            CallStack::Captured(backtrace) => native_frames(&backtrace.to_string()),
            CallStack::Frames(frames) => frames.clone(),
        }
    }

    pub fn to_stack_text(&self) -> String {
        self.frames().join("\n")
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStack::Captured(_) => f.write_str("CallStack::Captured(..)"),
            CallStack::Frames(frames) => f.debug_tuple("CallStack::Frames").field(frames).finish(),
        }
    }
}

impl Serialize for CallStack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("stack", &self.to_stack_text())?;
        map.end()
    }
}

/// Fold std's backtrace rendering into one line per frame.
///
/// std renders frames as
/// ```text
///    3: my_crate::module::function
///              at ./src/module.rs:12:5
/// ```
fn native_frames(rendered: &str) -> Vec<String> {
    let mut frames: Vec<String> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();

        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(last) = frames.last_mut()
                && !last.contains(" at ")
            {
                last.push_str(" at ");
                last.push_str(location);
            }
            continue;
        }

        if let Some((index, symbol)) = trimmed.split_once(": ")
            && !index.is_empty()
            && index.chars().all(|c| c.is_ascii_digit())
        {
            frames.push(symbol.to_string());
        }
    }

    frames
}
