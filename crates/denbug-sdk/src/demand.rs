use denbug_engine::Error as EngineError;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::handle::DomainHandle;

const FAILURE_PREFIX: &str = "Assertion failed";

/// Assertion bound to a domain.
///
/// A failed check records `"Assertion failed", args...` on the domain (when
/// enabled) and returns [`EngineError::AssertionFailed`].
#[derive(Debug, Clone)]
pub struct Demand {
    handle: DomainHandle,
}

impl Demand {
    pub(crate) fn new(handle: DomainHandle) -> Self {
        Self { handle }
    }

    pub fn domain(&self) -> &DomainHandle {
        &self.handle
    }

    pub fn check(&self, condition: bool, args: Vec<Value>) -> Result<()> {
        if condition {
            return Ok(());
        }

        let message = render(&args);
        let mut recorded = Vec::with_capacity(args.len() + 1);
        recorded.push(Value::String(FAILURE_PREFIX.to_string()));
        recorded.extend(args);
        self.handle.call(recorded);

        Err(Error::Engine(EngineError::AssertionFailed {
            domain: self.handle.name().to_string(),
            message,
        }))
    }

    /// Check an untyped condition.
    ///
    /// With contracts on the condition must be a boolean. With contracts off
    /// it is coerced: `null`, `false`, `0` and `""` fail, everything else
    /// passes.
    pub fn check_value(&self, condition: &Value, args: Vec<Value>) -> Result<()> {
        if self.handle.engine().contracts_enabled() && !condition.is_boolean() {
            return Err(Error::Engine(EngineError::Contract(
                "demand requires a boolean condition".to_string(),
            )));
        }
        self.check(truthy(condition), args)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(args: &[Value]) -> String {
    if args.is_empty() {
        return FAILURE_PREFIX.to_string();
    }
    args.iter()
        .map(|arg| match arg {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
