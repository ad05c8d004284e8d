use denbug_engine::ECHO_TARGET;
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::Denbug;
use crate::error::Result;

/// Domains fed by [`ConsoleMirror`], one per log level.
pub const CONSOLE_DOMAINS: [&str; 5] = ["error", "warn", "info", "debug", "log"];

/// `tracing` layer that records every event as a trace on its level's domain.
///
/// | Level | Domain  |
/// |-------|---------|
/// | ERROR | `error` |
/// | WARN  | `warn`  |
/// | INFO  | `info`  |
/// | DEBUG | `debug` |
/// | TRACE | `log`   |
///
/// The message is the first argument, remaining fields follow as one object.
/// Echo output (`denbug::echo`) and the engine's own diagnostics
/// (`denbug_engine::*`) are skipped. The latter may be emitted while the
/// registry lock is held.
///
/// ```
/// use denbug_sdk::{ConsoleMirror, Denbug};
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let denbug = Denbug::new();
/// let subscriber = tracing_subscriber::registry().with(ConsoleMirror::new(&denbug).unwrap());
/// tracing::subscriber::with_default(subscriber, || tracing::warn!(disk = "full", "low space"));
/// assert_eq!(denbug.traces()[0].domain, "warn");
/// ```
#[derive(Debug, Clone)]
pub struct ConsoleMirror {
    denbug: Denbug,
}

impl ConsoleMirror {
    /// Register the level domains and build the layer.
    pub fn new(denbug: &Denbug) -> Result<Self> {
        for name in CONSOLE_DOMAINS {
            denbug.engine().create_domain(name)?;
        }
        Ok(Self {
            denbug: denbug.clone(),
        })
    }

    pub fn domain_for(level: &Level) -> &'static str {
        match *level {
            Level::ERROR => "error",
            Level::WARN => "warn",
            Level::INFO => "info",
            Level::DEBUG => "debug",
            Level::TRACE => "log",
        }
    }
}

impl<S: Subscriber> Layer<S> for ConsoleMirror {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) {
            return;
        }

        let domain = Self::domain_for(metadata.level());
        if !self.denbug.enabled(domain) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut args = vec![Value::String(visitor.message)];
        if !visitor.fields.is_empty() {
            args.push(Value::Object(visitor.fields));
        }
        self.denbug.engine().record(domain, args);
    }
}

fn is_internal(target: &str) -> bool {
    target == ECHO_TARGET || target.starts_with("denbug_engine")
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::Bool(value));
    }
}
