//! denbug-sdk: hierarchical debug domains for Rust programs.
//!
//! # Overview
//!
//! A *domain* is a named debug channel such as `app:ui:button`. Domains form
//! a tree through their `:`-separated names; switching a parent off silences
//! every descendant without touching their own flags. Calling an enabled
//! domain records a trace (arguments plus call stack) into a bounded buffer
//! that can be filtered, decoded, exported and re-imported.
//!
//! # Quickstart
//!
//! ```
//! use denbug_sdk::{Denbug, trace};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let denbug = Denbug::new();
//! let ui = denbug.domain("app:ui")?;
//!
//! trace!(ui, "rendered", 3);
//! denbug.disable("app")?;
//! assert!(trace!(ui, "ignored").is_none());
//!
//! assert_eq!(denbug.traces().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Patterns
//!
//! ```
//! use denbug_sdk::Denbug;
//!
//! let denbug = Denbug::new();
//! denbug.apply_pattern("app:**");
//! denbug.apply_pattern("-app:ui");
//! assert!(denbug.enabled("app"));
//! assert!(!denbug.enabled("app:ui"));
//! ```
//!
//! # Architecture
//!
//! This SDK is a facade over:
//! - `denbug-types`: traces, events, snapshots and filter options
//! - `denbug-engine`: registry, pattern engine, trace buffer and event bus

pub mod config;
pub mod demand;
pub mod error;
pub mod handle;
pub mod mirror;

pub use demand::Demand;
pub use error::{Error, Result};
pub use handle::DomainHandle;
pub use mirror::{CONSOLE_DOMAINS, ConsoleMirror};

pub use denbug_engine::{
    Clock, EngineConfig, ManualClock, Pattern, PatternSet, Subscription, SystemClock,
    TraceOptions,
};
pub use denbug_types as types;

#[doc(hidden)]
pub use serde_json as __serde_json;

use denbug_engine::Engine;
use denbug_types::{DecodedTrace, Event, FilterOptions, Snapshot, Trace};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Record a trace with variadic arguments.
///
/// Each argument is one token tree converted with `serde_json::json!`:
/// a literal, a variable, or inline JSON. Wrap longer expressions in
/// parentheses. Evaluates to `Option<Trace>`, `None` when the domain is not
/// effectively enabled.
///
/// ```
/// # let denbug = denbug_sdk::Denbug::new();
/// let db = denbug.domain("db").unwrap();
/// let trace = denbug_sdk::trace!(db, "query", {"rows": 3}).unwrap();
/// assert_eq!(trace.args[1]["rows"], 3);
/// ```
#[macro_export]
macro_rules! trace {
    ($handle:expr $(, $arg:tt)* $(,)?) => {
        $handle.call(vec![$($crate::__serde_json::json!($arg)),*])
    };
}

static GLOBAL: LazyLock<Denbug> = LazyLock::new(|| {
    let denbug = Denbug::new();
    config::apply_env(&denbug);
    denbug
});

/// Process-wide default instance. `DENBUG` is applied on first access.
pub fn global() -> &'static Denbug {
    &GLOBAL
}

/// Entry point: a cloneable handle to one domain registry and trace buffer.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct Denbug {
    engine: Engine,
}

impl Denbug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> DenbugBuilder {
        DenbugBuilder::default()
    }

    pub fn from_engine(engine: Engine) -> Self {
        Self { engine }
    }

    /// Lower-level engine API.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Create (if needed) and return a callable handle for `name`.
    pub fn domain(&self, name: &str) -> Result<DomainHandle> {
        DomainHandle::open(&self.engine, name)
    }

    pub fn demand(&self, name: &str) -> Result<Demand> {
        Ok(Demand::new(self.domain(name)?))
    }

    pub fn enable(&self, name: &str) -> Result<()> {
        Ok(self.engine.enable(name)?)
    }

    pub fn enable_all<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.engine.enable_all(names)?)
    }

    pub fn disable(&self, name: &str) -> Result<()> {
        Ok(self.engine.disable(name)?)
    }

    pub fn disable_all<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.engine.disable_all(names)?)
    }

    pub fn state(&self, name: &str) -> Option<bool> {
        self.engine.state(name)
    }

    pub fn set_state(&self, name: &str, local: bool) -> Result<()> {
        Ok(self.engine.set_state(name, local)?)
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.engine.enabled(name)
    }

    pub fn domains(&self) -> Vec<String> {
        self.engine.domains()
    }

    pub fn flag(&self, name: &str, setter: impl Fn(bool) + Send + Sync + 'static) -> Result<()> {
        Ok(self.engine.flag(name, setter)?)
    }

    pub fn configure(&self, options: TraceOptions) {
        self.engine.configure(options);
    }

    pub fn traces(&self) -> Vec<Trace> {
        self.engine.traces()
    }

    pub fn clear(&self) {
        self.engine.clear();
    }

    pub fn decode(&self, trace: &Trace) -> DecodedTrace {
        self.engine.decode(trace)
    }

    pub fn filter(&self, traces: &[Trace], options: &FilterOptions) -> Vec<Trace> {
        self.engine.filter(traces, options)
    }

    pub fn post(&self, text: &str) -> Result<Vec<Trace>> {
        Ok(self.engine.post(text)?)
    }

    pub fn load_traces(&self, value: Value) -> Result<Vec<Trace>> {
        Ok(self.engine.load_traces(value)?)
    }

    pub fn subscribe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> Subscription {
        self.engine.subscribe(listener)
    }

    pub fn publish(&self, name: &str, payload: Value) {
        self.engine.publish(name, payload);
    }

    pub fn save(&self) -> Snapshot {
        self.engine.save()
    }

    pub fn load(&self, value: &Value) -> Result<()> {
        Ok(self.engine.load(value)?)
    }

    pub fn load_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        Ok(self.engine.load_snapshot(snapshot)?)
    }

    /// Restore from a `.toml` or `.json` snapshot file.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let value = config::load_file(path.as_ref())?;
        self.load(&value)
    }

    /// Write the current state to a `.toml` or `.json` snapshot file.
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        config::save_file(path.as_ref(), &self.save())
    }

    pub fn apply_pattern(&self, pattern: &str) {
        self.engine.apply_pattern(pattern);
    }

    pub fn apply_patterns(&self, set: &PatternSet) {
        self.engine.apply_patterns(set);
    }

    pub fn reset(&self) {
        self.engine.reset();
    }

    pub fn contracts_enabled(&self) -> bool {
        self.engine.contracts_enabled()
    }

    pub fn set_contracts_enabled(&self, enabled: bool) {
        self.engine.set_contracts_enabled(enabled);
    }
}

/// Builder for [`Denbug`].
#[derive(Default)]
pub struct DenbugBuilder {
    config: EngineConfig,
    clock: Option<Arc<dyn Clock>>,
    patterns: Vec<String>,
    from_env: bool,
}

impl DenbugBuilder {
    pub fn max_traces(mut self, max_traces: usize) -> Self {
        self.config = self.config.max_traces(max_traces);
        self
    }

    pub fn contracts(mut self, enabled: bool) -> Self {
        self.config = self.config.contracts(enabled);
        self
    }

    pub fn capture_stacks(mut self, enabled: bool) -> Self {
        self.config = self.config.capture_stacks(enabled);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Pattern applied right after construction, in call order.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Apply the `DENBUG` environment variable after explicit patterns.
    pub fn from_env(mut self) -> Self {
        self.from_env = true;
        self
    }

    pub fn build(self) -> Denbug {
        let engine = match self.clock {
            Some(clock) => Engine::with_clock(self.config, clock),
            None => Engine::new(self.config),
        };
        let denbug = Denbug::from_engine(engine);

        for pattern in &self.patterns {
            denbug.apply_pattern(pattern);
        }
        if self.from_env {
            config::apply_env(&denbug);
        }
        denbug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_macro_accepts_mixed_arguments() {
        let denbug = Denbug::builder().capture_stacks(false).build();
        let handle = denbug.domain("macro").unwrap();
        let count = 2;

        let trace = trace!(handle, "text", count, [1, 2], {"k": "v"}, null,).unwrap();
        assert_eq!(
            trace.args,
            vec![json!("text"), json!(2), json!([1, 2]), json!({"k": "v"}), json!(null)]
        );
        assert_eq!(trace!(handle).unwrap().args, Vec::<Value>::new());
    }

    #[test]
    fn test_builder_applies_patterns() {
        let denbug = Denbug::builder()
            .max_traces(5)
            .pattern("svc:**")
            .pattern("-svc:noisy")
            .build();

        assert_eq!(denbug.engine().max_traces(), 5);
        assert!(denbug.enabled("svc"));
        assert!(!denbug.enabled("svc:noisy"));
    }

    #[test]
    fn test_clones_share_state() {
        let denbug = Denbug::new();
        let other = denbug.clone();
        denbug.domain("shared").unwrap();
        assert_eq!(other.domains(), vec!["shared", "shared:echo"]);
    }

    #[test]
    fn test_global_is_singleton() {
        assert!(std::ptr::eq(global(), global()));
    }
}
