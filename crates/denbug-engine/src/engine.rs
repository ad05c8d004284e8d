use denbug_types::{
    CallStack, DecodedTrace, DomainSnapshot, Event, FilterOptions, SEPARATOR, SNAPSHOT_VERSION,
    Snapshot, Trace, echo_name, into_trace_values, is_echo, parse_trace_text,
};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::buffer::{self, TraceBuffer};
use crate::bus::{Bus, Subscription};
use crate::clock::{Clock, SystemClock};
use crate::config::{EngineConfig, TraceOptions};
use crate::contracts::Contracts;
use crate::error::Result;
use crate::pattern::{self, PatternSet, parse_or_log};
use crate::registry::{Notification, Registry, Setter};
use crate::snapshot::{self, LoadPlan};

/// `tracing` target used when an echo domain mirrors a trace.
pub const ECHO_TARGET: &str = "denbug::echo";

struct Inner {
    registry: Mutex<Registry>,
    buffer: Mutex<TraceBuffer>,
    bus: Bus,
    contracts: Contracts,
    capture_stacks: AtomicBool,
    clock: Arc<dyn Clock>,
}

/// Domain registry, trace buffer and event bus behind one cloneable handle.
///
/// Clones share state. Registry mutations run under the registry lock and
/// queue their notifications; bus events and setter calls are delivered after
/// the lock is released, in the order they were produced.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("domains", &self.registry().len())
            .field("traces", &self.buffer().len())
            .field("contracts", &self.contracts_enabled())
            .finish()
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::new()),
                buffer: Mutex::new(TraceBuffer::new(config.max_traces)),
                bus: Bus::new(),
                contracts: Contracts::new(config.contracts),
                capture_stacks: AtomicBool::new(config.capture_stacks),
                clock,
            }),
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn buffer(&self) -> MutexGuard<'_, TraceBuffer> {
        self.inner
            .buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` under the registry lock, then deliver what it queued.
    fn update<T>(&self, f: impl FnOnce(&mut Registry, &mut Vec<Notification>) -> T) -> T {
        let mut out = Vec::new();
        let result = {
            let mut registry = self.registry();
            f(&mut registry, &mut out)
        };
        self.dispatch(out);
        result
    }

    fn dispatch(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            match notification {
                Notification::Event(event) => self.inner.bus.publish(&event),
                Notification::Setter(setter, value) => setter(value),
            }
        }
    }

    /// Subtree consistency check, only evaluated with contracts on.
    fn verify(&self, registry: &Registry, root: &str) -> Result<()> {
        if !self.contracts_enabled() {
            return Ok(());
        }
        let broken = registry.find_inconsistency(root);
        self.inner.contracts.require(broken.is_none(), || {
            format!(
                "effective state of {:?} disagrees with its parent",
                broken.unwrap_or_default()
            )
        })
    }

    // --- Domains ---

    /// Register `name` with its ancestors and echo companions.
    ///
    /// Returns false when the name was skipped (empty, contracts off).
    pub fn create_domain(&self, name: &str) -> Result<bool> {
        if !self.inner.contracts.domain_name(name)? {
            return Ok(false);
        }
        self.update(|registry, out| registry.ensure(name, out));
        Ok(true)
    }

    /// Enable `name` and, where needed, its ancestors.
    ///
    /// `-name` disables instead. Names containing `*`, negated or not, are
    /// applied as patterns.
    pub fn enable(&self, name: &str) -> Result<()> {
        if name.contains('*') {
            self.apply_pattern(name);
            return Ok(());
        }
        if let Some(target) = name.strip_prefix('-') {
            return self.disable(target);
        }
        if !self.inner.contracts.domain_name(name)? {
            return Ok(());
        }

        self.update(|registry, out| {
            registry.enable(name, out);
            self.inner.contracts.require(registry.effective(name), || {
                format!("{:?} must be effectively enabled after enable", name)
            })?;
            self.verify(registry, name)
        })
    }

    pub fn enable_all<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.enable(name.as_ref())?;
        }
        Ok(())
    }

    /// Turn off `name`'s own flag. Descendants go dark through propagation.
    ///
    /// Names containing `*` are applied as negated patterns.
    pub fn disable(&self, name: &str) -> Result<()> {
        if name.contains('*') {
            self.apply_pattern(&format!("-{}", name));
            return Ok(());
        }
        if !self.inner.contracts.domain_name(name)? {
            return Ok(());
        }

        self.update(|registry, out| {
            registry.disable(name, out);
            self.inner.contracts.require(!registry.effective(name), || {
                format!("{:?} must be effectively disabled after disable", name)
            })?;
            self.verify(registry, name)
        })
    }

    pub fn disable_all<I, S>(&self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.disable(name.as_ref())?;
        }
        Ok(())
    }

    /// Local flag, `None` for unknown domains.
    pub fn state(&self, name: &str) -> Option<bool> {
        self.registry().local(name)
    }

    pub fn set_state(&self, name: &str, local: bool) -> Result<()> {
        if !self.inner.contracts.domain_name(name)? {
            return Ok(());
        }

        self.update(|registry, out| {
            registry.set_local(name, local, out);
            if !local {
                self.inner.contracts.require(!registry.effective(name), || {
                    format!("{:?} must be effectively disabled after set_state(false)", name)
                })?;
            }
            self.verify(registry, name)
        })
    }

    /// Effective state, false for unknown domains.
    pub fn enabled(&self, name: &str) -> bool {
        self.registry().effective(name)
    }

    pub fn effective_state(&self, name: &str) -> bool {
        self.enabled(name)
    }

    /// Every registered name in creation order.
    pub fn domains(&self) -> Vec<String> {
        self.registry().names().to_vec()
    }

    /// Watch a domain's effective state.
    ///
    /// `setter` is called once right away with the current value and again on
    /// every effective change.
    pub fn flag(&self, name: &str, setter: impl Fn(bool) + Send + Sync + 'static) -> Result<()> {
        if !self.inner.contracts.domain_name(name)? {
            return Ok(());
        }

        let setter: Setter = Arc::new(setter);
        let current = self.update(|registry, out| registry.add_setter(name, setter.clone(), out));
        setter(current);
        Ok(())
    }

    // --- Traces ---

    /// Record a trace on `name` if it is effectively enabled.
    pub fn record(&self, name: &str, args: Vec<Value>) -> Option<Trace> {
        if !self.enabled(name) {
            return None;
        }

        let trace = Trace::new(name, args, self.inner.clock.now_millis(), self.call_stack());
        self.buffer().push(trace.clone());
        self.inner.bus.publish(&Event::Trace(trace.clone()));
        self.echo(&trace);
        Some(trace)
    }

    fn call_stack(&self) -> CallStack {
        if self.inner.capture_stacks.load(Ordering::Relaxed) {
            CallStack::capture()
        } else {
            CallStack::empty()
        }
    }

    /// Mirror a trace to `tracing` when its echo domain is on.
    fn echo(&self, trace: &Trace) {
        let echo = if is_echo(&trace.domain) {
            trace.domain.clone()
        } else {
            echo_name(&trace.domain)
        };

        if self.enabled(&echo) {
            let args = Value::Array(trace.args.clone());
            tracing::debug!(target: ECHO_TARGET, domain = %trace.domain, %args, "trace");
        }
    }

    pub fn configure(&self, options: TraceOptions) {
        if let Some(max_traces) = options.max_traces {
            tracing::debug!(max_traces, "trace capacity changed");
            self.buffer().set_max_traces(max_traces);
        }
        if let Some(capture) = options.capture_stacks {
            self.inner.capture_stacks.store(capture, Ordering::Relaxed);
        }
    }

    pub fn max_traces(&self) -> usize {
        self.buffer().max_traces()
    }

    /// Copy of the buffer, oldest first.
    pub fn traces(&self) -> Vec<Trace> {
        self.buffer().snapshot()
    }

    pub fn clear(&self) {
        self.buffer().clear();
        self.inner.bus.publish(&Event::Cleared);
    }

    pub fn decode(&self, trace: &Trace) -> DecodedTrace {
        buffer::decode(trace)
    }

    /// Filter `traces`; `enabled_only` is answered from the live registry.
    pub fn filter(&self, traces: &[Trace], options: &FilterOptions) -> Vec<Trace> {
        let registry = self.registry();
        buffer::filter(traces, options, |domain| registry.effective(domain))
    }

    /// Import traces from JSON text (an array of trace objects).
    pub fn post(&self, text: &str) -> Result<Vec<Trace>> {
        let values = parse_trace_text(text)?;
        Ok(self.import(values))
    }

    /// Import traces from an already-parsed JSON array.
    pub fn load_traces(&self, value: Value) -> Result<Vec<Trace>> {
        let values = into_trace_values(value)?;
        Ok(self.import(values))
    }

    fn import(&self, values: Vec<Value>) -> Vec<Trace> {
        let now = self.inner.clock.now_millis();
        let traces: Vec<Trace> = values
            .into_iter()
            .map(|value| Trace::from_value(value, now, || self.call_stack()))
            .collect();

        self.update(|registry, out| {
            for trace in &traces {
                registry.ensure(&trace.domain, out);
            }
        });
        self.buffer().extend(traces.iter().cloned());

        tracing::debug!(count = traces.len(), "imported traces");
        traces
    }

    // --- Events ---

    pub fn subscribe(&self, listener: impl Fn(&Event) + Send + Sync + 'static) -> Subscription {
        self.inner.bus.subscribe(listener)
    }

    /// Broadcast an application-defined event.
    pub fn publish(&self, name: &str, payload: Value) {
        self.inner.bus.publish(&Event::Custom {
            name: name.to_string(),
            payload,
        });
    }

    // --- Snapshots ---

    pub fn save(&self) -> Snapshot {
        let registry = self.registry();
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: self.inner.clock.now_millis(),
            max_traces: self.max_traces(),
            domains: registry
                .names()
                .iter()
                .map(|name| DomainSnapshot {
                    name: name.clone(),
                    local_state: registry.local(name).unwrap_or(true),
                })
                .collect(),
        }
    }

    /// Restore from an untyped snapshot. Shape errors fail only with
    /// contracts on.
    pub fn load(&self, value: &Value) -> Result<()> {
        let plan = snapshot::plan(value, self.contracts_enabled())?;
        self.apply_plan(plan)
    }

    pub fn load_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.apply_plan(LoadPlan::from(snapshot))
    }

    fn apply_plan(&self, plan: LoadPlan) -> Result<()> {
        if let Some(max_traces) = plan.max_traces {
            self.configure(TraceOptions::max_traces(max_traces));
        }

        self.update(|registry, out| {
            for (name, _) in &plan.domains {
                registry.ensure(name, out);
            }
            for (name, local) in &plan.domains {
                registry.set_local(name, *local, out);
            }

            let roots: Vec<String> = registry
                .names()
                .iter()
                .filter(|name| !name.contains(SEPARATOR))
                .cloned()
                .collect();
            roots.iter().try_for_each(|root| self.verify(registry, root))
        })
    }

    // --- Patterns ---

    /// Apply one pattern. Malformed input is logged and ignored.
    pub fn apply_pattern(&self, raw: &str) {
        if let Some(pattern) = parse_or_log(raw) {
            self.update(|registry, out| pattern::apply(registry, &pattern, out));
        }
    }

    /// Reset every domain to off (echoes on) and apply `set`.
    pub fn apply_patterns(&self, set: &PatternSet) {
        self.update(|registry, out| pattern::apply_set(registry, set, out));
    }

    // --- Lifecycle ---

    /// Drop every domain (and its setters) and every trace. Subscribers stay.
    pub fn reset(&self) {
        self.registry().clear();
        self.buffer().clear();
        tracing::debug!("engine reset");
        self.inner.bus.publish(&Event::Reset);
    }

    pub fn contracts_enabled(&self) -> bool {
        self.inner.contracts.enabled()
    }

    pub fn set_contracts_enabled(&self, enabled: bool) {
        self.inner.contracts.set_enabled(enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default().capture_stacks(false))
    }

    #[test]
    fn test_empty_name_policy() {
        let engine = engine();
        assert!(matches!(
            engine.create_domain(""),
            Err(Error::InvalidDomainName(_))
        ));
        assert!(matches!(engine.enable(""), Err(Error::InvalidDomainName(_))));

        engine.set_contracts_enabled(false);
        assert!(!engine.create_domain("").unwrap());
        engine.enable("").unwrap();
        engine.set_state("", true).unwrap();
        assert!(engine.domains().is_empty());
        assert!(engine.record("", vec![json!("x")]).is_none());
    }

    #[test]
    fn test_enable_routes_negation_and_wildcards() {
        let engine = engine();
        engine.create_domain("app:ui").unwrap();

        engine.enable("-app").unwrap();
        assert!(!engine.enabled("app:ui"));

        engine.enable("app:**").unwrap();
        assert!(engine.enabled("app:ui"));
    }

    #[test]
    fn test_record_only_when_enabled() {
        let engine = engine();
        engine.create_domain("svc").unwrap();
        assert!(engine.record("svc", vec![json!(1)]).is_some());

        engine.disable("svc").unwrap();
        assert!(engine.record("svc", vec![json!(2)]).is_none());
        assert_eq!(engine.traces().len(), 1);
    }

    #[test]
    fn test_setter_can_reenter_engine() {
        let engine = engine();
        let probe = engine.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        engine
            .flag("flagged", move |value| {
                sink.lock().unwrap().push((value, probe.domains().len()));
            })
            .unwrap();
        engine.disable("flagged").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(true, 2), (false, 2)]);
    }

    #[test]
    fn test_debug_summary() {
        let engine = engine();
        engine.create_domain("a").unwrap();
        assert_eq!(
            format!("{:?}", engine),
            "Engine { domains: 2, traces: 0, contracts: true }"
        );
    }
}
