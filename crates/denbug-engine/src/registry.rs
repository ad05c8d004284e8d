use denbug_types::{
    Event, ancestor_paths, echo_name, is_echo, is_valid_name, is_within, parent_name,
};
use std::collections::HashMap;
use std::sync::Arc;

// NOTE: Registry layout
//
// Flat namespace keyed by full path, plus a creation-ordered name list.
// There are no parent/child pointers: descendants of `x` are the names equal
// to `x` or starting with `x:`. Ancestors are always created before their
// descendants, so a single forward pass over `order` visits every parent
// before its children. That is what lets `recompute` derive effective state
// in one sweep.
//
// Mutations never call out. They append `Notification`s to an outbox that the
// engine drains after releasing the registry lock, so setters and listeners
// are free to call back into the engine.

/// Observer invoked with a domain's new effective state.
pub type Setter = Arc<dyn Fn(bool) + Send + Sync>;

/// Side effect produced by a registry mutation, delivered after unlock.
#[derive(Clone)]
pub enum Notification {
    Event(Event),
    Setter(Setter, bool),
}

struct DomainState {
    local: bool,
    effective: bool,
    setters: Vec<Setter>,
}

#[derive(Default)]
pub struct Registry {
    order: Vec<String>,
    domains: HashMap<String, DomainState>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All domain names in creation order.
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Local flag, `None` for unknown domains.
    pub fn local(&self, name: &str) -> Option<bool> {
        self.domains.get(name).map(|state| state.local)
    }

    /// Effective flag, false for unknown domains.
    pub fn effective(&self, name: &str) -> bool {
        self.domains.get(name).is_some_and(|state| state.effective)
    }

    /// Effective state of the implicit or explicit parent. Roots hang off an
    /// always-enabled implicit parent.
    fn parent_effective(&self, name: &str) -> bool {
        parent_name(name).is_none_or(|parent| self.effective(parent))
    }

    /// Create `name`, its missing ancestors, and their echo companions.
    ///
    /// Creation order for `a:b` on an empty registry is
    /// `a, a:echo, a:b, a:b:echo`. Invalid names (empty segments) register
    /// nothing.
    pub fn ensure(&mut self, name: &str, out: &mut Vec<Notification>) {
        if !is_valid_name(name) {
            tracing::debug!(domain = name, "refusing invalid domain name");
            return;
        }
        for path in ancestor_paths(name) {
            if self.contains(path) {
                continue;
            }
            self.insert(path, out);
            if !is_echo(path) {
                let echo = echo_name(path);
                if !self.contains(&echo) {
                    self.insert(&echo, out);
                }
            }
        }
    }

    fn insert(&mut self, name: &str, out: &mut Vec<Notification>) {
        let effective = self.parent_effective(name);
        tracing::debug!(domain = name, effective, "domain created");
        self.domains.insert(
            name.to_string(),
            DomainState {
                local: true,
                effective,
                setters: Vec::new(),
            },
        );
        self.order.push(name.to_string());
        out.push(Notification::Event(Event::DomainCreated {
            domain: name.to_string(),
        }));
    }

    /// Enable `name`, walking from its root down.
    ///
    /// Each level is switched on only when its parent is already effectively
    /// enabled; walking top-down, every level's parent has just been
    /// reconciled, so the whole path ends up on. Only levels whose local flag
    /// was off are touched.
    pub fn enable(&mut self, name: &str, out: &mut Vec<Notification>) {
        self.ensure(name, out);

        for path in ancestor_paths(name) {
            if self.local(path) == Some(false) && self.parent_effective(path) {
                self.write_local(path, true, out);
                self.recompute(path, out);
            }
        }

        self.recompute(name, out);
    }

    /// Switch off `name`'s own flag if it is currently effectively enabled.
    /// Ancestors are never touched.
    pub fn disable(&mut self, name: &str, out: &mut Vec<Notification>) {
        self.ensure(name, out);

        if self.effective(name) {
            self.write_local(name, false, out);
            self.recompute(name, out);
        }
    }

    /// Set the local flag directly. Returns true when the value changed.
    pub fn set_local(&mut self, name: &str, local: bool, out: &mut Vec<Notification>) -> bool {
        self.ensure(name, out);

        if self.local(name) == Some(local) {
            return false;
        }
        self.write_local(name, local, out);
        self.recompute(name, out);
        true
    }

    fn write_local(&mut self, name: &str, local: bool, out: &mut Vec<Notification>) {
        if let Some(state) = self.domains.get_mut(name) {
            state.local = local;
            tracing::debug!(domain = name, local, "local state changed");
            out.push(Notification::Event(Event::StateChanged {
                domain: name.to_string(),
                local,
            }));
        }
    }

    /// Re-derive effective state for `root` and every descendant.
    ///
    /// Every descendant is reconsidered, not just those whose local flag
    /// moved, because an ancestor flip changes the whole chain below it.
    pub fn recompute(&mut self, root: &str, out: &mut Vec<Notification>) {
        let subtree: Vec<String> = self
            .order
            .iter()
            .filter(|name| is_within(name, root))
            .cloned()
            .collect();

        tracing::trace!(root, size = subtree.len(), "recomputing effective state");

        for name in subtree {
            let parent = self.parent_effective(&name);
            let Some(state) = self.domains.get_mut(&name) else {
                continue;
            };

            let effective = state.local && parent;
            if effective == state.effective {
                continue;
            }

            state.effective = effective;
            out.push(Notification::Event(Event::EffectiveStateChanged {
                domain: name.clone(),
                effective,
            }));
            out.extend(
                state
                    .setters
                    .iter()
                    .map(|setter| Notification::Setter(setter.clone(), effective)),
            );
        }
    }

    /// Attach an observer. Returns the current effective state, which the
    /// caller delivers to the setter once.
    pub fn add_setter(&mut self, name: &str, setter: Setter, out: &mut Vec<Notification>) -> bool {
        self.ensure(name, out);

        let effective = self.effective(name);
        if let Some(state) = self.domains.get_mut(name) {
            state.setters.push(setter);
        }
        effective
    }

    /// Find the first domain at or below `root` that breaks
    /// `effective == local && parent.effective`.
    pub fn find_inconsistency(&self, root: &str) -> Option<String> {
        self.order
            .iter()
            .filter(|name| is_within(name, root))
            .find(|name| {
                let state = &self.domains[name.as_str()];
                state.effective != (state.local && self.parent_effective(name))
            })
            .cloned()
    }

    /// Drop every domain.
    pub fn clear(&mut self) {
        self.order.clear();
        self.domains.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn registry_with(names: &[&str]) -> Registry {
        let mut registry = Registry::new();
        let mut out = Vec::new();
        for name in names {
            registry.ensure(name, &mut out);
        }
        registry
    }

    #[test]
    fn test_ensure_ignores_empty_segments() {
        let registry = registry_with(&[":x", "a::b", "a:", ""]);
        assert!(registry.is_empty());
    }

    fn events(out: &[Notification]) -> Vec<(String, String)> {
        out.iter()
            .filter_map(|n| match n {
                Notification::Event(event) => Some((
                    event.name().to_string(),
                    event.domain().unwrap_or_default().to_string(),
                )),
                Notification::Setter(..) => None,
            })
            .collect()
    }

    #[test]
    fn test_creation_order_with_echoes() {
        let registry = registry_with(&["a:b:c"]);
        assert_eq!(
            registry.names(),
            &["a", "a:echo", "a:b", "a:b:echo", "a:b:c", "a:b:c:echo"]
        );
    }

    #[test]
    fn test_echo_domain_has_no_echo() {
        let registry = registry_with(&["x:echo"]);
        assert_eq!(registry.names(), &["x", "x:echo"]);
    }

    #[test]
    fn test_child_created_under_disabled_parent() {
        let mut registry = Registry::new();
        let mut out = Vec::new();
        registry.disable("parent", &mut out);
        registry.ensure("parent:child", &mut out);

        assert_eq!(registry.local("parent:child"), Some(true));
        assert!(!registry.effective("parent:child"));
    }

    #[test]
    fn test_disable_cascades_and_enable_restores() {
        let mut registry = registry_with(&["app:feature:subA", "app:feature:subB"]);
        let mut out = Vec::new();

        registry.disable("app", &mut out);
        assert!(!registry.effective("app:feature:subA"));
        assert!(!registry.effective("app:feature:subB"));
        assert_eq!(registry.local("app:feature:subA"), Some(true));

        registry.enable("app", &mut out);
        assert!(registry.effective("app:feature:subA"));
        assert!(registry.effective("app:feature:subB"));
        assert!(registry.find_inconsistency("app").is_none());
    }

    #[test]
    fn test_enable_walks_broken_chain() {
        let mut registry = registry_with(&["a:b:c"]);
        let mut out = Vec::new();
        registry.set_local("a", false, &mut out);
        registry.set_local("a:b", false, &mut out);

        registry.enable("a:b:c", &mut out);

        assert_eq!(registry.local("a"), Some(true));
        assert_eq!(registry.local("a:b"), Some(true));
        assert!(registry.effective("a:b:c"));
    }

    #[test]
    fn test_disable_is_noop_when_already_effectively_off() {
        let mut registry = registry_with(&["a:b"]);
        let mut out = Vec::new();
        registry.disable("a", &mut out);
        out.clear();

        registry.disable("a:b", &mut out);

        assert_eq!(registry.local("a:b"), Some(true));
        assert!(out.is_empty());
    }

    #[test]
    fn test_set_local_under_disabled_parent() {
        let mut registry = registry_with(&["a:b:c"]);
        let mut out = Vec::new();
        registry.disable("a:b", &mut out);

        assert!(!registry.set_local("a:b:c", true, &mut out));
        assert_eq!(registry.local("a:b:c"), Some(true));
        assert!(!registry.effective("a:b:c"));
    }

    #[test]
    fn test_notifications_for_disable() {
        let mut registry = registry_with(&["test"]);
        let mut out = Vec::new();
        registry.disable("test", &mut out);

        assert_eq!(
            events(&out),
            vec![
                ("stateChanged".to_string(), "test".to_string()),
                ("effectiveStateChanged".to_string(), "test".to_string()),
                ("effectiveStateChanged".to_string(), "test:echo".to_string()),
            ]
        );
    }

    #[test]
    fn test_setters_receive_effective_changes() {
        let mut registry = registry_with(&["flag-test:child"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut out = Vec::new();

        let initial = registry.add_setter(
            "flag-test:child",
            Arc::new(move |value| sink.lock().unwrap().push(value)),
            &mut out,
        );
        assert!(initial);

        registry.disable("flag-test", &mut out);
        registry.enable("flag-test", &mut out);

        for notification in out {
            if let Notification::Setter(setter, value) = notification {
                setter(value);
            }
        }
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn test_sibling_prefix_is_not_descendant() {
        let mut registry = registry_with(&["app", "apple"]);
        let mut out = Vec::new();
        registry.disable("app", &mut out);
        assert!(registry.effective("apple"));
    }
}
