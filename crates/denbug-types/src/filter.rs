use serde_json::{Map, Value};

/// Predicates for trace filtering. Every predicate that is set must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    /// Keep only traces whose domain is effectively enabled *now*
    pub enabled_only: bool,

    /// Unanchored glob against the domain name (`*` matches any run)
    pub pattern: Option<String>,

    /// Inclusive lower timestamp bound (ms)
    pub from: Option<i64>,

    /// Inclusive upper timestamp bound (ms)
    pub to: Option<i64>,

    /// Exact key/value matches against structured metadata
    pub structured: Option<Map<String, Value>>,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled_only(mut self) -> Self {
        self.enabled_only = true;
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn since(mut self, from: i64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn until(mut self, to: i64) -> Self {
        self.to = Some(to);
        self
    }

    pub fn structured(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.structured
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}
