/// Default trace buffer capacity.
pub const DEFAULT_MAX_TRACES: usize = 1000;

/// Construction-time settings for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Trace buffer capacity
    pub max_traces: usize,

    /// Validate preconditions and check postconditions
    pub contracts: bool,

    /// Capture a call stack for every recorded trace
    pub capture_stacks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_traces: DEFAULT_MAX_TRACES,
            contracts: true,
            capture_stacks: true,
        }
    }
}

impl EngineConfig {
    pub fn max_traces(mut self, max_traces: usize) -> Self {
        self.max_traces = max_traces;
        self
    }

    pub fn contracts(mut self, enabled: bool) -> Self {
        self.contracts = enabled;
        self
    }

    pub fn capture_stacks(mut self, enabled: bool) -> Self {
        self.capture_stacks = enabled;
        self
    }
}

/// Runtime trace settings for `configure`. `None` leaves a setting unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub max_traces: Option<usize>,
    pub capture_stacks: Option<bool>,
}

impl TraceOptions {
    pub fn max_traces(max_traces: usize) -> Self {
        Self {
            max_traces: Some(max_traces),
            capture_stacks: None,
        }
    }
}
