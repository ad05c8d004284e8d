use serde_json::Value;

use crate::trace::Trace;

/// Lifecycle notification delivered to bus subscribers.
#[derive(Debug, Clone)]
pub enum Event {
    /// A domain (including ancestors and echo companions) was registered
    DomainCreated { domain: String },

    /// A domain's own local flag flipped
    StateChanged { domain: String, local: bool },

    /// A domain's derived effective state flipped
    EffectiveStateChanged { domain: String, effective: bool },

    /// A trace was recorded
    Trace(Trace),

    /// The trace buffer was emptied
    Cleared,

    /// Every domain and trace was dropped
    Reset,

    /// Application-defined event from `publish`
    Custom { name: String, payload: Value },
}

impl Event {
    /// Wire name of the event (`stateChanged`, `trace`, or the custom name).
    pub fn name(&self) -> &str {
        match self {
            Event::DomainCreated { .. } => "domainCreated",
            Event::StateChanged { .. } => "stateChanged",
            Event::EffectiveStateChanged { .. } => "effectiveStateChanged",
            Event::Trace(_) => "trace",
            Event::Cleared => "cleared",
            Event::Reset => "reset",
            Event::Custom { name, .. } => name,
        }
    }

    /// Domain the event concerns, if any.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Event::DomainCreated { domain }
            | Event::StateChanged { domain, .. }
            | Event::EffectiveStateChanged { domain, .. } => Some(domain),
            Event::Trace(trace) => Some(&trace.domain),
            Event::Cleared | Event::Reset | Event::Custom { .. } => None,
        }
    }
}
