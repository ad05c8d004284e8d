//! Core of denbug: hierarchical debug domains, pattern-driven enablement,
//! a bounded trace buffer and a lifecycle event bus.
//!
//! Everything hangs off [`Engine`]. It is `Send + Sync` and cheap to clone.
//!
//! ```
//! use denbug_engine::{Engine, EngineConfig};
//! use serde_json::json;
//!
//! let engine = Engine::new(EngineConfig::default().capture_stacks(false));
//! engine.create_domain("app:ui").unwrap();
//! engine.disable("app").unwrap();
//! assert!(!engine.enabled("app:ui"));
//! assert!(engine.record("app:ui", vec![json!("hidden")]).is_none());
//! ```

pub mod buffer;
pub mod bus;
pub mod clock;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod pattern;
pub mod registry;
mod snapshot;

pub use buffer::{TraceBuffer, decode, parse_frame};
pub use bus::{Bus, Listener, Subscription};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_MAX_TRACES, EngineConfig, TraceOptions};
pub use contracts::Contracts;
pub use engine::{ECHO_TARGET, Engine};
pub use error::{Error, Result};
pub use pattern::{Glob, Pattern, PatternSet};
pub use registry::Setter;

pub use denbug_types as types;
