use chrono::{DateTime, SecondsFormat};
use denbug_types::{DecodedTrace, FilterOptions, StackFrame, Trace};
use regex::Regex;
use std::collections::VecDeque;
use std::sync::LazyLock;

use crate::config::DEFAULT_MAX_TRACES;

/// `at handler (src/app.js:10:5)`
static PAREN_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"at (.+?) \((.+?):(\d+):(\d+)\)").unwrap());

/// `denbug_engine::engine::Engine::record at ./src/engine.rs:120:9`
static NATIVE_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?) at (.+):(\d+):(\d+)$").unwrap());

/// Bounded append-only trace log.
///
/// Eviction happens on `push` only: lowering the capacity leaves the
/// backlog intact until the next trace arrives.
#[derive(Debug)]
pub struct TraceBuffer {
    traces: VecDeque<Trace>,
    max_traces: usize,
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRACES)
    }
}

impl TraceBuffer {
    pub fn new(max_traces: usize) -> Self {
        Self {
            traces: VecDeque::new(),
            max_traces,
        }
    }

    pub fn max_traces(&self) -> usize {
        self.max_traces
    }

    pub fn set_max_traces(&mut self, max_traces: usize) {
        self.max_traces = max_traces;
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Append, then drop the oldest entries while over capacity.
    pub fn push(&mut self, trace: Trace) {
        self.traces.push_back(trace);
        while self.traces.len() > self.max_traces {
            self.traces.pop_front();
        }
    }

    pub fn extend(&mut self, traces: impl IntoIterator<Item = Trace>) {
        for trace in traces {
            self.push(trace);
        }
    }

    /// Oldest first.
    pub fn snapshot(&self) -> Vec<Trace> {
        self.traces.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.traces.clear();
    }
}

/// Render a trace for display: fresh id, RFC 3339 time, parsed frames.
pub fn decode(trace: &Trace) -> DecodedTrace {
    let timestamp = DateTime::from_timestamp_millis(trace.timestamp)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| trace.timestamp.to_string());

    DecodedTrace {
        id: uuid::Uuid::new_v4().to_string(),
        timestamp,
        domain: trace.domain.clone(),
        args: trace.args.clone(),
        stack: trace
            .error
            .frames()
            .iter()
            .filter_map(|line| parse_frame(line))
            .collect(),
    }
}

/// Parse one stack line. Lines in neither known shape yield `None`.
pub fn parse_frame(line: &str) -> Option<StackFrame> {
    let line = line.trim();
    let caps = PAREN_FRAME
        .captures(line)
        .or_else(|| NATIVE_FRAME.captures(line))?;

    Some(StackFrame {
        function: caps[1].to_string(),
        file: caps[2].to_string(),
        line: caps[3].parse().ok()?,
        column: caps[4].parse().ok()?,
    })
}

/// Unanchored glob: `*` matches any run of characters, the rest is literal.
fn domain_matcher(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&body).ok()
}

/// Select traces by every predicate present in `options`.
///
/// `is_enabled` answers the `enabled_only` predicate against live state.
pub fn filter(
    traces: &[Trace],
    options: &FilterOptions,
    is_enabled: impl Fn(&str) -> bool,
) -> Vec<Trace> {
    let matcher = options.pattern.as_deref().and_then(domain_matcher);

    traces
        .iter()
        .filter(|trace| !options.enabled_only || is_enabled(&trace.domain))
        .filter(|trace| matcher.as_ref().is_none_or(|re| re.is_match(&trace.domain)))
        .filter(|trace| options.from.is_none_or(|from| trace.timestamp >= from))
        .filter(|trace| options.to.is_none_or(|to| trace.timestamp <= to))
        .filter(|trace| {
            options.structured.as_ref().is_none_or(|wanted| {
                wanted.iter().all(|(key, value)| {
                    trace
                        .structured
                        .as_ref()
                        .and_then(|found| found.get(key))
                        .is_some_and(|found| found == value)
                })
            })
        })
        .cloned()
        .collect()
}
