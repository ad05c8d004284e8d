use denbug_types::{SEPARATOR, is_echo, is_within};
use regex::Regex;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::registry::{Notification, Registry};

const RECURSIVE: &str = "**";
const WILDCARD: char = '*';

/// Parsed enable/disable instruction.
///
/// | Source        | Variant                 | Matches                               |
/// |---------------|-------------------------|---------------------------------------|
/// | `app:ui`      | `Exact("app:ui")`       | `app:ui` only                         |
/// | `app:**`      | `Recursive("app")`      | `app` and everything below it         |
/// | `*:render`    | `Suffix("render")`      | any name ending in `:render`          |
/// | `app:*:save`  | `Glob(..)`              | `*` spans one segment                 |
/// | `-app`        | `Negated(Exact("app"))` | same as inner, but disables           |
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Exact(String),
    Recursive(String),
    Suffix(String),
    Glob(Glob),
    Negated(Box<Pattern>),
}

/// Segment-wise wildcard with its compiled matcher.
#[derive(Debug, Clone)]
pub struct Glob {
    source: String,
    regex: Regex,
}

impl Glob {
    fn new(source: &str) -> Result<Self> {
        let body = source
            .split(SEPARATOR)
            .map(|segment| {
                segment
                    .split(WILDCARD)
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join("[^:]*")
            })
            .collect::<Vec<_>>()
            .join(":");

        let regex = Regex::new(&format!("^{}$", body)).map_err(|_| Error::MalformedPattern {
            pattern: source.to_string(),
            reason: "wildcard does not compile",
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for Glob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        Pattern::parse(raw)
    }
}

impl Pattern {
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = |reason| Error::MalformedPattern {
            pattern: raw.to_string(),
            reason,
        };

        if raw.is_empty() {
            return Err(malformed("empty pattern"));
        }

        if let Some(inner) = raw.strip_prefix('-') {
            let inner = Pattern::parse(inner).map_err(|_| malformed("invalid negated pattern"))?;
            return Ok(Pattern::Negated(Box::new(inner)));
        }

        let segments: Vec<&str> = raw.split(SEPARATOR).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(malformed("empty segment"));
        }

        if let Some((&last, prefix)) = segments.split_last()
            && last == RECURSIVE
        {
            if prefix.is_empty() {
                return Err(malformed("`**` needs a prefix"));
            }
            if prefix.iter().any(|segment| segment.contains(WILDCARD)) {
                return Err(malformed("`**` prefix must be concrete"));
            }
            return Ok(Pattern::Recursive(prefix.join(":")));
        }

        if segments.iter().any(|segment| segment.contains(RECURSIVE)) {
            return Err(malformed("`**` is only allowed as the final segment"));
        }

        if !raw.contains(WILDCARD) {
            return Ok(Pattern::Exact(raw.to_string()));
        }

        if let Some((&first, tail)) = segments.split_first()
            && first == "*"
            && !tail.is_empty()
            && tail.iter().all(|segment| !segment.contains(WILDCARD))
        {
            return Ok(Pattern::Suffix(tail.join(":")));
        }

        Ok(Pattern::Glob(Glob::new(raw)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(exact) => name == exact,
            Pattern::Recursive(prefix) => is_within(name, prefix),
            Pattern::Suffix(tail) => name
                .strip_suffix(tail.as_str())
                .is_some_and(|head| head.ends_with(SEPARATOR)),
            Pattern::Glob(glob) => glob.is_match(name),
            Pattern::Negated(inner) => inner.matches(name),
        }
    }

    /// True when applying the pattern switches domains on.
    pub fn enables(&self) -> bool {
        match self {
            Pattern::Negated(inner) => !inner.enables(),
            _ => true,
        }
    }

    /// The pattern with every negation stripped.
    pub fn base(&self) -> &Pattern {
        match self {
            Pattern::Negated(inner) => inner.base(),
            other => other,
        }
    }

    /// Wildcard-free name the pattern refers to, created before matching.
    pub fn concrete_name(&self) -> Option<&str> {
        match self.base() {
            Pattern::Exact(name) | Pattern::Recursive(name) => Some(name),
            _ => None,
        }
    }

    /// Recursive, suffix and glob patterns can match many domains.
    pub fn is_broad(&self) -> bool {
        !matches!(self.base(), Pattern::Exact(_))
    }

    /// True when the final segment is literally `echo`.
    pub fn targets_echo(&self) -> bool {
        match self.base() {
            Pattern::Exact(name) => name == "echo" || is_echo(name),
            Pattern::Suffix(tail) => tail == "echo" || is_echo(tail),
            Pattern::Glob(glob) => glob.source().rsplit(SEPARATOR).next() == Some("echo"),
            Pattern::Recursive(_) | Pattern::Negated(_) => false,
        }
    }

    pub fn negate(self) -> Self {
        Pattern::Negated(Box::new(self))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(name) => write!(f, "{}", name),
            Pattern::Recursive(prefix) => write!(f, "{}:**", prefix),
            Pattern::Suffix(tail) => write!(f, "*:{}", tail),
            Pattern::Glob(glob) => write!(f, "{}", glob.source()),
            Pattern::Negated(inner) => write!(f, "-{}", inner),
        }
    }
}

/// Batch of patterns for `apply_patterns`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSet {
    /// Enabled entries first, then disabled entries as negations.
    Split {
        enabled: Vec<String>,
        disabled: Vec<String>,
    },
    /// Entries applied in order; `-` prefixes disable.
    List(Vec<String>),
}

impl PatternSet {
    fn parsed(&self) -> Vec<Pattern> {
        let parse_all = |raws: &[String]| -> Vec<Pattern> {
            raws.iter().filter_map(|raw| parse_or_log(raw)).collect()
        };

        match self {
            PatternSet::Split { enabled, disabled } => {
                let mut patterns = parse_all(enabled);
                patterns.extend(parse_all(disabled).into_iter().map(Pattern::negate));
                patterns
            }
            PatternSet::List(entries) => parse_all(entries),
        }
    }
}

impl From<Vec<String>> for PatternSet {
    fn from(entries: Vec<String>) -> Self {
        PatternSet::List(entries)
    }
}

/// Parse, logging and discarding malformed input.
pub(crate) fn parse_or_log(raw: &str) -> Option<Pattern> {
    match Pattern::parse(raw) {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            tracing::debug!(pattern = raw, error = %err, "ignoring malformed pattern");
            None
        }
    }
}

/// Apply one pattern to the registry.
///
/// Broad patterns that do not name `echo` leave echo domains alone and force
/// the ones they would have matched back to `local = true`.
pub fn apply(registry: &mut Registry, pattern: &Pattern, out: &mut Vec<Notification>) {
    if let Some(name) = pattern.concrete_name() {
        registry.ensure(name, out);
    }

    let keep_echoes = pattern.is_broad() && !pattern.targets_echo();
    let (echoes, targets): (Vec<String>, Vec<String>) = registry
        .names()
        .iter()
        .filter(|name| pattern.matches(name))
        .cloned()
        .partition(|name| keep_echoes && is_echo(name));

    tracing::debug!(
        %pattern,
        matched = targets.len(),
        enable = pattern.enables(),
        "applying pattern"
    );

    for name in &targets {
        if pattern.enables() {
            registry.enable(name, out);
        } else {
            registry.disable(name, out);
        }
    }

    for echo in &echoes {
        registry.set_local(echo, true, out);
    }
}

/// Reset the registry to "everything off, echoes on" and apply a batch.
pub fn apply_set(registry: &mut Registry, set: &PatternSet, out: &mut Vec<Notification>) {
    let patterns = set.parsed();

    for pattern in &patterns {
        if let Some(name) = pattern.concrete_name() {
            registry.ensure(name, out);
        }
    }

    let names: Vec<String> = registry.names().to_vec();
    for name in &names {
        registry.set_local(name, is_echo(name), out);
    }

    for pattern in &patterns {
        apply(registry, pattern, out);
    }
}
