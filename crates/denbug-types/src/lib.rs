pub mod error;
pub mod event;
pub mod filter;
pub mod snapshot;
pub mod trace;

pub use error::{Error, Result};
pub use event::*;
pub use filter::*;
pub use snapshot::*;
pub use trace::*;

/// Separator between the segments of a domain path (`app:ui:button`).
pub const SEPARATOR: char = ':';

/// Suffix that marks a companion echo domain.
pub const ECHO_SUFFIX: &str = ":echo";

/// Returns true when `name` is an echo domain (`<parent>:echo`).
pub fn is_echo(name: &str) -> bool {
    name.ends_with(ECHO_SUFFIX)
}

/// Name of the companion echo domain for `name`.
pub fn echo_name(name: &str) -> String {
    format!("{}{}", name, ECHO_SUFFIX)
}

/// Immediate parent of a domain path, `None` for roots.
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once(SEPARATOR).map(|(parent, _)| parent)
}

/// Every prefix path of `name`, root first, ending with `name` itself.
///
/// `"a:b:c"` yields `["a", "a:b", "a:b:c"]`.
pub fn ancestor_paths(name: &str) -> Vec<&str> {
    let mut paths: Vec<&str> = name
        .match_indices(SEPARATOR)
        .map(|(index, _)| &name[..index])
        .collect();
    paths.push(name);
    paths
}

/// True when `candidate` is `root` itself or lives below it in the hierarchy.
pub fn is_within(candidate: &str, root: &str) -> bool {
    candidate == root
        || (candidate.len() > root.len()
            && candidate.starts_with(root)
            && candidate[root.len()..].starts_with(SEPARATOR))
}

/// A usable domain path: non-empty, with no empty segments (`a::b`, `:x`, `a:`).
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.split(SEPARATOR).all(|segment| !segment.is_empty())
}
