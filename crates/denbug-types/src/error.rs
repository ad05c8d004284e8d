use std::fmt;

/// Result type for denbug-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the serialized-data boundary.
///
/// These are data-integrity failures and are reported regardless of whether
/// contract checking is enabled.
#[derive(Debug)]
pub enum Error {
    /// Serialized trace text was not valid JSON
    InvalidTraceData(serde_json::Error),

    /// Trace payload parsed, but was not a sequence
    TracesNotArray,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidTraceData(_) => write!(f, "Invalid trace data format"),
            Error::TracesNotArray => write!(f, "Traces must be an array"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidTraceData(err) => Some(err),
            Error::TracesNotArray => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidTraceData(err)
    }
}
