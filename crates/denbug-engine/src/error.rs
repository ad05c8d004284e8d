use std::fmt;

/// Result type for denbug-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the engine layer
#[derive(Debug)]
pub enum Error {
    /// Domain name failed validation (empty)
    InvalidDomainName(String),

    /// Pre- or postcondition violated while contracts are enabled
    Contract(String),

    /// A demand check evaluated to false
    AssertionFailed { domain: String, message: String },

    /// Pattern string could not be parsed
    MalformedPattern { pattern: String, reason: &'static str },

    /// Serialized trace data could not be read
    Data(denbug_types::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDomainName(name) => write!(f, "Invalid domain name: {:?}", name),
            Error::Contract(msg) => write!(f, "Contract violation: {}", msg),
            Error::AssertionFailed { domain, message } => {
                write!(f, "Assertion failed in {}: {}", domain, message)
            }
            Error::MalformedPattern { pattern, reason } => {
                write!(f, "Malformed pattern {:?}: {}", pattern, reason)
            }
            Error::Data(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Data(err) => Some(err),
            Error::InvalidDomainName(_)
            | Error::Contract(_)
            | Error::AssertionFailed { .. }
            | Error::MalformedPattern { .. } => None,
        }
    }
}

impl From<denbug_types::Error> for Error {
    fn from(err: denbug_types::Error) -> Self {
        Error::Data(err)
    }
}
