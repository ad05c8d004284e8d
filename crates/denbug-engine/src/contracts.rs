use denbug_types::is_valid_name;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Runtime switch for precondition/postcondition checking.
///
/// Enabled: violations surface as [`Error::Contract`] (or
/// [`Error::InvalidDomainName`]). Disabled: checks are skipped and malformed
/// input is tolerated where the operation allows it.
#[derive(Debug)]
pub struct Contracts {
    enabled: AtomicBool,
}

impl Contracts {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Check a domain name. `Ok(false)` means "skip silently".
    ///
    /// Empty names and names with an empty segment (`:x`, `a::b`) are invalid.
    pub fn domain_name(&self, name: &str) -> Result<bool> {
        if is_valid_name(name) {
            return Ok(true);
        }
        if self.enabled() {
            return Err(Error::InvalidDomainName(name.to_string()));
        }
        Ok(false)
    }

    /// Fail with `message` when contracts are on and `holds` is false.
    pub fn require(&self, holds: bool, message: impl FnOnce() -> String) -> Result<()> {
        if holds || !self.enabled() {
            return Ok(());
        }
        let message = message();
        tracing::warn!(%message, "contract violated");
        Err(Error::Contract(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_name_policy() {
        let contracts = Contracts::new(true);
        assert!(matches!(
            contracts.domain_name(""),
            Err(Error::InvalidDomainName(_))
        ));
        assert!(contracts.domain_name("ok").unwrap());
        for name in [":x", "a::b", "a:"] {
            assert!(matches!(
                contracts.domain_name(name),
                Err(Error::InvalidDomainName(_))
            ));
        }

        contracts.set_enabled(false);
        assert!(!contracts.domain_name("").unwrap());
        assert!(!contracts.domain_name("a::b").unwrap());
    }

    #[test]
    fn test_require_only_when_enabled() {
        let contracts = Contracts::new(true);
        assert!(contracts.require(true, || "unused".to_string()).is_ok());
        assert!(matches!(
            contracts.require(false, || "broken".to_string()),
            Err(Error::Contract(msg)) if msg == "broken"
        ));

        contracts.set_enabled(false);
        assert!(contracts.require(false, || "ignored".to_string()).is_ok());
    }
}
