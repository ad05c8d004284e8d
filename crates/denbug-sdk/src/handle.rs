use denbug_engine::Engine;
use denbug_types::{SEPARATOR, Trace, echo_name, is_echo};
use serde_json::Value;
use std::fmt;

use crate::error::Result;

/// Callable view of one debug domain.
///
/// Cheap to clone. A handle obtained for an empty name while contracts are
/// off is *detached*: it never records and every mutation is a no-op.
#[derive(Clone)]
pub struct DomainHandle {
    engine: Engine,
    name: Option<String>,
}

impl fmt::Debug for DomainHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainHandle")
            .field("name", &self.name())
            .field("enabled", &self.enabled())
            .finish()
    }
}

impl DomainHandle {
    pub(crate) fn open(engine: &Engine, name: &str) -> Result<Self> {
        let registered = engine.create_domain(name)?;
        Ok(Self {
            engine: engine.clone(),
            name: registered.then(|| name.to_string()),
        })
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    fn detached(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            name: None,
        }
    }

    /// Full domain path; empty for a detached handle.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn is_detached(&self) -> bool {
        self.name.is_none()
    }

    /// Record a trace if the domain is effectively enabled.
    ///
    /// See also the [`trace!`](crate::trace!) macro for variadic calls.
    pub fn call(&self, args: Vec<Value>) -> Option<Trace> {
        let name = self.name.as_deref()?;
        self.engine.record(name, args)
    }

    /// Observe the effective state; see [`Engine::flag`].
    pub fn flag(&self, setter: impl Fn(bool) + Send + Sync + 'static) -> Result<&Self> {
        if let Some(name) = &self.name {
            self.engine.flag(name, setter)?;
        }
        Ok(self)
    }

    pub fn enable(&self) -> Result<&Self> {
        if let Some(name) = &self.name {
            self.engine.enable(name)?;
        }
        Ok(self)
    }

    pub fn disable(&self) -> Result<&Self> {
        if let Some(name) = &self.name {
            self.engine.disable(name)?;
        }
        Ok(self)
    }

    /// Local flag.
    pub fn state(&self) -> Option<bool> {
        self.name.as_deref().and_then(|name| self.engine.state(name))
    }

    pub fn set_state(&self, local: bool) -> Result<&Self> {
        if let Some(name) = &self.name {
            self.engine.set_state(name, local)?;
        }
        Ok(self)
    }

    /// Effective state.
    pub fn enabled(&self) -> bool {
        self.name
            .as_deref()
            .is_some_and(|name| self.engine.enabled(name))
    }

    /// Handle for the companion echo domain. An echo domain is its own echo.
    pub fn echo(&self) -> Result<DomainHandle> {
        match &self.name {
            Some(name) if is_echo(name) => Ok(self.clone()),
            Some(name) => DomainHandle::open(&self.engine, &echo_name(name)),
            None => Ok(self.detached()),
        }
    }

    /// Handle for `<name>:<sub>`. An empty or `:`-delimited-empty `sub` is an
    /// invalid name and follows the empty-name policy.
    pub fn domain(&self, sub: &str) -> Result<DomainHandle> {
        match &self.name {
            Some(name) => {
                DomainHandle::open(&self.engine, &format!("{}{}{}", name, SEPARATOR, sub))
            }
            None => Ok(self.detached()),
        }
    }
}
