//! Name to provider mapping.
//!
//! Populated once at startup, then queried once per run to resolve the
//! provider selected on the command line. New providers are added by
//! registering them; nothing here needs to know about them.

pub mod error;

use self::error::{ErrorKind, Result};
use crate::provider::{Provider, ProviderHandle};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct Registry {
    providers: HashMap<String, ProviderHandle>,
}
impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the provider built by `factory` under `name`.
    ///
    /// The factory only runs if the name is free. An existing registration is
    /// never replaced; build a new registry instead.
    pub fn register<P, F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        P: Provider + 'static,
        F: FnOnce() -> P,
    {
        let name = name.into();
        if self.providers.contains_key(&name) {
            exn::bail!(ErrorKind::AlreadyRegistered(name));
        }
        tracing::debug!(provider = %name, "Registered provider");
        self.providers.insert(name, Arc::new(factory()));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<ProviderHandle> {
        match self.providers.get(name) {
            Some(provider) => Ok(Arc::clone(provider)),
            None => exn::bail!(ErrorKind::NotRegistered(name.to_string())),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
