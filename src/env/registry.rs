//! Session registry.
//!
//! A signing service runs one emulated session per account. [`SessionRegistry`] maps account
//! numbers to their [`Dispatcher`] so that request handlers on any thread find the session of
//! the account they serve.

use std::sync::Arc;

use dashmap::DashMap;

use crate::{env::Dispatcher, SessionConfig};

/// Concurrent map from account number to session dispatcher.
///
/// # Examples
///
/// ```rust
/// use qsecenv::{env::SessionRegistry, AccountConfig, SessionConfig};
///
/// let registry = SessionRegistry::new();
/// let config = SessionConfig::default().with_account(AccountConfig::new("10001"));
///
/// let first = registry.get_or_create(config.clone());
/// let second = registry.get_or_create(config);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Dispatcher>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session of `config.account.uin`, creating it from `config` if absent.
    ///
    /// An existing session keeps its original configuration.
    pub fn get_or_create(&self, config: SessionConfig) -> Arc<Dispatcher> {
        let uin = config.account.uin.clone();
        self.sessions
            .entry(uin)
            .or_insert_with(|| Arc::new(Dispatcher::new(config)))
            .clone()
    }

    /// Adds a prepared session, replacing any session of the same account.
    ///
    /// # Returns
    ///
    /// The replaced session, if any.
    pub fn insert(&self, dispatcher: Dispatcher) -> Option<Arc<Dispatcher>> {
        let uin = dispatcher.config().account.uin.clone();
        self.sessions.insert(uin, Arc::new(dispatcher))
    }

    /// Returns the session of `uin`.
    #[must_use]
    pub fn get(&self, uin: &str) -> Option<Arc<Dispatcher>> {
        self.sessions.get(uin).map(|entry| Arc::clone(entry.value()))
    }

    /// Removes and returns the session of `uin`.
    pub fn remove(&self, uin: &str) -> Option<Arc<Dispatcher>> {
        self.sessions.remove(uin).map(|(_, dispatcher)| dispatcher)
    }

    /// Returns the number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
