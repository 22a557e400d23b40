//! The per-session environment handed to every hook handler.

use std::sync::Arc;

use crate::{
    diagnostics::Diagnostics,
    env::{DeviceFacts, Session},
    SessionConfig,
};

/// External implementation of `FEBound.transform`.
///
/// The transform is a keyed byte shuffle implemented by the host application; the environment
/// only forwards to it. Implemented for every `Fn(i32, &[u8]) -> Vec<u8>` closure that is
/// `Send + Sync`.
pub trait ByteTransform: Send + Sync {
    /// Transforms `data` in the given mode (`1` encodes, `2` decodes).
    fn transform(&self, mode: i32, data: &[u8]) -> Vec<u8>;
}

impl<F> ByteTransform for F
where
    F: Fn(i32, &[u8]) -> Vec<u8> + Send + Sync,
{
    fn transform(&self, mode: i32, data: &[u8]) -> Vec<u8> {
        self(mode, data)
    }
}

/// Everything a handler may read or change while answering a call.
#[derive(Clone)]
pub struct Environment {
    config: Arc<SessionConfig>,
    facts: DeviceFacts,
    session: Arc<Session>,
    diagnostics: Arc<Diagnostics>,
    transform: Option<Arc<dyn ByteTransform>>,
}

impl Environment {
    /// Creates the environment for one session.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let config = Arc::new(config);
        let diagnostics = Arc::new(Diagnostics::with_limit(config.dispatch.diagnostic_limit));

        Self {
            facts: DeviceFacts::new(Arc::clone(&config), Arc::clone(&diagnostics)),
            session: Arc::new(Session::new(&config)),
            config,
            diagnostics,
            transform: None,
        }
    }

    /// Installs the `FEBound.transform` implementation.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn ByteTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the device fact table.
    #[must_use]
    pub fn facts(&self) -> &DeviceFacts {
        &self.facts
    }

    /// Returns the session state.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Returns the diagnostics collected for this session.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Returns the installed `FEBound.transform` implementation, if any.
    #[must_use]
    pub fn transform(&self) -> Option<&dyn ByteTransform> {
        self.transform.as_deref()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("package", &self.config.identity.package_name)
            .field("uin", &self.config.account.uin)
            .field("has_transform", &self.transform.is_some())
            .finish()
    }
}
