//! Call dispatcher.
//!
//! The [`Dispatcher`] is the single entry point of the guest runtime. Every field access,
//! method call and constructor the guest cannot resolve itself arrives here as a signature
//! string plus arguments, and leaves as one of two outcomes:
//!
//! - [`HookOutcome::Handled`] - the environment answered the call
//! - [`HookOutcome::NoMatch`] - the guest runtime applies its own default behavior
//!
//! Failures that must abort the guest operation, such as a missing version-locked constant,
//! are returned as [`Error`](crate::Error).
//!
//! # Flow
//!
//! 1. The [`InterceptionPolicy`] decides whether the call is intercepted at all
//! 2. The [`HookManager`] finds the hook for the signature and runs its handler
//! 3. Unanswered calls are logged and recorded as diagnostics
//!
//! # Examples
//!
//! ```rust
//! use qsecenv::{env::{CallKind, Dispatcher, JniValue}, SessionConfig};
//!
//! let dispatcher = Dispatcher::new(SessionConfig::default());
//!
//! let outcome = dispatcher.dispatch(
//!     "java/lang/String->hashCode()I",
//!     CallKind::InstanceCall,
//!     Some(&JniValue::from("a")),
//!     &[],
//! )?;
//! assert_eq!(outcome.into_value(), Some(JniValue::Int(97)));
//! # Ok::<(), qsecenv::Error>(())
//! ```

use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    env::{
        handlers, ByteTransform, CallKind, DeviceFacts, Environment, Hook, HookContext,
        HookManager, HookOutcome, InterceptionPolicy, JniValue, PacketChannel, Session,
    },
    Result, SessionConfig,
};

/// Routes guest calls to the call catalog.
///
/// One dispatcher serves one session. It is `Send + Sync` and is shared between all threads of
/// the guest runtime.
pub struct Dispatcher {
    hooks: HookManager,
    env: Environment,
    policy: InterceptionPolicy,
}

impl Dispatcher {
    /// Creates a dispatcher with the complete call catalog and the default policy.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let mut hooks = HookManager::new();
        handlers::register_all(&mut hooks);

        Self {
            hooks,
            env: Environment::new(config),
            policy: InterceptionPolicy::default(),
        }
    }

    /// Creates a dispatcher that forwards `FEBound.transform` to `transform`.
    #[must_use]
    pub fn with_transform(config: SessionConfig, transform: Arc<dyn ByteTransform>) -> Self {
        let mut dispatcher = Self::new(config);
        dispatcher.env = dispatcher.env.with_transform(transform);
        dispatcher
    }

    /// Replaces the interception policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InterceptionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds a hook to the catalog.
    ///
    /// A hook whose signature is already answered is ignored, see [`HookManager::register`].
    ///
    /// # Returns
    ///
    /// `true` if the hook was added.
    pub fn register_hook(&mut self, hook: Hook) -> bool {
        self.hooks.register(hook)
    }

    /// Asks whether the guest runtime should route `signature` to this dispatcher.
    ///
    /// With call tracing enabled, every accepted call is logged and recorded.
    #[must_use]
    pub fn accept_method(&self, signature: &str, is_static: bool) -> bool {
        let package = &self.env.config().identity.package_name;
        if !self.policy.should_intercept(signature, package) {
            return false;
        }

        if self.env.config().dispatch.trace_calls {
            let message = format!("Accept {}{signature}", if is_static { "static " } else { "" });
            log::debug!("{message}");
            self.env.diagnostics().push(
                Diagnostic::new(DiagnosticSeverity::Info, DiagnosticCategory::Trace, message)
                    .with_signature(signature),
            );
        }

        true
    }

    /// Answers one guest call.
    ///
    /// # Arguments
    ///
    /// * `signature` - The full call signature, e.g. `java/lang/String->hashCode()I`
    /// * `kind` - How the call was made
    /// * `this` - The receiver for instance calls and field accesses
    /// * `args` - The arguments, or the stored value for field writes
    ///
    /// # Errors
    ///
    /// Returns the handler's error. Argument and receiver errors mean the guest called a
    /// signature with values of an unexpected shape. [`Error::FatalMismatch`] means the session
    /// cannot continue for the configured app version.
    ///
    /// [`Error::FatalMismatch`]: crate::Error::FatalMismatch
    pub fn dispatch(
        &self,
        signature: &str,
        kind: CallKind,
        this: Option<&JniValue>,
        args: &[JniValue],
    ) -> Result<HookOutcome> {
        let package = &self.env.config().identity.package_name;
        if !self.policy.should_intercept(signature, package) {
            self.env.diagnostics().push(
                Diagnostic::new(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::Policy,
                    format!("Not intercepted for {package}"),
                )
                .with_signature(signature),
            );
            return Ok(HookOutcome::NoMatch);
        }

        let context = HookContext::new(signature, kind)
            .with_this(this)
            .with_args(args);

        let outcome = self.hooks.execute(&context, &self.env)?;
        if outcome == HookOutcome::NoMatch {
            log::debug!("Unhandled {kind} {signature}");
            self.env.diagnostics().push(
                Diagnostic::new(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::UnhandledCall,
                    format!("Unhandled {kind}"),
                )
                .with_signature(signature),
            );
        }

        Ok(outcome)
    }

    /// Returns the environment handed to hook handlers.
    #[must_use]
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        self.env.config()
    }

    /// Returns the session state.
    #[must_use]
    pub fn session(&self) -> &Arc<Session> {
        self.env.session()
    }

    /// Returns the device fact table.
    #[must_use]
    pub fn facts(&self) -> &DeviceFacts {
        self.env.facts()
    }

    /// Returns the diagnostics collected for this session.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        self.env.diagnostics()
    }

    /// Returns the outgoing packet channel.
    #[must_use]
    pub fn packets(&self) -> &PacketChannel {
        self.env.session().packets()
    }

    /// Returns the hook catalog.
    #[must_use]
    pub fn hooks(&self) -> &HookManager {
        &self.hooks
    }

    /// Returns the interception policy.
    #[must_use]
    pub fn policy(&self) -> &InterceptionPolicy {
        &self.policy
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("env", &self.env)
            .field("hooks", &self.hooks.len())
            .field("policy", &self.policy)
            .finish()
    }
}
