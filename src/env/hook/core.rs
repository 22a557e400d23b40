//! Hook definition and builder.
//!
//! This module provides the [`Hook`] struct, which combines matchers and a handler to intercept
//! guest calls.

use std::sync::Arc;

use crate::{
    env::{
        hook::{
            matcher::{HookMatcher, PatternMatcher, RuntimeMatcher, SignatureMatcher},
            types::{HookContext, PreHookFn, PreHookResult},
        },
        CallKind, Environment,
    },
    Result,
};

/// A configurable hook for call interception.
///
/// Hooks combine matchers (which calls to intercept) with a handler (what to answer). Use the
/// builder pattern to configure them:
///
/// ```rust
/// use qsecenv::env::{CallKind, Hook, JniValue, PreHookResult};
///
/// let hook = Hook::new("Build.VERSION.SDK_INT")
///     .match_signature(CallKind::StaticGet, "android/os/Build$VERSION->SDK_INT:I")
///     .pre(|_ctx, env| {
///         Ok(PreHookResult::Bypass(Some(JniValue::Int(env.config().device.sdk_version))))
///     });
/// ```
///
/// # Matcher Evaluation
///
/// All matchers on a hook must match for the hook to be applied (AND semantics). A hook with no
/// matchers never matches.
///
/// A hook with a [`SignatureMatcher`] is keyed by that signature. The
/// [`HookManager`](super::HookManager) indexes such hooks in a hash table and only scans the
/// remaining pattern hooks linearly.
pub struct Hook {
    name: String,
    key: Option<(CallKind, String)>,
    matchers: Vec<Box<dyn HookMatcher>>,
    pre_hook: Option<PreHookFn>,
}

impl Hook {
    /// Creates a new hook with the given name.
    ///
    /// The name is used for debugging and logging. By convention it names the guest member the
    /// hook answers, e.g. `Dtc.getPropSafe`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            matchers: Vec::new(),
            pre_hook: None,
        }
    }

    /// Returns the hook's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the exact call kind and signature this hook is keyed by, if any.
    #[must_use]
    pub fn key(&self) -> Option<(CallKind, &str)> {
        self.key
            .as_ref()
            .map(|(kind, signature)| (*kind, signature.as_str()))
    }

    /// Adds a custom matcher.
    #[must_use]
    pub fn add_matcher<M: HookMatcher + 'static>(mut self, matcher: M) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Adds an exact signature matcher and keys the hook by it.
    ///
    /// # Arguments
    ///
    /// * `kind` - How the call reaches the dispatcher
    /// * `signature` - The full call signature
    #[must_use]
    pub fn match_signature(mut self, kind: CallKind, signature: impl Into<String>) -> Self {
        let signature = signature.into();
        self.key = Some((kind, signature.clone()));
        self.add_matcher(SignatureMatcher::new(kind, signature))
    }

    /// Adds a prefix/suffix signature matcher.
    ///
    /// # Arguments
    ///
    /// * `kind` - How the call reaches the dispatcher
    /// * `prefix` - Required signature prefix, usually `owner->`
    /// * `suffix` - Required signature suffix, usually the type descriptor
    #[must_use]
    pub fn match_pattern(
        self,
        kind: CallKind,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.add_matcher(PatternMatcher::new(kind, prefix, suffix))
    }

    /// Adds a runtime matcher that inspects argument values.
    ///
    /// # Arguments
    ///
    /// * `description` - Human-readable description for debugging
    /// * `predicate` - Function that returns `true` if the hook should match
    #[must_use]
    pub fn match_runtime<F>(self, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.add_matcher(RuntimeMatcher::new(description, predicate))
    }

    /// Sets the handler.
    ///
    /// The handler runs in place of the guest runtime's default behavior. It can answer the call
    /// with [`PreHookResult::Bypass`] or step aside with [`PreHookResult::Continue`].
    #[must_use]
    pub fn pre<F>(mut self, handler: F) -> Self
    where
        F: Fn(&HookContext<'_>, &Environment) -> Result<PreHookResult> + Send + Sync + 'static,
    {
        self.pre_hook = Some(Arc::new(handler));
        self
    }

    /// Checks if all matchers match the given context.
    ///
    /// Returns `false` if the hook has no matchers.
    pub fn matches(&self, context: &HookContext<'_>) -> bool {
        if self.matchers.is_empty() {
            return false;
        }
        self.matchers.iter().all(|m| m.matches(context))
    }

    /// Executes the handler if present.
    ///
    /// # Returns
    ///
    /// `Some(result)` if a handler is registered, `None` otherwise.
    pub fn execute_pre(
        &self,
        context: &HookContext<'_>,
        env: &Environment,
    ) -> Option<Result<PreHookResult>> {
        self.pre_hook.as_ref().map(|hook| hook(context, env))
    }

    /// Returns descriptions of all matchers, for debugging.
    pub fn describe(&self) -> Vec<String> {
        self.matchers.iter().map(|m| m.description()).collect()
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("matchers", &self.describe())
            .field("has_pre_hook", &self.pre_hook.is_some())
            .finish()
    }
}
