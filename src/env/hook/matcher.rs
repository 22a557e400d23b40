//! Matcher trait and implementations for hook matching.
//!
//! This module defines the [`HookMatcher`] trait and the implementations used to decide whether a
//! hook applies to a given guest call.
//!
//! # Available Matchers
//!
//! | Matcher | Description |
//! |---------|-------------|
//! | [`SignatureMatcher`] | Exact call kind and signature string |
//! | [`PatternMatcher`] | Call kind plus signature prefix and suffix |
//! | [`RuntimeMatcher`] | Inspects runtime argument values |
//!
//! # Combining Matchers
//!
//! Multiple matchers can be added to a single hook. All matchers must match for the hook to be
//! applied (AND semantics).
//!
//! ```rust,ignore
//! use qsecenv::env::{CallKind, Hook};
//!
//! // Only answers Settings.System.getString for the android_id key
//! let hook = Hook::new("settings-android-id")
//!     .match_signature(CallKind::StaticCall, SETTINGS_GET_STRING)
//!     .match_runtime("key=android_id", |ctx| {
//!         ctx.arg_str(1).is_ok_and(|key| key == "android_id")
//!     });
//! ```

use std::sync::Arc;

use crate::env::{hook::types::HookContext, CallKind};

/// Type alias for runtime matcher predicates.
pub type RuntimePredicate = dyn Fn(&HookContext<'_>) -> bool + Send + Sync;

/// Trait for implementing hook matchers.
///
/// Matchers determine whether a hook should be applied to a given call. Each matcher implements
/// a single matching criterion.
///
/// # Thread Safety
///
/// Matchers must be `Send + Sync` to allow hook registration from any thread.
pub trait HookMatcher: Send + Sync {
    /// Checks if this matcher matches the given context.
    fn matches(&self, context: &HookContext<'_>) -> bool;

    /// Returns a description of this matcher for debugging.
    fn description(&self) -> String;
}

/// Matches one exact call kind and signature.
///
/// Hooks carrying this matcher are indexed by the [`HookManager`](super::HookManager), so their
/// lookup does not scan the hook list.
#[derive(Clone, Debug)]
pub struct SignatureMatcher {
    kind: CallKind,
    signature: String,
}

impl SignatureMatcher {
    /// Creates a matcher for the given call kind and signature.
    #[must_use]
    pub fn new(kind: CallKind, signature: impl Into<String>) -> Self {
        Self {
            kind,
            signature: signature.into(),
        }
    }

    /// Returns the matched call kind.
    #[must_use]
    pub fn kind(&self) -> CallKind {
        self.kind
    }

    /// Returns the matched signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl HookMatcher for SignatureMatcher {
    fn matches(&self, context: &HookContext<'_>) -> bool {
        context.kind == self.kind && context.signature == self.signature
    }

    fn description(&self) -> String {
        format!("{} {}", self.kind, self.signature)
    }
}

/// Matches a family of signatures sharing a prefix and a suffix.
///
/// Used where the guest calls obfuscated member names that differ between builds but share the
/// owning class and the type descriptor.
///
/// # Examples
///
/// ```rust
/// use qsecenv::env::{CallKind, HookContext, HookMatcher, PatternMatcher};
///
/// let matcher = PatternMatcher::new(
///     CallKind::StaticCall,
///     "com/tencent/mobileqq/qsec/qsecest/QsecEst->",
///     "(Landroid/content/Context;I)Ljava/lang/String;",
/// );
///
/// let ctx = HookContext::new(
///     "com/tencent/mobileqq/qsec/qsecest/QsecEst->a(Landroid/content/Context;I)Ljava/lang/String;",
///     CallKind::StaticCall,
/// );
/// assert!(matcher.matches(&ctx));
/// ```
#[derive(Clone, Debug)]
pub struct PatternMatcher {
    kind: CallKind,
    prefix: String,
    suffix: String,
}

impl PatternMatcher {
    /// Creates a matcher for the given call kind, signature prefix and suffix.
    #[must_use]
    pub fn new(kind: CallKind, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

impl HookMatcher for PatternMatcher {
    fn matches(&self, context: &HookContext<'_>) -> bool {
        context.kind == self.kind
            && context.signature.len() >= self.prefix.len() + self.suffix.len()
            && context.signature.starts_with(&self.prefix)
            && context.signature.ends_with(&self.suffix)
    }

    fn description(&self) -> String {
        format!("{} {}*{}", self.kind, self.prefix, self.suffix)
    }
}

/// Matches by inspecting runtime argument values.
pub struct RuntimeMatcher {
    description: String,
    predicate: Arc<RuntimePredicate>,
}

impl RuntimeMatcher {
    /// Creates a runtime matcher.
    ///
    /// # Arguments
    ///
    /// * `description` - Human-readable description for debugging
    /// * `predicate` - Function that returns `true` if the hook should match
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl HookMatcher for RuntimeMatcher {
    fn matches(&self, context: &HookContext<'_>) -> bool {
        (self.predicate)(context)
    }

    fn description(&self) -> String {
        format!("runtime: {}", self.description)
    }
}

impl std::fmt::Debug for RuntimeMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeMatcher")
            .field("description", &self.description)
            .finish()
    }
}
