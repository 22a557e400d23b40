//! Hook manager for registering and executing hooks.
//!
//! This module provides [`HookManager`], the dispatch table. It indexes signature-keyed hooks in a
//! hash table built once at registration time and keeps the remaining pattern hooks in
//! registration order.

use rustc_hash::FxHashMap;

use crate::{
    env::{
        hook::{
            core::Hook,
            types::{HookContext, HookOutcome, PreHookResult},
        },
        CallKind, Environment,
    },
    Result,
};

/// Manager for registering and executing hooks.
///
/// # Hook Resolution
///
/// When looking for a matching hook:
///
/// 1. The hook keyed by the exact call kind and signature is checked first
/// 2. Pattern hooks are then checked in registration order
/// 3. The first hook whose matchers all match is selected
/// 4. Only one hook is executed per call
///
/// Registering a second hook under an already registered key is ignored with a warning, so the
/// first registration always wins.
///
/// # Examples
///
/// ```rust
/// use qsecenv::env::{CallKind, Hook, HookManager, PreHookResult};
///
/// let mut manager = HookManager::new();
/// manager.register(
///     Hook::new("ByteData.putUping")
///         .match_signature(
///             CallKind::InstanceCall,
///             "com/tencent/secprotocol/ByteData->putUping(IIILjava/lang/Object;)V",
///         )
///         .pre(|_, _| Ok(PreHookResult::Bypass(None))),
/// );
/// assert_eq!(manager.len(), 1);
/// ```
#[derive(Default)]
pub struct HookManager {
    hooks: Vec<Hook>,
    exact: FxHashMap<CallKind, FxHashMap<String, usize>>,
    patterns: Vec<usize>,
}

impl HookManager {
    /// Creates a new, empty hook manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a hook.
    ///
    /// Returns `false` if the hook was dropped because another hook is already registered under
    /// the same call kind and signature.
    pub fn register(&mut self, hook: Hook) -> bool {
        let index = self.hooks.len();

        match hook.key() {
            Some((kind, signature)) => {
                let by_signature = self.exact.entry(kind).or_default();
                if by_signature.contains_key(signature) {
                    log::warn!(
                        "Hook '{}' ignored - {kind} {signature} is already registered",
                        hook.name()
                    );
                    return false;
                }
                by_signature.insert(signature.to_string(), index);
            }
            None => self.patterns.push(index),
        }

        self.hooks.push(hook);
        true
    }

    /// Finds the first matching hook for the given context.
    ///
    /// # Returns
    ///
    /// The first matching hook, or `None` if no hook matches.
    #[must_use]
    pub fn find_matching(&self, context: &HookContext<'_>) -> Option<&Hook> {
        let keyed = self
            .exact
            .get(&context.kind)
            .and_then(|by_signature| by_signature.get(context.signature))
            .map(|&index| &self.hooks[index])
            .filter(|hook| hook.matches(context));

        keyed.or_else(|| {
            self.patterns
                .iter()
                .map(|&index| &self.hooks[index])
                .find(|hook| hook.matches(context))
        })
    }

    /// Executes a guest call through the hook system.
    ///
    /// # Returns
    ///
    /// * `Ok(HookOutcome::NoMatch)` - No hook matched, or the matching hook stepped aside
    /// * `Ok(HookOutcome::Handled(value))` - A hook answered the call
    /// * `Err(...)` - The handler failed
    ///
    /// # Errors
    ///
    /// Returns whatever error the matching handler returned.
    pub fn execute(&self, context: &HookContext<'_>, env: &Environment) -> Result<HookOutcome> {
        let Some(hook) = self.find_matching(context) else {
            return Ok(HookOutcome::NoMatch);
        };

        match hook.execute_pre(context, env).transpose()? {
            Some(PreHookResult::Bypass(value)) => Ok(HookOutcome::Handled(value)),
            Some(PreHookResult::Continue) | None => Ok(HookOutcome::NoMatch),
        }
    }

    /// Returns the number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns `true` if no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over all registered hooks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager")
            .field("hook_count", &self.hooks.len())
            .field("pattern_count", &self.patterns.len())
            .finish()
    }
}
