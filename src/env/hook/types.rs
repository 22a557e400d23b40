//! Core types for the hook system.
//!
//! This module defines the fundamental types used throughout the hook system:
//!
//! - [`HookContext`]: Information about the guest call being intercepted
//! - [`PreHookResult`]: Result of handler execution (continue or bypass)
//! - [`HookOutcome`]: Final outcome of a dispatch through the [`HookManager`]
//! - [`PreHookFn`]: Type alias for handler closures
//!
//! [`HookManager`]: super::HookManager

use std::sync::Arc;

use crate::{
    env::{CallKind, Environment, HostObject, JniValue},
    Error, Result,
};

/// Context passed to hooks during execution.
///
/// Contains all information about the guest call being intercepted: the signature string, how
/// the call was made, the receiver for instance calls and the arguments. Hooks use this context
/// to make matching decisions and access call data.
///
/// # Lifetime
///
/// The context borrows data from the guest runtime and is only valid for the duration of the
/// hook execution. Handlers copy out whatever they need to keep.
///
/// # Examples
///
/// ```rust
/// use qsecenv::env::{CallKind, HookContext, JniValue};
///
/// let args = [JniValue::from("ro.build.id")];
/// let ctx = HookContext::new(
///     "com/tencent/mobileqq/dt/app/Dtc->getPropSafe(Ljava/lang/String;)Ljava/lang/String;",
///     CallKind::StaticCall,
/// )
/// .with_args(&args);
///
/// assert_eq!(ctx.arg_str(0)?, "ro.build.id");
/// # Ok::<(), qsecenv::Error>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HookContext<'a> {
    /// The full call signature, e.g. `java/lang/String->hashCode()I`.
    pub signature: &'a str,

    /// How the call reached the dispatcher.
    pub kind: CallKind,

    /// The receiver for instance calls and field accesses.
    ///
    /// `None` for static calls, or when the guest runtime did not supply it.
    pub this: Option<&'a JniValue>,

    /// Call arguments (excluding `this`), in declaration order.
    ///
    /// For field writes this holds the single value being stored.
    pub args: &'a [JniValue],
}

impl<'a> HookContext<'a> {
    /// Creates a new hook context without receiver and arguments.
    ///
    /// # Arguments
    ///
    /// * `signature` - The full call signature
    /// * `kind` - How the call reached the dispatcher
    #[must_use]
    pub fn new(signature: &'a str, kind: CallKind) -> Self {
        Self {
            signature,
            kind,
            this: None,
            args: &[],
        }
    }

    /// Sets the receiver.
    #[must_use]
    pub fn with_this(mut self, this: Option<&'a JniValue>) -> Self {
        self.this = this;
        self
    }

    /// Sets the arguments.
    #[must_use]
    pub fn with_args(mut self, args: &'a [JniValue]) -> Self {
        self.args = args;
        self
    }

    /// Returns the argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] if the guest passed fewer arguments.
    pub fn arg(&self, index: usize) -> Result<&'a JniValue> {
        self.args.get(index).ok_or_else(|| Error::MissingArgument {
            signature: self.signature.to_string(),
            index,
        })
    }

    /// Returns the string argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] or [`Error::ArgumentMismatch`].
    pub fn arg_str(&self, index: usize) -> Result<&'a str> {
        match self.arg(index)? {
            JniValue::String(value) => Ok(value),
            other => Err(self.mismatch(index, "String", other)),
        }
    }

    /// Returns the byte array argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] or [`Error::ArgumentMismatch`].
    pub fn arg_bytes(&self, index: usize) -> Result<&'a [u8]> {
        match self.arg(index)? {
            JniValue::Bytes(value) => Ok(value),
            other => Err(self.mismatch(index, "Bytes", other)),
        }
    }

    /// Returns the `int` argument at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] or [`Error::ArgumentMismatch`].
    pub fn arg_i32(&self, index: usize) -> Result<i32> {
        match self.arg(index)? {
            JniValue::Int(value) => Ok(*value),
            other => Err(self.mismatch(index, "Int", other)),
        }
    }

    /// Returns the `long` argument at `index`.
    ///
    /// An `int` is widened, matching how the guest runtime passes varargs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingArgument`] or [`Error::ArgumentMismatch`].
    pub fn arg_i64(&self, index: usize) -> Result<i64> {
        match self.arg(index)? {
            JniValue::Long(value) => Ok(*value),
            JniValue::Int(value) => Ok(i64::from(*value)),
            other => Err(self.mismatch(index, "Long", other)),
        }
    }

    /// Returns the receiver as a host object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReceiver`] if there is no receiver, or it is not a host object.
    pub fn this_object(&self) -> Result<&'a HostObject> {
        self.this
            .and_then(JniValue::as_object)
            .ok_or_else(|| Error::InvalidReceiver {
                signature: self.signature.to_string(),
                expected: "host object",
            })
    }

    fn mismatch(&self, index: usize, expected: &'static str, found: &JniValue) -> Error {
        Error::ArgumentMismatch {
            signature: self.signature.to_string(),
            index,
            expected,
            found: found.type_name(),
        }
    }
}

/// Result of executing a hook handler.
///
/// Handlers either answer the call themselves or step aside. Failures are reported through the
/// surrounding [`Result`], so `?` works inside handlers.
///
/// # Examples
///
/// ```rust
/// use qsecenv::env::{JniValue, PreHookResult};
///
/// // Let the guest runtime apply its default behavior
/// let _ = PreHookResult::Continue;
///
/// // Answer the call with a value
/// let _ = PreHookResult::Bypass(Some(JniValue::Int(33)));
///
/// // Accept a void call without effect
/// let _ = PreHookResult::Bypass(None);
/// ```
#[derive(Debug)]
pub enum PreHookResult {
    /// The handler declined the call.
    ///
    /// The dispatcher reports [`HookOutcome::NoMatch`] and the guest runtime applies its own
    /// default behavior.
    Continue,

    /// The handler answered the call.
    ///
    /// Use `Some(value)` for calls that return a value, `None` for void calls and field writes.
    Bypass(Option<JniValue>),
}

/// Type alias for hook handler functions.
///
/// Handlers receive the hook context and the session environment.
///
/// # Thread Safety
///
/// Handler functions must be `Send + Sync` since the dispatcher is shared between all threads
/// of the guest runtime.
pub type PreHookFn =
    Arc<dyn Fn(&HookContext<'_>, &Environment) -> Result<PreHookResult> + Send + Sync>;

/// Outcome of hook execution via [`HookManager::execute`].
///
/// Errors are returned via `Result`, not as an outcome variant, enabling clean `?` propagation.
///
/// [`HookManager::execute`]: super::HookManager::execute
#[derive(Debug, PartialEq)]
pub enum HookOutcome {
    /// No hook handled this call.
    ///
    /// The guest runtime should apply its default behavior.
    NoMatch,

    /// A hook handled the call.
    ///
    /// `None` indicates a void return.
    Handled(Option<JniValue>),
}

impl HookOutcome {
    /// Returns the handled value, if the call was handled and produced one.
    #[must_use]
    pub fn into_value(self) -> Option<JniValue> {
        match self {
            HookOutcome::Handled(value) => value,
            HookOutcome::NoMatch => None,
        }
    }

    /// Returns `true` if a hook handled the call.
    #[must_use]
    pub fn is_handled(&self) -> bool {
        matches!(self, HookOutcome::Handled(_))
    }
}
