use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only failures that must cross the dispatch boundary are represented here. Unknown keys inside
/// a recognised call (configuration gaps) are absorbed into a fallback value and a diagnostic
/// entry, and calls that no hook recognises are reported as
/// [`HookOutcome::NoMatch`](crate::env::HookOutcome::NoMatch) so the guest runtime can apply its
/// own default behavior.
///
/// # Error Categories
///
/// ## Protocol Errors
/// - [`Error::FatalMismatch`] - A version-locked constant was requested for an unsupported app version
///
/// ## Call Shape Errors
/// - [`Error::MissingArgument`] - The guest passed fewer arguments than the signature declares
/// - [`Error::ArgumentMismatch`] - An argument had a different type than the signature declares
/// - [`Error::InvalidReceiver`] - The `this` value of an instance call had an unexpected shape
///
/// ## Runtime Errors
/// - [`Error::LockError`] - A shared session structure was poisoned by a panicking thread
/// - [`Error::Error`] - Miscellaneous failures
///
/// # Examples
///
/// ```rust,no_run
/// use qsecenv::{env::{CallKind, Dispatcher}, Error, SessionConfig};
///
/// let dispatcher = Dispatcher::new(SessionConfig::default());
/// match dispatcher.dispatch(
///     "com/tencent/secprotocol/t/s->e(Landroid/content/Context;)I",
///     CallKind::StaticCall,
///     None,
///     &[],
/// ) {
///     Ok(outcome) => println!("handled: {:?}", outcome),
///     Err(Error::FatalMismatch { package, version, .. }) => {
///         eprintln!("{package} {version} is not supported");
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A version-locked numeric constant was requested for an app version that has none.
    ///
    /// The value is structurally embedded in the protocol, so there is no safe fallback. The
    /// enclosing signing operation has to be aborted.
    ///
    /// # Fields
    ///
    /// * `signature` - The call signature that requested the constant
    /// * `package` - The emulated application package
    /// * `version` - The emulated application version
    #[error("Unsupported app version - {package} {version} has no constant for {signature}")]
    FatalMismatch {
        /// The call signature that requested the constant
        signature: String,
        /// The emulated application package
        package: String,
        /// The emulated application version
        version: String,
    },

    /// The guest passed fewer arguments than the call signature declares.
    #[error("Missing argument {index} for {signature}")]
    MissingArgument {
        /// The call signature
        signature: String,
        /// The zero-based index of the missing argument
        index: usize,
    },

    /// An argument had a different type than the call signature declares.
    #[error("Argument {index} of {signature} - expected {expected}, found {found}")]
    ArgumentMismatch {
        /// The call signature
        signature: String,
        /// The zero-based index of the offending argument
        index: usize,
        /// The expected value type
        expected: &'static str,
        /// The value type that was actually passed
        found: &'static str,
    },

    /// The receiver of an instance call or field access had an unexpected shape.
    #[error("Invalid receiver for {signature} - expected {expected}")]
    InvalidReceiver {
        /// The call signature
        signature: String,
        /// Description of the expected receiver
        expected: &'static str,
    },

    /// Failed to lock target.
    ///
    /// A session structure was poisoned because a thread panicked while holding its lock.
    #[error("Failed to lock target")]
    LockError,

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
