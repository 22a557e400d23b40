//! Environment emulation for the QSec security module.
//!
//! The security module runs inside an emulated Android process and repeatedly calls back into
//! the Java side to learn about the device, the app and the account, and to hand over signed
//! packets. This module answers those calls with a consistent, configurable device identity.
//!
//! # Architecture
//!
//! - Values crossing the call boundary, and the host objects handed to the guest
//! - Device fact table with the constant hardware catalog and the derived build strings
//! - Session state store with account identifiers, preferences and the deep sleep detector
//! - Outgoing packet channel between the dispatch path and the network layer
//! - Hook system and the call catalog built on it
//! - Interception policy and the dispatcher tying everything together
//!
//! # Key Components
//!
//! ## Dispatch
//! - [`crate::env::Dispatcher`] - Entry point for every guest call of one session
//! - [`crate::env::SessionRegistry`] - Sessions of all accounts, by uin
//! - [`crate::env::InterceptionPolicy`] - Signatures left to the guest runtime
//!
//! ## Hook System
//! - [`crate::env::HookManager`] - Dispatch table of the call catalog
//! - [`crate::env::Hook`] - Builder for a single catalog entry
//! - [`crate::env::HookContext`] - Information passed to hook handlers
//!
//! ## State
//! - [`crate::env::DeviceFacts`] - Build properties, system properties and environment probes
//! - [`crate::env::Session`] - Mutable per-account state
//! - [`crate::env::PacketChannel`] - Bounded hand-off of outgoing packets
//! - [`crate::env::DeepSleepDetector`] - Two-state anti-detection state machine
//!
//! # Usage Examples
//!
//! ```rust
//! use qsecenv::{env::{CallKind, Dispatcher, JniValue}, AccountConfig, SessionConfig};
//!
//! let config = SessionConfig::default().with_account(AccountConfig::new("10001"));
//! let dispatcher = Dispatcher::new(config);
//!
//! let uin = dispatcher.dispatch(
//!     "com/tencent/mobileqq/qsec/qsecurity/QSecConfig->business_uin:Ljava/lang/String;",
//!     CallKind::StaticGet,
//!     None,
//!     &[],
//! )?;
//! assert_eq!(uin.into_value(), Some(JniValue::from("10001")));
//! # Ok::<(), qsecenv::Error>(())
//! ```

pub mod channel;
mod detector;
mod dispatcher;
mod environment;
pub mod facts;
pub mod handlers;
pub mod hook;
pub mod policy;
mod registry;
pub mod session;
mod value;

pub use channel::{OutgoingPacket, PacketChannel};
pub use detector::{DeepSleepDetector, DetectorState};
pub use dispatcher::Dispatcher;
pub use environment::{ByteTransform, Environment};
pub use facts::DeviceFacts;
pub use hook::{
    Hook, HookContext, HookManager, HookMatcher, HookOutcome, PatternMatcher, PreHookFn,
    PreHookResult, RuntimeMatcher, SignatureMatcher,
};
pub use policy::{Exemption, InterceptionPolicy};
pub use registry::SessionRegistry;
pub use session::{Session, SessionState};
pub use value::{CallKind, HostObject, JniValue, SignResult, SignResultHandle};
