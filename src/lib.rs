// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # qsecenv
//!
//! Environment emulation for the QSec/FEKit security module of the QQ and TIM Android clients.
//!
//! The security module is a native library that computes login and packet signatures. While it
//! runs inside an emulated Android process it calls back into the Java side hundreds of times:
//! for build properties, app metadata, account identifiers, stored preferences, environment
//! probes and to hand over signed packets. `qsecenv` answers those calls with one consistent,
//! configurable device identity.
//!
//! ## Features
//!
//! - **Call catalog** - Every Java member the module touches, keyed by signature
//! - **Consistent device identity** - Composite build strings derived from their atomic parts
//! - **Session state** - Per-account identifiers and preferences behind one lock domain
//! - **Packet hand-off** - Bounded, blocking-drain channel for signed outgoing packets
//! - **Diagnostics** - Configuration gaps and unhandled calls are logged and collected
//! - **TLV 0x544** - Signing flow around an external native signer
//!
//! ## Quick Start
//!
//! ### Using the Prelude
//!
//! ```rust
//! use qsecenv::prelude::*;
//!
//! let config = SessionConfig::default().with_account(AccountConfig::new("10001"));
//! let dispatcher = Dispatcher::new(config);
//!
//! let outcome = dispatcher.dispatch(
//!     "com/tencent/mobileqq/dt/app/Dtc->getPropSafe(Ljava/lang/String;)Ljava/lang/String;",
//!     CallKind::StaticCall,
//!     None,
//!     &[JniValue::from("ro.product.brand")],
//! )?;
//! assert_eq!(outcome, HookOutcome::Handled(Some(JniValue::from("Redmi"))));
//! # Ok::<(), qsecenv::Error>(())
//! ```
//!
//! ### Draining Packets
//!
//! ```rust,no_run
//! use qsecenv::{env::SessionRegistry, AccountConfig, SessionConfig};
//!
//! let registry = SessionRegistry::new();
//! let session = registry.get_or_create(
//!     SessionConfig::default().with_account(AccountConfig::new("10001")),
//! );
//!
//! // network thread
//! let packet = session.packets().await_and_drain()?;
//! println!("{} -> {}", packet.command, packet.payload_hex());
//! # Ok::<(), qsecenv::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`env`] - Dispatcher, hook system, call catalog and session state
//! - [`signer`] - TLV 0x544 provider
//! - [`diagnostics`] - Collected configuration gaps, unhandled calls and traces
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Error Handling
//!
//! Unknown lookup keys are not errors. They are answered with a fallback value and recorded as
//! configuration gaps. Errors are reserved for calls the environment cannot answer safely:
//!
//! ```rust
//! use qsecenv::{env::{CallKind, Dispatcher, HostObject, JniValue}, AppIdentity, Error, SessionConfig};
//!
//! let config = SessionConfig::default()
//!     .with_identity(AppIdentity::new("com.tencent.tim", "9.9.9", "1"));
//! let dispatcher = Dispatcher::new(config);
//!
//! let result = dispatcher.dispatch(
//!     "com/tencent/secprotocol/t/s->e(Landroid/content/Context;)I",
//!     CallKind::StaticCall,
//!     None,
//!     &[JniValue::from(HostObject::class("android/content/Context"))],
//! );
//! assert!(matches!(result, Err(Error::FatalMismatch { .. })));
//! ```

#[macro_use]
pub(crate) mod macros;

pub(crate) mod config;
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use qsecenv::prelude::*;
///
/// let dispatcher = Dispatcher::new(SessionConfig::default());
/// assert!(!dispatcher.hooks().is_empty());
/// ```
pub mod prelude;

pub mod diagnostics;
pub mod env;
pub mod signer;
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
///
/// # Examples
///
/// ```rust
/// use qsecenv::{env::Session, Result};
///
/// fn current_o3did(session: &Session) -> Result<String> {
///     session.o3did()
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `qsecenv` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use config::{
    AccountConfig, AppIdentity, DeviceConfig, DispatchConfig, SessionConfig, MOBILEQQ_PACKAGE,
};
