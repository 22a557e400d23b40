//! The call catalog.
//!
//! Each submodule answers one area of the guest's host dependencies and exposes a `register`
//! function that adds its hooks to a [`HookManager`].
//!
//! | Module | Guest area |
//! |--------|------------|
//! | [`android`] | Android framework: build info, `Context`, `PackageManager`, `Intent`, `File` |
//! | [`java`] | Java runtime: `String`, `ClassLoader`, `Thread` |
//! | [`dtc`] | Device token collector `Dtc` |
//! | [`qsec`] | Security module: `QSecConfig`, `QSec`, `QsecEst`, `secprotocol` |
//! | [`fekit`] | FEKit: logging, packet channel, deep sleep detector, `FEBound` |
//! | [`sign`] | `QQSecuritySign$SignResult` |

pub mod android;
pub mod dtc;
pub mod fekit;
pub mod java;
pub mod qsec;
pub mod sign;

use crate::env::HookManager;

/// Registers the complete call catalog.
pub fn register_all(manager: &mut HookManager) {
    android::register(manager);
    java::register(manager);
    dtc::register(manager);
    qsec::register(manager);
    fekit::register(manager);
    sign::register(manager);
}

