//! # qsecenv Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the qsecenv library. Import this module to get quick access to the essential
//! types for answering guest calls.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all qsecenv operations
pub use crate::Error;

/// The result type used throughout qsecenv
pub use crate::Result;

// ================================================================================================
// Configuration
// ================================================================================================

pub use crate::{AccountConfig, AppIdentity, DeviceConfig, DispatchConfig, SessionConfig};

// ================================================================================================
// Dispatch
// ================================================================================================

pub use crate::env::{
    CallKind, Dispatcher, HookOutcome, HostObject, InterceptionPolicy, JniValue,
    SessionRegistry,
};

// ================================================================================================
// Extension Points
// ================================================================================================

pub use crate::env::{ByteTransform, Hook, HookContext, PreHookResult};
pub use crate::signer::{NativeSigner, Tlv544Provider, TLV_544};

// ================================================================================================
// Session State
// ================================================================================================

pub use crate::env::{OutgoingPacket, PacketChannel, Session, SignResult, SignResultHandle};

// ================================================================================================
// Diagnostics
// ================================================================================================

pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
