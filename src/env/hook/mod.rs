//! Hook system for guest call interception.
//!
//! Every call the emulated module makes across the guest boundary is routed through this module.
//! A hook pairs one or more matchers with a handler; the [`HookManager`] selects the hook for a
//! call and runs it.
//!
//! # Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Core types: context, handler results, outcome |
//! | [`matcher`] | Matcher trait and implementations |
//! | `core` | The [`Hook`] builder and executor |
//! | [`manager`] | [`HookManager`] for hook registration and lookup |
//!
//! # Hook Execution Flow
//!
//! ```text
//! Guest call (signature, kind, this, args)
//!         │
//!         ▼
//! ┌───────────────────┐
//! │  Exact lookup by  │───► hit ──┐
//! │  (kind, signature)│           │
//! └───────────────────┘           │
//!         │ miss                  │
//!         ▼                       │
//! ┌───────────────────┐           │
//! │  Pattern hooks in │───► hit ──┤
//! │  registration     │           │
//! │  order            │           │
//! └───────────────────┘           │
//!         │ miss                  ▼
//!         │             ┌───────────────────┐
//!         │             │  Execute handler  │───► Bypass(value) ───► Handled(value)
//!         │             └───────────────────┘
//!         │                       │ Continue
//!         ▼                       ▼
//!      NoMatch ◄──────────────────┘
//! ```

mod core;
pub mod manager;
pub mod matcher;
pub mod types;

pub use self::core::Hook;
pub use manager::HookManager;
pub use matcher::{HookMatcher, PatternMatcher, RuntimeMatcher, SignatureMatcher};
pub use types::{HookContext, HookOutcome, PreHookFn, PreHookResult};
