//! Diagnostics collection for dispatched guest calls.
//!
//! This module provides types for collecting diagnostic messages while the emulated module
//! runs. The environment is deliberately lenient: an unknown key inside a recognised call
//! produces a fallback value instead of an error, and an unrecognised call is handed back to
//! the guest runtime. Both are recorded here so they can be reviewed after a session without
//! interrupting it.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`DiagnosticCategory`] - Category of the diagnostic source
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use qsecenv::diagnostics::{Diagnostics, DiagnosticCategory};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//!
//! diagnostics.warning(
//!     DiagnosticCategory::ConfigurationGap,
//!     "Not support prop:ro.product.model, return -1",
//! );
//!
//! for entry in diagnostics.by_category(DiagnosticCategory::ConfigurationGap) {
//!     println!("{entry}");
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. The [`Diagnostics`] container
//! uses `boxcar::Vec` internally, which provides lock-free concurrent append operations,
//! so dispatch threads never contend on it.
//!
//! # Retention
//!
//! A session may live for as long as its account is signed in, so the container keeps at most
//! [`Diagnostics::limit`] entries. Later entries are still logged but only counted, see
//! [`Diagnostics::dropped`].

use std::{
    fmt::{self, Write},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Number of entries a [`Diagnostics`] container keeps unless configured otherwise.
pub const DEFAULT_DIAGNOSTIC_LIMIT: usize = 4096;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for call traces and unhandled calls forwarded to the guest runtime.
    Info,

    /// A recoverable problem.
    ///
    /// The session continues with a fallback value.
    Warning,

    /// An unrecoverable problem that aborted the current guest operation.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// An unknown key inside a recognised call was answered with a fallback value.
    ConfigurationGap,

    /// No hook recognised the call; it was forwarded to the guest runtime.
    UnhandledCall,

    /// The interception policy declined to intercept a recognised call.
    Policy,

    /// Call trace entry emitted in diagnostic mode.
    Trace,

    /// Outgoing packet channel activity.
    Packet,

    /// A version-locked value could not be produced.
    Protocol,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::ConfigurationGap => write!(f, "ConfigurationGap"),
            DiagnosticCategory::UnhandledCall => write!(f, "UnhandledCall"),
            DiagnosticCategory::Policy => write!(f, "Policy"),
            DiagnosticCategory::Trace => write!(f, "Trace"),
            DiagnosticCategory::Packet => write!(f, "Packet"),
            DiagnosticCategory::Protocol => write!(f, "Protocol"),
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Call signature that produced the diagnostic, if any.
    pub signature: Option<String>,

    /// Lookup key inside the call that produced the diagnostic, if any.
    pub key: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            signature: None,
            key: None,
        }
    }

    /// Adds the call signature to the diagnostic.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Adds the lookup key to the diagnostic.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(key) = &self.key {
            write!(f, " (key: {key})")?;
        }

        if let Some(signature) = &self.signature {
            write!(f, " ({signature})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations. Slots are
/// reserved with an atomic counter, so the entry count never exceeds the limit even when
/// several threads push at once.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
    limit: usize,
    reserved: AtomicUsize,
    dropped: AtomicUsize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container holding up to [`DEFAULT_DIAGNOSTIC_LIMIT`]
    /// entries.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_DIAGNOSTIC_LIMIT)
    }

    /// Creates a new empty diagnostics container holding up to `limit` entries.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: boxcar::Vec::new(),
            limit,
            reserved: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Records a configuration gap and returns the fallback value.
    ///
    /// Logs the gap at warning level. This is the single place where an unknown key inside a
    /// recognised call is turned into a value, so every gap is both logged and recorded.
    ///
    /// # Arguments
    ///
    /// * `area` - Short name of the lookup that missed, e.g. `prop` or `systemGetSafe`
    /// * `key` - The unknown key
    /// * `fallback` - The value handed to the guest instead
    pub fn gap(&self, area: &str, key: &str, fallback: &str) -> String {
        log::warn!("Not support {area}:{key}, return {fallback}");
        self.push(
            Diagnostic::new(
                DiagnosticSeverity::Warning,
                DiagnosticCategory::ConfigurationGap,
                format!("Not support {area}, return {fallback}"),
            )
            .with_key(key),
        );
        fallback.to_string()
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Once the limit is reached the entry is discarded and counted in [`dropped`](Self::dropped).
    pub fn push(&self, diagnostic: Diagnostic) {
        if self.reserved.fetch_add(1, Ordering::Relaxed) >= self.limit {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.entries.push(diagnostic);
    }

    /// Returns the maximum number of entries kept.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of entries discarded because the limit was reached.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of diagnostics with the given severity.
    pub fn count_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.category == category)
            .map(|(_, d)| d)
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            self.count_severity(DiagnosticSeverity::Error),
            self.count_severity(DiagnosticSeverity::Warning),
            self.count_severity(DiagnosticSeverity::Info)
        );
        let dropped = self.dropped();
        if dropped > 0 {
            let _ = writeln!(output, "  ({dropped} more not kept, limit {})", self.limit);
        }

        for diag in self.iter() {
            if diag.severity != DiagnosticSeverity::Info {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::ConfigurationGap,
            "Not support prop, return -1",
        )
        .with_key("ro.product.model");

        assert_eq!(
            diag.to_string(),
            "[WARN] ConfigurationGap: Not support prop, return -1 (key: ro.product.model)"
        );
    }

    #[test]
    fn test_gap_returns_fallback_and_records() {
        let diagnostics = Diagnostics::new();
        let value = diagnostics.gap("prop", "ro.unknown", "-1");

        assert_eq!(value, "-1");
        assert_eq!(diagnostics.count(), 1);

        let gaps = diagnostics.by_category(DiagnosticCategory::ConfigurationGap);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].key.as_deref(), Some("ro.unknown"));
        assert_eq!(gaps[0].severity, DiagnosticSeverity::Warning);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn test_counts_by_severity() {
        let diagnostics = Diagnostics::new();
        diagnostics.info(DiagnosticCategory::UnhandledCall, "a");
        diagnostics.info(DiagnosticCategory::Trace, "b");
        diagnostics.error(DiagnosticCategory::Protocol, "c");

        assert_eq!(diagnostics.count_severity(DiagnosticSeverity::Info), 2);
        assert_eq!(diagnostics.count_severity(DiagnosticSeverity::Error), 1);
        assert!(diagnostics.has_errors());
        assert!(diagnostics.summary().contains("1 error(s), 0 warning(s), 2 info(s)"));
    }

    #[test]
    fn test_concurrent_push() {
        let diagnostics = Arc::new(Diagnostics::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let diagnostics = Arc::clone(&diagnostics);
                thread::spawn(move || {
                    for j in 0..25 {
                        diagnostics.info(DiagnosticCategory::Trace, format!("{i}-{j}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 100);
    }

    #[test]
    fn test_limit_bounds_entries() {
        let diagnostics = Diagnostics::with_limit(3);
        for n in 0..10 {
            diagnostics.info(DiagnosticCategory::Packet, format!("packet {n}"));
        }
        assert_eq!(diagnostics.gap("prop", "ro.secure", "-1"), "-1");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.dropped(), 8);
        assert_eq!(
            diagnostics.iter().map(|d| d.message.as_str()).collect::<Vec<_>>(),
            ["packet 0", "packet 1", "packet 2"]
        );
        assert!(diagnostics.summary().contains("8 more not kept, limit 3"));
    }

    #[test]
    fn test_limit_holds_under_concurrent_push() {
        let diagnostics = Arc::new(Diagnostics::with_limit(50));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let diagnostics = Arc::clone(&diagnostics);
                thread::spawn(move || {
                    for j in 0..25 {
                        diagnostics.info(DiagnosticCategory::Trace, format!("{i}-{j}"));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(diagnostics.count(), 50);
        assert_eq!(diagnostics.dropped(), 50);
    }
}
