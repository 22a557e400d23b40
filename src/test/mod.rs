//! Shared fixtures for unit tests.

use std::sync::{Mutex, Once};

use log::{LevelFilter, Log, Metadata, Record};

use crate::{
    env::{CallKind, Environment, HookContext, HookManager, HookOutcome, JniValue},
    AccountConfig, AppIdentity, Result, SessionConfig,
};

/// Account number of the test session.
pub const TEST_UIN: &str = "10001";

/// Session configuration used throughout the unit tests.
///
/// QQ 8.9.80 on the default device, with a fully populated account except for the seed and
/// the o3did.
pub fn create_test_config() -> SessionConfig {
    SessionConfig::default()
        .with_account(
            AccountConfig::new(TEST_UIN)
                .with_guid("00112233445566778899aabbccddeeff")
                .with_qimei36("0123456789abcdef0123456789abcdef0123"),
        )
        .with_identity(AppIdentity::default().with_android_id("A1B2C3D4E5F60718"))
}

/// Environment built from [`create_test_config`].
pub fn create_test_environment() -> Environment {
    Environment::new(create_test_config())
}

/// Runs a single call against a hook manager populated by `register`.
///
/// Bypasses the interception policy, so handlers can be tested in isolation.
pub fn invoke(
    register: fn(&mut HookManager),
    env: &Environment,
    signature: &str,
    kind: CallKind,
    this: Option<&JniValue>,
    args: &[JniValue],
) -> Result<HookOutcome> {
    let mut manager = HookManager::new();
    register(&mut manager);

    let context = HookContext::new(signature, kind)
        .with_this(this)
        .with_args(args);
    manager.execute(&context, env)
}

static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        if let Ok(mut lines) = CAPTURED.lock() {
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Installs a process-wide logger that keeps every formatted log line.
///
/// Tests run in parallel and share the logger, so they should filter with [`logged_lines`]
/// on a value only they use.
pub fn capture_logs() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });
}

/// Returns the captured log lines containing `needle`.
pub fn logged_lines(needle: &str) -> Vec<String> {
    CAPTURED
        .lock()
        .map(|lines| lines.iter().filter(|l| l.contains(needle)).cloned().collect())
        .unwrap_or_default()
}
