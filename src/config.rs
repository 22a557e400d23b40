//! Session configuration types.
//!
//! This module provides the configuration surface that an external loader fills in once per
//! emulation session. Everything the environment fabricates beyond its constant device catalog
//! is derived from these values.
//!
//! # Overview
//!
//! Configuration is organized into several structures:
//!
//! - [`SessionConfig`] - Top-level configuration container
//! - [`AccountConfig`] - Account-scoped identifiers (uin, seed, guid, qimei36)
//! - [`AppIdentity`] - The emulated application (package, version, build code)
//! - [`DeviceConfig`] - The tunable part of the emulated device (OS version, screen, storage)
//! - [`DispatchConfig`] - Dispatcher behavior (call tracing, packet queue bound)
//!
//! All structures implement [`serde::Deserialize`] with per-field defaults, so a loader may
//! supply any subset of the fields in whatever format it reads.
//!
//! # Example
//!
//! ```rust,no_run
//! use qsecenv::{AccountConfig, AppIdentity, DeviceConfig, SessionConfig};
//!
//! let config = SessionConfig::default()
//!     .with_account(AccountConfig::new("10001").with_guid("00112233445566778899aabbccddeeff"))
//!     .with_identity(AppIdentity::new("com.tencent.tim", "3.5.1", "1298"))
//!     .with_device(DeviceConfig::default().with_android_version("12", 32));
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::diagnostics::DEFAULT_DIAGNOSTIC_LIMIT;

/// Package name of the QQ client.
///
/// Some guest code paths differ for this identity, see
/// [`InterceptionPolicy`](crate::env::InterceptionPolicy).
pub const MOBILEQQ_PACKAGE: &str = "com.tencent.mobileqq";

/// Top-level session configuration.
///
/// # Default Configuration
///
/// The default configuration emulates a QQ 8.9.80 install on an Android 13 device with an
/// empty account. Callers normally replace at least the [`AccountConfig`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Account-scoped identifiers.
    pub account: AccountConfig,

    /// The emulated application.
    pub identity: AppIdentity,

    /// The tunable part of the emulated device.
    pub device: DeviceConfig,

    /// Dispatcher behavior.
    pub dispatch: DispatchConfig,
}

impl SessionConfig {
    /// Replaces the account configuration.
    #[must_use]
    pub fn with_account(mut self, account: AccountConfig) -> Self {
        self.account = account;
        self
    }

    /// Replaces the application identity.
    #[must_use]
    pub fn with_identity(mut self, identity: AppIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Replaces the device configuration.
    #[must_use]
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }

    /// Replaces the dispatcher configuration.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.dispatch = dispatch;
        self
    }
}

/// Account-scoped identifiers seeded into the session state at construction.
///
/// Unset values are reported to the guest as empty strings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// The account number (`business_uin`).
    pub uin: String,

    /// Random seed handed out as `business_seed`.
    pub seed: Option<String>,

    /// Device guid handed out as `business_guid`.
    pub guid: Option<String>,

    /// 36-character device fingerprint (`business_q36`).
    pub qimei36: Option<String>,

    /// Initial rotating o3 device id. The guest usually overwrites it through
    /// `QSec.updateO3DID`.
    pub o3did: Option<String>,
}

impl AccountConfig {
    /// Creates an account configuration for the given uin.
    #[must_use]
    pub fn new(uin: impl Into<String>) -> Self {
        Self {
            uin: uin.into(),
            ..Default::default()
        }
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Sets the device guid.
    #[must_use]
    pub fn with_guid(mut self, guid: impl Into<String>) -> Self {
        self.guid = Some(guid.into());
        self
    }

    /// Sets the qimei36 device fingerprint.
    #[must_use]
    pub fn with_qimei36(mut self, qimei36: impl Into<String>) -> Self {
        self.qimei36 = Some(qimei36.into());
        self
    }
}

/// The emulated application identity.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AppIdentity {
    /// Android package name.
    pub package_name: String,

    /// Version name, e.g. `8.9.80`.
    pub version: String,

    /// Version code as reported by the package manager.
    pub code: String,

    /// The QUA string (`business_qua`).
    pub qua: String,

    /// `Settings.Secure.ANDROID_ID`. Reported lower-cased.
    pub android_id: String,

    /// Install folder of the application. Defaults to `/data/app/{package_name}-1`.
    pub install_dir: Option<String>,

    /// Host file whose modification time is reported as the app install time.
    pub install_marker: Option<PathBuf>,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            package_name: MOBILEQQ_PACKAGE.to_string(),
            version: "8.9.80".to_string(),
            code: "4330".to_string(),
            qua: "V1_AND_SQ_8.9.80_4330_YYB_D".to_string(),
            android_id: String::new(),
            install_dir: None,
            install_marker: None,
        }
    }
}

impl AppIdentity {
    /// Creates an identity for the given package, version name and version code.
    ///
    /// The QUA string is derived from the version and code.
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        version: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        let version = version.into();
        let code = code.into();
        Self {
            package_name: package_name.into(),
            qua: format!("V1_AND_SQ_{version}_{code}_YYB_D"),
            version,
            code,
            ..Default::default()
        }
    }

    /// Sets the android id.
    #[must_use]
    pub fn with_android_id(mut self, android_id: impl Into<String>) -> Self {
        self.android_id = android_id.into();
        self
    }

    /// Sets the QUA string.
    #[must_use]
    pub fn with_qua(mut self, qua: impl Into<String>) -> Self {
        self.qua = qua.into();
        self
    }

    /// Sets the file whose modification time is reported as install time.
    #[must_use]
    pub fn with_install_marker(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_marker = Some(path.into());
        self
    }

    /// Returns the application install folder.
    #[must_use]
    pub fn install_dir(&self) -> String {
        match &self.install_dir {
            Some(dir) => dir.clone(),
            None => format!("/data/app/{}-1", self.package_name),
        }
    }

    /// Returns the private data folder of the application.
    #[must_use]
    pub fn data_dir(&self) -> String {
        format!("/data/user/0/{}", self.package_name)
    }
}

/// The tunable part of the emulated device.
///
/// Hardware strings are constants of the device catalog; only the values that commonly have
/// to match a real device are configurable.
///
/// # Default Values
///
/// | Setting | Default Value |
/// |---------|---------------|
/// | `android_version` | `13` |
/// | `sdk_version` | 33 |
/// | `target_sdk_version` | 29 |
/// | `storage_size` | `137438953471` |
/// | `density` | `2.75` |
/// | `screen_width` x `screen_height` | 1080 x 2400 |
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Android release, reported as `ro.build.version.release`.
    pub android_version: String,

    /// Android API level, reported as `Build.VERSION.SDK_INT`.
    pub sdk_version: i32,

    /// `ApplicationInfo.targetSdkVersion` of the emulated application.
    pub target_sdk_version: i32,

    /// Total storage size in bytes, as a decimal string.
    pub storage_size: String,

    /// Display density.
    pub density: String,

    /// Screen width in pixels.
    pub screen_width: u32,

    /// Screen height in pixels.
    pub screen_height: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            android_version: "13".to_string(),
            sdk_version: 33,
            target_sdk_version: 29,
            storage_size: "137438953471".to_string(),
            density: "2.75".to_string(),
            screen_width: 1080,
            screen_height: 2400,
        }
    }
}

impl DeviceConfig {
    /// Sets the Android release and the matching API level.
    #[must_use]
    pub fn with_android_version(mut self, release: impl Into<String>, sdk_version: i32) -> Self {
        self.android_version = release.into();
        self.sdk_version = sdk_version;
        self
    }

    /// Sets the screen size in pixels.
    #[must_use]
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen_width = width;
        self.screen_height = height;
        self
    }

    /// Sets the total storage size in bytes.
    #[must_use]
    pub fn with_storage_size(mut self, bytes: u64) -> Self {
        self.storage_size = bytes.to_string();
        self
    }
}

/// Dispatcher behavior.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Log every call that reaches the interception policy.
    pub trace_calls: bool,

    /// Maximum number of outgoing packets held for the consumer.
    ///
    /// When the queue is full the oldest packet is evicted, so publishing never blocks.
    pub packet_capacity: usize,

    /// Maximum number of diagnostics kept for the session.
    ///
    /// Entries past the limit are still logged, but only counted.
    pub diagnostic_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            trace_calls: false,
            packet_capacity: 64,
            diagnostic_limit: DEFAULT_DIAGNOSTIC_LIMIT,
        }
    }
}

impl DispatchConfig {
    /// Enables or disables call tracing.
    #[must_use]
    pub fn with_trace_calls(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }

    /// Sets the outgoing packet queue bound.
    #[must_use]
    pub fn with_packet_capacity(mut self, capacity: usize) -> Self {
        self.packet_capacity = capacity;
        self
    }

    /// Sets the number of diagnostics kept for the session.
    #[must_use]
    pub fn with_diagnostic_limit(mut self, limit: usize) -> Self {
        self.diagnostic_limit = limit;
        self
    }
}
