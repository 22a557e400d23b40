//! Device fact table.
//!
//! Answers every question the guest asks about the emulated device: build properties, Java system
//! properties, screen metrics, storage, and the environment probe table used by the `QsecEst`
//! collector.
//!
//! Hardware strings are constants of a single emulated handset. Composite strings such as the
//! build description and fingerprint are assembled from the atomic constants and the
//! [`DeviceConfig`](crate::DeviceConfig) at lookup time, so they can never contradict the fields
//! they are made of.
//!
//! Lookups that miss the catalog are configuration gaps: they log a warning, record a
//! [`ConfigurationGap`](crate::diagnostics::DiagnosticCategory::ConfigurationGap) diagnostic and
//! return a fallback value.

use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;

use crate::{
    diagnostics::Diagnostics,
    utils::{random_alnum, random_digits},
    SessionConfig,
};

/// `ro.product.brand`
pub const BRAND: &str = "Redmi";
/// `ro.product.manufacturer`
pub const MANUFACTURER: &str = "Xiaomi";
/// `ro.product.device` and `ro.product.name`
pub const DEVICE: &str = "mondrian";
/// Model name, only visible through the Dalvik user agent.
pub const MODEL: &str = "22101317C";
/// `ro.product.board`
pub const BOARD: &str = "taro";
/// `ro.build.id`
pub const BUILD_ID: &str = "TKQ1.221013.002";
/// `ro.build.version.incremental`
pub const INCREMENTAL: &str = "V14.0.8.0.TMQCNXM";
/// `ro.build.type`
pub const BUILD_TYPE: &str = "user";
/// `ro.build.tags`
pub const BUILD_TAGS: &str = "release-keys";
/// `ro.build.keys`
pub const BUILD_KEYS: &str = "test-keys";

/// MD5 of the application signing certificate, lower-case.
pub const SIGNATURE_MD5: &str = "90721e0b3a587f77503b6abedd960c2e";
/// Secondary certificate digest reported by probe 82, lower-case.
pub const SECONDARY_SIGNATURE_MD5: &str = "90721e0b3aaa7f77503b6abedd960c2e";
/// The default input method.
pub const INPUT_METHOD: &str = "com.baidu.input_mi/.ImeService";

const BOOT_CLASS_PATH: &str = "/system/framework/core-oj.jar:/system/framework/core-libart.jar:\
/system/framework/conscrypt.jar:/system/frameworkhttp.jar:/system/framework/bouncycastle.jar:\
/system/framework/apache-xml.jar:/system/framework/legacy-test.jar:/system/framework/ext.jar:\
/system/framework/framework.jar:/system/framework/telephony-common.jar:\
/system/frameworkoip-common.jar:/system/framework/ims-common.jar:\
/system/framework/org.apache.http.legacy.boot.jar:/system/framework/android.hidl.base-V1.0-java.jar:\
/system/framework/android.hidl.manager-V1.0-java.jar:/system/framework/mediatek-common.jar:\
/system/framework/mediatek-framework.jar:/system/framework/mediatek-telephony-common.jar:\
/system/framework/mediatek-telephony-base.jar:/system/framework/mediatek-ims-common.jar:\
/system/framework/mediatek-telecom-common.jar:/system/framework/mediatek-cta.jar";

/// Build properties with a constant value.
const CONSTANT_PROPS: &[(&str, &str)] = &[
    ("ro.build.id", BUILD_ID),
    ("ro.build.keys", BUILD_KEYS),
    ("ro.product.device", DEVICE),
    ("ro.product.name", DEVICE),
    ("ro.product.board", BOARD),
    ("ro.product.manufacturer", MANUFACTURER),
    ("ro.product.brand", BRAND),
    ("ro.bootloader", "unknown"),
    ("persist.sys.timezone", "Asia/Shanghai"),
    ("ro.hardware", "qcom"),
    ("ro.product.cpu.abi", "arm64-v8a"),
    // misspelled key probed by some builds
    ("ro.product.cpi.abi", "arm64-v8a"),
    ("ro.product.cpu.abilist", "arm64-v8a,armeabi-v7a,armeabi"),
    ("ro.system.product.cpu.abilist", "arm64-v8a,armeabi-v7a,armeabi"),
    ("ro.product.cpu.abilist32", "armeabi-v7a, armeabi"),
    ("ro.system.product.cpu.abilist32", "armeabi-v7a, armeabi"),
    ("ro.product.cpu.abilist64", "arm64-v8a"),
    ("ro.system.product.cpu.abilist64", "arm64-v8a"),
    ("ro.build.version.incremental", INCREMENTAL),
    ("ro.build.version.base_os", ""),
    ("ro.boot.container", ""),
    ("ro.vendor.build.fingerprint", ""),
    ("ro.build.expect.bootloader", ""),
    ("ro.build.expect.baseband", ""),
    ("ro.build.version.security_patch", "2023-08-01"),
    ("ro.build.version.preview_sdk", "0"),
    ("ro.build.version.codename", "REL"),
    ("ro.build.version.all_codenames", "REL"),
    ("ro.build.type", BUILD_TYPE),
    ("ro.build.tags", BUILD_TAGS),
    ("ro.treble.enabled", "true"),
    ("ro.build.date.utc", "1692087179"),
    ("ro.build.user", "builder"),
    (
        "ro.build.host",
        "pangu-build-component-system-154250-9q7ms-lfm4h-qhs2q",
    ),
    ("net.bt.name", "Android"),
    ("ro.build.characteristics", "default"),
    ("ro.product.locale", "zh-CN"),
    ("ro.build.flavor", "missi_phoneext4_cn-user"),
    ("ro.config.ringtone", "Ring_Synth_04.ogg"),
];

/// Build properties assembled from other facts.
const DERIVED_PROPS: &[&str] = &[
    "ro.build.version.release",
    "ro.build.version.sdk",
    "ro.build.description",
    "ro.build.fingerprint",
    "ro.build.display.id",
];

/// Java system properties known to `systemGetSafe`.
const SYSTEM_PROPERTIES: &[&str] = &[
    "java.io.tmpdir",
    "user.home",
    "user.locale",
    "http.agent",
    "java.vm.version",
    "os.version",
    "persist.sys.timezone",
    "java.runtime.version",
    "java.boot.class.path",
];

/// Upper bound (inclusive) of the random sampling value reported by probe 75.
pub const SAMPLE_BOUND: u32 = 500_000;

/// The device fact table of one session.
///
/// Cheap to clone; the configuration and diagnostics are shared.
#[derive(Clone, Debug)]
pub struct DeviceFacts {
    config: Arc<SessionConfig>,
    diagnostics: Arc<Diagnostics>,
}

impl DeviceFacts {
    /// Creates the fact table for the given session configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The session configuration supplying the tunable facts
    /// * `diagnostics` - Receives configuration gaps
    #[must_use]
    pub fn new(config: Arc<SessionConfig>, diagnostics: Arc<Diagnostics>) -> Self {
        Self {
            config,
            diagnostics,
        }
    }

    /// Returns every build property key in the catalog.
    pub fn prop_keys() -> impl Iterator<Item = &'static str> {
        DERIVED_PROPS
            .iter()
            .copied()
            .chain(CONSTANT_PROPS.iter().map(|(key, _)| *key))
    }

    /// Returns every Java system property key in the catalog.
    pub fn system_property_keys() -> impl Iterator<Item = &'static str> {
        SYSTEM_PROPERTIES.iter().copied()
    }

    /// Looks up a build property in the catalog.
    ///
    /// Returns `None` for keys outside the catalog.
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<String> {
        let device = &self.config.device;
        let derived = match key {
            "ro.build.version.release" => Some(device.android_version.clone()),
            "ro.build.version.sdk" => Some(device.sdk_version.to_string()),
            "ro.build.description" => Some(self.description()),
            "ro.build.fingerprint" => Some(self.fingerprint()),
            "ro.build.display.id" => Some(self.display_id()),
            _ => None,
        };

        derived.or_else(|| {
            CONSTANT_PROPS
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_string())
        })
    }

    /// Looks up a build property, falling back to `-1` for unknown keys.
    ///
    /// Unknown keys are recorded as configuration gaps.
    #[must_use]
    pub fn lookup(&self, key: &str) -> String {
        self.prop(key)
            .unwrap_or_else(|| self.diagnostics.gap("prop", key, "-1"))
    }

    /// Looks up a Java system property in the catalog.
    ///
    /// Returns `None` for keys outside the catalog.
    #[must_use]
    pub fn system_property(&self, key: &str) -> Option<String> {
        let value = match key {
            "java.io.tmpdir" => format!("{}/cache", self.config.identity.data_dir()),
            "user.home" => String::new(),
            "user.locale" => "zh-CN".to_string(),
            "http.agent" => self.http_agent(),
            "java.vm.version" => "2.1.0".to_string(),
            "os.version" => "3.18.79".to_string(),
            // the Java property is never set on the handset
            "persist.sys.timezone" => "-1".to_string(),
            "java.runtime.version" => "0.9".to_string(),
            "java.boot.class.path" => BOOT_CLASS_PATH.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Looks up a Java system property, falling back to `-1` for unknown keys.
    ///
    /// Unknown keys are recorded as configuration gaps.
    #[must_use]
    pub fn system_get_safe(&self, key: &str) -> String {
        self.system_property(key)
            .unwrap_or_else(|| self.diagnostics.gap("systemGetSafe", key, "-1"))
    }

    /// Answers an environment probe of the `QsecEst` collector.
    ///
    /// Random and time based probes are drawn fresh on every call. Unknown ids are recorded as
    /// configuration gaps and answered with `0`.
    #[must_use]
    pub fn est_info(&self, id: i32) -> String {
        let identity = &self.config.identity;
        let device = &self.config.device;

        match id {
            0 => device.sdk_version.to_string(),
            1 => "k1".to_string(),
            // cpu count
            23 => "8".to_string(),
            25 => "0.0.12".to_string(),
            26 => SIGNATURE_MD5.to_uppercase(),
            // xposed, screen locked
            27 | 31 => "0".to_string(),
            28 | 43 => identity.package_name.clone(),
            // hardware
            41 => String::new(),
            42 => "WiFi".to_string(),
            44 => self.free_memory(),
            45 => device.storage_size.clone(),
            // qemu environment, qemu files, proxy, su
            46..=49 => "0".to_string(),
            50 => random_digits(10),
            51 => identity.version.clone(),
            52 => identity.code.clone(),
            // vpn
            68 => "0".to_string(),
            70 => "java.agent".to_string(),
            71 | 80 => "Asia/Shanghai".to_string(),
            72 => "800,1217".to_string(),
            73 => device.android_version.clone(),
            // screen brightness
            74 => "100".to_string(),
            75 => self.sample().to_string(),
            76 => "1,20,50".to_string(),
            77 => (32u64 * 1024 * 1024 * 1024).to_string(),
            // su binary
            78 => "0".to_string(),
            79 => "1.1.2".to_string(),
            81 => "zh".to_string(),
            82 => SECONDARY_SIGNATURE_MD5.to_uppercase(),
            83 => "0".to_string(),
            86 => random_alnum(32),
            // busybox, magisk
            87 | 88 => "0".to_string(),
            89 => current_millis().to_string(),
            90..=105 => "0".to_string(),
            _ => self.diagnostics.gap("QsecEst", &id.to_string(), "0"),
        }
    }

    /// `ro.build.description`, e.g. `mondrian-user 13 TKQ1.221013.002 release-keys`.
    #[must_use]
    pub fn description(&self) -> String {
        format!(
            "{DEVICE}-{BUILD_TYPE} {} {BUILD_ID} {BUILD_TAGS}",
            self.config.device.android_version
        )
    }

    /// `ro.build.fingerprint`, e.g.
    /// `Redmi/mondrian/mondrian:13/TKQ1.221013.002/V14.0.8.0.TMQCNXM:user/release-keys`.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        format!(
            "{BRAND}/{DEVICE}/{DEVICE}:{}/{BUILD_ID}/{INCREMENTAL}:{BUILD_TYPE}/{BUILD_TAGS}",
            self.config.device.android_version
        )
    }

    /// `ro.build.display.id`
    #[must_use]
    pub fn display_id(&self) -> String {
        format!("{BUILD_ID} {BUILD_TAGS}")
    }

    /// The Dalvik `http.agent` string.
    #[must_use]
    pub fn http_agent(&self) -> String {
        format!(
            "Dalvik/2.1.0 (Linux; U; Android {}; {MODEL} Build/{BUILD_ID})",
            self.config.device.android_version
        )
    }

    /// Screen size as reported by `Dtc.getScreenSize`, e.g. `[1080,2400]`.
    #[must_use]
    pub fn screen_size(&self) -> String {
        let device = &self.config.device;
        format!("[{},{}]", device.screen_width, device.screen_height)
    }

    /// Display density.
    #[must_use]
    pub fn density(&self) -> String {
        self.config.device.density.clone()
    }

    /// Total storage size in bytes.
    #[must_use]
    pub fn storage_size(&self) -> String {
        self.config.device.storage_size.clone()
    }

    /// App install time in milliseconds since the epoch.
    ///
    /// Read from the modification time of the configured install marker. A missing marker, or
    /// none configured, reads as `0` like `java.io.File.lastModified`.
    #[must_use]
    pub fn install_time(&self) -> String {
        let modified = self
            .config
            .identity
            .install_marker
            .as_ref()
            .and_then(|path| std::fs::metadata(path).ok())
            .and_then(|meta| meta.modified().ok())
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |elapsed| elapsed.as_millis());

        modified.to_string()
    }

    /// Random 7-digit free memory estimate.
    #[must_use]
    pub fn free_memory(&self) -> String {
        random_digits(7)
    }

    /// Uniform random sampling value in `0..=SAMPLE_BOUND`.
    #[must_use]
    pub fn sample(&self) -> u32 {
        rand::thread_rng().gen_range(0..=SAMPLE_BOUND)
    }
}

fn current_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::DiagnosticCategory, test::create_test_config, AppIdentity, DeviceConfig,
    };

    fn facts(config: SessionConfig) -> (DeviceFacts, Arc<Diagnostics>) {
        let diagnostics = Arc::new(Diagnostics::new());
        (
            DeviceFacts::new(Arc::new(config), Arc::clone(&diagnostics)),
            diagnostics,
        )
    }

    #[test]
    fn test_constant_props() {
        let (facts, diagnostics) = facts(create_test_config());
        assert_eq!(facts.lookup("ro.product.brand"), "Redmi");
        assert_eq!(facts.lookup("ro.product.name"), "mondrian");
        assert_eq!(facts.lookup("ro.build.version.security_patch"), "2023-08-01");
        assert_eq!(facts.lookup("ro.vendor.build.fingerprint"), "");
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_every_catalog_key_resolves() {
        let (facts, diagnostics) = facts(create_test_config());
        for key in DeviceFacts::prop_keys() {
            assert!(facts.prop(key).is_some(), "missing prop {key}");
        }
        for key in DeviceFacts::system_property_keys() {
            assert!(facts.system_property(key).is_some(), "missing property {key}");
        }
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_unknown_prop_is_gap() {
        let (facts, diagnostics) = facts(create_test_config());
        assert_eq!(facts.lookup("ro.product.model"), "-1");
        assert_eq!(facts.system_get_safe("file.encoding"), "-1");

        let gaps = diagnostics.by_category(DiagnosticCategory::ConfigurationGap);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].key.as_deref(), Some("ro.product.model"));
        assert_eq!(gaps[1].key.as_deref(), Some("file.encoding"));
    }

    #[test]
    fn test_derived_props_follow_config() {
        let config = SessionConfig::default()
            .with_device(DeviceConfig::default().with_android_version("12", 32));
        let (facts, _) = facts(config);

        assert_eq!(facts.lookup("ro.build.version.release"), "12");
        assert_eq!(facts.lookup("ro.build.version.sdk"), "32");
        assert_eq!(
            facts.lookup("ro.build.description"),
            "mondrian-user 12 TKQ1.221013.002 release-keys"
        );
        assert_eq!(
            facts.lookup("ro.build.fingerprint"),
            "Redmi/mondrian/mondrian:12/TKQ1.221013.002/V14.0.8.0.TMQCNXM:user/release-keys"
        );
        assert_eq!(facts.lookup("ro.build.display.id"), "TKQ1.221013.002 release-keys");
        assert_eq!(
            facts.system_get_safe("http.agent"),
            "Dalvik/2.1.0 (Linux; U; Android 12; 22101317C Build/TKQ1.221013.002)"
        );
    }

    #[test]
    fn test_system_properties_use_identity() {
        let config =
            SessionConfig::default().with_identity(AppIdentity::new("com.tencent.tim", "3.5.1", "1298"));
        let (facts, _) = facts(config);
        assert_eq!(
            facts.system_get_safe("java.io.tmpdir"),
            "/data/user/0/com.tencent.tim/cache"
        );
        assert_eq!(facts.system_get_safe("user.home"), "");
        assert!(facts
            .system_get_safe("java.boot.class.path")
            .starts_with("/system/framework/core-oj.jar:"));
    }

    #[test]
    fn test_est_info_constants() {
        let (facts, diagnostics) = facts(create_test_config());
        assert_eq!(facts.est_info(0), "33");
        assert_eq!(facts.est_info(26), "90721E0B3A587F77503B6ABEDD960C2E");
        assert_eq!(facts.est_info(82), "90721E0B3AAA7F77503B6ABEDD960C2E");
        assert_eq!(facts.est_info(28), "com.tencent.mobileqq");
        assert_eq!(facts.est_info(77), "34359738368");
        assert_eq!(facts.est_info(80), facts.est_info(71));
        for id in 90..=105 {
            assert_eq!(facts.est_info(id), "0");
        }
        assert!(!diagnostics.has_any());
    }

    #[test]
    fn test_est_info_random_bounds() {
        let (facts, _) = facts(create_test_config());
        for _ in 0..200 {
            let free = facts.est_info(44);
            assert_eq!(free.len(), 7);
            assert!(free.chars().all(|c| c.is_ascii_digit()));

            let sample: u32 = facts.est_info(75).parse().unwrap();
            assert!(sample <= SAMPLE_BOUND);

            assert_eq!(facts.est_info(50).len(), 10);
            assert_eq!(facts.est_info(86).len(), 32);
        }
    }

    #[test]
    fn test_est_info_time() {
        let (facts, _) = facts(create_test_config());
        let before = current_millis();
        let reported: u128 = facts.est_info(89).parse().unwrap();
        assert!(reported >= before);
    }

    #[test]
    fn test_est_info_unknown_is_gap() {
        let (facts, diagnostics) = facts(create_test_config());
        assert_eq!(facts.est_info(2), "0");
        assert_eq!(facts.est_info(106), "0");
        assert_eq!(
            diagnostics
                .by_category(DiagnosticCategory::ConfigurationGap)
                .len(),
            2
        );
    }

    #[test]
    fn test_install_time() {
        let (facts_without, _) = facts(create_test_config());
        assert_eq!(facts_without.install_time(), "0");

        let marker = tempfile::NamedTempFile::new().unwrap();
        let config = SessionConfig::default()
            .with_identity(AppIdentity::default().with_install_marker(marker.path()));
        let (facts_with, _) = facts(config);

        let reported: u128 = facts_with.install_time().parse().unwrap();
        assert!(reported > 0);
        assert!(reported <= current_millis());
    }

    #[test]
    fn test_screen_and_storage() {
        let config = SessionConfig::default().with_device(
            DeviceConfig::default()
                .with_screen_size(720, 1600)
                .with_storage_size(64),
        );
        let (facts, _) = facts(config);
        assert_eq!(facts.screen_size(), "[720,1600]");
        assert_eq!(facts.storage_size(), "64");
        assert_eq!(facts.density(), "2.75");
    }
}
