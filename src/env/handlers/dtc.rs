//! Device token collector hooks (`com.tencent.mobileqq.dt.app.Dtc`).
//!
//! `Dtc` is the guest's gateway to device facts and to its key-value preference store. Every
//! method takes a string key and answers with a string.
//!
//! # Preference Store
//!
//! `mmKVSaveValue` writes into the session preferences, and `mmKVValue` reads them back before
//! consulting its fixed key table. Unknown keys are configuration gaps answered with `-1`.
//!
//! | Key | Answer |
//! |-----|--------|
//! | `TuringRiskID-TuringCache-20230511` | empty |
//! | `DeviceToken-oaid-V001`, `DeviceToken-MODEL-XX-V001`, `DeviceToken-ANDROID-ID-V001` | empty |
//! | `o3_switch_Xwid`, `o3_xwid_switch` | saved `o3_switch_Xwid`, else `1` |
//! | `DeviceToken-qimei36-V001` | session qimei36 |
//! | `MQQ_SP_DEVICETOKEN_DID_DEVICEIDUUID_202207072241` | fresh random v4 UUID and app version, joined by `\|` |
//! | `DeviceToken-APN-V001`, `DeviceToken-TuringCache-V001` | `-1` |
//! | `DeviceToken-MAC-ADR-V001`, `DeviceToken-wifissid-V001` | `-1` |

use uuid::Uuid;

use crate::{
    env::{facts::INPUT_METHOD, CallKind, Environment, Hook, HookContext, HookManager, PreHookResult},
    Result,
};

const DTC: &str = "com/tencent/mobileqq/dt/app/Dtc->";

const MMKV_VALUE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->mmKVValue(Ljava/lang/String;)Ljava/lang/String;";
const MMKV_SAVE_VALUE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->mmKVSaveValue(Ljava/lang/String;Ljava/lang/String;)V";
const SAVE_LIST: &str = "com/tencent/mobileqq/dt/app/Dtc->saveList(Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;)V";

const XWID_SWITCH: &str = "o3_switch_Xwid";
const DEVICE_UUID: &str = "MQQ_SP_DEVICETOKEN_DID_DEVICEIDUUID_202207072241";

/// Handler for a `Dtc` getter with a `(Ljava/lang/String;)Ljava/lang/String;` signature.
type Getter = fn(&str, &Environment) -> String;

/// `Dtc` getters, by method name.
const GETTERS: &[(&str, Getter)] = &[
    ("getPropSafe", |key, env| env.facts().lookup(key)),
    ("getAppVersionName", |key, env| {
        version_info(env, "getAppVersionName", key, &env.config().identity.version)
    }),
    ("getAppVersionCode", |key, env| {
        version_info(env, "getAppVersionCode", key, &env.config().identity.code)
    }),
    ("getAppInstallTime", |_, env| env.facts().install_time()),
    ("getDensity", |_, env| env.facts().density()),
    ("getFontDpi", |_, env| env.facts().density()),
    ("getScreenSize", |_, env| env.facts().screen_size()),
    ("getStorage", |_, env| env.facts().storage_size()),
    ("systemGetSafe", |key, env| env.facts().system_get_safe(key)),
    ("getIME", |_, _| INPUT_METHOD.to_string()),
];

/// Registers all `Dtc` hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    for &(method, getter) in GETTERS {
        let signature = format!("{DTC}{method}(Ljava/lang/String;)Ljava/lang/String;");
        manager.register(
            Hook::new(format!("Dtc.{method}"))
                .match_signature(CallKind::StaticCall, signature)
                .pre(move |ctx, env| {
                    let key = ctx.arg_str(0)?;
                    Ok(PreHookResult::Bypass(Some(getter(key, env).into())))
                }),
        );
    }

    manager.register(
        Hook::new("Dtc.mmKVValue")
            .match_signature(CallKind::StaticCall, MMKV_VALUE)
            .pre(mmkv_value_pre),
    );

    manager.register(
        Hook::new("Dtc.mmKVSaveValue")
            .match_signature(CallKind::StaticCall, MMKV_SAVE_VALUE)
            .pre(mmkv_save_value_pre),
    );

    manager.register(
        Hook::new("Dtc.saveList")
            .match_signature(CallKind::StaticCall, SAVE_LIST)
            .pre(|_, _| Ok(PreHookResult::Bypass(None))),
    );
}

/// `getAppVersionName` and `getAppVersionCode` only answer the `empty` key.
fn version_info(env: &Environment, method: &str, key: &str, value: &str) -> String {
    if key == "empty" {
        value.to_string()
    } else {
        env.diagnostics().gap(method, key, "-1")
    }
}

fn mmkv_value_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let key = ctx.arg_str(0)?;
    let session = env.session();

    if let Some(saved) = session.preference(key)? {
        return Ok(PreHookResult::Bypass(Some(saved.into())));
    }

    let value = match key {
        "TuringRiskID-TuringCache-20230511"
        | "DeviceToken-oaid-V001"
        | "DeviceToken-MODEL-XX-V001"
        | "DeviceToken-ANDROID-ID-V001" => String::new(),
        "o3_switch_Xwid" | "o3_xwid_switch" => session
            .preference(XWID_SWITCH)?
            .unwrap_or_else(|| "1".to_string()),
        "DeviceToken-qimei36-V001" => session.read(|state| state.qimei36.clone())?,
        DEVICE_UUID => format!("{}|{}", Uuid::new_v4(), env.config().identity.version),
        "DeviceToken-APN-V001"
        | "DeviceToken-TuringCache-V001"
        | "DeviceToken-MAC-ADR-V001"
        | "DeviceToken-wifissid-V001" => "-1".to_string(),
        _ => env.diagnostics().gap("mmKVValue", key, "-1"),
    };

    Ok(PreHookResult::Bypass(Some(value.into())))
}

fn mmkv_save_value_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let key = ctx.arg_str(0)?;
    let value = ctx.arg_str(1)?;
    env.session().save_preference(key, value)?;
    Ok(PreHookResult::Bypass(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::DiagnosticCategory,
        env::{facts, HookOutcome, JniValue},
        test::{create_test_environment, invoke},
    };

    fn getter(method: &str) -> String {
        format!("{DTC}{method}(Ljava/lang/String;)Ljava/lang/String;")
    }

    fn call_str(env: &Environment, signature: &str, args: &[JniValue]) -> String {
        let value = invoke(register, env, signature, CallKind::StaticCall, None, args)
            .unwrap()
            .into_value()
            .unwrap();
        value.as_str().unwrap().to_string()
    }

    #[test]
    fn test_get_prop_safe() {
        let env = create_test_environment();
        let signature = getter("getPropSafe");

        assert_eq!(
            call_str(&env, &signature, &["ro.product.brand".into()]),
            facts::BRAND
        );
        assert_eq!(
            call_str(&env, &signature, &["ro.build.fingerprint".into()]),
            env.facts().fingerprint()
        );
        assert_eq!(call_str(&env, &signature, &["ro.nope".into()]), "-1");

        let gaps = env
            .diagnostics()
            .by_category(DiagnosticCategory::ConfigurationGap);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].key.as_deref(), Some("ro.nope"));
    }

    #[test]
    fn test_version_info() {
        let env = create_test_environment();
        let name = getter("getAppVersionName");
        let code = getter("getAppVersionCode");

        assert_eq!(call_str(&env, &name, &["empty".into()]), "8.9.80");
        assert_eq!(call_str(&env, &code, &["empty".into()]), "4330");
        assert_eq!(call_str(&env, &name, &["other".into()]), "-1");
        assert!(env.diagnostics().has_any());
    }

    #[test]
    fn test_device_getters() {
        let env = create_test_environment();
        let key = [JniValue::from("")];

        assert_eq!(call_str(&env, &getter("getDensity"), &key), "2.75");
        assert_eq!(call_str(&env, &getter("getFontDpi"), &key), "2.75");
        assert_eq!(call_str(&env, &getter("getScreenSize"), &key), "[1080,2400]");
        assert_eq!(call_str(&env, &getter("getStorage"), &key), "137438953471");
        assert_eq!(call_str(&env, &getter("getIME"), &key), INPUT_METHOD);
        assert_eq!(call_str(&env, &getter("getAppInstallTime"), &key), "0");
        assert_eq!(
            call_str(&env, &getter("systemGetSafe"), &["user.locale".into()]),
            "zh-CN"
        );
    }

    #[test]
    fn test_mmkv_fixed_keys() {
        let env = create_test_environment();

        assert_eq!(call_str(&env, MMKV_VALUE, &["DeviceToken-oaid-V001".into()]), "");
        assert_eq!(call_str(&env, MMKV_VALUE, &["o3_xwid_switch".into()]), "1");
        assert_eq!(call_str(&env, MMKV_VALUE, &["DeviceToken-MAC-ADR-V001".into()]), "-1");
        assert_eq!(
            call_str(&env, MMKV_VALUE, &["DeviceToken-qimei36-V001".into()]),
            "0123456789abcdef0123456789abcdef0123"
        );
        assert!(!env.diagnostics().has_any());

        assert_eq!(call_str(&env, MMKV_VALUE, &["unknown".into()]), "-1");
        assert_eq!(env.diagnostics().count(), 1);
    }

    #[test]
    fn test_mmkv_save_then_read() {
        let env = create_test_environment();

        let args = [JniValue::from(XWID_SWITCH), JniValue::from("0")];
        let outcome =
            invoke(register, &env, MMKV_SAVE_VALUE, CallKind::StaticCall, None, &args).unwrap();
        assert_eq!(outcome, HookOutcome::Handled(None));

        assert_eq!(call_str(&env, MMKV_VALUE, &["o3_switch_Xwid".into()]), "0");
        assert_eq!(call_str(&env, MMKV_VALUE, &["o3_xwid_switch".into()]), "0");

        let args = [JniValue::from("custom"), JniValue::from("value")];
        invoke(register, &env, MMKV_SAVE_VALUE, CallKind::StaticCall, None, &args).unwrap();
        assert_eq!(call_str(&env, MMKV_VALUE, &["custom".into()]), "value");
        assert!(!env.diagnostics().has_any());
    }

    #[test]
    fn test_mmkv_device_uuid() {
        let env = create_test_environment();
        let first = call_str(&env, MMKV_VALUE, &[DEVICE_UUID.into()]);
        let second = call_str(&env, MMKV_VALUE, &[DEVICE_UUID.into()]);

        let (uuid, version) = first.split_once('|').unwrap();
        assert_eq!(version, "8.9.80");
        assert_eq!(Uuid::parse_str(uuid).unwrap().get_version_num(), 4);
        assert_ne!(first, second);
    }

    #[test]
    fn test_save_list() {
        let env = create_test_environment();
        let args: Vec<JniValue> = (0..7).map(|i| JniValue::from(i.to_string())).collect();
        let outcome = invoke(register, &env, SAVE_LIST, CallKind::StaticCall, None, &args).unwrap();
        assert_eq!(outcome, HookOutcome::Handled(None));
    }
}
