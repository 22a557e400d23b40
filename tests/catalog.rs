//! Integration tests for the call catalog.
//!
//! These tests drive the public [`Dispatcher`] the way the guest runtime does: one signature
//! string, call kind, receiver and argument list per call.

use qsecenv::{
    diagnostics::DiagnosticCategory,
    env::{CallKind, Dispatcher, HookOutcome, HostObject, JniValue},
    AccountConfig, AppIdentity, DeviceConfig, SessionConfig,
};

const GET_PROP_SAFE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->getPropSafe(Ljava/lang/String;)Ljava/lang/String;";
const SYSTEM_GET_SAFE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->systemGetSafe(Ljava/lang/String;)Ljava/lang/String;";
const MMKV_VALUE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->mmKVValue(Ljava/lang/String;)Ljava/lang/String;";
const MMKV_SAVE_VALUE: &str =
    "com/tencent/mobileqq/dt/app/Dtc->mmKVSaveValue(Ljava/lang/String;Ljava/lang/String;)V";

fn config() -> SessionConfig {
    SessionConfig::default()
        .with_account(
            AccountConfig::new("10001")
                .with_seed("1234")
                .with_guid("00112233445566778899aabbccddeeff")
                .with_qimei36("0123456789abcdef0123456789abcdef0123"),
        )
        .with_identity(AppIdentity::default().with_android_id("DEADBEEF00112233"))
}

fn context() -> JniValue {
    HostObject::class("android/content/Context").into()
}

fn string_call(dispatcher: &Dispatcher, signature: &str, key: &str) -> String {
    let outcome = dispatcher
        .dispatch(signature, CallKind::StaticCall, None, &[JniValue::from(key)])
        .unwrap();
    match outcome.into_value() {
        Some(JniValue::String(value)) => value,
        other => panic!("{signature} returned {other:?}"),
    }
}

#[test]
fn build_strings_agree_with_their_parts() {
    let config = config().with_device(DeviceConfig::default().with_android_version("12", 32));
    let dispatcher = Dispatcher::new(config);

    let release = string_call(&dispatcher, GET_PROP_SAFE, "ro.build.version.release");
    let build_id = string_call(&dispatcher, GET_PROP_SAFE, "ro.build.id");
    let brand = string_call(&dispatcher, GET_PROP_SAFE, "ro.product.brand");
    let device = string_call(&dispatcher, GET_PROP_SAFE, "ro.product.device");
    let incremental = string_call(&dispatcher, GET_PROP_SAFE, "ro.build.version.incremental");
    let build_type = string_call(&dispatcher, GET_PROP_SAFE, "ro.build.type");
    let tags = string_call(&dispatcher, GET_PROP_SAFE, "ro.build.tags");

    assert_eq!(release, "12");
    assert_eq!(
        string_call(&dispatcher, GET_PROP_SAFE, "ro.build.description"),
        format!("{device}-{build_type} {release} {build_id} {tags}")
    );
    assert_eq!(
        string_call(&dispatcher, GET_PROP_SAFE, "ro.build.fingerprint"),
        format!("{brand}/{device}/{device}:{release}/{build_id}/{incremental}:{build_type}/{tags}")
    );

    assert_eq!(
        string_call(&dispatcher, GET_PROP_SAFE, "ro.build.display.id"),
        format!("{build_id} {tags}")
    );

    let agent = string_call(&dispatcher, SYSTEM_GET_SAFE, "http.agent");
    assert!(agent.contains(&format!("Android {release};")));
    assert!(agent.ends_with(&format!("Build/{build_id})")));

    let sdk = dispatcher
        .dispatch(
            "android/os/Build$VERSION->SDK_INT:I",
            CallKind::StaticGet,
            None,
            &[],
        )
        .unwrap();
    assert_eq!(sdk, HookOutcome::Handled(Some(JniValue::Int(32))));
    assert_eq!(string_call(&dispatcher, GET_PROP_SAFE, "ro.build.version.sdk"), "32");

    assert!(!dispatcher.diagnostics().has_any());
}

#[test]
fn est_probes_agree_with_device_facts() {
    let dispatcher = Dispatcher::new(
        config().with_identity(AppIdentity::new("com.tencent.tim", "3.5.2", "1300")),
    );

    let probe = |id: i32| {
        let outcome = dispatcher
            .dispatch(
                "com/tencent/mobileqq/qsec/qsecest/QsecEst->p(Landroid/content/Context;I)Ljava/lang/String;",
                CallKind::StaticCall,
                None,
                &[context(), JniValue::Int(id)],
            )
            .unwrap();
        outcome.into_value().and_then(|v| v.as_str().map(str::to_string))
    };

    assert_eq!(probe(0).as_deref(), Some("33"));
    assert_eq!(probe(28).as_deref(), Some("com.tencent.tim"));
    assert_eq!(probe(51).as_deref(), Some("3.5.2"));
    assert_eq!(probe(52).as_deref(), Some("1300"));
    assert_eq!(probe(73).as_deref(), Some("13"));

    let storage = string_call(
        &dispatcher,
        "com/tencent/mobileqq/dt/app/Dtc->getStorage(Ljava/lang/String;)Ljava/lang/String;",
        "",
    );
    assert_eq!(probe(45), Some(storage));
}

#[test]
fn preferences_round_trip_through_the_guest_api() {
    let dispatcher = Dispatcher::new(config());

    for (key, value) in [("o3_switch_Xwid", "0"), ("DeviceToken-oaid-V001", "oaid")] {
        let outcome = dispatcher
            .dispatch(
                MMKV_SAVE_VALUE,
                CallKind::StaticCall,
                None,
                &[JniValue::from(key), JniValue::from(value)],
            )
            .unwrap();
        assert_eq!(outcome, HookOutcome::Handled(None));
        assert_eq!(string_call(&dispatcher, MMKV_VALUE, key), value);
    }

    assert_eq!(string_call(&dispatcher, MMKV_VALUE, "o3_xwid_switch"), "0");
    assert_eq!(
        dispatcher.session().preference("o3_switch_Xwid").unwrap().as_deref(),
        Some("0")
    );
}

#[test]
fn account_identifiers_follow_the_session() {
    let dispatcher = Dispatcher::new(config());
    let field = |name: &str| {
        let signature =
            format!("com/tencent/mobileqq/qsec/qsecurity/QSecConfig->business_{name}:Ljava/lang/String;");
        dispatcher
            .dispatch(&signature, CallKind::StaticGet, None, &[])
            .unwrap()
            .into_value()
    };

    assert_eq!(field("seed"), Some(JniValue::from("1234")));
    assert_eq!(field("o3did"), Some(JniValue::from("")));

    dispatcher
        .dispatch(
            "com/tencent/mobileqq/qsec/qsecurity/QSec->updateO3DID(Ljava/lang/String;)V",
            CallKind::InstanceCall,
            Some(&HostObject::class("com/tencent/mobileqq/qsec/qsecurity/QSec").into()),
            &[JniValue::from("o3-rotated")],
        )
        .unwrap();

    assert_eq!(field("o3did"), Some(JniValue::from("o3-rotated")));
    assert_eq!(
        string_call(&dispatcher, MMKV_VALUE, "DeviceToken-qimei36-V001"),
        "0123456789abcdef0123456789abcdef0123"
    );
}

#[test]
fn android_id_is_lower_cased() {
    let dispatcher = Dispatcher::new(config());
    let outcome = dispatcher
        .dispatch(
            "android/provider/Settings$System->getString(Landroid/content/ContentResolver;Ljava/lang/String;)Ljava/lang/String;",
            CallKind::StaticCall,
            None,
            &[
                HostObject::class("android/content/ContentResolver").into(),
                JniValue::from("android_id"),
            ],
        )
        .unwrap();
    assert_eq!(outcome.into_value(), Some(JniValue::from("deadbeef00112233")));
}

#[test]
fn gaps_and_unhandled_calls_are_reported() {
    let dispatcher = Dispatcher::new(config());

    assert_eq!(string_call(&dispatcher, GET_PROP_SAFE, "ro.secure"), "-1");
    assert_eq!(string_call(&dispatcher, SYSTEM_GET_SAFE, "file.encoding"), "-1");
    assert_eq!(string_call(&dispatcher, MMKV_VALUE, "DeviceToken-unknown"), "-1");

    let outcome = dispatcher
        .dispatch(
            "java/lang/ClassLoader->loadClass(Ljava/lang/String;)Ljava/lang/Class;",
            CallKind::InstanceCall,
            None,
            &[JniValue::from("com.tencent.mobileqq.fe.FEKit")],
        )
        .unwrap();
    assert_eq!(outcome, HookOutcome::NoMatch);

    let diagnostics = dispatcher.diagnostics();
    let gaps = diagnostics.by_category(DiagnosticCategory::ConfigurationGap);
    let keys: Vec<_> = gaps.iter().filter_map(|d| d.key.as_deref()).collect();
    assert_eq!(keys, ["ro.secure", "file.encoding", "DeviceToken-unknown"]);
    assert_eq!(
        diagnostics.by_category(DiagnosticCategory::UnhandledCall).len(),
        1
    );
    assert!(!diagnostics.has_errors());
}

#[test]
fn file_access_probes() {
    let dispatcher = Dispatcher::new(config());

    let file = |path: &str| {
        dispatcher
            .dispatch(
                "java/io/File-><init>(Ljava/lang/String;)V",
                CallKind::Construct,
                None,
                &[JniValue::from(path)],
            )
            .unwrap()
            .into_value()
            .unwrap()
    };
    let can_read = |file: &JniValue| {
        dispatcher
            .dispatch("java/io/File->canRead()Z", CallKind::InstanceCall, Some(file), &[])
            .unwrap()
    };

    assert_eq!(
        can_read(&file("/data/data/com.tencent.mobileqq/..")),
        HookOutcome::Handled(Some(JniValue::Boolean(false)))
    );
    assert_eq!(can_read(&file("/sdcard/Download")), HookOutcome::NoMatch);
}
