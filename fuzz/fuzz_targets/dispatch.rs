#![no_main]

use libfuzzer_sys::fuzz_target;
use qsecenv::{
    env::{CallKind, Dispatcher, HostObject, JniValue},
    SessionConfig,
};
use std::sync::OnceLock;
use strum::IntoEnumIterator;

static DISPATCHER: OnceLock<Dispatcher> = OnceLock::new();

const SIGNATURES: &[&str] = &[
    "com/tencent/mobileqq/dt/app/Dtc->getPropSafe(Ljava/lang/String;)Ljava/lang/String;",
    "com/tencent/mobileqq/dt/app/Dtc->mmKVValue(Ljava/lang/String;)Ljava/lang/String;",
    "com/tencent/mobileqq/dt/app/Dtc->mmKVSaveValue(Ljava/lang/String;Ljava/lang/String;)V",
    "com/tencent/mobileqq/qsec/qsecest/QsecEst->a(Landroid/content/Context;I)Ljava/lang/String;",
    "com/tencent/mobileqq/channel/ChannelProxy->sendMessage(Ljava/lang/String;[BJ)V",
    "com/tencent/mobileqq/sign/QQSecuritySign$SignResult->token:[B",
    "java/io/File->canRead()Z",
    "java/lang/String->hashCode()I",
];

/// Decodes one argument from the front of `data`.
fn take_value(data: &mut &[u8]) -> Option<JniValue> {
    let (&tag, rest) = data.split_first()?;
    let len = usize::from(*rest.first()?).min(rest.len() - 1);
    let body = &rest[1..=len];
    *data = &rest[len + 1..];

    Some(match tag % 6 {
        0 => JniValue::Null,
        1 => JniValue::Int(body.iter().fold(0i32, |acc, b| acc.wrapping_mul(31) ^ i32::from(*b))),
        2 => JniValue::Long(body.iter().fold(-1i64, |acc, b| acc.wrapping_shl(8) | i64::from(*b))),
        3 => JniValue::String(String::from_utf8_lossy(body).into_owned()),
        4 => JniValue::Bytes(body.to_vec()),
        _ => JniValue::Object(HostObject::File(String::from_utf8_lossy(body).into_owned().into())),
    })
}

fuzz_target!(|data: &[u8]| {
    let dispatcher = DISPATCHER.get_or_init(|| Dispatcher::new(SessionConfig::default()));

    let Some((&selector, mut rest)) = data.split_first() else {
        return;
    };
    let kinds: Vec<CallKind> = CallKind::iter().collect();
    let kind = kinds[usize::from(selector >> 4) % kinds.len()];
    let signature = SIGNATURES[usize::from(selector & 0x0f) % SIGNATURES.len()];

    let this = take_value(&mut rest);
    let mut args = Vec::new();
    while let Some(value) = take_value(&mut rest) {
        args.push(value);
    }

    let _ = dispatcher.dispatch(signature, kind, this.as_ref(), &args);
    let _ = dispatcher.packets().try_drain();
});
