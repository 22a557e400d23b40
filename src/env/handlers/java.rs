//! Java runtime hooks.
//!
//! | Member | Answer |
//! |--------|--------|
//! | `String.hashCode()` | Java string hash of the receiver |
//! | `ClassLoader.getSystemClassLoader()` | opaque `ClassLoader` |
//! | `Thread.currentThread()` | opaque `Thread` |
//! | `Thread.getStackTrace()` | empty array |

use crate::{
    env::{CallKind, Environment, Hook, HookContext, HookManager, HostObject, JniValue, PreHookResult},
    utils::java_string_hash,
    Error, Result,
};

const STRING_HASH_CODE: &str = "java/lang/String->hashCode()I";
const CLASSLOADER_GET_SYSTEM: &str =
    "java/lang/ClassLoader->getSystemClassLoader()Ljava/lang/ClassLoader;";
const THREAD_CURRENT: &str = "java/lang/Thread->currentThread()Ljava/lang/Thread;";
const THREAD_GET_STACK_TRACE: &str =
    "java/lang/Thread->getStackTrace()[Ljava/lang/StackTraceElement;";

/// Registers all Java runtime hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    manager.register(
        Hook::new("String.hashCode")
            .match_signature(CallKind::InstanceCall, STRING_HASH_CODE)
            .pre(string_hash_code_pre),
    );

    manager.register(
        Hook::new("ClassLoader.getSystemClassLoader")
            .match_signature(CallKind::StaticCall, CLASSLOADER_GET_SYSTEM)
            .pre(|_, _| {
                Ok(PreHookResult::Bypass(Some(
                    HostObject::class("java/lang/ClassLoader").into(),
                )))
            }),
    );

    manager.register(
        Hook::new("Thread.currentThread")
            .match_signature(CallKind::StaticCall, THREAD_CURRENT)
            .pre(|_, _| {
                Ok(PreHookResult::Bypass(Some(
                    HostObject::class("java/lang/Thread").into(),
                )))
            }),
    );

    manager.register(
        Hook::new("Thread.getStackTrace")
            .match_signature(CallKind::InstanceCall, THREAD_GET_STACK_TRACE)
            .pre(|_, _| Ok(PreHookResult::Bypass(Some(HostObject::Array(Vec::new()).into())))),
    );
}

/// `String.hashCode()`
///
/// `s[0]*31^(n-1) + s[1]*31^(n-2) + ... + s[n-1]` over UTF-16 code units, with 32-bit overflow.
fn string_hash_code_pre(ctx: &HookContext<'_>, _env: &Environment) -> Result<PreHookResult> {
    let Some(JniValue::String(value)) = ctx.this else {
        return Err(Error::InvalidReceiver {
            signature: ctx.signature.to_string(),
            expected: "String",
        });
    };

    Ok(PreHookResult::Bypass(Some(JniValue::Int(java_string_hash(
        value,
    )))))
}
