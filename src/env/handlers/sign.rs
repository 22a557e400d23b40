//! `QQSecuritySign$SignResult` hooks.
//!
//! The guest allocates a sign result and stores `token`, `extra` and `sign` into it one field at
//! a time. The object is a [`SignResultHandle`], so the host reads the collected fields through
//! its own clone of the handle.

use crate::{
    env::{
        CallKind, Hook, HookContext, HookManager, HostObject, PreHookResult, SignResultHandle,
    },
    Error, Result,
};

const SIGN_RESULT_INIT: &str = "com/tencent/mobileqq/sign/QQSecuritySign$SignResult-><init>()V";
const SIGN_RESULT_TOKEN: &str = "com/tencent/mobileqq/sign/QQSecuritySign$SignResult->token:[B";
const SIGN_RESULT_EXTRA: &str = "com/tencent/mobileqq/sign/QQSecuritySign$SignResult->extra:[B";
const SIGN_RESULT_SIGN: &str = "com/tencent/mobileqq/sign/QQSecuritySign$SignResult->sign:[B";

/// Registers the sign result hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    manager.register(
        Hook::new("SignResult.<init>")
            .match_signature(CallKind::Construct, SIGN_RESULT_INIT)
            .pre(|_, _| {
                Ok(PreHookResult::Bypass(Some(
                    HostObject::SignResult(SignResultHandle::new()).into(),
                )))
            }),
    );

    manager.register(
        Hook::new("SignResult.token")
            .match_signature(CallKind::InstanceSet, SIGN_RESULT_TOKEN)
            .pre(|ctx, _| store(ctx, SignResultHandle::set_token)),
    );

    manager.register(
        Hook::new("SignResult.extra")
            .match_signature(CallKind::InstanceSet, SIGN_RESULT_EXTRA)
            .pre(|ctx, _| store(ctx, SignResultHandle::set_extra)),
    );

    manager.register(
        Hook::new("SignResult.sign")
            .match_signature(CallKind::InstanceSet, SIGN_RESULT_SIGN)
            .pre(|ctx, _| store(ctx, SignResultHandle::set_sign)),
    );
}

fn store(
    ctx: &HookContext<'_>,
    setter: fn(&SignResultHandle, Vec<u8>) -> Result<()>,
) -> Result<PreHookResult> {
    let HostObject::SignResult(handle) = ctx.this_object()? else {
        return Err(Error::InvalidReceiver {
            signature: ctx.signature.to_string(),
            expected: "SignResult",
        });
    };

    setter(handle, ctx.arg_bytes(0)?.to_vec())?;
    Ok(PreHookResult::Bypass(None))
}
