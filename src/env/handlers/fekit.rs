//! FEKit hooks.
//!
//! | Member | Effect |
//! |--------|--------|
//! | `IFEKitLog.i`, `IFEKitLog.e` | forwarded to the `log` facade at debug level |
//! | `ChannelProxy.sendMessage` | publishes an [`OutgoingPacket`] |
//! | `DeepSleepDetector.getCheckResult` | `1.0` while active, `0.0` once stopped |
//! | `DeepSleepDetector.stopCheck` | stops the detector |
//! | `FEBound.transform` | forwarded to the installed [`ByteTransform`](crate::env::ByteTransform) |

use crate::{
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    env::{CallKind, Environment, Hook, HookContext, HookManager, OutgoingPacket, PreHookResult},
    utils::to_hex,
    Result,
};

const FEKIT_LOG_I: &str = "com/tencent/mobileqq/fe/IFEKitLog->i(Ljava/lang/String;ILjava/lang/String;)V";
const FEKIT_LOG_E: &str = "com/tencent/mobileqq/fe/IFEKitLog->e(Ljava/lang/String;ILjava/lang/String;)V";
const CHANNEL_SEND_MESSAGE: &str =
    "com/tencent/mobileqq/channel/ChannelProxy->sendMessage(Ljava/lang/String;[BJ)V";
const DETECTOR_GET_CHECK_RESULT: &str =
    "com/tencent/mobileqq/fe/utils/DeepSleepDetector->getCheckResult()Ljava/lang/String;";
const DETECTOR_STOP_CHECK: &str = "com/tencent/mobileqq/fe/utils/DeepSleepDetector->stopCheck()V";
const FEBOUND_TRANSFORM: &str = "com/tencent/mobileqq/dt/model/FEBound->transform(I[B)[B";

/// Registers all FEKit hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    manager.register(
        Hook::new("IFEKitLog.i")
            .match_signature(CallKind::InstanceCall, FEKIT_LOG_I)
            .pre(|ctx, _| fekit_log(ctx, "info")),
    );

    manager.register(
        Hook::new("IFEKitLog.e")
            .match_signature(CallKind::InstanceCall, FEKIT_LOG_E)
            .pre(|ctx, _| fekit_log(ctx, "error")),
    );

    manager.register(
        Hook::new("ChannelProxy.sendMessage")
            .match_signature(CallKind::InstanceCall, CHANNEL_SEND_MESSAGE)
            .pre(channel_send_message_pre),
    );

    manager.register(
        Hook::new("DeepSleepDetector.getCheckResult")
            .match_signature(CallKind::StaticCall, DETECTOR_GET_CHECK_RESULT)
            .pre(|_, env| {
                let result = env.session().detector().check_result()?;
                Ok(PreHookResult::Bypass(Some(result.into())))
            }),
    );

    manager.register(
        Hook::new("DeepSleepDetector.stopCheck")
            .match_signature(CallKind::StaticCall, DETECTOR_STOP_CHECK)
            .pre(|_, env| {
                env.session().detector().stop()?;
                Ok(PreHookResult::Bypass(None))
            }),
    );

    manager.register(
        Hook::new("FEBound.transform")
            .match_signature(CallKind::StaticCall, FEBOUND_TRANSFORM)
            .pre(febound_transform_pre),
    );
}

fn fekit_log(ctx: &HookContext<'_>, level: &str) -> Result<PreHookResult> {
    let tag = ctx.arg_str(0)?;
    let msg = ctx.arg_str(2)?;
    log::debug!("{tag}{level}: {msg}");
    Ok(PreHookResult::Bypass(None))
}

/// `ChannelProxy.sendMessage(String cmd, byte[] data, long callbackId)`
///
/// Packets with the discard correlation id are accepted, logged by the channel and dropped.
fn channel_send_message_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let command = ctx.arg_str(0)?;
    let payload = ctx.arg_bytes(1)?;
    let correlation_id = ctx.arg_i64(2)?;

    let uin = env.session().uin()?;
    let packet = OutgoingPacket::new(command, payload.to_vec(), correlation_id);
    log::debug!(
        "uin = {uin}, id = {correlation_id}, sendPacket(cmd = {command}, data = {})",
        packet.payload_hex()
    );

    if env.session().packets().publish(packet)? {
        env.diagnostics().push(
            Diagnostic::new(
                DiagnosticSeverity::Info,
                DiagnosticCategory::Packet,
                format!("Queued {command} ({correlation_id})"),
            )
            .with_signature(ctx.signature),
        );
    }

    Ok(PreHookResult::Bypass(None))
}

/// `FEBound.transform(int mode, byte[] data)`
///
/// Without an installed transform the call is left to the guest runtime.
fn febound_transform_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let Some(transform) = env.transform() else {
        return Ok(PreHookResult::Continue);
    };

    let mode = ctx.arg_i32(0)?;
    let data = ctx.arg_bytes(1)?;
    let result = transform.transform(mode, data);

    if mode == 1 {
        log::debug!("FEBound.transform({}) => {}", to_hex(data), to_hex(&result));
    }

    Ok(PreHookResult::Bypass(Some(result.into())))
}
