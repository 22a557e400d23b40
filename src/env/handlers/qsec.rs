//! Security module hooks.
//!
//! Covers the `QSecConfig` business fields, the `QSec` callbacks, the `QsecEst` environment
//! collector and the `secprotocol` helpers the TIM builds call during initialization.
//!
//! # Version-Locked Constants
//!
//! `secprotocol.t.s.e(Context)` returns a constant that is embedded in the protocol and differs
//! per app version. Only known versions are answered. Any other version fails the call with
//! [`Error::FatalMismatch`](crate::Error::FatalMismatch), because a guessed value would produce
//! packets the server rejects.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    env::{
        facts::SIGNATURE_MD5, CallKind, Environment, Hook, HookContext, HookManager, JniValue,
        PreHookResult,
    },
    Error, Result,
};

const QSEC_CONFIG: &str = "com/tencent/mobileqq/qsec/qsecurity/QSecConfig->";

const QSEC_UPDATE_O3DID: &str =
    "com/tencent/mobileqq/qsec/qsecurity/QSec->updateO3DID(Ljava/lang/String;)V";
const QSEC_GET_EST_INFO: &str =
    "com/tencent/mobileqq/qsec/qsecurity/QSec->getEstInfo()Ljava/lang/String;";

const QSEC_EST_PREFIX: &str = "com/tencent/mobileqq/qsec/qsecest/QsecEst->";
const QSEC_EST_SUFFIX: &str = "(Landroid/content/Context;I)Ljava/lang/String;";

const SECPROTOCOL_C: &str = "com/tencent/secprotocol/t/s->c(Landroid/content/Context;)Ljava/lang/String;";
const SECPROTOCOL_D: &str = "com/tencent/secprotocol/t/s->d(Landroid/content/Context;)Ljava/lang/String;";
const SECPROTOCOL_E: &str = "com/tencent/secprotocol/t/s->e(Landroid/content/Context;)I";
const BYTEDATA_PUT_UPING: &str =
    "com/tencent/secprotocol/ByteData->putUping(IIILjava/lang/Object;)V";

/// Reported by `getEstInfo` before the host recorded any est data.
pub const EST_NULL: &str = "e_null";

/// Known `secprotocol.t.s.e` constants, by app version.
const PROTOCOL_CONSTANTS: &[(&str, i32)] = &[("3.5.1", 345_546_704), ("3.5.2", 345_971_138)];

/// Registers all security module hooks with the given hook manager.
pub fn register(manager: &mut HookManager) {
    for field in ["uin", "seed", "guid", "o3did", "q36", "qua"] {
        let signature = format!("{QSEC_CONFIG}business_{field}:Ljava/lang/String;");
        manager.register(
            Hook::new(format!("QSecConfig.business_{field}"))
                .match_signature(CallKind::StaticGet, signature)
                .pre(move |_, env| {
                    let value = business_field(env, field)?;
                    Ok(PreHookResult::Bypass(Some(value.into())))
                }),
        );
    }

    manager.register(
        Hook::new("QSec.updateO3DID")
            .match_signature(CallKind::InstanceCall, QSEC_UPDATE_O3DID)
            .pre(qsec_update_o3did_pre),
    );

    manager.register(
        Hook::new("QSec.getEstInfo")
            .match_signature(CallKind::InstanceCall, QSEC_GET_EST_INFO)
            .pre(qsec_get_est_info_pre),
    );

    manager.register(
        Hook::new("QsecEst.*")
            .match_pattern(CallKind::StaticCall, QSEC_EST_PREFIX, QSEC_EST_SUFFIX)
            .pre(qsec_est_pre),
    );

    manager.register(
        Hook::new("secprotocol.s.c")
            .match_signature(CallKind::StaticCall, SECPROTOCOL_C)
            .pre(|_, env| {
                Ok(PreHookResult::Bypass(Some(
                    env.config().identity.package_name.clone().into(),
                )))
            }),
    );

    manager.register(
        Hook::new("secprotocol.s.d")
            .match_signature(CallKind::StaticCall, SECPROTOCOL_D)
            .pre(|_, _| Ok(PreHookResult::Bypass(Some(SIGNATURE_MD5.to_uppercase().into())))),
    );

    manager.register(
        Hook::new("secprotocol.s.e")
            .match_signature(CallKind::StaticCall, SECPROTOCOL_E)
            .pre(secprotocol_e_pre),
    );

    manager.register(
        Hook::new("ByteData.putUping")
            .match_signature(CallKind::InstanceCall, BYTEDATA_PUT_UPING)
            .pre(|_, _| Ok(PreHookResult::Bypass(None))),
    );
}

fn business_field(env: &Environment, field: &str) -> Result<String> {
    if field == "qua" {
        return Ok(env.config().identity.qua.clone());
    }

    env.session().read(|state| match field {
        "uin" => state.uin.clone(),
        "seed" => state.seed.clone(),
        "guid" => state.guid.clone(),
        "o3did" => state.o3did.clone(),
        "q36" => state.qimei36.clone(),
        _ => String::new(),
    })
}

fn qsec_update_o3did_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let o3did = ctx.arg_str(0)?;
    env.session().set_o3did(o3did)?;
    Ok(PreHookResult::Bypass(None))
}

fn qsec_get_est_info_pre(_ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let info = match env.session().est_data()? {
        Some(data) => STANDARD.encode(data),
        None => EST_NULL.to_string(),
    };
    Ok(PreHookResult::Bypass(Some(info.into())))
}

/// `QsecEst.*(Context, int)`
///
/// Every probe method of the collector shares this shape. The probe id is the second argument.
fn qsec_est_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let id = ctx.arg_i32(1)?;
    Ok(PreHookResult::Bypass(Some(env.facts().est_info(id).into())))
}

fn secprotocol_e_pre(ctx: &HookContext<'_>, env: &Environment) -> Result<PreHookResult> {
    let identity = &env.config().identity;

    let constant = PROTOCOL_CONSTANTS
        .iter()
        .find(|(version, _)| *version == identity.version)
        .map(|(_, constant)| *constant);

    match constant {
        Some(constant) => Ok(PreHookResult::Bypass(Some(JniValue::Int(constant)))),
        None => {
            log::error!(
                "No protocol constant for {} {}",
                identity.package_name,
                identity.version
            );
            env.diagnostics().push(
                Diagnostic::new(
                    DiagnosticSeverity::Error,
                    DiagnosticCategory::Protocol,
                    format!("Unsupported app version {}", identity.version),
                )
                .with_signature(ctx.signature),
            );
            Err(Error::FatalMismatch {
                signature: ctx.signature.to_string(),
                package: identity.package_name.clone(),
                version: identity.version.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        env::{HookOutcome, HostObject},
        test::{create_test_config, create_test_environment, invoke},
        AppIdentity,
    };

    fn context() -> JniValue {
        HostObject::class("android/content/Context").into()
    }

    fn static_field(env: &Environment, field: &str) -> HookOutcome {
        let signature = format!("{QSEC_CONFIG}business_{field}:Ljava/lang/String;");
        invoke(register, env, &signature, CallKind::StaticGet, None, &[]).unwrap()
    }

    fn handled(value: impl Into<JniValue>) -> HookOutcome {
        HookOutcome::Handled(Some(value.into()))
    }

    #[test]
    fn test_business_fields() {
        let env = create_test_environment();
        assert_eq!(static_field(&env, "uin"), handled("10001"));
        assert_eq!(
            static_field(&env, "guid"),
            handled("00112233445566778899aabbccddeeff")
        );
        assert_eq!(
            static_field(&env, "q36"),
            handled("0123456789abcdef0123456789abcdef0123")
        );
        assert_eq!(static_field(&env, "seed"), handled(""));
        assert_eq!(static_field(&env, "qua"), handled("V1_AND_SQ_8.9.80_4330_YYB_D"));
    }

    #[test]
    fn test_update_o3did() {
        let env = create_test_environment();
        assert_eq!(static_field(&env, "o3did"), handled(""));

        let this = context();
        let outcome = invoke(
            register,
            &env,
            QSEC_UPDATE_O3DID,
            CallKind::InstanceCall,
            Some(&this),
            &["o3-new".into()],
        )
        .unwrap();
        assert_eq!(outcome, HookOutcome::Handled(None));
        assert_eq!(static_field(&env, "o3did"), handled("o3-new"));
    }

    #[test]
    fn test_est_info() {
        let env = create_test_environment();
        let this = context();
        let call = |env: &Environment| {
            invoke(register, env, QSEC_GET_EST_INFO, CallKind::InstanceCall, Some(&this), &[])
                .unwrap()
        };

        assert_eq!(call(&env), handled(EST_NULL));

        env.session().set_est_data(b"hello".to_vec()).unwrap();
        assert_eq!(call(&env), handled("aGVsbG8="));
    }

    #[test]
    fn test_qsec_est_probes() {
        let env = create_test_environment();
        let probe = |name: &str, id: i32| {
            let signature = format!("{QSEC_EST_PREFIX}{name}{QSEC_EST_SUFFIX}");
            invoke(
                register,
                &env,
                &signature,
                CallKind::StaticCall,
                None,
                &[context(), JniValue::Int(id)],
            )
            .unwrap()
        };

        assert_eq!(probe("a", 0), handled("33"));
        assert_eq!(probe("b", 1), handled("k1"));
        assert_eq!(probe("p", 26), handled(SIGNATURE_MD5.to_uppercase()));
        assert_eq!(probe("zz", 95), handled("0"));
        assert!(!env.diagnostics().has_any());

        assert_eq!(probe("a", 999), handled("0"));
        assert_eq!(env.diagnostics().count(), 1);
    }

    #[test]
    fn test_secprotocol_helpers() {
        let env = create_test_environment();
        let args = [context()];

        let outcome = invoke(register, &env, SECPROTOCOL_C, CallKind::StaticCall, None, &args).unwrap();
        assert_eq!(outcome, handled("com.tencent.mobileqq"));

        let outcome = invoke(register, &env, SECPROTOCOL_D, CallKind::StaticCall, None, &args).unwrap();
        assert_eq!(outcome, handled("90721E0B3A587F77503B6ABEDD960C2E"));
    }

    #[test]
    fn test_protocol_constant_known_versions() {
        for (version, expected) in [("3.5.1", 345_546_704), ("3.5.2", 345_971_138)] {
            let config = create_test_config()
                .with_identity(AppIdentity::new("com.tencent.tim", version, "1298"));
            let env = Environment::new(config);
            let outcome =
                invoke(register, &env, SECPROTOCOL_E, CallKind::StaticCall, None, &[context()])
                    .unwrap();
            assert_eq!(outcome, handled(expected));
        }
    }

    #[test]
    fn test_protocol_constant_unknown_version() {
        let config = create_test_config()
            .with_identity(AppIdentity::new("com.tencent.tim", "3.5.6", "1298"));
        let env = Environment::new(config);

        let result = invoke(register, &env, SECPROTOCOL_E, CallKind::StaticCall, None, &[context()]);
        match result {
            Err(Error::FatalMismatch { version, package, .. }) => {
                assert_eq!(version, "3.5.6");
                assert_eq!(package, "com.tencent.tim");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let protocol = env.diagnostics().by_category(DiagnosticCategory::Protocol);
        assert_eq!(protocol.len(), 1);
        assert!(env.diagnostics().has_errors());
    }

    #[test]
    fn test_put_uping() {
        let env = create_test_environment();
        let this = HostObject::class("com/tencent/secprotocol/ByteData").into();
        let args = [JniValue::Int(1), JniValue::Int(2), JniValue::Int(3), JniValue::Null];
        let outcome = invoke(
            register,
            &env,
            BYTEDATA_PUT_UPING,
            CallKind::InstanceCall,
            Some(&this),
            &args,
        )
        .unwrap();
        assert_eq!(outcome, HookOutcome::Handled(None));
    }
}
