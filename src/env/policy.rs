//! Interception policy.
//!
//! Decides, before any hook runs, whether a call is answered by the environment at all. A few
//! signatures must reach the guest runtime's default behavior for specific application
//! identities, because the guest takes a different protocol path there.

use crate::MOBILEQQ_PACKAGE;

/// `QsecEst.p`, the probe entry point the QQ client resolves itself.
pub const QSEC_EST_P: &str =
    "com/tencent/mobileqq/qsec/qsecest/QsecEst->p(Landroid/content/Context;I)Ljava/lang/String;";

/// `QSecFramework.goingUp`, the native-to-Java upcall of the security framework.
pub const QSEC_FRAMEWORK_GOING_UP: &str = "com/tencent/qqprotect/qsec/QSecFramework->goingUp(JJJJLjava/lang/Object;Ljava/lang/Object;[Ljava/lang/Object;[Ljava/lang/Object;)I";

/// A signature that is never intercepted for one application identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exemption {
    /// The exempt call signature.
    pub signature: String,
    /// The package the exemption applies to.
    pub package: String,
}

impl Exemption {
    /// Creates an exemption.
    #[must_use]
    pub fn new(signature: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            package: package.into(),
        }
    }
}

/// Predicate gating the dispatcher.
///
/// The default policy exempts [`QSEC_EST_P`] and [`QSEC_FRAMEWORK_GOING_UP`] under
/// [`MOBILEQQ_PACKAGE`] and intercepts everything else.
///
/// # Examples
///
/// ```rust
/// use qsecenv::env::{policy::QSEC_EST_P, InterceptionPolicy};
///
/// let policy = InterceptionPolicy::default();
/// assert!(!policy.should_intercept(QSEC_EST_P, "com.tencent.mobileqq"));
/// assert!(policy.should_intercept(QSEC_EST_P, "com.tencent.tim"));
/// ```
#[derive(Clone, Debug)]
pub struct InterceptionPolicy {
    exemptions: Vec<Exemption>,
}

impl Default for InterceptionPolicy {
    fn default() -> Self {
        Self {
            exemptions: vec![
                Exemption::new(QSEC_EST_P, MOBILEQQ_PACKAGE),
                Exemption::new(QSEC_FRAMEWORK_GOING_UP, MOBILEQQ_PACKAGE),
            ],
        }
    }
}

impl InterceptionPolicy {
    /// Creates a policy that intercepts every call.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            exemptions: Vec::new(),
        }
    }

    /// Adds an exemption.
    #[must_use]
    pub fn with_exemption(mut self, exemption: Exemption) -> Self {
        self.exemptions.push(exemption);
        self
    }

    /// Returns the configured exemptions.
    #[must_use]
    pub fn exemptions(&self) -> &[Exemption] {
        &self.exemptions
    }

    /// Returns `false` if `signature` is exempt for `package`, `true` otherwise.
    #[must_use]
    pub fn should_intercept(&self, signature: &str, package: &str) -> bool {
        !self
            .exemptions
            .iter()
            .any(|e| e.signature == signature && e.package == package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exemptions_under_reserved_identity() {
        let policy = InterceptionPolicy::default();
        assert!(!policy.should_intercept(QSEC_EST_P, MOBILEQQ_PACKAGE));
        assert!(!policy.should_intercept(QSEC_FRAMEWORK_GOING_UP, MOBILEQQ_PACKAGE));
    }

    #[test]
    fn test_exempt_signatures_under_other_identities() {
        let policy = InterceptionPolicy::default();
        for package in ["com.tencent.tim", "com.tencent.qqlite", ""] {
            assert!(policy.should_intercept(QSEC_EST_P, package));
            assert!(policy.should_intercept(QSEC_FRAMEWORK_GOING_UP, package));
        }
    }

    #[test]
    fn test_other_signatures_always_intercepted() {
        let policy = InterceptionPolicy::default();
        let other =
            "com/tencent/mobileqq/qsec/qsecest/QsecEst->a(Landroid/content/Context;I)Ljava/lang/String;";
        for package in [MOBILEQQ_PACKAGE, "com.tencent.tim"] {
            assert!(policy.should_intercept(other, package));
            assert!(policy.should_intercept("java/lang/String->hashCode()I", package));
        }
    }

    #[test]
    fn test_custom_exemptions() {
        let policy = InterceptionPolicy::permissive()
            .with_exemption(Exemption::new("a->b()V", "com.example"));
        assert_eq!(policy.exemptions().len(), 1);
        assert!(!policy.should_intercept("a->b()V", "com.example"));
        assert!(policy.should_intercept(QSEC_EST_P, MOBILEQQ_PACKAGE));
    }
}
