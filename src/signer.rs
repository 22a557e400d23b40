//! TLV 0x544 provider.
//!
//! The login protocol carries a TLV of type `0x544` whose body is produced by a native signing
//! routine. The routine itself lives outside this crate; [`Tlv544Provider`] only decides when it
//! is invoked and over which bytes.
//!
//! # Priming
//!
//! Every request signs twice. The first signature is computed and discarded: over a copy of the
//! payload whose first four bytes are zeroed for [`SaltVersion::V2`] commands, over the payload
//! itself for any other command. The second signature, over the unmodified payload, is returned.
//! Whether the native routine keeps state between the two calls is not known, so both calls are
//! always made.
//!
//! # Examples
//!
//! ```rust
//! use qsecenv::signer::{Tlv544Provider, TLV_544};
//!
//! let provider = Tlv544Provider::new(|payload: &[u8]| -> Vec<u8> {
//!     payload.iter().rev().copied().collect()
//! });
//!
//! assert_eq!(provider.encrypt_tlv(0x100, Some("810_9"), &[1, 2, 3]), None);
//! assert_eq!(provider.encrypt_tlv(TLV_544, Some("810_9"), &[1, 2, 3]), Some(vec![3, 2, 1]));
//! ```

use strum::{Display, EnumIter, IntoEnumIterator};

/// The TLV type handled by [`Tlv544Provider`].
pub const TLV_544: u16 = 0x544;

/// The external native signing routine.
///
/// Implemented for every `Fn(&[u8]) -> Vec<u8>` closure that is `Send + Sync`.
pub trait NativeSigner: Send + Sync {
    /// Signs `payload`.
    fn sign(&self, payload: &[u8]) -> Vec<u8>;
}

impl<F> NativeSigner for F
where
    F: Fn(&[u8]) -> Vec<u8> + Send + Sync,
{
    fn sign(&self, payload: &[u8]) -> Vec<u8> {
        self(payload)
    }
}

/// Salt generation of a login command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum SaltVersion {
    /// `810_2`, `810_7`, `810_24`, `810_25`
    V1,
    /// `810_9`, `810_a`, `810_d`, `810_f`
    V2,
    /// `812_a`
    V3,
}

impl SaltVersion {
    /// Commands signed with this salt generation.
    #[must_use]
    pub fn commands(self) -> &'static [&'static str] {
        match self {
            SaltVersion::V1 => &["810_2", "810_7", "810_24", "810_25"],
            SaltVersion::V2 => &["810_9", "810_a", "810_d", "810_f"],
            SaltVersion::V3 => &["812_a"],
        }
    }

    /// Classifies a command.
    ///
    /// Returns `None` for commands outside every salt list.
    #[must_use]
    pub fn of(command: &str) -> Option<Self> {
        SaltVersion::iter().find(|version| version.commands().contains(&command))
    }
}

/// Produces TLV 0x544 bodies with an external [`NativeSigner`].
#[derive(Debug, Clone)]
pub struct Tlv544Provider<S> {
    signer: S,
}

impl<S: NativeSigner> Tlv544Provider<S> {
    /// Creates a provider around the given signer.
    pub fn new(signer: S) -> Self {
        Self { signer }
    }

    /// Returns the wrapped signer.
    pub fn signer(&self) -> &S {
        &self.signer
    }

    /// Produces the TLV body for `tlv_type`.
    ///
    /// # Arguments
    ///
    /// * `tlv_type` - The TLV type being encoded
    /// * `command` - The login command the TLV belongs to, if known
    /// * `payload` - The bytes to sign
    ///
    /// # Returns
    ///
    /// `None` for every type other than [`TLV_544`], the signature of `payload` otherwise.
    pub fn encrypt_tlv(
        &self,
        tlv_type: u16,
        command: Option<&str>,
        payload: &[u8],
    ) -> Option<Vec<u8>> {
        if tlv_type != TLV_544 {
            return None;
        }

        log::info!("t544 command: {}", command.unwrap_or("null"));

        let salt = command.and_then(SaltVersion::of);
        let _ = match salt {
            Some(SaltVersion::V2) => self.signer.sign(&zero_prefix(payload)),
            _ => self.signer.sign(payload),
        };

        Some(self.signer.sign(payload))
    }
}

/// Copy of `payload` with its first four bytes zeroed.
fn zero_prefix(payload: &[u8]) -> Vec<u8> {
    let mut copy = payload.to_vec();
    let end = copy.len().min(4);
    copy[..end].fill(0);
    copy
}
