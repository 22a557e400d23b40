//! Session state store.
//!
//! Holds everything one emulated account accumulates while the guest runs: the account
//! identifiers, the rotating o3 device id, est data, preference values saved by the guest, the
//! deep sleep detector and the outgoing packet channel.
//!
//! # Synchronization
//!
//! All mutable identifiers and preferences live in one [`SessionState`] behind a single mutex.
//! Contention is low, and one lock domain makes every read-modify-write sequence atomic with
//! respect to every other key. Use [`Session::read`] and [`Session::update`] for multi-key
//! access.
//!
//! # Defaults
//!
//! Identifiers the account configuration leaves unset read as the empty string. Preference keys
//! never saved read as `None` through [`Session::preference`] and as the empty string through
//! [`Session::get`].

use rustc_hash::FxHashMap;

use std::sync::Mutex;

use crate::{
    env::{DeepSleepDetector, PacketChannel},
    Result, SessionConfig,
};

/// Key of the account number in [`Session::get`] / [`Session::set`].
pub const KEY_UIN: &str = "uin";
/// Key of the random seed.
pub const KEY_SEED: &str = "seed";
/// Key of the device guid.
pub const KEY_GUID: &str = "guid";
/// Key of the rotating o3 device id.
pub const KEY_O3DID: &str = "o3did";
/// Key of the 36-character device fingerprint.
pub const KEY_QIMEI36: &str = "qimei36";

/// Typed session state.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    /// The account number.
    pub uin: String,
    /// Random seed.
    pub seed: String,
    /// Device guid.
    pub guid: String,
    /// Rotating o3 device id, replaced through `QSec.updateO3DID`.
    pub o3did: String,
    /// 36-character device fingerprint.
    pub qimei36: String,
    /// Est data recorded by the host, reported by `QSec.getEstInfo`.
    pub est_data: Option<Vec<u8>>,
    /// Values saved by the guest through `Dtc.mmKVSaveValue`.
    pub preferences: FxHashMap<String, String>,
}

impl SessionState {
    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            KEY_UIN => Some(&mut self.uin),
            KEY_SEED => Some(&mut self.seed),
            KEY_GUID => Some(&mut self.guid),
            KEY_O3DID => Some(&mut self.o3did),
            KEY_QIMEI36 => Some(&mut self.qimei36),
            _ => None,
        }
    }

    fn field(&self, key: &str) -> Option<&String> {
        match key {
            KEY_UIN => Some(&self.uin),
            KEY_SEED => Some(&self.seed),
            KEY_GUID => Some(&self.guid),
            KEY_O3DID => Some(&self.o3did),
            KEY_QIMEI36 => Some(&self.qimei36),
            _ => None,
        }
    }
}

/// The shared state of one emulation session.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
    detector: DeepSleepDetector,
    packets: PacketChannel,
}

impl Session {
    /// Creates the session state seeded from the account configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let account = &config.account;
        let state = SessionState {
            uin: account.uin.clone(),
            seed: account.seed.clone().unwrap_or_default(),
            guid: account.guid.clone().unwrap_or_default(),
            o3did: account.o3did.clone().unwrap_or_default(),
            qimei36: account.qimei36.clone().unwrap_or_default(),
            ..Default::default()
        };

        Self {
            state: Mutex::new(state),
            detector: DeepSleepDetector::new(),
            packets: PacketChannel::new(config.dispatch.packet_capacity),
        }
    }

    /// Runs `f` with shared access to the state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> Result<R> {
        let state = lock!(self.state);
        Ok(f(&state))
    }

    /// Runs `f` with exclusive access to the state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> Result<R> {
        let mut state = lock!(self.state);
        Ok(f(&mut state))
    }

    /// Reads a value by key.
    ///
    /// Known identifier keys ([`KEY_UIN`], [`KEY_SEED`], ...) read the typed field; any other key
    /// reads the saved preferences. Absent values read as the empty string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn get(&self, key: &str) -> Result<String> {
        self.read(|state| {
            state
                .field(key)
                .or_else(|| state.preferences.get(key))
                .cloned()
                .unwrap_or_default()
        })
    }

    /// Writes a value by key.
    ///
    /// Known identifier keys write the typed field; any other key is stored as a preference.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        self.update(|state| match state.field_mut(key) {
            Some(field) => *field = value,
            None => {
                state.preferences.insert(key.to_string(), value);
            }
        })
    }

    /// Returns the account number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn uin(&self) -> Result<String> {
        self.read(|state| state.uin.clone())
    }

    /// Returns the rotating o3 device id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn o3did(&self) -> Result<String> {
        self.read(|state| state.o3did.clone())
    }

    /// Replaces the rotating o3 device id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn set_o3did(&self, o3did: impl Into<String>) -> Result<()> {
        let o3did = o3did.into();
        self.update(|state| state.o3did = o3did)
    }

    /// Returns the recorded est data, if any.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn est_data(&self) -> Result<Option<Vec<u8>>> {
        self.read(|state| state.est_data.clone())
    }

    /// Records est data for `QSec.getEstInfo`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn set_est_data(&self, data: Vec<u8>) -> Result<()> {
        self.update(|state| state.est_data = Some(data))
    }

    /// Returns a preference value saved by the guest.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn preference(&self, key: &str) -> Result<Option<String>> {
        self.read(|state| state.preferences.get(key).cloned())
    }

    /// Saves a preference value for the rest of the session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn save_preference(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let (key, value) = (key.into(), value.into());
        self.update(|state| {
            state.preferences.insert(key, value);
        })
    }

    /// Returns the deep sleep detector.
    #[must_use]
    pub fn detector(&self) -> &DeepSleepDetector {
        &self.detector
    }

    /// Returns the outgoing packet channel.
    #[must_use]
    pub fn packets(&self) -> &PacketChannel {
        &self.packets
    }
}
