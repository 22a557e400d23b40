//! Deep sleep detector state machine.
//!
//! The guest starts a long-lived timed check when the module is initialised, queries its result
//! while collecting device tokens, and stops it once the check is no longer needed.
//!
//! ```text
//!   Active ──stop()──► Stopped ──stop()──► Stopped
//! ```

use std::sync::Mutex;

use crate::Result;

/// State of the [`DeepSleepDetector`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum DetectorState {
    /// The check is running. Initial state.
    Active,
    /// The check was stopped by the guest.
    Stopped,
}

impl DetectorState {
    /// The result string reported to the guest for this state.
    #[must_use]
    pub fn check_result(self) -> &'static str {
        match self {
            DetectorState::Active => "1.0",
            DetectorState::Stopped => "0.0",
        }
    }
}

/// The deep sleep detector of one session.
///
/// Created in [`DetectorState::Active`] together with the session. [`stop`](Self::stop) and
/// [`check_result`](Self::check_result) may race, so the state lives behind a mutex like every
/// other piece of session state.
#[derive(Debug)]
pub struct DeepSleepDetector {
    state: Mutex<DetectorState>,
}

impl Default for DeepSleepDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl DeepSleepDetector {
    /// Creates an active detector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DetectorState::Active),
        }
    }

    /// Returns the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn state(&self) -> Result<DetectorState> {
        Ok(*lock!(self.state))
    }

    /// Stops the check. Stopping an already stopped detector has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn stop(&self) -> Result<()> {
        *lock!(self.state) = DetectorState::Stopped;
        Ok(())
    }

    /// Returns the result string for the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the state was poisoned.
    pub fn check_result(&self) -> Result<String> {
        Ok(self.state()?.check_result().to_string())
    }
}
