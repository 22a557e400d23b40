#![allow(unused_macros)]

/// Helper macro for locking items, propagating a poisoned lock as [`crate::Error::LockError`]
///
/// Must be used inside a function returning [`crate::Result`].
///
/// ```rust, ignore
///  let mut state = lock!(self.state);
///  state.o3did = Some(value);
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)?
    };
}
