//! Values crossing the guest call boundary.
//!
//! Every argument, receiver and return value exchanged with the guest runtime is a [`JniValue`].
//! Host-side objects the environment hands out (files, intents, sign results, ...) are modelled
//! as [`HostObject`] so that later calls on them can be recognised and answered.

use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use strum::{Display, EnumIter, IntoStaticStr};

use crate::Result;

/// How a call reached the dispatcher.
///
/// The same signature string may legitimately appear with different kinds (a field can be read
/// and written), so the dispatch table is keyed by both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum CallKind {
    /// Read of a static field.
    StaticGet,
    /// Write of a static field.
    StaticSet,
    /// Read of an instance field.
    InstanceGet,
    /// Write of an instance field.
    InstanceSet,
    /// Call of a static method.
    StaticCall,
    /// Call of an instance method.
    InstanceCall,
    /// Constructor invocation.
    Construct,
}

impl CallKind {
    /// Returns `true` for kinds that have no receiver.
    #[must_use]
    pub fn is_static(self) -> bool {
        matches!(
            self,
            CallKind::StaticGet | CallKind::StaticSet | CallKind::StaticCall | CallKind::Construct
        )
    }
}

/// A typed value passed across the guest call boundary.
#[derive(Clone, Debug, PartialEq, IntoStaticStr)]
pub enum JniValue {
    /// The null reference.
    Null,
    /// A `boolean`.
    Boolean(bool),
    /// A 32-bit `int`.
    Int(i32),
    /// A 64-bit `long`.
    Long(i64),
    /// A `java.lang.String`.
    String(String),
    /// A `byte[]`.
    Bytes(Vec<u8>),
    /// Any other host-side object.
    Object(HostObject),
}

impl JniValue {
    /// Returns the variant name, used in argument mismatch errors.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.into()
    }

    /// Returns the contained string, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JniValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the contained bytes, if this is a byte array value.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            JniValue::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the contained host object, if any.
    #[must_use]
    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            JniValue::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl From<&str> for JniValue {
    fn from(value: &str) -> Self {
        JniValue::String(value.to_string())
    }
}

impl From<String> for JniValue {
    fn from(value: String) -> Self {
        JniValue::String(value)
    }
}

impl From<Vec<u8>> for JniValue {
    fn from(value: Vec<u8>) -> Self {
        JniValue::Bytes(value)
    }
}

impl From<i32> for JniValue {
    fn from(value: i32) -> Self {
        JniValue::Int(value)
    }
}

impl From<i64> for JniValue {
    fn from(value: i64) -> Self {
        JniValue::Long(value)
    }
}

impl From<bool> for JniValue {
    fn from(value: bool) -> Self {
        JniValue::Boolean(value)
    }
}

impl From<HostObject> for JniValue {
    fn from(value: HostObject) -> Self {
        JniValue::Object(value)
    }
}

/// Host-side objects handed to the guest.
#[derive(Clone, Debug, PartialEq)]
pub enum HostObject {
    /// An opaque instance of the named class (`ApplicationInfo`, `ContentResolver`, ...).
    Class(String),
    /// A `java.io.File`.
    File(PathBuf),
    /// An `android.content.Intent`.
    Intent {
        /// The intent action.
        action: String,
        /// Categories added through `addCategory`.
        categories: Vec<String>,
    },
    /// A `java.util.List`.
    List(Vec<JniValue>),
    /// An object array.
    Array(Vec<JniValue>),
    /// A `QQSecuritySign$SignResult` being filled by the guest.
    SignResult(SignResultHandle),
}

impl HostObject {
    /// Creates an opaque instance of the given class.
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        HostObject::Class(name.into())
    }
}

impl fmt::Display for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostObject::Class(name) => write!(f, "{}", name.replace('/', ".")),
            HostObject::File(path) => write!(f, "{}", path.display()),
            HostObject::Intent { action, .. } => write!(f, "Intent {{ act={action} }}"),
            HostObject::List(items) => write!(f, "List[{}]", items.len()),
            HostObject::Array(items) => write!(f, "Array[{}]", items.len()),
            HostObject::SignResult(_) => write!(f, "QQSecuritySign$SignResult"),
        }
    }
}

/// The fields collected into a sign result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignResult {
    /// The `token` field.
    pub token: Vec<u8>,
    /// The `extra` field.
    pub extra: Vec<u8>,
    /// The `sign` field.
    pub sign: Vec<u8>,
}

/// Shared handle to a sign result.
///
/// The guest constructs the object, hands it around and fills its fields one by one; the host
/// keeps a clone of the handle and reads the collected result afterwards. Two handles compare
/// equal when they refer to the same object.
#[derive(Clone, Debug, Default)]
pub struct SignResultHandle(Arc<Mutex<SignResult>>);

impl SignResultHandle {
    /// Creates a handle to an empty sign result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the `token` field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the result was poisoned.
    pub fn set_token(&self, data: Vec<u8>) -> Result<()> {
        lock!(self.0).token = data;
        Ok(())
    }

    /// Replaces the `extra` field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the result was poisoned.
    pub fn set_extra(&self, data: Vec<u8>) -> Result<()> {
        lock!(self.0).extra = data;
        Ok(())
    }

    /// Replaces the `sign` field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the result was poisoned.
    pub fn set_sign(&self, data: Vec<u8>) -> Result<()> {
        lock!(self.0).sign = data;
        Ok(())
    }

    /// Returns a copy of the collected fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::LockError`] if the result was poisoned.
    pub fn snapshot(&self) -> Result<SignResult> {
        Ok(lock!(self.0).clone())
    }
}

impl PartialEq for SignResultHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
