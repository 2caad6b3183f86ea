use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::FAVORITES_STORE_KEY;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },
}

/// A storage key scoped to a namespace, rendered as `namespace:key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey {
    namespace: KeyNamespace,
    key: String,
}

impl KvKey {
    pub fn new(namespace: KeyNamespace, key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        Self::validate_key(&key)?;
        Ok(Self { namespace, key })
    }

    /// `userdata:favorites`
    #[must_use]
    pub fn favorites() -> Self {
        Self {
            namespace: KeyNamespace::UserData,
            key: FAVORITES_STORE_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn raw(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.key)
    }

    #[must_use]
    pub fn namespace(&self) -> &KeyNamespace {
        &self.namespace
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn validate_key(key: &str) -> Result<(), KvError> {
        let invalid = |reason: &str| KvError::InvalidKey {
            key: key.chars().take(50).collect(),
            reason: reason.to_string(),
        };

        if key.trim().is_empty() {
            return Err(invalid("key cannot be empty"));
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(invalid(&format!(
                "key exceeds maximum length of {MAX_KEY_LENGTH} bytes"
            )));
        }

        if key.contains("..") {
            return Err(invalid("key cannot contain path traversal sequences"));
        }

        if key.starts_with('/') || key.starts_with('\\') {
            return Err(invalid("key cannot start with path separator"));
        }

        if key.contains(':') {
            return Err(invalid("key cannot contain the namespace separator"));
        }

        if key.chars().any(char::is_control) {
            return Err(invalid("key contains invalid control characters"));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyNamespace {
    UserData,
}

impl KeyNamespace {
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            KeyNamespace::UserData => "userdata",
        }
    }
}

/// Rejects values the shell store will not accept.
pub fn check_value_size(size: usize) -> Result<(), KvError> {
    if size > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size,
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}
