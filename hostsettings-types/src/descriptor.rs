//! Server-declared setting metadata.

use crate::value::{coerce, SettingValue, ValueType};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Metadata the host declares for one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Key, unique within the host's option namespace.
    pub key: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Whether the host refuses updates to this setting.
    #[serde(default)]
    pub read_only: bool,
    /// Allowed values, in host order. Only populated for choice settings.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl SettingDescriptor {
    /// Creates a writable descriptor with no choices.
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value_type,
            read_only: false,
            choices: Vec::new(),
        }
    }

    /// Creates a writable choice descriptor.
    pub fn choice<I, S>(key: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            value_type: ValueType::Choice,
            read_only: false,
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    /// Marks the descriptor read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Whether updates may be attempted at all.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !self.read_only
    }

    /// Checks the descriptor's own invariants.
    ///
    /// The key must be non-empty and a choice setting must declare at least
    /// one choice.
    pub fn check(&self) -> Result<()> {
        if self.key.is_empty() {
            return Err(Error::InvalidDescriptor {
                key: self.key.clone(),
                reason: "empty key".to_string(),
            });
        }
        if self.value_type == ValueType::Choice && self.choices.is_empty() {
            return Err(Error::InvalidDescriptor {
                key: self.key.clone(),
                reason: "choice setting declares no choices".to_string(),
            });
        }
        Ok(())
    }

    /// Interprets a raw wire value under this descriptor's type.
    pub fn coerce(&self, raw: &str) -> Result<SettingValue> {
        coerce(self.value_type, &self.choices, raw)
    }
}
