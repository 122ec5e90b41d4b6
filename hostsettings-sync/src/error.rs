//! Error types for the settings layer.

use std::fmt;
use thiserror::Error;

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors that can occur in settings operations.
///
/// Every failure reaches the caller with its kind intact; nothing here is
/// retried or swallowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// No setting with that name exists on the host.
    #[error("setting {name:?} not found on host {host}")]
    NotFound { host: String, name: String },

    /// The host identifier does not resolve to a live host.
    #[error("host not found: {0}")]
    HostNotFound(String),

    /// The setting does not accept updates.
    #[error("setting {0:?} is read-only")]
    ReadOnly(String),

    /// The value failed local type validation or was rejected by the host.
    ///
    /// `allowed` carries the permitted set for choice settings so callers can
    /// correct the value without another query.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
        allowed: Vec<String>,
    },

    /// An identity string could not be decoded.
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    /// The session lacks the privilege for the call.
    #[error("access denied: {0}")]
    Denied(String),

    /// Transport failure, deadline expiry, or an unusable response.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

/// The kind of a [`SettingsError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    HostNotFound,
    ReadOnly,
    InvalidValue,
    InvalidIdentity,
    Denied,
    Unavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::HostNotFound => "HostNotFound",
            ErrorKind::ReadOnly => "ReadOnly",
            ErrorKind::InvalidValue => "InvalidValue",
            ErrorKind::InvalidIdentity => "InvalidIdentity",
            ErrorKind::Denied => "Denied",
            ErrorKind::Unavailable => "Unavailable",
        };
        f.write_str(name)
    }
}

impl SettingsError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SettingsError::NotFound { .. } => ErrorKind::NotFound,
            SettingsError::HostNotFound(_) => ErrorKind::HostNotFound,
            SettingsError::ReadOnly(_) => ErrorKind::ReadOnly,
            SettingsError::InvalidValue { .. } => ErrorKind::InvalidValue,
            SettingsError::InvalidIdentity(_) => ErrorKind::InvalidIdentity,
            SettingsError::Denied(_) => ErrorKind::Denied,
            SettingsError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// Returns true if a caller may reasonably retry the operation.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    /// Returns the permitted values if this is a choice validation failure.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match self {
            SettingsError::InvalidValue { allowed, .. } if !allowed.is_empty() => Some(allowed),
            _ => None,
        }
    }

    /// Wraps a coercion failure for the setting `key`.
    pub fn invalid_value(key: &str, err: hostsettings_types::Error) -> Self {
        match err {
            hostsettings_types::Error::InvalidValue {
                value,
                reason,
                allowed,
                ..
            } => SettingsError::InvalidValue {
                key: key.to_string(),
                value,
                reason,
                allowed,
            },
            other => other.into(),
        }
    }
}

impl From<hostsettings_types::Error> for SettingsError {
    fn from(err: hostsettings_types::Error) -> Self {
        match err {
            hostsettings_types::Error::InvalidValue {
                value,
                reason,
                allowed,
                ..
            } => SettingsError::InvalidValue {
                key: String::new(),
                value,
                reason,
                allowed,
            },
            e @ hostsettings_types::Error::InvalidIdentity { .. } => {
                SettingsError::InvalidIdentity(e.to_string())
            }
            e @ hostsettings_types::Error::InvalidDescriptor { .. } => {
                SettingsError::Unavailable(format!("host returned an unusable descriptor: {e}"))
            }
        }
    }
}

impl From<reqwest::Error> for SettingsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SettingsError::Unavailable(format!("request timed out: {err}"))
        } else if err.is_decode() {
            SettingsError::Unavailable(format!("undecodable response: {err}"))
        } else {
            SettingsError::Unavailable(format!("request failed: {err}"))
        }
    }
}
