//! Identifier types for hosts and settings.
//!
//! A [`SettingIdentity`] is the only artifact persisted by callers. Its string
//! form is `<host>:<key>` with each component percent-encoded, so any host id
//! and any key survive a format/parse round trip.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the host and key components of an identity string.
pub const IDENTITY_SEPARATOR: char = ':';

/// Caller-supplied identifier of a host (inventory path, managed object id).
///
/// Opaque: no structure is assumed or interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Creates a host id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for HostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Stable identity of one setting on one host.
///
/// The key is the remote store's own key token, reused verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SettingIdentity {
    host_id: HostId,
    key: String,
}

impl SettingIdentity {
    /// Creates an identity from its two components.
    #[must_use]
    pub fn new(host_id: HostId, key: impl Into<String>) -> Self {
        Self {
            host_id,
            key: key.into(),
        }
    }

    /// The host component.
    #[must_use]
    pub fn host_id(&self) -> &HostId {
        &self.host_id
    }

    /// The setting key component.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Splits the identity into its components.
    #[must_use]
    pub fn into_parts(self) -> (HostId, String) {
        (self.host_id, self.key)
    }

    /// Parses an identity string produced by [`fmt::Display`].
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidIdentity {
            identity: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, key) = s
            .split_once(IDENTITY_SEPARATOR)
            .ok_or_else(|| invalid("expected <host>:<key>"))?;

        if key.contains(IDENTITY_SEPARATOR) {
            return Err(invalid("more than one separator"));
        }
        if host.is_empty() {
            return Err(invalid("empty host component"));
        }
        if key.is_empty() {
            return Err(invalid("empty key component"));
        }

        let host = urlencoding::decode(host).map_err(|_| invalid("host is not valid UTF-8"))?;
        let key = urlencoding::decode(key).map_err(|_| invalid("key is not valid UTF-8"))?;

        let identity = Self::new(HostId::new(host.into_owned()), key.into_owned());
        // Only the canonical encoding is accepted, so parse and format are inverses.
        if identity.to_string() != s {
            return Err(invalid("not canonically percent-encoded"));
        }
        Ok(identity)
    }
}

impl fmt::Display for SettingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            urlencoding::encode(self.host_id.as_str()),
            IDENTITY_SEPARATOR,
            urlencoding::encode(&self.key)
        )
    }
}

impl FromStr for SettingIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SettingIdentity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SettingIdentity> for String {
    fn from(identity: SettingIdentity) -> Self {
        identity.to_string()
    }
}
