//! Remote settings abstraction traits.
//!
//! Defines the collaborator contract the operations run against: a host
//! resolver and the host's configuration-option endpoint. Implementations own
//! no setting state; every call is one round trip.

use crate::error::SettingsResult;
use async_trait::async_trait;
use hostsettings_types::{HostId, SettingDescriptor};
use serde::{Deserialize, Serialize};

/// Handle to one live host, as returned by a [`HostResolver`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostRef {
    /// Managed object token used to address the host on the wire.
    pub moid: String,
    /// Display name, possibly empty.
    #[serde(default)]
    pub name: String,
}

impl HostRef {
    /// Creates a host reference.
    pub fn new(moid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            moid: moid.into(),
            name: name.into(),
        }
    }
}

/// One option record returned by a query: its metadata and current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteOption {
    pub descriptor: SettingDescriptor,
    /// Current value in wire form.
    pub value: String,
}

/// Resolves caller-supplied host identifiers to live hosts.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Resolves `host_id`, failing with `HostNotFound` if no live host matches.
    async fn resolve(&self, host_id: &HostId) -> SettingsResult<HostRef>;
}

/// The host's configuration-option endpoint.
#[async_trait]
pub trait SettingsClient: Send + Sync {
    /// Returns the name of the backend, for logging.
    fn backend_name(&self) -> &'static str;

    /// Queries exactly one option by name.
    ///
    /// Fails with `NotFound` when the host has no option with that exact key.
    async fn query(&self, host: &HostRef, name: &str) -> SettingsResult<RemoteOption>;

    /// Pushes a new value and returns the value the host confirmed.
    async fn update(&self, host: &HostRef, name: &str, value: &str) -> SettingsResult<String>;

    /// Lists the host's supported options.
    async fn supported(&self, host: &HostRef) -> SettingsResult<Vec<SettingDescriptor>>;
}
