//! Explicit session handle passed into every operation.

use crate::client::{HostResolver, SettingsClient};
use std::fmt;
use std::sync::Arc;

/// An authenticated handle capable of issuing remote calls.
///
/// Cheap to clone. The provider that built it owns its lifetime and renewal;
/// operations only require it to stay valid while they run.
#[derive(Clone)]
pub struct Session {
    resolver: Arc<dyn HostResolver>,
    client: Arc<dyn SettingsClient>,
}

impl Session {
    /// Creates a session from separate resolver and client implementations.
    pub fn new(resolver: Arc<dyn HostResolver>, client: Arc<dyn SettingsClient>) -> Self {
        Self { resolver, client }
    }

    /// Creates a session from a backend that implements both roles.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: HostResolver + SettingsClient + 'static,
    {
        Self {
            resolver: backend.clone(),
            client: backend,
        }
    }

    /// The host resolver.
    pub fn resolver(&self) -> &dyn HostResolver {
        self.resolver.as_ref()
    }

    /// The settings client.
    pub fn client(&self) -> &dyn SettingsClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.client.backend_name())
            .finish_non_exhaustive()
    }
}
