//! An in-memory settings backend for testing.
//!
//! Implements both [`HostResolver`] and [`SettingsClient`], enforces the same
//! read-only and type rules a real host does, and counts calls so tests can
//! assert that no mutating call was issued.

use crate::client::{HostRef, HostResolver, RemoteOption, SettingsClient};
use crate::error::{SettingsError, SettingsResult};
use async_trait::async_trait;
use hostsettings_types::{HostId, SettingDescriptor};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug)]
struct MockHost {
    host: HostRef,
    settings: BTreeMap<String, (SettingDescriptor, String)>,
}

impl MockHost {
    fn new(host_id: &str) -> Self {
        Self {
            host: HostRef::new(host_id, host_id),
            settings: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    hosts: HashMap<String, MockHost>,
    denied: bool,
    latency: Option<Duration>,
}

/// In-memory host inventory with advanced settings.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
    resolve_calls: AtomicUsize,
    query_calls: AtomicUsize,
    update_calls: AtomicUsize,
    supported_calls: AtomicUsize,
}

impl MockBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host with no settings, addressed by `host_id` on the wire as well.
    pub fn with_host(self, host_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .hosts
            .insert(host_id.to_string(), MockHost::new(host_id));
        self
    }

    /// Adds a setting to a host, creating the host if needed.
    pub fn with_setting(self, host_id: &str, descriptor: SettingDescriptor, value: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let host = state
                .hosts
                .entry(host_id.to_string())
                .or_insert_with(|| MockHost::new(host_id));
            host.settings
                .insert(descriptor.key.clone(), (descriptor, value.to_string()));
        }
        self
    }

    /// Makes every call fail with `Denied`.
    pub fn set_denied(&self, denied: bool) {
        self.state.lock().unwrap().denied = denied;
    }

    /// Delays every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.state.lock().unwrap().latency = latency;
    }

    /// Changes a value behind the client's back, as another writer would.
    pub fn set_value(&self, host_id: &str, key: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some((_, current)) = state
            .hosts
            .get_mut(host_id)
            .and_then(|h| h.settings.get_mut(key))
        {
            *current = value.to_string();
        }
    }

    /// Current value held by the host.
    pub fn value(&self, host_id: &str, key: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .hosts
            .get(host_id)
            .and_then(|h| h.settings.get(key))
            .map(|(_, v)| v.clone())
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    /// Number of mutating calls received, successful or not.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn supported_calls(&self) -> usize {
        self.supported_calls.load(Ordering::SeqCst)
    }

    /// Applies the configured latency and denial before a call.
    async fn enter(&self) -> SettingsResult<()> {
        let (latency, denied) = {
            let state = self.state.lock().unwrap();
            (state.latency, state.denied)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if denied {
            return Err(SettingsError::Denied("session lacks privilege".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl HostResolver for MockBackend {
    async fn resolve(&self, host_id: &HostId) -> SettingsResult<HostRef> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let state = self.state.lock().unwrap();
        state
            .hosts
            .get(host_id.as_str())
            .map(|h| h.host.clone())
            .ok_or_else(|| SettingsError::HostNotFound(host_id.to_string()))
    }
}

#[async_trait]
impl SettingsClient for MockBackend {
    fn backend_name(&self) -> &'static str {
        "mock"
    }

    async fn query(&self, host: &HostRef, name: &str) -> SettingsResult<RemoteOption> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let state = self.state.lock().unwrap();
        state
            .hosts
            .get(&host.moid)
            .and_then(|h| h.settings.get(name))
            .map(|(descriptor, value)| RemoteOption {
                descriptor: descriptor.clone(),
                value: value.clone(),
            })
            .ok_or_else(|| SettingsError::NotFound {
                host: host.moid.clone(),
                name: name.to_string(),
            })
    }

    async fn update(&self, host: &HostRef, name: &str, value: &str) -> SettingsResult<String> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let mut state = self.state.lock().unwrap();
        let (descriptor, current) = state
            .hosts
            .get_mut(&host.moid)
            .and_then(|h| h.settings.get_mut(name))
            .ok_or_else(|| SettingsError::NotFound {
                host: host.moid.clone(),
                name: name.to_string(),
            })?;

        if descriptor.read_only {
            return Err(SettingsError::ReadOnly(name.to_string()));
        }
        let confirmed = descriptor
            .coerce(value)
            .map_err(|e| SettingsError::invalid_value(name, e))?
            .to_wire();
        *current = confirmed.clone();
        Ok(confirmed)
    }

    async fn supported(&self, host: &HostRef) -> SettingsResult<Vec<SettingDescriptor>> {
        self.supported_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;
        let state = self.state.lock().unwrap();
        state
            .hosts
            .get(&host.moid)
            .map(|h| h.settings.values().map(|(d, _)| d.clone()).collect())
            .ok_or_else(|| SettingsError::HostNotFound(host.moid.clone()))
    }
}
