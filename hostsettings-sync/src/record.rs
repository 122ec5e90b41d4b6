//! Per-operation state of one setting on one host.

use crate::client::{HostRef, RemoteOption};
use hostsettings_types::{HostId, SettingDescriptor, SettingIdentity};

/// Lifecycle position of a [`SettingRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Built from a successful query; no write requested.
    Fetched,
    /// A validated value is waiting for remote confirmation.
    Pending,
    /// The remote update returned success.
    Confirmed,
}

/// Observed state of one (host, key) pair.
///
/// Lives only for the duration of the operation that created it. Only the
/// operations in this crate construct or mutate records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingRecord {
    host_id: HostId,
    host: HostRef,
    descriptor: SettingDescriptor,
    current_value: String,
    pending_value: Option<String>,
    confirmed: bool,
}

impl SettingRecord {
    pub(crate) fn fetched(host_id: HostId, host: HostRef, option: RemoteOption) -> Self {
        Self {
            host_id,
            host,
            descriptor: option.descriptor,
            current_value: option.value,
            pending_value: None,
            confirmed: false,
        }
    }

    /// Records a validated value that is about to be sent.
    pub(crate) fn stage(&mut self, value: String) {
        self.pending_value = Some(value);
        self.confirmed = false;
    }

    /// Folds the value the host confirmed into the current value.
    pub(crate) fn confirm(&mut self, confirmed_value: String) {
        self.current_value = confirmed_value;
        self.pending_value = None;
        self.confirmed = true;
    }

    /// The caller-supplied host identifier.
    pub fn host_id(&self) -> &HostId {
        &self.host_id
    }

    /// The resolved host.
    pub fn host(&self) -> &HostRef {
        &self.host
    }

    pub fn descriptor(&self) -> &SettingDescriptor {
        &self.descriptor
    }

    /// The last value confirmed by the host.
    pub fn current_value(&self) -> &str {
        &self.current_value
    }

    pub fn pending_value(&self) -> Option<&str> {
        self.pending_value.as_deref()
    }

    pub fn state(&self) -> RecordState {
        if self.pending_value.is_some() {
            RecordState::Pending
        } else if self.confirmed {
            RecordState::Confirmed
        } else {
            RecordState::Fetched
        }
    }

    /// Stable identity of this record. Ignores any pending value.
    pub fn identity(&self) -> SettingIdentity {
        SettingIdentity::new(self.host_id.clone(), self.descriptor.key.clone())
    }
}
