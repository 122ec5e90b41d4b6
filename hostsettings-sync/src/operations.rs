//! Fetch, apply-update and import of individual settings.
//!
//! Each operation resolves the host, queries the setting fresh and works on a
//! [`SettingRecord`] that is dropped when the operation returns. No state is
//! shared between calls, so applying the same value twice is naturally
//! idempotent: the second call observes the first call's result on the host.
//!
//! Every remote step is bounded by the caller's deadline. An expired deadline
//! abandons the remaining steps and reports `Unavailable`.

use crate::error::{SettingsError, SettingsResult};
use crate::record::SettingRecord;
use crate::session::Session;
use hostsettings_types::{HostId, SettingDescriptor, SettingIdentity, ValueType};
use serde::Serialize;
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a fetch or an identity import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchedSetting {
    pub identity: SettingIdentity,
    pub host_id: HostId,
    /// The setting key as the host reports it.
    pub name: String,
    pub value: String,
    pub value_type: ValueType,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl From<&SettingRecord> for FetchedSetting {
    fn from(record: &SettingRecord) -> Self {
        let descriptor = record.descriptor();
        Self {
            identity: derive_identity(record),
            host_id: record.host_id().clone(),
            name: descriptor.key.clone(),
            value: record.current_value().to_string(),
            value_type: descriptor.value_type,
            read_only: descriptor.read_only,
            choices: descriptor.choices.clone(),
        }
    }
}

/// Result of a successful apply-update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedUpdate {
    pub identity: SettingIdentity,
    /// Value observed on the host before the update.
    pub previous_value: String,
    /// Value the host confirmed. Authoritative for the caller's own view.
    pub confirmed_value: String,
    /// False when the host already held the requested value and no update
    /// was sent. Informational only: the host state, `identity` and
    /// `confirmed_value` are the same whether or not the update was sent.
    pub changed: bool,
}

/// Runs one remote step under the deadline.
async fn within<T, F>(deadline: Instant, step: &str, fut: F) -> SettingsResult<T>
where
    F: Future<Output = SettingsResult<T>>,
{
    if Instant::now() >= deadline {
        return Err(SettingsError::Unavailable(format!(
            "deadline expired before {step}"
        )));
    }
    match tokio::time::timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(SettingsError::Unavailable(format!(
            "deadline expired during {step}"
        ))),
    }
}

/// Resolves the host and queries one setting, returning the live record.
pub async fn fetch_record(
    session: &Session,
    host_id: &HostId,
    name: &str,
    deadline: Instant,
) -> SettingsResult<SettingRecord> {
    debug!("Resolving host {}", host_id);
    let host = within(deadline, "host resolution", session.resolver().resolve(host_id)).await?;

    debug!("Querying {} on host {} ({})", name, host_id, host.moid);
    let option = within(deadline, "query", session.client().query(&host, name)).await?;
    option.descriptor.check()?;

    let record = SettingRecord::fetched(host_id.clone(), host, option);
    debug!(
        "Fetched {} = {:?} ({}, read_only={})",
        record.descriptor().key,
        record.current_value(),
        record.descriptor().value_type,
        record.descriptor().read_only
    );
    Ok(record)
}

/// Fetches the current value and declared type of a setting.
pub async fn fetch(
    session: &Session,
    host_id: &HostId,
    name: &str,
    deadline: Instant,
) -> SettingsResult<FetchedSetting> {
    let record = fetch_record(session, host_id, name, deadline).await?;
    Ok(FetchedSetting::from(&record))
}

/// Validates `proposed` against the host's declared type and pushes it.
///
/// A read-only setting fails with `ReadOnly` before the value is looked at. An
/// invalid value fails with `InvalidValue` without any mutating call. When
/// the host already holds the value, nothing is sent and `changed` is false.
pub async fn apply_update(
    session: &Session,
    host_id: &HostId,
    name: &str,
    proposed: &str,
    deadline: Instant,
) -> SettingsResult<AppliedUpdate> {
    let mut record = fetch_record(session, host_id, name, deadline).await?;
    let key = record.descriptor().key.clone();

    if record.descriptor().read_only {
        return Err(SettingsError::ReadOnly(key));
    }

    let desired = record
        .descriptor()
        .coerce(proposed)
        .map_err(|e| SettingsError::invalid_value(&key, e))?;
    let previous_value = record.current_value().to_string();

    let unchanged = record
        .descriptor()
        .coerce(&previous_value)
        .is_ok_and(|current| current == desired);
    if unchanged {
        debug!("{} on host {} already {:?}, skipping update", key, host_id, previous_value);
        return Ok(AppliedUpdate {
            identity: derive_identity(&record),
            confirmed_value: previous_value.clone(),
            previous_value,
            changed: false,
        });
    }

    let wire_value = desired.to_wire();
    record.stage(wire_value.clone());

    debug!("Updating {} on host {}: {:?} -> {:?}", key, host_id, previous_value, wire_value);
    let confirmed = within(
        deadline,
        "update",
        session.client().update(record.host(), &key, &wire_value),
    )
    .await?;
    record.confirm(confirmed);

    info!(
        "Updated {} on host {} to {:?}",
        key,
        host_id,
        record.current_value()
    );
    Ok(AppliedUpdate {
        identity: derive_identity(&record),
        previous_value,
        confirmed_value: record.current_value().to_string(),
        changed: true,
    })
}

/// Decodes a previously derived identity and fetches the setting it names.
pub async fn resolve_identity(
    session: &Session,
    identity: &str,
    deadline: Instant,
) -> SettingsResult<FetchedSetting> {
    let (host_id, key) = SettingIdentity::parse(identity)?.into_parts();
    debug!("Importing {} as host {} key {}", identity, host_id, key);
    fetch(session, &host_id, &key, deadline).await
}

/// Stable identity string for a record.
pub fn derive_identity(record: &SettingRecord) -> SettingIdentity {
    record.identity()
}

/// Lists the host's supported settings, optionally only the writable ones.
///
/// Descriptors that break their own invariants are skipped with a warning.
pub async fn list_supported(
    session: &Session,
    host_id: &HostId,
    writable_only: bool,
    deadline: Instant,
) -> SettingsResult<Vec<SettingDescriptor>> {
    let host = within(deadline, "host resolution", session.resolver().resolve(host_id)).await?;
    let descriptors = within(deadline, "option listing", session.client().supported(&host)).await?;

    let total = descriptors.len();
    let listed: Vec<_> = descriptors
        .into_iter()
        .filter(|d| match d.check() {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping unusable descriptor on host {}: {}", host_id, e);
                false
            }
        })
        .filter(|d| !writable_only || d.is_writable())
        .collect();

    debug!("Host {} lists {} of {} options", host_id, listed.len(), total);
    Ok(listed)
}
