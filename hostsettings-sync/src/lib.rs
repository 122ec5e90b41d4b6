//! Fetch, update and import engine for host advanced settings.
//!
//! Advanced settings are free-form key/value options a virtualization host
//! exposes through its management API. The host alone declares each
//! setting's type, whether it is writable, and for choice settings the
//! permitted values. This crate talks to that store:
//!
//! - **Client**: collaborator traits for host resolution and the option endpoint
//! - **Operations**: fetch, apply-update, identity import and derivation
//! - **Record**: the per-operation state of one setting
//! - **HTTP**: a `reqwest` implementation of the client traits
//! - **Mock**: an in-memory implementation for tests
//!
//! ## Apply-update
//!
//! 1. **Resolve**: map the caller's host id to a live host
//! 2. **Query**: fetch the descriptor fresh, never from a cache
//! 3. **Validate**: reject read-only settings, then coerce the value
//! 4. **Update**: push the canonical value and fold the confirmed result
//!
//! # Example
//!
//! ```
//! use hostsettings_sync::mock::MockBackend;
//! use hostsettings_sync::{apply_update, fetch, Session};
//! use hostsettings_types::{HostId, SettingDescriptor, ValueType};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio::time::Instant;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), hostsettings_sync::SettingsError> {
//! let backend = MockBackend::new().with_setting(
//!     "host-42",
//!     SettingDescriptor::new("Syslog.global.logHost", ValueType::String),
//!     "none",
//! );
//! let session = Session::from_backend(Arc::new(backend));
//! let host = HostId::new("host-42");
//! let deadline = Instant::now() + Duration::from_secs(5);
//!
//! let fetched = fetch(&session, &host, "Syslog.global.logHost", deadline).await?;
//! assert_eq!(fetched.identity.to_string(), "host-42:Syslog.global.logHost");
//!
//! let applied =
//!     apply_update(&session, &host, "Syslog.global.logHost", "udp://log:514", deadline).await?;
//! assert_eq!(applied.confirmed_value, "udp://log:514");
//! # Ok(())
//! # }
//! ```

pub mod client;
mod error;
pub mod http;
pub mod mock;
mod operations;
mod record;
mod session;

pub use client::{HostRef, HostResolver, RemoteOption, SettingsClient};
pub use error::{ErrorKind, SettingsError, SettingsResult};
pub use http::{HttpClientConfig, HttpSettingsClient};
pub use operations::{
    apply_update, derive_identity, fetch, fetch_record, list_supported, resolve_identity,
    AppliedUpdate, FetchedSetting,
};
pub use record::{RecordState, SettingRecord};
pub use session::Session;
