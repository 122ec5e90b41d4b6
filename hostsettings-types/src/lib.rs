//! Core type definitions for host advanced settings.
//!
//! This crate defines the plugin-free, I/O-free types shared by the sync
//! layer and its callers:
//! - Host and setting identifiers, including the persisted identity string
//! - The closed set of declared value types and their typed values
//! - Server-declared setting descriptors
//!
//! All interpretation of untyped wire strings lives in [`coerce`]; nothing
//! else in the workspace converts a raw value into a typed one.

mod descriptor;
mod ids;
mod value;

pub use descriptor::SettingDescriptor;
pub use ids::{HostId, SettingIdentity, IDENTITY_SEPARATOR};
pub use value::{coerce, SettingValue, ValueType};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A raw value does not satisfy its declared type.
    #[error("invalid {value_type} value {value:?}: {reason}")]
    InvalidValue {
        value: String,
        value_type: ValueType,
        reason: String,
        /// The allowed set, populated for choice settings only.
        allowed: Vec<String>,
    },

    #[error("invalid identity {identity:?}: {reason}")]
    InvalidIdentity { identity: String, reason: String },

    #[error("invalid descriptor for {key:?}: {reason}")]
    InvalidDescriptor { key: String, reason: String },
}
