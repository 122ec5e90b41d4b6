//! Declared value types and wire-string coercion.
//!
//! Wire values are always strings; the host alone declares how a setting's
//! string is to be read. [`coerce`] is the single place where a raw string is
//! turned into a [`SettingValue`], and [`SettingValue`]'s `Display` is the
//! single place where it is turned back.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Value type declared by the host for a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Long,
    Int,
    Bool,
    Choice,
}

impl ValueType {
    /// All value types, in declaration order.
    pub const ALL: [ValueType; 5] = [
        ValueType::String,
        ValueType::Long,
        ValueType::Int,
        ValueType::Bool,
        ValueType::Choice,
    ];

    /// Returns the display name of this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "String",
            ValueType::Long => "Long",
            ValueType::Int => "Int",
            ValueType::Bool => "Bool",
            ValueType::Choice => "Choice",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ValueType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown value type: {s}"))
    }
}

/// A setting value interpreted according to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SettingValue {
    String(String),
    Long(i64),
    Int(i32),
    Bool(bool),
    Choice(String),
}

impl SettingValue {
    /// The declared type this value was coerced under.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            SettingValue::String(_) => ValueType::String,
            SettingValue::Long(_) => ValueType::Long,
            SettingValue::Int(_) => ValueType::Int,
            SettingValue::Bool(_) => ValueType::Bool,
            SettingValue::Choice(_) => ValueType::Choice,
        }
    }

    /// Canonical wire form of the value.
    #[must_use]
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::String(s) | SettingValue::Choice(s) => f.write_str(s),
            SettingValue::Long(n) => write!(f, "{n}"),
            SettingValue::Int(n) => write!(f, "{n}"),
            SettingValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Interprets `raw` under `value_type`.
///
/// `choices` is consulted only for [`ValueType::Choice`]. Invalid input is
/// rejected with [`Error::InvalidValue`]; nothing is truncated or clamped.
pub fn coerce(value_type: ValueType, choices: &[String], raw: &str) -> Result<SettingValue> {
    let invalid = |reason: String, allowed: Vec<String>| Error::InvalidValue {
        value: raw.to_string(),
        value_type,
        reason,
        allowed,
    };

    match value_type {
        ValueType::String => Ok(SettingValue::String(raw.to_string())),
        ValueType::Bool => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(SettingValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(SettingValue::Bool(false))
            } else {
                Err(invalid("expected true or false".to_string(), Vec::new()))
            }
        }
        ValueType::Int => raw
            .parse::<i32>()
            .map(SettingValue::Int)
            .map_err(|e| invalid(integer_reason(e.kind(), "32-bit"), Vec::new())),
        ValueType::Long => raw
            .parse::<i64>()
            .map(SettingValue::Long)
            .map_err(|e| invalid(integer_reason(e.kind(), "64-bit"), Vec::new())),
        ValueType::Choice => {
            if choices.iter().any(|c| c == raw) {
                Ok(SettingValue::Choice(raw.to_string()))
            } else if choices.is_empty() {
                Err(invalid("no choices declared".to_string(), Vec::new()))
            } else {
                Err(invalid(
                    format!("must be one of {}", choices.join(", ")),
                    choices.to_vec(),
                ))
            }
        }
    }
}

fn integer_reason(kind: &IntErrorKind, width: &str) -> String {
    match kind {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            format!("out of range for a {width} integer")
        }
        IntErrorKind::Empty => "empty string is not an integer".to_string(),
        _ => "not a base-10 integer".to_string(),
    }
}
