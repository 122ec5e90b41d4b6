//! Property-based tests for wire-value coercion.
//!
//! These verify laws that must hold for every declared type:
//! - Canonical wire strings survive coerce-then-format unchanged
//! - Invalid input fails instead of being truncated or clamped
//! - Identity strings survive format-then-parse unchanged
//! - Any identity string that parses formats back to itself

use hostsettings_types::{coerce, Error, HostId, SettingIdentity, SettingValue, ValueType};
use proptest::prelude::*;

// =============================================================================
// HELPER STRATEGIES
// =============================================================================

fn choices_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,8}", 1..6).prop_map(|set| set.into_iter().collect())
}

fn component_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex(".{1,40}").unwrap()
}

// =============================================================================
// ROUND-TRIP LAWS
// =============================================================================

mod roundtrip {
    use super::*;

    proptest! {
        #[test]
        fn string_roundtrip(raw in ".*") {
            let value = coerce(ValueType::String, &[], &raw).unwrap();
            prop_assert_eq!(value.to_wire(), raw);
        }

        #[test]
        fn long_roundtrip(n in any::<i64>()) {
            let raw = n.to_string();
            let value = coerce(ValueType::Long, &[], &raw).unwrap();
            prop_assert_eq!(value.clone(), SettingValue::Long(n));
            prop_assert_eq!(value.to_wire(), raw);
        }

        #[test]
        fn int_roundtrip(n in any::<i32>()) {
            let raw = n.to_string();
            let value = coerce(ValueType::Int, &[], &raw).unwrap();
            prop_assert_eq!(value.to_wire(), raw);
        }

        #[test]
        fn bool_roundtrip(b in any::<bool>()) {
            let raw = b.to_string();
            let value = coerce(ValueType::Bool, &[], &raw).unwrap();
            prop_assert_eq!(value.to_wire(), raw);
        }

        #[test]
        fn choice_roundtrip(choices in choices_strategy(), pick in any::<prop::sample::Index>()) {
            let raw = pick.get(&choices).clone();
            let value = coerce(ValueType::Choice, &choices, &raw).unwrap();
            prop_assert_eq!(value.to_wire(), raw);
        }

        #[test]
        fn identity_roundtrip(host in component_strategy(), key in component_strategy()) {
            let identity = SettingIdentity::new(HostId::new(host), key);
            let formatted = identity.to_string();
            let parsed = SettingIdentity::parse(&formatted).unwrap();
            prop_assert_eq!(parsed.to_string(), formatted);
            prop_assert_eq!(parsed, identity);
        }

        #[test]
        fn parsed_identity_formats_back_verbatim(s in "[a-zA-Z0-9%:. /_-]{0,24}") {
            if let Ok(identity) = SettingIdentity::parse(&s) {
                prop_assert_eq!(identity.to_string(), s);
            }
        }
    }
}

// =============================================================================
// REJECTION LAWS
// =============================================================================

mod rejection {
    use super::*;

    proptest! {
        /// Values beyond 32 bits never coerce to Int.
        #[test]
        fn int_rejects_out_of_range(n in prop_oneof![
            (i32::MAX as i64 + 1)..=i64::MAX,
            i64::MIN..(i32::MIN as i64),
        ]) {
            let err = coerce(ValueType::Int, &[], &n.to_string()).unwrap_err();
            let is_invalid_value = matches!(err, Error::InvalidValue { .. });
            prop_assert!(is_invalid_value);
        }

        /// Values beyond 64 bits never coerce to Long.
        #[test]
        fn long_rejects_out_of_range(n in prop_oneof![
            (i64::MAX as i128 + 1)..=i128::MAX,
            i128::MIN..(i64::MIN as i128),
        ]) {
            let err = coerce(ValueType::Long, &[], &n.to_string()).unwrap_err();
            let is_invalid_value = matches!(err, Error::InvalidValue { .. });
            prop_assert!(is_invalid_value);
        }

        #[test]
        fn integers_reject_letters(raw in "[0-9]{0,5}[a-zA-Z][0-9a-zA-Z]{0,5}") {
            prop_assert!(coerce(ValueType::Long, &[], &raw).is_err());
            prop_assert!(coerce(ValueType::Int, &[], &raw).is_err());
        }

        #[test]
        fn choice_rejects_non_members(choices in choices_strategy(), raw in "[A-Z0-9]{1,8}") {
            match coerce(ValueType::Choice, &choices, &raw) {
                Err(Error::InvalidValue { allowed, .. }) => prop_assert_eq!(allowed, choices),
                other => prop_assert!(false, "unexpected result: {:?}", other),
            }
        }

        #[test]
        fn bool_rejects_outside_lexicon(raw in "[a-z]{1,6}") {
            prop_assume!(raw != "true" && raw != "false");
            prop_assert!(coerce(ValueType::Bool, &[], &raw).is_err());
        }
    }
}
