use hostsettings_sync::mock::MockBackend;
use hostsettings_sync::{
    apply_update, derive_identity, fetch, fetch_record, list_supported, resolve_identity,
    ErrorKind, RecordState, Session, SettingsError,
};
use hostsettings_types::{HostId, SettingDescriptor, ValueType};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn backend() -> Arc<MockBackend> {
    Arc::new(
        MockBackend::new()
            .with_setting(
                "host-42",
                SettingDescriptor::new("Syslog.global.logHost", ValueType::String),
                "none",
            )
            .with_setting(
                "host-42",
                SettingDescriptor::choice("Misc.choice", ["low", "medium", "high"]),
                "low",
            )
            .with_setting(
                "host-42",
                SettingDescriptor::new("Net.TcpipHeapSize", ValueType::Int),
                "32",
            )
            .with_setting(
                "host-42",
                SettingDescriptor::new("Mem.ShareForceSalting", ValueType::Bool),
                "true",
            )
            .with_setting(
                "host-9",
                SettingDescriptor::new("Power.someFixedFlag", ValueType::Bool).read_only(),
                "false",
            ),
    )
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

fn host(id: &str) -> HostId {
    HostId::new(id)
}

// ── Fetch ───────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_string_setting_scenario() {
    let session = Session::from_backend(backend());

    let fetched = fetch(&session, &host("host-42"), "Syslog.global.logHost", deadline())
        .await
        .unwrap();

    assert_eq!(fetched.identity.to_string(), "host-42:Syslog.global.logHost");
    assert_eq!(fetched.value, "none");
    assert_eq!(fetched.value_type, ValueType::String);
    assert!(!fetched.read_only);
}

#[tokio::test]
async fn fetch_choice_reports_choices() {
    let session = Session::from_backend(backend());
    let fetched = fetch(&session, &host("host-42"), "Misc.choice", deadline())
        .await
        .unwrap();
    assert_eq!(fetched.value_type, ValueType::Choice);
    assert_eq!(fetched.choices, vec!["low", "medium", "high"]);
}

#[tokio::test]
async fn fetch_read_only_setting_succeeds() {
    let session = Session::from_backend(backend());
    let fetched = fetch(&session, &host("host-9"), "Power.someFixedFlag", deadline())
        .await
        .unwrap();
    assert!(fetched.read_only);
    assert_eq!(fetched.value, "false");
}

#[tokio::test]
async fn fetch_unknown_name_is_not_found() {
    let session = Session::from_backend(backend());
    let err = fetch(&session, &host("host-42"), "No.such.key", deadline())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn fetch_unknown_host_is_host_not_found() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let err = fetch(&session, &host("host-404"), "Misc.choice", deadline())
        .await
        .unwrap_err();
    assert_eq!(err, SettingsError::HostNotFound("host-404".into()));
    assert_eq!(backend.query_calls(), 0);
}

#[tokio::test]
async fn fetch_denied_session() {
    let backend = backend();
    backend.set_denied(true);
    let session = Session::from_backend(backend);
    let err = fetch(&session, &host("host-42"), "Misc.choice", deadline())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Denied);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn fetch_record_is_in_fetched_state() {
    let session = Session::from_backend(backend());
    let record = fetch_record(&session, &host("host-42"), "Net.TcpipHeapSize", deadline())
        .await
        .unwrap();
    assert_eq!(record.state(), RecordState::Fetched);
    assert_eq!(record.pending_value(), None);
    assert_eq!(record.host().moid, "host-42");
}

#[tokio::test]
async fn fetch_rejects_choice_descriptor_without_choices() {
    let backend = Arc::new(MockBackend::new().with_setting(
        "host-1",
        SettingDescriptor::choice("Broken.choice", Vec::<String>::new()),
        "x",
    ));
    let session = Session::from_backend(backend);
    let err = fetch(&session, &host("host-1"), "Broken.choice", deadline())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
}

// ── Apply-update ────────────────────────────────────────────────

#[tokio::test]
async fn choice_update_scenario() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());

    let err = apply_update(&session, &host("host-42"), "Misc.choice", "extreme", deadline())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    assert_eq!(
        err.allowed_values().unwrap(),
        ["low".to_string(), "medium".to_string(), "high".to_string()]
    );
    assert!(err.to_string().contains("low, medium, high"));
    assert_eq!(backend.update_calls(), 0);

    let applied = apply_update(&session, &host("host-42"), "Misc.choice", "high", deadline())
        .await
        .unwrap();
    assert_eq!(applied.confirmed_value, "high");
    assert_eq!(applied.previous_value, "low");
    assert!(applied.changed);
    assert_eq!(backend.value("host-42", "Misc.choice").as_deref(), Some("high"));
}

#[tokio::test]
async fn read_only_scenario_never_calls_update() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());

    for value in ["true", "false", "not-a-bool", ""] {
        let err = apply_update(&session, &host("host-9"), "Power.someFixedFlag", value, deadline())
            .await
            .unwrap_err();
        assert_eq!(err, SettingsError::ReadOnly("Power.someFixedFlag".into()));
    }
    assert_eq!(backend.update_calls(), 0);
}

#[tokio::test]
async fn apply_is_idempotent() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());

    let first = apply_update(&session, &host("host-42"), "Net.TcpipHeapSize", "64", deadline())
        .await
        .unwrap();
    let second = apply_update(&session, &host("host-42"), "Net.TcpipHeapSize", "64", deadline())
        .await
        .unwrap();

    assert_eq!(first.confirmed_value, "64");
    assert_eq!(second.confirmed_value, first.confirmed_value);
    assert_eq!(second.identity, first.identity);
    assert!(first.changed);
    assert!(!second.changed);
    assert_eq!(backend.update_calls(), 1);
    assert_eq!(
        backend.value("host-42", "Net.TcpipHeapSize").as_deref(),
        Some("64")
    );

    let after = fetch(&session, &host("host-42"), "Net.TcpipHeapSize", deadline())
        .await
        .unwrap();
    assert_eq!(after.value, second.confirmed_value);
    assert_eq!(after.identity, second.identity);
}

#[tokio::test]
async fn apply_current_value_is_noop() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let applied = apply_update(
        &session,
        &host("host-42"),
        "Syslog.global.logHost",
        "none",
        deadline(),
    )
    .await
    .unwrap();
    assert!(!applied.changed);
    assert_eq!(applied.confirmed_value, "none");
    assert_eq!(backend.update_calls(), 0);
}

#[tokio::test]
async fn apply_compares_canonical_values() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let applied = apply_update(
        &session,
        &host("host-42"),
        "Mem.ShareForceSalting",
        "TRUE",
        deadline(),
    )
    .await
    .unwrap();
    assert!(!applied.changed);
    assert_eq!(backend.update_calls(), 0);
}

#[tokio::test]
async fn apply_sends_canonical_form() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let applied = apply_update(
        &session,
        &host("host-42"),
        "Mem.ShareForceSalting",
        "False",
        deadline(),
    )
    .await
    .unwrap();
    assert_eq!(applied.confirmed_value, "false");
    assert_eq!(
        backend.value("host-42", "Mem.ShareForceSalting").as_deref(),
        Some("false")
    );
}

#[tokio::test]
async fn apply_rejects_out_of_range_int_locally() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let err = apply_update(
        &session,
        &host("host-42"),
        "Net.TcpipHeapSize",
        "4294967296",
        deadline(),
    )
    .await
    .unwrap_err();
    match err {
        SettingsError::InvalidValue { key, value, allowed, .. } => {
            assert_eq!(key, "Net.TcpipHeapSize");
            assert_eq!(value, "4294967296");
            assert!(allowed.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.update_calls(), 0);
}

#[tokio::test]
async fn apply_observes_external_changes() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());

    apply_update(&session, &host("host-42"), "Misc.choice", "medium", deadline())
        .await
        .unwrap();
    backend.set_value("host-42", "Misc.choice", "low");

    let applied = apply_update(&session, &host("host-42"), "Misc.choice", "medium", deadline())
        .await
        .unwrap();
    assert!(applied.changed);
    assert_eq!(applied.previous_value, "low");
    assert_eq!(backend.update_calls(), 2);
}

// ── Identity ────────────────────────────────────────────────────

#[tokio::test]
async fn identity_roundtrip_through_import() {
    let session = Session::from_backend(backend());

    let record = fetch_record(&session, &host("host-42"), "Net.TcpipHeapSize", deadline())
        .await
        .unwrap();
    let identity = derive_identity(&record);

    let imported = resolve_identity(&session, &identity.to_string(), deadline())
        .await
        .unwrap();
    assert_eq!(imported.host_id, *record.host_id());
    assert_eq!(imported.name, "Net.TcpipHeapSize");
    assert_eq!(imported.value, "32");
    assert_eq!(imported.identity, identity);
}

#[tokio::test]
async fn derive_identity_is_stable() {
    let session = Session::from_backend(backend());
    let a = fetch_record(&session, &host("host-9"), "Power.someFixedFlag", deadline())
        .await
        .unwrap();
    let b = fetch_record(&session, &host("host-9"), "Power.someFixedFlag", deadline())
        .await
        .unwrap();
    assert_eq!(derive_identity(&a), derive_identity(&b));
    assert_eq!(derive_identity(&a).to_string(), "host-9:Power.someFixedFlag");
}

#[tokio::test]
async fn malformed_identity_fails_before_any_call() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());

    for bad in ["Misc.choice", "host-42:", ":Misc.choice", "a:b:c"] {
        let err = resolve_identity(&session, bad, deadline()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentity, "{bad}");
    }
    assert_eq!(backend.resolve_calls(), 0);
    assert_eq!(backend.query_calls(), 0);
}

#[tokio::test]
async fn import_of_removed_setting_is_not_found() {
    let session = Session::from_backend(backend());
    let err = resolve_identity(&session, "host-42:Gone.setting", deadline())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ── Deadlines ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn slow_host_yields_unavailable() {
    let backend = backend();
    backend.set_latency(Some(Duration::from_secs(10)));
    let session = Session::from_backend(backend.clone());

    let deadline = Instant::now() + Duration::from_secs(1);
    let err = fetch(&session, &host("host-42"), "Misc.choice", deadline)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(err.is_retryable());
    assert_eq!(backend.query_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn deadline_expiring_mid_operation_skips_update() {
    let backend = backend();
    backend.set_latency(Some(Duration::from_millis(400)));
    let session = Session::from_backend(backend.clone());

    // Resolve and query take 800ms; the update would need 400ms more.
    let deadline = Instant::now() + Duration::from_millis(1000);
    let err = apply_update(&session, &host("host-42"), "Misc.choice", "high", deadline)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(backend.value("host-42", "Misc.choice").as_deref(), Some("low"));
}

#[tokio::test]
async fn expired_deadline_abandons_before_first_call() {
    let backend = backend();
    let session = Session::from_backend(backend.clone());
    let err = fetch(&session, &host("host-42"), "Misc.choice", Instant::now())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(backend.resolve_calls(), 0);
}

// ── Supported options ───────────────────────────────────────────

#[tokio::test]
async fn list_supported_filters_read_only() {
    let backend = Arc::new(
        MockBackend::new()
            .with_setting(
                "host-1",
                SettingDescriptor::new("A.writable", ValueType::Long),
                "1",
            )
            .with_setting(
                "host-1",
                SettingDescriptor::new("B.fixed", ValueType::String).read_only(),
                "x",
            ),
    );
    let session = Session::from_backend(backend.clone());

    let all = list_supported(&session, &host("host-1"), false, deadline())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let writable = list_supported(&session, &host("host-1"), true, deadline())
        .await
        .unwrap();
    let keys: Vec<_> = writable.iter().map(|d| d.key.as_str()).collect();
    assert_eq!(keys, vec!["A.writable"]);
    assert_eq!(backend.supported_calls(), 2);
    assert_eq!(backend.query_calls(), 0);
    assert_eq!(backend.update_calls(), 0);
}

#[tokio::test]
async fn host_without_settings() {
    let backend = Arc::new(MockBackend::new().with_host("host-empty"));
    let session = Session::from_backend(backend.clone());

    let listed = list_supported(&session, &host("host-empty"), false, deadline())
        .await
        .unwrap();
    assert!(listed.is_empty());

    let err = fetch(&session, &host("host-empty"), "Any.key", deadline())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SettingsError::NotFound {
            host: "host-empty".into(),
            name: "Any.key".into(),
        }
    );
    assert_eq!(backend.resolve_calls(), 2);
    assert_eq!(backend.supported_calls(), 1);
}

#[tokio::test]
async fn list_supported_skips_broken_descriptors() {
    let backend = Arc::new(
        MockBackend::new()
            .with_setting("host-1", SettingDescriptor::new("Ok.key", ValueType::Int), "1")
            .with_setting(
                "host-1",
                SettingDescriptor::choice("Bad.choice", Vec::<String>::new()),
                "",
            ),
    );
    let session = Session::from_backend(backend);
    let listed = list_supported(&session, &host("host-1"), false, deadline())
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key, "Ok.key");
}

// ── Session ─────────────────────────────────────────────────────

#[test]
fn session_debug_names_backend() {
    let session = Session::from_backend(Arc::new(MockBackend::new()));
    assert!(format!("{session:?}").contains("mock"));
}
