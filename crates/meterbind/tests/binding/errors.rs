use meterbind::{
    BindError, Binder,
    test_stubs::{FailingBackend, RecordingBackend},
};

use super::fixtures::{
    BadBuckets, BlankId, IgnoredBuckets, MissingId, OddAttrs, Scenario, Service, kv,
};

#[test]
fn missing_identifier_aborts_the_whole_tree() {
    let backend = RecordingBackend::new();
    let err = Binder::new(backend.clone())
        .bind::<MissingId>([])
        .unwrap_err();

    assert_eq!(
        err,
        BindError::MissingIdentifier {
            field: "missing".into()
        }
    );
    // 已创建的兄弟叶子随结果一并丢弃，调用方拿不到部分绑定的树。
    assert_eq!(backend.created_ids(), vec!["present"]);
}

#[test]
fn blank_identifier_counts_as_missing() {
    let err = meterbind::bind::<BlankId>([]).unwrap_err();
    assert!(matches!(err, BindError::MissingIdentifier { field } if field == "blank"));
}

#[test]
fn bad_boundary_token_reports_nested_path_and_raw_tag() {
    let err = meterbind::bind::<BadBuckets>([]).unwrap_err();
    assert_eq!(
        err,
        BindError::InvalidBoundaryToken {
            field: "inner.latency".into(),
            raw: "1.0,bad".into(),
            token: "bad".into(),
        }
    );
    assert_eq!(
        err.to_string(),
        "instrument field `inner.latency` has an invalid boundary `bad` in `1.0,bad`"
    );
}

#[test]
fn boundaries_on_non_histograms_are_not_parsed() {
    let backend = RecordingBackend::new();
    let tree: IgnoredBuckets = Binder::new(backend.clone()).bind([]).unwrap();
    assert!(!tree.temperature.is_noop());
    assert!(backend.created()[0].boundaries.is_empty());
}

#[test]
fn odd_attribute_count_is_rejected_before_descending() {
    let backend = RecordingBackend::new();
    let err = Binder::new(backend.clone())
        .bind::<OddAttrs>([kv("layer", "1")])
        .unwrap_err();
    assert_eq!(
        err,
        BindError::OddAttributeCount {
            field: "sub".into(),
            raw: "k1,v1,k2".into(),
            count: 3,
        }
    );
    assert!(backend.created().is_empty());
}

#[test]
fn backend_refusal_names_field_and_identifier() {
    let backend = FailingBackend::refusing("pool_size", "histogram quota exhausted");
    let err = Binder::new(backend.clone())
        .bind::<Service>([])
        .unwrap_err();

    match &err {
        BindError::BackendCreationFailed { field, id, source } => {
            assert_eq!(field, "frontend.pool.size");
            assert_eq!(id, "pool_size");
            assert_eq!(source.message(), "histogram quota exhausted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // 首个错误之后不再请求任何仪表。
    assert_eq!(
        backend.accepted().created_ids(),
        vec![
            "requests_total",
            "inflight",
            "latency_seconds",
            "queue_depth",
            "pool_bytes"
        ]
    );
}

#[test]
fn refusing_backend_fails_at_the_first_leaf() {
    let err = Binder::new(FailingBackend::new("offline"))
        .bind::<Scenario>([])
        .unwrap_err();
    assert_eq!(err.field(), Some("a"));
}

#[test]
#[should_panic(expected = "has no `id` tag")]
fn must_bind_panics_with_the_error() {
    let _ = Binder::new(RecordingBackend::new()).must_bind::<MissingId>([]);
}

#[test]
#[should_panic(expected = "invalid boundary")]
fn free_must_bind_panics_without_backend() {
    let _ = meterbind::must_bind::<BadBuckets>([]);
}
