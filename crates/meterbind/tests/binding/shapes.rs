use meterbind::{
    BindContext, BindError, Blueprint, FieldMeta, prelude::*, test_stubs::RecordingBackend,
};

use super::fixtures::{Empty, Labeled, RawNames, Scenario, ScenarioSub, Service, Storage, kv};

#[test]
fn skipped_and_unannotated_fields_take_defaults() {
    let tree: Service = meterbind::bind([]).unwrap();
    assert!(tree.label.is_empty());
    assert!(tree.note.is_none());
}

#[test]
fn owned_and_optional_subtrees_are_allocated() {
    let tree: Service = Binder::new(RecordingBackend::new()).bind([]).unwrap();
    assert!(!tree.backend.queue.is_noop());
    let storage = tree.storage.expect("optional subtree is always populated");
    assert!(!storage.usage.is_noop());
}

#[test]
fn unannotated_blueprint_fields_are_walked_as_subtrees() {
    #[derive(Blueprint, Debug)]
    struct Host {
        #[meter(id = "outer")]
        counter: I64Counter,
        inner: ScenarioSub,
        boxed: Box<Storage>,
        note: Option<String>,
    }

    let backend = RecordingBackend::new();
    let host: Host = Binder::new(backend.clone()).bind([kv("layer", "1")]).unwrap();

    assert!(!host.counter.is_noop());
    assert!(!host.inner.b.is_noop());
    assert_eq!(host.inner.b.attributes().as_slice(), &[kv("layer", "1")]);
    assert!(!host.boxed.usage.is_noop());
    assert!(host.note.is_none());
    assert_eq!(
        backend.created_ids(),
        vec!["outer", "B", "disk_usage", "io_delta"]
    );
}

#[test]
fn missing_identifier_inside_unannotated_subtree_is_reported() {
    #[derive(Blueprint, Debug)]
    struct Unnamed {
        gauge: I64Gauge,
    }

    #[derive(Blueprint, Debug)]
    struct Host {
        #[meter(id = "outer")]
        counter: I64Counter,
        missing: Unnamed,
    }

    let backend = RecordingBackend::new();
    let err = Binder::new(backend.clone()).bind::<Host>([]).unwrap_err();
    assert_eq!(
        err,
        BindError::MissingIdentifier {
            field: "missing.gauge".into()
        }
    );
    assert_eq!(backend.created_ids(), vec!["outer"]);
}

#[test]
fn unit_struct_binds_to_itself() {
    let backend = RecordingBackend::new();
    let _: Empty = Binder::new(backend.clone()).bind([kv("k", "v")]).unwrap();
    assert!(backend.created().is_empty());
}

#[test]
fn generic_blueprints_bind_their_parameter() {
    let tree: Labeled<ScenarioSub> = meterbind::bind([kv("layer", "1")]).unwrap();
    assert_eq!(
        tree.inner.b.attributes().as_slice(),
        &[kv("layer", "1"), kv("wrapper", "yes")]
    );

    let nested: Labeled<Box<Scenario>> = meterbind::bind([]).unwrap();
    assert_eq!(
        nested.inner.sub.b.attributes().as_slice(),
        &[kv("wrapper", "yes"), kv("sub", "x")]
    );
}

#[test]
fn raw_identifiers_use_their_plain_name() {
    let err = {
        #[derive(Blueprint, Debug)]
        struct Holder {
            #[meter(nested)]
            r#inner: RawNames,
            #[meter(id = "x", buckets = "nope")]
            r#match: F64Histogram,
        }
        meterbind::bind::<Holder>([]).unwrap_err()
    };
    assert_eq!(err.field(), Some("match"));
}

#[test]
fn boxed_and_optional_roots_bind() {
    let boxed: Box<Scenario> = meterbind::bind([]).unwrap();
    assert!(boxed.a.is_noop());
    let optional: Option<Scenario> = meterbind::bind([]).unwrap();
    assert!(optional.is_some());
}

#[test]
fn hand_written_blueprints_mix_with_derived_ones() {
    #[derive(Debug)]
    struct Manual {
        scenario: Scenario,
        extra: F64Gauge,
    }

    impl Blueprint for Manual {
        fn bind_fields(cx: &BindContext<'_>) -> Result<Self, BindError> {
            Ok(Self {
                scenario: cx.subtree(&FieldMeta::new("scenario", &[("attrs", "m,1")]))?,
                extra: cx.leaf(&FieldMeta::new("extra", &[("id", "extra")]))?,
            })
        }
    }

    let backend = RecordingBackend::new();
    let manual: Manual = Binder::new(backend.clone()).bind([]).unwrap();
    assert_eq!(
        manual.scenario.sub.b.attributes().as_slice(),
        &[kv("m", "1"), kv("sub", "x")]
    );
    assert!(manual.extra.attributes().is_empty());
    assert_eq!(backend.created_ids(), vec!["A", "B", "extra"]);
}
