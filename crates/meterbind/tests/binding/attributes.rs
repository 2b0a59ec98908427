use meterbind::{prelude::*, test_stubs::RecordingBackend};

use super::fixtures::{Scenario, Service, kv};

#[test]
fn counter_at_root_and_gauge_in_subtree() {
    let backend = RecordingBackend::new();
    let tree: Scenario = Binder::new(backend.clone())
        .bind([kv("layer", "1")])
        .unwrap();

    assert_eq!(tree.a.attributes().as_slice(), &[kv("layer", "1")]);
    assert_eq!(
        tree.sub.b.attributes().as_slice(),
        &[kv("layer", "1"), kv("sub", "x")]
    );

    tree.a.add(1, &[]);
    tree.sub.b.record(5, &[kv("call", "site")]);

    let a = backend.measurements_for("A");
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].attributes, vec![kv("layer", "1")]);
    let b = backend.measurements_for("B");
    assert_eq!(
        b[0].attributes,
        vec![kv("layer", "1"), kv("sub", "x"), kv("call", "site")]
    );
    assert_eq!(b[0].value, 5.0);
}

#[test]
fn independent_binds_do_not_share_attributes() {
    let binder = Binder::new(RecordingBackend::new());
    let first: Scenario = binder.bind([kv("instance", "one")]).unwrap();
    let second: Scenario = binder.bind([kv("instance", "two")]).unwrap();

    assert_eq!(first.a.attributes().as_slice(), &[kv("instance", "one")]);
    assert_eq!(second.a.attributes().as_slice(), &[kv("instance", "two")]);
    assert_eq!(
        first.sub.b.attributes().as_slice(),
        &[kv("instance", "one"), kv("sub", "x")]
    );
    assert_eq!(
        second.sub.b.attributes().as_slice(),
        &[kv("instance", "two"), kv("sub", "x")]
    );
}

#[test]
fn siblings_never_see_each_other() {
    let tree: Service = Binder::new(RecordingBackend::new())
        .bind([kv("svc", "api")])
        .unwrap();

    assert_eq!(
        tree.frontend.queue.attributes().as_slice(),
        &[kv("svc", "api"), kv("tier", "frontend")]
    );
    assert_eq!(
        tree.backend.queue.attributes().as_slice(),
        &[kv("svc", "api"), kv("tier", "backend"), kv("region", "eu")]
    );
    let storage = tree.storage.as_ref().unwrap();
    assert_eq!(storage.usage.attributes().as_slice(), &[kv("svc", "api")]);
}

#[test]
fn deep_leaves_concatenate_root_to_leaf() {
    let tree: Service = Binder::new(RecordingBackend::new())
        .bind([kv("svc", "api"), kv("zone", "a")])
        .unwrap();

    assert_eq!(
        tree.backend.pool.size.attributes().as_slice(),
        &[
            kv("svc", "api"),
            kv("zone", "a"),
            kv("tier", "backend"),
            kv("region", "eu"),
            kv("pool", "db"),
        ]
    );
    assert_eq!(
        tree.frontend.pool.bytes.attributes().as_slice(),
        &[
            kv("svc", "api"),
            kv("zone", "a"),
            kv("tier", "frontend"),
            kv("pool", "db"),
        ]
    );
}

#[test]
fn duplicate_keys_pass_through_in_order() {
    let backend = RecordingBackend::new();
    let tree: Scenario = Binder::new(backend.clone())
        .bind([kv("sub", "root")])
        .unwrap();
    tree.sub.b.record(1, &[kv("sub", "call")]);

    assert_eq!(
        backend.measurements_for("B")[0].attributes,
        vec![kv("sub", "root"), kv("sub", "x"), kv("sub", "call")]
    );
}

#[test]
fn leaves_are_created_in_declaration_order_with_histogram_buckets() {
    let backend = RecordingBackend::new();
    let _tree: Service = Binder::new(backend.clone()).bind([]).unwrap();

    assert_eq!(
        backend.created_ids(),
        vec![
            "requests_total",
            "inflight",
            "latency_seconds",
            "queue_depth",
            "pool_bytes",
            "pool_size",
            "queue_depth",
            "pool_bytes",
            "pool_size",
            "disk_usage",
            "io_delta",
        ]
    );

    let created = backend.created();
    assert_eq!(created[2].boundaries, vec![0.005, 0.05, 0.5, 5.0]);
    assert_eq!(created[5].boundaries, vec![1.0, 2.0, 4.0, 8.0]);
    assert!(created[0].boundaries.is_empty());
}

#[test]
fn explicit_context_reaches_the_backend() {
    let backend = RecordingBackend::new();
    let tree: Scenario = Binder::new(backend.clone()).bind([]).unwrap();

    let token = meterbind::Cancellation::new();
    let cx = MeasureContext::new().with_cancellation(token.clone());
    tree.a.add_in(&cx, 1, &[]);
    token.cancel();
    tree.a.add_in(&cx, 1, &[]);

    let seen: Vec<bool> = backend
        .measurements_for("A")
        .iter()
        .map(|m| m.context_done)
        .collect();
    assert_eq!(seen, vec![false, true]);
}
