use std::sync::Arc;

use meterbind::{MeterBackend, prelude::*, test_stubs::RecordingBackend};

use super::fixtures::{Scenario, Service, kv};

fn exercise(tree: &Service) {
    tree.requests.add(1, &[kv("code", "200")]);
    tree.inflight.add(-1, &[]);
    tree.latency.record(0.02, &[]);
    tree.frontend.queue.record(3, &[]);
    tree.backend.pool.bytes.add(512.0, &[]);
    tree.backend.pool.size.record(4, &[]);
    let storage = tree.storage.as_ref().unwrap();
    storage.usage.record(0.75, &[]);
    storage.delta.add(-0.25, &[]);
}

#[test]
fn binding_without_backend_yields_inert_handles() {
    let tree: Service = meterbind::bind([kv("layer", "1")]).unwrap();

    assert!(tree.requests.is_noop());
    assert!(tree.latency.is_noop());
    assert!(tree.backend.pool.size.is_noop());
    // 空操作句柄同样记录了累积属性，便于在测试中断言树形结构。
    assert_eq!(
        tree.backend.queue.attributes().as_slice(),
        &[kv("layer", "1"), kv("tier", "backend"), kv("region", "eu")]
    );
    exercise(&tree);
}

#[test]
fn same_code_path_records_once_a_backend_is_injected() {
    let noop_tree: Service = Binder::noop().bind([]).unwrap();
    exercise(&noop_tree);

    let backend = RecordingBackend::new();
    let shared: Arc<dyn MeterBackend> = Arc::new(backend.clone());
    let binder = Binder::with_backend(Some(shared));
    assert!(!binder.is_noop());

    let live_tree: Service = binder.bind([]).unwrap();
    exercise(&live_tree);
    assert_eq!(backend.measurements().len(), 8);
}

#[test]
fn default_binder_is_noop() {
    let binder = Binder::default();
    assert!(binder.is_noop());
    assert!(binder.backend().is_none());
    let tree: Scenario = binder.bind([]).unwrap();
    assert!(tree.a.is_noop() && tree.sub.b.is_noop());
}

#[test]
fn noop_binding_still_validates_tags() {
    let err = meterbind::bind::<super::fixtures::MissingId>([]).unwrap_err();
    assert_eq!(err.field(), Some("missing"));
}
