//! 多线程绑定与多线程记录。

use std::{sync::Arc, thread};

use meterbind::{
    Binder, Blueprint, F64Histogram, I64Counter, I64UpDownCounter, KeyValue,
    test_stubs::RecordingBackend,
};

#[derive(Blueprint, Debug, Clone)]
struct Worker {
    #[meter(id = "jobs_total")]
    jobs: I64Counter,
    #[meter(id = "queue")]
    queue: I64UpDownCounter,
    #[meter(attrs = "stage,io")]
    io: Io,
}

#[derive(Blueprint, Debug, Clone)]
struct Io {
    #[meter(id = "io_seconds", buckets = "0.001,0.01,0.1")]
    latency: F64Histogram,
}

#[test]
fn concurrent_binds_produce_disjoint_trees() {
    let backend = RecordingBackend::new();
    let binder = Binder::new(backend.clone());

    let trees: Vec<(usize, Worker)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|index| {
                let binder = binder.clone();
                scope.spawn(move || {
                    let base = KeyValue::new("worker", index.to_string());
                    (index, binder.bind::<Worker>([base]).unwrap())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (index, tree) in &trees {
        let expected = KeyValue::new("worker", index.to_string());
        assert_eq!(tree.jobs.attributes().as_slice(), &[expected.clone()]);
        assert_eq!(
            tree.io.latency.attributes().as_slice(),
            &[expected, KeyValue::new("stage", "io")]
        );
    }
    assert_eq!(backend.created().len(), 8 * 3);
}

#[test]
fn one_tree_is_shared_across_recording_threads() {
    let backend = RecordingBackend::new();
    let tree: Arc<Worker> = Arc::new(
        Binder::new(backend.clone())
            .bind([KeyValue::new("pool", "main")])
            .unwrap(),
    );

    const THREADS: usize = 6;
    const ITERATIONS: usize = 250;

    thread::scope(|scope| {
        for thread_id in 0..THREADS {
            let tree = Arc::clone(&tree);
            scope.spawn(move || {
                let attr = [KeyValue::new("thread", thread_id.to_string())];
                for _ in 0..ITERATIONS {
                    tree.jobs.add(1, &attr);
                    tree.queue.add(1, &[]);
                    tree.queue.add(-1, &[]);
                    tree.io.latency.record(0.005, &attr);
                }
            });
        }
    });

    let jobs = backend.measurements_for("jobs_total");
    assert_eq!(jobs.len(), THREADS * ITERATIONS);
    assert!(jobs.iter().all(|m| m.attributes[0] == KeyValue::new("pool", "main")));
    assert!(jobs.iter().all(|m| m.attributes.len() == 2));

    let queue_sum: f64 = backend
        .measurements_for("queue")
        .iter()
        .map(|m| m.value)
        .sum();
    assert_eq!(queue_sum, 0.0);
    assert_eq!(
        backend.measurements_for("io_seconds").len(),
        THREADS * ITERATIONS
    );
}

#[test]
fn cloned_leaves_share_the_backend_instrument() {
    let backend = RecordingBackend::new();
    let tree: Worker = Binder::new(backend.clone()).bind([]).unwrap();
    let copy = tree.clone();

    thread::spawn(move || copy.jobs.add(5, &[]))
        .join()
        .unwrap();
    tree.jobs.add(1, &[]);

    assert_eq!(backend.created().len(), 3);
    assert_eq!(backend.measurements_for("jobs_total").len(), 2);
}
