//! Construction and submission contract tests

use bounded_pool::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_new_pool_rejects_negative_config() {
    init_logger();
    for (workers, queue_size) in [(-1, 0), (0, -1), (-1, -1)] {
        match Pool::new(workers, queue_size) {
            Err(PoolError::InvalidConfig { .. }) => {}
            other => panic!(
                "expected InvalidConfig for workers={} queue={}, got {:?}",
                workers, queue_size, other
            ),
        }
    }
}

#[test]
fn test_new_pool_rejects_negative_config_with_options() {
    init_logger();
    let result = Pool::with_options(-4, 2, vec![Some(on_task_done(|| {})), None]);
    assert!(matches!(
        result,
        Err(PoolError::InvalidConfig { ref parameter, .. }) if parameter == "workers"
    ));
}

#[test]
fn test_new_pool_accepts_valid_config() {
    init_logger();
    for (workers, queue_size) in [(0, 0), (1, 0), (0, 1), (2, 3)] {
        for with_hook in [false, true] {
            let options = if with_hook {
                vec![Some(on_task_done(|| {}))]
            } else {
                vec![None]
            };
            let pool = Pool::with_options(workers, queue_size, options).unwrap_or_else(|e| {
                panic!(
                    "unexpected error for workers={} queue={}: {}",
                    workers, queue_size, e
                )
            });
            assert_eq!(pool.num_workers(), workers as usize);
            assert_eq!(pool.queue_capacity(), queue_size as usize);
            pool.stop().expect("Failed to stop pool");
        }
    }
}

#[test]
fn test_submit_queue_limit_returns_queue_full() {
    init_logger();
    let pool = Pool::new(0, 2).expect("Failed to create pool");

    pool.execute(|| {}).expect("submit 1");
    pool.execute(|| {}).expect("submit 2");

    match pool.execute(|| {}) {
        Err(PoolError::QueueFull { capacity }) => assert_eq!(capacity, 2),
        other => panic!("expected QueueFull, got {:?}", other),
    }

    pool.stop().expect("Failed to stop pool");
}

#[test]
fn test_over_submission_never_blocks() {
    init_logger();
    let pool = Pool::new(0, 8).expect("Failed to create pool");

    let mut admitted = 0;
    let mut rejected = 0;
    for _ in 0..100 {
        match pool.execute(|| {}) {
            Ok(()) => admitted += 1,
            Err(e) if e.is_queue_full() => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(admitted, 8);
    assert_eq!(rejected, 92);
    assert_eq!(pool.queue_len(), 8);
}

#[test]
fn test_zero_capacity_admits_only_with_idle_worker() {
    init_logger();
    let pool = Pool::new(0, 0).expect("Failed to create pool");
    assert!(pool.execute(|| {}).unwrap_err().is_queue_full());
    pool.stop().expect("Failed to stop pool");
}

#[test]
fn test_submit_custom_task() {
    init_logger();

    struct Count(Arc<AtomicUsize>);

    impl Task for Count {
        fn run(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }

        fn task_type(&self) -> &str {
            "Count"
        }
    }

    let counter = Arc::new(AtomicUsize::new(0));
    let pool = Pool::new(2, 8).expect("Failed to create pool");
    for _ in 0..5 {
        pool.submit(Count(Arc::clone(&counter)))
            .expect("Failed to submit task");
    }
    pool.stop().expect("Failed to stop pool");

    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn test_config_builder_hook() {
    init_logger();
    let done = Arc::new(AtomicUsize::new(0));
    let d = Arc::clone(&done);
    let config = PoolConfig::new(3, 10).with_on_task_done(move || {
        d.fetch_add(1, Ordering::SeqCst);
    });
    let pool = Pool::with_config(config).expect("Failed to create pool");

    for _ in 0..10 {
        pool.execute(|| {}).expect("Failed to submit task");
    }
    pool.stop().expect("Failed to stop pool");

    assert_eq!(done.load(Ordering::SeqCst), 10);
}
