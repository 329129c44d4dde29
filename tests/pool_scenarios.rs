//! Escenarios del pool de workers de punta a punta
//! tests/pool_scenarios.rs
//!
//! Pool con cola de capacidad 5, techo de 4 workers y lotes de 2.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use weblist::pool::{Autoscaler, PoolLimits, PutError, Tick, WorkerPool};
use weblist::server::diagnostics::Snapshot;

fn limits() -> PoolLimits {
    PoolLimits {
        max_threads: 4,
        initial_threads: 2,
        low_threads: 1,
        max_free_threads: 1,
        enqueue_timeout: Duration::from_millis(50),
    }
}

/// Espera activa con límite de 5 segundos
fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for: {}", what);
        thread::sleep(Duration::from_millis(5));
    }
}

/// Handle de conexión que cuenta cuántas veces se cerró
struct FakeConnection {
    id: u32,
    closes: Arc<AtomicUsize>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ==================== Drenado y retiro ====================

#[test]
fn test_workers_drain_in_order_then_one_retires() {
    let (tx, rx) = mpsc::channel();
    let tx = Mutex::new(tx);
    let pool = WorkerPool::new(
        PoolLimits {
            initial_threads: 1,
            ..limits()
        },
        Arc::new(move |id: u32| {
            tx.lock().unwrap().send(id).unwrap();
        }),
    )
    .unwrap();

    assert_eq!(pool.queue().capacity(), 5);
    assert_eq!(pool.grow(1), 1);

    // Un solo worker: el orden de procesamiento es el orden de la cola
    for id in 1..=3 {
        pool.submit(id).unwrap();
    }
    let received: Vec<u32> = (0..3)
        .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    assert_eq!(received, vec![1, 2, 3]);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    assert_eq!(pool.grow(1), 1);
    wait_until("two idle workers", || pool.snapshot().idle == 2);

    pool.retire_one().unwrap();
    wait_until("one worker exits", || pool.snapshot().started == 1);

    thread::sleep(Duration::from_millis(50));
    let snapshot = pool.snapshot();
    assert_eq!(snapshot.started, 1);
    assert_eq!(snapshot.idle, 1);
}

#[test]
fn test_many_workers_no_loss_no_duplicates() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let pool = WorkerPool::new(
        limits(),
        Arc::new(move |id: u32| {
            sink.lock().unwrap().push(id);
        }),
    )
    .unwrap();
    assert_eq!(pool.grow(4), 4);

    for id in 0..500 {
        let mut item = id;
        // La cola puede llenarse momentáneamente: se reintenta
        loop {
            match pool.submit(item) {
                Ok(()) => break,
                Err(PutError::Full(back)) => item = back,
                Err(PutError::Closed(_)) => panic!("queue closed"),
            }
        }
    }

    wait_until("all items handled", || seen.lock().unwrap().len() == 500);
    let seen = seen.lock().unwrap();
    let unique: HashSet<u32> = seen.iter().copied().collect();
    assert_eq!(unique.len(), 500);
}

// ==================== Invariantes ====================

#[test]
fn test_counters_stay_ordered_under_churn() {
    let pool = Arc::new(
        WorkerPool::new(
            limits(),
            Arc::new(|_: u32| thread::sleep(Duration::from_micros(200))),
        )
        .unwrap(),
    );

    let running = Arc::new(std::sync::atomic::AtomicBool::new(true));
    let violations = Arc::new(AtomicUsize::new(0));

    let observer = {
        let pool = Arc::clone(&pool);
        let running = Arc::clone(&running);
        let violations = Arc::clone(&violations);
        thread::spawn(move || {
            while running.load(Ordering::SeqCst) {
                let s = pool.snapshot();
                if s.idle > s.started || s.started > s.max_threads {
                    violations.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
    };

    let growers: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..50 {
                    pool.grow_if_starved();
                    pool.grow(2);
                    thread::yield_now();
                }
            })
        })
        .collect();

    for id in 0..200 {
        let _ = pool.submit(id);
        if id % 20 == 0 {
            let _ = pool.retire_one();
        }
    }

    for grower in growers {
        grower.join().unwrap();
    }
    running.store(false, Ordering::SeqCst);
    observer.join().unwrap();

    assert_eq!(violations.load(Ordering::SeqCst), 0);
    assert!(pool.snapshot().started <= 4);
}

#[test]
fn test_diagnostics_consistent_under_load() {
    let pool = Arc::new(WorkerPool::new(limits(), Arc::new(|_: u32| {})).unwrap());
    pool.grow(4);

    let producer = {
        let pool = Arc::clone(&pool);
        thread::spawn(move || {
            for id in 0..2_000 {
                let _ = pool.submit(id);
            }
        })
    };

    for _ in 0..200 {
        let snapshot = Snapshot::capture(pool.queue(), pool.state());
        assert!(snapshot.queue.count <= snapshot.queue.capacity);
        assert!(snapshot.pool.idle <= snapshot.pool.started);
        assert_eq!(snapshot.busy, snapshot.pool.started - snapshot.pool.idle);

        let mut report = Vec::new();
        snapshot.write_report(&mut report).unwrap();
        let report = String::from_utf8(report).unwrap();
        assert!(report.contains(&format!("Busy:       {}", snapshot.busy)));
    }

    producer.join().unwrap();
}

// ==================== Sobrecarga ====================

#[test]
fn test_overload_fails_fast_and_closes_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    // Sin workers: nadie vacía la cola
    let pool = WorkerPool::new(limits(), Arc::new(|_: FakeConnection| {})).unwrap();

    for id in 0..5 {
        pool.submit(FakeConnection {
            id,
            closes: Arc::clone(&closes),
        })
        .unwrap();
    }
    assert_eq!(pool.queue().len(), 5);

    let started = Instant::now();
    let rejected = pool
        .submit(FakeConnection {
            id: 99,
            closes: Arc::clone(&closes),
        })
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(rejected.is_full());

    let rejected = rejected.into_inner();
    assert_eq!(rejected.id, 99);
    assert_eq!(closes.load(Ordering::SeqCst), 0);
    drop(rejected);
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    // Al cerrar la cola las conexiones encoladas se cierran una sola vez
    pool.close();
    while let Some(item) = pool.queue().get() {
        drop(item);
    }
    assert_eq!(closes.load(Ordering::SeqCst), 6);
}

// ==================== Autoescalado ====================

#[test]
fn test_autoscaler_shrinks_one_per_interval() {
    let pool = WorkerPool::new(limits(), Arc::new(|_: u32| {})).unwrap();
    pool.grow(4);
    wait_until("all workers idle", || pool.snapshot().idle == 4);

    let mut autoscaler = Autoscaler::new(Duration::from_secs(10));
    let t0 = Instant::now();

    assert_eq!(autoscaler.tick_at(&pool, t0), Tick::Shrunk);
    assert_eq!(autoscaler.tick_at(&pool, t0 + Duration::from_secs(1)), Tick::Throttled);
    wait_until("first retirement", || pool.snapshot().started == 3);

    assert_eq!(autoscaler.tick_at(&pool, t0 + Duration::from_secs(10)), Tick::Shrunk);
    wait_until("second retirement", || pool.snapshot().started == 2);

    assert_eq!(autoscaler.tick_at(&pool, t0 + Duration::from_secs(20)), Tick::Shrunk);
    wait_until("third retirement", || pool.snapshot().started == 1);

    // idle = 1 ya no supera max_free_threads
    assert_eq!(autoscaler.tick_at(&pool, t0 + Duration::from_secs(30)), Tick::Steady);
}
