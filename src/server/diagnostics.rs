//! # Diagnóstico en Caliente
//! src/server/diagnostics.rs
//!
//! Volcado del estado de la cola y del pool, pedido con `SIGUSR1`.
//!
//! ```text
//! Queue is unlocked
//! Pool is unlocked
//! === Queue ===
//! count:      0	size:       301
//! head:       4	tail:       4
//! wait_data:  15	wait_space: 0
//! === Threads ===
//! Maximum:    300
//! Started:    15
//! Free:       15
//! Busy:       0
//! ```
//!
//! Primero se sondea cada mutex sin bloquear (para ver si alguno quedó
//! tomado); después se leen los valores con el lock adquirido. Los dos
//! locks nunca se toman a la vez.

use std::io::{self, Write};

use serde::Serialize;

use crate::pool::{BoundedQueue, PoolSnapshot, PoolState, QueueStatus};

/// Estado de la cola y del pool en un instante
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// El mutex de la cola estaba tomado al sondearlo
    pub queue_locked: bool,

    /// El mutex del pool estaba tomado al sondearlo
    pub pool_locked: bool,

    pub queue: QueueStatus,
    pub pool: PoolSnapshot,
    pub busy: usize,
}

impl Snapshot {
    pub fn capture<T>(queue: &BoundedQueue<T>, state: &PoolState) -> Self {
        let queue_locked = queue.try_status().is_locked();
        let pool_locked = state.try_snapshot().is_locked();

        let queue = queue.status();
        let pool = state.snapshot();

        Self {
            queue_locked,
            pool_locked,
            queue,
            pool,
            busy: pool.busy(),
        }
    }

    /// Bloque de texto fijo, tal como se imprime en stdout
    pub fn write_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let label = |locked: bool| if locked { "locked" } else { "unlocked" };

        writeln!(out, "Queue is {}", label(self.queue_locked))?;
        writeln!(out, "Pool is {}", label(self.pool_locked))?;
        writeln!(out, "=== Queue ===")?;
        writeln!(out, "count:      {}\tsize:       {}", self.queue.count, self.queue.capacity)?;
        writeln!(out, "head:       {}\ttail:       {}", self.queue.head, self.queue.tail)?;
        writeln!(
            out,
            "wait_data:  {}\twait_space: {}",
            self.queue.waiting_data, self.queue.waiting_space
        )?;
        writeln!(out, "=== Threads ===")?;
        writeln!(out, "Maximum:    {}", self.pool.max_threads)?;
        writeln!(out, "Started:    {}", self.pool.started)?;
        writeln!(out, "Free:       {}", self.pool.idle)?;
        writeln!(out, "Busy:       {}", self.busy)?;
        out.flush()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }
}

/// Captura el estado y lo escribe en `out`
pub fn write_report<W: Write, T>(out: &mut W, queue: &BoundedQueue<T>, state: &PoolState) -> io::Result<Snapshot> {
    let snapshot = Snapshot::capture(queue, state);
    snapshot.write_report(out)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_text(queue: &BoundedQueue<u32>, state: &PoolState) -> String {
        let mut out = Vec::new();
        write_report(&mut out, queue, state).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_report_layout() {
        let queue = BoundedQueue::new(5).unwrap();
        let state = PoolState::new(4);
        queue.put(1).unwrap();
        queue.put(2).unwrap();

        let text = report_text(&queue, &state);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Queue is unlocked");
        assert_eq!(lines[1], "Pool is unlocked");
        assert_eq!(lines[2], "=== Queue ===");
        assert_eq!(lines[3], "count:      2\tsize:       5");
        assert_eq!(lines[4], "head:       0\ttail:       2");
        assert_eq!(lines[5], "wait_data:  0\twait_space: 0");
        assert_eq!(lines[6], "=== Threads ===");
        assert_eq!(lines[7], "Maximum:    4");
        assert_eq!(lines[8], "Started:    0");
        assert_eq!(lines[9], "Free:       0");
        assert_eq!(lines[10], "Busy:       0");
    }

    #[test]
    fn test_busy_is_started_minus_free() {
        use crate::pool::{PoolLimits, WorkerPool};
        use std::sync::{mpsc, Arc, Mutex};
        use std::thread;
        use std::time::{Duration, Instant};

        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let limits = PoolLimits {
            max_threads: 4,
            initial_threads: 3,
            low_threads: 0,
            max_free_threads: 4,
            enqueue_timeout: Duration::from_millis(100),
        };
        let pool = WorkerPool::new(
            limits,
            Arc::new(move |_: u32| {
                let _ = release_rx.lock().unwrap().recv();
            }),
        )
        .unwrap();

        assert_eq!(pool.grow(3), 3);
        pool.submit(1).unwrap();
        pool.submit(2).unwrap();

        // Dos workers quedan bloqueados dentro del handler
        let deadline = Instant::now() + Duration::from_secs(5);
        while !(pool.queue().is_empty() && pool.state().idle() == 1) {
            assert!(Instant::now() < deadline, "workers never picked up the connections");
            thread::sleep(Duration::from_millis(5));
        }

        let snapshot = Snapshot::capture(pool.queue(), pool.state());
        assert_eq!(snapshot.pool.started, 3);
        assert_eq!(snapshot.busy, 2);

        let mut out = Vec::new();
        snapshot.write_report(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("Busy:       2"));

        release_tx.send(()).unwrap();
        release_tx.send(()).unwrap();
    }

    #[test]
    fn test_json_snapshot() {
        let queue = BoundedQueue::<u32>::new(3).unwrap();
        let state = PoolState::new(2);

        let json: serde_json::Value = serde_json::from_str(&Snapshot::capture(&queue, &state).to_json()).unwrap();
        assert_eq!(json["queue"]["capacity"], 3);
        assert_eq!(json["pool"]["max_threads"], 2);
        assert_eq!(json["queue_locked"], false);
    }
}
