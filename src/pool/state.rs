//! # Estado del Pool
//! src/pool/state.rs
//!
//! Contadores compartidos del pool: threads lanzados (`started`) y threads
//! ociosos (`idle`). Invariante: `0 <= idle <= started <= max_threads`.
//!
//! Su mutex es disjunto del de la cola; ninguna operación toma ambos a la vez.

use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use serde::Serialize;

use super::queue::LockProbe;

/// Contadores protegidos por el mutex
#[derive(Debug)]
pub(super) struct Counters {
    pub(super) started: usize,
    pub(super) idle: usize,
    /// Siguiente identidad de worker; nunca se reutiliza
    pub(super) next_id: u64,
}

/// Snapshot del estado del pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub max_threads: usize,
    pub started: usize,
    pub idle: usize,
}

impl PoolSnapshot {
    /// Workers procesando una conexión (`started - idle`)
    pub fn busy(&self) -> usize {
        self.started.saturating_sub(self.idle)
    }
}

/// Estado compartido del pool de workers
#[derive(Debug)]
pub struct PoolState {
    counters: Mutex<Counters>,
    max_threads: usize,
}

impl PoolState {
    pub fn new(max_threads: usize) -> Self {
        Self {
            counters: Mutex::new(Counters {
                started: 0,
                idle: 0,
                next_id: 1,
            }),
            max_threads,
        }
    }

    pub(super) fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    /// El worker va a bloquearse esperando trabajo
    pub fn mark_idle(&self) {
        let mut counters = self.lock();
        debug_assert!(counters.idle < counters.started);
        counters.idle += 1;
    }

    /// El worker recibió un item de la cola
    pub fn mark_busy(&self) {
        let mut counters = self.lock();
        counters.idle = counters.idle.saturating_sub(1);
    }

    /// Un worker ocupado consumió un token de terminación y va a salir
    pub fn retire(&self) {
        let mut counters = self.lock();
        counters.started = counters.started.saturating_sub(1);
        if counters.idle > counters.started {
            counters.idle = counters.started;
        }
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        let counters = self.lock();
        PoolSnapshot {
            max_threads: self.max_threads,
            started: counters.started,
            idle: counters.idle,
        }
    }

    /// Sondeo no bloqueante, para el diagnóstico
    pub fn try_snapshot(&self) -> LockProbe<PoolSnapshot> {
        let snapshot = |counters: &Counters| PoolSnapshot {
            max_threads: self.max_threads,
            started: counters.started,
            idle: counters.idle,
        };

        match self.counters.try_lock() {
            Ok(counters) => LockProbe::Unlocked(snapshot(&counters)),
            Err(TryLockError::Poisoned(poisoned)) => LockProbe::Unlocked(snapshot(&poisoned.into_inner())),
            Err(TryLockError::WouldBlock) => LockProbe::Locked,
        }
    }

    pub fn started(&self) -> usize {
        self.lock().started
    }

    pub fn idle(&self) -> usize {
        self.lock().idle
    }
}
