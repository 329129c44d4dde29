//! # Gestor del Pool de Workers
//! src/pool/manager.rs
//!
//! Lanza lotes de workers sin pasar nunca del techo `max_threads` y decide
//! cuándo hace falta crecer.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::queue::{BoundedQueue, PutError, QueueError};
use super::state::{PoolSnapshot, PoolState};
use super::worker::{worker_loop, ConnectionHandler, WorkItem, WorkerId};

/// Límites del pool, fijos durante toda la vida del proceso
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolLimits {
    /// Techo de threads lanzados simultáneamente (MAXTHREAD)
    pub max_threads: usize,

    /// Tamaño de cada lote de crecimiento (INITIALTHREAD)
    pub initial_threads: usize,

    /// Se crece cuando quedan `idle <= low_threads` (LOWTHREAD)
    pub low_threads: usize,

    /// Se encoge cuando hay `idle > max_free_threads` (MAXFREETHREAD)
    pub max_free_threads: usize,

    /// Cuánto puede esperar un `submit` con la cola llena
    pub enqueue_timeout: Duration,
}

impl Default for PoolLimits {
    fn default() -> Self {
        Self {
            max_threads: 300,
            initial_threads: 15,
            low_threads: 2,
            max_free_threads: 16,
            enqueue_timeout: Duration::from_millis(100),
        }
    }
}

impl PoolLimits {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            max_threads: config.max_threads,
            initial_threads: config.initial_threads,
            low_threads: config.low_threads,
            max_free_threads: config.max_free_threads,
            enqueue_timeout: Duration::from_millis(config.enqueue_timeout_ms),
        }
    }
}

/// Pool de workers con cola de conexiones propia
pub struct WorkerPool<C> {
    limits: PoolLimits,
    queue: Arc<BoundedQueue<WorkItem<C>>>,
    state: Arc<PoolState>,
    handler: Arc<dyn ConnectionHandler<C>>,
}

impl<C: Send + 'static> WorkerPool<C> {
    /// Crea el pool sin workers. La cola mide `max_threads + 1` para que
    /// siempre quepa un token de terminación aunque el pool esté saturado.
    pub fn new(limits: PoolLimits, handler: Arc<dyn ConnectionHandler<C>>) -> Result<Self, QueueError> {
        let capacity = limits
            .max_threads
            .checked_add(1)
            .ok_or(QueueError::Alloc { capacity: usize::MAX })?;
        let queue = BoundedQueue::new(capacity)?;

        Ok(Self {
            limits,
            queue: Arc::new(queue),
            state: Arc::new(PoolState::new(limits.max_threads)),
            handler,
        })
    }

    /// Intenta lanzar `requested` workers nuevos.
    ///
    /// Todo ocurre bajo el mutex del estado: si `started + requested` pasa del
    /// techo no se lanza ninguno. Los fallos de `spawn` se toleran; solo se
    /// cuentan los threads que arrancaron. Retorna cuántos arrancaron.
    pub fn grow(&self, requested: usize) -> usize {
        if requested == 0 {
            return 0;
        }

        let mut counters = self.state.lock();
        if counters.started + requested > self.limits.max_threads {
            tracing::debug!(
                started = counters.started,
                requested,
                max = self.limits.max_threads,
                "growth request over the ceiling, ignored"
            );
            return 0;
        }

        let mut launched = 0;
        for _ in 0..requested {
            let id = WorkerId(counters.next_id);
            counters.next_id += 1;

            match self.spawn_worker(id) {
                Ok(()) => launched += 1,
                Err(e) => tracing::warn!(worker = %id, error = %e, "unable to launch worker thread"),
            }
        }
        counters.started += launched;

        if launched != requested {
            tracing::warn!(launched, requested, "unable to launch the required threads");
        }
        tracing::info!(launched, started = counters.started, idle = counters.idle, "pool grown");

        launched
    }

    fn spawn_worker(&self, id: WorkerId) -> io::Result<()> {
        let queue = Arc::clone(&self.queue);
        let state = Arc::clone(&self.state);
        let handler = Arc::clone(&self.handler);

        // Thread desacoplado: el JoinHandle se descarta
        thread::Builder::new()
            .name(id.to_string())
            .spawn(move || worker_loop(id, queue, state, handler))
            .map(drop)
    }

    /// Disparador de crecimiento, llamado después de cada accept.
    ///
    /// Si quedan pocos workers ociosos pide un lote de `initial_threads`,
    /// recortado a lo que falta para llegar al techo.
    pub fn grow_if_starved(&self) -> usize {
        let snapshot = self.state.snapshot();

        if snapshot.idle > self.limits.low_threads || snapshot.idle >= self.limits.max_threads {
            return 0;
        }

        let room = self.limits.max_threads.saturating_sub(snapshot.started);
        let batch = self.limits.initial_threads.min(room);
        self.grow(batch)
    }

    /// Entrega una conexión a los workers.
    ///
    /// Si la cola sigue llena pasado `enqueue_timeout`, o si fue cerrada,
    /// devuelve la conexión para que el llamador la cierre.
    pub fn submit(&self, conn: C) -> Result<(), PutError<C>> {
        self.queue
            .put_timeout(WorkItem::Connection(conn), self.limits.enqueue_timeout)
            .map_err(|e| {
                e.map(|item| match item {
                    WorkItem::Connection(conn) => conn,
                    WorkItem::Terminate => unreachable!("submit only enqueues connections"),
                })
            })
    }

    /// Encola un token de terminación: exactamente un worker ocioso saldrá
    pub fn retire_one(&self) -> Result<(), PutError<()>> {
        self.queue
            .put_timeout(WorkItem::Terminate, self.limits.enqueue_timeout)
            .map_err(|e| e.map(drop))
    }

    /// Cierra la cola: todos los workers terminan al vaciarla
    pub fn close(&self) {
        self.queue.close();
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        self.state.snapshot()
    }

    pub fn limits(&self) -> &PoolLimits {
        &self.limits
    }

    pub fn queue(&self) -> &Arc<BoundedQueue<WorkItem<C>>> {
        &self.queue
    }

    pub fn state(&self) -> &Arc<PoolState> {
        &self.state
    }
}
